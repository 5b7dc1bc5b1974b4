mod elapsed;
pub use elapsed::elapsed_label;
mod launch;
pub use launch::LaunchForm;
pub use launch::DEFAULT_MAX_LEADS;
pub use launch::LaunchRequest;
mod model;
pub use model::DashboardChart;
pub use model::ExecutionRecord;
pub use model::ExecutionStatus;
mod poller;
pub use poller::ExecutionRow;
pub use poller::ExecutionsSnapshot;
pub use poller::ExecutionsView;
pub use poller::PageSource;
pub use poller::DEFAULT_PAGE_SIZE;
pub use poller::POLL_INTERVAL;
