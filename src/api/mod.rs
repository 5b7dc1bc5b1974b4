mod client;
pub use client::ApiClient;
mod model;
pub use model::Id;
pub use model::Page;
pub use model::Session;
