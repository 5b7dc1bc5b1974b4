use super::{elapsed_label, ExecutionRecord};
use crate::{api::Page, task::ScheduledTask, Result};
use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Paged execution listing, `page_index` is zero based.
pub trait PageSource: Send + Sync + 'static {
    fn fetch_page(
        &self,
        page_index: u64,
        page_size: u64,
    ) -> impl Future<Output = Result<Page<ExecutionRecord>>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRow {
    pub record: ExecutionRecord,
    /// Client side only, never sent back.
    pub elapsed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionsSnapshot {
    pub page_index: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
    pub rows: Vec<ExecutionRow>,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

struct ViewState {
    snapshot: ExecutionsSnapshot,
    // Bumped on every navigation, responses from an older generation are dropped
    generation: u64,
    next_request: u64,
    last_applied: u64,
    pending_loads: u32,
    pending_refreshes: u32,
    closed: bool,
}

struct Shared<S> {
    source: S,
    state: Mutex<ViewState>,
    clock: Clock,
    version: watch::Sender<u64>,
}

impl<S: PageSource> Shared<S> {
    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|it| *it += 1);
    }

    /// Fetches `target` (or the current page when `None`) and applies the
    /// response only if no newer navigation or response got there first.
    /// Returns `false` only when a later navigation made the response
    /// irrelevant.
    async fn load(&self, target: Option<u64>, silent: bool) -> Result<bool> {
        let (page_index, page_size, generation, request) = {
            let mut state = self.state();
            if state.closed {
                return Ok(false);
            }
            if let Some(page_index) = target {
                state.generation += 1;
                state.snapshot.page_index = page_index;
            }
            if silent {
                state.pending_refreshes += 1;
                state.snapshot.refreshing = true;
            } else {
                state.pending_loads += 1;
                state.snapshot.loading = true;
            }
            state.next_request += 1;
            (
                state.snapshot.page_index,
                state.snapshot.page_size,
                state.generation,
                state.next_request,
            )
        };
        self.notify();

        let res = self.source.fetch_page(page_index, page_size).await;

        let discarded = {
            let mut state = self.state();
            if state.closed {
                return Ok(false);
            }
            if silent {
                state.pending_refreshes = state.pending_refreshes.saturating_sub(1);
            } else {
                state.pending_loads = state.pending_loads.saturating_sub(1);
            }
            state.snapshot.refreshing = state.pending_refreshes > 0;
            state.snapshot.loading = state.pending_loads > 0;
            if state.generation != generation {
                debug!(page_index, request, "Discarding executions page after navigation");
                Some(false)
            } else if request <= state.last_applied {
                // a newer response for the same page is already on screen
                debug!(page_index, request, "Discarding out of order executions page");
                Some(true)
            } else {
                state.last_applied = request;
                match &res {
                    Ok(page) => {
                        let now = (self.clock)();
                        state.snapshot.rows = page
                            .data
                            .iter()
                            .map(|record| ExecutionRow {
                                record: record.clone(),
                                elapsed: elapsed_label(record, now),
                            })
                            .collect();
                        state.snapshot.total = page.pagination.total;
                        state.snapshot.total_pages = page.pagination.total_pages;
                        state.snapshot.error = None;
                    }
                    Err(e) => {
                        state.snapshot.rows.clear();
                        state.snapshot.error = Some(e.to_string());
                    }
                }
                None
            }
        };
        self.notify();
        if let Some(current) = discarded {
            return Ok(current);
        }
        res.map(|_| true)
    }

    fn tick_clock(&self) {
        let changed = {
            let mut state = self.state();
            let now = (self.clock)();
            let mut changed = false;
            for row in state.snapshot.rows.iter_mut() {
                let elapsed = elapsed_label(&row.record, now);
                if elapsed != row.elapsed {
                    row.elapsed = elapsed;
                    changed = true;
                }
            }
            changed
        };
        if changed {
            self.notify();
        }
    }
}

/// Execution list screen: the displayed page plus its two timers, a refresh
/// of the current page and a once per second elapsed time update. Both stop
/// when the view is closed or dropped.
pub struct ExecutionsView<S> {
    shared: Arc<Shared<S>>,
    refresh_task: Option<ScheduledTask>,
    clock_task: Option<ScheduledTask>,
}

impl<S: PageSource> ExecutionsView<S> {
    pub fn new(source: S, page_size: u64) -> Self {
        Self::with_clock(source, page_size, OffsetDateTime::now_utc)
    }

    pub fn with_clock(
        source: S,
        page_size: u64,
        clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static,
    ) -> Self {
        let (version, _) = watch::channel(0);
        let state = ViewState {
            snapshot: ExecutionsSnapshot {
                page_size: page_size.max(1),
                ..ExecutionsSnapshot::default()
            },
            generation: 0,
            next_request: 0,
            last_applied: 0,
            pending_loads: 0,
            pending_refreshes: 0,
            closed: false,
        };
        ExecutionsView {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(state),
                clock: Arc::new(clock),
                version,
            }),
            refresh_task: None,
            clock_task: None,
        }
    }

    /// Starts both timers and loads the current page.
    pub async fn open(&mut self, poll_interval: Duration) -> Result<()> {
        if self.refresh_task.is_none() {
            let shared = self.shared.clone();
            self.refresh_task = Some(ScheduledTask::every(
                "executions-refresh",
                poll_interval,
                move || {
                    let shared = shared.clone();
                    async move {
                        if let Err(e) = shared.load(None, true).await {
                            warn!(error = %e, "Failed to refresh executions");
                        }
                    }
                },
            ));
        }
        if self.clock_task.is_none() {
            let shared = self.shared.clone();
            self.clock_task = Some(ScheduledTask::every(
                "executions-clock",
                CLOCK_INTERVAL,
                move || {
                    let shared = shared.clone();
                    async move { shared.tick_clock() }
                },
            ));
        }
        self.shared.load(None, false).await.map(|_| ())
    }

    /// Returns `false` when a later navigation made this response irrelevant.
    /// Navigating restarts the refresh countdown.
    pub async fn go_to_page(&self, page_index: u64) -> Result<bool> {
        if let Some(task) = &self.refresh_task {
            task.reset();
        }
        self.shared.load(Some(page_index), false).await
    }

    pub async fn set_page_size(&self, page_size: u64) -> Result<bool> {
        self.shared.state().snapshot.page_size = page_size.max(1);
        self.go_to_page(0).await
    }

    pub async fn refresh(&self) -> Result<bool> {
        self.shared.load(None, true).await
    }

    pub fn snapshot(&self) -> ExecutionsSnapshot {
        self.shared.state().snapshot.clone()
    }

    /// Changes whenever the snapshot does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.version.subscribe()
    }

    pub fn is_open(&self) -> bool {
        !self.shared.state().closed
    }

    pub fn close(&mut self) {
        self.shared.state().closed = true;
        self.refresh_task = None;
        self.clock_task = None;
    }
}

impl<S> Drop for ExecutionsView<S> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.closed = true;
        }
        self.refresh_task = None;
        self.clock_task = None;
    }
}
