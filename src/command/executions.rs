use super::session_client;
use crate::{
    api::{Id, Page},
    conf::Conf,
    execution::{
        elapsed_label, ExecutionRecord, ExecutionRow, ExecutionsSnapshot, ExecutionsView,
        DEFAULT_PAGE_SIZE,
    },
    Result,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    signal::ctrl_c,
};
use tracing::{info, warn};

pub async fn list(page_index: u64, conf: &Conf) -> Result<()> {
    let page = session_client(conf)?
        .executions(page_index, DEFAULT_PAGE_SIZE)
        .await?;
    let now = OffsetDateTime::now_utc();
    let rows: Vec<ExecutionRow> = page
        .data
        .iter()
        .map(|record| ExecutionRow {
            record: record.clone(),
            elapsed: elapsed_label(record, now),
        })
        .collect();
    for row in &rows {
        println!("{}", format_row(row)?);
    }
    println!("{}", page_footer(page_index, &page));
    Ok(())
}

pub async fn show(id: &Id, page_index: u64, conf: &Conf) -> Result<()> {
    let api = session_client(conf)?;
    let execution = api.execution(id).await?;
    println!(
        "{}",
        format_row(&ExecutionRow {
            elapsed: elapsed_label(&execution, OffsetDateTime::now_utc()),
            record: execution,
        })?
    );
    let results = api
        .execution_results(id, page_index, DEFAULT_PAGE_SIZE)
        .await?;
    for place in &results.data {
        println!("{}", super::places::format_place(place));
    }
    println!("{}", page_footer(page_index, &results));
    Ok(())
}

pub async fn categories(conf: &Conf) -> Result<()> {
    for category in session_client(conf)?.categories().await? {
        println!("{category}");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchInput {
    Next,
    Previous,
    Refresh,
    /// 0 based
    Page(u64),
    PageSize(u64),
    Quit,
}

fn parse_watch_input(line: &str) -> Option<WatchInput> {
    let line = line.trim();
    match line {
        "n" | "next" => return Some(WatchInput::Next),
        "p" | "prev" => return Some(WatchInput::Previous),
        "r" | "refresh" => return Some(WatchInput::Refresh),
        "q" | "quit" => return Some(WatchInput::Quit),
        _ => {}
    }
    if let Some(size) = line.strip_prefix("s ") {
        return match size.trim().parse::<u64>() {
            Ok(size) if size > 0 => Some(WatchInput::PageSize(size)),
            _ => None,
        };
    }
    match line.parse::<u64>() {
        Ok(page) if page > 0 => Some(WatchInput::Page(page - 1)),
        _ => None,
    }
}

/// Target page for `input`, `None` when the input doesn't navigate or the
/// page is out of range.
fn target_page(input: WatchInput, snapshot: &ExecutionsSnapshot) -> Option<u64> {
    let last = snapshot.total_pages.max(1) - 1;
    match input {
        WatchInput::Next if snapshot.page_index < last => Some(snapshot.page_index + 1),
        WatchInput::Previous if snapshot.page_index > 0 => Some(snapshot.page_index - 1),
        WatchInput::Page(page) if page <= last => Some(page),
        _ => None,
    }
}

/// Keeps the list on screen until `q` or Ctrl+C, redrawing on every change.
pub async fn watch(page_index: u64, page_size: u64, conf: &Conf) -> Result<()> {
    let mut view = ExecutionsView::new(session_client(conf)?, page_size);
    let mut changes = view.subscribe();
    view.open(conf.poll_interval).await?;
    if page_index > 0 {
        view.go_to_page(page_index).await?;
    }
    info!(poll_interval = ?conf.poll_interval, "Watching executions");
    draw(&view.snapshot())?;
    let mut lines = BufReader::new(stdin()).lines();
    while view.is_open() {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&view.snapshot())?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed, keep refreshing until Ctrl+C
                    ctrl_c().await?;
                    break;
                };
                let Some(input) = parse_watch_input(&line) else {
                    eprintln!("Unknown input: {}", line.trim());
                    continue;
                };
                let res = match input {
                    WatchInput::Quit => break,
                    WatchInput::Refresh => view.refresh().await,
                    WatchInput::PageSize(size) => view.set_page_size(size).await,
                    _ => match target_page(input, &view.snapshot()) {
                        Some(page) => view.go_to_page(page).await,
                        None => continue,
                    },
                };
                if let Err(e) = res {
                    warn!(error = %e, "Failed to load executions");
                }
            }
            _ = ctrl_c() => break,
        }
    }
    view.close();
    Ok(())
}

fn draw(snapshot: &ExecutionsSnapshot) -> Result<()> {
    // clear screen, cursor home
    print!("\x1B[2J\x1B[H");
    if let Some(error) = &snapshot.error {
        println!("Error: {error}");
    }
    for row in &snapshot.rows {
        println!("{}", format_row(row)?);
    }
    let status = if snapshot.loading {
        " (loading)"
    } else if snapshot.refreshing {
        " (refreshing)"
    } else {
        ""
    };
    println!(
        "Page {} of {}, {} total{status}",
        snapshot.page_index + 1,
        snapshot.total_pages.max(1),
        snapshot.total,
    );
    println!("[n]ext [p]rev [r]efresh <page> s <size> [q]uit");
    Ok(())
}

pub fn format_row(row: &ExecutionRow) -> Result<String> {
    let record: &ExecutionRecord = &row.record;
    let mut line = format!(
        "#{} {} [{}] {} {}",
        record.id,
        record.search_term,
        record.status,
        record.location.as_deref().unwrap_or("-"),
        record.created_at.format(&Rfc3339)?,
    );
    if let Some(count) = record.result_count {
        line.push_str(&format!(" {count} results"));
    }
    if let Some(elapsed) = &row.elapsed {
        line.push_str(&format!(" {elapsed}"));
    }
    Ok(line)
}

fn page_footer<T>(page_index: u64, page: &Page<T>) -> String {
    format!(
        "Page {} of {}, {} total",
        page_index + 1,
        page.pagination.total_pages.max(1),
        page.pagination.total,
    )
}
