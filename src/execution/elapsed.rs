use super::{ExecutionRecord, ExecutionStatus};
use time::OffsetDateTime;

/// `M:SS` since `started_at`. Minutes are not wrapped into hours, a start in
/// the future reads `0:00`.
pub fn format_elapsed(started_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let secs = (now - started_at).whole_seconds().max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Elapsed counter shown next to running executions only.
pub fn elapsed_label(record: &ExecutionRecord, now: OffsetDateTime) -> Option<String> {
    match record.status {
        ExecutionStatus::Running => Some(format_elapsed(record.created_at, now)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::{elapsed_label, format_elapsed};
    use crate::{execution::ExecutionStatus, test::mock_execution};
    use time::{macros::datetime, Duration};

    #[test]
    fn formats_minutes_and_seconds() {
        let start = datetime!(2025-01-01 10:00 UTC);
        assert_eq!("2:05", format_elapsed(start, start + Duration::seconds(125)));
        assert_eq!("0:00", format_elapsed(start, start));
        assert_eq!("0:59", format_elapsed(start, start + Duration::milliseconds(59_999)));
        assert_eq!("75:03", format_elapsed(start, start + Duration::seconds(75 * 60 + 3)));
        assert_eq!("0:00", format_elapsed(start, start - Duration::seconds(30)));
    }

    #[test]
    fn only_running_records() {
        let now = datetime!(2025-01-01 10:02:05 UTC);
        let mut record = mock_execution(1, ExecutionStatus::Running, datetime!(2025-01-01 10:00 UTC));
        assert_eq!(Some("2:05".to_string()), elapsed_label(&record, now));
        for status in [
            ExecutionStatus::Queued,
            ExecutionStatus::Finished,
            ExecutionStatus::Failed,
            ExecutionStatus::Unknown,
        ] {
            record.status = status;
            assert_eq!(None, elapsed_label(&record, now));
        }
    }
}
