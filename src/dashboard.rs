use crate::{
    api::{ApiClient, Page},
    execution::{DashboardChart, ExecutionRecord, ExecutionStatus},
    place::PlaceRecord,
    Result,
};
use tokio::try_join;

const RECENT_EXECUTIONS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_leads: u64,
    pub total_executions: u64,
    pub active_processes: usize,
    pub recent_executions: Vec<ExecutionRecord>,
    pub chart: DashboardChart,
}

impl DashboardStats {
    /// Active processes are counted on the one record sample the backend
    /// returns with the totals, not across every execution.
    pub fn from_parts(
        places: Page<PlaceRecord>,
        executions: Page<ExecutionRecord>,
        recent: Page<ExecutionRecord>,
        chart: DashboardChart,
    ) -> DashboardStats {
        DashboardStats {
            total_leads: places.pagination.total,
            total_executions: executions.pagination.total,
            active_processes: executions
                .data
                .iter()
                .filter(|it| it.status == ExecutionStatus::Running)
                .count(),
            recent_executions: recent.data,
            chart,
        }
    }
}

pub async fn load(api: &ApiClient) -> Result<DashboardStats> {
    let (places, executions, recent, chart) = try_join!(
        api.places(0, 1),
        api.executions(0, 1),
        api.executions(0, RECENT_EXECUTIONS),
        api.dashboard_stats(),
    )?;
    Ok(DashboardStats::from_parts(places, executions, recent, chart))
}

#[cfg(test)]
mod test {
    use super::DashboardStats;
    use crate::{
        execution::{DashboardChart, ExecutionStatus},
        test::{mock_execution, mock_page, mock_place},
    };
    use time::macros::datetime;

    #[test]
    fn from_parts() {
        let now = datetime!(2025-01-01 00:00 UTC);
        let mut places = mock_page(vec![mock_place(1)], 40);
        places.pagination.total = 400;
        let mut executions = mock_page(vec![mock_execution(1, ExecutionStatus::Running, now)], 12);
        executions.pagination.total = 12;
        let recent = mock_page(
            vec![
                mock_execution(1, ExecutionStatus::Running, now),
                mock_execution(2, ExecutionStatus::Finished, now),
                mock_execution(3, ExecutionStatus::Failed, now),
            ],
            4,
        );
        let chart = DashboardChart {
            success_rate: 87.5,
            timeline: vec![],
        };
        let stats = DashboardStats::from_parts(places, executions, recent, chart.clone());
        assert_eq!(400, stats.total_leads);
        assert_eq!(12, stats.total_executions);
        assert_eq!(1, stats.active_processes);
        assert_eq!(3, stats.recent_executions.len());
        assert_eq!(chart, stats.chart);
    }
}
