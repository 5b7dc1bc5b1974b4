use super::session_client;
use crate::{
    conf::Conf,
    dashboard::{self, DashboardStats},
    Result,
};

pub async fn run(conf: &Conf) -> Result<()> {
    let stats = dashboard::load(&session_client(conf)?).await?;
    print!("{}", render(&stats));
    Ok(())
}

fn render(stats: &DashboardStats) -> String {
    let mut out = format!(
        "Leads: {}\nExecutions: {}\nActive: {}\nSuccess rate: {:.1}%\n",
        stats.total_leads, stats.total_executions, stats.active_processes, stats.chart.success_rate,
    );
    if !stats.recent_executions.is_empty() {
        out.push_str("Recent:\n");
    }
    for execution in &stats.recent_executions {
        out.push_str(&format!(
            "  #{} {} [{}]\n",
            execution.id, execution.search_term, execution.status
        ));
    }
    out
}
