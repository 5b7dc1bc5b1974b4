pub mod auth;
pub mod dashboard;
pub mod executions;
pub mod geocode;
pub mod launch;
pub mod places;

use crate::{
    api::{ApiClient, Id},
    conf::Conf,
    execution::DEFAULT_PAGE_SIZE,
    Error, Result,
};
use clap::{Parser, Subcommand};

/// Lead search dashboard client
#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(about = "Launch lead searches and follow their results", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print the session token
    Login(auth::Credentials),

    /// Create an account and print the session token
    Register(auth::Credentials),

    /// Launch a lead search over a point, circle or polygon
    Launch(launch::LaunchArgs),

    /// List executions
    Executions {
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },

    /// Show an execution and one page of its results
    Execution {
        id: Id,

        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },

    /// Keep the execution list on screen, refreshing it in the background
    ///
    /// Type n, p, r, a page number, `s <size>` or q followed by Enter to
    /// navigate while watching.
    WatchExecutions {
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
        page_size: u64,
    },

    /// List search categories known to the backend
    Categories,

    /// List leads
    Places {
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },

    /// Show a lead
    Place { id: Id },

    /// Move a lead through the pipeline (pending, client, visited, discarded)
    SetPlaceStatus {
        id: Id,

        #[arg(value_parser = places::parse_status)]
        status: crate::place::PlaceStatus,

        /// Print this page of leads once the change is accepted
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        page: Option<u64>,
    },

    /// Overwrite lead fields, values are parsed as JSON when possible
    UpdatePlace {
        id: Id,

        #[arg(required = true, value_parser = places::parse_assignment)]
        changes: Vec<(String, serde_json::Value)>,
    },

    /// Delete a lead
    DeletePlace { id: Id },

    /// Totals, success rate and the latest executions
    Dashboard,

    /// Look up coordinates for an address
    Geocode {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Look up the address label for a point
    ReverseGeocode {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

pub async fn run(cli: Cli, conf: &Conf) -> Result<()> {
    match cli.command {
        Command::Login(credentials) => auth::login(&credentials, conf).await,
        Command::Register(credentials) => auth::register(&credentials, conf).await,
        Command::Launch(args) => launch::run(&args, conf).await,
        Command::Executions { page } => executions::list(page_index(page), conf).await,
        Command::Execution { id, page } => executions::show(&id, page_index(page), conf).await,
        Command::WatchExecutions { page, page_size } => {
            executions::watch(page_index(page), page_size, conf).await
        }
        Command::Categories => executions::categories(conf).await,
        Command::Places { page } => places::list(page_index(page), conf).await,
        Command::Place { id } => places::show(&id, conf).await,
        Command::SetPlaceStatus { id, status, page } => {
            places::set_status(&id, status, page.map(page_index), conf).await
        }
        Command::UpdatePlace { id, changes } => places::update(&id, changes, conf).await,
        Command::DeletePlace { id } => places::delete(&id, conf).await,
        Command::Dashboard => dashboard::run(conf).await,
        Command::Geocode { query } => geocode::forward(&query.join(" "), conf).await,
        Command::ReverseGeocode { lat, lon } => geocode::reverse(lat, lon, conf).await,
    }
}

/// Pages are 1 based on the command line and 0 based everywhere else.
fn page_index(page: u64) -> u64 {
    page.saturating_sub(1)
}

/// Backend client for commands that need a logged in user.
pub fn session_client(conf: &Conf) -> Result<ApiClient> {
    let client = ApiClient::from_conf(conf)?;
    if !client.is_authenticated() {
        Err(Error::Unauthorized(
            "Not logged in, run `leadscout login` and export LEADSCOUT_TOKEN".into(),
        ))?
    }
    Ok(client)
}
