pub use error::Error;
mod api;
mod area;
mod command;
mod conf;
mod dashboard;
mod error;
mod execution;
mod geocoding;
mod place;
mod task;
#[cfg(test)]
mod test;
use clap::Parser;
use command::Cli;
use conf::Conf;
use tracing_subscriber::EnvFilter;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    let conf = Conf::from_env()?;
    command::run(cli, &conf).await
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries command output
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if cfg!(debug_assertions) {
        builder.init();
    } else {
        builder.json().init();
    }
}
