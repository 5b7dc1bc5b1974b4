use crate::{api::ApiClient, conf::Conf, Error, Result};
use clap::Args;
use tracing::info;

#[derive(Debug, Args)]
pub struct Credentials {
    pub username: String,

    #[arg(env = "LEADSCOUT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            Err(Error::Cli("Username and password can't be empty".into()))?
        }
        Ok(())
    }
}

pub async fn login(credentials: &Credentials, conf: &Conf) -> Result<()> {
    credentials.validate()?;
    let session = ApiClient::from_conf(conf)?
        .login(credentials.username.trim(), &credentials.password)
        .await?;
    info!(username = %credentials.username, "Logged in");
    // meant to be exported as LEADSCOUT_TOKEN
    println!("{}", session.token);
    Ok(())
}

pub async fn register(credentials: &Credentials, conf: &Conf) -> Result<()> {
    credentials.validate()?;
    let session = ApiClient::from_conf(conf)?
        .register(credentials.username.trim(), &credentials.password)
        .await?;
    info!(username = %credentials.username, "Registered");
    println!("{}", session.token);
    Ok(())
}
