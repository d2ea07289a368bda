use std::time::{Duration, Instant};

use mongodb::{Client, bson::doc, options::ClientOptions};
use secrecy::ExposeSecret;

use crate::{config::AppConfig, error::BootstrapError, state::BootstrapContext};

const SLOW_PING: Duration = Duration::from_millis(500);

/// Build a client for the configured deployment.
///
/// The driver connects lazily, so an unreachable server only shows up on
/// the first command; call [`ping`] before doing any work.
pub async fn connect(config: &AppConfig) -> Result<BootstrapContext, BootstrapError> {
    let mut options = ClientOptions::parse(config.mongodb_uri.expose_secret())
        .await
        .map_err(|e| BootstrapError::Connection(format!("invalid MONGODB_URI: {e}")))?;
    options.app_name = Some(config.app_name.clone());
    options.server_selection_timeout = Some(config.timeout);
    options.connect_timeout = Some(config.timeout);

    let client = Client::with_options(options)?;
    Ok(BootstrapContext::new(client, &config.database_name)
        .with_strict_validators(config.strict_validators))
}

/// Round-trip a `ping` against the target database and return the latency.
pub async fn ping(ctx: &BootstrapContext) -> Result<Duration, BootstrapError> {
    let started = Instant::now();
    ctx.database().run_command(doc! { "ping": 1 }).await?;
    let elapsed = started.elapsed();

    if elapsed > SLOW_PING {
        tracing::warn!(
            database = %ctx.database_name,
            ms = %elapsed.as_millis(),
            "high response time from MongoDB"
        );
    } else {
        tracing::info!(
            database = %ctx.database_name,
            ms = %elapsed.as_millis(),
            "MongoDB reachable"
        );
    }

    Ok(elapsed)
}
