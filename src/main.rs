use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restaurant_db_bootstrap::{
    bootstrap,
    config::{AppConfig, OutputFormat},
    db::connect,
    report::BootstrapReport,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restaurant_db_bootstrap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(database = %config.database_name, "bootstrapping MongoDB");

    let ctx = match connect(&config).await {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("connect {} failed: {err}", config.database_name);
            return Ok(ExitCode::FAILURE);
        }
    };

    match bootstrap::run(&ctx).await {
        Ok(report) => {
            print_report(&report, config.output)?;
            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(aborted) => {
            if config.output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&aborted.report)?);
            }
            for line in aborted.report.failure_lines() {
                eprintln!("{line}");
            }
            eprintln!("{aborted}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_report(report: &BootstrapReport, output: OutputFormat) -> anyhow::Result<()> {
    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.is_success() {
        println!("{}", report.summary_line());
    }

    for line in report.failure_lines() {
        eprintln!("{line}");
    }
    Ok(())
}
