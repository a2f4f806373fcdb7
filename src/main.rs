use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use casal_login::config::LoginConfig;
use casal_login::error::LoginError;
use casal_login::login::LoginController;
use casal_login::navigation::{AlertSink, Navigator, Route};
use casal_login::onboarding::RouteDecision;

/// The password is read as a plain stdin line and echoes on the terminal.
const PASSWORD_PROMPT: &str = "Password (visible): ";

/// Prints navigation changes to stdout.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn reset_to(&self, route: Route) {
        println!("→ {route}");
    }

    fn navigate(&self, route: Route) {
        println!("+ {route}");
    }
}

/// Prints alerts to stderr.
struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("[{title}] {message}");
    }
}

async fn prompt<R>(lines: &mut tokio::io::Lines<R>, label: &str) -> anyhow::Result<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut stderr = tokio::io::stderr();
    stderr.write_all(label.as_bytes()).await?;
    stderr.flush().await?;
    let line = lines
        .next_line()
        .await
        .with_context(|| format!("reading {}", label.trim_end_matches([':', ' '])))?
        .unwrap_or_default();
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = LoginConfig::from_env().context("loading login configuration")?;
    tracing::info!(
        project = %config.project_id,
        policy = %config.lookup_failure_policy,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting casal-login v{}",
        env!("CARGO_PKG_VERSION")
    );

    let controller =
        LoginController::from_config(&config, Arc::new(ConsoleNavigator), Arc::new(ConsoleAlerts))
            .context("building login controller")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let email = prompt(&mut lines, "Email: ").await?;
    let password = prompt(&mut lines, PASSWORD_PROMPT).await?;

    let outcome = controller.submit(&email, &password).await;
    if let Err(e) = &outcome {
        tracing::debug!(error = %e, "Exiting after failed login");
    }
    Ok(exit_code(&outcome))
}

fn exit_code(outcome: &Result<RouteDecision, LoginError>) -> ExitCode {
    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
