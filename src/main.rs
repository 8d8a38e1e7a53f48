use std::process::ExitCode;

mod app;
mod cli;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod reply;
mod state;
mod users;
mod validation;

use crate::cli::{ArgsError, Outcome, Task};
use crate::state::AppState;

fn init_tracing(server: bool) {
    let default_filter = if server {
        "jobwizard=debug,axum=info,tower_http=info"
    } else {
        "jobwizard=warn"
    };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout belongs to the JSON reply
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn report(outcome: Outcome) -> ExitCode {
    println!("{}", outcome.body);
    outcome.exit_code()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::from_filename(".env_jobwizard").ok();
    dotenvy::dotenv().ok();

    let cli = match cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(ArgsError::Display(e)) => e.exit(),
        Err(ArgsError::Invalid(e)) => {
            eprint!("{}", cli::usage(None));
            return Ok(report(Outcome::failed(&e)));
        }
    };
    init_tracing(cli.server);

    if let Some(name) = &cli.taskhelp {
        print!("{}", cli::usage(Task::from_name(name)));
        return Ok(ExitCode::SUCCESS);
    }

    if cli.server {
        let state = AppState::init().await?;
        app::record_pid(&state.config)?;
        let config = state.config.clone();
        app::serve(app::build_app(state), &config).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let task = match cli.selected_task() {
        Ok(task) => task,
        Err(e) => {
            eprint!("{}", cli::usage(None));
            return Ok(report(Outcome::failed(&e)));
        }
    };

    let state = match AppState::init().await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = ?e, "database unavailable");
            return Ok(report(Outcome::error("Connection to DB failed")));
        }
    };

    Ok(report(cli::execute(&state.db, task, &cli).await))
}
