use anyhow::Result;
use clap::FromArgMatches;
use ovhcloud::commands::{self, Cli, LogLevel, Session};
use ovhcloud::config::Config;
use ovhcloud::interaction::TerminalInteraction;
use ovhcloud::version;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ovhcloud {} started with log level: {:?}", version::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ovhcloud").join("ovhcloud.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ovhcloud").join("ovhcloud.log");
    }
    PathBuf::from("ovhcloud.log")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = commands::build().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let _log_guard = setup_logging(cli.log_level);
    let notice = version::spawn_release_check();

    let config = Config::load();
    let session = Session {
        config: &config,
        interaction: &TerminalInteraction,
        stdin_piped: ovhcloud::params::stdin_is_piped(),
    };

    let code = match commands::run(&matches, &session).await {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("🛑 {}", ovhcloud::ovh::format_api_error(&err));
            ExitCode::FAILURE
        }
    };

    if let Some(message) = notice.get() {
        eprintln!("{message}");
    }

    Ok(code)
}
