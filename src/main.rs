mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snap_tracking::TrackingConfig;

#[derive(Parser)]
#[command(name = "snap-tracking")]
#[command(about = "Track running snap applications in transient systemd scopes")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move this process into a new tracking scope
    Track {
        /// Application identifier (e.g., "pkg.app")
        app: String,
    },

    /// Check that this process runs as the application's systemd service
    ConfirmService {
        /// Application identifier
        app: String,
    },

    /// Show the tracking cgroup of a process
    Cgroup {
        /// Process id (defaults to this process)
        #[arg(long)]
        pid: Option<u32>,
    },

    /// Check whether another process of a snap is being tracked
    IsTracking {
        /// Snap name
        snap: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = TrackingConfig::from_env();

    let result = match args.command {
        Command::Track { app } => commands::track(&config, &app).map(|()| ExitCode::SUCCESS),
        Command::ConfirmService { app } => {
            commands::confirm_service(&config, &app).map(|()| ExitCode::SUCCESS)
        }
        Command::Cgroup { pid } => commands::cgroup(&config, pid).map(|()| ExitCode::SUCCESS),
        // "no" is not an error, but scripts test the status
        Command::IsTracking { snap } => commands::is_tracking(&config, &snap)
            .map(|tracking| if tracking { ExitCode::SUCCESS } else { ExitCode::from(1) }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
