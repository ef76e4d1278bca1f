use std::path::PathBuf;

use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $STAFFPLAN_CONFIG
  3) XDG default: ~/.config/staffplan/client.yaml
"#;

#[derive(Debug, Parser)]
#[command(
    name = "staffplan-client",
    version,
    about = "Terminal client for the StaffPlan scheduling server",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Without a subcommand, runs `watch`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the server and save the token in the config file
    Login {
        /// Server URL (e.g., http://127.0.0.1:5000). Falls back to config or prompt.
        #[arg(long)]
        server: Option<String>,
        /// Account email. Falls back to prompt.
        #[arg(long)]
        email: Option<String>,
    },
    /// Print scheduled tasks with live status, progress and countdown
    Agenda {
        /// Only this employee's tasks (admins only; employees always see their own)
        #[arg(long)]
        employee_id: Option<i32>,
    },
    /// Print your generic tasks
    Tasks,
    /// Keep the agenda up to date and report status changes
    Watch {
        #[arg(long)]
        employee_id: Option<i32>,
    },
}
