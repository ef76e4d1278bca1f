use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Server options can also be provided via environment variables:
  CONFIG_PATH    (default: ./config.yaml)
  DB_PATH        (default: data/staffplan.db, or :memory:)
  SEED_ON_EMPTY  (default: false)
  JWT_SECRET     (default: random per process)
  PORT           (default: 5000 or config.listen_port)
"#;

#[derive(Debug, Parser)]
#[command(
    name = "staffplan-server",
    version,
    about = "StaffPlan scheduling server",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Optional subcommand. Without one, runs the server.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an admin account unless the email is already registered
    CreateAdmin {
        #[arg(long, default_value = "System Admin")]
        name: String,
        #[arg(long, default_value = "admin@system.com")]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Insert demo employees and scheduled tasks into an empty database
    Seed,
}
