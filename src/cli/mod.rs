use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_accounts")]
#[command(about = "Account management service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        #[arg(long, env = "ACCOUNTS_CONFIG", default_value = "accounts.toml")]
        config: String,
        #[arg(long, env = "ACCOUNTS_PORT")]
        port: Option<u16>,
        #[arg(long, env = "ACCOUNTS_DB_PATH")]
        db_path: Option<String>,
        /// Keep accounts in memory only
        #[arg(long, default_value = "false")]
        ephemeral: bool,
    },
    /// Print the default configuration file
    DefaultConfig,
}
