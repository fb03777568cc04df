use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the pressroom binary.
#[derive(Debug, Parser)]
#[command(name = "pressroom", version, about = "Pressroom blog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PRESSROOM_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Register a user and print a bearer token for it.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
    /// Issue a fresh bearer token for an existing user.
    #[command(name = "issue-token")]
    IssueToken(IssueTokenArgs),
    /// Seed sample categories, tags, an admin account and posts.
    #[command(name = "init-data")]
    InitData(InitDataArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the public base URL used for feed permalinks.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Username for the new account.
    #[arg(value_name = "USERNAME")]
    pub username: String,

    /// Grant staff capabilities.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub staff: bool,
}

#[derive(Debug, Args, Clone)]
pub struct IssueTokenArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Existing account to issue the token for.
    #[arg(value_name = "USERNAME")]
    pub username: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct InitDataArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}
