//! Tradepost CLI - marketplace API from the terminal
//!
//! Signs in, browses listings and issues raw API calls against the
//! configured backend. The session token is kept in the same file the
//! client library uses, so it survives between invocations.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tradepost_api_client::ApiError;
use tradepost_telemetry::{LogFormat, TelemetryConfig};

mod commands;
mod output;

use commands::{auth, listings, request, token};
use output::OutputFormat;

/// Exit status for requests that hit the client timeout (matches `timeout(1)`)
const EXIT_TIMEOUT: u8 = 124;

/// Command-line client for the Tradepost marketplace
#[derive(Parser)]
#[command(name = "tradepost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log line format on stderr (compact, json)
    #[arg(long, global = true, default_value = "compact", env = "TRADEPOST_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TRADEPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TRADEPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Revoke the session and forget the local token
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse and manage listings
    Listings {
        #[command(subcommand)]
        command: ListingsCommand,
    },

    /// Send a raw request and print the JSON response
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Path relative to the API base URL
        path: String,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Inspect or change the locally stored session token
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

#[derive(Subcommand)]
enum ListingsCommand {
    /// List listings
    List {
        /// Page number
        #[arg(short, long)]
        page: Option<u32>,

        /// Listings per page
        #[arg(long)]
        per_page: Option<u32>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Only listings for this game
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Show a single listing
    Show {
        /// Listing ID
        id: u64,
    },

    /// Delete one of your listings
    Delete {
        /// Listing ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Print the stored token
    Show,

    /// Store a token (e.g. one issued by the web app)
    Set {
        /// Bearer token
        value: String,
    },

    /// Remove the stored token
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::verbose()
    } else {
        TelemetryConfig::default()
    }
    .with_format(cli.log_format);
    if let Err(e) = tradepost_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let format = cli.format;
    let result = match cli.command {
        Commands::Login { email, password } => auth::login(&email, &password, format).await,

        Commands::Register { name, email, password } => {
            auth::register(&name, &email, &password, format).await
        }

        Commands::Logout => auth::logout(format).await,

        Commands::Whoami => auth::whoami(format).await,

        Commands::Listings { command } => match command {
            ListingsCommand::List { page, per_page, search, game } => {
                listings::list(page, per_page, search, game, format).await
            }
            ListingsCommand::Show { id } => listings::show(id, format).await,
            ListingsCommand::Delete { id } => listings::delete(id, format).await,
        },

        Commands::Request { method, path, data } => {
            request::run(&method, &path, data.as_deref()).await
        }

        Commands::Token { command } => match command {
            TokenCommand::Show => token::show(format),
            TokenCommand::Set { value } => token::set(&value, format),
            TokenCommand::Clear => token::clear(format),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            report_details(&e, format)
        }
    }
}

/// Print field errors for validation failures, a machine-readable report for
/// storage failures under `--format json`, and pick the exit status
fn report_details(error: &anyhow::Error, format: OutputFormat) -> ExitCode {
    if let Some(core_error) = error.downcast_ref::<tradepost_core::Error>() {
        if format == OutputFormat::Json {
            if let Err(e) = output::print_json(&core_error.to_report()) {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        return ExitCode::FAILURE;
    }

    let Some(api_error) = error.downcast_ref::<ApiError>() else {
        return ExitCode::FAILURE;
    };

    if let Some(errors) = api_error.validation_errors() {
        for field in errors.keys() {
            for message in api_error.field_errors(field) {
                eprintln!("  {} {}", format!("{field}:").dimmed(), message);
            }
        }
    }

    if api_error.is_timeout() {
        ExitCode::from(EXIT_TIMEOUT)
    } else {
        ExitCode::FAILURE
    }
}
