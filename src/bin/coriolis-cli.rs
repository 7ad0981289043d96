use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use coriolis_client::config::{load_config, ClientConfig};
use coriolis_client::nav::MemoryNavigator;
use coriolis_client::notify::TracingSink;
use coriolis_client::observability::logging::init_logging;
use coriolis_client::session::MemorySession;
use coriolis_client::transport::HttpTransport;
use coriolis_client::{RequestError, RequestOptions, RequestPipeline};

#[derive(Parser)]
#[command(name = "coriolis-cli")]
#[command(about = "Diagnostic CLI for the Coriolis API client", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the config file.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Project to scope requests to.
    #[arg(short, long)]
    project: Option<String>,

    /// Keystone token sent as X-Auth-Token.
    #[arg(short, long)]
    token: Option<String>,

    /// Dump the diagnostic request log after the call.
    #[arg(long)]
    show_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource path
    Get {
        /// Absolute URL or backend-relative path (e.g. /replicas)
        path: String,
        /// Serve from and populate the response cache
        #[arg(long)]
        cached: bool,
        /// Suppress the failure alert
        #[arg(long)]
        quiet: bool,
    },
    /// POST a JSON body to a resource path
    Post {
        /// Absolute URL or backend-relative path
        path: String,
        /// JSON body
        data: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging("coriolis_client=info");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load config: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ClientConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    let transport = match HttpTransport::new(Duration::from_secs(config.request_timeout_secs)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Error: failed to build HTTP transport: {e}");
            return ExitCode::FAILURE;
        }
    };

    let session = match &cli.project {
        Some(project) => MemorySession::with_project(project.clone()),
        None => MemorySession::new(),
    };

    let pipeline = RequestPipeline::new(
        &config,
        Arc::new(transport),
        Arc::new(session),
        Arc::new(MemoryNavigator::new()),
        Arc::new(TracingSink),
    );
    if let Some(token) = &cli.token {
        pipeline.set_default_header("X-Auth-Token", Some(token));
    }

    let result = match &cli.command {
        Commands::Get {
            path,
            cached,
            quiet,
        } => {
            let mut options = RequestOptions::new(path);
            if *cached {
                options = options.cached();
            }
            if *quiet {
                options = options.quiet_error();
            }
            pipeline.send(options).await
        }
        Commands::Post { path, data } => {
            let body: Value = match serde_json::from_str(data) {
                Ok(body) => body,
                Err(e) => {
                    eprintln!("Error: body is not valid JSON: {e}");
                    return ExitCode::FAILURE;
                }
            };
            pipeline
                .send(
                    RequestOptions::new(path)
                        .method(reqwest::Method::POST)
                        .data(body),
                )
                .await
        }
    };

    let exit = match result {
        Ok(response) => {
            print_body(&response.data.to_json_value());
            ExitCode::SUCCESS
        }
        Err(RequestError::Server(response)) => {
            eprintln!("Error: server returned {} {}", response.status, response.status_text);
            print_body(&response.data.to_json_value());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    };

    if cli.show_log {
        match serde_json::to_string_pretty(&pipeline.request_log().entries()) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => eprintln!("Error: failed to render request log: {e}"),
        }
    }

    exit
}

fn print_body(body: &Value) {
    match serde_json::to_string_pretty(body) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{body}"),
    }
}
