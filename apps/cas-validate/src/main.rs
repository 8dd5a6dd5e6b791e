//! Command-line front end for the CAS consumer.
//!
//! Validates a service ticket against the configured provider and prints the
//! resolved local user as JSON. Users come from the in-memory static store,
//! so this is a tool for checking provider integration, not a login server.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cas_consumer::CasConsumer;
use cas_consumer::domain::{BroadcastSubscriber, safe_redirect_target};
use cas_consumer_sdk::{CasEvent, CasEventSubscriber};
use clap::{Parser, Subcommand};
use static_user_store_plugin::StaticUserStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "cas-validate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `cas_consumer=debug`
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a service ticket and print the resolved user
    Validate {
        #[arg(short, long)]
        ticket: String,

        /// Service URL the ticket was issued for; defaults to the configured service
        #[arg(short, long)]
        service: Option<String>,
    },

    /// Print the provider login URL
    LoginUrl {
        #[arg(short, long)]
        service: Option<String>,
    },

    /// Print where a logout should redirect to
    LogoutUrl {
        #[arg(short, long)]
        next: String,
    },

    /// Print the post-login redirect target allowed for a request
    RedirectTarget {
        /// Requested redirect, usually the `next` query parameter
        #[arg(long, default_value = "")]
        requested: String,

        /// Host header of the incoming request
        #[arg(long)]
        host: String,

        #[arg(long, default_value = "/")]
        default: String,
    },
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    let cfg = config::load(cli.config.as_deref())?;
    let store = Arc::new(StaticUserStore::from_config(&cfg.static_user_store));
    let events = Arc::new(BroadcastSubscriber::new(16));
    let mut rx = events.subscribe();
    let subscribers: Vec<Arc<dyn CasEventSubscriber>> = vec![events];

    let module = CasConsumer::init(&cfg.cas_consumer, store, subscribers)
        .context("failed to initialize CAS consumer")?;

    match cli.command {
        Commands::Validate { ticket, service } => {
            let service = service
                .or_else(|| cfg.cas_consumer.service.clone())
                .context("no --service given and no default service configured")?;

            let Some(user) = module.client().authenticate(&ticket, &service).await? else {
                warn!("Ticket was not validated");
                return Ok(ExitCode::from(2));
            };

            while let Ok(event) = rx.try_recv() {
                if let CasEvent::MergeCandidates { primary, others } = &event {
                    info!(
                        primary = %primary.username,
                        others = ?others.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
                        "Merge candidates"
                    );
                }
            }

            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::LoginUrl { service } => {
            let url = match service {
                Some(service) => module.redirects().login_url(&service),
                None => module.redirects().default_login_url()?,
            };
            println!("{url}");
        }
        Commands::LogoutUrl { next } => {
            println!("{}", module.redirects().logout_url(&next));
        }
        Commands::RedirectTarget {
            requested,
            host,
            default,
        } => {
            println!("{}", safe_redirect_target(&requested, &host, &default));
        }
    }

    Ok(ExitCode::SUCCESS)
}
