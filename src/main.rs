//! # shiftboard
//!
//! Shift scheduling backend: administrators post shifts, workers submit availability,
//! administrators accept workers and finalize the calendar.

#![deny(
    clippy::undocumented_unsafe_blocks,
    clippy::missing_safety_doc,
    reason = "multi-person projects should document dangers"
)]
#![warn(missing_docs)]
#![cfg_attr(
    not(any(test, debug_assertions)),
    deny(
        clippy::missing_panics_doc,
        clippy::panic,
        clippy::unimplemented,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "prefer errors over panicking"
    )
)]
#![cfg_attr(
    not(any(test, debug_assertions)),
    forbid(clippy::todo, reason = "production code should not use `todo`")
)]

use clap::{
    Parser,
    builder::{Styles, styling::AnsiColor},
};
use config::Config;
use integration::App;
use miette::{LabeledSpan, Result, Severity, miette};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use store::{MemoryStore, Store};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod data;
pub mod integration;
pub mod store;
pub mod workflow;

const STYLE: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightCyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default());

/// Shift scheduling server
#[derive(Debug, Parser)]
#[command(version, propagate_version = true, about, long_about = None, styles = STYLE, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// Read settings from a TOML file; flags override it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on [default: 127.0.0.1:3000]
    #[arg(short, long, value_name = "HOST:PORT")]
    addr: Option<SocketAddr>,

    /// Keep shifts in this JSON file instead of only in memory
    #[arg(short, long, value_name = "PATH", env = "SHIFTBOARD_DATA")]
    data: Option<PathBuf>,

    /// Require this password for administrative requests
    #[arg(long, value_name = "PASSWORD", env = "SHIFTBOARD_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Log filter used when `RUST_LOG` is not set [default: info]
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

impl Cli {
    /// Layer the flags that were given over `config`.
    fn apply(self, mut config: Config) -> Config {
        let Cli {
            config: _,
            addr,
            data,
            admin_password,
            log,
        } = self;
        if let Some(addr) = addr {
            config.addr = addr;
        }
        if data.is_some() {
            config.data = data;
        }
        if admin_password.is_some() {
            config.admin_password = admin_password;
        }
        if let Some(log) = log {
            config.log = log;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(x) => Ok(x),
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => {
            return e.print().map_err(miette::Error::from_err);
        }
        Err(e) => Err(miette::Error::from_err(e)),
    }?;

    let config = Config::load(cli.config.as_deref())?;
    let config = cli.apply(config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log)),
        )
        .init();

    let store: Arc<dyn Store> = match &config.data {
        Some(path) => Arc::new(MemoryStore::open(path).map_err(|e| {
            let source = path.display().to_string();
            miette!(
                severity = Severity::Error,
                labels = vec![LabeledSpan::at(0..source.len(), e.to_string())],
                help = "make sure the file is a shiftboard snapshot, or move it aside to start empty",
                "could not load shift data"
            )
            .with_source_code(source)
        })?),
        None => {
            tracing::warn!("no data file configured, shifts will be lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if config.admin_password().is_none() {
        tracing::warn!("no admin password configured, every request may administer shifts");
    }
    let app = App::new(store, config.admin_password().map(str::to_string));

    let server = rouille::Server::new(config.addr, move |request| app.handle(request)).map_err(|e| {
        miette!(
            severity = Severity::Error,
            help = "make sure nothing else is listening on that address",
            "could not listen on {}: {e}",
            config.addr
        )
    })?;

    tracing::info!(addr = %server.server_addr(), "listening");
    server.run();
    Ok(())
}
