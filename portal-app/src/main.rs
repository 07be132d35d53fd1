use anyhow::Result;
use clap::Parser;
use portal_common::observability::init_logging;
use portal_config::{PortalConfig, PortalConfigLoader};

use cli::{Cli, Cmd};
use wiring::build_from_config;

mod actions;
mod cli;
mod command;
mod render;
mod shell;
mod wiring;

const DEFAULT_CONFIG_FILE: &str = "portal.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // 1) Load config (env wins)
    let loader = match &args.config {
        Some(path) => PortalConfigLoader::new().with_file(path),
        None => PortalConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: PortalConfig = loader.load()?;

    // 2) Logging from the loaded config
    let log_path = init_logging(cfg.logging.to_log_config())?;
    tracing::info!(log=%log_path.display(), "portal.start");

    let mut portal = build_from_config(cfg)?;
    let json = args.json;

    match args.command {
        Cmd::Search { query } => actions::search(&mut portal, &query.join(" "), json).await,
        Cmd::Suggest { text } => actions::suggest(&portal, &text.join(" "), json).await,
        Cmd::News => actions::news(&portal, json).await,
        Cmd::Quota => actions::quota(&portal, json),
        Cmd::Shortcuts { action } => actions::shortcuts(&portal, action, json).await,
        Cmd::Link { url, tag } => {
            actions::link(&portal, &url, tag.as_deref());
            Ok(())
        }
        Cmd::Shell => shell::run(&mut portal, json).await,
    }
}
