//! Line-oriented loop over stdin. One [`Portal`] lives for the whole session
//! so the search cache and credential cursor carry across queries.
use std::io::Write;

use anyhow::Result;
use portal_search::wants_suggestions;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::actions;
use crate::command::{Command, HELP, parse_command};
use crate::wiring::Portal;

fn prompt() -> Result<()> {
    let mut out = std::io::stdout();
    write!(out, "portal> ")?;
    out.flush()?;
    Ok(())
}

pub async fn run(portal: &mut Portal, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("{HELP}");
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let outcome = match parse_command(&line) {
            Command::Empty => Ok(()),
            Command::Search(q) => actions::search(portal, &q, json).await,
            Command::Suggest(text) if wants_suggestions(&text) => {
                actions::suggest(portal, &text, json).await
            }
            Command::Suggest(_) => {
                println!("type at least 2 characters and at most 3 words");
                Ok(())
            }
            Command::News => actions::news(portal, json).await,
            Command::Quota => actions::quota(portal, json),
            Command::Help => {
                print!("{HELP}");
                Ok(())
            }
            Command::Quit => break,
            Command::Unknown(s) => {
                println!("unknown command: {s} (try /help)");
                Ok(())
            }
        };
        if let Err(err) = outcome {
            tracing::warn!(error=%err, "portal.shell.command_failed");
            println!("error: {err}");
        }
    }
    tracing::info!(cached = portal.search.cached_queries(), "portal.shell.exit");
    Ok(())
}
