//! One function per user-facing operation, shared by the subcommands and the
//! shell.
use anyhow::{Result, bail};
use chrono::Utc;
use portal_news::NewsFeed;
use portal_search::{SearchResult, with_referral};
use serde::Serialize;

use crate::cli::ShortcutCmd;
use crate::render;
use crate::wiring::Portal;

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

pub async fn search(portal: &mut Portal, query: &str, json: bool) -> Result<()> {
    let results: Vec<SearchResult> = portal
        .search
        .search(query)
        .await?
        .into_iter()
        .map(|mut r| {
            r.link = portal.outbound_link(&r.link);
            r
        })
        .collect();
    emit(json, &results, || render::results(&results))
}

pub async fn suggest(portal: &Portal, text: &str, json: bool) -> Result<()> {
    let items = portal.suggest.get_suggestions(text).await;
    emit(json, &items, || render::suggestions(&items))
}

pub async fn news(portal: &Portal, json: bool) -> Result<()> {
    let mut feed = NewsFeed::new();
    feed.refresh(&portal.news).await;
    emit(json, &feed, || render::news(&feed, Utc::now()))
}

pub fn quota(portal: &Portal, json: bool) -> Result<()> {
    let usage = portal.search.usage();
    emit(json, &usage, || render::usage(&usage, portal.search.daily_cap()))
}

pub fn link(portal: &Portal, url: &str, tag: Option<&str>) {
    let out = match tag {
        Some(tag) => with_referral(url, tag),
        None => portal.outbound_link(url),
    };
    println!("{out}");
}

pub async fn shortcuts(portal: &Portal, action: ShortcutCmd, json: bool) -> Result<()> {
    let mut book = portal.shortcuts()?;
    match action {
        ShortcutCmd::List => {}
        ShortcutCmd::Add { url, key } => {
            book.add(&url, &key)?;
        }
        ShortcutCmd::Edit {
            index,
            name,
            url,
            key,
        } => book.edit(index, &name, &url, &key)?,
        ShortcutCmd::Delete { index } => {
            let removed = book.delete(index)?;
            tracing::debug!(name=%removed.name, "portal.shortcut_removed");
        }
        ShortcutCmd::Open { key } => {
            let Some(found) = book.find_by_key(key) else {
                bail!("no shortcut bound to '{key}'");
            };
            println!("{}", found.url);
            return Ok(());
        }
        ShortcutCmd::Icons => {
            let resolved = book.resolve_icons(&portal.icons).await?;
            tracing::info!(resolved, "portal.icons");
        }
    }
    let list = book.shortcuts();
    emit(json, &list, || render::shortcuts(list))
}
