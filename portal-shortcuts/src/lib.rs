//! User-defined site shortcuts, each bound to a single key.
//!
//! The list is persisted as a JSON array under the `shortcuts` key of a
//! [`KeyValueStore`]. Every mutation writes the whole list back; a failed
//! write leaves the in-memory list untouched.
pub mod icons;

use std::sync::Arc;

use futures::future::join_all;
use portal_store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use url::Url;

pub use icons::IconResolver;

pub const SHORTCUTS_KEY: &str = "shortcuts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    pub name: String,
    pub url: String,
    pub shortcut_key: String,
    /// Empty until resolved.
    #[serde(default)]
    pub icon_url: String,
}

impl Shortcut {
    fn new(name: &str, url: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            shortcut_key: key.to_string(),
            icon_url: String::new(),
        }
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("key '{0}' is already bound to another shortcut")]
    KeyCollision(String),
    #[error("shortcut key must be a single character, got '{0}'")]
    InvalidKey(String),
    #[error("invalid shortcut URL '{0}'")]
    InvalidUrl(String),
    #[error("no shortcut at position {0}")]
    NotFound(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode shortcuts: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut::new("YouTube", "https://youtube.com", "y"),
        Shortcut::new("X", "https://x.com", "x"),
    ]
}

/// Prefix `https://` unless the input already names an http(s) scheme.
pub fn normalize_url(raw: &str) -> Result<String, ShortcutError> {
    let raw = raw.trim();
    let formatted = if raw.to_ascii_lowercase().starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    match Url::parse(&formatted) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(formatted),
        _ => Err(ShortcutError::InvalidUrl(raw.to_string())),
    }
}

/// Lower-case form of one key character. Multi-char expansions (`'İ'` to
/// `"i\u{307}"`) keep only the first char so a key stays a single char.
fn fold_key(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn same_key(stored: &str, key: &str) -> bool {
    stored.chars().map(fold_key).eq(key.chars().map(fold_key))
}

/// Trim and lower-case a key; exactly one character must remain.
pub fn normalize_key(raw: &str) -> Result<String, ShortcutError> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(fold_key(c).to_string()),
        _ => Err(ShortcutError::InvalidKey(raw.to_string())),
    }
}

/// Display name from a URL: host without a leading `www.`, up to the first dot.
pub fn name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split('.').next().map(str::to_string)
}

pub struct ShortcutBook {
    store: Arc<dyn KeyValueStore>,
    shortcuts: Vec<Shortcut>,
}

impl ShortcutBook {
    /// Read the persisted list; nothing stored yields the defaults.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, ShortcutError> {
        let shortcuts = match store.get(SHORTCUTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => default_shortcuts(),
        };
        Ok(Self { store, shortcuts })
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    pub fn get(&self, index: usize) -> Option<&Shortcut> {
        self.shortcuts.get(index)
    }

    /// Case-insensitive lookup by bound key.
    pub fn find_by_key(&self, key: char) -> Option<&Shortcut> {
        let wanted = key.to_string();
        self.shortcuts
            .iter()
            .find(|s| same_key(&s.shortcut_key, &wanted))
    }

    fn key_taken(&self, key: &str, except: Option<usize>) -> bool {
        self.shortcuts
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != except && same_key(&s.shortcut_key, key))
    }

    fn commit(&mut self, next: Vec<Shortcut>) -> Result<(), ShortcutError> {
        let raw = serde_json::to_string(&next)?;
        self.store.set(SHORTCUTS_KEY, &raw)?;
        self.shortcuts = next;
        Ok(())
    }

    pub fn add(&mut self, url: &str, key: &str) -> Result<&Shortcut, ShortcutError> {
        let key = normalize_key(key)?;
        if self.key_taken(&key, None) {
            return Err(ShortcutError::KeyCollision(key));
        }
        let url = normalize_url(url)?;
        let name = name_from_url(&url).ok_or_else(|| ShortcutError::InvalidUrl(url.clone()))?;

        let mut next = self.shortcuts.clone();
        next.push(Shortcut::new(&name, &url, &key));
        self.commit(next)?;
        tracing::info!(%name, %key, "shortcuts.added");
        Ok(&self.shortcuts[self.shortcuts.len() - 1])
    }

    /// Replace the entry at `index`. Its icon is cleared so it gets resolved
    /// again.
    pub fn edit(
        &mut self,
        index: usize,
        name: &str,
        url: &str,
        key: &str,
    ) -> Result<(), ShortcutError> {
        if index >= self.shortcuts.len() {
            return Err(ShortcutError::NotFound(index));
        }
        let key = normalize_key(key)?;
        if self.key_taken(&key, Some(index)) {
            return Err(ShortcutError::KeyCollision(key));
        }
        let url = normalize_url(url)?;

        let mut next = self.shortcuts.clone();
        next[index] = Shortcut::new(name.trim(), &url, &key);
        self.commit(next)?;
        tracing::info!(index, %key, "shortcuts.edited");
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<Shortcut, ShortcutError> {
        if index >= self.shortcuts.len() {
            return Err(ShortcutError::NotFound(index));
        }
        let mut next = self.shortcuts.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        tracing::info!(index, name=%removed.name, "shortcuts.deleted");
        Ok(removed)
    }

    /// Fill in every missing icon and persist. Returns how many were resolved.
    pub async fn resolve_icons(&mut self, icons: &IconResolver) -> Result<usize, ShortcutError> {
        let pending: Vec<(usize, String)> = self
            .shortcuts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.icon_url.is_empty())
            .filter_map(|(i, s)| s.host().map(|h| (i, h)))
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let resolved = join_all(pending.iter().map(|(_, host)| icons.resolve(host))).await;

        let mut next = self.shortcuts.clone();
        for ((index, _), icon) in pending.iter().zip(resolved) {
            next[*index].icon_url = icon;
        }
        self.commit(next)?;
        tracing::debug!(count = pending.len(), "shortcuts.icons_resolved");
        Ok(pending.len())
    }
}
