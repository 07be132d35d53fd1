//! Search side of the portal.
//!
//! - Quota-aware dispatcher over a pool of search credentials (`dispatcher`)
//! - Per-credential daily counters persisted in a key-value store (`quota`)
//! - Custom search JSON API wire types and page fetch (`cse`)
//! - Autocomplete suggestions with a hard timeout (`suggest`)
//! - Referral tagging for outbound links (`links`)

pub mod cache;
pub mod credential;
pub mod cse;
pub mod dispatcher;
pub mod links;
pub mod quota;
pub mod suggest;

pub use credential::{Credential, CredentialUsage};
pub use cse::types::{SearchResult, flatten_pages};
pub use dispatcher::{SearchDispatcher, SearchError, normalize_query};
pub use links::with_referral;
pub use suggest::{SuggestionFetcher, wants_suggestions};
