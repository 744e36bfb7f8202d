//! Title resolution for user requests.
//!
//! A request is matched against catalog keys in two stages. The first
//! stage that yields anything wins; results are never merged.
//!
//! 1. **Containment**: case-insensitive substring match, catalog order.
//! 2. **Fuzzy**: Ratcliff/Obershelp ratio of each raw key against the raw
//!    query, best first, keeping only keys at or above the cutoff. Equal
//!    ratios are ordered by key, descending.

use serde::{Deserialize, Serialize};

use super::catalog::CatalogStore;
use super::matcher::{close_matches, SequenceMatcher};

/// Maximum number of keys returned for one request
pub const MAX_RESULTS: usize = 3;

/// Minimum similarity ratio for a fuzzy match
pub const FUZZY_CUTOFF: f64 = 0.4;

/// Tunables for [`resolve_with`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Maximum number of keys returned
    pub max_results: usize,

    /// Minimum similarity ratio for the fuzzy stage
    pub fuzzy_cutoff: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            fuzzy_cutoff: FUZZY_CUTOFF,
        }
    }
}

/// Resolve a query with the default settings
pub fn resolve(catalog: &CatalogStore, query: &str) -> Vec<String> {
    resolve_with(&ResolverSettings::default(), catalog, query)
}

/// Resolve a query to at most `settings.max_results` catalog keys.
///
/// A blank query resolves to nothing.
pub fn resolve_with(settings: &ResolverSettings, catalog: &CatalogStore, query: &str) -> Vec<String> {
    if query.trim().is_empty() || settings.max_results == 0 {
        return Vec::new();
    }

    let contained = containment_matches(catalog, query, settings.max_results);
    if !contained.is_empty() {
        return contained;
    }

    fuzzy_matches(catalog, query, settings)
}

/// Keys containing the query, ignoring case, in catalog order
fn containment_matches(catalog: &CatalogStore, query: &str, limit: usize) -> Vec<String> {
    let query_lower = query.to_lowercase();

    catalog
        .keys()
        .filter(|key| key.to_lowercase().contains(&query_lower))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Keys similar enough to the query, most similar first
fn fuzzy_matches(catalog: &CatalogStore, query: &str, settings: &ResolverSettings) -> Vec<String> {
    close_matches(query, catalog.keys(), settings.max_results, settings.fuzzy_cutoff)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Similarity of a catalog key to a query, as scored by the fuzzy stage.
///
/// Not symmetric: swapping the arguments can change the ratio.
pub fn similarity(query: &str, key: &str) -> f64 {
    SequenceMatcher::new(query).ratio(key)
}
