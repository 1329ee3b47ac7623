//! Entity resolution: mapping raw source records to catalog markets.
//!
//! Two-tier pipeline: an exact contract-code lookup is authoritative when
//! the record carries a known code; otherwise the display name is matched
//! case-insensitively against each market's accepted name fragments in
//! catalog order (stable, id ascending), first match wins. Ambiguous names
//! deliberately resolve to the first match rather than being auto-resolved.

use std::collections::HashMap;

use cot_core::catalog;
use cot_data::MarketRecord;

/// Immutable lookup tables built once at startup and injected wherever
/// records need resolving.
pub struct Registry {
    entries: Vec<CatalogEntry>,
    code_index: HashMap<String, usize>,
}

struct CatalogEntry {
    market: MarketRecord,
    fragments: Vec<String>,
}

/// Outcome of resolving one raw record against the registry.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The record's contract code matched the code index.
    ExactCode(&'a MarketRecord),
    /// The display name matched an accepted name fragment.
    NameFragment(&'a MarketRecord),
    /// The record belongs to a market we do not track.
    NoMatch,
}

impl<'a> Resolution<'a> {
    /// The matched market, if any.
    #[must_use]
    pub fn market(&self) -> Option<&'a MarketRecord> {
        match self {
            Resolution::ExactCode(m) | Resolution::NameFragment(m) => Some(m),
            Resolution::NoMatch => None,
        }
    }
}

impl Registry {
    /// Builds the registry from catalog markets.
    ///
    /// Markets are ordered by id ascending; that order fixes the
    /// first-match-wins tie-break of the name-fragment fallback. Fragments
    /// and contract codes missing from the rows are backfilled from the
    /// static catalog.
    #[must_use]
    pub fn new(mut markets: Vec<MarketRecord>) -> Self {
        markets.sort_by_key(|m| m.id);

        let mut entries = Vec::with_capacity(markets.len());
        let mut code_index = HashMap::new();

        for (idx, market) in markets.into_iter().enumerate() {
            let spec = catalog::spec_for(&market.symbol);

            let fragments = spec
                .map(|s| s.name_fragments.iter().map(|f| f.to_uppercase()).collect())
                .unwrap_or_default();

            let code = market
                .cftc_code
                .clone()
                .or_else(|| spec.and_then(|s| s.cftc_code.map(String::from)));
            if let Some(code) = code {
                code_index.insert(code, idx);
            }

            entries.push(CatalogEntry { market, fragments });
        }

        Self {
            entries,
            code_index,
        }
    }

    /// Iterates markets in catalog order.
    pub fn markets(&self) -> impl Iterator<Item = &MarketRecord> {
        self.entries.iter().map(|e| &e.market)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a record's contract code and display name to a market.
    #[must_use]
    pub fn resolve(&self, contract_code: Option<&str>, display_name: &str) -> Resolution<'_> {
        if let Some(code) = contract_code {
            if let Some(&idx) = self.code_index.get(code) {
                return Resolution::ExactCode(&self.entries[idx].market);
            }
        }

        let upper = display_name.to_uppercase();
        for entry in &self.entries {
            if entry.fragments.iter().any(|f| upper.contains(f.as_str())) {
                return Resolution::NameFragment(&entry.market);
            }
        }

        Resolution::NoMatch
    }
}
