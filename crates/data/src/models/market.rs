//! Market catalog row model.

use serde::{Deserialize, Serialize};

/// One catalog market as stored in the `markets` table.
///
/// Seeded from the static catalog at startup and rarely mutated afterwards.
/// Reports reference markets by id, never own them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketRecord {
    pub id: i32,
    /// Internal symbol, unique (e.g. "GC").
    pub symbol: String,
    pub name: String,
    pub category: String,
    pub exchange: Option<String>,
    /// Official CFTC contract market code, authoritative for matching.
    pub cftc_code: Option<String>,
    pub active: bool,
}
