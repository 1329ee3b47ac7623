//! Built-in market catalog.
//!
//! Merges three pieces of reference data into one static table: the tracked
//! futures markets, their official CFTC contract market codes (authoritative
//! for matching), and the accepted name fragments used as a fallback when a
//! source record carries no usable code.
//!
//! Contract codes come from the CFTC Legacy Futures report format
//! (`publicreporting.cftc.gov/resource/6dca-aqww.json`).

/// One tracked market in the static catalog.
#[derive(Debug, Clone, Copy)]
pub struct MarketSpec {
    /// Internal symbol, unique (e.g. "GC").
    pub symbol: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Category (Energy, Metal, Financial, Currency, Agricultural, Livestock, Crypto).
    pub category: &'static str,
    /// Listing exchange.
    pub exchange: &'static str,
    /// Official CFTC contract market code, when known.
    pub cftc_code: Option<&'static str>,
    /// Upper-case fragments accepted when matching CFTC market names.
    /// Empty means the market resolves by contract code only.
    pub name_fragments: &'static [&'static str],
}

/// All tracked markets, ordered by catalog position (stable, id ascending
/// once seeded).
pub const MARKET_CATALOG: &[MarketSpec] = &[
    // Energies
    MarketSpec {
        symbol: "CL",
        name: "Crude Oil WTI",
        category: "Energy",
        exchange: "NYMEX",
        cftc_code: Some("067651"),
        name_fragments: &["CRUDE OIL", "WTI"],
    },
    MarketSpec {
        symbol: "NG",
        name: "Natural Gas",
        category: "Energy",
        exchange: "NYMEX",
        cftc_code: Some("023651"),
        name_fragments: &["NATURAL GAS", "HENRY HUB"],
    },
    MarketSpec {
        symbol: "RB",
        name: "RBOB Gasoline",
        category: "Energy",
        exchange: "NYMEX",
        cftc_code: Some("111659"),
        name_fragments: &["RBOB", "GASOLINE"],
    },
    MarketSpec {
        symbol: "HO",
        name: "Heating Oil",
        category: "Energy",
        exchange: "NYMEX",
        cftc_code: Some("022651"),
        name_fragments: &["HEATING OIL"],
    },
    // Metals
    MarketSpec {
        symbol: "GC",
        name: "Gold",
        category: "Metal",
        exchange: "COMEX",
        cftc_code: Some("088691"),
        name_fragments: &["GOLD"],
    },
    MarketSpec {
        symbol: "SI",
        name: "Silver",
        category: "Metal",
        exchange: "COMEX",
        cftc_code: Some("084691"),
        name_fragments: &["SILVER"],
    },
    MarketSpec {
        symbol: "HG",
        name: "Copper",
        category: "Metal",
        exchange: "COMEX",
        cftc_code: Some("085692"),
        name_fragments: &["COPPER"],
    },
    MarketSpec {
        symbol: "PL",
        name: "Platinum",
        category: "Metal",
        exchange: "NYMEX",
        cftc_code: Some("076651"),
        name_fragments: &["PLATINUM"],
    },
    // Financials
    MarketSpec {
        symbol: "ES",
        name: "E-mini S&P 500",
        category: "Financial",
        exchange: "CME",
        cftc_code: Some("13874A"),
        name_fragments: &["S&P 500", "E-MINI S&P 500"],
    },
    MarketSpec {
        symbol: "NQ",
        name: "E-mini NASDAQ 100",
        category: "Financial",
        exchange: "CME",
        cftc_code: Some("20974A"),
        name_fragments: &["NASDAQ", "NASDAQ MINI"],
    },
    MarketSpec {
        symbol: "YM",
        name: "E-mini Dow",
        category: "Financial",
        exchange: "CBOT",
        cftc_code: Some("12460P"),
        name_fragments: &["DOW JONES", "E-MINI DOW"],
    },
    MarketSpec {
        symbol: "RTY",
        name: "E-mini Russell 2000",
        category: "Financial",
        exchange: "CME",
        cftc_code: Some("239742"),
        name_fragments: &["RUSSELL", "E-MINI RUSSELL"],
    },
    // Treasuries match by contract code only; the CFTC names ("U.S. TREASURY
    // BONDS", "UST 10Y NOTE", ...) are too volatile for fragment matching.
    MarketSpec {
        symbol: "ZB",
        name: "30-Year T-Bond",
        category: "Financial",
        exchange: "CBOT",
        cftc_code: Some("020601"),
        name_fragments: &[],
    },
    MarketSpec {
        symbol: "ZN",
        name: "10-Year T-Note",
        category: "Financial",
        exchange: "CBOT",
        cftc_code: Some("043602"),
        name_fragments: &[],
    },
    MarketSpec {
        symbol: "ZF",
        name: "5-Year T-Note",
        category: "Financial",
        exchange: "CBOT",
        cftc_code: Some("044601"),
        name_fragments: &[],
    },
    MarketSpec {
        symbol: "ZT",
        name: "2-Year T-Note",
        category: "Financial",
        exchange: "CBOT",
        cftc_code: Some("042601"),
        name_fragments: &[],
    },
    // Currencies
    MarketSpec {
        symbol: "6E",
        name: "Euro FX",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("099741"),
        name_fragments: &["EURO", "EUR"],
    },
    MarketSpec {
        symbol: "6J",
        name: "Japanese Yen",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("097741"),
        name_fragments: &["YEN", "JPY", "JAPANESE YEN"],
    },
    MarketSpec {
        symbol: "6B",
        name: "British Pound",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("096742"),
        name_fragments: &["POUND", "GBP", "BRITISH POUND"],
    },
    MarketSpec {
        symbol: "6A",
        name: "Australian Dollar",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("232741"),
        name_fragments: &["AUSTRALIAN DOLLAR", "AUD"],
    },
    MarketSpec {
        symbol: "6C",
        name: "Canadian Dollar",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("090741"),
        name_fragments: &["CANADIAN DOLLAR", "CAD"],
    },
    MarketSpec {
        symbol: "6S",
        name: "Swiss Franc",
        category: "Currency",
        exchange: "CME",
        cftc_code: Some("092741"),
        name_fragments: &["SWISS FRANC", "CHF"],
    },
    MarketSpec {
        symbol: "DX",
        name: "US Dollar Index",
        category: "Currency",
        exchange: "ICE",
        cftc_code: Some("098662"),
        name_fragments: &["DOLLAR INDEX", "U.S. DOLLAR INDEX"],
    },
    // Agriculturals
    MarketSpec {
        symbol: "ZC",
        name: "Corn",
        category: "Agricultural",
        exchange: "CBOT",
        cftc_code: Some("002602"),
        name_fragments: &["CORN"],
    },
    MarketSpec {
        symbol: "ZS",
        name: "Soybeans",
        category: "Agricultural",
        exchange: "CBOT",
        cftc_code: Some("005602"),
        name_fragments: &["SOYBEANS", "SOYBEAN"],
    },
    MarketSpec {
        symbol: "ZW",
        name: "Wheat",
        category: "Agricultural",
        exchange: "CBOT",
        cftc_code: Some("001602"),
        name_fragments: &["WHEAT"],
    },
    MarketSpec {
        symbol: "ZL",
        name: "Soybean Oil",
        category: "Agricultural",
        exchange: "CBOT",
        cftc_code: Some("007601"),
        name_fragments: &["SOYBEAN OIL"],
    },
    MarketSpec {
        symbol: "ZM",
        name: "Soybean Meal",
        category: "Agricultural",
        exchange: "CBOT",
        cftc_code: Some("026603"),
        name_fragments: &["SOYBEAN MEAL"],
    },
    MarketSpec {
        symbol: "KC",
        name: "Coffee",
        category: "Agricultural",
        exchange: "ICE",
        cftc_code: Some("083731"),
        name_fragments: &["COFFEE"],
    },
    MarketSpec {
        symbol: "SB",
        name: "Sugar #11",
        category: "Agricultural",
        exchange: "ICE",
        cftc_code: Some("080732"),
        name_fragments: &["SUGAR"],
    },
    MarketSpec {
        symbol: "CT",
        name: "Cotton",
        category: "Agricultural",
        exchange: "ICE",
        cftc_code: Some("033661"),
        name_fragments: &["COTTON"],
    },
    MarketSpec {
        symbol: "CC",
        name: "Cocoa",
        category: "Agricultural",
        exchange: "ICE",
        cftc_code: Some("073732"),
        name_fragments: &["COCOA"],
    },
    // Livestock
    MarketSpec {
        symbol: "LE",
        name: "Live Cattle",
        category: "Livestock",
        exchange: "CME",
        cftc_code: Some("057642"),
        name_fragments: &["LIVE CATTLE", "CATTLE - LIVE"],
    },
    MarketSpec {
        symbol: "HE",
        name: "Lean Hogs",
        category: "Livestock",
        exchange: "CME",
        cftc_code: Some("054642"),
        name_fragments: &["LEAN HOGS", "HOGS - LEAN"],
    },
    MarketSpec {
        symbol: "GF",
        name: "Feeder Cattle",
        category: "Livestock",
        exchange: "CME",
        cftc_code: Some("061641"),
        name_fragments: &["FEEDER CATTLE", "CATTLE - FEEDER"],
    },
    // Crypto
    MarketSpec {
        symbol: "BTC",
        name: "Bitcoin Futures",
        category: "Crypto",
        exchange: "CME",
        cftc_code: Some("133741"),
        name_fragments: &["BITCOIN"],
    },
    MarketSpec {
        symbol: "ETH",
        name: "Ethereum Futures",
        category: "Crypto",
        exchange: "CME",
        cftc_code: Some("146021"),
        name_fragments: &["ETHER", "ETHEREUM"],
    },
];

/// Looks up the catalog entry for a symbol.
#[must_use]
pub fn spec_for(symbol: &str) -> Option<&'static MarketSpec> {
    MARKET_CATALOG.iter().find(|m| m.symbol == symbol)
}

/// Returns the CFTC contract code for a symbol, when configured.
#[must_use]
pub fn cftc_code_for(symbol: &str) -> Option<&'static str> {
    spec_for(symbol).and_then(|m| m.cftc_code)
}
