//! Transit type enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of transit types the app knows how to display and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitType {
    Sbahn,
    Ubahn,
    Tram,
    Bus,
    Ferry,
    Express,
    Regional,
}

impl TransitType {
    /// All variants in display order.
    pub const ALL: [TransitType; 7] = [
        TransitType::Sbahn,
        TransitType::Ubahn,
        TransitType::Tram,
        TransitType::Bus,
        TransitType::Ferry,
        TransitType::Express,
        TransitType::Regional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitType::Sbahn => "sbahn",
            TransitType::Ubahn => "ubahn",
            TransitType::Tram => "tram",
            TransitType::Bus => "bus",
            TransitType::Ferry => "ferry",
            TransitType::Express => "express",
            TransitType::Regional => "regional",
        }
    }
}

impl fmt::Display for TransitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw product/mode string from the API to a [`TransitType`].
///
/// Matching is case-insensitive and checked in priority order:
/// 1. contains "suburban", or is exactly "s" → S-Bahn
/// 2. contains "subway", or is exactly "u" → U-Bahn
/// 3. contains "tram" → tram
/// 4. contains "bus" → bus
/// 5. contains "ferry" → ferry
///
/// Anything else, including the empty string, falls back to [`TransitType::Bus`].
/// Callers rely on that fallback; this function never fails.
pub fn normalize_transit_type(raw: &str) -> TransitType {
    let raw = raw.to_lowercase();

    if raw.contains("suburban") || raw == "s" {
        TransitType::Sbahn
    } else if raw.contains("subway") || raw == "u" {
        TransitType::Ubahn
    } else if raw.contains("tram") {
        TransitType::Tram
    } else if raw.contains("bus") {
        TransitType::Bus
    } else if raw.contains("ferry") {
        TransitType::Ferry
    } else {
        TransitType::Bus
    }
}
