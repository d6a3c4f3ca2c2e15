//! Core domain types for the review harvester.

use serde::{Deserialize, Serialize};

use crate::error::ReviewHarvestError;

/// Hard per-request ceiling of the review page endpoint. Requesting more is
/// not meaningful and must not be attempted.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fixed page size of the storefront search listing (determined by the
/// upstream listing page, not configurable).
pub const LISTING_PAGE_SIZE: usize = 25;

/// Start-of-stream sentinel value for the review cursor.
pub const START_CURSOR: &str = "*";

// ---------------------------------------------------------------------------
// AppId
// ---------------------------------------------------------------------------

/// A numeric string uniquely identifying one item in the storefront catalog.
///
/// Obtained via identifier discovery; treated as an opaque key by the
/// harvester. Invalid identifiers are not caught locally — they surface as an
/// upstream request failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AppId {
    type Err = ReviewHarvestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReviewHarvestError::validation(format!(
                "catalog identifier must be a non-empty numeric string, got {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Opaque continuation token marking a position in the paginated review
/// stream.
///
/// The token has no internal structure meaningful to this system — it is
/// stored as received and replayed verbatim (percent-encoded for URL
/// transport) on the next request. One token is valid only within one harvest
/// invocation's causal chain, so it is never stored in shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// The `*` sentinel meaning "start of stream".
    pub fn start() -> Self {
        Self(START_CURSOR.to_string())
    }

    /// View the token exactly as received from the upstream.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Review / ReviewPage
// ---------------------------------------------------------------------------

/// One user-submitted review, as returned by the upstream.
///
/// The harvester is schema-agnostic: records are a mapping of field name to
/// value (review text, a boolean "voted_up" flag, and whatever else the
/// storefront includes) and pass through unvalidated and untransformed.
pub type Review = serde_json::Map<String, serde_json::Value>;

/// The result of one review page request: a bounded batch of reviews plus the
/// next cursor.
///
/// A page carrying fewer reviews than were requested signals stream
/// exhaustion — no further data exists, even if more could be requested.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPage {
    /// Continuation token for the next request.
    #[serde(default)]
    pub cursor: Cursor,
    /// Review records in upstream order (length ≤ requested page size).
    #[serde(default)]
    pub reviews: Vec<Review>,
}
