//! Search results markup parser.
//!
//! The storefront search page marks each result with an anchor carrying the
//! `search_result_row` class; the catalog identifier sits in that element's
//! `data-ds-appid` attribute. Bundle rows carry `data-ds-packageid` instead
//! and are not catalog entries, so they are skipped.

use scraper::{Html, Selector};
use tracing::debug;

use reviewharvest_shared::{AppId, Result, ReviewHarvestError};

/// CSS class marking one search result row.
const RESULT_ROW_SELECTOR: &str = "a.search_result_row";

/// Custom data attribute carrying the catalog identifier.
const APP_ID_ATTR: &str = "data-ds-appid";

/// Extract the identifier of the first result row, or `None` when the page
/// has no result rows at all.
///
/// A first row without a parseable identifier attribute is a decode error:
/// the page matched but its markup does not carry what we need.
pub(crate) fn extract_first_app_id(html: &str) -> Result<Option<AppId>> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(RESULT_ROW_SELECTOR).unwrap();

    let Some(row) = doc.select(&selector).next() else {
        return Ok(None);
    };

    let raw = row.value().attr(APP_ID_ATTR).ok_or_else(|| {
        ReviewHarvestError::decode(format!("result row has no {APP_ID_ATTR} attribute"))
    })?;

    raw.parse::<AppId>()
        .map(Some)
        .map_err(|_| ReviewHarvestError::decode(format!("{APP_ID_ATTR}={raw:?} is not numeric")))
}

/// Extract every result row's identifier, in document order.
///
/// Rows without a numeric identifier (bundles, malformed markup) are skipped.
pub(crate) fn extract_app_ids(html: &str) -> Vec<AppId> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(RESULT_ROW_SELECTOR).unwrap();

    doc.select(&selector)
        .filter_map(|row| match row.value().attr(APP_ID_ATTR) {
            Some(raw) => match raw.parse::<AppId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!(raw, "skipping row with non-numeric identifier");
                    None
                }
            },
            None => {
                debug!("skipping row without identifier attribute");
                None
            }
        })
        .collect()
}
