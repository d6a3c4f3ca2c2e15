//! Catalog identifier discovery over the storefront search pages.
//!
//! Resolves a human-readable catalog entry name, or a canned listing filter
//! (e.g. "topsellers"), to numeric catalog identifiers by issuing search
//! queries and extracting the identifiers embedded in the returned markup.
//!
//! Searches are restricted to the full-games category, which excludes
//! software, demos, soundtracks, and similar non-game listings.

mod parser;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use reviewharvest_shared::{
    AppId, HarvestConfig, LISTING_PAGE_SIZE, Result, ReviewHarvestError,
};

/// `category1` value selecting the full-games category.
const GAMES_CATEGORY: &str = "998";

/// Identifier discovery over the storefront search/listing endpoint.
pub struct IdDiscovery {
    client: Client,
    search_url: Url,
}

impl IdDiscovery {
    /// Create a new discovery component with the given configuration.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        config.validate()?;

        let search_url = Url::parse(&config.search_url)
            .map_err(|e| ReviewHarvestError::config(format!("search_url: {e}")))?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ReviewHarvestError::Transport(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, search_url })
    }

    /// Resolve a catalog entry name to its identifier.
    ///
    /// Issues one search request and takes the first matching result row.
    /// Fails with [`ReviewHarvestError::NotFound`] when no entry matches.
    #[instrument(skip_all, fields(query))]
    pub async fn resolve_by_name(&self, query: &str) -> Result<AppId> {
        let html = self
            .fetch_listing(&[("term", query), ("category1", GAMES_CATEGORY)])
            .await?;

        match parser::extract_first_app_id(&html)? {
            Some(id) => {
                info!(%id, query, "resolved catalog entry");
                Ok(id)
            }
            None => Err(ReviewHarvestError::not_found(query)),
        }
    }

    /// Resolve a canned listing filter (e.g. "topsellers") to up to `count`
    /// identifiers, paging through listing pages of 25 entries each.
    ///
    /// The listing path issues its full `ceil(count / 25)` page requests
    /// unconditionally — unlike the review harvester there is no
    /// early-exhaustion check on a short page.
    #[instrument(skip_all, fields(filter_name, count))]
    pub async fn resolve_by_filter(&self, filter_name: &str, count: usize) -> Result<Vec<AppId>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let pages = count.div_ceil(LISTING_PAGE_SIZE);
        let mut ids: Vec<AppId> = Vec::with_capacity(count);

        for page in 1..=pages {
            let page_param = page.to_string();
            let html = self
                .fetch_listing(&[
                    ("filter", filter_name),
                    ("category1", GAMES_CATEGORY),
                    ("page", &page_param),
                ])
                .await?;

            let page_ids = parser::extract_app_ids(&html);
            debug!(page, found = page_ids.len(), "listing page parsed");
            ids.extend(page_ids);
        }

        ids.truncate(count);
        info!(filter_name, resolved = ids.len(), "listing resolved");
        Ok(ids)
    }

    /// Issue one search GET and return the response body.
    async fn fetch_listing(&self, params: &[(&str, &str)]) -> Result<String> {
        let url = self.search_url.clone();
        let response = self
            .client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| ReviewHarvestError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewHarvestError::Transport(format!(
                "{url}: HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ReviewHarvestError::Transport(format!("{url}: body read failed: {e}")))
    }
}
