//! Paginated, cursor-based review harvester.
//!
//! The review page endpoint returns bounded pages (at most 100 records) and
//! exposes continuation state via an opaque, non-monotonic cursor token. The
//! harvester threads that token between requests until either the target
//! count is reached or the upstream signals exhaustion by returning a short
//! page.
//!
//! Requests for one identifier are strictly sequential: the cursor for
//! request *k+1* is only known after request *k* completes, so request-level
//! parallelism is impossible here.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use reviewharvest_shared::{
    AppId, Cursor, HarvestConfig, MAX_PAGE_SIZE, Result, Review, ReviewHarvestError, ReviewPage,
};

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

/// Outcome of a harvest run that may have stopped early.
///
/// When a mid-run page fetch fails, the reviews accumulated up to that point
/// are returned together with the cause, so the caller decides whether
/// partial data is acceptable.
#[derive(Debug)]
pub struct Harvest {
    /// Reviews accumulated so far, in request order.
    pub reviews: Vec<Review>,
    /// `true` when the run ended by reaching the target count or by natural
    /// stream exhaustion; `false` when a page fetch failed.
    pub complete: bool,
    /// The error that cut the run short, if any.
    pub error: Option<ReviewHarvestError>,
}

// ---------------------------------------------------------------------------
// ReviewHarvester
// ---------------------------------------------------------------------------

/// Cursor-threading review harvester over the storefront review endpoint.
pub struct ReviewHarvester {
    config: HarvestConfig,
    client: Client,
    base_url: Url,
}

impl ReviewHarvester {
    /// Create a new harvester with the given configuration.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ReviewHarvestError::config(format!("base_url: {e}")))?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ReviewHarvestError::Transport(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Harvest up to `target_count` reviews for one catalog identifier.
    ///
    /// All-or-nothing: a transport or decode failure on any page aborts the
    /// run and discards whatever had been accumulated. Use
    /// [`harvest_partial`](Self::harvest_partial) to keep the prefix instead.
    ///
    /// `target_count <= 0` returns an empty list without issuing any request.
    #[instrument(skip_all, fields(app_id = %app_id, target_count))]
    pub async fn harvest(&self, app_id: &AppId, target_count: i64) -> Result<Vec<Review>> {
        let outcome = self.harvest_partial(app_id, target_count).await;
        match outcome.error {
            Some(e) => Err(e),
            None => Ok(outcome.reviews),
        }
    }

    /// Like [`harvest`](Self::harvest), but a mid-run failure returns the
    /// reviews accumulated so far plus the error cause instead of discarding
    /// them.
    #[instrument(skip_all, fields(app_id = %app_id, target_count))]
    pub async fn harvest_partial(&self, app_id: &AppId, target_count: i64) -> Harvest {
        let mut reviews: Vec<Review> = Vec::new();

        if target_count <= 0 {
            return Harvest {
                reviews,
                complete: true,
                error: None,
            };
        }

        let mut cursor = Cursor::start();
        let mut remaining = target_count;
        let mut pages = 0usize;

        while remaining > 0 {
            let page_size = MAX_PAGE_SIZE.min(remaining);
            // Decrement by the full page ceiling before the request, not by
            // the realized count: this bounds the loop to
            // ceil(target_count / 100) iterations regardless of actual yield.
            remaining -= MAX_PAGE_SIZE;

            let page = match self.fetch_page(app_id, &cursor, page_size).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(pages, accumulated = reviews.len(), error = %e, "harvest aborted");
                    return Harvest {
                        reviews,
                        complete: false,
                        error: Some(e),
                    };
                }
            };
            pages += 1;

            let received = page.reviews.len() as i64;
            debug!(page = pages, received, cursor = %page.cursor, "page received");

            // Append in received order; never re-sorted or deduplicated.
            reviews.extend(page.reviews);
            cursor = page.cursor;

            // A short page means no further data exists, even if `remaining`
            // is still positive.
            if received < page_size {
                debug!(received, requested = page_size, "stream exhausted");
                break;
            }
        }

        info!(pages, reviews = reviews.len(), "harvest complete");
        Harvest {
            reviews,
            complete: true,
            error: None,
        }
    }

    /// Fetch one review page, retrying transport failures up to
    /// `max_retries` times with linear backoff. The page GET is idempotent
    /// (the cursor pins the position), so replaying it is safe.
    async fn fetch_page(
        &self,
        app_id: &AppId,
        cursor: &Cursor,
        page_size: i64,
    ) -> Result<ReviewPage> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_page_once(app_id, cursor, page_size).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transport() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(attempt, max = self.config.max_retries, error = %e, "page fetch failed, retrying");
                    let backoff = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Issue a single page request carrying the current cursor.
    async fn fetch_page_once(
        &self,
        app_id: &AppId,
        cursor: &Cursor,
        page_size: i64,
    ) -> Result<ReviewPage> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReviewHarvestError::config("base_url cannot carry path segments"))?
            .push(app_id.as_str());

        let day_range = self.config.day_range.to_string();
        let num_per_page = page_size.to_string();
        // The cursor is replayed verbatim; reqwest percent-encodes it for
        // URL transport.
        let params: [(&str, &str); 8] = [
            ("json", "1"),
            ("filter", self.config.filter.as_str()),
            ("language", &self.config.language),
            ("day_range", &day_range),
            ("review_type", self.config.review_type.as_str()),
            ("purchase_type", self.config.purchase_type.as_str()),
            ("cursor", cursor.as_str()),
            ("num_per_page", &num_per_page),
        ];

        let response = self
            .client
            .get(url.clone())
            .query(&params)
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
            .json::<ReviewPage>()
            .await
            .map_err(|e| ReviewHarvestError::decode(format!("{url}: {e}")))
    }
}
