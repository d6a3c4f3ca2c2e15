//! Batch orchestration: harvest reviews across a list of catalog identifiers.
//!
//! Execution is strictly sequential. Within one identifier the cursor chain
//! forbids request-level parallelism; across identifiers requests stay
//! sequential so the output order is exactly the identifier order.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use reviewharvest_discovery::IdDiscovery;
use reviewharvest_harvester::ReviewHarvester;
use reviewharvest_shared::{AppId, Result, Review};

// ---------------------------------------------------------------------------
// BatchReport
// ---------------------------------------------------------------------------

/// Summary of a fault-isolating batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// All harvested reviews, concatenated in identifier order.
    pub reviews: Vec<Review>,
    /// Number of identifiers harvested without error.
    pub harvested_ids: usize,
    /// Identifiers that failed, with the error message.
    pub errors: Vec<(AppId, String)>,
    /// Total elapsed time.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Batch operations
// ---------------------------------------------------------------------------

/// Harvest up to `per_id_count` reviews for each identifier, in the given
/// order, concatenating results in that order.
///
/// No deduplication and no parallelism; a failure on one identifier aborts
/// the whole batch. Use [`harvest_batch_report`] to continue past failures.
#[instrument(skip_all, fields(ids = app_ids.len(), per_id_count))]
pub async fn harvest_batch(
    harvester: &ReviewHarvester,
    app_ids: &[AppId],
    per_id_count: i64,
) -> Result<Vec<Review>> {
    let mut all_reviews: Vec<Review> = Vec::new();

    for app_id in app_ids {
        let reviews = harvester.harvest(app_id, per_id_count).await?;
        all_reviews.extend(reviews);
    }

    info!(
        ids = app_ids.len(),
        reviews = all_reviews.len(),
        "batch complete"
    );
    Ok(all_reviews)
}

/// Fault-isolating variant of [`harvest_batch`]: a failure on one identifier
/// is recorded and the batch moves on to the next, so one broken entry does
/// not discard everything else.
#[instrument(skip_all, fields(ids = app_ids.len(), per_id_count))]
pub async fn harvest_batch_report(
    harvester: &ReviewHarvester,
    app_ids: &[AppId],
    per_id_count: i64,
) -> BatchReport {
    let start = Instant::now();
    let mut reviews: Vec<Review> = Vec::new();
    let mut harvested_ids = 0usize;
    let mut errors: Vec<(AppId, String)> = Vec::new();

    for app_id in app_ids {
        match harvester.harvest(app_id, per_id_count).await {
            Ok(batch) => {
                harvested_ids += 1;
                reviews.extend(batch);
            }
            Err(e) => {
                warn!(%app_id, error = %e, "identifier failed, continuing batch");
                errors.push((app_id.clone(), e.to_string()));
            }
        }
    }

    let report = BatchReport {
        reviews,
        harvested_ids,
        errors,
        duration: start.elapsed(),
    };

    info!(
        harvested_ids = report.harvested_ids,
        reviews = report.reviews.len(),
        errors = report.errors.len(),
        duration_ms = report.duration.as_millis(),
        "batch report complete"
    );
    report
}

/// Resolve each name to an identifier, then harvest the batch.
#[instrument(skip_all, fields(names = names.len(), per_id_count))]
pub async fn harvest_by_names(
    harvester: &ReviewHarvester,
    discovery: &IdDiscovery,
    names: &[&str],
    per_id_count: i64,
) -> Result<Vec<Review>> {
    let mut app_ids: Vec<AppId> = Vec::with_capacity(names.len());
    for name in names {
        app_ids.push(discovery.resolve_by_name(name).await?);
    }

    harvest_batch(harvester, &app_ids, per_id_count).await
}

/// Resolve the top `id_count` entries of a canned listing filter (e.g.
/// "topsellers"), then harvest the batch.
#[instrument(skip_all, fields(filter_name, id_count, per_id_count))]
pub async fn harvest_top(
    harvester: &ReviewHarvester,
    discovery: &IdDiscovery,
    filter_name: &str,
    id_count: usize,
    per_id_count: i64,
) -> Result<Vec<Review>> {
    let app_ids = discovery.resolve_by_filter(filter_name, id_count).await?;
    harvest_batch(harvester, &app_ids, per_id_count).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewharvest_shared::HarvestConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> HarvestConfig {
        HarvestConfig {
            base_url: format!("{}/appreviews", server.uri()),
            search_url: format!("{}/search/", server.uri()),
            ..HarvestConfig::default()
        }
    }

    fn app_id(s: &str) -> AppId {
        s.parse().expect("valid app id")
    }

    fn page_body(app: &str, count: usize, cursor: &str) -> serde_json::Value {
        let reviews: Vec<serde_json::Value> = (0..count)
            .map(|i| json!({ "recommendationid": format!("{app}-{i}"), "voted_up": true }))
            .collect();
        json!({ "success": 1, "cursor": cursor, "reviews": reviews })
    }

    async fn mount_reviews(server: &MockServer, app: &str, count: usize) {
        Mock::given(method("GET"))
            .and(path(format!("/appreviews/{app}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(app, count, "end")))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn batch_concatenates_in_identifier_order() {
        let server = MockServer::start().await;
        mount_reviews(&server, "10", 3).await;
        mount_reviews(&server, "20", 3).await;

        let harvester = ReviewHarvester::new(test_config(&server)).unwrap();
        let ids = [app_id("20"), app_id("10")];
        let reviews = harvest_batch(&harvester, &ids, 3).await.unwrap();

        assert_eq!(reviews.len(), 6);
        assert_eq!(reviews[0]["recommendationid"], json!("20-0"));
        assert_eq!(reviews[3]["recommendationid"], json!("10-0"));
    }

    #[tokio::test]
    async fn batch_aborts_on_first_failure() {
        let server = MockServer::start().await;
        mount_reviews(&server, "10", 3).await;
        Mock::given(method("GET"))
            .and(path("/appreviews/20"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_reviews(&server, "30", 3).await;

        let harvester = ReviewHarvester::new(test_config(&server)).unwrap();
        let ids = [app_id("10"), app_id("20"), app_id("30")];
        let err = harvest_batch(&harvester, &ids, 3).await.unwrap_err();
        assert!(err.is_transport());

        // The third identifier was never touched.
        let requests = server.received_requests().await.unwrap();
        assert!(!requests.iter().any(|r| r.url.path().ends_with("/30")));
    }

    #[tokio::test]
    async fn batch_report_isolates_failures() {
        let server = MockServer::start().await;
        mount_reviews(&server, "10", 2).await;
        Mock::given(method("GET"))
            .and(path("/appreviews/20"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_reviews(&server, "30", 2).await;

        let harvester = ReviewHarvester::new(test_config(&server)).unwrap();
        let ids = [app_id("10"), app_id("20"), app_id("30")];
        let report = harvest_batch_report(&harvester, &ids, 2).await;

        assert_eq!(report.harvested_ids, 2);
        assert_eq!(report.reviews.len(), 4);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, app_id("20"));
    }

    #[tokio::test]
    async fn empty_identifier_list_is_empty_batch() {
        let server = MockServer::start().await;
        let harvester = ReviewHarvester::new(test_config(&server)).unwrap();

        let reviews = harvest_batch(&harvester, &[], 50).await.unwrap();
        assert!(reviews.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn harvest_by_names_resolves_then_harvests() {
        let server = MockServer::start().await;
        let search_html = r#"<html><body>
            <a class="search_result_row" data-ds-appid="570" href="/app/570/">Dota 2</a>
        </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("term", "dota 2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(search_html))
            .mount(&server)
            .await;
        mount_reviews(&server, "570", 5).await;

        let config = test_config(&server);
        let harvester = ReviewHarvester::new(config.clone()).unwrap();
        let discovery = IdDiscovery::new(config).unwrap();

        let reviews = harvest_by_names(&harvester, &discovery, &["dota 2"], 5)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 5);
        assert_eq!(reviews[0]["recommendationid"], json!("570-0"));
    }

    #[tokio::test]
    async fn harvest_top_resolves_listing_then_harvests() {
        let server = MockServer::start().await;
        let listing_html = r#"<html><body>
            <a class="search_result_row" data-ds-appid="10" href="/app/10/">A</a>
            <a class="search_result_row" data-ds-appid="20" href="/app/20/">B</a>
        </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("filter", "topsellers"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_html))
            .mount(&server)
            .await;
        mount_reviews(&server, "10", 2).await;
        mount_reviews(&server, "20", 2).await;

        let config = test_config(&server);
        let harvester = ReviewHarvester::new(config.clone()).unwrap();
        let discovery = IdDiscovery::new(config).unwrap();

        let reviews = harvest_top(&harvester, &discovery, "topsellers", 2, 2)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 4);
        // Listing order drives concatenation order.
        assert_eq!(reviews[0]["recommendationid"], json!("10-0"));
        assert_eq!(reviews[2]["recommendationid"], json!("20-0"));
    }
}
