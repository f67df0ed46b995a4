use crate::infra::{AppState, CatalogSource};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use rengas_guru::catalog::{
    analyze_metric, brand_report, metric_distribution, BrandSummary, CatalogImporter,
    CatalogMetric, CatalogQuery, DistributionBucket, MetricSummary, ProductRecord,
};
use rengas_guru::config::RoundingPolicy;
use rengas_guru::error::AppError;
use rengas_guru::scoring::{
    apply_edit, rank_catalog, renormalize, Criterion, PreferenceSet, RankedEntry, SortState,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    #[serde(flatten)]
    pub(crate) catalog: CatalogSource,
    /// Omitted preferences leave the catalog unscored; totals other than 100 are rescaled.
    #[serde(default)]
    pub(crate) preferences: Option<PreferenceSet>,
    #[serde(default)]
    pub(crate) sort: SortState,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) scored: bool,
    pub(crate) sort: SortState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) preferences: Option<PreferenceSet>,
    pub(crate) total: usize,
    pub(crate) entries: Vec<RankedEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferenceEditRequest {
    #[serde(default)]
    pub(crate) current: PreferenceSet,
    pub(crate) key: Criterion,
    pub(crate) value: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreferenceEditResponse {
    pub(crate) preferences: PreferenceSet,
    pub(crate) total: u16,
    pub(crate) rounding: RoundingPolicy,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    #[serde(flatten)]
    pub(crate) catalog: CatalogSource,
    pub(crate) metric: CatalogMetric,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeResponse {
    pub(crate) summary: MetricSummary,
    pub(crate) distribution: Vec<DistributionBucket>,
    pub(crate) brands: Vec<BrandSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FacetRequest {
    #[serde(default)]
    pub(crate) catalog_csv: Option<String>,
    #[serde(default)]
    pub(crate) records: Vec<ProductRecord>,
    #[serde(default)]
    pub(crate) query: CatalogQuery,
}

/// Filter choices still open under the request's query.
#[derive(Debug, Serialize)]
pub(crate) struct FacetResponse {
    pub(crate) widths: Vec<f64>,
    pub(crate) profiles: Vec<f64>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/catalog/rank", post(rank_endpoint))
        .route("/api/v1/catalog/analyze", post(analyze_endpoint))
        .route("/api/v1/catalog/facets", post(facets_endpoint))
        .route("/api/v1/preferences/edit", post(preference_edit_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rank_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let RankRequest {
        catalog,
        preferences,
        sort,
    } = payload;

    let records = catalog.into_records()?;
    // weights that do not total 100 are rescaled like a slider edit
    let preferences = preferences.map(|weights| renormalize(&weights, state.scoring.rounding));
    let ranked = rank_catalog(&records, preferences.as_ref(), &state.scoring, sort);
    info!(
        records = ranked.entries.len(),
        scored = ranked.scored,
        "ranked catalog request"
    );

    Ok(Json(RankResponse {
        generated_at: Utc::now(),
        scored: ranked.scored,
        sort: ranked.sort,
        preferences,
        total: ranked.entries.len(),
        entries: ranked.entries,
    }))
}

pub(crate) async fn preference_edit_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<PreferenceEditRequest>,
) -> Result<Json<PreferenceEditResponse>, AppError> {
    if payload.value > 100 {
        return Err(AppError::InvalidRequest(format!(
            "weight for {} must be within 0..=100, got {}",
            payload.key, payload.value
        )));
    }

    let rounding = state.scoring.rounding;
    let preferences = apply_edit(&payload.current, payload.key, payload.value, rounding);

    Ok(Json(PreferenceEditResponse {
        total: preferences.total(),
        preferences,
        rounding,
    }))
}

pub(crate) async fn analyze_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let records = payload.catalog.into_records()?;
    let summary = analyze_metric(&records, payload.metric, &state.scoring);
    let distribution = metric_distribution(&records, payload.metric, &state.scoring);

    Ok(Json(AnalyzeResponse {
        summary,
        distribution,
        brands: brand_report(&records),
    }))
}

pub(crate) async fn facets_endpoint(
    Json(payload): Json<FacetRequest>,
) -> Result<Json<FacetResponse>, AppError> {
    let FacetRequest {
        catalog_csv,
        records,
        query,
    } = payload;

    // the whole catalog is needed here; the query only picks the cascade level
    let records = match catalog_csv {
        Some(csv) => CatalogImporter::from_reader(csv.as_bytes())?,
        None => records,
    };

    Ok(Json(FacetResponse {
        widths: query.available_widths(&records),
        profiles: query.available_profiles(&records),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rengas_guru::catalog::{CatalogQuery, ProductRecord, Season};
    use rengas_guru::config::ScoringConfig;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const CATALOG: &str = "id,brand,season,price,noise_level\n\
a,Nokian,So,100,72 dB\n\
b,Michelin,So,120,70 dB\n\
c,Hankook,So,150,68 dB\n\
w,Nokian,Ta,140,71 dB\n";

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            scoring: Arc::new(ScoringConfig::default()),
        }
    }

    fn summer_csv_source() -> CatalogSource {
        CatalogSource {
            catalog_csv: Some(CATALOG.to_string()),
            records: Vec::new(),
            query: CatalogQuery {
                season: Some(Season::Summer),
                ..CatalogQuery::default()
            },
        }
    }

    #[tokio::test]
    async fn rank_endpoint_scores_the_filtered_catalog() {
        let request = RankRequest {
            catalog: summer_csv_source(),
            preferences: Some(PreferenceSet::from_weights([100, 0, 0, 0, 0])),
            sort: SortState::default(),
        };

        let Json(body) = rank_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("ranking succeeds");

        assert!(body.scored);
        assert_eq!(body.total, 3);
        let ids: Vec<&str> = body.entries.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let scores: Vec<u8> = body.entries.iter().map(|e| e.attractiveness).collect();
        assert_eq!(scores, vec![100, 60, 0]);
    }

    #[tokio::test]
    async fn rank_endpoint_without_preferences_is_unscored() {
        let request = RankRequest {
            catalog: CatalogSource {
                records: vec![ProductRecord::new("x"), ProductRecord::new("y")],
                ..CatalogSource::default()
            },
            preferences: None,
            sort: SortState::default(),
        };

        let Json(body) = rank_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("ranking succeeds");

        assert!(!body.scored);
        assert!(body.preferences.is_none());
        assert!(body.entries.iter().all(|entry| entry.attractiveness == 0));
        assert_eq!(body.entries[0].record.id, "x");
    }

    #[tokio::test]
    async fn rank_endpoint_rejects_two_catalog_sources() {
        let request = RankRequest {
            catalog: CatalogSource {
                catalog_csv: Some(CATALOG.to_string()),
                records: vec![ProductRecord::new("x")],
                query: CatalogQuery::default(),
            },
            preferences: None,
            sort: SortState::default(),
        };

        let err = rank_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect_err("ambiguous catalog rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preference_edit_endpoint_renormalizes() {
        let request = PreferenceEditRequest {
            current: PreferenceSet::default(),
            key: Criterion::Price,
            value: 60,
        };

        let Json(body) = preference_edit_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("edit succeeds");

        assert_eq!(body.preferences.weights(), [43, 15, 14, 14, 14]);
        assert_eq!(body.total, 100);
        assert_eq!(body.rounding, RoundingPolicy::LargestRemainder);
    }

    #[tokio::test]
    async fn preference_edit_endpoint_rejects_out_of_range_weights() {
        let request = PreferenceEditRequest {
            current: PreferenceSet::default(),
            key: Criterion::Noise,
            value: 180,
        };

        let err = preference_edit_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect_err("weight rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_endpoint_summarises_noise() {
        let request = AnalyzeRequest {
            catalog: summer_csv_source(),
            metric: CatalogMetric::NoiseLevel,
        };

        let Json(body) = analyze_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("analysis succeeds");

        assert_eq!(body.summary.total, 3);
        assert_eq!(body.summary.min, Some(68.0));
        assert_eq!(body.summary.max, Some(72.0));
        assert_eq!(body.summary.average, Some(70.0));
        assert_eq!(body.distribution.len(), 3);
        let brands: Vec<&str> = body.brands.iter().map(|b| b.brand.as_str()).collect();
        assert_eq!(brands, vec!["Hankook", "Michelin", "Nokian"]);
    }

    #[tokio::test]
    async fn facets_endpoint_lists_widths_then_profiles() {
        let csv = "id,season,width,profile,rim_size\n\
a,So,205,55,16\n\
b,So,195,65,16\n\
c,So,205,60,16\n\
d,Ta,185,65,16\n";
        let request: FacetRequest = serde_json::from_value(json!({
            "catalog_csv": csv,
            "query": { "season": "So", "rim_size": 16, "width": 205 }
        }))
        .expect("request parses");

        let Json(body) = facets_endpoint(Json(request)).await.expect("facets build");
        assert_eq!(body.widths, vec![195.0, 205.0]);
        assert_eq!(body.profiles, vec![55.0, 60.0]);
    }

    fn dominance_records() -> Vec<ProductRecord> {
        let tire = |id: &str, price: f64, noise: &str| ProductRecord {
            price: Some(price.into()),
            noise_level: Some(noise.into()),
            ..ProductRecord::new(id)
        };
        vec![
            tire("best", 100.0, "68 dB"),
            tire("cheap", 100.0, "72 dB"),
            tire("mid", 150.0, "68 dB"),
        ]
    }

    #[tokio::test]
    async fn rank_endpoint_rescales_weights_not_totalling_one_hundred() {
        let request = RankRequest {
            catalog: CatalogSource {
                records: dominance_records(),
                ..CatalogSource::default()
            },
            preferences: Some(PreferenceSet::from_weights([60, 0, 0, 0, 60])),
            sort: SortState::default(),
        };

        let Json(body) = rank_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("ranking succeeds");

        let preferences = body.preferences.expect("preferences echoed");
        assert_eq!(preferences.weights(), [50, 0, 0, 0, 50]);
        let scores: Vec<(&str, u8)> = body
            .entries
            .iter()
            .map(|e| (e.record.id.as_str(), e.attractiveness))
            .collect();
        assert_eq!(scores, vec![("best", 100), ("cheap", 50), ("mid", 50)]);
    }

    #[tokio::test]
    async fn router_rejects_overweight_preferences() {
        let app = router().layer(Extension(test_state(true)));
        let payload = json!({
            "records": dominance_records(),
            "preferences": { "price": 200, "noise": 200 }
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/catalog/rank")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn router_rejects_overweight_current_preferences_on_edit() {
        let app = router().layer(Extension(test_state(true)));
        let payload = json!({
            "current": { "price": 180 },
            "key": "noise",
            "value": 10
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/preferences/edit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(test_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn router_serves_preference_edits_over_http() {
        let app = router().layer(Extension(test_state(true)));
        let payload = json!({
            "current": { "price": 20, "wet_grip": 20, "fuel_efficiency": 20, "satisfaction": 20, "noise": 20 },
            "key": "wet_grip",
            "value": 0
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/preferences/edit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["preferences"]["wet_grip"], 0);
        assert_eq!(body["preferences"]["price"], 25);
        assert_eq!(body["total"], 100);
        assert_eq!(body["rounding"], "largest_remainder");
    }
}
