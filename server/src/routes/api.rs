use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::{REFERENCE_CACHE_CONTROL, REGION_MAP_CACHE_CONTROL};
use crate::error::AppError;
use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
const SVG_CONTENT_TYPE: &str = "image/svg+xml";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "user_store": state.store.kind(),
        "regions": state.reference.regions().len(),
        "provinces": state.reference.tables().provinces.len(),
        "observability": {
            "registrations_total": observability.registrations_total,
            "registration_rejections_total": observability.registration_rejections_total,
            "logins_total": observability.logins_total,
            "login_failures_total": observability.login_failures_total,
            "logouts_total": observability.logouts_total,
            "reference_requests_total": observability.reference_requests_total,
            "region_map_requests_total": observability.region_map_requests_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let persistent_store = matches!(state.store, crate::store::UserStore::Postgres(_));
    let body = render_prometheus_metrics(
        state.reference.regions().len(),
        persistent_store,
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    region_count: usize,
    persistent_store: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    write_metric(
        &mut body,
        "lakbay_regions",
        "gauge",
        "Regions in the loaded reference tables.",
        region_count as u64,
    );
    write_metric(
        &mut body,
        "lakbay_persistent_user_store",
        "gauge",
        "Whether users are stored in PostgreSQL (1 or 0).",
        u64::from(persistent_store),
    );
    write_metric(
        &mut body,
        "lakbay_registrations_total",
        "counter",
        "Accounts created through /api/auth/register.",
        observability.registrations_total,
    );
    write_metric(
        &mut body,
        "lakbay_registration_rejections_total",
        "counter",
        "Registration attempts rejected by validation or a duplicate email.",
        observability.registration_rejections_total,
    );
    write_metric(
        &mut body,
        "lakbay_logins_total",
        "counter",
        "Successful sign-ins.",
        observability.logins_total,
    );
    write_metric(
        &mut body,
        "lakbay_login_failures_total",
        "counter",
        "Sign-ins rejected for bad credentials.",
        observability.login_failures_total,
    );
    write_metric(
        &mut body,
        "lakbay_logouts_total",
        "counter",
        "Sign-outs.",
        observability.logouts_total,
    );
    write_metric(
        &mut body,
        "lakbay_reference_requests_total",
        "counter",
        "Requests to /api/reference, including 304 responses.",
        observability.reference_requests_total,
    );
    write_metric(
        &mut body,
        "lakbay_region_map_requests_total",
        "counter",
        "Requests for region SVG maps.",
        observability.region_map_requests_total,
    );
    body
}

fn write_metric(body: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    let _ = writeln!(body, "# HELP {name} {help}");
    let _ = writeln!(body, "# TYPE {name} {kind}");
    let _ = writeln!(body, "{name} {value}");
}

/// Serve the pre-serialised reference catalog.
pub async fn get_reference(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.observability.record_reference_request();
    let payload = &state.reference_payload;

    if if_none_match_matches(&headers, &payload.etag) {
        return not_modified_response(REFERENCE_CACHE_CONTROL, Some(payload.etag.as_str()));
    }

    json_bytes_response(
        payload.json.clone(),
        REFERENCE_CACHE_CONTROL,
        Some(payload.etag.as_str()),
    )
}

pub async fn get_region_map(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    state.observability.record_region_map_request();
    let map = state.reference.region_map(&code).ok_or(AppError::NotFound)?;

    let mut response = Response::new(Body::from(map.to_markup()));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SVG_CONTENT_TYPE),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(REGION_MAP_CACHE_CONTROL),
    );
    Ok(response)
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use super::{if_none_match_matches, render_prometheus_metrics};
    use crate::routes::test_support::spawn_test_server;
    use crate::state::{AppState, ObservabilitySnapshot};

    #[test]
    fn metrics_output_contains_prometheus_help_type_and_values() {
        let observability = ObservabilitySnapshot {
            registrations_total: 4,
            registration_rejections_total: 2,
            logins_total: 12,
            login_failures_total: 3,
            logouts_total: 7,
            reference_requests_total: 99,
            region_map_requests_total: 5,
        };

        let metrics = render_prometheus_metrics(17, true, observability);

        assert!(metrics.contains("# HELP lakbay_regions"));
        assert!(metrics.contains("# TYPE lakbay_logins_total counter"));
        assert!(metrics.contains("# TYPE lakbay_persistent_user_store gauge"));
        assert!(metrics.contains("lakbay_regions 17"));
        assert!(metrics.contains("lakbay_persistent_user_store 1"));
        assert!(metrics.contains("lakbay_registrations_total 4"));
        assert!(metrics.contains("lakbay_registration_rejections_total 2"));
        assert!(metrics.contains("lakbay_logins_total 12"));
        assert!(metrics.contains("lakbay_login_failures_total 3"));
        assert!(metrics.contains("lakbay_logouts_total 7"));
        assert!(metrics.contains("lakbay_reference_requests_total 99"));
        assert!(metrics.contains("lakbay_region_map_requests_total 5"));
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"reference-42\""),
        );
        assert!(if_none_match_matches(&headers, "\"reference-42\""));
        assert!(!if_none_match_matches(&headers, "\"reference-43\""));
    }

    #[tokio::test]
    async fn health_and_metrics_expose_expected_contract() {
        let (addr, server_handle) = spawn_test_server(AppState::for_tests()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        client
            .get(format!("{base_url}/api/reference"))
            .send()
            .await
            .expect("reference request")
            .error_for_status()
            .expect("reference status");

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert_eq!(
            health.get("user_store").and_then(|v| v.as_str()),
            Some("memory")
        );
        assert_eq!(health.get("regions").and_then(|v| v.as_u64()), Some(17));
        assert_eq!(
            health
                .get("observability")
                .and_then(|v| v.get("reference_requests_total"))
                .and_then(|v| v.as_u64()),
            Some(1)
        );

        let metrics = client
            .get(format!("{base_url}/api/metrics"))
            .send()
            .await
            .expect("metrics request")
            .error_for_status()
            .expect("metrics status")
            .text()
            .await
            .expect("parse metrics text");

        assert!(metrics.contains("# TYPE lakbay_reference_requests_total counter"));
        assert!(metrics.contains("lakbay_reference_requests_total 1"));
        assert!(metrics.contains("lakbay_persistent_user_store 0"));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn reference_endpoint_returns_not_modified_when_etag_matches() {
        let (addr, server_handle) = spawn_test_server(AppState::for_tests()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/reference"))
            .send()
            .await
            .expect("reference request should succeed");
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        let first_etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");
        let body: serde_json::Value = first.json().await.expect("reference body is JSON");
        assert_eq!(body["regions"].as_array().map(Vec::len), Some(17));

        let second = client
            .get(format!("{base_url}/api/reference"))
            .header(reqwest::header::IF_NONE_MATCH, first_etag)
            .send()
            .await
            .expect("conditional reference request should succeed");

        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);
        assert_eq!(
            second
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("public, max-age=300")
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn region_map_endpoint_serves_svg_case_insensitively() {
        let (addr, server_handle) = spawn_test_server(AppState::for_tests()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{base_url}/api/regions/region-iii/map.svg"))
            .send()
            .await
            .expect("region map request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("image/svg+xml")
        );
        let svg = response.text().await.expect("svg body");
        assert!(svg.contains(r#"id="nueva-ecija""#));

        let missing = client
            .get(format!("{base_url}/api/regions/region-xx/map.svg"))
            .send()
            .await
            .expect("missing region request");
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = missing.json().await.expect("error body");
        assert_eq!(body["error"], "not found");

        server_handle.abort();
        let _ = server_handle.await;
    }
}
