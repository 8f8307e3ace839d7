use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::catalog as catalog_handlers;
use super::api::interlink as interlink_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::index))
        // Interlink API endpoints
        .route(
            "/api/calculate-interlink",
            post(interlink_handlers::calculate_interlink),
        )
        .route("/api/validate-tle", post(interlink_handlers::validate_tle))
        // Catalog API endpoints
        .route("/api/satellites", get(catalog_handlers::list_satellites))
        .route(
            "/api/satellites/reload",
            post(catalog_handlers::reload_satellites),
        )
        // OpenAPI / Swagger
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()),
        )
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let app = router(AppState::new(config));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interlink::tle_fixtures::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(Config::default()))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn pair_request(sat2_line1: &str, sat2_line2: &str) -> Value {
        json!({
            "sat1_name": "ISS",
            "sat1_tle1": ISS_LINE1,
            "sat1_tle2": ISS_LINE2,
            "sat2_tle1": sat2_line1,
            "sat2_tle2": sat2_line2,
            "start_date": "2020-07-12T21:30:00",
            "end_date": "2020-07-12T22:30:00",
        })
    }

    #[tokio::test]
    async fn co_orbital_pair_reports_windows() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/calculate-interlink",
            Some(pair_request(TRAILER_LINE1, TRAILER_LINE2)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["sat1_name"], "ISS");
        assert_eq!(body["sat2_name"], "Satellite 2");
        assert_eq!(body["samples_evaluated"], 13);
        assert_eq!(body["total_windows"], 13);

        let first = &body["interlink_windows"][0];
        assert_eq!(first["timestamp"], "2020-07-12T21:30:00Z");
        assert_eq!(first["can_communicate"], true);
        assert!(first["distance"].as_f64().unwrap() < 1000.0);
        assert!(first["sat1_pos"]["x_km"].is_number());
        assert!(first["sat1_pos"]["geodetic"]["latitude_deg"].is_number());

        assert_eq!(body["initial_positions"]["occluded"], false);
    }

    #[tokio::test]
    async fn antipodal_pair_reports_no_windows() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/calculate-interlink",
            Some(pair_request(OPPOSITE_LINE1, OPPOSITE_LINE2)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_windows"], 0);
        assert_eq!(body["interlink_windows"], json!([]));
        assert_eq!(body["initial_positions"]["occluded"], true);
    }

    #[tokio::test]
    async fn reversed_range_is_a_bad_request() {
        let mut request = pair_request(TRAILER_LINE1, TRAILER_LINE2);
        request["start_date"] = json!("2020-07-13T00:00:00Z");
        request["end_date"] = json!("2020-07-12T00:00:00Z");

        let (status, body) = send(app(), "POST", "/api/calculate-interlink", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_scan_config");
    }

    #[tokio::test]
    async fn zero_range_is_a_bad_request() {
        let mut request = pair_request(TRAILER_LINE1, TRAILER_LINE2);
        request["max_range_km"] = json!(0.0);

        let (status, body) = send(app(), "POST", "/api/calculate-interlink", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_scan_config");
    }

    #[tokio::test]
    async fn oversized_scan_is_refused() {
        let mut request = pair_request(TRAILER_LINE1, TRAILER_LINE2);
        request["step_seconds"] = json!(1);
        request["end_date"] = json!("2020-07-20T00:00:00");

        let (status, body) = send(app(), "POST", "/api/calculate-interlink", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn broken_tle_is_a_bad_request() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/calculate-interlink",
            Some(pair_request("1 nonsense", "2 nonsense")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_orbital_elements");
    }

    #[tokio::test]
    async fn missing_satellite_source_is_a_bad_request() {
        let request = json!({
            "sat1_tle1": ISS_LINE1,
            "sat1_tle2": ISS_LINE2,
            "start_date": "2020-07-12T21:30:00",
            "end_date": "2020-07-12T22:30:00",
        });

        let (status, body) = send(app(), "POST", "/api/calculate-interlink", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn catalog_ids_without_catalog_are_unavailable() {
        let request = json!({
            "sat1_norad_id": 25544,
            "sat2_norad_id": 90001,
            "start_date": "2020-07-12T21:30:00",
            "end_date": "2020-07-12T22:30:00",
        });

        let (status, body) = send(app(), "POST", "/api/calculate-interlink", Some(request)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "catalog_unavailable");

        let (status, _) = send(app(), "GET", "/api/satellites", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn catalog_satellites_can_be_scanned_by_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pair.tle"),
            format!(
                "{}\n{}\n{}\nTRAILER\n{}\n{}\n",
                ISS_NAME, ISS_LINE1, ISS_LINE2, TRAILER_LINE1, TRAILER_LINE2
            ),
        )
        .unwrap();
        let config = Config::from_yaml(&format!(
            "catalog:\n  tle_folder: {}\n",
            dir.path().display()
        ))
        .unwrap();
        let app = router(AppState::new(config));

        let (status, body) = send(app.clone(), "GET", "/api/satellites", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["satellite_count"], 2);
        assert_eq!(body["satellites"][0]["name"], ISS_NAME);

        let request = json!({
            "sat1_norad_id": 25544,
            "sat2_norad_id": 90001,
            "start_date": "2020-07-12T21:30:00Z",
            "end_date": "2020-07-12T21:40:00Z",
        });
        let (status, body) = send(
            app.clone(),
            "POST",
            "/api/calculate-interlink",
            Some(request),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sat1_name"], ISS_NAME);
        assert_eq!(body["sat2_name"], "TRAILER");
        assert_eq!(body["total_windows"], 3);

        let unknown = json!({
            "sat1_norad_id": 11111,
            "sat2_norad_id": 90001,
            "start_date": "2020-07-12T21:30:00Z",
            "end_date": "2020-07-12T21:40:00Z",
        });
        let (status, body) = send(
            app.clone(),
            "POST",
            "/api/calculate-interlink",
            Some(unknown),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "satellite_not_found");

        std::fs::write(
            dir.path().join("more.tle"),
            format!("{}\n{}\n", OPPOSITE_LINE1, OPPOSITE_LINE2),
        )
        .unwrap();
        let (status, body) = send(app, "POST", "/api/satellites/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["satellite_count"], 3);
    }

    #[tokio::test]
    async fn validate_tle_accepts_good_elements() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/validate-tle",
            Some(json!({ "tle_line1": ISS_LINE1, "tle_line2": ISS_LINE2 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "TLE is valid");
        assert_eq!(body["norad_id"], 25544);
    }

    #[tokio::test]
    async fn validate_tle_rejects_bad_elements() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/validate-tle",
            Some(json!({ "tle_line1": "1 bad", "tle_line2": "2 bad" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_orbital_elements");
    }

    #[tokio::test]
    async fn validate_tle_propagates_to_requested_instant() {
        let request = json!({
            "tle_line1": ISS_LINE1,
            "tle_line2": ISS_LINE2,
            "at": "2020-07-13T00:00:00+02:00",
        });

        let (status, body) = send(app(), "POST", "/api/validate-tle", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["position"]["x_km"].is_number());
    }

    #[tokio::test]
    async fn validate_tle_with_malformed_instant_fails_validation() {
        let request = json!({
            "tle_line1": ISS_LINE1,
            "tle_line2": ISS_LINE2,
            "at": "next tuesday",
        });

        let (status, body) = send(app(), "POST", "/api/validate-tle", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["message"], "invalid timestamp 'next tuesday'");
    }

    #[tokio::test]
    async fn index_page_and_openapi_are_served() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&html);
        assert!(html.contains("/api/calculate-interlink"));

        let (status, doc) = send(app(), "GET", "/api-doc/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/calculate-interlink"]["post"].is_object());
    }
}
