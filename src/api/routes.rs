//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    calculator, get_match, get_odds, health, list_matches, match_arbitrage, metrics_text,
    put_odds, ready, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics_text))
        // Matches and odds
        .route("/api/v1/matches", get(list_matches))
        .route("/api/v1/matches/:id", get(get_match))
        .route("/api/v1/matches/:id/odds", get(get_odds).put(put_odds))
        .route("/api/v1/matches/:id/arbitrage", get(match_arbitrage))
        // Manual calculator
        .route("/api/v1/calculator", post(calculator))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::odds::{OddsStore, SAMPLE_ARBITRAGE_MATCH_ID};

    fn sample_state() -> AppState {
        AppState::new(Arc::new(OddsStore::with_sample_data()), Config::default())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn assert_close(value: &Value, expected: f64) {
        let actual = value.as_f64().unwrap();
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(sample_state());

        let (status, body) = send(app, get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_when_not_ready() {
        let app = create_router(sample_state());

        let (status, _) = send(app, get_request("/ready")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_200_when_ready() {
        let state = sample_state();
        state.set_ready(true);
        let app = create_router(state);

        let (status, body) = send(app, get_request("/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"], json!(5));
    }

    #[tokio::test]
    async fn metrics_endpoint_without_recorder_is_unavailable() {
        let app = create_router(sample_state());

        let response = app.oneshot(get_request("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn list_matches_filters_by_query() {
        let app = create_router(sample_state());

        let (status, body) = send(app, get_request("/api/v1/matches?q=bundesliga")).await;

        assert_eq!(status, StatusCode::OK);
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["team1"], json!("Bayern Munich"));
    }

    #[tokio::test]
    async fn unknown_match_returns_404() {
        let app = create_router(sample_state());

        let (status, body) = send(app, get_request("/api/v1/matches/999/arbitrage")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("not_found"));
    }

    #[tokio::test]
    async fn match_arbitrage_reports_opportunity() {
        let app = create_router(sample_state());
        let uri = format!(
            "/api/v1/matches/{}/arbitrage?investment=200",
            SAMPLE_ARBITRAGE_MATCH_ID
        );

        let (status, body) = send(app, get_request(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["investmentAmount"], json!(200.0));
        assert_eq!(body["result"]["arbitrageExists"], json!(true));
        assert_eq!(body["bestOdds"][0]["label"], json!("Real Madrid Win (1)"));
        assert_eq!(body["bestOdds"][0]["bookmaker"], json!("MaxBet"));

        let total: f64 = body["result"]["bets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["stakeAmount"].as_f64().unwrap())
            .sum();
        assert!((total - 200.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn match_arbitrage_rejects_oversized_investment() {
        let app = create_router(sample_state());

        let (status, body) =
            send(app, get_request("/api/v1/matches/1/arbitrage?investment=5000000")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("invalid_investment"));
    }

    #[tokio::test]
    async fn put_odds_then_arbitrage_uses_new_prices() {
        let state = sample_state();

        let (status, body) = send(
            create_router(state.clone()),
            json_request(
                Method::PUT,
                "/api/v1/matches/1/odds",
                json!({ "bookmaker": "Betano", "home_win": 2.60, "draw": 3.90, "away_win": 4.10 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["odds"].as_array().unwrap().len(), 4);

        let (status, body) = send(
            create_router(state),
            get_request("/api/v1/matches/1/arbitrage"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["arbitrageExists"], json!(true));
        assert_eq!(body["bestOdds"][0]["bookmaker"], json!("Betano"));
    }

    #[tokio::test]
    async fn put_odds_rejects_invalid_price() {
        let app = create_router(sample_state());

        let (status, body) = send(
            app,
            json_request(
                Method::PUT,
                "/api/v1/matches/1/odds",
                json!({ "bookmaker": "Betano", "home_win": 2.60, "draw": 0, "away_win": 4.10 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("invalid_odds"));
    }

    #[tokio::test]
    async fn calculator_returns_legacy_shape() {
        let app = create_router(sample_state());

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/v1/calculator",
                json!({
                    "investmentAmount": 100,
                    "odds": [
                        { "bookmaker": "Superbet", "type": "1", "odds": 2.10 },
                        { "bookmaker": "MaxBet", "type": "X", "odds": 3.80 },
                        { "bookmaker": "Spin.ro", "type": "2", "odds": 4.20 }
                    ]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["arbitrageExists"], json!(true));
        assert_close(&body["expectedProfit"], 2.31);
        assert_close(&body["expectedROI"], 2.31);
        assert_close(&body["sumOfProbabilities"], 0.9774);
        assert_eq!(body["bets"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn calculator_rejects_odds_of_one() {
        let app = create_router(sample_state());

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/v1/calculator",
                json!({
                    "odds": [
                        { "bookmaker": "A", "type": "Outcome 1", "odds": 1.0 },
                        { "bookmaker": "B", "type": "Outcome 2", "odds": 3.0 }
                    ]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("invalid_odds"));
    }

    #[tokio::test]
    async fn calculator_rejects_single_outcome() {
        let app = create_router(sample_state());

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/v1/calculator",
                json!({ "odds": [{ "bookmaker": "A", "type": "Outcome 1", "odds": 2.0 }] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("incomplete_odds"));
    }

    #[tokio::test]
    async fn malformed_calculator_body_returns_json_error() {
        let app = create_router(sample_state());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/calculator")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"odds\": ["))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("invalid_request"));
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn mistyped_calculator_body_returns_json_error() {
        let app = create_router(sample_state());

        let (status, body) = send(
            app,
            json_request(Method::POST, "/api/v1/calculator", json!({ "odds": "2.10" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("invalid_request"));
    }

    #[tokio::test]
    async fn unparsable_investment_query_returns_json_error() {
        let app = create_router(sample_state());

        let (status, body) =
            send(app, get_request("/api/v1/matches/1/arbitrage?investment=lots")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("invalid_request"));
    }
}
