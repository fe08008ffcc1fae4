//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{field, info, instrument, Span};

use crate::arbitrage::{analyze_match, analyze_quotes, outcomes_in_order, ArbitrageResult};
use crate::config::Config;
use crate::error::{EngineError, StoreError};
use crate::metrics;
use crate::odds::{BookmakerOdds, FootballMatch, MatchEntry, MatchOutcome, OddsQuote, OddsStore};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Matches and bookmaker odds.
    pub store: Arc<OddsStore>,
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Whether the store has been loaded.
    pub ready: Arc<AtomicBool>,
    /// Prometheus render handle, if a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: Arc<OddsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Pick the investment for a request, rejecting amounts above the cap.
    fn resolve_investment(&self, requested: Option<Decimal>) -> Result<Decimal, ApiError> {
        let investment = requested.unwrap_or(self.config.default_investment);
        if investment > self.config.max_investment {
            return Err(ApiError::InvestmentTooLarge {
                requested: investment,
                max: self.config.max_investment,
            });
        }
        Ok(investment)
    }
}

/// Errors returned by the API as JSON.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown match id.
    NotFound(String),
    /// Engine rejected the input.
    Engine(EngineError),
    /// Investment above the configured cap.
    InvestmentTooLarge {
        /// Amount requested.
        requested: Decimal,
        /// Configured maximum.
        max: Decimal,
    },
    /// Body or query string the extractor could not parse.
    BadRequest {
        /// Status chosen by the rejected extractor.
        status: StatusCode,
        /// Extractor message.
        message: String,
    },
    /// Anything else.
    Internal(String),
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MatchNotFound { .. } => ApiError::NotFound(e.to_string()),
            StoreError::InvalidRow(inner) => ApiError::Engine(inner),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Engine(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.code(), e.to_string()),
            ApiError::InvestmentTooLarge { requested, max } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_investment",
                format!("investment {} exceeds maximum {}", requested, max),
            ),
            ApiError::BadRequest { status, message } => (status, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Number of matches loaded.
    pub matches: usize,
}

/// Match list query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive search over teams and league.
    pub q: Option<String>,
}

/// Match list response.
#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    /// Matching fixtures.
    pub matches: Vec<FootballMatch>,
}

/// Bookmaker odds for a match.
#[derive(Debug, Serialize)]
pub struct OddsResponse {
    /// Match id.
    pub match_id: String,
    /// One row per bookmaker.
    pub odds: Vec<BookmakerOdds>,
}

/// Body of an odds upsert.
#[derive(Debug, Deserialize)]
pub struct OddsUpsertRequest {
    /// Bookmaker name.
    pub bookmaker: String,
    /// Home win price.
    pub home_win: Decimal,
    /// Draw price.
    pub draw: Decimal,
    /// Away win price.
    pub away_win: Decimal,
}

/// Investment query parameter.
#[derive(Debug, Deserialize)]
pub struct InvestmentQuery {
    /// Amount to allocate; the configured default when absent.
    pub investment: Option<Decimal>,
}

/// Best quote for one outcome, labelled for display.
#[derive(Debug, Serialize)]
pub struct BestOddsView {
    /// Outcome label, e.g. "Real Madrid Win (1)".
    pub label: String,
    /// Selected quote.
    #[serde(flatten)]
    pub quote: OddsQuote,
}

/// Arbitrage analysis for a stored match.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchArbitrageResponse {
    /// The fixture.
    #[serde(rename = "match")]
    pub fixture: FootballMatch,
    /// Investment the allocation was computed for.
    #[serde(with = "rust_decimal::serde::float")]
    pub investment_amount: Decimal,
    /// Best quote per outcome.
    pub best_odds: Vec<BestOddsView>,
    /// Stake allocation.
    pub result: ArbitrageResult,
}

/// Manual calculator request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorRequest {
    /// Quotes, at least one per outcome.
    pub odds: Vec<OddsQuote>,
    /// Amount to allocate; the configured default when absent.
    #[serde(default)]
    pub investment_amount: Option<Decimal>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse {
        ready: is_ready,
        matches: state.store.len(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Prometheus exposition handler - 503 when no recorder is installed.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// List matches, optionally filtered by `?q=`.
pub async fn list_matches(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<MatchesResponse>, ApiError> {
    let _timer = metrics::timer_http("list_matches");
    let Query(query) = query?;
    Ok(Json(MatchesResponse {
        matches: state.store.list_matches(query.q.as_deref()),
    }))
}

/// One match with all bookmaker rows.
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchEntry>, ApiError> {
    let _timer = metrics::timer_http("get_match");
    Ok(Json(state.store.get_match(&id)?))
}

/// Bookmaker rows for a match.
pub async fn get_odds(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OddsResponse>, ApiError> {
    let _timer = metrics::timer_http("get_odds");
    let odds = state.store.odds_for(&id)?;
    Ok(Json(OddsResponse { match_id: id, odds }))
}

/// Record one bookmaker's latest 1X2 prices.
#[instrument(skip(state, body), fields(bookmaker = field::Empty))]
pub async fn put_odds(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<OddsUpsertRequest>, JsonRejection>,
) -> Result<Json<OddsResponse>, ApiError> {
    let _timer = metrics::timer_http("put_odds");
    let Json(body) = body?;
    Span::current().record("bookmaker", body.bookmaker.as_str());

    let row = BookmakerOdds::new(body.bookmaker, body.home_win, body.draw, body.away_win);
    state.store.upsert_odds(&id, row)?;
    info!("Bookmaker odds ingested");

    let odds = state.store.odds_for(&id)?;
    Ok(Json(OddsResponse { match_id: id, odds }))
}

/// Best odds and stake allocation for a stored match.
#[instrument(skip(state, query))]
pub async fn match_arbitrage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<InvestmentQuery>, QueryRejection>,
) -> Result<Json<MatchArbitrageResponse>, ApiError> {
    let _timer = metrics::timer_http("match_arbitrage");
    let Query(query) = query?;
    let investment = state.resolve_investment(query.investment)?;
    let entry = state.store.get_match(&id)?;

    let analysis = analyze_match(&entry.odds, investment)?;
    let best_odds = MatchOutcome::ALL
        .iter()
        .zip(analysis.best_odds)
        .map(|(&outcome, quote)| BestOddsView {
            label: entry.fixture.outcome_label(outcome),
            quote,
        })
        .collect();

    Ok(Json(MatchArbitrageResponse {
        fixture: entry.fixture,
        investment_amount: investment,
        best_odds,
        result: analysis.result,
    }))
}

/// Manual calculator over caller-supplied quotes.
///
/// Outcomes are taken in first-seen order and the best quote per outcome is
/// used, so a plain one-quote-per-outcome list is computed as given.
#[instrument(skip(state, body), fields(quotes = field::Empty))]
pub async fn calculator(
    State(state): State<AppState>,
    body: Result<Json<CalculatorRequest>, JsonRejection>,
) -> Result<Json<ArbitrageResult>, ApiError> {
    let _timer = metrics::timer_http("calculator");
    let Json(body) = body?;
    Span::current().record("quotes", body.odds.len());

    let investment = state.resolve_investment(body.investment_amount)?;
    let outcomes = outcomes_in_order(&body.odds);

    let analysis = analyze_quotes(&body.odds, &outcomes, investment)?;
    Ok(Json(analysis.result))
}
