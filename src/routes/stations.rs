use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::SearchSettings;
use crate::models::{ErrorResponse, HealthResponse, StationSearchParams, ValidationError};
use crate::services::{GatewayError, StationApiClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub stations: Arc<StationApiClient>,
    pub search: SearchSettings,
}

/// Configure all station-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search/stations", web::get().to(search_stations));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Station search pass-through
///
/// GET /api/search/stations?latitude=48.85&longitude=2.35&itemsPerPage=200&geo_distance=true&distance=1000
///
/// Forwards to the backend and returns the bare `results` array rather than
/// the backend envelope. Backend failures keep their status code.
async fn search_stations(
    state: web::Data<AppState>,
    query: web::Query<StationSearchParams>,
) -> impl Responder {
    let params = match query.to_backend_params(state.search.default_distance_m) {
        Ok(params) => params,
        Err(e @ ValidationError::MissingCoordinates) => {
            tracing::debug!("Rejected station search: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "Latitude and longitude are required",
                e.to_string(),
            );
        }
        Err(e) => {
            tracing::debug!("Rejected station search: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Validation failed", e.to_string());
        }
    };

    if let Err(errors) = query.validate() {
        tracing::debug!("Validation failed for station search: {:?}", errors);
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    tracing::info!(
        "Station search: lat={}, lon={}, distance={}m, itemsPerPage={}",
        params.latitude,
        params.longitude,
        params.distance,
        params.items_per_page
    );

    match state.stations.forward(&params).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(GatewayError::Backend { status_code, message }) => {
            let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, &message, format!("Backend returned status {}", status_code))
        }
        Err(e) => {
            tracing::error!("Station search failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                e.to_string(),
            )
        }
    }
}
