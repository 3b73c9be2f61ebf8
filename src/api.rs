//! Read-only HTTP API over the ingredient catalog.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::catalog::{Catalog, Ingredient, RiskLevel};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ingredients", get(ingredients_status))
        .route("/api/ingredients/unsafe", get(list_unsafe))
        .route("/api/ingredients/:name", get(get_ingredient))
        .route("/api/history", post(save_history))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientsResponse {
    pub success: bool,
    pub count: usize,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub success: bool,
    pub ingredient: Ingredient,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness stub for the catalog endpoint.
async fn ingredients_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Ingredient database API endpoint".to_string(),
        status: "active".to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct UnsafeQuery {
    #[serde(rename = "riskLevel")]
    risk_level: Option<String>,
}

/// Harmful ingredients, optionally filtered by risk level.
///
/// An unknown level is ignored and the full harmful list is returned.
async fn list_unsafe(
    State(state): State<AppState>,
    Query(query): Query<UnsafeQuery>,
) -> Json<IngredientsResponse> {
    let risk = query.risk_level.as_deref().and_then(RiskLevel::from_str);
    let ingredients: Vec<Ingredient> = state
        .catalog
        .harmful_by_risk(risk)
        .into_iter()
        .cloned()
        .collect();
    debug!("Listing {} unsafe ingredients (filter: {:?})", ingredients.len(), risk);

    Json(IngredientsResponse {
        success: true,
        count: ingredients.len(),
        ingredients,
    })
}

/// Get a harmful ingredient by name or alternative name.
async fn get_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<IngredientResponse>, (StatusCode, Json<MessageResponse>)> {
    state
        .catalog
        .lookup_harmful(&name)
        .cloned()
        .map(|ingredient| {
            Json(IngredientResponse {
                success: true,
                ingredient,
            })
        })
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    success: false,
                    message: "Ingredient not found".to_string(),
                }),
            )
        })
}

/// Accepts scan history. Nothing is stored.
async fn save_history() -> Json<MessageResponse> {
    info!("Scan history received (not persisted)");
    Json(MessageResponse {
        success: true,
        message: "Scan history saved successfully".to_string(),
    })
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
