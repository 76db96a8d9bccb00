use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    db::validate_username,
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        DatasetQuery, DatasetSummary, ExtractionSummary, RecommendationEntry, RecommendationQuery,
        RecommendationResponse,
    },
    services,
};

use super::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "repositories": state.recommender.corpus_size(),
        })),
    )
}

/// Ranks the candidate repositories for a user whose data has been extracted
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(username): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    validate_username(&username)?;
    let limit = query.limit.unwrap_or(state.recommender.settings().top_n);

    let user_records = state.store.load_user(&username).await?;

    tracing::info!(
        request_id = %request_id,
        username = %username,
        repositories = user_records.len(),
        limit,
        "Computing recommendations"
    );

    let recommender = state.recommender.clone();
    let name = username.clone();
    let recommendations =
        tokio::task::spawn_blocking(move || recommender.recommend(&name, &user_records))
            .await
            .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))?;

    let entries = recommendations
        .top(limit)
        .iter()
        .map(|r| RecommendationEntry {
            repository: r.signals.repository.clone(),
            score: r.score,
            language: r.signals.language,
            topic: r.signals.topic,
            readme: r.signals.readme,
        })
        .collect();

    Ok(Json(RecommendationResponse {
        username,
        total: recommendations.total,
        generated_at: chrono::Utc::now(),
        recommendations: entries,
    }))
}

/// Fetches a user's repositories from the configured source and stores them
pub async fn extract_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<ExtractionSummary>)> {
    tracing::info!(request_id = %request_id, username = %username, "Extraction requested");

    let summary = services::extract_user(state.source.as_ref(), &state.store, &username).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Rebuilds the candidate dataset from the license search. The running
/// service keeps scoring against the corpus it loaded at startup.
pub async fn extract_repositories(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<DatasetQuery>,
) -> AppResult<(StatusCode, Json<DatasetSummary>)> {
    let limit = query
        .limit
        .ok_or_else(|| AppError::InvalidInput("limit query parameter is required".to_string()))?;

    tracing::info!(request_id = %request_id, limit, "Dataset extraction requested");

    let summary = services::extract_repositories(state.source.as_ref(), &state.store, limit).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
