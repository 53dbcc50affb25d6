use crate::dtos::{CreateSoldierRequest, SoldierQuery, SoldierResponse, UpdateSoldierRequest};
use crate::extractors::{SoldierId, ValidatedJson};
use crate::services::InsertError;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn create_soldier(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSoldierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let soldier = payload.into_soldier()?;

    match state.db.insert_soldier(&soldier).await {
        Ok(()) => {
            tracing::info!(soldier_id = %soldier.id, "Soldier created");
            Ok((StatusCode::CREATED, Json(SoldierResponse::from(soldier))))
        }
        Err(InsertError::DuplicateId) => Err(AppError::Conflict(anyhow::anyhow!(
            "Soldier already exists"
        ))),
        Err(InsertError::Database(e)) => Err(AppError::from(e)),
    }
}

pub async fn get_soldier(
    State(state): State<AppState>,
    SoldierId(id): SoldierId,
) -> Result<impl IntoResponse, AppError> {
    let soldier = state
        .db
        .find_soldier(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Soldier not found")))?;

    Ok(Json(SoldierResponse::from(soldier)))
}

pub async fn list_soldiers(
    State(state): State<AppState>,
    Query(query): Query<SoldierQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.into_filter()?;
    let soldiers = state.db.list_soldiers(filter).await?;

    let body: Vec<SoldierResponse> = soldiers.into_iter().map(SoldierResponse::from).collect();
    Ok(Json(body))
}

pub async fn delete_soldier(
    State(state): State<AppState>,
    SoldierId(id): SoldierId,
) -> Result<impl IntoResponse, AppError> {
    if !state.db.delete_soldier(&id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Soldier not found")));
    }

    tracing::info!(soldier_id = %id, "Soldier deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_soldier(
    State(state): State<AppState>,
    SoldierId(id): SoldierId,
    ValidatedJson(payload): ValidatedJson<UpdateSoldierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = payload.into_update_document()?;
    let soldier = state
        .db
        .update_soldier(&id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Soldier not found")))?;

    Ok(Json(SoldierResponse::from(soldier)))
}

pub async fn append_limitations(
    State(state): State<AppState>,
    SoldierId(id): SoldierId,
    ValidatedJson(payload): ValidatedJson<UpdateSoldierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let limitations = payload.limitations.unwrap_or_default();
    let soldier = state
        .db
        .append_limitations(&id, &limitations)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Soldier not found")))?;

    Ok(Json(SoldierResponse::from(soldier)))
}
