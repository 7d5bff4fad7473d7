use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::procedures::{match_procedure, ProcedureDoc};
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProcedureSearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ProcedureSearchResponse {
    pub found: bool,
    pub procedure: Option<&'static ProcedureDoc>,
    pub query: String,
}

pub async fn search_handler(
    payload: Result<Json<ProcedureSearchRequest>, JsonRejection>,
) -> Result<Json<ProcedureSearchResponse>, ApiError> {
    let Json(request) = payload?;
    let procedure = match_procedure(&request.query);

    info!(
        "Procedure search: query={:?}, matched={:?}",
        request.query,
        procedure.map(|p| p.id)
    );

    Ok(Json(ProcedureSearchResponse {
        found: procedure.is_some(),
        procedure,
        query: request.query,
    }))
}
