use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use ntc_core::{class_client::ClientConfig, model::SlotRow, table};

use crate::route::{error_response, fetch, StudentQueryParams};

/// Handle grid view requests.
///
/// Nothing is returned unless every weekday could be fetched.
pub async fn handler(
    State(config): State<Arc<ClientConfig>>,
    Query(query_params): Query<StudentQueryParams>,
) -> Result<Json<Vec<SlotRow>>, (StatusCode, String)> {
    let fetch = fetch(&config, &query_params).await?;
    let rows = table::single_table(&fetch).map_err(error_response)?;
    Ok(Json(rows))
}
