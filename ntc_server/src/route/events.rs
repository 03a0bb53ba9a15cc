use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use ntc_core::{class_client::ClientConfig, model::CalendarColumns, table};

use crate::route::{error_response, fetch, StudentQueryParams};

/// Handle calendar view requests, answering with the parallel event columns.
pub async fn handler(
    State(config): State<Arc<ClientConfig>>,
    Query(query_params): Query<StudentQueryParams>,
) -> Result<Json<CalendarColumns>, (StatusCode, String)> {
    let fetch = fetch(&config, &query_params).await?;
    let events = table::merged_events(&fetch).map_err(error_response)?;
    Ok(Json(CalendarColumns::from(events.as_slice())))
}
