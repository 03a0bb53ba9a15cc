use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use ntc_core::{calendar, class_client::ClientConfig, ical::generator::Emitter, table};

use crate::route::{error_response, fetch, StudentQueryParams};

/// Handle calendar requests.
///
/// The `student_id` must be given in the query string. Failed weekdays are left out.
pub async fn handler(
    State(config): State<Arc<ClientConfig>>,
    Query(query_params): Query<StudentQueryParams>,
) -> Result<Response, (StatusCode, String)> {
    let fetch = fetch(&config, &query_params).await?;
    let events = table::merged_events(&fetch).map_err(error_response)?;
    let today = chrono::Local::now().date_naive();
    let ical_calendar = calendar::get_calendar(&events, today);
    let response = ([(CONTENT_TYPE, "text/calendar")], ical_calendar.generate()).into_response();
    Ok(response)
}
