pub mod calendar;
pub mod events;
pub mod timetable;

use axum::http::StatusCode;
use ntc_core::{
    class_client::ClientConfig,
    error::TimetableError,
    week::{self, WeekFetch},
};
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Clone, Deserialize)]
pub struct StudentQueryParams {
    student_id: String,
}

/// Fetch the week of the student named in the query string.
pub async fn fetch(
    config: &ClientConfig,
    query_params: &StudentQueryParams,
) -> Result<WeekFetch, (StatusCode, String)> {
    week::get(config, &query_params.student_id)
        .await
        .map_err(error_response)
}

/// Map a timetable error to the response sent instead of a view.
pub fn error_response(err: TimetableError) -> (StatusCode, String) {
    let status = match &err {
        TimetableError::InvalidStudentId(_) => StatusCode::BAD_REQUEST,
        TimetableError::UnknownStudent(_) => StatusCode::NOT_FOUND,
        TimetableError::PartialFailure(_) => StatusCode::BAD_GATEWAY,
        TimetableError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{}", err);
    }
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::Query,
        http::{StatusCode, Uri},
    };
    use chrono::Weekday;
    use ntc_core::error::{DayError, DayErrorKind, TimetableError};

    use super::*;

    #[test]
    fn test_error_response() {
        let (status, _) = error_response(TimetableError::InvalidStudentId("x".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = error_response(TimetableError::UnknownStudent("1".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "student 1 does not exist or has no courses");
        let (status, _) = error_response(TimetableError::PartialFailure(vec![DayError::new(
            Weekday::Mon,
            DayErrorKind::Timeout,
        )]));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_student_query_params() {
        let uri: Uri = "http://localhost:8008/calendar?student_id=11136001"
            .parse()
            .unwrap();
        let Query(query_params) = Query::<StudentQueryParams>::try_from_uri(&uri).unwrap();
        assert_eq!(query_params.student_id, "11136001");
        let uri: Uri = "http://localhost:8008/calendar".parse().unwrap();
        assert!(Query::<StudentQueryParams>::try_from_uri(&uri).is_err());
    }
}
