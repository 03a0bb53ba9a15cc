//! This client posts a student id and a weekday to the class table endpoint.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::Weekday;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::debug;

use crate::{error::DayErrorKind, model::weekday_index};

static FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
static REQUESTED_WITH_HEADER: &str = "X-Requested-With";
static REQUESTED_WITH: &str = "com.hanglong.NTUBStdApp";
static STUDENT_ID_FIELD: &str = "StdNo";
static WEEKDAY_FIELD: &str = "today";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how long to ask for class tables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Something that returns the class table HTML of one weekday.
#[async_trait]
pub trait DaySource: Send + Sync {
    async fn fetch_day(&self, student_id: &str, weekday: Weekday) -> Result<String, DayErrorKind>;
}

/// The portal client, one connection pool shared by all weekday requests.
#[derive(Debug, Clone)]
pub struct ClassTableClient {
    client: Client,
    url: Url,
}

impl ClassTableClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl DaySource for ClassTableClient {
    async fn fetch_day(&self, student_id: &str, weekday: Weekday) -> Result<String, DayErrorKind> {
        let today = weekday_index(weekday).to_string();
        debug!(student_id, weekday = %weekday, "requesting class table");
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH)
            .form(&HashMap::from([
                (STUDENT_ID_FIELD, student_id),
                (WEEKDAY_FIELD, today.as_str()),
            ]))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Weekday;
    use reqwest::Url;

    use crate::{
        class_client::{ClassTableClient, ClientConfig, DaySource, DEFAULT_TIMEOUT},
        error::DayErrorKind,
    };

    #[test]
    fn test_config_default_timeout() {
        let config = ClientConfig::new(Url::parse("http://localhost/table").unwrap());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    /// Test whether an unreachable portal is reported as a failure of that day.
    ///
    /// This test is offline.
    #[tokio::test]
    async fn test_fetch_day_unreachable() {
        let config = ClientConfig {
            url: Url::parse("http://127.0.0.1:9/table").unwrap(),
            timeout: Duration::from_secs(2),
        };
        let client = ClassTableClient::new(&config).unwrap();
        let result = client.fetch_day("11136001", Weekday::Mon).await;
        assert!(matches!(
            result,
            Err(DayErrorKind::Transport(_)) | Err(DayErrorKind::Timeout)
        ));
    }
}
