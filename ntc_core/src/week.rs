//! This aggregator fetches and parses all seven weekdays concurrently.

use std::{sync::Arc, time::Duration};

use chrono::Weekday;
use scraper::Html;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    class_client::{ClassTableClient, ClientConfig, DaySource},
    day_parser::{parse_day, parse_period_times},
    error::{DayError, DayErrorKind, TimetableError},
    model::{DayTable, PeriodTimeRange, WeekTable, WEEKDAYS},
};

/// The weekday whose page provides the period times shared by all weekdays.
pub const REFERENCE_WEEKDAY: Weekday = Weekday::Mon;

/// The outcome of fetching one student's week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekFetch {
    pub student_id: String,
    pub week: WeekTable,
    pub periods: Vec<PeriodTimeRange>,
    /// Failed weekdays, in the order they completed.
    pub errors: Vec<DayError>,
}

impl WeekFetch {
    /// Whether no class at all was found, i.e. the student is unknown.
    pub fn is_vacant(&self) -> bool {
        self.week.is_vacant()
    }

    /// Fail with [`TimetableError::UnknownStudent`] if no class was found.
    pub fn ensure_known(&self) -> Result<(), TimetableError> {
        if self.is_vacant() {
            info!(student_id = %self.student_id, "no classes found for student");
            return Err(TimetableError::UnknownStudent(self.student_id.clone()));
        }
        Ok(())
    }
}

/// Everything the weekday workers write, guarded by a single lock.
#[derive(Debug, Default)]
struct Accumulator {
    week: WeekTable,
    periods: Vec<PeriodTimeRange>,
    errors: Vec<DayError>,
}

/// A student id must be a non-empty string of digits.
pub fn validate_student_id(student_id: &str) -> Result<(), TimetableError> {
    if student_id.is_empty() || !student_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(TimetableError::InvalidStudentId(student_id.to_string()));
    }
    Ok(())
}

/// Get the week of a student from the portal.
pub async fn get(config: &ClientConfig, student_id: &str) -> Result<WeekFetch, TimetableError> {
    validate_student_id(student_id)?;
    let client = ClassTableClient::new(config)?;
    fetch_week(Arc::new(client), student_id, config.timeout).await
}

/// Fetch and parse all weekdays in parallel and wait for every one of them.
///
/// A failing weekday is recorded in [`WeekFetch::errors`] and does not affect the
/// others. Each weekday gets `timeout` to complete.
pub async fn fetch_week(
    source: Arc<dyn DaySource>,
    student_id: &str,
    timeout: Duration,
) -> Result<WeekFetch, TimetableError> {
    validate_student_id(student_id)?;
    let accumulator = Arc::new(Mutex::new(Accumulator::default()));
    let handles: Vec<(Weekday, JoinHandle<()>)> = WEEKDAYS
        .iter()
        .map(|&weekday| {
            let source = Arc::clone(&source);
            let accumulator = Arc::clone(&accumulator);
            let student_id = student_id.to_string();
            let handle = tokio::spawn(async move {
                fetch_day(source.as_ref(), &student_id, weekday, timeout, &accumulator).await;
            });
            (weekday, handle)
        })
        .collect();
    for (weekday, handle) in handles {
        if let Err(err) = handle.await {
            error!(weekday = %weekday, "weekday worker failed: {}", err);
            accumulator
                .lock()
                .await
                .errors
                .push(DayError::new(weekday, DayErrorKind::Join(err.to_string())));
        }
    }
    let Accumulator {
        week,
        periods,
        errors,
    } = std::mem::take(&mut *accumulator.lock().await);
    Ok(WeekFetch {
        student_id: student_id.to_string(),
        week,
        periods,
        errors,
    })
}

/// Fetch, parse and record a single weekday.
async fn fetch_day(
    source: &dyn DaySource,
    student_id: &str,
    weekday: Weekday,
    timeout: Duration,
    accumulator: &Mutex<Accumulator>,
) {
    let fetched = tokio::time::timeout(timeout, source.fetch_day(student_id, weekday))
        .await
        .unwrap_or(Err(DayErrorKind::Timeout));
    match fetched {
        Ok(html) => {
            let (day_table, periods) = parse(&html, weekday == REFERENCE_WEEKDAY);
            debug!(weekday = %weekday, slots = day_table.len(), "parsed class table");
            let mut accumulator = accumulator.lock().await;
            if !accumulator.week.insert(weekday, day_table) {
                warn!(weekday = %weekday, "weekday already written, dropping duplicate");
            }
            if let Some(periods) = periods {
                accumulator.periods = periods;
            }
        }
        Err(kind) => {
            let error = DayError::new(weekday, kind);
            warn!("fetching class table failed: {}", error);
            accumulator.lock().await.errors.push(error);
        }
    }
}

/// Parse a page; the document is dropped before the caller awaits again.
fn parse(html: &str, with_periods: bool) -> (DayTable, Option<Vec<PeriodTimeRange>>) {
    let document = Html::parse_document(html);
    let periods = with_periods.then(|| parse_period_times(&document));
    (parse_day(&document), periods)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use async_trait::async_trait;
    use chrono::Weekday;

    use crate::{
        class_client::DaySource,
        error::{DayError, DayErrorKind, TimetableError},
        model::{weekday_index, ClassRecord, WEEKDAYS},
        week::{fetch_week, validate_student_id},
    };

    /// Builds a class table page from the `(name, teacher, room)` of each period.
    pub(crate) fn page(periods: &[(&str, &str)], cells: &[Option<(&str, &str, &str)>]) -> String {
        let mut html = String::from("<html><body><table>");
        for (index, (start, end)) in periods.iter().enumerate() {
            html.push_str(&format!(
                r#"<tr><th class="Stdth003">{}<br/>{start}<br/>{end}</th>"#,
                index + 1
            ));
            match cells.get(index).copied().flatten() {
                Some((name, teacher, room)) => html.push_str(&format!(
                    r#"<td class="Stdtd001"><a href="javascript:void(0)">{name}</a><br/>{teacher}<br/>{room}</td></tr>"#
                )),
                None => html.push_str(r#"<td class="Stdtd001"></td></tr>"#),
            }
        }
        html.push_str("</table></body></html>");
        html
    }

    pub(crate) static PERIODS: [(&str, &str); 3] =
        [("08:10", "09:00"), ("09:10", "10:00"), ("10:10", "11:00")];

    /// Serves fixed pages and failures per weekday.
    pub(crate) struct FakeSource {
        pub(crate) pages: HashMap<Weekday, Result<String, DayErrorKind>>,
        pub(crate) delay: Option<(Weekday, Duration)>,
        pub(crate) panic_on: Option<Weekday>,
    }

    #[async_trait]
    impl DaySource for FakeSource {
        async fn fetch_day(&self, student_id: &str, weekday: Weekday) -> Result<String, DayErrorKind> {
            assert_eq!(student_id, "11136001");
            if self.panic_on == Some(weekday) {
                panic!("class table for {weekday} is broken");
            }
            if let Some((slow_weekday, delay)) = self.delay {
                if slow_weekday == weekday {
                    tokio::time::sleep(delay).await;
                }
            }
            self.pages
                .get(&weekday)
                .cloned()
                .unwrap_or_else(|| Ok(page(&PERIODS, &[])))
        }
    }

    fn source(pages: HashMap<Weekday, Result<String, DayErrorKind>>) -> Arc<FakeSource> {
        Arc::new(FakeSource {
            pages,
            delay: None,
            panic_on: None,
        })
    }

    #[test]
    fn test_validate_student_id() {
        assert!(validate_student_id("11136001").is_ok());
        assert!(matches!(
            validate_student_id(""),
            Err(TimetableError::InvalidStudentId(_))
        ));
        assert!(matches!(
            validate_student_id("1113a001"),
            Err(TimetableError::InvalidStudentId(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_week_all_days() {
        let pages = HashMap::from([
            (
                Weekday::Mon,
                Ok(page(&PERIODS, &[Some(("Math", "Wang", "A1")), None])),
            ),
            (
                Weekday::Sat,
                Ok(page(&PERIODS, &[None, None, Some(("Art", "Lee", "B2"))])),
            ),
        ]);
        let fetch = fetch_week(source(pages), "11136001", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(fetch.errors.is_empty());
        assert_eq!(fetch.periods.len(), 3);
        assert_eq!(fetch.periods[2].start_at, "10:10");
        for weekday in WEEKDAYS {
            assert_eq!(
                fetch.week.day(weekday).len(),
                3,
                "weekday {}",
                weekday_index(weekday)
            );
        }
        assert_eq!(
            fetch.week.day(Weekday::Sat)[2],
            Some(ClassRecord {
                name: "Art".to_string(),
                teacher: Some("Lee".to_string()),
                room: Some("B2".to_string()),
            })
        );
        assert!(!fetch.is_vacant());
    }

    #[tokio::test]
    async fn test_fetch_week_failure_does_not_abort_siblings() {
        let pages = HashMap::from([
            (Weekday::Tue, Err(DayErrorKind::Status(500))),
            (
                Weekday::Wed,
                Ok(page(&PERIODS, &[Some(("Math", "Wang", "A1"))])),
            ),
        ]);
        let fetch = fetch_week(source(pages), "11136001", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(
            fetch.errors,
            vec![DayError::new(Weekday::Tue, DayErrorKind::Status(500))]
        );
        assert!(fetch.week.get(Weekday::Tue).is_none());
        assert!(fetch.week.day(Weekday::Wed)[0].is_some());
        assert_eq!(fetch.periods.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_week_reference_day_failure_leaves_no_periods() {
        let pages = HashMap::from([(
            Weekday::Mon,
            Err(DayErrorKind::Transport("connection reset".to_string())),
        )]);
        let fetch = fetch_week(source(pages), "11136001", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(fetch.periods.is_empty());
        assert_eq!(fetch.errors.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_week_timeout() {
        let fake = FakeSource {
            pages: HashMap::new(),
            delay: Some((Weekday::Fri, Duration::from_secs(60))),
            panic_on: None,
        };
        let fetch = fetch_week(Arc::new(fake), "11136001", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(
            fetch.errors,
            vec![DayError::new(Weekday::Fri, DayErrorKind::Timeout)]
        );
        assert_eq!(fetch.week.day(Weekday::Thu).len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_week_worker_panic() {
        let fake = FakeSource {
            pages: HashMap::new(),
            delay: None,
            panic_on: Some(Weekday::Thu),
        };
        let fetch = fetch_week(Arc::new(fake), "11136001", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(fetch.errors.len(), 1);
        assert_eq!(fetch.errors[0].weekday, Weekday::Thu);
        assert!(matches!(fetch.errors[0].kind, DayErrorKind::Join(_)));
        assert!(fetch.week.get(Weekday::Thu).is_none());
        for weekday in [Weekday::Mon, Weekday::Wed, Weekday::Fri, Weekday::Sun] {
            assert_eq!(fetch.week.day(weekday).len(), 3);
        }
        assert_eq!(fetch.periods.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_week_invalid_student_id() {
        let result = fetch_week(source(HashMap::new()), "abc", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(TimetableError::InvalidStudentId(_))));
    }
}
