//! This builder derives the grid view and the merged calendar view from a fetched week.

use chrono::Weekday;
use tracing::warn;

use crate::{
    error::TimetableError,
    model::{
        weekday_name, CalendarEvent, ClassRecord, PeriodTimeRange, SlotRow, WeekTable, WEEKDAYS,
        WORKDAYS,
    },
    week::WeekFetch,
};

/// Build the grid view, one row per period, Monday to Friday only.
///
/// An unknown student takes precedence over failed weekdays; any failed weekday
/// suppresses the whole grid.
pub fn single_table(fetch: &WeekFetch) -> Result<Vec<SlotRow>, TimetableError> {
    fetch.ensure_known()?;
    if !fetch.errors.is_empty() {
        return Err(TimetableError::PartialFailure(fetch.errors.clone()));
    }
    Ok(slot_rows(&fetch.week, &fetch.periods))
}

/// One row per period labelled with its time, holding the class descriptions of the workdays.
pub fn slot_rows(week: &WeekTable, periods: &[PeriodTimeRange]) -> Vec<SlotRow> {
    periods
        .iter()
        .enumerate()
        .map(|(index, period)| {
            let mut row = SlotRow::new(period.label());
            for weekday in WORKDAYS {
                if let Some(Some(class)) = week.day(weekday).get(index) {
                    row.classes
                        .insert(weekday_name(weekday).to_string(), class.description());
                }
            }
            row
        })
        .collect()
}

/// Build the merged calendar view from every weekday that could be fetched.
///
/// Failed weekdays are logged and left out.
pub fn merged_events(fetch: &WeekFetch) -> Result<Vec<CalendarEvent>, TimetableError> {
    fetch.ensure_known()?;
    for error in &fetch.errors {
        warn!("calendar is missing a weekday: {}", error);
    }
    Ok(calendar_events(&fetch.week, &fetch.periods))
}

/// A period a class takes place in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub period: usize,
    pub start: String,
    pub end: String,
}

/// All periods of one weekday held by the same class, teacher and room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
    pub class: ClassRecord,
    pub weekday: Weekday,
    /// Ordered by period.
    pub occurrences: Vec<Occurrence>,
}

impl ClassGroup {
    /// One event from the start of the first occurrence to the end of the last.
    ///
    /// Occurrences need not be contiguous: a class held in periods 2 and 5 yields a
    /// single event spanning periods 2 to 5.
    pub fn event(&self) -> Option<CalendarEvent> {
        let first = self.occurrences.first()?;
        let last = self.occurrences.last()?;
        Some(CalendarEvent {
            class: self.class.name.clone(),
            place: self.class.room.clone().unwrap_or_default(),
            weekday: self.weekday,
            start: first.start.clone(),
            end: last.end.clone(),
        })
    }
}

/// Group the periods of a weekday by class, in order of first appearance.
pub fn group_day(
    weekday: Weekday,
    slots: &[Option<ClassRecord>],
    periods: &[PeriodTimeRange],
) -> Vec<ClassGroup> {
    let mut groups: Vec<ClassGroup> = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        let Some(class) = slot else {
            continue;
        };
        let Some(period) = periods.get(index) else {
            warn!(weekday = %weekday, period = index + 1, "class without period time, skipping");
            continue;
        };
        let occurrence = Occurrence {
            period: index + 1,
            start: period.start_at.clone(),
            end: period.end_display().to_string(),
        };
        match groups.iter_mut().find(|group| &group.class == class) {
            Some(group) => group.occurrences.push(occurrence),
            None => groups.push(ClassGroup {
                class: class.clone(),
                weekday,
                occurrences: vec![occurrence],
            }),
        }
    }
    groups
}

/// The calendar events of all weekdays, Monday first.
pub fn calendar_events(week: &WeekTable, periods: &[PeriodTimeRange]) -> Vec<CalendarEvent> {
    WEEKDAYS
        .iter()
        .flat_map(|&weekday| group_day(weekday, week.day(weekday), periods))
        .filter_map(|group| group.event())
        .collect()
}
