//! The timetable data shared by the parser, the aggregator and the table builder.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Serialize;

/// All weekdays in fetch order, Monday (index 1) to Sunday (index 7).
pub static WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// The weekdays shown in the grid view.
pub static WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Length of the markup suffix every parsed end time carries.
pub const END_SUFFIX_LEN: usize = 5;

/// The portal's weekday index, 1 for Monday up to 7 for Sunday.
pub fn weekday_index(weekday: Weekday) -> u32 {
    weekday.number_from_monday()
}

/// The key of a weekday in the grid view.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// One period of the day as announced by the period headers.
///
/// `end_at` is kept exactly as parsed, including the trailing markup suffix.
/// Use [`PeriodTimeRange::end_display`] wherever the end time is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTimeRange {
    /// 1-based position of the period within the day.
    pub period: usize,
    pub class_no: String,
    pub start_at: String,
    pub end_at: String,
}

impl PeriodTimeRange {
    /// The end time without its markup suffix.
    pub fn end_display(&self) -> &str {
        let cut = self.end_at.chars().count().saturating_sub(END_SUFFIX_LEN);
        match self.end_at.char_indices().nth(cut) {
            Some((byte_index, _)) => &self.end_at[..byte_index],
            None => &self.end_at,
        }
    }

    /// The time label of a grid row, e.g. `08:10 - 09:00`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_at, self.end_display())
    }
}

/// A course occupying one period.
///
/// Cells listing fewer than three fields leave the trailing ones empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRecord {
    pub name: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
}

impl ClassRecord {
    /// The grid cell text, `{name} - {teacher} ({room})`.
    pub fn description(&self) -> String {
        format!(
            "{} - {} ({})",
            self.name,
            self.teacher.as_deref().unwrap_or_default(),
            self.room.as_deref().unwrap_or_default()
        )
    }
}

/// The periods of one weekday; `None` marks a vacant period.
pub type DayTable = Vec<Option<ClassRecord>>;

/// The day tables of a week, each weekday written at most once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeekTable {
    days: [Option<DayTable>; 7],
}

impl WeekTable {
    /// Store the table of a weekday.
    ///
    /// Returns `false` and keeps the existing table if the weekday was already written.
    pub fn insert(&mut self, weekday: Weekday, day_table: DayTable) -> bool {
        let slot = &mut self.days[weekday.num_days_from_monday() as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(day_table);
        true
    }

    /// The table of a weekday, `None` if it was never written.
    pub fn get(&self, weekday: Weekday) -> Option<&DayTable> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// The periods of a weekday; a weekday that was never written has none.
    pub fn day(&self, weekday: Weekday) -> &[Option<ClassRecord>] {
        self.get(weekday).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether every slot of every weekday is vacant.
    pub fn is_vacant(&self) -> bool {
        WEEKDAYS
            .iter()
            .all(|weekday| self.day(*weekday).iter().all(Option::is_none))
    }
}

/// A row of the grid view: one period and the classes held in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    pub time: String,
    /// Class descriptions keyed by [`weekday_name`]; vacant weekdays are absent.
    #[serde(flatten)]
    pub classes: BTreeMap<String, String>,
}

impl SlotRow {
    pub fn new(time: String) -> Self {
        Self {
            time,
            classes: BTreeMap::new(),
        }
    }

    pub fn get(&self, weekday: Weekday) -> Option<&str> {
        self.classes
            .get(weekday_name(weekday))
            .map(String::as_str)
            .filter(|description| !description.is_empty())
    }
}

/// A class session of the merged calendar view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub class: String,
    pub place: String,
    pub weekday: Weekday,
    pub start: String,
    pub end: String,
}

/// The calendar view as parallel columns, one entry per [`CalendarEvent`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarColumns {
    pub class: Vec<String>,
    pub place: Vec<String>,
    pub day: Vec<u32>,
    pub start: Vec<String>,
    pub end: Vec<String>,
}

impl From<&[CalendarEvent]> for CalendarColumns {
    fn from(events: &[CalendarEvent]) -> Self {
        let mut columns = CalendarColumns::default();
        for event in events {
            columns.class.push(event.class.clone());
            columns.place.push(event.place.clone());
            columns.day.push(weekday_index(event.weekday));
            columns.start.push(event.start.clone());
            columns.end.push(event.end.clone());
        }
        columns
    }
}
