//! This writer turns the merged calendar view into an iCalendar document.

use chrono::{Datelike, Days, NaiveDate};
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};

use crate::model::CalendarEvent;

static PROD_ID: &str = "-//NTUB Timetable Generator//EN";
static TIMEZONE: &str = "Asia/Taipei";
static FORMAT: &str = "%Y%m%d";
static UID_DOMAIN: &str = "ntub.tw";

/// Build the calendar of one week of classes, starting after `today`.
pub fn get_calendar(events: &[CalendarEvent], today: NaiveDate) -> IcalCalendar {
    let changed = format!("{}T000000Z", today.format(FORMAT));
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    calendar
        .properties
        .push(ical_property!("METHOD", "PUBLISH"));
    for event in events {
        calendar.events.push(get_event(event, today, &changed));
    }
    calendar
}

/// Build a single timed event.
fn get_event(event: &CalendarEvent, today: NaiveDate, changed: &str) -> IcalEvent {
    let date = class_date(today, event).format(FORMAT).to_string();
    IcalEventBuilder::tzid(TIMEZONE)
        .uid(uid(&date, &event.start, &event.class))
        .changed(changed)
        .start(date_time(&date, &event.start))
        .end(date_time(&date, &event.end))
        .set(ical_property!("SUMMARY", &event.class))
        .set(ical_property!("LOCATION", &event.place))
        .build()
}

/// The day the class is next held, 1 to 13 days after `today`.
pub fn class_date(today: NaiveDate, event: &CalendarEvent) -> NaiveDate {
    let offset = i64::from(event.weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday())
        + 7;
    today + Days::new(offset.unsigned_abs())
}

/// `20261026` and `08:10` give `20261026T081000`.
fn date_time(date: &str, time: &str) -> String {
    format!("{date}T{}00", time.replace(':', ""))
}

/// Get a unique id for a class at a specific date and start time.
///
/// Changing this function is a breaking change!
fn uid(date: &str, start: &str, class: &str) -> String {
    format!("{}Z-{class}@{UID_DOMAIN}", date_time(date, start))
}
