//! This parser extracts the classes and the period times from a class table page.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::model::{ClassRecord, DayTable, PeriodTimeRange};

static DAY_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td.Stdtd001").unwrap());
static COURSE_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static PERIOD_HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("th.Stdth003").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// The classes of one weekday, one slot per day cell in document order.
pub fn parse_day(document: &Html) -> DayTable {
    document.select(&DAY_CELL).map(parse_cell).collect()
}

/// Parse a day cell into a class.
///
/// The cell lists name, teacher and room separated by line breaks. The name is taken
/// from the first link; a cell without a name is vacant whatever else it contains.
fn parse_cell(cell: ElementRef) -> Option<ClassRecord> {
    let name = cell
        .select(&COURSE_NAME)
        .next()
        .map(|link| link.text().collect::<String>())
        .unwrap_or_default();
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let markup = cell.html();
    let mut fields = LINE_BREAK.split(&markup).skip(1).take(2).map(strip_markup);
    Some(ClassRecord {
        name: name.to_string(),
        teacher: fields.next(),
        room: fields.next(),
    })
}

/// Keep the text in front of any nested markup.
///
/// A room shared by several teachers is followed by a fragment naming the others.
fn strip_markup(field: &str) -> String {
    field.split('<').next().unwrap_or(field).trim().to_string()
}

/// The period times announced by the period headers.
///
/// A header holds the period label, the start and the end time separated by line
/// breaks; missing fields are empty. The end time keeps the closing tag of the header
/// (see [`PeriodTimeRange::end_display`]).
pub fn parse_period_times(document: &Html) -> Vec<PeriodTimeRange> {
    document
        .select(&PERIOD_HEADER)
        .enumerate()
        .map(|(index, header)| {
            let markup = header.html();
            let fragments: Vec<&str> = LINE_BREAK.split(&markup).collect();
            let field = |position: usize| fragments.get(position).copied().unwrap_or_default();
            let label = field(0).split_once('>').map_or(field(0), |(_, label)| label);
            PeriodTimeRange {
                period: index + 1,
                class_no: strip_markup(label),
                start_at: field(1).trim().to_string(),
                end_at: field(2).trim_start().to_string(),
            }
        })
        .collect()
}
