//! Contiguous blocks of the grid view.
//!
//! Unlike the calendar view, which groups identical classes of a weekday wherever
//! they occur, a block only spans consecutive rows showing the same description.

use chrono::{NaiveTime, Timelike, Weekday};

use crate::model::{SlotRow, WORKDAYS};

/// A run of consecutive rows with the same content, `first` and `last` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub first: usize,
    pub last: usize,
    pub content: String,
}

impl Block {
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_merged(&self) -> bool {
        self.last > self.first
    }
}

/// Merge consecutive identical descriptions into blocks.
///
/// A changed description or a vacant (absent or empty) one closes the current block.
pub fn contiguous_blocks<'a, I>(cells: I) -> Vec<Block>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut blocks: Vec<Block> = Vec::new();
    let mut open = false;
    for (index, cell) in cells.into_iter().enumerate() {
        let position = index + 1;
        match cell.filter(|content| !content.is_empty()) {
            Some(content) => {
                let current = blocks.last_mut().filter(|block| open && block.content == content);
                if let Some(block) = current {
                    block.last = position;
                    continue;
                }
                blocks.push(Block {
                    first: position,
                    last: position,
                    content: content.to_string(),
                });
                open = true;
            }
            None => open = false,
        }
    }
    blocks
}

/// What the grid renderer draws: the workdays and rows holding at least one class.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout<'a> {
    pub weekdays: Vec<Weekday>,
    /// Ordered by start time.
    pub rows: Vec<&'a SlotRow>,
}

impl<'a> GridLayout<'a> {
    pub fn new(rows: &'a [SlotRow]) -> Self {
        let weekdays: Vec<Weekday> = WORKDAYS
            .iter()
            .copied()
            .filter(|&weekday| rows.iter().any(|row| row.get(weekday).is_some()))
            .collect();
        let mut visible_rows: Vec<&SlotRow> = rows
            .iter()
            .filter(|row| weekdays.iter().any(|&weekday| row.get(weekday).is_some()))
            .collect();
        visible_rows.sort_by_key(|row| start_minutes(&row.time));
        Self {
            weekdays,
            rows: visible_rows,
        }
    }

    /// The blocks of every visible weekday, positions relative to [`GridLayout::rows`].
    pub fn blocks(&self) -> Vec<(Weekday, Vec<Block>)> {
        self.weekdays
            .iter()
            .map(|&weekday| {
                let cells = self.rows.iter().map(|row| row.get(weekday));
                (weekday, contiguous_blocks(cells))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Minutes since midnight of a `HH:MM - HH:MM` label's start, 0 if unreadable.
fn start_minutes(label: &str) -> u32 {
    let start = label.split_once('-').map_or("", |(start, _)| start);
    NaiveTime::parse_from_str(start.trim(), "%H:%M")
        .map(|time| time.num_seconds_from_midnight() / 60)
        .unwrap_or(0)
}
