//! This crate fetches a student's weekly class schedule from the NTUB student portal,
//! parses it into a timetable and derives a grid view and a calendar view from it.
//!
//! The schedule is posted once per weekday to the class table endpoint; the seven days
//! are fetched concurrently and merged into one [`model::WeekTable`].

pub use ical;

pub mod calendar;
pub mod class_client;
pub mod day_parser;
pub mod error;
pub mod grid;
pub mod model;
pub mod table;
pub mod week;
