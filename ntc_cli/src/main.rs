use std::{env::current_dir, fs::write, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ntc_core::{
    calendar,
    class_client::ClientConfig,
    error::TimetableError,
    grid::{Block, GridLayout},
    ical::generator::Emitter,
    model::weekday_name,
    table,
    week::{self, WeekFetch},
};
use reqwest::Url;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// print the weekly grid
    Grid,
    /// write the iCalendar file
    Calendar,
    /// print the grid and write the iCalendar file
    Both,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Arguments {
    /// the student id
    pub student_id: String,
    /// the class table endpoint of the student portal
    #[arg(long, env = "NTC_CLASS_TABLE_URL")]
    pub url: Url,
    /// seconds to wait for the class table of each weekday
    #[arg(long, env = "NTC_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,
    /// what to produce
    #[arg(long, value_enum, default_value_t = View::Both)]
    pub view: View,
    /// directory to write the calendar file to, defaults to the current directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<&Arguments> for ClientConfig {
    fn from(value: &Arguments) -> Self {
        ClientConfig {
            url: value.url.clone(),
            timeout: Duration::from_secs(value.timeout),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Arguments::parse();
    let fetch = week::get(&ClientConfig::from(&args), &args.student_id).await?;
    if matches!(args.view, View::Grid | View::Both) {
        print_grid(&fetch)?;
    }
    if matches!(args.view, View::Calendar | View::Both) {
        write_calendar(&args, &fetch)?;
    }
    Ok(())
}

/// Print the merged blocks of every weekday that has classes.
fn print_grid(fetch: &WeekFetch) -> Result<()> {
    let rows = match table::single_table(fetch) {
        Ok(rows) => rows,
        Err(TimetableError::PartialFailure(errors)) => {
            for error in &errors {
                warn!("{}", error);
            }
            warn!("not all weekdays could be fetched, skipping the grid");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let layout = GridLayout::new(&rows);
    for (weekday, blocks) in layout.blocks() {
        println!("{}", weekday_name(weekday));
        for block in blocks {
            println!("  {}  {}", span(&layout, &block), block.content);
        }
    }
    Ok(())
}

/// The time a block covers, from the start of its first row to the end of its last.
fn span(layout: &GridLayout, block: &Block) -> String {
    let start = layout.rows[block.first - 1].time.split(" - ").next();
    let end = layout.rows[block.last - 1].time.split(" - ").last();
    format!("{} - {}", start.unwrap_or_default(), end.unwrap_or_default())
}

fn write_calendar(args: &Arguments, fetch: &WeekFetch) -> Result<()> {
    let events = table::merged_events(fetch)?;
    let today = chrono::Local::now().date_naive();
    let calendar = calendar::get_calendar(&events, today);
    let mut path = match &args.output {
        Some(output) => output.clone(),
        None => current_dir()?,
    };
    path.push(format!("{}_timetable.ics", fetch.student_id));
    write(&path, calendar.generate())?;
    info!("wrote {} events to {}", events.len(), path.display());
    Ok(())
}
