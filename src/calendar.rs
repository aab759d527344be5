//! Review date parsing and the calendar columns derived from it.
//!
//! The listings carry a `last review` date. The review section groups by its
//! year, month and weekday, so when those columns are absent they are derived
//! here at load time.

use crate::data::{columns, Dataset};
use crate::error::{DashError, DashResult};
use chrono::{Datelike, NaiveDate, Weekday};
use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::tuple,
    IResult,
};

fn uint(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

fn year(input: &str) -> IResult<&str, i32> {
    map_res(digit1, |s: &str| s.parse::<i32>())(input)
}

/// `YYYY-MM-DD`
fn iso_date(input: &str) -> IResult<&str, (i32, u32, u32)> {
    let (input, (y, _, m, _, d)) = tuple((year, char('-'), uint, char('-'), uint))(input)?;
    Ok((input, (y, m, d)))
}

/// `M/D/YYYY`
fn us_date(input: &str) -> IResult<&str, (i32, u32, u32)> {
    let (input, (m, _, d, _, y)) = tuple((uint, char('/'), uint, char('/'), year))(input)?;
    Ok((input, (y, m, d)))
}

/// Parse a review date. Returns `None` for anything that is not a real calendar date.
pub fn parse_review_date(input: &str) -> Option<NaiveDate> {
    let (_, (y, m, d)) = all_consuming(alt((iso_date, us_date)))(input.trim()).ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Append year/month/day-name columns computed from `last review` when the
/// dataset has the date but not the derived columns. Existing columns are kept.
pub fn derive_review_columns(dataset: Dataset) -> DashResult<Dataset> {
    if !dataset.has_column(columns::LAST_REVIEW) {
        return Ok(dataset);
    }

    let wanted: Vec<&str> = [
        columns::REVIEW_YEAR,
        columns::REVIEW_MONTH,
        columns::REVIEW_DAY_NAME,
    ]
    .into_iter()
    .filter(|name| !dataset.has_column(name))
    .collect();

    if wanted.is_empty() {
        return Ok(dataset);
    }

    let col = dataset.column_index(columns::LAST_REVIEW)?;
    let mut years = Vec::with_capacity(dataset.len());
    let mut months = Vec::with_capacity(dataset.len());
    let mut days = Vec::with_capacity(dataset.len());

    for row in 0..dataset.len() {
        let raw = dataset.cell(row, col);
        if raw.trim().is_empty() {
            years.push(String::new());
            months.push(String::new());
            days.push(String::new());
            continue;
        }
        let date = parse_review_date(raw).ok_or_else(|| DashError::InvalidDate {
            column: columns::LAST_REVIEW.to_string(),
            value: raw.to_string(),
            row: row + 1,
        })?;
        years.push(date.year().to_string());
        months.push(date.month().to_string());
        days.push(day_name(date.weekday()).to_string());
    }

    let mut dataset = dataset;
    for name in wanted {
        let values = match name {
            columns::REVIEW_YEAR => std::mem::take(&mut years),
            columns::REVIEW_MONTH => std::mem::take(&mut months),
            _ => std::mem::take(&mut days),
        };
        dataset = dataset.with_column(name, values);
    }
    Ok(dataset)
}
