//! Date operations
//!
//! Named styles for `format` / `to_formatted_s` follow the usual Rails date
//! formats; anything containing `%` is taken as a strftime pattern.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate};

use super::{object, Args};
use crate::error::{LiquefyError, LiquefyResult};
use crate::value::Value;

pub(super) fn date(value: &Value, d: NaiveDate, args: &Args<'_>) -> LiquefyResult<Value> {
    let op = args.operation();
    match op {
        "format" | "to_formatted_s" | "to_fs" | "to_s" => {
            args.between(0, 1)?;
            let style = if args.is_empty() { "default" } else { args.str(0)? };
            Ok(Value::Str(format_style(d, style)?))
        }
        "strftime" => {
            args.exactly(1)?;
            Ok(Value::Str(strftime(d, args.str(0)?)?))
        }
        "iso8601" => {
            args.none()?;
            Ok(Value::Str(d.format("%Y-%m-%d").to_string()))
        }
        "year" => component(args, i64::from(d.year())),
        "month" | "mon" => component(args, i64::from(d.month())),
        "day" | "mday" => component(args, i64::from(d.day())),
        "wday" => component(args, i64::from(d.weekday().num_days_from_sunday())),
        "yday" => component(args, i64::from(d.ordinal())),
        "leap?" => {
            args.none()?;
            Ok(Value::Bool(is_leap_year(d.year())))
        }
        "next_day" | "succ" | "next" | "prev_day" => {
            args.between(0, 1)?;
            let n = if args.is_empty() { 1 } else { args.int(0)? };
            let n = if op == "prev_day" { n.checked_neg() } else { Some(n) };
            shift(args, d, n)
        }
        "+" => {
            args.exactly(1)?;
            shift(args, d, Some(args.int(0)?))
        }
        "-" => match &args.exactly(1)?[0] {
            Value::Date(other) => Ok(Value::Int(d.signed_duration_since(*other).num_days())),
            _ => shift(args, d, args.int(0)?.checked_neg()),
        },
        _ => object(value, args),
    }
}

fn component(args: &Args<'_>, n: i64) -> LiquefyResult<Value> {
    args.none()?;
    Ok(Value::Int(n))
}

fn shift(args: &Args<'_>, d: NaiveDate, days: Option<i64>) -> LiquefyResult<Value> {
    let shifted = days.and_then(|n| {
        let delta = Days::new(n.unsigned_abs());
        if n >= 0 {
            d.checked_add_days(delta)
        } else {
            d.checked_sub_days(delta)
        }
    });
    shifted
        .map(Value::Date)
        .ok_or_else(|| args.invalid("date out of range"))
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Render `d` in a named style or a strftime pattern.
pub(crate) fn format_style(d: NaiveDate, style: &str) -> LiquefyResult<String> {
    let pattern = match style {
        "default" | "db" | "iso8601" | "inspect" => "%Y-%m-%d",
        "number" => "%Y%m%d",
        "short" => "%-d %b",
        "long" => "%B %-d, %Y",
        "rfc822" => "%-d %b %Y",
        "long_ordinal" => {
            return Ok(format!(
                "{} {}, {}",
                d.format("%B"),
                ordinalize(d.day()),
                d.year()
            ))
        }
        pattern if pattern.contains('%') => pattern,
        unknown => {
            return Err(LiquefyError::Format(format!("unknown date style `{unknown}'")));
        }
    };
    strftime(d, pattern)
}

fn strftime(d: NaiveDate, pattern: &str) -> LiquefyResult<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(LiquefyError::Format(format!("invalid strftime pattern `{pattern}'")));
    }
    let mut out = String::new();
    // Time fields have nothing to render for a date and surface as fmt errors.
    write!(out, "{}", d.format_with_items(items.iter()))
        .map_err(|_| LiquefyError::Format(format!("pattern `{pattern}' needs a time of day")))?;
    Ok(out)
}

fn ordinalize(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}
