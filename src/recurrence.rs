//! Expands stored time blocks into the blocks that occur on a given date.
//!
//! Non-recurring blocks appear only on their anchor date. Recurring blocks are
//! matched against the target date by frequency and interval; nothing is ever
//! materialized into the store. Blocks whose stored fields fail to parse are
//! skipped for the date being resolved.

use crate::error::Result;
use crate::model::{parse_date, parse_time, CalendarData, Frequency, RecurrenceRule, TimeBlock};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// A stored block occurring on `occurrence_date`. `block.start_date` still
/// names the anchor the series originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBlock<'a> {
    pub occurrence_date: NaiveDate,
    pub block: &'a TimeBlock,
}

/// Blocks occurring on `date`, ascending by start time. Ties keep the order in
/// which blocks are stored.
pub fn resolve_blocks_for_date(date: NaiveDate, store: &CalendarData) -> Vec<ResolvedBlock<'_>> {
    let mut resolved: Vec<(NaiveTime, ResolvedBlock<'_>)> = store
        .time_blocks()
        .filter_map(|block| match occurrence_start(block, date) {
            Ok(start) => start.map(|start| {
                (
                    start,
                    ResolvedBlock {
                        occurrence_date: date,
                        block,
                    },
                )
            }),
            Err(err) => {
                tracing::debug!(block = %block.id, %date, error = %err, "skipping malformed time block");
                None
            }
        })
        .collect();
    resolved.sort_by_key(|(start, _)| *start);
    resolved.into_iter().map(|(_, r)| r).collect()
}

/// Resolves `days` consecutive dates starting at `from`.
pub fn resolve_range(
    from: NaiveDate,
    days: u32,
    store: &CalendarData,
) -> Vec<(NaiveDate, Vec<ResolvedBlock<'_>>)> {
    from.iter_days()
        .take(days as usize)
        .map(|date| (date, resolve_blocks_for_date(date, store)))
        .collect()
}

/// Whether `block` occurs on `date`. Errors when a field the decision depends
/// on does not parse.
pub fn occurs_on(block: &TimeBlock, date: NaiveDate) -> Result<bool> {
    let anchor = parse_date(&block.start_date)?;
    match &block.recurrence {
        None => Ok(anchor == date),
        Some(rule) => rule_matches(rule, anchor, date),
    }
}

fn occurrence_start(block: &TimeBlock, date: NaiveDate) -> Result<Option<NaiveTime>> {
    if !occurs_on(block, date)? {
        return Ok(None);
    }
    let start = parse_time(&block.start_time)?;
    parse_time(&block.end_time)?;
    Ok(Some(start))
}

fn rule_matches(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> Result<bool> {
    rule.validate()?;
    let end = rule.end_date.as_deref().map(parse_date).transpose()?;
    if date < anchor {
        return Ok(false);
    }
    if matches!(end, Some(end) if date > end) {
        return Ok(false);
    }
    let interval = i64::from(rule.interval);

    let aligned = match rule.frequency {
        Frequency::Daily => (date - anchor).num_days() % interval == 0,
        Frequency::Weekly => {
            let weekday = weekday_index(date);
            let on_day = if rule.days_of_week.is_empty() {
                weekday == weekday_index(anchor)
            } else {
                rule.days_of_week.contains(&weekday)
            };
            on_day && weeks_between(anchor, date) % interval == 0
        }
        Frequency::Monthly => {
            date.day() == anchor.day() && months_between(anchor, date) % interval == 0
        }
        Frequency::Yearly => {
            date.month() == anchor.month()
                && date.day() == anchor.day()
                && i64::from(date.year() - anchor.year()) % interval == 0
        }
    };
    Ok(aligned)
}

/// 0 = Sunday .. 6 = Saturday.
fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (week_start(to) - week_start(from)).num_days() / 7
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month0()) - i64::from(from.month0())
}
