use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type BlockId = String;

/// Rich note content attached to a day. Stored and carried as-is.
pub type ContentBlock = serde_yaml::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Semantic tag shared by day markers, day theme colors and time blocks.
///
/// Values outside the seven known names are kept as [`Category::Legacy`] so
/// older data survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Focus,
    Joy,
    Health,
    Rest,
    Social,
    Create,
    Review,
    Legacy(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub label: &'static str,
    pub color: &'static str,
}

const LEGACY_STYLE: CategoryStyle = CategoryStyle {
    label: "Other",
    color: "#9ca3af",
};

impl Category {
    pub const KNOWN: [Category; 7] = [
        Category::Focus,
        Category::Joy,
        Category::Health,
        Category::Rest,
        Category::Social,
        Category::Create,
        Category::Review,
    ];

    pub fn name(&self) -> &str {
        match self {
            Category::Focus => "focus",
            Category::Joy => "joy",
            Category::Health => "health",
            Category::Rest => "rest",
            Category::Social => "social",
            Category::Create => "create",
            Category::Review => "review",
            Category::Legacy(raw) => raw,
        }
    }

    pub fn style(&self) -> CategoryStyle {
        let (label, color) = match self {
            Category::Focus => ("Focus", "#3b82f6"),
            Category::Joy => ("Joy", "#facc15"),
            Category::Health => ("Health", "#22c55e"),
            Category::Rest => ("Rest", "#a855f7"),
            Category::Social => ("Social", "#f97316"),
            Category::Create => ("Create", "#ec4899"),
            Category::Review => ("Review", "#14b8a6"),
            Category::Legacy(_) => return LEGACY_STYLE,
        };
        CategoryStyle { label, color }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::KNOWN
            .iter()
            .find(|c| c.name() == raw)
            .cloned()
            .unwrap_or(Category::Legacy(raw))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.name().to_string()
    }
}

/// Strict parse for user input: only the seven known names are accepted.
impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        match Category::from(lowered) {
            Category::Legacy(_) => Err(Error::UnknownCategory(s.to_string())),
            known => Ok(known),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// 0 = Sunday .. 6 = Saturday. Empty means "the anchor's weekday".
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        RecurrenceRule {
            frequency,
            interval: 1,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(Error::InvalidInterval);
        }
        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(Error::InvalidWeekday(*day));
        }
        if let Some(end) = &self.end_date {
            parse_date(end)?;
        }
        Ok(())
    }
}

/// A scheduled interval anchored on `start_date`. Recurring occurrences on
/// other dates are computed by the resolver and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: BlockId,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Category,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl TimeBlock {
    pub fn new(
        id: BlockId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        title: String,
        category: Category,
        recurrence: Option<RecurrenceRule>,
    ) -> Result<Self> {
        let block = TimeBlock {
            id,
            start_time: format_time(start),
            end_time: format_time(end),
            title,
            category,
            start_date: format_date(date),
            recurrence,
        };
        block.validate()?;
        Ok(block)
    }

    pub fn validate(&self) -> Result<()> {
        self.anchor()?;
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        if end <= start {
            return Err(Error::InvalidRange {
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        if let Some(rule) = &self.recurrence {
            rule.validate()?;
        }
        Ok(())
    }

    pub fn anchor(&self) -> Result<NaiveDate> {
        parse_date(&self.start_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredDay", into = "StoredDay")]
pub struct DayData {
    pub note: String,
    pub dots: Vec<Category>,
    pub time_blocks: Vec<TimeBlock>,
    /// Stored blocks that no longer read as a [`TimeBlock`]. They never
    /// resolve, and are written back as they were found.
    pub unreadable_blocks: Vec<serde_yaml::Value>,
    pub content_blocks: Vec<ContentBlock>,
    pub day_color: Option<Category>,
}

/// On-disk shape of a day. A block that fails to parse stays a raw value so
/// it cannot take the rest of the calendar down with it.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDay {
    #[serde(default)]
    note: String,
    #[serde(default)]
    dots: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    time_blocks: Vec<StoredBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content_blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_color: Option<Category>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredBlock {
    Block(TimeBlock),
    Unreadable(serde_yaml::Value),
}

impl From<StoredDay> for DayData {
    fn from(stored: StoredDay) -> Self {
        let mut time_blocks = Vec::new();
        let mut unreadable_blocks = Vec::new();
        for block in stored.time_blocks {
            match block {
                StoredBlock::Block(b) => time_blocks.push(b),
                StoredBlock::Unreadable(raw) => {
                    tracing::warn!("keeping unreadable time block as-is");
                    unreadable_blocks.push(raw);
                }
            }
        }
        DayData {
            note: stored.note,
            dots: stored.dots,
            time_blocks,
            unreadable_blocks,
            content_blocks: stored.content_blocks,
            day_color: stored.day_color,
        }
    }
}

impl From<DayData> for StoredDay {
    fn from(day: DayData) -> Self {
        let time_blocks = day
            .time_blocks
            .into_iter()
            .map(StoredBlock::Block)
            .chain(day.unreadable_blocks.into_iter().map(StoredBlock::Unreadable))
            .collect();
        StoredDay {
            note: day.note,
            dots: day.dots,
            time_blocks,
            content_blocks: day.content_blocks,
            day_color: day.day_color,
        }
    }
}

impl DayData {
    pub fn is_empty(&self) -> bool {
        self.note.is_empty()
            && self.dots.is_empty()
            && self.time_blocks.is_empty()
            && self.unreadable_blocks.is_empty()
            && self.content_blocks.is_empty()
            && self.day_color.is_none()
    }

    /// Adds the marker if absent, removes it if present. Markers stay unique.
    pub fn toggle_dot(&mut self, category: Category) {
        let before = self.dots.len();
        self.dots.retain(|c| *c != category);
        if self.dots.len() == before {
            self.dots.push(category);
        }
    }
}

/// `"{year}-{month0}"` -> `"{day}"` -> [`DayData`]. A missing day is the same
/// as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarData {
    months: BTreeMap<String, BTreeMap<String, DayData>>,
}

pub fn month_key(year: i32, month0: u32) -> String {
    format!("{}-{}", year, month0)
}

pub fn day_key(day: u32) -> String {
    day.to_string()
}

fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    // the year may carry a sign, so split on the last dash
    let (year, month0) = key.rsplit_once('-')?;
    Some((year.parse().ok()?, month0.parse().ok()?))
}

/// Sort key placing parsed keys first, in numeric order. `sort_by_key` is
/// stable, so unparsed keys keep their map order.
fn numeric_order<T: Ord>(parsed: Option<T>) -> (bool, Option<T>) {
    (parsed.is_none(), parsed)
}

fn keys_for(date: NaiveDate) -> (String, String) {
    (month_key(date.year(), date.month0()), day_key(date.day()))
}

impl CalendarData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.months
            .values()
            .all(|days| days.values().all(DayData::is_empty))
    }

    /// Default-filling read: `month0` is zero-based, `day` one-based.
    pub fn get_day_data(&self, year: i32, month0: u32, day: u32) -> DayData {
        self.months
            .get(&month_key(year, month0))
            .and_then(|days| days.get(&day_key(day)))
            .cloned()
            .unwrap_or_default()
    }

    pub fn day(&self, date: NaiveDate) -> DayData {
        self.get_day_data(date.year(), date.month0(), date.day())
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DayData {
        let (month, day) = keys_for(date);
        self.months.entry(month).or_default().entry(day).or_default()
    }

    /// Every stored block, across all months and days, in calendar order of
    /// the days they are stored on.
    pub fn time_blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.days_in_order()
            .into_iter()
            .flat_map(|day| day.time_blocks.iter())
    }

    /// Days ordered by numeric (year, month, day). Keys that do not parse go
    /// last, in key order.
    fn days_in_order(&self) -> Vec<&DayData> {
        let mut months: Vec<_> = self.months.iter().collect();
        months.sort_by_key(|(key, _)| numeric_order(parse_month_key(key)));
        months
            .into_iter()
            .flat_map(|(_, days)| {
                let mut days: Vec<_> = days.iter().collect();
                days.sort_by_key(|(key, _)| numeric_order(key.parse::<u32>().ok()));
                days.into_iter().map(|(_, day)| day)
            })
            .collect()
    }

    pub fn find_time_block(&self, id: &str) -> Option<&TimeBlock> {
        self.time_blocks().find(|b| b.id == id)
    }

    pub fn set_note(&mut self, date: NaiveDate, note: impl Into<String>) {
        self.day_mut(date).note = note.into();
        self.prune_empty();
    }

    pub fn toggle_dot(&mut self, date: NaiveDate, category: Category) {
        self.day_mut(date).toggle_dot(category);
        self.prune_empty();
    }

    pub fn set_day_color(&mut self, date: NaiveDate, color: Option<Category>) {
        self.day_mut(date).day_color = color;
        self.prune_empty();
    }

    /// Stores the block on the day of its anchor date.
    pub fn add_time_block(&mut self, block: TimeBlock) -> Result<()> {
        block.validate()?;
        let anchor = block.anchor()?;
        self.day_mut(anchor).time_blocks.push(block);
        Ok(())
    }

    pub fn remove_time_block(&mut self, id: &str) -> Result<TimeBlock> {
        let (month, day, idx) = self
            .locate_block(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        let removed = self
            .months
            .get_mut(&month)
            .and_then(|days| days.get_mut(&day))
            .map(|d| d.time_blocks.remove(idx))
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        self.prune_empty();
        Ok(removed)
    }

    /// Edits a block in place. A changed anchor date moves the block to the
    /// new day. The edit is discarded if the result does not validate.
    pub fn update_time_block<F>(&mut self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut TimeBlock),
    {
        let mut edited = self
            .find_time_block(id)
            .cloned()
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        let anchor = edited.start_date.clone();
        f(&mut edited);
        edited.id = id.to_string();
        edited.validate()?;

        if edited.start_date == anchor {
            if let Some((month, day, idx)) = self.locate_block(id) {
                if let Some(d) = self.months.get_mut(&month).and_then(|m| m.get_mut(&day)) {
                    d.time_blocks[idx] = edited;
                }
            }
            return Ok(());
        }
        self.remove_time_block(id)?;
        self.add_time_block(edited)
    }

    /// Drops empty days and months left without days.
    pub fn prune_empty(&mut self) {
        for days in self.months.values_mut() {
            days.retain(|_, d| !d.is_empty());
        }
        self.months.retain(|_, days| !days.is_empty());
    }

    fn locate_block(&self, id: &str) -> Option<(String, String, usize)> {
        self.months.iter().find_map(|(month, days)| {
            days.iter().find_map(|(day, data)| {
                data.time_blocks
                    .iter()
                    .position(|b| b.id == id)
                    .map(|idx| (month.clone(), day.clone(), idx))
            })
        })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| Error::InvalidTime(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
