use crate::cli::{BlockCommand, Command, ShellLine};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use daybook::config::Settings;
use daybook::model::{
    format_date, format_time, parse_date, parse_time, CalendarData, Category, RecurrenceRule,
    TimeBlock,
};
use daybook::recurrence::{resolve_blocks_for_date, resolve_range, ResolvedBlock};
use daybook::storage::FileStore;
use daybook::{Frequency, History};
use rand::{distributions::Alphanumeric, Rng};
use std::io::{BufRead, Write};

/// One run of the program: a calendar loaded from disk plus the undo history
/// built up while it runs.
pub struct Session {
    history: History<FileStore>,
}

impl Session {
    pub fn open(settings: &Settings) -> Result<Self> {
        let path = settings.data_path()?;
        tracing::debug!(path = %path.display(), "opening calendar");
        let history = History::open(FileStore::new(path), settings.history_depth);
        Ok(Session { history })
    }

    pub fn run<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Day { date } => self.show_day(&date, out),
            Command::Agenda { date, days } => self.agenda(&date, days, out),
            Command::Note { date, text } => {
                let date = parse_date(&date)?;
                let text = text.join(" ");
                self.history.apply(|data| {
                    data.set_note(date, text.as_str());
                    Ok(())
                })?;
                writeln!(out, "Updated note for {}", format_date(date))?;
                Ok(())
            }
            Command::Dot { date, category } => {
                let date = parse_date(&date)?;
                let category: Category = category.parse()?;
                self.history.apply(|data| {
                    data.toggle_dot(date, category.clone());
                    Ok(())
                })?;
                let state = if self.history.current().day(date).dots.contains(&category) {
                    "on"
                } else {
                    "off"
                };
                writeln!(out, "Marker {} {} for {}", category, state, format_date(date))?;
                Ok(())
            }
            Command::Color { date, category } => {
                let date = parse_date(&date)?;
                let color = category.as_deref().map(str::parse::<Category>).transpose()?;
                let label = color.as_ref().map(|c| c.to_string());
                self.history.apply(|data| {
                    data.set_day_color(date, color);
                    Ok(())
                })?;
                match label {
                    Some(c) => writeln!(out, "Color {} for {}", c, format_date(date))?,
                    None => writeln!(out, "Cleared color for {}", format_date(date))?,
                }
                Ok(())
            }
            Command::Block(block) => self.block(block, out),
            Command::Undo => {
                if self.history.undo() {
                    writeln!(out, "Undid last change")?;
                } else {
                    writeln!(out, "Nothing to undo")?;
                }
                Ok(())
            }
            Command::Redo => {
                if self.history.redo() {
                    writeln!(out, "Redid last change")?;
                } else {
                    writeln!(out, "Nothing to redo")?;
                }
                Ok(())
            }
            Command::Shell => bail!("already in a shell"),
        }
    }

    /// Runs commands line by line until EOF or `quit`. A failing command is
    /// reported and the session continues.
    pub fn shell<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;
            let words = match split_words(&line) {
                Ok(words) => words,
                Err(err) => {
                    writeln!(out, "error: {:#}", err)?;
                    continue;
                }
            };
            match words.first().map(String::as_str) {
                None => continue,
                Some("quit") | Some("exit") => break,
                Some(_) => {}
            }
            let parsed = match ShellLine::try_parse_from(&words) {
                Ok(parsed) => parsed,
                Err(err) => {
                    write!(out, "{}", err.render())?;
                    continue;
                }
            };
            if let Err(err) = self.run(parsed.command, out) {
                tracing::debug!(error = %err, "shell command failed");
                writeln!(out, "error: {:#}", err)?;
            }
        }
        Ok(())
    }

    fn block<W: Write>(&mut self, command: BlockCommand, out: &mut W) -> Result<()> {
        match command {
            BlockCommand::Add {
                date,
                start,
                end,
                title,
                category,
                repeat,
                every,
                on,
                until,
            } => {
                let date = parse_date(&date)?;
                let start = parse_time(&start)?;
                let end = parse_time(&end)?;
                let category: Category = category.parse()?;
                let recurrence = repeat.map(|freq| RecurrenceRule {
                    frequency: freq.into(),
                    interval: every,
                    days_of_week: on,
                    end_date: until,
                });
                let id = generate_id(self.history.current());
                let block =
                    TimeBlock::new(id.clone(), date, start, end, title, category, recurrence)?;
                self.history.apply(|data| data.add_time_block(block))?;
                writeln!(out, "Added block {} on {}", id, format_date(date))?;
                Ok(())
            }
            BlockCommand::Rm { id } => {
                let removed = self
                    .history
                    .apply(|data| data.remove_time_block(&id))
                    .with_context(|| format!("removing block {}", id))?;
                writeln!(out, "Removed block {} ({})", removed.id, describe(&removed))?;
                Ok(())
            }
            BlockCommand::Edit {
                id,
                title,
                start,
                end,
                category,
                date,
                no_repeat,
            } => {
                let start = start.as_deref().map(parse_time).transpose()?;
                let end = end.as_deref().map(parse_time).transpose()?;
                let category = category.as_deref().map(str::parse::<Category>).transpose()?;
                let date = date.as_deref().map(parse_date).transpose()?;
                self.history
                    .apply(|data| {
                        data.update_time_block(&id, |block| {
                            if let Some(t) = title {
                                block.title = t;
                            }
                            if let Some(s) = start {
                                block.start_time = format_time(s);
                            }
                            if let Some(e) = end {
                                block.end_time = format_time(e);
                            }
                            if let Some(c) = category {
                                block.category = c;
                            }
                            if let Some(d) = date {
                                block.start_date = format_date(d);
                            }
                            if no_repeat {
                                block.recurrence = None;
                            }
                        })
                    })
                    .with_context(|| format!("editing block {}", id))?;
                writeln!(out, "Updated block {}", id)?;
                Ok(())
            }
        }
    }

    fn show_day<W: Write>(&self, raw: &str, out: &mut W) -> Result<()> {
        let date = parse_date(raw)?;
        let data = self.history.current();
        let day = data.day(date);
        writeln!(out, "{} ({})", format_date(date), date.format("%A"))?;
        if !day.note.is_empty() {
            writeln!(out, "  note: {}", day.note)?;
        }
        if !day.dots.is_empty() {
            let names: Vec<String> = day.dots.iter().map(Category::to_string).collect();
            writeln!(out, "  markers: {}", names.join(", "))?;
        }
        if let Some(color) = &day.day_color {
            writeln!(out, "  color: {} ({})", color, color.style().color)?;
        }
        if !day.content_blocks.is_empty() {
            writeln!(out, "  content blocks: {}", day.content_blocks.len())?;
        }
        print_blocks(&resolve_blocks_for_date(date, data), out)
    }

    fn agenda<W: Write>(&self, raw: &str, days: u32, out: &mut W) -> Result<()> {
        let from = parse_date(raw)?;
        if days == 0 {
            return Err(anyhow!("--days must be at least 1"));
        }
        for (date, blocks) in resolve_range(from, days, self.history.current()) {
            writeln!(out, "{} ({})", format_date(date), date.format("%a"))?;
            print_blocks(&blocks, out)?;
        }
        Ok(())
    }
}

fn print_blocks<W: Write>(blocks: &[ResolvedBlock<'_>], out: &mut W) -> Result<()> {
    if blocks.is_empty() {
        writeln!(out, "  (no blocks)")?;
    }
    for resolved in blocks {
        let block = resolved.block;
        let title = if block.title.is_empty() {
            "(untitled)"
        } else {
            block.title.as_str()
        };
        writeln!(
            out,
            "  {}-{}  {} [{}]  {}",
            block.start_time,
            block.end_time,
            title,
            block.category.style().label,
            block.id
        )?;
        if let Some(rule) = &block.recurrence {
            writeln!(out, "    repeats {}", describe_rule(rule, &block.start_date))?;
        }
    }
    Ok(())
}

fn describe(block: &TimeBlock) -> String {
    format!(
        "{} {}-{} {}",
        block.start_date, block.start_time, block.end_time, block.title
    )
    .trim_end()
    .to_string()
}

fn describe_rule(rule: &RecurrenceRule, anchor: &str) -> String {
    let unit = match rule.frequency {
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        Frequency::Yearly => "year",
    };
    let mut text = if rule.interval == 1 {
        format!("every {} from {}", unit, anchor)
    } else {
        format!("every {} {}s from {}", rule.interval, unit, anchor)
    };
    if !rule.days_of_week.is_empty() {
        let names: Vec<&str> = rule.days_of_week.iter().map(|d| weekday_name(*d)).collect();
        text.push_str(&format!(" on {}", names.join(",")));
    }
    if let Some(end) = &rule.end_date {
        text.push_str(&format!(" until {}", end));
    }
    text
}

fn weekday_name(index: u8) -> &'static str {
    match index {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
}

fn generate_id(data: &CalendarData) -> String {
    loop {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        if data.find_time_block(&id).is_none() {
            return id;
        }
    }
}

/// Shell-style word split, so `--title "Deep work"` stays one argument.
fn split_words(line: &str) -> Result<Vec<String>> {
    shlex::split(line).ok_or_else(|| anyhow!("unterminated quote"))
}
