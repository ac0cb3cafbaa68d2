//! In-process English date/time resolver
//!
//! A small rule table in the spirit of Duckling: each rule is a regex over the
//! lowercased phrase, producing a date or a time-of-day hit. Hits become
//! candidates ordered by position; when a phrase carries both a date and a
//! time, a combined candidate is appended last.

use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use regex::{Captures, Regex};

use super::{Grain, ParseCandidate, TemporalResolver};
use crate::error::{MeetbotError, Result};

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const WEEKDAYS: &str = "monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun";
const COUNTS: &str = r"\d+|a|an|one|two|three|four|five|six|seven|eight|nine|ten";

/// Longest relative offset accepted, in days.
const MAX_OFFSET_DAYS: i64 = 3660;

#[derive(Debug, Clone, Copy)]
struct DateHit {
    start: usize,
    end: usize,
    date: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
struct TimeHit {
    start: usize,
    end: usize,
    time: NaiveTime,
    grain: Grain,
}

/// Byte ranges already consumed by an earlier rule.
#[derive(Debug, Default)]
struct Claimed(Vec<(usize, usize)>);

impl Claimed {
    fn try_claim(&mut self, start: usize, end: usize) -> bool {
        if self.0.iter().any(|&(s, e)| start < e && s < end) {
            return false;
        }
        self.0.push((start, end));
        true
    }
}

pub struct RuleResolver {
    reference: Option<NaiveDateTime>,
    iso_joint: Regex,
    iso_date: Regex,
    numeric_date: Regex,
    day_month: Regex,
    month_day: Regex,
    relative_day: Regex,
    offset: Regex,
    weekday: Regex,
    clock_12h: Regex,
    clock_24h: Regex,
    bare_hour: Regex,
    named_time: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| MeetbotError::ResolverUnavailable {
        message: format!("rule pattern failed to compile: {}", e),
    })
}

impl RuleResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reference: None,
            iso_joint: compile(r"\b(\d{4}-\d{1,2}-\d{1,2})t(\d)")?,
            iso_date: compile(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")?,
            numeric_date: compile(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})\b")?,
            day_month: compile(&format!(
                r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b(?:,?\s+(\d{{4}})\b)?"
            ))?,
            month_day: compile(&format!(
                r"\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
            ))?,
            relative_day: compile(
                r"\b(day after tomorrow|tomorrow|today|yesterday|next week)\b",
            )?,
            offset: compile(&format!(r"\bin\s+({COUNTS})\s+(day|week)s?\b"))?,
            weekday: compile(&format!(r"\b(?:(next|this|coming)\s+)?({WEEKDAYS})\b"))?,
            clock_12h: compile(r"\b(\d{1,2})(?:[:.](\d{2}))?\s*(a\.m\.?|p\.m\.?|am\b|pm\b)")?,
            clock_24h: compile(r"\b([01]?\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?\b")?,
            bare_hour: compile(r"\b(?:at\s+(\d{1,2})|(\d{1,2})\s*o'?\s?clock)\b")?,
            named_time: compile(
                r"\b(noon|midday|midnight|morning|afternoon|evening|tonight|night)\b",
            )?,
        })
    }

    /// Pin "now" instead of reading the local clock.
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Resolve synchronously; the async trait method delegates here.
    pub fn resolve(&self, text: &str, reference: NaiveDateTime) -> Vec<ParseCandidate> {
        // "2024-06-01t15:00" reads as a date followed by a clock time;
        // the separator is swapped for a space of the same width
        let text = text.to_lowercase();
        let text = self.iso_joint.replace_all(&text, "${1} ${2}").into_owned();
        let today = reference.date();

        let mut claimed = Claimed::default();
        let mut dates = self.date_hits(&text, today, &mut claimed);
        let mut times = self.time_hits(&text, &mut claimed);
        dates.sort_by_key(|h| h.start);
        times.sort_by_key(|h| h.start);

        let mut candidates: Vec<ParseCandidate> = Vec::new();
        for hit in &dates {
            candidates.push(ParseCandidate::time(
                &text[hit.start..hit.end],
                hit.start,
                hit.end,
                format_value(hit.date.and_time(NaiveTime::MIN)),
                Grain::Day,
            ));
        }
        for hit in &times {
            let day = if hit.time >= reference.time() {
                today
            } else {
                today.succ_opt().unwrap_or(today)
            };
            candidates.push(ParseCandidate::time(
                &text[hit.start..hit.end],
                hit.start,
                hit.end,
                format_value(day.and_time(hit.time)),
                hit.grain,
            ));
        }
        candidates.sort_by_key(|c| c.start);

        if let (Some(date), Some(time)) = (dates.last(), times.last()) {
            let start = date.start.min(time.start);
            let end = date.end.max(time.end);
            candidates.push(ParseCandidate::time(
                &text[start..end],
                start,
                end,
                format_value(date.date.and_time(time.time)),
                time.grain,
            ));
        }

        candidates
    }

    fn date_hits(&self, text: &str, today: NaiveDate, claimed: &mut Claimed) -> Vec<DateHit> {
        let mut hits = Vec::new();
        let mut push = |caps: &Captures, date: Option<NaiveDate>| {
            let Some(date) = date else { return };
            let Some(m) = caps.get(0) else { return };
            if claimed.try_claim(m.start(), m.end()) {
                hits.push(DateHit {
                    start: m.start(),
                    end: m.end(),
                    date,
                });
            }
        };

        for caps in self.iso_date.captures_iter(text) {
            let date = ymd(num(&caps, 1), num(&caps, 2), num(&caps, 3));
            push(&caps, date);
        }
        for caps in self.numeric_date.captures_iter(text) {
            let date = ymd(num(&caps, 3), num(&caps, 2), num(&caps, 1));
            push(&caps, date);
        }
        for caps in self.day_month.captures_iter(text) {
            let date = month_index(&caps[2])
                .and_then(|m| with_year(today, caps.get(3).map(|y| y.as_str()), m, num(&caps, 1)?));
            push(&caps, date);
        }
        for caps in self.month_day.captures_iter(text) {
            let date = month_index(&caps[1])
                .and_then(|m| with_year(today, caps.get(3).map(|y| y.as_str()), m, num(&caps, 2)?));
            push(&caps, date);
        }
        for caps in self.relative_day.captures_iter(text) {
            let days = match &caps[1] {
                "day after tomorrow" => 2,
                "tomorrow" => 1,
                "yesterday" => -1,
                "next week" => 7,
                _ => 0,
            };
            push(&caps, shift(today, days));
        }
        for caps in self.offset.captures_iter(text) {
            let date = count(&caps[1]).and_then(|n| {
                let unit = if &caps[2] == "week" { 7 } else { 1 };
                shift(today, n.checked_mul(unit)?)
            });
            push(&caps, date);
        }
        for caps in self.weekday.captures_iter(text) {
            let date = weekday(&caps[2]).and_then(|target| {
                let ahead = (target.num_days_from_monday() as i64
                    - today.weekday().num_days_from_monday() as i64)
                    .rem_euclid(7);
                let ahead = match caps.get(1).map(|q| q.as_str()) {
                    Some("next") if ahead == 0 => 7,
                    _ => ahead,
                };
                shift(today, ahead)
            });
            push(&caps, date);
        }

        hits
    }

    fn time_hits(&self, text: &str, claimed: &mut Claimed) -> Vec<TimeHit> {
        let mut hits = Vec::new();
        let mut push = |caps: &Captures, time: Option<(NaiveTime, Grain)>| {
            let Some((time, grain)) = time else { return };
            let Some(m) = caps.get(0) else { return };
            if claimed.try_claim(m.start(), m.end()) {
                hits.push(TimeHit {
                    start: m.start(),
                    end: m.end(),
                    time,
                    grain,
                });
            }
        };

        for caps in self.clock_12h.captures_iter(text) {
            let time = num(&caps, 1).and_then(|hour| {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let minute = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
                let hour = hour % 12 + if caps[3].starts_with('p') { 12 } else { 0 };
                let grain = if caps.get(2).is_some() { Grain::Minute } else { Grain::Hour };
                NaiveTime::from_hms_opt(hour, minute, 0).map(|t| (t, grain))
            });
            push(&caps, time);
        }
        for caps in self.clock_24h.captures_iter(text) {
            let seconds = caps.get(3).and_then(|s| s.as_str().parse().ok());
            let grain = if seconds.is_some() { Grain::Second } else { Grain::Minute };
            let time = num(&caps, 1)
                .zip(num(&caps, 2))
                .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, seconds.unwrap_or(0)))
                .map(|t| (t, grain));
            push(&caps, time);
        }
        for caps in self.bare_hour.captures_iter(text) {
            let time = num(&caps, 1).or_else(|| num(&caps, 2)).and_then(|hour| {
                // meetings at 1-7 are afternoon meetings
                let hour = if (1..=7).contains(&hour) { hour + 12 } else { hour };
                NaiveTime::from_hms_opt(hour, 0, 0).map(|t| (t, Grain::Hour))
            });
            push(&caps, time);
        }
        for caps in self.named_time.captures_iter(text) {
            let hour = match &caps[1] {
                "noon" | "midday" => 12,
                "midnight" => 0,
                "morning" => 9,
                "afternoon" => 14,
                "evening" => 18,
                // night, tonight
                _ => 21,
            };
            push(&caps, NaiveTime::from_hms_opt(hour, 0, 0).map(|t| (t, Grain::Hour)));
        }

        hits
    }
}

#[async_trait]
impl TemporalResolver for RuleResolver {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn parse(
        &self,
        text: &str,
        reference: Option<NaiveDateTime>,
    ) -> Result<Vec<ParseCandidate>> {
        let reference = reference
            .or(self.reference)
            .unwrap_or_else(|| Local::now().naive_local());
        let reference = reference.with_nanosecond(0).unwrap_or(reference);
        Ok(self.resolve(text, reference))
    }
}

fn format_value(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn num(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn ymd(year: Option<u32>, month: Option<u32>, day: Option<u32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year? as i32, month?, day?)
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days.abs() > MAX_OFFSET_DAYS {
        return None;
    }
    date.checked_add_signed(Duration::days(days))
}

/// Dates without a year fall on their next occurrence.
fn with_year(today: NaiveDate, year: Option<&str>, month: u32, day: u32) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month, day);
    }
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn month_index(name: &str) -> Option<u32> {
    let idx = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(idx)
}

fn weekday(name: &str) -> Option<Weekday> {
    let day = match name.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn count(word: &str) -> Option<i64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => digits.parse().ok()?,
    };
    Some(n)
}
