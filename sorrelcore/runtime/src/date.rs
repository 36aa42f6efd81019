//! Serial-date arithmetic and the date literal parser.
//!
//! Dates are f64 serial days counted from 1899-12-30. A negative serial
//! encodes the time of day as the *magnitude* of its fraction, so -1.5 is
//! 1899-12-29 12:00:00. The representable range is 100-01-01 through
//! 9999-12-31, and the behavior at both ends carries quirks the source
//! interpreter exhibits (truncation instead of rounding, asymmetric
//! fractional overflow thresholds) that translated code can observe.

use sorrel_common::consts::{MAX_DATE_SERIAL, MIN_DATE_SERIAL};
use sorrel_common::{Result, ScriptError};

use crate::config::{DateOrder, LocaleConfig};

/// Fraction at which the last representable day overflows.
pub const LAST_DAY_FRACTION_LIMIT: f64 = 0.999_999_994;
/// Fraction at which the first representable day overflows. Not the same
/// value as the other end; both are observed interpreter behavior.
pub const FIRST_DAY_FRACTION_LIMIT: f64 = 0.999_999_998;

/// Serial day of the Unix epoch, 1970-01-01.
const UNIX_EPOCH_SERIAL: i64 = 25_569;

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

// --- civil-date arithmetic ---

pub fn is_leap_year(y: i32) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

pub fn days_in_month(y: i32, m: u32) -> u32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(y) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date (proleptic Gregorian).
fn days_from_civil(y: i32, m: u32, d: u32) -> i64 {
    let y = y as i64 - if m <= 2 { 1 } else { 0 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i32, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y as i32 + 1 } else { y as i32 }, m, d)
}

pub fn serial_from_ymd(y: i32, m: u32, d: u32) -> f64 {
    (days_from_civil(y, m, d) + UNIX_EPOCH_SERIAL) as f64
}

/// Combine a whole serial day with a time fraction, honoring the negative
/// encoding.
pub fn make_serial(days: i64, frac: f64) -> f64 {
    if days < 0 {
        days as f64 - frac
    } else {
        days as f64 + frac
    }
}

fn split_serial(serial: f64) -> (i64, f64) {
    let days = serial.trunc();
    (days as i64, (serial - days).abs())
}

pub fn serial_to_parts(serial: f64) -> DateParts {
    let (mut days, frac) = split_serial(serial);
    let mut secs = (frac * SECS_PER_DAY).round() as i64;
    if secs >= 86_400 {
        secs = 0;
        days += if days >= 0 { 1 } else { -1 };
    }
    let (year, month, day) = civil_from_days(days - UNIX_EPOCH_SERIAL);
    DateParts {
        year,
        month,
        day,
        hour: (secs / 3_600) as u32,
        minute: (secs / 60 % 60) as u32,
        second: (secs % 60) as u32,
    }
}

/// Validate a numeric day-offset as a date serial.
///
/// The whole-day component must land inside the representable range. On the
/// very last day the sub-day precision collapses to whole seconds by
/// truncation, and a fraction at or past `LAST_DAY_FRACTION_LIMIT`
/// overflows; the very first day overflows from `FIRST_DAY_FRACTION_LIMIT`.
pub fn date_from_serial(n: f64) -> Result<f64> {
    if !n.is_finite() {
        return Err(ScriptError::overflow());
    }
    let (days, frac) = split_serial(n);
    if (days as f64) > MAX_DATE_SERIAL || (days as f64) < MIN_DATE_SERIAL {
        return Err(ScriptError::overflow());
    }
    if days as f64 == MAX_DATE_SERIAL {
        if frac >= LAST_DAY_FRACTION_LIMIT {
            return Err(ScriptError::overflow());
        }
        let secs = (frac * SECS_PER_DAY).floor();
        return Ok(make_serial(days, secs / SECS_PER_DAY));
    }
    if days as f64 == MIN_DATE_SERIAL && frac >= FIRST_DAY_FRACTION_LIMIT {
        return Err(ScriptError::overflow());
    }
    Ok(n)
}

pub fn current_system_year() -> i32 {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    civil_from_days((secs / 86_400) as i64).0
}

// --- literal parsing ---

#[derive(Clone, Copy, PartialEq, Eq)]
enum Meridian {
    Am,
    Pm,
}

#[derive(Clone, Copy)]
enum Seg {
    Num(i64),
    Month(u32),
}

/// Parse a date-and-time literal. `default_year` fills in when the literal
/// omits the year (callers inject the year provider's value here).
pub fn parse_date_literal(text: &str, locale: &LocaleConfig, default_year: i32) -> Result<f64> {
    let mut s = text.trim();
    if s.is_empty() {
        return Err(ScriptError::invalid_call());
    }

    let meridian = strip_meridian(&mut s);

    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    let mut time: Option<(u32, u32, u32)> = None;
    if let Some(last) = tokens.last() {
        if last.contains(':') {
            time = Some(parse_time(last, meridian)?);
            tokens.pop();
        }
    }
    if time.is_none() && meridian.is_some() {
        // A bare meridian marker with no time component is not a date.
        return Err(ScriptError::invalid_call());
    }

    let mut segs: Vec<Seg> = Vec::new();
    for tok in &tokens {
        for piece in tok.split(['/', '-', ',']) {
            if piece.is_empty() {
                continue;
            }
            segs.push(classify_segment(piece, locale)?);
        }
    }

    let frac = time
        .map(|(h, m, sec)| (h as f64 * 3_600.0 + m as f64 * 60.0 + sec as f64) / SECS_PER_DAY)
        .unwrap_or(0.0);

    if segs.is_empty() {
        return if time.is_some() {
            Ok(make_serial(0, frac))
        } else {
            Err(ScriptError::invalid_call())
        };
    }

    let (year, month, day) = resolve_segments(&segs, locale.date_order, default_year)?;
    if !(100..=9999).contains(&year) {
        return Err(ScriptError::overflow());
    }
    if month < 1 || month > 12 || day < 1 || day > days_in_month(year, month) {
        return Err(ScriptError::invalid_call());
    }
    Ok(make_serial(days_from_civil(year, month, day) + UNIX_EPOCH_SERIAL, frac))
}

fn strip_meridian(s: &mut &str) -> Option<Meridian> {
    let lower = s.to_ascii_lowercase();
    for (suffix, meridian) in
        [("pm", Meridian::Pm), ("am", Meridian::Am), ("p", Meridian::Pm), ("a", Meridian::Am)]
    {
        if let Some(head) = lower.strip_suffix(suffix) {
            // Only strip when the marker trails a digit or whitespace, so
            // month names keep their final letters.
            match head.chars().last() {
                Some(c) if c.is_ascii_digit() || c.is_whitespace() => {
                    *s = s[..head.len()].trim_end();
                    return Some(meridian);
                }
                _ => {}
            }
        }
    }
    None
}

fn parse_time(tok: &str, meridian: Option<Meridian>) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = tok.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(ScriptError::invalid_call());
    }
    let mut nums = [0u32; 3];
    for (i, p) in parts.iter().enumerate() {
        if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScriptError::invalid_call());
        }
        nums[i] = p.parse().map_err(|_| ScriptError::invalid_call())?;
    }
    let (mut hour, minute, second) = (nums[0], nums[1], nums[2]);
    match meridian {
        Some(m) => {
            if !(1..=12).contains(&hour) {
                return Err(ScriptError::invalid_call());
            }
            hour %= 12;
            if m == Meridian::Pm {
                hour += 12;
            }
        }
        None => {
            if hour > 23 {
                return Err(ScriptError::invalid_call());
            }
        }
    }
    if minute > 59 || second > 59 {
        return Err(ScriptError::invalid_call());
    }
    Ok((hour, minute, second))
}

fn classify_segment(piece: &str, locale: &LocaleConfig) -> Result<Seg> {
    if piece.bytes().all(|b| b.is_ascii_digit()) {
        let n: i64 = piece.parse().map_err(|_| ScriptError::invalid_call())?;
        return Ok(Seg::Num(n));
    }
    locale
        .month_number(piece)
        .map(Seg::Month)
        .ok_or_else(ScriptError::invalid_call)
}

/// Two-digit years fold into the 1930..2029 window.
fn normalize_year(n: i64) -> i32 {
    if n < 30 {
        (2000 + n) as i32
    } else if n < 100 {
        (1900 + n) as i32
    } else {
        n.clamp(0, i32::MAX as i64) as i32
    }
}

fn resolve_segments(segs: &[Seg], order: DateOrder, default_year: i32) -> Result<(i32, u32, u32)> {
    let months: Vec<u32> = segs.iter().filter_map(|s| match s {
        Seg::Month(m) => Some(*m),
        Seg::Num(_) => None,
    }).collect();
    let nums: Vec<i64> = segs.iter().filter_map(|s| match s {
        Seg::Num(n) => Some(*n),
        Seg::Month(_) => None,
    }).collect();

    match (months.len(), nums.len()) {
        (0, 3) => resolve_numeric_triple(nums[0], nums[1], nums[2], order),
        (0, 2) => resolve_numeric_pair(nums[0], nums[1], order, default_year),
        (1, 1) => {
            let m = months[0];
            if (1..=31).contains(&nums[0]) {
                Ok((default_year, m, nums[0] as u32))
            } else {
                Ok((normalize_year(nums[0]), m, 1))
            }
        }
        (1, 2) => {
            let m = months[0];
            if nums[0] > 31 {
                if !(1..=31).contains(&nums[1]) {
                    return Err(ScriptError::invalid_call());
                }
                Ok((normalize_year(nums[0]), m, nums[1] as u32))
            } else {
                Ok((normalize_year(nums[1]), m, nums[0] as u32))
            }
        }
        _ => Err(ScriptError::invalid_call()),
    }
}

/// Ambiguous numeric triples: try (day,month) arrangements in preference
/// order, then fall back to year-month-day.
fn resolve_numeric_triple(a: i64, b: i64, c: i64, order: DateOrder) -> Result<(i32, u32, u32)> {
    let candidates = match order {
        DateOrder::DayMonth => [(a, b), (b, a)],
        DateOrder::MonthDay => [(b, a), (a, b)],
    };
    for (d, m) in candidates {
        if (1..=12).contains(&m) && (1..=31).contains(&d) {
            let year = normalize_year(c);
            if d as u32 <= days_in_month(year, m as u32) {
                return Ok((year, m as u32, d as u32));
            }
        }
    }
    let year = normalize_year(a);
    if (1..=12).contains(&b) && (1..=31).contains(&c) && c as u32 <= days_in_month(year, b as u32) {
        return Ok((year, b as u32, c as u32));
    }
    Err(ScriptError::invalid_call())
}

fn resolve_numeric_pair(
    a: i64,
    b: i64,
    order: DateOrder,
    default_year: i32,
) -> Result<(i32, u32, u32)> {
    let a_month = (1..=12).contains(&a);
    let b_month = (1..=12).contains(&b);
    if a_month && b_month {
        return Ok(match order {
            DateOrder::DayMonth => (default_year, b as u32, a as u32),
            DateOrder::MonthDay => (default_year, a as u32, b as u32),
        });
    }
    if (13..=31).contains(&a) && b_month {
        return Ok((default_year, b as u32, a as u32));
    }
    if (13..=31).contains(&b) && a_month {
        return Ok((default_year, a as u32, b as u32));
    }
    if a_month {
        return Ok((normalize_year(b), a as u32, 1));
    }
    if b_month {
        return Ok((normalize_year(a), b as u32, 1));
    }
    Err(ScriptError::invalid_call())
}

// --- formatting ---

/// General-date rendering: date only when there is no time fraction, time
/// only on the epoch day, 12-hour clock.
pub fn format_serial(serial: f64, locale: &LocaleConfig) -> String {
    let (days, _) = split_serial(serial);
    let p = serial_to_parts(serial);
    let date_part = match locale.date_order {
        DateOrder::MonthDay => format!("{}/{}/{}", p.month, p.day, p.year),
        DateOrder::DayMonth => format!("{}/{}/{}", p.day, p.month, p.year),
    };
    let has_time = p.hour != 0 || p.minute != 0 || p.second != 0;
    if !has_time {
        return date_part;
    }
    let tag = if p.hour < 12 { "AM" } else { "PM" };
    let h12 = match p.hour % 12 {
        0 => 12,
        h => h,
    };
    let time_part = format!("{}:{:02}:{:02} {}", h12, p.minute, p.second, tag);
    if days == 0 {
        time_part
    } else {
        format!("{} {}", date_part, time_part)
    }
}
