// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Dosage schedule: spreading doses across a day.

use chrono::{Duration, NaiveTime};

use crate::error::{AppError, Result};

const HOURS_PER_DAY: u32 = 24;

/// Dose times for one day, starting at `start` every `frequency_hours`.
///
/// Yields `floor(24 / frequency)` entries, wrapping past midnight.
/// Frequency 8 from 09:00 gives 09:00, 17:00, 01:00.
pub fn dosage_times(frequency_hours: u32, start: NaiveTime) -> Result<Vec<NaiveTime>> {
    if frequency_hours == 0 || frequency_hours > HOURS_PER_DAY {
        return Err(AppError::Validation(
            "Frequency must be between 1 and 24 hours.".to_string(),
        ));
    }

    let doses = HOURS_PER_DAY / frequency_hours;
    Ok((0..doses)
        .map(|k| {
            let offset = Duration::hours(i64::from(k * frequency_hours));
            start.overflowing_add_signed(offset).0
        })
        .collect())
}

/// Render times as `HH:MM`.
pub fn format_times(times: &[NaiveTime]) -> Vec<String> {
    times.iter().map(|t| t.format("%H:%M").to_string()).collect()
}

/// Parse an `HH:MM` start time.
pub fn parse_start_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time {:?}, expected HH:MM.", raw)))
}

const FREQUENCY_PREFIXES: [&str; 3] = ["a cada", "cada", "every"];
const HOUR_UNITS: [&str; 7] = ["", "h", "hr", "hora", "horas", "hour", "hours"];

/// Extract the hour count from a frequency such as `8`, `"8h"`,
/// `"a cada 8h"` or `"every 12 hours"`.
///
/// Only a bare number or a number followed by an hour unit is accepted;
/// counts per day (`"1x ao dia"`) and zero yield `None`.
pub fn parse_frequency(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();
    let rest = FREQUENCY_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(&text)
        .trim_start();

    let split = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, unit) = rest.split_at(split);
    let hours = digits.parse::<u32>().ok().filter(|h| *h > 0)?;

    HOUR_UNITS.contains(&unit.trim()).then_some(hours)
}
