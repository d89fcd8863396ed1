//! Availability slots offered to attendees for meetings.

use std::{fmt, str::FromStr};

use thiserror::Error;

pub const SLOT_MINUTES: u16 = 15;
pub const DAY_START_MINUTE: u16 = 8 * 60 + 30;
/// Slots are generated while their start hour is before this one.
pub const DAY_END_HOUR: u16 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    start_minute: u16,
}

impl TimeSlot {
    pub fn start_minute(self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(self) -> u16 {
        self.start_minute + SLOT_MINUTES
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

fn write_clock(f: &mut fmt::Formatter<'_>, minute: u16) -> fmt::Result {
    write!(f, "{:02}:{:02}", (minute / 60) % 24, minute % 60)
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clock(f, self.start_minute)?;
        f.write_str("-")?;
        write_clock(f, self.end_minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a meeting slot label (expected HH:MM-HH:MM)")]
pub struct InvalidSlotLabel(pub String);

fn parse_clock(raw: &str) -> Option<u16> {
    let (hour, minute) = raw.split_once(':')?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some(hour * 60 + minute)
}

impl FromStr for TimeSlot {
    type Err = InvalidSlotLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSlotLabel(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = parse_clock(start).ok_or_else(invalid)?;
        let end = parse_clock(end).ok_or_else(invalid)?;
        if end != start + SLOT_MINUTES {
            return Err(invalid());
        }
        Ok(Self {
            start_minute: start,
        })
    }
}

/// Every slot of the event day, 08:30 through 23:00.
pub fn day_slots() -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    let mut start = DAY_START_MINUTE;
    while start / 60 < DAY_END_HOUR {
        slots.push(TimeSlot {
            start_minute: start,
        });
        start += SLOT_MINUTES;
    }
    slots
}

pub fn day_slot_labels() -> Vec<String> {
    day_slots().into_iter().map(TimeSlot::label).collect()
}

/// Adds `item` when absent, removes it when present. Order of the remaining
/// items is preserved.
pub fn toggle(values: &mut Vec<String>, item: &str) {
    match values.iter().position(|v| v == item) {
        Some(index) => {
            values.remove(index);
        }
        None => values.push(item.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod tests;
