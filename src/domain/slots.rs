//! Slot generation and same-day availability.
//!
//! Slots are plain `HH:MM` strings, so the availability filter compares
//! them as strings. Only today is narrowed, using the viewer's local clock;
//! future dates always offer the full day.

use crate::domain::models::{format_hhmm, BusinessHours, TimeSlot};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use std::sync::OnceLock;

/// Every full step between the start hour (inclusive) and the end hour (exclusive).
pub fn generate_time_slots(hours: &BusinessHours) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if hours.step_minutes == 0 {
        return slots;
    }

    let end = hours.end_minute();
    let mut cursor = hours.start_minute();
    while cursor + hours.step_minutes <= end {
        slots.push(TimeSlot::at(cursor / 60, cursor % 60));
        cursor += hours.step_minutes;
    }
    slots
}

/// Slots for the default 09:00-18:00 / 30 minute window, computed once.
pub fn default_time_slots() -> &'static [TimeSlot] {
    static SLOTS: OnceLock<Vec<TimeSlot>> = OnceLock::new();
    SLOTS.get_or_init(|| generate_time_slots(&BusinessHours::default()))
}

/// Earliest slot value at or after `now`, rounded up to the step grid.
/// `None` once the working day is over.
pub fn next_bookable_slot(hours: &BusinessHours, now: NaiveTime) -> Option<String> {
    if hours.step_minutes == 0 || now.hour() >= hours.end_hour {
        return None;
    }
    if now.hour() < hours.start_hour {
        return Some(format_hhmm(hours.start_hour, 0));
    }

    let mut minute_of_day = now.hour() * 60 + now.minute();
    let remainder = (minute_of_day - hours.start_minute()) % hours.step_minutes;
    if remainder > 0 {
        minute_of_day += hours.step_minutes - remainder;
    }
    if minute_of_day >= hours.end_minute() {
        return None;
    }
    Some(format_hhmm(minute_of_day / 60, minute_of_day % 60))
}

pub fn local_date_iso(now: NaiveDateTime) -> String {
    now.date().format("%Y-%m-%d").to_string()
}

pub fn is_today(selected_date: &str, now: NaiveDateTime) -> bool {
    let selected_date = selected_date.trim();
    !selected_date.is_empty() && selected_date == local_date_iso(now)
}

/// Narrows `slots` to what is still bookable for `selected_date`.
pub fn filter_slots_for_date(
    hours: &BusinessHours,
    slots: &[TimeSlot],
    selected_date: &str,
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    if !is_today(selected_date, now) {
        return slots.to_vec();
    }
    let Some(earliest) = next_bookable_slot(hours, now.time()) else {
        return Vec::new();
    };
    slots
        .iter()
        .filter(|slot| slot.value >= earliest)
        .cloned()
        .collect()
}
