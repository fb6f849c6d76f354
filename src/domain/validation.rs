use crate::domain::models::{parse_hhmm, BookingDraft, BookingField, BusinessHours, TimeSlot};
use crate::domain::slots::{filter_slots_for_date, is_today, next_bookable_slot};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Why a draft cannot be booked. `Display` is the message shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Please enter your full name.")]
    NameTooShort,
    #[error("Please enter a valid email.")]
    InvalidEmail,
    #[error("Please select your time zone.")]
    MissingTimezone,
    #[error("Choose a date.")]
    MissingDate,
    #[error("Choose a time within working hours.")]
    MissingTime,
    #[error("Please choose a time between {start_hour}:00 and {end_hour}:00.")]
    OutsideBusinessHours { start_hour: u32, end_hour: u32 },
    #[error("That time today has already passed. Pick a later slot or another day.")]
    TimeAlreadyPassed,
    #[error("No remaining slots today. Please pick another date.")]
    NoSlotsToday,
}

impl BookingError {
    pub fn field(&self) -> BookingField {
        match self {
            Self::NameTooShort => BookingField::Name,
            Self::InvalidEmail => BookingField::Email,
            Self::MissingTimezone => BookingField::Timezone,
            Self::MissingDate | Self::NoSlotsToday => BookingField::Date,
            Self::MissingTime | Self::OutsideBusinessHours { .. } | Self::TimeAlreadyPassed => {
                BookingField::Time
            }
        }
    }
}

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// `local@domain.tld` shape: no whitespace, exactly one `@`, and a dot
/// inside the domain with something on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Runs every rule in order and reports the first failure.
///
/// Same-day checks use `now` as given, so callers pass the submit-time
/// clock rather than whatever was current when the form was drawn.
pub fn validate_draft(
    draft: &BookingDraft,
    hours: &BusinessHours,
    slots: &[TimeSlot],
    now: NaiveDateTime,
) -> Result<(), BookingError> {
    if !is_valid_name(&draft.name) {
        return Err(BookingError::NameTooShort);
    }
    if !is_valid_email(&draft.email) {
        return Err(BookingError::InvalidEmail);
    }
    if draft.timezone.trim().is_empty() {
        return Err(BookingError::MissingTimezone);
    }
    if draft.date.is_empty() {
        return Err(BookingError::MissingDate);
    }
    if draft.time.is_empty() {
        return Err(BookingError::MissingTime);
    }

    let within_hours = parse_hhmm(&draft.time)
        .map(|(hour, minute)| hours.accepts_start(hour, minute))
        .unwrap_or(false);
    if !within_hours {
        return Err(BookingError::OutsideBusinessHours {
            start_hour: hours.start_hour,
            end_hour: hours.end_hour,
        });
    }

    if is_today(&draft.date, now) {
        match next_bookable_slot(hours, now.time()) {
            Some(earliest) if draft.time.as_str() >= earliest.as_str() => {}
            _ => return Err(BookingError::TimeAlreadyPassed),
        }
        if filter_slots_for_date(hours, slots, &draft.date, now).is_empty() {
            return Err(BookingError::NoSlotsToday);
        }
    }

    Ok(())
}

/// Fields whose own check fails on the draft as it is right now.
pub fn failing_fields(draft: &BookingDraft) -> Vec<BookingField> {
    let checks = [
        (BookingField::Name, is_valid_name(&draft.name)),
        (BookingField::Email, is_valid_email(&draft.email)),
        (BookingField::Timezone, !draft.timezone.trim().is_empty()),
        (BookingField::Date, !draft.date.is_empty()),
        (BookingField::Time, !draft.time.is_empty()),
    ];
    checks
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| field)
        .collect()
}
