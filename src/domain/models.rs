use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_START_HOUR: u32 = 9;
pub const DEFAULT_WORK_END_HOUR: u32 = 18;
pub const DEFAULT_TIME_STEP_MINUTES: u32 = 30;

const DEFAULT_TIMEZONES: [(&str, &str); 8] = [
    ("Asia/Kolkata", "Asia/Kolkata (IST)"),
    ("America/New_York", "America/New_York (ET)"),
    ("America/Los_Angeles", "America/Los_Angeles (PT)"),
    ("Europe/London", "Europe/London (UK)"),
    ("Europe/Paris", "Europe/Paris (CET)"),
    ("Asia/Singapore", "Asia/Singapore (SGT)"),
    ("Australia/Sydney", "Australia/Sydney (AET)"),
    ("UTC", "UTC"),
];

/// A `(label, value)` pair shown by every select-like control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A bookable start time. `value` is zero-padded `HH:MM`, so string order is time order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub label: String,
    pub value: String,
}

impl TimeSlot {
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            label: format_time_label(hour, minute),
            value: format_hhmm(hour, minute),
        }
    }
}

impl From<&TimeSlot> for SelectOption {
    fn from(slot: &TimeSlot) -> Self {
        SelectOption::new(slot.label.clone(), slot.value.clone())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
    pub step_minutes: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_WORK_START_HOUR,
            end_hour: DEFAULT_WORK_END_HOUR,
            step_minutes: DEFAULT_TIME_STEP_MINUTES,
        }
    }
}

impl BusinessHours {
    pub fn validate(&self) -> Result<(), String> {
        if self.end_hour > 24 {
            return Err("work_hours.end_hour must be <= 24".to_string());
        }
        if self.start_hour >= self.end_hour {
            return Err("work_hours.start_hour must be before work_hours.end_hour".to_string());
        }
        if self.step_minutes == 0 {
            return Err("work_hours.step_minutes must be > 0".to_string());
        }
        if self.step_minutes > self.window_minutes() {
            return Err("work_hours.step_minutes must fit inside the working window".to_string());
        }
        Ok(())
    }

    pub fn start_minute(&self) -> u32 {
        self.start_hour * 60
    }

    pub fn end_minute(&self) -> u32 {
        self.end_hour * 60
    }

    fn window_minutes(&self) -> u32 {
        self.end_minute().saturating_sub(self.start_minute())
    }

    /// Whether `hour:minute` is an acceptable booking start. The end hour
    /// itself is accepted at minute 0 even though no slot starts there.
    pub fn accepts_start(&self, hour: u32, minute: u32) -> bool {
        hour >= self.start_hour
            && (hour < self.end_hour || (hour == self.end_hour && minute == 0))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum SessionDuration {
    #[default]
    Thirty,
    FortyFive,
    Sixty,
}

impl SessionDuration {
    pub const ALL: [SessionDuration; 3] = [Self::Thirty, Self::FortyFive, Self::Sixty];

    pub fn minutes(self) -> u32 {
        match self {
            Self::Thirty => 30,
            Self::FortyFive => 45,
            Self::Sixty => 60,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.minutes() == minutes)
    }

    /// Parses the select value form (`"30"`, `"45"`, `"60"`).
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u32>().ok().and_then(Self::from_minutes)
    }

    pub fn value(self) -> String {
        self.minutes().to_string()
    }

    pub fn label(self) -> String {
        format!("{} minutes", self.minutes())
    }

    pub fn to_option(self) -> SelectOption {
        SelectOption::new(self.label(), self.value())
    }
}

impl TryFrom<u32> for SessionDuration {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
            .ok_or_else(|| format!("unsupported session duration: {minutes} minutes"))
    }
}

impl From<SessionDuration> for u32 {
    fn from(duration: SessionDuration) -> Self {
        duration.minutes()
    }
}

/// An advisory time zone choice. Selecting one never converts displayed times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimezoneOption {
    pub value: String,
    pub label: String,
}

impl TimezoneOption {
    pub fn tz(&self) -> Result<Tz, String> {
        self.value
            .trim()
            .parse::<Tz>()
            .map_err(|_| format!("unknown time zone: {}", self.value))
    }

    pub fn to_option(&self) -> SelectOption {
        SelectOption::new(self.label.clone(), self.value.clone())
    }
}

pub fn default_timezone_options() -> Vec<TimezoneOption> {
    DEFAULT_TIMEZONES
        .iter()
        .map(|(value, label)| TimezoneOption {
            value: (*value).to_string(),
            label: (*label).to_string(),
        })
        .collect()
}

/// In-progress reservation. Lives only in memory for the current page session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub name: String,
    pub email: String,
    pub timezone: String,
    pub date: String,
    pub time: String,
    pub duration: SessionDuration,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    Name,
    Email,
    Timezone,
    Date,
    Time,
    Duration,
    Notes,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

pub fn format_hhmm(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

pub fn format_time_label(hour: u32, minute: u32) -> String {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{hour12}:{minute:02} {suffix}")
}

/// Parses a zero-padded `HH:MM` into `(hour, minute)`. Anything else,
/// including `9:05` or surrounding whitespace, is rejected so that slot
/// values keep comparing correctly as strings.
pub fn parse_hhmm(value: &str) -> Option<(u32, u32)> {
    let (hour_str, minute_str) = value.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hour_str) || !two_digits(minute_str) {
        return None;
    }
    let hour = hour_str.parse::<u32>().ok()?;
    let minute = minute_str.parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}
