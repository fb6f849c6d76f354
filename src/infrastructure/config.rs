use crate::domain::avatar::DEFAULT_AVATAR_FALLBACK;
use crate::domain::models::{
    default_timezone_options, BusinessHours, SessionDuration, TimezoneOption,
};
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const BOOKING_JSON: &str = "booking.json";
pub const DEFAULT_SUBMIT_LATENCY_MS: u64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    pub avatar_fallback: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Aditya Rao".to_string(),
            avatar_fallback: DEFAULT_AVATAR_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfig {
    pub work_hours: BusinessHours,
    pub submit_latency_ms: u64,
    pub timezones: Vec<TimezoneOption>,
    pub durations: Vec<SessionDuration>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            work_hours: BusinessHours::default(),
            submit_latency_ms: DEFAULT_SUBMIT_LATENCY_MS,
            timezones: default_timezone_options(),
            durations: SessionDuration::ALL.to_vec(),
        }
    }
}

impl BookingConfig {
    pub fn validate(&self) -> Result<(), InfraError> {
        self.work_hours.validate().map_err(InfraError::InvalidConfig)?;
        if self.timezones.is_empty() {
            return Err(InfraError::InvalidConfig(
                "timezones must not be empty".to_string(),
            ));
        }
        for timezone in &self.timezones {
            timezone.tz().map_err(InfraError::InvalidConfig)?;
        }
        if self.durations.is_empty() {
            return Err(InfraError::InvalidConfig(
                "durations must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBundle {
    pub app: AppConfig,
    pub booking: BookingConfig,
}

fn with_schema<T: Serialize>(value: &T) -> Result<serde_json::Value, InfraError> {
    let mut json = serde_json::to_value(value)?;
    if let Some(object) = json.as_object_mut() {
        object.insert("schema".to_string(), serde_json::json!(1));
    }
    Ok(json)
}

fn default_files() -> Result<HashMap<&'static str, serde_json::Value>, InfraError> {
    Ok(HashMap::from([
        (APP_JSON, with_schema(&AppConfig::default())?),
        (BOOKING_JSON, with_schema(&BookingConfig::default())?),
    ]))
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files()? {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    let app: AppConfig = serde_json::from_value(read_config(&config_dir.join(APP_JSON))?)?;
    let booking: BookingConfig =
        serde_json::from_value(read_config(&config_dir.join(BOOKING_JSON))?)?;
    booking.validate()?;
    Ok(ConfigBundle { app, booking })
}
