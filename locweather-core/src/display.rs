//! Turns a stored snapshot into ready-to-print strings.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::model::{UnitSystem, WeatherSnapshot};

/// Regions whose users expect Fahrenheit.
const FAHRENHEIT_REGIONS: &[&str] = &["US", "LR", "MM"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Sunny,
    Cloud,
    Rain,
    Storm,
    Snowflake,
}

impl Icon {
    pub fn asset_name(&self) -> &'static str {
        match self {
            Icon::Sunny => "sunny",
            Icon::Cloud => "cloud",
            Icon::Rain => "rain",
            Icon::Storm => "storm",
            Icon::Snowflake => "snowflake",
        }
    }

    /// Single glyph for terminal output.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sunny => "☀",
            Icon::Cloud => "☁",
            Icon::Rain => "☂",
            Icon::Storm => "⚡",
            Icon::Snowflake => "❄",
        }
    }
}

/// Maps an OpenWeather icon code to a display icon. Unknown codes have none.
pub fn icon_for_code(code: &str) -> Option<Icon> {
    match code {
        "01d" => Some(Icon::Sunny),
        "02d" | "03d" | "04d" | "04n" | "01n" | "02n" | "03n" | "10n" => Some(Icon::Cloud),
        "10d" | "11n" => Some(Icon::Rain),
        "11d" => Some(Icon::Storm),
        "13d" | "13n" => Some(Icon::Snowflake),
        _ => None,
    }
}

/// Temperature unit label guessed from the region code alone.
pub fn unit_label(region: &str) -> &'static str {
    if FAHRENHEIT_REGIONS.iter().any(|r| r.eq_ignore_ascii_case(region.trim())) {
        "°F"
    } else {
        "°C"
    }
}

/// Whether the region-based label agrees with the unit system actually
/// requested from the API.
pub fn unit_label_matches(units: UnitSystem, label: &str) -> bool {
    match units {
        UnitSystem::Imperial => label == "°F",
        UnitSystem::Metric => label == "°C",
    }
}

/// Region part of a POSIX locale string, e.g. `en_US.UTF-8` -> `US`.
pub fn region_from_locale(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?;
    let (_, region) = base.split_once(['_', '-'])?;

    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

/// `HH:mm:ss` for a UTC epoch second in the given timezone.
pub fn format_clock<Tz: TimeZone>(unix_seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|utc| utc.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFields {
    pub main: String,
    pub description: String,
    pub temperature: String,
    pub unit_label: &'static str,
    pub humidity: String,
    pub min: String,
    pub max: String,
    pub wind_speed: String,
    pub location_name: String,
    pub country: String,
    pub sunrise: String,
    pub sunset: String,
    pub icon: Option<Icon>,
}

/// Display fields using the machine's local timezone.
pub fn to_display_fields(snapshot: &WeatherSnapshot, locale_region: &str) -> DisplayFields {
    to_display_fields_in(snapshot, locale_region, &Local)
}

pub fn to_display_fields_in<Tz: TimeZone>(
    snapshot: &WeatherSnapshot,
    locale_region: &str,
    tz: &Tz,
) -> DisplayFields
where
    Tz::Offset: std::fmt::Display,
{
    let unit = unit_label(locale_region);
    let condition = snapshot.primary_condition();

    DisplayFields {
        main: condition.map(|c| c.main.clone()).unwrap_or_default(),
        description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        temperature: format!("{}{unit}", snapshot.main.temp),
        unit_label: unit,
        humidity: format!("{} per cent", snapshot.main.humidity),
        min: format!("{} min", snapshot.main.temp_min),
        max: format!("{} max", snapshot.main.temp_max),
        wind_speed: snapshot.wind.speed.to_string(),
        location_name: snapshot.location_name.clone(),
        country: snapshot.country_code.clone(),
        sunrise: format_clock(snapshot.sunrise_unix_seconds, tz),
        sunset: format_clock(snapshot.sunset_unix_seconds, tz),
        icon: condition.and_then(|c| icon_for_code(&c.icon)),
    }
}
