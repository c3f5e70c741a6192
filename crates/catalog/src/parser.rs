//! Parser for catalog data files.
//!
//! Four `::`-separated files make up a catalog directory:
//! - activities.dat: id::name::kind::description::min::max::preference
//! - preferences.dat: id::user_id::activity_id::min::max::flags
//! - personal.dat: id::user_id::name::kind::description::min::max::flags
//! - cities.dat: id::name::country::latitude::longitude
//!
//! `preference` is either pipe-separated sky flags ("sunny|cloudy") or a
//! single declared sky ("declared:rainy"). `flags` is the pipe form only,
//! and may be empty. Sky tokens go through the synonym table, so
//! "soleado|nubes" is accepted too.

use crate::error::{CatalogError, Result};
use crate::sky::normalize_sky;
use crate::types::*;
use std::path::Path;
use std::str::FromStr;

const DECLARED_PREFIX: &str = "declared:";

/// Read a whole file, mapping a missing file to `FileNotFound`.
fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })
}

/// Non-empty, trimmed lines paired with their 1-based line numbers.
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Split a line into exactly `expected` fields.
fn split_fields<'a>(
    line: &'a str,
    expected: usize,
    file: &str,
    line_no: usize,
) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split("::").map(str::trim).collect();
    if fields.len() != expected {
        return Err(CatalogError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("expected {} fields but found {}", expected, fields.len()),
        });
    }
    Ok(fields)
}

/// Parse a numeric field, reporting the field name on failure.
fn parse_number<T: FromStr>(value: &str, field: &str, file: &str, line_no: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| CatalogError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", field, e),
    })
}

/// Attach the file and line to a field-level `InvalidValue`.
fn at_line<T>(result: Result<T>, file: &str, line_no: usize) -> Result<T> {
    result.map_err(|e| match e {
        CatalogError::InvalidValue { field, value } => CatalogError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid {}: {}", field, value),
        },
        other => other,
    })
}

fn parse_temperature(value: &str, field: &str, file: &str, line_no: usize) -> Result<f64> {
    let temperature: f64 = parse_number(value, field, file, line_no)?;
    if !temperature.is_finite() {
        return Err(CatalogError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid {}: {} is not a finite number", field, value),
        });
    }
    Ok(temperature)
}

/// Parse a coordinate and check it lies within `[-limit, limit]`.
fn parse_coordinate(
    value: &str,
    field: &str,
    limit: f64,
    file: &str,
    line_no: usize,
) -> Result<f64> {
    let coordinate: f64 = parse_number(value, field, file, line_no)?;
    if !coordinate.is_finite() || coordinate.abs() > limit {
        return Err(CatalogError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid {}: {} is outside ±{}", field, value, limit),
        });
    }
    Ok(coordinate)
}

/// Parse an activity kind ("indoor" / "outdoor", case-insensitive)
pub fn parse_kind(s: &str) -> Result<ActivityKind> {
    match s.trim().to_lowercase().as_str() {
        "indoor" => Ok(ActivityKind::Indoor),
        "outdoor" => Ok(ActivityKind::Outdoor),
        _ => Err(CatalogError::InvalidValue {
            field: "kind".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse a single sky token through the synonym table
pub fn parse_sky(s: &str) -> Result<Sky> {
    normalize_sky(s).sky().ok_or_else(|| CatalogError::InvalidValue {
        field: "sky".to_string(),
        value: s.to_string(),
    })
}

/// Parse pipe-separated sky flags; an empty string or "-" sets none
pub fn parse_flags(s: &str) -> Result<SkyFlags> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Ok(SkyFlags::default());
    }
    let skies = s
        .split('|')
        .map(parse_sky)
        .collect::<Result<Vec<Sky>>>()?;
    Ok(SkyFlags::only(&skies))
}

/// Parse either flag form or declared form of a weather preference
pub fn parse_preference(s: &str) -> Result<WeatherPreference> {
    let s = s.trim();
    match s.strip_prefix(DECLARED_PREFIX) {
        Some(sky) => Ok(WeatherPreference::Declared {
            sky: parse_sky(sky)?,
        }),
        None => Ok(WeatherPreference::Flags(parse_flags(s)?)),
    }
}

/// Parse the contents of an activities file
pub fn parse_activities_str(content: &str, file: &str) -> Result<Vec<Activity>> {
    let mut activities = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 7, file, line_no)?;

        let activity = Activity {
            id: parse_number(fields[0], "activity id", file, line_no)?,
            name: fields[1].to_string(),
            kind: at_line(parse_kind(fields[2]), file, line_no)?,
            description: fields[3].to_string(),
            temperature_min: parse_temperature(fields[4], "temperature_min", file, line_no)?,
            temperature_max: parse_temperature(fields[5], "temperature_max", file, line_no)?,
            preference: at_line(parse_preference(fields[6]), file, line_no)?,
        };

        if activity.name.is_empty() {
            return Err(CatalogError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing name".to_string(),
            });
        }

        activities.push(activity);
    }

    Ok(activities)
}

/// Parse the contents of a preferences file
pub fn parse_preferences_str(content: &str, file: &str) -> Result<Vec<UserPreference>> {
    let mut preferences = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 6, file, line_no)?;

        if fields[1].is_empty() {
            return Err(CatalogError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing user_id".to_string(),
            });
        }

        preferences.push(UserPreference {
            id: parse_number(fields[0], "preference id", file, line_no)?,
            user_id: fields[1].to_string(),
            activity_id: parse_number(fields[2], "activity id", file, line_no)?,
            temperature_min: parse_temperature(fields[3], "temperature_min", file, line_no)?,
            temperature_max: parse_temperature(fields[4], "temperature_max", file, line_no)?,
            flags: at_line(parse_flags(fields[5]), file, line_no)?,
        });
    }

    Ok(preferences)
}

/// Parse the contents of a personal activities file
pub fn parse_personal_str(content: &str, file: &str) -> Result<Vec<PersonalActivity>> {
    let mut personal = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 8, file, line_no)?;

        personal.push(PersonalActivity {
            user_id: fields[1].to_string(),
            activity: Activity {
                id: parse_number(fields[0], "activity id", file, line_no)?,
                name: fields[2].to_string(),
                kind: at_line(parse_kind(fields[3]), file, line_no)?,
                description: fields[4].to_string(),
                temperature_min: parse_temperature(fields[5], "temperature_min", file, line_no)?,
                temperature_max: parse_temperature(fields[6], "temperature_max", file, line_no)?,
                preference: WeatherPreference::Flags(at_line(
                    parse_flags(fields[7]),
                    file,
                    line_no,
                )?),
            },
        });
    }

    Ok(personal)
}

/// Parse the contents of a cities file
pub fn parse_cities_str(content: &str, file: &str) -> Result<Vec<City>> {
    let mut cities = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 5, file, line_no)?;

        if fields[1].is_empty() {
            return Err(CatalogError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing name".to_string(),
            });
        }

        cities.push(City {
            id: parse_number(fields[0], "city id", file, line_no)?,
            name: fields[1].to_string(),
            country: fields[2].to_string(),
            latitude: parse_coordinate(fields[3], "latitude", 90.0, file, line_no)?,
            longitude: parse_coordinate(fields[4], "longitude", 180.0, file, line_no)?,
        });
    }

    Ok(cities)
}

/// Parse the activities.dat file
pub fn parse_activities(path: &Path) -> Result<Vec<Activity>> {
    parse_activities_str(&read_file(path)?, "activities.dat")
}

/// Parse the preferences.dat file; a missing file means no preferences
pub fn parse_preferences(path: &Path) -> Result<Vec<UserPreference>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    parse_preferences_str(&read_file(path)?, "preferences.dat")
}

/// Parse the personal.dat file; a missing file means no personal activities
pub fn parse_personal(path: &Path) -> Result<Vec<PersonalActivity>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    parse_personal_str(&read_file(path)?, "personal.dat")
}

/// Parse the cities.dat file; a missing file means no city lookups
pub fn parse_cities(path: &Path) -> Result<Vec<City>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    parse_cities_str(&read_file(path)?, "cities.dat")
}
