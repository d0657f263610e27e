//! Task list input for the CLI
//!
//! Tasks come in as a JSON array of task records; dates on the command line
//! accept RFC 3339 timestamps or plain `YYYY-MM-DD` days (midnight UTC).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::domain::TaskOrEmpty;

/// Reads a JSON array of tasks from disk
pub fn load_tasks(path: &Path) -> Result<Vec<TaskOrEmpty>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading task list from {}", path.display()))?;
    let tasks: Vec<TaskOrEmpty> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing task list from {}", path.display()))?;
    Ok(tasks)
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}', expected RFC 3339 or YYYY-MM-DD", input))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_dates_as_midnight_utc() {
        let parsed = parse_date("2024-03-05").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_date("2024-03-05T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("soon").is_err());
    }
}
