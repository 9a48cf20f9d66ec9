//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds), evaluated in UTC.
//! Minute and hour accept `*`, `*/N`, comma lists and single values; the
//! date fields accept `*` only.
//!
//! No cron crate dependency; the sweep cadence never needs calendar rules.

use chrono::{DateTime, Duration, Timelike, Utc};

use groupbot_core::error::{GroupBotError, Result};

/// Default sweep cadence: 10:00 and 17:00 UTC, every day.
pub const DEFAULT_NOTIFICATION_CRON: &str = "0 10,17 * * *";

/// A parsed cron expression. Parsing happens once at startup; occurrence
/// lookup is a pure function of the clock.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(GroupBotError::Config(format!(
                "invalid cron expression '{expression}': need 5 fields (MIN HOUR DOM MON DOW)"
            )));
        }

        let minutes = parse_field(parts[0], 0, 59).ok_or_else(|| {
            GroupBotError::Config(format!(
                "invalid cron minute field '{}' in '{expression}'",
                parts[0]
            ))
        })?;
        let hours = parse_field(parts[1], 0, 23).ok_or_else(|| {
            GroupBotError::Config(format!(
                "invalid cron hour field '{}' in '{expression}'",
                parts[1]
            ))
        })?;

        for (name, field) in [("day-of-month", parts[2]), ("month", parts[3]), ("day-of-week", parts[4])] {
            if field != "*" {
                return Err(GroupBotError::Config(format!(
                    "cron {name} field must be '*', got '{field}' in '{expression}'"
                )));
            }
        }

        Ok(Self {
            expression: expression.to_string(),
            minutes,
            hours,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next occurrence strictly after `after`, or None if nothing matches
    /// within 48 hours (cannot happen for a validly parsed expression, but
    /// callers treat it as "stop scheduling").
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = after + Duration::minutes(1);
        candidate = candidate
            .with_second(0)
            .and_then(|c| c.with_nanosecond(0))
            .unwrap_or(candidate);

        for _ in 0..(48 * 60) {
            if self.minutes.contains(&candidate.minute()) && self.hours.contains(&candidate.hour())
            {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }

    /// Sleep duration until the next occurrence after `now`.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let next = self.next_after(now)?;
        Some((next - now).to_std().unwrap_or_default())
    }
}

/// Parse a cron field into the list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N — every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated: "10,17"
    if field.contains(',') {
        let vals: std::result::Result<Vec<u32>, _> =
            field.split(',').map(|s| s.trim().parse()).collect();
        let vals = vals.ok()?;
        if vals.iter().any(|v| *v < min || *v > max) {
            return None;
        }
        return Some(vals);
    }

    // Single number
    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max { Some(vec![n]) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn default_cadence_fires_morning_and_evening() {
        let schedule = CronSchedule::parse(DEFAULT_NOTIFICATION_CRON).unwrap();

        let morning = Utc.with_ymd_and_hms(2026, 8, 27, 8, 0, 0).unwrap();
        let next = schedule.next_after(morning).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 27, 10, 0, 0).unwrap());

        let after_first = schedule.next_after(next).unwrap();
        assert_eq!(
            after_first,
            Utc.with_ymd_and_hms(2026, 8, 27, 17, 0, 0).unwrap()
        );

        // Past the evening run the schedule rolls over to the next day.
        let evening = Utc.with_ymd_and_hms(2026, 8, 27, 18, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(evening).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 28, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn occurrences_are_strictly_after() {
        let schedule = CronSchedule::parse("0 10,17 * * *").unwrap();
        let exactly_ten = Utc.with_ymd_and_hms(2026, 8, 27, 10, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(exactly_ten).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 27, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn chained_occurrences_cover_two_days() {
        let schedule = CronSchedule::parse("0 10,17 * * *").unwrap();
        let mut at = Utc.with_ymd_and_hms(2026, 8, 27, 0, 0, 0).unwrap();
        let mut hours = Vec::new();
        for _ in 0..4 {
            at = schedule.next_after(at).unwrap();
            hours.push((at.day(), at.hour()));
        }
        assert_eq!(hours, vec![(27, 10), (27, 17), (28, 10), (28, 17)]);
    }

    #[test]
    fn step_fields_parse() {
        let schedule = CronSchedule::parse("*/15 * * * *").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 8, 27, 10, 2, 30).unwrap();
        let next = schedule.next_after(at).unwrap();
        assert_eq!(next.minute(), 15);
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        assert!(CronSchedule::parse("bad").is_err());
        assert!(CronSchedule::parse("0 10 * *").is_err());
        assert!(CronSchedule::parse("61 10 * * *").is_err());
        assert!(CronSchedule::parse("0 25 * * *").is_err());
        assert!(CronSchedule::parse("0 10 5 * *").is_err());
        assert!(CronSchedule::parse("0 10 * * 1").is_err());
        assert!(CronSchedule::parse("*/0 * * * *").is_err());
    }

    #[test]
    fn delay_tracks_wall_clock() {
        let schedule = CronSchedule::parse("0 10 * * *").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 8, 27, 9, 30, 0).unwrap();
        assert_eq!(
            schedule.delay_from(at).unwrap(),
            std::time::Duration::from_secs(30 * 60)
        );
    }
}
