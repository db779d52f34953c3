use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a path into a record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Temporal resume keys. Offsets carry seconds east of UTC separately for
/// the date and time forms since chrono has no offset-aware date or time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TemporalKey {
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    OffsetDate { date: NaiveDate, offset_secs: i32 },
    OffsetTime { time: NaiveTime, offset_secs: i32 },
    OffsetDateTime(DateTime<FixedOffset>),
}

impl TemporalKey {
    pub fn name(&self) -> &'static str {
        match self {
            TemporalKey::LocalDate(_) => "local date",
            TemporalKey::LocalTime(_) => "local time",
            TemporalKey::LocalDateTime(_) => "local datetime",
            TemporalKey::OffsetDate { .. } => "offset date",
            TemporalKey::OffsetTime { .. } => "offset time",
            TemporalKey::OffsetDateTime(_) => "offset datetime",
        }
    }
}

impl fmt::Display for TemporalKey {
    /// ISO-8601 text, which SQL Server converts implicitly on comparison.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalKey::LocalDate(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TemporalKey::LocalTime(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            TemporalKey::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            TemporalKey::OffsetDate { date, offset_secs } => {
                write!(f, "{}{}", date.format("%Y-%m-%d"), format_offset(*offset_secs))
            }
            TemporalKey::OffsetTime { time, offset_secs } => {
                write!(f, "{}{}", time.format("%H:%M:%S%.f"), format_offset(*offset_secs))
            }
            TemporalKey::OffsetDateTime(dt) => {
                write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f%:z"))
            }
        }
    }
}

fn format_offset(secs: i32) -> String {
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.unsigned_abs();
    format!("{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum OffsetKey {
    Int(i64),
    String(String),
    Temporal(TemporalKey),
}

/// Resume point for incremental reads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Offset {
    /// Generated by this connector: resume after `key` at `path`.
    Internal {
        path: Vec<PathSegment>,
        key: OffsetKey,
    },
    /// Produced by some other system; opaque to us.
    External(Vec<u8>),
}

impl Offset {
    /// Offset on a single top-level field.
    pub fn field(name: impl Into<String>, key: OffsetKey) -> Self {
        Offset::Internal {
            path: vec![PathSegment::Field(name.into())],
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_key_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let time = NaiveTime::from_hms_milli_opt(7, 5, 1, 250).unwrap();

        assert_eq!(TemporalKey::LocalDate(date).to_string(), "2024-03-09");
        assert_eq!(TemporalKey::LocalTime(time).to_string(), "07:05:01.250");
        assert_eq!(
            TemporalKey::LocalDateTime(date.and_time(time)).to_string(),
            "2024-03-09T07:05:01.250"
        );
        assert_eq!(
            TemporalKey::OffsetTime { time, offset_secs: -5 * 3600 - 1800 }.to_string(),
            "07:05:01.250-05:30"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = date.and_time(time).and_local_timezone(offset).unwrap();
        assert_eq!(
            TemporalKey::OffsetDateTime(dt).to_string(),
            "2024-03-09T07:05:01.250+02:00"
        );
    }
}
