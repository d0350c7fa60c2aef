//! Conversion of source-specific timestamps into UTC. Each capture source
//! stores time relative to its own epoch, so the convention travels with
//! the value instead of being guessed from its magnitude.

use std::fmt::Display;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chromium history counts microseconds from this date.
const WEBKIT_EPOCH: NaiveDateTime =
    NaiveDateTime::new(NaiveDate::from_ymd_opt(1601, 1, 1).unwrap(), NaiveTime::MIN);

/// Safari history counts seconds from this date.
const CORE_DATA_EPOCH: NaiveDateTime =
    NaiveDateTime::new(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), NaiveTime::MIN);

/// Timestamp convention of a capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBase {
    /// Microseconds since 1601-01-01.
    WebkitMicros,
    /// Seconds since 2001-01-01, fractions allowed.
    CoreDataSeconds,
    /// Absolute text timestamp.
    Iso8601,
}

impl Display for TimeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBase::WebkitMicros => write!(f, "webkit-micros"),
            TimeBase::CoreDataSeconds => write!(f, "core-data-seconds"),
            TimeBase::Iso8601 => write!(f, "iso8601"),
        }
    }
}

/// Timestamp value as it appears in a capture file. Kept untagged so
/// integer json stays i64; Chromium microsecond counts do not survive a
/// round trip through f64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("{base} timestamp must be numeric, got {text:?}")]
    ExpectedNumeric { base: TimeBase, text: String },
    #[error("absolute timestamp must be text, got {value}")]
    ExpectedText { value: f64 },
    #[error("cannot parse {text:?} as an absolute timestamp")]
    BadText { text: String },
    #[error("{base} value {value} is outside the representable range")]
    OutOfRange { base: TimeBase, value: f64 },
}

/// Resolves a raw timestamp under the source's convention. Total for
/// well-formed input; the error is meant to be counted and skipped by the
/// caller, not bubbled up.
pub fn normalize(base: TimeBase, raw: &RawTimestamp) -> Result<DateTime<Utc>, TimestampError> {
    match base {
        TimeBase::WebkitMicros => from_epoch(base, WEBKIT_EPOCH, micros_of(base, raw, 1.0)?),
        TimeBase::CoreDataSeconds => {
            from_epoch(base, CORE_DATA_EPOCH, micros_of(base, raw, 1_000_000.0)?)
        }
        TimeBase::Iso8601 => match raw {
            RawTimestamp::Int(v) => Err(TimestampError::ExpectedText { value: *v as f64 }),
            RawTimestamp::Float(v) => Err(TimestampError::ExpectedText { value: *v }),
            RawTimestamp::Text(text) => parse_absolute(text),
        },
    }
}

/// Offset in microseconds for the numeric conventions. `scale` converts
/// the source unit to microseconds.
fn micros_of(base: TimeBase, raw: &RawTimestamp, scale: f64) -> Result<i64, TimestampError> {
    match raw {
        RawTimestamp::Int(v) => {
            if scale == 1.0 {
                Ok(*v)
            } else {
                v.checked_mul(scale as i64)
                    .ok_or(TimestampError::OutOfRange {
                        base,
                        value: *v as f64,
                    })
            }
        }
        RawTimestamp::Float(v) => {
            let micros = v * scale;
            if !micros.is_finite() || micros <= i64::MIN as f64 || micros >= i64::MAX as f64 {
                return Err(TimestampError::OutOfRange { base, value: *v });
            }
            Ok(micros as i64)
        }
        RawTimestamp::Text(text) => Err(TimestampError::ExpectedNumeric {
            base,
            text: text.clone(),
        }),
    }
}

fn from_epoch(
    base: TimeBase,
    epoch: NaiveDateTime,
    micros: i64,
) -> Result<DateTime<Utc>, TimestampError> {
    epoch
        .checked_add_signed(Duration::microseconds(micros))
        .map(|v| Utc.from_utc_datetime(&v))
        .ok_or(TimestampError::OutOfRange {
            base,
            value: micros as f64,
        })
}

/// Accepts rfc3339 or a naive iso form, which is taken as UTC.
fn parse_absolute(text: &str) -> Result<DateTime<Utc>, TimestampError> {
    if let Ok(v) = DateTime::parse_from_rfc3339(text) {
        return Ok(v.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(v) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&v));
        }
    }
    Err(TimestampError::BadText {
        text: text.to_string(),
    })
}
