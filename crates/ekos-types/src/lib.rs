//! # ekos-types: Core types for `EKOS`
//!
//! This crate contains shared types used across the `EKOS` system:
//! - Report numbering ([`Year`], [`CityCode`], [`Sequence`], [`Partition`], [`ReportNumber`])
//! - Entity IDs ([`ReportId`])
//! - Report records ([`Report`], [`NewReport`], [`ReportUpdate`], [`ProjectRef`])
//! - Report enums ([`ReportStatus`], [`Conformity`])
//! - Catalog entries ([`Project`], [`Category`])
//!
//! # Report Number Layout
//!
//! ```text
//! PK 2025 ANK 007
//! ── ──── ─── ───
//!  │   │    │   └── sequence, zero-padded, unique within the partition
//!  │   │    └────── 3-letter city code
//!  │   └─────────── UTC year of allocation
//!  └─────────────── fixed marker
//! ```
//!
//! ```
//! use ekos_types::{CityCode, Partition, ReportNumber, Sequence, Year};
//!
//! let partition = Partition::new(Year::new(2025)?, CityCode::new("ANK")?);
//! let number = ReportNumber::new(partition, Sequence::new(7)?);
//! assert_eq!(number.to_string(), "PK2025ANK007");
//! assert_eq!(ReportNumber::parse("PK2025ANK007")?, number);
//! # Ok::<(), ekos_types::ReportNumberError>(())
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod catalog;
mod report;

pub use catalog::{Category, Project};
pub use report::{Conformity, NewReport, ProjectRef, Report, ReportStatus, ReportUpdate};

/// Fixed marker every report number starts with.
pub const REPORT_NUMBER_MARKER: &str = "PK";

/// Rendered length of a report number: marker + year + city + sequence.
pub const REPORT_NUMBER_LEN: usize = 2 + 4 + 3 + 3;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while constructing or parsing numbering types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportNumberError {
    /// The year cannot be rendered with exactly four digits.
    #[error("year {0} is outside 1000..=9999")]
    YearOutOfRange(i32),

    /// A city code is not exactly three ASCII upper-case letters.
    #[error("invalid city code '{0}': expected three upper-case letters")]
    InvalidCityCode(String),

    /// A sequence number does not fit the three-digit field.
    #[error("sequence {0} is outside 1..=999")]
    SequenceOutOfRange(u32),

    /// Text does not follow the `PK<YYYY><CCC><NNN>` grammar.
    #[error("malformed report number '{input}': {reason}")]
    Malformed { input: String, reason: &'static str },
}

// ============================================================================
// Numbering Components - All Copy
// ============================================================================

/// Four-digit UTC year component of a report number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Year(u16);

impl Year {
    pub const MIN: u16 = 1000;
    pub const MAX: u16 = 9999;

    pub fn new(year: u16) -> Result<Self, ReportNumberError> {
        if (Self::MIN..=Self::MAX).contains(&year) {
            Ok(Self(year))
        } else {
            Err(ReportNumberError::YearOutOfRange(i32::from(year)))
        }
    }

    /// Extracts the calendar year of a UTC instant.
    pub fn from_datetime(at: DateTime<Utc>) -> Result<Self, ReportNumberError> {
        let year = at.year();
        u16::try_from(year)
            .ok()
            .filter(|y| (Self::MIN..=Self::MAX).contains(y))
            .map(Self)
            .ok_or(ReportNumberError::YearOutOfRange(year))
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl TryFrom<u16> for Year {
    type Error = ReportNumberError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0
    }
}

/// Three-letter city code, e.g. `ANK` for Ankara.
///
/// Stored inline as ASCII bytes so the type stays `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityCode([u8; 3]);

impl CityCode {
    /// Code used when a city name has no directory entry.
    pub const FALLBACK: CityCode = CityCode(*b"XXX");

    pub fn new(code: &str) -> Result<Self, ReportNumberError> {
        let bytes: [u8; 3] = code
            .as_bytes()
            .try_into()
            .map_err(|_| ReportNumberError::InvalidCityCode(code.to_string()))?;

        if bytes.iter().all(u8::is_ascii_uppercase) {
            Ok(Self(bytes))
        } else {
            Err(ReportNumberError::InvalidCityCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII upper-case bytes.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }
}

impl fmt::Debug for CityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CityCode({})", self.as_str())
    }
}

impl Display for CityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CityCode {
    type Err = ReportNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CityCode {
    type Error = ReportNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CityCode> for String {
    fn from(code: CityCode) -> Self {
        code.as_str().to_string()
    }
}

/// Position of a report within its partition, rendered as three digits.
///
/// Sequences start at 1. The field is never widened: 999 is the last
/// sequence a partition can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Sequence(u32);

impl Sequence {
    pub const FIRST: Sequence = Sequence(1);
    pub const MAX: Sequence = Sequence(999);

    pub fn new(value: u32) -> Result<Self, ReportNumberError> {
        if (Self::FIRST.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReportNumberError::SequenceOutOfRange(value))
        }
    }

    /// Returns the following sequence, or `None` once the field is full.
    pub fn next(self) -> Option<Sequence> {
        if self.0 >= Self::MAX.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl TryFrom<u32> for Sequence {
    type Error = ReportNumberError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sequence> for u32 {
    fn from(seq: Sequence) -> Self {
        seq.0
    }
}

// ============================================================================
// Partition & Report Number
// ============================================================================

/// The `(year, city)` pair that scopes one monotonic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub year: Year,
    pub city: CityCode,
}

impl Partition {
    pub fn new(year: Year, city: CityCode) -> Self {
        Self { year, city }
    }

    /// The text every number in this partition starts with: `PK<YYYY><CCC>`.
    pub fn prefix(&self) -> String {
        format!("{REPORT_NUMBER_MARKER}{}{}", self.year, self.city)
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REPORT_NUMBER_MARKER}{}{}", self.year, self.city)
    }
}

/// Human-readable report identifier, `PK<YYYY><CCC><NNN>`.
///
/// Allocated exactly once per report and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportNumber {
    partition: Partition,
    sequence: Sequence,
}

impl ReportNumber {
    pub fn new(partition: Partition, sequence: Sequence) -> Self {
        Self {
            partition,
            sequence,
        }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Parses the canonical `PK<YYYY><CCC><NNN>` rendering.
    ///
    /// Anything else, including a widened sequence field, is rejected.
    pub fn parse(input: &str) -> Result<Self, ReportNumberError> {
        let malformed = |reason| ReportNumberError::Malformed {
            input: input.to_string(),
            reason,
        };

        if !input.is_ascii() {
            return Err(malformed("contains non-ASCII characters"));
        }
        if input.len() != REPORT_NUMBER_LEN {
            return Err(malformed("expected 12 characters"));
        }

        let rest = input
            .strip_prefix(REPORT_NUMBER_MARKER)
            .ok_or_else(|| malformed("missing PK marker"))?;
        let (year, rest) = rest.split_at(4);
        let (city, seq) = rest.split_at(3);

        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("year is not numeric"));
        }
        if !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("sequence is not numeric"));
        }

        let year = year
            .parse::<u16>()
            .map_err(|_| malformed("year is not numeric"))
            .and_then(|y| Year::new(y).map_err(|_| malformed("year out of range")))?;
        let city = CityCode::new(city).map_err(|_| malformed("city code is not A-Z"))?;
        let sequence = seq
            .parse::<u32>()
            .map_err(|_| malformed("sequence is not numeric"))
            .and_then(|n| Sequence::new(n).map_err(|_| malformed("sequence is zero")))?;

        Ok(Self::new(Partition::new(year, city), sequence))
    }
}

impl Display for ReportNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.partition, self.sequence)
    }
}

impl FromStr for ReportNumber {
    type Err = ReportNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReportNumber {
    type Error = ReportNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReportNumber> for String {
    fn from(number: ReportNumber) -> Self {
        number.to_string()
    }
}

// ============================================================================
// Entity IDs
// ============================================================================

/// Unique identifier for a report record.
///
/// Records are addressed by id; the [`ReportNumber`] is a display identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
