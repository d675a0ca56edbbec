//! RFC 1876 LOC record content
//!
//! Grammar accepted for the content field:
//!
//! ```text
//! d1 [m1 [s1]] {N|S} d2 [m2 [s2]] {E|W} alt[m] [siz[m] [hp[m] [vp[m]]]]
//! ```
//!
//! Tokens are consumed greedily left to right. Values are held as integers in
//! the unit of their finest permitted precision (thousandths of an arc second,
//! centimeters), so range checks are exact.
//!
//! Filling in omitted size and precision values is left to whoever assembles
//! the wire record; the validator only checks tokens that are present.

use std::fmt;
use std::str::{FromStr, SplitWhitespace};
use std::iter::Peekable;

use lazy_static::lazy_static;
use regex::Regex;

use crate::dns::errors::{ZoneError, ZoneResult};
use crate::dns::validation_result::ValidationResult;

lazy_static! {
    /// Optional sign, integer part, optional fraction
    static ref DECIMAL_REGEX: Regex =
        Regex::new(r"^(-)?([0-9]+)(?:\.([0-9]+))?$").expect("Failed to compile decimal regex");
}

/// Lowest altitude, -100000.00 m
pub const MIN_ALTITUDE_CM: i64 = -10_000_000;
/// Highest altitude, 42849672.95 m
pub const MAX_ALTITUDE_CM: i64 = 4_284_967_295;
/// Largest size or precision accepted, 89999999.99 m
pub const MAX_PRECISION_CM: i64 = 8_999_999_999;

/// Size used when the content omits it, 1 m
pub const DEFAULT_SIZE_CM: i64 = 100;
/// Horizontal precision used when the content omits it, 10000 m
pub const DEFAULT_HORIZ_PRE_CM: i64 = 1_000_000;
/// Vertical precision used when the content omits it, 10 m
pub const DEFAULT_VERT_PRE_CM: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn max_degrees(self) -> u32 {
        match self {
            Axis::Latitude => 90,
            Axis::Longitude => 180,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn from_token(token: &str) -> Option<Hemisphere> {
        match token {
            "N" => Some(Hemisphere::North),
            "S" => Some(Hemisphere::South),
            "E" => Some(Hemisphere::East),
            "W" => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

/// One axis of a LOC position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoCoordinate {
    pub degrees: u32,
    pub minutes: Option<u32>,
    /// Thousandths of an arc second
    pub milliseconds: Option<u32>,
    pub hemisphere: Hemisphere,
}

/// A distance in meters with two decimals of precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocMeters {
    pub centimeters: i64,
}

impl fmt::Display for LocMeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.centimeters < 0 { "-" } else { "" };
        let abs = self.centimeters.abs();
        write!(f, "{}{}.{:02}m", sign, abs / 100, abs % 100)
    }
}

/// Parsed LOC content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocRecord {
    pub latitude: GeoCoordinate,
    pub longitude: GeoCoordinate,
    pub altitude: LocMeters,
    pub size: Option<LocMeters>,
    pub horizontal_precision: Option<LocMeters>,
    pub vertical_precision: Option<LocMeters>,
}

impl LocRecord {
    pub fn size_or_default(&self) -> LocMeters {
        self.size.unwrap_or(LocMeters { centimeters: DEFAULT_SIZE_CM })
    }

    pub fn horizontal_precision_or_default(&self) -> LocMeters {
        self.horizontal_precision
            .unwrap_or(LocMeters { centimeters: DEFAULT_HORIZ_PRE_CM })
    }

    pub fn vertical_precision_or_default(&self) -> LocMeters {
        self.vertical_precision
            .unwrap_or(LocMeters { centimeters: DEFAULT_VERT_PRE_CM })
    }
}

struct Decimal {
    negative: bool,
    integer: String,
    fraction: String,
}

fn parse_decimal(field: &'static str, token: &str) -> ZoneResult<Decimal> {
    let caps = DECIMAL_REGEX
        .captures(token)
        .ok_or_else(|| ZoneError::format(field, token, "not a decimal number"))?;
    Ok(Decimal {
        negative: caps.get(1).is_some(),
        integer: caps[2].to_string(),
        fraction: caps.get(3).map_or(String::new(), |m| m.as_str().to_string()),
    })
}

/// Scale a decimal to an integer count of `10^-places` units
fn scaled(field: &'static str, token: &str, dec: &Decimal, places: usize) -> ZoneResult<i64> {
    if dec.fraction.len() > places {
        return Err(ZoneError::format(
            field,
            token,
            format!("at most {} fractional digits allowed", places),
        ));
    }
    let digits = format!("{}{:0<width$}", dec.integer, dec.fraction, width = places);
    let magnitude: i64 = digits
        .parse()
        .map_err(|_| ZoneError::format(field, token, "number too large"))?;
    Ok(if dec.negative { -magnitude } else { magnitude })
}

fn parse_integer(field: &'static str, token: &str) -> ZoneResult<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ZoneError::format(field, token, "expected an unsigned integer"));
    }
    token
        .parse()
        .map_err(|_| ZoneError::format(field, token, "number too large"))
}

fn format_cm(cm: i64) -> String {
    let s = LocMeters { centimeters: cm }.to_string();
    s.trim_end_matches('m').to_string()
}

struct LocParser<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
}

impl<'a> LocParser<'a> {
    fn new(content: &'a str) -> Self {
        LocParser {
            tokens: content.split_whitespace().peekable(),
        }
    }

    fn next_token(&mut self, what: &str) -> ZoneResult<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| ZoneError::format("LOC record", "", format!("missing {}", what)))
    }

    fn at_hemisphere(&mut self) -> bool {
        self.tokens
            .peek()
            .map_or(false, |t| Hemisphere::from_token(t).is_some())
    }

    fn coordinate(&mut self, axis: Axis) -> ZoneResult<GeoCoordinate> {
        let token = self.next_token(&format!("{} degrees", axis.name()))?;
        let degrees = parse_integer("LOC degrees", token)?;
        if degrees > axis.max_degrees() {
            return Err(ZoneError::range("LOC degrees", degrees, 0, axis.max_degrees()));
        }

        let mut minutes = None;
        let mut milliseconds = None;
        if !self.at_hemisphere() {
            let token = self.next_token(&format!("{} hemisphere", axis.name()))?;
            let value = parse_integer("LOC minutes", token)?;
            if value > 59 {
                return Err(ZoneError::range("LOC minutes", value, 0, 59));
            }
            minutes = Some(value);

            if !self.at_hemisphere() {
                let token = self.next_token(&format!("{} hemisphere", axis.name()))?;
                let dec = parse_decimal("LOC seconds", token)?;
                if dec.negative {
                    return Err(ZoneError::format("LOC seconds", token, "must not be negative"));
                }
                let value = scaled("LOC seconds", token, &dec, 3)?;
                if value > 59_999 {
                    return Err(ZoneError::range("LOC seconds", token, "0", "59.999"));
                }
                milliseconds = Some(value as u32);
            }
        }

        let token = self.next_token(&format!("{} hemisphere", axis.name()))?;
        let hemisphere = Hemisphere::from_token(token).ok_or_else(|| {
            ZoneError::format("LOC hemisphere", token, "expected N, S, E or W")
        })?;
        if hemisphere.axis() != axis {
            return Err(ZoneError::format(
                "LOC hemisphere",
                token,
                format!("not valid for {}", axis.name()),
            ));
        }

        Ok(GeoCoordinate {
            degrees,
            minutes,
            milliseconds,
            hemisphere,
        })
    }

    fn meters(&mut self, field: &'static str, token: &str, min: i64, max: i64) -> ZoneResult<LocMeters> {
        let number = token.strip_suffix('m').unwrap_or(token);
        let dec = parse_decimal(field, number)?;
        if dec.negative && min >= 0 {
            return Err(ZoneError::format(field, token, "must not be negative"));
        }
        let cm = scaled(field, token, &dec, 2)?;
        if cm < min || cm > max {
            return Err(ZoneError::range(field, number.to_string(), format_cm(min), format_cm(max)));
        }
        Ok(LocMeters { centimeters: cm })
    }

    fn optional_meters(&mut self, field: &'static str) -> ZoneResult<Option<LocMeters>> {
        match self.tokens.next() {
            Some(token) => self.meters(field, token, 0, MAX_PRECISION_CM).map(Some),
            None => Ok(None),
        }
    }

    fn parse(mut self) -> ZoneResult<LocRecord> {
        let latitude = self.coordinate(Axis::Latitude)?;
        let longitude = self.coordinate(Axis::Longitude)?;

        let token = self.next_token("altitude")?;
        let altitude = self.meters("LOC altitude", token, MIN_ALTITUDE_CM, MAX_ALTITUDE_CM)?;

        let size = self.optional_meters("LOC size")?;
        let horizontal_precision = self.optional_meters("LOC horizontal precision")?;
        let vertical_precision = self.optional_meters("LOC vertical precision")?;

        if let Some(extra) = self.tokens.next() {
            return Err(ZoneError::format("LOC record", extra, "unexpected trailing token"));
        }

        Ok(LocRecord {
            latitude,
            longitude,
            altitude,
            size,
            horizontal_precision,
            vertical_precision,
        })
    }
}

impl FromStr for LocRecord {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocParser::new(s).parse()
    }
}

pub struct LocRecordValidator;

impl LocRecordValidator {
    /// Check LOC content, reporting the first violation found
    pub fn validate(content: &str) -> ValidationResult<bool> {
        match content.parse::<LocRecord>() {
            Ok(_) => ValidationResult::success(true),
            Err(e) => ValidationResult::failure(e.to_string()),
        }
    }

    pub fn is_valid_loc(content: &str) -> bool {
        Self::validate(content).is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_is_valid() {
        assert!(LocRecordValidator::is_valid_loc(
            "37 23 30.900 N 121 59 19.000 W 7.00m 100.00m 100.00m 2.00m"
        ));
    }

    #[test]
    fn test_minimal_record_is_valid() {
        let loc: LocRecord = "0 N 0 E 0".parse().unwrap();
        assert_eq!(loc.latitude.minutes, None);
        assert_eq!(loc.altitude, LocMeters { centimeters: 0 });
        assert_eq!(loc.size_or_default().centimeters, DEFAULT_SIZE_CM);
        assert_eq!(loc.horizontal_precision_or_default().centimeters, DEFAULT_HORIZ_PRE_CM);
        assert_eq!(loc.vertical_precision_or_default().centimeters, DEFAULT_VERT_PRE_CM);
    }

    #[test]
    fn test_parsed_fields() {
        let loc: LocRecord = "52 22 23.123 N 4 53 32 E -2m 1m 10000 10"
            .parse()
            .unwrap();
        assert_eq!(loc.latitude.degrees, 52);
        assert_eq!(loc.latitude.minutes, Some(22));
        assert_eq!(loc.latitude.milliseconds, Some(23_123));
        assert_eq!(loc.longitude.hemisphere, Hemisphere::East);
        assert_eq!(loc.longitude.milliseconds, Some(32_000));
        assert_eq!(loc.altitude.centimeters, -200);
        assert_eq!(loc.horizontal_precision, Some(LocMeters { centimeters: 1_000_000 }));
    }

    #[test]
    fn test_seconds_of_sixty_rejected() {
        let result = LocRecordValidator::validate("52 14 05 N 00 08 60 E 10m");
        assert!(!result.is_valid());
        assert!(result.first_error().contains("seconds"));
    }

    #[test]
    fn test_wrong_axis_hemisphere_rejected() {
        let result = LocRecordValidator::validate("42 21 54 N 71 06 18 S -24m 30m");
        assert!(!result.is_valid());
        assert!(result.first_error().contains("longitude"));

        assert!(!LocRecordValidator::is_valid_loc("42 21 54 E 71 06 18 W 0m"));
    }

    #[test]
    fn test_altitude_bounds() {
        assert!(!LocRecordValidator::is_valid_loc("90 59 59.9 N 10 18 E 42849672.96m 1m"));
        assert!(LocRecordValidator::is_valid_loc("90 59 59.9 N 10 18 E 42849672.95m 1m"));
        assert!(LocRecordValidator::is_valid_loc("10 N 10 E -100000.00m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 E -100000.01m"));
    }

    #[test]
    fn test_degree_and_minute_bounds() {
        assert!(LocRecordValidator::is_valid_loc("90 N 180 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("91 N 10 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 181 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 60 N 10 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 30.5 N 10 W 0m"));
    }

    #[test]
    fn test_precision_limits() {
        assert!(LocRecordValidator::is_valid_loc("10 20 30.123 N 10 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 20 30.1234 N 10 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 1.234m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 1m 1.001m"));
    }

    #[test]
    fn test_size_and_precision_must_be_non_negative() {
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 0m -1m"));
        assert!(LocRecordValidator::is_valid_loc("10 N 10 W 0m 89999999.99m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 0m 90000000.00m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 0m 1m 1m 90000000m"));
    }

    #[test]
    fn test_structural_errors() {
        assert!(!LocRecordValidator::is_valid_loc(""));
        assert!(!LocRecordValidator::is_valid_loc("10 20 30 40 N 10 W 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 0m 1m 1m 1m 1m"));
        assert!(!LocRecordValidator::is_valid_loc("10 n 10 w 0m"));
        assert!(!LocRecordValidator::is_valid_loc("10 N 10 W 0mm"));
    }

    #[test]
    fn test_meters_display() {
        assert_eq!(LocMeters { centimeters: -2405 }.to_string(), "-24.05m");
        assert_eq!(LocMeters { centimeters: 700 }.to_string(), "7.00m");
    }
}
