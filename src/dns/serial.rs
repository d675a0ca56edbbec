//! Date-encoded SOA serial numbers
//!
//! A serial is `YYYYMMDD * 100 + revision`. Secondaries only transfer a zone
//! when its serial grows (RFC 1982), so every change bumps the revision, and
//! the date part follows the calendar. Ninety-nine changes in one day push the
//! date one day ahead.
//!
//! A stored serial of `0` means the zone has no serial yet and is returned
//! unchanged; the caller initializes it.

use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};

use crate::dns::context::ValidationConfig;
use crate::dns::errors::{ZoneError, ZoneResult};
use crate::dns::repository::ZoneRepository;

/// Serial value meaning "not initialized"
pub const NO_SERIAL: u32 = 0;

const MAX_REVISION: u32 = 99;
const MIN_DATE_SERIAL: u32 = 1_000_000_000;

/// A 10-digit date-encoded serial
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Serial(u32);

impl Serial {
    /// Accept a stored serial; anything but exactly 10 digits is rejected
    pub fn new(value: u32) -> ZoneResult<Serial> {
        if value < MIN_DATE_SERIAL {
            return Err(ZoneError::format(
                "SOA serial",
                &value.to_string(),
                "expected 0 or a 10 digit YYYYMMDDnn value",
            ));
        }
        Ok(Serial(value))
    }

    /// First serial of a day, revision 00
    pub fn for_date(date: u32) -> ZoneResult<Serial> {
        to_naive_date(date)?;
        date.checked_mul(100)
            .map(Serial)
            .ok_or_else(|| ZoneError::range("SOA serial date", date, 10_000_101, 42_949_672))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn date_component(self) -> u32 {
        self.0 / 100
    }

    pub fn revision(self) -> u32 {
        self.0 % 100
    }

    /// Serial following this one when the clock reads `today`
    pub fn next(self, today: u32) -> ZoneResult<Serial> {
        to_naive_date(today)?;

        let date = self.date_component();
        if date < today {
            return Serial::for_date(today);
        }

        // Stored date is today or was set ahead of the clock
        if self.revision() < MAX_REVISION {
            return self
                .0
                .checked_add(1)
                .map(Serial)
                .ok_or_else(|| ZoneError::range("SOA serial", self.0, MIN_DATE_SERIAL, u32::MAX - 1));
        }

        let next_day = next_date(date)?;
        log::warn!(
            "Revision counter exhausted for {}, rolling serial over to {}",
            date,
            next_day
        );
        Serial::for_date(next_day)
    }
}

fn to_naive_date(date: u32) -> ZoneResult<NaiveDate> {
    let (year, month, day) = (date / 10_000, (date / 100) % 100, date % 100);
    if !(1000..=9999).contains(&year) {
        return Err(ZoneError::format("date", &date.to_string(), "expected YYYYMMDD"));
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| ZoneError::format("date", &date.to_string(), "not a calendar date"))
}

fn from_naive_date(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// The calendar day after `date`, both as YYYYMMDD
pub fn next_date(date: u32) -> ZoneResult<u32> {
    match to_naive_date(date)?.succ_opt() {
        Some(next) if next.year() <= 9999 => Ok(from_naive_date(next)),
        _ => Err(ZoneError::range("date", date, 10_000_101, 99_991_230)),
    }
}

/// Next serial for `current` given today's YYYYMMDD date
///
/// `0` stays `0`. Other values must be 10-digit serials.
pub fn next_serial(current: u32, today: u32) -> ZoneResult<u32> {
    match initialized(current)? {
        None => Ok(NO_SERIAL),
        Some(serial) => serial.next(today).map(Serial::value),
    }
}

fn initialized(current: u32) -> ZoneResult<Option<Serial>> {
    if current == NO_SERIAL {
        Ok(None)
    } else {
        Serial::new(current).map(Some)
    }
}

/// Third whitespace-separated field of SOA content
pub fn soa_serial(content: &str) -> Option<&str> {
    content.split_whitespace().nth(2)
}

/// SOA content with its serial field replaced
pub fn set_soa_serial(content: &str, serial: u32) -> String {
    let mut fields: Vec<String> = content.split_whitespace().map(str::to_string).collect();
    if fields.len() > 2 {
        fields[2] = serial.to_string();
    }
    fields.join(" ")
}

/// Computes serials against a clock in a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SerialNumberManager {
    offset: FixedOffset,
}

impl Default for SerialNumberManager {
    fn default() -> Self {
        SerialNumberManager {
            offset: Utc.fix(),
        }
    }
}

impl SerialNumberManager {
    pub fn new(offset: FixedOffset) -> Self {
        SerialNumberManager { offset }
    }

    /// Offsets beyond a day fall back to UTC
    pub fn from_config(config: &ValidationConfig) -> Self {
        match FixedOffset::east_opt(config.utc_offset_seconds) {
            Some(offset) => Self::new(offset),
            None => {
                log::warn!(
                    "Ignoring invalid UTC offset of {} seconds",
                    config.utc_offset_seconds
                );
                Self::default()
            }
        }
    }

    /// Today's date as YYYYMMDD in the configured offset
    pub fn today(&self) -> u32 {
        from_naive_date(Utc::now().with_timezone(&self.offset).date_naive())
    }

    pub fn next_date(&self, date: u32) -> ZoneResult<u32> {
        next_date(date)
    }

    pub fn next_serial(&self, current: u32, today: u32) -> ZoneResult<u32> {
        next_serial(current, today)
    }

    pub fn next_serial_for_today(&self, current: u32) -> ZoneResult<u32> {
        next_serial(current, self.today())
    }

    /// Serial for a zone getting its first one
    pub fn initial_serial(&self, today: u32) -> ZoneResult<u32> {
        Serial::for_date(today).map(Serial::value)
    }

    /// Advance a zone's stored serial and return the new value
    ///
    /// Zones without a serial are left alone and `0` is returned.
    pub fn bump_zone_serial(&self, zones: &dyn ZoneRepository, zone_id: u64) -> ZoneResult<u32> {
        self.bump_zone_serial_on(zones, zone_id, self.today())
    }

    pub fn bump_zone_serial_on(
        &self,
        zones: &dyn ZoneRepository,
        zone_id: u64,
        today: u32,
    ) -> ZoneResult<u32> {
        let current = zones.soa_serial(zone_id)?;
        let next = next_serial(current, today)?;
        if next != NO_SERIAL {
            zones.set_soa_serial(zone_id, next)?;
            log::debug!("Zone {} serial {} -> {}", zone_id, current, next);
        }
        Ok(next)
    }
}
