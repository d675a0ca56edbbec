//! Property-based tests for serial arithmetic and reverse names

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use zonecheck::dns::domain_labels::DomainLabelUtility;
use zonecheck::dns::loc::LocRecordValidator;
use zonecheck::dns::reverse::AddressReverser;
use zonecheck::dns::serial::{next_date, next_serial};

// Calendar dates between 1900 and 2200 as YYYYMMDD
fn date_strategy() -> impl Strategy<Value = (NaiveDate, u32)> {
    (0i64..110_000).prop_map(|days| {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
        let encoded = date.year() as u32 * 10_000 + date.month() * 100 + date.day();
        (date, encoded)
    })
}

fn ipv4_strategy() -> impl Strategy<Value = Ipv4Addr> {
    any::<[u8; 4]>().prop_map(Ipv4Addr::from)
}

fn ipv6_strategy() -> impl Strategy<Value = Ipv6Addr> {
    any::<[u16; 8]>().prop_map(Ipv6Addr::from)
}

proptest! {
    #[test]
    fn test_next_date_is_one_day_later((date, encoded) in date_strategy()) {
        let next = next_date(encoded).unwrap();
        let expected = date.succ_opt().unwrap();
        prop_assert_eq!(
            next,
            expected.year() as u32 * 10_000 + expected.month() * 100 + expected.day()
        );
        prop_assert!(next > encoded);
    }

    #[test]
    fn test_next_serial_is_strictly_increasing(
        (_, stored) in date_strategy(),
        (_, today) in date_strategy(),
        revision in 0u32..100,
    ) {
        let current = stored * 100 + revision;
        let next = next_serial(current, today).unwrap();
        prop_assert!(next > current);
        prop_assert!(next / 100 >= today);
        prop_assert!(next % 100 <= 99);
    }

    #[test]
    fn test_zero_serial_stays_zero((_, today) in date_strategy()) {
        prop_assert_eq!(next_serial(0, today), Ok(0));
    }

    #[test]
    fn test_ipv4_ptr_round_trips_through_zone(addr in ipv4_strategy()) {
        let ptr = AddressReverser::ipv4_to_ptr(&addr.to_string()).unwrap();
        prop_assert!(ptr.ends_with(".in-addr.arpa"));
        prop_assert_eq!(DomainLabelUtility::domain_level(&ptr), 6);

        let (name, zone) = ptr.split_at(ptr.find('.').unwrap());
        prop_assert_eq!(
            AddressReverser::proposed_address(name, &zone[1..]),
            Some(IpAddr::V4(addr))
        );
    }

    #[test]
    fn test_ipv6_ptr_has_32_nibbles(addr in ipv6_strategy()) {
        let ptr = AddressReverser::ipv6_to_ptr(&addr.to_string()).unwrap();
        prop_assert!(ptr.ends_with(".ip6.arpa"));
        let nibbles: Vec<&str> = ptr.trim_end_matches(".ip6.arpa").split('.').collect();
        prop_assert_eq!(nibbles.len(), 32);
        prop_assert!(nibbles.iter().all(|n| n.len() == 1));

        let (name, zone) = ptr.split_at(ptr.find('.').unwrap());
        prop_assert_eq!(
            AddressReverser::proposed_address(name, &zone[1..]),
            Some(IpAddr::V6(addr))
        );
    }

    #[test]
    fn test_loc_in_range_is_valid(
        lat in 0u32..=89,
        lat_min in 0u32..60,
        lat_ms in 0u32..60_000,
        lon in 0u32..=179,
        alt_cm in -10_000_000i64..=4_284_967_295,
    ) {
        let content = format!(
            "{} {} {}.{:03} S {} 0 0 E {}{}.{:02}m",
            lat,
            lat_min,
            lat_ms / 1000,
            lat_ms % 1000,
            lon,
            if alt_cm < 0 { "-" } else { "" },
            alt_cm.abs() / 100,
            alt_cm.abs() % 100
        );
        prop_assert!(LocRecordValidator::is_valid_loc(&content), "{}", content);
    }
}
