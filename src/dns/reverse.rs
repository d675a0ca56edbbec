//! Address to reverse-DNS name conversion
//!
//! Used by reverse record auto-creation and zone file generation, which have
//! no result channel, so malformed input is an error rather than a failed
//! validation.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::dns::errors::{ZoneError, ZoneResult};

pub const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa";
pub const IPV6_REVERSE_SUFFIX: &str = "ip6.arpa";

pub struct AddressReverser;

impl AddressReverser {
    /// `192.168.1.1` -> `1.1.168.192.in-addr.arpa`
    pub fn ipv4_to_ptr(ipv4: &str) -> ZoneResult<String> {
        let octets: Vec<&str> = ipv4.split('.').collect();
        if octets.len() != 4 {
            return Err(ZoneError::format(
                "IPv4 address",
                ipv4,
                format!("expected 4 octets, found {}", octets.len()),
            ));
        }

        let mut reversed = Vec::with_capacity(5);
        for octet in octets.iter().rev() {
            if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ZoneError::format("IPv4 address", ipv4, "octets must be numeric"));
            }
            match octet.parse::<u32>() {
                Ok(value) if value <= 255 => reversed.push(value.to_string()),
                _ => {
                    return Err(ZoneError::format(
                        "IPv4 address",
                        ipv4,
                        format!("octet {} is outside 0-255", octet),
                    ))
                }
            }
        }
        reversed.push(IPV4_REVERSE_SUFFIX.to_string());
        Ok(reversed.join("."))
    }

    /// `2001:db8::1` -> `1.0.0.0. ... .8.b.d.0.1.0.0.2.ip6.arpa` (32 nibbles)
    pub fn ipv6_to_ptr(ipv6: &str) -> ZoneResult<String> {
        let addr: Ipv6Addr = ipv6
            .parse()
            .map_err(|_| ZoneError::format("IPv6 address", ipv6, "invalid IPv6 syntax"))?;

        let hex: String = addr.segments().iter().map(|s| format!("{:04x}", s)).collect();
        let mut labels: Vec<String> = hex.chars().rev().map(String::from).collect();
        labels.push(IPV6_REVERSE_SUFFIX.to_string());
        Ok(labels.join("."))
    }

    /// Reverse name for either address family, chosen by syntax
    pub fn to_ptr_name(address: &str) -> ZoneResult<String> {
        if address.contains(':') {
            Self::ipv6_to_ptr(address)
        } else {
            Self::ipv4_to_ptr(address)
        }
    }

    pub fn is_reverse_zone(zone: &str) -> bool {
        let zone = zone.trim_end_matches('.').to_ascii_lowercase();
        zone.ends_with(IPV4_REVERSE_SUFFIX) || zone.ends_with(IPV6_REVERSE_SUFFIX)
    }

    /// Address a record named `name` inside reverse zone `zone` stands for
    ///
    /// `name` is relative to the zone. Returns `None` unless name and zone
    /// together spell exactly one address.
    pub fn proposed_address(name: &str, zone: &str) -> Option<IpAddr> {
        if name.is_empty() || zone.is_empty() {
            return None;
        }
        let zone = zone.trim_end_matches('.').to_ascii_lowercase();

        if let Some(prefix) = zone.strip_suffix(&format!(".{}", IPV4_REVERSE_SUFFIX)) {
            let labels = reversed_labels(name, prefix);
            if labels.len() != 4 {
                return None;
            }
            let mut octets = [0u8; 4];
            for (slot, label) in octets.iter_mut().zip(labels.iter()) {
                if !label.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                *slot = label.parse().ok()?;
            }
            return Some(IpAddr::V4(Ipv4Addr::from(octets)));
        }

        if let Some(prefix) = zone.strip_suffix(&format!(".{}", IPV6_REVERSE_SUFFIX)) {
            let labels = reversed_labels(name, prefix);
            if labels.len() != 32 {
                return None;
            }
            let mut value: u128 = 0;
            for label in labels {
                let mut chars = label.chars();
                let nibble = chars.next()?.to_digit(16)?;
                if chars.next().is_some() {
                    return None;
                }
                value = (value << 4) | u128::from(nibble);
            }
            return Some(IpAddr::V6(Ipv6Addr::from(value)));
        }

        None
    }
}

/// Labels of `name.zone_prefix` in address order
fn reversed_labels<'a>(name: &'a str, zone_prefix: &'a str) -> Vec<&'a str> {
    let mut labels: Vec<&str> = name
        .trim_end_matches('.')
        .split('.')
        .chain(zone_prefix.split('.'))
        .collect();
    labels.reverse();
    labels
}
