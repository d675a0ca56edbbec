//! Zonecheck
//!
//! The validation engine behind a DNS zone administration tool. It checks
//! candidate records against the textual formats and numeric bounds of the
//! relevant RFCs before a change is accepted, and computes date-encoded SOA
//! serial numbers for the zones it touches.
//!
//! # Features
//!
//! * Per-type content rules for A, AAAA, CNAME, MX, NS, PTR, SOA, TXT, SPF,
//!   LOC, SRV, HINFO and DS records
//! * CNAME exclusivity enforced against a pluggable record repository
//! * RFC 1876 LOC grammar and range validation
//! * `YYYYMMDDnn` serial rollover
//! * IPv4 and IPv6 reverse-name conversion
//!
//! The crate performs no I/O of its own. Record storage is reached through
//! the traits in `dns::repository`, and logging goes through the `log` facade.

/// Record, zone and serial validation
pub mod dns;
