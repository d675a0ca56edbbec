//! DNS Record Validation
//!
//! # Module Structure
//!
//! * `validation_result` - Result container returned by every validator
//! * `serial` - SOA serial numbers and date arithmetic
//! * `reverse` - Address to `in-addr.arpa` / `ip6.arpa` conversion
//! * `domain_labels` - Label counting helpers
//! * `loc` - RFC 1876 LOC record grammar
//! * `hostname` - Hostname and RFC 2317 label rules
//! * `record_validators` - Content rules per record type
//! * `dispatcher` - Type registry and cross-record rules
//! * `zone_check` - Whole-zone structural checks

/// Error types for validation and conversion
pub mod errors;

/// Validation outcome with errors and warnings
pub mod validation_result;

/// Supported record type identifiers
pub mod record_type;

/// Record and zone storage traits
pub mod repository;

/// Validation policy loaded from TOML
pub mod context;

/// Date-encoded SOA serial numbers
pub mod serial;

/// Reverse-DNS name conversion
pub mod reverse;

pub mod domain_labels;

/// RFC 1876 LOC record validation
pub mod loc;

pub mod hostname;

/// Content validators per record type
pub mod record_validators;

/// Record type dispatch and CNAME exclusivity
pub mod dispatcher;

pub mod zone_check;
