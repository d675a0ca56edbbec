//! Closed set of record types the validation engine accepts

use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

/// `RecordType` names every record type that has a registered validator
///
/// A type string is converted with `from_str` (case-insensitive) and back with
/// `as_str`. Anything outside this set is rejected by the dispatcher as an
/// unsupported record type.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,     // 1
    Ns,    // 2
    Cname, // 5
    Soa,   // 6
    Ptr,   // 12
    Hinfo, // 13
    Mx,    // 15
    Txt,   // 16
    Aaaa,  // 28
    Loc,   // 29
    Srv,   // 33
    Ds,    // 43
    Spf,   // 99
}

impl RecordType {
    pub const ALL: [RecordType; 13] = [
        RecordType::A,
        RecordType::Ns,
        RecordType::Cname,
        RecordType::Soa,
        RecordType::Ptr,
        RecordType::Hinfo,
        RecordType::Mx,
        RecordType::Txt,
        RecordType::Aaaa,
        RecordType::Loc,
        RecordType::Srv,
        RecordType::Ds,
        RecordType::Spf,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            RecordType::A => "A",
            RecordType::Ns => "NS",
            RecordType::Cname => "CNAME",
            RecordType::Soa => "SOA",
            RecordType::Ptr => "PTR",
            RecordType::Hinfo => "HINFO",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Aaaa => "AAAA",
            RecordType::Loc => "LOC",
            RecordType::Srv => "SRV",
            RecordType::Ds => "DS",
            RecordType::Spf => "SPF",
        }
    }

    pub fn to_num(&self) -> u16 {
        match *self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Hinfo => 13,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Loc => 29,
            RecordType::Srv => 33,
            RecordType::Ds => 43,
            RecordType::Spf => 99,
        }
    }

    /// Whether the priority field carries meaning for this type
    pub fn uses_priority(&self) -> bool {
        matches!(self, RecordType::Mx | RecordType::Srv)
    }
}

/// Error for a type string outside the supported set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedRecordType(pub String);

impl fmt::Display for UnsupportedRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported record type: {}", self.0)
    }
}

impl std::error::Error for UnsupportedRecordType {}

impl FromStr for RecordType {
    type Err = UnsupportedRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| UnsupportedRecordType(s.to_string()))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("cname".parse::<RecordType>(), Ok(RecordType::Cname));
        assert_eq!(" Aaaa ".parse::<RecordType>(), Ok(RecordType::Aaaa));
        assert_eq!("LOC".parse::<RecordType>(), Ok(RecordType::Loc));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = "WKS".parse::<RecordType>().unwrap_err();
        assert_eq!(err, UnsupportedRecordType("WKS".to_string()));
        assert!("".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_string_roundtrip_for_all_types() {
        for t in RecordType::ALL.iter() {
            assert_eq!(t.to_string().parse::<RecordType>(), Ok(*t));
        }
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&RecordType::Cname).unwrap();
        assert_eq!(json, "\"CNAME\"");
        let parsed: RecordType = serde_json::from_str("\"AAAA\"").unwrap();
        assert_eq!(parsed, RecordType::Aaaa);
    }
}
