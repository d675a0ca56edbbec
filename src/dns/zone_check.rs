//! Whole-zone structural checks
//!
//! A zone is publishable when it holds exactly one SOA record at its apex with
//! a complete content field, and at least one NS record at the apex. Unlike
//! the per-record dispatcher, every problem found is reported.

use std::sync::Arc;

use crate::dns::errors::ZoneError;
use crate::dns::record_type::RecordType;
use crate::dns::repository::{RecordRepository, StoredRecord};
use crate::dns::serial::soa_serial;
use crate::dns::validation_result::ValidationResult;

const SOA_FIELDS: usize = 7;

pub struct ZoneIntegrityChecker {
    repository: Arc<dyn RecordRepository>,
}

impl ZoneIntegrityChecker {
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        ZoneIntegrityChecker { repository }
    }

    pub fn check(&self, zone_id: u64, zone_name: &str) -> ValidationResult<()> {
        let apex = zone_name.trim_end_matches('.');

        let soa = match self.repository.find_by_type(zone_id, RecordType::Soa) {
            Ok(records) => records,
            Err(e) => return self.lookup_failed(zone_id, e.into()),
        };
        let ns = match self.repository.find_by_name_and_type(zone_id, apex, Some(RecordType::Ns)) {
            Ok(records) => records,
            Err(e) => return self.lookup_failed(zone_id, e.into()),
        };

        let mut errors = soa_issues(&soa, apex);
        if ns.is_empty() {
            errors.push(format!("Zone {} has no NS record at its apex.", apex));
        }

        if errors.is_empty() {
            ValidationResult::success(())
        } else {
            log::debug!("Zone {} failed integrity check with {} issue(s)", zone_id, errors.len());
            ValidationResult::from_errors(errors)
        }
    }

    fn lookup_failed(&self, zone_id: u64, err: ZoneError) -> ValidationResult<()> {
        log::error!("Integrity check of zone {} could not read records: {}", zone_id, err);
        ValidationResult::failure(err.to_string())
    }
}

fn soa_issues(soa: &[StoredRecord], apex: &str) -> Vec<String> {
    let mut errors = Vec::new();
    match soa.len() {
        0 => errors.push(format!("Zone {} has no SOA record.", apex)),
        1 => {}
        n => errors.push(format!("Zone {} has {} SOA records, expected exactly one.", apex, n)),
    }

    for record in soa {
        if !record.name.trim_end_matches('.').eq_ignore_ascii_case(apex) {
            errors.push(format!("The SOA record {} is not at the zone apex.", record.name));
        }
        let fields = record.content.split_whitespace().count();
        if fields < SOA_FIELDS || soa_serial(&record.content).map_or(true, |s| s.parse::<u32>().is_err()) {
            errors.push(format!(
                "The SOA record of {} is incomplete: {} of {} fields.",
                apex, fields, SOA_FIELDS
            ));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dns::repository::InMemoryRecordRepository;

    const SOA: &str = "ns1.example.com hostmaster.example.com 2011052600 28800 7200 604800 86400";

    #[test]
    fn test_complete_zone() {
        let repo = Arc::new(InMemoryRecordRepository::new());
        repo.insert(1, "example.com", RecordType::Soa, SOA);
        repo.insert(1, "example.com.", RecordType::Ns, "ns1.example.com");
        let result = ZoneIntegrityChecker::new(repo).check(1, "example.com.");
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_issues_are_collected() {
        let repo = Arc::new(InMemoryRecordRepository::new());
        repo.insert(1, "www.example.com", RecordType::Soa, "ns1.example.com hostmaster.example.com 1");
        repo.insert(1, "sub.example.com", RecordType::Ns, "ns1.example.com");
        let result = ZoneIntegrityChecker::new(repo).check(1, "example.com");
        assert_eq!(result.errors().len(), 3);
    }

    #[test]
    fn test_missing_and_duplicate_soa() {
        let repo = Arc::new(InMemoryRecordRepository::new());
        repo.insert(1, "example.com", RecordType::Ns, "ns1.example.com");
        let checker = ZoneIntegrityChecker::new(repo.clone());
        assert_eq!(checker.check(1, "example.com").first_error(), "Zone example.com has no SOA record.");

        repo.insert(1, "example.com", RecordType::Soa, SOA);
        repo.insert(1, "example.com", RecordType::Soa, SOA);
        assert!(checker.check(1, "example.com").first_error().contains("2 SOA records"));
    }
}
