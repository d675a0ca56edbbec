//! Record and zone storage the engine consults
//!
//! The engine never persists anything. It reads existing records to enforce
//! cross-record rules and, through the serial manager, reads and writes a
//! zone's SOA serial. Hosts plug their database in behind these traits; the
//! in-memory stores here back tests and database-less deployments.
//!
//! Reads carry no ordering guarantee relative to concurrent validations in the
//! same zone. Callers racing inserts at one name must serialize mutations in
//! the persistence layer.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::{Display, Error};
use parking_lot::RwLock;
use serde_derive::{Deserialize, Serialize};

use crate::dns::record_type::RecordType;

#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum RepositoryError {
    #[display(fmt = "No such zone: {}", _0)]
    NoSuchZone(#[error(not(source))] u64),
    #[display(fmt = "Record store unavailable: {}", _0)]
    Unavailable(#[error(not(source))] String),
}

type Result<T> = std::result::Result<T, RepositoryError>;

/// A record as held by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub zone_id: u64,
    pub name: String,
    pub record_type: RecordType,
    pub content: String,
    pub ttl: u32,
    pub priority: u16,
}

pub trait RecordRepository: Send + Sync {
    /// Records at `name` in the zone, restricted to `record_type` when given
    fn find_by_name_and_type(
        &self,
        zone_id: u64,
        name: &str,
        record_type: Option<RecordType>,
    ) -> Result<Vec<StoredRecord>>;

    /// Records of `record_type` whose content is `content`
    fn find_by_content_and_type(
        &self,
        zone_id: u64,
        content: &str,
        record_type: RecordType,
    ) -> Result<Vec<StoredRecord>>;

    /// Every record of `record_type` in the zone
    fn find_by_type(&self, zone_id: u64, record_type: RecordType) -> Result<Vec<StoredRecord>>;
}

pub trait ZoneRepository: Send + Sync {
    fn soa_serial(&self, zone_id: u64) -> Result<u32>;
    fn set_soa_serial(&self, zone_id: u64, serial: u32) -> Result<()>;
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.').eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// Record store kept in process memory
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<BTreeMap<u64, StoredRecord>>,
    next_id: AtomicU64,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record and return its id
    pub fn insert(
        &self,
        zone_id: u64,
        name: &str,
        record_type: RecordType,
        content: &str,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = StoredRecord {
            id,
            zone_id,
            name: name.trim_end_matches('.').to_string(),
            record_type,
            content: content.to_string(),
            ttl: 3600,
            priority: 0,
        };
        self.records.write().insert(id, record);
        id
    }

    pub fn remove(&self, id: u64) -> Option<StoredRecord> {
        self.records.write().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn select<F: Fn(&StoredRecord) -> bool>(&self, pred: F) -> Vec<StoredRecord> {
        self.records
            .read()
            .values()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn find_by_name_and_type(
        &self,
        zone_id: u64,
        name: &str,
        record_type: Option<RecordType>,
    ) -> Result<Vec<StoredRecord>> {
        Ok(self.select(|r| {
            r.zone_id == zone_id
                && same_name(&r.name, name)
                && record_type.map_or(true, |t| r.record_type == t)
        }))
    }

    fn find_by_content_and_type(
        &self,
        zone_id: u64,
        content: &str,
        record_type: RecordType,
    ) -> Result<Vec<StoredRecord>> {
        Ok(self.select(|r| {
            r.zone_id == zone_id && r.record_type == record_type && same_name(&r.content, content)
        }))
    }

    fn find_by_type(&self, zone_id: u64, record_type: RecordType) -> Result<Vec<StoredRecord>> {
        Ok(self.select(|r| r.zone_id == zone_id && r.record_type == record_type))
    }
}

/// SOA serials per zone kept in process memory
#[derive(Default)]
pub struct InMemoryZoneRepository {
    serials: RwLock<BTreeMap<u64, u32>>,
}

impl InMemoryZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&self, zone_id: u64, serial: u32) {
        self.serials.write().insert(zone_id, serial);
    }
}

impl ZoneRepository for InMemoryZoneRepository {
    fn soa_serial(&self, zone_id: u64) -> Result<u32> {
        self.serials
            .read()
            .get(&zone_id)
            .copied()
            .ok_or(RepositoryError::NoSuchZone(zone_id))
    }

    fn set_soa_serial(&self, zone_id: u64, serial: u32) -> Result<()> {
        let mut serials = self.serials.write();
        match serials.get_mut(&zone_id) {
            Some(current) => {
                *current = serial;
                Ok(())
            }
            None => Err(RepositoryError::NoSuchZone(zone_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_ignores_case_and_trailing_dot() {
        let repo = InMemoryRecordRepository::new();
        repo.insert(1, "www.example.com", RecordType::A, "192.0.2.1");
        repo.insert(1, "www.example.com", RecordType::Aaaa, "2001:db8::1");
        repo.insert(2, "www.example.com", RecordType::A, "192.0.2.2");

        let all = repo.find_by_name_and_type(1, "WWW.example.com.", None).unwrap();
        assert_eq!(all.len(), 2);

        let a_only = repo
            .find_by_name_and_type(1, "www.example.com", Some(RecordType::A))
            .unwrap();
        assert_eq!(a_only.len(), 1);
        assert_eq!(a_only[0].content, "192.0.2.1");
    }

    #[test]
    fn test_find_by_content_and_type() {
        let repo = InMemoryRecordRepository::new();
        repo.insert(1, "example.com", RecordType::Mx, "mail.example.com");
        repo.insert(1, "example.com", RecordType::Ns, "ns1.example.com");

        let mx = repo
            .find_by_content_and_type(1, "mail.example.com.", RecordType::Mx)
            .unwrap();
        assert_eq!(mx.len(), 1);
        assert!(repo
            .find_by_content_and_type(1, "mail.example.com", RecordType::Ns)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remove_record() {
        let repo = InMemoryRecordRepository::new();
        let id = repo.insert(1, "a.example.com", RecordType::Txt, "\"x\"");
        assert_eq!(repo.len(), 1);
        assert!(repo.remove(id).is_some());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_zone_serial_roundtrip() {
        let zones = InMemoryZoneRepository::new();
        zones.add_zone(7, 2011052600);

        assert_eq!(zones.soa_serial(7), Ok(2011052600));
        zones.set_soa_serial(7, 2011052601).unwrap();
        assert_eq!(zones.soa_serial(7), Ok(2011052601));
        assert_eq!(zones.soa_serial(8), Err(RepositoryError::NoSuchZone(8)));
        assert!(zones.set_soa_serial(8, 1).is_err());
    }
}
