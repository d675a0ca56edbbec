//! Record type dispatch and cross-record rules
//!
//! `RecordTypeValidationDispatcher` is the engine's entry point for a single
//! candidate record. It resolves the type identifier against its registry,
//! runs the type validator, applies TTL and priority policy and finally
//! consults the record repository for the CNAME rules that no single-type
//! validator can see:
//!
//! * a CNAME may not share its name with any other record
//! * no record may be added at a name that holds a CNAME
//! * a CNAME may not be created at a name an MX or NS record points to
//! * an MX or NS record may not point at a CNAME
//!
//! Format rules run before any repository read.

use std::collections::HashMap;
use std::sync::Arc;

use serde_derive::{Deserialize, Serialize};

use crate::dns::context::{ValidationConfig, MAX_TTL};
use crate::dns::errors::{ConflictKind, ZoneError, ZoneResult};
use crate::dns::hostname::HostnameValidator;
use crate::dns::record_type::RecordType;
use crate::dns::record_validators::{
    AValidator, AaaaValidator, CnameValidator, DsValidator, HinfoValidator, HostTargetValidator,
    LocValidator, RecordContext, RecordData, RecordValidator, SoaValidator, SpfValidator,
    SrvValidator, TxtValidator,
};
use crate::dns::repository::{RecordRepository, StoredRecord};
use crate::dns::validation_result::ValidationResult;

/// A record submitted for validation
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateRecord {
    pub zone_id: u64,
    pub zone_name: String,
    /// Id of the stored record being edited, excluded from conflict checks
    #[serde(default)]
    pub record_id: Option<u64>,
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl CandidateRecord {
    pub fn new(zone_id: u64, zone_name: &str, record_type: &str, name: &str, content: &str) -> Self {
        CandidateRecord {
            zone_id,
            zone_name: zone_name.to_string(),
            record_id: None,
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: None,
            priority: None,
        }
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn editing(mut self, record_id: u64) -> Self {
        self.record_id = Some(record_id);
        self
    }
}

/// Normalized record ready to be persisted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRecord {
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub priority: u16,
}

pub struct RecordTypeValidationDispatcher {
    repository: Arc<dyn RecordRepository>,
    config: ValidationConfig,
    hostnames: HostnameValidator,
    validators: HashMap<RecordType, Box<dyn RecordValidator>>,
}

impl RecordTypeValidationDispatcher {
    pub fn new(repository: Arc<dyn RecordRepository>, config: ValidationConfig) -> Self {
        let mut validators: HashMap<RecordType, Box<dyn RecordValidator>> = HashMap::new();
        validators.insert(RecordType::A, Box::new(AValidator));
        validators.insert(RecordType::Aaaa, Box::new(AaaaValidator));
        validators.insert(RecordType::Cname, Box::new(CnameValidator));
        validators.insert(RecordType::Mx, Box::new(HostTargetValidator));
        validators.insert(RecordType::Ns, Box::new(HostTargetValidator));
        validators.insert(RecordType::Ptr, Box::new(HostTargetValidator));
        validators.insert(RecordType::Soa, Box::new(SoaValidator));
        validators.insert(RecordType::Txt, Box::new(TxtValidator));
        validators.insert(RecordType::Spf, Box::new(SpfValidator));
        validators.insert(RecordType::Loc, Box::new(LocValidator));
        validators.insert(RecordType::Srv, Box::new(SrvValidator));
        validators.insert(RecordType::Hinfo, Box::new(HinfoValidator));
        validators.insert(RecordType::Ds, Box::new(DsValidator));

        RecordTypeValidationDispatcher {
            repository,
            hostnames: HostnameValidator::new(config.top_level_tld_check),
            config,
            validators,
        }
    }

    /// Replace the validator used for `record_type`
    pub fn register(&mut self, record_type: RecordType, validator: Box<dyn RecordValidator>) {
        self.validators.insert(record_type, validator);
    }

    pub fn is_supported(&self, record_type: &str) -> bool {
        record_type
            .parse::<RecordType>()
            .map_or(false, |t| self.validators.contains_key(&t))
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, candidate: &CandidateRecord) -> ValidationResult<ValidatedRecord> {
        let result = self.run(candidate);
        if !result.is_valid() {
            log::debug!(
                "Rejected {} record {} in zone {}: {}",
                candidate.record_type,
                candidate.name,
                candidate.zone_id,
                result.first_error()
            );
        }
        result
    }

    fn run(&self, candidate: &CandidateRecord) -> ValidationResult<ValidatedRecord> {
        let (record_type, validator) = match candidate
            .record_type
            .parse::<RecordType>()
            .ok()
            .and_then(|t| self.validators.get(&t).map(|v| (t, v)))
        {
            Some(entry) => entry,
            None => return ValidationResult::failure("Unsupported record type"),
        };

        let name = HostnameValidator::normalize_record_name(&candidate.name, &candidate.zone_name);
        let ctx = RecordContext {
            zone_name: &candidate.zone_name,
            hostnames: &self.hostnames,
            config: &self.config,
        };
        let checked = validator.validate(&name, candidate.content.trim(), &ctx);
        if !checked.is_valid() {
            return checked.cast_failure();
        }
        let mut warnings = checked.warnings().to_vec();
        let data = match checked.into_data() {
            Ok(data) => data,
            Err(e) => return ValidationResult::failure(e.to_string()),
        };

        let ttl = match self.check_ttl(candidate.ttl, &mut warnings) {
            Ok(ttl) => ttl,
            Err(e) => return ValidationResult::failure(e.to_string()),
        };
        let priority = match check_priority(record_type, candidate.priority) {
            Ok(priority) => priority,
            Err(e) => return ValidationResult::failure(e.to_string()),
        };

        match self.check_conflicts(candidate, record_type, &data) {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return ValidationResult::failure(e.to_string()),
            Err(e) => {
                log::error!("Record lookup for zone {} failed: {}", candidate.zone_id, e);
                return ValidationResult::failure(e.to_string());
            }
        }

        ValidationResult::success_with_warnings(
            ValidatedRecord {
                record_type,
                name: data.name,
                content: data.content,
                ttl,
                priority,
            },
            warnings,
        )
    }

    fn check_ttl(&self, ttl: Option<i64>, warnings: &mut Vec<String>) -> ZoneResult<u32> {
        let ttl = match ttl {
            None => return Ok(self.config.default_ttl),
            Some(ttl) => ttl,
        };
        if !(0..=i64::from(MAX_TTL)).contains(&ttl) {
            return Err(ZoneError::range("TTL", ttl, 0, i64::from(MAX_TTL)));
        }
        let ttl = ttl as u32;
        if ttl < self.config.ttl_warning_threshold {
            warnings.push(format!(
                "A TTL of {} seconds is below the recommended minimum of {} seconds.",
                ttl, self.config.ttl_warning_threshold
            ));
        }
        Ok(ttl)
    }

    fn others_at(&self, candidate: &CandidateRecord, name: &str, record_type: Option<RecordType>) -> ZoneResult<Vec<StoredRecord>> {
        let mut records = self
            .repository
            .find_by_name_and_type(candidate.zone_id, name, record_type)?;
        if let Some(id) = candidate.record_id {
            records.retain(|r| r.id != id);
        }
        Ok(records)
    }

    fn check_conflicts(&self, candidate: &CandidateRecord, record_type: RecordType, data: &RecordData) -> ZoneResult<()> {
        if record_type == RecordType::Cname {
            if !self.others_at(candidate, &data.name, None)?.is_empty() {
                return Err(ZoneError::conflict(ConflictKind::CnameNotUnique, &data.name));
            }
            for target_type in &[RecordType::Mx, RecordType::Ns] {
                let mut pointing = self
                    .repository
                    .find_by_content_and_type(candidate.zone_id, &data.name, *target_type)?;
                if let Some(id) = candidate.record_id {
                    pointing.retain(|r| r.id != id);
                }
                if !pointing.is_empty() {
                    return Err(ZoneError::conflict(ConflictKind::CnameIsMxNsTarget, &data.name));
                }
            }
            return Ok(());
        }

        if !self.others_at(candidate, &data.name, Some(RecordType::Cname))?.is_empty() {
            return Err(ZoneError::conflict(ConflictKind::CnameExists, &data.name));
        }

        if matches!(record_type, RecordType::Mx | RecordType::Ns)
            && !self.others_at(candidate, &data.content, Some(RecordType::Cname))?.is_empty()
        {
            return Err(ZoneError::conflict(ConflictKind::TargetIsAlias, &data.content));
        }

        Ok(())
    }
}

fn check_priority(record_type: RecordType, priority: Option<i64>) -> ZoneResult<u16> {
    let priority = match priority {
        None => return Ok(0),
        Some(priority) => priority,
    };
    if record_type.uses_priority() {
        if !(0..=i64::from(u16::MAX)).contains(&priority) {
            return Err(ZoneError::range("priority", priority, 0, i64::from(u16::MAX)));
        }
        return Ok(priority as u16);
    }
    if priority != 0 {
        return Err(ZoneError::range("priority", priority, 0, 0));
    }
    Ok(0)
}
