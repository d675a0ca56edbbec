//! Hostname checks shared by the per-type record validators

use lazy_static::lazy_static;
use regex::Regex;

use crate::dns::validation_result::ValidationResult;

lazy_static! {
    /// Label characters, including `/` for RFC 2317 delegations
    static ref LABEL_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_\-/]+$").expect("Failed to compile label regex");
}

const MAX_NAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Validates hostnames under an explicit single-label policy
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameValidator {
    reject_single_label: bool,
}

impl HostnameValidator {
    pub fn new(reject_single_label: bool) -> Self {
        HostnameValidator { reject_single_label }
    }

    /// Validate `hostname`, returning it without its trailing dot
    pub fn validate(&self, hostname: &str, allow_wildcard: bool) -> ValidationResult<String> {
        if hostname == "." || hostname == "@" || hostname.starts_with("@.") {
            return ValidationResult::success(hostname.to_string());
        }

        let normalized = hostname.strip_suffix('.').unwrap_or(hostname);
        if normalized.len() > MAX_NAME_LENGTH {
            return ValidationResult::failure("The hostname is too long.");
        }

        let labels: Vec<&str> = normalized.split('.').collect();
        if self.reject_single_label && labels.len() == 1 {
            return ValidationResult::failure("Single-label hostnames are not allowed.");
        }

        let mut errors: Vec<String> = Vec::new();
        let mut push = |msg: &str| {
            if !errors.iter().any(|e| e == msg) {
                errors.push(msg.to_string());
            }
        };
        for (i, label) in labels.iter().enumerate() {
            let wildcard = allow_wildcard && i == 0 && *label == "*";
            if !wildcard && !LABEL_REGEX.is_match(label) {
                push("You have invalid characters in your hostname.");
            }
            if label.starts_with('-') || label.ends_with('-') {
                push("A hostname can not start or end with a dash.");
            }
            if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
                push("Given hostname or one of the labels is too short or too long.");
            }
        }
        if !errors.is_empty() {
            return ValidationResult::from_errors(errors);
        }

        if let Err(msg) = check_slashes(&labels) {
            return ValidationResult::failure(msg);
        }

        ValidationResult::success(normalized.to_string())
    }

    pub fn is_valid(&self, hostname: &str, allow_wildcard: bool) -> bool {
        self.validate(hostname, allow_wildcard).is_valid()
    }

    /// Qualify `name` with `zone` unless it already lies inside it
    ///
    /// An empty name and `@` both stand for the zone apex.
    pub fn normalize_record_name(name: &str, zone: &str) -> String {
        let name = name.trim_end_matches('.');
        let zone = zone.trim_end_matches('.');
        if name.is_empty() || name == "@" {
            return zone.to_string();
        }
        let lname = name.to_ascii_lowercase();
        let lzone = zone.to_ascii_lowercase();
        if lname == lzone || lname.ends_with(&format!(".{}", lzone)) {
            name.to_string()
        } else {
            format!("{}.{}", name, zone)
        }
    }
}

/// Slashes are only meaningful as RFC 2317 `subnet/prefix` labels in arpa
fn check_slashes(labels: &[&str]) -> Result<(), String> {
    let slashed: Vec<&&str> = labels.iter().filter(|l| l.contains('/')).collect();
    if slashed.is_empty() {
        return Ok(());
    }

    let count = labels.len();
    if !labels[count - 1].eq_ignore_ascii_case("arpa") {
        return Err("Given hostname has too many slashes.".to_string());
    }
    if slashed.len() > 1 {
        return Err("Multiple slashes in different labels are not allowed in ARPA zones.".to_string());
    }

    let parts: Vec<&str> = slashed[0].split('/').collect();
    if parts.len() != 2 {
        return Err("Invalid RFC 2317 format. Use format: subnet/prefix (e.g., 0/26).".to_string());
    }
    let (subnet, prefix) = (parts[0], parts[1]);
    let prefix: u32 = prefix
        .parse()
        .map_err(|_| "Invalid prefix length in RFC 2317 notation. Must be numeric.".to_string())?;

    let family = if count >= 2 { labels[count - 2].to_ascii_lowercase() } else { String::new() };
    if family == "in-addr" {
        let subnet: u32 = match subnet.parse() {
            Ok(v) if v <= 255 => v,
            _ => {
                return Err(
                    "Invalid subnet number in RFC 2317 notation. Must be 0-255 for IPv4.".to_string(),
                )
            }
        };
        if !(24..=32).contains(&prefix) {
            return Err("Invalid IPv4 prefix length for RFC 2317. Must be 24-32.".to_string());
        }
        let block = 1u32 << (32 - prefix);
        if subnet % block != 0 {
            return Err(format!(
                "Subnet {} is not aligned with prefix /{}. Should be multiple of {}.",
                subnet, prefix, block
            ));
        }
    } else {
        if subnet.is_empty() || !subnet.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err("Invalid subnet in RFC 2317 notation. Must be hexadecimal.".to_string());
        }
        if prefix > 128 {
            return Err("Invalid IPv6 prefix length. Must be 0-128.".to_string());
        }
    }
    Ok(())
}
