//! Content and name rules for each supported record type
//!
//! Each validator checks the name and content of one type and returns them in
//! normalized form. TTL, priority and cross-record rules are applied by the
//! dispatcher, which owns the registry mapping types to these validators.

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::{Ipv4Network, Ipv6Network};
use lazy_static::lazy_static;
use regex::Regex;

use crate::dns::context::ValidationConfig;
use crate::dns::hostname::HostnameValidator;
use crate::dns::loc::LocRecordValidator;
use crate::dns::validation_result::ValidationResult;

lazy_static! {
    /// Basic RFC 5322 mailbox
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Failed to compile email regex");

    /// DS content: key tag, algorithm, digest type, hex digest
    static ref DS_REGEX: Regex = Regex::new(r"^([0-9]+) ([0-9]+) ([0-9]+) ([a-fA-F0-9]+)$").expect("Failed to compile DS regex");

    static ref SRV_SERVICE_REGEX: Regex = Regex::new(r"^_[\w\-]+$").expect("Failed to compile SRV service regex");
    static ref SRV_PROTO_REGEX: Regex = Regex::new(r"^_\w+$").expect("Failed to compile SRV protocol regex");

    /// An unescaped double quote
    static ref BARE_QUOTE_REGEX: Regex = Regex::new(r#"(^|[^\\])""#).expect("Failed to compile quote regex");

    /// SPF mechanisms with an optional qualifier (RFC 7208 section 5)
    static ref SPF_MECHANISM_REGEX: Regex = Regex::new(
        r"(?i)^[-+?~]?(all|include:\S+|exists:\S+|ptr(:\S+)?|(a|mx)(:[^/\s]+)?(/\d{1,2})?(//\d{1,3})?|ip4:\S+|ip6:\S+)$"
    ).expect("Failed to compile SPF mechanism regex");

    /// SPF modifiers `name=value`
    static ref SPF_MODIFIER_REGEX: Regex = Regex::new(r"(?i)^[a-z][-.0-9a-z_]*=\S*$").expect("Failed to compile SPF modifier regex");
}

/// Name and content accepted by a type validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    pub name: String,
    pub content: String,
}

/// Inputs shared by all validators for one call
pub struct RecordContext<'a> {
    pub zone_name: &'a str,
    pub hostnames: &'a HostnameValidator,
    pub config: &'a ValidationConfig,
}

pub trait RecordValidator: Send + Sync {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData>;
}

fn host(ctx: &RecordContext<'_>, hostname: &str, allow_wildcard: bool) -> ValidationResult<String> {
    ctx.hostnames.validate(hostname, allow_wildcard)
}

/// Shared shape: owner name is a host (wildcards allowed), content is a host
fn host_target(name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
    let content = host(ctx, content, false);
    if !content.is_valid() {
        return content.cast_failure();
    }
    let name = host(ctx, name, true);
    if !name.is_valid() {
        return name.cast_failure();
    }
    match (name.into_data(), content.into_data()) {
        (Ok(name), Ok(content)) => ValidationResult::success(RecordData { name, content }),
        _ => ValidationResult::failure("Hostname validation produced no data."),
    }
}

/// Owner name checked as a host, content passed through after `check`
fn with_host_name(
    name: &str,
    content: &str,
    ctx: &RecordContext<'_>,
    check: ValidationResult<()>,
) -> ValidationResult<RecordData> {
    if !check.is_valid() {
        return check.cast_failure();
    }
    host(ctx, name, true).map(|name| RecordData {
        name,
        content: content.to_string(),
    })
}

pub struct AValidator;

impl RecordValidator for AValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let check = match content.parse::<Ipv4Addr>() {
            Ok(_) => ValidationResult::success(()),
            Err(_) => ValidationResult::failure("This is not a valid IPv4 address."),
        };
        with_host_name(name, content, ctx, check)
    }
}

pub struct AaaaValidator;

impl RecordValidator for AaaaValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let check = match content.parse::<Ipv6Addr>() {
            Ok(_) => ValidationResult::success(()),
            Err(_) => ValidationResult::failure("This is not a valid IPv6 address."),
        };
        with_host_name(name, content, ctx, check)
    }
}

pub struct CnameValidator;

impl RecordValidator for CnameValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let result = host_target(name, content, ctx);
        if !result.is_valid() {
            return result;
        }
        let zone = ctx.zone_name.trim_end_matches('.');
        if result.data().map_or(false, |data| data.name.eq_ignore_ascii_case(zone)) {
            return ValidationResult::failure("Empty CNAME records are not allowed.");
        }
        result
    }
}

/// MX, NS and PTR: a hostname target
pub struct HostTargetValidator;

impl RecordValidator for HostTargetValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        host_target(name, content, ctx)
    }
}

fn is_printable(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| !c.is_control())
}

fn check_txt(name: &str, content: &str) -> ValidationResult<()> {
    if !is_printable(name) || !is_printable(content) {
        return ValidationResult::failure("Invalid characters have been used in this record.");
    }
    if content.contains('<') || content.contains('>') {
        return ValidationResult::failure("You cannot use html tags for this type of record.");
    }
    let inner = if content.len() >= 2 && content.starts_with('"') && content.ends_with('"') {
        &content[1..content.len() - 1]
    } else {
        content
    };
    if BARE_QUOTE_REGEX.is_match(inner) {
        return ValidationResult::failure("Backslashes must precede all quotes (\") in TXT content.");
    }
    ValidationResult::success(())
}

pub struct TxtValidator;

impl RecordValidator for TxtValidator {
    fn validate(&self, name: &str, content: &str, _ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        check_txt(name, content).map(|_| RecordData {
            name: name.trim_end_matches('.').to_string(),
            content: content.to_string(),
        })
    }
}

fn check_spf_term(term: &str) -> bool {
    if SPF_MODIFIER_REGEX.is_match(term) {
        return true;
    }
    if !SPF_MECHANISM_REGEX.is_match(term) {
        return false;
    }
    let bare = term.trim_start_matches(|c| matches!(c, '+' | '-' | '?' | '~'));
    let lower = bare.to_ascii_lowercase();
    if lower.starts_with("ip4:") {
        return bare[4..].parse::<Ipv4Network>().is_ok();
    }
    if lower.starts_with("ip6:") {
        return bare[4..].parse::<Ipv6Network>().is_ok();
    }
    true
}

pub struct SpfValidator;

impl RecordValidator for SpfValidator {
    fn validate(&self, name: &str, content: &str, _ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let txt = check_txt(name, content);
        if !txt.is_valid() {
            return txt.cast_failure();
        }
        if !content.is_empty() && !(content.len() >= 2 && content.starts_with('"') && content.ends_with('"')) {
            return ValidationResult::failure("Add quotes around TXT record content.");
        }

        let policy = content.trim_matches('"');
        let mut terms = policy.split_whitespace();
        let version_ok = terms.next().map_or(false, |v| v.eq_ignore_ascii_case("v=spf1"));
        if !version_ok || !terms.all(check_spf_term) {
            return ValidationResult::failure("The content of the SPF record is invalid.");
        }

        ValidationResult::success(RecordData {
            name: name.trim_end_matches('.').to_string(),
            content: content.to_string(),
        })
    }
}

pub struct LocValidator;

impl RecordValidator for LocValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let check = LocRecordValidator::validate(content).map(|_| ());
        with_host_name(name, content, ctx, check)
    }
}

pub struct HinfoValidator;

impl HinfoValidator {
    fn fields(content: &str) -> Option<(&str, &str)> {
        if content.starts_with('"') {
            let end = content[1..].find('"')? + 2;
            let (cpu, rest) = content.split_at(end);
            Some((cpu, rest.strip_prefix(' ')?))
        } else {
            content.split_once(' ')
        }
    }

    fn field_ok(field: &str) -> bool {
        if field.starts_with('"') {
            field.len() >= 3
                && field.len() <= 1000
                && field.ends_with('"')
                && !field[1..field.len() - 1].contains('"')
        } else {
            !field.is_empty() && field.len() <= 1000 && !field.chars().any(char::is_whitespace)
        }
    }
}

impl RecordValidator for HinfoValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let ok = Self::fields(content).map_or(false, |(cpu, os)| Self::field_ok(cpu) && Self::field_ok(os));
        let check = if ok {
            ValidationResult::success(())
        } else {
            ValidationResult::failure("Invalid value for content field of HINFO record.")
        };
        with_host_name(name, content, ctx, check)
    }
}

pub struct SoaValidator;

impl SoaValidator {
    /// RNAME as `local.domain`, escaping dots inside the local part
    fn mailbox(field: &str) -> Option<String> {
        let address = if field.contains('@') {
            field.to_string()
        } else {
            // First unescaped dot separates local part from domain
            let bytes = field.as_bytes();
            let split = (0..bytes.len()).find(|&i| bytes[i] == b'.' && (i == 0 || bytes[i - 1] != b'\\'));
            match split {
                Some(i) => format!("{}@{}", field[..i].replace('\\', ""), &field[i + 1..]),
                None => field.replace('\\', ""),
            }
        };
        if !EMAIL_REGEX.is_match(&address) {
            return None;
        }
        let (local, domain) = address.split_once('@')?;
        Some(format!("{}.{}", local.replace('.', "\\."), domain))
    }
}

impl RecordValidator for SoaValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let zone = ctx.zone_name.trim_end_matches('.');
        if !name.trim_end_matches('.').eq_ignore_ascii_case(zone) {
            return ValidationResult::failure(
                "Invalid value for name field of SOA record. It should be the name of the zone.",
            );
        }
        let name_result = host(ctx, name, false);
        if !name_result.is_valid() {
            return name_result.cast_failure();
        }

        let invalid = "Your content field doesn't have a legit value.";
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != 7 || fields[2..].iter().any(|f| f.parse::<u32>().is_err()) {
            return ValidationResult::failure(invalid);
        }

        let mname = fields[0].trim_end_matches('.');
        if !ctx.hostnames.is_valid(mname, false) || mname.to_ascii_lowercase().ends_with(".arpa") {
            return ValidationResult::failure(invalid);
        }

        // A bare `.` mailbox stands for the configured hostmaster
        let rname_input = if fields[1] == "." { ctx.config.hostmaster.as_str() } else { fields[1] };
        let rname = match Self::mailbox(rname_input.trim_end_matches('.')) {
            Some(rname) => rname,
            None => return ValidationResult::failure(invalid),
        };

        let mut normalized = vec![mname.to_string(), rname];
        normalized.extend(fields[2..].iter().map(|f| f.to_string()));
        name_result.map(|name| RecordData {
            name,
            content: normalized.join(" "),
        })
    }
}

pub struct SrvValidator;

impl SrvValidator {
    fn check_name(name: &str, ctx: &RecordContext<'_>) -> Result<(), &'static str> {
        if name.len() > 255 {
            return Err("The hostname is too long.");
        }
        let mut fields = name.splitn(3, '.');
        let service = fields.next().unwrap_or("");
        let proto = fields.next().unwrap_or("");
        let target = fields.next().unwrap_or("");
        if !SRV_SERVICE_REGEX.is_match(service) {
            return Err("Invalid service value in name field of SRV record.");
        }
        if !SRV_PROTO_REGEX.is_match(proto) {
            return Err("Invalid protocol value in name field of SRV record.");
        }
        if !ctx.hostnames.is_valid(target, false) {
            return Err("Invalid FQDN value in name field of SRV record.");
        }
        Ok(())
    }

    fn check_content(content: &str, ctx: &RecordContext<'_>) -> Result<String, &'static str> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != 3 {
            return Err("SRV content must be: weight port target.");
        }
        if fields[0].parse::<u16>().is_err() {
            return Err("Invalid value for the weight field of the SRV record.");
        }
        if fields[1].parse::<u16>().is_err() {
            return Err("Invalid value for the port field of the SRV record.");
        }
        if fields[2] != "." && !ctx.hostnames.is_valid(fields[2], false) {
            return Err("Invalid SRV target.");
        }
        Ok(fields.join(" "))
    }
}

impl RecordValidator for SrvValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let name = name.trim_end_matches('.');
        if let Err(msg) = Self::check_name(name, ctx) {
            return ValidationResult::failure(msg);
        }
        match Self::check_content(content, ctx) {
            Ok(content) => ValidationResult::success(RecordData {
                name: name.to_string(),
                content,
            }),
            Err(msg) => ValidationResult::failure(msg),
        }
    }
}

pub struct DsValidator;

impl RecordValidator for DsValidator {
    fn validate(&self, name: &str, content: &str, ctx: &RecordContext<'_>) -> ValidationResult<RecordData> {
        let ok = DS_REGEX.captures(content).map_or(false, |caps| {
            caps[1].parse::<u16>().is_ok() && caps[2].parse::<u8>().is_ok() && caps[3].parse::<u8>().is_ok()
        });
        let check = if ok {
            ValidationResult::success(())
        } else {
            ValidationResult::failure("Invalid DS record content. Expected: keytag algorithm digest-type digest.")
        };
        with_host_name(name, content, ctx, check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(v: &dyn RecordValidator, name: &str, content: &str) -> ValidationResult<RecordData> {
        let config = ValidationConfig::default();
        let hostnames = HostnameValidator::default();
        let ctx = RecordContext {
            zone_name: "example.com",
            hostnames: &hostnames,
            config: &config,
        };
        v.validate(name, content, &ctx)
    }

    #[test]
    fn test_address_records() {
        assert!(run(&AValidator, "www.example.com", "192.0.2.1").is_valid());
        assert!(!run(&AValidator, "www.example.com", "192.0.2.256").is_valid());
        assert!(!run(&AValidator, "www.example.com", "2001:db8::1").is_valid());
        assert!(run(&AaaaValidator, "*.example.com", "2001:db8::1").is_valid());
        assert!(!run(&AaaaValidator, "www.example.com", "192.0.2.1").is_valid());
    }

    #[test]
    fn test_cname_rules() {
        let ok = run(&CnameValidator, "www.example.com.", "target.example.net.");
        assert_eq!(
            ok.into_data().unwrap(),
            RecordData {
                name: "www.example.com".to_string(),
                content: "target.example.net".to_string(),
            }
        );
        let apex = run(&CnameValidator, "example.com", "target.example.net");
        assert_eq!(apex.first_error(), "Empty CNAME records are not allowed.");
        assert!(!run(&CnameValidator, "www.example.com", "*.example.net").is_valid());
    }

    #[test]
    fn test_txt_quoting() {
        assert!(run(&TxtValidator, "example.com", "\"hello world\"").is_valid());
        assert!(run(&TxtValidator, "example.com", "\"say \\\"hi\\\"\"").is_valid());
        assert!(!run(&TxtValidator, "example.com", "\"say \"hi\"\"").is_valid());
        assert!(!run(&TxtValidator, "example.com", "<script>").is_valid());
        assert!(!run(&TxtValidator, "example.com", "line\nbreak").is_valid());
    }

    #[test]
    fn test_spf_policies() {
        assert!(run(&SpfValidator, "example.com", "\"v=spf1 mx a:mail.example.com ip4:192.0.2.0/24 ip6:2001:db8::/32 include:_spf.example.net ~all\"").is_valid());
        assert!(run(&SpfValidator, "example.com", "\"v=spf1 redirect=_spf.example.com\"").is_valid());
        assert!(!run(&SpfValidator, "example.com", "v=spf1 -all").is_valid());
        assert!(!run(&SpfValidator, "example.com", "\"v=spf2 -all\"").is_valid());
        assert!(!run(&SpfValidator, "example.com", "\"v=spf1 ip4:192.0.2.300 -all\"").is_valid());
        assert!(!run(&SpfValidator, "example.com", "\"v=spf1 bogus -all\"").is_valid());
    }

    #[test]
    fn test_soa_normalization() {
        let result = run(
            &SoaValidator,
            "example.com",
            "ns1.example.com. hostmaster@example.com 2011052600 28800 7200 604800 86400",
        );
        assert_eq!(
            result.into_data().unwrap().content,
            "ns1.example.com hostmaster.example.com 2011052600 28800 7200 604800 86400"
        );

        let dotted = run(
            &SoaValidator,
            "example.com",
            "ns1.example.com first\\.last.example.com 1 2 3 4 5",
        );
        assert_eq!(
            dotted.into_data().unwrap().content,
            "ns1.example.com first\\.last.example.com 1 2 3 4 5"
        );

        let defaulted = run(&SoaValidator, "example.com", "ns1.example.com . 1 2 3 4 5");
        assert_eq!(
            defaulted.into_data().unwrap().content,
            "ns1.example.com hostmaster.example.net 1 2 3 4 5"
        );
    }

    #[test]
    fn test_soa_rejections() {
        assert!(!run(&SoaValidator, "www.example.com", "ns1.example.com hostmaster.example.com 1 2 3 4 5").is_valid());
        assert!(!run(&SoaValidator, "example.com", "ns1.example.arpa hostmaster.example.com 1 2 3 4 5").is_valid());
        assert!(!run(&SoaValidator, "example.com", "ns1.example.com hostmaster.example.com 1 2 3 4").is_valid());
        assert!(!run(&SoaValidator, "example.com", "ns1.example.com hostmaster.example.com x 2 3 4 5").is_valid());
        assert!(!run(&SoaValidator, "example.com", "ns1.example.com not-a-mailbox 1 2 3 4 5").is_valid());
    }

    #[test]
    fn test_srv_rules() {
        let result = run(&SrvValidator, "_sip._tcp.example.com", "5  5060 sip.example.com");
        assert_eq!(result.into_data().unwrap().content, "5 5060 sip.example.com");
        assert!(run(&SrvValidator, "_sip._udp.example.com", "0 0 .").is_valid());
        assert!(!run(&SrvValidator, "sip._tcp.example.com", "5 5060 sip.example.com").is_valid());
        assert!(!run(&SrvValidator, "_sip.tcp.example.com", "5 5060 sip.example.com").is_valid());
        assert!(!run(&SrvValidator, "_sip._tcp.example.com", "5 70000 sip.example.com").is_valid());
        assert!(!run(&SrvValidator, "_sip._tcp.example.com", "5 5060").is_valid());
    }

    #[test]
    fn test_hinfo_fields() {
        assert!(run(&HinfoValidator, "host.example.com", "\"Intel x86\" \"Linux 6\"").is_valid());
        assert!(run(&HinfoValidator, "host.example.com", "PC LINUX").is_valid());
        assert!(!run(&HinfoValidator, "host.example.com", "PC").is_valid());
        assert!(!run(&HinfoValidator, "host.example.com", "\"unterminated LINUX").is_valid());
    }

    #[test]
    fn test_ds_and_loc() {
        assert!(run(&DsValidator, "sub.example.com", "60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118").is_valid());
        assert!(!run(&DsValidator, "sub.example.com", "70000 5 1 2BB183AF").is_valid());
        assert!(!run(&DsValidator, "sub.example.com", "60485 5 1 XYZ").is_valid());
        assert!(run(&LocValidator, "geo.example.com", "37 23 30.900 N 121 59 19.000 W 7.00m").is_valid());
        assert!(!run(&LocValidator, "geo.example.com", "37 23 30.900 E 121 59 19.000 W 7.00m").is_valid());
    }
}
