//! Guard configuration.
//!
//! Loaded once at startup, typically from a YAML file:
//!
//! ```yaml
//! enabled: true
//! allowed_ips: ["127.0.0.1", "::1", "localhost", "192.168.1.0/24"]
//! allowed_hosts: ["*.mycompany.com"]
//! log_blocked_attempts: true
//! trusted_proxies: ["10.0.0.0/8"]
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allowlist::Allowlist;
use crate::error::ConfigError;
use crate::gate::GateOptions;

/// IP allowlist entry that stands for the loopback addresses.
pub const LOCALHOST: &str = "localhost";

/// Addresses a [`LOCALHOST`] entry expands to.
pub const LOOPBACK_ADDRESSES: [&str; 2] = ["127.0.0.1", "::1"];

/// Configuration for both gates and the host wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Master switch. When false, the wiring skips both gates.
    pub enabled: bool,

    /// IP addresses or CIDR ranges allowed to use the diagnostic tools.
    pub allowed_ips: Vec<String>,

    /// Reverse-DNS hostname patterns (`*` and `?` wildcards).
    pub allowed_hosts: Vec<String>,

    /// Log every blocked attempt.
    pub log_blocked_attempts: bool,

    /// Proxies whose `X-Forwarded-For` header is trusted.
    pub trusted_proxies: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_ips: vec![
                "127.0.0.1".to_string(),
                "::1".to_string(),
                LOCALHOST.to_string(),
            ],
            allowed_hosts: Vec::new(),
            log_blocked_attempts: true,
            trusted_proxies: Vec::new(),
        }
    }
}

impl GuardConfig {
    /// Parses a YAML document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown keys and
    /// [`ConfigError::Invalid`] for empty list entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use devgate::GuardConfig;
    ///
    /// let config = GuardConfig::from_yaml_str("allowed_hosts: ['*.local']").unwrap();
    /// assert!(config.enabled);
    /// assert_eq!(config.allowed_hosts, vec!["*.local".to_string()]);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // an empty document means "all defaults"
        let config = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(
            target: "devgate",
            path = %path.display(),
            enabled = config.enabled,
            allowed_ips = config.allowed_ips.len(),
            allowed_hosts = config.allowed_hosts.len(),
            "loaded guard configuration"
        );
        Ok(config)
    }

    /// Checks for values no allowlist can make sense of.
    ///
    /// Entries that merely fail to parse as an address or pattern are not
    /// errors; they never match at evaluation time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first empty entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists: [(&'static str, &[String]); 3] = [
            ("allowed_ips", self.allowed_ips.as_slice()),
            ("allowed_hosts", self.allowed_hosts.as_slice()),
            ("trusted_proxies", self.trusted_proxies.as_slice()),
        ];

        for (field, entries) in lists {
            if let Some(index) = entries.iter().position(|e| e.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("entry {} is empty", index),
                ));
            }
        }

        Ok(())
    }

    /// Returns the IP allowlist with every `localhost` entry replaced by the
    /// loopback addresses, keeping order and dropping duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use devgate::GuardConfig;
    ///
    /// let ips = GuardConfig::default().ip_allowlist();
    /// assert_eq!(ips, vec!["127.0.0.1".to_string(), "::1".to_string()]);
    /// ```
    pub fn ip_allowlist(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.allowed_ips.len() + 1);

        for entry in &self.allowed_ips {
            let entry = entry.trim();
            let expanded: Vec<&str> = if entry.eq_ignore_ascii_case(LOCALHOST) {
                LOOPBACK_ADDRESSES.to_vec()
            } else {
                vec![entry]
            };

            for ip in expanded {
                if !out.iter().any(|existing| existing == ip) {
                    out.push(ip.to_string());
                }
            }
        }

        out
    }

    /// Compiles the allowlist the gates evaluate against.
    pub fn allowlist(&self) -> Allowlist {
        Allowlist::new(self.ip_allowlist(), &self.allowed_hosts)
    }

    /// Compiles the trusted proxy list.
    pub fn trusted_proxy_list(&self) -> Allowlist {
        Allowlist::new(&self.trusted_proxies, Vec::<String>::new())
    }

    /// Returns the options shared by both gates.
    pub fn gate_options(&self) -> GateOptions {
        GateOptions {
            log_blocked_attempts: self.log_blocked_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GuardConfig::default();
        assert!(config.enabled);
        assert_eq!(config.allowed_ips, vec!["127.0.0.1", "::1", "localhost"]);
        assert!(config.allowed_hosts.is_empty());
        assert!(config.log_blocked_attempts);
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(GuardConfig::from_yaml_str("").unwrap(), GuardConfig::default());
        assert_eq!(GuardConfig::from_yaml_str("{}").unwrap(), GuardConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GuardConfig::from_yaml_str("allowed_ips: ['127.0.0.1', '192.168.0.0/16']")
            .unwrap();
        assert_eq!(config.allowed_ips, vec!["127.0.0.1", "192.168.0.0/16"]);
        assert!(config.enabled);
        assert!(config.log_blocked_attempts);
    }

    #[test]
    fn complete_document() {
        let yaml = r#"
enabled: true
allowed_ips: ["127.0.0.1", "::1"]
allowed_hosts: ["localhost"]
log_blocked_attempts: true
"#;
        let config = GuardConfig::from_yaml_str(yaml).unwrap();
        assert!(config.enabled);
        assert_eq!(config.allowed_ips, vec!["127.0.0.1", "::1"]);
        assert_eq!(config.allowed_hosts, vec!["localhost"]);
        assert!(config.log_blocked_attempts);
    }

    #[test]
    fn can_disable() {
        let config = GuardConfig::from_yaml_str("enabled: false").unwrap();
        assert!(!config.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GuardConfig::from_yaml_str("allowed_ip: ['10.0.0.1']").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = GuardConfig::from_yaml_str("enabled: [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_entries_are_invalid() {
        let err = GuardConfig::from_yaml_str("allowed_hosts: ['*.a', '  ']").unwrap_err();
        match err {
            ConfigError::Invalid { field, message } => {
                assert_eq!(field, "allowed_hosts");
                assert_eq!(message, "entry 1 is empty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_addresses_are_not_config_errors() {
        let config = GuardConfig::from_yaml_str("allowed_ips: ['10.0.0.0/99', 'garbage']");
        assert!(config.is_ok());
    }

    #[test]
    fn localhost_expands_to_loopback() {
        let config = GuardConfig {
            allowed_ips: vec![
                "10.0.0.0/8".to_string(),
                "LOCALHOST".to_string(),
                "::1".to_string(),
            ],
            ..GuardConfig::default()
        };
        assert_eq!(config.ip_allowlist(), vec!["10.0.0.0/8", "127.0.0.1", "::1"]);
    }

    #[test]
    fn compiled_allowlist_authorizes_loopback() {
        let allowlist = GuardConfig::default().allowlist();
        assert!(allowlist.matches_ip("127.0.0.1"));
        assert!(allowlist.matches_ip("::1"));
        assert!(!allowlist.matches_ip("10.0.0.1"));
        assert!(allowlist.ip_rules().iter().all(|r| !r.is_unparsed()));
    }

    #[test]
    fn gate_options_follow_logging_switch() {
        let config = GuardConfig {
            log_blocked_attempts: false,
            ..GuardConfig::default()
        };
        assert!(!config.gate_options().log_blocked_attempts);
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devgate.yaml");
        fs::write(&path, "allowed_hosts: ['*.corp.example']\nlog_blocked_attempts: false\n")
            .unwrap();

        let config = GuardConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.allowed_hosts, vec!["*.corp.example"]);
        assert!(!config.log_blocked_attempts);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GuardConfig::from_yaml_file("/nonexistent/devgate.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/devgate.yaml"));
    }
}
