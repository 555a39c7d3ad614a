use std::{fmt, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    constants::EC256_PRIVATE_KEY_SIZE,
    types::{EpidGroupStatus, PseEvaluationStatus, PseStatus, RevocationReason, TcbEvaluationStatus},
    utils::crypto::ServiceSigningKey,
};

/// Values the assembler writes into the evaluation fields of every report.
///
/// The default reports a fully up-to-date platform: no flags set, no
/// revocation, PSE OK. Callers with a real platform policy override it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPolicy {
    pub epid_group_status: EpidGroupStatus,
    pub tcb_evaluation_status: TcbEvaluationStatus,
    pub pse_evaluation_status: PseEvaluationStatus,
    pub revocation_reason: RevocationReason,
    pub pse_status: PseStatus,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            epid_group_status: EpidGroupStatus::NOMINAL,
            tcb_evaluation_status: TcbEvaluationStatus::NOMINAL,
            pse_evaluation_status: PseEvaluationStatus::NOMINAL,
            revocation_reason: RevocationReason::None,
            pse_status: PseStatus::Ok,
        }
    }
}

/// Where the service signing key comes from.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SigningKeySource {
    /// Hex-encoded big-endian scalar.
    Raw {
        #[serde(deserialize_with = "hex::deserialize")]
        scalar: [u8; EC256_PRIVATE_KEY_SIZE],
    },
    /// PKCS#8 or SEC1 PEM file.
    Pem { path: PathBuf },
}

impl SigningKeySource {
    pub fn load(&self) -> anyhow::Result<ServiceSigningKey> {
        match self {
            SigningKeySource::Raw { scalar } => ServiceSigningKey::from_bytes(scalar),
            SigningKeySource::Pem { path } => ServiceSigningKey::from_pem_file(path),
        }
    }
}

impl Drop for SigningKeySource {
    fn drop(&mut self) {
        if let SigningKeySource::Raw { scalar } = self {
            scalar.zeroize();
        }
    }
}

impl fmt::Debug for SigningKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKeySource::Raw { .. } => f.write_str("Raw { .. }"),
            SigningKeySource::Pem { path } => f.debug_struct("Pem").field("path", path).finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub signing_key: SigningKeySource,
    #[serde(default)]
    pub policy: ReportPolicy,
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid server config")
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let json = zeroize::Zeroizing::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
        );
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::tests::{test_key, TEST_KEY};

    #[test]
    fn parses_raw_key_with_default_policy() {
        let json = format!(
            r#"{{ "signingKey": {{ "type": "raw", "scalar": "{}" }} }}"#,
            hex::encode(TEST_KEY)
        );
        let config = ServerConfig::from_json_str(&json).unwrap();
        assert_eq!(config.policy, ReportPolicy::default());

        let key = config.signing_key.load().unwrap();
        assert_eq!(key.verifying_key(), test_key().verifying_key());
        assert_eq!(format!("{:?}", config.signing_key), "Raw { .. }");
    }

    #[test]
    fn parses_policy_override() {
        let json = format!(
            r#"{{
                "signingKey": {{ "type": "raw", "scalar": "{}" }},
                "policy": {{
                    "epidGroupStatus": "REKEY_AVAILABLE",
                    "revocationReason": "SUPERCEDED"
                }}
            }}"#,
            hex::encode(TEST_KEY)
        );
        let config = ServerConfig::from_json_str(&json).unwrap();
        assert_eq!(config.policy.epid_group_status, EpidGroupStatus::REKEY_AVAILABLE);
        assert_eq!(config.policy.revocation_reason, RevocationReason::Superceded);
        assert_eq!(config.policy.pse_status, PseStatus::Ok);
    }

    #[test]
    fn rejects_short_scalar() {
        let json = r#"{ "signingKey": { "type": "raw", "scalar": "632cd4" } }"#;
        assert!(ServerConfig::from_json_str(json).is_err());
    }

    #[test]
    fn missing_pem_file_is_reported() {
        let json = r#"{ "signingKey": { "type": "pem", "path": "/nonexistent/ias.pem" } }"#;
        let config = ServerConfig::from_json_str(json).unwrap();
        let err = config.signing_key.load().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ias.pem"));
    }
}
