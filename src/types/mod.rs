use anyhow::anyhow;
use serde::{Deserialize, Serialize};

pub mod platform_info;
pub mod report;
pub mod verification_result;

pub use platform_info::*;
pub use report::*;
pub use verification_result::*;

/// Verdict on the quote as reported by IAS in `isvEnclaveQuoteStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum QuoteStatus {
    Ok = 0,
    SignatureInvalid = 1,
    GroupRevoked = 2,
    SignatureRevoked = 3,
    KeyRevoked = 4,
    SigrlVersionMismatch = 5,
    GroupOutOfDate = 6,
    ConfigurationNeeded = 7,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 8] = [
        QuoteStatus::Ok,
        QuoteStatus::SignatureInvalid,
        QuoteStatus::GroupRevoked,
        QuoteStatus::SignatureRevoked,
        QuoteStatus::KeyRevoked,
        QuoteStatus::SigrlVersionMismatch,
        QuoteStatus::GroupOutOfDate,
        QuoteStatus::ConfigurationNeeded,
    ];

    /// Maps an IAS status label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "OK" => Some(QuoteStatus::Ok),
            "SIGNATURE_INVALID" => Some(QuoteStatus::SignatureInvalid),
            "GROUP_REVOKED" => Some(QuoteStatus::GroupRevoked),
            "SIGNATURE_REVOKED" => Some(QuoteStatus::SignatureRevoked),
            "KEY_REVOKED" => Some(QuoteStatus::KeyRevoked),
            "SIGRL_VERSION_MISMATCH" => Some(QuoteStatus::SigrlVersionMismatch),
            "GROUP_OUT_OF_DATE" => Some(QuoteStatus::GroupOutOfDate),
            "CONFIGURATION_NEEDED" => Some(QuoteStatus::ConfigurationNeeded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Ok => "OK",
            QuoteStatus::SignatureInvalid => "SIGNATURE_INVALID",
            QuoteStatus::GroupRevoked => "GROUP_REVOKED",
            QuoteStatus::SignatureRevoked => "SIGNATURE_REVOKED",
            QuoteStatus::KeyRevoked => "KEY_REVOKED",
            QuoteStatus::SigrlVersionMismatch => "SIGRL_VERSION_MISMATCH",
            QuoteStatus::GroupOutOfDate => "GROUP_OUT_OF_DATE",
            QuoteStatus::ConfigurationNeeded => "CONFIGURATION_NEEDED",
        }
    }
}

impl TryFrom<u32> for QuoteStatus {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> anyhow::Result<Self> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| *status as u32 == value)
            .ok_or_else(|| anyhow!("unknown quote status {value}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum RevocationReason {
    #[default]
    None = 0,
    KeyCompromise = 1,
    CaCompromised = 2,
    Superceded = 3,
    CessationOfOperation = 4,
    CertificateHold = 5,
    PrivilegeWithdrawn = 6,
    AaCompromise = 7,
}

impl TryFrom<u32> for RevocationReason {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> anyhow::Result<Self> {
        Ok(match value {
            0 => RevocationReason::None,
            1 => RevocationReason::KeyCompromise,
            2 => RevocationReason::CaCompromised,
            3 => RevocationReason::Superceded,
            4 => RevocationReason::CessationOfOperation,
            5 => RevocationReason::CertificateHold,
            6 => RevocationReason::PrivilegeWithdrawn,
            7 => RevocationReason::AaCompromise,
            _ => return Err(anyhow!("unknown revocation reason {value}")),
        })
    }
}

/// Platform services enclave status. Reported, never evaluated here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum PseStatus {
    #[default]
    Ok = 0,
    DescTypeNotSupported = 1,
    IsvsvnOutOfDate = 2,
    MiscselectInvalid = 3,
    AttributesInvalid = 4,
    MrsignerInvalid = 5,
    PsHwGidRevoked = 6,
    PsHwPrivkeyRlverMismatch = 7,
    PsHwSigRlverMismatch = 8,
    PsHwCaIdInvalid = 9,
    PsHwSecInfoInvalid = 10,
    PsHwPsdaSvnOutOfDate = 11,
}

impl TryFrom<u32> for PseStatus {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> anyhow::Result<Self> {
        Ok(match value {
            0 => PseStatus::Ok,
            1 => PseStatus::DescTypeNotSupported,
            2 => PseStatus::IsvsvnOutOfDate,
            3 => PseStatus::MiscselectInvalid,
            4 => PseStatus::AttributesInvalid,
            5 => PseStatus::MrsignerInvalid,
            6 => PseStatus::PsHwGidRevoked,
            7 => PseStatus::PsHwPrivkeyRlverMismatch,
            8 => PseStatus::PsHwSigRlverMismatch,
            9 => PseStatus::PsHwCaIdInvalid,
            10 => PseStatus::PsHwSecInfoInvalid,
            11 => PseStatus::PsHwPsdaSvnOutOfDate,
            _ => return Err(anyhow!("unknown pse status {value}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_status_labels_round_trip() {
        for status in QuoteStatus::ALL {
            assert_eq!(QuoteStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(QuoteStatus::from_label("ok"), None);
        assert_eq!(QuoteStatus::from_label("SW_HARDENING_NEEDED"), None);
    }

    #[test]
    fn quote_status_numeric_values() {
        assert_eq!(QuoteStatus::try_from(0).unwrap(), QuoteStatus::Ok);
        assert_eq!(
            QuoteStatus::try_from(7).unwrap(),
            QuoteStatus::ConfigurationNeeded
        );
        assert!(QuoteStatus::try_from(8).is_err());
    }

    #[test]
    fn unknown_numeric_values_are_rejected() {
        assert!(RevocationReason::try_from(8).is_err());
        assert!(PseStatus::try_from(12).is_err());
        assert_eq!(
            PseStatus::try_from(11).unwrap(),
            PseStatus::PsHwPsdaSvnOutOfDate
        );
    }

    #[test]
    fn serde_uses_ias_labels() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::SigrlVersionMismatch).unwrap(),
            "\"SIGRL_VERSION_MISMATCH\""
        );
        let reason: RevocationReason = serde_json::from_str("\"KEY_COMPROMISE\"").unwrap();
        assert_eq!(reason, RevocationReason::KeyCompromise);
    }
}
