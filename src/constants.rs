// Layout of the IAS attestation verification report, rev 0.6 of the IAS API.

pub const REPORT_ID_SIZE: usize = 100;

pub const PSVN_SIZE: usize = 18;
pub const ISVSVN_SIZE: usize = 2;
pub const PSDA_SVN_SIZE: usize = 4;
pub const GID_SIZE: usize = 4;

pub const EC256_COMPONENT_SIZE: usize = 32;
pub const EC256_SIGNATURE_SIZE: usize = 2 * EC256_COMPONENT_SIZE;
pub const EC256_PRIVATE_KEY_SIZE: usize = 32;

pub const PLATFORM_INFO_BLOB_LEN: usize = 97;
pub const ATTESTATION_REPORT_LEN: usize = REPORT_ID_SIZE + 4 + 4 + PLATFORM_INFO_BLOB_LEN + 4 + 4;

pub const IAS_EPID_GROUP_STATUS_REVOKED_BIT_POS: u32 = 0x00;
pub const IAS_EPID_GROUP_STATUS_REKEY_AVAILABLE_BIT_POS: u32 = 0x01;

pub const IAS_TCB_EVAL_STATUS_CPUSVN_OUT_OF_DATE_BIT_POS: u32 = 0x00;
pub const IAS_TCB_EVAL_STATUS_ISVSVN_OUT_OF_DATE_BIT_POS: u32 = 0x01;

pub const IAS_PSE_EVAL_STATUS_ISVSVN_OUT_OF_DATE_BIT_POS: u32 = 0x00;
pub const IAS_PSE_EVAL_STATUS_EPID_GROUP_REVOKED_BIT_POS: u32 = 0x01;
pub const IAS_PSE_EVAL_STATUS_PSDASVN_OUT_OF_DATE_BIT_POS: u32 = 0x02;
pub const IAS_PSE_EVAL_STATUS_SIGRL_OUT_OF_DATE_BIT_POS: u32 = 0x03;
pub const IAS_PSE_EVAL_STATUS_PRIVRL_OUT_OF_DATE_BIT_POS: u32 = 0x04;

/// Timestamp format used by IAS in the `timestamp` attribute.
pub const IAS_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub const ATTR_ID: &str = "id";
pub const ATTR_TIMESTAMP: &str = "timestamp";
pub const ATTR_EPID_PSEUDONYM: &str = "epidPseudonym";
pub const ATTR_QUOTE_STATUS: &str = "isvEnclaveQuoteStatus";
