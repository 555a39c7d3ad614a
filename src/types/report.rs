use std::{borrow::Cow, fmt};

use anyhow::anyhow;
use tracing::debug;
use zerocopy::{little_endian, AsBytes};

use crate::{
    config::ReportPolicy,
    constants::{ATTESTATION_REPORT_LEN, REPORT_ID_SIZE},
    error::Result,
    utils,
};

use super::{PlatformInfoBlob, PseStatus, QuoteStatus, QuoteVerificationResult, RevocationReason};

/// Fixed-size, NUL-padded report identifier.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReportId([u8; REPORT_ID_SIZE]);

impl ReportId {
    /// Copies `id`, silently dropping whatever does not fit in `REPORT_ID_SIZE` bytes.
    ///
    /// The cut never splits a UTF-8 sequence, so the stored id stays valid text.
    pub fn new(id: &str) -> Self {
        let mut buf = [0u8; REPORT_ID_SIZE];
        let mut len = id.len().min(REPORT_ID_SIZE);
        while !id.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&id.as_bytes()[..len]);
        Self(buf)
    }

    /// Identifier bytes up to the first NUL, or the whole field if it is full.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(REPORT_ID_SIZE);
        &self.0[..end]
    }

    pub fn raw(&self) -> &[u8; REPORT_ID_SIZE] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportId({:?})", self.to_string_lossy())
    }
}

/// Attestation verification report handed back for a submitted quote.
///
/// serialization:
/// [id][status][revocation_reason][info_blob][pse_status][policy_report_size]
/// 100 bytes + 4 bytes + 4 bytes + 97 bytes + 4 bytes + 4 bytes
/// total: 213 bytes, integers little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationReport {
    pub id: ReportId,
    pub status: QuoteStatus,
    pub revocation_reason: RevocationReason,
    pub info_blob: PlatformInfoBlob,
    pub pse_status: PseStatus,
    /// No policy report is ever attached, so this stays 0.
    pub policy_report_size: u32,
}

impl AttestationReport {
    /// Populates every report field from the interpreted verdict. The info blob
    /// is left unsigned.
    ///
    /// The evaluation flags, revocation reason and PSE status come from `policy`;
    /// SVN and GID arrays are always zero.
    pub fn assemble(result: &QuoteVerificationResult, policy: &ReportPolicy) -> Result<Self> {
        let status = result.status()?;

        if result.report_id.len() > REPORT_ID_SIZE {
            debug!(
                len = result.report_id.len(),
                "report id truncated to {REPORT_ID_SIZE} bytes"
            );
        }

        Ok(Self {
            id: ReportId::new(&result.report_id),
            status,
            revocation_reason: policy.revocation_reason,
            info_blob: PlatformInfoBlob::unsigned(
                policy.epid_group_status,
                policy.tcb_evaluation_status,
                policy.pse_evaluation_status,
            ),
            pse_status: policy.pse_status,
            policy_report_size: 0,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output_vec = Vec::with_capacity(ATTESTATION_REPORT_LEN);

        output_vec.extend_from_slice(self.id.raw());
        output_vec.extend_from_slice(&(self.status as u32).to_le_bytes());
        output_vec.extend_from_slice(&(self.revocation_reason as u32).to_le_bytes());
        output_vec.extend_from_slice(self.info_blob.as_bytes());
        output_vec.extend_from_slice(&(self.pse_status as u32).to_le_bytes());
        output_vec.extend_from_slice(&self.policy_report_size.to_le_bytes());

        output_vec
    }

    /// Decodes a report from the front of `bytes`, advancing past it.
    pub fn read(bytes: &mut &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ATTESTATION_REPORT_LEN {
            return Err(anyhow!("incorrect buffer size"));
        }

        let id = utils::read_array::<REPORT_ID_SIZE>(bytes)
            .ok_or_else(|| anyhow!("underflow reading report id"))?;
        let status = read_u32(bytes, "quote status")?;
        let revocation_reason = read_u32(bytes, "revocation reason")?;
        let info_blob = utils::read_from_bytes::<PlatformInfoBlob>(bytes)
            .ok_or_else(|| anyhow!("underflow reading platform info blob"))?;
        let pse_status = read_u32(bytes, "pse status")?;
        let policy_report_size = read_u32(bytes, "policy report size")?;

        Ok(Self {
            id: ReportId(id),
            status: QuoteStatus::try_from(status)?,
            revocation_reason: RevocationReason::try_from(revocation_reason)?,
            info_blob,
            pse_status: PseStatus::try_from(pse_status)?,
            policy_report_size,
        })
    }
}

fn read_u32(bytes: &mut &[u8], what: &str) -> anyhow::Result<u32> {
    utils::read_from_bytes::<little_endian::U32>(bytes)
        .map(|v| v.get())
        .ok_or_else(|| anyhow!("underflow reading {what}"))
}
