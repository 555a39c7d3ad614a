use std::mem::{offset_of, size_of};

use anyhow::Context;
use p256::ecdsa::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use zerocopy::{little_endian, AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::{
    constants::*,
    error::Result,
    utils::{
        crypto::{verify_native_signature, EccContext},
        swap_endian_32b,
    },
};

bitflags::bitflags! {
    /// EPID group status bits of the platform info blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EpidGroupStatus: u8 {
        const REVOKED = 1 << IAS_EPID_GROUP_STATUS_REVOKED_BIT_POS;
        const REKEY_AVAILABLE = 1 << IAS_EPID_GROUP_STATUS_REKEY_AVAILABLE_BIT_POS;
    }
}

bitflags::bitflags! {
    /// TCB evaluation status bits of the platform info blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TcbEvaluationStatus: u16 {
        const CPUSVN_OUT_OF_DATE = 1 << IAS_TCB_EVAL_STATUS_CPUSVN_OUT_OF_DATE_BIT_POS;
        const ISVSVN_OUT_OF_DATE = 1 << IAS_TCB_EVAL_STATUS_ISVSVN_OUT_OF_DATE_BIT_POS;
    }
}

bitflags::bitflags! {
    /// PSE evaluation status bits of the platform info blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PseEvaluationStatus: u16 {
        const ISVSVN_OUT_OF_DATE = 1 << IAS_PSE_EVAL_STATUS_ISVSVN_OUT_OF_DATE_BIT_POS;
        const EPID_GROUP_REVOKED = 1 << IAS_PSE_EVAL_STATUS_EPID_GROUP_REVOKED_BIT_POS;
        const PSDASVN_OUT_OF_DATE = 1 << IAS_PSE_EVAL_STATUS_PSDASVN_OUT_OF_DATE_BIT_POS;
        const SIGRL_OUT_OF_DATE = 1 << IAS_PSE_EVAL_STATUS_SIGRL_OUT_OF_DATE_BIT_POS;
        const PRIVRL_OUT_OF_DATE = 1 << IAS_PSE_EVAL_STATUS_PRIVRL_OUT_OF_DATE_BIT_POS;
    }
}

impl EpidGroupStatus {
    /// Group neither revoked nor due for rekeying.
    pub const NOMINAL: Self = Self::empty();
}

impl TcbEvaluationStatus {
    /// CPU and ISV SVNs up to date.
    pub const NOMINAL: Self = Self::empty();
}

impl PseEvaluationStatus {
    /// PSE fully up to date and not revoked.
    pub const NOMINAL: Self = Self::empty();
}

/// ECDSA P-256 signature as two 256-bit components, `x` (r) then `y` (s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct EcSignature256 {
    pub x: [u8; EC256_COMPONENT_SIZE],
    pub y: [u8; EC256_COMPONENT_SIZE],
}

impl EcSignature256 {
    /// Word-swaps both components. See [`swap_endian_32b`].
    pub fn swap_endian(&mut self) {
        swap_endian_32b(&mut self.x);
        swap_endian_32b(&mut self.y);
    }

    /// Reads a report-order (big-endian) signature as a `p256` signature.
    pub fn to_signature(&self) -> anyhow::Result<Signature> {
        Signature::from_slice(self.as_bytes()).context("malformed ecdsa signature")
    }
}

/// Platform info blob embedded in the attestation verification report.
///
/// Multi-byte integers are little-endian. The signature covers every byte that
/// precedes the `signature` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct PlatformInfoBlob {
    /// [1 byte] EpidGroupStatus bits
    pub epid_group_status: u8,

    /// [2 bytes] TcbEvaluationStatus bits
    pub tcb_evaluation_status: little_endian::U16,

    /// [2 bytes] PseEvaluationStatus bits
    pub pse_evaluation_status: little_endian::U16,

    /// [18 bytes]
    pub latest_equivalent_tcb_psvn: [u8; PSVN_SIZE],

    /// [2 bytes]
    pub latest_pse_isvsvn: [u8; ISVSVN_SIZE],

    /// [4 bytes]
    pub latest_psda_svn: [u8; PSDA_SVN_SIZE],

    /// [4 bytes]
    pub performance_rekey_gid: [u8; GID_SIZE],

    /// [64 bytes] Big-endian components.
    pub signature: EcSignature256,
}

const _: () = assert!(size_of::<PlatformInfoBlob>() == PLATFORM_INFO_BLOB_LEN);
const _: () = assert!(size_of::<EcSignature256>() == EC256_SIGNATURE_SIZE);
const _: () = assert!(
    PlatformInfoBlob::SIGNED_LEN + size_of::<EcSignature256>() == size_of::<PlatformInfoBlob>()
);

impl PlatformInfoBlob {
    /// Number of leading bytes covered by the signature.
    pub const SIGNED_LEN: usize = offset_of!(PlatformInfoBlob, signature);

    /// Blob carrying the given evaluation flags, zeroed SVN/GID arrays and no signature.
    pub fn unsigned(
        epid_group_status: EpidGroupStatus,
        tcb_evaluation_status: TcbEvaluationStatus,
        pse_evaluation_status: PseEvaluationStatus,
    ) -> Self {
        let mut blob = Self::new_zeroed();
        blob.epid_group_status = epid_group_status.bits();
        blob.tcb_evaluation_status = little_endian::U16::new(tcb_evaluation_status.bits());
        blob.pse_evaluation_status = little_endian::U16::new(pse_evaluation_status.bits());
        blob
    }

    pub fn epid_group_status(&self) -> EpidGroupStatus {
        EpidGroupStatus::from_bits_retain(self.epid_group_status)
    }

    pub fn tcb_evaluation_status(&self) -> TcbEvaluationStatus {
        TcbEvaluationStatus::from_bits_retain(self.tcb_evaluation_status.get())
    }

    pub fn pse_evaluation_status(&self) -> PseEvaluationStatus {
        PseEvaluationStatus::from_bits_retain(self.pse_evaluation_status.get())
    }

    /// Bytes the signature is computed over.
    pub fn signed_bytes(&self) -> &[u8] {
        &self.as_bytes()[..Self::SIGNED_LEN]
    }

    /// Signs the blob and stores the word-swapped components.
    ///
    /// On error the signature field is left untouched.
    pub fn sign(&mut self, ctx: &EccContext) -> Result<()> {
        let mut signature = ctx.sign(self.signed_bytes())?;
        signature.swap_endian();
        self.signature = signature;
        Ok(())
    }

    /// Undoes the word swap and checks the signature against the service public key.
    pub fn verify(&self, verifying_key: &VerifyingKey) -> anyhow::Result<()> {
        let mut native = self.signature;
        native.swap_endian();
        verify_native_signature(verifying_key, self.signed_bytes(), &native)
    }
}
