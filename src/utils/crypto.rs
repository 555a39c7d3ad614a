use std::fmt;

use anyhow::{anyhow, bail, Context};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use tracing::{error, trace};
use zerocopy::FromZeroes;
use zeroize::Zeroizing;

use crate::{
    constants::{EC256_COMPONENT_SIZE, EC256_PRIVATE_KEY_SIZE},
    error::{AttestationError, Result},
    types::platform_info::EcSignature256,
};

use super::{hash::sha256sum, swap_endian_32b};

/// Long-lived ECDSA P-256 key the service signs platform info blobs with.
///
/// Loaded once at start-up and only ever handed out by reference. The scalar is
/// wiped when the handle is dropped and never shows up in `Debug` output.
pub struct ServiceSigningKey {
    secret: Zeroizing<[u8; EC256_PRIVATE_KEY_SIZE]>,
    verifying_key: VerifyingKey,
}

impl ServiceSigningKey {
    /// Builds the handle from a big-endian 32-byte scalar.
    pub fn from_bytes(secret: &[u8]) -> anyhow::Result<Self> {
        // p256 left-pads short slices, which would silently load another key
        if secret.len() != EC256_PRIVATE_KEY_SIZE {
            bail!(
                "service signing key must be {EC256_PRIVATE_KEY_SIZE} bytes, got {}",
                secret.len()
            );
        }
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|_| anyhow!("invalid service signing key: not a P-256 scalar"))?;

        let mut stored = Zeroizing::new([0u8; EC256_PRIVATE_KEY_SIZE]);
        stored.copy_from_slice(secret);

        Ok(Self {
            secret: stored,
            verifying_key: VerifyingKey::from(&signing_key),
        })
    }

    /// Accepts either a PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) document.
    pub fn from_pem(pem: &str) -> anyhow::Result<Self> {
        let secret = match p256::SecretKey::from_pkcs8_pem(pem) {
            Ok(secret) => secret,
            Err(_) => p256::SecretKey::from_sec1_pem(pem)
                .map_err(|_| anyhow!("signing key is neither PKCS#8 nor SEC1 PEM"))?,
        };
        let scalar = Zeroizing::new(secret.to_bytes());
        Self::from_bytes(scalar.as_slice())
    }

    pub fn from_pem_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let pem = Zeroizing::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read signing key {}", path.display()))?,
        );
        Self::from_pem(&pem)
    }

    /// Public half, distributed to report consumers out of band.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl fmt::Debug for ServiceSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSigningKey")
            .field(
                "public",
                &hex::encode(self.verifying_key.to_encoded_point(false).as_bytes()),
            )
            .finish_non_exhaustive()
    }
}

/// ECC state for a single signing operation.
///
/// Every request opens its own context; it is closed when dropped, whichever
/// way the request ends.
pub struct EccContext {
    signing_key: SigningKey,
}

impl EccContext {
    pub fn open(key: &ServiceSigningKey) -> Result<Self> {
        let signing_key = SigningKey::from_slice(key.secret.as_slice()).map_err(|e| {
            error!("cannot get ecc context");
            AttestationError::CryptoContextError(e)
        })?;
        trace!("ecc context opened");
        Ok(Self { signing_key })
    }

    /// Signs SHA-256(`data`) with RFC 6979 nonces.
    ///
    /// Components come back in the context's little-endian limb order.
    pub fn sign(&self, data: &[u8]) -> Result<EcSignature256> {
        let digest = sha256sum(data);
        let signature: Signature = self.signing_key.sign_prehash(&digest).map_err(|e| {
            error!("failed to sign platform info blob");
            AttestationError::InternalSigningError(e)
        })?;

        let raw = signature.to_bytes();
        let mut native = EcSignature256::new_zeroed();
        native.x.copy_from_slice(&raw[..EC256_COMPONENT_SIZE]);
        native.y.copy_from_slice(&raw[EC256_COMPONENT_SIZE..]);
        swap_endian_32b(&mut native.x);
        swap_endian_32b(&mut native.y);

        Ok(native)
    }
}

impl Drop for EccContext {
    fn drop(&mut self) {
        // SigningKey wipes its scalar on drop
        trace!("ecc context closed");
    }
}

/// Verifies a signature in the context's little-endian limb order over SHA-256(`data`).
pub fn verify_native_signature(
    verifying_key: &VerifyingKey,
    data: &[u8],
    native: &EcSignature256,
) -> anyhow::Result<()> {
    let mut x = native.x;
    let mut y = native.y;
    swap_endian_32b(&mut x);
    swap_endian_32b(&mut y);

    let mut raw = [0u8; 2 * EC256_COMPONENT_SIZE];
    raw[..EC256_COMPONENT_SIZE].copy_from_slice(&x);
    raw[EC256_COMPONENT_SIZE..].copy_from_slice(&y);

    let signature = Signature::from_slice(&raw).context("malformed ecdsa signature")?;
    verifying_key
        .verify_prehash(&sha256sum(data), &signature)
        .map_err(|e| anyhow!("failed to verify platform info blob signature: {e}"))
}
