pub type Result<T> = std::result::Result<T, AttestationError>;

/// Failure of a single verification request.
///
/// Any of these aborts the request; no report is handed back.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("verification service reported failure: {0:#}")]
    VerificationFailed(#[source] anyhow::Error),

    #[error("quote status missing or unrecognized (label: {label:?})")]
    UnrecognizedStatus { label: Option<String> },

    #[error("cannot acquire ecc context")]
    CryptoContextError(#[source] p256::ecdsa::Error),

    #[error("failed to sign platform info blob")]
    InternalSigningError(#[source] p256::ecdsa::Error),
}
