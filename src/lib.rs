pub mod config;
pub mod constants;
pub mod error;
pub mod service;
pub mod types;
pub mod utils;

use tracing::debug;

use config::{ReportPolicy, ServerConfig};
pub use error::{AttestationError, Result};
use service::VerificationService;
use types::{AttestationReport, QuoteVerificationResult};
use utils::crypto::{EccContext, ServiceSigningKey};

/// Simulated attestation server: asks the verification service about a quote
/// and turns its verdict into a signed attestation verification report.
///
/// The quote itself is never decoded or cryptographically checked.
pub struct AttestationServer<S> {
    service: S,
    signing_key: ServiceSigningKey,
    policy: ReportPolicy,
}

impl<S: VerificationService> AttestationServer<S> {
    pub fn new(service: S, signing_key: ServiceSigningKey, policy: ReportPolicy) -> Self {
        Self {
            service,
            signing_key,
            policy,
        }
    }

    pub fn from_config(service: S, config: &ServerConfig) -> anyhow::Result<Self> {
        let signing_key = config.signing_key.load()?;
        Ok(Self::new(service, signing_key, config.policy))
    }

    pub fn signing_key(&self) -> &ServiceSigningKey {
        &self.signing_key
    }

    pub fn verify_attestation_evidence(
        &self,
        quote: &[u8],
        pse_manifest: Option<&[u8]>,
    ) -> Result<AttestationReport> {
        verify_attestation_evidence(
            &self.service,
            quote,
            pse_manifest,
            &self.signing_key,
            &self.policy,
        )
    }
}

/// Produces a signed report for `quote`.
///
/// 1. Reject an empty quote before the service is contacted.
/// 2. Ask the verification service for its verdict.
/// 3. Interpret the returned attributes.
/// 4. Assemble the report fields.
/// 5. Sign the platform info blob.
///
/// Any failure aborts the request and no report is returned.
pub fn verify_attestation_evidence<S: VerificationService + ?Sized>(
    service: &S,
    quote: &[u8],
    pse_manifest: Option<&[u8]>,
    signing_key: &ServiceSigningKey,
    policy: &ReportPolicy,
) -> Result<AttestationReport> {
    if quote.is_empty() {
        return Err(AttestationError::InvalidArgument("quote is empty"));
    }

    let attributes = service
        .verify_quote(quote, pse_manifest)
        .map_err(AttestationError::VerificationFailed)?;

    let result = QuoteVerificationResult::from_attributes(attributes);
    debug!(
        report_id = %result.report_id,
        status = ?result.quote_status,
        "quote verified by service"
    );

    let mut report = AttestationReport::assemble(&result, policy)?;
    sign_report(&mut report, signing_key)?;

    Ok(report)
}

/// Signs the report's platform info blob with the service key.
///
/// The ecc context lives for this call only. On failure the signature field
/// must not be read.
pub fn sign_report(
    report: &mut AttestationReport,
    signing_key: &ServiceSigningKey,
) -> Result<()> {
    let ctx = EccContext::open(signing_key)?;
    report.info_blob.sign(&ctx)
}
