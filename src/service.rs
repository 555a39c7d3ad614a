use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::{
    constants::{
        ATTR_EPID_PSEUDONYM, ATTR_ID, ATTR_QUOTE_STATUS, ATTR_TIMESTAMP, IAS_TIMESTAMP_FORMAT,
    },
    types::QuoteStatus,
};

/// Remote service that inspects a quote and answers with key/value attributes.
///
/// An `Err` means the service reported failure; there is no partial answer.
pub trait VerificationService {
    fn verify_quote(
        &self,
        quote: &[u8],
        pse_manifest: Option<&[u8]>,
    ) -> anyhow::Result<Vec<(String, String)>>;
}

impl<F> VerificationService for F
where
    F: Fn(&[u8], Option<&[u8]>) -> anyhow::Result<Vec<(String, String)>>,
{
    fn verify_quote(
        &self,
        quote: &[u8],
        pse_manifest: Option<&[u8]>,
    ) -> anyhow::Result<Vec<(String, String)>> {
        self(quote, pse_manifest)
    }
}

/// Stand-in for IAS that accepts every quote without looking at it.
///
/// Report ids count up from 1; the timestamp is the current UTC time.
#[derive(Debug)]
pub struct SimulatedVerificationService {
    next_id: AtomicU64,
    quote_status: QuoteStatus,
}

impl SimulatedVerificationService {
    pub fn new(quote_status: QuoteStatus) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            quote_status,
        }
    }
}

impl Default for SimulatedVerificationService {
    fn default() -> Self {
        Self::new(QuoteStatus::Ok)
    }
}

impl VerificationService for SimulatedVerificationService {
    fn verify_quote(
        &self,
        _quote: &[u8],
        _pse_manifest: Option<&[u8]>,
    ) -> anyhow::Result<Vec<(String, String)>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(vec![
            (ATTR_ID.into(), id.to_string()),
            (
                ATTR_TIMESTAMP.into(),
                Utc::now().format(IAS_TIMESTAMP_FORMAT).to_string(),
            ),
            (ATTR_EPID_PSEUDONYM.into(), String::new()),
            (ATTR_QUOTE_STATUS.into(), self.quote_status.label().into()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn simulated_service_counts_report_ids() {
        let service = SimulatedVerificationService::new(QuoteStatus::GroupOutOfDate);
        let first = service.verify_quote(b"quote", None).unwrap();
        let second = service.verify_quote(b"quote", None).unwrap();

        assert_eq!(first[0], ("id".to_string(), "1".to_string()));
        assert_eq!(second[0], ("id".to_string(), "2".to_string()));
        assert_eq!(
            first[3],
            ("isvEnclaveQuoteStatus".to_string(), "GROUP_OUT_OF_DATE".to_string())
        );
    }

    #[test]
    fn simulated_timestamp_uses_ias_format() {
        let attributes = SimulatedVerificationService::default()
            .verify_quote(b"quote", None)
            .unwrap();
        let (key, timestamp) = &attributes[1];
        assert_eq!(key, "timestamp");
        NaiveDateTime::parse_from_str(timestamp, IAS_TIMESTAMP_FORMAT).unwrap();
    }

    #[test]
    fn closures_act_as_services() {
        let service = |quote: &[u8], manifest: Option<&[u8]>| {
            anyhow::Ok(vec![
                ("quoteLen".to_string(), quote.len().to_string()),
                ("manifest".to_string(), manifest.is_some().to_string()),
            ])
        };
        let attributes = service.verify_quote(b"abc", Some(&b"m"[..])).unwrap();
        assert_eq!(attributes[0].1, "3");
        assert_eq!(attributes[1].1, "true");
    }
}
