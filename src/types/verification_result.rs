use anyhow::bail;
use serde_json::Value;
use tracing::warn;

use crate::{
    constants::{ATTR_EPID_PSEUDONYM, ATTR_ID, ATTR_QUOTE_STATUS, ATTR_TIMESTAMP},
    error::{AttestationError, Result},
};

use super::QuoteStatus;

/// Verdict returned by the verification service for one quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteVerificationResult {
    pub report_id: String,

    /// Opaque, passed through as received.
    pub timestamp: String,

    /// May be empty.
    pub epid_pseudonym: String,

    /// `None` until a recognized `isvEnclaveQuoteStatus` is seen.
    pub quote_status: Option<QuoteStatus>,

    /// Label of the last `isvEnclaveQuoteStatus` attribute, recognized or not.
    pub quote_status_label: Option<String>,
}

impl QuoteVerificationResult {
    /// Interprets the service's key/value attributes. Unknown keys are ignored.
    ///
    /// Every `isvEnclaveQuoteStatus` attribute overrides the previous one, so an
    /// unrecognized label after a valid one leaves the status unset.
    pub fn from_attributes<K, V>(attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut result = Self::default();

        for (key, value) in attributes {
            let value = value.as_ref();
            match key.as_ref() {
                ATTR_ID => result.report_id = value.to_owned(),
                ATTR_TIMESTAMP => result.timestamp = value.to_owned(),
                ATTR_EPID_PSEUDONYM => result.epid_pseudonym = value.to_owned(),
                ATTR_QUOTE_STATUS => {
                    result.quote_status = QuoteStatus::from_label(value);
                    if result.quote_status.is_none() {
                        warn!(label = value, "unrecognized quote status");
                    }
                    result.quote_status_label = Some(value.to_owned());
                }
                _ => {}
            }
        }

        result
    }

    /// The interpreted status, or `UnrecognizedStatus` when it never got set.
    pub fn status(&self) -> Result<QuoteStatus> {
        self.quote_status
            .ok_or_else(|| AttestationError::UnrecognizedStatus {
                label: self.quote_status_label.clone(),
            })
    }
}

/// Flattens an IAS JSON report body into key/value attributes, in body order.
///
/// Strings are taken verbatim, numbers and booleans in their JSON form. Nested
/// arrays, objects and nulls are skipped.
pub fn attributes_from_json(body: &str) -> anyhow::Result<Vec<(String, String)>> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Object(map) = value else {
        bail!("report body is not a JSON object");
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}
