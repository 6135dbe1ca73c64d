//! Payload parsing - decoded text to structured record
//!
//! The delimiter and required field count are a configured policy, not a
//! constant: labels in the field exist in two conventions. `comma5` is the
//! current one (5+ comma-delimited fields), `pipe4` the legacy one (exactly
//! 4 pipe-delimited fields still appear on older labels). In both, the
//! first four fields carry identifier, model number, destination code and
//! serial number; anything past the required count is ignored.

use crate::domain::{ParsedRecord, RejectReason};
use serde::Deserialize;

/// Number of characters kept when trimming a model number for display
const MODEL_TRIM_LEN: usize = 7;

/// Named payload conventions selectable in config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadConvention {
    /// Current: 5+ fields, comma-delimited
    Comma5,
    /// Legacy: 4 fields, pipe-delimited
    Pipe4,
}

impl Default for PayloadConvention {
    fn default() -> Self {
        PayloadConvention::Comma5
    }
}

/// Delimiter and minimum field count for one convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePolicy {
    pub delimiter: char,
    pub min_fields: usize,
}

impl From<PayloadConvention> for ParsePolicy {
    fn from(convention: PayloadConvention) -> Self {
        match convention {
            PayloadConvention::Comma5 => ParsePolicy { delimiter: ',', min_fields: 5 },
            PayloadConvention::Pipe4 => ParsePolicy { delimiter: '|', min_fields: 4 },
        }
    }
}

/// Pure parser from raw decoded text to a structured record
#[derive(Debug, Clone, Copy)]
pub struct PayloadParser {
    policy: ParsePolicy,
}

impl PayloadParser {
    pub fn new(convention: PayloadConvention) -> Self {
        Self { policy: convention.into() }
    }

    pub fn with_policy(policy: ParsePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    /// Parse one decoded payload into a record
    ///
    /// The raw text is trimmed, split on the policy delimiter, and each
    /// field trimmed again. Only field presence and non-emptiness are
    /// validated; field contents are taken as-is.
    pub fn parse(&self, raw: &str) -> Result<ParsedRecord, RejectReason> {
        let fields: Vec<&str> = raw.trim().split(self.policy.delimiter).map(str::trim).collect();

        if fields.len() < self.policy.min_fields {
            return Err(RejectReason::TooFewFields {
                got: fields.len(),
                min: self.policy.min_fields,
            });
        }

        // Every required field must be non-empty, including required
        // fields beyond the four that are consumed
        for (index, field) in fields.iter().take(self.policy.min_fields).enumerate() {
            if field.is_empty() {
                return Err(RejectReason::EmptyField { index });
            }
        }

        let model_number = fields[1].to_string();
        let trimmed_model_number = trim_model_number(&model_number);

        Ok(ParsedRecord {
            identifier: fields[0].to_string(),
            model_number,
            trimmed_model_number,
            destination_code: fields[2].to_string(),
            serial_number: fields[3].to_string(),
        })
    }
}

/// First 7 characters of the model number; shorter values pass through
/// unchanged. Counts characters, not bytes, so multi-byte input cannot
/// split a code point.
fn trim_model_number(model_number: &str) -> String {
    match model_number.char_indices().nth(MODEL_TRIM_LEN) {
        Some((byte_idx, _)) => model_number[..byte_idx].to_string(),
        None => model_number.to_string(),
    }
}
