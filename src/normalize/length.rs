use crate::constants::FIELD_MAX_LENGTHS;
use crate::types::ClinicalTrial;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthViolation {
    pub field: &'static str,
    pub length: usize,
    pub max_length: usize,
}

/// Checks text fields against the storage column widths.
///
/// Purely observational: violations are logged and returned, the record is
/// never truncated or rejected.
pub struct FieldLengthValidator {
    max_lengths: HashMap<&'static str, usize>,
}

impl Default for FieldLengthValidator {
    fn default() -> Self {
        Self::new(FIELD_MAX_LENGTHS)
    }
}

impl FieldLengthValidator {
    pub fn new(max_lengths: &[(&'static str, usize)]) -> Self {
        Self {
            max_lengths: max_lengths.iter().copied().collect(),
        }
    }

    pub fn validate(&self, trial: &ClinicalTrial) -> Vec<LengthViolation> {
        let mut violations = Vec::new();
        for (field, value) in trial.text_fields() {
            let (Some(value), Some(&max_length)) = (value, self.max_lengths.get(field)) else {
                continue;
            };
            // Lengths are counted in characters, not bytes
            let length = value.chars().count();
            if length > max_length {
                warn!(
                    field = field,
                    value = %value,
                    length = length,
                    max_length = max_length,
                    "Value too long for field '{}' (length: {})",
                    field,
                    length
                );
                violations.push(LengthViolation {
                    field,
                    length,
                    max_length,
                });
            }
        }
        violations
    }
}
