use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field of a scenario that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid scenario input ({})", join_fields(.0))]
    Invalid(Vec<FieldError>),
    #[error("scenario {scenario}: {source}")]
    Scenario {
        scenario: char,
        #[source]
        source: Box<InputError>,
    },
}

impl InputError {
    pub fn fields(&self) -> Vec<FieldError> {
        match self {
            InputError::Invalid(fields) => fields.clone(),
            InputError::Scenario { scenario, source } => source
                .fields()
                .into_iter()
                .map(|mut err| {
                    err.message = format!("scenario {scenario}: {}", err.message);
                    err
                })
                .collect(),
        }
    }

    pub fn in_scenario(self, scenario: char) -> Self {
        InputError::Scenario {
            scenario,
            source: Box::new(self),
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field() {
        let err = InputError::Invalid(vec![
            FieldError::new("initialCapital", "must be >= 0"),
            FieldError::new("annualRate", "must be > 0"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("initialCapital: must be >= 0"));
        assert!(msg.contains("annualRate: must be > 0"));
    }

    #[test]
    fn scenario_wrapper_prefixes_field_messages() {
        let err = InputError::Invalid(vec![FieldError::new("years", "must be > 0")]).in_scenario('B');
        assert!(err.to_string().starts_with("scenario B:"));
        let fields = err.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "years");
        assert_eq!(fields[0].message, "scenario B: must be > 0");
    }
}
