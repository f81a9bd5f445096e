//! Label selector conversion and matching.
//!
//! Follows the API machinery rules: a missing selector selects nothing, an
//! empty selector selects everything, and every requirement must hold.

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

const MAX_NAME_LENGTH: usize = 63;
const MAX_PREFIX_LENGTH: usize = 253;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("valid label name regex")
});

static DNS_SUBDOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid dns subdomain regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("invalid label key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid label value {value:?} for key {key:?}")]
    InvalidValue { key: String, value: String },

    #[error("{0:?} is not a valid label selector operator")]
    UnsupportedOperator(String),

    #[error("values for key {key:?} must be non-empty with operator {operator}")]
    MissingValues { key: String, operator: String },

    #[error("values for key {key:?} must be empty with operator {operator}")]
    UnexpectedValues { key: String, operator: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    In { key: String, values: BTreeSet<String> },
    NotIn { key: String, values: BTreeSet<String> },
    Exists { key: String },
    DoesNotExist { key: String },
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::In { key, values } => labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::NotIn { key, values } => labels.get(key).is_none_or(|v| !values.contains(v)),
            Requirement::Exists { key } => labels.contains_key(key),
            Requirement::DoesNotExist { key } => !labels.contains_key(key),
        }
    }

    fn from_expression(expr: &LabelSelectorRequirement) -> Result<Self, SelectorError> {
        validate_key(&expr.key)?;
        let values: BTreeSet<String> = expr.values.iter().flatten().cloned().collect();
        let key = expr.key.clone();

        match expr.operator.as_str() {
            "In" | "NotIn" => {
                if values.is_empty() {
                    return Err(SelectorError::MissingValues {
                        key,
                        operator: expr.operator.clone(),
                    });
                }
                for value in &values {
                    validate_value(&key, value)?;
                }
                if expr.operator == "In" {
                    Ok(Requirement::In { key, values })
                } else {
                    Ok(Requirement::NotIn { key, values })
                }
            }
            "Exists" | "DoesNotExist" => {
                if !values.is_empty() {
                    return Err(SelectorError::UnexpectedValues {
                        key,
                        operator: expr.operator.clone(),
                    });
                }
                if expr.operator == "Exists" {
                    Ok(Requirement::Exists { key })
                } else {
                    Ok(Requirement::DoesNotExist { key })
                }
            }
            other => Err(SelectorError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// A validated selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Selects nothing.
    Nothing,
    /// Selects objects satisfying every requirement; empty selects everything.
    Requirements(Vec<Requirement>),
}

impl Selector {
    pub fn from_label_selector(selector: Option<&LabelSelector>) -> Result<Self, SelectorError> {
        let Some(selector) = selector else {
            return Ok(Selector::Nothing);
        };

        let mut requirements = Vec::new();
        for (key, value) in selector.match_labels.iter().flatten() {
            validate_key(key)?;
            validate_value(key, value)?;
            requirements.push(Requirement::In {
                key: key.clone(),
                values: BTreeSet::from([value.clone()]),
            });
        }
        for expr in selector.match_expressions.iter().flatten() {
            requirements.push(Requirement::from_expression(expr)?);
        }

        Ok(Selector::Requirements(requirements))
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Selector::Nothing => false,
            Selector::Requirements(requirements) => requirements.iter().all(|r| r.matches(labels)),
        }
    }

    /// True if at least one pod carries matching labels.
    pub fn matches_any_pod<'a>(&self, pods: impl IntoIterator<Item = &'a Pod>) -> bool {
        let empty = BTreeMap::new();
        pods.into_iter()
            .any(|pod| self.matches(pod.metadata.labels.as_ref().unwrap_or(&empty)))
    }
}

fn validate_key(key: &str) -> Result<(), SelectorError> {
    let invalid = |reason: &str| SelectorError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || prefix.len() > MAX_PREFIX_LENGTH {
                return Err(invalid("prefix must be between 1 and 253 characters"));
            }
            if !DNS_SUBDOMAIN_RE.is_match(prefix) {
                return Err(invalid("prefix must be a DNS subdomain"));
            }
            name
        }
        None => key,
    };

    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(invalid("name must be between 1 and 63 characters"));
    }
    if !NAME_RE.is_match(name) {
        return Err(invalid(
            "name must consist of alphanumerics, '-', '_' or '.', starting and ending with an alphanumeric",
        ));
    }
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<(), SelectorError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LENGTH || !NAME_RE.is_match(value) {
        return Err(SelectorError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
