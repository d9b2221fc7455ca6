//! Declarative field schemas and pure validation.
//!
//! Validation runs before any remote call: a submission only reaches the
//! identity provider when every field passes. Constraints are evaluated per
//! field in the order required → format → length, and each field reports at
//! most one message (the first violated constraint).

use regex::Regex;
use std::collections::BTreeMap;

use super::types::{FieldErrors, FlowKind};

/// Semantic type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Password,
    Code,
}

/// A single declarative constraint with its user-facing message.
#[derive(Clone, Debug)]
pub enum Constraint {
    Required { message: &'static str },
    EmailFormat { message: &'static str },
    Numeric { message: &'static str },
    MinLength { min: usize, message: &'static str },
    ExactLength { len: usize, message: &'static str },
}

impl Constraint {
    /// Evaluation order: required (0) → format (1) → length (2).
    fn priority(&self) -> u8 {
        match self {
            Self::Required { .. } => 0,
            Self::EmailFormat { .. } | Self::Numeric { .. } => 1,
            Self::MinLength { .. } | Self::ExactLength { .. } => 2,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Required { message }
            | Self::EmailFormat { message }
            | Self::Numeric { message }
            | Self::MinLength { message, .. }
            | Self::ExactLength { message, .. } => message,
        }
    }

    fn violated_by(&self, value: &str) -> bool {
        match self {
            Self::Required { .. } => value.is_empty(),
            Self::EmailFormat { .. } => !valid_email(value),
            Self::Numeric { .. } => !value.chars().all(|c| c.is_ascii_digit()),
            Self::MinLength { min, .. } => value.chars().count() < *min,
            Self::ExactLength { len, .. } => value.chars().count() != *len,
        }
    }
}

/// One named field with its constraints.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub constraints: Vec<Constraint>,
}

/// Ordered set of fields for one flow.
#[derive(Clone, Debug)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

/// A validated field value, normalized where the semantic type calls for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedValue {
    Email(String),
    Password(String),
    Code(String),
}

impl TypedValue {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(value) | Self::Password(value) | Self::Code(value) => value,
        }
    }
}

/// Validated values keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct TypedValues(BTreeMap<String, TypedValue>);

impl TypedValues {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0.get(name)
    }

    /// Raw string of a validated field, or `""` if the field is absent.
    /// Every field a flow references exists in its schema, so controllers
    /// only hit the empty case on a schema bug.
    #[must_use]
    pub fn str_value(&self, name: &str) -> &str {
        self.0.get(name).map_or("", TypedValue::as_str)
    }
}

impl FieldSchema {
    /// Schema for the given flow.
    #[must_use]
    pub fn for_flow(flow: FlowKind) -> Self {
        match flow {
            FlowKind::SignIn | FlowKind::SignUp => Self {
                fields: vec![
                    FieldSpec {
                        name: "email",
                        kind: FieldKind::Email,
                        constraints: vec![
                            Constraint::Required {
                                message: "Email is required",
                            },
                            Constraint::EmailFormat {
                                message: "Invalid email",
                            },
                        ],
                    },
                    FieldSpec {
                        name: "password",
                        kind: FieldKind::Password,
                        constraints: vec![
                            Constraint::Required {
                                message: "Password is required",
                            },
                            Constraint::MinLength {
                                min: 8,
                                message: "Password should be at least 8 characters long",
                            },
                        ],
                    },
                ],
            },
            FlowKind::Verify => Self {
                fields: vec![FieldSpec {
                    name: "code",
                    kind: FieldKind::Code,
                    constraints: vec![
                        Constraint::Required {
                            message: "Code is required",
                        },
                        Constraint::Numeric {
                            message: "Code should be 6 digits",
                        },
                        Constraint::ExactLength {
                            len: 6,
                            message: "Code should be 6 digits",
                        },
                    ],
                }],
            },
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate raw string-keyed values against the schema.
    ///
    /// Pure and deterministic; safe to call repeatedly. Fields are evaluated
    /// in schema order, all violated constraints are collected, and each
    /// failing field reports the first violation in priority order.
    ///
    /// # Errors
    /// Returns the full field → message mapping when any field fails.
    pub fn validate(&self, raw: &BTreeMap<String, String>) -> Result<TypedValues, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut values = TypedValues::default();

        for field in &self.fields {
            let value = normalize(field.kind, raw.get(field.name).map_or("", String::as_str));

            let mut violated: Vec<&Constraint> = field
                .constraints
                .iter()
                .filter(|constraint| constraint.violated_by(&value))
                .collect();
            violated.sort_by_key(|constraint| constraint.priority());

            if let Some(first) = violated.first() {
                errors.insert(field.name.to_string(), first.message().to_string());
                continue;
            }

            let typed = match field.kind {
                FieldKind::Email => TypedValue::Email(value),
                FieldKind::Password => TypedValue::Password(value),
                FieldKind::Code => TypedValue::Code(value),
            };
            values.0.insert(field.name.to_string(), typed);
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }
}

/// Normalize a raw value for its semantic type before constraint checks.
/// Emails are trimmed and lowercased; codes are trimmed; passwords are
/// taken verbatim.
fn normalize(kind: FieldKind, raw: &str) -> String {
    match kind {
        FieldKind::Email => raw.trim().to_lowercase(),
        FieldKind::Code => raw.trim().to_string(),
        FieldKind::Password => raw.to_string(),
    }
}

/// Basic email format check on already-normalized input.
fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}
