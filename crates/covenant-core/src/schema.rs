//! # Schema Validation
//!
//! The minimal validator the contract layer depends on: check a JSON value
//! against a declared shape and produce either a normalized value or
//! field-level issues.
//!
//! Normalization covers three things. Numeric and boolean strings coerce
//! to their typed form (path and query values always arrive as strings),
//! declared defaults fill absent optional fields, and unknown object keys
//! are stripped from the output.
//!
//! ## Design Principles (SOLID)
//!
//! - **S**: Each kind checks one shape; issue bookkeeping stays in
//!   `validation`
//! - **O**: New kinds extend the enum without touching callers
//! - **D**: Callers see `parse` only, never the per-kind walkers

use crate::validation::Issue;
use serde_json::{Map, Value};

/// Declarative shape for one contract value
#[derive(Debug, Clone)]
pub struct Schema {
    kind: SchemaKind,
}

#[derive(Debug, Clone)]
enum SchemaKind {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Float,
    Boolean,
    Object {
        fields: Vec<Field>,
    },
    Array {
        item: Box<Schema>,
    },
}

/// One named member of an object schema
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    schema: Schema,
    required: bool,
    default: Option<Value>,
}

impl Field {
    /// A field that must be present
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
            default: None,
        }
    }

    /// A field that may be absent; absent means absent from the output too
    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
            default: None,
        }
    }

    /// Value substituted when the field is absent from the input
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

impl Schema {
    /// A string value
    #[must_use]
    pub fn string() -> Self {
        Self {
            kind: SchemaKind::String {
                min_len: None,
                max_len: None,
            },
        }
    }

    /// An integer value; numeric strings coerce
    #[must_use]
    pub fn integer() -> Self {
        Self {
            kind: SchemaKind::Integer {
                min: None,
                max: None,
            },
        }
    }

    /// A floating-point value; numeric strings coerce
    #[must_use]
    pub fn float() -> Self {
        Self { kind: SchemaKind::Float }
    }

    /// A boolean value; "true"/"false"/"1"/"0"/"yes"/"no" strings coerce
    #[must_use]
    pub fn boolean() -> Self {
        Self {
            kind: SchemaKind::Boolean,
        }
    }

    /// An object with the given fields; unknown keys are stripped
    #[must_use]
    pub fn object(fields: Vec<Field>) -> Self {
        Self {
            kind: SchemaKind::Object { fields },
        }
    }

    /// An array whose items all match `item`
    #[must_use]
    pub fn array(item: Self) -> Self {
        Self {
            kind: SchemaKind::Array {
                item: Box::new(item),
            },
        }
    }

    /// Minimum character count; only meaningful on string schemas
    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        if let SchemaKind::String { min_len, .. } = &mut self.kind {
            *min_len = Some(n);
        }
        self
    }

    /// Maximum character count; only meaningful on string schemas
    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        if let SchemaKind::String { max_len, .. } = &mut self.kind {
            *max_len = Some(n);
        }
        self
    }

    /// Inclusive lower bound; only meaningful on integer schemas
    #[must_use]
    pub fn min(mut self, n: i64) -> Self {
        if let SchemaKind::Integer { min, .. } = &mut self.kind {
            *min = Some(n);
        }
        self
    }

    /// Inclusive upper bound; only meaningful on integer schemas
    #[must_use]
    pub fn max(mut self, n: i64) -> Self {
        if let SchemaKind::Integer { max, .. } = &mut self.kind {
            *max = Some(n);
        }
        self
    }

    /// Validate `input`, returning the normalized value or every issue
    /// found.
    ///
    /// # Errors
    ///
    /// Returns the collected [`Issue`]s when the input does not satisfy
    /// this schema.
    pub fn parse(&self, input: &Value) -> Result<Value, Vec<Issue>> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let out = self.check(input, &mut path, &mut issues);
        if issues.is_empty() {
            Ok(out.unwrap_or(Value::Null))
        } else {
            Err(issues)
        }
    }

    /// Walk one value. Returns the normalized value, or `None` after
    /// recording at least one issue.
    fn check(
        &self,
        input: &Value,
        path: &mut Vec<String>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        match &self.kind {
            SchemaKind::String { min_len, max_len } => {
                let Value::String(s) = input else {
                    issues.push(Issue::new(path.clone(), "expected a string"));
                    return None;
                };
                let chars = s.chars().count();
                if let Some(min) = min_len {
                    if chars < *min {
                        issues.push(Issue::new(
                            path.clone(),
                            format!("must be at least {min} characters"),
                        ));
                        return None;
                    }
                }
                if let Some(max) = max_len {
                    if chars > *max {
                        issues.push(Issue::new(
                            path.clone(),
                            format!("must be at most {max} characters"),
                        ));
                        return None;
                    }
                }
                Some(Value::String(s.clone()))
            }
            SchemaKind::Integer { min, max } => {
                let parsed = match input {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.parse::<i64>().ok(),
                    _ => None,
                };
                let Some(i) = parsed else {
                    issues.push(Issue::new(path.clone(), "expected an integer"));
                    return None;
                };
                if let Some(lo) = min {
                    if i < *lo {
                        issues.push(Issue::new(path.clone(), format!("must be at least {lo}")));
                        return None;
                    }
                }
                if let Some(hi) = max {
                    if i > *hi {
                        issues.push(Issue::new(path.clone(), format!("must be at most {hi}")));
                        return None;
                    }
                }
                Some(Value::from(i))
            }
            SchemaKind::Float => {
                let parsed = match input {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.parse::<f64>().ok(),
                    _ => None,
                };
                let Some(f) = parsed else {
                    issues.push(Issue::new(path.clone(), "expected a number"));
                    return None;
                };
                Some(Value::from(f))
            }
            SchemaKind::Boolean => {
                let parsed = match input {
                    Value::Bool(b) => Some(*b),
                    Value::String(s) => match s.to_lowercase().as_str() {
                        "true" | "1" | "yes" => Some(true),
                        "false" | "0" | "no" => Some(false),
                        _ => None,
                    },
                    _ => None,
                };
                let Some(b) = parsed else {
                    issues.push(Issue::new(path.clone(), "expected a boolean"));
                    return None;
                };
                Some(Value::Bool(b))
            }
            SchemaKind::Object { fields } => {
                let Value::Object(map) = input else {
                    issues.push(Issue::new(path.clone(), "expected an object"));
                    return None;
                };
                let mut out = Map::new();
                for field in fields {
                    match map.get(&field.name) {
                        Some(value) => {
                            path.push(field.name.clone());
                            if let Some(parsed) = field.schema.check(value, path, issues) {
                                out.insert(field.name.clone(), parsed);
                            }
                            path.pop();
                        }
                        None => {
                            if let Some(default) = &field.default {
                                out.insert(field.name.clone(), default.clone());
                            } else if field.required {
                                let mut field_path = path.clone();
                                field_path.push(field.name.clone());
                                issues.push(Issue::new(field_path, "is required"));
                            }
                        }
                    }
                }
                // Unknown keys never reach `out`: stripped by construction.
                Some(Value::Object(out))
            }
            SchemaKind::Array { item } => {
                let Value::Array(items) = input else {
                    issues.push(Issue::new(path.clone(), "expected an array"));
                    return None;
                };
                let mut out = Vec::with_capacity(items.len());
                for (index, value) in items.iter().enumerate() {
                    path.push(index.to_string());
                    if let Some(parsed) = item.check(value, path, issues) {
                        out.push(parsed);
                    }
                    path.pop();
                }
                Some(Value::Array(out))
            }
        }
    }
}
