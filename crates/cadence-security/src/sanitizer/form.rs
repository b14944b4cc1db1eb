//! Recursive sanitization of JSON payloads and submitted forms.

use super::policy::{SanitizeOptions, Sanitizer};
use cadence_core::FieldKind;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-supplied sanitizer for a single form field.
pub type CustomSanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-field configuration for [`Sanitizer::sanitize_form_data`], keyed by field name.
pub type FieldConfigMap = HashMap<String, FieldConfig>;

/// How one form field is cleaned. A custom sanitizer takes precedence over `kind`.
#[derive(Clone, Default, Deserialize)]
pub struct FieldConfig {
    /// Field policy to apply.
    #[serde(default, rename = "type")]
    pub kind: Option<FieldKind>,
    /// Custom function applied to the field's text instead of a policy.
    #[serde(skip)]
    pub sanitizer: Option<CustomSanitizer>,
}

impl FieldConfig {
    /// Configure a field with a built-in policy.
    pub fn of_kind(kind: FieldKind) -> Self {
        Self {
            kind: Some(kind),
            sanitizer: None,
        }
    }

    /// Configure a field with a custom sanitizer.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            kind: None,
            sanitizer: Some(Arc::new(f)),
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("kind", &self.kind)
            .field("sanitizer", &self.sanitizer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Text form of any JSON value: `null` is empty, scalars use their display
/// form, arrays and objects their compact JSON.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

impl Sanitizer {
    /// Sanitize every string leaf and every key of `value`.
    ///
    /// Keys always go through the generic pipeline; keys that come out empty
    /// are dropped and on collision the later entry wins. Non-string scalars
    /// are preserved.
    pub fn sanitize_object(&self, value: &Value, options: &SanitizeOptions) -> Value {
        self.sanitize_object_at(value, options, 0)
    }

    fn sanitize_object_at(&self, value: &Value, options: &SanitizeOptions, depth: usize) -> Value {
        match value {
            Value::String(s) => Value::String(self.sanitize_text(s, options)),
            Value::Array(items) => {
                if self.too_deep(depth) {
                    return Value::Null;
                }
                Value::Array(
                    items
                        .iter()
                        .map(|item| self.sanitize_object_at(item, options, depth + 1))
                        .collect(),
                )
            }
            Value::Object(map) => {
                if self.too_deep(depth) {
                    return Value::Null;
                }
                let mut out = Map::with_capacity(map.len());
                for (key, item) in map {
                    let Some(key) = self.sanitize_key(key) else {
                        continue;
                    };
                    out.insert(key, self.sanitize_object_at(item, options, depth + 1));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    /// Apply the policy for `kind` to a JSON value.
    ///
    /// Scalars are coerced to text (`null` becomes `""`, except for URLs
    /// where it stays `null`); a rejected URL becomes `null`. Arrays are
    /// mapped element-wise and objects go through [`Sanitizer::sanitize_object`].
    pub fn sanitize_value(&self, kind: FieldKind, value: &Value) -> Value {
        self.sanitize_value_at(kind, value, 0)
    }

    fn sanitize_value_at(&self, kind: FieldKind, value: &Value, depth: usize) -> Value {
        match value {
            Value::Array(items) => {
                if self.too_deep(depth) {
                    return Value::Null;
                }
                Value::Array(
                    items
                        .iter()
                        .map(|item| self.sanitize_value_at(kind, item, depth + 1))
                        .collect(),
                )
            }
            Value::Object(_) => self.sanitize_object_at(value, &SanitizeOptions::default(), depth),
            Value::Null if kind == FieldKind::Url => Value::Null,
            scalar => match self.sanitize_field(kind, &coerce_text(scalar)) {
                Some(text) => Value::String(text),
                None => Value::Null,
            },
        }
    }

    /// Sanitize a submitted form field by field.
    ///
    /// Fields missing from `fields` (or configured with neither a kind nor a
    /// sanitizer) get the generic pipeline via [`Sanitizer::sanitize_object`].
    pub fn sanitize_form_data(
        &self,
        form: &Map<String, Value>,
        fields: &FieldConfigMap,
    ) -> Map<String, Value> {
        let mut out = Map::with_capacity(form.len());
        for (name, value) in form {
            let Some(key) = self.sanitize_key(name) else {
                continue;
            };
            let config = fields.get(name);
            let cleaned = match config {
                Some(FieldConfig {
                    sanitizer: Some(custom),
                    ..
                }) => match value {
                    Value::Array(_) | Value::Object(_) => {
                        self.sanitize_object(value, &SanitizeOptions::default())
                    }
                    scalar => Value::String(custom(&coerce_text(scalar))),
                },
                Some(FieldConfig {
                    kind: Some(kind), ..
                }) => self.sanitize_value(*kind, value),
                _ => self.sanitize_object(value, &SanitizeOptions::default()),
            };
            out.insert(key, cleaned);
        }
        out
    }

    fn sanitize_key(&self, key: &str) -> Option<String> {
        let cleaned = self.sanitize_text(key, &SanitizeOptions::default());
        if cleaned.is_empty() {
            debug!("Dropping key that is empty after sanitization");
            None
        } else {
            Some(cleaned)
        }
    }

    fn too_deep(&self, depth: usize) -> bool {
        if depth >= self.config().max_depth {
            warn!(
                max_depth = self.config().max_depth,
                "Payload nesting exceeds maximum depth, replacing with null"
            );
            true
        } else {
            false
        }
    }
}

/// [`Sanitizer::sanitize_object`] with the default limits.
pub fn sanitize_object(value: &Value, options: &SanitizeOptions) -> Value {
    Sanitizer::default().sanitize_object(value, options)
}

/// [`Sanitizer::sanitize_form_data`] with the default limits.
pub fn sanitize_form_data(form: &Map<String, Value>, fields: &FieldConfigMap) -> Map<String, Value> {
    Sanitizer::default().sanitize_form_data(form, fields)
}
