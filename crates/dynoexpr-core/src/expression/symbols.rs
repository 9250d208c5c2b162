//! Deduplicating symbol table for expression placeholders.
//!
//! Attribute names are never inlined into a compiled expression; every name
//! goes through [`SymbolTable::add_name`] so reserved words cannot collide with
//! the expression grammar. Literals go through [`SymbolTable::add_value`].
//! Both are deduplicated: the same name or the same value (by structural
//! equality) always maps to the same placeholder within one table.
//!
//! Placeholder counters only move forward. A lookup that resolves to an
//! existing entry does not consume a number.

use std::collections::HashMap;

use dynoexpr_model::AttributeValue;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CompilerConfig;

/// Name and value maps in the shape the wire protocol expects.
///
/// A map that has no entries is `None` and is left out of the serialized
/// request entirely, which is different from sending an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionAttributes {
    /// Placeholder to attribute name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,
    /// Placeholder to literal value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
}

/// Registry of name and value placeholders for one logical request.
///
/// Not thread-safe; a table belongs to a single request being built.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    config: CompilerConfig,
    names: HashMap<String, String>,
    names_by_placeholder: HashMap<String, String>,
    values: HashMap<AttributeValue, String>,
    values_by_placeholder: HashMap<String, AttributeValue>,
    name_counter: u64,
    value_counter: u64,
}

impl SymbolTable {
    /// Create an empty table with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given configuration.
    #[must_use]
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration compilers read limits from.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run `compile` against a scratch copy and keep its registrations only
    /// if it succeeds. A failed compile leaves the table as it was.
    pub(crate) fn transaction<T, E>(
        &mut self,
        compile: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scratch = self.clone();
        let out = compile(&mut scratch)?;
        *self = scratch;
        Ok(out)
    }

    /// Register an attribute name, or return its existing placeholder.
    ///
    /// Names made only of ASCII alphanumerics and `_` get the readable form
    /// `#name`. Anything else, or a readable form already claimed, falls back
    /// to `#n<k>`.
    pub fn add_name(&mut self, name: &str) -> String {
        if let Some(existing) = self.names.get(name) {
            return existing.clone();
        }

        let readable = format!("#{name}");
        let placeholder = if is_plain_name(name) && !self.names_by_placeholder.contains_key(&readable)
        {
            readable
        } else {
            loop {
                self.name_counter += 1;
                let candidate = format!("#n{}", self.name_counter);
                if !self.names_by_placeholder.contains_key(&candidate) {
                    break candidate;
                }
            }
        };

        trace!(attribute = name, placeholder = %placeholder, "allocated name placeholder");
        self.names.insert(name.to_owned(), placeholder.clone());
        self.names_by_placeholder
            .insert(placeholder.clone(), name.to_owned());
        placeholder
    }

    /// Register a literal value, or return the placeholder of an equal value.
    pub fn add_value(&mut self, value: impl Into<AttributeValue>) -> String {
        let value = value.into();
        if let Some(existing) = self.values.get(&value) {
            return existing.clone();
        }

        self.value_counter += 1;
        let placeholder = format!("{}{}", self.config.value_prefix, self.value_counter);

        trace!(placeholder = %placeholder, kind = value.type_descriptor(), "allocated value placeholder");
        self.values_by_placeholder
            .insert(placeholder.clone(), value.clone());
        self.values.insert(value, placeholder.clone());
        placeholder
    }

    /// Register a name and a value together.
    pub fn add(&mut self, name: &str, value: impl Into<AttributeValue>) -> (String, String) {
        (self.add_name(name), self.add_value(value))
    }

    /// Placeholder registered for `name`.
    #[must_use]
    pub fn name_placeholder(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Attribute name behind `placeholder`.
    #[must_use]
    pub fn name_for(&self, placeholder: &str) -> Option<&str> {
        self.names_by_placeholder.get(placeholder).map(String::as_str)
    }

    /// Placeholder registered for a value equal to `value`.
    #[must_use]
    pub fn value_placeholder(&self, value: &AttributeValue) -> Option<&str> {
        self.values.get(value).map(String::as_str)
    }

    /// Value behind `placeholder`.
    #[must_use]
    pub fn value_for(&self, placeholder: &str) -> Option<&AttributeValue> {
        self.values_by_placeholder.get(placeholder)
    }

    /// Returns `true` if `name` has been registered.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Returns `true` if a value equal to `value` has been registered.
    #[must_use]
    pub fn has_value(&self, value: &AttributeValue) -> bool {
        self.values.contains_key(value)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    /// Number of distinct values.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }

    /// Placeholder-to-name map. Empty if no names were registered.
    #[must_use]
    pub fn to_name_map(&self) -> HashMap<String, String> {
        self.names_by_placeholder.clone()
    }

    /// Placeholder-to-value map, or `None` if no values were registered.
    #[must_use]
    pub fn to_value_map(&self) -> Option<HashMap<String, AttributeValue>> {
        if self.values_by_placeholder.is_empty() {
            None
        } else {
            Some(self.values_by_placeholder.clone())
        }
    }

    /// Both maps, ready to attach to a request.
    #[must_use]
    pub fn to_wire(&self) -> ExpressionAttributes {
        ExpressionAttributes {
            expression_attribute_names: (!self.names_by_placeholder.is_empty())
                .then(|| self.to_name_map()),
            expression_attribute_values: self.to_value_map(),
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
