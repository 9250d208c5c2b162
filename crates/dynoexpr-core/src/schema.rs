//! Table key schema and secondary index resolution.
//!
//! A [`TableSchema`] is the subset of a table description needed while
//! assembling requests: which attributes form the primary key, and which
//! secondary indexes exist with which keys. It deserializes from the
//! `Table` member of a `DescribeTable` response.

use dynoexpr_model::{GlobalSecondaryIndex, KeySchemaElement, KeyType, LocalSecondaryIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExpressionError, ExpressionResult};

/// Key layout of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSchema {
    /// The table name.
    pub table_name: String,
    /// The primary key.
    pub key_schema: Vec<KeySchemaElement>,
    /// Global secondary indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    /// Local secondary indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
}

/// Kind of a resolved secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// A global secondary index.
    Global,
    /// A local secondary index.
    Local,
}

/// A secondary index found in a [`TableSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIndex<'a> {
    /// The index name.
    pub name: &'a str,
    /// Global or local.
    pub kind: IndexKind,
    /// The index's own key schema.
    pub key_schema: &'a [KeySchemaElement],
}

impl TableSchema {
    /// Schema with a primary key and no secondary indexes.
    pub fn new(table_name: impl Into<String>, key_schema: Vec<KeySchemaElement>) -> Self {
        Self {
            table_name: table_name.into(),
            key_schema,
            global_secondary_indexes: Vec::new(),
            local_secondary_indexes: Vec::new(),
        }
    }

    /// Add a global secondary index.
    #[must_use]
    pub fn with_global_index(mut self, index: GlobalSecondaryIndex) -> Self {
        self.global_secondary_indexes.push(index);
        self
    }

    /// Add a local secondary index.
    #[must_use]
    pub fn with_local_index(mut self, index: LocalSecondaryIndex) -> Self {
        self.local_secondary_indexes.push(index);
        self
    }

    /// Partition key attribute of the table.
    #[must_use]
    pub fn partition_key(&self) -> Option<&str> {
        find_key(&self.key_schema, KeyType::Hash)
    }

    /// Sort key attribute of the table, if it has one.
    #[must_use]
    pub fn sort_key(&self) -> Option<&str> {
        find_key(&self.key_schema, KeyType::Range)
    }

    /// Look up a secondary index by name.
    ///
    /// Global indexes are searched before local ones; DynamoDB does not allow
    /// the two to share a name.
    pub fn resolve_index(&self, name: &str) -> ExpressionResult<ResolvedIndex<'_>> {
        let global = self
            .global_secondary_indexes
            .iter()
            .find(|gsi| gsi.index_name == name)
            .map(|gsi| ResolvedIndex {
                name: &gsi.index_name,
                kind: IndexKind::Global,
                key_schema: &gsi.key_schema,
            });
        let resolved = global.or_else(|| {
            self.local_secondary_indexes
                .iter()
                .find(|lsi| lsi.index_name == name)
                .map(|lsi| ResolvedIndex {
                    name: &lsi.index_name,
                    kind: IndexKind::Local,
                    key_schema: &lsi.key_schema,
                })
        });

        match resolved {
            Some(index) => {
                debug!(table = %self.table_name, index = name, kind = ?index.kind, "resolved index");
                Ok(index)
            }
            None => Err(ExpressionError::UnresolvableIndexReference {
                index: name.to_owned(),
                table: self.table_name.clone(),
            }),
        }
    }

    /// Key schema of the table, or of the named index.
    pub fn key_schema_for(&self, index: Option<&str>) -> ExpressionResult<&[KeySchemaElement]> {
        match index {
            Some(name) => Ok(self.resolve_index(name)?.key_schema),
            None => Ok(&self.key_schema),
        }
    }
}

fn find_key(key_schema: &[KeySchemaElement], key_type: KeyType) -> Option<&str> {
    key_schema
        .iter()
        .find(|k| k.key_type == key_type)
        .map(|k| k.attribute_name.as_str())
}
