//! Wire-level model types for the dynoexpr expression compiler.
//!
//! This crate holds the literal value type bound to expression placeholders,
//! the request inputs that carry compiled expressions, and the table/index
//! shapes needed to resolve a named index. The types are hand-written since
//! DynamoDB's JSON protocol makes serde derives trivial.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod input;
pub mod types;

pub use attribute_value::AttributeValue;
pub use input::{
    DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
pub use types::{
    GlobalSecondaryIndex, KeySchemaElement, KeyType, LocalSecondaryIndex, Projection,
    ProjectionType, ReturnValue, Select,
};
