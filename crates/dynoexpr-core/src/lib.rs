//! Compiler from typed, tagged expression trees to DynamoDB expression
//! strings with placeholder maps.
//!
//! Callers describe conditions and updates with [`expression::builder`],
//! compile them (alone, or several clauses of one request through an
//! [`ExpressionSet`]) and attach the result to a model input from
//! `dynoexpr-model`.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod expression;
pub mod request;
pub mod schema;

pub use config::CompilerConfig;
pub use error::{ExpressionError, ExpressionResult};
pub use request::{CompiledRequest, ExpressionSet};
pub use schema::{IndexKind, ResolvedIndex, TableSchema};
