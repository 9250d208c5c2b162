//! DynamoDB expression compilation.
//!
//! The pipeline runs in the opposite direction of a parser: typed nodes in,
//! expression strings and placeholder maps out.
//!
//! 1. **Building**: describe intent with [`builder`] functions, [`Template`]s
//!    and [`Update`]s.
//! 2. **Compiling**: walk the nodes, tokenize every path and bind every
//!    literal through a shared [`SymbolTable`].
//! 3. **Exporting**: turn the table into the `ExpressionAttributeNames` /
//!    `ExpressionAttributeValues` maps of a request.

pub mod ast;
pub mod builder;
pub mod condition;
pub mod path;
pub mod projection;
pub mod symbols;
pub mod update;

pub use ast::{
    AttributePath, AttributeType, CompareOp, Condition, FunctionName, LogicalOp, Operand,
    PathElement, UpdateAction, UpdateClause, UpdateOperand, collect_paths,
};
pub use builder::{Predicate, Template, Update};
pub use condition::{compile_condition, compile_condition_with};
pub use path::{parse_path, tokenize};
pub use projection::{compile_projection, compile_projection_with};
pub use symbols::{ExpressionAttributes, SymbolTable};
pub use update::{compile_update, compile_update_with};

use crate::config::CompilerConfig;
use crate::error::{ExpressionError, ExpressionResult};

/// An expression string together with the table that resolves its
/// placeholders.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    /// The expression text.
    pub expression: String,
    /// Names and values referenced by `expression`.
    pub symbols: SymbolTable,
}

impl CompiledExpression {
    /// The placeholder maps in wire form.
    #[must_use]
    pub fn attributes(&self) -> ExpressionAttributes {
        self.symbols.to_wire()
    }
}

pub(crate) fn ensure_within_limit(
    clause: &'static str,
    expression: &str,
    config: &CompilerConfig,
) -> ExpressionResult<()> {
    if expression.len() > config.max_expression_bytes {
        return Err(ExpressionError::ExpressionTooLong {
            clause,
            length: expression.len(),
            limit: config.max_expression_bytes,
        });
    }
    Ok(())
}
