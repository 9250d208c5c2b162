//! Projection expression compiler.

use tracing::debug;

use super::path::tokenize;
use super::symbols::SymbolTable;
use super::{CompiledExpression, ensure_within_limit};
use crate::error::ExpressionResult;

/// Compile a list of attribute paths against a fresh symbol table.
pub fn compile_projection<I, S>(paths: I) -> ExpressionResult<CompiledExpression>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut symbols = SymbolTable::new();
    let expression = compile_projection_with(paths, &mut symbols)?;
    Ok(CompiledExpression {
        expression,
        symbols,
    })
}

/// Compile a list of attribute paths into `#a, #b.#c`.
///
/// An empty list yields an empty string, which callers treat as "no
/// projection". A path listed more than once is emitted once, at its first
/// position, since DynamoDB rejects overlapping projection paths. On error
/// `symbols` is left unchanged.
pub fn compile_projection_with<I, S>(paths: I, symbols: &mut SymbolTable) -> ExpressionResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols.transaction(|symbols| {
        let mut tokens: Vec<String> = Vec::new();
        for path in paths {
            let token = tokenize(path.as_ref(), symbols)?;
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        let expression = tokens.join(", ");
        ensure_within_limit("projection", &expression, symbols.config())?;
        debug!(
            paths = tokens.len(),
            length = expression.len(),
            "compiled projection expression"
        );
        Ok(expression)
    })
}
