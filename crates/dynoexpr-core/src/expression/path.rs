//! Attribute path tokenizer.
//!
//! Splits a dotted/indexed path such as `profile.tags[0]` into named segments
//! and list indexes, registers every named segment in the symbol table and
//! reassembles the path from placeholders (`#profile.#tags[0]`). Indexes stay
//! literal integers; DynamoDB permits them inline.

use super::ast::{AttributePath, PathElement};
use super::symbols::SymbolTable;
use crate::error::{ExpressionError, ExpressionResult};

/// Parse a raw path string.
///
/// The path is split on `.` first; each segment is then a name followed by
/// zero or more `[N]` suffixes.
pub fn parse_path(raw: &str) -> ExpressionResult<AttributePath> {
    if raw.is_empty() {
        return Err(ExpressionError::malformed(raw, "attribute path is empty"));
    }

    let mut elements = Vec::new();
    for segment in raw.split('.') {
        let (name, mut rest) = segment.find('[').map_or((segment, ""), |i| segment.split_at(i));
        if name.is_empty() {
            return Err(ExpressionError::malformed(
                raw,
                "every path segment must start with an attribute name",
            ));
        }
        if name.contains(']') {
            return Err(ExpressionError::malformed(raw, "unbalanced ']' in path"));
        }
        elements.push(PathElement::Attribute(name.to_owned()));

        while !rest.is_empty() {
            let Some(body) = rest.strip_prefix('[') else {
                return Err(ExpressionError::malformed(
                    raw,
                    "unexpected characters after list index",
                ));
            };
            let Some(close) = body.find(']') else {
                return Err(ExpressionError::malformed(raw, "unterminated list index"));
            };
            let digits = &body[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ExpressionError::malformed(
                    raw,
                    "list index must be a non-negative integer",
                ));
            }
            let index = digits
                .parse::<usize>()
                .map_err(|_| ExpressionError::malformed(raw, "list index is out of range"))?;
            elements.push(PathElement::Index(index));
            rest = &body[close + 1..];
        }
    }

    Ok(AttributePath { elements })
}

/// Tokenize `raw` into its placeholder form, registering each named segment.
pub fn tokenize(raw: &str, symbols: &mut SymbolTable) -> ExpressionResult<String> {
    let path = parse_path(raw)?;
    let mut out = String::with_capacity(raw.len() + path.elements.len() * 2);
    for (i, element) in path.elements.iter().enumerate() {
        match element {
            PathElement::Attribute(name) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&symbols.add_name(name));
            }
            PathElement::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    Ok(out)
}
