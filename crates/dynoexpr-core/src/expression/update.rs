//! Update expression compiler.
//!
//! Each action is routed into one of the four clauses. Clauses are emitted
//! in the fixed order `SET`, `REMOVE`, `ADD`, `DELETE`, separated by a
//! space; entries inside one clause are comma-separated and keep the
//! insertion order of the [`Update`].

use std::collections::HashSet;

use dynoexpr_model::AttributeValue;
use tracing::debug;

use super::ast::{FunctionName, UpdateAction, UpdateClause, UpdateOperand};
use super::builder::Update;
use super::path::tokenize;
use super::symbols::SymbolTable;
use super::{CompiledExpression, ensure_within_limit};
use crate::error::{ExpressionError, ExpressionResult};

/// Compile `update` against a fresh symbol table.
pub fn compile_update(update: &Update) -> ExpressionResult<CompiledExpression> {
    let mut symbols = SymbolTable::new();
    let expression = compile_update_with(update, &mut symbols)?;
    Ok(CompiledExpression {
        expression,
        symbols,
    })
}

/// Compile `update`, registering names and values in `symbols`.
///
/// # Errors
///
/// [`ExpressionError::EmptyUpdate`] if there are no actions, and
/// [`ExpressionError::MalformedExpression`] for a path that appears twice or
/// a literal of the wrong kind for its action. On error `symbols` is left
/// unchanged.
pub fn compile_update_with(update: &Update, symbols: &mut SymbolTable) -> ExpressionResult<String> {
    symbols.transaction(|symbols| compile_update_into(update, symbols))
}

fn compile_update_into(update: &Update, symbols: &mut SymbolTable) -> ExpressionResult<String> {
    if update.is_empty() {
        return Err(ExpressionError::EmptyUpdate);
    }

    let mut seen = HashSet::with_capacity(update.len());
    for (path, _) in update.actions() {
        if !seen.insert(path.as_str()) {
            return Err(ExpressionError::malformed(
                path.as_str(),
                "attribute path appears in more than one update action",
            ));
        }
    }

    let mut clauses: [Vec<String>; 4] = Default::default();
    for (path, action) in update.actions() {
        check_literal(path, action)?;
        let entry = compile_action(path, action, symbols)?;
        clauses[clause_slot(action.clause())].push(entry);
    }

    let expression = UpdateClause::ALL
        .iter()
        .zip(&clauses)
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(clause, entries)| format!("{clause} {}", entries.join(", ")))
        .collect::<Vec<_>>()
        .join(" ");

    ensure_within_limit("update", &expression, symbols.config())?;
    debug!(
        actions = update.len(),
        length = expression.len(),
        names = symbols.name_count(),
        values = symbols.value_count(),
        "compiled update expression"
    );
    Ok(expression)
}

fn clause_slot(clause: UpdateClause) -> usize {
    match clause {
        UpdateClause::Set => 0,
        UpdateClause::Remove => 1,
        UpdateClause::Add => 2,
        UpdateClause::Delete => 3,
    }
}

fn compile_action(
    path: &str,
    action: &UpdateAction,
    symbols: &mut SymbolTable,
) -> ExpressionResult<String> {
    let target = tokenize(path, symbols)?;
    let entry = match action {
        UpdateAction::Set(operand) => format!("{target} = {}", operand_text(operand, symbols)?),
        UpdateAction::Add(operand) => {
            format!("{target} = {target} + {}", operand_text(operand, symbols)?)
        }
        UpdateAction::Subtract(operand) => {
            format!("{target} = {target} - {}", operand_text(operand, symbols)?)
        }
        UpdateAction::Append(operand) => format!(
            "{target} = {}({target}, {})",
            FunctionName::ListAppend,
            operand_text(operand, symbols)?
        ),
        UpdateAction::Prepend(operand) => format!(
            "{target} = {}({}, {target})",
            FunctionName::ListAppend,
            operand_text(operand, symbols)?
        ),
        UpdateAction::Remove => target,
        UpdateAction::AddToSet(operand) | UpdateAction::DeleteFromSet(operand) => {
            format!("{target} {}", operand_text(operand, symbols)?)
        }
    };
    Ok(entry)
}

fn operand_text(operand: &UpdateOperand, symbols: &mut SymbolTable) -> ExpressionResult<String> {
    match operand {
        UpdateOperand::Value(value) => Ok(symbols.add_value(value.clone())),
        UpdateOperand::Reference {
            path,
            default: None,
        } => tokenize(path, symbols),
        UpdateOperand::Reference {
            path,
            default: Some(default),
        } => {
            let reference = tokenize(path, symbols)?;
            let fallback = symbols.add_value(default.clone());
            Ok(format!(
                "{}({reference}, {fallback})",
                FunctionName::IfNotExists
            ))
        }
    }
}

/// Reject literals DynamoDB would refuse for the action at evaluation time.
/// References are not checked; their type is only known server-side.
fn check_literal(path: &str, action: &UpdateAction) -> ExpressionResult<()> {
    let (value, expected, ok) = match action {
        UpdateAction::Add(UpdateOperand::Value(v))
        | UpdateAction::Subtract(UpdateOperand::Value(v)) => {
            (v, "a number", matches!(v, AttributeValue::N(_)))
        }
        UpdateAction::Append(UpdateOperand::Value(v))
        | UpdateAction::Prepend(UpdateOperand::Value(v)) => {
            (v, "a list", matches!(v, AttributeValue::L(_)))
        }
        UpdateAction::AddToSet(UpdateOperand::Value(v)) => (
            v,
            "a set or a number",
            v.is_set() || matches!(v, AttributeValue::N(_)),
        ),
        UpdateAction::DeleteFromSet(UpdateOperand::Value(v)) => (v, "a set", v.is_set()),
        _ => return Ok(()),
    };
    if ok {
        Ok(())
    } else {
        Err(ExpressionError::malformed(
            path,
            format!("expected {expected}, got {}", value.type_descriptor()),
        ))
    }
}
