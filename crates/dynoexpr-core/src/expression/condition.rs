//! Condition expression compiler.
//!
//! Walks a [`Condition`] tree and produces the boolean expression string used
//! for `ConditionExpression`, `FilterExpression` and
//! `KeyConditionExpression`, registering every path and literal in the
//! shared [`SymbolTable`].
//!
//! Parenthesization follows the tree shape rather than operator precedence:
//! a chain of the same logical operator is emitted flat (`a AND b AND c`), a
//! nested group with the other operator is wrapped (`a AND (b OR c)`), and
//! the operand of `NOT` is always wrapped (`NOT (a)`).

use tracing::debug;

use super::ast::{Condition, FunctionName, LogicalOp, Operand};
use super::path::tokenize;
use super::symbols::SymbolTable;
use super::{CompiledExpression, ensure_within_limit};
use crate::error::{ExpressionError, ExpressionResult};

/// Compile `condition` against a fresh symbol table.
pub fn compile_condition(condition: &Condition) -> ExpressionResult<CompiledExpression> {
    let mut symbols = SymbolTable::new();
    let expression = compile_condition_with(condition, &mut symbols)?;
    Ok(CompiledExpression {
        expression,
        symbols,
    })
}

/// Compile `condition`, registering names and values in `symbols`.
///
/// Pass the same table to every compile of one request so placeholders are
/// shared across clauses. On error `symbols` is left unchanged.
pub fn compile_condition_with(
    condition: &Condition,
    symbols: &mut SymbolTable,
) -> ExpressionResult<String> {
    compile_condition_clause(condition, symbols, "condition")
}

pub(crate) fn compile_condition_clause(
    condition: &Condition,
    symbols: &mut SymbolTable,
    clause: &'static str,
) -> ExpressionResult<String> {
    symbols.transaction(|symbols| {
        let expression = ConditionCompiler {
            symbols: &mut *symbols,
        }
        .compile(transparent(condition))?;
        ensure_within_limit(clause, &expression, symbols.config())?;
        debug!(
            clause,
            length = expression.len(),
            names = symbols.name_count(),
            values = symbols.value_count(),
            "compiled condition expression"
        );
        Ok(expression)
    })
}

struct ConditionCompiler<'a> {
    symbols: &'a mut SymbolTable,
}

impl ConditionCompiler<'_> {
    fn compile(&mut self, condition: &Condition) -> ExpressionResult<String> {
        match condition {
            Condition::Compare { left, op, right } => {
                let left = self.operand(left)?;
                let right = self.operand(right)?;
                Ok(format!("{left} {op} {right}"))
            }
            Condition::Between {
                operand,
                lower,
                upper,
            } => {
                let operand = self.operand(operand)?;
                let lower = self.operand(lower)?;
                let upper = self.operand(upper)?;
                Ok(format!("{operand} BETWEEN {lower} AND {upper}"))
            }
            Condition::In { operand, values } => self.compile_in(operand, values),
            Condition::Logical { op, conditions } => self.compile_logical(*op, conditions),
            Condition::Not(inner) => Ok(format!("NOT ({})", self.compile(transparent(inner))?)),
            Condition::Exists { path, negate } => {
                let function = if *negate {
                    FunctionName::AttributeNotExists
                } else {
                    FunctionName::AttributeExists
                };
                Ok(format!("{function}({})", tokenize(path, self.symbols)?))
            }
            Condition::TypeCheck {
                path,
                attribute_type,
            } => {
                let target = tokenize(path, self.symbols)?;
                let code = self.symbols.add_value(attribute_type.code());
                Ok(format!("{}({target}, {code})", FunctionName::AttributeType))
            }
            Condition::BeginsWith { path, prefix } => {
                self.compile_function(FunctionName::BeginsWith, path, prefix)
            }
            Condition::Contains { path, needle } => {
                self.compile_function(FunctionName::Contains, path, needle)
            }
        }
    }

    fn operand(&mut self, operand: &Operand) -> ExpressionResult<String> {
        match operand {
            Operand::Path(path) => tokenize(path, self.symbols),
            Operand::Size(path) => Ok(format!(
                "{}({})",
                FunctionName::Size,
                tokenize(path, self.symbols)?
            )),
            Operand::Value(value) => Ok(self.symbols.add_value(value.clone())),
        }
    }

    fn compile_in(&mut self, operand: &Operand, values: &[Operand]) -> ExpressionResult<String> {
        let limit = self.symbols.config().max_in_operands;
        if values.is_empty() {
            return Err(ExpressionError::malformed(
                subject_label(operand),
                "IN requires at least one operand",
            ));
        }
        if values.len() > limit {
            return Err(ExpressionError::malformed(
                subject_label(operand),
                format!("IN accepts at most {limit} operands, got {}", values.len()),
            ));
        }

        let subject = self.operand(operand)?;
        let members = values
            .iter()
            .map(|v| self.operand(v))
            .collect::<ExpressionResult<Vec<_>>>()?;
        Ok(format!("{subject} IN ({})", members.join(", ")))
    }

    fn compile_function(
        &mut self,
        function: FunctionName,
        path: &str,
        argument: &Operand,
    ) -> ExpressionResult<String> {
        if matches!(argument, Operand::Size(_)) {
            return Err(ExpressionError::malformed(
                path,
                format!("{function} takes a value or an attribute, not {}", argument.describe()),
            ));
        }
        let target = tokenize(path, self.symbols)?;
        let argument = self.operand(argument)?;
        Ok(format!("{function}({target}, {argument})"))
    }

    fn compile_logical(
        &mut self,
        op: LogicalOp,
        conditions: &[Condition],
    ) -> ExpressionResult<String> {
        let mut members = Vec::with_capacity(conditions.len());
        flatten(op, conditions, &mut members)?;

        let mut parts = Vec::with_capacity(members.len());
        for member in members {
            let compiled = self.compile(member)?;
            // After flattening, any remaining group uses the other operator.
            if matches!(member, Condition::Logical { .. }) {
                parts.push(format!("({compiled})"));
            } else {
                parts.push(compiled);
            }
        }
        Ok(parts.join(&format!(" {op} ")))
    }
}

/// Collect the members of an `op` chain, splicing in nested groups that use
/// the same operator and looking through single-member groups.
fn flatten<'c>(
    op: LogicalOp,
    conditions: &'c [Condition],
    out: &mut Vec<&'c Condition>,
) -> ExpressionResult<()> {
    if conditions.is_empty() {
        return Err(ExpressionError::EmptyCondition);
    }
    for condition in conditions {
        match transparent(condition) {
            Condition::Logical {
                op: inner,
                conditions,
            } if *inner == op || conditions.is_empty() => flatten(op, conditions, out)?,
            other => out.push(other),
        }
    }
    Ok(())
}

/// Look through groups that wrap exactly one condition.
fn transparent(mut condition: &Condition) -> &Condition {
    while let Condition::Logical { conditions, .. } = condition {
        match conditions.as_slice() {
            [only] => condition = only,
            _ => break,
        }
    }
    condition
}

fn subject_label(operand: &Operand) -> String {
    match operand {
        Operand::Path(path) | Operand::Size(path) => path.clone(),
        Operand::Value(value) => value.to_string(),
    }
}
