//! Request assembly.
//!
//! An [`ExpressionSet`] collects every expression clause of one request and
//! compiles them through a single [`SymbolTable`], so an attribute or literal
//! used by two clauses gets one placeholder. The `apply_to_*` methods then
//! copy the compiled clauses and placeholder maps onto the model input of
//! the target operation, refusing clauses that operation cannot carry.

use std::collections::HashSet;

use dynoexpr_model::{
    DeleteItemInput, GetItemInput, KeySchemaElement, KeyType, PutItemInput, QueryInput,
    ScanInput, UpdateItemInput,
};
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{ExpressionError, ExpressionResult};
use crate::expression::ast::{CompareOp, Condition, LogicalOp, Operand, collect_paths};
use crate::expression::builder::Update;
use crate::expression::condition::compile_condition_clause;
use crate::expression::projection::compile_projection_with;
use crate::expression::symbols::{ExpressionAttributes, SymbolTable};
use crate::expression::update::compile_update_with;
use crate::schema::TableSchema;

/// Expression clauses a request can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    KeyCondition,
    Filter,
    Condition,
    Update,
    Projection,
}

impl Clause {
    fn label(self) -> &'static str {
        match self {
            Self::KeyCondition => "key condition",
            Self::Filter => "filter",
            Self::Condition => "condition",
            Self::Update => "update",
            Self::Projection => "projection",
        }
    }
}

/// The clauses of one request, not yet compiled.
///
/// Setting a condition clause twice ANDs the two conditions; setting the
/// update twice appends the second update's actions; projection paths
/// accumulate.
#[derive(Debug, Clone, Default)]
pub struct ExpressionSet {
    config: CompilerConfig,
    key_condition: Option<Condition>,
    filter: Option<Condition>,
    condition: Option<Condition>,
    update: Option<Update>,
    projection: Vec<String>,
}

/// Compiled clauses sharing one symbol table.
#[derive(Debug, Clone)]
pub struct CompiledRequest {
    /// `KeyConditionExpression`.
    pub key_condition: Option<String>,
    /// `FilterExpression`.
    pub filter: Option<String>,
    /// `ConditionExpression`.
    pub condition: Option<String>,
    /// `UpdateExpression`.
    pub update: Option<String>,
    /// `ProjectionExpression`.
    pub projection: Option<String>,
    /// Names and values referenced by every clause above.
    pub symbols: SymbolTable,
}

impl CompiledRequest {
    /// The placeholder maps in wire form.
    #[must_use]
    pub fn attributes(&self) -> ExpressionAttributes {
        self.symbols.to_wire()
    }
}

impl ExpressionSet {
    /// Create an empty set with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set whose symbol table uses `config`.
    #[must_use]
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set or extend the key condition.
    #[must_use]
    pub fn key_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.key_condition = Some(and_with(self.key_condition.take(), condition.into()));
        self
    }

    /// Set or extend the filter.
    #[must_use]
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.filter = Some(and_with(self.filter.take(), condition.into()));
        self
    }

    /// Set or extend the write condition.
    #[must_use]
    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(and_with(self.condition.take(), condition.into()));
        self
    }

    /// Set or extend the update.
    #[must_use]
    pub fn update(mut self, update: Update) -> Self {
        self.update = Some(match self.update.take() {
            Some(existing) => existing.into_iter().chain(update).collect(),
            None => update,
        });
        self
    }

    /// Add attribute paths to the projection.
    #[must_use]
    pub fn projection<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Compile every clause through one symbol table.
    ///
    /// Clauses are compiled in a fixed order (key condition, filter,
    /// condition, update, projection), so placeholder numbering does not
    /// depend on the order the clauses were set.
    pub fn compile(&self) -> ExpressionResult<CompiledRequest> {
        let mut symbols = SymbolTable::with_config(self.config.clone());

        let key_condition = self
            .key_condition
            .as_ref()
            .map(|c| compile_condition_clause(c, &mut symbols, Clause::KeyCondition.label()))
            .transpose()?;
        let filter = self
            .filter
            .as_ref()
            .map(|c| compile_condition_clause(c, &mut symbols, Clause::Filter.label()))
            .transpose()?;
        let condition = self
            .condition
            .as_ref()
            .map(|c| compile_condition_clause(c, &mut symbols, Clause::Condition.label()))
            .transpose()?;
        let update = self
            .update
            .as_ref()
            .map(|u| compile_update_with(u, &mut symbols))
            .transpose()?;
        let projection = if self.projection.is_empty() {
            None
        } else {
            Some(compile_projection_with(&self.projection, &mut symbols)?)
        };

        debug!(
            names = symbols.name_count(),
            values = symbols.value_count(),
            "compiled request expressions"
        );
        Ok(CompiledRequest {
            key_condition,
            filter,
            condition,
            update,
            projection,
            symbols,
        })
    }

    /// Compile and return only the combined placeholder maps.
    pub fn attributes(&self) -> ExpressionResult<ExpressionAttributes> {
        Ok(self.compile()?.attributes())
    }

    /// Attach the projection to a `GetItem` request.
    pub fn apply_to_get(&self, input: &mut GetItemInput) -> ExpressionResult<()> {
        self.ensure_supported("GetItem", &[Clause::Projection])?;
        let compiled = self.compile()?;
        input.projection_expression = compiled.projection;
        input.expression_attribute_names = compiled.symbols.to_name_map();
        Ok(())
    }

    /// Attach the write condition to a `PutItem` request.
    pub fn apply_to_put(&self, input: &mut PutItemInput) -> ExpressionResult<()> {
        self.ensure_supported("PutItem", &[Clause::Condition])?;
        let compiled = self.compile()?;
        input.expression_attribute_names = compiled.symbols.to_name_map();
        input.expression_attribute_values = compiled.symbols.to_value_map().unwrap_or_default();
        input.condition_expression = compiled.condition;
        Ok(())
    }

    /// Attach the update and write condition to an `UpdateItem` request.
    ///
    /// # Errors
    ///
    /// [`ExpressionError::EmptyUpdate`] if no update was set.
    pub fn apply_to_update(&self, input: &mut UpdateItemInput) -> ExpressionResult<()> {
        self.ensure_supported("UpdateItem", &[Clause::Update, Clause::Condition])?;
        if self.update.is_none() {
            return Err(ExpressionError::EmptyUpdate);
        }
        let compiled = self.compile()?;
        input.expression_attribute_names = compiled.symbols.to_name_map();
        input.expression_attribute_values = compiled.symbols.to_value_map().unwrap_or_default();
        input.update_expression = compiled.update;
        input.condition_expression = compiled.condition;
        Ok(())
    }

    /// Attach the write condition to a `DeleteItem` request.
    pub fn apply_to_delete(&self, input: &mut DeleteItemInput) -> ExpressionResult<()> {
        self.ensure_supported("DeleteItem", &[Clause::Condition])?;
        let compiled = self.compile()?;
        input.expression_attribute_names = compiled.symbols.to_name_map();
        input.expression_attribute_values = compiled.symbols.to_value_map().unwrap_or_default();
        input.condition_expression = compiled.condition;
        Ok(())
    }

    /// Attach key condition, filter and projection to a `Query` request
    /// against `schema`, or against its secondary index `index`.
    ///
    /// A key condition is required. It is an `AND` of terms that each compare
    /// one key attribute of the target with literal values: the partition key
    /// with `=`, the sort key with `=`, `<`, `<=`, `>`, `>=`, `BETWEEN` or
    /// `begins_with`. The filter must not touch key attributes.
    pub fn apply_to_query(
        &self,
        input: &mut QueryInput,
        schema: &TableSchema,
        index: Option<&str>,
    ) -> ExpressionResult<()> {
        self.ensure_supported(
            "Query",
            &[Clause::KeyCondition, Clause::Filter, Clause::Projection],
        )?;
        let key_schema = schema.key_schema_for(index)?;
        match &self.key_condition {
            Some(key_condition) => check_key_condition(key_condition, key_schema)?,
            None => {
                let partition =
                    find_partition_key(key_schema).unwrap_or(schema.table_name.as_str());
                return Err(ExpressionError::malformed(
                    partition,
                    "query requires a key condition on the partition key",
                ));
            }
        }
        if let Some(filter) = &self.filter {
            check_filter(filter, key_schema)?;
        }

        let compiled = self.compile()?;
        input.table_name.clone_from(&schema.table_name);
        input.index_name = index.map(str::to_owned);
        input.expression_attribute_names = compiled.symbols.to_name_map();
        input.expression_attribute_values = compiled.symbols.to_value_map().unwrap_or_default();
        input.key_condition_expression = compiled.key_condition;
        input.filter_expression = compiled.filter;
        input.projection_expression = compiled.projection;
        Ok(())
    }

    /// Attach filter and projection to a `Scan` request against `schema`, or
    /// against its secondary index `index`.
    pub fn apply_to_scan(
        &self,
        input: &mut ScanInput,
        schema: &TableSchema,
        index: Option<&str>,
    ) -> ExpressionResult<()> {
        self.ensure_supported("Scan", &[Clause::Filter, Clause::Projection])?;
        if let Some(name) = index {
            schema.resolve_index(name)?;
        }

        let compiled = self.compile()?;
        input.table_name.clone_from(&schema.table_name);
        input.index_name = index.map(str::to_owned);
        input.expression_attribute_names = compiled.symbols.to_name_map();
        input.expression_attribute_values = compiled.symbols.to_value_map().unwrap_or_default();
        input.filter_expression = compiled.filter;
        input.projection_expression = compiled.projection;
        Ok(())
    }

    fn present(&self) -> impl Iterator<Item = Clause> + '_ {
        [
            (Clause::KeyCondition, self.key_condition.is_some()),
            (Clause::Filter, self.filter.is_some()),
            (Clause::Condition, self.condition.is_some()),
            (Clause::Update, self.update.is_some()),
            (Clause::Projection, !self.projection.is_empty()),
        ]
        .into_iter()
        .filter_map(|(clause, set)| set.then_some(clause))
    }

    fn ensure_supported(&self, operation: &'static str, allowed: &[Clause]) -> ExpressionResult<()> {
        match self.present().find(|clause| !allowed.contains(clause)) {
            Some(clause) => Err(ExpressionError::UnsupportedClause {
                clause: clause.label(),
                operation,
            }),
            None => Ok(()),
        }
    }
}

fn and_with(existing: Option<Condition>, next: Condition) -> Condition {
    match existing {
        Some(existing) => existing & next,
        None => next,
    }
}

fn check_key_condition(condition: &Condition, key_schema: &[KeySchemaElement]) -> ExpressionResult<()> {
    let partition = find_partition_key(key_schema);
    let mut terms = Vec::new();
    key_condition_terms(condition, &mut terms)?;

    let mut constrained: HashSet<&str> = HashSet::with_capacity(terms.len());
    for term in terms {
        let (path, equality) = key_term(term)?;
        if !key_schema.iter().any(|k| k.attribute_name == path) {
            return Err(ExpressionError::malformed(
                path,
                "key condition may only reference key attributes",
            ));
        }
        if !constrained.insert(path) {
            return Err(ExpressionError::malformed(
                path,
                "key condition constrains this key attribute more than once",
            ));
        }
        if Some(path) == partition && !equality {
            return Err(ExpressionError::malformed(
                path,
                "partition key only supports = in a key condition",
            ));
        }
    }

    match partition {
        Some(partition) if !constrained.contains(partition) => Err(ExpressionError::malformed(
            partition,
            "key condition must constrain the partition key",
        )),
        _ => Ok(()),
    }
}

/// Collect the terms of an `AND` chain. Any other logical shape is refused.
fn key_condition_terms<'c>(
    condition: &'c Condition,
    out: &mut Vec<&'c Condition>,
) -> ExpressionResult<()> {
    match condition {
        Condition::Logical {
            op: LogicalOp::And,
            conditions,
        } => conditions
            .iter()
            .try_for_each(|member| key_condition_terms(member, out)),
        Condition::Logical { .. } | Condition::Not(_) => Err(ExpressionError::malformed(
            first_path(condition),
            "key condition supports only AND between its terms",
        )),
        term => {
            out.push(term);
            Ok(())
        }
    }
}

/// The key attribute a term constrains and whether the term is an equality.
fn key_term(term: &Condition) -> ExpressionResult<(&str, bool)> {
    match term {
        Condition::Compare {
            left: Operand::Path(path),
            op,
            right: Operand::Value(_),
        } if *op != CompareOp::Ne => Ok((path.as_str(), *op == CompareOp::Eq)),
        Condition::Between {
            operand: Operand::Path(path),
            lower: Operand::Value(_),
            upper: Operand::Value(_),
        }
        | Condition::BeginsWith {
            path,
            prefix: Operand::Value(_),
        } => Ok((path.as_str(), false)),
        other => Err(ExpressionError::malformed(
            first_path(other),
            "key condition terms compare a key attribute with literal values using =, <, <=, >, >=, BETWEEN or begins_with",
        )),
    }
}

fn find_partition_key(key_schema: &[KeySchemaElement]) -> Option<&str> {
    key_schema
        .iter()
        .find(|k| k.key_type == KeyType::Hash)
        .map(|k| k.attribute_name.as_str())
}

fn check_filter(filter: &Condition, key_schema: &[KeySchemaElement]) -> ExpressionResult<()> {
    let mut paths = HashSet::new();
    collect_paths(filter, &mut paths);
    match key_schema.iter().find(|k| paths.contains(&k.attribute_name)) {
        Some(key) => Err(ExpressionError::malformed(
            key.attribute_name.as_str(),
            "filter expression cannot reference a key attribute, use the key condition",
        )),
        None => Ok(()),
    }
}

fn first_path(condition: &Condition) -> String {
    let mut paths = HashSet::new();
    collect_paths(condition, &mut paths);
    paths.into_iter().min().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use dynoexpr_model::{AttributeValue, GlobalSecondaryIndex, Projection};

    use super::*;
    use crate::expression::builder::{
        Template, any_of, attr, begins_with, between, eq, exists, gt, ne, not_exists, size,
    };

    fn schema() -> TableSchema {
        TableSchema::new(
            "orders",
            vec![KeySchemaElement::hash("pk"), KeySchemaElement::range("sk")],
        )
        .with_global_index(GlobalSecondaryIndex {
            index_name: "by-customer".to_owned(),
            key_schema: vec![
                KeySchemaElement::hash("customer"),
                KeySchemaElement::range("created"),
            ],
            projection: Projection::default(),
        })
    }

    #[test]
    fn test_should_share_placeholders_across_clauses() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "A"))
            .filter(Template::new().with("status", "A"))
            .projection(["status", "pk"]);
        let mut input = QueryInput::default();
        set.apply_to_query(&mut input, &schema(), None).unwrap();

        assert_eq!(input.table_name, "orders");
        assert_eq!(input.key_condition_expression.as_deref(), Some("#pk = :v1"));
        assert_eq!(input.filter_expression.as_deref(), Some("#status = :v1"));
        assert_eq!(input.projection_expression.as_deref(), Some("#status, #pk"));
        assert_eq!(input.expression_attribute_names.len(), 2);
        assert_eq!(input.expression_attribute_values.len(), 1);
    }

    #[test]
    fn test_should_number_placeholders_by_clause_order() {
        let set = ExpressionSet::new()
            .projection(["name"])
            .filter(Template::new().with("age", gt(18)))
            .key_condition(Template::new().with("pk", "u#1"));
        let compiled = set.compile().unwrap();
        assert_eq!(compiled.key_condition.as_deref(), Some("#pk = :v1"));
        assert_eq!(compiled.filter.as_deref(), Some("#age > :v2"));
    }

    #[test]
    fn test_should_and_repeated_filters() {
        let set = ExpressionSet::new()
            .filter(Template::new().with("a", 1))
            .filter(Template::new().with("b", 2))
            .filter(Template::new().with("c", 3));
        let compiled = set.compile().unwrap();
        assert_eq!(
            compiled.filter.as_deref(),
            Some("#a = :v1 AND #b = :v2 AND #c = :v3")
        );
    }

    #[test]
    fn test_should_merge_repeated_updates() {
        let set = ExpressionSet::new()
            .update(Update::new().set("a", 1))
            .update(Update::new().remove("b"));
        let mut input = UpdateItemInput::default();
        set.apply_to_update(&mut input).unwrap();
        assert_eq!(input.update_expression.as_deref(), Some("SET #a = :v1 REMOVE #b"));
    }

    #[test]
    fn test_should_apply_update_with_condition() {
        let set = ExpressionSet::new()
            .update(Update::new().set("status", "shipped").add("version", 1))
            .condition(Template::new().with("version", 1).with("status", ne("shipped")));
        let mut input = UpdateItemInput::default();
        set.apply_to_update(&mut input).unwrap();
        assert_eq!(
            input.update_expression.as_deref(),
            Some("SET #status = :v2, #version = #version + :v1")
        );
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("#version = :v1 AND #status <> :v2")
        );
        assert_eq!(input.expression_attribute_values.len(), 2);
        assert_eq!(
            input.expression_attribute_values.get(":v2"),
            Some(&AttributeValue::from("shipped"))
        );
    }

    #[test]
    fn test_should_reject_update_without_update_clause() {
        let set = ExpressionSet::new().condition(Template::new().with("id", exists()));
        let err = set.apply_to_update(&mut UpdateItemInput::default()).unwrap_err();
        assert_eq!(err, ExpressionError::EmptyUpdate);
    }

    #[test]
    fn test_should_reject_clauses_the_operation_cannot_carry() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "a"))
            .update(Update::new().remove("x"));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnsupportedClause {
                clause: "update",
                operation: "Query",
            }
        );

        let set = ExpressionSet::new().filter(Template::new().with("a", 1));
        let err = set.apply_to_get(&mut GetItemInput::default()).unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnsupportedClause { clause: "filter", operation: "GetItem" }
        ));

        let set = ExpressionSet::new().key_condition(Template::new().with("pk", "a"));
        let err = set
            .apply_to_scan(&mut ScanInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnsupportedClause { clause: "key condition", operation: "Scan" }
        ));
    }

    #[test]
    fn test_should_apply_projection_to_get() {
        let set = ExpressionSet::new().projection(["id", "profile.email"]);
        let mut input = GetItemInput::default();
        set.apply_to_get(&mut input).unwrap();
        assert_eq!(
            input.projection_expression.as_deref(),
            Some("#id, #profile.#email")
        );
        assert_eq!(input.expression_attribute_names.len(), 3);
    }

    #[test]
    fn test_should_omit_values_for_existence_only_put() {
        let set = ExpressionSet::new().condition(Template::new().with("id", not_exists()));
        let mut input = PutItemInput::default();
        set.apply_to_put(&mut input).unwrap();
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_not_exists(#id)")
        );
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("ExpressionAttributeValues").is_none());
        assert_eq!(json["ExpressionAttributeNames"]["#id"], "id");
    }

    #[test]
    fn test_should_apply_condition_to_delete() {
        let set = ExpressionSet::new().condition(Template::new().with("status", "closed"));
        let mut input = DeleteItemInput::default();
        set.apply_to_delete(&mut input).unwrap();
        assert_eq!(input.condition_expression.as_deref(), Some("#status = :v1"));
    }

    #[test]
    fn test_should_query_index_with_its_own_keys() {
        let set = ExpressionSet::new()
            .key_condition(
                Template::new()
                    .with("customer", "c-1")
                    .with("created", between("2024-01-01", "2024-12-31")),
            )
            .filter(Template::new().with("pk", begins_with("ORDER#")));
        let mut input = QueryInput::default();
        set.apply_to_query(&mut input, &schema(), Some("by-customer"))
            .unwrap();
        assert_eq!(input.index_name.as_deref(), Some("by-customer"));
        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#customer = :v1 AND #created BETWEEN :v2 AND :v3")
        );
    }

    #[test]
    fn test_should_reject_unknown_index() {
        let set = ExpressionSet::new().key_condition(Template::new().with("pk", "a"));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), Some("missing"))
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnresolvableIndexReference { ref index, ref table }
                if index == "missing" && table == "orders"
        ));

        let err = ExpressionSet::new()
            .apply_to_scan(&mut ScanInput::default(), &schema(), Some("missing"))
            .unwrap_err();
        assert!(matches!(err, ExpressionError::UnresolvableIndexReference { .. }));
    }

    #[test]
    fn test_should_reject_filter_on_key_attribute() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "a"))
            .filter(Template::new().with("sk", gt(5)));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "sk"
        ));
    }

    #[test]
    fn test_should_allow_scan_filter_on_key_attribute() {
        let set = ExpressionSet::new().filter(Template::new().with("pk", begins_with("A")));
        let mut input = ScanInput::default();
        set.apply_to_scan(&mut input, &schema(), None).unwrap();
        assert_eq!(input.filter_expression.as_deref(), Some("begins_with(#pk, :v1)"));
    }

    #[test]
    fn test_should_reject_key_condition_outside_key_grammar() {
        for condition in [
            Template::new().with("pk", any_of(["a", "b"])),
            Template::new().with("pk", ne("a")),
            Template::new().with("pk", "a").with("sk", exists()),
            Template::new().with("pk", gt("a")),
            Template::new().with("pk", "a").with("sk", between(size("x"), 5)),
            Template::new().with("pk", eq(attr("sk"))),
            Template::new().with("pk", "a").with("sk", begins_with(attr("pk"))),
        ] {
            let set = ExpressionSet::new().key_condition(condition);
            let err = set
                .apply_to_query(&mut QueryInput::default(), &schema(), None)
                .unwrap_err();
            assert!(
                matches!(err, ExpressionError::MalformedExpression { .. }),
                "unexpected {err:?}"
            );
        }
    }

    #[test]
    fn test_should_require_partition_key_in_key_condition() {
        let set = ExpressionSet::new().key_condition(Template::new().with("sk", gt(1)));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "pk"
        ));
    }

    #[test]
    fn test_should_reject_query_without_key_condition() {
        let set = ExpressionSet::new().filter(Template::new().with("age", gt(1)));
        let mut input = QueryInput::default();
        let err = set.apply_to_query(&mut input, &schema(), None).unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "pk"
        ));
        assert!(input.filter_expression.is_none());

        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), Some("by-customer"))
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "customer"
        ));
    }

    #[test]
    fn test_should_reject_partition_key_range_condition() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", between("a", "m")).with("sk", 1));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "pk"
        ));
    }

    #[test]
    fn test_should_reject_key_attribute_constrained_twice() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "a"))
            .key_condition(Template::new().with("pk", "b"));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "pk"
        ));
    }

    #[test]
    fn test_should_accept_every_sort_key_form() {
        for sort in [
            Template::new().with("sk", 1),
            Template::new().with("sk", gt(1)),
            Template::new().with("sk", between(1, 9)),
            Template::new().with("sk", begins_with("A")),
        ] {
            let set = ExpressionSet::new()
                .key_condition(Template::new().with("pk", "a"))
                .key_condition(sort);
            assert!(set.apply_to_query(&mut QueryInput::default(), &schema(), None).is_ok());
        }
    }

    #[test]
    fn test_should_reject_non_key_attribute_in_key_condition() {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "a").with("status", "open"));
        let err = set
            .apply_to_query(&mut QueryInput::default(), &schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "status"
        ));
    }

    #[test]
    fn test_should_export_combined_attributes() {
        let attributes = ExpressionSet::new()
            .filter(Template::new().with("a", 1))
            .projection(["b"])
            .attributes()
            .unwrap();
        let names = attributes.expression_attribute_names.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(attributes.expression_attribute_values.unwrap().len(), 1);
    }
}
