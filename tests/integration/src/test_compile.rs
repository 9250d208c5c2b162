//! Standalone compiles of conditions, updates and projections.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynoexpr_core::expression::builder::{
        Template, Update, add, append, attr, between, eq, exists, gt, is_in, not, remove, size,
    };
    use dynoexpr_core::expression::{
        CompareOp, Condition, SymbolTable, compile_condition, compile_condition_with, compile_projection,
        compile_projection_with, compile_update, compile_update_with,
    };
    use dynoexpr_core::{CompilerConfig, ExpressionError, template};
    use dynoexpr_model::AttributeValue;
    use serde_json::json;

    use crate::init_tracing;

    #[test]
    fn test_should_compile_template_with_names_and_values() -> anyhow::Result<()> {
        init_tracing();

        let condition = Condition::from(template! { "status" => "active", "age" => gt(18) });
        let compiled = compile_condition(&condition)?;

        assert_eq!(compiled.expression, "#status = :v1 AND #age > :v2");
        let wire = serde_json::to_value(compiled.attributes())?;
        assert_eq!(
            wire,
            json!({
                "ExpressionAttributeNames": {"#status": "status", "#age": "age"},
                "ExpressionAttributeValues": {":v1": {"S": "active"}, ":v2": {"N": "18"}}
            })
        );
        Ok(())
    }

    #[test]
    fn test_should_compile_counter_list_and_remove_update() -> anyhow::Result<()> {
        init_tracing();

        let update: Update = [
            ("counter", add(5)),
            ("tags", append(vec![AttributeValue::from("x")])),
            ("obsolete", remove()),
        ]
        .into_iter()
        .collect();
        let compiled = compile_update(&update)?;

        assert_eq!(
            compiled.expression,
            "SET #counter = #counter + :v1, #tags = list_append(#tags, :v2) REMOVE #obsolete"
        );
        let wire = serde_json::to_value(compiled.attributes())?;
        assert_eq!(wire["ExpressionAttributeValues"][":v2"], json!({"L": [{"S": "x"}]}));
        Ok(())
    }

    #[test]
    fn test_should_compile_nested_document_path() -> anyhow::Result<()> {
        let compiled = compile_condition(&Condition::from(
            Template::new().with("user.profile.email", "a@b.com"),
        ))?;
        assert_eq!(compiled.expression, "#user.#profile.#email = :v1");
        assert_eq!(compiled.symbols.name_count(), 3);
        Ok(())
    }

    #[test]
    fn test_should_share_one_table_across_separate_compiles() -> anyhow::Result<()> {
        let mut symbols = SymbolTable::new();

        let condition = compile_condition_with(
            &Condition::from(Template::new().with("status", "active")),
            &mut symbols,
        )?;
        let update = compile_update_with(
            &Update::new().set("status", "archived").set("previous", "active"),
            &mut symbols,
        )?;
        let projection = compile_projection_with(["status", "previous"], &mut symbols)?;

        assert_eq!(condition, "#status = :v1");
        assert_eq!(update, "SET #status = :v2, #previous = :v1");
        assert_eq!(projection, "#status, #previous");

        let names = symbols.to_name_map();
        assert_eq!(
            names,
            HashMap::from([
                ("#status".to_owned(), "status".to_owned()),
                ("#previous".to_owned(), "previous".to_owned()),
            ])
        );
        assert_eq!(symbols.value_count(), 2);
        Ok(())
    }

    #[test]
    fn test_should_dedup_structurally_equal_sets_and_maps() -> anyhow::Result<()> {
        let colors_a = AttributeValue::string_set(["red", "blue"]);
        let colors_b = AttributeValue::string_set(["blue", "red", "red"]);
        let map_a = AttributeValue::M(HashMap::from([
            ("x".to_owned(), AttributeValue::from(1)),
            ("y".to_owned(), AttributeValue::from(2)),
        ]));
        let map_b = AttributeValue::M(HashMap::from([
            ("y".to_owned(), AttributeValue::from(2)),
            ("x".to_owned(), AttributeValue::from(1)),
        ]));

        let compiled = compile_condition(&Condition::from(
            Template::new()
                .with("a", colors_a)
                .with("b", colors_b)
                .with("c", map_a)
                .with("d", map_b),
        ))?;
        assert_eq!(
            compiled.expression,
            "#a = :v1 AND #b = :v1 AND #c = :v2 AND #d = :v2"
        );
        Ok(())
    }

    #[test]
    fn test_should_keep_logical_structure_in_output() -> anyhow::Result<()> {
        let condition = Condition::all([
            Condition::from(Template::new().with("kind", "order")),
            !(Condition::from(Template::new().with("state", "void"))
                | Template::new().with("total", between(0, 0))),
            Condition::from(Template::new().with("lines", is_in([1, 2, 3]))),
        ]);
        let compiled = compile_condition(&condition)?;
        assert_eq!(
            compiled.expression,
            "#kind = :v1 AND NOT (#state = :v2 OR #total BETWEEN :v3 AND :v3) AND #lines IN (:v4, :v5, :v6)"
        );
        Ok(())
    }

    #[test]
    fn test_should_omit_value_map_when_no_literals() -> anyhow::Result<()> {
        let condition = Condition::from(Template::new().with("id", exists()))
            & Condition::compare(size("a"), CompareOp::Lt, size("b"))
            & Template::new().with("start", not(eq(attr("end"))));
        let compiled = compile_condition(&condition)?;
        assert_eq!(
            compiled.expression,
            "attribute_exists(#id) AND size(#a) < size(#b) AND NOT (#start = #end)"
        );
        let wire = serde_json::to_value(compiled.attributes())?;
        assert!(wire.get("ExpressionAttributeValues").is_none());
        assert_eq!(wire["ExpressionAttributeNames"].as_object().map(|m| m.len()), Some(5));
        Ok(())
    }

    #[test]
    fn test_should_compile_projection_alone() -> anyhow::Result<()> {
        let compiled = compile_projection(["id", "first-name", "tags[3]"])?;
        assert_eq!(compiled.expression, "#id, #n1, #tags[3]");
        assert_eq!(compiled.symbols.name_for("#n1"), Some("first-name"));
        Ok(())
    }

    #[test]
    fn test_should_surface_typed_errors() {
        assert_eq!(
            compile_update(&Update::new()).unwrap_err(),
            ExpressionError::EmptyUpdate
        );
        assert_eq!(
            compile_condition(&Condition::all(Vec::<Condition>::new())).unwrap_err(),
            ExpressionError::EmptyCondition
        );
        assert!(matches!(
            compile_condition(&Condition::from(Template::new().with("a[", 1))).unwrap_err(),
            ExpressionError::MalformedExpression { .. }
        ));
    }

    #[test]
    fn test_should_honor_configured_limits() {
        let config = CompilerConfig {
            value_prefix: ":p".to_owned(),
            max_expression_bytes: 4096,
            max_in_operands: 2,
        };
        let mut symbols = SymbolTable::with_config(config);
        let ok = compile_condition_with(
            &Condition::from(Template::new().with("a", is_in([1, 2]))),
            &mut symbols,
        );
        assert_eq!(ok.as_deref(), Ok("#a IN (:p1, :p2)"));

        let err = compile_condition_with(
            &Condition::from(Template::new().with("a", is_in([1, 2, 3]))),
            &mut symbols,
        )
        .unwrap_err();
        assert!(matches!(err, ExpressionError::MalformedExpression { .. }));
    }
}
