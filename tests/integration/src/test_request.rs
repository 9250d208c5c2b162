//! Request assembly onto model inputs, asserted on the serialized JSON.

#[cfg(test)]
mod tests {
    use dynoexpr_core::expression::builder::{
        Template, Update, begins_with, gt, not_exists, reference_or,
    };
    use dynoexpr_core::{ExpressionError, ExpressionSet};
    use dynoexpr_model::{
        AttributeValue, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ReturnValue,
        ScanInput, UpdateItemInput,
    };
    use serde_json::json;

    use crate::orders_schema;

    #[test]
    fn test_should_build_conditional_update_request() -> anyhow::Result<()> {
        let schema = orders_schema();
        let set = ExpressionSet::new()
            .update(
                Update::new()
                    .set("status", "shipped")
                    .set("attempts", reference_or("attempts", 0))
                    .add_to_set("labels", AttributeValue::string_set(["fragile"]))
                    .remove("draft"),
            )
            .condition(Template::new().with("status", "paid"));

        let mut input = UpdateItemInput {
            table_name: schema.table_name.clone(),
            key: [
                ("pk".to_owned(), AttributeValue::from("o#1")),
                ("sk".to_owned(), AttributeValue::from("v0")),
            ]
            .into_iter()
            .collect(),
            return_values: Some(ReturnValue::AllNew),
            ..UpdateItemInput::default()
        };
        set.apply_to_update(&mut input)?;

        let wire = serde_json::to_value(&input)?;
        assert_eq!(wire["TableName"], "orders");
        assert_eq!(
            wire["UpdateExpression"],
            "SET #status = :v2, #attempts = if_not_exists(#attempts, :v3) REMOVE #draft ADD #labels :v4"
        );
        assert_eq!(wire["ConditionExpression"], "#status = :v1");
        assert_eq!(
            wire["ExpressionAttributeValues"],
            json!({
                ":v1": {"S": "paid"},
                ":v2": {"S": "shipped"},
                ":v3": {"N": "0"},
                ":v4": {"SS": ["fragile"]}
            })
        );
        assert_eq!(wire["ExpressionAttributeNames"]["#draft"], "draft");
        assert_eq!(wire["ReturnValues"], "ALL_NEW");
        Ok(())
    }

    #[test]
    fn test_should_build_query_with_shared_placeholders() -> anyhow::Result<()> {
        let schema = orders_schema();
        let set = ExpressionSet::new()
            .key_condition(
                Template::new()
                    .with("customer", "c-9")
                    .with("created", gt("2024-01-01")),
            )
            .filter(Template::new().with("note", "c-9"))
            .projection(["customer", "created", "total"]);

        let mut input = QueryInput {
            limit: Some(25),
            ..QueryInput::default()
        };
        set.apply_to_query(&mut input, &schema, Some("by-customer"))?;

        let wire = serde_json::to_value(&input)?;
        assert_eq!(wire["IndexName"], "by-customer");
        assert_eq!(
            wire["KeyConditionExpression"],
            "#customer = :v1 AND #created > :v2"
        );
        assert_eq!(wire["FilterExpression"], "#note = :v1");
        assert_eq!(wire["ProjectionExpression"], "#customer, #created, #total");
        assert_eq!(
            wire["ExpressionAttributeValues"].as_object().map(|m| m.len()),
            Some(2)
        );
        assert_eq!(wire["Limit"], 25);
        Ok(())
    }

    #[test]
    fn test_should_query_local_index_by_its_sort_key() -> anyhow::Result<()> {
        let set = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "o#1").with("status", begins_with("SHIP")));
        let mut input = QueryInput::default();
        set.apply_to_query(&mut input, &orders_schema(), Some("by-status"))?;
        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#pk = :v1 AND begins_with(#status, :v2)")
        );

        // `status` is an ordinary attribute on the base table.
        let err = set
            .apply_to_query(&mut QueryInput::default(), &orders_schema(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::MalformedExpression { ref path, .. } if path == "status"
        ));
        Ok(())
    }

    #[test]
    fn test_should_leave_out_empty_maps_on_the_wire() -> anyhow::Result<()> {
        let set = ExpressionSet::new().condition(Template::new().with("pk", not_exists()));
        let mut input = PutItemInput {
            table_name: "orders".to_owned(),
            ..PutItemInput::default()
        };
        set.apply_to_put(&mut input)?;

        let wire = serde_json::to_value(&input)?;
        assert_eq!(wire["ConditionExpression"], "attribute_not_exists(#pk)");
        assert!(wire.get("ExpressionAttributeValues").is_none());

        let mut get = GetItemInput::default();
        ExpressionSet::new().apply_to_get(&mut get)?;
        let wire = serde_json::to_value(&get)?;
        assert!(wire.get("ProjectionExpression").is_none());
        assert!(wire.get("ExpressionAttributeNames").is_none());
        Ok(())
    }

    #[test]
    fn test_should_scan_index_with_filter() -> anyhow::Result<()> {
        let set = ExpressionSet::new()
            .filter(Template::new().with("total", gt(100)))
            .projection(["pk"]);
        let mut input = ScanInput::default();
        set.apply_to_scan(&mut input, &orders_schema(), Some("by-customer"))?;
        assert_eq!(input.index_name.as_deref(), Some("by-customer"));
        assert_eq!(input.filter_expression.as_deref(), Some("#total > :v1"));
        assert_eq!(input.projection_expression.as_deref(), Some("#pk"));
        Ok(())
    }

    #[test]
    fn test_should_reject_mismatched_operations() {
        let update_only = ExpressionSet::new().update(Update::new().remove("x"));
        assert!(matches!(
            update_only.apply_to_delete(&mut DeleteItemInput::default()),
            Err(ExpressionError::UnsupportedClause { clause: "update", operation: "DeleteItem" })
        ));

        let condition_only = ExpressionSet::new().condition(Template::new().with("a", 1));
        assert_eq!(
            condition_only.apply_to_update(&mut UpdateItemInput::default()),
            Err(ExpressionError::EmptyUpdate)
        );
    }

    #[test]
    fn test_should_report_unknown_index_with_table_name() {
        let err = ExpressionSet::new()
            .key_condition(Template::new().with("pk", "x"))
            .apply_to_query(&mut QueryInput::default(), &orders_schema(), Some("by-region"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "table 'orders' has no index named 'by-region'"
        );
    }
}
