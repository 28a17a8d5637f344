//! Tests for schema compilation: every structural check and the compiler builder options.
mod common;
use blockform::prelude::*;
use common::*;
use serde_json::json;

fn compile_err(schema: BlockSchema) -> SchemaError {
    SchemaCompiler::builder(schema)
        .build()
        .compile()
        .expect_err("schema should be rejected")
}

#[test]
fn test_compiler_builds_valid_schemas() {
    let block = compile(create_mail_schema());
    assert_eq!(block.block_type(), "mail");
    assert_eq!(block.fields().len(), 8);
    assert_eq!(block.operation_field().map(|f| f.key.as_str()), Some("operation"));
    assert_eq!(block.field("maxResults").map(FieldSchema::label), Some("Max Results"));
    assert_eq!(block.field("includeSpam").map(FieldSchema::label), Some("includeSpam"));
    assert!(block.field("label").is_none());
}

#[test]
fn test_try_from_compiles() {
    let block = CompiledBlock::try_from(create_calendar_schema()).expect("should compile");
    assert_eq!(block.block_type(), "calendar");

    let result = CompiledBlock::try_from(BlockSchema::new("empty"));
    assert_eq!(result.unwrap_err(), SchemaError::MissingTool("empty".into()));
}

#[test]
fn test_duplicate_field_rejected() {
    let schema = BlockSchema::new("dup")
        .with_tool("dup_tool")
        .with_field(FieldSchema::string("name"))
        .with_field(FieldSchema::number("name"));

    assert_eq!(
        compile_err(schema),
        SchemaError::DuplicateField {
            block_type: "dup".into(),
            key: "name".into(),
        }
    );
}

#[test]
fn test_condition_on_unknown_field_rejected() {
    let schema = create_calendar_schema().with_field(
        FieldSchema::string("notes").visible_when("mode", ["verbose"]),
    );

    assert_eq!(
        compile_err(schema),
        SchemaError::UnknownConditionField {
            field: "notes".into(),
            on_field: "mode".into(),
        }
    );
}

#[test]
fn test_condition_without_values_rejected() {
    let schema = create_calendar_schema()
        .with_field(FieldSchema::string("notes").visible_when("operation", Vec::<&str>::new()));

    assert_eq!(
        compile_err(schema),
        SchemaError::EmptyCondition {
            field: "notes".into()
        }
    );
}

#[test]
fn test_condition_cycle_rejected() {
    let schema = BlockSchema::new("loop")
        .with_tool("loop_tool")
        .with_field(FieldSchema::string("a").visible_when("b", ["on"]))
        .with_field(FieldSchema::string("b").visible_when("a", ["on"]));

    let error = compile_err(schema);
    assert_eq!(
        error,
        SchemaError::ConditionCycle {
            fields: vec!["a".into(), "b".into(), "a".into()],
        }
    );
    assert_eq!(
        error.to_string(),
        "Visibility conditions form a cycle: a -> b -> a"
    );
}

#[test]
fn test_self_referencing_condition_rejected() {
    let schema = BlockSchema::new("self")
        .with_tool("self_tool")
        .with_field(FieldSchema::boolean("enabled").visible_when("enabled", [true]));

    assert!(matches!(
        compile_err(schema),
        SchemaError::ConditionCycle { fields } if fields == vec!["enabled", "enabled"]
    ));
}

#[test]
fn test_chained_conditions_compile() {
    let schema = BlockSchema::new("chain")
        .with_tool("chain_tool")
        .with_field(FieldSchema::string("c").visible_when("b", ["x"]))
        .with_field(FieldSchema::string("b").visible_when("a", ["y"]))
        .with_field(FieldSchema::string("a"));

    let block = compile(schema);
    let active = block.active_fields(&inputs(&[("a", "y"), ("b", "x")]));
    assert_eq!(active.len(), 3);
    // Declaration order is kept even though `c` is evaluated last.
    assert_eq!(active.get_index(0).map(String::as_str), Some("c"));
}

#[test]
fn test_unknown_operation_field_rejected() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::string("action"))
        .with_operation("mode", [("a", "tool_a")]);

    assert_eq!(
        compile_err(schema),
        SchemaError::UnknownOperationField("mode".into())
    );
}

#[test]
fn test_conditional_operation_field_rejected() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::boolean("advanced"))
        .with_field(FieldSchema::string("operation").visible_when("advanced", [true]))
        .with_operation("operation", [("a", "tool_a")]);

    assert_eq!(
        compile_err(schema),
        SchemaError::ConditionalOperationField("operation".into())
    );
}

#[test]
fn test_block_without_any_tool_rejected() {
    let schema = BlockSchema::new("toolless").with_field(FieldSchema::string("name"));
    let error = compile_err(schema);
    assert_eq!(error, SchemaError::MissingTool("toolless".into()));
    assert!(error.to_string().contains("no tool to invoke"));
}

#[test]
fn test_operation_map_without_operation_field_rejected() {
    let mut schema = BlockSchema::new("orphan")
        .with_tool("orphan_tool")
        .with_field(FieldSchema::string("operation"));
    schema
        .operation_to_tool
        .insert("send".into(), "orphan_send".into());

    assert!(matches!(
        compile_err(schema),
        SchemaError::InvalidDefinition(message) if message.contains("no operation field")
    ));
}

#[test]
fn test_empty_operation_map_rejected() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::string("operation"))
        .with_operation("operation", Vec::<(&str, &str)>::new());

    assert_eq!(
        compile_err(schema),
        SchemaError::EmptyOperationMap("operation".into())
    );
}

#[test]
fn test_empty_operation_map_allowed_with_fallback() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::string("operation"))
        .with_operation("operation", Vec::<(&str, &str)>::new())
        .with_fallback_tool("ops_any");

    let call = compile(schema)
        .resolve(&inputs(&[("operation", "whatever")]))
        .unwrap();
    assert_eq!(call.tool_id, "ops_any");
}

#[test]
fn test_operation_outside_options_rejected() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::string("operation").with_options(["send"]))
        .with_operation("operation", [("send", "ops_send"), ("archive", "ops_archive")]);

    assert_eq!(
        compile_err(schema),
        SchemaError::UnreachableOperation {
            field: "operation".into(),
            value: "archive".into(),
            tool: "ops_archive".into(),
        }
    );
}

#[test]
fn test_unmapped_option_rejected_when_strict() {
    let schema = || {
        BlockSchema::new("ops")
            .with_field(FieldSchema::string("operation").with_options(["send", "read"]))
            .with_operation("operation", [("send", "ops_send")])
    };

    assert_eq!(
        compile_err(schema()),
        SchemaError::UnmappedOperation {
            field: "operation".into(),
            value: "read".into(),
        }
    );

    let relaxed = SchemaCompiler::builder(schema())
        .with_strict_options(false)
        .build()
        .compile();
    assert!(relaxed.is_ok(), "Non-strict compilation should accept unmapped options");

    let errors = relaxed
        .unwrap()
        .resolve(&inputs(&[("operation", "read")]))
        .unwrap_err();
    assert!(matches!(
        &errors.errors()[0],
        ResolutionError::UnresolvedOperation { value: Some(v), .. } if v == "read"
    ));
}

#[test]
fn test_builder_fallback_covers_unmapped_options() {
    let schema = BlockSchema::new("ops")
        .with_field(FieldSchema::string("operation").with_options(["send", "read"]))
        .with_operation("operation", [("send", "ops_send")]);

    let block = SchemaCompiler::builder(schema)
        .with_fallback_tool("ops_generic")
        .build()
        .compile()
        .expect("fallback should satisfy strict options");

    let call = block.resolve(&inputs(&[("operation", "read")])).unwrap();
    assert_eq!(call.tool_id, "ops_generic");
    assert_eq!(block.schema().fallback_tool.as_deref(), Some("ops_generic"));
}

#[test]
fn test_canonical_key_collision_rejected() {
    let schema = BlockSchema::new("clash")
        .with_tool("clash_tool")
        .with_field(FieldSchema::string("channel").with_canonical_key("target"))
        .with_field(FieldSchema::string("manual").with_canonical_key("channel"));

    assert_eq!(
        compile_err(schema),
        SchemaError::CanonicalKeyCollision {
            canonical_key: "channel".into(),
            field: "manual".into(),
            colliding_field: "channel".into(),
        }
    );
}

#[test]
fn test_canonical_key_may_name_a_plain_member_field() {
    // `label` is itself the plain member of the group the alias feeds.
    let schema = BlockSchema::new("labels")
        .with_tool("labels_tool")
        .with_field(FieldSchema::string("label"))
        .with_field(FieldSchema::string("labelPicker").with_canonical_key("label"));

    let block = compile(schema);
    let call = block.resolve(&inputs(&[("labelPicker", "INBOX")])).unwrap();
    assert_eq!(call.get("label"), Some(&Value::Text("INBOX".into())));
    assert_eq!(call.parameters.len(), 1);
}

#[test]
fn test_schema_from_json_value() {
    let definition = json!({
        "blockType": "weather",
        "fields": [
            { "key": "city", "required": true },
            { "key": "days", "valueType": "number", "numberKind": "integer", "defaultValue": 3 },
            {
                "key": "units",
                "visibilityCondition": { "onField": "days", "matchesAnyOf": [1] , "negate": true }
            }
        ],
        "tool": "weather_forecast"
    });

    let schema = definition.into_block_schema().expect("valid definition");
    assert_eq!(schema.fields.len(), 3);
    assert_eq!(schema.fields[1].number_kind, NumberKind::Integer);

    let block = compile(schema);
    let call = block
        .resolve(&inputs(&[("city", "Oslo"), ("units", "metric")]))
        .unwrap();
    assert_eq!(call.tool_id, "weather_forecast");
    assert_eq!(call.get("days"), Some(&Value::Integer(3)));
    assert_eq!(call.get("units"), Some(&Value::Text("metric".into())));

    let hidden = block
        .resolve(&inputs(&[("city", "Oslo"), ("days", "1"), ("units", "metric")]))
        .unwrap();
    assert!(hidden.get("units").is_none());
}

#[test]
fn test_malformed_json_schema_rejected() {
    let result = json!({ "fields": "nope" }).into_block_schema();
    assert!(matches!(result, Err(SchemaError::InvalidDefinition(_))));
}
