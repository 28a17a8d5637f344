//! Common test utilities for building block schemas and inputs.
use blockform::prelude::*;

/// Builds a raw input map from `(key, value)` text pairs.
#[allow(dead_code)]
pub fn inputs(pairs: &[(&str, &str)]) -> RawInputMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), RawValue::from(*v)))
        .collect()
}

/// A two-operation block: `name` is always required, `id` only for updates.
///
/// operation (create|update) -> calendar_create | calendar_update
#[allow(dead_code)]
pub fn create_calendar_schema() -> BlockSchema {
    BlockSchema::new("calendar")
        .with_field(
            FieldSchema::string("operation")
                .with_display_name("Operation")
                .with_options(["create", "update"]),
        )
        .with_field(FieldSchema::string("name").with_display_name("Name").required())
        .with_field(
            FieldSchema::string("id")
                .with_display_name("Event ID")
                .required()
                .visible_when("operation", ["update"]),
        )
        .with_operation(
            "operation",
            [("create", "calendar_create"), ("update", "calendar_update")],
        )
}

/// A mail block with a picker/manual alias pair for the label and a few typed fields.
///
/// - `labelSelector` (picker) and `manualLabel` (manual) both feed `label`
/// - `maxResults` is an integer, `includeSpam` a boolean, `filter` structured
/// - `to`/`body` only apply to `send`; `labelSelector`/`manualLabel` to `read`/`update`
#[allow(dead_code)]
pub fn create_mail_schema() -> BlockSchema {
    BlockSchema::new("mail")
        .with_field(
            FieldSchema::string("operation")
                .with_options(["send", "read", "update"])
                .with_default("read"),
        )
        .with_field(
            FieldSchema::string("to")
                .with_display_name("Recipient")
                .required()
                .trimmed()
                .visible_when("operation", ["send"]),
        )
        .with_field(FieldSchema::string("body").visible_when("operation", ["send"]))
        .with_field(
            FieldSchema::string("labelSelector")
                .with_display_name("Label")
                .with_canonical_key("label")
                .required()
                .visible_when("operation", ["read", "update"]),
        )
        .with_field(
            FieldSchema::string("manualLabel")
                .with_display_name("Label ID")
                .with_canonical_key("label")
                .required()
                .visible_when("operation", ["read", "update"]),
        )
        .with_field(
            FieldSchema::number("maxResults")
                .with_display_name("Max Results")
                .integer()
                .hidden_when("operation", ["send"]),
        )
        .with_field(FieldSchema::boolean("includeSpam"))
        .with_field(FieldSchema::structured("filter").with_display_name("Filter"))
        .with_operation(
            "operation",
            [
                ("send", "mail_send"),
                ("read", "mail_read"),
                ("update", "mail_update"),
            ],
        )
}

#[allow(dead_code)]
pub fn compile(schema: BlockSchema) -> CompiledBlock {
    SchemaCompiler::builder(schema)
        .build()
        .compile()
        .expect("schema should compile")
}

/// A block file in the JSON authoring format, with a chained condition:
/// `threadId` is shown for replies, which are only offered when `mode` is `send`.
#[allow(dead_code)]
pub const CHAT_BLOCK_JSON: &str = r#"{
  "type": "chat",
  "name": "Chat",
  "subBlocks": [
    {
      "id": "operation",
      "title": "Operation",
      "type": "dropdown",
      "options": [
        { "id": "send", "label": "Send Message" },
        { "id": "history", "label": "Read History" }
      ],
      "defaultValue": "send"
    },
    {
      "id": "channelSelector",
      "title": "Channel",
      "type": "channel-selector",
      "canonicalParamId": "channel",
      "required": true
    },
    {
      "id": "manualChannel",
      "title": "Channel ID",
      "type": "short-input",
      "canonicalParamId": "channel",
      "required": true
    },
    {
      "id": "text",
      "title": "Message",
      "type": "long-input",
      "required": true,
      "condition": { "field": "operation", "value": "send" }
    },
    {
      "id": "reply",
      "title": "Reply in thread",
      "type": "switch",
      "condition": { "field": "operation", "value": "send" }
    },
    {
      "id": "threadId",
      "title": "Thread",
      "type": "short-input",
      "required": true,
      "condition": { "field": "reply", "value": [true, "true"] }
    },
    {
      "id": "limit",
      "title": "Limit",
      "type": "slider",
      "numberKind": "integer",
      "defaultValue": 20,
      "condition": { "field": "operation", "value": ["send"], "not": true }
    },
    {
      "id": "blocks",
      "title": "Blocks",
      "type": "code",
      "condition": { "field": "operation", "value": "send" }
    }
  ],
  "tools": {
    "access": ["chat_send", "chat_history"],
    "operations": { "send": "chat_send", "history": "chat_history" }
  }
}"#;
