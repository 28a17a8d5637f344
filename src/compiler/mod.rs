use crate::error::SchemaError;
use crate::schema::{BlockSchema, FieldSchema};
use crate::value::RawInputMap;
use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

mod ordering;
mod validate;

use ordering::condition_order;

/// A validated, indexed block schema. Immutable once compiled, so a single instance
/// can be shared across threads and resolved concurrently.
#[derive(Debug, Clone)]
pub struct CompiledBlock {
    schema: BlockSchema,
    index: AHashMap<String, usize>,
    /// Output key -> indices of the fields feeding it, in declaration order.
    groups: IndexMap<String, Vec<usize>>,
    /// Field indices ordered so every condition's dependency comes first.
    evaluation_order: Vec<usize>,
    operation_index: Option<usize>,
    strict_options: bool,
}

impl CompiledBlock {
    pub fn schema(&self) -> &BlockSchema {
        &self.schema
    }

    pub fn block_type(&self) -> &str {
        &self.schema.block_type
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.schema.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.index.get(key).map(|&i| &self.schema.fields[i])
    }

    pub(crate) fn field_index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn operation_field(&self) -> Option<&FieldSchema> {
        self.operation_index.map(|i| &self.schema.fields[i])
    }

    /// Whether the block was compiled with strict operation options.
    pub fn strict_options(&self) -> bool {
        self.strict_options
    }

    pub(crate) fn groups(&self) -> &IndexMap<String, Vec<usize>> {
        &self.groups
    }

    pub(crate) fn evaluation_order(&self) -> &[usize] {
        &self.evaluation_order
    }

    /// Fills in what the caller left blank: first a value supplied under the field's
    /// canonical key, then the field's default. The result is keyed by field key.
    pub fn effective_inputs(&self, raw: &RawInputMap) -> RawInputMap {
        let mut effective = RawInputMap::with_capacity(self.schema.fields.len());
        for field in &self.schema.fields {
            let supplied = raw
                .get(&field.key)
                .filter(|v| !v.is_blank())
                .or_else(|| {
                    field
                        .canonical_key
                        .as_ref()
                        .filter(|canonical| !self.index.contains_key(*canonical))
                        .and_then(|canonical| raw.get(canonical))
                        .filter(|v| !v.is_blank())
                })
                .cloned();

            let value = supplied.or_else(|| {
                field
                    .default_value
                    .as_ref()
                    .and_then(|default| default.produce(raw))
                    .filter(|v| !v.is_blank())
            });

            if let Some(value) = value {
                effective.insert(field.key.clone(), value);
            }
        }
        effective
    }

    /// The fields to render for the given form state, in declaration order.
    /// Defaults are applied first, exactly as during resolution.
    pub fn active_fields(&self, raw: &RawInputMap) -> IndexSet<String> {
        crate::visibility::resolve_active_fields(self, &self.effective_inputs(raw))
    }

    /// Resolves raw inputs into a tool call. See [`crate::resolver::resolve`].
    pub fn resolve(
        &self,
        raw: &RawInputMap,
    ) -> Result<crate::resolver::ResolvedParameters, crate::error::ResolutionErrors> {
        crate::resolver::resolve(self, raw)
    }
}

impl TryFrom<BlockSchema> for CompiledBlock {
    type Error = SchemaError;

    fn try_from(schema: BlockSchema) -> Result<Self, Self::Error> {
        SchemaCompiler::builder(schema).build().compile()
    }
}

/// Validates a [`BlockSchema`] and indexes it into a [`CompiledBlock`].
pub struct SchemaCompiler {
    schema: BlockSchema,
    strict_options: bool,
}

pub struct SchemaCompilerBuilder {
    schema: BlockSchema,
    fallback_tool: Option<String>,
    strict_options: bool,
}

impl SchemaCompilerBuilder {
    pub fn new(schema: BlockSchema) -> Self {
        Self {
            schema,
            fallback_tool: None,
            strict_options: true,
        }
    }

    /// Declares the tool used for unknown or missing operations, overriding the
    /// schema's own fallback.
    pub fn with_fallback_tool(mut self, tool: &str) -> Self {
        self.fallback_tool = Some(tool.to_string());
        self
    }

    /// When strict (the default), every declared option of the operation field must
    /// map to a tool unless a fallback exists.
    pub fn with_strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    pub fn build(self) -> SchemaCompiler {
        let mut schema = self.schema;
        if self.fallback_tool.is_some() {
            schema.fallback_tool = self.fallback_tool;
        }
        SchemaCompiler {
            schema,
            strict_options: self.strict_options,
        }
    }
}

impl SchemaCompiler {
    pub fn builder(schema: BlockSchema) -> SchemaCompilerBuilder {
        SchemaCompilerBuilder::new(schema)
    }

    pub fn compile(self) -> Result<CompiledBlock, SchemaError> {
        let schema = self.schema;

        let index = validate::index_fields(&schema)?;
        validate::check_conditions(&schema, &index)?;
        let operation_index = validate::check_operation(&schema, &index, self.strict_options)?;
        validate::check_canonical_keys(&schema, &index)?;

        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, field) in schema.fields.iter().enumerate() {
            groups
                .entry(field.output_key().to_string())
                .or_default()
                .push(i);
        }

        let evaluation_order = condition_order(&schema, &index)?;

        debug!(
            block = %schema.block_type,
            fields = schema.fields.len(),
            parameters = groups.len(),
            operation = schema.operation_field.as_deref().unwrap_or("-"),
            "compiled block schema"
        );

        Ok(CompiledBlock {
            schema,
            index,
            groups,
            evaluation_order,
            operation_index,
            strict_options: self.strict_options,
        })
    }
}
