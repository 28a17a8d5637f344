use crate::compiler::{CompiledBlock, SchemaCompiler};
use crate::error::{BundleError, ResolutionError, ResolutionErrors, SchemaError};
use crate::resolver::{ResolvedParameters, resolve};
use crate::schema::{BundledSchema, IntoBlockSchema, SchemaBundle};
use crate::value::RawInputMap;
use ahash::AHashMap;
use tracing::debug;

/// Supplies compiled blocks by block type. Passed in explicitly wherever blocks are
/// resolved, so tests and embedders can provide their own.
pub trait SchemaRegistry: Send + Sync {
    fn get(&self, block_type: &str) -> Option<&CompiledBlock>;

    fn contains(&self, block_type: &str) -> bool {
        self.get(block_type).is_some()
    }
}

/// A registry holding compiled blocks in memory. Schemas are validated on
/// registration, so a bad schema is rejected at load time rather than at resolution.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    blocks: AHashMap<String, CompiledBlock>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts, compiles and registers a block definition.
    pub fn register(&mut self, definition: impl IntoBlockSchema) -> Result<(), SchemaError> {
        let schema = definition.into_block_schema()?;
        let compiled = SchemaCompiler::builder(schema).build().compile()?;
        self.insert(compiled)
    }

    /// Registers an already compiled block.
    pub fn insert(&mut self, block: CompiledBlock) -> Result<(), SchemaError> {
        let block_type = block.block_type().to_string();
        if self.blocks.contains_key(&block_type) {
            return Err(SchemaError::InvalidDefinition(format!(
                "block type '{}' is already registered",
                block_type
            )));
        }
        debug!(block = %block_type, "registered block");
        self.blocks.insert(block_type, block);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Registered block types, sorted.
    pub fn block_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Packs every registered schema into a bundle, ordered by block type.
    pub fn to_bundle(&self) -> Result<SchemaBundle, BundleError> {
        let schemas = self
            .block_types()
            .into_iter()
            .filter_map(|t| self.blocks.get(t))
            .map(|block| {
                BundledSchema::from_schema(block.schema())
                    .map(|bundled| bundled.with_strict_options(block.strict_options()))
            })
            .collect::<Result<_, _>>()?;
        Ok(SchemaBundle::new(schemas))
    }

    /// Builds a registry from a bundle, compiling every schema it contains with the
    /// strictness it was registered with.
    pub fn from_bundle(bundle: &SchemaBundle) -> Result<Self, BundleError> {
        let mut registry = Self::new();
        for bundled in &bundle.schemas {
            let block = SchemaCompiler::builder(bundled.to_schema()?)
                .with_strict_options(bundled.strict_options)
                .build()
                .compile()?;
            registry.insert(block)?;
        }
        Ok(registry)
    }
}

impl SchemaRegistry for InMemoryRegistry {
    fn get(&self, block_type: &str) -> Option<&CompiledBlock> {
        self.blocks.get(block_type)
    }
}

/// Looks up a block by type and resolves raw inputs against it.
pub fn resolve_block<R: SchemaRegistry + ?Sized>(
    registry: &R,
    block_type: &str,
    raw: &RawInputMap,
) -> Result<ResolvedParameters, ResolutionErrors> {
    let block = registry
        .get(block_type)
        .ok_or_else(|| ResolutionError::UnknownBlock(block_type.to_string()))?;
    resolve(block, raw)
}
