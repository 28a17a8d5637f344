use super::BlockSchema;
use crate::error::BundleError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// Version of the bundle layout written by this crate.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// One schema inside a bundle. The definition is kept as JSON text because schema
/// values are JSON-shaped, which bincode cannot encode without a fixed layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BundledSchema {
    pub block_type: String,
    pub definition: String,
    /// Compiler strictness the schema was registered with, reapplied on load.
    pub strict_options: bool,
}

impl BundledSchema {
    pub fn from_schema(schema: &BlockSchema) -> Result<Self, BundleError> {
        let definition = serde_json::to_string(schema).map_err(|e| BundleError::Schema {
            block_type: schema.block_type.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            block_type: schema.block_type.clone(),
            definition,
            strict_options: true,
        })
    }

    pub fn with_strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    pub fn to_schema(&self) -> Result<BlockSchema, BundleError> {
        serde_json::from_str(&self.definition).map_err(|e| BundleError::Schema {
            block_type: self.block_type.clone(),
            message: e.to_string(),
        })
    }
}

/// A set of block schemas shipped together, e.g. the registry of a deployment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchemaBundle {
    pub format_version: u32,
    pub schemas: Vec<BundledSchema>,
}

impl Default for SchemaBundle {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SchemaBundle {
    pub fn new(schemas: Vec<BundledSchema>) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            schemas,
        }
    }

    pub fn from_schemas<'a>(
        schemas: impl IntoIterator<Item = &'a BlockSchema>,
    ) -> Result<Self, BundleError> {
        let schemas = schemas
            .into_iter()
            .map(BundledSchema::from_schema)
            .collect::<Result<_, _>>()?;
        Ok(Self::new(schemas))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        encode_to_vec(self, standard()).map_err(|e| BundleError::Encode(e.to_string()))
    }

    /// Deserializes a bundle from bytes, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        let (bundle, _): (SchemaBundle, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| BundleError::Decode(e.to_string()))?;
        if bundle.format_version != BUNDLE_FORMAT_VERSION {
            return Err(BundleError::UnsupportedVersion {
                found: bundle.format_version,
                expected: BUNDLE_FORMAT_VERSION,
            });
        }
        Ok(bundle)
    }

    /// Saves the bundle to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), BundleError> {
        let bytes = self.to_bytes()?;
        let io_error = |source| BundleError::Io {
            path: path.to_string(),
            source,
        };
        let mut file = fs::File::create(path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        Ok(())
    }

    pub fn from_file(path: &str) -> Result<Self, BundleError> {
        let io_error = |source| BundleError::Io {
            path: path.to_string(),
            source,
        };
        let mut file = fs::File::open(path).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;
        Self::from_bytes(&bytes)
    }

    pub fn schemas(&self) -> Result<Vec<BlockSchema>, BundleError> {
        self.schemas.iter().map(BundledSchema::to_schema).collect()
    }
}
