use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Errors in a block schema itself. Raised when a schema is compiled or registered,
/// never expected at runtime for a correctly authored block.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Block '{block_type}' declares field '{key}' more than once")]
    DuplicateField { block_type: String, key: String },

    #[error("Field '{field}' has a visibility condition on '{on_field}', which does not exist")]
    UnknownConditionField { field: String, on_field: String },

    #[error("Field '{field}' has a visibility condition with no values to match")]
    EmptyCondition { field: String },

    #[error("Visibility conditions form a cycle: {}", .fields.join(" -> "))]
    ConditionCycle { fields: Vec<String> },

    #[error("Operation field '{0}' is not a field of the block")]
    UnknownOperationField(String),

    #[error("Operation field '{0}' must not have a visibility condition")]
    ConditionalOperationField(String),

    #[error("Block '{0}' has no operation field and no tool to invoke")]
    MissingTool(String),

    #[error("Operation field '{0}' maps no operations to tools and declares no fallback tool")]
    EmptyOperationMap(String),

    #[error(
        "Operation '{value}' maps to tool '{tool}' but is not an option of field '{field}'"
    )]
    UnreachableOperation {
        field: String,
        value: String,
        tool: String,
    },

    #[error("Option '{value}' of operation field '{field}' has no tool and no fallback is declared")]
    UnmappedOperation { field: String, value: String },

    #[error(
        "Canonical key '{canonical_key}' of field '{field}' collides with field '{colliding_field}'"
    )]
    CanonicalKeyCollision {
        canonical_key: String,
        field: String,
        colliding_field: String,
    },

    #[error("Invalid block definition: {0}")]
    InvalidDefinition(String),
}

/// A single field's raw value could not be converted to its declared type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{display_name}: {message}")]
pub struct CoercionError {
    pub field: String,
    pub display_name: String,
    pub message: String,
}

/// One problem found while resolving a block against raw inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("'{display_name}' is required")]
    MissingRequiredField {
        /// The output parameter that has no value (canonical key or field key).
        parameter: String,
        display_name: String,
        /// Every active, required field that feeds the parameter.
        fields: Vec<String>,
    },

    #[error("{}", describe_unresolved(.field, .value.as_deref()))]
    UnresolvedOperation { field: String, value: Option<String> },

    #[error("No block of type '{0}' is registered")]
    UnknownBlock(String),
}

fn describe_unresolved(field: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("Operation '{}' selected in field '{}' is not supported", v, field),
        None => format!("No operation selected in field '{}'", field),
    }
}

impl ResolutionError {
    /// The field keys this error is about. Empty for block-level errors.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ResolutionError::Coercion(e) => vec![e.field.as_str()],
            ResolutionError::MissingRequiredField { fields, .. } => {
                fields.iter().map(String::as_str).collect()
            }
            ResolutionError::UnresolvedOperation { field, .. } => vec![field.as_str()],
            ResolutionError::Schema(_) | ResolutionError::UnknownBlock(_) => Vec::new(),
        }
    }
}

/// Every problem found in one resolution pass. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionErrors(Vec<ResolutionError>);

impl ResolutionErrors {
    pub(crate) fn new(errors: Vec<ResolutionError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolutionError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ResolutionError> {
        self.0
    }
}

impl From<ResolutionError> for ResolutionErrors {
    fn from(error: ResolutionError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ResolutionErrors {
    type Item = ResolutionError;
    type IntoIter = std::vec::IntoIter<ResolutionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ResolutionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().map(ToString::to_string).join("; "))
    }
}

impl std::error::Error for ResolutionErrors {}

/// Errors while writing or reading a schema bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Could not access bundle file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bundle encoding failed: {0}")]
    Encode(String),

    #[error("Bundle decoding failed: {0}")]
    Decode(String),

    #[error("Bundle format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Schema '{block_type}' cannot be stored in a bundle: {message}")]
    Schema { block_type: String, message: String },

    #[error(transparent)]
    Invalid(#[from] SchemaError),
}
