use std::fmt;

use thiserror::Error;

/// Which of the two inputs a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The survey extract (CSV).
    Tabular,
    /// The region boundary collection (GeoJSON).
    Geographic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Tabular => write!(f, "tabular source"),
            SourceKind::Geographic => write!(f, "geographic source"),
        }
    }
}

/// Pipeline stage, used to locate fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Read,
    Normalize,
    Select,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Read => "read",
            Stage::Normalize => "normalize",
            Stage::Select => "select",
            Stage::Store => "store",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[{stage}] failed to retrieve {source_kind} from {url}: {cause:#}")]
    Retrieval {
        stage: Stage,
        source_kind: SourceKind,
        url: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("[{stage}] malformed {source_kind} payload: {cause:#}")]
    Decode {
        stage: Stage,
        source_kind: SourceKind,
        #[source]
        cause: anyhow::Error,
    },

    #[error("[{stage}] {source_kind} is missing required field(s): {}", .fields.join(", "))]
    Schema {
        stage: Stage,
        source_kind: SourceKind,
        fields: Vec<String>,
    },

    #[error("[{stage}] {source_kind} has no records; latest year is undefined")]
    EmptyInput { stage: Stage, source_kind: SourceKind },

    #[error("[{stage}] failed to store table to {destination}: {cause:#}")]
    Store {
        stage: Stage,
        destination: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// The stage that failed, if the error happened inside the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Retrieval { stage, .. }
            | PipelineError::Decode { stage, .. }
            | PipelineError::Schema { stage, .. }
            | PipelineError::EmptyInput { stage, .. }
            | PipelineError::Store { stage, .. } => Some(*stage),
            PipelineError::Config(_) => None,
        }
    }

    /// The source that failed, if the error is tied to one.
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self {
            PipelineError::Retrieval { source_kind, .. }
            | PipelineError::Decode { source_kind, .. }
            | PipelineError::Schema { source_kind, .. }
            | PipelineError::EmptyInput { source_kind, .. } => Some(*source_kind),
            PipelineError::Store { .. } | PipelineError::Config(_) => None,
        }
    }
}

/// Why a single feature's geometry could not be materialized.
/// Never fatal: the row keeps going with an absent geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryParseError {
    #[error("geometry payload is null")]
    Null,

    #[error("geometry payload is not an object")]
    NotAnObject,

    #[error("geometry object has no string `type`")]
    MissingType,

    #[error("unsupported geometry type `{0}`")]
    UnsupportedType(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

impl GeometryParseError {
    /// Short stable label used when tallying failures.
    pub fn reason(&self) -> &'static str {
        match self {
            GeometryParseError::Null => "null",
            GeometryParseError::NotAnObject => "not_an_object",
            GeometryParseError::MissingType => "missing_type",
            GeometryParseError::UnsupportedType(_) => "unsupported_type",
            GeometryParseError::InvalidCoordinates(_) => "invalid_coordinates",
        }
    }
}
