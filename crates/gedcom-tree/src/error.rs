use gedcom_store::SchemaAccessError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line `{line_id}` already occurs {count} times, at most {max} are allowed")]
pub struct CardinalityError {
    pub line_id: String,
    pub count: usize,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreationError {
    #[error(transparent)]
    Access(#[from] SchemaAccessError),
    #[error(transparent)]
    Cardinality(#[from] CardinalityError),
}

/// Why a value or xref was not committed. The node keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("`{candidate}` is not one of {allowed:?}")]
    NotPossible { candidate: String, allowed: Vec<String> },
    #[error("`{candidate}` was rejected by the validator")]
    Validator { candidate: String },
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Accepted,
    Rejected(Rejection),
}

impl Assignment {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Error of the chaining [`NodeMut`](crate::NodeMut) setters, which treat a
/// rejected candidate as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error(transparent)]
    Access(#[from] SchemaAccessError),
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot follow `{}` at step {step}: {kind}", .path.join(" / "))]
pub struct PathError {
    pub(crate) path: Vec<String>,
    pub(crate) step: usize,
    pub(crate) kind: PathErrorKind,
}

impl PathError {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// 0-based index of the failing step.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn kind(&self) -> &PathErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathErrorKind {
    #[error("malformed step `{step}`: {reason}")]
    InvalidStep { step: String, reason: &'static str },
    #[error("`{name}` line number {requested} is out of range, only {available} exist")]
    LineNumber { name: String, requested: usize, available: usize },
    #[error("no line on the path allows another instance")]
    NoSplitPoint,
    #[error(transparent)]
    Access(#[from] SchemaAccessError),
    #[error(transparent)]
    Cardinality(#[from] CardinalityError),
}

impl From<CreationError> for PathErrorKind {
    fn from(error: CreationError) -> Self {
        match error {
            CreationError::Access(error) => Self::Access(error),
            CreationError::Cardinality(error) => Self::Cardinality(error),
        }
    }
}
