//! Error types for capture, binding and reconstruction.

/// Errors arising while capturing, normalising or replaying a constructor call.
#[derive(Debug, thiserror::Error)]
pub enum SerializableError {
    /// The instance never completed initialisation capture.
    ///
    /// This is a precondition violation: the type's constructor forgot to
    /// record its call. Callers must not retry.
    #[error(
        "cannot {operation} uninitialized {type_name}; forgot to call \
         `ArgCapture::initialize_from_locals` in its constructor?"
    )]
    Uninitialized {
        operation: &'static str,
        type_name: &'static str,
    },

    /// The declared signature has a shape the capture model cannot replay.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The declared signature is malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The call does not satisfy the declared signature.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// A declared parameter is absent from the locals passed to normalisation.
    #[error("missing local for parameter `{name}`")]
    MissingLocal { name: String },

    /// A local exists but does not have the shape its parameter requires.
    #[error("invalid local for parameter `{name}`: {reason}")]
    InvalidLocal { name: String, reason: String },

    /// A constructor rejected one of its argument values.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("state encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("signature table error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SerializableError {
    /// Stable snake_case class for this error, used by fixture vectors.
    pub fn kind(&self) -> &'static str {
        match self {
            SerializableError::Uninitialized { .. } => "uninitialized",
            SerializableError::NotSupported(_) => "not_supported",
            SerializableError::InvalidSignature(_) => "invalid_signature",
            SerializableError::Bind(err) => err.kind(),
            SerializableError::MissingLocal { .. } => "missing_local",
            SerializableError::InvalidLocal { .. } => "invalid_local",
            SerializableError::InvalidArgument { .. } => "invalid_argument",
            SerializableError::Json(_) => "json",
            SerializableError::Toml(_) => "toml",
        }
    }

    pub(crate) fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        SerializableError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of binding a raw call against a signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("too many positional arguments: expected at most {expected}, got {given}")]
    TooManyPositional { expected: usize, given: usize },

    #[error("missing a required argument: `{name}`")]
    MissingArgument { name: String },

    #[error("multiple values for argument `{name}`")]
    MultipleValues { name: String },

    #[error("got an unexpected keyword argument `{name}`")]
    UnexpectedKeyword { name: String },

    #[error("positional-only argument `{name}` passed as keyword")]
    PositionalOnlyAsKeyword { name: String },
}

impl BindError {
    pub fn kind(&self) -> &'static str {
        match self {
            BindError::TooManyPositional { .. } => "too_many_positional",
            BindError::MissingArgument { .. } => "missing_argument",
            BindError::MultipleValues { .. } => "multiple_values",
            BindError::UnexpectedKeyword { .. } => "unexpected_keyword",
            BindError::PositionalOnlyAsKeyword { .. } => "positional_only_as_keyword",
        }
    }
}
