use confwire_core_types::EventId;
use thiserror::Error;

/// Result type alias using ConfwireError
pub type Result<T> = std::result::Result<T, ConfwireError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that log lines, CLI output and
/// tests can match on without depending on message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Registry
    NotFound,

    // Collaborators
    /// The property accessor for a source could not be read
    AccessorFailed,
    /// The event sink rejected an aggregated change event
    SinkFailed,

    // Configuration
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AccessorFailed => "ERR_ACCESSOR_FAILED",
            ExErrorKind::SinkFailed => "ERR_SINK_FAILED",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional
/// context (operation, source name, property key, event id).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    source_name: Option<String>,
    key: Option<String>,
    event_id: Option<EventId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            source_name: None,
            key: None,
            event_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add configuration source context
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Add property key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add the id of the event being delivered
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the configuration source name, if any
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Get the property key, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the event id, if any
    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source_name) = &self.source_name {
            write!(f, " (source: {})", source_name)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(event_id) = &self.event_id {
            write!(f, " (event_id: {})", event_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for confwire operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfwireError {
    // ===== Registry Errors =====
    /// A batch arrived for a source that was never registered
    #[error("Configuration source not registered: {source_name}")]
    SourceNotRegistered { source_name: String },

    // ===== Collaborator Errors =====
    /// The accessor could not list or read the properties of a source
    #[error("Failed to read configuration source {source_name}: {message}")]
    AccessorFailed {
        source_name: String,
        message: String,
    },

    /// The sink rejected an aggregated change event
    #[error("Failed to publish change event for {source_name}: {message}")]
    SinkFailed {
        source_name: String,
        message: String,
    },

    // ===== Configuration Errors =====
    /// A config file could not be read or parsed
    #[error("Invalid config file {path}: {message}")]
    ConfigFile { path: String, message: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON/TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ConfwireError {
    /// Shorthand for an accessor failure on `source_name`
    pub fn accessor(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfwireError::AccessorFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a sink failure while delivering for `source_name`
    pub fn sink(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfwireError::SinkFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Conversion from ConfwireError to ExError
impl From<ConfwireError> for ExError {
    fn from(err: ConfwireError) -> Self {
        match err {
            ConfwireError::SourceNotRegistered { source_name } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_source_name(source_name)
                    .with_op("on_batch")
                    .with_message("Configuration source not registered")
            }

            ConfwireError::AccessorFailed {
                source_name,
                message,
            } => ExError::new(ExErrorKind::AccessorFailed)
                .with_source_name(source_name)
                .with_message(message),

            ConfwireError::SinkFailed {
                source_name,
                message,
            } => ExError::new(ExErrorKind::SinkFailed)
                .with_source_name(source_name)
                .with_op("publish")
                .with_message(message),

            ConfwireError::ConfigFile { path, message } => ExError::new(ExErrorKind::InvalidConfig)
                .with_message(format!("{}: {}", path, message)),

            ConfwireError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            ConfwireError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ConfwireError
impl From<serde_json::Error> for ConfwireError {
    fn from(err: serde_json::Error) -> Self {
        ConfwireError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to ConfwireError
impl From<toml::de::Error> for ConfwireError {
    fn from(err: toml::de::Error) -> Self {
        ConfwireError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_kind_codes() {
        let cases = [
            (ExErrorKind::AccessorFailed, "ERR_ACCESSOR_FAILED"),
            (ExErrorKind::SinkFailed, "ERR_SINK_FAILED"),
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::AccessorFailed)
            .with_op("on_batch")
            .with_source_name("application")
            .with_message("cache evicted");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_ACCESSOR_FAILED]"));
        assert!(rendered.contains("'on_batch'"));
        assert!(rendered.contains("(source: application)"));
    }

    #[test]
    fn test_std_source_chain() {
        use std::error::Error as _;

        let inner = ExError::new(ExErrorKind::Io).with_message("disk");
        let outer = ExError::new(ExErrorKind::InvalidConfig).with_source(inner);
        let source = outer.source().expect("source should be present");
        assert!(source.to_string().contains("ERR_IO"));
    }
}
