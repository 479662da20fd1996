use oer_core_types::RequestId;
use thiserror::Error;

/// Result type alias using OerError
pub type Result<T> = std::result::Result<T, OerError>;

/// Result type alias for operations that cross the store/engine boundary
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that leaves the core, the store or the engine is classified
/// by one of these kinds. Each kind maps to a stable code used by the CLI,
/// the pull API and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    MalformedIdentifier,
    ContractViolation,
    InvalidInput,
    InvalidField,
    NotFound,

    // Lifecycle
    NotWritable,
    MissingPrerequisite,
    InconsistentState,

    // Collaborators
    ExternalNotifyFailure,
    ExternalService,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Timeout,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedIdentifier => "ERR_MALFORMED_IDENTIFIER",
            ExErrorKind::ContractViolation => "ERR_CONTRACT_VIOLATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidField => "ERR_INVALID_FIELD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::NotWritable => "ERR_NOT_WRITABLE",
            ExErrorKind::MissingPrerequisite => "ERR_MISSING_PREREQUISITE",
            ExErrorKind::InconsistentState => "ERR_INCONSISTENT_STATE",
            ExErrorKind::ExternalNotifyFailure => "ERR_EXTERNAL_NOTIFY_FAILURE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a batch job may skip the failing unit and continue
    pub fn is_recoverable_in_batch(&self) -> bool {
        matches!(
            self,
            ExErrorKind::MissingPrerequisite
                | ExErrorKind::InconsistentState
                | ExErrorKind::ExternalNotifyFailure
                | ExErrorKind::ExternalService
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context was known where the
/// error was raised: the operation, the element identifier, the course and,
/// for interactive edits, the offending field.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    identifier: Option<String>,
    course_id: Option<i64>,
    field: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            identifier: None,
            course_id: None,
            field: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add element identifier context
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Add course context
    pub fn with_course_id(mut self, course_id: i64) -> Self {
        self.course_id = Some(course_id);
        self
    }

    /// Name the field an interactive edit was rejected for
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn course_id(&self) -> Option<i64> {
        self.course_id
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
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
        if let Some(identifier) = &self.identifier {
            write!(f, " (identifier: {})", identifier)?;
        }
        if let Some(course_id) = self.course_id {
            write!(f, " (course: {})", course_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised inside the core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OerError {
    // ===== Identifier =====
    /// Identifier failed structural validation
    #[error("Malformed identifier '{identifier}': {reason}")]
    MalformedIdentifier { identifier: String, reason: String },

    // ===== Contract =====
    /// A required element field was empty
    #[error("Required field '{field}' must not be empty")]
    RequiredFieldEmpty { field: String },

    /// An element type value outside the known variants
    #[error("Unknown element type: {value}")]
    UnknownElementType { value: String },

    /// A file element nobody uses (should be unreachable)
    #[error("No course uses the content of element {identifier}")]
    EmptyUsage { identifier: String },

    /// Any other invariant the caller should have upheld
    #[error("Contract violation: {message}")]
    ContractViolation { message: String },

    // ===== Interactive edits =====
    /// Element metadata may not be changed from this course
    #[error("Element {identifier} is not writable from course {course_id}")]
    NotWritable { identifier: String, course_id: i64 },

    /// A submitted metadata field was rejected
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    // ===== Plugins =====
    /// Two plugins registered under the same key
    #[error("Plugin key registered twice: {key}")]
    DuplicatePlugin { key: String },

    /// A plugin key nobody registered
    #[error("Unknown plugin: {key}")]
    UnknownPlugin { key: String },

    /// A source plugin call failed
    #[error("Source plugin {plugin} failed: {message}")]
    Source { plugin: String, message: String },

    // ===== Configuration =====
    /// Configuration could not be parsed or is inconsistent
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<OerError> for ExError {
    fn from(err: OerError) -> Self {
        match err {
            OerError::MalformedIdentifier { identifier, reason } => {
                ExError::new(ExErrorKind::MalformedIdentifier)
                    .with_identifier(identifier)
                    .with_message(reason)
            }
            OerError::RequiredFieldEmpty { field } => ExError::new(ExErrorKind::ContractViolation)
                .with_field(field)
                .with_message("Required field is empty"),
            OerError::UnknownElementType { value } => {
                ExError::new(ExErrorKind::ContractViolation)
                    .with_message(format!("Unknown element type: {}", value))
            }
            OerError::EmptyUsage { identifier } => ExError::new(ExErrorKind::ContractViolation)
                .with_identifier(identifier)
                .with_message("No course uses the element content"),
            OerError::ContractViolation { message } => {
                ExError::new(ExErrorKind::ContractViolation).with_message(message)
            }
            OerError::NotWritable {
                identifier,
                course_id,
            } => ExError::new(ExErrorKind::NotWritable)
                .with_identifier(identifier)
                .with_course_id(course_id)
                .with_message("Element is not writable from this course"),
            OerError::InvalidField { field, reason } => ExError::new(ExErrorKind::InvalidField)
                .with_field(field)
                .with_message(reason),
            OerError::DuplicatePlugin { key } => ExError::new(ExErrorKind::ContractViolation)
                .with_op("register_plugin")
                .with_message(format!("Plugin key registered twice: {}", key)),
            OerError::UnknownPlugin { key } => ExError::new(ExErrorKind::NotFound)
                .with_message(format!("Unknown plugin: {}", key)),
            OerError::Source { plugin, message } => ExError::new(ExErrorKind::ExternalService)
                .with_message(format!("{}: {}", plugin, message)),
            OerError::Config { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_config")
                .with_message(reason),
            OerError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to OerError
impl From<serde_json::Error> for OerError {
    fn from(err: serde_json::Error) -> Self {
        OerError::Serialization {
            message: err.to_string(),
        }
    }
}
