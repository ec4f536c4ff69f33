use thiserror::Error;
use vgraph_core_types::RequestId;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by the HTTP layer, by bulk item
/// results and by tests. Codes are part of the compatibility surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VgErrorKind {
    // Write contention
    KeyConflict,
    VersionConflict,

    // Referential integrity
    DanglingReference,
    NotFound,

    // Request shape
    Validation,
    LimitExceeded,

    // Integration/IO
    Persistence,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl VgErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            VgErrorKind::KeyConflict => "ERR_KEY_CONFLICT",
            VgErrorKind::VersionConflict => "ERR_VERSION_CONFLICT",
            VgErrorKind::DanglingReference => "ERR_DANGLING_REFERENCE",
            VgErrorKind::NotFound => "ERR_NOT_FOUND",
            VgErrorKind::Validation => "ERR_VALIDATION",
            VgErrorKind::LimitExceeded => "ERR_LIMIT_EXCEEDED",
            VgErrorKind::Persistence => "ERR_PERSISTENCE",
            VgErrorKind::Serialization => "ERR_SERIALIZATION",
            VgErrorKind::Io => "ERR_IO",
            VgErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a caller can recover by looking up or refetching state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            VgErrorKind::KeyConflict | VgErrorKind::VersionConflict
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus enough context (operation, entity, branch,
/// request) for an API response or a log line.
#[derive(Debug, Clone)]
pub struct VgError {
    kind: VgErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    branch_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl VgError {
    /// Create a new error with the specified kind
    pub fn new(kind: VgErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            branch_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity (canonical or version) id context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add branch context
    pub fn with_branch_id(mut self, id: impl Into<String>) -> Self {
        self.branch_id = Some(id.into());
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

    pub fn kind(&self) -> VgErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn branch_id(&self) -> Option<&str> {
        self.branch_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for VgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(branch_id) = &self.branch_id {
            write!(f, " (branch_id: {})", branch_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for VgError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Key already used by a live entity of the same type on the branch
    #[error("Key '{key}' already used by {existing_id} for type {entity_type} on branch {branch}")]
    KeyConflict {
        entity_type: String,
        key: String,
        branch: String,
        existing_id: String,
    },

    /// Head changed between the caller's read and this write
    #[error("Head of {canonical_id} on branch {branch} is {actual:?}, expected {expected:?}")]
    VersionConflict {
        canonical_id: String,
        branch: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Relationship endpoint does not resolve to a live object on the branch
    #[error("Endpoint {endpoint_id} is not a live object on branch {branch}")]
    DanglingReference { endpoint_id: String, branch: String },

    /// No live head (or no record at all) for the id on the branch
    #[error("Entity not found: {id} on branch {branch}")]
    NotFound { id: String, branch: String },

    /// Version id is unknown
    #[error("Version not found: {version_id}")]
    VersionNotFound { version_id: String },

    /// Branch id is unknown
    #[error("Branch not found: {branch_id}")]
    BranchNotFound { branch_id: String },

    /// Malformed payload
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// Batch or traversal bound exceeded
    #[error("Limit exceeded for {what}: requested {requested}, maximum {max}")]
    LimitExceeded {
        what: String,
        requested: usize,
        max: usize,
    },

    /// Journal (persistence) failure; the write was not committed
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GraphError {
    pub fn validation(reason: impl Into<String>) -> Self {
        GraphError::Validation {
            reason: reason.into(),
        }
    }

    /// Error kind without building the full structured error
    pub fn kind(&self) -> VgErrorKind {
        match self {
            GraphError::KeyConflict { .. } => VgErrorKind::KeyConflict,
            GraphError::VersionConflict { .. } => VgErrorKind::VersionConflict,
            GraphError::DanglingReference { .. } => VgErrorKind::DanglingReference,
            GraphError::NotFound { .. }
            | GraphError::VersionNotFound { .. }
            | GraphError::BranchNotFound { .. } => VgErrorKind::NotFound,
            GraphError::Validation { .. } => VgErrorKind::Validation,
            GraphError::LimitExceeded { .. } => VgErrorKind::LimitExceeded,
            GraphError::Persistence { .. } => VgErrorKind::Persistence,
            GraphError::Serialization { .. } => VgErrorKind::Serialization,
            GraphError::Internal { .. } => VgErrorKind::Internal,
        }
    }
}

/// Conversion from GraphError to the structured VgError
impl From<GraphError> for VgError {
    fn from(err: GraphError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            GraphError::KeyConflict {
                branch,
                existing_id,
                ..
            } => VgError::new(kind)
                .with_entity_id(existing_id)
                .with_branch_id(branch)
                .with_message(message),

            GraphError::VersionConflict {
                canonical_id,
                branch,
                ..
            } => VgError::new(kind)
                .with_entity_id(canonical_id)
                .with_branch_id(branch)
                .with_message(message),

            GraphError::DanglingReference {
                endpoint_id,
                branch,
            } => VgError::new(kind)
                .with_entity_id(endpoint_id)
                .with_branch_id(branch)
                .with_message(message),

            GraphError::NotFound { id, branch } => VgError::new(kind)
                .with_entity_id(id)
                .with_branch_id(branch)
                .with_message(message),

            GraphError::VersionNotFound { version_id } => VgError::new(kind)
                .with_entity_id(version_id)
                .with_message(message),

            GraphError::BranchNotFound { branch_id } => VgError::new(kind)
                .with_branch_id(branch_id)
                .with_message(message),

            GraphError::Validation { .. }
            | GraphError::LimitExceeded { .. }
            | GraphError::Persistence { .. }
            | GraphError::Serialization { .. }
            | GraphError::Internal { .. } => VgError::new(kind).with_message(message),
        }
    }
}

/// Journal errors surface as persistence failures of the write they guarded
impl From<VgError> for GraphError {
    fn from(err: VgError) -> Self {
        GraphError::Persistence {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization {
            message: err.to_string(),
        }
    }
}
