use dirschema_core_types::RequestId;
use thiserror::Error;

use crate::model::ResultCode;

/// Result type alias using SchemaError
pub type Result<T> = std::result::Result<T, SchemaError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable `ERR_*` code for programmatic handling and to
/// the directory result code reported on the wire. Unknown classes and
/// attributes are deliberately reported as `NoSuchAttribute`, which is what
/// Windows clients expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Schema validation
    InvalidAttribute,
    UndefinedAttributeType,
    InvalidAttributeSyntax,
    InvalidDnSyntax,
    ClassViolation,
    NamingViolation,
    ConstraintViolation,
    ObjectClassModsProhibited,

    // Operation policy
    UnwillingToPerform,
    NoSuchObject,

    // Pipeline
    OperationsError,
    /// A reply arrived that the operation was not waiting for
    UnexpectedReply,

    // Setup
    InvalidConfig,
    InvalidSchema,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidAttribute => "ERR_INVALID_ATTRIBUTE",
            ExErrorKind::UndefinedAttributeType => "ERR_UNDEFINED_ATTRIBUTE_TYPE",
            ExErrorKind::InvalidAttributeSyntax => "ERR_INVALID_ATTRIBUTE_SYNTAX",
            ExErrorKind::InvalidDnSyntax => "ERR_INVALID_DN_SYNTAX",
            ExErrorKind::ClassViolation => "ERR_CLASS_VIOLATION",
            ExErrorKind::NamingViolation => "ERR_NAMING_VIOLATION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::ObjectClassModsProhibited => "ERR_OBJECT_CLASS_MODS_PROHIBITED",
            ExErrorKind::UnwillingToPerform => "ERR_UNWILLING_TO_PERFORM",
            ExErrorKind::NoSuchObject => "ERR_NO_SUCH_OBJECT",
            ExErrorKind::OperationsError => "ERR_OPERATIONS_ERROR",
            ExErrorKind::UnexpectedReply => "ERR_UNEXPECTED_REPLY",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
        }
    }

    /// Result code reported to the original caller for this kind
    pub fn result_code(&self) -> ResultCode {
        match self {
            ExErrorKind::InvalidAttribute => ResultCode::NoSuchAttribute,
            ExErrorKind::UndefinedAttributeType => ResultCode::UndefinedAttributeType,
            ExErrorKind::InvalidAttributeSyntax => ResultCode::InvalidAttributeSyntax,
            ExErrorKind::InvalidDnSyntax => ResultCode::InvalidDnSyntax,
            ExErrorKind::ClassViolation => ResultCode::ObjectClassViolation,
            ExErrorKind::NamingViolation => ResultCode::NamingViolation,
            ExErrorKind::ConstraintViolation => ResultCode::ConstraintViolation,
            ExErrorKind::ObjectClassModsProhibited => ResultCode::ObjectClassModsProhibited,
            ExErrorKind::UnwillingToPerform => ResultCode::UnwillingToPerform,
            ExErrorKind::NoSuchObject => ResultCode::NoSuchObject,
            ExErrorKind::OperationsError
            | ExErrorKind::UnexpectedReply
            | ExErrorKind::InvalidConfig
            | ExErrorKind::InvalidSchema => ResultCode::OperationsError,
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus directory context
/// (DN, class, attribute) for debugging and error strings.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    dn: Option<String>,
    class_name: Option<String>,
    attribute: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            dn: None,
            class_name: None,
            attribute: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add distinguished name context
    pub fn with_dn(mut self, dn: impl Into<String>) -> Self {
        self.dn = Some(dn.into());
        self
    }

    /// Add objectClass context
    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Add attribute context
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
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

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn result_code(&self) -> ResultCode {
        self.kind.result_code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn dn(&self) -> Option<&str> {
        self.dn.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

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
        if let Some(dn) = &self.dn {
            write!(f, " (dn: {})", dn)?;
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

/// Domain error taxonomy for objectClass enforcement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    // ===== Class resolution =====
    #[error("objectclass {name} is not a valid objectClass in schema")]
    UnknownClass { name: String },

    #[error("objectclass {name} marked as isDefunct objectClass in schema - not valid for new objects")]
    DefunctClass { name: String },

    #[error("schema has no 'top' class")]
    MissingTopClass,

    #[error("objectclass {name} names parent {parent}, which is not in schema")]
    MissingParentClass { name: String, parent: String },

    #[error("objectclass {name} is not a valid objectClass in objectClass chain")]
    UnplaceableClass { name: String },

    // ===== Attributes =====
    #[error("attribute {name} is not a valid attribute in schema")]
    UnknownAttribute { name: String },

    #[error("attribute {name} is constructed and cannot be supplied on add")]
    ConstructedAttributeOnAdd { name: String },

    #[error("attribute {name} is constructed and cannot be modified")]
    ConstructedAttributeOnModify { name: String },

    #[error("element {name} of {dn} has an empty value")]
    EmptyAttributeValue { dn: String, name: String },

    // ===== Naming and structure =====
    #[error("objectClass must be specified when adding {dn}")]
    MissingObjectClass { dn: String },

    #[error("failed to find a structural class for {dn}")]
    NoStructuralClass { dn: String },

    #[error("RDN {rdn} is not correct for most specific structural objectclass {class_name}, should be {expected}")]
    WrongRdnAttribute {
        dn: String,
        rdn: String,
        class_name: String,
        expected: String,
    },

    #[error("structural objectClass {class_name} is not a valid child class for {parent_dn}")]
    ChildClassNotAllowed {
        class_name: String,
        parent_dn: String,
    },

    #[error("objectClass {class_name} is systemOnly, rejecting creation of {dn}")]
    SystemOnlyClass { class_name: String, dn: String },

    #[error("cannot add {dn}, parent does not exist")]
    ParentNotFound { dn: String },

    #[error("cannot rename to {dn}, parent does not exist")]
    RenameParentNotFound { dn: String },

    #[error("cannot rename {dn} to be a child of itself")]
    RenameUnderSelf { dn: String },

    #[error("modify message for {dn} must have elements")]
    EmptyModify { dn: String },

    #[error("objectClass of {dn} cannot be removed entirely")]
    ObjectClassDeleteAll { dn: String },

    // ===== Distinguished names =====
    #[error("DN {dn} has no leading component")]
    MissingRdn { dn: String },

    #[error("invalid DN {dn}: {reason}")]
    InvalidDn { dn: String, reason: String },

    #[error("entry has an empty DN")]
    EmptyDn,

    // ===== Pipeline =====
    #[error("lookup of {base} returned more than one entry")]
    TooManyResults { base: String },

    #[error("objectClass of {dn} could not be read back")]
    ClassesNotFound { dn: String },

    #[error("operation needs a schema snapshot but none was captured")]
    MissingSchema,

    #[error("unexpected reply: {detail}")]
    UnexpectedReply { detail: String },

    // ===== Setup =====
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid schema snapshot: {message}")]
    InvalidSchema { message: String },
}

/// Conversion from SchemaError to ExError
impl From<SchemaError> for ExError {
    fn from(err: SchemaError) -> Self {
        let message = err.to_string();
        let ex = match err {
            SchemaError::UnknownClass { name } | SchemaError::DefunctClass { name } => {
                ExError::new(ExErrorKind::InvalidAttribute).with_class_name(name)
            }
            SchemaError::MissingTopClass => ExError::new(ExErrorKind::ClassViolation),
            SchemaError::MissingParentClass { name, .. }
            | SchemaError::UnplaceableClass { name } => {
                ExError::new(ExErrorKind::ClassViolation).with_class_name(name)
            }

            SchemaError::UnknownAttribute { name } => {
                ExError::new(ExErrorKind::InvalidAttribute).with_attribute(name)
            }
            SchemaError::ConstructedAttributeOnAdd { name } => {
                ExError::new(ExErrorKind::UndefinedAttributeType).with_attribute(name)
            }
            SchemaError::ConstructedAttributeOnModify { name } => {
                ExError::new(ExErrorKind::ConstraintViolation).with_attribute(name)
            }
            SchemaError::EmptyAttributeValue { dn, name } => {
                ExError::new(ExErrorKind::InvalidAttributeSyntax)
                    .with_dn(dn)
                    .with_attribute(name)
            }

            SchemaError::MissingObjectClass { dn } => {
                ExError::new(ExErrorKind::ClassViolation).with_dn(dn)
            }
            SchemaError::NoStructuralClass { dn } => {
                ExError::new(ExErrorKind::NamingViolation).with_dn(dn)
            }
            SchemaError::WrongRdnAttribute { dn, class_name, .. } => {
                ExError::new(ExErrorKind::NamingViolation)
                    .with_dn(dn)
                    .with_class_name(class_name)
            }
            SchemaError::ChildClassNotAllowed {
                class_name,
                parent_dn,
            } => ExError::new(ExErrorKind::NamingViolation)
                .with_dn(parent_dn)
                .with_class_name(class_name),
            SchemaError::SystemOnlyClass { class_name, dn } => {
                ExError::new(ExErrorKind::UnwillingToPerform)
                    .with_dn(dn)
                    .with_class_name(class_name)
            }
            SchemaError::ParentNotFound { dn } => {
                ExError::new(ExErrorKind::NoSuchObject).with_dn(dn)
            }
            SchemaError::RenameParentNotFound { dn }
            | SchemaError::RenameUnderSelf { dn }
            | SchemaError::EmptyModify { dn } => {
                ExError::new(ExErrorKind::UnwillingToPerform).with_dn(dn)
            }
            SchemaError::ObjectClassDeleteAll { dn } => {
                ExError::new(ExErrorKind::ObjectClassModsProhibited).with_dn(dn)
            }

            SchemaError::MissingRdn { dn } => {
                ExError::new(ExErrorKind::OperationsError).with_dn(dn)
            }
            SchemaError::InvalidDn { dn, .. } => {
                ExError::new(ExErrorKind::InvalidDnSyntax).with_dn(dn)
            }
            SchemaError::EmptyDn => ExError::new(ExErrorKind::InvalidDnSyntax),

            SchemaError::TooManyResults { base } => {
                ExError::new(ExErrorKind::OperationsError).with_dn(base)
            }
            SchemaError::ClassesNotFound { dn } => {
                ExError::new(ExErrorKind::OperationsError).with_dn(dn)
            }
            SchemaError::MissingSchema => ExError::new(ExErrorKind::OperationsError),
            SchemaError::UnexpectedReply { .. } => ExError::new(ExErrorKind::UnexpectedReply),

            SchemaError::InvalidConfig { .. } => ExError::new(ExErrorKind::InvalidConfig),
            SchemaError::InvalidSchema { .. } => ExError::new(ExErrorKind::InvalidSchema),
        };
        ex.with_message(message)
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::InvalidSchema {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(err: toml::de::Error) -> Self {
        SchemaError::InvalidConfig {
            message: err.to_string(),
        }
    }
}
