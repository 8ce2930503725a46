//! Replies from the next stage and completions returned to the caller

use std::fmt;

use crate::errors::ExError;
use crate::model::{Control, Message};

/// Directory result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    OperationsError,
    ProtocolError,
    NoSuchAttribute,
    UndefinedAttributeType,
    ConstraintViolation,
    InvalidAttributeSyntax,
    NoSuchObject,
    InvalidDnSyntax,
    UnwillingToPerform,
    NamingViolation,
    ObjectClassViolation,
    EntryAlreadyExists,
    ObjectClassModsProhibited,
    Other(u32),
}

impl ResultCode {
    pub fn as_u32(self) -> u32 {
        match self {
            ResultCode::Success => 0,
            ResultCode::OperationsError => 1,
            ResultCode::ProtocolError => 2,
            ResultCode::NoSuchAttribute => 16,
            ResultCode::UndefinedAttributeType => 17,
            ResultCode::ConstraintViolation => 19,
            ResultCode::InvalidAttributeSyntax => 21,
            ResultCode::NoSuchObject => 32,
            ResultCode::InvalidDnSyntax => 34,
            ResultCode::UnwillingToPerform => 53,
            ResultCode::NamingViolation => 64,
            ResultCode::ObjectClassViolation => 65,
            ResultCode::EntryAlreadyExists => 68,
            ResultCode::ObjectClassModsProhibited => 69,
            ResultCode::Other(code) => code,
        }
    }

    pub fn from_u32(code: u32) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::OperationsError,
            2 => ResultCode::ProtocolError,
            16 => ResultCode::NoSuchAttribute,
            17 => ResultCode::UndefinedAttributeType,
            19 => ResultCode::ConstraintViolation,
            21 => ResultCode::InvalidAttributeSyntax,
            32 => ResultCode::NoSuchObject,
            34 => ResultCode::InvalidDnSyntax,
            53 => ResultCode::UnwillingToPerform,
            64 => ResultCode::NamingViolation,
            65 => ResultCode::ObjectClassViolation,
            68 => ResultCode::EntryAlreadyExists,
            69 => ResultCode::ObjectClassModsProhibited,
            other => ResultCode::Other(other),
        }
    }

    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Other(code) => write!(f, "Other({})", code),
            named => write!(f, "{:?}({})", named, named.as_u32()),
        }
    }
}

/// Extended-operation response carried on a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedResponse {
    pub oid: String,
    pub value: Option<Vec<u8>>,
}

/// Final outcome of an operation
///
/// Completions produced by the next stage are relayed to the caller
/// untouched, controls and extended response included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub code: ResultCode,
    pub error_message: String,
    pub controls: Vec<Control>,
    pub response: Option<ExtendedResponse>,
}

impl Completion {
    pub fn success() -> Self {
        Self::with_code(ResultCode::Success, "")
    }

    pub fn with_code(code: ResultCode, error_message: impl Into<String>) -> Self {
        Self {
            code,
            error_message: error_message.into(),
            controls: Vec::new(),
            response: None,
        }
    }

    /// Completion for a failure raised by this stage
    pub fn from_error(err: &ExError) -> Self {
        Self::with_code(err.result_code(), err.message())
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// One reply to a nested submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Entry(Message),
    Referral(String),
    Done(Completion),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_result_code_numbers_round_trip() {
        for code in [0u32, 1, 16, 32, 53, 64, 65, 69, 80] {
            assert_eq!(ResultCode::from_u32(code).as_u32(), code);
        }
        assert_eq!(ResultCode::from_u32(80), ResultCode::Other(80));
    }

    #[test]
    fn test_completion_from_error_uses_wire_code() {
        let err = ExError::new(ExErrorKind::ClassViolation).with_message("no objectClass");
        let done = Completion::from_error(&err);

        assert_eq!(done.code, ResultCode::ObjectClassViolation);
        assert_eq!(done.error_message, "no objectClass");
        assert!(!done.is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultCode::NoSuchObject.to_string(), "NoSuchObject(32)");
    }
}
