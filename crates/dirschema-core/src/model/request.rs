//! Requests entering and leaving the stage

use crate::model::{Dn, Message};

/// Relax control: permits creation of system-only classes
pub const RELAX_OID: &str = "1.3.6.1.4.1.4203.666.5.12";
/// Show-deleted control: lets a lookup see tombstoned parents
pub const SHOW_DELETED_OID: &str = "1.2.840.113556.1.4.417";

/// Filter used for every nested base-object lookup
pub const MATCH_ANY_FILTER: &str = "(objectClass=*)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub oid: String,
    pub critical: bool,
}

impl Control {
    pub fn new(oid: impl Into<String>, critical: bool) -> Self {
        Self {
            oid: oid.into(),
            critical,
        }
    }

    pub fn relax() -> Self {
        Self::new(RELAX_OID, false)
    }

    pub fn show_deleted() -> Self {
        Self::new(SHOW_DELETED_OID, false)
    }
}

pub fn has_control(controls: &[Control], oid: &str) -> bool {
    controls.iter().any(|c| c.oid == oid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Modify,
    Rename,
}

impl OperationKind {
    /// Name used as the `op` field of log events
    pub fn op_name(self) -> &'static str {
        match self {
            OperationKind::Add => "objectclass_add",
            OperationKind::Modify => "objectclass_modify",
            OperationKind::Rename => "objectclass_rename",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(Message),
    Modify(Message),
    Rename { old_dn: Dn, new_dn: Dn },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Add(_) => OperationKind::Add,
            Operation::Modify(_) => OperationKind::Modify,
            Operation::Rename { .. } => OperationKind::Rename,
        }
    }

    /// DN the operation creates or changes; the destination for renames
    pub fn target_dn(&self) -> &Dn {
        match self {
            Operation::Add(msg) | Operation::Modify(msg) => &msg.dn,
            Operation::Rename { new_dn, .. } => new_dn,
        }
    }
}

/// A write operation with its request controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub controls: Vec<Control>,
}

impl Request {
    pub fn new(operation: Operation, controls: Vec<Control>) -> Self {
        Self {
            operation,
            controls,
        }
    }

    pub fn add(entry: Message) -> Self {
        Self::new(Operation::Add(entry), Vec::new())
    }

    pub fn modify(changes: Message) -> Self {
        Self::new(Operation::Modify(changes), Vec::new())
    }

    pub fn rename(old_dn: Dn, new_dn: Dn) -> Self {
        Self::new(Operation::Rename { old_dn, new_dn }, Vec::new())
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn has_control(&self, oid: &str) -> bool {
        has_control(&self.controls, oid)
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }

    pub fn add_message(&self) -> Option<&Message> {
        match &self.operation {
            Operation::Add(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn modify_message(&self) -> Option<&Message> {
        match &self.operation {
            Operation::Modify(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn rename_dns(&self) -> Option<(&Dn, &Dn)> {
        match &self.operation {
            Operation::Rename { old_dn, new_dn } => Some((old_dn, new_dn)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Base,
    OneLevel,
    Subtree,
}

/// Read-only search submitted to the next stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub base: Dn,
    pub scope: Scope,
    pub filter: String,
    pub attributes: Vec<String>,
    pub controls: Vec<Control>,
}

impl LookupRequest {
    /// Base-object read of `base` returning only `attributes`
    pub fn base_object(base: Dn, attributes: &[&str]) -> Self {
        Self {
            base,
            scope: Scope::Base,
            filter: MATCH_ANY_FILTER.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            controls: Vec::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dn_of_rename_is_destination() {
        let old = Dn::parse("CN=a,DC=example").unwrap();
        let new = Dn::parse("CN=b,DC=example").unwrap();
        let req = Request::rename(old, new.clone());

        assert_eq!(req.operation.target_dn(), &new);
        assert_eq!(req.kind(), OperationKind::Rename);
        assert!(req.add_message().is_none());
    }

    #[test]
    fn test_base_object_lookup() {
        let lookup = LookupRequest::base_object(Dn::parse("DC=example").unwrap(), &["objectClass"])
            .with_control(Control::show_deleted());

        assert_eq!(lookup.scope, Scope::Base);
        assert_eq!(lookup.filter, MATCH_ANY_FILTER);
        assert_eq!(lookup.attributes, vec!["objectClass".to_string()]);
        assert!(has_control(&lookup.controls, SHOW_DELETED_OID));
    }

    #[test]
    fn test_relax_control_detection() {
        let req = Request::add(Message::new(Dn::default())).with_control(Control::relax());
        assert!(req.has_control(RELAX_OID));
        assert!(!req.has_control(SHOW_DELETED_OID));
    }
}
