//! Schema records and the read-only schema view
//!
//! The stage never owns the schema. It reads class and attribute
//! definitions through [`SchemaView`] and obtains the view for each
//! operation from a [`SchemaProvider`], which may have nothing installed
//! yet while the directory is bootstrapping.

pub mod catalog;
pub mod flags;
pub mod names;

use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use catalog::{Schema, SchemaSlot};

/// Category of an objectClass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Structural,
    Abstract,
    Auxiliary,
}

/// Definition of one objectClass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    /// Superclass name; `top` names itself
    pub parent_name: String,
    /// Depth-like rank; parents rank lower than their children
    pub order_rank: u32,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub is_defunct: bool,
    #[serde(default)]
    pub is_system_only: bool,
    /// Attribute that must name entries of this class
    #[serde(default)]
    pub rdn_attribute: Option<String>,
    /// DN string stored as objectCategory on new entries
    #[serde(default)]
    pub default_category: String,
    #[serde(default)]
    pub default_hidden: bool,
    /// Classes permitted directly beneath entries of this class
    #[serde(default)]
    pub allowed_child_classes: Vec<String>,
}

impl ClassRecord {
    /// Structural class with no naming or containment rules
    pub fn new(name: impl Into<String>, parent_name: impl Into<String>, order_rank: u32) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
            order_rank,
            kind: ClassKind::Structural,
            is_defunct: false,
            is_system_only: false,
            rdn_attribute: None,
            default_category: String::new(),
            default_hidden: false,
            allowed_child_classes: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn defunct(mut self) -> Self {
        self.is_defunct = true;
        self
    }

    pub fn system_only(mut self) -> Self {
        self.is_system_only = true;
        self
    }

    pub fn with_rdn_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.rdn_attribute = Some(attribute.into());
        self
    }

    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_hidden = true;
        self
    }

    pub fn allowing_children<S: Into<String>>(
        mut self,
        classes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_child_classes
            .extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn is_structural(&self) -> bool {
        self.kind == ClassKind::Structural
    }

    pub fn is_top(&self) -> bool {
        self.name.eq_ignore_ascii_case(names::TOP)
    }

    /// Whether `child` may be created directly beneath entries of this class
    pub fn allows_child(&self, child: &str) -> bool {
        self.allowed_child_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(child))
    }
}

/// Definition of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub canonical_name: String,
    /// Computed by the directory; clients may never write it
    #[serde(default)]
    pub is_constructed: bool,
}

impl AttributeRecord {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            is_constructed: false,
        }
    }

    pub fn constructed(mut self) -> Self {
        self.is_constructed = true;
        self
    }
}

/// Read-only, case-insensitive access to schema definitions
pub trait SchemaView {
    fn resolve_class(&self, name: &str) -> Option<&ClassRecord>;

    fn resolve_attribute(&self, name: &str) -> Option<&AttributeRecord>;
}

/// Source of the schema snapshot an operation works against
///
/// Returning `None` means no schema is loaded yet; Add and Modify then
/// fall back to their bootstrap behaviour.
pub trait SchemaProvider {
    fn current_schema(&self) -> Option<Arc<dyn SchemaView>>;
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for &T {
    fn current_schema(&self) -> Option<Arc<dyn SchemaView>> {
        (**self).current_schema()
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for Rc<T> {
    fn current_schema(&self) -> Option<Arc<dyn SchemaView>> {
        (**self).current_schema()
    }
}
