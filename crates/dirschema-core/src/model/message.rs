//! Directory messages: a DN plus named multi-valued elements

use std::fmt;

use dirschema_core_types::Sensitive;

use crate::errors::{Result, SchemaError};
use crate::model::Dn;
use crate::schema::names::CLEAR_TEXT_PASSWORD;

/// Modification flag carried by an element of a Modify message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModOp {
    Add,
    Replace,
    Delete,
}

/// One named attribute with its values
#[derive(Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub op: Option<ModOp>,
    pub values: Vec<String>,
}

impl Element {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            op: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_op<S: Into<String>>(
        name: impl Into<String>,
        op: ModOp,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            op: Some(op),
            ..Self::new(name, values)
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

// Password values never reach log output.
impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("name", &self.name).field("op", &self.op);
        if self.is_named(CLEAR_TEXT_PASSWORD) {
            s.field("values", &Sensitive::new(&self.values));
        } else {
            s.field("values", &self.values);
        }
        s.finish()
    }
}

/// DN plus an ordered list of elements
///
/// Used for Add entries, Modify change lists and lookup results alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub dn: Dn,
    pub elements: Vec<Element>,
}

/// The mutable per-operation copy of an entry being shaped for forwarding
pub type EntryDraft = Message;

impl Message {
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// First element with this name, compared case-insensitively
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.is_named(name))
    }

    pub fn find_element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.is_named(name))
    }

    /// Remove every element with this name; returns whether any existed
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| !e.is_named(name));
        before != self.elements.len()
    }

    /// Replace the values of an element in place, or append a new one
    ///
    /// The element keeps its position; later duplicates are dropped.
    pub fn set_values(&mut self, name: &str, op: Option<ModOp>, values: Vec<String>) {
        match self.elements.iter().position(|e| e.is_named(name)) {
            Some(idx) => {
                let element = &mut self.elements[idx];
                element.op = op;
                element.values = values;
                let mut seen = 0usize;
                self.elements.retain(|e| {
                    if e.is_named(name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.elements.push(Element {
                name: name.to_string(),
                op,
                values,
            }),
        }
    }

    /// Append a value to an existing element, or add the element
    pub fn add_value(&mut self, name: &str, value: impl Into<String>) {
        match self.find_element_mut(name) {
            Some(element) => element.values.push(value.into()),
            None => {
                let value: String = value.into();
                self.elements.push(Element::new(name, [value]));
            }
        }
    }

    /// First value of an element read as a signed 32-bit integer
    ///
    /// Values outside the 32-bit range wrap the way a C `long` to `int`
    /// cast does, so `4294967295` reads back as `-1`. Missing or
    /// non-numeric values yield `default`.
    pub fn first_value_as_i32(&self, name: &str, default: i32) -> i32 {
        self.find_element(name)
            .and_then(|e| e.values.first())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map_or(default, |v| v as i32)
    }

    /// Structural checks applied before a message is forwarded
    ///
    /// # Errors
    ///
    /// `SchemaError::EmptyDn` for a null DN, `SchemaError::EmptyAttributeValue`
    /// when any element carries an empty string value.
    pub fn sanity_check(&self) -> Result<()> {
        if self.dn.is_null() {
            return Err(SchemaError::EmptyDn);
        }
        for element in &self.elements {
            if element.values.iter().any(String::is_empty) {
                return Err(SchemaError::EmptyAttributeValue {
                    dn: self.dn.linearized(),
                    name: element.name.clone(),
                });
            }
        }
        Ok(())
    }
}
