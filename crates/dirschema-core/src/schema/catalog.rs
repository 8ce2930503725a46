//! In-memory schema snapshot and an installable schema slot

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SchemaError};
use crate::schema::{AttributeRecord, ClassRecord, SchemaProvider, SchemaView};

/// Immutable set of class and attribute definitions
///
/// Lookups fold ASCII case, so `User`, `user` and `USER` resolve alike.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: Vec<ClassRecord>,
    attributes: Vec<AttributeRecord>,
    class_index: HashMap<String, usize>,
    attribute_index: HashMap<String, usize>,
}

/// Serialized form of a schema snapshot
#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    classes: Vec<ClassRecord>,
    #[serde(default)]
    attributes: Vec<AttributeRecord>,
}

impl Schema {
    /// Build a schema from its records
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` when two classes or two
    /// attributes share a name once case is folded.
    pub fn new(classes: Vec<ClassRecord>, attributes: Vec<AttributeRecord>) -> Result<Self> {
        let mut class_index = HashMap::with_capacity(classes.len());
        for (idx, class) in classes.iter().enumerate() {
            if class_index.insert(fold(&class.name), idx).is_some() {
                return Err(SchemaError::InvalidSchema {
                    message: format!("duplicate class {}", class.name),
                });
            }
        }

        let mut attribute_index = HashMap::with_capacity(attributes.len());
        for (idx, attribute) in attributes.iter().enumerate() {
            if attribute_index
                .insert(fold(&attribute.canonical_name), idx)
                .is_some()
            {
                return Err(SchemaError::InvalidSchema {
                    message: format!("duplicate attribute {}", attribute.canonical_name),
                });
            }
        }

        Ok(Self {
            classes,
            attributes,
            class_index,
            attribute_index,
        })
    }

    /// Load a snapshot from JSON of the form
    /// `{"classes": [...], "attributes": [...]}`
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` for malformed JSON or duplicate
    /// names.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(text)?;
        Self::new(doc.classes, doc.attributes)
    }

    /// Serialize the snapshot in the form `from_json_str` accepts
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        let doc = SchemaDocument {
            classes: self.classes.clone(),
            attributes: self.attributes.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn attributes(&self) -> &[AttributeRecord] {
        &self.attributes
    }
}

impl SchemaView for Schema {
    fn resolve_class(&self, name: &str) -> Option<&ClassRecord> {
        self.class_index
            .get(&fold(name))
            .and_then(|idx| self.classes.get(*idx))
    }

    fn resolve_attribute(&self, name: &str) -> Option<&AttributeRecord> {
        self.attribute_index
            .get(&fold(name))
            .and_then(|idx| self.attributes.get(*idx))
    }
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Schema holder that can be filled, swapped or emptied at runtime
///
/// Operations capture the snapshot present when they are intercepted, so a
/// swap never affects work already in flight.
#[derive(Default)]
pub struct SchemaSlot {
    current: RefCell<Option<Arc<dyn SchemaView>>>,
}

impl SchemaSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: impl SchemaView + Send + Sync + 'static) -> Self {
        let slot = Self::empty();
        slot.install(schema);
        slot
    }

    pub fn install(&self, schema: impl SchemaView + Send + Sync + 'static) {
        let schema: Arc<dyn SchemaView> = Arc::new(schema);
        self.current.replace(Some(schema));
    }

    pub fn clear(&self) {
        self.current.replace(None);
    }

    pub fn is_loaded(&self) -> bool {
        self.current.borrow().is_some()
    }
}

impl SchemaProvider for SchemaSlot {
    fn current_schema(&self) -> Option<Arc<dyn SchemaView>> {
        self.current.borrow().clone()
    }
}
