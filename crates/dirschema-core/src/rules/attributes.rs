//! Attribute name validation

use crate::errors::{Result, SchemaError};
use crate::model::{Message, OperationKind};
use crate::schema::names::CLEAR_TEXT_PASSWORD;
use crate::schema::SchemaView;

/// Validate element names and rewrite them to their canonical spelling
///
/// `clearTextPassword` is allowed through without a schema entry. Elements
/// checked before a failure keep their rewritten names.
///
/// # Errors
///
/// - `UnknownAttribute` for a name the schema does not define
/// - `ConstructedAttributeOnAdd` or `ConstructedAttributeOnModify` for a
///   constructed attribute, depending on `kind`
pub fn fix_check_attributes(
    schema: &dyn SchemaView,
    draft: &mut Message,
    kind: OperationKind,
) -> Result<()> {
    for element in &mut draft.elements {
        let Some(attribute) = schema.resolve_attribute(&element.name) else {
            if element.is_named(CLEAR_TEXT_PASSWORD) {
                continue;
            }
            return Err(SchemaError::UnknownAttribute {
                name: element.name.clone(),
            });
        };

        element.name = attribute.canonical_name.clone();

        if attribute.is_constructed {
            let name = attribute.canonical_name.clone();
            return Err(match kind {
                OperationKind::Add => SchemaError::ConstructedAttributeOnAdd { name },
                OperationKind::Modify | OperationKind::Rename => {
                    SchemaError::ConstructedAttributeOnModify { name }
                }
            });
        }
    }
    Ok(())
}
