//! Builders for the requests the stage forwards
//!
//! Pure functions: each takes the captured schema snapshot and the data the
//! operation has gathered so far and returns the message to send on.

use crate::config::ModuleConfig;
use crate::errors::{Result, SchemaError};
use crate::model::{Control, Dn, Element, EntryDraft, Message, ModOp, OperationKind};
use crate::pipeline::context::AfterForward;
use crate::policy::PolicyEnforcer;
use crate::rules::{fix_check_attributes, fix_dn, sort_object_classes, validate_class_names};
use crate::schema::names::OBJECT_CLASS;
use crate::schema::SchemaView;

/// Rebuild an Add entry under its parent (or as the naming root)
///
/// With a schema the attribute names are canonicalized, the objectClass
/// values replaced by the sorted chain and add-time policy applied. Without
/// one only the DN is fixed.
///
/// # Errors
///
/// `ParentNotFound` when there is no parent and the DN is not the naming
/// root, otherwise whatever the attribute, sorter or policy checks report.
pub fn build_add(
    schema: Option<&dyn SchemaView>,
    original: &Message,
    controls: &[Control],
    parent: Option<&Message>,
    root: Option<&Dn>,
    config: &ModuleConfig,
) -> Result<EntryDraft> {
    let mut draft = original.clone();

    draft.dn = match parent {
        Some(parent) => fix_dn(&original.dn, &parent.dn)?,
        None if root.is_some_and(|root| root.eq_dn(&original.dn)) => original.dn.clone(),
        None => {
            return Err(SchemaError::ParentNotFound {
                dn: original.dn.linearized(),
            })
        }
    };

    if let Some(schema) = schema {
        fix_check_attributes(schema, &mut draft, OperationKind::Add)?;

        // Repeated objectClass elements are folded into one chain.
        let requested: Vec<String> = draft
            .elements
            .iter()
            .filter(|el| el.is_named(OBJECT_CLASS))
            .flat_map(|el| el.values.iter().cloned())
            .collect();
        let chain = sort_object_classes(Some(schema), &requested)?;
        draft.set_values(OBJECT_CLASS, None, chain.as_slice().to_vec());

        PolicyEnforcer::new(schema, config).enforce_add(&mut draft, &chain, parent, controls)?;
    }

    draft.sanity_check()?;
    Ok(draft)
}

/// Shape a Modify and decide what happens after it is forwarded
///
/// Every objectClass element of the change list takes part in the plan. A
/// lone Delete with values is relayed and a lone Replace is sorted in
/// place. Any other shape keeps the client's elements as they are and
/// returns `LookupClasses`, so the stored chain can be re-sorted once the
/// change has landed.
///
/// # Errors
///
/// `ObjectClassDeleteAll` for a Replace or Delete leaving no classes, checked
/// before anything else, then attribute or class-name validation failures.
pub fn plan_modify(
    schema: &dyn SchemaView,
    original: &Message,
) -> Result<(EntryDraft, AfterForward)> {
    let classes: Vec<&Element> = original
        .elements
        .iter()
        .filter(|el| el.is_named(OBJECT_CLASS))
        .collect();

    if classes
        .iter()
        .any(|el| matches!(el.op, Some(ModOp::Delete | ModOp::Replace)) && el.values.is_empty())
    {
        return Err(SchemaError::ObjectClassDeleteAll {
            dn: original.dn.linearized(),
        });
    }

    let mut draft = original.clone();
    fix_check_attributes(schema, &mut draft, OperationKind::Modify)?;

    match classes.as_slice() {
        [] => Ok((draft, AfterForward::Relay)),
        [only] if only.op == Some(ModOp::Delete) => Ok((draft, AfterForward::Relay)),
        [only] if only.op == Some(ModOp::Replace) => {
            let chain = sort_object_classes(Some(schema), &only.values)?;
            draft.set_values(OBJECT_CLASS, Some(ModOp::Replace), chain.into_values());
            draft.sanity_check()?;
            Ok((draft, AfterForward::Relay))
        }
        mixed => {
            for element in mixed.iter().filter(|el| el.op != Some(ModOp::Delete)) {
                validate_class_names(schema, &element.values)?;
            }
            Ok((draft, AfterForward::LookupClasses))
        }
    }
}

/// Replace-only Modify rewriting an entry's stored objectClass in order
///
/// # Errors
///
/// `ClassesNotFound` when `current` carries no objectClass.
pub fn build_class_fixup(schema: &dyn SchemaView, dn: &Dn, current: &Message) -> Result<EntryDraft> {
    let stored = current
        .find_element(OBJECT_CLASS)
        .ok_or_else(|| SchemaError::ClassesNotFound {
            dn: dn.linearized(),
        })?;
    let chain = sort_object_classes(Some(schema), &stored.values)?;

    let draft = Message::new(dn.clone()).with_element(Element::with_op(
        OBJECT_CLASS,
        ModOp::Replace,
        chain.into_values(),
    ));
    draft.sanity_check()?;
    Ok(draft)
}
