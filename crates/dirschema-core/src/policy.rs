//! Creation policy for new entries
//!
//! `PolicyEnforcer` applies the directory's rules for creating an object of
//! a given structural class: naming, containment, system-only protection,
//! default attribute values and `systemFlags`. It runs on the rebuilt entry
//! after its objectClass chain has been sorted, and only when a schema
//! snapshot is available.

use crate::config::ModuleConfig;
use crate::errors::{Result, SchemaError};
use crate::model::{has_control, Control, Dn, EntryDraft, Message, RELAX_OID};
use crate::rules::{last_structural_class, ClassChain};
use crate::schema::flags::{
    ATTR_IS_RDN, CONFIG_ALLOW_LIMITED_MOVE, CONFIG_ALLOW_RENAME, DISALLOW_MOVE_ON_DELETE,
};
use crate::schema::names::{
    ATTRIBUTE_SCHEMA, NTDS_CONNECTION, NTDS_DSA, OBJECT_CATEGORY, OBJECT_CLASS, SERVER,
    SERVER_CONTAINER, SHOW_IN_ADVANCED_VIEW_ONLY, SITE, SITE_LINK, SITE_LINK_BRIDGE,
    SYSTEM_FLAGS,
};
use crate::schema::{ClassRecord, SchemaView};

/// Applies add-time policy against one schema snapshot
///
/// # Example
///
/// ```
/// use dirschema_core::config::ModuleConfig;
/// use dirschema_core::model::{Dn, Element, Message};
/// use dirschema_core::policy::PolicyEnforcer;
/// use dirschema_core::rules::sort_object_classes;
/// use dirschema_core::schema::{ClassRecord, Schema};
///
/// let schema = Schema::new(
///     vec![
///         ClassRecord::new("top", "top", 0),
///         ClassRecord::new("container", "top", 1)
///             .with_rdn_attribute("cn")
///             .with_default_category("CN=Container,CN=Schema,DC=example"),
///     ],
///     Vec::new(),
/// )
/// .unwrap();
///
/// let mut draft = Message::new(Dn::parse("CN=Stuff,DC=example").unwrap())
///     .with_element(Element::new("objectClass", ["top", "container"]));
/// let chain = sort_object_classes(Some(&schema), &["container".to_string()]).unwrap();
///
/// let enforcer = PolicyEnforcer::new(&schema, &ModuleConfig::default());
/// enforcer.enforce_add(&mut draft, &chain, None, &[]).unwrap();
///
/// assert_eq!(
///     draft.find_element("objectCategory").unwrap().values,
///     vec!["CN=Container,CN=Schema,DC=example".to_string()]
/// );
/// ```
pub struct PolicyEnforcer<'a> {
    schema: &'a dyn SchemaView,
    store_extended_dn: bool,
}

impl<'a> PolicyEnforcer<'a> {
    pub fn new(schema: &'a dyn SchemaView, config: &ModuleConfig) -> Self {
        Self {
            schema,
            store_extended_dn: config.store_extended_dn_in_ldb,
        }
    }

    /// Check and complete an entry about to be created
    ///
    /// # Arguments
    /// * `draft` - rebuilt entry with its final DN and sorted objectClass
    /// * `chain` - the sorted objectClass chain
    /// * `parent` - the parent entry as read back, if there is one
    /// * `controls` - controls of the original add request
    ///
    /// # Errors
    ///
    /// - `NoStructuralClass`, `WrongRdnAttribute`, `ChildClassNotAllowed`
    ///   (naming violations)
    /// - `SystemOnlyClass` without the relax control
    /// - `InvalidDn` if the class's default category does not parse
    pub fn enforce_add(
        &self,
        draft: &mut EntryDraft,
        chain: &ClassChain,
        parent: Option<&Message>,
        controls: &[Control],
    ) -> Result<()> {
        let structural = last_structural_class(self.schema, chain).ok_or_else(|| {
            SchemaError::NoStructuralClass {
                dn: draft.dn.linearized(),
            }
        })?;

        check_rdn(draft, structural)?;
        if let Some(parent) = parent {
            self.check_child_allowed(structural, parent)?;
        }
        check_system_only(draft, structural, controls)?;
        self.add_defaults(draft, structural)?;
        apply_system_flags(draft, structural);
        Ok(())
    }

    fn check_child_allowed(&self, structural: &ClassRecord, parent: &Message) -> Result<()> {
        // The relax control does not widen containment.
        let allowed = parent
            .find_element(OBJECT_CLASS)
            .map(|el| {
                el.values
                    .iter()
                    .filter_map(|name| self.schema.resolve_class(name))
                    .any(|class| class.allows_child(&structural.name))
            })
            .unwrap_or(false);

        if allowed {
            Ok(())
        } else {
            Err(SchemaError::ChildClassNotAllowed {
                class_name: structural.name.clone(),
                parent_dn: parent.dn.linearized(),
            })
        }
    }

    fn add_defaults(&self, draft: &mut EntryDraft, structural: &ClassRecord) -> Result<()> {
        if draft.find_element(OBJECT_CATEGORY).is_none() && !structural.default_category.is_empty()
        {
            let category = if self.store_extended_dn {
                structural.default_category.clone()
            } else {
                Dn::parse(&structural.default_category)?.linearized()
            };
            draft.add_value(OBJECT_CATEGORY, category);
        }

        if draft.find_element(SHOW_IN_ADVANCED_VIEW_ONLY).is_none() && structural.default_hidden {
            draft.add_value(SHOW_IN_ADVANCED_VIEW_ONLY, "TRUE");
        }
        Ok(())
    }
}

fn check_rdn(draft: &EntryDraft, structural: &ClassRecord) -> Result<()> {
    let Some(expected) = structural.rdn_attribute.as_deref() else {
        return Ok(());
    };
    match draft.dn.rdn_name() {
        Some(rdn) if rdn.eq_ignore_ascii_case(expected) => Ok(()),
        rdn => Err(SchemaError::WrongRdnAttribute {
            dn: draft.dn.linearized(),
            rdn: rdn.unwrap_or_default().to_string(),
            class_name: structural.name.clone(),
            expected: expected.to_string(),
        }),
    }
}

fn check_system_only(
    draft: &EntryDraft,
    structural: &ClassRecord,
    controls: &[Control],
) -> Result<()> {
    if structural.is_system_only && !has_control(controls, RELAX_OID) {
        return Err(SchemaError::SystemOnlyClass {
            class_name: structural.name.clone(),
            dn: draft.dn.linearized(),
        });
    }
    Ok(())
}

/// Rewrite the entry's `systemFlags` for its structural class
///
/// A client-supplied value is read as the starting point and then removed.
/// The attribute is written back only if it was supplied or the result is
/// non-zero.
fn apply_system_flags(draft: &mut EntryDraft, structural: &ClassRecord) {
    let supplied = draft.find_element(SYSTEM_FLAGS).is_some();
    let base = draft.first_value_as_i32(SYSTEM_FLAGS, 0);
    draft.remove_attr(SYSTEM_FLAGS);

    // TODO: also set CONFIG_ALLOW_RENAME when the parent is a site or subnet
    let flags = system_flags_for(&structural.name, base);
    if supplied || flags != 0 {
        draft.add_value(SYSTEM_FLAGS, flags.to_string());
    }
}

/// systemFlags for a new entry of `class_name`, starting from `base`
pub fn system_flags_for(class_name: &str, base: i32) -> i32 {
    let is = |name: &str| class_name.eq_ignore_ascii_case(name);

    let mut flags = base;
    if is(ATTRIBUTE_SCHEMA) {
        flags &= !ATTR_IS_RDN;
    }

    if is(SERVER) {
        flags |= DISALLOW_MOVE_ON_DELETE | CONFIG_ALLOW_RENAME | CONFIG_ALLOW_LIMITED_MOVE;
    } else if is(SITE) || is(SERVER_CONTAINER) || is(NTDS_DSA) {
        flags |= DISALLOW_MOVE_ON_DELETE;
    } else if is(SITE_LINK) || is(SITE_LINK_BRIDGE) || is(NTDS_CONNECTION) {
        flags |= CONFIG_ALLOW_RENAME;
    }
    flags
}
