//! Canonical DN construction

use crate::errors::{Result, SchemaError};
use crate::model::{Dn, Rdn};

/// Rebuild `new_dn` under the parent's stored DN
///
/// The parent components are taken verbatim from `parent_dn` (the DN the
/// directory actually holds) and the leaf attribute name is upper-cased.
/// The leaf value is left alone.
///
/// ```
/// use dirschema_core::model::Dn;
/// use dirschema_core::rules::fix_dn;
///
/// let requested = Dn::parse("cn=Admins,cn=Users,dc=EXAMPLE,dc=com").unwrap();
/// let parent = Dn::parse("CN=Users,DC=example,DC=com").unwrap();
///
/// let fixed = fix_dn(&requested, &parent).unwrap();
/// assert_eq!(fixed.linearized(), "CN=Admins,CN=Users,DC=example,DC=com");
/// ```
///
/// # Errors
///
/// Returns `SchemaError::MissingRdn` when `new_dn` has no components.
pub fn fix_dn(new_dn: &Dn, parent_dn: &Dn) -> Result<Dn> {
    let rdn = new_dn.rdn().ok_or_else(|| SchemaError::MissingRdn {
        dn: new_dn.linearized(),
    })?;

    let mut fixed = Dn::from_components(parent_dn.components().to_vec());
    fixed.add_child(Rdn::new(rdn.name().to_ascii_uppercase(), rdn.value()));
    Ok(fixed)
}
