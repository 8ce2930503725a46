//! DN Normalizer Tests
//!
//! ## Scenarios Covered
//!
//! 1. Leaf attribute name upper-cased, value preserved
//! 2. Parent components taken verbatim from the stored parent
//! 3. Deep and escaped DNs

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::dn;
use dirschema_core::errors::{ExError, ExErrorKind};
use dirschema_core::model::Dn;
use dirschema_core::rules::fix_dn;

#[test]
fn test_fix_dn_reuses_parent_and_uppercases_leaf_name() {
    let fixed = fix_dn(
        &dn("cn=Admins,cn=Users,dc=EXAMPLE,dc=com"),
        &dn("CN=Users,DC=example,DC=com"),
    )
    .unwrap();

    assert_eq!(fixed.linearized(), "CN=Admins,CN=Users,DC=example,DC=com");
}

#[test]
fn test_fix_dn_ignores_requested_parent_spelling() {
    // the request names a different (case-folded) spelling of the parent
    let fixed = fix_dn(
        &dn("ou=Sales,ou=STAFF,dc=example,dc=com"),
        &dn("OU=Staff,DC=example,DC=com"),
    )
    .unwrap();

    assert_eq!(fixed.linearized(), "OU=Sales,OU=Staff,DC=example,DC=com");
    assert_eq!(fixed.comp_num(), 4);
}

#[test]
fn test_fix_dn_keeps_escaped_value() {
    let fixed = fix_dn(
        &dn(r"cn=Smith\, John,cn=users,dc=example,dc=com"),
        &dn("CN=Users,DC=example,DC=com"),
    )
    .unwrap();

    assert_eq!(fixed.rdn_value(), Some(r"Smith\, John"));
    assert_eq!(fixed.rdn_name(), Some("CN"));
}

#[test]
fn test_fix_dn_without_rdn_is_operations_error() {
    let err = fix_dn(&Dn::default(), &dn("DC=example,DC=com")).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::OperationsError);
}
