//! Modify Pipeline Tests
//!
//! ## Scenarios Covered
//!
//! 1. Adding objectClass values triggers a read-back and a sorted rewrite
//! 2. Replacing objectClass sorts the new values before forwarding
//! 3. Removing every objectClass value is prohibited
//! 4. Empty modifies, constructed and unknown attributes are rejected
//! 5. Special DNs and the bootstrap path pass through unchanged
//! 6. Downstream failures end the operation without a read-back
//! 7. Change lists with several objectClass elements are validated as a whole,
//!    kept intact and followed by a sorted rewrite

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{bootstrap_stage, dn, drive, entry, stage, strings, MemoryDirectory};
use dirschema_core::model::{Element, Message, ModOp, Operation, Request, ResultCode};

const ALICE_DN: &str = "CN=Alice,CN=Users,DC=example,DC=com";

fn seeded_with_alice() -> MemoryDirectory {
    let dir = MemoryDirectory::seeded();
    dir.insert(entry(ALICE_DN, &["person", "top"]));
    dir
}

fn change(op: ModOp, name: &str, values: &[&str]) -> Message {
    Message::new(dn(ALICE_DN)).with_element(Element::with_op(name, op, values.to_vec()))
}

fn changes(elements: &[(ModOp, &str, &[&str])]) -> Message {
    elements
        .iter()
        .fold(Message::new(dn(ALICE_DN)), |msg, (op, name, values)| {
            msg.with_element(Element::with_op(*name, *op, values.to_vec()))
        })
}

fn forwarded_modifies(dir: &MemoryDirectory) -> Vec<Message> {
    dir.forwarded()
        .into_iter()
        .filter_map(|req| match req.operation {
            Operation::Modify(msg) => Some(msg),
            _ => None,
        })
        .collect()
}

#[test]
fn test_adding_class_rewrites_stored_chain_in_order() {
    // GIVEN an entry stored with an unsorted chain
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    // WHEN a class is added
    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Add, "objectClass", &["organizationalPerson"])),
    );

    // THEN the change lands, the classes are read back and rewritten sorted
    assert!(done.is_success(), "{:?}", done);
    let modifies = forwarded_modifies(&dir);
    assert_eq!(modifies.len(), 2);
    assert_eq!(modifies[1].elements.len(), 1);
    assert_eq!(modifies[1].elements[0].op, Some(ModOp::Replace));

    let lookups = dir.lookups();
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].attributes, strings(&["objectClass"]));

    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person", "organizationalPerson"]))
    );
    assert_eq!(module.live_contexts(), 0);
}

#[test]
fn test_adding_unknown_class_fails_before_forwarding() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Add, "objectClass", &["bogusClass"])),
    );

    assert_eq!(done.code, ResultCode::NoSuchAttribute);
    assert!(dir.history().is_empty());
}

#[test]
fn test_replace_is_sorted_and_forwarded_once() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(
            ModOp::Replace,
            "objectclass",
            &["organizationalPerson", "person"],
        )),
    );

    assert!(done.is_success());
    assert!(dir.lookups().is_empty());
    let modifies = forwarded_modifies(&dir);
    assert_eq!(modifies.len(), 1);
    assert_eq!(modifies[0].elements[0].name, "objectClass");
    assert_eq!(
        modifies[0].elements[0].values,
        strings(&["top", "person", "organizationalPerson"])
    );
}

#[test]
fn test_removing_all_classes_is_prohibited() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    for op in [ModOp::Replace, ModOp::Delete] {
        let done = drive(&mut module, &dir, Request::modify(change(op, "objectClass", &[])));
        assert_eq!(done.code, ResultCode::ObjectClassModsProhibited, "{:?}", op);
    }
    assert!(dir.history().is_empty());
}

#[test]
fn test_deleting_named_class_is_relayed() {
    let dir = MemoryDirectory::seeded();
    dir.insert(entry(ALICE_DN, &["top", "person", "mailRecipient"]));
    let mut module = stage(&dir);

    let request = Request::modify(change(ModOp::Delete, "objectClass", &["mailRecipient"]));
    let done = drive(&mut module, &dir, request);

    assert!(done.is_success());
    assert!(dir.lookups().is_empty());
    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person"]))
    );
}

#[test]
fn test_removing_all_classes_wins_over_attribute_errors() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    // GIVEN a change list that writes a constructed attribute and wipes objectClass
    let request = Request::modify(changes(&[
        (ModOp::Replace, "tokenGroups", &["S-1-5-32-544"]),
        (ModOp::Delete, "objectClass", &[]),
    ]));

    // WHEN it is handled
    let done = drive(&mut module, &dir, request);

    // THEN the class wipe is what gets reported
    assert_eq!(done.code, ResultCode::ObjectClassModsProhibited);
    assert!(dir.history().is_empty());
}

#[test]
fn test_delete_then_add_of_classes_is_rewritten_sorted() {
    // GIVEN an entry carrying an auxiliary class
    let dir = MemoryDirectory::seeded();
    dir.insert(entry(ALICE_DN, &["top", "person", "mailRecipient"]));
    let mut module = stage(&dir);

    // WHEN one class is deleted and another added in the same modify
    let done = drive(
        &mut module,
        &dir,
        Request::modify(changes(&[
            (ModOp::Delete, "objectClass", &["mailRecipient"]),
            (ModOp::Add, "objectClass", &["organizationalPerson"]),
        ])),
    );

    // THEN both elements are forwarded, then the chain is read back and sorted
    assert!(done.is_success(), "{:?}", done);
    let modifies = forwarded_modifies(&dir);
    assert_eq!(modifies.len(), 2);
    assert_eq!(modifies[0].elements.len(), 2);
    assert_eq!(dir.lookups().len(), 1);
    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person", "organizationalPerson"]))
    );
}

#[test]
fn test_delete_then_add_of_unknown_class_is_rejected() {
    let dir = MemoryDirectory::seeded();
    dir.insert(entry(ALICE_DN, &["top", "person", "organizationalPerson"]));
    let mut module = stage(&dir);

    // WHEN the added values hide an unknown class behind a delete
    let done = drive(
        &mut module,
        &dir,
        Request::modify(changes(&[
            (ModOp::Delete, "objectClass", &["organizationalPerson"]),
            (ModOp::Add, "objectClass", &["bogusClass", "user"]),
        ])),
    );

    // THEN nothing is forwarded and the stored chain is untouched
    assert_eq!(done.code, ResultCode::NoSuchAttribute);
    assert!(dir.history().is_empty());
    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person", "organizationalPerson"]))
    );
}

#[test]
fn test_replace_then_add_keeps_the_add() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    // WHEN a replace is followed by an add in the same modify
    let done = drive(
        &mut module,
        &dir,
        Request::modify(changes(&[
            (ModOp::Replace, "objectClass", &["person"]),
            (ModOp::Add, "objectClass", &["user"]),
        ])),
    );

    // THEN the add is not lost and the resulting chain is completed and sorted
    assert!(done.is_success(), "{:?}", done);
    let modifies = forwarded_modifies(&dir);
    assert_eq!(modifies.len(), 2);
    assert_eq!(modifies[0].elements[0].values, strings(&["person"]));
    assert_eq!(modifies[0].elements[1].values, strings(&["user"]));
    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person", "organizationalPerson", "user"]))
    );
}

#[test]
fn test_replace_with_unknown_class_next_to_add_is_rejected() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(changes(&[
            (ModOp::Replace, "objectClass", &["bogusClass"]),
            (ModOp::Add, "objectClass", &["user"]),
        ])),
    );

    assert_eq!(done.code, ResultCode::NoSuchAttribute);
    assert!(dir.history().is_empty());
}

#[test]
fn test_two_adds_of_classes_are_rewritten_sorted() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(changes(&[
            (ModOp::Add, "objectClass", &["user"]),
            (ModOp::Add, "objectClass", &["organizationalPerson"]),
        ])),
    );

    assert!(done.is_success(), "{:?}", done);
    assert_eq!(dir.lookups().len(), 1);
    assert_eq!(
        dir.values(ALICE_DN, "objectClass"),
        Some(strings(&["top", "person", "organizationalPerson", "user"]))
    );
}

#[test]
fn test_empty_modify_is_unwilling() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(&mut module, &dir, Request::modify(Message::new(dn(ALICE_DN))));

    assert_eq!(done.code, ResultCode::UnwillingToPerform);
}

#[test]
fn test_constructed_attribute_modify_is_constraint_violation() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Replace, "tokenGroups", &["S-1-5-32-544"])),
    );

    assert_eq!(done.code, ResultCode::ConstraintViolation);
    assert!(dir.history().is_empty());
}

#[test]
fn test_unknown_attribute_modify_is_no_such_attribute() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Replace, "favouriteColour", &["teal"])),
    );

    assert_eq!(done.code, ResultCode::NoSuchAttribute);
}

#[test]
fn test_plain_attribute_change_is_canonicalized_and_relayed() {
    let dir = seeded_with_alice();
    let mut module = stage(&dir);

    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Replace, "DESCRIPTION", &["new hire"])),
    );

    assert!(done.is_success());
    let modifies = forwarded_modifies(&dir);
    assert_eq!(modifies.len(), 1);
    assert_eq!(modifies[0].elements[0].name, "description");
    assert_eq!(
        dir.values(ALICE_DN, "description"),
        Some(strings(&["new hire"]))
    );
}

#[test]
fn test_failed_class_add_skips_read_back() {
    // GIVEN the target entry does not exist
    let dir = MemoryDirectory::seeded();
    let mut module = stage(&dir);

    // WHEN a class is added to it
    let done = drive(
        &mut module,
        &dir,
        Request::modify(change(ModOp::Add, "objectClass", &["mailRecipient"])),
    );

    // THEN the store's answer is relayed and no lookup follows
    assert_eq!(done.code, ResultCode::NoSuchObject);
    assert!(dir.lookups().is_empty());
}

#[test]
fn test_bootstrap_modify_passes_through() {
    let dir = seeded_with_alice();
    let mut module = bootstrap_stage(&dir);

    let request = Request::modify(change(ModOp::Replace, "objectClass", &["bootstrapClass"]));
    let done = drive(&mut module, &dir, request.clone());

    assert!(done.is_success());
    assert_eq!(dir.forwarded(), vec![request]);
}

#[test]
fn test_special_dn_modify_passes_through() {
    let dir = MemoryDirectory::seeded();
    dir.insert(Message::new(dn("@ATTRIBUTES")));
    let mut module = stage(&dir);

    let request = Request::modify(
        Message::new(dn("@ATTRIBUTES"))
            .with_element(Element::with_op("cn", ModOp::Replace, ["CASE_INSENSITIVE"])),
    );
    let done = drive(&mut module, &dir, request.clone());

    assert!(done.is_success());
    assert_eq!(dir.forwarded(), vec![request]);
}
