//! objectClass Stage Demonstration
//!
//! Runs an Add and a Modify through the stage against a toy store that
//! answers every submission as soon as the demo asks it to.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Loading configuration from TOML and a schema snapshot from JSON
//! 2. Suspending on a lookup and resuming with `deliver`
//! 3. Sorted objectClass chains and canonical DNs in what gets stored

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use dirschema_core::logging_facility::{init, Profile};
use dirschema_core::model::{LookupRequest, Operation, Reply};
use dirschema_core::{
    Completion, Dn, Element, ExError, Message, ModOp, ModuleConfig, NextStage, ObjectClassModule,
    Outcome, Request, ResultCode, Schema, SchemaSlot, Ticket,
};

const CONFIG: &str = r#"
root_base_dn = "DC=example,DC=com"
store_extended_dn_in_ldb = true
"#;

const SCHEMA: &str = r#"{
  "classes": [
    {"name": "top", "parent_name": "top", "order_rank": 0, "kind": "abstract"},
    {"name": "person", "parent_name": "top", "order_rank": 1, "rdn_attribute": "cn",
     "default_category": "CN=Person,CN=Schema,CN=Configuration,DC=example,DC=com"},
    {"name": "organizationalPerson", "parent_name": "person", "order_rank": 2, "rdn_attribute": "cn",
     "default_category": "CN=Person,CN=Schema,CN=Configuration,DC=example,DC=com"},
    {"name": "mailRecipient", "parent_name": "top", "order_rank": 1, "kind": "auxiliary"},
    {"name": "container", "parent_name": "top", "order_rank": 1, "rdn_attribute": "cn",
     "allowed_child_classes": ["person", "organizationalPerson", "container"]}
  ],
  "attributes": [
    {"canonical_name": "objectClass"},
    {"canonical_name": "cn"},
    {"canonical_name": "objectCategory"},
    {"canonical_name": "tokenGroups", "is_constructed": true}
  ]
}"#;

#[derive(Default)]
struct ToyStore {
    entries: RefCell<BTreeMap<String, Message>>,
    inbox: RefCell<VecDeque<(Ticket, Operation)>>,
    lookups: RefCell<VecDeque<(Ticket, LookupRequest)>>,
}

impl ToyStore {
    fn put(&self, entry: Message) {
        self.entries
            .borrow_mut()
            .insert(entry.dn.linearized().to_lowercase(), entry);
    }

    fn get(&self, dn: &Dn) -> Option<Message> {
        self.entries
            .borrow()
            .get(&dn.linearized().to_lowercase())
            .cloned()
    }

    /// Answer whatever is queued, returning the ticket and replies
    fn answer(&self) -> Option<(Ticket, Vec<Reply>)> {
        if let Some((ticket, lookup)) = self.lookups.borrow_mut().pop_front() {
            let mut replies: Vec<Reply> = self.get(&lookup.base).map(Reply::Entry).into_iter().collect();
            replies.push(Reply::Done(Completion::success()));
            return Some((ticket, replies));
        }

        let (ticket, operation) = self.inbox.borrow_mut().pop_front()?;
        match operation {
            Operation::Add(entry) => self.put(entry),
            Operation::Modify(changes) => {
                let mut stored = self.get(&changes.dn)?;
                for change in changes.elements {
                    match change.op {
                        Some(ModOp::Replace) => stored.set_values(&change.name, None, change.values),
                        _ => change
                            .values
                            .into_iter()
                            .for_each(|v| stored.add_value(&change.name, v)),
                    }
                }
                self.put(stored);
            }
            Operation::Rename { .. } => {}
        }
        Some((ticket, vec![Reply::Done(Completion::success())]))
    }
}

impl NextStage for ToyStore {
    fn forward(&self, ticket: Ticket, request: Request) -> Result<(), ExError> {
        self.inbox.borrow_mut().push_back((ticket, request.operation));
        Ok(())
    }

    fn submit_lookup(&self, ticket: Ticket, lookup: LookupRequest) -> Result<(), ExError> {
        self.lookups.borrow_mut().push_back((ticket, lookup));
        Ok(())
    }
}

fn run(
    module: &mut ObjectClassModule<SchemaSlot, &ToyStore>,
    store: &ToyStore,
    request: Request,
) -> Completion {
    let mut outcome = module.handle(request);
    while outcome.is_pending() {
        let (ticket, replies) = store.answer().expect("stage is waiting on the store");
        for reply in replies {
            outcome = module.deliver(ticket.clone(), reply).expect("reply accepted");
        }
    }
    outcome.into_completion().expect("operation complete")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== objectClass Stage Demo ===\n");

    let config = ModuleConfig::from_toml_str(CONFIG)?;
    let schema = Schema::from_json_str(SCHEMA)?;
    println!("Loaded {} classes\n", schema.classes().len());

    let store = ToyStore::default();
    store.put(
        Message::new(Dn::parse("CN=Users,DC=example,DC=com")?)
            .with_element(Element::new("objectClass", ["top", "container"])),
    );
    let mut module = ObjectClassModule::new(SchemaSlot::with_schema(schema), &store, config)?;

    // ===== Part 1: Add =====
    println!("## Part 1: Add\n");
    let alice = Message::new(Dn::parse("cn=Alice,cn=users,dc=example,dc=com")?)
        .with_element(Element::new("objectClass", ["organizationalPerson"]))
        .with_element(Element::new("CN", ["Alice"]));
    let done = run(&mut module, &store, Request::add(alice));
    println!("add -> {}", done.code);

    let alice_dn = Dn::parse("CN=Alice,CN=Users,DC=example,DC=com")?;
    let stored = store.get(&alice_dn).expect("alice stored");
    println!("stored as {}", stored.dn);
    for element in &stored.elements {
        println!("  {}: {:?}", element.name, element.values);
    }

    // ===== Part 2: Modify adding a class =====
    println!("\n## Part 2: Modify\n");
    let change = Message::new(alice_dn.clone()).with_element(Element::with_op(
        "objectClass",
        ModOp::Add,
        ["mailRecipient"],
    ));
    let done = run(&mut module, &store, Request::modify(change));
    println!("modify -> {}", done.code);
    let stored = store.get(&alice_dn).expect("alice stored");
    println!("objectClass now {:?}", stored.find_element("objectClass").map(|el| &el.values));

    // ===== Part 3: Rejections =====
    println!("\n## Part 3: Rejections\n");
    let forged = Message::new(alice_dn).with_element(Element::with_op(
        "tokenGroups",
        ModOp::Replace,
        ["S-1-5-32-544"],
    ));
    let done = run(&mut module, &store, Request::modify(forged));
    assert_eq!(done.code, ResultCode::ConstraintViolation);
    println!("constructed attribute -> {}: {}", done.code, done.error_message);

    println!("\n=== Demo Complete ===");
    Ok(())
}
