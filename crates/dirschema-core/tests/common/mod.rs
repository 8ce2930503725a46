#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use dirschema_core::errors::ExError;
use dirschema_core::model::{
    Completion, Dn, Element, LookupRequest, Message, ModOp, Operation, Reply, Request, ResultCode,
};
use dirschema_core::pipeline::{NextStage, ObjectClassModule, Outcome, Ticket};
use dirschema_core::schema::{AttributeRecord, ClassKind, ClassRecord, Schema, SchemaProvider};
use dirschema_core::{ModuleConfig, SchemaSlot};

#[allow(dead_code)]
pub const ROOT_DN: &str = "DC=example,DC=com";
#[allow(dead_code)]
pub const USERS_DN: &str = "CN=Users,DC=example,DC=com";
#[allow(dead_code)]
pub const STAFF_DN: &str = "OU=Staff,DC=example,DC=com";

#[allow(dead_code)]
fn category(name: &str) -> String {
    format!("CN={},CN=Schema,CN=Configuration,{}", name, ROOT_DN)
}

/// Schema covering the classes the pipeline tests exercise
#[allow(dead_code)]
pub fn fixture_schema() -> Schema {
    let container_children = [
        "container",
        "person",
        "organizationalPerson",
        "user",
        "organizationalUnit",
        "server",
        "site",
        "attributeSchema",
        "hiddenThing",
    ];

    Schema::new(
        vec![
            ClassRecord::new("top", "top", 0).with_kind(ClassKind::Abstract),
            ClassRecord::new("person", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Person")),
            ClassRecord::new("organizationalPerson", "person", 2)
                .with_rdn_attribute("cn")
                .with_default_category(category("Person")),
            ClassRecord::new("user", "organizationalPerson", 3)
                .with_rdn_attribute("cn")
                .with_default_category(category("Person")),
            ClassRecord::new("container", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Container"))
                .allowing_children(container_children),
            ClassRecord::new("organizationalUnit", "top", 1)
                .with_rdn_attribute("ou")
                .with_default_category(category("Organizational-Unit"))
                .allowing_children(["container", "organizationalUnit", "person", "user"]),
            ClassRecord::new("domainDNS", "top", 1)
                .with_rdn_attribute("dc")
                .with_default_category(category("Domain-DNS"))
                .allowing_children(["container", "organizationalUnit", "domainDNS"]),
            ClassRecord::new("server", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Server")),
            ClassRecord::new("site", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Site"))
                .allowing_children(["server"]),
            ClassRecord::new("attributeSchema", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Attribute-Schema"))
                .system_only(),
            ClassRecord::new("hiddenThing", "top", 1)
                .with_rdn_attribute("cn")
                .with_default_category(category("Hidden-Thing"))
                .hidden_by_default(),
            ClassRecord::new("mailRecipient", "top", 1).with_kind(ClassKind::Auxiliary),
            ClassRecord::new("oldClass", "top", 1)
                .with_rdn_attribute("cn")
                .defunct(),
            ClassRecord::new("brokenChild", "missingParent", 2),
            ClassRecord::new("cycleA", "cycleB", 4),
            ClassRecord::new("cycleB", "cycleA", 4),
        ],
        vec![
            AttributeRecord::new("objectClass"),
            AttributeRecord::new("cn"),
            AttributeRecord::new("sn"),
            AttributeRecord::new("ou"),
            AttributeRecord::new("dc"),
            AttributeRecord::new("description"),
            AttributeRecord::new("objectCategory"),
            AttributeRecord::new("showInAdvancedViewOnly"),
            AttributeRecord::new("systemFlags"),
            AttributeRecord::new("objectGUID"),
            AttributeRecord::new("sAMAccountName"),
            AttributeRecord::new("tokenGroups").constructed(),
        ],
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}

#[allow(dead_code)]
pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Entry with the given DN and objectClass values
#[allow(dead_code)]
pub fn entry(dn_text: &str, classes: &[&str]) -> Message {
    Message::new(dn(dn_text)).with_element(Element::new("objectClass", classes.to_vec()))
}

/// A submission captured by [`MemoryDirectory`]
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Submission {
    Forward(Request),
    Lookup(LookupRequest),
}

/// In-memory next stage
///
/// Queues every submission; tests pump the queue with [`drive`] or pop and
/// answer submissions by hand to exercise unusual reply sequences.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryDirectory {
    entries: RefCell<BTreeMap<String, Message>>,
    queue: RefCell<VecDeque<(Ticket, Submission)>>,
    history: RefCell<Vec<Submission>>,
    refuse_submissions: Cell<bool>,
}

#[allow(dead_code)]
impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the domain root, a Users container and a Staff OU
    pub fn seeded() -> Self {
        let dir = Self::new();
        dir.insert(
            entry(ROOT_DN, &["top", "domainDNS"])
                .with_element(Element::new("objectGUID", ["guid-root"])),
        );
        dir.insert(entry(USERS_DN, &["top", "container"]));
        dir.insert(entry(STAFF_DN, &["top", "organizationalUnit"]));
        dir
    }

    pub fn insert(&self, entry: Message) {
        self.entries.borrow_mut().insert(key(&entry.dn), entry);
    }

    pub fn entry(&self, dn_text: &str) -> Option<Message> {
        self.entries.borrow().get(&key(&dn(dn_text))).cloned()
    }

    pub fn values(&self, dn_text: &str, attribute: &str) -> Option<Vec<String>> {
        self.entry(dn_text)
            .and_then(|e| e.find_element(attribute).map(|el| el.values.clone()))
    }

    pub fn refuse_submissions(&self) {
        self.refuse_submissions.set(true);
    }

    pub fn pop(&self) -> Option<(Ticket, Submission)> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn history(&self) -> Vec<Submission> {
        self.history.borrow().clone()
    }

    pub fn forwarded(&self) -> Vec<Request> {
        self.history()
            .into_iter()
            .filter_map(|s| match s {
                Submission::Forward(req) => Some(req),
                Submission::Lookup(_) => None,
            })
            .collect()
    }

    pub fn lookups(&self) -> Vec<LookupRequest> {
        self.history()
            .into_iter()
            .filter_map(|s| match s {
                Submission::Lookup(lookup) => Some(lookup),
                Submission::Forward(_) => None,
            })
            .collect()
    }

    /// Apply a submission and return the replies the store would send
    pub fn execute(&self, submission: &Submission) -> Vec<Reply> {
        match submission {
            Submission::Lookup(lookup) => self.search(lookup),
            Submission::Forward(request) => vec![Reply::Done(self.apply(request))],
        }
    }

    fn search(&self, lookup: &LookupRequest) -> Vec<Reply> {
        let entries = self.entries.borrow();
        let Some(found) = entries.get(&key(&lookup.base)) else {
            return vec![Reply::Done(Completion::with_code(
                ResultCode::NoSuchObject,
                "no such object",
            ))];
        };

        let mut result = Message::new(found.dn.clone());
        result.elements = found
            .elements
            .iter()
            .filter(|el| {
                lookup.attributes.is_empty()
                    || lookup.attributes.iter().any(|a| el.is_named(a))
            })
            .cloned()
            .collect();
        vec![Reply::Entry(result), Reply::Done(Completion::success())]
    }

    fn apply(&self, request: &Request) -> Completion {
        let mut entries = self.entries.borrow_mut();
        match &request.operation {
            Operation::Add(new_entry) => {
                let k = key(&new_entry.dn);
                if entries.contains_key(&k) {
                    return Completion::with_code(ResultCode::EntryAlreadyExists, "exists");
                }
                entries.insert(k, new_entry.clone());
                Completion::success()
            }
            Operation::Modify(changes) => {
                let Some(stored) = entries.get_mut(&key(&changes.dn)) else {
                    return Completion::with_code(ResultCode::NoSuchObject, "no such object");
                };
                for change in &changes.elements {
                    apply_change(stored, change);
                }
                Completion::success()
            }
            Operation::Rename { old_dn, new_dn } => {
                if entries.contains_key(&key(new_dn)) {
                    return Completion::with_code(ResultCode::EntryAlreadyExists, "exists");
                }
                let Some(mut moved) = entries.remove(&key(old_dn)) else {
                    return Completion::with_code(ResultCode::NoSuchObject, "no such object");
                };
                moved.dn = new_dn.clone();
                entries.insert(key(new_dn), moved);
                Completion::success()
            }
        }
    }
}

#[allow(dead_code)]
fn apply_change(stored: &mut Message, change: &Element) {
    match change.op {
        Some(ModOp::Replace) => {
            stored.set_values(&change.name, None, change.values.clone());
        }
        Some(ModOp::Delete) if change.values.is_empty() => {
            stored.remove_attr(&change.name);
        }
        Some(ModOp::Delete) => {
            if let Some(el) = stored.find_element_mut(&change.name) {
                el.values
                    .retain(|v| !change.values.iter().any(|d| d.eq_ignore_ascii_case(v)));
            }
            if stored
                .find_element(&change.name)
                .is_some_and(|el| el.values.is_empty())
            {
                stored.remove_attr(&change.name);
            }
        }
        Some(ModOp::Add) | None => {
            for value in &change.values {
                stored.add_value(&change.name, value.clone());
            }
        }
    }
}

#[allow(dead_code)]
fn key(dn: &Dn) -> String {
    dn.linearized().to_lowercase()
}

impl NextStage for MemoryDirectory {
    fn forward(&self, ticket: Ticket, request: Request) -> Result<(), ExError> {
        self.submit(ticket, Submission::Forward(request))
    }

    fn submit_lookup(&self, ticket: Ticket, lookup: LookupRequest) -> Result<(), ExError> {
        self.submit(ticket, Submission::Lookup(lookup))
    }
}

#[allow(dead_code)]
impl MemoryDirectory {
    fn submit(&self, ticket: Ticket, submission: Submission) -> Result<(), ExError> {
        if self.refuse_submissions.get() {
            return Err(ExError::new(dirschema_core::ExErrorKind::OperationsError)
                .with_message("store unavailable"));
        }
        self.history.borrow_mut().push(submission.clone());
        self.queue.borrow_mut().push_back((ticket, submission));
        Ok(())
    }
}

/// Stage wired to the fixture schema and `dir`
#[allow(dead_code)]
pub fn stage(dir: &MemoryDirectory) -> ObjectClassModule<SchemaSlot, &MemoryDirectory> {
    ObjectClassModule::new(
        SchemaSlot::with_schema(fixture_schema()),
        dir,
        ModuleConfig::default().with_root_base_dn(ROOT_DN),
    )
    .unwrap()
}

/// Stage with no schema loaded
#[allow(dead_code)]
pub fn bootstrap_stage(dir: &MemoryDirectory) -> ObjectClassModule<SchemaSlot, &MemoryDirectory> {
    ObjectClassModule::new(
        SchemaSlot::empty(),
        dir,
        ModuleConfig::default().with_root_base_dn(ROOT_DN),
    )
    .unwrap()
}

/// Run `request` to completion against `dir`
#[allow(dead_code)]
pub fn drive<P: SchemaProvider, N: NextStage>(
    module: &mut ObjectClassModule<P, N>,
    dir: &MemoryDirectory,
    request: Request,
) -> Completion {
    let outcome = module.handle(request);
    pump(module, dir, outcome)
}

/// Answer queued submissions until `outcome` completes
#[allow(dead_code)]
pub fn pump<P: SchemaProvider, N: NextStage>(
    module: &mut ObjectClassModule<P, N>,
    dir: &MemoryDirectory,
    mut outcome: Outcome,
) -> Completion {
    loop {
        if let Outcome::Complete(done) = outcome {
            return done;
        }
        let (ticket, submission) = dir.pop().expect("pending operation has no submission queued");
        for reply in dir.execute(&submission) {
            outcome = module.deliver(ticket.clone(), reply).expect("reply accepted");
            if !outcome.is_pending() {
                break;
            }
        }
    }
}
