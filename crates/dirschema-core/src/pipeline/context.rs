//! Per-operation state kept across suspensions

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use dirschema_core_types::RequestId;

use crate::errors::SchemaError;
use crate::model::{Message, Request};
use crate::pipeline::next_stage::Ticket;
use crate::schema::SchemaView;

/// Which continuation runs once a nested lookup finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Add,
    Modify,
    Rename,
}

/// What to do when a forwarded operation completes successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterForward {
    /// Hand the completion to the caller
    Relay,
    /// Read back the entry's objectClass and rewrite it in sorted order
    LookupClasses,
}

#[derive(Debug)]
pub enum Phase {
    Init,
    AwaitLookup {
        ticket: Ticket,
        resume: Resume,
        found: Option<Message>,
    },
    AwaitForward {
        ticket: Ticket,
        after: AfterForward,
    },
}

impl Phase {
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            Phase::Init => None,
            Phase::AwaitLookup { ticket, .. } | Phase::AwaitForward { ticket, .. } => Some(ticket),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::AwaitLookup { .. } => "await_lookup",
            Phase::AwaitForward { .. } => "await_forward",
        }
    }
}

/// State of one intercepted operation
pub struct OperationContext {
    request_id: RequestId,
    request: Request,
    schema: Option<Arc<dyn SchemaView>>,
    phase: Phase,
    sequence: u32,
    started: Instant,
}

impl OperationContext {
    pub(crate) fn new(request: Request, schema: Option<Arc<dyn SchemaView>>) -> Self {
        Self {
            request_id: RequestId::new(),
            request,
            schema,
            phase: Phase::Init,
            sequence: 0,
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Schema snapshot captured when the operation was intercepted
    pub fn schema(&self) -> Option<&dyn SchemaView> {
        self.schema.as_deref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn op_name(&self) -> &'static str {
        self.request.kind().op_name()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn next_ticket(&mut self) -> Ticket {
        self.sequence += 1;
        Ticket::new(self.request_id.clone(), self.sequence)
    }

    pub(crate) fn await_lookup(&mut self, resume: Resume) -> Ticket {
        let ticket = self.next_ticket();
        self.phase = Phase::AwaitLookup {
            ticket: ticket.clone(),
            resume,
            found: None,
        };
        ticket
    }

    pub(crate) fn await_forward(&mut self, after: AfterForward) -> Ticket {
        let ticket = self.next_ticket();
        self.phase = Phase::AwaitForward {
            ticket: ticket.clone(),
            after,
        };
        ticket
    }

    /// Whether `ticket` is the submission this operation is waiting on
    pub(crate) fn expects(&self, ticket: &Ticket) -> bool {
        self.phase.ticket() == Some(ticket)
    }

    pub(crate) fn is_awaiting_lookup(&self) -> bool {
        matches!(self.phase, Phase::AwaitLookup { .. })
    }

    /// Keep the single entry a base-object lookup may return
    pub(crate) fn record_lookup_entry(&mut self, entry: Message) -> Result<(), SchemaError> {
        match &mut self.phase {
            Phase::AwaitLookup { found: Some(_), .. } => Err(SchemaError::TooManyResults {
                base: entry.dn.linearized(),
            }),
            Phase::AwaitLookup { found, .. } => {
                *found = Some(entry);
                Ok(())
            }
            other => Err(SchemaError::UnexpectedReply {
                detail: format!("entry reply while in phase {}", other.name()),
            }),
        }
    }

    /// Leave the lookup phase, yielding its continuation and result
    pub(crate) fn finish_lookup(&mut self) -> Result<(Resume, Option<Message>), SchemaError> {
        match std::mem::replace(&mut self.phase, Phase::Init) {
            Phase::AwaitLookup { resume, found, .. } => Ok((resume, found)),
            other => {
                let detail = format!("lookup completion while in phase {}", other.name());
                self.phase = other;
                Err(SchemaError::UnexpectedReply { detail })
            }
        }
    }

    pub(crate) fn after_forward(&self) -> Option<AfterForward> {
        match self.phase {
            Phase::AwaitForward { after, .. } => Some(after),
            _ => None,
        }
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("request_id", &self.request_id)
            .field("op", &self.op_name())
            .field("phase", &self.phase)
            .field("sequence", &self.sequence)
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}
