//! Seam to the next stage of the request pipeline

use std::rc::Rc;

use dirschema_core_types::RequestId;

use crate::errors::ExError;
use crate::model::{LookupRequest, Request};

/// Correlates a nested submission with the operation that issued it
///
/// The sequence number increases with every submission an operation makes,
/// so a late reply to an earlier submission can be told apart from the one
/// the operation is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    request_id: RequestId,
    sequence: u32,
}

impl Ticket {
    pub fn new(request_id: RequestId, sequence: u32) -> Self {
        Self {
            request_id,
            sequence,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// The stage that receives forwarded operations and nested lookups
///
/// Submissions return immediately. Replies are handed back later through
/// [`ObjectClassModule::deliver`](crate::pipeline::ObjectClassModule::deliver)
/// with the same ticket: any number of `Entry`/`Referral` replies for a
/// lookup, then exactly one `Done`.
///
/// # Errors
///
/// An `Err` from either method means the submission was not accepted; the
/// operation is failed with that error and no reply is expected.
#[allow(clippy::result_large_err)]
pub trait NextStage {
    fn forward(&self, ticket: Ticket, request: Request) -> Result<(), ExError>;

    fn submit_lookup(&self, ticket: Ticket, lookup: LookupRequest) -> Result<(), ExError>;
}

impl<T: NextStage + ?Sized> NextStage for &T {
    fn forward(&self, ticket: Ticket, request: Request) -> Result<(), ExError> {
        (**self).forward(ticket, request)
    }

    fn submit_lookup(&self, ticket: Ticket, lookup: LookupRequest) -> Result<(), ExError> {
        (**self).submit_lookup(ticket, lookup)
    }
}

impl<T: NextStage + ?Sized> NextStage for Rc<T> {
    fn forward(&self, ticket: Ticket, request: Request) -> Result<(), ExError> {
        (**self).forward(ticket, request)
    }

    fn submit_lookup(&self, ticket: Ticket, lookup: LookupRequest) -> Result<(), ExError> {
        (**self).submit_lookup(ticket, lookup)
    }
}
