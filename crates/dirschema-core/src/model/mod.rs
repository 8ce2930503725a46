pub mod dn;
pub mod message;
pub mod reply;
pub mod request;

pub use dn::{Dn, Rdn};
pub use message::{Element, EntryDraft, Message, ModOp};
pub use reply::{Completion, ExtendedResponse, Reply, ResultCode};
pub use request::{
    has_control, Control, LookupRequest, Operation, OperationKind, Request, Scope, RELAX_OID,
    SHOW_DELETED_OID,
};
