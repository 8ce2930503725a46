//! The objectClass interception stage
//!
//! ## Flow
//!
//! Every Add, Modify and Rename handed to [`ObjectClassModule::handle`] gets
//! an [`OperationContext`]. The stage then either finishes at once (a
//! validation failure, or nothing to do) or submits one request to the next
//! stage and parks the context until the matching replies come back through
//! [`ObjectClassModule::deliver`]:
//!
//! - **Add**: look up the parent, rebuild the entry under it, forward it.
//! - **Modify**: forward the (validated) change; if objectClass values were
//!   added, read the entry's classes back and forward a sorted rewrite.
//! - **Rename**: look up the destination parent, fix the new DN, forward.
//!
//! A context holds at most one outstanding submission. The first error ends
//! the operation with exactly one completion.

use std::collections::HashMap;

use dirschema_core_types::RequestId;
use tracing::{debug, warn};

use crate::config::ModuleConfig;
use crate::errors::{ExError, ExErrorKind, SchemaError};
use crate::model::{
    Completion, Control, Dn, LookupRequest, Message, Operation, OperationKind, Reply, Request,
    ResultCode,
};
use crate::pipeline::context::{AfterForward, OperationContext, Resume};
use crate::pipeline::next_stage::{NextStage, Ticket};
use crate::pipeline::transform;
use crate::rules::fix_dn;
use crate::schema::names::{OBJECT_CLASS, OBJECT_GUID};
use crate::schema::SchemaProvider;
use crate::{log_op_end, log_op_error, log_op_start};

/// Result of handing the stage a request or a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Waiting on the next stage; more replies are needed
    Pending(RequestId),
    /// The operation is over and this is its only completion
    Complete(Completion),
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    pub fn completion(&self) -> Option<&Completion> {
        match self {
            Outcome::Complete(done) => Some(done),
            Outcome::Pending(_) => None,
        }
    }

    pub fn into_completion(self) -> Option<Completion> {
        match self {
            Outcome::Complete(done) => Some(done),
            Outcome::Pending(_) => None,
        }
    }
}

enum Step {
    Suspended,
    Finished(Completion),
}

type StepResult = Result<Step, ExError>;

/// Schema-enforcing stage between a directory front end and its store
pub struct ObjectClassModule<P, N> {
    schema: P,
    next: N,
    config: ModuleConfig,
    root: Option<Dn>,
    contexts: HashMap<RequestId, OperationContext>,
}

impl<P: SchemaProvider, N: NextStage> ObjectClassModule<P, N> {
    /// Create the stage
    ///
    /// # Errors
    ///
    /// Returns an `InvalidDnSyntax` error if the configured root DN does not
    /// parse.
    pub fn new(schema: P, next: N, config: ModuleConfig) -> Result<Self, ExError> {
        let root = config
            .root_dn()
            .map_err(|e| ExError::from(e).with_op("objectclass_init"))?;
        debug!(
            root = %root.as_ref().map(Dn::linearized).unwrap_or_default(),
            store_extended_dn = config.store_extended_dn_in_ldb,
            "objectclass stage ready"
        );
        Ok(Self {
            schema,
            next,
            config,
            root,
            contexts: HashMap::new(),
        })
    }

    pub fn next_stage(&self) -> &N {
        &self.next
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Number of operations waiting on the next stage
    pub fn live_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Intercept a write operation
    ///
    /// The schema snapshot is captured now and used for the whole
    /// operation, however many suspensions it goes through.
    pub fn handle(&mut self, request: Request) -> Outcome {
        let mut ctx = OperationContext::new(request, self.schema.current_schema());
        log_op_start!(
            ctx.op_name(),
            request_id = %ctx.request_id(),
            dn = %ctx.request().operation.target_dn(),
            has_schema = ctx.schema().is_some(),
        );

        let step = match ctx.request().kind() {
            OperationKind::Add => self.begin_add(&mut ctx),
            OperationKind::Modify => self.begin_modify(&mut ctx),
            OperationKind::Rename => self.begin_rename(&mut ctx),
        };
        self.settle(ctx, step)
    }

    /// Hand the stage one reply to an earlier submission
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedReply` error when no live operation owns the
    /// ticket. A live operation receiving a stale ticket is failed with
    /// `OperationsError` instead, reported through the returned outcome.
    pub fn deliver(&mut self, ticket: Ticket, reply: Reply) -> Result<Outcome, ExError> {
        let Some(mut ctx) = self.contexts.remove(ticket.request_id()) else {
            warn!(
                request_id = %ticket.request_id(),
                sequence = ticket.sequence(),
                "reply for an operation that is no longer live"
            );
            return Err(ExError::new(ExErrorKind::UnexpectedReply)
                .with_op("deliver")
                .with_request_id(ticket.request_id().clone())
                .with_message(format!(
                    "no live operation for reply sequence {}",
                    ticket.sequence()
                )));
        };

        if !ctx.expects(&ticket) {
            let err = SchemaError::UnexpectedReply {
                detail: format!(
                    "reply sequence {} does not match the outstanding submission ({})",
                    ticket.sequence(),
                    ctx.phase().name()
                ),
            };
            return Ok(self.settle(ctx, Err(err.into())));
        }

        let step = if ctx.is_awaiting_lookup() {
            self.on_lookup_reply(&mut ctx, reply)
        } else {
            self.on_forward_reply(&mut ctx, reply)
        };
        Ok(self.settle(ctx, step))
    }

    fn settle(&mut self, ctx: OperationContext, step: StepResult) -> Outcome {
        match step {
            Ok(Step::Suspended) => {
                let request_id = ctx.request_id().clone();
                self.contexts.insert(request_id.clone(), ctx);
                Outcome::Pending(request_id)
            }
            Ok(Step::Finished(done)) => {
                log_op_end!(
                    ctx.op_name(),
                    duration_ms = ctx.elapsed_ms(),
                    request_id = %ctx.request_id(),
                    result_code = %done.code,
                );
                Outcome::Complete(done)
            }
            Err(err) => {
                let mut err = err.with_request_id(ctx.request_id().clone());
                if err.op().is_none() {
                    err = err.with_op(ctx.op_name());
                }
                log_op_error!(
                    ctx.op_name(),
                    err.clone(),
                    duration_ms = ctx.elapsed_ms(),
                    request_id = %ctx.request_id(),
                );
                Outcome::Complete(Completion::from_error(&err))
            }
        }
    }

    // ===== submissions =====

    fn submit_lookup(
        &self,
        ctx: &mut OperationContext,
        lookup: LookupRequest,
        resume: Resume,
    ) -> StepResult {
        let ticket = ctx.await_lookup(resume);
        debug!(
            request_id = %ticket.request_id(),
            sequence = ticket.sequence(),
            base_dn = %lookup.base,
            resume = ?resume,
            "submitting lookup"
        );
        self.next.submit_lookup(ticket, lookup)?;
        Ok(Step::Suspended)
    }

    fn forward(
        &self,
        ctx: &mut OperationContext,
        request: Request,
        after: AfterForward,
    ) -> StepResult {
        let ticket = ctx.await_forward(after);
        debug!(
            request_id = %ticket.request_id(),
            sequence = ticket.sequence(),
            dn = %request.operation.target_dn(),
            after = ?after,
            "forwarding"
        );
        self.next.forward(ticket, request)?;
        Ok(Step::Suspended)
    }

    fn pass_through(&self, ctx: &mut OperationContext) -> StepResult {
        let request = ctx.request().clone();
        self.forward(ctx, request, AfterForward::Relay)
    }

    // ===== replies =====

    fn on_lookup_reply(&self, ctx: &mut OperationContext, reply: Reply) -> StepResult {
        match reply {
            Reply::Entry(entry) => {
                ctx.record_lookup_entry(entry)?;
                Ok(Step::Suspended)
            }
            Reply::Referral(url) => {
                debug!(request_id = %ctx.request_id(), url = %url, "ignoring referral");
                Ok(Step::Suspended)
            }
            Reply::Done(done)
                if !done.is_success() && done.code != ResultCode::NoSuchObject =>
            {
                Ok(Step::Finished(done))
            }
            Reply::Done(_) => {
                let (resume, found) = ctx.finish_lookup()?;
                match resume {
                    Resume::Add => self.complete_add(ctx, found),
                    Resume::Modify => self.complete_modify(ctx, found),
                    Resume::Rename => self.complete_rename(ctx, found),
                }
            }
        }
    }

    fn on_forward_reply(&self, ctx: &mut OperationContext, reply: Reply) -> StepResult {
        let done = match reply {
            Reply::Done(done) => done,
            Reply::Entry(_) | Reply::Referral(_) => {
                return Err(SchemaError::UnexpectedReply {
                    detail: "forwarded operation answered with a non-terminal reply".to_string(),
                }
                .into())
            }
        };

        match ctx.after_forward() {
            Some(AfterForward::LookupClasses) if done.is_success() => {
                let dn = modify_dn(ctx)?.clone();
                let lookup = LookupRequest::base_object(dn, &[OBJECT_CLASS]);
                self.submit_lookup(ctx, lookup, Resume::Modify)
            }
            _ => Ok(Step::Finished(done)),
        }
    }

    // ===== add =====

    fn begin_add(&self, ctx: &mut OperationContext) -> StepResult {
        let entry = ctx
            .request()
            .add_message()
            .ok_or_else(|| wrong_operation("add"))?;

        if entry.dn.is_special() {
            return self.pass_through(ctx);
        }

        if !entry
            .find_element(OBJECT_CLASS)
            .is_some_and(|el| !el.values.is_empty())
        {
            return Err(SchemaError::MissingObjectClass {
                dn: entry.dn.linearized(),
            }
            .into());
        }

        let parent = match entry.dn.parent() {
            Some(parent) if !parent.is_null() => parent,
            _ => return self.complete_add(ctx, None),
        };
        let lookup = LookupRequest::base_object(parent, &[OBJECT_GUID, OBJECT_CLASS]);
        self.submit_lookup(ctx, lookup, Resume::Add)
    }

    fn complete_add(
        &self,
        ctx: &mut OperationContext,
        parent: Option<Message>,
    ) -> StepResult {
        let entry = ctx
            .request()
            .add_message()
            .ok_or_else(|| wrong_operation("add"))?;
        let controls = ctx.request().controls.clone();

        let draft = transform::build_add(
            ctx.schema(),
            entry,
            &controls,
            parent.as_ref(),
            self.root.as_ref(),
            &self.config,
        )?;
        self.forward(
            ctx,
            Request::new(Operation::Add(draft), controls),
            AfterForward::Relay,
        )
    }

    // ===== modify =====

    fn begin_modify(&self, ctx: &mut OperationContext) -> StepResult {
        let changes = modify_message(ctx)?;
        if changes.dn.is_special() {
            return self.pass_through(ctx);
        }
        let Some(schema) = ctx.schema() else {
            return self.pass_through(ctx);
        };

        if changes.elements.is_empty() {
            return Err(SchemaError::EmptyModify {
                dn: changes.dn.linearized(),
            }
            .into());
        }

        let (draft, after) = transform::plan_modify(schema, changes)?;
        let controls = ctx.request().controls.clone();
        self.forward(ctx, Request::new(Operation::Modify(draft), controls), after)
    }

    fn complete_modify(
        &self,
        ctx: &mut OperationContext,
        found: Option<Message>,
    ) -> StepResult {
        let dn = modify_dn(ctx)?.clone();
        let current = found.ok_or_else(|| SchemaError::ClassesNotFound {
            dn: dn.linearized(),
        })?;
        let schema = ctx.schema().ok_or(SchemaError::MissingSchema)?;

        let fixup = transform::build_class_fixup(schema, &dn, &current)?;
        let controls = ctx.request().controls.clone();
        self.forward(
            ctx,
            Request::new(Operation::Modify(fixup), controls),
            AfterForward::Relay,
        )
    }

    // ===== rename =====

    fn begin_rename(&self, ctx: &mut OperationContext) -> StepResult {
        let (old_dn, new_dn) = ctx
            .request()
            .rename_dns()
            .ok_or_else(|| wrong_operation("rename"))?;

        if new_dn.is_special() {
            return self.pass_through(ctx);
        }

        if old_dn.is_base_of(new_dn) && !old_dn.eq_dn(new_dn) {
            return Err(SchemaError::RenameUnderSelf {
                dn: old_dn.linearized(),
            }
            .into());
        }

        let parent = new_dn.parent().ok_or_else(|| SchemaError::MissingRdn {
            dn: new_dn.linearized(),
        })?;
        let lookup = LookupRequest::base_object(parent, &[]).with_control(Control::show_deleted());
        self.submit_lookup(ctx, lookup, Resume::Rename)
    }

    fn complete_rename(
        &self,
        ctx: &mut OperationContext,
        parent: Option<Message>,
    ) -> StepResult {
        let (old_dn, new_dn) = ctx
            .request()
            .rename_dns()
            .ok_or_else(|| wrong_operation("rename"))?;
        let parent = parent.ok_or_else(|| SchemaError::RenameParentNotFound {
            dn: new_dn.linearized(),
        })?;

        let fixed = fix_dn(new_dn, &parent.dn)?;
        let request = Request::new(
            Operation::Rename {
                old_dn: old_dn.clone(),
                new_dn: fixed,
            },
            ctx.request().controls.clone(),
        );
        self.forward(ctx, request, AfterForward::Relay)
    }
}

fn modify_message(ctx: &OperationContext) -> Result<&Message, ExError> {
    ctx.request()
        .modify_message()
        .ok_or_else(|| wrong_operation("modify"))
}

fn modify_dn(ctx: &OperationContext) -> Result<&Dn, ExError> {
    modify_message(ctx).map(|msg| &msg.dn)
}

fn wrong_operation(expected: &str) -> ExError {
    ExError::new(ExErrorKind::OperationsError)
        .with_message(format!("context does not hold a {} request", expected))
}
