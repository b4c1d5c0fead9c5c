//! Scoped control-flow blocks.
//!
//! A scope is an entry and exit label. Opening returns a [`ScopeHandle`];
//! the handle must be passed to [`Context::close_scope`] exactly once, and
//! scopes close innermost first.
//!
//! ```text
//! branch:  entry: [cond JumpIfFalse exit] body            exit:
//! loop:    [cond JumpIfFalse exit] entry: body Jump entry exit:
//! block:   entry: body Nop                                exit:
//! ```
//!
//! A loop condition guards the first iteration only. Later iterations
//! continue until the body leaves through [`Context::break_if_false`] or
//! [`Context::break_scope`].

use stacksym_core::{ContextId, EmitError, EmitResult, primitives};
use tracing::trace;

use super::Context;
use crate::bytecode::OpCode;
use crate::emit::Label;
use crate::load::{LoadIntent, emit_load};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Branch,
    Loop,
    Block,
}

/// Handle to an open scope. Not `Clone`: closing consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct ScopeHandle {
    context: ContextId,
    id: u32,
    kind: ScopeKind,
}

impl ScopeHandle {
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn context(&self) -> ContextId {
        self.context
    }
}

#[derive(Debug)]
struct OpenScope {
    id: u32,
    kind: ScopeKind,
    entry: Label,
    exit: Label,
}

/// Open scopes, innermost last, plus a closed flag per scope ever opened.
#[derive(Debug, Default)]
pub(super) struct ScopeStack {
    open: Vec<OpenScope>,
    closed: Vec<bool>,
}

impl ScopeStack {
    pub(super) fn depth(&self) -> usize {
        self.open.len()
    }

    pub(super) fn innermost(&self) -> Option<ScopeKind> {
        self.open.last().map(|s| s.kind)
    }

    fn push(&mut self, kind: ScopeKind, entry: Label, exit: Label) -> u32 {
        let id = self.closed.len() as u32;
        self.closed.push(false);
        self.open.push(OpenScope {
            id,
            kind,
            entry,
            exit,
        });
        id
    }

    fn find(&self, id: u32) -> EmitResult<&OpenScope> {
        if self.closed.get(id as usize).copied().unwrap_or(true) {
            return Err(EmitError::label_misuse(format!("scope {id} is already closed")));
        }
        self.open
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EmitError::label_misuse(format!("scope {id} is not open")))
    }
}

impl Context<'_> {
    /// Open a branch; when `condition` is false the whole scope is skipped.
    pub fn open_branch(&mut self, condition: Option<&dyn Symbol>) -> EmitResult<ScopeHandle> {
        self.open_scope(ScopeKind::Branch, condition)
    }

    /// Open a loop. `condition` is checked once, before the first iteration.
    pub fn open_loop(&mut self, condition: Option<&dyn Symbol>) -> EmitResult<ScopeHandle> {
        self.open_scope(ScopeKind::Loop, condition)
    }

    /// Open a bare scope with no condition.
    pub fn open_block(&mut self) -> EmitResult<ScopeHandle> {
        self.open_scope(ScopeKind::Block, None)
    }

    fn open_scope(
        &mut self,
        kind: ScopeKind,
        condition: Option<&dyn Symbol>,
    ) -> EmitResult<ScopeHandle> {
        if let Some(condition) = condition {
            self.check_condition(condition)?;
        }

        let result = self.atomically(|ctx| {
            let entry = ctx.emitter.define_label();
            let exit = ctx.emitter.define_label();
            if kind != ScopeKind::Loop {
                ctx.emitter.mark_label(entry)?;
            }
            if let Some(condition) = condition {
                emit_load(ctx, condition, LoadIntent::Value)?;
                ctx.emitter.emit_jump(OpCode::JumpIfFalse, exit)?;
            }
            if kind == ScopeKind::Loop {
                ctx.emitter.mark_label(entry)?;
            }
            Ok((entry, exit))
        });
        self.release_statement_temporaries();
        let (entry, exit) = result?;

        let id = self.scopes.push(kind, entry, exit);
        trace!(context = %self.id, scope = id, ?kind, "opened scope");
        Ok(ScopeHandle {
            context: self.id,
            id,
            kind,
        })
    }

    /// Close `handle`, which must be the innermost open scope.
    pub fn close_scope(&mut self, handle: ScopeHandle) -> EmitResult<()> {
        self.check_context(handle.context)?;
        let scope = self.scopes.find(handle.id)?;
        let innermost = self.scopes.open.last().map(|s| s.id);
        if innermost != Some(handle.id) {
            return Err(EmitError::label_misuse(format!(
                "scope {} closed before the scopes nested inside it",
                handle.id
            )));
        }
        let (kind, entry, exit) = (scope.kind, scope.entry, scope.exit);

        match kind {
            ScopeKind::Loop => self.emitter.emit_jump(OpCode::Jump, entry)?,
            ScopeKind::Block => self.emitter.emit(OpCode::Nop),
            ScopeKind::Branch => {}
        }
        self.emitter.mark_label(exit)?;

        self.scopes.open.pop();
        self.scopes.closed[handle.id as usize] = true;
        trace!(context = %self.id, scope = handle.id, ?kind, "closed scope");
        Ok(())
    }

    /// Jump to the exit of an open scope.
    pub fn break_scope(&mut self, handle: &ScopeHandle) -> EmitResult<()> {
        let exit = self.open_labels(handle)?.1;
        self.emitter.emit_jump(OpCode::Jump, exit)
    }

    /// Jump back to the entry of an open loop.
    pub fn continue_loop(&mut self, handle: &ScopeHandle) -> EmitResult<()> {
        let (entry, _) = self.open_labels(handle)?;
        if handle.kind != ScopeKind::Loop {
            return Err(EmitError::label_misuse(format!(
                "continue on a {:?} scope",
                handle.kind
            )));
        }
        self.emitter.emit_jump(OpCode::Jump, entry)
    }

    /// Leave the scope when `condition` is false.
    pub fn break_if_false(&mut self, handle: &ScopeHandle, condition: &dyn Symbol) -> EmitResult<()> {
        let exit = self.open_labels(handle)?.1;
        self.check_condition(condition)?;
        let result = self.atomically(|ctx| {
            emit_load(ctx, condition, LoadIntent::Value)?;
            ctx.emitter.emit_jump(OpCode::JumpIfFalse, exit)
        });
        self.release_statement_temporaries();
        result
    }

    fn open_labels(&self, handle: &ScopeHandle) -> EmitResult<(Label, Label)> {
        self.check_context(handle.context)?;
        let scope = self.scopes.find(handle.id)?;
        Ok((scope.entry, scope.exit))
    }

    fn check_condition(&self, condition: &dyn Symbol) -> EmitResult<()> {
        self.check_symbol(condition)?;
        let data_type = condition.data_type().dereferenced();
        if data_type.type_hash != primitives::BOOL {
            return Err(EmitError::NoConversion {
                from: self.describe(data_type),
                to: self.type_name(primitives::BOOL),
            });
        }
        Ok(())
    }
}
