//! Label table for jumps within one method body.
//!
//! Jumps to a marked label are written with the final target immediately.
//! Jumps to an unmarked label are recorded as fix-ups and patched when the
//! label is marked.

use stacksym_core::{ContextId, EmitError, EmitResult};

use crate::bytecode::{BytecodeChunk, OpCode};

/// Handle to a position in one context's instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    context: ContextId,
    index: u32,
}

impl Label {
    /// The context that created this label.
    pub fn context(&self) -> ContextId {
        self.context
    }
}

#[derive(Debug, Default)]
struct LabelState {
    /// Marked position.
    position: Option<u32>,
    /// Operand offsets of forward jumps. Kept after patching so an undone
    /// mark leaves them pending again.
    fixups: Vec<usize>,
}

/// All labels of one context.
#[derive(Debug)]
pub struct LabelTable {
    context: ContextId,
    labels: Vec<LabelState>,
    /// Label indices in the order they were marked.
    marked: Vec<u32>,
}

impl LabelTable {
    pub fn new(context: ContextId) -> Self {
        Self {
            context,
            labels: Vec::new(),
            marked: Vec::new(),
        }
    }

    /// Create a new unmarked label.
    pub fn define(&mut self) -> Label {
        let index = self.labels.len() as u32;
        self.labels.push(LabelState::default());
        Label {
            context: self.context,
            index,
        }
    }

    fn state(&self, label: Label) -> EmitResult<&LabelState> {
        if label.context != self.context {
            return Err(EmitError::CrossContext {
                expected: self.context,
                found: label.context,
            });
        }
        self.labels
            .get(label.index as usize)
            .ok_or_else(|| EmitError::label_misuse(format!("unknown label {}", label.index)))
    }

    /// Position of a marked label.
    pub fn position(&self, label: Label) -> EmitResult<Option<u32>> {
        Ok(self.state(label)?.position)
    }

    /// Mark `label` at the current end of `chunk` and patch pending jumps.
    pub fn mark(&mut self, label: Label, chunk: &mut BytecodeChunk) -> EmitResult<()> {
        if self.state(label)?.position.is_some() {
            return Err(EmitError::label_misuse(format!(
                "label {} marked twice",
                label.index
            )));
        }
        let position = offset_u32(chunk.current_offset())?;
        let state = &mut self.labels[label.index as usize];
        for &fixup in &state.fixups {
            if !chunk.patch_u32(fixup, position) {
                return Err(EmitError::label_misuse(format!(
                    "jump operand at {fixup} is outside the stream"
                )));
            }
        }
        state.position = Some(position);
        self.marked.push(label.index);
        Ok(())
    }

    /// Emit a jump to `label`.
    pub fn emit_jump(
        &mut self,
        op: OpCode,
        label: Label,
        chunk: &mut BytecodeChunk,
        line: u32,
    ) -> EmitResult<()> {
        match self.state(label)?.position {
            Some(position) => {
                chunk.write_op(op, line);
                chunk.write_u32(position, line);
            }
            None => {
                let operand = chunk.emit_jump(op, line);
                self.labels[label.index as usize].fixups.push(operand);
            }
        }
        Ok(())
    }

    /// Whether any label marked at or after `offset`.
    pub fn has_target_at(&self, offset: usize) -> bool {
        self.labels
            .iter()
            .any(|s| s.position.is_some_and(|p| p as usize >= offset))
    }

    /// Labels that still have unpatched jumps.
    pub fn unresolved(&self) -> usize {
        self.labels
            .iter()
            .filter(|s| s.position.is_none() && !s.fixups.is_empty())
            .count()
    }

    /// Number of marks so far.
    pub fn mark_count(&self) -> usize {
        self.marked.len()
    }

    /// Forget fix-ups recorded at or after `offset` and undo every mark
    /// after the first `marks`.
    pub fn rollback(&mut self, offset: usize, marks: usize) {
        for index in self.marked.drain(marks.min(self.marked.len())..) {
            self.labels[index as usize].position = None;
        }
        for state in &mut self.labels {
            state.fixups.retain(|&f| f < offset);
        }
    }
}

fn offset_u32(offset: usize) -> EmitResult<u32> {
    u32::try_from(offset)
        .map_err(|_| EmitError::InvalidOperand(format!("jump target {offset} exceeds u32")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_jump_patched_on_mark() {
        let mut chunk = BytecodeChunk::new();
        let mut labels = LabelTable::new(ContextId::fresh());
        let exit = labels.define();

        labels.emit_jump(OpCode::Jump, exit, &mut chunk, 1).unwrap();
        assert_eq!(labels.unresolved(), 1);
        chunk.write_op(OpCode::Nop, 1);
        labels.mark(exit, &mut chunk).unwrap();

        assert_eq!(labels.unresolved(), 0);
        assert_eq!(chunk.read_u32(1), Some(6));
    }

    #[test]
    fn backward_jump_written_directly() {
        let mut chunk = BytecodeChunk::new();
        let mut labels = LabelTable::new(ContextId::fresh());
        let entry = labels.define();
        chunk.write_op(OpCode::Nop, 1);
        labels.mark(entry, &mut chunk).unwrap();
        labels.emit_jump(OpCode::Jump, entry, &mut chunk, 1).unwrap();

        assert_eq!(chunk.read_u32(2), Some(1));
        assert_eq!(labels.unresolved(), 0);
    }

    #[test]
    fn rollback_undoes_later_marks() {
        let mut chunk = BytecodeChunk::new();
        let mut labels = LabelTable::new(ContextId::fresh());
        let before = labels.define();
        let exit = labels.define();
        labels.mark(before, &mut chunk).unwrap();
        labels.emit_jump(OpCode::Jump, exit, &mut chunk, 1).unwrap();

        let (offset, marks) = (chunk.current_offset(), labels.mark_count());
        chunk.write_op(OpCode::Nop, 1);
        labels.mark(exit, &mut chunk).unwrap();
        assert!(labels.has_target_at(offset));

        chunk.truncate(offset);
        labels.rollback(offset, marks);
        assert!(!labels.has_target_at(offset));
        assert_eq!(labels.position(before).unwrap(), Some(0));
        assert_eq!(labels.position(exit).unwrap(), None);
        assert_eq!(labels.unresolved(), 1);

        labels.mark(exit, &mut chunk).unwrap();
        assert_eq!(chunk.read_u32(1), Some(5));
        assert_eq!(labels.unresolved(), 0);
    }

    #[test]
    fn double_mark_rejected() {
        let mut chunk = BytecodeChunk::new();
        let mut labels = LabelTable::new(ContextId::fresh());
        let label = labels.define();
        labels.mark(label, &mut chunk).unwrap();
        let err = labels.mark(label, &mut chunk).unwrap_err();
        assert!(matches!(err, EmitError::LabelMisuse { .. }));
    }

    #[test]
    fn foreign_label_rejected() {
        let mut chunk = BytecodeChunk::new();
        let mut ours = LabelTable::new(ContextId::fresh());
        let mut theirs = LabelTable::new(ContextId::fresh());
        let foreign = theirs.define();
        ours.define();

        let err = ours
            .emit_jump(OpCode::Jump, foreign, &mut chunk, 1)
            .unwrap_err();
        assert!(matches!(err, EmitError::CrossContext { .. }));
        assert!(chunk.is_empty());
    }

    #[test]
    fn rollback_drops_fixups() {
        let mut chunk = BytecodeChunk::new();
        let mut labels = LabelTable::new(ContextId::fresh());
        let exit = labels.define();
        chunk.write_op(OpCode::Nop, 1);
        labels.emit_jump(OpCode::Jump, exit, &mut chunk, 1).unwrap();

        labels.rollback(1, labels.mark_count());
        chunk.truncate(1);
        assert_eq!(labels.unresolved(), 0);
    }
}
