use stacksym_core::{ContextId, DataType, EmitResult, Literal};

use super::Symbol;
use crate::Context;

/// A constant. Value only.
#[derive(Debug)]
pub struct LiteralSymbol {
    context: ContextId,
    literal: Literal,
}

impl LiteralSymbol {
    pub(crate) fn new(context: ContextId, literal: Literal) -> Self {
        Self { context, literal }
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }
}

impl Symbol for LiteralSymbol {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.literal.data_type()
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_literal(&self.literal)
    }
}
