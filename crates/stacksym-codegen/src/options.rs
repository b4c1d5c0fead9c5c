//! Emission options.

/// Knobs for a [`Context`](crate::Context).
///
/// ```
/// use stacksym_codegen::EmitOptions;
///
/// let options = EmitOptions::default()
///     .reuse_temporaries(false)
///     .max_locals(16);
/// assert_eq!(options.max_locals, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Return temporaries to a per-type pool at the end of each statement so
    /// later statements reuse the slots.
    pub reuse_temporaries: bool,
    /// Upper bound on declared local slots, temporaries included.
    pub max_locals: u16,
    /// Line recorded for instructions until `Context::set_line` is called.
    pub initial_line: u32,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            reuse_temporaries: true,
            max_locals: u16::MAX,
            initial_line: 1,
        }
    }
}

impl EmitOptions {
    pub fn reuse_temporaries(mut self, enabled: bool) -> Self {
        self.reuse_temporaries = enabled;
        self
    }

    pub fn max_locals(mut self, limit: u16) -> Self {
        self.max_locals = limit;
        self
    }

    pub fn initial_line(mut self, line: u32) -> Self {
        self.initial_line = line;
        self
    }
}
