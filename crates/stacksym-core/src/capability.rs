//! Capability flags for symbols.

use bitflags::bitflags;

bitflags! {
    /// What a symbol can do besides producing its value.
    ///
    /// `VALUE` is present on every symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Can leave its value on the stack.
        const VALUE = 1 << 0;
        /// Can leave the address of its storage on the stack.
        const ADDRESS = 1 << 1;
        /// Can consume a value from the stack and store it.
        const ASSIGN = 1 << 2;

        /// Locals, arguments, fields and elements.
        const STORAGE = Self::VALUE.bits() | Self::ADDRESS.bits() | Self::ASSIGN.bits();
    }
}

impl Capabilities {
    /// Name of a single capability, for diagnostics.
    pub fn describe(self) -> &'static str {
        if self == Capabilities::ADDRESS {
            "address"
        } else if self == Capabilities::ASSIGN {
            "assign"
        } else if self == Capabilities::VALUE {
            "value"
        } else {
            "storage"
        }
    }
}
