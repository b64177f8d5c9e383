//! ANSI color codes for listing output.
//!
//! Three semantic roles plus a dim modifier:
//! - Label: section headers, function labels
//! - Address: absolute code/data addresses
//! - Dim: raw offsets, comments, metadata
//! - Reset: return to default

/// ANSI color palette for dumps and disassembly listings.
///
/// Uses only standard 16-color ANSI codes so it reads on light and dark themes.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub label: &'static str,
    pub address: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    /// Colors enabled (ANSI escape codes).
    pub const ON: Self = Self {
        label: "\x1b[34m",
        address: "\x1b[32m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    /// Colors disabled (empty strings).
    pub const OFF: Self = Self {
        label: "",
        address: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.label.is_empty()
    }
}
