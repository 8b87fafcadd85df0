//! Printer configuration.

/// Default limit on record nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Printer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintConfig {
    /// Maximum nesting depth of records (the top-level record is depth 0)
    pub max_depth: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
