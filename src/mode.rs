use std::fmt::Display;

use clap::ValueEnum;

/// Heap ordering: which of two values belongs nearer the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeapMode {
    /// Smallest value at the root.
    #[default]
    Min,
    /// Largest value at the root.
    Max,
}

impl HeapMode {
    /// True when `child` belongs above `parent`. Strict, so equal values never swap.
    pub fn should_swap(&self, child: u32, parent: u32) -> bool {
        match self {
            HeapMode::Min => child < parent,
            HeapMode::Max => child > parent,
        }
    }
}

impl Display for HeapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeapMode::Min => write!(f, "min"),
            HeapMode::Max => write!(f, "max"),
        }
    }
}
