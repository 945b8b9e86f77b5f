//! Jump stack: back-navigation history for address jumps.
//!
//! Every successful jump-to-address pushes the window's `(cursor, offset)`
//! before moving. Jump-back pops the most recent entry and restores it
//! exactly, so nested jumps unwind in LIFO order.

/// A saved window position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub cursor: u64,
    pub offset: u64,
}

/// LIFO history of [`Jump`]s.
#[derive(Debug, Default, Clone)]
pub struct JumpStack {
    entries: Vec<Jump>,
}

impl JumpStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a position before jumping away from it.
    pub fn push(&mut self, jump: Jump) {
        self.entries.push(jump);
    }

    /// Take the most recent position, if any.
    pub fn pop(&mut self) -> Option<Jump> {
        self.entries.pop()
    }

    /// The most recent position without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Jump> {
        self.entries.last().copied()
    }

    /// Number of saved positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
