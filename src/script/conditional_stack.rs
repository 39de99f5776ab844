//! Branch bookkeeping for nested IF/NOTIF ... ELSE ... ENDIF
//!
//! Each open branch records whether it is currently executing. Evaluation of
//! the branch condition is the caller's concern.

/// ConditionalStack: [𝔹]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalStack {
    stack: Vec<bool>,
}

impl ConditionalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Enter a branch whose condition evaluated to `value`.
    pub fn open(&mut self, value: bool) {
        self.stack.push(value);
    }

    /// Flip the innermost branch. Repeated ELSE is allowed.
    pub fn else_(&mut self) {
        debug_assert!(!self.closed(), "else without open branch");
        if let Some(top) = self.stack.last_mut() {
            *top = !*top;
        }
    }

    /// Leave the innermost branch.
    pub fn close(&mut self) {
        debug_assert!(!self.closed(), "close without open branch");
        self.stack.pop();
    }

    /// closed ⇔ no branch is open
    pub fn closed(&self) -> bool {
        self.stack.is_empty()
    }

    /// succeeded ⇔ ∀ b ∈ stack: b
    pub fn succeeded(&self) -> bool {
        !self.stack.contains(&false)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
