//! The scope stack -- lexical scoping for name resolution.
//!
//! A stack of frames, innermost on top. Scopes are opened and closed with
//! plain [`push`]/[`pop`] calls rather than an RAII guard: a guard type
//! holding `&mut ScopeStack` would stay borrowed for as long as the scope is
//! open, and the resolver needs to make other `&mut self` calls (inserting
//! declarations, resolving nested expressions) during that same window --
//! calls a live guard would block. Callers get the same "always balanced"
//! guarantee by wrapping the fallible work that needs the scope open in a
//! small inner helper, called between one `push`/`pop` pair, mirroring the
//! balance the reference implementation gets from `ScopeRAII` without
//! needing a borrow that outlives a single statement.
//!
//! [`push`]: ScopeStack::push
//! [`pop`]: ScopeStack::pop

use yl_core::DeclId;

/// One open lexical scope: the declarations inserted directly into it, in
/// insertion order.
type Frame = Vec<(String, DeclId)>;

/// A stack of lexical scopes. The scope stack is the only mutable shared
/// resource in Sema; everything else is built up functionally as
/// resolution proceeds.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    /// Opens a new, empty scope.
    pub fn push(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Closes the innermost scope. Panics if none is open -- every `push`
    /// in the resolver is paired with exactly one `pop`.
    pub fn pop(&mut self) {
        self.frames.pop().expect("pop called with no open frame");
    }

    /// Inserts `id` under `identifier` into the innermost frame. Fails if
    /// `identifier` already exists **in that frame** -- the same name in an
    /// outer frame is shadowed silently, not rejected.
    pub fn insert_current(&mut self, identifier: &str, id: DeclId) -> bool {
        let frame = self.frames.last_mut().expect("no open scope");
        if frame.iter().any(|(name, _)| name == identifier) {
            return false;
        }
        frame.push((identifier.to_string(), id));
        true
    }

    /// Looks up `identifier`, innermost frame first. `depth == 0` means the
    /// match was found in the top frame.
    pub fn lookup(&self, identifier: &str) -> Option<(DeclId, usize)> {
        for (depth, frame) in self.frames.iter().rev().enumerate() {
            if let Some((_, id)) = frame.iter().rev().find(|(name, _)| name == identifier) {
                return Some((*id, depth));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_innermost_first() {
        let mut stack = ScopeStack::new();
        stack.push();
        stack.insert_current("x", DeclId(0));

        stack.push();
        stack.insert_current("x", DeclId(1));
        let (id, depth) = stack.lookup("x").unwrap();
        assert_eq!(id, DeclId(1));
        assert_eq!(depth, 0);
        stack.pop();

        let (id, depth) = stack.lookup("x").unwrap();
        assert_eq!(id, DeclId(0));
        assert_eq!(depth, 0);
        stack.pop();
    }

    #[test]
    fn shadowing_in_outer_frame_is_silent() {
        let mut stack = ScopeStack::new();
        stack.push();
        assert!(stack.insert_current("x", DeclId(0)));

        stack.push();
        assert!(stack.insert_current("x", DeclId(1)));
    }

    #[test]
    fn redeclaration_in_same_frame_fails() {
        let mut stack = ScopeStack::new();
        stack.push();
        assert!(stack.insert_current("x", DeclId(0)));
        assert!(!stack.insert_current("x", DeclId(1)));
    }

    #[test]
    fn lookup_depth_counts_frames_crossed() {
        let mut stack = ScopeStack::new();
        stack.push();
        stack.insert_current("g", DeclId(0));
        stack.push();
        stack.push();
        let (_, depth) = stack.lookup("g").unwrap();
        assert_eq!(depth, 2);
    }

    #[test]
    fn pop_is_balanced() {
        let mut stack = ScopeStack::new();
        stack.push();
        assert_eq!(stack.frames.len(), 1);
        stack.pop();
        assert_eq!(stack.frames.len(), 0);
    }

    #[test]
    fn unresolved_symbol_returns_none() {
        let mut stack = ScopeStack::new();
        stack.push();
        assert!(stack.lookup("missing").is_none());
    }
}
