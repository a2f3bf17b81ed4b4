//! Synthetic name allocators used while rendering templates.

use tracing::warn;

const ALPHABET_LEN: usize = 26;

/// Stack of synthetic identifiers (`aux0`, `aux1`, ...).
///
/// The counter only ever grows, so names are unique within a unit even after
/// they have been released.
#[derive(Debug, Default, Clone)]
pub struct IdentifierStack {
    counter: u32,
    stack: Vec<String>,
}

impl IdentifierStack {
    /// Allocate a fresh name and push it.
    pub fn allocate(&mut self) -> String {
        let name = format!("aux{}", self.counter);
        self.counter += 1;
        self.stack.push(name.clone());
        name
    }

    /// Pop the most recently allocated name.
    ///
    /// # Panics
    ///
    /// Panics when nothing is outstanding. Unbalanced allocate/release pairs are
    /// a template bug and must not produce silently wrong code.
    pub fn release(&mut self) -> String {
        match self.stack.pop() {
            Some(name) => name,
            None => panic!("release_last_identifier called with no outstanding identifier"),
        }
    }

    /// Number of names currently outstanding.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Cursor over loop variable names for nested loops.
///
/// Names walk the alphabet `a..z`. Past `z` the cursor keeps going with
/// two-letter names (`aa`, `ab`, ...) instead of wrapping back to `a`, which
/// would shadow an enclosing loop variable.
#[derive(Debug, Default, Clone)]
pub struct LoopVariables {
    cursor: usize,
}

impl LoopVariables {
    /// Restart at `a` and return it.
    pub fn restart(&mut self) -> String {
        self.cursor = 0;
        name_for(self.cursor)
    }

    /// Advance and return the next name.
    pub fn advance(&mut self) -> String {
        self.cursor += 1;
        if self.cursor == ALPHABET_LEN {
            warn!(
                depth = self.cursor + 1,
                "loop nesting exceeds single-letter variables; continuing with two-letter names"
            );
        }
        name_for(self.cursor)
    }
}

/// Bijective base-26 name: 0 -> a, 25 -> z, 26 -> aa, 27 -> ab.
fn name_for(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % ALPHABET_LEN) as u8);
        n /= ALPHABET_LEN;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
