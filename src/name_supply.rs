//! Unique names for semantic nodes.

use serde::Serialize;
use std::num::NonZeroU32;

/// A unique name. Only equality matters; the numeric value carries no meaning
/// beyond being distinct from every other name handed out by the same supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Name(NonZeroU32);

impl Name {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic supply of fresh names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSupply {
    next: u32,
}

impl Default for NameSupply {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSupply {
    pub fn new() -> Self {
        NameSupply { next: 1 }
    }

    /// Continue after names already handed out elsewhere (e.g. by a parser).
    pub fn starting_after(last: Name) -> Self {
        NameSupply { next: last.get() }.advanced()
    }

    fn advanced(self) -> Self {
        let next = self.next.checked_add(1).expect("ICE: name supply exhausted");
        NameSupply { next }
    }

    pub fn fresh(&mut self) -> Name {
        let name = Name::new(self.next).expect("ICE: name supply exhausted");
        *self = self.advanced();
        name
    }

    /// The name the next call to `fresh` returns.
    pub fn peek(&self) -> Name {
        Name::new(self.next).expect("ICE: name supply exhausted")
    }
}

impl Iterator for NameSupply {
    type Item = Name;

    fn next(&mut self) -> Option<Name> {
        Some(self.fresh())
    }
}
