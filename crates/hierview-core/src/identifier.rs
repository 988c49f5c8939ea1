//! Identifier management using string interning
//!
//! Graph node identities are long path strings (`top_TOP::cpu0_CPU::alu0_ALU`)
//! that get compared, hashed, and copied many times while a design is
//! transformed and laid out. [`Id`] interns them once and is `Copy` afterwards.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Separator placed between path segments of a nested identifier.
pub const PATH_SEPARATOR: &str = "::";

/// Global string interner for identifier storage.
///
/// Entries live for the rest of the process. Interning is keyed by the path
/// string, so reloading or re-rendering a design reuses its symbols; memory is
/// bounded by the number of distinct paths ever seen, not by the number of
/// rendering cycles. Since ids are full paths, a chain of depth `d` interns
/// strings whose total length grows with `d * d`.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier.
///
/// # Examples
///
/// ```
/// use hierview_core::identifier::Id;
///
/// let cpu = Id::new("cpu0_CPU");
/// let alu = cpu.create_nested(Id::new("alu0_ALU"));
/// assert_eq!(alu, "cpu0_CPU::alu0_ALU");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it if needed.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a nested ID by joining this ID and `child_id` with [`PATH_SEPARATOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hierview_core::identifier::Id;
    ///
    /// let top = Id::new("soc_SOC");
    /// let nested = top.create_nested(Id::new("cpu0_CPU"));
    /// assert_eq!(nested, "soc_SOC::cpu0_CPU");
    /// ```
    pub fn create_nested(&self, child_id: Id) -> Self {
        let mut interner = interner();
        let nested_name = match (interner.resolve(self.0), interner.resolve(child_id.0)) {
            (Some(parent), Some(child)) => format!("{parent}{PATH_SEPARATOR}{child}"),
            // Symbols are only ever produced by this interner.
            _ => unreachable!("identifier symbol missing from interner"),
        };
        Self(interner.get_or_intern(&nested_name))
    }

    /// Returns the number of path segments in this identifier.
    pub fn depth(&self) -> usize {
        let interner = interner();
        interner
            .resolve(self.0)
            .map_or(0, |name| name.split(PATH_SEPARATOR).count())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        match interner.resolve(self.0) {
            Some(name) => f.write_str(name),
            None => Err(fmt::Error),
        }
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
