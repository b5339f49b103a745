//! String interner for symbol, type and attribute names.
//!
//! Names are interned once per analysis session and passed around as `u32`
//! handles (`Atom`). Comparing two attribute class names becomes an integer
//! comparison, which matters because role-annotation matching runs for every
//! argument of every call on every return path.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord,
)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names pre-interned by `intern_common`: the framework names every session
/// looks up at least once.
const COMMON_STRINGS: &[&str] = &[
    "StatusCode",
    "Value",
    "ActionResultStatusCodeAttribute",
    "ActionResultObjectValueAttribute",
    "DefaultStatusCodeAttribute",
    "ProducesResponseTypeAttribute",
    "IActionResult",
    "IStatusCodeActionResult",
    "ActionResult",
    "ObjectResult",
    "StatusCodeResult",
    "ControllerBase",
    "Ok",
    "NotFound",
    "BadRequest",
    "Created",
    "NoContent",
    "StatusCodes",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// Serializes as the plain list of strings so atom indices survive a JSON
/// round-trip of a whole symbol table.
///
/// # Example
/// ```
/// use rsi_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("StatusCode");
/// let a2 = interner.intern("StatusCode");
/// assert_eq!(a1, a2);
/// assert_eq!(interner.resolve(a1), "StatusCode");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up an already-interned string without interning it.
    ///
    /// Returns None when the session never saw the name, which is how a
    /// missing well-known symbol degrades to "no match".
    #[inline]
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied().filter(|atom| !atom.is_none())
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Pre-intern the framework names every session looks up.
    pub fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

impl From<Vec<String>> for Interner {
    fn from(strings: Vec<String>) -> Self {
        let mut interner = Interner::new();
        // Slot 0 is always the empty string; keep every later slot at its
        // serialized index even if the input repeats a string.
        for s in strings.into_iter().skip(1) {
            let atom = Atom(interner.strings.len() as u32);
            let owned: Arc<str> = Arc::from(s);
            interner.strings.push(owned.clone());
            interner.map.entry(owned).or_insert(atom);
        }
        interner
    }
}

impl From<Interner> for Vec<String> {
    fn from(interner: Interner) -> Self {
        interner.strings.iter().map(|s| s.to_string()).collect()
    }
}
