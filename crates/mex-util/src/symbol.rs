//! Symbol module - String interning for identifier handling.
//!
//! A [`Symbol`] is a compact 4-byte handle to a string stored in a global
//! table. Interning gives O(1) equality, which matters in the token
//! processor and in scope lookups where the same identifier is compared many
//! times per evaluation.
//!
//! Interned strings are leaked and live for the program duration. The total
//! is bounded by the distinct identifiers appearing in evaluated expressions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use ahash::RandomState;
use dashmap::DashMap;

/// Global string table, initialized on first use.
static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// An interned string identifier.
///
/// # Examples
///
/// ```
/// use mex_util::symbol::Symbol;
///
/// let a = Symbol::intern("pi");
/// let b = Symbol::intern("pi");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "pi");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    index: u32,
}

impl Symbol {
    /// Intern a string, returning its symbol.
    ///
    /// Interning the same string twice returns the same symbol.
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string value associated with this symbol.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    /// Compare the symbol's string with a `&str`.
    #[inline]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str() == other
    }

    /// Length of the symbol's string in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Check if the symbol's string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Two-way interning table.
///
/// `names` maps string content to its symbol, `strings` maps the symbol
/// index back to the leaked string. Both sides use `DashMap` so interning is
/// safe from any thread without a global lock.
struct StringTable {
    names: DashMap<&'static str, Symbol, RandomState>,
    strings: DashMap<u32, &'static str, RandomState>,
    next: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            names: DashMap::with_hasher(RandomState::new()),
            strings: DashMap::with_hasher(RandomState::new()),
            next: AtomicU32::new(0),
        }
    }

    fn intern(&self, string: &str) -> Symbol {
        if let Some(existing) = self.names.get(string) {
            return *existing;
        }
        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        match self.names.entry(leaked) {
            dashmap::mapref::entry::Entry::Occupied(entry) => *entry.get(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let index = self.next.fetch_add(1, Ordering::Relaxed);
                let symbol = Symbol { index };
                self.strings.insert(index, leaked);
                entry.insert(symbol);
                symbol
            }
        }
    }

    fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.strings.get(&symbol.index).map(|entry| *entry)
    }
}

// Symbols are shared across the whole pipeline.
static_assertions::assert_impl_all!(Symbol: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_intern_same_string() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn test_intern_distinct_strings() {
        let a = Symbol::intern("alpha");
        let b = Symbol::intern("beta");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "alpha");
        assert_eq!(b.as_str(), "beta");
    }

    #[test]
    fn test_eq_str() {
        let sym = Symbol::intern("meters");
        assert!(sym.eq_str("meters"));
        assert!(!sym.eq_str("feet"));
    }

    #[test]
    fn test_empty_string() {
        let sym = Symbol::intern("");
        assert!(sym.is_empty());
        assert_eq!(sym.len(), 0);
    }

    #[test]
    fn test_display_and_debug() {
        let sym = Symbol::intern("x");
        assert_eq!(format!("{}", sym), "x");
        assert_eq!(format!("{:?}", sym), "Symbol(x)");
    }

    #[test]
    fn test_concurrent_intern_same_string() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| Symbol::intern("concurrent")))
            .collect();
        let symbols: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for sym in &symbols[1..] {
            assert_eq!(symbols[0], *sym);
        }
    }

    #[test]
    fn test_unicode() {
        let sym = Symbol::intern("变量");
        assert_eq!(sym.as_str(), "变量");
    }
}
