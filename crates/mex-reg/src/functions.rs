//! Built-in function catalog.
//!
//! This registry holds the *metadata* of every built-in: spelling, aliases,
//! arity range, category, and the flags the core needs at lex and eval time
//! (broadcast lifting, lazy argument evaluation). The invocation handlers
//! are data-free here; the evaluator binds a handler to each descriptor by
//! name when the engine is constructed, and a test on that side checks the
//! two tables stay in lockstep.

use indexmap::IndexMap;

/// Marker for an unbounded maximum arity.
pub const VARIADIC: usize = usize::MAX;

/// Broad grouping of built-ins, used for documentation and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Trigonometry,
    Exponential,
    Rounding,
    Aggregate,
    HigherOrder,
    ControlFlow,
    IntegerMath,
    Linalg,
    Sequence,
}

/// Metadata for one built-in function.
#[derive(Clone, Copy, Debug)]
pub struct FunctionDescriptor {
    /// Canonical spelling
    pub name: &'static str,
    /// Alternative spellings resolving to the same built-in
    pub aliases: &'static [&'static str],
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments ([`VARIADIC`] for no bound)
    pub max_arity: usize,
    pub category: Category,
    /// Scalar built-ins with this flag set are lifted element-wise over
    /// vector and matrix arguments by the evaluator.
    pub broadcasts: bool,
    /// Lazy built-ins receive unevaluated argument expressions.
    pub lazy: bool,
}

impl FunctionDescriptor {
    /// Human-readable arity range for arity error messages.
    pub fn arity_text(&self) -> String {
        match (self.min_arity, self.max_arity) {
            (min, max) if max == VARIADIC => format!("at least {}", min),
            (min, max) if min == max => format!("{}", min),
            (min, max) => format!("{} to {}", min, max),
        }
    }
}

/// One row of the default catalog.
///
/// Columns: name, aliases, min arity, max arity, category, broadcasts, lazy.
type Row = (
    &'static str,
    &'static [&'static str],
    usize,
    usize,
    Category,
    bool,
    bool,
);

#[rustfmt::skip]
const DEFAULT_CATALOG: &[Row] = &[
    // Trigonometry (angle-unit aware, element-wise over containers)
    ("sin",   &[], 1, 1, Category::Trigonometry, true, false),
    ("cos",   &[], 1, 1, Category::Trigonometry, true, false),
    ("tan",   &[], 1, 1, Category::Trigonometry, true, false),
    ("asin",  &["arcsin"], 1, 1, Category::Trigonometry, true, false),
    ("acos",  &["arccos"], 1, 1, Category::Trigonometry, true, false),
    ("atan",  &["arctan"], 1, 1, Category::Trigonometry, true, false),
    ("sinh",  &[], 1, 1, Category::Trigonometry, true, false),
    ("cosh",  &[], 1, 1, Category::Trigonometry, true, false),
    ("tanh",  &[], 1, 1, Category::Trigonometry, true, false),

    // Exponentials and logarithms
    ("sqrt",  &[], 1, 1, Category::Exponential, true, false),
    ("cbrt",  &[], 1, 1, Category::Exponential, true, false),
    ("exp",   &[], 1, 1, Category::Exponential, true, false),
    ("ln",    &[], 1, 1, Category::Exponential, true, false),
    ("log",   &[], 1, 2, Category::Exponential, true, false),
    ("log2",  &[], 1, 1, Category::Exponential, true, false),
    ("log10", &[], 1, 1, Category::Exponential, true, false),

    // Rounding and sign
    ("abs",   &[], 1, 1, Category::Rounding, true, false),
    ("sign",  &["signum"], 1, 1, Category::Rounding, true, false),
    ("floor", &[], 1, 1, Category::Rounding, true, false),
    ("ceil",  &["ceiling"], 1, 1, Category::Rounding, true, false),
    ("round", &[], 1, 1, Category::Rounding, true, false),
    ("trunc", &[], 1, 1, Category::Rounding, true, false),

    // Aggregation over arguments, vectors, and ranges
    ("sum",    &["total"], 1, VARIADIC, Category::Aggregate, false, false),
    ("prod",   &["product"], 1, VARIADIC, Category::Aggregate, false, false),
    ("min",    &[], 1, VARIADIC, Category::Aggregate, false, false),
    ("max",    &[], 1, VARIADIC, Category::Aggregate, false, false),
    ("mean",   &["avg", "average"], 1, VARIADIC, Category::Aggregate, false, false),
    ("median", &[], 1, VARIADIC, Category::Aggregate, false, false),
    ("count",  &["len", "length"], 1, 1, Category::Aggregate, false, false),

    // Higher-order
    ("map",    &[], 2, 2, Category::HigherOrder, false, false),
    ("filter", &[], 2, 2, Category::HigherOrder, false, false),
    ("reduce", &["fold"], 2, 3, Category::HigherOrder, false, false),

    // Lazy control flow
    ("if", &[], 3, 3, Category::ControlFlow, false, true),

    // Integer math
    ("gcd",  &[], 2, 2, Category::IntegerMath, false, false),
    ("lcm",  &[], 2, 2, Category::IntegerMath, false, false),
    ("fact", &["factorial"], 1, 1, Category::IntegerMath, false, false),

    // Vectors and matrices
    ("det",       &["determinant"], 1, 1, Category::Linalg, false, false),
    ("transpose", &[], 1, 1, Category::Linalg, false, false),
    ("identity",  &[], 1, 1, Category::Linalg, false, false),
    ("inv",       &["inverse"], 1, 1, Category::Linalg, false, false),
    ("dot",       &[], 2, 2, Category::Linalg, false, false),

    // Sequences
    ("sort",    &[], 1, 1, Category::Sequence, false, false),
    ("reverse", &[], 1, 1, Category::Sequence, false, false),
    ("first",   &[], 1, 1, Category::Sequence, false, false),
    ("last",    &[], 1, 1, Category::Sequence, false, false),
];

/// Lookup over the built-in catalog.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    by_name: IndexMap<&'static str, FunctionDescriptor>,
    aliases: IndexMap<&'static str, &'static str>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut by_name = IndexMap::with_capacity(DEFAULT_CATALOG.len());
        let mut aliases = IndexMap::new();
        for &(name, alias_list, min_arity, max_arity, category, broadcasts, lazy) in
            DEFAULT_CATALOG
        {
            by_name.insert(
                name,
                FunctionDescriptor {
                    name,
                    aliases: alias_list,
                    min_arity,
                    max_arity,
                    category,
                    broadcasts,
                    lazy,
                },
            );
            for &alias in alias_list {
                aliases.insert(alias, name);
            }
        }
        Self { by_name, aliases }
    }
}

impl FunctionRegistry {
    /// True when `name` (canonical or alias) is a known built-in.
    pub fn is_function(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The descriptor for `name`, resolving aliases.
    pub fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        if let Some(descriptor) = self.by_name.get(name) {
            return Some(descriptor);
        }
        self.aliases
            .get(name)
            .and_then(|canonical| self.by_name.get(canonical))
    }

    /// Iterate over all canonical descriptors, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.by_name.values()
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_canonical() {
        let registry = FunctionRegistry::default();
        let descriptor = registry.lookup("sin").unwrap();
        assert_eq!(descriptor.name, "sin");
        assert_eq!(descriptor.min_arity, 1);
        assert!(descriptor.broadcasts);
    }

    #[test]
    fn test_lookup_alias() {
        let registry = FunctionRegistry::default();
        assert_eq!(registry.lookup("len").unwrap().name, "count");
        assert_eq!(registry.lookup("factorial").unwrap().name, "fact");
        assert_eq!(registry.lookup("arcsin").unwrap().name, "asin");
    }

    #[test]
    fn test_unknown_name() {
        let registry = FunctionRegistry::default();
        assert!(!registry.is_function("frobnicate"));
        assert!(registry.lookup("frobnicate").is_none());
    }

    #[test]
    fn test_if_is_lazy() {
        let registry = FunctionRegistry::default();
        let descriptor = registry.lookup("if").unwrap();
        assert!(descriptor.lazy);
        assert_eq!(descriptor.min_arity, 3);
        assert_eq!(descriptor.max_arity, 3);
    }

    #[test]
    fn test_variadic_arity_text() {
        let registry = FunctionRegistry::default();
        assert_eq!(registry.lookup("sum").unwrap().arity_text(), "at least 1");
        assert_eq!(registry.lookup("sin").unwrap().arity_text(), "1");
        assert_eq!(registry.lookup("log").unwrap().arity_text(), "1 to 2");
    }

    #[test]
    fn test_aliases_do_not_shadow_names() {
        let registry = FunctionRegistry::default();
        for descriptor in registry.iter() {
            for alias in descriptor.aliases {
                assert!(
                    !registry.by_name.contains_key(alias),
                    "alias {} collides with a canonical name",
                    alias
                );
            }
        }
    }
}
