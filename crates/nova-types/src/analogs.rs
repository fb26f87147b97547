//! Platform type analogs.
//!
//! A JVM collection interface is loaded as its mutable Kotlin view, but an alternative signature
//! may legitimately name the read-only view instead. The pairs below are interchangeable when an
//! alternative-signature type name is matched against a binary-inferred declaration.

/// `(mutable view, read-only view)` pairs. Fixed at compile time; never mutated.
pub const PLATFORM_ANALOGS: &[(&str, &str)] = &[
    ("kotlin.collections.MutableIterator", "kotlin.collections.Iterator"),
    ("kotlin.collections.MutableIterable", "kotlin.collections.Iterable"),
    ("kotlin.collections.MutableCollection", "kotlin.collections.Collection"),
    ("kotlin.collections.MutableList", "kotlin.collections.List"),
    ("kotlin.collections.MutableSet", "kotlin.collections.Set"),
    ("kotlin.collections.MutableMap", "kotlin.collections.Map"),
];

/// All declarations interchangeable with `fq_name` (excluding itself).
pub fn platform_analogs(fq_name: &str) -> impl Iterator<Item = &'static str> + '_ {
    PLATFORM_ANALOGS.iter().filter_map(move |(mutable, read_only)| {
        if *mutable == fq_name {
            Some(*read_only)
        } else if *read_only == fq_name {
            Some(*mutable)
        } else {
            None
        }
    })
}

pub fn is_platform_analog(a: &str, b: &str) -> bool {
    platform_analogs(a).any(|analog| analog == b)
}
