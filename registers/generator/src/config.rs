// Licensed under the Apache-2.0 license

//! Configuration for identifier generation and filtering during code generation.
//!
//! This module provides [`ReservedWords`], the table of identifiers the
//! target language does not allow as names, and [`FilterConfig`], which
//! controls which peripherals are emitted. [`GeneratorConfig`] bundles both.

use std::collections::BTreeSet;

/// C++ keywords and alternative operator tokens (through C++20).
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "co_await", "co_return",
    "co_yield", "compl", "concept", "const", "const_cast", "consteval", "constexpr", "constinit",
    "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum",
    "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline",
    "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr",
    "operator", "or", "or_eq", "private", "protected", "public", "register", "reinterpret_cast",
    "requires", "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast",
    "struct", "switch", "template", "this", "thread_local", "throw", "true", "try", "typedef",
    "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t",
    "while", "xor", "xor_eq",
];

/// Identifiers that generated names must not collide with.
///
/// A colliding name gets a trailing `_`.
///
/// # Example
///
/// ```
/// use svd2cpp_generator::config::ReservedWords;
///
/// let words = ReservedWords::cpp().with_word("raw");
/// assert!(words.contains("volatile"));
/// assert!(words.contains("raw"));
/// assert!(!words.contains("MODE"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl ReservedWords {
    /// The C++ keyword table.
    pub fn cpp() -> Self {
        Self {
            words: CPP_KEYWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// An empty table.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a word to the table.
    pub fn with_word(mut self, word: &str) -> Self {
        self.words.insert(word.to_string());
        self
    }

    /// Exact (case-sensitive) membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Configuration for filtering which peripherals are generated.
///
/// # Example
///
/// ```
/// use svd2cpp_generator::config::FilterConfig;
///
/// let config = FilterConfig::new()
///     .exclude_name("debug_block")
///     .exclude_name("TEST");
/// assert!(!config.should_include("DEBUG_BLOCK"));
/// assert!(config.should_include("GPIO"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterConfig {
    /// Exclude peripherals whose names match (case-insensitive).
    pub exclude_names: Vec<String>,
}

impl FilterConfig {
    /// Create a new FilterConfig with no filtering (everything included).
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude peripherals whose name matches (case-insensitive).
    pub fn exclude_name(mut self, name: &str) -> Self {
        self.exclude_names.push(name.to_lowercase());
        self
    }

    /// Returns true if this filter has no constraints (everything passes).
    pub fn is_empty(&self) -> bool {
        self.exclude_names.is_empty()
    }

    /// Check whether a peripheral with the given name should be generated.
    pub fn should_include(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        !self.exclude_names.iter().any(|n| *n == name_lower)
    }
}

/// Everything the pipeline needs besides the descriptor itself.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub reserved_words: ReservedWords,
    pub filter: FilterConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reserved_words: ReservedWords::cpp(),
            filter: FilterConfig::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_reserved_words(mut self, reserved_words: ReservedWords) -> Self {
        self.reserved_words = reserved_words;
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}
