//! Shared utilities and small common values for workspace crates.
//!
//! ```rust
//! use scommon::{MetadataMap, Registry, truncate_chars, word_count};
//!
//! let mut headers = MetadataMap::new();
//! headers.insert("X-Title".to_string(), "gateway".to_string());
//!
//! let mut registry = Registry::new();
//! registry.insert("openai".to_string(), 1_u32);
//!
//! assert_eq!(truncate_chars("hello world", 5), "hello");
//! assert_eq!(word_count("hello world"), 2);
//! assert_eq!(registry.get("openai"), Some(&1));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use scommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! String metadata maps shared across crates (outbound headers, labels).

    use std::collections::HashMap;

    pub type MetadataMap = HashMap<String, String>;
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use scommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub mod text {
    //! Character-aware text helpers used for log redaction and size guards.
    //!
    //! ```rust
    //! use scommon::{truncate_chars, word_count};
    //!
    //! assert_eq!(truncate_chars("你好世界", 2), "你好");
    //! assert_eq!(word_count("你好 world"), 3);
    //! ```

    /// Keeps at most `limit` characters (not bytes) of `value`.
    pub fn truncate_chars(value: &str, limit: usize) -> String {
        match value.char_indices().nth(limit) {
            Some((index, _)) => value[..index].to_string(),
            None => value.to_string(),
        }
    }

    /// Counts every Han ideograph as one word and every whitespace-separated
    /// run of other characters as one word.
    pub fn word_count(value: &str) -> usize {
        let mut count = 0;
        let mut in_word = false;

        for ch in value.chars() {
            if is_han(ch) {
                count += 1;
                in_word = false;
            } else if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                count += 1;
                in_word = true;
            }
        }

        count
    }

    fn is_han(ch: char) -> bool {
        matches!(
            ch as u32,
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
        )
    }
}

pub use context::MetadataMap;
pub use future::BoxFuture;
pub use registry::Registry;
pub use text::{truncate_chars, word_count};

#[cfg(test)]
mod tests {
    use super::{Registry, truncate_chars, word_count};

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("请接着说", 2), "请接");
        assert_eq!(truncate_chars("short", 20), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn word_count_mixes_han_characters_and_latin_words() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one two   three "), 3);
        assert_eq!(word_count("继续"), 2);
        assert_eq!(word_count("hello世界 again"), 4);
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().count(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
