use std::fmt;

/// A scalar request input: the key it was submitted under and its raw string value.
///
/// The value is kept exactly as decoded, empty and whitespace-only values
/// included. Blank values are resolved by [`InputStore::value`](crate::InputStore::value).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputItem {
    key: String,
    value: String,
}

impl InputItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// The key of this item within its parent level, e.g. `0` for `tags[0]`.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// True when the value is empty or only whitespace.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Display for InputItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let item = InputItem::new("name", "  Zava ");

        assert_eq!(item.key(), "name");
        assert_eq!(item.value(), "  Zava ");
        assert_eq!(item.trimmed(), "Zava");
        assert!(!item.is_blank());
        assert_eq!(item.to_string(), "  Zava ");
    }

    #[test]
    fn blank_values() {
        assert!(InputItem::new("a", "").is_blank());
        assert!(InputItem::new("a", " \t\n").is_blank());
    }

    #[test]
    fn equality_by_key_and_value() {
        assert_eq!(InputItem::new("a", "1"), InputItem::new("a", "1"));
        assert_ne!(InputItem::new("a", "1"), InputItem::new("b", "1"));
        assert_ne!(InputItem::new("a", "1"), InputItem::new("a", "2"));
    }
}
