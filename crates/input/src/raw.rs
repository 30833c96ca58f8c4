//! Raw request inputs as the server runtime delivers them.
//!
//! [`RawParams`] is an insertion-ordered, string-keyed mapping whose values are
//! either scalars or nested mappings. It is the shape a form decoder produces
//! from bracket-encoded keys such as `user[address][city]`, and the input of
//! the tree builders in [`crate::builder`].
//!
//! [`RawParams::from_urlencoded`] decodes `application/x-www-form-urlencoded`
//! payloads with the bracket rules browsers and form encoders rely on:
//!
//! - `a[b][c]=v` nests, `a[]=v` appends under the next integer index
//! - `.` and ` ` in the base name become `_`, an unmatched `[` becomes `_`
//! - text after the last closing bracket is ignored
//! - deeper structure wins: a later scalar never replaces a nested mapping

use indexmap::IndexMap;
use indexmap::map;
use serde_json::{Map, Value};
use tracing::{trace, warn};

/// Bracket nesting accepted by default before a pair is dropped.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Scalar(String),
    Map(RawParams),
}

/// Keys are unique and keep their insertion order. Equality ignores order.
#[derive(Debug, Clone, Default, Eq)]
pub struct RawParams {
    entries: IndexMap<String, RawValue>,
    // one past the largest integer key, the slot `[]` appends to
    next_index: u64,
}

impl RawValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(s) => Some(s),
            RawValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawParams> {
        match self {
            RawValue::Map(map) => Some(map),
            RawValue::Scalar(_) => None,
        }
    }

    fn make_map(&mut self) -> &mut RawParams {
        match *self {
            RawValue::Map(ref mut map) => map,
            RawValue::Scalar(_) => {
                *self = RawValue::Map(RawParams::new());
                self.make_map()
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            RawValue::Scalar(s) => Value::String(s.clone()),
            RawValue::Map(map) => Value::Object(map.to_json()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Scalar(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Scalar(value)
    }
}

impl From<RawParams> for RawValue {
    fn from(value: RawParams) -> Self {
        RawValue::Map(value)
    }
}

impl RawParams {
    pub fn new() -> Self {
        Self { entries: IndexMap::new(), next_index: 0 }
    }

    /// Decodes a form-encoded payload with the default nesting limit.
    pub fn from_urlencoded(input: &str) -> Self {
        Self::from_urlencoded_with_depth(input, DEFAULT_MAX_DEPTH)
    }

    /// Decodes a form-encoded payload, dropping pairs nested deeper than `max_depth`.
    ///
    /// Decoding never fails: undecodable input yields an empty mapping.
    pub fn from_urlencoded_with_depth(input: &str, max_depth: usize) -> Self {
        let pairs = match serde_urlencoded::from_str::<Vec<(String, String)>>(input) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(cause = %e, "can't decode form payload, using empty params");
                return Self::new();
            }
        };

        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert_encoded(&key, value, max_depth);
        }
        params
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Walks `path` one key per level.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&RawValue> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.get(first.as_ref())?, |value, key| value.as_map()?.get(key.as_ref()))
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.entries.iter() }
    }

    /// Inserts a literal key, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        let key = key.into();
        self.track_index(&key);
        self.entries.insert(key, value.into())
    }

    /// Inserts a value under a bracket-encoded key such as `a[b][]`.
    ///
    /// Returns `false` when the key was dropped: an empty base name, or more
    /// bracket levels than `max_depth`.
    pub fn insert_encoded(&mut self, key: &str, value: impl Into<RawValue>, max_depth: usize) -> bool {
        let Some((base, segments)) = split_key(key) else {
            trace!(key, "dropping pair without a name");
            return false;
        };

        if segments.len() > max_depth {
            warn!(key, depth = segments.len(), max_depth, "dropping pair nested deeper than allowed");
            return false;
        }

        self.insert_path(base, &segments, value.into());
        true
    }

    /// The next index an append segment (`[]`) takes at this level.
    #[inline]
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn to_json(&self) -> Map<String, Value> {
        self.entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    fn track_index(&mut self, key: &str) {
        if let Some(index) = parse_index(key) {
            self.next_index = self.next_index.max(index.saturating_add(1));
        }
    }

    fn insert_path(&mut self, key: String, segments: &[Option<String>], value: RawValue) {
        let Some((next, rest)) = segments.split_first() else {
            self.insert_leaf(key, value);
            return;
        };

        let child = self.child_map(key);
        let next_key = next.clone().unwrap_or_else(|| child.next_index().to_string());
        child.insert_path(next_key, rest, value);
    }

    fn insert_leaf(&mut self, key: String, value: RawValue) {
        match self.entries.get_mut(&key) {
            Some(RawValue::Map(_)) if matches!(value, RawValue::Scalar(_)) => {
                trace!(key = key.as_str(), "keeping nested params over a later scalar");
            }
            Some(slot) => *slot = value,
            None => {
                self.track_index(&key);
                self.entries.insert(key, value);
            }
        }
    }

    fn child_map(&mut self, key: String) -> &mut RawParams {
        self.track_index(&key);
        self.entries.entry(key).or_insert_with(|| RawValue::Map(RawParams::new())).make_map()
    }
}

impl PartialEq for RawParams {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> FromIterator<(K, V)> for RawParams
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RawParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a RawParams {
    type Item = (&'a str, &'a RawValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: map::Iter<'a, String, RawValue>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a RawValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Parses a canonical non-negative integer key: `0`, `7`, `12`, but not `07` or `+1`.
pub(crate) fn parse_index(key: &str) -> Option<u64> {
    let canonical = !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) && (key == "0" || !key.starts_with('0'));
    if canonical { key.parse().ok() } else { None }
}

/// Splits `a[b][]` into the base name `a` and the segments `[Some("b"), None]`.
fn split_key(raw: &str) -> Option<(String, Vec<Option<String>>)> {
    let raw = raw.trim_start_matches(' ');
    if raw.is_empty() || raw.starts_with('[') {
        return None;
    }

    let (base, mut rest) = match raw.find('[') {
        Some(open) if raw[open..].contains(']') => (normalize_base(&raw[..open]), &raw[open..]),
        Some(open) => (format!("{}_{}", normalize_base(&raw[..open]), &raw[open + 1..]), ""),
        None => (normalize_base(raw), ""),
    };

    let mut segments = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            break;
        };
        let segment = &stripped[..close];
        segments.push((!segment.is_empty()).then(|| segment.to_owned()));
        rest = &stripped[close + 1..];
    }

    Some((base, segments))
}

pub(crate) fn normalize_base(base: &str) -> String {
    base.chars().map(|c| if c == '.' || c == ' ' { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn scalar(params: &RawParams, path: &[&str]) -> Option<String> {
        params.lookup(path).and_then(RawValue::as_scalar).map(str::to_owned)
    }

    #[test]
    fn flat_pairs() {
        let params = RawParams::from_urlencoded("name=Zava&city=Hang+zhou&empty=");

        assert_eq!(params.len(), 3);
        assert_eq!(scalar(&params, &["name"]), Some("Zava".into()));
        assert_eq!(scalar(&params, &["city"]), Some("Hang zhou".into()));
        assert_eq!(scalar(&params, &["empty"]), Some(String::new()));
        assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["name", "city", "empty"]);
    }

    #[test]
    fn nested_brackets() {
        let params = RawParams::from_urlencoded("a%5Bb%5D%5B0%5D=x&a[b][1]=y&a[c]=z");

        assert_eq!(params.len(), 1);
        assert_eq!(scalar(&params, &["a", "b", "0"]), Some("x".into()));
        assert_eq!(scalar(&params, &["a", "b", "1"]), Some("y".into()));
        assert_eq!(scalar(&params, &["a", "c"]), Some("z".into()));
    }

    #[test]
    fn append_segments() {
        let params = RawParams::from_urlencoded("tags[]=a&tags[]=b&tags[5]=c&tags[]=d");
        let tags = params.get("tags").and_then(RawValue::as_map).unwrap();

        assert_eq!(tags.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["0", "1", "5", "6"]);
        assert_eq!(scalar(&params, &["tags", "6"]), Some("d".into()));
    }

    #[test]
    fn deeper_structure_wins() {
        let params = RawParams::from_urlencoded("a=1&a[b]=2");
        assert_eq!(scalar(&params, &["a", "b"]), Some("2".into()));

        let params = RawParams::from_urlencoded("a[b]=2&a=1");
        assert_eq!(scalar(&params, &["a", "b"]), Some("2".into()));
        assert_eq!(scalar(&params, &["a"]), None);

        let params = RawParams::from_urlencoded("a=1&a=2");
        assert_eq!(scalar(&params, &["a"]), Some("2".into()));
    }

    #[test]
    fn base_name_normalization() {
        let params = RawParams::from_urlencoded("first.name=a&last%20name=b&bad[key=c&trail[x]tail=d");

        assert_eq!(scalar(&params, &["first_name"]), Some("a".into()));
        assert_eq!(scalar(&params, &["last_name"]), Some("b".into()));
        assert_eq!(scalar(&params, &["bad_key"]), Some("c".into()));
        assert_eq!(scalar(&params, &["trail", "x"]), Some("d".into()));
    }

    #[test]
    fn nameless_pairs_are_dropped() {
        let params = RawParams::from_urlencoded("=1&[a]=2&ok=3");

        assert_eq!(params.len(), 1);
        assert_eq!(scalar(&params, &["ok"]), Some("3".into()));
    }

    #[test]
    fn depth_limit() {
        let params = RawParams::from_urlencoded_with_depth("a[b][c]=1&d[e]=2", 1);

        assert!(!params.contains_key("a"));
        assert_eq!(scalar(&params, &["d", "e"]), Some("2".into()));
    }

    #[test]
    fn index_keys() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("07"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("a"), None);
    }

    #[test]
    fn json_conversion() {
        let params = RawParams::from_urlencoded("x=1&y[z]=2");
        let json = Value::Object(params.to_json());

        assert_eq!(json, serde_json::json!({"x": "1", "y": {"z": "2"}}));
    }

    #[test]
    fn large_append_payload_decodes_in_linear_time() {
        let payload = vec!["a[]=v"; 50_000].join("&");
        let started = Instant::now();
        let params = RawParams::from_urlencoded(&payload);
        let elapsed = started.elapsed();

        let a = params.get("a").and_then(RawValue::as_map).unwrap();
        assert_eq!(a.len(), 50_000);
        assert_eq!(a.next_index(), 50_000);
        assert_eq!(scalar(&params, &["a", "49999"]), Some("v".into()));
        assert!(elapsed < Duration::from_secs(5), "decoding took {elapsed:?}");
    }

    #[test]
    fn scalar_slot_becomes_map() {
        let mut value = RawValue::from("1");
        value.make_map().insert("b", "2");

        assert_eq!(value.as_map().and_then(|map| map.get("b")).and_then(RawValue::as_scalar), Some("2"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params: RawParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let old = params.insert("a", "3");

        assert_eq!(old, Some(RawValue::from("1")));
        assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(scalar(&params, &["a"]), Some("3".into()));
    }
}
