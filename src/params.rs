//! Ordered parameter maps and instance attribute tables.

use crate::value::{CopyMemo, Param};
use std::collections::BTreeSet;
use std::fmt;

/// Insertion-ordered entries. Parameter sets are small, lookups are linear.
#[derive(Clone, Default)]
struct Entries(Vec<(String, Param)>);

impl Entries {
    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == name)
    }

    fn insert(&mut self, name: String, value: Param) -> Option<Param> {
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.0[i].1, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    fn remove(&mut self, name: &str) -> Option<Param> {
        self.position(name).map(|i| self.0.remove(i).1)
    }

    fn get(&self, name: &str) -> Option<&Param> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Param)> for Entries {
    fn from_iter<I: IntoIterator<Item = (String, Param)>>(iter: I) -> Self {
        let mut entries = Entries::default();
        for (k, v) in iter {
            entries.insert(k, v);
        }
        entries
    }
}

/// Ordered mapping from parameter name to value, captured at one instant.
///
/// # Examples
///
/// ```
/// use estimator_checks::params::ParamMap;
/// use estimator_checks::value::Param;
///
/// let alpha = Param::float(1.0);
/// let params: ParamMap = [("alpha", alpha.clone()), ("tol", Param::float(1e-4))]
///     .into_iter()
///     .collect();
///
/// assert_eq!(params.len(), 2);
/// assert!(params.get("alpha").is_some_and(|p| p.is(&alpha)));
/// assert_eq!(params.to_string(), "{'alpha': 1.0, 'tol': 0.0001}");
/// ```
#[derive(Clone, Default)]
pub struct ParamMap(Entries);

impl ParamMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: Param) -> Option<Param> {
        self.0.insert(name.into(), value)
    }

    /// Remove a value, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Param> {
        self.0.remove(name)
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.get(name)
    }

    /// Whether the name is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.get(name).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.0.iter()
    }

    /// Names as a sorted set.
    pub fn key_set(&self) -> BTreeSet<String> {
        self.0.keys().map(String::from).collect()
    }

    /// Copy every entry of `other` into `self`.
    pub fn extend_from(&mut self, other: &ParamMap) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    /// Whether `(name, value)` is one of the entries, comparing values by
    /// identity or equality.
    pub fn contains_item(&self, name: &str, value: &Param) -> bool {
        self.get(name).is_some_and(|v| v.same_or_equal(value))
    }

    /// Map equality: same names, values equal by identity or equality.
    /// Order is irrelevant.
    pub fn same_items(&self, other: &ParamMap) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.contains_item(k, v))
    }

    /// Whether every entry of `self` appears unchanged in `other`.
    pub fn is_subset_of(&self, other: &ParamMap) -> bool {
        self.iter().all(|(k, v)| other.contains_item(k, v))
    }

    /// Deep copy of every value, sharing one memo across the whole map.
    pub fn deep_copy(&self, memo: &mut CopyMemo) -> ParamMap {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.deep_copy(memo)))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Param)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, Param)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for ParamMap {
    type Item = (String, Param);
    type IntoIter = std::vec::IntoIter<(String, Param)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.0.into_iter()
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{k}': {v}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Instance attributes currently set on a candidate.
///
/// Names starting with `_` follow the private naming convention and are not
/// part of the public API.
#[derive(Clone, Default)]
pub struct Attributes(Entries);

impl Attributes {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: Param) {
        self.0.insert(name.into(), value);
    }

    /// Read an attribute.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.get(name)
    }

    /// Delete an attribute.
    pub fn remove(&mut self, name: &str) -> Option<Param> {
        self.0.remove(name)
    }

    /// Names in assignment order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    /// Names not following the private naming convention.
    pub fn public_names(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|name| !is_private_name(name))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep copy of every attribute with a shared memo.
    pub fn deep_copy(&self, memo: &mut CopyMemo) -> Attributes {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.to_string(), v.deep_copy(memo)))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Param)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, Param)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<ParamMap> for Attributes {
    fn from(params: ParamMap) -> Self {
        params.into_iter().collect()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Whether a name follows the private (implementation-reserved) convention.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_')
}
