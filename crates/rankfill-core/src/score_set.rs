//! ScoreSet - identifier to value mapping for one metric of one day
//! Keeps insertion order so a brand listing round-trips in its stored order

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PerturbError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet {
  entries: Vec<(String, f64)>,
  index: HashMap<String, usize>,
}

impl ScoreSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      entries: Vec::with_capacity(capacity),
      index: HashMap::with_capacity(capacity),
    }
  }

  /// Insert or overwrite a value
  /// An overwritten identifier keeps its original position
  ///
  /// # Returns
  /// The previous value, if the identifier was already present
  pub fn insert(&mut self, id: impl Into<String>, value: f64) -> Option<f64> {
    let id = id.into();
    match self.index.get(&id) {
      Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
      None => {
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        None
      }
    }
  }

  pub fn get(&self, id: &str) -> Option<f64> {
    self.index.get(id).map(|&pos| self.entries[pos].1)
  }

  pub fn contains_key(&self, id: &str) -> bool {
    self.index.contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
    self.entries.iter().map(|(id, value)| (id.as_str(), *value))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
    self.entries.iter().map(|(id, _)| id.as_str())
  }

  /// Reject NaN and infinities, whose rank position is undefined
  pub fn ensure_finite(&self) -> Result<()> {
    match self.entries.iter().find(|(_, value)| !value.is_finite()) {
      Some((id, value)) => Err(PerturbError::InvalidValue { id: id.clone(), value: *value }),
      None => Ok(()),
    }
  }

  /// Entries sorted descending by value
  /// The sort is stable: tied entries keep their insertion order.
  /// Callers must have checked `ensure_finite` first, NaN compares as a tie here.
  pub fn ranked(&self) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = self.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
  }

  /// Identifiers in descending rank order
  pub fn rank_order(&self) -> Vec<String> {
    self.ranked().into_iter().map(|(id, _)| id.to_string()).collect()
  }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoreSet {
  fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
    let mut set = ScoreSet::new();
    for (id, value) in iter {
      set.insert(id, value);
    }
    set
  }
}

impl IntoIterator for ScoreSet {
  type Item = (String, f64);
  type IntoIter = std::vec::IntoIter<(String, f64)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl Serialize for ScoreSet {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (id, value) in &self.entries {
      map.serialize_entry(id, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for ScoreSet {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    struct ScoreSetVisitor;

    impl<'de> Visitor<'de> for ScoreSetVisitor {
      type Value = ScoreSet;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of identifier to number")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ScoreSet, A::Error> {
        let mut set = ScoreSet::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((id, value)) = access.next_entry::<String, f64>()? {
          set.insert(id, value);
        }
        Ok(set)
      }
    }

    deserializer.deserialize_map(ScoreSetVisitor)
  }
}
