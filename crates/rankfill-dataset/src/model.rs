//! Persisted dataset shape
//! product -> [[date, record], ...], record -> channel -> metric -> brand -> value

use std::fmt;

use chrono::NaiveDate;
use rankfill_core::ScoreSet;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DatasetError, Result};

pub const OVERALL_CHANNEL: &str = "overall";
pub const CHATGPT_CHANNEL: &str = "chatgpt";

pub const MENTION_RATE: &str = "mention_rate";
pub const CONTENT_SHARE: &str = "content_share";
pub const COMBINED_SCORE: &str = "combined_score";
pub const SENTIMENT_SCORE: &str = "sentiment_score";
pub const TOTAL_SCORE: &str = "total_score";

/// One day of metrics, channel name -> channel object
/// Anything the synthesis plan does not name is carried as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayRecord(Map<String, Value>);

impl DayRecord {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_map(map: Map<String, Value>) -> Self {
    Self(map)
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn into_map(self) -> Map<String, Value> {
    self.0
  }

  pub fn channel(&self, channel: &str) -> Option<&Map<String, Value>> {
    self.0.get(channel).and_then(Value::as_object)
  }

  pub fn has_metric(&self, channel: &str, metric: &str) -> bool {
    self.channel(channel).map_or(false, |c| c.contains_key(metric))
  }

  /// Read a metric as a ScoreSet
  ///
  /// # Returns
  /// `None` when the channel or metric is absent, an error when the metric is
  /// not an object of numbers
  pub fn score_set(&self, channel: &str, metric: &str) -> Result<Option<ScoreSet>> {
    let value = match self.0.get(channel) {
      None => return Ok(None),
      Some(Value::Object(c)) => match c.get(metric) {
        None => return Ok(None),
        Some(value) => value,
      },
      Some(_) => return Err(DatasetError::MalformedChannel { channel: channel.to_string() }),
    };

    ScoreSet::deserialize(value)
      .map(Some)
      .map_err(|e| DatasetError::MalformedMetric {
        channel: channel.to_string(),
        metric: metric.to_string(),
        reason: e.to_string(),
      })
  }

  /// Write `scores` as `channel.metric`, creating the channel if it is missing
  pub fn set_score_set(&mut self, channel: &str, metric: &str, scores: &ScoreSet) -> Result<()> {
    let value = serde_json::to_value(scores).map_err(|e| DatasetError::MalformedMetric {
      channel: channel.to_string(),
      metric: metric.to_string(),
      reason: e.to_string(),
    })?;

    let slot = self
      .0
      .entry(channel.to_string())
      .or_insert_with(|| Value::Object(Map::new()));

    match slot {
      Value::Object(c) => {
        c.insert(metric.to_string(), value);
        Ok(())
      }
      _ => Err(DatasetError::MalformedChannel { channel: channel.to_string() }),
    }
  }
}

/// `[date, record]` pair of a product timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry(pub NaiveDate, pub DayRecord);

impl TimelineEntry {
  pub fn date(&self) -> NaiveDate {
    self.0
  }

  pub fn record(&self) -> &DayRecord {
    &self.1
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
  pub name: String,
  pub timeline: Vec<TimelineEntry>,
}

/// All products in stored order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
  products: Vec<Product>,
}

impl Dataset {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace a product's timeline, keeping the position of a replaced product
  pub fn insert(&mut self, name: impl Into<String>, timeline: Vec<TimelineEntry>) {
    let name = name.into();
    match self.products.iter_mut().find(|p| p.name == name) {
      Some(product) => product.timeline = timeline,
      None => self.products.push(Product { name, timeline }),
    }
  }

  pub fn product(&self, name: &str) -> Option<&Product> {
    self.products.iter().find(|p| p.name == name)
  }

  pub fn products(&self) -> &[Product] {
    &self.products
  }

  pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
    self.products.iter().map(|p| p.name.as_str())
  }

  pub fn len(&self) -> usize {
    self.products.len()
  }

  pub fn is_empty(&self) -> bool {
    self.products.is_empty()
  }
}

impl Serialize for Dataset {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.products.len()))?;
    for product in &self.products {
      map.serialize_entry(&product.name, &product.timeline)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Dataset {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    struct DatasetVisitor;

    impl<'de> Visitor<'de> for DatasetVisitor {
      type Value = Dataset;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of product name to [date, record] entries")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Dataset, A::Error> {
        let mut dataset = Dataset::new();
        while let Some((name, timeline)) = access.next_entry::<String, Vec<TimelineEntry>>()? {
          dataset.insert(name, timeline);
        }
        Ok(dataset)
      }
    }

    deserializer.deserialize_map(DatasetVisitor)
  }
}
