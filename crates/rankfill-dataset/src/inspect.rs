//! Inspection of merged brand entries
//! Looks at a product's first timeline entry and reports which brand
//! identifiers survived a merge under each brand group

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::model::{Dataset, MENTION_RATE, OVERALL_CHANNEL, TOTAL_SCORE};

pub const DEFAULT_LEADING_BRANDS: usize = 10;

/// A brand and the aliases its merged entries may still show up under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandGroup {
  pub label: String,
  /// Identifier the merged entry is expected to use
  pub canonical: String,
  /// Case-insensitive substrings
  pub patterns: Vec<String>,
}

impl BrandGroup {
  pub fn new(label: impl Into<String>, canonical: impl Into<String>, patterns: &[&str]) -> Self {
    Self {
      label: label.into(),
      canonical: canonical.into(),
      patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
  }

  /// Parse `LABEL=CANONICAL:pattern,pattern`
  /// `LABEL:pattern` uses the label as canonical identifier.
  pub fn parse(raw: &str) -> Result<Self> {
    let invalid = |reason: &str| DatasetError::InvalidBrandGroup {
      raw: raw.to_string(),
      reason: reason.to_string(),
    };

    let (head, patterns) = raw.split_once(':').ok_or_else(|| invalid("expected ':' before patterns"))?;
    let (label, canonical) = match head.split_once('=') {
      Some((label, canonical)) => (label.trim(), canonical.trim()),
      None => (head.trim(), head.trim()),
    };
    if label.is_empty() || canonical.is_empty() {
      return Err(invalid("label and canonical name must not be empty"));
    }

    let patterns: Vec<String> = patterns
      .split(',')
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_string)
      .collect();
    if patterns.is_empty() {
      return Err(invalid("at least one pattern is required"));
    }

    Ok(Self { label: label.to_string(), canonical: canonical.to_string(), patterns })
  }

  pub fn matches(&self, brand: &str) -> bool {
    let brand = brand.to_lowercase();
    self.patterns.iter().any(|p| brand.contains(&p.to_lowercase()))
  }
}

/// HPE and Huawei, the two brands whose aliases get merged
pub fn default_groups() -> Vec<BrandGroup> {
  vec![
    BrandGroup::new("HPE", "HPE", &["hpe", "惠普"]),
    BrandGroup::new("华为", "华为", &["huawei", "华为"]),
  ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
  pub label: String,
  pub matches: Vec<String>,
  pub canonical: String,
  pub canonical_present: bool,
  pub mention_rate: Option<f64>,
  pub total_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionReport {
  pub product: String,
  pub date: NaiveDate,
  pub brand_count: usize,
  pub groups: Vec<GroupReport>,
  pub leading_brands: Vec<String>,
}

/// Inspect the first timeline entry of `product`
///
/// # Arguments
/// * `groups` - Brand groups to look up
/// * `limit` - How many brands of `mention_rate` to list, in stored order
pub fn inspect_product(
  dataset: &Dataset,
  product: &str,
  groups: &[BrandGroup],
  limit: usize,
) -> Result<InspectionReport> {
  let found = dataset.product(product).ok_or_else(|| DatasetError::UnknownProduct(product.to_string()))?;
  let first = found.timeline.first().ok_or_else(|| DatasetError::EmptyTimeline(product.to_string()))?;
  let record = first.record();

  let rates = record.score_set(OVERALL_CHANNEL, MENTION_RATE)?.unwrap_or_default();
  let totals = record.score_set(OVERALL_CHANNEL, TOTAL_SCORE)?.unwrap_or_default();

  let groups = groups
    .iter()
    .map(|group| GroupReport {
      label: group.label.clone(),
      matches: rates.keys().filter(|b| group.matches(b)).map(str::to_string).collect(),
      canonical: group.canonical.clone(),
      canonical_present: rates.contains_key(&group.canonical),
      mention_rate: rates.get(&group.canonical),
      total_score: totals.get(&group.canonical),
    })
    .collect();

  Ok(InspectionReport {
    product: product.to_string(),
    date: first.date(),
    brand_count: rates.len(),
    groups,
    leading_brands: rates.keys().take(limit).map(str::to_string).collect(),
  })
}

impl fmt::Display for InspectionReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "product: {} ({})", self.product, self.date)?;
    for group in &self.groups {
      writeln!(f, "{} brands after merge: {:?}", group.label, group.matches)?;
    }

    for group in &self.groups {
      writeln!(f)?;
      writeln!(f, "{} data:", group.label)?;
      if !group.canonical_present {
        writeln!(f, "  {} not present", group.canonical)?;
        continue;
      }
      if let Some(rate) = group.mention_rate {
        writeln!(f, "  {} mention_rate: {}", group.canonical, rate)?;
      }
      match group.total_score {
        Some(total) => writeln!(f, "  {} total_score: {}", group.canonical, total)?,
        None => writeln!(f, "  {} total_score: N/A", group.canonical)?,
      }
    }

    writeln!(f)?;
    writeln!(f, "first {} of {} brands:", self.leading_brands.len(), self.brand_count)?;
    for (i, brand) in self.leading_brands.iter().enumerate() {
      writeln!(f, "  {}. {}", i + 1, brand)?;
    }
    Ok(())
  }
}
