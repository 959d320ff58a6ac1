//! Ingredients: the raw materials whose on-hand stock the service tracks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::IngredientId};

/// A raw material used to make products (wax, scent oil, base, additive).
///
/// `stock` is only ever written by an audited adjustment or by the
/// administrative full-replace path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
  pub id:            IngredientId,
  pub name:          String,
  /// Category tag, e.g. `wax`, `base`, `scent`, `other`.
  #[serde(rename = "type")]
  pub kind:          String,
  /// Unit of measure for `stock`, e.g. `g`, `kg`, `mL`.
  pub unit:          String,
  /// Current on-hand quantity, in `unit`.
  pub stock:         f64,
  /// Optional reorder threshold, in `unit`.
  pub min_threshold: Option<f64>,
  pub notes:         Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Ingredient {
  /// `true` when a threshold is configured and stock is at or below it.
  pub fn is_low(&self) -> bool {
    self.min_threshold.is_some_and(|min| self.stock <= min)
  }
}

/// The writable fields of an ingredient, accepted by create and full-replace.
/// Identity and timestamps are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIngredient {
  pub name:          String,
  #[serde(rename = "type")]
  pub kind:          String,
  pub unit:          String,
  #[serde(default)]
  pub stock:         f64,
  #[serde(default)]
  pub min_threshold: Option<f64>,
  #[serde(default)]
  pub notes:         Option<String>,
}

impl NewIngredient {
  /// Convenience constructor with no threshold and no notes.
  pub fn new(
    name: impl Into<String>,
    kind: impl Into<String>,
    unit: impl Into<String>,
    stock: f64,
  ) -> Self {
    Self {
      name: name.into(),
      kind: kind.into(),
      unit: unit.into(),
      stock,
      min_threshold: None,
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    for (field, value) in
      [("name", &self.name), ("type", &self.kind), ("unit", &self.unit)]
    {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be blank")));
      }
    }
    if !self.stock.is_finite() {
      return Err(Error::Validation("stock must be a finite number".into()));
    }
    if self.min_threshold.is_some_and(|t| !t.is_finite() || t < 0.0) {
      return Err(Error::Validation(
        "min_threshold must be a finite, non-negative number".into(),
      ));
    }
    Ok(())
  }
}

/// Result of a create or full-replace write.
#[derive(Debug, Clone)]
pub enum IngredientWrite {
  Saved(Ingredient),
  /// The target ingredient does not exist (replace only).
  NotFound,
  /// Another ingredient already uses this name.
  NameTaken,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_name_is_rejected() {
    let input = NewIngredient::new("  ", "wax", "g", 10.0);
    assert!(matches!(input.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn negative_threshold_is_rejected() {
    let mut input = NewIngredient::new("Soy Wax", "wax", "kg", 50.0);
    input.min_threshold = Some(-1.0);
    assert!(matches!(input.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn type_field_uses_wire_name() {
    let input: NewIngredient = serde_json::from_str(
      r#"{"name":"Lavender","type":"scent","unit":"mL","stock":500}"#,
    )
    .unwrap();
    assert_eq!(input.kind, "scent");
    assert_eq!(input.min_threshold, None);
    assert!(input.validate().is_ok());
  }

  #[test]
  fn low_stock_requires_a_threshold() {
    let now = Utc::now();
    let mut ing = Ingredient {
      id:            IngredientId(1),
      name:          "Soy Wax".into(),
      kind:          "wax".into(),
      unit:          "kg".into(),
      stock:         10.0,
      min_threshold: None,
      notes:         None,
      created_at:    now,
      updated_at:    now,
    };
    assert!(!ing.is_low());
    ing.min_threshold = Some(10.0);
    assert!(ing.is_low());
    ing.stock = 10.5;
    assert!(!ing.is_low());
  }
}
