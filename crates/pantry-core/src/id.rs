//! Strongly-typed row identifiers.
//!
//! Every identifier is a plain `i64` on the wire and in the database, but the
//! newtypes keep an ingredient id from being passed where a product id is
//! expected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }

    impl FromStr for $name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
    }
  };
}

id_type!(
  /// Identity of an [`Ingredient`](crate::ingredient::Ingredient).
  IngredientId
);

id_type!(
  /// Identity of an [`InventoryAdjustment`](crate::adjustment::InventoryAdjustment).
  AdjustmentId
);

id_type!(
  /// Identity of a [`RecipeItem`](crate::recipe::RecipeItem).
  RecipeItemId
);

id_type!(
  /// Opaque reference into the external product catalogue. Never validated
  /// by this service.
  ProductId
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_serialize_as_bare_numbers() {
    let json = serde_json::to_string(&IngredientId(42)).unwrap();
    assert_eq!(json, "42");
    let back: ProductId = serde_json::from_str("7").unwrap();
    assert_eq!(back, ProductId(7));
  }

  #[test]
  fn ids_parse_from_path_segments() {
    assert_eq!("12".parse::<IngredientId>().unwrap(), IngredientId(12));
    assert!("twelve".parse::<IngredientId>().is_err());
  }
}
