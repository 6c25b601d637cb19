//! Toy catalogue records.

use serde::{Deserialize, Serialize};

use santas_workshop_core::{Difficulty, ToyId};

const fn default_in_stock() -> bool {
    true
}

/// A toy in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toy {
    pub id: ToyId,
    pub name: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

/// Raw toy form as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToyForm {
    pub name: String,
    pub category: String,
    pub difficulty: String,
    pub in_stock: Option<bool>,
}

/// Validated payload for creating a toy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToy {
    pub name: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Defaults to `true` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

/// Partial toy update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl From<NewToy> for ToyPatch {
    fn from(toy: NewToy) -> Self {
        Self {
            name: Some(toy.name),
            category: Some(toy.category),
            difficulty: Some(toy.difficulty),
            in_stock: toy.in_stock,
        }
    }
}
