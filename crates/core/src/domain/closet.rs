use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CategoryMain {
    Top,
    Bottom,
    Footwear,
    Outerwear,
    Accessory,
    Other,
}

impl CategoryMain {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "footwear" => Self::Footwear,
            "outerwear" => Self::Outerwear,
            "accessory" => Self::Accessory,
            _ => Self::Other,
        }
    }
}

impl From<String> for CategoryMain {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// A garment as classified by the upstream vision collaborator.
///
/// Items are read-only for the duration of a recommendation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    pub id: ItemId,
    pub category_main: CategoryMain,
    #[serde(default)]
    pub category_sub: String,
    /// Ordered color names; the first entry is the primary color.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub embedding: Vec<f64>,
    #[serde(default)]
    pub style: BTreeSet<String>,
    #[serde(default)]
    pub season: BTreeSet<String>,
}

impl ClothingItem {
    pub fn primary_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedItem {
    pub position: usize,
    pub reason: String,
}

/// Closet contents for one request, with entries that failed shape checks set aside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClosetSnapshot {
    pub items: Vec<ClothingItem>,
    pub rejected: Vec<RejectedItem>,
}

impl ClosetSnapshot {
    pub fn new(items: Vec<ClothingItem>) -> Self {
        Self { items, rejected: Vec::new() }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        let mut snapshot = Self::default();
        for (position, value) in values.into_iter().enumerate() {
            match parse_item(position, value) {
                Ok(item) => snapshot.items.push(item),
                Err(error) => {
                    snapshot.rejected.push(RejectedItem { position, reason: error.to_string() })
                }
            }
        }
        snapshot
    }
}

pub fn parse_item(position: usize, value: Value) -> Result<ClothingItem, DomainError> {
    let item = serde_json::from_value::<ClothingItem>(value)
        .map_err(|error| DomainError::InvalidClosetItem { position, reason: error.to_string() })?;

    if item.id.0.trim().is_empty() {
        return Err(DomainError::InvalidClosetItem {
            position,
            reason: "item id must not be empty".to_string(),
        });
    }

    Ok(item)
}

/// Closet items grouped by the slot they can fill in an outfit.
#[derive(Clone, Debug, Default)]
pub struct Wardrobe<'a> {
    pub tops: Vec<&'a ClothingItem>,
    pub bottoms: Vec<&'a ClothingItem>,
    pub shoes: Vec<&'a ClothingItem>,
    pub outerwear: Vec<&'a ClothingItem>,
}

impl<'a> Wardrobe<'a> {
    pub fn partition(items: &'a [ClothingItem]) -> Self {
        let mut wardrobe = Self::default();
        for item in items {
            match item.category_main {
                CategoryMain::Top => wardrobe.tops.push(item),
                CategoryMain::Bottom => wardrobe.bottoms.push(item),
                CategoryMain::Footwear => wardrobe.shoes.push(item),
                CategoryMain::Outerwear => wardrobe.outerwear.push(item),
                CategoryMain::Accessory | CategoryMain::Other => {}
            }
        }
        wardrobe
    }

    pub fn can_form_outfit(&self) -> bool {
        !self.tops.is_empty() && !self.bottoms.is_empty() && !self.shoes.is_empty()
    }
}
