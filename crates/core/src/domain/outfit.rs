use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::closet::{CategoryMain, ClothingItem, ItemId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Mean pairwise cosine similarity of top, bottom and shoe.
    pub similarity: f64,
    pub outerwear: f64,
    pub occasion: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.similarity + self.outerwear + self.occasion
    }
}

/// A scored outfit borrowing its garments from the closet snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct OutfitCandidate<'a> {
    pub top: &'a ClothingItem,
    pub bottom: &'a ClothingItem,
    pub shoe: &'a ClothingItem,
    pub outerwear: Option<&'a ClothingItem>,
    pub breakdown: ScoreBreakdown,
    pub score: f64,
}

impl OutfitCandidate<'_> {
    pub fn to_view(&self) -> OutfitView {
        OutfitView {
            top: GarmentView::from(self.top),
            bottom: GarmentView::from(self.bottom),
            shoe: GarmentView::from(self.shoe),
            outerwear: self.outerwear.map(GarmentView::from),
            score: self.score,
        }
    }
}

/// Garment as exposed outside the engine; embeddings never leave the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentView {
    pub id: ItemId,
    pub category_main: CategoryMain,
    pub category_sub: String,
    pub colors: Vec<String>,
    pub style: BTreeSet<String>,
    pub season: BTreeSet<String>,
}

impl From<&ClothingItem> for GarmentView {
    fn from(item: &ClothingItem) -> Self {
        Self {
            id: item.id.clone(),
            category_main: item.category_main,
            category_sub: item.category_sub.clone(),
            colors: item.colors.clone(),
            style: item.style.clone(),
            season: item.season.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitView {
    pub top: GarmentView,
    pub bottom: GarmentView,
    pub shoe: GarmentView,
    pub outerwear: Option<GarmentView>,
    pub score: f64,
}
