//! Color-family taxonomy used as a soft filter on garment pairings.

use serde::Serialize;

use crate::domain::closet::ClothingItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFamily {
    Neutral,
    Warm,
    Cool,
}

use ColorFamily::{Cool, Neutral, Warm};

const COLOR_FAMILIES: &[(&str, ColorFamily)] = &[
    ("black", Neutral),
    ("white", Neutral),
    ("gray", Neutral),
    ("grey", Neutral),
    ("beige", Neutral),
    ("cream", Neutral),
    ("tan", Neutral),
    ("camel", Neutral),
    ("navy", Neutral),
    ("red", Warm),
    ("orange", Warm),
    ("yellow", Warm),
    ("brown", Warm),
    ("burgundy", Warm),
    ("maroon", Warm),
    ("rust", Warm),
    ("mustard", Warm),
    ("coral", Warm),
    ("blue", Cool),
    ("green", Cool),
    ("teal", Cool),
    ("mint", Cool),
    ("olive", Cool),
    ("purple", Cool),
    ("lavender", Cool),
    ("pink", Cool),
];

const FAMILY_COMPATIBILITY: &[(ColorFamily, &[ColorFamily])] = &[
    (Neutral, &[Neutral, Warm, Cool]),
    (Warm, &[Neutral, Cool]),
    (Cool, &[Neutral, Warm]),
];

/// Unknown names fall back to neutral.
pub fn family_of(color: &str) -> ColorFamily {
    let normalized = color.trim().to_ascii_lowercase();
    COLOR_FAMILIES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, family)| *family)
        .unwrap_or(Neutral)
}

pub fn families_compatible(left: ColorFamily, right: ColorFamily) -> bool {
    FAMILY_COMPATIBILITY
        .iter()
        .find(|(family, _)| *family == left)
        .is_some_and(|(_, allowed)| allowed.contains(&right))
}

pub fn are_compatible(left: &str, right: &str) -> bool {
    families_compatible(family_of(left), family_of(right))
}

/// Compares primary colors; an item without colors counts as neutral.
pub fn items_compatible(left: &ClothingItem, right: &ClothingItem) -> bool {
    are_compatible(left.primary_color().unwrap_or_default(), right.primary_color().unwrap_or_default())
}
