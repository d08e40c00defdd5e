//! Occasion heuristics: additive bonuses keyed on garment sub-labels.

use std::fmt;

use crate::domain::closet::ClothingItem;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Occasion {
    Office,
    Casual,
    Wedding,
    Party,
    Date,
    Unrecognized(String),
}

impl Occasion {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "office" => Self::Office,
            "casual" => Self::Casual,
            "wedding" => Self::Wedding,
            "party" => Self::Party,
            "date" => Self::Date,
            _ => Self::Unrecognized(normalized),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Office => "office",
            Self::Casual => "casual",
            Self::Wedding => "wedding",
            Self::Party => "party",
            Self::Date => "date",
            Self::Unrecognized(label) => label,
        }
    }

    fn rules(&self) -> &'static [(GarmentSignal, f64)] {
        match self {
            Self::Office => OFFICE_RULES,
            Self::Casual => CASUAL_RULES,
            Self::Wedding => WEDDING_RULES,
            Self::Party | Self::Date => EVENING_RULES,
            Self::Unrecognized(_) => &[],
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GarmentSignal {
    Shirt,
    TShirt,
    Hoodie,
    Trousers,
    Jeans,
    FormalShoe,
    Sneaker,
    JacketOrCoat,
}

const OFFICE_RULES: &[(GarmentSignal, f64)] = &[
    (GarmentSignal::Shirt, 0.18),
    (GarmentSignal::Trousers, 0.12),
    (GarmentSignal::FormalShoe, 0.12),
    (GarmentSignal::JacketOrCoat, 0.10),
    (GarmentSignal::TShirt, -0.18),
    (GarmentSignal::Hoodie, -0.25),
    (GarmentSignal::Sneaker, -0.10),
    (GarmentSignal::Jeans, -0.06),
];

const CASUAL_RULES: &[(GarmentSignal, f64)] = &[
    (GarmentSignal::TShirt, 0.16),
    (GarmentSignal::Sneaker, 0.12),
    (GarmentSignal::Jeans, 0.10),
    (GarmentSignal::Hoodie, 0.08),
    (GarmentSignal::FormalShoe, -0.08),
];

const WEDDING_RULES: &[(GarmentSignal, f64)] = &[
    (GarmentSignal::Shirt, 0.20),
    (GarmentSignal::JacketOrCoat, 0.18),
    (GarmentSignal::FormalShoe, 0.16),
    (GarmentSignal::Trousers, 0.10),
    (GarmentSignal::TShirt, -0.25),
    (GarmentSignal::Hoodie, -0.35),
    (GarmentSignal::Sneaker, -0.18),
    (GarmentSignal::Jeans, -0.12),
];

// party and date share one table
const EVENING_RULES: &[(GarmentSignal, f64)] = &[
    (GarmentSignal::JacketOrCoat, 0.14),
    (GarmentSignal::Shirt, 0.10),
    (GarmentSignal::TShirt, 0.05),
    (GarmentSignal::FormalShoe, 0.06),
];

/// Lower-cased sub-category labels of an outfit's slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutfitLabels {
    pub top: String,
    pub bottom: String,
    pub shoe: String,
    pub outerwear: Option<String>,
}

impl OutfitLabels {
    pub fn new(top: &str, bottom: &str, shoe: &str, outerwear: Option<&str>) -> Self {
        Self {
            top: top.to_lowercase(),
            bottom: bottom.to_lowercase(),
            shoe: shoe.to_lowercase(),
            outerwear: outerwear.map(str::to_lowercase),
        }
    }

    pub fn from_items(
        top: &ClothingItem,
        bottom: &ClothingItem,
        shoe: &ClothingItem,
        outerwear: Option<&ClothingItem>,
    ) -> Self {
        Self::new(
            &top.category_sub,
            &bottom.category_sub,
            &shoe.category_sub,
            outerwear.map(|item| item.category_sub.as_str()),
        )
    }
}

impl GarmentSignal {
    pub fn fires(self, labels: &OutfitLabels) -> bool {
        match self {
            Self::Shirt => labels.top.contains("shirt"),
            Self::TShirt => labels.top.contains("t-shirt") || labels.top.contains("tshirt"),
            Self::Hoodie => labels.top.contains("hoodie"),
            Self::Trousers => labels.bottom.contains("trousers"),
            Self::Jeans => labels.bottom.contains("jeans"),
            Self::FormalShoe => labels.shoe.contains("formal"),
            Self::Sneaker => labels.shoe.contains("sneaker"),
            Self::JacketOrCoat => labels
                .outerwear
                .as_deref()
                .is_some_and(|outer| outer.contains("jacket") || outer.contains("coat")),
        }
    }
}

/// Rules of `occasion` whose signal fires for `labels`, in table order.
pub fn fired_rules<'a>(
    occasion: &'a Occasion,
    labels: &'a OutfitLabels,
) -> impl Iterator<Item = (GarmentSignal, f64)> + 'a {
    occasion.rules().iter().copied().filter(move |(signal, _)| signal.fires(labels))
}

pub fn occasion_bonus(occasion: &Occasion, labels: &OutfitLabels) -> f64 {
    fired_rules(occasion, labels).map(|(_, weight)| weight).sum()
}
