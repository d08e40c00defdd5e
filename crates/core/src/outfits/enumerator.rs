use crate::domain::closet::{ClothingItem, Wardrobe};
use crate::domain::outfit::{OutfitCandidate, ScoreBreakdown};
use crate::domain::weather::WeatherContext;
use crate::styling::color::items_compatible;
use crate::styling::occasion::{occasion_bonus, Occasion, OutfitLabels};
use crate::styling::similarity::cosine_similarity;

use super::OUTERWEAR_BONUS;

/// One top/bottom/shoe combination before color filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triple<'a> {
    pub top: &'a ClothingItem,
    pub bottom: &'a ClothingItem,
    pub shoe: &'a ClothingItem,
}

impl Triple<'_> {
    /// Pairwise color compatibility across all three slots.
    pub fn colors_compatible(&self) -> bool {
        items_compatible(self.top, self.bottom)
            && items_compatible(self.top, self.shoe)
            && items_compatible(self.bottom, self.shoe)
    }
}

/// Builds and scores outfit candidates for one request.
///
/// Enumeration order is top (outer), then bottom, then shoe. Ranking relies
/// on that order to break ties.
#[derive(Clone, Debug)]
pub struct OutfitEnumerator<'a> {
    wardrobe: Wardrobe<'a>,
    occasion: Occasion,
    cold: bool,
}

impl<'a> OutfitEnumerator<'a> {
    pub fn new(wardrobe: Wardrobe<'a>, occasion: Occasion, weather: &WeatherContext) -> Self {
        Self { wardrobe, occasion, cold: weather.is_cold() }
    }

    pub fn is_cold(&self) -> bool {
        self.cold
    }

    /// Every top x bottom x shoe combination, unfiltered.
    pub fn raw_triples(&self) -> impl Iterator<Item = Triple<'a>> + '_ {
        self.wardrobe.tops.iter().flat_map(move |&top| {
            self.wardrobe.bottoms.iter().flat_map(move |&bottom| {
                self.wardrobe.shoes.iter().map(move |&shoe| Triple { top, bottom, shoe })
            })
        })
    }

    /// Color-compatible triples, scored in enumeration order.
    pub fn candidates(&self) -> impl Iterator<Item = OutfitCandidate<'a>> + '_ {
        self.raw_triples().filter(Triple::colors_compatible).map(move |triple| self.score(triple))
    }

    /// Outerwear closest to `top` by embedding; the first item wins ties.
    pub fn pick_outerwear(&self, top: &ClothingItem) -> Option<&'a ClothingItem> {
        self.wardrobe
            .outerwear
            .iter()
            .fold(None, |best: Option<(&'a ClothingItem, f64)>, &layer| {
                let similarity = cosine_similarity(&top.embedding, &layer.embedding);
                match best {
                    Some((_, best_similarity)) if similarity <= best_similarity => best,
                    _ => Some((layer, similarity)),
                }
            })
            .map(|(layer, _)| layer)
    }

    fn score(&self, triple: Triple<'a>) -> OutfitCandidate<'a> {
        let Triple { top, bottom, shoe } = triple;
        let similarity = (cosine_similarity(&top.embedding, &bottom.embedding)
            + cosine_similarity(&top.embedding, &shoe.embedding)
            + cosine_similarity(&bottom.embedding, &shoe.embedding))
            / 3.0;

        let outerwear = if self.cold { self.pick_outerwear(top) } else { None };
        let labels = OutfitLabels::from_items(top, bottom, shoe, outerwear);
        let breakdown = ScoreBreakdown {
            similarity,
            outerwear: if outerwear.is_some() { OUTERWEAR_BONUS } else { 0.0 },
            occasion: occasion_bonus(&self.occasion, &labels),
        };

        OutfitCandidate { top, bottom, shoe, outerwear, breakdown, score: breakdown.total() }
    }
}
