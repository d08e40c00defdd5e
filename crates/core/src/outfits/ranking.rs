use std::cmp::Ordering;

use crate::domain::outfit::OutfitCandidate;

/// Highest scores first, keeping at most `limit`.
///
/// The sort is stable, so equal scores keep enumeration order.
pub fn rank<'a>(
    candidates: impl IntoIterator<Item = OutfitCandidate<'a>>,
    limit: usize,
) -> Vec<OutfitCandidate<'a>> {
    let mut ranked: Vec<_> = candidates.into_iter().collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use crate::domain::closet::{CategoryMain, ClothingItem, ItemId};
    use crate::domain::outfit::{OutfitCandidate, ScoreBreakdown};

    use super::rank;

    fn garment(id: &str) -> ClothingItem {
        ClothingItem {
            id: ItemId(id.to_string()),
            category_main: CategoryMain::Top,
            category_sub: "shirt".to_string(),
            colors: vec!["black".to_string()],
            embedding: vec![1.0],
            style: Default::default(),
            season: Default::default(),
        }
    }

    fn candidate(item: &ClothingItem, score: f64) -> OutfitCandidate<'_> {
        OutfitCandidate {
            top: item,
            bottom: item,
            shoe: item,
            outerwear: None,
            breakdown: ScoreBreakdown { similarity: score, outerwear: 0.0, occasion: 0.0 },
            score,
        }
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let items: Vec<_> = ["a", "b", "c", "d", "e"].into_iter().map(garment).collect();
        let scores = [0.2, 0.9, 0.5, 0.7, 0.1];
        let ranked = rank(items.iter().zip(scores).map(|(item, score)| candidate(item, score)), 4);

        let ids: Vec<&str> = ranked.iter().map(|c| c.top.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "a"]);
        assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let items: Vec<_> = ["first", "second", "third"].into_iter().map(garment).collect();
        let ranked = rank(items.iter().map(|item| candidate(item, 0.5)), 3);

        let ids: Vec<&str> = ranked.iter().map(|c| c.top.id.0.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank(Vec::new(), 4).is_empty());
    }
}
