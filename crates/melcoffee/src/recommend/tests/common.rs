use std::num::NonZeroUsize;

use crate::catalog::{CatalogItem, CoffeeId};
use crate::recommend::{
    MilkPreference, PreferenceAnswers, PricePreference, RecommendationEngine, StrengthPreference,
};

pub(super) fn item(id: u64, tags: &[&str], popularity: Option<f64>) -> CatalogItem {
    let mut item = CatalogItem::new(CoffeeId(id))
        .with_name(format!("coffee-{id}"))
        .with_tags(tags.iter().copied());
    item.popularity = popularity;
    item
}

pub(super) fn menu() -> Vec<CatalogItem> {
    vec![
        item(1, &["flat white", "iced"], Some(100.0)),
        item(2, &["long black", "hot"], Some(0.0)),
    ]
}

pub(super) fn larger_menu() -> Vec<CatalogItem> {
    vec![
        item(10, &["Flat White", "hot", "cozy"], Some(30.0)),
        item(11, &["long black", "strong", "affordable"], Some(80.0)),
        item(12, &["smooth", "iced", "premium", "trendy"], Some(10.0)),
        item(13, &["hot", "quiet"], None),
        item(14, &["strong", "premium"], Some(55.0)),
        item(15, &["smooth", "affordable", "hot"], Some(25.0)),
    ]
}

pub(super) fn answers() -> PreferenceAnswers {
    PreferenceAnswers::default()
}

pub(super) fn full_answers() -> PreferenceAnswers {
    PreferenceAnswers {
        milk: Some(MilkPreference::Rich),
        strength: Some(StrengthPreference::Strong),
        price: Some(PricePreference::Expensive),
        iced: Some(false),
        vibe: Some("cozy".to_string()),
    }
}

pub(super) fn limit(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("non-zero limit")
}

pub(super) fn engine() -> RecommendationEngine {
    RecommendationEngine::standard()
}

pub(super) fn ids(results: &[crate::recommend::ScoredResult]) -> Vec<u64> {
    results.iter().map(|result| result.item.id.0).collect()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
