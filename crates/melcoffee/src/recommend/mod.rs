//! Preference scoring and ranking for the recommendation form.
//!
//! The engine is a pure function of the catalog snapshot and the answer set
//! and can be shared across request handlers without locking. Scores are
//! additive over the rule table plus a capped popularity boost, and ranking is
//! a stable descending sort so equal scores keep catalog order.

mod answers;
mod config;
mod rules;

#[cfg(test)]
mod tests;

pub use answers::{MilkPreference, PreferenceAnswers, PricePreference, StrengthPreference};
pub use config::{RecommendConfig, DEFAULT_LIMIT};
pub use rules::{Dimension, Expectation, PreferenceRule, RequiredTag, RuleSet};

use crate::catalog::CatalogItem;
use serde::Serialize;
use std::num::NonZeroUsize;

/// One ranked entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub score: f64,
    pub item: CatalogItem,
}

/// Rule that fired for an item, kept for explanations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub dimension: Dimension,
    pub tag: String,
    pub weight: f64,
}

/// Itemized score for a single catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    pub total: f64,
    pub popularity_boost: f64,
    pub components: Vec<ScoreComponent>,
}

/// Stateless scorer applying a rule set to catalog items.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: RuleSet,
    config: RecommendConfig,
}

impl RecommendationEngine {
    pub fn new(rules: RuleSet, config: RecommendConfig) -> Self {
        Self { rules, config }
    }

    pub fn standard() -> Self {
        Self::new(RuleSet::standard(), RecommendConfig::default())
    }

    pub fn with_config(config: RecommendConfig) -> Self {
        Self::new(RuleSet::standard(), config)
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn default_limit(&self) -> NonZeroUsize {
        self.config.default_limit
    }

    /// Score every item, sort descending (stable), keep the first `limit`.
    pub fn rank(
        &self,
        items: &[CatalogItem],
        answers: &PreferenceAnswers,
        limit: NonZeroUsize,
    ) -> Vec<ScoredResult> {
        let mut scored: Vec<(f64, &CatalogItem)> = items
            .iter()
            .map(|item| (self.score(item, answers), item))
            .collect();

        scored.sort_by(|left, right| right.0.total_cmp(&left.0));
        scored.truncate(limit.get());

        scored
            .into_iter()
            .map(|(score, item)| ScoredResult {
                score,
                item: item.clone(),
            })
            .collect()
    }

    pub fn rank_default(
        &self,
        items: &[CatalogItem],
        answers: &PreferenceAnswers,
    ) -> Vec<ScoredResult> {
        self.rank(items, answers, self.config.default_limit)
    }

    pub fn score(&self, item: &CatalogItem, answers: &PreferenceAnswers) -> f64 {
        self.explain(item, answers).total
    }

    pub fn explain(&self, item: &CatalogItem, answers: &PreferenceAnswers) -> ItemScore {
        let tags = item.normalized_tags();
        let mut components = Vec::new();
        let mut total = 0.0;

        for rule in self.rules.rules() {
            let Some(tag) = rule.required_tag(answers) else {
                continue;
            };
            if tags.contains(&tag) {
                total += rule.weight;
                components.push(ScoreComponent {
                    dimension: rule.expects.dimension(),
                    tag,
                    weight: rule.weight,
                });
            }
        }

        let popularity_boost = self.popularity_boost(item);
        total += popularity_boost;

        ItemScore {
            total,
            popularity_boost,
            components,
        }
    }

    fn popularity_boost(&self, item: &CatalogItem) -> f64 {
        let popularity = item.popularity_or_zero();
        if popularity == 0.0 || self.config.popularity_divisor <= 0.0 {
            return 0.0;
        }
        (popularity / self.config.popularity_divisor).min(self.config.popularity_cap)
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rank `items` against `answers` with the standard rule table.
pub fn rank(
    items: &[CatalogItem],
    answers: &PreferenceAnswers,
    limit: NonZeroUsize,
) -> Vec<ScoredResult> {
    RecommendationEngine::standard().rank(items, answers, limit)
}
