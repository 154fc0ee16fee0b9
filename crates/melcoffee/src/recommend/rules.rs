use super::answers::{MilkPreference, PreferenceAnswers, PricePreference, StrengthPreference};
use serde::Serialize;
use std::borrow::Cow;

/// Questionnaire dimension a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Milk,
    Strength,
    Price,
    Iced,
    Vibe,
}

/// Answer value that activates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Milk(MilkPreference),
    Strength(StrengthPreference),
    Price(PricePreference),
    Iced(bool),
    /// Any non-empty vibe answer.
    AnyVibe,
}

impl Expectation {
    pub fn dimension(&self) -> Dimension {
        match self {
            Expectation::Milk(_) => Dimension::Milk,
            Expectation::Strength(_) => Dimension::Strength,
            Expectation::Price(_) => Dimension::Price,
            Expectation::Iced(_) => Dimension::Iced,
            Expectation::AnyVibe => Dimension::Vibe,
        }
    }
}

/// Tag an item must carry for the rule to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredTag {
    Named(Cow<'static, str>),
    /// The answer value itself is the tag (used by the vibe dimension).
    AnswerValue,
}

/// One row of the scoring table: (dimension + expected answer, required tag, weight).
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRule {
    pub expects: Expectation,
    pub tag: RequiredTag,
    pub weight: f64,
}

impl PreferenceRule {
    pub const fn named(expects: Expectation, tag: &'static str, weight: f64) -> Self {
        Self {
            expects,
            tag: RequiredTag::Named(Cow::Borrowed(tag)),
            weight,
        }
    }

    /// Lowercased tag this rule requires for the given answers, or `None` when
    /// the answers do not activate the rule.
    pub(crate) fn required_tag(&self, answers: &PreferenceAnswers) -> Option<String> {
        let active = match self.expects {
            Expectation::Milk(expected) => answers.milk == Some(expected),
            Expectation::Strength(expected) => answers.strength == Some(expected),
            Expectation::Price(expected) => answers.price == Some(expected),
            Expectation::Iced(expected) => answers.iced == Some(expected),
            Expectation::AnyVibe => answers.vibe.is_some(),
        };
        if !active {
            return None;
        }

        match &self.tag {
            RequiredTag::Named(tag) => Some(tag.to_lowercase()),
            RequiredTag::AnswerValue => match self.expects {
                Expectation::AnyVibe => answers.normalized_vibe(),
                _ => None,
            },
        }
    }
}

/// Ordered collection of scoring rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<PreferenceRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The questionnaire mapping used by the recommendation form.
    ///
    /// Mid-range answers (`normal` milk, `regular` strength, `mid` price) have no
    /// row: they express no preference and score nothing.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                PreferenceRule::named(Expectation::Milk(MilkPreference::Rich), "flat white", 2.0),
                PreferenceRule::named(Expectation::Milk(MilkPreference::Light), "long black", 2.0),
                PreferenceRule::named(
                    Expectation::Strength(StrengthPreference::Strong),
                    "strong",
                    2.0,
                ),
                PreferenceRule::named(
                    Expectation::Strength(StrengthPreference::Mild),
                    "smooth",
                    2.0,
                ),
                PreferenceRule::named(Expectation::Price(PricePreference::Cheap), "affordable", 1.0),
                PreferenceRule::named(
                    Expectation::Price(PricePreference::Expensive),
                    "premium",
                    1.0,
                ),
                PreferenceRule::named(Expectation::Iced(true), "iced", 1.0),
                PreferenceRule::named(Expectation::Iced(false), "hot", 1.0),
                PreferenceRule {
                    expects: Expectation::AnyVibe,
                    tag: RequiredTag::AnswerValue,
                    weight: 1.0,
                },
            ],
        }
    }

    pub fn with_rule(mut self, rule: PreferenceRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[PreferenceRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_stay_inactive_without_answers() {
        let answers = PreferenceAnswers::default();
        assert!(RuleSet::standard()
            .rules()
            .iter()
            .all(|rule| rule.required_tag(&answers).is_none()));
    }

    #[test]
    fn vibe_rule_requires_the_answer_itself() {
        let answers = PreferenceAnswers {
            vibe: Some("Trendy".to_string()),
            ..PreferenceAnswers::default()
        };
        let rule = RuleSet::standard()
            .rules()
            .iter()
            .find(|rule| rule.expects == Expectation::AnyVibe)
            .cloned()
            .expect("vibe rule present");

        assert_eq!(rule.required_tag(&answers).as_deref(), Some("trendy"));
    }

    #[test]
    fn mid_range_answers_have_no_rule() {
        let rules = RuleSet::standard();
        assert!(!rules.rules().iter().any(|rule| matches!(
            rule.expects,
            Expectation::Milk(MilkPreference::Normal)
                | Expectation::Strength(StrengthPreference::Regular)
                | Expectation::Price(PricePreference::Mid)
        )));
    }
}
