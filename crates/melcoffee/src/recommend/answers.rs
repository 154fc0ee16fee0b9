use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// How much milk the customer wants in the cup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilkPreference {
    Light,
    Normal,
    Rich,
}

/// Preferred coffee strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthPreference {
    Mild,
    Regular,
    Strong,
}

/// Preferred price tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePreference {
    Cheap,
    Mid,
    Expensive,
}

impl FromStr for MilkPreference {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "normal" => Ok(Self::Normal),
            "rich" => Ok(Self::Rich),
            _ => Err(()),
        }
    }
}

impl FromStr for StrengthPreference {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mild" => Ok(Self::Mild),
            "regular" => Ok(Self::Regular),
            "strong" => Ok(Self::Strong),
            _ => Err(()),
        }
    }
}

impl FromStr for PricePreference {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cheap" => Ok(Self::Cheap),
            "mid" => Ok(Self::Mid),
            "expensive" => Ok(Self::Expensive),
            _ => Err(()),
        }
    }
}

/// Questionnaire answers collected from the recommendation form.
///
/// Every field is optional. Values that are absent, of the wrong JSON type, or
/// outside the recognized vocabulary deserialize to `None` instead of failing
/// the request, so a partially filled form still yields a ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceAnswers {
    #[serde(default, deserialize_with = "lenient_choice")]
    pub milk: Option<MilkPreference>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub strength: Option<StrengthPreference>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub price: Option<PricePreference>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub iced: Option<bool>,
    #[serde(default, deserialize_with = "lenient_vibe")]
    pub vibe: Option<String>,
}

impl PreferenceAnswers {
    pub fn is_empty(&self) -> bool {
        self.milk.is_none()
            && self.strength.is_none()
            && self.price.is_none()
            && self.iced.is_none()
            && self.vibe.is_none()
    }

    /// Vibe lowercased for comparison with lowercased item tags. Whitespace
    /// is kept, so `" cozy"` does not match `cozy`.
    pub(crate) fn normalized_vibe(&self) -> Option<String> {
        self.vibe.as_deref().map(str::to_lowercase)
    }
}

fn lenient_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => raw.parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.as_bool()))
}

fn lenient_vibe<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) if !raw.is_empty() => Some(raw),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognized_values_parse() {
        let answers: PreferenceAnswers = serde_json::from_value(json!({
            "milk": "rich",
            "strength": "strong",
            "price": "cheap",
            "iced": false,
            "vibe": "cozy",
        }))
        .expect("answers deserialize");

        assert_eq!(answers.milk, Some(MilkPreference::Rich));
        assert_eq!(answers.strength, Some(StrengthPreference::Strong));
        assert_eq!(answers.price, Some(PricePreference::Cheap));
        assert_eq!(answers.iced, Some(false));
        assert_eq!(answers.vibe.as_deref(), Some("cozy"));
    }

    #[test]
    fn enum_values_must_match_exactly() {
        let answers: PreferenceAnswers = serde_json::from_value(json!({
            "milk": "Rich",
            "strength": " strong ",
            "price": "CHEAP",
        }))
        .expect("answers deserialize");

        assert_eq!(answers.milk, None);
        assert_eq!(answers.strength, None);
        assert_eq!(answers.price, None);
        assert!(answers.is_empty());
    }

    #[test]
    fn vibe_is_lowercased_but_not_trimmed() {
        let answers = PreferenceAnswers {
            vibe: Some("  Cozy ".to_string()),
            ..PreferenceAnswers::default()
        };
        assert_eq!(answers.normalized_vibe().as_deref(), Some("  cozy "));
    }

    #[test]
    fn unrecognized_values_are_dropped() {
        let answers: PreferenceAnswers = serde_json::from_value(json!({
            "milk": "oat",
            "strength": 3,
            "price": null,
            "iced": "true",
            "vibe": "",
            "mood": "sleepy",
        }))
        .expect("lenient answers deserialize");

        assert_eq!(answers, PreferenceAnswers::default());
        assert!(answers.is_empty());
    }

    #[test]
    fn empty_object_is_empty_answer_set() {
        let answers: PreferenceAnswers = serde_json::from_str("{}").expect("empty object");
        assert!(answers.is_empty());
    }
}
