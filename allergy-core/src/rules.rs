//! Static advice tables.
//!
//! Weather rules are evaluated in declaration order by [`crate::engine`];
//! nothing here knows how evaluation works, so extending a table never
//! touches the evaluator.

use crate::model::{AdviceItem, WeatherSnapshot};

/// A predicate over a snapshot paired with the advice it yields.
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub name: &'static str,
    pub applies: fn(&WeatherSnapshot) -> bool,
    pub item: AdviceItem,
}

#[derive(Debug, Clone, Copy)]
pub enum WeatherRule {
    /// Fires whenever its condition holds.
    When(Condition),
    /// Fires the first condition that holds, if any (if / else-if).
    FirstOf(&'static [Condition]),
}

fn description_mentions(snapshot: &WeatherSnapshot, words: &[&str]) -> bool {
    let description = snapshot.description.to_lowercase();
    words.iter().any(|word| description.contains(word))
}

const PRESSURE_RULES: &[Condition] = &[
    Condition {
        name: "low-pressure",
        applies: |s| s.pressure_hpa < 1010.0,
        item: AdviceItem::new(
            "Atmospheric pressure is low, which can cause headaches. Keep yourself well hydrated.",
            "Cause: Low pressure can affect circulation and trigger headaches.",
        ),
    },
    Condition {
        name: "high-pressure",
        applies: |s| s.pressure_hpa > 1025.0,
        item: AdviceItem::new(
            "Atmospheric pressure is high, which may cause discomfort. Relax and stay calm.",
            "Cause: High pressure can bring general discomfort and raise blood pressure.",
        ),
    },
];

pub const WEATHER_RULES: &[WeatherRule] = &[
    WeatherRule::When(Condition {
        name: "humidity",
        applies: |s| s.humidity_pct > 70,
        item: AdviceItem::new(
            "High humidity can encourage mold and dust mites. Keep indoor spaces ventilated.",
            "Cause: Excess humidity and conditions favoring mold or mites.",
        ),
    }),
    WeatherRule::When(Condition {
        name: "rain-or-fog",
        applies: |s| description_mentions(s, &["rain", "storm", "fog"]),
        item: AdviceItem::new(
            "Avoid going out in rain or fog if you are sensitive to humidity.",
            "Cause: Damp, heavy air intensifies allergic symptoms.",
        ),
    }),
    WeatherRule::When(Condition {
        name: "wind-or-dust",
        applies: |s| description_mentions(s, &["wind", "dust"]),
        item: AdviceItem::new(
            "Wear glasses and a face mask if there is strong wind or dust in the air.",
            "Cause: Wind can lift dust and pollen, aggravating allergic symptoms.",
        ),
    }),
    WeatherRule::When(Condition {
        name: "wind-speed",
        applies: |s| s.wind_speed_mps > 15.0,
        item: AdviceItem::new(
            "The wind is very strong. Consider staying in or protecting your eyes and airways.",
            "Cause: Wind increases the spread of airborne allergens.",
        ),
    }),
    WeatherRule::When(Condition {
        name: "uv",
        applies: |s| s.uv_proxy > 7.0,
        item: AdviceItem::new(
            "The UV index is high. Use sunscreen and avoid prolonged sun exposure.",
            "Cause: Strong sun can irritate skin and eyes, especially if you have allergies.",
        ),
    }),
    WeatherRule::FirstOf(PRESSURE_RULES),
];

/// Appended after the weather rules on every query.
pub const WELLNESS_TIP: AdviceItem = AdviceItem::new(
    "Keep a healthy lifestyle. Eat foods rich in vitamin C and get enough sleep to strengthen your immune system.",
    "Cause: A strong immune system helps keep allergy symptoms from getting worse.",
);

/// The recognized symptom vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symptom {
    Sneezing,
    NasalCongestion,
    WateryEyes,
    ThroatItch,
    Headache,
    Fatigue,
    MildFever,
    BreathingDifficulty,
    SkinRash,
    DryCough,
    Dizziness,
    NoseItch,
    NasalDischarge,
}

impl Symptom {
    pub const fn all() -> &'static [Symptom] {
        &[
            Symptom::Sneezing,
            Symptom::NasalCongestion,
            Symptom::WateryEyes,
            Symptom::ThroatItch,
            Symptom::Headache,
            Symptom::Fatigue,
            Symptom::MildFever,
            Symptom::BreathingDifficulty,
            Symptom::SkinRash,
            Symptom::DryCough,
            Symptom::Dizziness,
            Symptom::NoseItch,
            Symptom::NasalDischarge,
        ]
    }

    /// Canonical tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Symptom::Sneezing => "sneezing",
            Symptom::NasalCongestion => "nasal congestion",
            Symptom::WateryEyes => "watery eyes",
            Symptom::ThroatItch => "throat itch",
            Symptom::Headache => "headache",
            Symptom::Fatigue => "fatigue",
            Symptom::MildFever => "mild fever",
            Symptom::BreathingDifficulty => "breathing difficulty",
            Symptom::SkinRash => "skin rash",
            Symptom::DryCough => "dry cough",
            Symptom::Dizziness => "dizziness",
            Symptom::NoseItch => "nose itch",
            Symptom::NasalDischarge => "nasal discharge",
        }
    }

    /// Spanish tag accepted for compatibility with older clients and history.
    pub fn legacy_tag(&self) -> &'static str {
        match self {
            Symptom::Sneezing => "estornudos",
            Symptom::NasalCongestion => "congestión nasal",
            Symptom::WateryEyes => "ojos llorosos",
            Symptom::ThroatItch => "picazón en la garganta",
            Symptom::Headache => "dolor de cabeza",
            Symptom::Fatigue => "fatiga",
            Symptom::MildFever => "fiebre leve",
            Symptom::BreathingDifficulty => "dificultad para respirar",
            Symptom::SkinRash => "erupciones en la piel",
            Symptom::DryCough => "tos seca",
            Symptom::Dizziness => "mareos",
            Symptom::NoseItch => "picazón en la nariz",
            Symptom::NasalDischarge => "secreción nasal",
        }
    }

    /// Looks up a tag, canonical or legacy. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|s| s.tag() == tag || s.legacy_tag() == tag)
    }

    pub fn advice(&self) -> AdviceItem {
        match self {
            Symptom::Sneezing => AdviceItem::new(
                "Avoid contact with dust and allergens. Use an air purifier at home.",
                "Cause: Exposure to dust or common allergens such as pollen can trigger sneezing.",
            ),
            Symptom::NasalCongestion => AdviceItem::new(
                "Stay hydrated and use saline solution to clear your nasal passages.",
                "Cause: Nasal congestion can be caused by allergens like dust, pollen or even dry air.",
            ),
            Symptom::WateryEyes => AdviceItem::new(
                "Wear sunglasses outdoors to protect yourself from pollen and wind.",
                "Cause: Pollen and wind can irritate the eyes and cause tearing.",
            ),
            Symptom::ThroatItch => AdviceItem::new(
                "Avoid sudden temperature changes and drink warm fluids.",
                "Cause: Throat irritation can come from allergies or respiratory infections.",
            ),
            Symptom::Headache => AdviceItem::new(
                "Stay calm and take pain relievers if needed.",
                "Cause: Headaches can be related to changes in atmospheric pressure or allergies.",
            ),
            Symptom::Fatigue => AdviceItem::new(
                "Rest and keep yourself well hydrated.",
                "Cause: Fatigue can be a secondary symptom of allergies or lack of rest.",
            ),
            Symptom::MildFever => AdviceItem::new(
                "See a doctor if the symptoms persist.",
                "Cause: Fever may be related to infections or severe allergic reactions.",
            ),
            Symptom::BreathingDifficulty => AdviceItem::new(
                "Seek medical attention immediately if you have serious difficulty breathing.",
                "Cause: Difficulty breathing can be a sign of a severe allergic reaction or asthma.",
            ),
            Symptom::SkinRash => AdviceItem::new(
                "Avoid contact with possible allergens and use creams to soothe the skin.",
                "Cause: Rashes can be caused by allergic reactions to certain allergens or irritants.",
            ),
            Symptom::DryCough => AdviceItem::new(
                "Stay hydrated and avoid dry environments.",
                "Cause: A dry cough can be a symptom of respiratory allergies or dry air.",
            ),
            Symptom::Dizziness => AdviceItem::new(
                "Rest and keep your head in a comfortable position.",
                "Cause: Dizziness can be caused by pressure changes or an imbalance in the inner ear.",
            ),
            Symptom::NoseItch => AdviceItem::new(
                "Avoid touching your face and use a humidifier.",
                "Cause: An itchy nose is commonly triggered by airborne pollen or dust.",
            ),
            Symptom::NasalDischarge => AdviceItem::new(
                "Keep your nasal passages clean and use a saline spray.",
                "Cause: A runny nose can be a symptom of colds or allergies to airborne allergens.",
            ),
        }
    }
}

impl std::fmt::Display for Symptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_thirteen_distinct_tags() {
        let mut tags: Vec<&str> = Symptom::all().iter().map(Symptom::tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 13);
    }

    #[test]
    fn tag_lookup_accepts_canonical_and_legacy_forms() {
        for symptom in Symptom::all() {
            assert_eq!(Symptom::from_tag(symptom.tag()), Some(*symptom));
            assert_eq!(Symptom::from_tag(symptom.legacy_tag()), Some(*symptom));
        }
    }

    #[test]
    fn tag_lookup_ignores_case_and_surrounding_whitespace() {
        assert_eq!(Symptom::from_tag("  Watery Eyes "), Some(Symptom::WateryEyes));
        assert_eq!(Symptom::from_tag("Dolor de Cabeza"), Some(Symptom::Headache));
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(Symptom::from_tag("hiccups"), None);
        assert_eq!(Symptom::from_tag(""), None);
    }

    #[test]
    fn pressure_group_is_the_last_weather_rule() {
        let Some(WeatherRule::FirstOf(group)) = WEATHER_RULES.last() else {
            panic!("pressure group must close the weather rules");
        };
        let names: Vec<&str> = group.iter().map(|c| c.name).collect();
        assert_eq!(names, ["low-pressure", "high-pressure"]);
    }
}
