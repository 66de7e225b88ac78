//! Recommendation derivation: weather rules, then the wellness tip, then
//! symptom advice in the caller's order.

use crate::{
    model::{AdviceItem, SymptomSet, WeatherSnapshot},
    rules::{WEATHER_RULES, WELLNESS_TIP, WeatherRule},
};

/// Derives the ordered advice list for a snapshot and a set of symptoms.
///
/// Pure and total: the same inputs always give the same output, and
/// unrecognized symptom tags contribute nothing.
pub fn derive(snapshot: &WeatherSnapshot, symptoms: &SymptomSet) -> Vec<AdviceItem> {
    let mut advice = Vec::new();

    for rule in WEATHER_RULES {
        match rule {
            WeatherRule::When(condition) => {
                if (condition.applies)(snapshot) {
                    advice.push(condition.item);
                }
            }
            WeatherRule::FirstOf(group) => {
                if let Some(condition) = group.iter().find(|c| (c.applies)(snapshot)) {
                    advice.push(condition.item);
                }
            }
        }
    }

    advice.push(WELLNESS_TIP);
    advice.extend(symptoms.recognized().map(|symptom| symptom.advice()));

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Symptom;
    use chrono::Utc;

    fn snapshot(
        humidity: u8,
        description: &str,
        wind: f64,
        uv: f64,
        pressure: f64,
    ) -> WeatherSnapshot {
        WeatherSnapshot {
            provider: "test".into(),
            location_name: "Guadalajara".into(),
            temperature_c: 24.0,
            humidity_pct: humidity,
            description: description.into(),
            wind_speed_mps: wind,
            uv_proxy: uv,
            pressure_hpa: pressure,
            observed_at: Utc::now(),
        }
    }

    fn calm() -> WeatherSnapshot {
        snapshot(50, "Clear sky", 5.0, 5.0, 1015.0)
    }

    fn position(items: &[AdviceItem], item: AdviceItem) -> usize {
        items.iter().position(|i| *i == item).expect("item should be present")
    }

    fn item_named(name: &str) -> AdviceItem {
        WEATHER_RULES
            .iter()
            .flat_map(|rule| match rule {
                WeatherRule::When(c) => std::slice::from_ref(c),
                WeatherRule::FirstOf(group) => *group,
            })
            .find(|c| c.name == name)
            .map(|c| c.item)
            .expect("rule should exist")
    }

    #[test]
    fn calm_weather_without_symptoms_yields_only_wellness() {
        let advice = derive(&calm(), &SymptomSet::default());
        assert_eq!(advice, vec![WELLNESS_TIP]);
    }

    #[test]
    fn every_trigger_fires_in_table_order() {
        let snap = snapshot(80, "Heavy rain", 20.0, 9.0, 1005.0);
        let advice = derive(&snap, &SymptomSet::new(["headache"]));

        assert_eq!(
            advice,
            vec![
                item_named("humidity"),
                item_named("rain-or-fog"),
                item_named("wind-speed"),
                item_named("uv"),
                item_named("low-pressure"),
                WELLNESS_TIP,
                Symptom::Headache.advice(),
            ]
        );
    }

    #[test]
    fn derive_is_deterministic() {
        let snap = snapshot(75, "Dust storm", 16.0, 8.0, 1030.0);
        let symptoms = SymptomSet::new(["sneezing", "watery eyes"]);

        assert_eq!(derive(&snap, &symptoms), derive(&snap, &symptoms));
    }

    #[test]
    fn description_can_trigger_both_text_rules() {
        let snap = snapshot(50, "Light rain and wind", 5.0, 5.0, 1015.0);
        let advice = derive(&snap, &SymptomSet::default());

        assert_eq!(
            advice,
            vec![item_named("rain-or-fog"), item_named("wind-or-dust"), WELLNESS_TIP]
        );
    }

    #[test]
    fn description_matching_ignores_case() {
        let snap = snapshot(50, "FOG", 5.0, 5.0, 1015.0);
        let advice = derive(&snap, &SymptomSet::default());
        assert_eq!(advice[0], item_named("rain-or-fog"));
    }

    #[test]
    fn high_pressure_fires_alone() {
        let advice = derive(&snapshot(50, "Clear sky", 5.0, 5.0, 1030.0), &SymptomSet::default());
        assert_eq!(advice, vec![item_named("high-pressure"), WELLNESS_TIP]);
    }

    #[test]
    fn pressure_items_are_mutually_exclusive() {
        let low = item_named("low-pressure");
        let high = item_named("high-pressure");

        for pressure in (950_u16..=1080).map(f64::from) {
            let snap = snapshot(50, "Clear sky", 5.0, 5.0, pressure);
            let advice = derive(&snap, &SymptomSet::default());
            assert!(
                !(advice.contains(&low) && advice.contains(&high)),
                "both pressure items fired at {pressure} hPa"
            );
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let advice = derive(&snapshot(70, "Clear sky", 15.0, 7.0, 1010.0), &SymptomSet::default());
        assert_eq!(advice, vec![WELLNESS_TIP]);

        let advice = derive(&snapshot(50, "Clear sky", 5.0, 5.0, 1025.0), &SymptomSet::default());
        assert_eq!(advice, vec![WELLNESS_TIP]);
    }

    #[test]
    fn symptom_items_follow_caller_order_after_wellness() {
        let symptoms = SymptomSet::new(["nasal discharge", "sneezing", "fatigue"]);
        let advice = derive(&calm(), &symptoms);

        assert_eq!(
            advice,
            vec![
                WELLNESS_TIP,
                Symptom::NasalDischarge.advice(),
                Symptom::Sneezing.advice(),
                Symptom::Fatigue.advice(),
            ]
        );
    }

    #[test]
    fn weather_items_precede_wellness_which_precedes_symptoms() {
        let snap = snapshot(90, "Clear sky", 5.0, 5.0, 1015.0);
        let advice = derive(&snap, &SymptomSet::new(["dry cough"]));

        let humidity = position(&advice, item_named("humidity"));
        let wellness = position(&advice, WELLNESS_TIP);
        let cough = position(&advice, Symptom::DryCough.advice());
        assert!(humidity < wellness && wellness < cough);
    }

    #[test]
    fn unknown_symptoms_contribute_nothing() {
        let symptoms = SymptomSet::new(["hiccups", "headache", "sore elbow"]);
        let advice = derive(&calm(), &symptoms);

        assert_eq!(advice, vec![WELLNESS_TIP, Symptom::Headache.advice()]);
    }

    #[test]
    fn repeated_spellings_of_one_symptom_add_a_single_item() {
        let symptoms = SymptomSet::new(["headache", "Headache", " headache", "dolor de cabeza"]);
        let advice = derive(&calm(), &symptoms);

        assert_eq!(advice, vec![WELLNESS_TIP, Symptom::Headache.advice()]);
    }

    #[test]
    fn legacy_tags_produce_the_same_advice() {
        let english = derive(&calm(), &SymptomSet::new(["headache"]));
        let spanish = derive(&calm(), &SymptomSet::new(["dolor de cabeza"]));
        assert_eq!(english, spanish);
    }
}
