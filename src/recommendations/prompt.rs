use std::fmt::Write;

use crate::nutrition::services::NutritionAnalysis;
use crate::users::repo_types::Preferences;

pub const SYSTEM_INSTRUCTION: &str = "You are a professional nutritionist and food recommender. \
Based on the user's taste preferences and recent nutrition intake, recommend healthy and tasty food.";

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 500;

const RESPONSE_SHAPE: &str = r#"{"recommendations": [{"name": "food name", "description": "short description", "nutrition": {"calories": 100, "protein": 10, "carbs": 20, "fat": 5}, "reason": "why it fits"}]}"#;

/// User prompt for one recommendation request.
///
/// Blank preference fields are left out entirely, and the intake block only
/// appears when there is a recent analysis.
pub fn build_prompt(prefs: &Preferences, recent: Option<&NutritionAnalysis>) -> String {
    let mut p = String::from("Please recommend food for the user's next meal based on the following information:\n\n");

    let fields = [
        ("Taste preference", prefs.taste()),
        ("Dietary restrictions", prefs.dietary_restrictions()),
        ("Cuisine preference", prefs.cuisine_preferences()),
        ("Budget", prefs.budget()),
    ];
    // Writing into a String cannot fail.
    for (label, value) in fields {
        if let Some(v) = value {
            let _ = writeln!(p, "{label}: {v}");
        }
    }

    if let Some(a) = recent {
        p.push_str("\nRecent nutrition intake (past 3 days):\n");
        let _ = writeln!(p, "Average calories: {}kcal", a.avg_calories);
        let _ = writeln!(p, "Average protein: {}g", a.avg_protein);
        let _ = writeln!(p, "Average carbs: {}g", a.avg_carbs);
        let _ = writeln!(p, "Average fat: {}g", a.avg_fat);
    }

    p.push_str("\nRecommend 1-3 suitable foods. For each food include:\n");
    p.push_str("1. Food name\n");
    p.push_str("2. Short description\n");
    p.push_str("3. Nutrition breakdown (calories, protein, carbs, fat)\n");
    p.push_str("4. Reason for the recommendation\n\n");
    p.push_str("Respond in JSON, for example:\n");
    p.push_str(RESPONSE_SHAPE);
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> NutritionAnalysis {
        NutritionAnalysis {
            avg_calories: 600,
            avg_protein: 25.0,
            avg_carbs: 70.5,
            avg_fat: 15.0,
            total_records: 2,
        }
    }

    #[test]
    fn only_present_preferences_are_listed() {
        let prefs = Preferences {
            taste: Some("spicy".into()),
            budget: Some("  ".into()),
            ..Default::default()
        };
        let p = build_prompt(&prefs, None);
        assert!(p.contains("Taste preference: spicy\n"));
        assert!(!p.contains("Budget"));
        assert!(!p.contains("Dietary restrictions"));
        assert!(!p.contains("Cuisine preference"));
    }

    #[test]
    fn intake_block_only_with_analysis() {
        let prefs = Preferences::default();
        assert!(!build_prompt(&prefs, None).contains("past 3 days"));

        let p = build_prompt(&prefs, Some(&analysis()));
        assert!(p.contains("Recent nutrition intake (past 3 days):"));
        assert!(p.contains("Average calories: 600kcal"));
        assert!(p.contains("Average carbs: 70.5g"));
        assert!(p.contains("Average fat: 15g"));
    }

    #[test]
    fn ends_with_json_shape() {
        let p = build_prompt(&Preferences::default(), None);
        assert!(p.contains("Recommend 1-3 suitable foods"));
        assert!(p.ends_with(RESPONSE_SHAPE));
        assert!(serde_json::from_str::<serde_json::Value>(RESPONSE_SHAPE).is_ok());
    }
}
