//! Built-in food table used when FatSecret is unavailable.

use super::FoodItem;

/// Maximum number of results a fallback search returns.
pub const FALLBACK_LIMIT: usize = 10;

struct StaticFood {
    id: &'static str,
    name: &'static str,
    calories: u32,
    serving: &'static str,
    protein: f64,
    carbs: f64,
    fat: f64,
}

const fn food(
    id: &'static str,
    name: &'static str,
    calories: u32,
    serving: &'static str,
    protein: f64,
    carbs: f64,
    fat: f64,
) -> StaticFood {
    StaticFood {
        id,
        name,
        calories,
        serving,
        protein,
        carbs,
        fat,
    }
}

#[rustfmt::skip]
const FOODS: &[StaticFood] = &[
    food("f1", "Chicken Breast (grilled)", 165, "100g", 31.0, 0.0, 3.6),
    food("f2", "Chicken Thigh", 209, "100g", 26.0, 0.0, 11.0),
    food("f3", "Salmon (baked)", 208, "100g", 20.0, 0.0, 13.0),
    food("f4", "Egg (large, boiled)", 78, "1 egg", 6.0, 0.6, 5.0),
    food("f5", "Rice (white, cooked)", 130, "100g", 2.7, 28.0, 0.3),
    food("f6", "Rice (brown, cooked)", 112, "100g", 2.6, 24.0, 0.9),
    food("f7", "Bread (white, 1 slice)", 79, "1 slice", 2.7, 15.0, 1.0),
    food("f8", "Bread (whole wheat)", 81, "1 slice", 4.0, 14.0, 1.0),
    food("f9", "Pasta (cooked)", 131, "100g", 5.0, 25.0, 1.1),
    food("f10", "Oatmeal (cooked)", 71, "100g", 2.5, 12.0, 1.5),
    food("f11", "Banana", 89, "1 medium", 1.1, 23.0, 0.3),
    food("f12", "Apple", 52, "1 medium", 0.3, 14.0, 0.2),
    food("f13", "Orange", 47, "1 medium", 0.9, 12.0, 0.1),
    food("f14", "Strawberries", 32, "100g", 0.7, 8.0, 0.3),
    food("f15", "Blueberries", 57, "100g", 0.7, 14.0, 0.3),
    food("f16", "Broccoli", 34, "100g", 2.8, 7.0, 0.4),
    food("f17", "Spinach", 23, "100g", 2.9, 3.6, 0.4),
    food("f18", "Sweet Potato", 86, "100g", 1.6, 20.0, 0.1),
    food("f19", "Potato (baked)", 93, "100g", 2.5, 21.0, 0.1),
    food("f20", "Avocado", 160, "100g", 2.0, 9.0, 15.0),
    food("f21", "Greek Yogurt", 100, "170g", 17.0, 6.0, 0.7),
    food("f22", "Milk (whole)", 149, "1 cup", 8.0, 12.0, 8.0),
    food("f23", "Milk (skim)", 83, "1 cup", 8.0, 12.0, 0.2),
    food("f24", "Cheese (cheddar)", 113, "1 oz", 7.0, 0.4, 9.0),
    food("f25", "Peanut Butter", 94, "1 tbsp", 4.0, 3.0, 8.0),
    food("f26", "Almonds", 164, "1 oz", 6.0, 6.0, 14.0),
    food("f27", "Beef (ground, lean)", 250, "100g", 26.0, 0.0, 15.0),
    food("f28", "Steak (sirloin)", 271, "100g", 26.0, 0.0, 18.0),
    food("f29", "Turkey Breast", 135, "100g", 30.0, 0.0, 1.0),
    food("f30", "Tuna (canned)", 116, "100g", 26.0, 0.0, 1.0),
    food("f31", "Shrimp", 99, "100g", 24.0, 0.2, 0.3),
    food("f32", "Butter Chicken", 210, "100g", 12.0, 8.0, 14.0),
    food("f33", "Pizza (cheese)", 266, "1 slice", 11.0, 33.0, 10.0),
    food("f34", "Burger (beef)", 295, "1 patty", 17.0, 24.0, 14.0),
    food("f35", "French Fries", 312, "100g", 3.4, 41.0, 15.0),
    food("f36", "Ice Cream (vanilla)", 137, "1/2 cup", 2.0, 16.0, 7.0),
    food("f37", "Chocolate (dark)", 155, "1 oz", 1.4, 17.0, 9.0),
    food("f38", "Coffee (black)", 2, "1 cup", 0.3, 0.0, 0.0),
    food("f39", "Orange Juice", 112, "1 cup", 1.7, 26.0, 0.5),
    food("f40", "Protein Shake", 150, "1 scoop", 25.0, 5.0, 2.0),
];

/// Case-insensitive substring search over the built-in table, in table
/// order, capped at [`FALLBACK_LIMIT`].
pub fn search_fallback_foods(query: &str) -> Vec<FoodItem> {
    let needle = query.trim().to_lowercase();
    FOODS
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .take(FALLBACK_LIMIT)
        .map(|f| FoodItem {
            food_id: f.id.to_string(),
            food_name: f.name.to_string(),
            brand: String::new(),
            calories: f.calories,
            protein: f.protein,
            carbs: f.carbs,
            fat: f.fat,
            serving: f.serving.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_case_insensitive_substring() {
        let names: Vec<String> = search_fallback_foods("CHICKEN")
            .into_iter()
            .map(|f| f.food_name)
            .collect();
        assert_eq!(
            names,
            vec!["Chicken Breast (grilled)", "Chicken Thigh", "Butter Chicken"]
        );
    }

    #[test]
    fn search_caps_results() {
        // "e" appears in far more than ten names.
        let results = search_fallback_foods("e");
        assert_eq!(results.len(), FALLBACK_LIMIT);
        assert_eq!(results[0].food_id, "f1");
    }

    #[test]
    fn search_without_match_is_empty() {
        assert!(search_fallback_foods("kombucha").is_empty());
    }

    #[test]
    fn table_has_unique_ids() {
        let mut ids: Vec<&str> = FOODS.iter().map(|f| f.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), FOODS.len());
        assert_eq!(FOODS.len(), 40);
    }
}
