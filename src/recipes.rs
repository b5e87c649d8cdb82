//! Static recipe catalog and goal-based recommendations

use serde::Serialize;

use crate::models::Goal;

/// Maximum number of recipes recommended per goal
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeMealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: &'static str,
    pub name: &'static str,
    pub meal_type: RecipeMealType,
    pub goal_tags: &'static [Goal],
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
    pub description: &'static str,
}

impl Recipe {
    pub fn suits(&self, goal: Goal) -> bool {
        self.goal_tags.contains(&goal)
    }
}

use Goal::{Bulk, Cut, Maintain};
use RecipeMealType::{Breakfast, Dinner, Lunch, Snack};

pub static RECIPES: [Recipe; 16] = [
    // Breakfast
    Recipe {
        id: "b1",
        name: "Greek Yogurt & Berries",
        meal_type: Breakfast,
        goal_tags: &[Cut, Maintain],
        calories: 250,
        protein_g: 20,
        carbs_g: 30,
        fat_g: 5,
        description: "Non-fat Greek yogurt with mixed berries and a drizzle of honey.",
    },
    Recipe {
        id: "b2",
        name: "Oatmeal Power Bowl",
        meal_type: Breakfast,
        goal_tags: &[Bulk, Maintain],
        calories: 450,
        protein_g: 18,
        carbs_g: 65,
        fat_g: 12,
        description: "Rolled oats with banana, peanut butter, and chia seeds.",
    },
    Recipe {
        id: "b3",
        name: "Egg White Veggie Scramble",
        meal_type: Breakfast,
        goal_tags: &[Cut],
        calories: 200,
        protein_g: 24,
        carbs_g: 8,
        fat_g: 6,
        description: "Egg whites scrambled with spinach, peppers, and onions.",
    },
    Recipe {
        id: "b4",
        name: "Protein Pancakes",
        meal_type: Breakfast,
        goal_tags: &[Bulk, Maintain],
        calories: 500,
        protein_g: 35,
        carbs_g: 55,
        fat_g: 14,
        description: "Oat and whey pancakes topped with maple syrup and blueberries.",
    },
    // Lunch
    Recipe {
        id: "l1",
        name: "Grilled Chicken Salad",
        meal_type: Lunch,
        goal_tags: &[Cut, Maintain],
        calories: 350,
        protein_g: 38,
        carbs_g: 15,
        fat_g: 14,
        description: "Grilled chicken breast over mixed greens with olive oil dressing.",
    },
    Recipe {
        id: "l2",
        name: "Turkey & Avocado Wrap",
        meal_type: Lunch,
        goal_tags: &[Maintain, Bulk],
        calories: 520,
        protein_g: 32,
        carbs_g: 45,
        fat_g: 22,
        description: "Whole wheat wrap with sliced turkey, avocado, and cheese.",
    },
    Recipe {
        id: "l3",
        name: "Tuna Rice Bowl",
        meal_type: Lunch,
        goal_tags: &[Cut, Maintain],
        calories: 380,
        protein_g: 35,
        carbs_g: 42,
        fat_g: 6,
        description: "Canned tuna on white rice with soy sauce and cucumber.",
    },
    Recipe {
        id: "l4",
        name: "Pasta & Meat Sauce",
        meal_type: Lunch,
        goal_tags: &[Bulk],
        calories: 650,
        protein_g: 35,
        carbs_g: 75,
        fat_g: 20,
        description: "Whole grain pasta with lean ground beef tomato sauce.",
    },
    // Dinner
    Recipe {
        id: "d1",
        name: "Salmon & Sweet Potato",
        meal_type: Dinner,
        goal_tags: &[Maintain, Bulk],
        calories: 550,
        protein_g: 40,
        carbs_g: 45,
        fat_g: 20,
        description: "Baked salmon fillet with roasted sweet potato and broccoli.",
    },
    Recipe {
        id: "d2",
        name: "Chicken Stir-Fry",
        meal_type: Dinner,
        goal_tags: &[Cut, Maintain],
        calories: 400,
        protein_g: 36,
        carbs_g: 30,
        fat_g: 14,
        description: "Chicken breast stir-fried with vegetables and low-sodium soy sauce.",
    },
    Recipe {
        id: "d3",
        name: "Lean Beef & Rice",
        meal_type: Dinner,
        goal_tags: &[Bulk],
        calories: 600,
        protein_g: 42,
        carbs_g: 60,
        fat_g: 18,
        description: "Grilled lean steak with jasmine rice and steamed vegetables.",
    },
    Recipe {
        id: "d4",
        name: "Shrimp Zucchini Noodles",
        meal_type: Dinner,
        goal_tags: &[Cut],
        calories: 280,
        protein_g: 30,
        carbs_g: 12,
        fat_g: 10,
        description: "Sauteed shrimp over spiralized zucchini with garlic and olive oil.",
    },
    // Snacks
    Recipe {
        id: "s1",
        name: "Protein Shake",
        meal_type: Snack,
        goal_tags: &[Cut, Maintain, Bulk],
        calories: 200,
        protein_g: 30,
        carbs_g: 10,
        fat_g: 3,
        description: "One scoop whey protein with water or almond milk.",
    },
    Recipe {
        id: "s2",
        name: "Trail Mix",
        meal_type: Snack,
        goal_tags: &[Bulk, Maintain],
        calories: 350,
        protein_g: 10,
        carbs_g: 30,
        fat_g: 22,
        description: "Mixed nuts, dried fruit, and dark chocolate chips.",
    },
    Recipe {
        id: "s3",
        name: "Rice Cakes & PB",
        meal_type: Snack,
        goal_tags: &[Bulk, Maintain],
        calories: 280,
        protein_g: 8,
        carbs_g: 35,
        fat_g: 12,
        description: "Two rice cakes topped with peanut butter and banana slices.",
    },
    Recipe {
        id: "s4",
        name: "Cottage Cheese & Pineapple",
        meal_type: Snack,
        goal_tags: &[Cut, Maintain],
        calories: 180,
        protein_g: 22,
        carbs_g: 18,
        fat_g: 2,
        description: "Low-fat cottage cheese with pineapple chunks.",
    },
];

/// Recipes tagged for `goal`, in catalog order, at most [`MAX_RECOMMENDATIONS`]
pub fn recipes_for_goal(goal: Goal) -> Vec<&'static Recipe> {
    RECIPES
        .iter()
        .filter(|recipe| recipe.suits(goal))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
