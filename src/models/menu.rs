use serde::Serialize;

/// One yes/no dish slot on the monthly form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSlot {
    /// Selection key sent by the form.
    pub label: &'static str,
    /// Column header in the spreadsheet mirror and the CSV export.
    pub header: &'static str,
}

pub const MEAL_SLOTS: [MealSlot; 10] = [
    MealSlot { label: "Monday Night - Chicken Curry", header: "Monday Chicken" },
    MealSlot { label: "Wednesday Night - Chicken Curry", header: "Wednesday Chicken" },
    MealSlot { label: "Thursday Afternoon - Omelette", header: "Thursday Omelette" },
    MealSlot { label: "Friday Night - Mushroom Curry", header: "Friday Mushroom" },
    MealSlot { label: "Saturday Afternoon - Fish Fry", header: "Saturday Fish" },
    MealSlot { label: "Sunday Morning - Bread Omelette", header: "Sunday Bread Omelette" },
    MealSlot { label: "Sunday Afternoon - Chicken Curry", header: "Sunday Chicken" },
    MealSlot { label: "M - Afternoon - Boiled Egg", header: "Monday Boiled Egg" },
    MealSlot { label: "T - Night - Boiled Egg", header: "Tuesday Boiled Egg" },
    MealSlot { label: "S - Night - Boiled Egg", header: "Saturday Boiled Egg" },
];

/// Position of a slot within `MEAL_SLOTS`.
pub fn slot_index(label: &str) -> Option<usize> {
    MEAL_SLOTS.iter().position(|slot| slot.label == label)
}
