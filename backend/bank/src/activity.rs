//! # Activities
//!
//! What a form submission asks the estimator for. The category and unit only
//! describe the input; the lookup itself is keyed on the subtype alone.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Transportation,
    Energy,
    Waste,
    Food,
}

impl Category {
    pub fn unit(self) -> &'static str {
        match self {
            Category::Transportation => "gallon",
            Category::Energy => "kWh",
            Category::Waste | Category::Food => "kg",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Transportation => "transportation",
            Category::Energy => "energy",
            Category::Waste => "waste",
            Category::Food => "food",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity<'a> {
    pub category: Category,
    pub subtype: &'a str,
    pub quantity: f64,
}

impl<'a> Activity<'a> {
    pub fn new(category: Category, subtype: &'a str, quantity: f64) -> Self {
        Self {
            category,
            subtype,
            quantity,
        }
    }
}
