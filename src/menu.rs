// src/menu.rs

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Category {
    Pizza,
    Side,
    Salad,
    Wings,
    Pasta,
    Drink,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Pizza => "Pizza",
            Category::Side => "Side",
            Category::Salad => "Salad",
            Category::Wings => "Wings",
            Category::Pasta => "Pasta",
            Category::Drink => "Drink",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Size {
    Small,
    Medium,
    Large,
    Standard,
}

impl Size {
    pub const PIZZA_SIZES: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn multiplier(self) -> f64 {
        match self {
            Size::Small => 0.9,
            Size::Large => 1.2,
            Size::Medium | Size::Standard => 1.0,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
            Size::Standard => "Standard",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Channel {
    #[serde(rename = "Walk-in")]
    WalkIn,
    Phone,
    Online,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::WalkIn, Channel::Phone, Channel::Online];

    /// Stored and displayed name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::WalkIn => "Walk-in",
            Channel::Phone => "Phone",
            Channel::Online => "Online",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuItem {
    pub name: &'static str,
    pub category: Category,
    pub base_price: f64,
}

impl MenuItem {
    pub const fn new(name: &'static str, category: Category, base_price: f64) -> Self {
        Self { name, category, base_price }
    }

    /// Line total for `quantity` units at `size`, rounded to cents.
    pub fn price(&self, size: Size, quantity: i32) -> f64 {
        round_cents(self.base_price * size.multiplier() * quantity as f64)
    }
}

pub const MENU: [MenuItem; 16] = [
    MenuItem::new("Meat Feast Pizza", Category::Pizza, 20.79),
    MenuItem::new("Italiano Pizza", Category::Pizza, 20.79),
    MenuItem::new("Cheesy Pepperoni Pizza", Category::Pizza, 20.79),
    MenuItem::new("Chicken Parmesan Pizza", Category::Pizza, 20.79),
    MenuItem::new("BBQ Chicken Pizza", Category::Pizza, 20.79),
    MenuItem::new("Spicy Chicken Pizza", Category::Pizza, 20.79),
    MenuItem::new("Margherita Pizza", Category::Pizza, 19.99),
    MenuItem::new("Vegetarian Classic Pizza", Category::Pizza, 19.99),
    MenuItem::new("Farmhouse Classic Pizza", Category::Pizza, 20.79),
    MenuItem::new("Prawns Paradise Pizza", Category::Pizza, 20.79),
    MenuItem::new("Cheesy Garlic Bread", Category::Side, 11.99),
    MenuItem::new("Garlic Bread", Category::Side, 8.99),
    MenuItem::new("Caesar Salad", Category::Salad, 9.99),
    MenuItem::new("Wings (8 pcs)", Category::Wings, 22.98),
    MenuItem::new("Pasta Carbonara", Category::Pasta, 19.99),
    MenuItem::new("Soft Drink 1.25L", Category::Drink, 7.99),
];

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_pizza_pair_costs_twenty_four() {
        let item = MenuItem::new("Test Pizza", Category::Pizza, 10.00);
        assert_eq!(item.price(Size::Large, 2), 24.00);
    }

    #[test]
    fn standard_size_keeps_base_price() {
        let drink = MENU[15];
        assert_eq!(drink.name, "Soft Drink 1.25L");
        assert_eq!(drink.price(Size::Standard, 3), 23.97);
    }

    #[test]
    fn small_size_discounts_ten_percent() {
        let item = MenuItem::new("Test Pizza", Category::Pizza, 20.00);
        assert_eq!(item.price(Size::Small, 1), 18.00);
    }

    #[test]
    fn menu_has_sixteen_items_with_unique_names() {
        let mut names: Vec<&str> = MENU.iter().map(|item| item.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);
    }
}
