// src/kpi.rs

use std::{collections::HashMap, hash::Hash};
use chrono::Weekday;
//
use crate::{
    menu::{Category, Channel},
    order::Order,
};

pub const TOP_ITEMS: usize = 10;

/// Accumulates values per key, remembering the order keys were first seen.
struct Tally<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, V)>,
}

impl<K: Hash + Eq + Clone, V: Default + std::ops::AddAssign> Tally<K, V> {
    fn new() -> Self {
        Self { index: HashMap::new(), groups: Vec::new() }
    }

    fn add(&mut self, key: &K, value: V) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key.clone(), V::default()));
                self.groups.len() - 1
            }
        };
        self.groups[slot].1 += value;
    }

    fn into_groups(self) -> Vec<(K, V)> {
        self.groups
    }
}

/// Stable descending sort, so equal values keep first-seen order.
fn sort_descending<K, V: PartialOrd>(groups: &mut [(K, V)]) {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

pub fn total_revenue(orders: &[Order]) -> f64 {
    orders.iter().map(|o| o.total_amount).sum()
}

pub fn category_revenue(orders: &[Order]) -> Vec<(Category, f64)> {
    let mut tally = Tally::new();
    for order in orders {
        tally.add(&order.category, order.total_amount);
    }

    let mut groups = tally.into_groups();
    sort_descending(&mut groups);
    groups
}

/// Units sold per item, best sellers first, at most `k` entries.
pub fn top_items(orders: &[Order], k: usize) -> Vec<(String, i64)> {
    let mut tally = Tally::new();
    for order in orders {
        tally.add(&order.item_name, order.quantity as i64);
    }

    let mut groups = tally.into_groups();
    sort_descending(&mut groups);
    groups.truncate(k);
    groups
}

/// Order counts per weekday, Monday first.
pub fn orders_by_day(orders: &[Order]) -> Vec<(Weekday, usize)> {
    let mut counts = [0usize; 7];
    for order in orders {
        counts[order.day_of_week.num_days_from_monday() as usize] += 1;
    }

    let mut day = Weekday::Mon;
    counts
        .into_iter()
        .map(|count| {
            let entry = (day, count);
            day = day.succ();
            entry
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

pub fn orders_by_channel(orders: &[Order]) -> Vec<(Channel, usize)> {
    let mut tally = Tally::new();
    for order in orders {
        tally.add(&order.order_channel, 1usize);
    }

    let mut groups = tally.into_groups();
    sort_descending(&mut groups);
    groups
}

#[derive(Clone, Debug, PartialEq)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub category_revenue: Vec<(Category, f64)>,
    pub top_items: Vec<(String, i64)>,
    pub orders_by_day: Vec<(Weekday, usize)>,
    pub orders_by_channel: Vec<(Channel, usize)>,
}

impl KpiSummary {
    pub fn compute(orders: &[Order]) -> Self {
        Self {
            total_revenue: total_revenue(orders),
            category_revenue: category_revenue(orders),
            top_items: top_items(orders, TOP_ITEMS),
            orders_by_day: orders_by_day(orders),
            orders_by_channel: orders_by_channel(orders),
        }
    }
}
