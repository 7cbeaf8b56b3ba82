// src/customer.rs

use std::collections::{BTreeMap, HashMap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
//
use crate::{menu::Channel, order::Order};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    pub customer_id: i64,
    pub visit_frequency: i64,
    pub avg_order_value: f64,
    pub preferred_item: String,
    pub preferred_channel: Channel,
    pub last_visit_date: NaiveDate,
}

/// Order-derived features joined onto a customer listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerFeatures {
    pub customer_id: i64,
    pub visit_frequency: i64,
    pub avg_order_value: f64,
}

#[derive(Default)]
struct Rollup<'a> {
    visits: i64,
    spend: f64,
    last_visit: Option<NaiveDate>,
    items: HashMap<&'a str, usize>,
    channels: HashMap<Channel, usize>,
}

impl<'a> Rollup<'a> {
    fn add(&mut self, order: &'a Order) {
        self.visits += 1;
        self.spend += order.total_amount;
        self.last_visit = self.last_visit.max(Some(order.order_date));
        *self.items.entry(order.item_name.as_str()).or_default() += 1;
        *self.channels.entry(order.order_channel).or_default() += 1;
    }
}

/// Highest count wins; ties go to the key with the smallest name.
fn most_frequent<'n, K: Copy>(counts: &HashMap<K, usize>, name: impl Fn(K) -> &'n str) -> Option<K> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| name(**kb).cmp(name(**ka))))
        .map(|(key, _)| *key)
}

/// One customer per distinct `customer_id` in `orders`, ordered by id.
///
/// Ties on `preferred_item` and `preferred_channel` resolve to the
/// lexicographically smallest name, so `Online` beats `Phone` and `Walk-in`.
pub fn derive_customers(orders: &[Order]) -> Vec<Customer> {
    let mut rollups: BTreeMap<i64, Rollup> = BTreeMap::new();

    for order in orders {
        rollups.entry(order.customer_id).or_default().add(order);
    }

    rollups
        .into_iter()
        .filter_map(|(customer_id, rollup)| {
            Some(Customer {
                customer_id,
                visit_frequency: rollup.visits,
                avg_order_value: rollup.spend / rollup.visits as f64,
                preferred_item: most_frequent(&rollup.items, |item| item)?.to_string(),
                preferred_channel: most_frequent(&rollup.channels, Channel::name)?,
                last_visit_date: rollup.last_visit?,
            })
        })
        .collect()
}

/// Left-joins order-derived features onto `customers`.
///
/// Customers without orders get zero visits and a zero average; orders whose
/// customer is not listed are left out.
pub fn merge_features(customers: &[Customer], orders: &[Order]) -> Vec<CustomerFeatures> {
    let mut totals: HashMap<i64, (i64, f64)> = HashMap::new();

    for order in orders {
        let entry = totals.entry(order.customer_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.total_amount;
    }

    customers
        .iter()
        .map(|customer| {
            let (visit_frequency, avg_order_value) = match totals.get(&customer.customer_id) {
                Some(&(visits, spend)) => (visits, spend / visits as f64),
                None => (0, 0.0),
            };

            CustomerFeatures {
                customer_id: customer.customer_id,
                visit_frequency,
                avg_order_value,
            }
        })
        .collect()
}
