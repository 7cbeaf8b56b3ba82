// src/generator.rs

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use rand::{distributions::WeightedIndex, prelude::*, rngs::StdRng};
use tracing::{debug, info};
//
use crate::{
    error::{PipelineError, Result},
    menu::{Category, Channel, MenuItem, Size},
    order::Order,
};

const SERVICE_HOURS: [u32; 8] = [12, 13, 14, 18, 19, 20, 21, 22];
const SERVICE_HOUR_WEIGHTS: [u32; 8] = [1, 1, 1, 3, 4, 4, 3, 2];

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub num_orders: usize,
    pub num_customers: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_orders: 50_000,
            num_customers: 8_000,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_orders == 0 {
            return Err(PipelineError::Configuration("number of orders must be at least 1".into()));
        }
        if self.num_customers < 1 {
            return Err(PipelineError::Configuration(format!(
                "number of customers must be at least 1, got {}",
                self.num_customers
            )));
        }
        if self.start_date > self.end_date {
            return Err(PipelineError::Configuration(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

pub struct OrderGenerator<'m> {
    config: GeneratorConfig,
    menu: &'m [MenuItem],
    rng: StdRng,
    hours: WeightedIndex<u32>,
    span_days: u64,
}

impl<'m> OrderGenerator<'m> {
    pub fn new(config: GeneratorConfig, menu: &'m [MenuItem]) -> Result<Self> {
        config.validate()?;

        if menu.is_empty() {
            return Err(PipelineError::Configuration("menu has no items".into()));
        }

        let hours = WeightedIndex::new(SERVICE_HOUR_WEIGHTS)
            .map_err(|e| PipelineError::Configuration(format!("service hour weights: {}", e)))?;
        let span_days = (config.end_date - config.start_date).num_days() as u64;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            menu,
            hours,
            span_days,
        })
    }

    /// Generates `num_orders` orders with ids `1..=num_orders`.
    pub fn generate(&mut self) -> Vec<Order> {
        let count = self.config.num_orders;
        let mut orders = Vec::with_capacity(count);

        for order_id in 1..=count as i64 {
            orders.push(self.next_order(order_id));
        }

        info!(orders = orders.len(), seed = self.config.seed, "generated synthetic orders");

        orders
    }

    fn next_order(&mut self, order_id: i64) -> Order {
        let order_date = self.random_date();
        let item = self.menu[self.rng.gen_range(0..self.menu.len())];
        let size = match item.category {
            Category::Pizza => *Size::PIZZA_SIZES.choose(&mut self.rng).unwrap_or(&Size::Medium),
            _ => Size::Standard,
        };
        let quantity = self.rng.gen_range(1..=4);
        let order_channel = *Channel::ALL.choose(&mut self.rng).unwrap_or(&Channel::WalkIn);
        let customer_id = self.rng.gen_range(1..=self.config.num_customers);
        let order_time = self.random_time();

        debug!(order_id, item = item.name, %size, quantity, "drew order");

        Order {
            order_id,
            customer_id,
            order_date,
            order_time,
            day_of_week: order_date.weekday(),
            item_name: item.name.to_string(),
            category: item.category,
            size,
            quantity,
            order_channel,
            total_amount: item.price(size, quantity),
        }
    }

    fn random_date(&mut self) -> NaiveDate {
        let offset = self.rng.gen_range(0..=self.span_days);
        self.config
            .start_date
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.config.end_date)
    }

    fn random_time(&mut self) -> NaiveTime {
        let hour = SERVICE_HOURS[self.hours.sample(&mut self.rng)];
        let minute = self.rng.gen_range(0..60);
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::menu::{round_cents, MENU};

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            num_orders: 500,
            num_customers: 40,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn same_seed_yields_identical_orders() {
        let first = OrderGenerator::new(small_config(7), &MENU).unwrap().generate();
        let second = OrderGenerator::new(small_config(7), &MENU).unwrap().generate();
        assert_eq!(first, second);

        let other = OrderGenerator::new(small_config(8), &MENU).unwrap().generate();
        assert_ne!(first, other);
    }

    #[test]
    fn orders_respect_ranges_and_pricing() {
        let config = small_config(42);
        let orders = OrderGenerator::new(config.clone(), &MENU).unwrap().generate();

        assert_eq!(orders.len(), 500);
        for (index, order) in orders.iter().enumerate() {
            assert_eq!(order.order_id, index as i64 + 1);
            assert!((1..=config.num_customers).contains(&order.customer_id));
            assert!(order.order_date >= config.start_date && order.order_date <= config.end_date);
            assert_eq!(order.day_of_week, order.order_date.weekday());
            assert!((1..=4).contains(&order.quantity));
            assert!(SERVICE_HOURS.contains(&chrono::Timelike::hour(&order.order_time)));

            let item = MENU.iter().find(|item| item.name == order.item_name).unwrap();
            assert_eq!(order.category, item.category);
            match order.category {
                Category::Pizza => assert_ne!(order.size, Size::Standard),
                _ => assert_eq!(order.size, Size::Standard),
            }
            let expected = round_cents(item.base_price * order.size.multiplier() * order.quantity as f64);
            assert_eq!(order.total_amount, expected);
        }
    }

    #[test]
    fn single_item_menu_prices_every_order() {
        let menu = [MenuItem::new("Test Pizza", Category::Pizza, 10.00)];
        let orders = OrderGenerator::new(small_config(1), &menu).unwrap().generate();

        for order in orders.iter().filter(|o| o.size == Size::Large && o.quantity == 2) {
            assert_eq!(order.total_amount, 24.00);
        }
        assert!(orders.iter().all(|o| o.item_name == "Test Pizza"));
    }

    #[test]
    fn single_day_range_pins_the_date() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let config = GeneratorConfig { start_date: day, end_date: day, ..small_config(3) };
        let orders = OrderGenerator::new(config, &MENU).unwrap().generate();
        assert!(orders.iter().all(|o| o.order_date == day));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let zero_orders = GeneratorConfig { num_orders: 0, ..GeneratorConfig::default() };
        assert!(matches!(OrderGenerator::new(zero_orders, &MENU), Err(PipelineError::Configuration(_))));

        let zero_customers = GeneratorConfig { num_customers: 0, ..GeneratorConfig::default() };
        assert!(matches!(OrderGenerator::new(zero_customers, &MENU), Err(PipelineError::Configuration(_))));

        let backwards = GeneratorConfig {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(OrderGenerator::new(backwards, &MENU), Err(PipelineError::Configuration(_))));

        assert!(matches!(
            OrderGenerator::new(GeneratorConfig::default(), &[]),
            Err(PipelineError::Configuration(_))
        ));
    }
}
