// src/report.rs

use crate::{
    customer::{Customer, CustomerFeatures},
    forecast::Forecast,
    kpi::KpiSummary,
    order::{full_weekday_name, Order},
};

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(72));
    println!("  {}", title);
    println!("{}", "═".repeat(72));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(60));
}

/// `1234567.891` -> `$1,234,567.89`
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

pub fn print_kpis(summary: &KpiSummary) {
    print_section_header("KEY PERFORMANCE INDICATORS");

    println!("\n  Total Revenue: {}", money(summary.total_revenue));

    print_subsection("Revenue by Category");
    for (category, revenue) in &summary.category_revenue {
        println!("  {:28} {:>16}", category.to_string(), money(*revenue));
    }

    print_subsection("Top 10 Selling Items");
    for (item, quantity) in &summary.top_items {
        println!("  {:28} {:>10} units", item, quantity);
    }

    print_subsection("Orders by Day of Week");
    for (day, count) in &summary.orders_by_day {
        println!("  {:28} {:>10}", full_weekday_name(*day), count);
    }

    print_subsection("Orders by Channel");
    for (channel, count) in &summary.orders_by_channel {
        println!("  {:28} {:>10}", channel.to_string(), count);
    }
}

pub fn print_customer_features(features: &[CustomerFeatures], limit: usize) {
    print_subsection("Customer features sample");
    println!("  {:>12} {:>16} {:>16}", "customer_id", "visit_frequency", "avg_order_value");
    for row in features.iter().take(limit) {
        println!("  {:>12} {:>16} {:>16.2}", row.customer_id, row.visit_frequency, row.avg_order_value);
    }

    let idle = features.iter().filter(|f| f.visit_frequency == 0).count();
    println!("\n  {} customers, {} without orders", features.len(), idle);
}

pub fn print_forecast(forecast: &Forecast) {
    print_section_header("SALES FORECAST");

    println!("\n  Daily points: {} ({} train / {} test)", forecast.daily.len(), forecast.training().len(), forecast.test().len());
    println!(
        "  Trend: revenue = {:.2} + {:.4} x day_index",
        forecast.trend.intercept, forecast.trend.slope
    );
    println!("  Forecast RMSE: {}", money(forecast.rmse));

    print_subsection("Insights");
    println!(
        "  - Peak revenue week: Week {} with {}",
        forecast.peak_week.iso_week,
        money(forecast.peak_week.weekly_revenue)
    );
    println!(
        "  - Lowest revenue week: Week {} with {}",
        forecast.low_week.iso_week,
        money(forecast.low_week.weekly_revenue)
    );

    if !forecast.projection.is_empty() {
        print_subsection("Projected daily revenue");
        for (date, revenue) in &forecast.projection {
            println!("  {} {:>16}", date, money(*revenue));
        }
    }
}

pub fn print_inspect(customers: &[Customer], orders: &[Order]) {
    print_section_header("STORE SAMPLE");

    print_subsection("customers");
    for customer in customers {
        println!(
            "  {:>6} {:>4} {:>10.2} {:26} {:8} {}",
            customer.customer_id,
            customer.visit_frequency,
            customer.avg_order_value,
            customer.preferred_item,
            customer.preferred_channel.to_string(),
            customer.last_visit_date
        );
    }

    print_subsection("orders");
    for order in orders {
        println!(
            "  {:>6} {:>6} {} {} {:9} {:26} {:8} {:2} {:8} {:>8.2}",
            order.order_id,
            order.customer_id,
            order.order_date,
            order.order_time.format("%H:%M"),
            full_weekday_name(order.day_of_week),
            order.item_name,
            order.size.to_string(),
            order.quantity,
            order.order_channel.to_string(),
            order.total_amount
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_money_with_grouping() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(24.0), "$24.00");
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-999.999), "-$1,000.00");
    }
}
