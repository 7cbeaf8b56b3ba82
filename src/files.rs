// src/files.rs

use std::{fs, path::{Path, PathBuf}};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
//
use crate::{
    customer::Customer,
    error::{PipelineError, Result},
    order::Order,
};

pub const ORDERS_FILE: &str = "orders.csv";
pub const CUSTOMERS_FILE: &str = "customers.csv";

/// The two flat tables written by `generate` and read back by `import`.
pub struct DataFiles {
    dir: PathBuf,
}

impl DataFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn orders_path(&self) -> PathBuf {
        self.dir.join(ORDERS_FILE)
    }

    pub fn customers_path(&self) -> PathBuf {
        self.dir.join(CUSTOMERS_FILE)
    }

    pub fn write(&self, customers: &[Customer], orders: &[Order]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(PipelineError::io(&self.dir))?;

        write_table(&self.orders_path(), orders)?;
        write_table(&self.customers_path(), customers)?;

        info!(dir = %self.dir.display(), orders = orders.len(), customers = customers.len(), "wrote data files");

        Ok(())
    }

    pub fn read_orders(&self) -> Result<Vec<Order>> {
        read_table(&self.orders_path())
    }

    pub fn read_customers(&self) -> Result<Vec<Customer>> {
        read_table(&self.customers_path())
    }
}

pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(PipelineError::file(path))?;

    for row in rows {
        writer.serialize(row).map_err(PipelineError::file(path))?;
    }

    writer.flush().map_err(PipelineError::io(path))
}

pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(PipelineError::file(path))?;

    let headers = reader.headers().map_err(PipelineError::file(path))?;
    let headers: StringRecord = headers.iter().map(normalize_header).collect();
    reader.set_headers(headers);

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(PipelineError::file(path))
}

/// `Order_ID` -> `order_id`, `Customer ID` -> `customer_id`.
pub fn normalize_header(header: &str) -> String {
    let normalized = header.trim().to_lowercase().replace(' ', "_");
    match normalized.as_str() {
        "customerid" => "customer_id".to_string(),
        _ => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::{
        customer::derive_customers,
        generator::{GeneratorConfig, OrderGenerator},
        menu::MENU,
    };

    fn sample() -> (Vec<Customer>, Vec<Order>) {
        let config = GeneratorConfig { num_orders: 200, num_customers: 25, ..GeneratorConfig::default() };
        let orders = OrderGenerator::new(config, &MENU).unwrap().generate();
        (derive_customers(&orders), orders)
    }

    #[test]
    fn round_trips_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path().join("raw"));
        let (customers, orders) = sample();

        files.write(&customers, &orders).unwrap();

        assert_eq!(files.read_orders().unwrap(), orders);
        assert_eq!(files.read_customers().unwrap(), customers);
    }

    #[test]
    fn same_seed_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let first = DataFiles::new(dir.path().join("a"));
        let second = DataFiles::new(dir.path().join("b"));
        let (customers, orders) = sample();
        first.write(&customers, &orders).unwrap();
        let (customers, orders) = sample();
        second.write(&customers, &orders).unwrap();

        assert_eq!(fs::read(first.orders_path()).unwrap(), fs::read(second.orders_path()).unwrap());
        assert_eq!(fs::read(first.customers_path()).unwrap(), fs::read(second.customers_path()).unwrap());
    }

    #[test]
    fn writes_schema_headers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path());
        let (customers, orders) = sample();
        files.write(&customers, &orders).unwrap();

        let orders_csv = fs::read_to_string(files.orders_path()).unwrap();
        assert_eq!(
            orders_csv.lines().next().unwrap(),
            "order_id,customer_id,order_date,order_time,day_of_week,item_name,category,size,quantity,order_channel,total_amount"
        );
        let customers_csv = fs::read_to_string(files.customers_path()).unwrap();
        assert_eq!(
            customers_csv.lines().next().unwrap(),
            "customer_id,visit_frequency,avg_order_value,preferred_item,preferred_channel,last_visit_date"
        );
    }

    #[test]
    fn reads_mixed_case_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ORDERS_FILE);
        fs::write(
            &path,
            "Order_ID,CustomerID,Order_Date,Order_Time,Day_of_Week,Item_Name,Category,Size,Quantity,Order_Channel,Total_Amount\n\
             1,17,2024-01-05,19:05,Friday,Margherita Pizza,Pizza,Large,2,Walk-in,47.98\n",
        )
        .unwrap();

        let orders: Vec<Order> = read_table(&path).unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_id, 17);
        assert_eq!(orders[0].day_of_week, chrono::Weekday::Fri);
        assert_eq!(orders[0].order_channel, crate::menu::Channel::WalkIn);
        assert_eq!(orders[0].total_amount, 47.98);
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header(" Order Channel "), "order_channel");
        assert_eq!(normalize_header("Total_Amount"), "total_amount");
        assert_eq!(normalize_header("CustomerID"), "customer_id");
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let files = DataFiles::new("does/not/exist");
        let err = files.read_orders().unwrap_err();
        assert!(matches!(err, PipelineError::File { ref path, .. } if path.ends_with(ORDERS_FILE)));
    }
}
