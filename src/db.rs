// src/db.rs

use std::time::Duration;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, FindOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
//
use crate::{
    customer::Customer,
    error::{PipelineError, Result},
    forecast::SalesRecord,
    order::Order,
};

pub const CUSTOMERS: &str = "customers";
pub const ORDERS: &str = "orders";

#[derive(Clone, Debug)]
pub struct Config {
    pub uri: String,
    pub database: String,
}

impl Config {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self { uri: uri.into(), database: database.into() }
    }
}

#[derive(Clone, Debug)]
pub struct DB {
    pub client: Client,
    pub database: Database,
}

impl DB {
    pub async fn new(config: Config) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(PipelineError::storage("connecting to", "admin"))?;
        options.server_selection_timeout = Some(Duration::from_secs(5));
        options.app_name = Some("pizza-analytics".to_string());

        let client = Client::with_options(options).map_err(PipelineError::storage("connecting to", "admin"))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(PipelineError::storage("pinging", "admin"))?;

        info!(database = %config.database, "connected to store");

        let database = client.database(&config.database);

        Ok(Self { client, database })
    }

    pub async fn save_customers(&self, customers: &[Customer]) -> Result<()> {
        self.replace_collection(CUSTOMERS, "customer_id", customers).await
    }

    pub async fn save_orders(&self, orders: &[Order]) -> Result<()> {
        self.replace_collection(ORDERS, "order_id", orders).await
    }

    pub async fn load_customers(&self) -> Result<Vec<Customer>> {
        self.find_all(CUSTOMERS, "customer_id", None).await
    }

    pub async fn load_orders(&self) -> Result<Vec<Order>> {
        self.find_all(ORDERS, "order_id", None).await
    }

    pub async fn peek_customers(&self, limit: i64) -> Result<Vec<Customer>> {
        self.find_all(CUSTOMERS, "customer_id", Some(limit)).await
    }

    pub async fn peek_orders(&self, limit: i64) -> Result<Vec<Order>> {
        self.find_all(ORDERS, "order_id", Some(limit)).await
    }

    /// Date and amount of every order, untyped, for the forecast's own coercion.
    pub async fn load_sales(&self) -> Result<Vec<SalesRecord>> {
        let collection = self.database.collection::<SalesRecord>(ORDERS);
        let find_options = FindOptions::builder()
            .projection(doc! { "_id": 0, "order_date": 1, "total_amount": 1 })
            .sort(doc! { "order_id": 1 })
            .build();

        let cursor = collection
            .find(None, find_options)
            .await
            .map_err(PipelineError::storage("reading", ORDERS))?;

        cursor.try_collect().await.map_err(PipelineError::storage("reading", ORDERS))
    }

    /// Deletes everything in `name`, then inserts `rows`, keyed uniquely on `key`.
    async fn replace_collection<T>(&self, name: &'static str, key: &str, rows: &[T]) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let collection: Collection<T> = self.database.collection(name);

        // delete all documents
        let deleted = collection
            .delete_many(doc! {}, None)
            .await
            .map_err(PipelineError::storage("clearing", name))?;

        let index = IndexModel::builder()
            .keys(key_spec(key))
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index, None)
            .await
            .map_err(PipelineError::storage("indexing", name))?;

        if !rows.is_empty() {
            collection
                .insert_many(rows, None)
                .await
                .map_err(PipelineError::storage("writing", name))?;
        }

        info!(collection = name, replaced = deleted.deleted_count, inserted = rows.len(), "saved collection");

        Ok(())
    }

    async fn find_all<T>(&self, name: &'static str, key: &str, limit: Option<i64>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let collection = self.database.collection::<T>(name);
        let find_options = FindOptions::builder().sort(key_spec(key)).limit(limit).build();

        let cursor = collection
            .find(None, find_options)
            .await
            .map_err(PipelineError::storage("reading", name))?;

        let rows: Vec<T> = cursor.try_collect().await.map_err(PipelineError::storage("reading", name))?;

        debug!(collection = name, rows = rows.len(), "loaded collection");

        Ok(rows)
    }
}

fn key_spec(key: &str) -> Document {
    let mut spec = Document::new();
    spec.insert(key, 1);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use mongodb::bson::{from_document, to_document, Bson};
    use crate::{
        customer::derive_customers,
        forecast::{clean_sales, Amount, StoredDate},
        generator::{GeneratorConfig, OrderGenerator},
        menu::{Category, Channel, Size, MENU},
    };

    fn walk_in_order() -> Order {
        Order {
            order_id: 12,
            customer_id: 1001,
            order_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            order_time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            day_of_week: Weekday::Fri,
            item_name: "Pepperoni Pizza".to_string(),
            category: Category::Pizza,
            size: Size::Large,
            quantity: 2,
            order_channel: Channel::WalkIn,
            total_amount: 35.98,
        }
    }

    #[test]
    fn order_document_uses_store_formats() {
        let order = walk_in_order();

        let document = to_document(&order).unwrap();

        assert_eq!(document.get_str("order_date").unwrap(), "2024-03-08");
        assert_eq!(document.get_str("order_time").unwrap(), "09:05");
        assert_eq!(document.get_str("day_of_week").unwrap(), "Friday");
        assert_eq!(document.get_str("order_channel").unwrap(), "Walk-in");
        assert_eq!(document.get_f64("total_amount").unwrap(), 35.98);
        assert_eq!(from_document::<Order>(document).unwrap(), order);
    }

    #[test]
    fn customer_document_round_trips() {
        let customer = Customer {
            customer_id: 1001,
            visit_frequency: 3,
            avg_order_value: 21.5,
            preferred_item: "Garlic Bread".to_string(),
            preferred_channel: Channel::WalkIn,
            last_visit_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        };

        let document = to_document(&customer).unwrap();

        assert_eq!(document.get_str("last_visit_date").unwrap(), "2025-12-31");
        assert_eq!(document.get_str("preferred_channel").unwrap(), "Walk-in");
        assert_eq!(from_document::<Customer>(document).unwrap(), customer);
    }

    #[test]
    fn stored_order_time_with_seconds_still_loads() {
        let mut document = to_document(&walk_in_order()).unwrap();
        document.insert("order_time", "09:05:00");

        assert_eq!(from_document::<Order>(document).unwrap(), walk_in_order());
    }

    #[test]
    fn sales_records_keep_stored_amount_types() {
        let number: SalesRecord = from_document(doc! { "order_date": "2024-01-02", "total_amount": 12.5 }).unwrap();
        let text: SalesRecord = from_document(doc! { "order_date": "2024-01-02", "total_amount": "7.25" }).unwrap();
        let missing: SalesRecord = from_document(doc! { "order_date": "2024-01-02" }).unwrap();

        assert_eq!(number.total_amount, Some(Amount::Number(12.5)));
        assert_eq!(text.total_amount, Some(Amount::Text("7.25".to_string())));
        assert_eq!(missing.total_amount, None);
        assert_eq!(missing.order_date, Some(StoredDate::Text("2024-01-02".to_string())));
    }

    #[test]
    fn sales_records_with_non_text_dates_are_dropped_not_rejected() {
        let stored_as_date = Bson::DateTime(mongodb::bson::DateTime::from_millis(1_704_153_600_000));
        let documents = vec![
            doc! { "order_date": "2024-01-02", "total_amount": 10.0 },
            doc! { "order_date": 20240103_i64, "total_amount": 4.0 },
            doc! { "order_date": stored_as_date, "total_amount": 4.0 },
            doc! { "order_date": "2024-01-04", "total_amount": { "amount": 4.0 } },
        ];

        let records: Vec<SalesRecord> = documents.into_iter().map(|d| from_document(d).unwrap()).collect();

        assert!(matches!(records[1].order_date, Some(StoredDate::Unparsed(_))));
        assert!(matches!(records[2].order_date, Some(StoredDate::Unparsed(_))));
        assert!(matches!(records[3].total_amount, Some(Amount::Unparsed(_))));
        assert_eq!(
            clean_sales(&records).unwrap(),
            vec![(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 10.0)]
        );
    }

    async fn test_db() -> DB {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        DB::new(Config::new(uri, "pizza_store_test")).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "needs a running MongoDB server (MONGODB_URI)"]
    async fn save_then_load_reproduces_both_collections() {
        let db = test_db().await;
        let config = GeneratorConfig { num_orders: 300, num_customers: 30, ..GeneratorConfig::default() };
        let orders = OrderGenerator::new(config, &MENU).unwrap().generate();
        let customers = derive_customers(&orders);

        db.save_customers(&customers).await.unwrap();
        db.save_orders(&orders).await.unwrap();

        assert_eq!(db.load_customers().await.unwrap(), customers);
        assert_eq!(db.load_orders().await.unwrap(), orders);
        assert_eq!(db.load_sales().await.unwrap().len(), orders.len());
        assert_eq!(db.peek_orders(5).await.unwrap(), orders[..5].to_vec());
    }

    #[tokio::test]
    #[ignore = "needs a running MongoDB server (MONGODB_URI)"]
    async fn save_replaces_previous_contents() {
        let db = test_db().await;
        let config = GeneratorConfig { num_orders: 50, num_customers: 10, ..GeneratorConfig::default() };
        let orders = OrderGenerator::new(config, &MENU).unwrap().generate();

        db.save_orders(&orders).await.unwrap();
        db.save_orders(&orders[..10]).await.unwrap();
        assert_eq!(db.load_orders().await.unwrap().len(), 10);

        db.save_orders(&[]).await.unwrap();
        assert!(db.load_orders().await.unwrap().is_empty());
    }
}
