// src/main.rs

pub mod chart;
pub mod customer;
pub mod db;
pub mod error;
pub mod files;
pub mod forecast;
pub mod generator;
pub mod kpi;
pub mod menu;
pub mod order;
pub mod report;

use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
//
use crate::{
    customer::{derive_customers, merge_features},
    db::{Config, DB},
    error::Result,
    files::DataFiles,
    forecast::{SalesRecord, DEFAULT_HORIZON},
    generator::{GeneratorConfig, OrderGenerator},
    kpi::KpiSummary,
    menu::MENU,
};

#[derive(Debug, Parser)]
#[command(name = "pizza-analytics", about = "Synthetic pizza store data, KPIs and revenue forecast")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Directory holding orders.csv and customers.csv
    #[arg(long, env = "DATA_DIR", default_value = "data/raw", global = true)]
    data_dir: PathBuf,

    /// Directory charts are written to
    #[arg(long, env = "ANALYSIS_DIR", default_value = "analysis", global = true)]
    analysis_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct StoreArgs {
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017", global = true)]
    mongodb_uri: String,

    #[arg(long, env = "MONGODB_DATABASE", default_value = "pizza_store", global = true)]
    database: String,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, env = "NUM_ORDERS", default_value_t = 50_000)]
    orders: usize,

    #[arg(long, env = "NUM_CUSTOMERS", default_value_t = 8_000)]
    customers: i64,

    #[arg(long, env = "START_DATE", default_value = "2024-01-01")]
    start_date: NaiveDate,

    #[arg(long, env = "END_DATE", default_value = "2025-12-31")]
    end_date: NaiveDate,

    #[arg(long, env = "SEED", default_value_t = 42)]
    seed: u64,
}

impl From<&GenerateArgs> for GeneratorConfig {
    fn from(args: &GenerateArgs) -> Self {
        GeneratorConfig {
            num_orders: args.orders,
            num_customers: args.customers,
            start_date: args.start_date,
            end_date: args.end_date,
            seed: args.seed,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate synthetic orders and customers into the data directory
    Generate(GenerateArgs),
    /// Load the data files into the store, replacing both collections
    Import,
    /// Print KPIs and customer features, write the KPI charts
    Analyze,
    /// Fit the revenue trend and write the forecast charts
    Forecast {
        /// Days to project past the last order date
        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,
    },
    /// Generate, import, analyze and forecast in one go
    Run {
        #[command(flatten)]
        generate: GenerateArgs,

        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,
    },
    /// Print the first rows of both collections
    Inspect {
        #[arg(long, default_value_t = 5)]
        limit: i64,
    },
}

fn generate(args: &GenerateArgs, files: &DataFiles) -> Result<()> {
    let orders = OrderGenerator::new(args.into(), &MENU)?.generate();
    let customers = derive_customers(&orders);

    files.write(&customers, &orders)?;

    println!("Dataset generation complete.");
    println!("Orders: {}", orders.len());
    println!("Customers: {}", customers.len());

    Ok(())
}

async fn import(db: &DB, files: &DataFiles) -> Result<()> {
    let customers = files.read_customers()?;
    let orders = files.read_orders()?;

    db.save_customers(&customers).await?;
    db.save_orders(&orders).await?;

    println!("Customers: {}", db.load_customers().await?.len());
    println!("Orders   : {}", db.load_orders().await?.len());
    println!("Data import completed successfully!");

    Ok(())
}

async fn analyze(db: &DB, analysis_dir: &Path) -> Result<()> {
    let customers = db.load_customers().await?;
    let orders = db.load_orders().await?;

    let summary = KpiSummary::compute(&orders);
    report::print_kpis(&summary);
    chart::write_kpi_charts(analysis_dir, &summary)?;

    let features = merge_features(&customers, &orders);
    report::print_customer_features(&features, 5);

    println!("\nKPIs calculated and charts saved in '{}'.", analysis_dir.display());

    Ok(())
}

async fn forecast_revenue(db: &DB, analysis_dir: &Path, horizon: usize) -> Result<()> {
    let records: Vec<SalesRecord> = db.load_sales().await?;

    let forecast = forecast::forecast(&records, horizon)?;
    report::print_forecast(&forecast);
    chart::write_forecast_charts(analysis_dir, &forecast)?;

    println!("\nForecasting complete. Plots saved in '{}'.", analysis_dir.display());

    Ok(())
}

async fn inspect(db: &DB, limit: i64) -> Result<()> {
    let customers = db.peek_customers(limit).await?;
    let orders = db.peek_orders(limit).await?;

    report::print_inspect(&customers, &orders);

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _tracing = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init();

    let cli = Cli::parse();
    let files = DataFiles::new(&cli.data_dir);
    let config = Config::new(cli.store.mongodb_uri.clone(), cli.store.database.clone());

    match &cli.command {
        Command::Generate(args) => generate(args, &files)?,
        Command::Import => import(&DB::new(config).await?, &files).await?,
        Command::Analyze => analyze(&DB::new(config).await?, &cli.analysis_dir).await?,
        Command::Forecast { horizon } => forecast_revenue(&DB::new(config).await?, &cli.analysis_dir, *horizon).await?,
        Command::Inspect { limit } => inspect(&DB::new(config).await?, *limit).await?,
        Command::Run { generate: args, horizon } => {
            generate(args, &files)?;

            let db = DB::new(config).await?;
            import(&db, &files).await?;
            analyze(&db, &cli.analysis_dir).await?;

            match forecast_revenue(&db, &cli.analysis_dir, *horizon).await {
                Err(e) if e.is_forecast_error() => error!(error = %e, "forecast step failed, KPI results are unaffected"),
                other => other?,
            }

            info!("pipeline finished");
        }
    }

    Ok(())
}
