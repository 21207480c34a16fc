use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use supplynet::config::AppConfig;
use supplynet::database::migrations::Migrator;
use supplynet::database::{establish_connection, get_database_url, setup_database};
use supplynet::errors::NetworkError;
use supplynet::services::{
    BootstrapService, NetworkService, NodeChanges, NodeInput, ProductInput, ProductService,
};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    Node {
        #[clap(subcommand)]
        command: NodeCommands,
    },
    Product {
        #[clap(subcommand)]
        command: ProductCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

#[derive(Subcommand, Debug)]
enum NodeCommands {
    Create {
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "")]
        email: String,
        #[clap(long)]
        country: String,
        #[clap(long)]
        city: String,
        #[clap(long)]
        street: String,
        #[clap(long)]
        house_number: String,
        /// Initial amount owed to the supplier
        #[clap(long)]
        debt: Option<Decimal>,
        #[clap(long)]
        supplier: Option<i32>,
    },
    Update {
        id: i32,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        country: Option<String>,
        #[clap(long)]
        city: Option<String>,
        #[clap(long)]
        street: Option<String>,
        #[clap(long)]
        house_number: Option<String>,
        #[clap(long, conflicts_with = "detach")]
        supplier: Option<i32>,
        /// Remove the supplier, making the node a root
        #[clap(long)]
        detach: bool,
    },
    Delete {
        id: i32,
    },
    Show {
        id: i32,
    },
    List,
    RecordDebt {
        id: i32,
        #[clap(allow_hyphen_values = true)]
        amount: Decimal,
    },
    ClearDebt {
        #[clap(required = true)]
        ids: Vec<i32>,
    },
}

#[derive(Subcommand, Debug)]
enum ProductCommands {
    Create {
        #[clap(long)]
        node: i32,
        #[clap(long)]
        name: String,
        #[clap(long)]
        model: String,
        /// Release date as YYYY-MM-DD
        #[clap(long)]
        release_date: NaiveDate,
    },
    List {
        #[clap(long)]
        node: Option<i32>,
    },
    Delete {
        id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    setup_logging(&config.log_level);

    if let Err(err) = run(args.command, &config).await {
        if let Some(body) = client_error_body(&err) {
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(CLIENT_ERROR_EXIT_CODE);
        }
        return Err(err);
    }

    Ok(())
}

const CLIENT_ERROR_EXIT_CODE: i32 = 2;

/// Field-error body for rejections the caller can correct; `None` for
/// failures that should surface as an ordinary error
fn client_error_body(err: &anyhow::Error) -> Option<serde_json::Value> {
    err.downcast_ref::<NetworkError>()
        .filter(|e| e.is_client_error())
        .map(NetworkError::to_field_errors)
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));

    match command {
        Commands::Db { command } => {
            let db = establish_connection(&database_url).await?;
            match command {
                DbCommands::Init => {
                    info!("Initializing database: {}", config.database);
                    migrate_database(&db, MigrateDirection::Up).await?;
                    let outcome = BootstrapService::new(db)
                        .ensure_superuser(config.admin.as_ref())
                        .await?;
                    print_json(&outcome)
                }
                DbCommands::Migrate { direction } => {
                    info!("Running database migration: {:?}", direction);
                    migrate_database(&db, direction).await
                }
            }
        }
        Commands::Node { command } => {
            let db = open_database(&database_url, config).await?;
            run_node_command(NetworkService::new(db), command).await
        }
        Commands::Product { command } => {
            let db = open_database(&database_url, config).await?;
            run_product_command(ProductService::new(db), command).await
        }
    }
}

async fn run_node_command(service: NetworkService, command: NodeCommands) -> Result<()> {
    match command {
        NodeCommands::Create {
            name,
            email,
            country,
            city,
            street,
            house_number,
            debt,
            supplier,
        } => {
            let view = service
                .create_node(NodeInput {
                    name,
                    email,
                    country,
                    city,
                    street,
                    house_number,
                    debt_to_supplier: debt,
                    supplier_id: supplier,
                })
                .await?;
            print_json(&view)
        }
        NodeCommands::Update {
            id,
            name,
            email,
            country,
            city,
            street,
            house_number,
            supplier,
            detach,
        } => {
            let supplier_id = if detach {
                Some(None)
            } else {
                supplier.map(Some)
            };
            let view = service
                .update_node(
                    id,
                    NodeChanges {
                        name,
                        email,
                        country,
                        city,
                        street,
                        house_number,
                        supplier_id,
                    },
                )
                .await?;
            print_json(&view)
        }
        NodeCommands::Delete { id } => print_json(&service.delete_node(id).await?),
        NodeCommands::Show { id } => print_json(&service.get_node(id).await?),
        NodeCommands::List => print_json(&service.list_nodes().await?),
        NodeCommands::RecordDebt { id, amount } => {
            print_json(&service.record_debt(id, amount).await?)
        }
        NodeCommands::ClearDebt { ids } => {
            let outcome = service.clear_debt(&ids).await?;
            info!("{}", outcome);
            print_json(&outcome)
        }
    }
}

async fn run_product_command(service: ProductService, command: ProductCommands) -> Result<()> {
    match command {
        ProductCommands::Create {
            node,
            name,
            model,
            release_date,
        } => {
            let product = service
                .create_product(
                    node,
                    ProductInput {
                        name,
                        model,
                        release_date,
                    },
                )
                .await?;
            print_json(&product)
        }
        ProductCommands::List { node } => print_json(&service.list_products(node).await?),
        ProductCommands::Delete { id } => {
            service.delete_product(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

/// Connect, bring the schema up to date and provision the superuser
async fn open_database(database_url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
    let db = establish_connection(database_url).await?;
    setup_database(&db).await?;
    info!("Database migrations completed");

    BootstrapService::new(db.clone())
        .ensure_superuser(config.admin.as_ref())
        .await?;
    Ok(db)
}

async fn migrate_database(db: &DatabaseConnection, direction: MigrateDirection) -> Result<()> {
    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(db, None).await?;
            Migrator::up(db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn setup_logging(log_level: &str) {
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplynet::errors::HierarchyError;

    #[test]
    fn test_client_errors_map_to_field_body() {
        let err = anyhow::Error::from(NetworkError::from(HierarchyError::Cycle { revisited: 4 }));
        let body = client_error_body(&err).unwrap();
        assert_eq!(body["code"], "CYCLE_DETECTED");
        assert_eq!(body["supplier"][0], err.to_string());

        let err = anyhow::Error::from(NetworkError::validation("house_number", "Too long"));
        let body = client_error_body(&err).unwrap();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["house_number"].is_array());
        assert_eq!(CLIENT_ERROR_EXIT_CODE, 2);
    }

    #[test]
    fn test_server_errors_have_no_field_body() {
        let db_err = NetworkError::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert!(client_error_body(&anyhow::Error::from(db_err)).is_none());
        assert!(client_error_body(&anyhow::anyhow!("config missing")).is_none());
    }
}
