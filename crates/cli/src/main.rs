//! T-Soft catalog CLI entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. **Parses configuration** from flags and `TSOFT_API_*` variables.
//! 2. **Wires observability**: `tracing-subscriber` to stderr (human or JSON)
//!    plus an optional OTLP exporter.
//! 3. **Constructs infrastructure**: the HTTP adapters from `transport`,
//!    injected into a [`catalog::CatalogClient`].
//! 4. **Runs one subcommand** and prints its result as pretty JSON on stdout.
//!
//! Failed operations still print their envelope and exit with status 0; only
//! configuration and setup errors produce a non-zero exit.

mod commands;
mod observability;
mod settings;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::{ListArgs, NewProductArgs};
use crate::observability::LogFormat;
use crate::settings::ConnectionArgs;

#[derive(Parser, Debug)]
#[command(name = "tsoft", version, about = "T-Soft catalog and order client")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Human, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// List products
    Products {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List products with category paths and, on page 1, primary images
    EnhancedProducts {
        #[command(flatten)]
        list: ListArgs,
        /// Skip the image fetch
        #[arg(long, default_value_t = false)]
        no_images: bool,
    },
    /// List categories as returned by the backend
    Categories {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Print the category forest with breadcrumb paths
    CategoryTree,
    /// List customers
    Customers {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one customer
    Customer {
        /// Customer id
        id: u64,
    },
    /// List orders
    Orders {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show the lines of one order
    OrderDetails {
        /// Order id
        order_id: u64,
    },
    /// List payment types
    PaymentTypes {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List cargo companies
    CargoCompanies {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List order statuses
    OrderStatuses {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Fetch images for one or more product codes
    Images {
        /// Product codes
        #[arg(required = true)]
        codes: Vec<String>,
        /// Maximum concurrent requests
        #[arg(long, default_value_t = 3)]
        parallel: usize,
    },
    /// Create a product
    AddProduct {
        #[command(flatten)]
        product: NewProductArgs,
    },
    /// Fetch products, categories and orders concurrently and print counts
    Snapshot {
        /// Page size for each listing
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = observability::init(cli.log_format)?;

    let config = cli.connection.client_config()?;
    info!(base_url = config.base_url(), debug = config.debug(), "starting");

    let transports =
        transport::http_transports(&config).context("failed to set up HTTP transports")?;
    let client = catalog::CatalogClient::new(transports);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling");
            on_interrupt.cancel();
        }
    });

    let output = commands::run(cli.command, &client, &cancel).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to render output")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_list_subcommand_with_filters() {
        let cli = Cli::try_parse_from([
            "tsoft",
            "--token",
            "t",
            "orders",
            "--limit",
            "5",
            "--filter",
            "OrderStatusId=3",
        ])
        .unwrap();
        match cli.command {
            Command::Orders { list } => {
                let query = list.to_query();
                assert_eq!(query.page_size, 5);
                assert_eq!(query.filters["OrderStatusId"], "3");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
