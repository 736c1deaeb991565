//! Subcommand execution.

use std::collections::BTreeMap;

use catalog::{
    CatalogClient, CategoryCode, CustomerId, ListQuery, NewProduct, OrderId, ProductCode,
    ResultEnvelope, Timestamp,
};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Command;

/// Paging and filtering shared by every listing subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page size
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Free-text search (JSON endpoints only)
    #[arg(long)]
    pub search: Option<String>,
    /// Extra `key=value` filter, repeatable
    #[arg(long = "filter", value_parser = parse_pair)]
    pub filters: Vec<(String, String)>,
}

impl ListArgs {
    pub fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::with_page_size(self.limit).page(self.page);
        if let Some(term) = &self.search {
            query = query.search(term);
        }
        self.filters
            .iter()
            .fold(query, |query, (key, value)| query.filter(key, value))
    }
}

#[derive(Debug, Args)]
pub struct NewProductArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub name: String,
    /// Category code, e.g. T12
    #[arg(long, value_parser = parse_category)]
    pub category: CategoryCode,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
    /// Extra `Field=value` sent with the product, repeatable
    #[arg(long = "field", value_parser = parse_pair)]
    pub fields: Vec<(String, String)>,
}

impl From<NewProductArgs> for NewProduct {
    fn from(args: NewProductArgs) -> Self {
        NewProduct {
            code: args.code,
            name: args.name,
            category_code: args.category,
            price: args.price,
            stock: args.stock,
            extra_fields: args.fields.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

fn parse_category(raw: &str) -> Result<CategoryCode, String> {
    CategoryCode::new(raw.trim()).ok_or_else(|| "category code must not be blank".to_string())
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// Counts printed by `snapshot`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    taken_at: Timestamp,
    products: usize,
    categories: usize,
    orders: usize,
    failures: Vec<String>,
}

/// Runs `command` and returns what should be printed.
pub async fn run(
    command: Command,
    client: &CatalogClient,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let value = match command {
        Command::Products { list } => render(client.get_products(&list.to_query(), cancel).await),
        Command::EnhancedProducts { list, no_images } => render(
            client
                .get_enhanced_products(&list.to_query(), !no_images, cancel)
                .await,
        ),
        Command::Categories { list } => {
            render(client.get_categories(&list.to_query(), cancel).await)
        }
        Command::CategoryTree => render(client.get_category_tree(cancel).await),
        Command::Customers { list } => render(client.get_customers(&list.to_query(), cancel).await),
        Command::Customer { id } => render(
            client
                .get_customer_by_id(CustomerId::new(id), cancel)
                .await,
        ),
        Command::Orders { list } => render(client.get_orders(&list.to_query(), cancel).await),
        Command::OrderDetails { order_id } => render(
            client
                .get_order_details(OrderId::new(order_id), cancel)
                .await,
        ),
        Command::PaymentTypes { list } => {
            render(client.get_payment_types(&list.to_query(), cancel).await)
        }
        Command::CargoCompanies { list } => {
            render(client.get_cargo_companies(&list.to_query(), cancel).await)
        }
        Command::OrderStatuses { list } => {
            render(client.get_order_statuses(&list.to_query(), cancel).await)
        }
        Command::Images { codes, parallel } => {
            let codes: Vec<ProductCode> = codes.into_iter().filter_map(ProductCode::new).collect();
            let images: BTreeMap<_, _> = client
                .get_bulk_product_images(codes, parallel, cancel)
                .await
                .into_iter()
                .collect();
            serde_json::to_value(images)
        }
        Command::AddProduct { product } => {
            render(client.add_product(&product.into(), cancel).await)
        }
        Command::Snapshot { limit } => serde_json::to_value(snapshot(client, limit, cancel).await),
    }?;
    Ok(value)
}

fn render<T: Serialize>(envelope: ResultEnvelope<T>) -> serde_json::Result<Value> {
    if !envelope.is_success() {
        warn!(
            message = envelope.first_message().unwrap_or_default(),
            "operation failed"
        );
    }
    serde_json::to_value(envelope)
}

/// Launches the three listings concurrently. Failed listings count as empty.
async fn snapshot(client: &CatalogClient, limit: u32, cancel: &CancellationToken) -> Snapshot {
    let query = ListQuery::with_page_size(limit);
    let (products, categories, orders) = tokio::join!(
        client.get_products(&query, cancel),
        client.get_categories(&query, cancel),
        client.get_orders(&query, cancel),
    );

    let failures: Vec<String> = [
        products.first_message().filter(|_| !products.is_success()),
        categories.first_message().filter(|_| !categories.is_success()),
        orders.first_message().filter(|_| !orders.is_success()),
    ]
    .into_iter()
    .flatten()
    .map(str::to_string)
    .collect();

    let snapshot = Snapshot {
        taken_at: Timestamp::now(),
        products: products.data_or_default().len(),
        categories: categories.data_or_default().len(),
        orders: orders.data_or_default().len(),
        failures,
    };
    info!(
        products = snapshot.products,
        categories = snapshot.categories,
        orders = snapshot.orders,
        "snapshot taken"
    );
    snapshot
}
