//! The public client surface consumed by the presentation layer.
//!
//! Every operation returns a [`ResultEnvelope`]; none of them returns an error
//! or panics on upstream misbehaviour. Which endpoint generation answered is
//! invisible to callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::bulk::fetch_bulk;
use crate::category_tree::{build_forest, count_nodes, label_paths};
use crate::endpoints::Operation;
use crate::enrichment::{
    apply_categories, apply_images, image_keys, IMAGE_FETCH_CONCURRENCY,
};
use crate::identifiers::{CustomerId, OrderId, ProductCode, RequestId};
use crate::models::{
    BatchOutcome, CargoCompany, Category, Customer, FailedProduct, NewProduct, Order,
    OrderDetail, OrderStatusInfo, PaymentType, Product, ProductImage,
};
use crate::normalize::{normalize, normalize_list};
use crate::resolver::Resolver;
use crate::transport::{OperationRequest, Transports};
use crate::types::ListQuery;
use crate::{ClientError, ResultEnvelope};

/// VAT rate sent when a new product does not specify one.
const DEFAULT_VAT: i64 = 18;

/// Category id sent when a category code has no numeric part.
const DEFAULT_CATEGORY_ID: i64 = 1;

/// Resilient client for the catalog/order backend.
///
/// Cheap to clone; clones share the underlying transports.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    resolver: Arc<Resolver>,
}

impl CatalogClient {
    pub fn new(transports: Transports) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(transports)),
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline: resolve → normalize
    // -----------------------------------------------------------------------

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: OperationRequest,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<T> {
        match self.resolver.resolve(operation, &request, cancel).await {
            Ok(resolution) => normalize(&resolution.body),
            Err(error) => ResultEnvelope::from_error(error),
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: OperationRequest,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<T>> {
        match self.resolver.resolve(operation, &request, cancel).await {
            Ok(resolution) => normalize_list(&resolution.body),
            Err(error) => ResultEnvelope::from_error(error),
        }
    }

    fn list_request(query: &ListQuery) -> OperationRequest {
        query.filters.iter().fold(
            OperationRequest::new().field("limit", query.page_size.to_string()),
            |req, (key, value)| req.field(key, value),
        )
    }

    // -----------------------------------------------------------------------
    // Products
    // -----------------------------------------------------------------------

    /// Lists products. `page` and `search` only reach the JSON endpoints.
    #[instrument(skip_all, fields(operation = "get_products", request_id = %RequestId::new_random()))]
    pub async fn get_products(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Product>> {
        let mut request = Self::list_request(query).query_param("page", query.page.to_string());
        if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
            request = request.query_param("search", term);
        }
        self.fetch_list(Operation::GetProducts, request, cancel).await
    }

    /// Creates one product, trying the JSON endpoints first.
    #[instrument(skip_all, fields(operation = "add_product", request_id = %RequestId::new_random(), code = %product.code))]
    pub async fn add_product(
        &self,
        product: &NewProduct,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Product> {
        let request = OperationRequest::new()
            .json_body(product_create_body(product))
            .form_field("data", legacy_product_rows(product));
        self.fetch_one(Operation::AddProduct, request, cancel).await
    }

    /// Creates products one after another.
    ///
    /// The envelope is always successful; per-product failures are listed in
    /// [`BatchOutcome::failed`].
    #[instrument(skip_all, fields(operation = "create_products", request_id = %RequestId::new_random(), count = products.len()))]
    pub async fn create_products(
        &self,
        products: Vec<NewProduct>,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for product in products {
            let result = self.add_product(&product, cancel).await;
            if result.is_success() {
                outcome.created.push(result.into_data().unwrap_or_default());
            } else {
                outcome.failed.push(FailedProduct {
                    code: product.code.clone(),
                    messages: result.messages().to_vec(),
                });
            }
        }
        info!(
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            "product batch finished"
        );
        ResultEnvelope::success(outcome)
    }

    /// Images of one product.
    #[instrument(skip_all, fields(operation = "get_product_images", request_id = %RequestId::new_random(), code = %code))]
    pub async fn get_product_images(
        &self,
        code: &ProductCode,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<ProductImage>> {
        let request = OperationRequest::new().field("ProductCode", code.as_str());
        self.fetch_list(Operation::GetProductImages, request, cancel)
            .await
    }

    /// Images for many products with at most `max_parallel` requests in
    /// flight. Products whose fetch failed are absent from the map.
    #[instrument(skip_all, fields(operation = "get_bulk_product_images", request_id = %RequestId::new_random(), count = codes.len(), max_parallel = max_parallel))]
    pub async fn get_bulk_product_images(
        &self,
        codes: Vec<ProductCode>,
        max_parallel: usize,
        cancel: &CancellationToken,
    ) -> HashMap<ProductCode, Vec<ProductImage>> {
        let requested = codes.len();
        let client = self.clone();
        let images = fetch_bulk(codes, max_parallel, cancel, move |code, cancel| {
            let client = client.clone();
            async move { client.get_product_images(&code, &cancel).await }
        })
        .await;
        info!(requested, resolved = images.len(), "bulk image fetch finished");
        images
    }

    /// Products with category name/path joined and, on the first page, the
    /// primary image of the leading products.
    #[instrument(skip_all, fields(operation = "get_enhanced_products", request_id = %RequestId::new_random(), page = query.page, include_images = include_images))]
    pub async fn get_enhanced_products(
        &self,
        query: &ListQuery,
        include_images: bool,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Product>> {
        let (listing, tree) = tokio::join!(
            self.get_products(query, cancel),
            self.get_category_tree(cancel)
        );

        if !listing.is_success() || listing.data().is_none() {
            return listing;
        }
        let mut products = listing.into_data().unwrap_or_default();

        match tree.into_data() {
            Some(forest) => apply_categories(&mut products, &forest),
            None => warn!("category tree unavailable; products left without category info"),
        }

        if include_images && query.is_first_page() && !products.is_empty() {
            let keys = image_keys(&products);
            info!(count = keys.len(), "fetching product images");
            let images = self
                .get_bulk_product_images(keys, IMAGE_FETCH_CONCURRENCY, cancel)
                .await;
            apply_images(&mut products, &images);
        }

        ResultEnvelope::success(products)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    #[instrument(skip_all, fields(operation = "get_categories", request_id = %RequestId::new_random()))]
    pub async fn get_categories(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Category>> {
        self.fetch_list(Operation::GetCategories, Self::list_request(query), cancel)
            .await
    }

    /// The category forest with breadcrumb paths.
    ///
    /// Uses the dedicated tree endpoint when it yields a forest; otherwise
    /// builds the forest from the complete flat listing.
    #[instrument(skip_all, fields(operation = "get_category_tree", request_id = %RequestId::new_random()))]
    pub async fn get_category_tree(
        &self,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Category>> {
        let direct: ResultEnvelope<Vec<Category>> = self
            .fetch_list(Operation::GetCategoryTree, OperationRequest::new(), cancel)
            .await;

        let mut forest = match direct.into_data() {
            Some(forest) => forest,
            None => {
                if cancel.is_cancelled() {
                    return ClientError::cancelled(Operation::GetCategoryTree.as_str()).into();
                }
                info!("category tree endpoint unavailable; building from flat list");
                let flat: ResultEnvelope<Vec<Category>> = self
                    .fetch_list(Operation::GetCategories, OperationRequest::new(), cancel)
                    .await;
                match flat.into_data() {
                    Some(flat) => build_forest(flat),
                    None => {
                        return ClientError::exhausted(Operation::GetCategoryTree.as_str()).into()
                    }
                }
            }
        };

        label_paths(&mut forest);
        info!(
            roots = forest.len(),
            nodes = count_nodes(&forest),
            "category tree ready"
        );
        ResultEnvelope::success(forest)
    }

    // -----------------------------------------------------------------------
    // Customers
    // -----------------------------------------------------------------------

    #[instrument(skip_all, fields(operation = "get_customers", request_id = %RequestId::new_random()))]
    pub async fn get_customers(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Customer>> {
        self.fetch_list(Operation::GetCustomers, Self::list_request(query), cancel)
            .await
    }

    #[instrument(skip_all, fields(operation = "get_customer_by_id", request_id = %RequestId::new_random(), customer_id = %customer_id))]
    pub async fn get_customer_by_id(
        &self,
        customer_id: CustomerId,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Customer> {
        let id = customer_id.to_string();
        let request = OperationRequest::new()
            .form_field("CustomerId", id.as_str())
            .form_field("customerId", id.as_str())
            .form_field("Id", id.as_str())
            .path_param("customerId", id);
        self.fetch_one(Operation::GetCustomerById, request, cancel)
            .await
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    #[instrument(skip_all, fields(operation = "get_orders", request_id = %RequestId::new_random()))]
    pub async fn get_orders(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<Order>> {
        self.fetch_list(Operation::GetOrders, Self::list_request(query), cancel)
            .await
    }

    /// Lines of one order. The backend requires a dedicated token permission
    /// for this module; without it every candidate fails.
    #[instrument(skip_all, fields(operation = "get_order_details", request_id = %RequestId::new_random(), order_id = %order_id))]
    pub async fn get_order_details(
        &self,
        order_id: OrderId,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<OrderDetail>> {
        let id = order_id.to_string();
        let request = OperationRequest::new()
            .form_field("OrderId", id.as_str())
            .form_field("orderId", id.as_str())
            .path_param("orderId", id);
        self.fetch_list(Operation::GetOrderDetails, request, cancel)
            .await
    }

    #[instrument(skip_all, fields(operation = "get_payment_types", request_id = %RequestId::new_random()))]
    pub async fn get_payment_types(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<PaymentType>> {
        self.fetch_list(Operation::GetPaymentTypes, Self::list_request(query), cancel)
            .await
    }

    #[instrument(skip_all, fields(operation = "get_cargo_companies", request_id = %RequestId::new_random()))]
    pub async fn get_cargo_companies(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<CargoCompany>> {
        self.fetch_list(Operation::GetCargoCompanies, Self::list_request(query), cancel)
            .await
    }

    #[instrument(skip_all, fields(operation = "get_order_statuses", request_id = %RequestId::new_random()))]
    pub async fn get_order_statuses(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<Vec<OrderStatusInfo>> {
        self.fetch_list(Operation::GetOrderStatuses, Self::list_request(query), cancel)
            .await
    }
}

// ---------------------------------------------------------------------------
// Product creation payloads
// ---------------------------------------------------------------------------

/// Numeric id of a category code such as `"T12"`.
fn category_id(code: &str) -> i64 {
    code.trim()
        .trim_start_matches(|c| c == 'T' || c == 't')
        .parse()
        .unwrap_or(DEFAULT_CATEGORY_ID)
}

/// JSON body for the current-generation create endpoint.
fn product_create_body(product: &NewProduct) -> Value {
    let vat = product
        .extra_fields
        .get("Vat")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_VAT);
    json!({
        "name": product.name,
        "wsProductCode": product.code,
        "priceSale": product.price,
        "stock": product.stock,
        "vat": vat,
        "visibility": true,
        "relation_hierarchy": [
            { "id": category_id(product.category_code.as_str()), "type": "category" }
        ],
    })
}

/// The legacy `data` field: a JSON array holding one product row.
fn legacy_product_rows(product: &NewProduct) -> String {
    let mut row: BTreeMap<String, String> = BTreeMap::from([
        ("ProductCode".to_string(), product.code.clone()),
        ("ProductName".to_string(), product.name.clone()),
        ("DefaultCategoryCode".to_string(), product.category_code.to_string()),
        ("SellingPrice".to_string(), format!("{:.2}", product.price)),
        ("Stock".to_string(), product.stock.to_string()),
        ("IsActive".to_string(), "1".to_string()),
    ]);
    row.extend(product.extra_fields.clone());

    let object: Map<String, Value> = row.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    Value::Array(vec![Value::Object(object)]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::CategoryCode;

    fn new_product() -> NewProduct {
        NewProduct {
            code: "SKU-1".to_string(),
            name: "Kettle".to_string(),
            category_code: CategoryCode::new("T12").unwrap(),
            price: 249.5,
            stock: 3,
            extra_fields: BTreeMap::from([("Brand".to_string(), "Acme".to_string())]),
        }
    }

    #[test]
    fn test_category_id_parses_prefixed_codes() {
        assert_eq!(category_id("T12"), 12);
        assert_eq!(category_id("t7"), 7);
        assert_eq!(category_id("misc"), DEFAULT_CATEGORY_ID);
    }

    #[test]
    fn test_create_body_uses_camel_case_and_defaults() {
        let body = product_create_body(&new_product());
        assert_eq!(body["wsProductCode"], "SKU-1");
        assert_eq!(body["priceSale"], 249.5);
        assert_eq!(body["vat"], DEFAULT_VAT);
        assert_eq!(body["relation_hierarchy"][0]["id"], 12);
    }

    #[test]
    fn test_legacy_rows_carry_extra_fields() {
        let rows: Value = serde_json::from_str(&legacy_product_rows(&new_product())).unwrap();
        assert_eq!(rows[0]["SellingPrice"], "249.50");
        assert_eq!(rows[0]["Brand"], "Acme");
        assert_eq!(rows[0]["IsActive"], "1");
    }
}
