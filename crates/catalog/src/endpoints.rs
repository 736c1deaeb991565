//! Static endpoint cascades, one per logical operation.
//!
//! The backend exposes two protocol generations under inconsistent paths. For
//! each [`Operation`] the candidates are listed in the order they are tried;
//! the order reflects which endpoints are known to be most reliable and is
//! significant. The tables are `'static` and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which endpoint generation a candidate speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Legacy family: form-encoded POST, credential injected into the form.
    FormEncoded,
    /// Current family: GET with query parameters or POST with a JSON body.
    Json,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormEncoded => f.write_str("form"),
            Self::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// One (protocol, method, path) the resolver may attempt.
///
/// `path` may contain `{name}` placeholders, filled from the request's path
/// parameters by [`EndpointCandidate::render_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EndpointCandidate {
    pub protocol: Protocol,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl EndpointCandidate {
    /// A legacy form-encoded POST candidate.
    pub const fn form(path: &'static str) -> Self {
        Self {
            protocol: Protocol::FormEncoded,
            method: HttpMethod::Post,
            path,
        }
    }

    /// A JSON GET candidate.
    pub const fn json_get(path: &'static str) -> Self {
        Self {
            protocol: Protocol::Json,
            method: HttpMethod::Get,
            path,
        }
    }

    /// A JSON POST candidate.
    pub const fn json_post(path: &'static str) -> Self {
        Self {
            protocol: Protocol::Json,
            method: HttpMethod::Post,
            path,
        }
    }

    /// Substitutes `{name}` placeholders using `lookup`.
    ///
    /// Returns `None` if a placeholder has no value or a brace is unbalanced.
    pub fn render_path<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> Option<String> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}')?;
            out.push_str(lookup(&after[..close])?);
            rest = &after[close + 1..];
        }
        if rest.contains('}') {
            return None;
        }
        out.push_str(rest);
        Some(out)
    }
}

impl fmt::Display for EndpointCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.protocol, self.method, self.path)
    }
}

// ---------------------------------------------------------------------------
// Cascade tables
// ---------------------------------------------------------------------------

use EndpointCandidate as C;

const GET_PRODUCTS: &[EndpointCandidate] = &[
    C::form("/product/getProducts"),
    C::form("/product/get"),
    C::form("/products/get"),
    C::json_get("/catalog/products"),
    C::json_get("/api/v3/catalog/products"),
];

// Creation is only known to work on the current generation, so it leads here.
const ADD_PRODUCT: &[EndpointCandidate] = &[
    C::json_post("/catalog/products"),
    C::json_post("/api/v3/catalog/products"),
    C::form("/product/createProducts"),
    C::form("/product/create"),
    C::form("/product/add"),
];

const GET_CATEGORIES: &[EndpointCandidate] = &[
    C::form("/category/getCategories"),
    C::form("/category/get"),
    C::form("/categories/get"),
    C::json_get("/catalog/categories"),
    C::json_get("/api/v3/catalog/categories"),
];

const GET_CATEGORY_TREE: &[EndpointCandidate] = &[C::form("/category/getCategoryTree")];

const GET_CUSTOMERS: &[EndpointCandidate] = &[
    C::form("/customer/getCustomers"),
    C::form("/customer/get"),
    C::form("/customers/get"),
    C::json_get("/customers"),
    C::json_get("/api/v3/customers"),
];

const GET_CUSTOMER_BY_ID: &[EndpointCandidate] = &[
    C::form("/customer/getCustomerById"),
    C::form("/customer/get"),
    C::form("/customers/get"),
    C::json_get("/customers/{customerId}"),
    C::json_get("/api/v3/customers/{customerId}"),
];

const GET_ORDERS: &[EndpointCandidate] = &[
    C::form("/order/getOrders"),
    C::form("/order/get"),
    C::form("/orders/get"),
    C::json_get("/orders"),
    C::json_get("/api/v3/orders"),
];

const GET_ORDER_DETAILS: &[EndpointCandidate] = &[
    C::form("/order/getOrderDetailsByOrderId"),
    C::form("/order/getOrderDetails"),
    C::form("/order/details"),
    C::form("/orders/details"),
    C::json_get("/orders/{orderId}/details"),
    C::json_get("/api/v3/orders/{orderId}/details"),
];

const GET_PAYMENT_TYPES: &[EndpointCandidate] = &[
    C::form("/order/getPaymentTypeList"),
    C::form("/payment/getTypes"),
    C::form("/paymenttype/get"),
    C::json_get("/payment-types"),
    C::json_get("/api/v3/payment-types"),
];

const GET_CARGO_COMPANIES: &[EndpointCandidate] = &[
    C::form("/order/getCargoCompanyList"),
    C::form("/cargo/getCompanies"),
    C::form("/cargocompany/get"),
    C::json_get("/cargo-companies"),
    C::json_get("/api/v3/cargo-companies"),
];

const GET_ORDER_STATUSES: &[EndpointCandidate] = &[
    C::form("/order/getOrderStatusList"),
    C::form("/orderstatus/get"),
    C::form("/order/statuses"),
    C::json_get("/order-statuses"),
    C::json_get("/api/v3/order-statuses"),
];

const GET_PRODUCT_IMAGES: &[EndpointCandidate] = &[C::form("/product/getProductImages")];

/// Every logical operation the client performs against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetProducts,
    AddProduct,
    GetCategories,
    GetCategoryTree,
    GetCustomers,
    GetCustomerById,
    GetOrders,
    GetOrderDetails,
    GetPaymentTypes,
    GetCargoCompanies,
    GetOrderStatuses,
    GetProductImages,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Self::GetProducts,
        Self::AddProduct,
        Self::GetCategories,
        Self::GetCategoryTree,
        Self::GetCustomers,
        Self::GetCustomerById,
        Self::GetOrders,
        Self::GetOrderDetails,
        Self::GetPaymentTypes,
        Self::GetCargoCompanies,
        Self::GetOrderStatuses,
        Self::GetProductImages,
    ];

    /// Name used in log fields and exhaustion messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetProducts => "get_products",
            Self::AddProduct => "add_product",
            Self::GetCategories => "get_categories",
            Self::GetCategoryTree => "get_category_tree",
            Self::GetCustomers => "get_customers",
            Self::GetCustomerById => "get_customer_by_id",
            Self::GetOrders => "get_orders",
            Self::GetOrderDetails => "get_order_details",
            Self::GetPaymentTypes => "get_payment_types",
            Self::GetCargoCompanies => "get_cargo_companies",
            Self::GetOrderStatuses => "get_order_statuses",
            Self::GetProductImages => "get_product_images",
        }
    }

    /// The ordered cascade for this operation.
    pub fn candidates(self) -> &'static [EndpointCandidate] {
        match self {
            Self::GetProducts => GET_PRODUCTS,
            Self::AddProduct => ADD_PRODUCT,
            Self::GetCategories => GET_CATEGORIES,
            Self::GetCategoryTree => GET_CATEGORY_TREE,
            Self::GetCustomers => GET_CUSTOMERS,
            Self::GetCustomerById => GET_CUSTOMER_BY_ID,
            Self::GetOrders => GET_ORDERS,
            Self::GetOrderDetails => GET_ORDER_DETAILS,
            Self::GetPaymentTypes => GET_PAYMENT_TYPES,
            Self::GetCargoCompanies => GET_CARGO_COMPANIES,
            Self::GetOrderStatuses => GET_ORDER_STATUSES,
            Self::GetProductImages => GET_PRODUCT_IMAGES,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
