//! Business objects returned by the catalog backend.
//!
//! Every scalar is an `Option<`[`Text`]`>`: the backend omits fields freely
//! and reports numbers as strings or numbers depending on the endpoint. Each
//! field deserializes from the compact fold of its upstream name (`productcode`
//! for `ProductCode`, see [`crate::normalize::fold_key`]); serialization uses
//! camelCase for downstream consumers.
//!
//! Several objects carry alternate spellings of the same field (`Name` and
//! `OrderStatusName`, `ImageUrl` and `Image`) because different endpoints fill
//! different ones. Accessor methods resolve them in a fixed order.

use serde::{Deserialize, Deserializer, Serialize};

use crate::identifiers::CategoryCode;
use crate::types::Text;

/// First non-blank value among `candidates`.
fn first_filled<'a>(candidates: &[&'a Option<Text>]) -> Option<&'a Text> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_ref)
        .find(|t| !t.is_blank())
}

/// Reads an explicit `null` list as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Macro for flat records whose fields are all optional scalars, each paired
// with its folded wire name.
// ---------------------------------------------------------------------------
macro_rules! wire_record {
    (
        $(#[$attr:meta])*
        $name:ident { $($(#[$fattr:meta])* $field:ident = $wire:literal),* $(,)? }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all(serialize = "camelCase"))]
        pub struct $name {
            $(
                $(#[$fattr])*
                #[serde(
                    default,
                    rename(deserialize = $wire),
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<Text>,
            )*
        }
    };
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A product as listed by the catalog endpoints.
///
/// The trailing fields (`category_name` through `thumbnail_url`) are filled by
/// [`crate::CatalogClient::get_enhanced_products`]; plain listings leave them
/// empty unless the backend happens to send them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Product {
    #[serde(default, rename(deserialize = "productcode"), skip_serializing_if = "Option::is_none")]
    pub product_code: Option<Text>,
    #[serde(default, rename(deserialize = "productname"), skip_serializing_if = "Option::is_none")]
    pub product_name: Option<Text>,
    #[serde(
        default,
        rename(deserialize = "defaultcategorycode"),
        skip_serializing_if = "Option::is_none"
    )]
    pub default_category_code: Option<Text>,
    #[serde(default, rename(deserialize = "stock"), skip_serializing_if = "Option::is_none")]
    pub stock: Option<Text>,
    #[serde(default, rename(deserialize = "sellingprice"), skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Text>,
    #[serde(default, rename(deserialize = "price"), skip_serializing_if = "Option::is_none")]
    pub price: Option<Text>,
    #[serde(default, rename(deserialize = "buyingprice"), skip_serializing_if = "Option::is_none")]
    pub buying_price: Option<Text>,
    #[serde(default, rename(deserialize = "isactive"), skip_serializing_if = "Option::is_none")]
    pub is_active: Option<Text>,
    #[serde(default, rename(deserialize = "stockunit"), skip_serializing_if = "Option::is_none")]
    pub stock_unit: Option<Text>,
    #[serde(default, rename(deserialize = "brand"), skip_serializing_if = "Option::is_none")]
    pub brand: Option<Text>,
    #[serde(default, rename(deserialize = "vat"), skip_serializing_if = "Option::is_none")]
    pub vat: Option<Text>,
    #[serde(default, rename(deserialize = "currency"), skip_serializing_if = "Option::is_none")]
    pub currency: Option<Text>,
    #[serde(
        default,
        rename(deserialize = "shortdescription"),
        skip_serializing_if = "Option::is_none"
    )]
    pub short_description: Option<Text>,

    #[serde(

        default,

        rename(deserialize = "categoryname"),

        skip_serializing_if = "Option::is_none"

    )]
    pub category_name: Option<Text>,
    #[serde(default, rename(deserialize = "categorypath"), skip_serializing_if = "Option::is_none")]
    pub category_path: Option<Vec<String>>,
    #[serde(default, rename(deserialize = "images"), skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImage>>,
    #[serde(default, rename(deserialize = "imageurl"), skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Text>,
    #[serde(default, rename(deserialize = "thumbnailurl"), skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<Text>,
}

impl Product {
    /// The product code, if present and non-blank.
    pub fn code(&self) -> Option<&str> {
        first_filled(&[&self.product_code]).map(Text::as_str)
    }

    /// Unit price: `selling_price`, else `price`.
    pub fn unit_price(&self) -> Option<f64> {
        first_filled(&[&self.selling_price, &self.price]).and_then(Text::as_f64)
    }
}

/// A category node.
///
/// Flat listings leave `children` empty and identify the parent through
/// `parent_category_code`; the tree endpoint nests `children` directly.
/// `path` is never read from the wire: it stays `None` until
/// [`crate::category_tree::label_paths`] runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Category {
    #[serde(default, rename(deserialize = "categorycode"), skip_serializing_if = "Option::is_none")]
    pub category_code: Option<Text>,
    #[serde(default, rename(deserialize = "categoryname"), skip_serializing_if = "Option::is_none")]
    pub category_name: Option<Text>,
    #[serde(
        default,
        rename(deserialize = "parentcategorycode"),
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_category_code: Option<Text>,
    #[serde(default, rename(deserialize = "isactive"), skip_serializing_if = "Option::is_none")]
    pub is_active: Option<Text>,
    #[serde(
        default,
        rename(deserialize = "children"),
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Category>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Category {
    /// The category code, if present and non-blank.
    pub fn code(&self) -> Option<&str> {
        first_filled(&[&self.category_code]).map(Text::as_str)
    }

    /// The parent code, if present and non-blank.
    pub fn parent_code(&self) -> Option<&str> {
        first_filled(&[&self.parent_category_code]).map(Text::as_str)
    }

    /// Name shown in breadcrumbs: the name, else the code.
    pub fn display_name(&self) -> Option<&str> {
        first_filled(&[&self.category_name, &self.category_code]).map(Text::as_str)
    }
}

wire_record! {
    /// A product image. Keyed to its product by code, not by reference.
    ProductImage {
        id = "id",
        image_url = "imageurl",
        image = "image",
        thumbnail_url = "thumbnailurl",
        thumbnail = "thumbnail",
        is_primary = "isprimary",
        is_main = "ismain",
    }
}

impl ProductImage {
    /// Full-size image URL: `image_url`, else `image`.
    pub fn url(&self) -> Option<&Text> {
        first_filled(&[&self.image_url, &self.image])
    }

    /// Thumbnail URL: `thumbnail_url`, else `thumbnail`, else the full-size URL.
    pub fn thumbnail(&self) -> Option<&Text> {
        first_filled(&[&self.thumbnail_url, &self.thumbnail, &self.image_url])
    }

    /// `true` if either primary flag is set.
    pub fn is_primary_image(&self) -> bool {
        [&self.is_primary, &self.is_main]
            .iter()
            .any(|flag| flag.as_ref().is_some_and(Text::is_truthy))
    }
}

/// Input of [`crate::CatalogClient::add_product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category_code: CategoryCode,
    pub price: f64,
    pub stock: i64,
    /// Extra legacy fields (`Brand`, `Vat`, `Currency`, …) passed through
    /// verbatim on the form-encoded endpoints.
    #[serde(default)]
    pub extra_fields: std::collections::BTreeMap<String, String>,
}

/// Outcome of [`crate::CatalogClient::create_products`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub created: Vec<Product>,
    pub failed: Vec<FailedProduct>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One product that could not be created, with the upstream messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedProduct {
    pub code: String,
    pub messages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

wire_record! {
    Customer {
        customer_id = "customerid",
        customer_code = "customercode",
        customer_name = "customername",
        email = "email",
        phone = "phone",
        is_active = "isactive",
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// An order header.
///
/// The backend has shipped several naming generations for the same facts
/// (`OrderTotalPrice` / `Total` / `TotalAmount`, `PaymentType` /
/// `PaymentTypeName`, …); all of them are kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"), default)]
pub struct Order {
    // Identity and status
    #[serde(rename(deserialize = "id"))]
    pub id: Option<Text>,
    #[serde(rename(deserialize = "orderid"))]
    pub order_id: Option<Text>,
    #[serde(rename(deserialize = "ordercode"))]
    pub order_code: Option<Text>,
    #[serde(rename(deserialize = "status"))]
    pub status: Option<Text>,
    #[serde(rename(deserialize = "orderstatus"))]
    pub order_status: Option<Text>,
    #[serde(rename(deserialize = "orderstatusid"))]
    pub order_status_id: Option<Text>,
    #[serde(rename(deserialize = "supplystatus"))]
    pub supply_status: Option<Text>,

    // Customer
    #[serde(rename(deserialize = "customerid"))]
    pub customer_id: Option<Text>,
    #[serde(rename(deserialize = "customercode"))]
    pub customer_code: Option<Text>,
    #[serde(rename(deserialize = "customername"))]
    pub customer_name: Option<Text>,
    #[serde(rename(deserialize = "customerusername"))]
    pub customer_username: Option<Text>,
    #[serde(rename(deserialize = "customeremail"))]
    pub customer_email: Option<Text>,
    #[serde(rename(deserialize = "customerphone"))]
    pub customer_phone: Option<Text>,
    #[serde(rename(deserialize = "customergroupid"))]
    pub customer_group_id: Option<Text>,

    // Dates
    #[serde(rename(deserialize = "orderdate"))]
    pub order_date: Option<Text>,
    #[serde(rename(deserialize = "orderdatetimestamp"))]
    pub order_date_time_stamp: Option<Text>,
    #[serde(rename(deserialize = "createddate"))]
    pub created_date: Option<Text>,
    #[serde(rename(deserialize = "datecreated"))]
    pub date_created: Option<Text>,
    #[serde(rename(deserialize = "updatedate"))]
    pub update_date: Option<Text>,
    #[serde(rename(deserialize = "updatedatetimestamp"))]
    pub update_date_time_stamp: Option<Text>,
    #[serde(rename(deserialize = "approvaltime"))]
    pub approval_time: Option<Text>,

    // Location
    #[serde(rename(deserialize = "city"))]
    pub city: Option<Text>,
    #[serde(rename(deserialize = "shippingcity"))]
    pub shipping_city: Option<Text>,
    #[serde(rename(deserialize = "shippingaddress"))]
    pub shipping_address: Option<Text>,
    #[serde(rename(deserialize = "billingcity"))]
    pub billing_city: Option<Text>,

    // Amounts
    #[serde(rename(deserialize = "total"))]
    pub total: Option<Text>,
    #[serde(rename(deserialize = "totalamount"))]
    pub total_amount: Option<Text>,
    #[serde(rename(deserialize = "ordertotalprice"))]
    pub order_total_price: Option<Text>,
    #[serde(rename(deserialize = "ordersubtotal"))]
    pub order_subtotal: Option<Text>,
    #[serde(rename(deserialize = "generaltotal"))]
    pub general_total: Option<Text>,
    #[serde(rename(deserialize = "subtotal"))]
    pub sub_total: Option<Text>,
    #[serde(rename(deserialize = "discounttotal"))]
    pub discount_total: Option<Text>,
    #[serde(rename(deserialize = "taxtotal"))]
    pub tax_total: Option<Text>,
    #[serde(rename(deserialize = "shippingtotal"))]
    pub shipping_total: Option<Text>,
    #[serde(rename(deserialize = "currency"))]
    pub currency: Option<Text>,
    #[serde(rename(deserialize = "sitedefaultcurrency"))]
    pub site_default_currency: Option<Text>,
    #[serde(rename(deserialize = "exchangerate"))]
    pub exchange_rate: Option<Text>,
    #[serde(rename(deserialize = "installment"))]
    pub installment: Option<Text>,

    // Payment
    #[serde(rename(deserialize = "paymenttypeid"))]
    pub payment_type_id: Option<Text>,
    #[serde(rename(deserialize = "paymenttype"))]
    pub payment_type: Option<Text>,
    #[serde(rename(deserialize = "paymenttypename"))]
    pub payment_type_name: Option<Text>,
    #[serde(rename(deserialize = "subpaymenttypeid"))]
    pub sub_payment_type_id: Option<Text>,
    #[serde(rename(deserialize = "paymentsubmethod"))]
    pub payment_sub_method: Option<Text>,
    #[serde(rename(deserialize = "paymentbankname"))]
    pub payment_bank_name: Option<Text>,
    #[serde(rename(deserialize = "bank"))]
    pub bank: Option<Text>,
    #[serde(rename(deserialize = "paymentinfo"))]
    pub payment_info: Option<Text>,

    // Shipping
    #[serde(rename(deserialize = "cargoid"))]
    pub cargo_id: Option<Text>,
    #[serde(rename(deserialize = "cargocode"))]
    pub cargo_code: Option<Text>,
    #[serde(rename(deserialize = "cargo"))]
    pub cargo: Option<Text>,
    #[serde(rename(deserialize = "cargocompanyid"))]
    pub cargo_company_id: Option<Text>,
    #[serde(rename(deserialize = "cargocompanyname"))]
    pub cargo_company_name: Option<Text>,
    #[serde(rename(deserialize = "shippingcompanyname"))]
    pub shipping_company_name: Option<Text>,
    #[serde(rename(deserialize = "cargotrackingcode"))]
    pub cargo_tracking_code: Option<Text>,
    #[serde(rename(deserialize = "cargopaymentmethod"))]
    pub cargo_payment_method: Option<Text>,
    #[serde(rename(deserialize = "cargochargewithvat"))]
    pub cargo_charge_with_vat: Option<Text>,
    #[serde(rename(deserialize = "cargochargewithoutvat"))]
    pub cargo_charge_without_vat: Option<Text>,

    // Misc
    #[serde(rename(deserialize = "application"))]
    pub application: Option<Text>,
    #[serde(rename(deserialize = "language"))]
    pub language: Option<Text>,
    #[serde(rename(deserialize = "istransferred"))]
    pub is_transferred: Option<Text>,
    #[serde(rename(deserialize = "nonmembershopping"))]
    pub non_member_shopping: Option<Text>,
    #[serde(rename(deserialize = "waybillnumber"))]
    pub waybill_number: Option<Text>,
    #[serde(rename(deserialize = "invoicenumber"))]
    pub invoice_number: Option<Text>,

    // Lines
    #[serde(rename(deserialize = "itemcount"))]
    pub item_count: Option<Text>,
    #[serde(rename(deserialize = "orderdetails"))]
    pub order_details: Option<Vec<OrderDetail>>,
    #[serde(rename(deserialize = "items"))]
    pub items: Option<Vec<OrderDetail>>,
}

impl Order {
    /// Order total: `order_total_price`, else `total`, else `total_amount`.
    pub fn total_value(&self) -> Option<f64> {
        first_filled(&[&self.order_total_price, &self.total, &self.total_amount])
            .and_then(Text::as_f64)
    }
}

wire_record! {
    /// One order line.
    OrderDetail {
        id = "id",
        order_id = "orderid",
        product_id = "productid",
        product_code = "productcode",
        product_name = "productname",
        quantity = "quantity",
        price = "price",
        total = "total",
        city = "city",
        shipping_city = "shippingcity",
        supply_status = "supplystatus",
    }
}

wire_record! {
    OrderStatusInfo {
        id = "id",
        order_status_id = "orderstatusid",
        name = "name",
        order_status_name = "orderstatusname",
        code = "code",
    }
}

impl OrderStatusInfo {
    pub fn display_name(&self) -> Option<&str> {
        first_filled(&[&self.name, &self.order_status_name]).map(Text::as_str)
    }
}

wire_record! {
    PaymentType {
        id = "id",
        payment_type_id = "paymenttypeid",
        name = "name",
        payment_type_name = "paymenttypename",
        code = "code",
    }
}

impl PaymentType {
    pub fn display_name(&self) -> Option<&str> {
        first_filled(&[&self.name, &self.payment_type_name]).map(Text::as_str)
    }
}

wire_record! {
    CargoCompany {
        id = "id",
        cargo_company_id = "cargocompanyid",
        name = "name",
        cargo_company_name = "cargocompanyname",
        code = "code",
    }
}

impl CargoCompany {
    pub fn display_name(&self) -> Option<&str> {
        first_filled(&[&self.name, &self.cargo_company_name]).map(Text::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, normalize_list};

    #[test]
    fn test_product_reads_pascal_and_numeric_fields() {
        let env = normalize::<Vec<Product>>(
            r#"[{"ProductCode":"P1","SellingPrice":19.9,"Stock":"4","DefaultCategoryCode":"T2"}]"#,
        );
        let product = &env.data().unwrap()[0];
        assert_eq!(product.code(), Some("P1"));
        assert_eq!(product.unit_price(), Some(19.9));
        assert_eq!(product.stock.as_ref().unwrap().as_str(), "4");
    }

    #[test]
    fn test_category_path_is_never_read_from_the_wire() {
        let env = normalize::<Category>(
            r#"{"categoryCode":"T1","categoryName":"Phones","path":"bogus"}"#,
        );
        let category = env.into_data().unwrap();
        assert_eq!(category.display_name(), Some("Phones"));
        assert!(category.path.is_none());
    }

    #[test]
    fn test_product_fields_match_any_key_casing() {
        let env = normalize::<Vec<Product>>(
            r#"[{"PRODUCTCODE":"P1"},{"productcode":"P2"},{"Productcode":"P3"},{"product_code":"P4"}]"#,
        );
        let codes: Vec<_> = env.data().unwrap().iter().map(Product::code).collect();
        assert_eq!(codes, [Some("P1"), Some("P2"), Some("P3"), Some("P4")]);
    }

    #[test]
    fn test_null_children_read_as_leaf() {
        let env = normalize_list::<Category>(
            r#"{"success":true,"data":[{"CategoryCode":"T1","CategoryName":"Phones","Children":null}]}"#,
        );
        assert!(env.is_success());
        let categories = env.into_data().unwrap();
        assert_eq!(categories.len(), 1);
        assert!(categories[0].children.is_empty());
    }

    #[test]
    fn test_lookup_names_fall_back_to_long_spelling() {
        let status = normalize::<OrderStatusInfo>(r#"{"OrderStatusName":"Shipped"}"#);
        let payment = normalize::<PaymentType>(r#"{"Name":"Card","PaymentTypeName":"Kart"}"#);
        let cargo = normalize::<CargoCompany>(r#"{"Name":" ","CargoCompanyName":"Aras"}"#);
        assert_eq!(status.into_data().unwrap().display_name(), Some("Shipped"));
        assert_eq!(payment.into_data().unwrap().display_name(), Some("Card"));
        assert_eq!(cargo.into_data().unwrap().display_name(), Some("Aras"));
    }

    #[test]
    fn test_image_primary_flag_spellings() {
        let main = ProductImage {
            is_main: Some(Text::from("True")),
            ..ProductImage::default()
        };
        let primary = ProductImage {
            is_primary: Some(Text::from("1")),
            ..ProductImage::default()
        };
        let plain = ProductImage {
            is_primary: Some(Text::from("0")),
            ..ProductImage::default()
        };
        assert!(main.is_primary_image());
        assert!(primary.is_primary_image());
        assert!(!plain.is_primary_image());
    }

    #[test]
    fn test_image_thumbnail_falls_back_to_full_size() {
        let image = ProductImage {
            image_url: Some(Text::from("https://cdn/a.jpg")),
            ..ProductImage::default()
        };
        assert_eq!(image.thumbnail().unwrap().as_str(), "https://cdn/a.jpg");
        assert_eq!(image.url().unwrap().as_str(), "https://cdn/a.jpg");
    }

    #[test]
    fn test_order_total_prefers_order_total_price() {
        let env = normalize::<Order>(r#"{"OrderTotalPrice":"150.25","Total":"99"}"#);
        assert_eq!(env.into_data().unwrap().total_value(), Some(150.25));
    }

    #[test]
    fn test_records_serialize_camel_case_without_nulls() {
        let status = OrderStatusInfo {
            order_status_id: Some(Text::from("3")),
            ..OrderStatusInfo::default()
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"orderStatusId":"3"}"#
        );
    }
}
