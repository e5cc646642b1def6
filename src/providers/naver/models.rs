//! Commerce API Response Models
//!
//! Known keys are typed; everything else the API returns is kept in the
//! flattened `extra` bag so newer vendor fields survive a round trip.
//!
//! Records are read leniently: a known key whose value has an unexpected
//! type reads as `None` and stays in `extra` untouched. Only presence is
//! checked, so one odd record never fails a whole page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Products
// ============================================================================

/// Product as returned by the list and detail endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `GET /v1/products`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    /// `None` when the key is absent (end of data or malformed response)
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Orders
// ============================================================================

/// Order as returned by the list and detail endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `GET /v1/orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Option<Vec<Order>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Inventory / Seller / Acknowledgements
// ============================================================================

/// Stock information for one product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Inventory {
    /// Whole-number stock level (`3` and `3.0` both read as 3)
    pub quantity: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of an update call. An empty response body decodes to
/// `success: Some(true)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Seller / store information (no fields are relied upon)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerInfo {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

// ============================================================================
// OAuth2
// ============================================================================

/// Body of a successful `POST /v1/oauth2/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ============================================================================
// Lenient Conversions
// ============================================================================

impl From<Map<String, Value>> for Product {
    fn from(mut fields: Map<String, Value>) -> Self {
        Product {
            product_id: take(&mut fields, "productId", id_value),
            product_name: take(&mut fields, "productName", text_value),
            extra: fields,
        }
    }
}

impl From<Map<String, Value>> for Order {
    fn from(mut fields: Map<String, Value>) -> Self {
        Order {
            order_id: take(&mut fields, "orderId", id_value),
            order_status: take(&mut fields, "orderStatus", text_value),
            extra: fields,
        }
    }
}

impl From<Map<String, Value>> for Inventory {
    fn from(mut fields: Map<String, Value>) -> Self {
        Inventory {
            quantity: take(&mut fields, "quantity", whole_number),
            extra: fields,
        }
    }
}

/// Remove `key` from the bag if `convert` accepts its value.
fn take<T>(
    fields: &mut Map<String, Value>,
    key: &str,
    convert: fn(&Value) -> Option<T>,
) -> Option<T> {
    let converted = convert(fields.get(key)?)?;
    fields.remove(key);
    Some(converted)
}

/// Identifiers arrive either as JSON strings or numbers.
fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

impl Product {
    /// Identifier usable in a URL path, if any
    pub fn id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }
}
