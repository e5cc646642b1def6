//! Naver Commerce API Client Implementation
//!
//! Implements `StoreApi` over HTTP. Each operation issues exactly one request.
//!
//! API Docs: https://apicenter.commerce.naver.com/docs/restful-api

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::config::Settings;
use crate::providers::http_client::ApiSession;
use crate::providers::traits::{DateRange, StoreApi, StoreResult};

use super::auth::{self, TokenRequest};
use super::models::*;

/// Body type for requests without a payload
type NoBody = Value;

/// Naver Commerce API client
pub struct NaverCommerceClient {
    session: ApiSession,
    client_id: String,
    client_secret: String,
}

impl NaverCommerceClient {
    /// Create a client from loaded settings
    pub fn new(settings: &Settings) -> StoreResult<Self> {
        Self::with_timeout(settings, Duration::from_secs(settings.timeout))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(settings: &Settings, timeout: Duration) -> StoreResult<Self> {
        let session = ApiSession::new(
            &settings.base_url,
            &settings.client_id,
            &settings.client_secret,
            &settings.access_token,
            timeout,
        )?;

        Ok(NaverCommerceClient {
            session,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        })
    }

    /// Underlying HTTP session
    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// Replace the bearer token for subsequent requests
    pub fn set_access_token(&mut self, token: &str) {
        self.session.set_access_token(token);
    }

    /// Sign a fresh SELF-mode request and exchange it for a token.
    ///
    /// The token is returned, not installed; callers decide whether to
    /// persist it and call [`set_access_token`](Self::set_access_token).
    pub async fn request_token(&self) -> StoreResult<TokenResponse> {
        let request = TokenRequest::sign(&self.client_id, &self.client_secret)?;
        auth::issue_token(&self.session, &request).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> StoreResult<T> {
        self.session
            .execute::<T, NoBody>(Method::GET, path, query, None)
            .await
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> StoreResult<T> {
        self.session.execute(method, path, &[], Some(body)).await
    }
}

fn paging(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("pageSize", page_size.to_string())]
}

#[async_trait]
impl StoreApi for NaverCommerceClient {
    async fn list_products(&self, page: u32, page_size: u32) -> StoreResult<ProductPage> {
        self.get("/v1/products", &paging(page, page_size)).await
    }

    async fn get_product(&self, product_id: &str) -> StoreResult<Product> {
        self.get(&format!("/v1/products/{}", product_id), &[]).await
    }

    async fn create_product(&self, payload: &Map<String, Value>) -> StoreResult<Product> {
        self.send_json(Method::POST, "/v1/products", &Value::Object(payload.clone()))
            .await
    }

    async fn update_product(
        &self,
        product_id: &str,
        payload: &Map<String, Value>,
    ) -> StoreResult<Product> {
        let path = format!("/v1/products/{}", product_id);
        self.send_json(Method::PUT, &path, &Value::Object(payload.clone()))
            .await
    }

    async fn list_orders(
        &self,
        page: u32,
        page_size: u32,
        range: &DateRange,
    ) -> StoreResult<OrderPage> {
        let mut query = paging(page, page_size);
        if let Some(start) = &range.start {
            query.push(("startDate", start.clone()));
        }
        if let Some(end) = &range.end {
            query.push(("endDate", end.clone()));
        }

        self.get("/v1/orders", &query).await
    }

    async fn get_order(&self, order_id: &str) -> StoreResult<Order> {
        self.get(&format!("/v1/orders/{}", order_id), &[]).await
    }

    async fn update_order_status(&self, order_id: &str, status: &str) -> StoreResult<Confirmation> {
        let path = format!("/v1/orders/{}/status", order_id);
        self.send_json(Method::PUT, &path, &json!({ "status": status }))
            .await
    }

    async fn get_inventory(&self, product_id: &str) -> StoreResult<Inventory> {
        self.get(&format!("/v1/products/{}/inventory", product_id), &[])
            .await
    }

    async fn update_inventory(&self, product_id: &str, quantity: i64) -> StoreResult<Confirmation> {
        let path = format!("/v1/products/{}/inventory", product_id);
        self.send_json(Method::PUT, &path, &json!({ "quantity": quantity }))
            .await
    }

    async fn get_seller_info(&self) -> StoreResult<SellerInfo> {
        self.get("/v1/seller", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::StoreError;
    use httpmock::prelude::*;

    const SECRET: &str = "$2a$04$abcdefghijklmnopqrstuv";

    fn settings(base_url: &str, token: &str) -> Settings {
        Settings {
            client_id: "my-app".to_string(),
            client_secret: SECRET.to_string(),
            access_token: token.to_string(),
            base_url: base_url.to_string(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_list_products_sends_paging_and_credentials() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/products")
                    .query_param("page", "2")
                    .query_param("pageSize", "20")
                    .header("x-naver-client-id", "my-app")
                    .header("authorization", "Bearer token-1");
                then.status(200).json_body(serde_json::json!({
                    "products": [{ "productId": "A", "productName": "Tea" }]
                }));
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "token-1")).unwrap();
        let page = client.list_products(2, 20).await.unwrap();

        mock.assert_async().await;
        let products = page.products.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id(), Some("A"));
    }

    #[tokio::test]
    async fn test_server_error_preserves_body() {
        let server = MockServer::start_async().await;
        let body = "{\"code\":\"GW.INTERNAL\",\"message\":\"boom\"}\n";
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/seller");
                then.status(500).body(body);
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();
        let err = client.get_seller_info().await.unwrap_err();

        match err {
            StoreError::Api { status, body: received } => {
                assert_eq!(status, 500);
                assert_eq!(received, body);
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v1/products/A/inventory")
                    .json_body(serde_json::json!({ "quantity": 30 }));
                then.status(204);
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();
        let ack = client.update_inventory("A", 30).await.unwrap();

        mock.assert_async().await;
        assert_eq!(ack.success, Some(true));
    }

    #[tokio::test]
    async fn test_update_order_status_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v1/orders/O-1/status")
                    .json_body(serde_json::json!({ "status": "DISPATCHED" }));
                then.status(200).json_body(serde_json::json!({ "success": true, "orderId": "O-1" }));
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();
        let ack = client.update_order_status("O-1", "DISPATCHED").await.unwrap();

        mock.assert_async().await;
        assert_eq!(ack.success, Some(true));
        assert_eq!(ack.extra.get("orderId"), Some(&serde_json::json!("O-1")));
    }

    #[tokio::test]
    async fn test_list_orders_with_date_range() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/orders")
                    .query_param("page", "1")
                    .query_param("pageSize", "100")
                    .query_param("startDate", "2024-03-01")
                    .query_param("endDate", "2024-03-08");
                then.status(200).json_body(serde_json::json!({
                    "orders": [{ "orderId": 77, "orderStatus": "PAYED" }]
                }));
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();
        let range = DateRange::new("2024-03-01", "2024-03-08");
        let page = client.list_orders(1, 100, &range).await.unwrap();

        mock.assert_async().await;
        let orders = page.orders.unwrap();
        assert_eq!(orders[0].order_id.as_deref(), Some("77"));
        assert_eq!(orders[0].order_status.as_deref(), Some("PAYED"));
    }

    #[tokio::test]
    async fn test_create_and_update_product() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/products")
                    .json_body(serde_json::json!({ "productName": "Tea" }));
                then.status(200).json_body(serde_json::json!({ "productId": "N1", "productName": "Tea" }));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v1/products/N1")
                    .json_body(serde_json::json!({ "salePrice": 9900 }));
                then.status(200).json_body(serde_json::json!({ "productId": "N1", "salePrice": 9900 }));
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();

        let mut payload = Map::new();
        payload.insert("productName".to_string(), json!("Tea"));
        let created = client.create_product(&payload).await.unwrap();
        assert_eq!(created.id(), Some("N1"));

        let mut patch = Map::new();
        patch.insert("salePrice".to_string(), json!(9900));
        let updated = client.update_product("N1", &patch).await.unwrap();
        assert_eq!(updated.extra.get("salePrice"), Some(&json!(9900)));

        create.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_detail_endpoints() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/products/A");
                then.status(200).json_body(serde_json::json!({ "productId": "A", "price": 1000 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/orders/O-9");
                then.status(200).json_body(serde_json::json!({ "orderId": "O-9", "orderStatus": "DELIVERED" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/products/A/inventory");
                then.status(200).json_body(serde_json::json!({ "quantity": 4 }));
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();

        assert_eq!(client.get_product("A").await.unwrap().id(), Some("A"));
        assert_eq!(
            client.get_order("O-9").await.unwrap().order_status.as_deref(),
            Some("DELIVERED")
        );
        assert_eq!(client.get_inventory("A").await.unwrap().quantity, Some(4));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/products/A");
                then.status(200).body("{not json");
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "t")).unwrap();
        let err = client.get_product("A").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/seller");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(serde_json::json!({}));
            })
            .await;

        let client = NaverCommerceClient::with_timeout(
            &settings(&server.base_url(), "t"),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = client.get_seller_info().await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = NaverCommerceClient::new(&settings("http://127.0.0.1:1", "t")).unwrap();
        let err = client.get_seller_info().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_request_token_posts_signed_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/oauth2/token")
                    .body_includes("client_id=my-app")
                    .body_includes("grant_type=client_credentials")
                    .body_includes("type=SELF")
                    .body_includes("client_secret_sign=");
                then.status(200).json_body(serde_json::json!({
                    "access_token": "issued-token",
                    "expires_in": 10800,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let mut client = NaverCommerceClient::new(&settings(&server.base_url(), "")).unwrap();
        assert!(!client.session().has_token());

        let token = client.request_token().await.unwrap();
        mock.assert_async().await;
        assert_eq!(token.access_token, "issued-token");
        assert_eq!(token.expires_in, Some(10800));

        client.set_access_token(&token.access_token);
        assert!(client.session().has_token());
    }

    #[tokio::test]
    async fn test_rejected_token_request_keeps_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/oauth2/token");
                then.status(400).body("{\"code\":\"BadRequest\",\"message\":\"invalid signature\"}");
            })
            .await;

        let client = NaverCommerceClient::new(&settings(&server.base_url(), "")).unwrap();
        let err = client.request_token().await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("invalid signature"));
    }
}
