//! Gift shop REST client.
//!
//! `GiftApi` is the seam the client core talks to. `HttpGiftApi` speaks the
//! real `/api/...` endpoints; tests substitute their own implementations.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ApiError;
use crate::models::{
    Envelope, LoginRequest, LoginResponse, OptionalEnvelope, OrderRequest, ProductDetail,
    ProductReview, ProductSummaryWire, ProductWish, RankedProduct, RankingFilter, RankingTab,
    Theme, ThemeDetail, ThemeProductsPage, UserSession,
};

/// How much of an undecodable body is kept in the error.
const BODY_PREVIEW_CHARS: usize = 200;

#[async_trait]
pub trait GiftApi: Send + Sync {
    /// Ranked products for an audience and criterion. A response without
    /// `data` yields an empty list.
    async fn ranking(
        &self,
        filter: RankingFilter,
        tab: RankingTab,
    ) -> Result<Vec<RankedProduct>, ApiError>;

    async fn themes(&self) -> Result<Vec<Theme>, ApiError>;

    async fn theme_detail(&self, theme_id: u64) -> Result<ThemeDetail, ApiError>;

    async fn theme_products(
        &self,
        theme_id: u64,
        cursor: u64,
        limit: u32,
    ) -> Result<ThemeProductsPage, ApiError>;

    async fn product_summary(&self, product_id: u64) -> Result<RankedProduct, ApiError>;

    async fn product_detail(&self, product_id: u64) -> Result<ProductDetail, ApiError>;

    async fn product_highlight_review(&self, product_id: u64)
        -> Result<ProductReview, ApiError>;

    async fn product_wish(&self, product_id: u64) -> Result<ProductWish, ApiError>;

    /// Flip the caller's wish on a product. The response body is ignored.
    async fn toggle_product_wish(&self, product_id: u64) -> Result<(), ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<UserSession, ApiError>;

    async fn order(&self, request: &OrderRequest, auth_token: &str) -> Result<(), ApiError>;
}

pub struct HttpGiftApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGiftApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Build with a dedicated HTTP client.
    pub fn from_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("gift-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let resp = self.http.get(self.url(path)).query(query).send().await?;
        let resp = check_status(resp).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let head: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
            ApiError::Decode(format!("{}: {} (body: {})", path, e, head))
        })
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let env: Envelope<T> = self.get_json(path, query).await?;
        Ok(env.data)
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the body's
/// `message` field when there is one.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    tracing::warn!(status = status.as_u16(), ?message, "gift api request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl GiftApi for HttpGiftApi {
    async fn ranking(
        &self,
        filter: RankingFilter,
        tab: RankingTab,
    ) -> Result<Vec<RankedProduct>, ApiError> {
        let env: OptionalEnvelope<Vec<RankedProduct>> = self
            .get_json(
                "/products/ranking",
                &[
                    ("targetType", filter.as_str().to_string()),
                    ("rankType", tab.as_str().to_string()),
                ],
            )
            .await?;
        Ok(env.data.unwrap_or_default())
    }

    async fn themes(&self) -> Result<Vec<Theme>, ApiError> {
        self.get_data("/themes", &[]).await
    }

    async fn theme_detail(&self, theme_id: u64) -> Result<ThemeDetail, ApiError> {
        self.get_data(&format!("/themes/{}/info", theme_id), &[]).await
    }

    async fn theme_products(
        &self,
        theme_id: u64,
        cursor: u64,
        limit: u32,
    ) -> Result<ThemeProductsPage, ApiError> {
        self.get_data(
            &format!("/themes/{}/products", theme_id),
            &[("cursor", cursor.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn product_summary(&self, product_id: u64) -> Result<RankedProduct, ApiError> {
        let wire: ProductSummaryWire = self
            .get_data(&format!("/products/{}/summary", product_id), &[])
            .await?;
        Ok(wire.into())
    }

    async fn product_detail(&self, product_id: u64) -> Result<ProductDetail, ApiError> {
        self.get_data(&format!("/products/{}/detail", product_id), &[]).await
    }

    async fn product_highlight_review(
        &self,
        product_id: u64,
    ) -> Result<ProductReview, ApiError> {
        self.get_data(&format!("/products/{}/highlight-review", product_id), &[])
            .await
    }

    async fn product_wish(&self, product_id: u64) -> Result<ProductWish, ApiError> {
        self.get_data(&format!("/products/{}/wish", product_id), &[]).await
    }

    async fn toggle_product_wish(&self, product_id: u64) -> Result<(), ApiError> {
        let path = format!("/products/{}/wish", product_id);
        tracing::debug!(path = %path, "toggle wish");
        let resp = self.http.get(self.url(&path)).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserSession, ApiError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: LoginResponse = resp.json().await?;
        match body.data {
            Some(session) => {
                tracing::info!(email = %session.email, "logged in");
                Ok(session)
            }
            None => Err(ApiError::Rejected(body.message)),
        }
    }

    async fn order(&self, request: &OrderRequest, auth_token: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/order"))
            .header(reqwest::header::AUTHORIZATION, auth_token)
            .json(request)
            .send()
            .await?;
        check_status(resp).await?;
        tracing::info!(product_id = request.product_id, receivers = request.receivers.len(), "order placed");
        Ok(())
    }
}
