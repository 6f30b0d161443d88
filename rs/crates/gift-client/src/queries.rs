//! queries.rs — Cache keys and cached fetches for every backend read
//!
//! Each read goes through the shared `QueryClient` under a key built here,
//! so two views asking for the same thing share one entry.

use gift_api::{
    ApiError, ProductReview, ProductWish, RankedProduct, RankingFilter, RankingTab, Theme,
    ThemeDetail,
};
use gift_query::{QueryError, QueryKey};
use serde::{Deserialize, Serialize};

use crate::context::ClientContext;

// ── Keys ────────────────────────────────────────────────────────────

pub fn ranking_key(filter: RankingFilter, tab: RankingTab) -> QueryKey {
    QueryKey::new("ranking").with(filter.as_str()).with(tab.as_str())
}

pub fn product_detail_key(product_id: u64) -> QueryKey {
    QueryKey::new("productDetail").with(product_id)
}

pub fn product_review_key(product_id: u64) -> QueryKey {
    QueryKey::new("productHighlightReview").with(product_id)
}

pub fn product_wish_key(product_id: u64) -> QueryKey {
    QueryKey::new("productWish").with(product_id)
}

pub fn themes_key() -> QueryKey {
    QueryKey::new("themes")
}

pub fn theme_detail_key(theme_id: u64) -> QueryKey {
    QueryKey::new("themeDetail").with(theme_id)
}

pub fn theme_products_key(theme_id: u64) -> QueryKey {
    QueryKey::new("themeProducts").with(theme_id)
}

// ── Fetches ─────────────────────────────────────────────────────────

pub async fn fetch_ranking(
    ctx: &ClientContext,
    filter: RankingFilter,
    tab: RankingTab,
) -> Result<Vec<RankedProduct>, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&ranking_key(filter, tab), move || api.ranking(filter, tab))
        .await
}

/// Summary and detail of one product, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product: RankedProduct,
    pub description: String,
    pub announcement: Vec<gift_api::Announcement>,
}

/// `None` when the backend does not know the product.
pub async fn fetch_product_info(
    ctx: &ClientContext,
    product_id: u64,
) -> Result<Option<ProductInfo>, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&product_detail_key(product_id), move || async move {
            let joined = tokio::try_join!(
                api.product_summary(product_id),
                api.product_detail(product_id)
            );
            match joined {
                Ok((product, detail)) => {
                    let mut announcement = detail.announcement;
                    announcement.sort_by_key(|a| a.display_order);
                    Ok(Some(ProductInfo {
                        product,
                        description: detail.description,
                        announcement,
                    }))
                }
                Err(ApiError::Status { status: 404, .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
}

pub async fn fetch_highlight_review(
    ctx: &ClientContext,
    product_id: u64,
) -> Result<ProductReview, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&product_review_key(product_id), move || {
            api.product_highlight_review(product_id)
        })
        .await
}

pub async fn fetch_wish(ctx: &ClientContext, product_id: u64) -> Result<ProductWish, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&product_wish_key(product_id), move || api.product_wish(product_id))
        .await
}

pub async fn fetch_themes(ctx: &ClientContext) -> Result<Vec<Theme>, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries.fetch_query(&themes_key(), move || api.themes()).await
}

pub async fn fetch_theme_detail(
    ctx: &ClientContext,
    theme_id: u64,
) -> Result<ThemeDetail, QueryError> {
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&theme_detail_key(theme_id), move || api.theme_detail(theme_id))
        .await
}
