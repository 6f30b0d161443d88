//! themes.rs — Theme list and theme product pages
//!
//! Theme products are cursor-paginated. All pages fetched so far are kept
//! together under `themeProducts/<id>`, in fetch order.

use gift_api::{RankedProduct, Theme, ThemeDetail, ThemeProductsPage};
use gift_dom::DomNode;
use gift_query::{QueryError, QueryState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ClientContext;
use crate::queries::{self, fetch_theme_detail, fetch_themes};
use crate::view;

pub const PAGE_LIMIT: u32 = 10;
pub const FIRST_CURSOR: u64 = 0;
pub const THEMES_ERROR: &str = "테마를 불러오는 중 오류가 발생했습니다.";
pub const PRODUCTS_ERROR: &str = "상품을 불러오는 중 오류가 발생했습니다.";
pub const EMPTY_TEXT: &str = "상품이 없습니다.";

/// Every page of one theme's product list fetched so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePages {
    pub pages: Vec<ThemeProductsPage>,
}

impl ThemePages {
    /// Cursor for the page after the last one, if the server says there is one.
    pub fn next_cursor(&self) -> Option<u64> {
        self.pages
            .last()
            .filter(|p| p.has_more_list)
            .map(|p| p.cursor)
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor().is_some()
    }

    pub fn products(&self) -> Vec<RankedProduct> {
        self.pages.iter().flat_map(|p| p.list.iter().cloned()).collect()
    }
}

/// First page of `theme_id`, served from cache when fresh. A refetch walks
/// the cursors again up to as many pages as were already loaded, so a
/// revealed list does not shrink back to one page.
pub async fn fetch_first_page(
    ctx: &ClientContext,
    theme_id: u64,
) -> Result<ThemePages, QueryError> {
    let key = queries::theme_products_key(theme_id);
    let loaded = ctx
        .queries
        .get_query_data::<ThemePages>(&key)
        .map(|p| p.pages.len())
        .unwrap_or(0)
        .max(1);
    let api = ctx.api.as_ref();
    ctx.queries
        .fetch_query(&key, move || async move {
            let first = api.theme_products(theme_id, FIRST_CURSOR, PAGE_LIMIT).await?;
            let mut pages = ThemePages { pages: vec![first] };
            while pages.pages.len() < loaded {
                let Some(cursor) = pages.next_cursor() else {
                    break;
                };
                pages.pages.push(api.theme_products(theme_id, cursor, PAGE_LIMIT).await?);
            }
            Ok::<_, gift_api::ApiError>(pages)
        })
        .await
}

/// Append the next page. Returns `false` without a request when the list
/// is already complete (or was never started).
pub async fn fetch_next_page(ctx: &ClientContext, theme_id: u64) -> Result<bool, QueryError> {
    let key = queries::theme_products_key(theme_id);
    let Some(current) = ctx.queries.get_query_data::<ThemePages>(&key) else {
        return Ok(false);
    };
    let Some(cursor) = current.next_cursor() else {
        debug!(theme_id, "theme products exhausted");
        return Ok(false);
    };

    let page_key = key.clone().with(cursor);
    let api = ctx.api.as_ref();
    let page = ctx
        .queries
        .fetch_query(&page_key, move || api.theme_products(theme_id, cursor, PAGE_LIMIT))
        .await?;

    ctx.queries.update_query_data::<ThemePages, _>(&key, |pages| {
        let mut pages = pages.unwrap_or_default();
        // Only append on top of the page the cursor came from.
        if pages.next_cursor() == Some(cursor) {
            pages.pages.push(page);
            Some(pages)
        } else {
            None
        }
    })?;
    ctx.queries.remove_queries(&page_key);
    Ok(true)
}

/// Warm the theme page: detail plus first product page.
pub async fn load(ctx: &ClientContext, theme_id: u64) {
    let _ = tokio::join!(fetch_theme_detail(ctx, theme_id), fetch_first_page(ctx, theme_id));
}

pub fn render_theme_list(ctx: &ClientContext) -> DomNode {
    let state: QueryState<Vec<Theme>> = ctx.queries.query_state(&queries::themes_key());
    let section = DomNode::element("section").with_key("themes").with_class("theme-section");
    if let Some(themes) = state.data {
        return section.with_children(themes.iter().map(|t| {
            DomNode::element("a")
                .with_key(format!("theme-{}", t.theme_id))
                .with_class("theme-item")
                .with_attr("href", format!("/themes/{}", t.theme_id))
                .with_child(
                    DomNode::element("img")
                        .with_attr("src", t.image.as_str())
                        .with_attr("alt", t.name.as_str()),
                )
                .with_child(DomNode::text("span", &t.name))
        }));
    }
    if state.error.is_some() {
        return section.with_child(view::error_text("themes-error", THEMES_ERROR));
    }
    section.with_child(view::spinner())
}

pub async fn load_theme_list(ctx: &ClientContext) {
    let _ = fetch_themes(ctx).await;
}

pub fn render_theme_page(ctx: &ClientContext, theme_id: u64) -> DomNode {
    let detail: QueryState<ThemeDetail> =
        ctx.queries.query_state(&queries::theme_detail_key(theme_id));
    let products: QueryState<ThemePages> =
        ctx.queries.query_state(&queries::theme_products_key(theme_id));

    let mut page = DomNode::element("main").with_key("theme-page").with_class("theme-page");

    if let Some(d) = &detail.data {
        page = page.with_child(
            DomNode::element("header")
                .with_key("theme-hero")
                .with_class("theme-hero")
                .with_attr("style", format!("background-color: {}", d.background_color))
                .with_child(DomNode::text("p", &d.name).with_class("name"))
                .with_child(DomNode::text("h1", &d.title))
                .with_child(DomNode::text("p", &d.description).with_class("description")),
        );
    }

    let body = match products.data {
        Some(pages) => {
            let items = pages.products();
            if items.is_empty() {
                DomNode::text("p", EMPTY_TEXT).with_key("theme-empty").with_class("empty-text")
            } else {
                let mut body = DomNode::element("div").with_key("theme-body").with_child(
                    DomNode::element("div")
                        .with_key("theme-products")
                        .with_class("product-grid")
                        .with_children(items.iter().map(|p| view::product_card(p, None))),
                );
                if pages.has_more() {
                    body = body.with_child(
                        DomNode::text("button", crate::ranking::LOAD_MORE_TEXT)
                            .with_key("theme-more")
                            .with_class("load-more")
                            .on("click", format!("theme-more:{}", theme_id)),
                    );
                }
                body
            }
        }
        None if products.error.is_some() => view::error_text("theme-error", PRODUCTS_ERROR),
        None => view::spinner(),
    };
    page.with_child(body)
}
