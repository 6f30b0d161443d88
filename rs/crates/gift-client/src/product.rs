//! product.rs — Product detail page
//!
//! Three cached reads back the page: product info (summary and detail
//! merged), highlight reviews and wish state. `load` warms them; `render`
//! only looks at cache state, so it shows whatever the cache holds right
//! now, optimistic wish values included.

use gift_api::{ProductReview, ProductWish};
use gift_dom::DomNode;
use gift_query::QueryState;

use crate::context::ClientContext;
use crate::queries::{
    self, fetch_highlight_review, fetch_product_info, fetch_wish, ProductInfo,
};
use crate::view;

pub const LOAD_FAILED: &str = "상품 정보를 불러오는 데 실패했습니다.";
pub const NOT_FOUND: &str = "상품을 찾을 수 없습니다.";
pub const ANNOUNCEMENT_TITLE: &str = "상품 고시 정보";
pub const GIFT_BUTTON: &str = "선물하기";

/// Fetch everything the page needs, concurrently. Failures are left in the
/// cache for `render` to pick up.
pub async fn load(ctx: &ClientContext, product_id: u64) {
    let _ = tokio::join!(
        fetch_product_info(ctx, product_id),
        fetch_highlight_review(ctx, product_id),
        fetch_wish(ctx, product_id),
    );
}

pub fn render(ctx: &ClientContext, product_id: u64) -> DomNode {
    let info: QueryState<Option<ProductInfo>> =
        ctx.queries.query_state(&queries::product_detail_key(product_id));
    let reviews: QueryState<ProductReview> =
        ctx.queries.query_state(&queries::product_review_key(product_id));
    let wish: QueryState<ProductWish> =
        ctx.queries.query_state(&queries::product_wish_key(product_id));

    let page = DomNode::element("main")
        .with_key("product-page")
        .with_class("product-page");

    if info.is_loading() || reviews.is_loading() || wish.is_loading() {
        return page.with_child(view::spinner());
    }
    if info.error.is_some() && info.data.is_none() {
        return page.with_child(view::error_text("product-error", LOAD_FAILED));
    }
    let Some(Some(info)) = info.data else {
        return page.with_child(view::error_text("product-missing", NOT_FOUND));
    };

    let product = &info.product;
    let mut body = DomNode::element("div")
        .with_class("product-info")
        .with_child(DomNode::text("h1", &product.name).with_key("product-name"))
        .with_child(
            DomNode::text("p", &view::format_price(product.price.selling_price))
                .with_key("product-price"),
        )
        .with_child(DomNode::text("p", &info.description).with_class("description"))
        .with_child(wish_button(product_id, wish.data))
        .with_child(
            DomNode::element("section")
                .with_key("announcements")
                .with_child(DomNode::text("h2", ANNOUNCEMENT_TITLE))
                .with_children(info.announcement.iter().map(|a| {
                    DomNode::element("div")
                        .with_class("announcement")
                        .with_child(DomNode::text("span", &a.name).with_class("name"))
                        .with_child(DomNode::text("span", &a.value).with_class("value"))
                })),
        );

    if let Some(reviews) = reviews.data.filter(|r| !r.reviews.is_empty()) {
        body = body.with_child(
            DomNode::element("section")
                .with_key("reviews")
                .with_child(DomNode::text(
                    "h2",
                    &format!("하이라이트 리뷰 ({})", view::format_number(reviews.total_count)),
                ))
                .with_children(reviews.reviews.iter().map(|r| {
                    DomNode::element("div")
                        .with_key(format!("review-{}", r.id))
                        .with_class("review")
                        .with_child(DomNode::text("p", &r.author_name).with_class("author"))
                        .with_child(DomNode::text("p", &r.content).with_class("content"))
                })),
        );
    }

    let gift = DomNode::text("a", GIFT_BUTTON)
        .with_key("gift-button")
        .with_class("gift-button")
        .with_attr("href", format!("/order/{}", product_id));

    page.with_child(
        DomNode::element("img")
            .with_class("product-image")
            .with_attr("src", product.image_url.as_str())
            .with_attr("alt", product.name.as_str()),
    )
    .with_child(body.with_child(gift))
}

fn wish_button(product_id: u64, wish: Option<ProductWish>) -> DomNode {
    let wished = wish.map(|w| w.is_wished).unwrap_or(false);
    let count = wish.map(|w| view::format_number(w.wish_count)).unwrap_or_default();
    let button = DomNode::element("button")
        .with_key("wish-button")
        .with_attr("aria-pressed", if wished { "true" } else { "false" })
        .on("click", format!("wish:{}", product_id))
        .with_child(DomNode::text("span", "♥").with_class("heart"))
        .with_child(DomNode::text("span", &count).with_key("wish-count"));
    if wished {
        button.with_class("wish-button wished")
    } else {
        button.with_class("wish-button")
    }
}
