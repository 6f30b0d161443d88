//! view.rs — Small building blocks shared by the page views

use gift_api::RankedProduct;
use gift_dom::DomNode;

pub fn spinner() -> DomNode {
    DomNode::element("div")
        .with_key("spinner")
        .with_class("spinner")
        .with_attr("role", "status")
        .with_attr("aria-label", "loading")
}

pub fn error_text(key: &str, message: &str) -> DomNode {
    DomNode::text("p", message)
        .with_key(key)
        .with_class("error-text")
        .with_attr("role", "alert")
}

/// `12345` → `"12,345"`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_price(won: u64) -> String {
    format!("{}원", format_number(won))
}

/// Card used by the ranking and theme product lists. `rank` adds the
/// position badge.
pub fn product_card(product: &RankedProduct, rank: Option<usize>) -> DomNode {
    let mut card = DomNode::element("a")
        .with_key(format!("product-{}", product.id))
        .with_class("product-card")
        .with_attr("href", format!("/products/{}", product.id));
    if let Some(rank) = rank {
        card = card.with_child(DomNode::text("span", &rank.to_string()).with_class("rank-badge"));
    }
    card.with_child(
        DomNode::element("img")
            .with_attr("src", product.image_url.as_str())
            .with_attr("alt", product.name.as_str()),
    )
    .with_child(DomNode::text("p", &product.brand_name).with_class("brand"))
    .with_child(DomNode::text("p", &product.name).with_class("name"))
    .with_child(DomNode::text("p", &format_price(product.price.selling_price)).with_class("price"))
}
