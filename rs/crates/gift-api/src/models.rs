//! Wire models for the gift shop REST API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Ranking selections ──────────────────────────────────────────────

/// Audience the ranking is computed for (`targetType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingFilter {
    #[default]
    All,
    Female,
    Male,
    Teen,
}

impl RankingFilter {
    pub const VARIANTS: [RankingFilter; 4] = [Self::All, Self::Female, Self::Male, Self::Teen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Female => "FEMALE",
            Self::Male => "MALE",
            Self::Teen => "TEEN",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Female => "👩",
            Self::Male => "👨",
            Self::Teen => "🧒",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "전체",
            Self::Female => "여성이",
            Self::Male => "남성이",
            Self::Teen => "청소년이",
        }
    }
}

/// Ranking criterion (`rankType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingTab {
    #[default]
    ManyWish,
    ManyReceive,
    ManyWishReceive,
}

impl RankingTab {
    pub const VARIANTS: [RankingTab; 3] = [Self::ManyWish, Self::ManyReceive, Self::ManyWishReceive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManyWish => "MANY_WISH",
            Self::ManyReceive => "MANY_RECEIVE",
            Self::ManyWishReceive => "MANY_WISH_RECEIVE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ManyWish => "많이 찜한",
            Self::ManyReceive => "많이 선물한",
            Self::ManyWishReceive => "많이 찜하고 받은",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseSelectionError {
    kind: &'static str,
    value: String,
}

impl FromStr for RankingFilter {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseSelectionError { kind: "filter", value: s.to_string() })
    }
}

impl FromStr for RankingTab {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseSelectionError { kind: "tab", value: s.to_string() })
    }
}

impl fmt::Display for RankingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RankingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Products ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub basic_price: u64,
    pub selling_price: u64,
    /// Integer percent.
    pub discount_rate: u32,
}

/// A product as listed in rankings and theme pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
    pub id: u64,
    pub name: String,
    pub brand_name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub price: Price,
}

/// `/summary` carries a single price number instead of a price record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductSummaryWire {
    pub id: u64,
    pub name: String,
    pub brand_name: String,
    pub price: u64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl From<ProductSummaryWire> for RankedProduct {
    fn from(w: ProductSummaryWire) -> Self {
        RankedProduct {
            id: w.id,
            name: w.name,
            brand_name: w.brand_name,
            image_url: w.image_url,
            price: Price {
                basic_price: w.price,
                selling_price: w.price,
                discount_rate: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub name: String,
    pub value: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub announcement: Vec<Announcement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    pub total_count: u64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWish {
    pub wish_count: u64,
    pub is_wished: bool,
}

// ── Themes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub theme_id: u64,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDetail {
    pub theme_id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeProductsPage {
    pub list: Vec<RankedProduct>,
    pub cursor: u64,
    pub has_more_list: bool,
}

// ── Auth and orders ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user as returned by `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub email: String,
    pub name: String,
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<UserSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceiver {
    pub name: String,
    pub phone_number: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub product_id: u64,
    pub message: String,
    pub message_card_id: String,
    pub orderer_name: String,
    pub receivers: Vec<OrderReceiver>,
}

// ── Envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptionalEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}
