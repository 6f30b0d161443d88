//! Typed access to the gift shop backend.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GiftApi, HttpGiftApi};
pub use error::ApiError;
pub use models::{
    Announcement, LoginRequest, OrderReceiver, OrderRequest, ParseSelectionError, Price,
    ProductDetail, ProductReview, ProductWish, RankedProduct, RankingFilter, RankingTab, Review,
    Theme, ThemeDetail, ThemeProductsPage, UserSession,
};
