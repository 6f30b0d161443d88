#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gift_api::{
    ApiError, Announcement, GiftApi, LoginRequest, OrderRequest, Price, ProductDetail,
    ProductReview, ProductWish, RankedProduct, RankingFilter, RankingTab, Review, Theme,
    ThemeDetail, ThemeProductsPage, UserSession,
};
use gift_client::{ClientContext, MemoryPreferences, NoticeLog};
use gift_query::QueryClient;
use tokio::sync::Notify;

pub fn product(id: u64) -> RankedProduct {
    RankedProduct {
        id,
        name: format!("Product {}", id),
        brand_name: "Brand A".into(),
        image_url: format!("http://example.com/image{}.jpg", id),
        price: Price {
            basic_price: 10000,
            selling_price: 9000,
            discount_rate: 10,
        },
    }
}

pub fn products(n: u64) -> Vec<RankedProduct> {
    (1..=n).map(product).collect()
}

pub fn network_error() -> ApiError {
    ApiError::Transport("connection refused".into())
}

/// Scriptable in-process backend.
#[derive(Default)]
pub struct FakeApi {
    ranking: Mutex<HashMap<(RankingFilter, RankingTab), Result<Vec<RankedProduct>, ApiError>>>,
    ranking_gates: Mutex<HashMap<(RankingFilter, RankingTab), Arc<Notify>>>,
    ranking_calls: Mutex<Vec<(RankingFilter, RankingTab)>>,

    products: Mutex<HashMap<u64, (RankedProduct, ProductDetail)>>,
    product_error: Mutex<Option<ApiError>>,
    reviews: Mutex<HashMap<u64, ProductReview>>,

    wishes: Mutex<HashMap<u64, ProductWish>>,
    wish_gate: Mutex<Option<Arc<Notify>>>,
    wish_reads: AtomicUsize,
    toggle_error: Mutex<Option<ApiError>>,
    toggle_gate: Mutex<Option<Arc<Notify>>>,
    toggle_calls: AtomicUsize,

    themes: Mutex<Vec<Theme>>,
    theme_pages: Mutex<HashMap<(u64, u64), ThemeProductsPage>>,
    theme_page_calls: Mutex<Vec<(u64, u64, u32)>>,

    login_result: Mutex<Option<Result<UserSession, ApiError>>>,
    order_result: Mutex<Option<ApiError>>,
    orders: Mutex<Vec<(OrderRequest, String)>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ── scripting ──

    pub fn set_ranking(
        &self,
        filter: RankingFilter,
        tab: RankingTab,
        result: Result<Vec<RankedProduct>, ApiError>,
    ) {
        self.ranking.lock().unwrap().insert((filter, tab), result);
    }

    /// Hold the next ranking response for this selection until notified.
    pub fn gate_ranking(&self, filter: RankingFilter, tab: RankingTab) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.ranking_gates.lock().unwrap().insert((filter, tab), gate.clone());
        gate
    }

    pub fn ranking_calls(&self) -> Vec<(RankingFilter, RankingTab)> {
        self.ranking_calls.lock().unwrap().clone()
    }

    pub fn set_product(&self, product: RankedProduct, detail: ProductDetail) {
        self.products.lock().unwrap().insert(product.id, (product, detail));
    }

    pub fn fail_products(&self, error: ApiError) {
        *self.product_error.lock().unwrap() = Some(error);
    }

    pub fn set_reviews(&self, product_id: u64, reviews: ProductReview) {
        self.reviews.lock().unwrap().insert(product_id, reviews);
    }

    pub fn set_wish(&self, product_id: u64, wish: ProductWish) {
        self.wishes.lock().unwrap().insert(product_id, wish);
    }

    pub fn server_wish(&self, product_id: u64) -> Option<ProductWish> {
        self.wishes.lock().unwrap().get(&product_id).copied()
    }

    pub fn gate_wish_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.wish_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn wish_reads(&self) -> usize {
        self.wish_reads.load(Ordering::SeqCst)
    }

    pub fn fail_toggle(&self, error: ApiError) {
        *self.toggle_error.lock().unwrap() = Some(error);
    }

    pub fn gate_toggle(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.toggle_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn toggle_calls(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }

    pub fn set_themes(&self, themes: Vec<Theme>) {
        *self.themes.lock().unwrap() = themes;
    }

    pub fn set_theme_page(&self, theme_id: u64, cursor: u64, page: ThemeProductsPage) {
        self.theme_pages.lock().unwrap().insert((theme_id, cursor), page);
    }

    pub fn theme_page_calls(&self) -> Vec<(u64, u64, u32)> {
        self.theme_page_calls.lock().unwrap().clone()
    }

    pub fn set_login(&self, result: Result<UserSession, ApiError>) {
        *self.login_result.lock().unwrap() = Some(result);
    }

    pub fn fail_orders(&self, error: ApiError) {
        *self.order_result.lock().unwrap() = Some(error);
    }

    pub fn orders(&self) -> Vec<(OrderRequest, String)> {
        self.orders.lock().unwrap().clone()
    }
}

fn not_found() -> ApiError {
    ApiError::Status { status: 404, message: None }
}

#[async_trait]
impl GiftApi for FakeApi {
    async fn ranking(
        &self,
        filter: RankingFilter,
        tab: RankingTab,
    ) -> Result<Vec<RankedProduct>, ApiError> {
        self.ranking_calls.lock().unwrap().push((filter, tab));
        let gate = self.ranking_gates.lock().unwrap().remove(&(filter, tab));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.ranking
            .lock()
            .unwrap()
            .get(&(filter, tab))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn themes(&self) -> Result<Vec<Theme>, ApiError> {
        Ok(self.themes.lock().unwrap().clone())
    }

    async fn theme_detail(&self, theme_id: u64) -> Result<ThemeDetail, ApiError> {
        let themes = self.themes.lock().unwrap();
        let theme = themes.iter().find(|t| t.theme_id == theme_id).ok_or_else(not_found)?;
        Ok(ThemeDetail {
            theme_id,
            name: theme.name.clone(),
            title: format!("{} 선물", theme.name),
            description: "마음을 전해보세요".into(),
            background_color: "#4b4d50".into(),
        })
    }

    async fn theme_products(
        &self,
        theme_id: u64,
        cursor: u64,
        limit: u32,
    ) -> Result<ThemeProductsPage, ApiError> {
        self.theme_page_calls.lock().unwrap().push((theme_id, cursor, limit));
        self.theme_pages
            .lock()
            .unwrap()
            .get(&(theme_id, cursor))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn product_summary(&self, product_id: u64) -> Result<RankedProduct, ApiError> {
        if let Some(e) = self.product_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|(p, _)| p.clone())
            .ok_or_else(not_found)
    }

    async fn product_detail(&self, product_id: u64) -> Result<ProductDetail, ApiError> {
        if let Some(e) = self.product_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|(_, d)| d.clone())
            .ok_or_else(not_found)
    }

    async fn product_highlight_review(
        &self,
        product_id: u64,
    ) -> Result<ProductReview, ApiError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .unwrap_or(ProductReview { total_count: 0, reviews: Vec::new() }))
    }

    async fn product_wish(&self, product_id: u64) -> Result<ProductWish, ApiError> {
        self.wish_reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.wish_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.server_wish(product_id).ok_or_else(not_found)
    }

    async fn toggle_product_wish(&self, product_id: u64) -> Result<(), ApiError> {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.toggle_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(e) = self.toggle_error.lock().unwrap().clone() {
            return Err(e);
        }
        let mut wishes = self.wishes.lock().unwrap();
        let wish = wishes
            .entry(product_id)
            .or_insert(ProductWish { wish_count: 0, is_wished: false });
        wish.is_wished = !wish.is_wished;
        wish.wish_count = if wish.is_wished { wish.wish_count + 1 } else { wish.wish_count.saturating_sub(1) };
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserSession, ApiError> {
        self.login_result.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(UserSession {
                email: request.email.clone(),
                name: "Test User".into(),
                auth_token: "mock-auth-token".into(),
            })
        })
    }

    async fn order(&self, request: &OrderRequest, auth_token: &str) -> Result<(), ApiError> {
        if let Some(e) = self.order_result.lock().unwrap().clone() {
            return Err(e);
        }
        self.orders
            .lock()
            .unwrap()
            .push((request.clone(), auth_token.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub ctx: ClientContext,
    pub api: Arc<FakeApi>,
    pub prefs: Arc<MemoryPreferences>,
    pub notices: Arc<NoticeLog>,
}

pub fn harness() -> Harness {
    harness_with(MemoryPreferences::new())
}

pub fn harness_with(prefs: MemoryPreferences) -> Harness {
    let api = FakeApi::new();
    let prefs = Arc::new(prefs);
    let notices = Arc::new(NoticeLog::new());
    let ctx = ClientContext::new(
        Arc::new(QueryClient::new()),
        api.clone(),
        prefs.clone(),
        notices.clone(),
    );
    Harness { ctx, api, prefs, notices }
}

pub fn sample_detail() -> ProductDetail {
    ProductDetail {
        description: "달콤한 케이크".into(),
        announcement: vec![
            Announcement { name: "원산지".into(), value: "국내".into(), display_order: 2 },
            Announcement { name: "제조사".into(), value: "투썸".into(), display_order: 1 },
        ],
    }
}

pub fn sample_reviews() -> ProductReview {
    ProductReview {
        total_count: 1234,
        reviews: vec![Review {
            id: "r1".into(),
            author_name: "선물러".into(),
            content: "맛있어요".into(),
        }],
    }
}
