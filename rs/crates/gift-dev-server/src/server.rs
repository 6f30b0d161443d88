//! server.rs — Pages, forms and click actions over one client session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use gift_client::login::{self, LoginForm};
use gift_client::order::{self, OrderForm, OrderOutcome, ReceiverInput};
use gift_client::{product, themes, wish};
use gift_client::{ClientContext, NoticeLevel, NoticeLog, RankingFetch, RankingSection};
use gift_dom::DomNode;
use gift_render_html::{render_page, PageOptions};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::AppError;

const STYLE: &str = "body{font-family:sans-serif;margin:0 auto;max-width:720px}\
button.active{font-weight:bold;background:#222;color:#fff}\
.product-grid{display:grid;grid-template-columns:repeat(3,1fr);gap:12px}\
.product-card img{width:100%}\
.error-text{color:red;text-align:center}\
.notice.error{background:#fdd}.notice.success{background:#dfd}";

// ── Shared state ────────────────────────────────────────────────────

pub struct AppState {
    pub ctx: ClientContext,
    pub notices: Arc<NoticeLog>,
    ranking: Mutex<RankingSlot>,
}

struct RankingSlot {
    section: RankingSection,
    /// Issued but not yet resolved.
    pending: Option<RankingFetch>,
}

impl AppState {
    /// Mounts the ranking section; its first fetch runs on the first page view.
    pub fn new(ctx: ClientContext, notices: Arc<NoticeLog>) -> Self {
        let (section, fetch) = RankingSection::mount(ctx.prefs.clone());
        Self {
            ctx,
            notices,
            ranking: Mutex::new(RankingSlot {
                section,
                pending: Some(fetch),
            }),
        }
    }

    fn ranking(&self) -> MutexGuard<'_, RankingSlot> {
        self.ranking.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the outstanding ranking fetch, if any, and apply its result.
    async fn drive_ranking(&self) {
        let pending = self.ranking().pending.clone();
        let Some(fetch) = pending else {
            return;
        };
        let result = fetch.run(&self.ctx).await;
        let mut slot = self.ranking();
        let applied = slot.section.resolve(&fetch, result);
        // A cancelled ticket stays pending and runs again on the next view.
        if applied && slot.pending.as_ref() == Some(&fetch) {
            slot.pending = None;
        }
    }

    fn reselect(&self, f: impl FnOnce(&mut RankingSection) -> Option<RankingFetch>) {
        let mut slot = self.ranking();
        if let Some(fetch) = f(&mut slot.section) {
            slot.pending = Some(fetch);
        }
    }

    fn page(&self, title: &str, body: DomNode) -> Html<String> {
        let notices = DomNode::element("div")
            .with_key("notices")
            .with_class("notices")
            .with_children(self.notices.drain().into_iter().map(|n| {
                let class = match n.level {
                    NoticeLevel::Success => "notice success",
                    NoticeLevel::Error => "notice error",
                };
                DomNode::text("p", &n.message).with_class(class)
            }));
        let root = DomNode::element("div")
            .with_child(
                DomNode::element("nav")
                    .with_child(DomNode::text("a", "홈").with_attr("href", "/"))
                    .with_child(DomNode::text("a", "로그인").with_attr("href", "/login")),
            )
            .with_child(notices)
            .with_child(body);
        let mut opts = PageOptions::new(root).with_title(title);
        opts.inline_css = Some(STYLE.to_string());
        Html(render_page(&opts))
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(home))
        .route("/products/:id", get(product_page))
        .route("/themes/:id", get(theme_page))
        .route("/login", get(login_page).post(login_submit))
        .route("/order/:id", get(order_page).post(order_submit))
        .route("/actions/:action", post(action))
        .fallback(not_found)
        .with_state(state)
}

// ── Handlers: pages ─────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    tokio::join!(state.drive_ranking(), themes::load_theme_list(&state.ctx));
    let ranking = state.ranking().section.render();
    let body = DomNode::element("main")
        .with_key("home")
        .with_child(themes::render_theme_list(&state.ctx))
        .with_child(ranking);
    state.page("선물하기", body)
}

async fn product_page(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Html<String> {
    product::load(&state.ctx, id).await;
    state.page("상품 상세", product::render(&state.ctx, id))
}

async fn theme_page(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Html<String> {
    themes::load(&state.ctx, id).await;
    state.page("테마", themes::render_theme_page(&state.ctx, id))
}

// ── Handlers: forms ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LoginFields {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn login_page(State(state): State<Arc<AppState>>) -> Html<String> {
    state.page("로그인", LoginForm::default().render())
}

async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<LoginFields>,
) -> Response {
    let form = LoginForm::new(fields.email, fields.password);
    match login::submit(&state.ctx, &form).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            debug!(error = %e, "login rejected");
            state.page("로그인", form.render()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderFields {
    #[serde(default)]
    message: String,
    #[serde(default)]
    message_card_id: String,
    #[serde(default)]
    orderer_name: String,
    #[serde(default)]
    receiver_name: String,
    #[serde(default)]
    receiver_phone: String,
    #[serde(default)]
    receiver_quantity: String,
}

async fn order_page(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    if !state.ctx.session().is_logged_in() {
        return Redirect::to("/login").into_response();
    }
    let form = OrderForm { product_id: id, ..Default::default() };
    state.page("주문하기", form.render()).into_response()
}

/// The HTML form carries exactly one receiver. Orders with several
/// receivers (up to `MAX_RECEIVERS`) go through `order::submit` directly.
async fn order_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Form(fields): Form<OrderFields>,
) -> Response {
    let form = OrderForm {
        product_id: id,
        orderer_name: fields.orderer_name,
        message: fields.message,
        message_card_id: fields.message_card_id,
        receivers: vec![ReceiverInput {
            name: fields.receiver_name,
            phone_number: fields.receiver_phone,
            quantity: fields.receiver_quantity.trim().parse().unwrap_or(0),
        }],
    };
    match order::submit(&state.ctx, &form).await {
        Ok(OrderOutcome::Placed) => Redirect::to("/").into_response(),
        Ok(OrderOutcome::NeedsLogin) => Redirect::to("/login").into_response(),
        Err(e) => {
            debug!(error = %e, "order not placed");
            state.page("주문하기", form.render()).into_response()
        }
    }
}

// ── Handlers: actions ───────────────────────────────────────────────

async fn action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> Result<StatusCode, AppError> {
    let action: Action = action.parse()?;
    info!(?action, "action");
    match action {
        Action::Filter(filter) => {
            state.reselect(|s| s.select_filter(filter));
            state.drive_ranking().await;
        }
        Action::Tab(tab) => {
            state.reselect(|s| s.select_tab(tab));
            state.drive_ranking().await;
        }
        Action::More => {
            state.ranking().section.load_more();
        }
        Action::Wish(id) => {
            // Failures are already rolled back and surfaced as a notice.
            if let Err(e) = wish::toggle_wish(&state.ctx, id).await {
                debug!(product_id = id, error = %e, "wish toggle failed");
            }
        }
        Action::ThemeMore(id) => {
            if let Err(e) = themes::fetch_next_page(&state.ctx, id).await {
                warn!(theme_id = id, error = %e, "next theme page failed");
            }
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
