//! ranking.rs — Live gift ranking section
//!
//! Owns the filter/tab selection and the "load more" reveal cursor. Every
//! selection change hands out a `RankingFetch` ticket stamped with a new
//! epoch; a result is only applied when its ticket still carries the
//! current epoch, so a slow response for an old selection can never
//! overwrite the list for the new one.
//!
//! Driving it looks like:
//!
//! ```ignore
//! let (mut section, fetch) = RankingSection::mount(ctx.prefs.clone());
//! let result = fetch.run(&ctx).await;
//! section.resolve(&fetch, result);
//! let dom = section.render();
//! ```

use std::sync::Arc;

use gift_api::{RankedProduct, RankingFilter, RankingTab};
use gift_dom::DomNode;
use gift_query::{QueryError, QueryKey};
use tracing::{debug, info, warn};

use crate::context::ClientContext;
use crate::prefs::{Preferences, LAST_FILTER, LAST_TAB};
use crate::queries;
use crate::view;

pub const PAGE_SIZE: usize = 6;
pub const LOAD_MORE_STEP: usize = 6;

pub const TITLE: &str = "실시간 급상승 선물랭킹";
pub const ERROR_TEXT: &str = "불러오는 중 오류가 발생했습니다.";
pub const EMPTY_TEXT: &str = "상품이 없습니다.";
pub const LOAD_MORE_TEXT: &str = "더보기";

#[derive(Debug, Clone, PartialEq)]
pub enum RankingPhase {
    Loading,
    Error,
    Loaded(Vec<RankedProduct>),
}

/// A ranking request issued for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingFetch {
    epoch: u64,
    pub filter: RankingFilter,
    pub tab: RankingTab,
}

impl RankingFetch {
    pub fn key(&self) -> QueryKey {
        queries::ranking_key(self.filter, self.tab)
    }

    /// Run the cached ranking query for this ticket's selection.
    pub async fn run(&self, ctx: &ClientContext) -> Result<Vec<RankedProduct>, QueryError> {
        queries::fetch_ranking(ctx, self.filter, self.tab).await
    }
}

pub struct RankingSection {
    prefs: Arc<dyn Preferences>,
    filter: RankingFilter,
    tab: RankingTab,
    visible_count: usize,
    phase: RankingPhase,
    epoch: u64,
}

impl RankingSection {
    /// Restore the last selection (unknown or missing values fall back to
    /// ALL / MANY_WISH) and issue the first fetch.
    pub fn mount(prefs: Arc<dyn Preferences>) -> (Self, RankingFetch) {
        let filter = prefs
            .read(LAST_FILTER)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let tab = prefs
            .read(LAST_TAB)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        debug!(%filter, %tab, "ranking section mounted");

        let mut section = Self {
            prefs,
            filter,
            tab,
            visible_count: PAGE_SIZE,
            phase: RankingPhase::Loading,
            epoch: 0,
        };
        let fetch = section.begin_fetch();
        (section, fetch)
    }

    fn begin_fetch(&mut self) -> RankingFetch {
        self.epoch += 1;
        self.phase = RankingPhase::Loading;
        RankingFetch {
            epoch: self.epoch,
            filter: self.filter,
            tab: self.tab,
        }
    }

    /// Switch the audience. Re-selecting the active filter does nothing.
    pub fn select_filter(&mut self, filter: RankingFilter) -> Option<RankingFetch> {
        if filter == self.filter {
            return None;
        }
        self.prefs.write(LAST_FILTER, filter.as_str());
        self.filter = filter;
        self.visible_count = PAGE_SIZE;
        info!(%filter, tab = %self.tab, "ranking filter changed");
        Some(self.begin_fetch())
    }

    /// Switch the ranking criterion. Re-selecting the active tab does nothing.
    pub fn select_tab(&mut self, tab: RankingTab) -> Option<RankingFetch> {
        if tab == self.tab {
            return None;
        }
        self.prefs.write(LAST_TAB, tab.as_str());
        self.tab = tab;
        self.visible_count = PAGE_SIZE;
        info!(filter = %self.filter, %tab, "ranking tab changed");
        Some(self.begin_fetch())
    }

    /// Reveal the next step of already-fetched items. Returns false when
    /// nothing changed (not loaded, or everything already visible).
    pub fn load_more(&mut self) -> bool {
        let RankingPhase::Loaded(items) = &self.phase else {
            return false;
        };
        let next = (self.visible_count + LOAD_MORE_STEP).min(items.len());
        if next <= self.visible_count {
            return false;
        }
        self.visible_count = next;
        true
    }

    /// Apply a fetch result. Results for superseded tickets are dropped and
    /// `false` is returned. A cancelled fetch leaves the section loading and
    /// also returns `false`; the ticket can be run again.
    pub fn resolve(
        &mut self,
        fetch: &RankingFetch,
        result: Result<Vec<RankedProduct>, QueryError>,
    ) -> bool {
        if fetch.epoch != self.epoch {
            debug!(
                filter = %fetch.filter,
                tab = %fetch.tab,
                "dropping ranking result for superseded selection"
            );
            return false;
        }
        self.phase = match result {
            Ok(items) => RankingPhase::Loaded(items),
            Err(QueryError::Cancelled) => {
                debug!(filter = %fetch.filter, tab = %fetch.tab, "ranking fetch cancelled");
                return false;
            }
            Err(e) => {
                warn!(filter = %fetch.filter, tab = %fetch.tab, error = %e, "ranking fetch failed");
                RankingPhase::Error
            }
        };
        true
    }

    /// Mount, fetch and resolve in one go.
    pub async fn load(ctx: &ClientContext) -> Self {
        let (mut section, fetch) = Self::mount(ctx.prefs.clone());
        let result = fetch.run(ctx).await;
        section.resolve(&fetch, result);
        section
    }

    pub fn filter(&self) -> RankingFilter {
        self.filter
    }

    pub fn tab(&self) -> RankingTab {
        self.tab
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn phase(&self) -> &RankingPhase {
        &self.phase
    }

    pub fn query_key(&self) -> QueryKey {
        queries::ranking_key(self.filter, self.tab)
    }

    pub fn visible_items(&self) -> &[RankedProduct] {
        match &self.phase {
            RankingPhase::Loaded(items) => &items[..self.visible_count.min(items.len())],
            _ => &[],
        }
    }

    pub fn has_more(&self) -> bool {
        match &self.phase {
            RankingPhase::Loaded(items) => self.visible_count < items.len(),
            _ => false,
        }
    }

    pub fn render(&self) -> DomNode {
        let filters = DomNode::element("div")
            .with_key("ranking-filters")
            .with_class("ranking-filters")
            .with_attr("role", "group")
            .with_children(RankingFilter::VARIANTS.into_iter().map(|f| {
                let label = match f {
                    RankingFilter::All => f.label().to_string(),
                    _ => format!("{}{}", f.icon(), f.label()),
                };
                selection_button(&format!("filter-{}", f), &label, &format!("filter:{}", f), f == self.filter)
            }));

        let tabs = DomNode::element("div")
            .with_key("ranking-tabs")
            .with_class("ranking-tabs")
            .with_attr("role", "tablist")
            .with_children(RankingTab::VARIANTS.into_iter().map(|t| {
                selection_button(&format!("tab-{}", t), t.label(), &format!("tab:{}", t), t == self.tab)
            }));

        let body = match &self.phase {
            RankingPhase::Loading => view::spinner(),
            RankingPhase::Error => view::error_text("ranking-error", ERROR_TEXT),
            RankingPhase::Loaded(items) if items.is_empty() => {
                DomNode::text("p", EMPTY_TEXT).with_key("ranking-empty").with_class("empty-text")
            }
            RankingPhase::Loaded(_) => {
                let list = DomNode::element("div")
                    .with_key("ranking-list")
                    .with_class("product-grid")
                    .with_children(
                        self.visible_items()
                            .iter()
                            .enumerate()
                            .map(|(i, p)| view::product_card(p, Some(i + 1))),
                    );
                let mut wrap = DomNode::element("div").with_key("ranking-body").with_child(list);
                if self.has_more() {
                    wrap = wrap.with_child(
                        DomNode::text("button", LOAD_MORE_TEXT)
                            .with_key("ranking-more")
                            .with_class("load-more")
                            .on("click", "more"),
                    );
                }
                wrap
            }
        };

        DomNode::element("section")
            .with_key("ranking")
            .with_class("ranking-section")
            .with_child(DomNode::text("h2", TITLE))
            .with_child(filters)
            .with_child(tabs)
            .with_child(body)
    }
}

fn selection_button(key: &str, label: &str, action: &str, active: bool) -> DomNode {
    let button = DomNode::text("button", label)
        .with_key(key)
        .with_attr("aria-pressed", if active { "true" } else { "false" })
        .on("click", action);
    if active {
        button.with_class("active")
    } else {
        button
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferences;
    use gift_api::Price;

    fn products(n: u64) -> Vec<RankedProduct> {
        (1..=n)
            .map(|id| RankedProduct {
                id,
                name: format!("Product {}", id),
                brand_name: "Brand".into(),
                image_url: format!("http://example.com/{}.jpg", id),
                price: Price { basic_price: 1000, selling_price: 900, discount_rate: 10 },
            })
            .collect()
    }

    fn mounted(prefs: MemoryPreferences) -> (RankingSection, RankingFetch, Arc<MemoryPreferences>) {
        let prefs = Arc::new(prefs);
        let (section, fetch) = RankingSection::mount(prefs.clone());
        (section, fetch, prefs)
    }

    #[test]
    fn defaults_without_stored_selection() {
        let (section, fetch, _) = mounted(MemoryPreferences::new());
        assert_eq!(fetch.filter, RankingFilter::All);
        assert_eq!(fetch.tab, RankingTab::ManyWish);
        assert_eq!(section.visible_count(), PAGE_SIZE);
        assert_eq!(section.phase(), &RankingPhase::Loading);
    }

    #[test]
    fn garbage_preferences_fall_back_to_defaults() {
        let (_, fetch, _) = mounted(MemoryPreferences::with_values([
            (LAST_FILTER, "EVERYONE"),
            (LAST_TAB, ""),
        ]));
        assert_eq!((fetch.filter, fetch.tab), (RankingFilter::All, RankingTab::ManyWish));
    }

    #[test]
    fn load_more_is_capped_and_monotonic() {
        let (mut section, fetch, _) = mounted(MemoryPreferences::new());
        assert!(!section.load_more(), "nothing to reveal while loading");

        section.resolve(&fetch, Ok(products(14)));
        assert_eq!(section.visible_items().len(), 6);
        assert!(section.load_more());
        assert_eq!(section.visible_count(), 12);
        assert!(section.load_more());
        assert_eq!(section.visible_count(), 14);
        assert!(!section.load_more());
        assert_eq!(section.visible_count(), 14);
        assert!(!section.has_more());
    }

    #[test]
    fn selection_change_persists_and_resets_cursor() {
        let (mut section, fetch, prefs) = mounted(MemoryPreferences::new());
        section.resolve(&fetch, Ok(products(10)));
        section.load_more();

        let next = section.select_filter(RankingFilter::Male).unwrap();
        assert_eq!(next.key(), queries::ranking_key(RankingFilter::Male, RankingTab::ManyWish));
        assert_eq!(section.visible_count(), PAGE_SIZE);
        assert_eq!(section.phase(), &RankingPhase::Loading);
        assert_eq!(prefs.read(LAST_FILTER).as_deref(), Some("MALE"));

        let next = section.select_tab(RankingTab::ManyWishReceive).unwrap();
        assert_eq!(next.tab, RankingTab::ManyWishReceive);
        assert_eq!(prefs.read(LAST_TAB).as_deref(), Some("MANY_WISH_RECEIVE"));
    }

    #[test]
    fn reselecting_active_value_is_noop() {
        let (mut section, fetch, prefs) = mounted(MemoryPreferences::new());
        section.resolve(&fetch, Ok(products(10)));
        section.load_more();

        assert!(section.select_filter(RankingFilter::All).is_none());
        assert!(section.select_tab(RankingTab::ManyWish).is_none());
        assert_eq!(section.visible_count(), 10);
        assert_eq!(prefs.read(LAST_FILTER), None);
        assert_eq!(prefs.read(LAST_TAB), None);
    }

    #[test]
    fn superseded_result_is_dropped() {
        let (mut section, first, _) = mounted(MemoryPreferences::new());
        let second = section.select_filter(RankingFilter::Teen).unwrap();

        assert!(section.resolve(&second, Ok(products(2))));
        assert!(!section.resolve(&first, Ok(products(9))));
        assert_eq!(section.visible_items().len(), 2);

        assert!(!section.resolve(&first, Err(QueryError::Fetch("late".into()))));
        assert!(matches!(section.phase(), RankingPhase::Loaded(_)));
    }

    #[test]
    fn cancelled_fetch_keeps_section_loading() {
        let (mut section, fetch, _) = mounted(MemoryPreferences::new());

        assert!(!section.resolve(&fetch, Err(QueryError::Cancelled)));
        assert_eq!(section.phase(), &RankingPhase::Loading);
        assert!(!section.render().contains_text(ERROR_TEXT));

        assert!(section.resolve(&fetch, Ok(products(3))));
        assert_eq!(section.visible_items().len(), 3);
    }

    #[test]
    fn render_states_are_exclusive() {
        let (mut section, fetch, _) = mounted(MemoryPreferences::new());
        let dom = section.render();
        assert!(dom.find_by_key("spinner").is_some());
        assert!(!dom.contains_text(ERROR_TEXT));

        section.resolve(&fetch, Ok(vec![]));
        let dom = section.render();
        assert!(dom.find_by_key("spinner").is_none());
        assert!(dom.contains_text(EMPTY_TEXT));
        assert!(dom.find_by_key("ranking-list").is_none());
        assert!(dom.find_by_key("ranking-more").is_none());
    }

    #[test]
    fn more_button_only_while_items_hidden() {
        let (mut section, fetch, _) = mounted(MemoryPreferences::new());
        section.resolve(&fetch, Ok(products(6)));
        assert!(section.render().find_by_key("ranking-more").is_none());

        let next = section.select_tab(RankingTab::ManyReceive).unwrap();
        section.resolve(&next, Ok(products(7)));
        let dom = section.render();
        let more = dom.find_by_key("ranking-more").unwrap();
        assert_eq!(more.event("click"), Some("more"));
        assert_eq!(more.text.as_deref(), Some(LOAD_MORE_TEXT));
    }

    #[test]
    fn filter_labels_carry_icons() {
        let (section, _, _) = mounted(MemoryPreferences::new());
        let dom = section.render();
        assert!(dom.contains_text("전체"));
        assert!(dom.contains_text("👩여성이"));
        assert!(dom.contains_text("👨남성이"));
        assert!(dom.contains_text("🧒청소년이"));
        assert!(dom.contains_text("많이 찜하고 받은"));
        assert!(dom.contains_text(TITLE));
    }
}
