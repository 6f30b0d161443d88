mod common;

use common::{harness, harness_with, network_error, products};
use gift_api::{RankingFilter, RankingTab};
use gift_client::prefs::{Preferences, LAST_FILTER, LAST_TAB};
use gift_client::ranking::{EMPTY_TEXT, ERROR_TEXT, PAGE_SIZE};
use gift_client::{MemoryPreferences, RankingPhase, RankingSection};
use gift_dom::DomNode;

fn item_ids(dom: &DomNode) -> Vec<String> {
    dom.find_all(&|n| n.has_class("product-card"))
        .into_iter()
        .filter_map(|n| n.key.clone())
        .collect()
}

#[tokio::test]
async fn load_more_reveals_seventh_item_without_refetch() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Ok(products(7)));

    let mut section = RankingSection::load(&h.ctx).await;
    let dom = section.render();
    assert_eq!(
        item_ids(&dom),
        (1..=6).map(|i| format!("product-{}", i)).collect::<Vec<_>>()
    );
    assert!(dom.find_by_key("ranking-more").is_some());

    assert!(section.load_more());
    let dom = section.render();
    assert_eq!(item_ids(&dom).len(), 7);
    assert_eq!(item_ids(&dom)[6], "product-7");
    assert!(dom.find_by_key("ranking-more").is_none());
    assert_eq!(h.api.ranking_calls().len(), 1);
}

#[tokio::test]
async fn stored_selection_is_highlighted_and_queried() {
    let h = harness_with(MemoryPreferences::with_values([
        (LAST_FILTER, "FEMALE"),
        (LAST_TAB, "MANY_RECEIVE"),
    ]));

    let (section, fetch) = RankingSection::mount(h.ctx.prefs.clone());
    assert_eq!((fetch.filter, fetch.tab), (RankingFilter::Female, RankingTab::ManyReceive));
    assert_eq!(fetch.key().to_string(), "ranking/FEMALE/MANY_RECEIVE");

    let dom = section.render();
    let pressed: Vec<&str> = dom
        .find_all(&|n| n.attr("aria-pressed") == Some("true"))
        .into_iter()
        .filter_map(|n| n.key.as_deref())
        .collect();
    assert_eq!(pressed, vec!["filter-FEMALE", "tab-MANY_RECEIVE"]);
    assert!(dom.find_by_key("filter-FEMALE").unwrap().has_class("active"));
    assert!(!dom.find_by_key("filter-ALL").unwrap().has_class("active"));

    let result = fetch.run(&h.ctx).await;
    let mut section = section;
    section.resolve(&fetch, result);
    assert_eq!(
        h.api.ranking_calls(),
        vec![(RankingFilter::Female, RankingTab::ManyReceive)]
    );
}

#[tokio::test]
async fn network_error_shows_only_error_text() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Err(network_error()));

    let section = RankingSection::load(&h.ctx).await;
    assert_eq!(section.phase(), &RankingPhase::Error);

    let dom = section.render();
    assert!(dom.contains_text(ERROR_TEXT));
    assert!(dom.find_by_key("spinner").is_none());
    assert!(dom.find_by_key("ranking-list").is_none());
    assert!(!dom.contains_text(EMPTY_TEXT));
}

#[tokio::test]
async fn empty_ranking_renders_empty_text() {
    let h = harness();
    let section = RankingSection::load(&h.ctx).await;
    let dom = section.render();
    assert!(dom.contains_text(EMPTY_TEXT));
    assert!(dom.find_by_key("spinner").is_none());
}

#[tokio::test]
async fn every_selection_queries_its_own_key() {
    let h = harness();
    for f in RankingFilter::VARIANTS {
        for t in RankingTab::VARIANTS {
            h.api.set_ranking(f, t, Ok(vec![common::product(100 + f as u64 * 10 + t as u64)]));
        }
    }

    let (mut section, fetch) = RankingSection::mount(h.ctx.prefs.clone());
    let result = fetch.run(&h.ctx).await;
    section.resolve(&fetch, result);

    for f in RankingFilter::VARIANTS {
        for t in RankingTab::VARIANTS {
            let fetches = [section.select_filter(f), section.select_tab(t)];
            for fetch in fetches.into_iter().flatten() {
                let result = fetch.run(&h.ctx).await;
                section.resolve(&fetch, result);
            }
            let expected = 100 + f as u64 * 10 + t as u64;
            let ids: Vec<u64> = section.visible_items().iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![expected], "selection {}/{}", f, t);
            assert_eq!(section.query_key().to_string(), format!("ranking/{}/{}", f, t));
        }
    }
}

#[tokio::test]
async fn slow_result_for_old_selection_is_ignored() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Ok(products(9)));
    h.api.set_ranking(RankingFilter::Female, RankingTab::ManyWish, Ok(products(2)));
    let gate = h.api.gate_ranking(RankingFilter::All, RankingTab::ManyWish);

    let (mut section, first) = RankingSection::mount(h.ctx.prefs.clone());
    let second = section.select_filter(RankingFilter::Female).unwrap();

    let slow = first.run(&h.ctx);
    let fast = async {
        let result = second.run(&h.ctx).await;
        gate.notify_one();
        result
    };
    let (slow_result, fast_result) = tokio::join!(slow, fast);

    assert!(section.resolve(&second, fast_result));
    assert!(!section.resolve(&first, slow_result));
    assert_eq!(section.visible_items().len(), 2);
    assert_eq!(section.filter(), RankingFilter::Female);

    // The superseded result is still cached under its own key.
    let cached: Option<Vec<gift_api::RankedProduct>> = h
        .ctx
        .queries
        .get_query_data(&gift_client::queries::ranking_key(RankingFilter::All, RankingTab::ManyWish));
    assert_eq!(cached.map(|v| v.len()), Some(9));
}

#[tokio::test]
async fn reselecting_active_filter_does_nothing() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Ok(products(20)));

    let mut section = RankingSection::load(&h.ctx).await;
    section.load_more();
    assert_eq!(section.visible_count(), PAGE_SIZE * 2);

    assert!(section.select_filter(RankingFilter::All).is_none());
    assert!(section.select_tab(RankingTab::ManyWish).is_none());
    assert_eq!(section.visible_count(), PAGE_SIZE * 2);
    assert_eq!(h.api.ranking_calls().len(), 1);
    assert_eq!(h.prefs.read(LAST_FILTER), None);
}

#[tokio::test]
async fn switching_back_within_freshness_uses_cache() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Ok(products(3)));
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyReceive, Ok(products(4)));

    let mut section = RankingSection::load(&h.ctx).await;
    for tab in [RankingTab::ManyReceive, RankingTab::ManyWish] {
        let fetch = section.select_tab(tab).unwrap();
        let result = fetch.run(&h.ctx).await;
        section.resolve(&fetch, result);
    }

    assert_eq!(section.visible_items().len(), 3);
    assert_eq!(
        h.api.ranking_calls(),
        vec![
            (RankingFilter::All, RankingTab::ManyWish),
            (RankingFilter::All, RankingTab::ManyReceive),
        ]
    );
}

#[tokio::test]
async fn selection_survives_remount() {
    let h = harness();
    let (mut section, _) = RankingSection::mount(h.ctx.prefs.clone());
    section.select_filter(RankingFilter::Teen);
    section.select_tab(RankingTab::ManyWishReceive);
    drop(section);

    let (_, fetch) = RankingSection::mount(h.ctx.prefs.clone());
    assert_eq!(
        (fetch.filter, fetch.tab),
        (RankingFilter::Teen, RankingTab::ManyWishReceive)
    );
}

#[tokio::test]
async fn concurrent_sections_share_one_fetch() {
    let h = harness();
    h.api.set_ranking(RankingFilter::All, RankingTab::ManyWish, Ok(products(3)));
    let gate = h.api.gate_ranking(RankingFilter::All, RankingTab::ManyWish);

    let (mut home, home_fetch) = RankingSection::mount(h.ctx.prefs.clone());
    let (mut other, other_fetch) = RankingSection::mount(h.ctx.prefs.clone());

    let first = home_fetch.run(&h.ctx);
    let second = async {
        while h.api.ranking_calls().is_empty() {
            tokio::task::yield_now().await;
        }
        let joined = other_fetch.run(&h.ctx);
        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        tokio::join!(joined, release).0
    };
    let (home_result, other_result) = tokio::join!(first, second);

    assert!(home.resolve(&home_fetch, home_result));
    assert!(other.resolve(&other_fetch, other_result));
    for section in [&home, &other] {
        assert_eq!(section.visible_items().len(), 3);
        assert!(!section.render().contains_text(ERROR_TEXT));
    }
    assert_eq!(h.api.ranking_calls().len(), 1);
}
