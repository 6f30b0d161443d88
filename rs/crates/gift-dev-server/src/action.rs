//! action.rs — Click actions posted back by rendered pages

use std::str::FromStr;

use gift_api::{RankingFilter, RankingTab};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Filter(RankingFilter),
    Tab(RankingTab),
    More,
    Wish(u64),
    ThemeMore(u64),
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AppError::BadRequest(format!("unknown action: {}", s));
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        match (name, arg) {
            ("more", None) => Ok(Self::More),
            ("filter", Some(v)) => v.parse().map(Self::Filter).map_err(|_| bad()),
            ("tab", Some(v)) => v.parse().map(Self::Tab).map_err(|_| bad()),
            ("wish", Some(v)) => v.parse().map(Self::Wish).map_err(|_| bad()),
            ("theme-more", Some(v)) => v.parse().map(Self::ThemeMore).map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}
