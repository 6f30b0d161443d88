//! gift-client — Client core of the gift shop
//!
//! Views render into `gift_dom::DomNode` trees from the state held here and
//! in the shared query cache. User actions (filter and tab clicks, load
//! more, wish toggles, form submits) are plain methods and async functions;
//! the host decides how they are triggered.

pub mod config;
pub mod context;
pub mod error;
pub mod login;
pub mod notice;
pub mod order;
pub mod prefs;
pub mod product;
pub mod queries;
pub mod ranking;
pub mod session;
pub mod themes;
pub mod view;
pub mod wish;

pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ClientError, LoginError, OrderError, ValidationError};
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier};
pub use prefs::{FilePreferences, MemoryPreferences, Preferences};
pub use ranking::{RankingFetch, RankingPhase, RankingSection};
pub use session::SessionStore;
