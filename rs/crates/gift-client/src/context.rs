//! context.rs — Shared collaborators handed to every view and action

use std::sync::Arc;

use gift_api::{GiftApi, HttpGiftApi};
use gift_query::QueryClient;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::notice::{Notice, NoticeLog, Notifier};
use crate::prefs::{FilePreferences, Preferences};
use crate::session::SessionStore;

/// One per client session. Cloning shares the same cache, backend,
/// preference store and notifier.
#[derive(Clone)]
pub struct ClientContext {
    pub queries: Arc<QueryClient>,
    pub api: Arc<dyn GiftApi>,
    pub prefs: Arc<dyn Preferences>,
    pub notifier: Arc<dyn Notifier>,
}

impl ClientContext {
    pub fn new(
        queries: Arc<QueryClient>,
        api: Arc<dyn GiftApi>,
        prefs: Arc<dyn Preferences>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { queries, api, prefs, notifier }
    }

    /// HTTP backend, on-disk preferences and a `NoticeLog`, all taken from
    /// `config`. The log is returned so the caller can display notices.
    pub fn from_config(config: &ClientConfig) -> Result<(Self, Arc<NoticeLog>), ClientError> {
        let api = HttpGiftApi::from_base_url(config.api_base_url.as_str())?;
        let notices = Arc::new(NoticeLog::new());
        let ctx = Self::new(
            Arc::new(QueryClient::with_options(config.query_options())),
            Arc::new(api),
            Arc::new(FilePreferences::open(&config.prefs_path)),
            notices.clone(),
        );
        Ok((ctx, notices))
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.prefs.clone())
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}
