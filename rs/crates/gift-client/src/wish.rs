//! wish.rs — Optimistic wish toggle
//!
//! The wish state of a product lives in the shared cache under
//! `productWish/<id>`, so every view of that product sees the speculative
//! value the moment it is written.

use gift_api::ProductWish;
use tracing::{info, warn};

use crate::context::ClientContext;
use crate::error::ClientError;
use crate::notice::Notice;
use crate::queries::product_wish_key;

pub use crate::queries::fetch_wish;

pub const TOGGLE_FAILED: &str = "찜하기 상태 변경에 실패했습니다.";

/// The value shown while the toggle request is in flight.
pub fn flipped(wish: ProductWish) -> ProductWish {
    if wish.is_wished {
        ProductWish {
            is_wished: false,
            wish_count: wish.wish_count.saturating_sub(1),
        }
    } else {
        ProductWish {
            is_wished: true,
            wish_count: wish.wish_count + 1,
        }
    }
}

/// Flip the wish on `product_id`.
///
/// Outstanding reads of the wish are cancelled first, then the cached value
/// is flipped (only if one exists). On failure the snapshot taken before the
/// flip is written back untouched and a notice is raised. Either way the
/// entry is invalidated so the next read fetches the server's answer.
pub async fn toggle_wish(ctx: &ClientContext, product_id: u64) -> Result<(), ClientError> {
    let key = product_wish_key(product_id);

    ctx.queries.cancel_queries(&key);
    let snapshot: Option<ProductWish> = ctx.queries.get_query_data(&key);
    if let Some(previous) = snapshot {
        if let Err(e) = ctx.queries.set_query_data(&key, &flipped(previous)) {
            warn!(%key, error = %e, "could not apply optimistic wish");
        }
    }

    let result = ctx.api.toggle_product_wish(product_id).await;

    if let Err(e) = &result {
        warn!(product_id, error = %e, "wish toggle failed, rolling back");
        if let Some(previous) = snapshot {
            if let Err(e) = ctx.queries.set_query_data(&key, &previous) {
                warn!(%key, error = %e, "could not restore wish snapshot");
            }
        }
        ctx.notify(Notice::error(TOGGLE_FAILED));
    } else {
        info!(product_id, "wish toggled");
    }

    ctx.queries.invalidate_queries(&key);
    result.map_err(ClientError::from)
}
