//! order.rs — Gift order form and submission

use std::collections::HashSet;
use std::sync::LazyLock;

use gift_api::{OrderReceiver, OrderRequest};
use gift_dom::DomNode;
use regex::Regex;
use tracing::{info, warn};

use crate::context::ClientContext;
use crate::error::{OrderError, ValidationError};
use crate::notice::Notice;

pub const MAX_RECEIVERS: usize = 10;
pub const ORDER_PLACED: &str = "주문이 성공적으로 완료되었습니다.";
pub const LOGIN_REQUIRED: &str = "로그인이 필요합니다.";
pub const ORDER_FAILED: &str = "주문에 실패했습니다.";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^010\d{8}$").expect("phone pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverInput {
    pub name: String,
    pub phone_number: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub product_id: u64,
    pub orderer_name: String,
    pub message: String,
    pub message_card_id: String,
    pub receivers: Vec<ReceiverInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    Placed,
    /// No session, or the server rejected the token. The caller should send
    /// the user to the login page.
    NeedsLogin,
}

impl OrderForm {
    /// Every problem with the form, in field order.
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.orderer_name.trim().is_empty() {
            errors.push(ValidationError::MissingOrdererName);
        }
        if self.message.trim().is_empty() {
            errors.push(ValidationError::MissingMessage);
        }
        if self.message_card_id.trim().is_empty() {
            errors.push(ValidationError::MissingMessageCard);
        }
        if self.receivers.is_empty() {
            errors.push(ValidationError::NoReceivers);
        }
        if self.receivers.len() > MAX_RECEIVERS {
            errors.push(ValidationError::TooManyReceivers);
        }

        let mut phones = HashSet::new();
        for (index, r) in self.receivers.iter().enumerate() {
            if r.name.trim().is_empty() {
                errors.push(ValidationError::MissingReceiverName { index });
            }
            let phone = r.phone_number.trim();
            if !PHONE_RE.is_match(phone) {
                errors.push(ValidationError::InvalidPhoneNumber { index });
            } else if !phones.insert(phone) {
                errors.push(ValidationError::DuplicatePhoneNumber { index });
            }
            if r.quantity < 1 {
                errors.push(ValidationError::InvalidQuantity { index });
            }
        }
        errors
    }

    pub fn to_request(&self) -> Result<OrderRequest, OrderError> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(OrderError::Invalid(errors));
        }
        Ok(OrderRequest {
            product_id: self.product_id,
            message: self.message.trim().to_string(),
            message_card_id: self.message_card_id.trim().to_string(),
            orderer_name: self.orderer_name.trim().to_string(),
            receivers: self
                .receivers
                .iter()
                .map(|r| OrderReceiver {
                    name: r.name.trim().to_string(),
                    phone_number: r.phone_number.trim().to_string(),
                    quantity: r.quantity,
                })
                .collect(),
        })
    }

    /// Single-receiver form as served by the dev server. Only the first
    /// receiver is shown; `errors` still covers all of them.
    pub fn render(&self) -> DomNode {
        let first = self.receivers.first().cloned().unwrap_or_default();
        let untouched = OrderForm { product_id: self.product_id, ..Default::default() };
        let errors = if *self == untouched { Vec::new() } else { self.errors() };
        let field = |name: &str, label: &str, value: &str| {
            DomNode::element("label")
                .with_child(DomNode::text("span", label))
                .with_child(
                    DomNode::element("input")
                        .with_attr("name", name)
                        .with_attr("value", value),
                )
        };
        let quantity = if first.quantity == 0 { 1 } else { first.quantity };
        DomNode::element("form")
            .with_key("order-form")
            .with_attr("method", "post")
            .with_attr("action", format!("/order/{}", self.product_id))
            .with_child(field("message", "메시지", &self.message))
            .with_child(field("message_card_id", "메시지 카드", &self.message_card_id))
            .with_child(field("orderer_name", "보내는 사람", &self.orderer_name))
            .with_child(field("receiver_name", "받는 사람", &first.name))
            .with_child(field("receiver_phone", "전화번호", &first.phone_number))
            .with_child(field("receiver_quantity", "수량", &quantity.to_string()))
            .with_children(
                errors
                    .iter()
                    .map(|e| DomNode::text("p", &e.to_string()).with_class("field-error")),
            )
            .with_child(
                DomNode::text("button", "주문하기")
                    .with_key("order-submit")
                    .with_attr("type", "submit"),
            )
    }
}

/// Validate and place the order with the current session's token.
pub async fn submit(ctx: &ClientContext, form: &OrderForm) -> Result<OrderOutcome, OrderError> {
    let request = form.to_request()?;

    let Some(token) = ctx.session().auth_token() else {
        ctx.notify(Notice::error(LOGIN_REQUIRED));
        return Ok(OrderOutcome::NeedsLogin);
    };

    match ctx.api.order(&request, &token).await {
        Ok(()) => {
            info!(product_id = request.product_id, "order completed");
            ctx.notify(Notice::success(ORDER_PLACED));
            Ok(OrderOutcome::Placed)
        }
        Err(e) if e.is_unauthorized() => {
            warn!(product_id = request.product_id, "order rejected, session expired");
            ctx.notify(Notice::error(LOGIN_REQUIRED));
            Ok(OrderOutcome::NeedsLogin)
        }
        Err(e) => {
            let message = e.server_message().unwrap_or(ORDER_FAILED).to_string();
            warn!(product_id = request.product_id, error = %e, "order failed");
            ctx.notify(Notice::error(message.clone()));
            Err(OrderError::Failed(message))
        }
    }
}
