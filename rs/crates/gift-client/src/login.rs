//! login.rs — Login form and submission

use std::sync::LazyLock;

use gift_api::{LoginRequest, UserSession};
use gift_dom::DomNode;
use regex::Regex;
use tracing::info;

use crate::context::ClientContext;
use crate::error::{LoginError, ValidationError};
use crate::notice::Notice;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const LOGIN_FAILED: &str = "로그인에 실패했습니다.";
pub const EMAIL_PLACEHOLDER: &str = "이메일 (@kakao.com)";
pub const PASSWORD_PLACEHOLDER: &str = "비밀번호";
pub const SUBMIT_LABEL: &str = "로그인";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    pub fn email_error(&self) -> Option<ValidationError> {
        (!EMAIL_RE.is_match(self.email.trim())).then_some(ValidationError::InvalidEmail)
    }

    pub fn password_error(&self) -> Option<ValidationError> {
        (self.password.chars().count() < MIN_PASSWORD_LEN)
            .then_some(ValidationError::PasswordTooShort)
    }

    pub fn can_submit(&self) -> bool {
        self.email_error().is_none() && self.password_error().is_none()
    }

    pub fn to_request(&self) -> Result<LoginRequest, ValidationError> {
        if let Some(e) = self.email_error().or_else(|| self.password_error()) {
            return Err(e);
        }
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Field errors are only shown for fields the user has typed into.
    pub fn render(&self) -> DomNode {
        let mut form = DomNode::element("form")
            .with_key("login-form")
            .with_attr("method", "post")
            .with_attr("action", "/login")
            .with_child(
                DomNode::element("input")
                    .with_attr("name", "email")
                    .with_attr("type", "email")
                    .with_attr("placeholder", EMAIL_PLACEHOLDER)
                    .with_attr("value", self.email.as_str()),
            );
        if let Some(e) = self.email_error().filter(|_| !self.email.is_empty()) {
            form = form.with_child(DomNode::text("p", &e.to_string()).with_key("email-error"));
        }
        form = form.with_child(
            DomNode::element("input")
                .with_attr("name", "password")
                .with_attr("type", "password")
                .with_attr("placeholder", PASSWORD_PLACEHOLDER),
        );
        if let Some(e) = self.password_error().filter(|_| !self.password.is_empty()) {
            form = form.with_child(DomNode::text("p", &e.to_string()).with_key("password-error"));
        }
        let mut submit = DomNode::text("button", SUBMIT_LABEL)
            .with_key("login-submit")
            .with_attr("type", "submit");
        if !self.can_submit() {
            submit = submit.with_attr("disabled", "disabled");
        }
        form.with_child(submit)
    }
}

/// Validate, log in and remember the session. Server failures raise a
/// notice with the server's message, or a generic one.
pub async fn submit(ctx: &ClientContext, form: &LoginForm) -> Result<UserSession, LoginError> {
    let request = form.to_request().map_err(LoginError::Invalid)?;
    match ctx.api.login(&request).await {
        Ok(session) => {
            ctx.session().login(&session);
            info!(email = %session.email, "login succeeded");
            Ok(session)
        }
        Err(e) => {
            let message = e.server_message().unwrap_or(LOGIN_FAILED).to_string();
            ctx.notify(Notice::error(message.clone()));
            Err(LoginError::Failed(message))
        }
    }
}
