use gift_api::ApiError;
use gift_query::QueryError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("configuration: {0}")]
    Config(String),
}

/// A form field that failed validation. The display text is shown to the
/// user as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ID는 이메일 형식이어야 합니다.")]
    InvalidEmail,
    #[error("PW는 최소 8글자 이상이어야 합니다.")]
    PasswordTooShort,
    #[error("보내는 사람 이름을 입력해주세요.")]
    MissingOrdererName,
    #[error("메시지를 입력해주세요.")]
    MissingMessage,
    #[error("메시지 카드를 선택해주세요.")]
    MissingMessageCard,
    #[error("받는 사람을 1명 이상 추가해주세요.")]
    NoReceivers,
    #[error("받는 사람은 최대 10명까지 추가할 수 있습니다.")]
    TooManyReceivers,
    #[error("받는 사람 이름을 입력해주세요.")]
    MissingReceiverName { index: usize },
    #[error("전화번호는 010으로 시작하는 11자리 숫자여야 합니다.")]
    InvalidPhoneNumber { index: usize },
    #[error("수량은 1개 이상이어야 합니다.")]
    InvalidQuantity { index: usize },
    #[error("중복된 전화번호가 있습니다.")]
    DuplicatePhoneNumber { index: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0}")]
    Invalid(ValidationError),
    #[error("{0}")]
    Failed(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order form has {} invalid field(s)", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error("{0}")]
    Failed(String),
}
