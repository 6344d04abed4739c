use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Unauthorized(UnauthorizedType),

    #[error("You have no permission to access this resource")]
    Forbidden,

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid value for field {0}")]
    InvalidField(&'static str),

    #[error("{0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    #[error("{0}")]
    DatabaseError(#[from] mongodb::error::Error),

    #[error("{0}")]
    BSONSerError(#[from] bson::ser::Error),

    #[error("{0}")]
    IdTokenError(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    GatewayError(#[from] reqwest::Error),

    #[error("payment processor rejected the request: {0}")]
    PaymentProcessor(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UnauthorizedType {
    #[error("Unauthorized User")]
    MissingIdentity,

    #[error("Unauthorized User")]
    OwnerMismatch,

    #[error("Invalid ID token")]
    InvalidIdToken,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorJson {
    r#type: String,
    message: String,
}

impl From<Error> for ErrorJson {
    fn from(err: Error) -> Self {
        Self {
            r#type: err.to_string_variant(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("error: {:?}", self);
        let status = match self {
            Self::Unauthorized(..) | Self::IdTokenError(..) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MissingField(..) | Self::InvalidField(..) | Self::MultipartError(..) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::DatabaseError(..) | Self::BSONSerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayError(..) | Self::PaymentProcessor(..) => StatusCode::BAD_GATEWAY,
        };

        let error = ErrorJson::from(self);

        (status, Json(error)).into_response()
    }
}

impl Error {
    pub fn to_string_variant(&self) -> String {
        macro_rules! match_var {
            ($id:ident !) => {
                Self::$id
            };
            ($id:ident (..)) => {
                Self::$id(..)
            };
        }

        macro_rules! variant {
            ($($name:ident $tt:tt),+) => {
                match self {
                    $(
                        match_var!($name $tt) => {
                            stringify!($name)
                       }
                    )+
                }
            };
        }

        variant! {
            Unauthorized(..),
            Forbidden!,
            MissingField(..),
            InvalidField(..),
            MultipartError(..),
            DatabaseError(..),
            BSONSerError(..),
            IdTokenError(..),
            GatewayError(..),
            PaymentProcessor(..)
        }
        .to_string()
    }
}
