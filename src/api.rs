use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use std::convert::Infallible;
use std::fmt;

pub const NO_BOOK_EXISTS: &str = "no book exists";
pub const DELETE_SUCCESSFUL: &str = "delete successful";
pub const COMPLETE_DELETE_SUCCESSFUL: &str = "complete delete successful";

/// A request body given either as JSON or as an urlencoded form.
///
/// Bodies that are absent, of another content type or undecodable are treated
/// as carrying no fields at all, so they fail the presence checks instead of
/// producing a rejection.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait::async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let parsed = if content_type.starts_with("application/json") {
            match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => Some(value),
                Err(rejection) => {
                    tracing::debug!("ignoring undecodable json body: {}", rejection.body_text());
                    None
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => Some(value),
                Err(rejection) => {
                    tracing::debug!("ignoring undecodable form body: {}", rejection.body_text());
                    None
                }
            }
        } else {
            None
        };

        Ok(Payload(parsed.unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required field {}", self.0)
    }
}

impl std::error::Error for MissingField {}

fn required(value: Option<String>, field: &'static str) -> Result<String, MissingField> {
    value.filter(|v| !v.is_empty()).ok_or(MissingField(field))
}

/// Scalar body values are all accepted as text: `42` becomes `"42"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookParams {
    #[serde(default, deserialize_with = "scalar_text")]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentParams {
    #[serde(default, deserialize_with = "scalar_text")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub comment: String,
}

impl TryFrom<CreateBookParams> for NewBook {
    type Error = MissingField;

    fn try_from(params: CreateBookParams) -> Result<Self, Self::Error> {
        Ok(NewBook {
            title: required(params.title, "title")?,
        })
    }
}

impl TryFrom<AddCommentParams> for NewComment {
    type Error = MissingField;

    fn try_from(params: AddCommentParams) -> Result<Self, Self::Error> {
        Ok(NewComment {
            comment: required(params.comment, "comment")?,
        })
    }
}
