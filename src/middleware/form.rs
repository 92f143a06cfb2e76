use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::db::Fields;

/// Form arguments flattened to one string per key.
///
/// Query string arguments come first, then the urlencoded body; the first
/// value seen for a key wins.
#[derive(Debug, Clone, Default)]
pub struct FlatForm(pub Fields);

impl FlatForm {
    pub fn from_parts(query: Option<&str>, body: &[u8]) -> Self {
        let mut fields = Fields::new();
        let query_pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        let body_pairs = url::form_urlencoded::parse(body);
        for (k, v) in query_pairs.chain(body_pairs) {
            if !fields.contains_key(&*k) {
                fields.insert(k.into_owned(), Value::String(v.into_owned()));
            }
        }
        Self(fields)
    }
}

impl<S> FromRequest<S> for FlatForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_owned);
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self::from_parts(query.as_deref(), &body))
    }
}
