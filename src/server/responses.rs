use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct NewsUnavailable {
    pub id: i64,
}

impl IntoResponse for NewsUnavailable {
    fn into_response(self) -> Response {
        let id = self.id;

        IntoResponse::into_response((
            StatusCode::BAD_GATEWAY,
            format!("The news item #{id} could not be retrieved from the news service"),
        ))
    }
}
