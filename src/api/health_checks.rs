use axum::http::StatusCode;

pub async fn ok() -> StatusCode {
    StatusCode::OK
}
