use axum::response::Response;

use crate::server::static_files::serve_embedded;

/// `GET /addPOI`
pub async fn add_poi_page() -> Response {
    serve_embedded("add_poi.html")
}

/// `GET /thank_you`
pub async fn thank_you_page() -> Response {
    serve_embedded("thank_you.html")
}
