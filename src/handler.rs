use std::sync::Arc;

use axum::{Router, http::Method};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::books;
use crate::store::BookStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookStore>,
}

impl AppState {
    pub fn new(store: impl BookStore) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .nest("/api", books::routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
