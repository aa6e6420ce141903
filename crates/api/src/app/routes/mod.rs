use axum::Router;

pub mod products;
pub mod system;
pub mod users;

/// Router for the resource endpoints, mounted under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/products", products::router())
}
