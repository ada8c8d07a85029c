pub mod admin;
pub mod auth;
pub mod medications;
pub mod middleware;
pub mod rest;
pub mod routes;
pub mod schedule;
pub mod state;

#[cfg(test)]
mod test_support;

pub use middleware::{require_admin, require_auth};
pub use rest::ApiDoc;
pub use routes::api_router;
