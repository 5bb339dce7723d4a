pub mod app_error_impl;
pub mod app_state;
pub mod cookies;
pub mod middleware;
pub mod routes;
