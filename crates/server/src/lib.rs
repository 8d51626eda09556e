pub mod error;
pub mod middleware;
pub mod routes;

/// Shared handler state: the assistant built once in `main`
pub type AppState = taskverse::Assistant;
