pub mod handlers;
pub mod live_search;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
