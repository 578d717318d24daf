pub mod generate;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the pieces the server binary wires together.
pub use generate::generate_course_handler;
pub use middleware::require_user;
pub use router::build_router;
pub use state::{AppState, CurrentUser};
