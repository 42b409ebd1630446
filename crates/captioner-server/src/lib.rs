//! Captioner server — upload an image, get back a social-ready caption.

pub mod form;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
