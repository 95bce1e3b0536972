pub mod handlers;
pub mod router;
pub mod models;
pub mod services;
pub mod state;

pub use models::*;
pub use services::*;
pub use state::{AppState, DirectoryStore};

pub use router::doctor_routes;
