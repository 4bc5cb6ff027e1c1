// API Middleware
//
// Session authentication for routes that need a logged-in user.

pub mod auth;

// Re-export commonly used items
pub use auth::{auth_middleware, AuthenticatedUser};
