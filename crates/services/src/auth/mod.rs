pub mod oauth;
pub mod ports;
pub mod profile;
pub mod resolver;

pub use oauth::{Auth0Client, TokenResponse};
pub use ports::*;
pub use profile::{Claim, Profile};
pub use resolver::EmailIdentityResolver;
