pub mod auth;

pub use auth::{
    Auth0Client, AuthError, Claim, EmailIdentityResolver, IdentityResolver, LocalUser, NewUser,
    Profile, ResolveError, UserId, UserRepository,
};

#[cfg(any(test, feature = "test-mocks"))]
pub mod test_utils;
