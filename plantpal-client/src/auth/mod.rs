//! Login and signup
//!
//! - [`provider`]: the identity provider seam and its REST implementation
//! - [`session`]: the signed-in user, published to subscribers on change
//! - [`modal`]: login/signup dialog state
//! - [`header`]: header status line and login/logout button

pub mod header;
pub mod modal;
pub mod provider;
pub mod session;

pub use header::{HeaderAction, HeaderView};
pub use modal::{AuthTab, LoginModal};
pub use provider::{
    AuthError, AuthResult, IdentityProvider, IdentityToolkitProvider, User,
    DEFAULT_IDENTITY_ENDPOINT,
};
pub use session::AuthSession;
