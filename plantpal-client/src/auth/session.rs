//! Auth session
//!
//! Holds the signed-in user and publishes every change on a watch channel.
//! Subscribers always see the latest state; intermediate states may be
//! skipped.

use tokio::sync::watch;
use tracing::info;

use super::provider::{AuthResult, IdentityProvider, User};

pub struct AuthSession<P> {
    provider: P,
    state: watch::Sender<Option<User>>,
}

impl<P: IdentityProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        let (state, _) = watch::channel(None);
        Self { provider, state }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Listen for auth-state changes
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User> {
        let user = self.provider.sign_in(email, password).await?;
        info!(uid = %user.uid, "Signed in");
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> AuthResult<User> {
        let user = self.provider.sign_up(name, email, password).await?;
        info!(uid = %user.uid, "Account created");
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await?;
        if let Some(user) = self.state.send_replace(None) {
            info!(uid = %user.uid, "Signed out");
        }
        Ok(())
    }
}
