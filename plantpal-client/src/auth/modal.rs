//! Login/signup dialog state
//!
//! Success closes the dialog. Failure keeps it open with the error shown;
//! an unknown account on login is reported as a prompt to sign up.

use super::provider::{AuthError, AuthResult, IdentityProvider, User};
use super::session::AuthSession;

pub const USER_NOT_FOUND_MESSAGE: &str =
    "It looks like you don't have an account yet! Please sign up first!";
pub const MISSING_CREDENTIALS: &str = "Please enter your email and password.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthTab {
    #[default]
    Login,
    SignUp,
}

impl AuthTab {
    pub fn label(&self) -> &'static str {
        match self {
            AuthTab::Login => "Login",
            AuthTab::SignUp => "Sign Up",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginModal {
    open: bool,
    tab: AuthTab,
    error: Option<String>,
}

impl LoginModal {
    /// Show a fresh dialog on the Login tab
    pub fn open(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn select_tab(&mut self, tab: AuthTab) {
        self.tab = tab;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn tab(&self) -> AuthTab {
        self.tab
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit_login<P: IdentityProvider>(
        &mut self,
        session: &AuthSession<P>,
        email: &str,
        password: &str,
    ) -> AuthResult<User> {
        let result = match check_credentials(email, password) {
            Ok(()) => session.sign_in(email.trim(), password).await,
            Err(e) => Err(e),
        };

        self.settle(result, |err| {
            if err.is_user_not_found() {
                USER_NOT_FOUND_MESSAGE.to_string()
            } else {
                err.to_string()
            }
        })
    }

    pub async fn submit_sign_up<P: IdentityProvider>(
        &mut self,
        session: &AuthSession<P>,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<User> {
        let result = match check_credentials(email, password) {
            Ok(()) => session.sign_up(name.trim(), email.trim(), password).await,
            Err(e) => Err(e),
        };

        self.settle(result, |err| err.to_string())
    }

    fn settle<F>(&mut self, result: AuthResult<User>, message: F) -> AuthResult<User>
    where
        F: FnOnce(&AuthError) -> String,
    {
        match &result {
            Ok(_) => {
                self.open = false;
                self.error = None;
            }
            Err(err) => self.error = Some(message(err)),
        }
        result
    }
}

fn check_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput(MISSING_CREDENTIALS.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{FakeProvider, KNOWN_EMAIL, KNOWN_PASSWORD};

    fn opened() -> LoginModal {
        let mut modal = LoginModal::default();
        modal.open();
        modal
    }

    #[test]
    fn test_open_starts_on_login_tab() {
        let mut modal = opened();
        modal.select_tab(AuthTab::SignUp);
        modal.close();
        modal.open();

        assert!(modal.is_open());
        assert_eq!(modal.tab(), AuthTab::Login);
        assert!(modal.error().is_none());
    }

    #[tokio::test]
    async fn test_login_success_closes_modal() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();

        modal
            .submit_login(&session, KNOWN_EMAIL, KNOWN_PASSWORD)
            .await
            .unwrap();

        assert!(!modal.is_open());
        assert!(session.is_signed_in());
    }

    #[tokio::test]
    async fn test_unknown_account_prompts_sign_up() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();

        let result = modal
            .submit_login(&session, "stranger@example.com", "pw")
            .await;

        assert!(result.is_err());
        assert!(modal.is_open());
        assert_eq!(modal.error(), Some(USER_NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_wrong_password_shows_provider_message() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();

        let _ = modal.submit_login(&session, KNOWN_EMAIL, "nope").await;

        assert_eq!(modal.error(), Some("The password is invalid."));
    }

    #[tokio::test]
    async fn test_empty_credentials_skip_provider() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();

        let _ = modal.submit_login(&session, "  ", "").await;

        assert_eq!(modal.error(), Some(MISSING_CREDENTIALS));
        assert_eq!(session_calls(&session), 0);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_keeps_modal_open() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();
        modal.select_tab(AuthTab::SignUp);

        let result = modal
            .submit_sign_up(&session, "Fern", KNOWN_EMAIL, "pw123456")
            .await;

        assert!(result.is_err());
        assert!(modal.is_open());
        assert_eq!(
            modal.error(),
            Some("The email address is already in use by another account.")
        );
    }

    #[tokio::test]
    async fn test_sign_up_success_closes_modal() {
        let session = AuthSession::new(FakeProvider::default());
        let mut modal = opened();
        modal.select_tab(AuthTab::SignUp);

        let user = modal
            .submit_sign_up(&session, " Moss ", "moss@example.com", "pw123456")
            .await
            .unwrap();

        assert_eq!(user.display_name.as_deref(), Some("Moss"));
        assert!(!modal.is_open());
    }

    fn session_calls(session: &AuthSession<FakeProvider>) -> usize {
        session.provider().calls()
    }
}
