//! Header login status

use super::provider::User;

pub const SIGNED_OUT_STATUS: &str = "Not Logged-In";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Login,
    Logout,
}

impl HeaderAction {
    pub fn label(&self) -> &'static str {
        match self {
            HeaderAction::Login => "Login",
            HeaderAction::Logout => "Logout",
        }
    }
}

/// Status line plus the login/logout button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub status: String,
    pub action: HeaderAction,
}

impl HeaderView {
    pub fn from_user(user: Option<&User>) -> Self {
        match user {
            Some(user) => Self {
                status: format!(
                    "Logged in as {} ({})",
                    user.display_name.as_deref().unwrap_or(""),
                    user.email
                ),
                action: HeaderAction::Logout,
            },
            None => Self {
                status: SIGNED_OUT_STATUS.to_string(),
                action: HeaderAction::Login,
            },
        }
    }
}
