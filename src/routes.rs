//! Client-side navigation targets.

use std::fmt;

/// Screens reachable in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Dashboard,
    PasswordReset,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/home",
            Route::Dashboard => "/dashboard",
            Route::PasswordReset => "/request/password_reset",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
