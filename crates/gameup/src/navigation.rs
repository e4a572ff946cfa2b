//! The navigation guard: which view a path shows, and who may see it.
//!
//! ```text
//! resolve(path, is_authenticated)
//!     │
//!     ├── unknown path ─────────────────────→ Redirect("/")
//!     ├── protected view, signed out ───────→ Redirect("/login")
//!     └── otherwise ────────────────────────→ Render(view)
//! ```
//!
//! The guard is a pure function. Callers decide where `is_authenticated`
//! comes from; [`GameUpClient::navigate`](crate::GameUpClient::navigate)
//! waits for the session to be restored first so the answer is never
//! based on the `Restoring` placeholder.

use gameup_protocol::CatalogItemId;

/// Where to go after a successful login or registration.
pub const AFTER_AUTH: &str = "/dashboard";

/// Where to go after logging out.
pub const AFTER_LOGOUT: &str = "/";

/// Where signed-out users are sent when they hit a protected view.
pub const LOGIN: &str = "/login";

/// A screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    /// The detail page of one catalog item.
    GameDetail(CatalogItemId),
    Dashboard,
    MyGames,
    Profile,
}

impl View {
    /// Views that require a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Dashboard | Self::MyGames | Self::Profile)
    }

    /// The canonical path of this view.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => LOGIN.to_string(),
            Self::Register => "/register".to_string(),
            Self::GameDetail(id) => format!("/game/{}", id.0),
            Self::Dashboard => AFTER_AUTH.to_string(),
            Self::MyGames => "/my-games".to_string(),
            Self::Profile => "/profile".to_string(),
        }
    }
}

/// The outcome of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Show this view.
    Render(View),
    /// Go to this path instead.
    Redirect(&'static str),
}

/// Decides what `path` shows for a user who is (or is not) signed in.
pub fn resolve(path: &str, is_authenticated: bool) -> Resolution {
    let Some(view) = match_route(path) else {
        tracing::debug!(path, "unknown route");
        return Resolution::Redirect(AFTER_LOGOUT);
    };
    if view.is_protected() && !is_authenticated {
        tracing::debug!(path, "protected route, redirecting to login");
        return Resolution::Redirect(LOGIN);
    }
    Resolution::Render(view)
}

/// Maps a path to its view. Query string, fragment and a trailing slash
/// are ignored.
fn match_route(path: &str) -> Option<View> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    let view = match trimmed {
        "" => View::Home,
        "/login" => View::Login,
        "/register" => View::Register,
        "/dashboard" => View::Dashboard,
        "/my-games" => View::MyGames,
        "/profile" => View::Profile,
        other => {
            let id = other.strip_prefix("/game/")?;
            // Only plain decimal digits; `parse` alone would accept a '+'.
            if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            View::GameDetail(CatalogItemId(id.parse().ok()?))
        }
    };
    // "" covers "/", but a path that did not start with '/' is not a route.
    path.starts_with('/').then_some(view)
}
