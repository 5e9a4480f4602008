//! Route table and navigation guard for the ArcHive client.
//!
//! The guard is a pure, synchronous function of the destination route and
//! the current auth state. It runs before every navigation and never
//! suspends; the presentation layer applies the returned decision.

mod navigator;

pub use navigator::{Navigator, NoopNavigator, RecordingNavigator};

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Friends,
    Arcs,
    Rewards,
}

impl Route {
    /// All routes, in table order.
    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Home,
        Route::Friends,
        Route::Arcs,
        Route::Rewards,
    ];

    /// Canonical path for this route.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Friends => "/friends",
            Route::Arcs => "/arcs",
            Route::Rewards => "/rewards",
        }
    }

    /// Whether navigating here requires an authenticated session.
    /// Only the login page is reachable anonymously.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Look up a route by path. `/home` is an alias for the home route.
    pub fn from_path(path: &str) -> Option<Route> {
        match path {
            "/login" => Some(Route::Login),
            "/" | "/home" => Some(Route::Home),
            "/friends" => Some(Route::Friends),
            "/arcs" => Some(Route::Arcs),
            "/rewards" => Some(Route::Rewards),
            _ => None,
        }
    }
}

/// Outcome of the navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested route.
    Allow,
    /// Session required but absent.
    RedirectToLogin,
    /// Already signed in; the login page is not shown again.
    RedirectToHome,
}

/// Decide whether a navigation to `route` may proceed given the current
/// auth state.
pub fn evaluate(route: Route, authenticated: bool) -> NavigationDecision {
    if route.requires_auth() && !authenticated {
        tracing::debug!(path = route.path(), "Guard: redirecting to login");
        NavigationDecision::RedirectToLogin
    } else if route == Route::Login && authenticated {
        tracing::debug!("Guard: already authenticated, redirecting home");
        NavigationDecision::RedirectToHome
    } else {
        NavigationDecision::Allow
    }
}
