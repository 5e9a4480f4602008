//! Forced-navigation seam.
//!
//! The HTTP layer needs to push the client to the login route when the
//! backend invalidates the session. It emits the navigation through this
//! trait; the shell decides what a navigation means on its platform.

use crate::Route;

/// A sink for forced client-side navigations.
pub trait Navigator: Send + Sync {
    /// Navigate to a route.
    fn navigate(&self, route: Route);
}

/// A no-op navigator that discards navigations.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: Route) {}
}

/// A navigator that records navigations for testing.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: std::sync::Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded navigations.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("lock poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("lock poisoned").push(route);
    }
}
