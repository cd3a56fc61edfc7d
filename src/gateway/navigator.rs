use std::sync::Mutex;

/// Process-wide navigation side effect used when the session is no longer
/// valid. Navigating is a hard reset: callers must not expect to resume.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Tells the terminal operator to log in again
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        tracing::warn!(route = %route, "Session expired, redirecting to login");
        eprintln!("Session expired. Log in again ({}): chargeops auth token <TOKEN>", route);
    }
}

/// Records every navigation instead of performing it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.routes.lock().map(|routes| routes.len()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
