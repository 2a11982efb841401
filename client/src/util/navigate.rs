//! Navigation seam between auth logic and the host's router.

use std::sync::{Mutex, PoisonError};

/// Something that can move the app to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

/// Navigator that only records where it was sent.
///
/// Hosts without a router (the CLI) read back the last route to report it.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent route, if any navigation happened.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_navigator_records_in_order() {
        let nav = HistoryNavigator::new();
        assert_eq!(nav.current(), None);
        nav.navigate("/login");
        nav.navigate("/pastor");
        assert_eq!(nav.history(), vec!["/login".to_owned(), "/pastor".to_owned()]);
        assert_eq!(nav.current().as_deref(), Some("/pastor"));
    }

    #[test]
    fn closures_are_navigators() {
        let seen = Mutex::new(Vec::new());
        let nav = |path: &str| seen.lock().unwrap().push(path.to_owned());
        Navigator::navigate(&nav, "/lgpd");
        assert_eq!(seen.lock().unwrap().as_slice(), ["/lgpd".to_owned()]);
    }
}
