#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Todo,
    Notes,
    Calendar,
    Chat,
}

impl View {
    pub fn all() -> [View; 5] {
        [View::Dashboard, View::Todo, View::Notes, View::Calendar, View::Chat]
    }

    pub fn index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Todo => 1,
            View::Notes => 2,
            View::Calendar => 3,
            View::Chat => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Todo => "To-Do",
            View::Notes => "Notes",
            View::Calendar => "Calendar",
            View::Chat => "AI Chat",
        }
    }
}

/// Tracks the visible view.
#[derive(Debug, Clone, Default)]
pub struct Router {
    active: View,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    /// Switches view. Returns `true` when the dashboard needs recomputing.
    pub fn activate(&mut self, view: View) -> bool {
        self.active = view;
        view == View::Dashboard
    }

    pub fn next(&mut self) -> bool {
        let next = (self.active.index() + 1) % View::all().len();
        self.activate(View::all()[next])
    }

    pub fn prev(&mut self) -> bool {
        let len = View::all().len();
        let prev = (self.active.index() + len - 1) % len;
        self.activate(View::all()[prev])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_dashboard_requests_refresh() {
        let mut router = Router::new();
        assert!(!router.activate(View::Notes));
        assert_eq!(router.active(), View::Notes);
        assert!(router.activate(View::Dashboard));
    }

    #[test]
    fn test_cycle_wraps() {
        let mut router = Router::new();
        assert!(!router.prev());
        assert_eq!(router.active(), View::Chat);
        assert!(router.next());
        assert_eq!(router.active(), View::Dashboard);
    }

    #[test]
    fn test_index_roundtrip() {
        for view in View::all() {
            assert_eq!(View::from_index(view.index()), Some(view));
        }
        assert_eq!(View::from_index(5), None);
    }
}
