use crate::model::{ContentId, RecordedVideo};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Screens reachable in the app, with their typed parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Route {
    ContentList,
    Content {
        content_id: ContentId,
    },
    Camera {
        content_id: ContentId,
        /// Upper bound on recording length, seconds
        max_length: Option<f64>,
    },
    Review {
        content_id: ContentId,
        recorded_video: Option<RecordedVideo>,
        should_cancel_video: bool,
    },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::ContentList => "ContentList",
            Route::Content { .. } => "Content",
            Route::Camera { .. } => "Camera",
            Route::Review { .. } => "VideoWithControls",
        }
    }
}

/// Navigation surface provided by the host application
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn go_back(&self);
}

/// What a [`NavigationLog`] observed, in order
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationAction {
    Navigate(Route),
    Back,
}

/// Navigator that keeps a route stack and a history of every call
#[derive(Debug, Default)]
pub struct NavigationLog {
    stack: Mutex<Vec<Route>>,
    history: Mutex<Vec<NavigationAction>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `route` on the stack without recording it as an action
    pub fn starting_at(route: Route) -> Self {
        let log = Self::default();
        log.stack.lock().push(route);
        log
    }

    pub fn current(&self) -> Option<Route> {
        self.stack.lock().last().cloned()
    }

    pub fn history(&self) -> Vec<NavigationAction> {
        self.history.lock().clone()
    }

    pub fn last_action(&self) -> Option<NavigationAction> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route.name());
        self.stack.lock().push(route.clone());
        self.history.lock().push(NavigationAction::Navigate(route));
    }

    fn go_back(&self) {
        let popped = self.stack.lock().pop();
        debug!(
            "Navigating back from {}",
            popped.as_ref().map(Route::name).unwrap_or("<root>")
        );
        self.history.lock().push(NavigationAction::Back);
    }
}
