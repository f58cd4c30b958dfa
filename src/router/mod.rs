// Client-side route table and navigation guard

use anyhow::Result;
use std::sync::Arc;

use crate::auth::store::{TokenStore, ACCESS_TOKEN_KEY};

/// Public login route, also the redirect target for blocked navigation
pub const LOGIN_ROUTE: &str = "/";

/// Protected landing route shown after a successful login
pub const LANDING_ROUTE: &str = "/pizzas";

/// Route the authorization server redirects back to
pub const CALLBACK_ROUTE: &str = "/callback";

/// Capability that performs the actual navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// A single route definition
#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub requires_auth: bool,
}

/// Decision produced by the navigation guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Navigation guard: allow when the route is public or a token is present,
/// redirect to the login route otherwise
///
/// Pure function of the route metadata and token presence; validity and
/// expiry are not checked.
pub fn guard(requires_auth: bool, has_token: bool) -> GuardDecision {
    if requires_auth && !has_token {
        GuardDecision::Redirect(LOGIN_ROUTE)
    } else {
        GuardDecision::Allow
    }
}

/// Route table plus the guard run before every navigation
pub struct Router {
    routes: Vec<Route>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(
        routes: Vec<Route>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            routes,
            store,
            navigator,
        }
    }

    /// The application's route table: login, protected landing, callback
    pub fn with_default_routes(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(
            vec![
                Route {
                    path: LOGIN_ROUTE,
                    requires_auth: false,
                },
                Route {
                    path: LANDING_ROUTE,
                    requires_auth: true,
                },
                Route {
                    path: CALLBACK_ROUTE,
                    requires_auth: false,
                },
            ],
            store,
            navigator,
        )
    }

    pub fn navigator(&self) -> &dyn Navigator {
        &*self.navigator
    }

    /// Navigate to `path`, consulting the guard first
    ///
    /// A path with no route entry carries no `requires_auth` flag and always
    /// proceeds.
    pub fn push(&self, path: &str) -> Result<()> {
        let requires_auth = self
            .routes
            .iter()
            .find(|route| route.path == path)
            .map(|route| route.requires_auth)
            .unwrap_or(false);

        let has_token = self.store.get(ACCESS_TOKEN_KEY)?.is_some();

        match guard(requires_auth, has_token) {
            GuardDecision::Allow => self.navigator.navigate(path),
            GuardDecision::Redirect(target) => {
                tracing::debug!(from = path, to = target, "Navigation blocked by guard");
                self.navigator.navigate(target);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn last(&self) -> Option<String> {
            self.visited.lock().unwrap().last().cloned()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, location: &str) {
            self.visited.lock().unwrap().push(location.to_string());
        }
    }

    fn test_router() -> (Arc<MemoryStore>, Arc<RecordingNavigator>, Router) {
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let router = Router::with_default_routes(store.clone(), navigator.clone());
        (store, navigator, router)
    }

    #[test]
    fn test_protected_route_redirects_without_token() {
        let (_store, navigator, router) = test_router();

        router.push(LANDING_ROUTE).unwrap();
        assert_eq!(navigator.last(), Some(LOGIN_ROUTE.to_string()));
    }

    #[test]
    fn test_protected_route_proceeds_with_token() {
        let (store, navigator, router) = test_router();
        store.set(ACCESS_TOKEN_KEY, "A").unwrap();

        router.push(LANDING_ROUTE).unwrap();
        assert_eq!(navigator.last(), Some(LANDING_ROUTE.to_string()));
    }

    #[test]
    fn test_public_route_always_proceeds() {
        let (_store, navigator, router) = test_router();

        router.push(CALLBACK_ROUTE).unwrap();
        assert_eq!(navigator.last(), Some(CALLBACK_ROUTE.to_string()));
    }

    #[test]
    fn test_unknown_route_always_proceeds() {
        let (_store, navigator, router) = test_router();

        router.push("/about").unwrap();
        assert_eq!(navigator.last(), Some("/about".to_string()));
    }

    #[test]
    fn test_guard_presence_only() {
        // The guard never inspects the token value, only its presence
        let (store, navigator, router) = test_router();
        store.set(ACCESS_TOKEN_KEY, "expired-but-present").unwrap();

        router.push(LANDING_ROUTE).unwrap();
        assert_eq!(navigator.last(), Some(LANDING_ROUTE.to_string()));
    }

    proptest! {
        #[test]
        fn guard_redirects_exactly_when_protected_and_logged_out(
            requires_auth in any::<bool>(),
            has_token in any::<bool>(),
        ) {
            let decision = guard(requires_auth, has_token);
            if requires_auth && !has_token {
                prop_assert_eq!(decision, GuardDecision::Redirect(LOGIN_ROUTE));
            } else {
                prop_assert_eq!(decision, GuardDecision::Allow);
            }
        }
    }
}
