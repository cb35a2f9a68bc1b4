use leptos::prelude::*;
use wasm_bindgen::JsValue;

/// Pages of the single-page client. The server answers every non-API path
/// with `index.html`, so the path is resolved here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Home,
    Login,
    Register,
}

impl Route {
    pub(crate) fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Route::Login,
            "/register" => Route::Register,
            _ => Route::Home,
        }
    }

    pub(crate) fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }

    /// Auth pages bounce to `/` once a session exists.
    pub(crate) fn is_auth_page(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

/// Navigation seam used by the auth forms.
pub(crate) trait Navigator {
    fn navigate(&self, path: &str);
}

#[derive(Clone, Copy)]
pub(crate) struct CurrentRoute(pub RwSignal<Route>);

/// Pushes a history entry and updates the route signal.
#[derive(Clone, Copy)]
pub(crate) struct BrowserNavigator {
    route: RwSignal<Route>,
}

impl BrowserNavigator {
    pub(crate) fn new(route: RwSignal<Route>) -> Self {
        Self { route }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let next = Route::from_path(path);
        if let Some(window) = web_sys::window()
            && let Ok(history) = window.history()
            && history
                .push_state_with_url(&JsValue::NULL, "", Some(next.path()))
                .is_err()
        {
            web_sys::console::warn_1(&format!("pushState failed for {path}").into());
        }
        self.route.set(next);
    }
}

pub(crate) fn current_path() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Keeps the route signal in step with back/forward navigation.
pub(crate) fn follow_history(route: RwSignal<Route>) {
    // The listener lives as long as the page; dropping the handle keeps it bound.
    let _ = window_event_listener(leptos::ev::popstate, move |_| {
        route.set(Route::from_path(&current_path()));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_to_routes() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("/login/"), Route::Login);
        assert_eq!(Route::from_path("/register"), Route::Register);
        assert_eq!(Route::from_path("/somewhere/else"), Route::Home);
    }

    #[test]
    fn route_paths_round_trip() {
        for route in [Route::Home, Route::Login, Route::Register] {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn only_login_and_register_are_auth_pages() {
        assert!(!Route::Home.is_auth_page());
        assert!(Route::Login.is_auth_page());
        assert!(Route::Register.is_auth_page());
    }
}
