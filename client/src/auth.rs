use gloo_net::http::{Request, Response};
use gloo_storage::{LocalStorage, Storage};
use lakbay_shared::{
    ApiError, LoginRequest, RegisterRequest, RegistrationError, SessionResponse, SessionUser,
    validate_registration,
};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::app::{CurrentSession, SessionNonce};
use crate::routing::{BrowserNavigator, CurrentRoute, Navigator};

pub(crate) const INVALID_LOGIN_MESSAGE: &str = "Invalid email or password";
const LOGIN_PREFS_KEY: &str = "lakbay_login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthCallError {
    InvalidCredentials,
    /// The server answered with an error message.
    Rejected(String),
    Network(String),
}

impl AuthCallError {
    pub(crate) fn message(&self) -> String {
        match self {
            AuthCallError::InvalidCredentials => INVALID_LOGIN_MESSAGE.to_string(),
            AuthCallError::Rejected(message) | AuthCallError::Network(message) => message.clone(),
        }
    }
}

/// Credentials sign-in, account creation and session calls.
pub(crate) trait AuthApi {
    async fn sign_in(&self, request: LoginRequest) -> Result<SessionUser, AuthCallError>;
    async fn register(&self, request: RegisterRequest) -> Result<(), AuthCallError>;
    async fn session(&self) -> Result<Option<SessionUser>, AuthCallError>;
    async fn sign_out(&self) -> Result<(), AuthCallError>;
}

/// `AuthApi` over the server's `/api/auth` endpoints. The session cookie
/// rides along on same-origin requests.
#[derive(Clone, Copy, Default)]
pub(crate) struct HttpAuthApi;

async fn rejection(resp: Response) -> AuthCallError {
    let status = resp.status();
    match resp.json::<ApiError>().await {
        Ok(body) => AuthCallError::Rejected(body.error),
        Err(_) => AuthCallError::Rejected(format!("HTTP {status}")),
    }
}

async fn post_json<T: Serialize>(url: &str, body: &T) -> Result<Response, AuthCallError> {
    Request::post(url)
        .json(body)
        .map_err(|e| AuthCallError::Network(format!("encode error: {e}")))?
        .send()
        .await
        .map_err(|e| AuthCallError::Network(format!("fetch error: {e}")))
}

impl AuthApi for HttpAuthApi {
    async fn sign_in(&self, request: LoginRequest) -> Result<SessionUser, AuthCallError> {
        let resp = post_json("/api/auth/login", &request).await?;
        if resp.status() == 401 {
            return Err(AuthCallError::InvalidCredentials);
        }
        if !resp.ok() {
            return Err(rejection(resp).await);
        }
        resp.json::<SessionUser>()
            .await
            .map_err(|e| AuthCallError::Network(format!("parse error: {e}")))
    }

    async fn register(&self, request: RegisterRequest) -> Result<(), AuthCallError> {
        let resp = post_json("/api/auth/register", &request).await?;
        if !resp.ok() {
            return Err(rejection(resp).await);
        }
        Ok(())
    }

    async fn session(&self) -> Result<Option<SessionUser>, AuthCallError> {
        let resp = Request::get("/api/auth/session")
            .send()
            .await
            .map_err(|e| AuthCallError::Network(format!("fetch error: {e}")))?;
        if !resp.ok() {
            return Err(rejection(resp).await);
        }
        resp.json::<SessionResponse>()
            .await
            .map(|body| body.session)
            .map_err(|e| AuthCallError::Network(format!("parse error: {e}")))
    }

    async fn sign_out(&self) -> Result<(), AuthCallError> {
        let resp = Request::post("/api/auth/logout")
            .send()
            .await
            .map_err(|e| AuthCallError::Network(format!("fetch error: {e}")))?;
        if !resp.ok() {
            return Err(rejection(resp).await);
        }
        Ok(())
    }
}

/// "Remember me" state kept in local storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct LoginPrefs {
    pub remember: bool,
    pub email: String,
}

fn load_login_prefs() -> LoginPrefs {
    LocalStorage::get(LOGIN_PREFS_KEY).unwrap_or_default()
}

fn save_login_prefs(prefs: &LoginPrefs) {
    if prefs.remember {
        let _ = LocalStorage::set(LOGIN_PREFS_KEY, prefs);
    } else {
        LocalStorage::delete(LOGIN_PREFS_KEY);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct LoginFormState {
    pub email: String,
    pub password: String,
    pub remember: bool,
    /// Set when the credentials were rejected.
    pub invalid: bool,
    pub error: Option<String>,
}

impl LoginFormState {
    pub(crate) fn from_prefs(prefs: LoginPrefs) -> Self {
        Self {
            email: if prefs.remember { prefs.email } else { String::new() },
            remember: prefs.remember,
            ..Self::default()
        }
    }

    pub(crate) fn prefs(&self) -> LoginPrefs {
        LoginPrefs {
            remember: self.remember,
            email: if self.remember {
                self.email.trim().to_string()
            } else {
                String::new()
            },
        }
    }

    /// Signs in once. Success navigates to `/` and returns the user; a
    /// rejection sets `invalid`.
    pub(crate) async fn submit<A: AuthApi, N: Navigator>(
        &mut self,
        api: &A,
        nav: &N,
    ) -> Option<SessionUser> {
        self.invalid = false;
        self.error = None;
        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        match api.sign_in(request).await {
            Ok(user) => {
                self.password.clear();
                nav.navigate("/");
                Some(user)
            }
            Err(AuthCallError::InvalidCredentials) => {
                self.invalid = true;
                None
            }
            Err(e) => {
                self.error = Some(e.message());
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RegisterFormState {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub error: Option<String>,
}

impl RegisterFormState {
    fn request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            display_name: self.display_name.trim().to_string(),
            is_admin: false,
        }
    }

    /// Checks locally, then creates the account once. Success navigates to
    /// `/login`; any failure lands in `error`.
    pub(crate) async fn submit<A: AuthApi, N: Navigator>(&mut self, api: &A, nav: &N) -> bool {
        self.error = None;
        if self.password != self.confirm {
            self.error = Some(RegistrationError::PasswordMismatch.to_string());
            return false;
        }
        let request = self.request();
        if let Err(e) = validate_registration(&request) {
            self.error = Some(e.to_string());
            return false;
        }
        match api.register(request).await {
            Ok(()) => {
                nav.navigate("/login");
                true
            }
            Err(e) => {
                self.error = Some(e.message());
                false
            }
        }
    }
}

fn input_element(ev: &web_sys::Event) -> Option<web_sys::HtmlInputElement> {
    ev.target()?.dyn_into::<web_sys::HtmlInputElement>().ok()
}

const FIELD_STYLE: &str = "width: 100%; box-sizing: border-box; padding: 9px 12px; margin-top: 4px; border: 1px solid #cfd8c6; border-radius: 6px; font-size: 0.9rem; background: #ffffff; color: #1f2a1b;";
const LABEL_STYLE: &str = "display: block; margin-top: 12px; font-size: 0.8rem; color: #4a5444;";
const SUBMIT_STYLE: &str = "width: 100%; margin-top: 18px; padding: 10px; border: none; border-radius: 6px; background: #2f4a24; color: #ffffff; font-size: 0.95rem; cursor: pointer;";

#[component]
pub(crate) fn LoginForm() -> impl IntoView {
    let CurrentRoute(route) = expect_context();
    let CurrentSession(session) = expect_context();
    let SessionNonce(nonce) = expect_context();
    let form = RwSignal::new(LoginFormState::from_prefs(load_login_prefs()));
    let pending = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        pending.set(true);
        let mut snapshot = form.get_untracked();
        spawn_local(async move {
            let nav = BrowserNavigator::new(route);
            let user = snapshot.submit(&HttpAuthApi, &nav).await;
            if let Some(error) = &snapshot.error {
                web_sys::console::warn_1(&format!("sign-in failed: {error}").into());
            }
            if user.is_some() {
                save_login_prefs(&snapshot.prefs());
                session.set(user);
                nonce.update(|n| *n += 1);
            }
            form.set(snapshot);
            pending.set(false);
        });
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2 style="margin: 0 0 4px; color: #1f2a1b;">"Login"</h2>
            <label style=LABEL_STYLE>
                "Email"
                <input
                    type="email"
                    autocomplete="email"
                    style=FIELD_STYLE
                    prop:value=move || form.with(|f| f.email.clone())
                    on:input=move |ev| {
                        if let Some(input) = input_element(&ev) {
                            form.update(|f| f.email = input.value());
                        }
                    }
                />
            </label>
            <label style=LABEL_STYLE>
                "Password"
                <input
                    type="password"
                    autocomplete="current-password"
                    style=FIELD_STYLE
                    prop:value=move || form.with(|f| f.password.clone())
                    on:input=move |ev| {
                        if let Some(input) = input_element(&ev) {
                            form.update(|f| f.password = input.value());
                        }
                    }
                />
            </label>
            <label style="display: flex; align-items: center; gap: 6px; margin-top: 10px; font-size: 0.8rem; color: #4a5444;">
                <input
                    type="checkbox"
                    prop:checked=move || form.with(|f| f.remember)
                    on:change=move |ev| {
                        if let Some(input) = input_element(&ev) {
                            form.update(|f| f.remember = input.checked());
                        }
                    }
                />
                "Remember me"
            </label>
            {move || form.with(|f| f.invalid).then(|| view! {
                <div class="form-error" style="margin-top: 10px; font-size: 0.8rem; color: #b03a2e;">
                    {INVALID_LOGIN_MESSAGE}
                </div>
            })}
            {move || form.with(|f| f.error.clone()).map(|error| view! {
                <div class="form-error" style="margin-top: 10px; font-size: 0.8rem; color: #b03a2e;">{error}</div>
            })}
            <button type="submit" style=SUBMIT_STYLE disabled=move || pending.get()>
                {move || if pending.get() { "Signing in..." } else { "Login" }}
            </button>
            <div style="margin-top: 12px; font-size: 0.8rem; color: #4a5444;">
                "No account yet? "
                <a
                    href="/register"
                    on:click=move |ev| {
                        ev.prevent_default();
                        BrowserNavigator::new(route).navigate("/register");
                    }
                >
                    "Register"
                </a>
            </div>
        </form>
    }
}

#[component]
pub(crate) fn RegisterForm() -> impl IntoView {
    let CurrentRoute(route) = expect_context();
    let form = RwSignal::new(RegisterFormState::default());
    let pending = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        pending.set(true);
        let mut snapshot = form.get_untracked();
        spawn_local(async move {
            let nav = BrowserNavigator::new(route);
            if !snapshot.submit(&HttpAuthApi, &nav).await
                && let Some(error) = &snapshot.error
            {
                web_sys::console::warn_1(&format!("registration failed: {error}").into());
            }
            form.set(snapshot);
            pending.set(false);
        });
    };

    let text_field = move |label: &'static str,
                           kind: &'static str,
                           autocomplete: &'static str,
                           read: fn(&RegisterFormState) -> String,
                           write: fn(&mut RegisterFormState, String)| {
        view! {
            <label style=LABEL_STYLE>
                {label}
                <input
                    type=kind
                    autocomplete=autocomplete
                    style=FIELD_STYLE
                    prop:value=move || form.with(read)
                    on:input=move |ev| {
                        if let Some(input) = input_element(&ev) {
                            form.update(|f| write(f, input.value()));
                        }
                    }
                />
            </label>
        }
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2 style="margin: 0 0 4px; color: #1f2a1b;">"Register"</h2>
            {text_field("Display name", "text", "nickname", |f| f.display_name.clone(), |f, v| f.display_name = v)}
            {text_field("Email", "email", "email", |f| f.email.clone(), |f, v| f.email = v)}
            {text_field("Password", "password", "new-password", |f| f.password.clone(), |f, v| f.password = v)}
            {text_field("Confirm password", "password", "new-password", |f| f.confirm.clone(), |f, v| f.confirm = v)}
            {move || form.with(|f| f.error.clone()).map(|error| view! {
                <div class="form-error" style="margin-top: 10px; font-size: 0.8rem; color: #b03a2e;">{error}</div>
            })}
            <button type="submit" style=SUBMIT_STYLE disabled=move || pending.get()>
                {move || if pending.get() { "Creating account..." } else { "Register" }}
            </button>
        </form>
    }
}
