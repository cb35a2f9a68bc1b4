use lakbay_shared::SessionUser;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::auth::{AuthApi, HttpAuthApi, LoginForm, RegisterForm};
use crate::hover::{HoverState, Tooltip};
use crate::map::PhilippinesMap;
use crate::routing::{BrowserNavigator, CurrentRoute, Navigator, Route, current_path, follow_history};

/// Signed-in user, `None` while signed out or before the first read.
#[derive(Clone, Copy)]
pub(crate) struct CurrentSession(pub RwSignal<Option<SessionUser>>);
/// Bumped to make the app re-read the session from the server.
#[derive(Clone, Copy)]
pub(crate) struct SessionNonce(pub RwSignal<u64>);

#[component]
pub fn App() -> impl IntoView {
    let route = RwSignal::new(Route::from_path(&current_path()));
    let session = RwSignal::new(None::<SessionUser>);
    let nonce = RwSignal::new(0_u64);

    provide_context(CurrentRoute(route));
    provide_context(CurrentSession(session));
    provide_context(SessionNonce(nonce));
    follow_history(route);

    Effect::new(move |_| {
        nonce.track();
        spawn_local(async move {
            match HttpAuthApi.session().await {
                Ok(user) => session.set(user),
                Err(e) => {
                    web_sys::console::warn_1(&format!("session read failed: {}", e.message()).into());
                }
            }
        });
    });

    Effect::new(move |_| {
        if session.with(Option::is_some) && route.get().is_auth_page() {
            BrowserNavigator::new(route).navigate("/");
        }
    });

    view! {
        <NavBar />
        <main>
            {move || match route.get() {
                Route::Home => view! { <HomePage /> }.into_any(),
                Route::Login => view! { <AuthCard><LoginForm /></AuthCard> }.into_any(),
                Route::Register => view! { <AuthCard><RegisterForm /></AuthCard> }.into_any(),
            }}
        </main>
    }
}

#[component]
fn NavBar() -> impl IntoView {
    let CurrentRoute(route) = expect_context();
    let CurrentSession(session) = expect_context();
    let SessionNonce(nonce) = expect_context();

    let sign_out = move |_| {
        spawn_local(async move {
            if let Err(e) = HttpAuthApi.sign_out().await {
                web_sys::console::warn_1(&format!("sign-out failed: {}", e.message()).into());
            }
            session.set(None);
            nonce.update(|n| *n += 1);
        });
    };

    view! {
        <nav style="position: sticky; top: 0; z-index: 30; display: flex; align-items: center; justify-content: space-between; padding: 14px 28px; background: #173f2a; color: #ffffff;">
            <a
                href="/"
                style="color: #ffffff; text-decoration: none; font-size: 1.1rem; font-weight: 700; letter-spacing: 0.02em;"
                on:click=move |ev| {
                    ev.prevent_default();
                    BrowserNavigator::new(route).navigate("/");
                }
            >
                "Lakbay Wika"
            </a>
            <div style="display: flex; align-items: center; gap: 12px;">
                {move || match session.get() {
                    Some(user) => view! {
                        <span class="user-badge" title=user.email style="padding: 4px 10px; border-radius: 999px; background: rgba(255,255,255,0.14); font-size: 0.82rem;">
                            {user.display_name}
                        </span>
                        <button class="nav-button" on:click=sign_out>"Logout"</button>
                    }
                    .into_any(),
                    None => view! {
                        <button
                            class="nav-button"
                            on:click=move |_| BrowserNavigator::new(route).navigate(Route::Login.path())
                        >
                            "Login"
                        </button>
                    }
                    .into_any(),
                }}
            </div>
        </nav>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let hover = RwSignal::new(HoverState::default());
    let on_hover = Callback::new(move |(region, x, y): (String, f64, f64)| {
        hover.update(|h| h.enter(&region, x, y));
    });
    let on_leave = Callback::new(move |()| hover.update(HoverState::leave));

    view! {
        <section
            class="hero"
            style="display: flex; flex-direction: column; justify-content: center; min-height: 70vh; padding: 48px; background: #173f2a; color: #ffffff;"
        >
            <h1 style="margin: 0; font-size: 3.6rem; font-weight: 700;">"The Filipino Languages"</h1>
            <h3 style="margin: 8px 0 0; font-size: 1.6rem; font-weight: 400;">"Explore. Navigate. Discover."</h3>
            <a
                href="#map"
                style="align-self: flex-start; margin-top: 36px; padding: 14px 56px; border-radius: 999px; background: #ffffff; color: #173f2a; font-size: 1.1rem; text-decoration: none;"
            >
                "Start"
            </a>
        </section>
        <section id="map" style="padding: 48px; background: #ffffff;">
            <div style="position: relative; max-width: 760px; margin: 0 auto;">
                <PhilippinesMap on_hover=on_hover on_leave=on_leave />
                <Tooltip hover=hover />
            </div>
        </section>
    }
}

#[component]
fn AuthCard(children: Children) -> impl IntoView {
    view! {
        <div style="display: flex; justify-content: center; padding: 64px 16px; min-height: 70vh; background: #f1f5ec;">
            <div style="width: 100%; max-width: 380px; padding: 28px; border-radius: 12px; background: #ffffff; box-shadow: 0 8px 24px rgba(0,0,0,0.08); align-self: flex-start;">
                {children()}
            </div>
        </div>
    }
}
