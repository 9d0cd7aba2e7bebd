use yew::{html, Component, Context, Html};

use crate::components::analysis::AnalysisDashboardComponent;

pub struct App;

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="app-root">
                <AnalysisDashboardComponent user_email={stored_identity()} />
            </div>
        }
    }
}

/// Identity of the signed-in user, written by the access gate at login.
/// The email doubles as the session token for request attribution.
fn stored_identity() -> String {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item("sita_user_email").ok().flatten())
        .unwrap_or_else(|| "operator@sita.local".to_string())
}
