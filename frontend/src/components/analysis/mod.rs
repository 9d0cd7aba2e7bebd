//! Analysis dashboard: root module wiring the Yew `Component` implementation
//! with submodules for state, update logic, view rendering, and helpers.
//!
//! Responsibilities
//! - Own the persisted job store and the poll handle for the session's
//!   single analysis job.
//! - On first render, reconcile the state restored from local storage and
//!   resume polling if a job was still processing when the page reloaded.
//! - On teardown, cancel the poll loop so no state is written for a view
//!   that is no longer displayed.

use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

use crate::job::machine::{self, Severity};
pub use messages::Msg;
pub use props::AnalysisProps;
pub use state::AnalysisDashboardComponent;

impl Component for AnalysisDashboardComponent {
    type Message = Msg;
    type Properties = AnalysisProps;

    fn create(_ctx: &Context<Self>) -> Self {
        let mut component = AnalysisDashboardComponent::new();
        component.store.load();
        component
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let mut resume = false;
            self.store.set(|state| resume = machine::on_restore(state));
            if resume {
                update::start_polling(self, ctx);
                helpers::show_toast(Severity::Info, "Resumed monitoring of the running analysis");
            }
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
    }
}
