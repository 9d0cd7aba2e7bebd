use crate::app::App;

mod api;
mod app;
mod components;
mod job;

fn main() {
    yew::Renderer::<App>::new().render();
}
