//! Terminal presentation: intro splash, account form, chat panel

mod app;
mod render;
mod terminal;

pub use app::App;
pub use terminal::run;
