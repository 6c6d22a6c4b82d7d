//! Reusable widgets for the apidesk TUI.

pub mod server_list;
pub mod status_bar;
pub mod text_area;

pub use server_list::{ServerListView, SERVERS_HEADING};
pub use status_bar::{KeyHint, StatusBar};
pub use text_area::{TextArea, TextAreaState};
