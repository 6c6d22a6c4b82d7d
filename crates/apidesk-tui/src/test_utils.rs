//! Test utilities for apidesk-tui rendering and loop tests.
//!
//! Helpers for building apps with fixture data, rendering screens, and
//! converting buffers to strings for snapshot testing.

use crate::app::App;
use crate::screens::Screen as ScreenTrait;
use apidesk_engine::{
    parse_document, ApiRecord, ServerDirectory, UserProfile, SCOPE_API_CREATE, SCOPE_API_VIEW,
};
use ratatui::{buffer::Buffer, layout::Rect};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// AsyncAPI 2.x definition with two servers.
pub const SAMPLE_DEFINITION: &str = r#"{
  "asyncapi": "2.6.0",
  "info": { "title": "Pizza Events", "version": "1.0.0" },
  "servers": {
    "production": { "url": "mqtt://broker.example.com:1883", "protocol": "mqtt" },
    "sandbox": { "url": "ws://sandbox.example.com/events", "protocol": "ws" }
  },
  "channels": {}
}"#;

/// The fixture API: description set, overview "Old text".
pub fn sample_api() -> ApiRecord {
    let mut api = ApiRecord::with_id("pizza", "PizzaShack");
    api.description = Some("Order pizza over events.".to_string());
    api.overview = Some("Old text".to_string());
    api
}

/// Directory parsed from [`SAMPLE_DEFINITION`].
pub fn sample_directory() -> ServerDirectory {
    let doc = parse_document(SAMPLE_DEFINITION).expect("fixture parses");
    ServerDirectory::from_document(&doc)
}

/// Create a test app for a user allowed to edit.
pub fn create_test_app() -> App {
    let user = UserProfile::new("publisher", &[SCOPE_API_VIEW, SCOPE_API_CREATE]);
    App::new(sample_api(), user)
}

/// Create a test app for a view-only user.
pub fn create_restricted_app() -> App {
    let user = UserProfile::new("viewer", &[SCOPE_API_VIEW]);
    App::new(sample_api(), user)
}

/// Convert a buffer to a string representation for snapshot testing.
///
/// Trailing whitespace is trimmed from each line.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = buffer.cell((x, y)).unwrap();
            result.push_str(cell.symbol());
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render a screen at the default size and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen at a custom size and return it as a string.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_string_trims() {
        let area = Rect::new(0, 0, 6, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "ab", ratatui::style::Style::default());
        assert_eq!(buffer_to_string(&buffer), "ab\n");
    }

    #[test]
    fn test_sample_directory_order() {
        let directory = sample_directory();
        assert_eq!(directory.names(), ["production", "sandbox"]);
    }
}
