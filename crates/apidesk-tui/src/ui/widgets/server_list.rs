//! "Protocols & Endpoints" section listing an API's servers.

use apidesk_engine::ServerDirectory;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::text::truncate_to_width;
use crate::ui::theme::Styles;

/// Heading shown above the server entries.
pub const SERVERS_HEADING: &str = "Protocols & Endpoints";

/// Renders a [`ServerDirectory`] in declaration order.
#[derive(Debug, Clone)]
pub struct ServerListView<'a> {
    directory: &'a ServerDirectory,
}

impl<'a> ServerListView<'a> {
    pub fn new(directory: &'a ServerDirectory) -> Self {
        Self { directory }
    }

    /// Styled lines for the section; URLs are truncated to `width`.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(SERVERS_HEADING, Styles::heading()))];
        for (name, endpoint) in self.directory.iter() {
            lines.push(Line::from(Span::styled(name.to_string(), Styles::subtitle())));

            let chip = format!("[{}]", endpoint.protocol());
            let used = 4 + chip.chars().count() + 1;
            lines.push(Line::from(vec![
                Span::styled("  - ", Styles::dim()),
                Span::styled(chip, Styles::chip()),
                Span::styled(" ", Styles::default()),
                Span::styled(
                    truncate_to_width(endpoint.url(), width.saturating_sub(used)),
                    Styles::default(),
                ),
            ]));
        }
        lines
    }
}

impl Widget for ServerListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines(area.width as usize))
            .style(Styles::default())
            .render(area, buf);
    }
}
