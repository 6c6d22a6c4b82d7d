//! Overview screen - the API's description, overview, and servers.

use crate::app::App;
use crate::screens::Screen;
use crate::text::{render_markdown, wrap_lines, MarkdownStyles};
use crate::ui::main_layout;
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, ServerListView, StatusBar};
use apidesk_engine::{ContentEditor, DescriptionType};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The Overview screen.
pub struct OverviewScreen;

impl Screen for OverviewScreen {
    #[allow(clippy::cast_possible_truncation)]
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);

        let block = Block::default()
            .title(format!(" {} ", app.api.name))
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .style(Styles::default());
        let inner = block.inner(main_area);
        block.render(main_area, buf);

        let lines = overview_lines(app, inner.width as usize);
        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((app.scroll.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);

        let allowed = app.edit_access().is_allowed();
        let hints = vec![
            KeyHint::new("d", "Description").enabled(allowed),
            KeyHint::new("o", "Overview").enabled(allowed),
            KeyHint::new("r", "Reload"),
            KeyHint::new("?", "Help"),
            KeyHint::new("q", "Quit"),
        ];
        let mut status_bar = StatusBar::new("Overview").hints(hints);
        if let Some(notification) = &app.notification {
            status_bar = status_bar.right(notification);
        }
        status_bar.render(status_area, buf);
    }
}

/// All content lines of the overview, before scrolling.
fn overview_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let allowed = app.edit_access().is_allowed();
    let mut lines = Vec::new();

    for (description_type, key) in [
        (DescriptionType::Description, 'd'),
        (DescriptionType::Overview, 'o'),
    ] {
        lines.push(section_header(app, description_type, key, allowed));

        let content = app.api.content(description_type);
        if content.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("No {description_type} provided"),
                Styles::dim(),
            )));
        } else {
            let body = match description_type {
                DescriptionType::Description => {
                    content.lines().map(|l| Line::from(l.to_string())).collect()
                }
                DescriptionType::Overview => {
                    render_markdown(content, width, &MarkdownStyles::default())
                }
            };
            lines.extend(wrap_lines(body, width));
        }
        lines.push(Line::default());
    }

    // Failures and empty directories leave the section out entirely.
    if let Some(directory) = app.servers.visible_directory() {
        lines.extend(ServerListView::new(directory).lines(width));
    }

    lines
}

fn section_header(
    app: &App,
    description_type: DescriptionType,
    key: char,
    allowed: bool,
) -> Line<'static> {
    let button_style = if allowed {
        Styles::button()
    } else {
        Styles::button_disabled()
    };
    Line::from(vec![
        Span::styled(description_type.label(), Styles::heading()),
        Span::raw("  "),
        Span::styled(
            format!("[ {} ({key}) ]", ContentEditor::button_label(&app.api)),
            button_style,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        create_restricted_app, create_test_app, render_screen_to_string,
        render_screen_to_string_sized, sample_directory,
    };
    use crate::ui::theme::Palette;
    use crate::ui::widgets::SERVERS_HEADING;

    #[test]
    fn test_renders_content_sections() {
        let app = create_test_app();
        let screen = render_screen_to_string(&OverviewScreen, &app);

        assert!(screen.contains(" PizzaShack "));
        assert!(screen.contains("Description  [ Edit Content (d) ]"));
        assert!(screen.contains("Order pizza over events."));
        assert!(screen.contains("Overview  [ Edit Content (o) ]"));
        assert!(screen.contains("Old text"));
    }

    #[test]
    fn test_add_label_when_empty() {
        let mut app = create_test_app();
        app.api.description = None;
        app.api.overview = None;
        let screen = render_screen_to_string(&OverviewScreen, &app);

        assert!(screen.contains("[ Add Content (d) ]"));
        assert!(screen.contains("No description provided"));
        assert!(screen.contains("No overview provided"));
    }

    #[test]
    fn test_servers_hidden_until_loaded() {
        let mut app = create_test_app();
        let screen = render_screen_to_string(&OverviewScreen, &app);
        assert!(!screen.contains(SERVERS_HEADING));

        let ticket = app.take_pending_load().unwrap();
        app.apply_servers(&ticket, Ok(sample_directory()));
        let screen = render_screen_to_string(&OverviewScreen, &app);

        assert!(screen.contains(SERVERS_HEADING));
        let production = screen.find("production").unwrap();
        let sandbox = screen.find("sandbox").unwrap();
        assert!(production < sandbox);
        assert!(screen.contains("  - [mqtt] mqtt://broker.example.com:1883"));
    }

    #[test]
    fn test_narrow_terminal_truncates_urls() {
        let mut app = create_test_app();
        let ticket = app.take_pending_load().unwrap();
        app.apply_servers(&ticket, Ok(sample_directory()));

        let screen = render_screen_to_string_sized(&OverviewScreen, &app, 40, 20);
        assert!(screen.contains("  - [mqtt] mqtt://broker"));
        assert!(!screen.contains(":1883"));
        assert!(screen.contains("..."));
    }

    #[test]
    fn test_failed_load_renders_nothing() {
        let mut app = create_test_app();
        let ticket = app.take_pending_load().unwrap();
        let err = apidesk_engine::LoadError::Timeout(std::time::Duration::from_secs(1));
        app.apply_servers(&ticket, Err(err));

        let screen = render_screen_to_string(&OverviewScreen, &app);
        assert!(!screen.contains(SERVERS_HEADING));
    }

    #[test]
    fn test_restricted_buttons_disabled() {
        let app = create_restricted_app();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        OverviewScreen.render(&app, area, &mut buf);

        // Inside the border, "Description" + two spaces puts "[" at column 14.
        assert_eq!(buf[(14, 1)].symbol(), "[");
        assert_eq!(buf[(14, 1)].fg, Palette::DIM);
    }
}
