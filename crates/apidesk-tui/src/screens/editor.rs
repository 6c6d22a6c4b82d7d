//! Editor dialog - markdown source on the left, live preview on the right.

use crate::app::App;
use crate::screens::Screen;
use crate::text::wrap_lines;
use crate::ui::theme::{spinner, Styles};
use crate::ui::widgets::{KeyHint, StatusBar};
use crate::ui::{dialog_layout, main_layout};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The content edit dialog.
pub struct EditorScreen;

impl Screen for EditorScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);
        let (header_area, editor_area, preview_area) = dialog_layout(main_area);
        let saving = app.active().is_some_and(|e| e.is_saving());

        render_header(app, header_area, buf);

        let editor_block = Block::default()
            .title(" Markdown ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .style(Styles::default());
        app.input_state
            .widget()
            .block(editor_block)
            .focused(!saving)
            .render(editor_area, buf);

        render_preview(app, preview_area, buf);

        let hints = vec![
            KeyHint::new("Ctrl+S", "Update").enabled(!saving),
            KeyHint::new("Esc", "Cancel").enabled(!saving),
        ];
        let (row, col) = app.input_state.cursor_position();
        let position = format!("Ln {}, Col {}", row + 1, col + 1);
        let right = app.notification.as_deref().unwrap_or(&position);
        StatusBar::new("Edit")
            .hints(hints)
            .right(right)
            .render(status_area, buf);
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(editor) = app.active() else {
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", editor.title(&app.api.name)))
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    let saving = editor.is_saving();
    let button_style = if saving {
        Styles::button_disabled()
    } else {
        Styles::button()
    };
    let mut spans = vec![
        Span::styled("[ Update Content ]", button_style),
        Span::raw("  "),
        Span::styled("[ Cancel ]", button_style),
    ];
    if saving {
        spans.push(Span::styled(
            format!("  {} Saving...", spinner(app.tick)),
            Styles::warning(),
        ));
    } else if let Some(error) = editor.last_error() {
        spans.push(Span::styled(
            format!("  Save failed: {error}"),
            Styles::error(),
        ));
    }

    Paragraph::new(Line::from(spans)).render(inner, buf);
}

/// Inner width of the preview pane for a terminal of size `area`.
pub fn preview_width(area: Rect) -> usize {
    let (main_area, _) = main_layout(area);
    let (_, _, preview_area) = dialog_layout(main_area);
    usize::from(preview_area.width.saturating_sub(2))
}

fn render_preview(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(" Preview ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    let lines = if app.input_state.is_empty() {
        vec![Line::from(Span::styled("Nothing to preview", Styles::dim()))]
    } else {
        wrap_lines(app.preview_lines().to_vec(), inner.width as usize)
    };
    Paragraph::new(lines)
        .style(Styles::default())
        .render(inner, buf);
}
