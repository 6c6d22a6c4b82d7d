//! Markdown styling configuration.

use ratatui::style::{Modifier, Style};

use crate::ui::theme::Palette;

/// Styles for rendering markdown elements in the preview pane.
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub h1: Style,
    pub h2: Style,
    /// H3 and below.
    pub h3: Style,
    pub code: Style,
    pub code_block: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    pub list_marker: Style,
    pub link: Style,
    pub blockquote: Style,
    /// Raw HTML passed through from the source.
    pub html: Style,
    pub rule: Style,
    pub text: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self {
            h1: Style::default()
                .fg(Palette::ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Palette::ACCENT)
                .add_modifier(Modifier::BOLD),
            h3: Style::default().fg(Palette::FG).add_modifier(Modifier::BOLD),
            code: Style::default().fg(Palette::SECONDARY).bg(Palette::SURFACE),
            code_block: Style::default().fg(Palette::SECONDARY).bg(Palette::SURFACE),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list_marker: Style::default().fg(Palette::ACCENT),
            link: Style::default()
                .fg(Palette::ACCENT)
                .add_modifier(Modifier::UNDERLINED),
            blockquote: Style::default()
                .fg(Palette::DIM)
                .add_modifier(Modifier::ITALIC),
            html: Style::default().fg(Palette::DIM),
            rule: Style::default().fg(Palette::BORDER),
            text: Style::default().fg(Palette::FG),
        }
    }
}
