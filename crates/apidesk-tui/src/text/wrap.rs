//! Wrapping of styled lines to a pane width.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Wrap every line to `width` columns, keeping span styles.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let plain: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    if plain.chars().count() <= width {
        return vec![line];
    }

    // Style of every character, so wrapped pieces can be re-styled.
    let styles: Vec<Style> = line
        .spans
        .iter()
        .flat_map(|span| std::iter::repeat(span.style).take(span.content.chars().count()))
        .collect();
    let chars: Vec<char> = plain.chars().collect();

    let options = textwrap::Options::new(width).break_words(true);
    let mut out = Vec::new();
    let mut pos = 0;
    for piece in textwrap::wrap(&plain, options) {
        // textwrap drops the whitespace it breaks on; skip it here too.
        while pos < chars.len() && chars[pos].is_whitespace() && !piece.starts_with(chars[pos]) {
            pos += 1;
        }
        let len = piece.chars().count();
        out.push(restyle(&chars[pos..(pos + len).min(chars.len())], &styles[pos..]));
        pos += len;
    }
    out
}

/// Group consecutive characters sharing a style back into spans.
fn restyle(chars: &[char], styles: &[Style]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = None;
    for (ch, style) in chars.iter().zip(styles) {
        if current_style != Some(*style) && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style.unwrap_or_default()));
        }
        current_style = Some(*style);
        current.push(*ch);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style.unwrap_or_default()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_short_line_untouched() {
        let lines = wrap_lines(vec![Line::from("short")], 20);
        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), "short");
    }

    #[test]
    fn test_wraps_on_words() {
        let lines = wrap_lines(vec![Line::from("the quick brown fox")], 10);
        let texts: Vec<_> = lines.iter().map(text).collect();
        assert_eq!(texts, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_styles_survive_wrap() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw("plain words "),
            Span::styled("bold words", bold),
        ]);
        let lines = wrap_lines(vec![line], 12);
        assert_eq!(text(&lines[1]), "bold words");
        assert_eq!(lines[1].spans[0].style, bold);
    }

    #[test]
    fn test_zero_width_passthrough() {
        let lines = wrap_lines(vec![Line::from("anything at all")], 0);
        assert_eq!(lines.len(), 1);
    }
}
