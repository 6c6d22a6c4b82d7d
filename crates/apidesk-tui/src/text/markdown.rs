//! Markdown rendering for the editor preview and the overview screen.
//!
//! Raw HTML in the source is shown verbatim (dimmed) rather than dropped,
//! since API overviews routinely embed it.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::styles::MarkdownStyles;

/// Render markdown to styled lines. `width` only sizes horizontal rules;
/// wrapping is left to [`super::wrap_lines`].
pub fn render_markdown(input: &str, width: usize, styles: &MarkdownStyles) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = Renderer::new(styles.clone(), width);
    for event in Parser::new_ext(input, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct Renderer {
    styles: MarkdownStyles,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    /// One entry per open list: `Some(n)` is the next ordered number.
    lists: Vec<Option<u64>>,
    pending_marker: Option<String>,
    in_code_block: bool,
    quote_depth: usize,
}

impl Renderer {
    fn new(styles: MarkdownStyles, width: usize) -> Self {
        Self {
            styles,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: Vec::new(),
            lists: Vec::new(),
            pending_marker: None,
            in_code_block: false,
            quote_depth: 0,
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.prefix();
                self.spans
                    .push(Span::styled(format!("`{code}`"), self.styles.code));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                for (i, part) in html.lines().enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.prefix();
                    self.spans
                        .push(Span::styled(part.to_string(), self.styles.html));
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.width.max(3)),
                    self.styles.rule,
                )));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = self.pending_marker.take().unwrap_or_default();
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.pending_marker = Some(format!("{marker}{checkbox}"));
            }
            Event::FootnoteReference(name) => self.text(&format!("[^{name}]")),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let style = match level {
                    HeadingLevel::H1 => self.styles.h1,
                    HeadingLevel::H2 => self.styles.h2,
                    _ => self.styles.h3,
                };
                self.style_stack.push(style);
            }
            Tag::Emphasis => self.style_stack.push(self.styles.emphasis),
            Tag::Strong => self.style_stack.push(self.styles.strong),
            Tag::Strikethrough => self.style_stack.push(self.styles.strikethrough),
            Tag::Link { .. } => self.style_stack.push(self.styles.link),
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_marker = Some(marker);
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::TableCell => {
                if !self.spans.is_empty() {
                    self.spans.push(Span::styled(" │ ", self.styles.rule));
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.style_stack.pop();
                self.blank();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.style_stack.pop();
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item | TagEnd::TableHead | TagEnd::TableRow => self.flush(),
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.blank();
                }
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() && self.quote_depth == 0 {
                    self.blank();
                }
            }
            TagEnd::Table => self.blank(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.prefix();
                self.spans
                    .push(Span::styled(format!("  {line}"), self.styles.code_block));
                self.flush();
            }
            return;
        }
        self.prefix();
        let style = self.current_style();
        self.spans.push(Span::styled(text.to_string(), style));
    }

    /// Emit the list marker or quote bar owed at the start of a line.
    fn prefix(&mut self) {
        if !self.spans.is_empty() {
            return;
        }
        if self.quote_depth > 0 {
            self.spans
                .push(Span::styled("│ ".repeat(self.quote_depth), self.styles.blockquote));
        }
        if let Some(marker) = self.pending_marker.take() {
            self.spans.push(Span::styled(marker, self.styles.list_marker));
        }
    }

    fn current_style(&self) -> Style {
        let base = if self.quote_depth > 0 {
            self.styles.text.patch(self.styles.blockquote)
        } else {
            self.styles.text
        };
        self.style_stack.iter().fold(base, |acc, s| acc.patch(*s))
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    /// Push a separator line, never two in a row.
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> Vec<String> {
        render_markdown(md, 10, &MarkdownStyles::default())
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(render("# Title\n\nBody text"), vec!["Title", "", "Body text"]);
    }

    #[test]
    fn test_soft_break_joins() {
        assert_eq!(render("one\ntwo"), vec!["one two"]);
    }

    #[test]
    fn test_bullet_and_ordered_lists() {
        assert_eq!(render("- a\n- b"), vec!["• a", "• b"]);
        assert_eq!(render("3. x\n4. y"), vec!["3. x", "4. y"]);
    }

    #[test]
    fn test_nested_list_indent() {
        assert_eq!(render("- a\n  - b"), vec!["• a", "  • b"]);
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            render("- [ ] todo\n- [x] done"),
            vec!["• [ ] todo", "• [x] done"]
        );
    }

    #[test]
    fn test_inline_code_and_block() {
        assert_eq!(render("Use `curl`"), vec!["Use `curl`"]);
        assert_eq!(render("```\nGET /pets\n```"), vec!["  GET /pets"]);
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(render("> quoted"), vec!["│ quoted"]);
    }

    #[test]
    fn test_html_kept() {
        let lines = render("<b>bold</b> text");
        assert_eq!(lines, vec!["<b>bold</b> text"]);
    }

    #[test]
    fn test_rule_uses_width() {
        assert_eq!(render("a\n\n---\n\nb"), vec!["a", "", "──────────", "", "b"]);
    }

    #[test]
    fn test_emphasis_is_styled() {
        let lines = render_markdown("**bold**", 80, &MarkdownStyles::default());
        let span = &lines[0].spans[0];
        assert_eq!(span.content, "bold");
        assert!(span
            .style
            .add_modifier
            .contains(ratatui::style::Modifier::BOLD));
    }
}
