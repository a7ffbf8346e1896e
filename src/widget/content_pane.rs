use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::document::Chapter;
use crate::theme::Base16Palette;

const PARAGRAPH_INDENT: &str = "    ";

/// Scrollable view of the current chapter.
///
/// Scroll bounds come from the last render: `content_height` is the wrapped
/// line count and `viewport_height` the inner height of the pane.
#[derive(Debug, Default)]
pub struct ContentPane {
    scroll_offset: usize,
    content_height: usize,
    viewport_height: usize,
    scroll_resets: usize,
}

impl ContentPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// How many times a navigation reset the viewport.
    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets
    }

    fn max_scroll(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn half_page(&self) -> usize {
        (self.viewport_height / 2).max(1)
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.scroll_resets += 1;
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        chapter: &Chapter,
        margin: u16,
        palette: &Base16Palette,
    ) {
        let (text_color, border_color, bg_color) = palette.get_panel_colors(true);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let text_area = Rect {
            x: inner.x.saturating_add(margin).min(inner.right()),
            y: inner.y,
            width: inner.width.saturating_sub(margin.saturating_mul(2)),
            height: inner.height,
        };

        let lines = layout_chapter(chapter, text_area.width as usize, palette, text_color);
        self.content_height = lines.len();
        self.viewport_height = text_area.height as usize;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());

        let paragraph = Paragraph::new(lines).scroll((self.scroll_offset as u16, 0));
        f.render_widget(paragraph, text_area);
    }
}

/// Title, optional subtitle, rule, then wrapped paragraphs. Every paragraph
/// after the first is indented and paragraphs are separated by a blank line.
pub fn layout_chapter(
    chapter: &Chapter,
    width: usize,
    palette: &Base16Palette,
    text_color: ratatui::style::Color,
) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();

    let title_style = Style::default()
        .fg(palette.base_07)
        .add_modifier(Modifier::BOLD);
    for row in textwrap::wrap(&chapter.title, width) {
        lines.push(Line::from(Span::styled(row.into_owned(), title_style)));
    }

    if let Some(subtitle) = &chapter.subtitle {
        let subtitle_style = Style::default()
            .fg(palette.base_0c)
            .add_modifier(Modifier::ITALIC);
        let subtitle = format!("— {subtitle}");
        for row in textwrap::wrap(&subtitle, width) {
            lines.push(Line::from(Span::styled(row.into_owned(), subtitle_style)));
        }
    }

    lines.push(Line::from(Span::styled(
        "─".repeat(width.min(20)),
        Style::default().fg(palette.base_0d),
    )));
    lines.push(Line::default());

    let body_style = Style::default().fg(text_color);
    for (i, paragraph) in chapter.paragraphs.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let indent = if i == 0 { "" } else { PARAGRAPH_INDENT };
        let options = textwrap::Options::new(width).initial_indent(indent);
        for row in textwrap::wrap(paragraph, options) {
            lines.push(Line::from(Span::styled(row.into_owned(), body_style)));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::current_theme;
    use ratatui::{Terminal, backend::TestBackend};

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn layout_indents_all_but_first_paragraph() {
        let chapter = Chapter::new("Title")
            .with_subtitle("sub")
            .with_paragraphs(["one", "two"]);
        let palette = current_theme();
        let text = text_of(&layout_chapter(&chapter, 40, palette, palette.base_05));

        assert_eq!(text[0], "Title");
        assert_eq!(text[1], "— sub");
        assert_eq!(text[3], "");
        assert_eq!(text[4], "one");
        assert_eq!(text[5], "");
        assert_eq!(text[6], "    two");
    }

    #[test]
    fn empty_chapter_renders_header_only() {
        let chapter = Chapter::new("Nothing here");
        let palette = current_theme();
        let lines = layout_chapter(&chapter, 30, palette, palette.base_05);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn scroll_is_clamped_to_wrapped_height() {
        let chapter = Chapter::new("T").with_paragraphs((0..30).map(|i| format!("line {i}")));
        let mut pane = ContentPane::new();
        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                pane.render(f, area, &chapter, 0, current_theme());
            })
            .unwrap();

        // 3 header lines + 30 paragraphs + 29 separators, 10 visible rows
        pane.scroll_down(1000);
        assert_eq!(pane.scroll_offset(), 62 - 10);
        pane.scroll_up(2);
        assert_eq!(pane.scroll_offset(), 50);
        pane.scroll_up(1000);
        assert_eq!(pane.scroll_offset(), 0);
    }

    #[test]
    fn reset_returns_to_top_and_counts() {
        let mut pane = ContentPane::new();
        pane.content_height = 100;
        pane.viewport_height = 10;
        pane.scroll_down(7);
        pane.reset_scroll();
        assert_eq!(pane.scroll_offset(), 0);
        assert_eq!(pane.scroll_resets(), 1);
    }
}
