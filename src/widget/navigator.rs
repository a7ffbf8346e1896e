use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::document::DocumentMeta;
use crate::navigation::NavigatorGrid;
use crate::theme::Base16Palette;

const CELL_GAP: u16 = 1;

/// Sidebar with the epigraph and the direct-jump grid. Remembers where each
/// cell was drawn so mouse clicks can be mapped back to chapters.
#[derive(Debug, Default)]
pub struct Sidebar {
    cells: Vec<(Rect, usize)>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        self.cells
            .iter()
            .find(|(rect, _)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(_, index)| *index)
    }

    pub fn cell_area(&self, index: usize) -> Option<Rect> {
        self.cells
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(rect, _)| *rect)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        meta: &DocumentMeta,
        grid: NavigatorGrid,
        active: usize,
        palette: &Base16Palette,
    ) {
        self.cells.clear();
        let (_, border_color, bg_color) = palette.get_panel_colors(false);

        let info = info_lines(meta, area.width.saturating_sub(4) as usize, palette);
        let info_height = if info.is_empty() {
            0
        } else {
            info.len() as u16 + 2
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(info_height), Constraint::Min(3)])
            .split(area);

        if info_height > 0 {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(bg_color));
            let inner = block.inner(chunks[0]);
            f.render_widget(block, chunks[0]);
            f.render_widget(Paragraph::new(info), inner.inner(ratatui::layout::Margin::new(1, 0)));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                " Navigator ",
                Style::default()
                    .fg(palette.base_06)
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));
        let inner = block.inner(chunks[1]);
        f.render_widget(block, chunks[1]);
        self.render_grid(f, inner, grid, active, palette);
    }

    fn render_grid(
        &mut self,
        f: &mut Frame,
        area: Rect,
        grid: NavigatorGrid,
        active: usize,
        palette: &Base16Palette,
    ) {
        if area.width == 0 || area.height == 0 || grid.chapters == 0 {
            return;
        }
        let digits = grid.chapters.to_string().len() as u16;
        let cell_width = digits + 2;
        let fitting_columns = ((area.width + CELL_GAP) / (cell_width + CELL_GAP)).max(1) as usize;
        let grid = NavigatorGrid::new(grid.chapters, grid.columns.min(fitting_columns));

        let visible_rows = area.height as usize;
        let first_row = grid.first_visible_row(active, visible_rows);

        for row in first_row..grid.rows().min(first_row + visible_rows) {
            for column in 0..grid.columns {
                let Some(index) = grid.cell_at(row, column) else {
                    break;
                };
                let rect = Rect {
                    x: area.x + column as u16 * (cell_width + CELL_GAP),
                    y: area.y + (row - first_row) as u16,
                    width: cell_width.min(area.width),
                    height: 1,
                };
                let (bg, fg) = palette.get_cell_colors(index == active);
                let mut style = Style::default().bg(bg).fg(fg);
                if index == active {
                    style = style.add_modifier(Modifier::BOLD);
                }
                let label = format!(" {:>width$} ", index + 1, width = digits as usize);
                f.render_widget(Paragraph::new(Line::from(Span::styled(label, style))), rect);
                self.cells.push((rect, index));
            }
        }
    }
}

fn info_lines(meta: &DocumentMeta, width: usize, palette: &Base16Palette) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    if let Some(epigraph) = &meta.epigraph {
        let quoted = format!("\u{201c}{epigraph}\u{201d}");
        let style = Style::default()
            .fg(palette.base_04)
            .add_modifier(Modifier::ITALIC);
        for row in textwrap::wrap(&quoted, width) {
            lines.push(Line::from(Span::styled(row.into_owned(), style)));
        }
    }
    if let Some(author) = &meta.author {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let style = Style::default().fg(palette.base_03);
        for row in textwrap::wrap(author, width) {
            lines.push(Line::from(Span::styled(row.into_owned(), style)));
        }
    }
    lines
}
