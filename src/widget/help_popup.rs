use crate::theme::Base16Palette;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const HELP_TEXT: &str = include_str!("help.txt");

pub enum HelpPopupAction {
    Close,
}

pub struct HelpPopup {
    scroll_offset: usize,
    last_popup_area: Option<Rect>,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        HelpPopup {
            scroll_offset: 0,
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let max_content_width = HELP_TEXT
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(60);

        // 2 chars of margin each side plus borders
        let desired_width = (max_content_width + 6).min(area.width as usize);
        let popup_area = content_sized_rect(desired_width as u16, 80, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = HELP_TEXT
            .lines()
            .skip(self.scroll_offset)
            .map(|line| {
                Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(palette.base_05),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" Help - Press ? or Esc to close ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.base_0c))
                .style(Style::default().bg(palette.base_00)),
        );

        f.render_widget(paragraph, popup_area);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn max_scroll(&self) -> usize {
        let visible = self
            .last_popup_area
            .map(|area| area.height.saturating_sub(2) as usize)
            .unwrap_or(0);
        HELP_TEXT.lines().count().saturating_sub(visible.max(1))
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.max_scroll() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HelpPopupAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up();
                None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(HelpPopupAction::Close)
            }
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(HelpPopupAction::Close),
            _ => None,
        }
    }
}

fn content_sized_rect(width: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let available_width = r.width;
    let width = width.min(available_width);
    let margin = (available_width.saturating_sub(width)) / 2;

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(width),
            Constraint::Length(margin),
        ])
        .split(popup_layout[1])[1]
}
