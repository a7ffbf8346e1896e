use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::navigation::{Control, progress_fill, progress_percent};
use crate::notification::{Notification, NotificationLevel};
use crate::page_controller::PageView;
use crate::theme::Base16Palette;

pub const PREVIOUS_LABEL: &str = " ◀ Previous ";
pub const NEXT_LABEL: &str = " Next ▶ ";
const BAR_PADDING: u16 = 2;

/// Previous/next buttons, progress bar and status line.
#[derive(Debug, Default)]
pub struct Footer {
    previous: Rect,
    next: Rect,
    previous_enabled: bool,
    next_enabled: bool,
}

impl Footer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enabled state of (previous, next) as last drawn.
    pub fn button_states(&self) -> (bool, bool) {
        (self.previous_enabled, self.next_enabled)
    }

    pub fn button_area(&self, control: Control) -> Option<Rect> {
        match control {
            Control::Previous => Some(self.previous),
            Control::Next => Some(self.next),
            Control::Chapter(_) => None,
        }
    }

    /// The button under the cursor, enabled or not. Callers still have to
    /// check [`Control::activate`] before navigating.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Control> {
        let inside = |rect: &Rect| {
            column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
        };
        if inside(&self.previous) {
            Some(Control::Previous)
        } else if inside(&self.next) {
            Some(Control::Next)
        } else {
            None
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        view: &PageView,
        notification: Option<&Notification>,
        palette: &Base16Palette,
    ) {
        let (_, border_color, bg_color) = palette.get_panel_colors(false);
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.height == 0 {
            self.previous = Rect::default();
            self.next = Rect::default();
            return;
        }

        self.previous_enabled = Control::Previous.is_enabled(view);
        self.next_enabled = Control::Next.is_enabled(view);

        let previous_width = (PREVIOUS_LABEL.width() as u16).min(inner.width);
        let next_width =
            (NEXT_LABEL.width() as u16).min(inner.width.saturating_sub(previous_width));
        self.previous = Rect::new(inner.x, inner.y, previous_width, 1);
        self.next = Rect::new(inner.right() - next_width, inner.y, next_width, 1);

        f.render_widget(
            button(PREVIOUS_LABEL, self.previous_enabled, false, palette),
            self.previous,
        );
        f.render_widget(button(NEXT_LABEL, self.next_enabled, true, palette), self.next);

        let bar_x = self.previous.right() + BAR_PADDING;
        let bar_width = self.next.x.saturating_sub(bar_x + BAR_PADDING);
        if bar_width > 0 {
            let filled = progress_fill(view.progress, bar_width);
            let bar = Line::from(vec![
                Span::styled(
                    "█".repeat(filled as usize),
                    Style::default().fg(palette.base_0d),
                ),
                Span::styled(
                    "░".repeat((bar_width - filled) as usize),
                    Style::default().fg(palette.base_02),
                ),
            ]);
            f.render_widget(Paragraph::new(bar), Rect::new(bar_x, inner.y, bar_width, 1));
        }

        if inner.height > 1 {
            let status_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
            let status = match notification {
                Some(notification) => notification_line(notification, palette),
                None => Line::from(Span::styled(
                    format!(
                        "Chapter {} of {} · {}%",
                        view.chapter_number(),
                        view.length,
                        progress_percent(view)
                    ),
                    Style::default().fg(palette.base_04),
                )),
            };
            f.render_widget(
                Paragraph::new(status).alignment(Alignment::Center),
                status_area,
            );
        }
    }
}

fn button(
    label: &'static str,
    enabled: bool,
    primary: bool,
    palette: &Base16Palette,
) -> Paragraph<'static> {
    let (bg, fg) = palette.get_button_colors(enabled, primary);
    let mut style = Style::default().bg(bg).fg(fg);
    style = if enabled {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    };
    Paragraph::new(Line::from(Span::styled(label, style)))
}

fn notification_line(notification: &Notification, palette: &Base16Palette) -> Line<'static> {
    let color = match notification.level {
        NotificationLevel::Info => palette.base_0b,
        NotificationLevel::Warning => palette.base_0a,
        NotificationLevel::Error => palette.base_08,
    };
    Line::from(Span::styled(
        notification.message.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}
