use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::document::{Chapter, Document};
use crate::event_source::EventSource;
use crate::inputs::KeySeq;
use crate::navigation::{Control, NavCommand, NavigatorGrid, control_for_key};
use crate::notification::NotificationManager;
use crate::page_controller::{NavigationError, PageController, PageView, Transition};
use crate::settings;
use crate::share::{ClipboardSink, SystemClipboard, share_chapter};
use crate::theme::current_theme;
use crate::widget::content_pane::ContentPane;
use crate::widget::footer::Footer;
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};
use crate::widget::navigator::Sidebar;

const MOUSE_SCROLL_LINES: usize = 3;
const SIDEBAR_PERCENT: u16 = 32;
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Everything a render pass needs, read from one position so the chapter
/// and the derived flags can never disagree.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub chapter: &'a Chapter,
    pub view: PageView,
}

pub struct App {
    document: Document,
    controller: PageController,
    content: ContentPane,
    sidebar: Sidebar,
    footer: Footer,
    notifications: NotificationManager,
    clipboard: Box<dyn ClipboardSink>,
    key_sequence: KeySeq,
    help_popup: Option<HelpPopup>,
    show_sidebar: bool,
    navigator_columns: usize,
    margin: u16,
}

impl App {
    pub fn new(document: Document) -> Self {
        Self::with_clipboard(document, Box::new(SystemClipboard))
    }

    pub fn with_clipboard(document: Document, clipboard: Box<dyn ClipboardSink>) -> Self {
        let controller = PageController::for_document(&document);
        info!(
            "Viewer ready: {:?}, {} chapters",
            document.title(),
            document.len()
        );

        Self {
            document,
            controller,
            content: ContentPane::new(),
            sidebar: Sidebar::new(),
            footer: Footer::new(),
            notifications: NotificationManager::new(),
            clipboard,
            key_sequence: KeySeq::new(),
            help_popup: None,
            show_sidebar: settings::is_sidebar_shown(),
            navigator_columns: settings::get_navigator_columns(),
            margin: settings::get_margin(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn view(&self) -> PageView {
        self.controller.view()
    }

    pub fn position(&self) -> usize {
        self.controller.position()
    }

    pub fn render_state(&self) -> RenderState<'_> {
        let view = self.controller.view();
        let chapter = &self.document.chapters()[view.position];
        RenderState { chapter, view }
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn clipboard(&self) -> &dyn ClipboardSink {
        self.clipboard.as_ref()
    }

    pub fn content(&self) -> &ContentPane {
        &self.content
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn is_sidebar_shown(&self) -> bool {
        self.show_sidebar
    }

    pub fn is_help_open(&self) -> bool {
        self.help_popup.is_some()
    }

    /// Apply a navigation command. A rejected jump leaves the position alone
    /// and is reported as a warning.
    pub fn apply(&mut self, command: NavCommand) -> Result<Transition, NavigationError> {
        let transition = match command {
            NavCommand::Advance => self.controller.advance(),
            NavCommand::Retreat => self.controller.retreat(),
            NavCommand::JumpToLast => self.controller.jump_to_last(),
            NavCommand::JumpTo(index) => match self.controller.jump_to(index) {
                Ok(transition) => transition,
                Err(e) => {
                    warn!("Rejected navigation: {e}");
                    self.notifications
                        .warn(format!("No chapter {}", index.saturating_add(1)));
                    return Err(e);
                }
            },
        };
        if transition.is_change() {
            self.on_position_changed(transition);
        }
        Ok(transition)
    }

    /// Activate an on-screen control. Disabled controls do nothing.
    pub fn activate(&mut self, control: Control) -> Option<Transition> {
        let Some(command) = control.activate(&self.controller.view()) else {
            debug!("Ignoring disabled control {control:?}");
            return None;
        };
        self.apply(command).ok()
    }

    fn on_position_changed(&mut self, transition: Transition) {
        debug!(
            "Chapter {} -> {}, resetting scroll",
            transition.from + 1,
            transition.to + 1
        );
        self.content.reset_scroll();
    }

    pub fn share_current_chapter(&mut self) {
        let position = self.controller.position();
        match share_chapter(self.clipboard.as_mut(), &self.document, position) {
            Ok(number) => self
                .notifications
                .info(format!("Copied chapter {number} to clipboard")),
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
        if !self.show_sidebar {
            self.sidebar.clear();
        }
    }

    fn jump_to_chapter_number(&mut self, number: usize) {
        match number.checked_sub(1) {
            Some(index) => {
                let _ = self.apply(NavCommand::JumpTo(index));
            }
            None => {
                warn!("Rejected navigation: chapter number 0");
                self.notifications.warn("No chapter 0");
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if let Some(popup) = self.help_popup.as_mut() {
            if let Some(HelpPopupAction::Close) = popup.handle_key(key) {
                self.help_popup = None;
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.key_sequence.clear();
            match key.code {
                KeyCode::Char('c') => return Some(AppAction::Quit),
                KeyCode::Char('d') => self.content.scroll_down(self.content.half_page()),
                KeyCode::Char('u') => self.content.scroll_up(self.content.half_page()),
                _ => {}
            }
            return None;
        }

        if let Some(control) = control_for_key(&key) {
            self.key_sequence.clear();
            self.activate(control);
            return None;
        }

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.key_sequence.count().is_none() {
                    self.key_sequence.clear();
                }
                self.key_sequence.push(key);
            }
            KeyCode::Char('G') | KeyCode::Enter => {
                let count = self.key_sequence.count();
                self.key_sequence.clear();
                match count {
                    Some(number) => self.jump_to_chapter_number(number),
                    None if key.code == KeyCode::Char('G') => {
                        let _ = self.apply(NavCommand::JumpToLast);
                    }
                    None => {}
                }
            }
            KeyCode::Char('g') => {
                if self.key_sequence.matches(&[KeyCode::Char('g')]) {
                    self.key_sequence.clear();
                    let _ = self.apply(NavCommand::JumpTo(0));
                } else {
                    self.key_sequence.clear();
                    self.key_sequence.push(key);
                }
            }
            other => {
                self.key_sequence.clear();
                match other {
                    KeyCode::Home => {
                        let _ = self.apply(NavCommand::JumpTo(0));
                    }
                    KeyCode::End => {
                        let _ = self.apply(NavCommand::JumpToLast);
                    }
                    KeyCode::Char('j') | KeyCode::Down => self.content.scroll_down(1),
                    KeyCode::Char('k') | KeyCode::Up => self.content.scroll_up(1),
                    KeyCode::Char('y') => self.share_current_chapter(),
                    KeyCode::Char('z') => self.toggle_sidebar(),
                    KeyCode::Char('?') => self.help_popup = Some(HelpPopup::new()),
                    KeyCode::Esc => {
                        self.notifications.dismiss_current();
                    }
                    KeyCode::Char('q') => return Some(AppAction::Quit),
                    _ => {}
                }
            }
        }
        None
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.help_popup.is_some() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(control) = self.footer.hit_test(mouse.column, mouse.row) {
                    self.activate(control);
                } else if let Some(index) = self.sidebar.hit_test(mouse.column, mouse.row) {
                    self.activate(Control::Chapter(index));
                }
            }
            MouseEventKind::ScrollDown => self.content.scroll_down(MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollUp => self.content.scroll_up(MOUSE_SCROLL_LINES),
            _ => {}
        }
    }

    /// Periodic housekeeping; returns true when a redraw is needed.
    pub fn tick(&mut self) -> bool {
        self.notifications.update()
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let palette = current_theme();
        let area = f.area();
        let state = self.render_state();
        let view = state.view;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.render_header(f, chunks[0], &view);

        let (content_area, sidebar_area) = if self.show_sidebar {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(100 - SIDEBAR_PERCENT),
                    Constraint::Percentage(SIDEBAR_PERCENT),
                ])
                .split(chunks[1]);
            (columns[0], Some(columns[1]))
        } else {
            (chunks[1], None)
        };

        let chapter = &self.document.chapters()[view.position];
        self.content
            .render(f, content_area, chapter, self.margin, palette);

        if let Some(sidebar_area) = sidebar_area {
            let grid = NavigatorGrid::new(self.document.len(), self.navigator_columns);
            self.sidebar.render(
                f,
                sidebar_area,
                self.document.meta(),
                grid,
                view.position,
                palette,
            );
        }

        self.footer
            .render(f, chunks[2], &view, self.notifications.current(), palette);

        if let Some(popup) = self.help_popup.as_mut() {
            popup.render(f, area, palette);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect, view: &PageView) {
        let palette = current_theme();
        let (_, border_color, bg_color) = palette.get_panel_colors(false);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let title = Line::from(Span::styled(
            format!(" {}", self.document.title()),
            Style::default()
                .fg(palette.base_07)
                .add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(title), inner);

        let entry = Line::from(vec![
            Span::styled("y: share  ?: help  ", Style::default().fg(palette.base_03)),
            Span::styled(
                format!("Entry #{} ", view.chapter_number()),
                Style::default().fg(palette.base_0c),
            ),
        ]);
        f.render_widget(Paragraph::new(entry.right_aligned()), inner);
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = std::time::Instant::now();
    let mut first_render = true;
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            match event {
                Event::Key(key) => {
                    if app.handle_key_event(key) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Mouse(mouse_event) => app.handle_mouse_event(mouse_event),
                Event::Resize(_, _) => {}
                _ => {}
            }

            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0 || first_render;
        first_render = false;

        if last_tick.elapsed() >= tick_rate {
            if app.tick() {
                needs_redraw = true;
            }
            last_tick = std::time::Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            info!("Quit requested at chapter {}", app.position() + 1);
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::MemoryClipboard;
    use crossterm::event::KeyEventState;
    use ratatui::backend::TestBackend;

    fn app_with(chapters: usize) -> (App, MemoryClipboard) {
        let document = Document::new(
            (0..chapters)
                .map(|i| {
                    Chapter::new(format!("Chapter title {}", i + 1))
                        .with_paragraphs((0..40).map(|p| format!("paragraph {p}")))
                })
                .collect(),
        )
        .unwrap();
        let clipboard = MemoryClipboard::new();
        (
            App::with_clipboard(document, Box::new(clipboard.clone())),
            clipboard,
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppAction> {
        app.handle_key_event(KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    #[test]
    fn render_state_tracks_position() {
        let (mut app, _) = app_with(3);
        assert_eq!(app.render_state().chapter.title, "Chapter title 1");
        app.apply(NavCommand::Advance).unwrap();
        let state = app.render_state();
        assert_eq!(state.chapter.title, "Chapter title 2");
        assert_eq!(state.view.position, 1);
        assert!(!state.view.is_first && !state.view.is_last);
    }

    #[test]
    fn scroll_resets_once_per_change_and_never_on_redundant_jump() {
        let (mut app, _) = app_with(4);
        draw(&mut app);

        app.content.scroll_down(5);
        app.apply(NavCommand::JumpTo(0)).unwrap();
        assert_eq!(app.content().scroll_resets(), 0);
        assert_eq!(app.content().scroll_offset(), 5);

        app.apply(NavCommand::Advance).unwrap();
        assert_eq!(app.content().scroll_resets(), 1);
        assert_eq!(app.content().scroll_offset(), 0);

        draw(&mut app);
        draw(&mut app);
        assert_eq!(app.content().scroll_resets(), 1);

        app.apply(NavCommand::JumpToLast).unwrap();
        app.apply(NavCommand::Advance).unwrap();
        assert_eq!(app.content().scroll_resets(), 2);
    }

    #[test]
    fn out_of_range_jump_is_reported_not_applied() {
        let (mut app, _) = app_with(3);
        app.apply(NavCommand::JumpTo(1)).unwrap();

        let err = app.apply(NavCommand::JumpTo(3)).unwrap_err();
        assert_eq!(
            err,
            NavigationError::OutOfRangeSelection {
                index: 3,
                length: 3
            }
        );
        assert_eq!(app.position(), 1);
        assert_eq!(app.notifications().current().unwrap().message, "No chapter 4");
    }

    #[test]
    fn disabled_controls_are_not_invoked() {
        let (mut app, _) = app_with(2);
        assert_eq!(app.activate(Control::Previous), None);
        assert!(app.activate(Control::Next).is_some());
        assert_eq!(app.activate(Control::Next), None);
        assert_eq!(app.activate(Control::Chapter(9)), None);
        assert_eq!(app.position(), 1);
        assert_eq!(app.content().scroll_resets(), 1);
    }

    #[test]
    fn count_prefix_jumps_to_chapter_number() {
        let (mut app, _) = app_with(12);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.position(), 10);

        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.position(), 2);

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.position(), 11);

        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.position(), 0);
    }

    #[test]
    fn typed_out_of_range_number_warns() {
        let (mut app, _) = app_with(5);
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.position(), 0);
        assert_eq!(app.notifications().current().unwrap().message, "No chapter 9");

        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.position(), 0);
        assert_eq!(app.notifications().current().unwrap().message, "No chapter 0");
    }

    #[test]
    fn typed_number_too_large_for_usize_warns() {
        let expected = format!("No chapter {}", usize::MAX);
        for terminator in [KeyCode::Char('G'), KeyCode::Enter] {
            let (mut app, _) = app_with(5);
            for c in "123456789012345678901".chars() {
                press(&mut app, KeyCode::Char(c));
            }
            press(&mut app, terminator);
            assert_eq!(app.position(), 0);
            assert_eq!(app.notifications().current().unwrap().message, expected);
        }

        let (mut app, _) = app_with(5);
        for _ in 0..23 {
            press(&mut app, KeyCode::Char('9'));
        }
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.position(), 0);
        assert_eq!(app.notifications().current().unwrap().message, expected);
    }

    #[test]
    fn share_success_and_failure_leave_position_alone() {
        let (mut app, clipboard) = app_with(3);
        app.apply(NavCommand::Advance).unwrap();
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(
            clipboard.last().as_deref(),
            Some("Untitled - Chapter 2: Chapter title 2\n\nparagraph 0...")
        );
        assert_eq!(
            app.notifications().current().unwrap().message,
            "Copied chapter 2 to clipboard"
        );

        let document = app.document().clone();
        let mut failing = App::with_clipboard(document, Box::new(MemoryClipboard::failing()));
        failing.apply(NavCommand::Advance).unwrap();
        failing.share_current_chapter();
        assert_eq!(failing.position(), 1);
        assert!(
            failing
                .notifications()
                .current()
                .unwrap()
                .message
                .starts_with("Failed to access clipboard")
        );
    }

    #[test]
    fn help_popup_swallows_navigation_keys() {
        let (mut app, _) = app_with(3);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.is_help_open());
        press(&mut app, KeyCode::Right);
        assert_eq!(app.position(), 0);
        assert_eq!(press(&mut app, KeyCode::Esc), None);
        assert!(!app.is_help_open());
        press(&mut app, KeyCode::Right);
        assert_eq!(app.position(), 1);
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut app, _) = app_with(3);
        app.handle_key_event(KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(app.position(), 0);
    }

    #[test]
    fn quit_keys() {
        let (mut app, _) = app_with(1);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(AppAction::Quit));
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppAction::Quit)
        );
    }
}
