pub mod test_helpers {
    use crate::document::{Chapter, Document, DocumentMeta};
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Add a Ctrl+character key press
        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        /// Advance with the right arrow
        pub fn next_chapter(self) -> Self {
            self.press_key(KeyCode::Right)
        }

        /// Retreat with the left arrow
        pub fn prev_chapter(self) -> Self {
            self.press_key(KeyCode::Left)
        }

        pub fn space(self) -> Self {
            self.press_char(' ')
        }

        /// Type a count prefix such as `12`
        pub fn digits(mut self, number: usize) -> Self {
            for c in number.to_string().chars() {
                self.events.push(SimulatedEventSource::char_key(c));
            }
            self
        }

        /// Scroll down n lines (press 'j' n times)
        pub fn scroll_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events
                .push(SimulatedEventSource::left_click(column, row));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }

    /// A document of `chapters` chapters titled "Day 1", "Day 2", ...
    /// each long enough to scroll.
    pub fn sample_document(chapters: usize) -> Document {
        let meta = DocumentMeta {
            title: Some("Test Diary".to_string()),
            author: Some("Nobody in particular".to_string()),
            epigraph: Some("Write it down before it fades.".to_string()),
        };
        let chapters = (1..=chapters)
            .map(|n| {
                Chapter::new(format!("Day {n}")).with_paragraphs(
                    (1..=30).map(|p| format!("Day {n}, paragraph {p}, a line of filler text.")),
                )
            })
            .collect();
        Document::with_meta(meta, chapters).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = TestScenarioBuilder::new()
            .next_chapter()
            .digits(12)
            .press_char('G')
            .click(3, 4)
            .quit()
            .build();

        assert_eq!(scenario.remaining(), 6);
    }

    #[test]
    fn sample_document_has_requested_length() {
        let doc = sample_document(7);
        assert_eq!(doc.len(), 7);
        assert_eq!(doc.chapter(6).unwrap().title, "Day 7");
    }
}
