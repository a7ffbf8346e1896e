pub mod document;
pub mod event_source;
pub mod inputs;
pub mod main_app;
pub mod navigation;
pub mod notification;
pub mod page_controller;
pub mod panic_handler;
pub mod settings;
pub mod share;
pub mod terminal;
pub mod theme;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use document::{Chapter, Document, DocumentMeta};
pub use main_app::{App, AppAction, run_app_with_event_source};
pub use page_controller::{NavigationError, PageController, PageView};
