pub mod content_pane;
pub mod footer;
pub mod help_popup;
pub mod navigator;
