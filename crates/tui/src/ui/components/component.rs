//! Component system for the actrun TUI.
//!
//! Components own local UI behavior, render themselves into a provided
//! `Rect`, and report side effects back to the runtime as [`Effect`]s rather
//! than performing I/O directly.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use actrun_types::{Effect, Msg};

use crate::app::App;

pub(crate) trait Component {
    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Update internal state based on an application message.
    fn update(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Implementations should be side-effect free except for frame drawing
    /// and cursor placement.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
