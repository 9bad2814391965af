use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive their data as props (struct fields), may keep
/// presentation state of their own, and draw into a `Rect` of the frame.
/// `render` takes `&mut self` so layout caches and scroll offsets can be
/// refreshed during the draw pass, the same way a ratatui `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that reacts to terminal events.
pub trait EventHandler {
    /// The high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent`; `None` means "nothing for the parent".
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
