//! # TitleBar Component
//!
//! Single-line bar at the top of the screen:
//!
//! ```text
//! ChatApp v2 @ http://localhost:8000 | Waiting for server…
//! ```
//!
//! Stateless: every field is a prop refreshed by the parent each frame. The
//! status segment is omitted when empty.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar<'a> {
    pub assistant_name: &'a str,
    pub base_url: &'a str,
    pub status: &'a str,
}

impl<'a> TitleBar<'a> {
    pub fn new(assistant_name: &'a str, base_url: &'a str, status: &'a str) -> Self {
        Self {
            assistant_name,
            base_url,
            status,
        }
    }

    fn line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled(
                self.assistant_name,
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" @ ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.base_url, Style::default().fg(Color::DarkGray)),
        ];
        if !self.status.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(self.status, Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
