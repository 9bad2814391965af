//! # ChoiceBar Component
//!
//! Replaces the input box while the session waits for a YES/NO confirmation.
//! ←/→ move the highlight, Enter confirms the highlighted option, `y`/`n`
//! confirm directly. Events are ignored while `read_only` is set.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::controller::Choice;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceEvent {
    Confirm(Choice),
}

pub struct ChoiceBar {
    pub selected: Choice,
    pub read_only: bool,
}

impl Default for ChoiceBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceBar {
    pub fn new() -> Self {
        Self {
            selected: Choice::Yes,
            read_only: false,
        }
    }

    fn option(&self, label: &'static str, choice: Choice, color: Color) -> Span<'static> {
        let style = if self.selected == choice {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        Span::styled(label, style)
    }
}

impl Component for ChoiceBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            self.option("  YES  ", Choice::Yes, Color::Green),
            Span::raw("   "),
            self.option("  NO  ", Choice::No, Color::Red),
        ]);
        let mut style = Style::default();
        if self.read_only {
            style = style.add_modifier(Modifier::DIM);
        }
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(" Confirm? (←/→ select, Enter or y/n) ");
        frame.render_widget(
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .style(style)
                .block(block),
            area,
        );
    }
}

impl EventHandler for ChoiceBar {
    type Event = ChoiceEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.read_only {
            return None;
        }
        match event {
            TuiEvent::CursorLeft => {
                self.selected = Choice::Yes;
                None
            }
            TuiEvent::CursorRight => {
                self.selected = Choice::No;
                None
            }
            TuiEvent::Submit => Some(ChoiceEvent::Confirm(self.selected)),
            TuiEvent::InputChar('y' | 'Y') => {
                self.selected = Choice::Yes;
                Some(ChoiceEvent::Confirm(Choice::Yes))
            }
            TuiEvent::InputChar('n' | 'N') => {
                self.selected = Choice::No;
                Some(ChoiceEvent::Confirm(Choice::No))
            }
            _ => None,
        }
    }
}
