use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::segment::Segment;
use crate::core::session::{Speaker, Turn, TurnContent};
use crate::tui::component::Component;
use crate::tui::highlight;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Pulse intensity threshold above which the border transitions from normal to BOLD.
const PULSE_BOLD_THRESHOLD: f32 = 0.6;
/// Pulse intensity threshold above which the border transitions from DIM to normal.
const PULSE_NORMAL_THRESHOLD: f32 = 0.2;

const USER_LABEL: &str = "You";

/// A stateless component that renders one conversation turn.
///
/// `TurnView` is created fresh each frame by `TurnList`. Each segment kind
/// gets its own treatment:
/// - **TextLine**: one plain line; empty lines keep their vertical space
/// - **ConfigBlock**: framed, syntax-highlighted YAML (see [`highlight`])
/// - **Link**: underlined label followed by the URL
///
/// Heights are measured with the same `Paragraph` that renders, so the
/// parent list can lay out the scroll canvas before drawing.
#[derive(Clone, Copy)]
pub struct TurnView<'a> {
    pub turn: &'a Turn,
    /// Label shown on assistant turns
    pub assistant_name: &'a str,
    /// Current pulse intensity (0.0 to 1.0) while the turn is awaiting its reply
    pub pulse_intensity: f32,
}

impl<'a> TurnView<'a> {
    pub fn new(turn: &'a Turn, assistant_name: &'a str, pulse_intensity: f32) -> Self {
        Self {
            turn,
            assistant_name,
            pulse_intensity,
        }
    }

    /// Calculate the height required for this turn given a width.
    pub fn calculate_height(turn: &Turn, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        let lines = body_paragraph(turn).line_count(content_width);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

fn speaker_style(speaker: Speaker) -> Style {
    match speaker {
        Speaker::User => Style::default().fg(Color::Green),
        Speaker::Assistant => Style::default().fg(Color::Blue),
    }
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

/// Builds the styled body of a turn.
pub fn turn_text(turn: &Turn) -> Text<'static> {
    let style = speaker_style(turn.speaker);
    match &turn.content {
        TurnContent::Text(text) => Text::from(
            text.split('\n')
                .map(|line| Line::styled(line.to_string(), style))
                .collect::<Vec<_>>(),
        ),
        TurnContent::Segments(segments) if segments.is_empty() => Text::from(Line::styled(
            "(empty reply)",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
        TurnContent::Segments(segments) => {
            let mut lines = Vec::new();
            for segment in segments {
                match segment {
                    Segment::ConfigBlock { content } => {
                        lines.extend(highlight::config_block(content));
                    }
                    Segment::TextLine { .. } => {
                        lines.push(Line::styled(segment.plain_text().to_string(), style));
                    }
                    Segment::Link { url, label } => {
                        lines.push(Line::from(vec![
                            Span::styled(label.clone(), link_style()),
                            Span::raw(" ("),
                            Span::styled(url.clone(), link_style()),
                            Span::raw(")"),
                        ]));
                    }
                }
            }
            Text::from(lines)
        }
    }
}

// Indentation matters inside config blocks, so wrapping never trims.
fn body_paragraph(turn: &Turn) -> Paragraph<'static> {
    Paragraph::new(turn_text(turn)).wrap(Wrap { trim: false })
}

impl<'a> Widget for TurnView<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = speaker_style(self.turn.speaker);
        let title = match self.turn.speaker {
            Speaker::User => USER_LABEL,
            Speaker::Assistant => self.assistant_name,
        };

        // Three-phase breathing: DIM → normal → BOLD using the speaker's own color
        let mut border_style = style.add_modifier(Modifier::DIM);
        if self.pulse_intensity > PULSE_BOLD_THRESHOLD {
            border_style = border_style
                .remove_modifier(Modifier::DIM)
                .add_modifier(Modifier::BOLD);
        } else if self.pulse_intensity > PULSE_NORMAL_THRESHOLD {
            border_style = border_style.remove_modifier(Modifier::DIM);
        }

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        body_paragraph(self.turn).render(inner_area, buf);
    }
}

impl<'a> Component for TurnView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
