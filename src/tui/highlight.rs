//! Config block → ratatui `Line`s.
//!
//! Frames the block as
//!
//! ```text
//! ╭── yaml ──
//! │ key: value
//! ╰──
//! ```
//!
//! and colours the body with syntect. When no syntax or theme is available
//! the body is emitted unstyled.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::core::segment::CONFIG_LANGUAGE;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Renders the inner content of a config block as framed, highlighted lines.
pub fn config_block(content: &str) -> Vec<Line<'static>> {
    let bs = border_style();
    let mut lines = vec![Line::from(vec![
        Span::styled("╭── ", bs),
        Span::styled(CONFIG_LANGUAGE, bs.add_modifier(Modifier::BOLD)),
        Span::styled(" ──", bs),
    ])];

    let mut highlighter = SYNTAX_SET
        .find_syntax_by_token(CONFIG_LANGUAGE)
        .zip(THEME_SET.themes.get(THEME))
        .map(|(syntax, theme)| HighlightLines::new(syntax, theme));

    // The fence usually leaves a newline on each side of the body.
    let body = content.trim_matches(['\n', '\r']);
    for raw_line in LinesWithEndings::from(body) {
        let mut spans = vec![Span::styled("│ ", bs)];
        let highlighted = highlighter
            .as_mut()
            .and_then(|hl| hl.highlight_line(raw_line, &SYNTAX_SET).ok());
        match highlighted {
            Some(ranges) => spans.extend(ranges.into_iter().filter_map(|(style, frag)| {
                let content = expand_tabs(frag.trim_end_matches(['\n', '\r']));
                if content.is_empty() {
                    return None;
                }
                let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                Some(Span::styled(content, Style::default().fg(fg)))
            })),
            None => spans.push(Span::styled(
                expand_tabs(raw_line.trim_end_matches(['\n', '\r'])),
                Style::default().fg(Color::White),
            )),
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled("╰──", bs)));
    lines
}

// ratatui renders \t as zero-width
fn expand_tabs(text: &str) -> String {
    text.replace('\t', "    ")
}
