use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::config::ResolvedConfig;
use crate::core::session::{InputAffordance, Session};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{TitleBar, TurnList, choice_bar};

const NOTICE_HEIGHT: u16 = 3;
const SESSION_COMPLETE_NOTICE: &str = "Session complete. Follow the link above to continue.";

/// Height of the bottom area for the session's current affordance.
pub fn bottom_height(session: &Session, tui: &TuiState, width: u16) -> u16 {
    match session.affordance() {
        InputAffordance::FreeText => tui.input_box.calculate_height(width),
        InputAffordance::YesNo => choice_bar::HEIGHT,
        InputAffordance::Disabled => NOTICE_HEIGHT,
    }
}

pub fn draw_ui(frame: &mut Frame, session: &Session, config: &ResolvedConfig, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let bottom = bottom_height(session, tui, frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(bottom)]);
    let [title_area, main_area, bottom_area] = layout.areas(frame.area());

    TitleBar::new(&config.assistant_name, &config.base_url, &tui.status).render(frame, title_area);

    TurnList::new(
        &mut tui.turn_list,
        session.history(),
        tui.pending.as_ref(),
        &config.assistant_name,
        tui.pulse_value,
    )
    .render(frame, main_area);

    match session.affordance() {
        InputAffordance::FreeText => tui.input_box.render(frame, bottom_area),
        InputAffordance::YesNo => tui.choice_bar.render(frame, bottom_area),
        InputAffordance::Disabled => draw_locked_notice(frame, bottom_area),
    }
}

fn draw_locked_notice(frame: &mut Frame, area: Rect) {
    let notice = Paragraph::new(SESSION_COMPLETE_NOTICE)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
        .block(Block::bordered().border_type(BorderType::Rounded));
    frame.render_widget(notice, area);
}
