//! # TurnList Component
//!
//! Scrollable view of the conversation history.
//!
//! `TurnList` is a transient component (created each frame) that wraps
//! `&'a mut TurnListState` (persistent state) and the turns to show (props).
//! History only ever grows at the end, so measured heights are cached per
//! width and only new turns are measured. The provisional turn of an exchange
//! in flight is measured every frame and never cached.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::session::Turn;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::turn::TurnView;
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the turn list.
/// Must be persisted in the parent TuiState.
pub struct TurnListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for TurnListState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Scrollable conversation view component.
pub struct TurnList<'a> {
    pub state: &'a mut TurnListState,
    pub history: &'a [Turn],
    /// User turn of the exchange in flight, shown after the history
    pub pending: Option<&'a Turn>,
    pub assistant_name: &'a str,
    pub pulse_value: f32,
}

impl<'a> TurnList<'a> {
    pub fn new(
        state: &'a mut TurnListState,
        history: &'a [Turn],
        pending: Option<&'a Turn>,
        assistant_name: &'a str,
        pulse_value: f32,
    ) -> Self {
        Self {
            state,
            history,
            pending,
            assistant_name,
            pulse_value,
        }
    }
}

impl<'a> Component for TurnList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.history.len(), content_width);
        layout.heights.truncate(reusable);
        for turn in self.history.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(TurnView::calculate_height(turn, content_width));
        }
        layout.pending_height = self
            .pending
            .map_or(0, |turn| TurnView::calculate_height(turn, content_width));
        layout.update_metadata(self.history.len(), content_width);

        let total_height = layout.total_height();

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        // 3. Render every turn into the scroll canvas
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = 0;
        for (turn, &height) in self.history.iter().zip(&self.state.layout.heights) {
            let rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(TurnView::new(turn, self.assistant_name, 0.0), rect);
            y_offset = y_offset.saturating_add(height);
        }
        if let Some(turn) = self.pending {
            let rect = Rect::new(0, y_offset, content_width, self.state.layout.pending_height);
            scroll_view.render_widget(
                TurnView::new(turn, self.assistant_name, self.pulse_value),
                rect,
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Event handling lives on `TurnListState` since `TurnList` is rebuilt every frame.
impl EventHandler for TurnListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub pending_height: u16,
    turn_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            pending_height: 0,
            turn_count: 0,
            content_width: 0,
        }
    }

    /// Number of cached heights still valid for `turn_count` turns at `content_width`.
    pub fn reusable_count(&self, turn_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || turn_count < self.turn_count {
            return 0;
        }
        self.heights.len().min(turn_count)
    }

    pub fn update_metadata(&mut self, turn_count: usize, content_width: u16) {
        self.turn_count = turn_count;
        self.content_width = content_width;
    }

    pub fn total_height(&self) -> u16 {
        self.heights
            .iter()
            .fold(self.pending_height, |acc, &h| acc.saturating_add(h))
    }
}
