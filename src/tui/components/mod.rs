//! # TUI Components
//!
//! Components follow two patterns:
//!
//! ### Stateless (props-based rendering)
//!
//! Built fresh each frame from borrowed data:
//! - `TitleBar`: assistant name, server URL, status
//! - `TurnView`: one conversation turn with segment-aware rendering
//!
//! ### Stateful (event-driven)
//!
//! Kept in `TuiState` across frames; they handle `TuiEvent`s and emit
//! higher-level events for the run loop:
//! - `InputBox`: multi-line free-text editor
//! - `ChoiceBar`: YES/NO confirmation
//! - `TurnListState`: scroll position and layout cache for `TurnList`
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── turn.rs
//! ├── turn_list.rs
//! ├── input_box.rs
//! └── choice_bar.rs
//! ```

pub mod choice_bar;
pub mod input_box;
mod title_bar;
pub mod turn;
pub mod turn_list;

pub use choice_bar::{ChoiceBar, ChoiceEvent};
pub use input_box::{InputBox, InputEvent};
pub use title_bar::TitleBar;
pub use turn::TurnView;
pub use turn_list::{TurnList, TurnListState};
