//! # Core Application Logic
//!
//! This module contains ChatApp's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • segment (parsing)    │
//!                    │  • session (state)      │
//!                    │  • controller (flow)    │
//!                    │                         │
//!                    │  No markup. No widgets. │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │ Transport  │
//!     │  Adapter   │                          │  (HTTP)    │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`segment`]: raw reply → ordered `Segment`s
//! - [`session`]: the `Session` aggregate and its input affordance table
//! - [`controller`]: `ConversationController`, which drives exchanges
//! - [`config`]: settings resolution

pub mod config;
pub mod controller;
pub mod segment;
pub mod session;
