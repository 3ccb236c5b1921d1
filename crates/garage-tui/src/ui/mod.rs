//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout, and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Light and dark palettes
//! - `widgets`: Button, Input, Modal, Badge, Card, Spinner
//! - `cards`: Car and owner cards
//! - `forms`: Form and delete-confirmation modals
//! - `tabs`: Tab-specific content rendering

pub mod cards;
pub mod forms;
pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
pub mod widgets;
