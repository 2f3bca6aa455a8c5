//! Orthodox file manager shortcuts for Nautilus.
//!
//! [`walk`] finds widgets in the host window, [`accel`] rewrites and
//! persists the host's accelerators, [`orthodox`] ties both together.

pub mod accel;
pub mod config;
pub mod error;
pub mod inspector;
pub mod keybindings;
pub mod launcher;
pub mod logging;
pub mod orthodox;
pub mod walk;
pub mod widget;

pub use accel::{AccelBinding, AccelMap, AccelRegistry, BindingBackend};
pub use error::{NemoError, Result};
pub use walk::{walk, Node, Walker};
pub use widget::Widget;
