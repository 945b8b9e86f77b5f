//! # hexen-core: editor core for hexen
//!
//! The navigation and input-dispatch half of the hex editor:
//!
//! - **[`key`]**: key tokens and the per-mode key sequence resolver
//! - **[`command`]**: the commands a resolved key sequence can produce
//! - **[`mode`]**: interaction modes and the pure mode transition table
//! - **[`keymap`]**: the default bindings, one resolver per mode
//! - **[`source`]**: the byte-access collaborator (files, memory)
//! - **[`jumplist`]**: back-navigation history for address jumps
//! - **[`window`]**: the viewport/cursor engine over a byte source
//! - **[`state`]**: immutable snapshots handed to the renderer
//! - **[`ui`]**: the front-end boundary (input in, redraws out)
//! - **[`editor`]**: the control loop tying all of the above together
//!
//! Nothing here touches the terminal. Any front end that implements
//! [`ui::Frontend`] can drive the core.

pub mod command;
pub mod editor;
pub mod error;
pub mod jumplist;
pub mod key;
pub mod keymap;
pub mod mode;
pub mod source;
pub mod state;
pub mod ui;
pub mod window;

pub use error::{Error, Result};
