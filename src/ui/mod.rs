//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal setup and the event loop that routes keys to the
//!   draft or to [`crate::core::exchange`].
//! - [`renderer`] and [`text_wrapping`]: frame composition for the transcript
//!   and the input box.
//! - [`fault_boundary`]: contains rendering panics behind a fallback view.
//! - [`theme`]: color/style policy.
//!
//! This layer only presents state; [`crate::core`] owns the transcript and the
//! exchange cycle.

pub mod chat_loop;
pub mod fault_boundary;
pub mod renderer;
pub mod text_wrapping;
pub mod theme;
