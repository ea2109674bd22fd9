//! Wahwah Engine — effect lifecycle and multi-channel realtime glue.
//!
//! Crate layout:
//! - [`effect`]  : [`effect::WahwahEffect`], the master/slave instance manager
//! - [`error`]   : typed configuration and sequencing errors
//! - [`sources`] : deterministic demo/test signal sources
//!
//! The engine deliberately avoids heap allocations in the audio path; the
//! only allocating call is `realtime_add_channel`, a control-plane event.
//! Parameters are a plain record read once per block by every stream.

pub mod effect;
pub mod error;
pub mod sources;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use effect::{ChannelRole, EffectDescriptor, WahwahEffect, REALTIME_BLOCK_SIZE, WAHWAH};
pub use error::EffectError;
