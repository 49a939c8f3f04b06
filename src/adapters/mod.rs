//! Adapters for external systems
//!
//! Concrete implementations of the port traits in [`crate::core::ports`].
//!
//! - [`gemini`] - Rule generation over the Google Generative Language API
//! - [`mongo`] - Attempt and rule persistence in `MongoDB`

#[cfg(feature = "learner")]
pub mod gemini;
#[cfg(feature = "learner")]
pub mod mongo;
