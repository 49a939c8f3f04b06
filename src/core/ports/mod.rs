//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between core business logic
//! and external systems (document store, language service, model artifacts).
//!
//! Implementations live in the `adapters` and `inference` modules.
//!
//! ## Design Principle
//!
//! The core domain logic depends only on these traits, never on concrete
//! implementations. This enables:
//!
//! - **Testability**: Mock implementations for unit tests
//! - **Flexibility**: Swap implementations without changing business logic
//! - **Clarity**: Clear boundaries between layers

mod attempt_store;
mod classifier;
mod rule_generator;
mod rule_store;

pub use attempt_store::{AttemptStore, StoreError};
pub use classifier::{InferenceError, TextClassifier};
pub use rule_generator::{GeneratorError, RuleGenerator};
pub use rule_store::RuleStore;
