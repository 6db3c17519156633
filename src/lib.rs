//! # Single Instance Registry
//!
//! Process-wide single-instance entries with a selectable initialization policy.
//!
//! A [`Singleton<T>`] guarantees that at most one `T` is ever built, and hands every caller
//! the same `Arc<T>`, no matter how many threads race on the first access. When and how the
//! instance is built is decided by an [`InitPolicy`], picked once with
//! [`Singleton::configure`].
//!
//! ## Quick Start
//!
//! ```rust
//! use single_instance_registry::{InitPolicy, Singleton};
//! use std::sync::Arc;
//!
//! let logger = Singleton::new(|| String::from("app.log"));
//! logger.configure(InitPolicy::LazyDoubleChecked).unwrap();
//!
//! let a: Arc<String> = logger.get().unwrap();
//! let b: Arc<String> = logger.get().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Policies
//!
//! | Policy | Built | Thread-safe |
//! |---|---|---|
//! | [`InitPolicy::Eager`] | in `configure` | yes |
//! | [`InitPolicy::LazyUnsafe`] | first `get` | **no**, racing callers may each build one |
//! | [`InitPolicy::LazyLocked`] | first `get` | yes, every call locks |
//! | [`InitPolicy::LazyDoubleChecked`] | first `get` | yes, lock only until ready |
//! | [`InitPolicy::LazyHelperDeferred`] | first `get` | yes, via a one-time cell |
//! | [`InitPolicy::StaticBlock`] | in `configure` | yes, failure is permanent |
//!
//! ## Main Items
//!
//! - [`Singleton`] - The entry itself
//! - [`define_singleton!`] - Declare a static entry with free functions
//! - [`SingletonApi`] - Trait giving a static entry the full API
//! - [`SingletonEvent`] - Lifecycle events for tracing callbacks
//! - [`SingletonError`] - Configuration and construction failures

mod macros;
mod policy;
mod singleton;
mod singleton_error;
mod singleton_event;
mod singleton_trait;

pub use policy::{InitPolicy, ParsePolicyError};
pub use singleton::{InitState, Singleton, TraceCallback};
pub use singleton_error::{BoxError, ConfigurationErrorKind, SingletonError};
pub use singleton_event::SingletonEvent;
pub use singleton_trait::SingletonApi;
