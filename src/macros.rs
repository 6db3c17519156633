//! Macros for declaring process-wide singletons.
//!
//! This module provides a macro-based approach to declare a static, policy-configurable
//! singleton entry together with ergonomic free functions for it.

/// Declares a process-wide singleton with a single macro invocation.
///
/// The macro generates a module containing:
/// - The entry static (hidden), created on first touch of the module's functions
/// - An `Api` struct that implements `SingletonApi`
/// - Free functions: `configure`, `get`, `is_initialized`, `state`, `policy`,
///   `constructed_count`, `set_trace_callback`, `clear_trace_callback`
///
/// The type and constructor are resolved from the enclosing module, so they must be
/// declared at module level rather than inside a function body.
///
/// Prefix the constructor with `fallible` when it returns a `Result`.
///
/// # Examples
///
/// ```rust
/// use single_instance_registry::{define_singleton, InitPolicy};
/// use std::sync::Arc;
///
/// pub struct Logger {
///     prefix: String,
/// }
///
/// define_singleton!(logger, Logger, || Logger { prefix: "[app]".into() });
///
/// fn main() {
///     logger::configure(InitPolicy::LazyDoubleChecked).unwrap();
///     assert!(!logger::is_initialized());
///
///     let a: Arc<Logger> = logger::get().unwrap();
///     let b: Arc<Logger> = logger::get().unwrap();
///     assert!(Arc::ptr_eq(&a, &b));
///     assert_eq!(a.prefix, "[app]");
/// }
/// ```
///
/// # Fallible Constructors
///
/// ```rust
/// use single_instance_registry::{define_singleton, InitPolicy, InitState};
///
/// pub struct Pool;
///
/// define_singleton!(pool, Pool, fallible || Err::<Pool, _>("no database configured"));
///
/// fn main() {
///     assert!(pool::configure(InitPolicy::StaticBlock).is_err());
///     assert!(pool::get().is_err());
///     assert_eq!(pool::state(), InitState::Failed);
/// }
/// ```
#[macro_export]
macro_rules! define_singleton {
    (@module $name:ident, $ty:ty, $entry:expr) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;
            use std::sync::{Arc, LazyLock};

            // Entry for the single instance (module-private)
            static ENTRY: LazyLock<$crate::Singleton<$ty>> = LazyLock::new(|| $entry);

            /// Zero-sized type that implements the singleton API.
            ///
            /// All operations are provided by the `SingletonApi` trait's
            /// default implementations. This struct only provides access to the static.
            struct Api;

            impl $crate::SingletonApi for Api {
                type Instance = $ty;

                fn entry() -> &'static $crate::Singleton<$ty> {
                    &ENTRY
                }
            }

            const API: Api = Api;

            // Free functions for ergonomic usage - they delegate to API

            /// Fix the initialization policy.
            pub fn configure(policy: $crate::InitPolicy) -> Result<(), $crate::SingletonError> {
                use $crate::SingletonApi;
                API.configure(policy)
            }

            /// Retrieve the single instance.
            pub fn get() -> Result<Arc<$ty>, $crate::SingletonError> {
                use $crate::SingletonApi;
                API.get()
            }

            /// Check whether the instance exists.
            pub fn is_initialized() -> bool {
                use $crate::SingletonApi;
                API.is_initialized()
            }

            pub fn state() -> $crate::InitState {
                use $crate::SingletonApi;
                API.state()
            }

            pub fn policy() -> Option<$crate::InitPolicy> {
                use $crate::SingletonApi;
                API.policy()
            }

            pub fn constructed_count() -> usize {
                use $crate::SingletonApi;
                API.constructed_count()
            }

            /// Set a tracing callback for the entry's events.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::SingletonEvent) + Send + Sync + 'static,
            ) {
                use $crate::SingletonApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SingletonApi;
                API.clear_trace_callback()
            }
        }
    };

    ($name:ident, $ty:ty, fallible $ctor:expr) => {
        $crate::define_singleton!(@module $name, $ty, $crate::Singleton::try_new($ctor));
    };

    ($name:ident, $ty:ty, $ctor:expr) => {
        $crate::define_singleton!(@module $name, $ty, $crate::Singleton::new($ctor));
    };
}
