//! A single-instance entry with a selectable initialization policy.
//!
//! A [`Singleton<T>`] owns at most one `Arc<T>` for its whole lifetime. The policy picked
//! with [`Singleton::configure`] decides when the constructor runs and which
//! synchronization guards it; see [`InitPolicy`] for the full list.
//!
//! # Examples
//!
//! ```
//! use single_instance_registry::{InitPolicy, Singleton};
//! use std::sync::Arc;
//!
//! let logger = Singleton::new(|| String::from("logger"));
//! logger.configure(InitPolicy::LazyDoubleChecked).unwrap();
//! assert!(!logger.is_initialized());
//!
//! let first = logger.get().unwrap();
//! let second = logger.get().unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(logger.constructed_count(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::{BoxError, ConfigurationErrorKind, InitPolicy, SingletonError, SingletonEvent};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives every [`SingletonEvent`] the entry emits. It must be thread-safe
/// because the entry is usually shared through a static.
pub type TraceCallback = dyn Fn(&SingletonEvent) + Send + Sync + 'static;

type Constructor<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync + 'static>;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

/// Lifecycle of a singleton entry.
///
/// `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    /// A `StaticBlock` constructor failed; the entry will never hold an instance.
    Failed,
}

impl InitState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            INITIALIZING => InitState::Initializing,
            READY => InitState::Ready,
            FAILED => InitState::Failed,
            _ => InitState::Uninitialized,
        }
    }
}

fn no_constructor<T>() -> Result<T, BoxError> {
    Err("entry was created from a value".into())
}

/// Process-wide slot for a single instance of `T`.
pub struct Singleton<T> {
    type_name: &'static str,
    constructor: Constructor<T>,
    policy: OnceLock<InitPolicy>,
    state: AtomicU8,
    instance: ArcSwapOption<T>,
    // Guards construction for every policy except `LazyUnsafe` and `LazyHelperDeferred`.
    init_lock: Mutex<()>,
    deferred: OnceCell<Arc<T>>,
    failure: OnceLock<SingletonError>,
    constructed: AtomicUsize,
    trace: ArcSwapOption<Box<TraceCallback>>,
}

impl<T: Send + Sync + 'static> Singleton<T> {
    /// Creates an unconfigured entry around an infallible constructor.
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_constructor(Box::new(move || Ok::<T, BoxError>(constructor())))
    }

    /// Creates an unconfigured entry around a fallible constructor.
    ///
    /// The constructor may run more than once: after a retryable failure, or concurrently
    /// under [`InitPolicy::LazyUnsafe`].
    pub fn try_new<F, E>(constructor: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::from_constructor(Box::new(move || {
            constructor().map_err(Into::<BoxError>::into)
        }))
    }

    /// Creates an entry that is already `Ready` with `value`, under [`InitPolicy::Eager`].
    ///
    /// ```
    /// use single_instance_registry::{InitPolicy, InitState, Singleton};
    ///
    /// let config = Singleton::with_value(42u32);
    /// assert_eq!(config.state(), InitState::Ready);
    /// assert_eq!(config.policy(), Some(InitPolicy::Eager));
    /// assert_eq!(*config.get().unwrap(), 42);
    /// ```
    pub fn with_value(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            constructor: Box::new(no_constructor::<T>),
            policy: OnceLock::from(InitPolicy::Eager),
            state: AtomicU8::new(READY),
            instance: ArcSwapOption::new(Some(Arc::new(value))),
            init_lock: Mutex::new(()),
            deferred: OnceCell::new(),
            failure: OnceLock::new(),
            constructed: AtomicUsize::new(1),
            trace: ArcSwapOption::empty(),
        }
    }

    fn from_constructor(constructor: Constructor<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            constructor,
            policy: OnceLock::new(),
            state: AtomicU8::new(UNINITIALIZED),
            instance: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
            deferred: OnceCell::new(),
            failure: OnceLock::new(),
            constructed: AtomicUsize::new(0),
            trace: ArcSwapOption::empty(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a tracing callback invoked for every event this entry emits.
    ///
    /// Replaces any previous callback. The callback may run while the entry's construction
    /// lock is held, so it must not call `configure` or `get` on the same entry.
    pub fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        let callback: Box<TraceCallback> = Box::new(callback);
        self.trace.store(Some(Arc::new(callback)));
    }

    /// Clears the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.store(None);
    }

    fn emit_event(&self, event: &SingletonEvent) {
        let guard = self.trace.load();
        if let Some(callback) = &*guard {
            callback(event);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------------------------------

    /// Fixes the initialization policy.
    ///
    /// Eager policies ([`InitPolicy::Eager`], [`InitPolicy::StaticBlock`]) build the instance
    /// before returning.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationErrorKind::AlreadyMaterialized`] if the instance already exists
    /// - [`ConfigurationErrorKind::AlreadyConfigured`] if a policy was already fixed, either by
    ///   an earlier call or by a `get` on an unconfigured entry
    /// - [`SingletonError::Construction`] if an eager constructor failed. The policy stays
    ///   fixed; under `Eager` a later `get` retries, under `StaticBlock` the entry is `Failed`.
    pub fn configure(&self, policy: InitPolicy) -> Result<(), SingletonError> {
        let _guard = self.init_lock.lock();

        if self.is_initialized() {
            return Err(self.configuration_error(ConfigurationErrorKind::AlreadyMaterialized));
        }
        self.policy
            .set(policy)
            .map_err(|_| self.configuration_error(ConfigurationErrorKind::AlreadyConfigured))?;

        debug!(type_name = self.type_name, %policy, "singleton policy configured");
        self.emit_event(&SingletonEvent::Configure {
            type_name: self.type_name,
            policy,
        });

        if policy.is_eager() {
            self.construct_locked(policy)?;
        }
        Ok(())
    }

    fn configuration_error(&self, kind: ConfigurationErrorKind) -> SingletonError {
        SingletonError::Configuration {
            type_name: self.type_name,
            kind,
        }
    }

    /// Returns the configured policy, fixing the default on an unconfigured entry.
    fn effective_policy(&self) -> InitPolicy {
        if let Some(policy) = self.policy.get() {
            return *policy;
        }

        let mut fixed_here = false;
        let policy = *self.policy.get_or_init(|| {
            fixed_here = true;
            InitPolicy::default()
        });
        if fixed_here {
            debug!(type_name = self.type_name, %policy, "no policy configured, using default");
            self.emit_event(&SingletonEvent::Configure {
                type_name: self.type_name,
                policy,
            });
        }
        policy
    }

    // ---------------------------------------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------------------------------------

    /// Returns the shared instance, building it first if the policy is lazy.
    ///
    /// All callers receive clones of the same `Arc` (except under [`InitPolicy::LazyUnsafe`],
    /// where racing first callers may each get their own).
    ///
    /// # Errors
    ///
    /// [`SingletonError::Construction`] if the constructor failed during this call, or if the
    /// entry is permanently `Failed`.
    pub fn get(&self) -> Result<Arc<T>, SingletonError> {
        let policy = self.effective_policy();

        let result = match policy {
            InitPolicy::LazyUnsafe => self.get_unsynchronized(policy),
            InitPolicy::LazyLocked => self.get_locked(policy),
            InitPolicy::LazyHelperDeferred => self.get_deferred(policy),
            InitPolicy::Eager | InitPolicy::StaticBlock | InitPolicy::LazyDoubleChecked => {
                self.get_double_checked(policy)
            }
        };

        trace!(type_name = self.type_name, found = result.is_ok(), "singleton get");
        self.emit_event(&SingletonEvent::Get {
            type_name: self.type_name,
            found: result.is_ok(),
        });

        result
    }

    fn get_unsynchronized(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        // Check-then-act with no lock: racing callers can all pass the check.
        if let Some(instance) = self.instance.load_full() {
            return Ok(instance);
        }
        self.run_constructor(policy)
    }

    fn get_locked(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        let _guard = self.init_lock.lock();
        match self.ready_instance() {
            Some(instance) => Ok(instance),
            None => self.construct_locked(policy),
        }
    }

    fn get_double_checked(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        if let Some(instance) = self.ready_instance() {
            return Ok(instance);
        }

        let _guard = self.init_lock.lock();
        if let Some(instance) = self.ready_instance() {
            return Ok(instance);
        }
        self.construct_locked(policy)
    }

    fn get_deferred(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        self.deferred
            .get_or_try_init(|| self.run_constructor(policy))
            .cloned()
    }

    /// Loads the instance once the `Ready` flag is visible.
    fn ready_instance(&self) -> Option<Arc<T>> {
        if self.state.load(Ordering::Acquire) == READY {
            self.instance.load_full()
        } else {
            None
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------------------------------

    /// Caller must hold `init_lock`.
    fn construct_locked(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        if let Some(failure) = self.failure.get() {
            return Err(failure.clone());
        }
        self.run_constructor(policy)
    }

    fn run_constructor(&self, policy: InitPolicy) -> Result<Arc<T>, SingletonError> {
        let _ = self.state.compare_exchange(
            UNINITIALIZED,
            INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        match (self.constructor)() {
            Ok(value) => Ok(self.publish(policy, Arc::new(value))),
            Err(source) => Err(self.record_failure(policy, source)),
        }
    }

    fn publish(&self, policy: InitPolicy, instance: Arc<T>) -> Arc<T> {
        let previous = self.instance.swap(Some(Arc::clone(&instance)));
        let constructed = self.constructed.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.store(READY, Ordering::Release);

        debug!(type_name = self.type_name, %policy, "singleton constructed");
        self.emit_event(&SingletonEvent::Construct {
            type_name: self.type_name,
            policy,
        });

        if previous.is_some() {
            warn!(
                type_name = self.type_name,
                constructed, "singleton instance replaced by a duplicate"
            );
            self.emit_event(&SingletonEvent::Duplicate {
                type_name: self.type_name,
                constructed,
            });
        }

        instance
    }

    fn record_failure(&self, policy: InitPolicy, source: BoxError) -> SingletonError {
        let cause = source.to_string();
        let failure = SingletonError::construction(self.type_name, source);
        let permanent = policy == InitPolicy::StaticBlock;

        // Only the attempt that moved the entry to `Initializing` may move it back, so a
        // racing success under `LazyUnsafe` keeps `Ready`.
        if permanent {
            let _ = self.failure.set(failure.clone());
            let _ = self.state.compare_exchange(
                INITIALIZING,
                FAILED,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        } else {
            let _ = self.state.compare_exchange(
                INITIALIZING,
                UNINITIALIZED,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }

        error!(
            type_name = self.type_name,
            %policy,
            permanent,
            error = %failure,
            %cause,
            "singleton construction failed"
        );
        self.emit_event(&SingletonEvent::Failed {
            type_name: self.type_name,
            policy,
            permanent,
        });

        failure
    }

    // ---------------------------------------------------------------------------------------------
    // Probes
    // ---------------------------------------------------------------------------------------------

    /// True once the instance exists. Never blocks and never builds anything.
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Current lifecycle state. Never blocks.
    pub fn state(&self) -> InitState {
        InitState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The fixed policy, or `None` if neither `configure` nor `get` has run.
    pub fn policy(&self) -> Option<InitPolicy> {
        self.policy.get().copied()
    }

    /// Number of instances the constructor has produced.
    ///
    /// Stays at 1 for every policy but [`InitPolicy::LazyUnsafe`].
    pub fn constructed_count(&self) -> usize {
        self.constructed.load(Ordering::Acquire)
    }

    /// Name of the instance type, as used in errors and events.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl<T> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("type_name", &self.type_name)
            .field("policy", &self.policy.get())
            .field("state", &InitState::from_u8(self.state.load(Ordering::Acquire)))
            .field("constructed", &self.constructed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
