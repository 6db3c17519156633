//! Core trait exposing a static singleton entry.
//!
//! This module provides the `SingletonApi` trait with default implementations for
//! configuring, retrieving and tracing a process-wide [`Singleton`].
//!
//! Implementors only supply the static entry; every operation delegates to it.

use std::sync::Arc;

use crate::{InitPolicy, InitState, Singleton, SingletonError, SingletonEvent};

/// Core trait defining singleton access.
///
/// Provides default implementations for all operations, requiring only the `entry`
/// accessor to be implemented. The `define_singleton!` macro implements it for a
/// generated zero-sized type.
pub trait SingletonApi {
    /// The type of the single instance.
    type Instance: Send + Sync + 'static;

    /// Access the entry static.
    ///
    /// This method must be implemented to provide access to the process-wide entry.
    fn entry() -> &'static Singleton<Self::Instance>;

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for the entry's lifecycle events.
    ///
    /// # Safety Restrictions
    ///
    /// The callback must NOT call `configure` or `get` on the same entry: it can run while
    /// the construction lock is held, which would deadlock.
    fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        Self::entry().set_trace_callback(callback);
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        Self::entry().clear_trace_callback();
    }

    // -------------------------------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------------------------------

    /// Fix the initialization policy; eager policies build the instance right away.
    ///
    /// # Errors
    ///
    /// - Policy already fixed, or instance already materialized
    /// - Eager constructor failed
    fn configure(&self, policy: InitPolicy) -> Result<(), SingletonError> {
        Self::entry().configure(policy)
    }

    /// Retrieve the single instance, building it if the policy is lazy.
    ///
    /// # Errors
    ///
    /// - Constructor failed during this call
    /// - Entry permanently failed under `StaticBlock`
    fn get(&self) -> Result<Arc<Self::Instance>, SingletonError> {
        Self::entry().get()
    }

    /// Retrieve a cloned instance.
    ///
    /// # Errors
    ///
    /// Same as [`SingletonApi::get`].
    fn get_cloned(&self) -> Result<Self::Instance, SingletonError>
    where
        Self::Instance: Clone,
    {
        let arc = self.get()?;
        Ok((*arc).clone())
    }

    /// Check whether the instance exists.
    fn is_initialized(&self) -> bool {
        Self::entry().is_initialized()
    }

    /// Current lifecycle state of the entry.
    fn state(&self) -> InitState {
        Self::entry().state()
    }

    /// The fixed policy, if any.
    fn policy(&self) -> Option<InitPolicy> {
        Self::entry().policy()
    }

    /// Number of instances the entry has built.
    fn constructed_count(&self) -> usize {
        Self::entry().constructed_count()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
