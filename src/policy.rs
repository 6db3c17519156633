//! Initialization policies and their textual configuration form.

use std::env::{self, VarError};
use std::fmt;
use std::str::FromStr;

/// When and how a singleton entry builds its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InitPolicy {
    /// Built inside `configure`.
    Eager,
    /// Built by the first `get` with an unguarded check-then-act.
    ///
    /// Concurrent first callers can each build an instance. Kept to show the race, not for use.
    LazyUnsafe,
    /// Built by the first `get`; every call takes the entry lock.
    LazyLocked,
    /// Built by the first `get`; the lock is only taken while the entry is not ready.
    #[default]
    LazyDoubleChecked,
    /// Built by the first `get` through a one-time initialization cell.
    LazyHelperDeferred,
    /// Built inside `configure`; a constructor failure poisons the entry for good.
    StaticBlock,
}

impl InitPolicy {
    pub const ALL: [InitPolicy; 6] = [
        InitPolicy::Eager,
        InitPolicy::LazyUnsafe,
        InitPolicy::LazyLocked,
        InitPolicy::LazyDoubleChecked,
        InitPolicy::LazyHelperDeferred,
        InitPolicy::StaticBlock,
    ];

    /// Whether the instance is built at configuration time.
    pub fn is_eager(self) -> bool {
        matches!(self, InitPolicy::Eager | InitPolicy::StaticBlock)
    }

    /// Whether concurrent first callers are guaranteed to share one instance.
    pub fn is_thread_safe(self) -> bool {
        !matches!(self, InitPolicy::LazyUnsafe)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InitPolicy::Eager => "eager",
            InitPolicy::LazyUnsafe => "lazy-unsafe",
            InitPolicy::LazyLocked => "lazy-locked",
            InitPolicy::LazyDoubleChecked => "lazy-double-checked",
            InitPolicy::LazyHelperDeferred => "lazy-helper-deferred",
            InitPolicy::StaticBlock => "static-block",
        }
    }

    /// Reads a policy from the environment variable `key`.
    ///
    /// Returns `Ok(None)` when the variable is unset or empty. A value that is not valid
    /// Unicode is rejected like any other unknown policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use single_instance_registry::InitPolicy;
    ///
    /// std::env::set_var("DOCTEST_SINGLETON_POLICY", "lazy_locked");
    /// let policy = InitPolicy::from_env("DOCTEST_SINGLETON_POLICY").unwrap();
    /// assert_eq!(policy, Some(InitPolicy::LazyLocked));
    /// ```
    pub fn from_env(key: &str) -> Result<Option<InitPolicy>, ParsePolicyError> {
        match env::var(key) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => value.parse().map(Some),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(ParsePolicyError {
                input: raw.to_string_lossy().into_owned(),
            }),
        }
    }
}

impl fmt::Display for InitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown initialization policy `{input}`")]
pub struct ParsePolicyError {
    pub input: String,
}

impl FromStr for InitPolicy {
    type Err = ParsePolicyError;

    /// Accepts the kebab-case names, case-insensitively, with `_` allowed as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        InitPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| ParsePolicyError {
                input: s.to_string(),
            })
    }
}
