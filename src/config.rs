//! Per-model notification options.

use serde::{Deserialize, Serialize};

/// How a model delivers notifications raised while it is already notifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Nested notifications are queued and delivered after the current fan-out.
    #[default]
    Deferred,
    /// Nested notifications run recursively, up to `max_depth` levels.
    Immediate,
}

/// Options applied to a [`Model`](crate::Model) at construction.
///
/// ```
/// use modelkit::{ModelOptions, NotifyMode};
///
/// let options = ModelOptions::default()
///     .notify(NotifyMode::Immediate)
///     .max_depth(8);
/// assert_eq!(options.max_depth, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Delivery of notifications raised during a fan-out.
    pub notify: NotifyMode,
    /// Recursion limit for [`NotifyMode::Immediate`].
    pub max_depth: usize,
    /// Skip notifying keys whose value did not change in `set_state`/`reset`.
    pub skip_unchanged: bool,
}

impl ModelOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Set how nested notifications are delivered.
    pub fn notify(mut self, mode: NotifyMode) -> Self {
        self.notify = mode;
        self
    }

    /// Set the recursion limit used in [`NotifyMode::Immediate`].
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether `set_state` and `reset` skip keys whose value is unchanged.
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            notify: NotifyMode::Deferred,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            skip_unchanged: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ModelOptions::default();
        assert_eq!(options.notify, NotifyMode::Deferred);
        assert_eq!(options.max_depth, 64);
        assert!(options.skip_unchanged);
    }

    #[test]
    fn deserialize_partial() {
        let options: ModelOptions = serde_json::from_str(r#"{"notify": "immediate"}"#).unwrap();
        assert_eq!(options.notify, NotifyMode::Immediate);
        assert_eq!(options.max_depth, ModelOptions::DEFAULT_MAX_DEPTH);
        assert!(options.skip_unchanged);
    }

    #[test]
    fn builder() {
        let options = ModelOptions::default().skip_unchanged(false).max_depth(2);
        assert!(!options.skip_unchanged);
        assert_eq!(options.max_depth, 2);
    }
}
