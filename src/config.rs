//! Configuration for virtual-serve.
//!
//! A [`Config`] is built once per server instance with [`ConfigBuilder`] and
//! handed to the [`VirtualFileSystem`](crate::file::VirtualFileSystem) and
//! [`HeaderRegistry`](crate::response::HeaderRegistry) that belong to it.
//! There is no process-wide configuration.

use crate::file::IoPolicy;

/// Runtime configuration for one server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Whether file contents are stored in the content cache.
    ///
    /// When disabled, the injected backend is replaced by
    /// [`NoContentCache`](crate::cache::NoContentCache).
    pub cache_enabled: bool,
    /// How I/O failures during content access are reported.
    pub io_policy: IoPolicy,
    /// Emit per-request debug events on the header path (cookie sets,
    /// runtime header registration).
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            io_policy: IoPolicy::Degrade,
            debug: false,
        }
    }
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    cache_enabled: Option<bool>,
    io_policy: Option<IoPolicy>,
    debug: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the content cache.
    ///
    /// Default: `true`
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    /// Set the I/O failure policy.
    ///
    /// Default: [`IoPolicy::Degrade`]
    ///
    /// # Example
    ///
    /// ```
    /// use virtual_serve::config::ConfigBuilder;
    /// use virtual_serve::file::IoPolicy;
    ///
    /// let config = ConfigBuilder::new().io_policy(IoPolicy::Strict).build();
    /// assert_eq!(config.io_policy, IoPolicy::Strict);
    /// ```
    pub fn io_policy(mut self, policy: IoPolicy) -> Self {
        self.io_policy = Some(policy);
        self
    }

    /// Enable per-request debug events.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Build the configuration, filling unset fields with defaults.
    pub fn build(self) -> Config {
        let defaults = Config::default();
        Config {
            cache_enabled: self.cache_enabled.unwrap_or(defaults.cache_enabled),
            io_policy: self.io_policy.unwrap_or(defaults.io_policy),
            debug: self.debug.unwrap_or(defaults.debug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cache_enabled);
        assert_eq!(config.io_policy, IoPolicy::Degrade);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new().cache_enabled(false).debug(true).build();
        assert!(!config.cache_enabled);
        assert!(config.debug);
        assert_eq!(config.io_policy, IoPolicy::Degrade);
    }
}
