use std::time::Duration;

use super::handles::DeviceId;

/// Configuration for a recording/playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfiguration {
    /// Audio length represented by one captured fragment (default: 250 ms).
    /// Track durations are derived from this, never from decoded audio.
    pub fragment_interval: Duration,

    /// Period of the playback clock that refreshes the reported offset
    /// (default: 50 ms).
    pub clock_interval: Duration,

    /// Capture device used for every track. When `None`, the per-track
    /// selection made through `set_device` applies, falling back to the
    /// source's default device.
    pub capture_device: Option<DeviceId>,

    /// Prefix for generated track names: `"{prefix} {n}"` (default: "Track").
    pub track_name_prefix: String,

    /// Maximum number of undoable commands kept (None = unlimited).
    pub max_history: Option<usize>,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.fragment_interval.is_zero() {
            return Err("fragment interval must be positive".into());
        }
        if self.clock_interval.is_zero() {
            return Err("clock interval must be positive".into());
        }
        if self.track_name_prefix.trim().is_empty() {
            return Err("track name prefix must not be empty".into());
        }
        if self.max_history == Some(0) {
            return Err("history limit must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            fragment_interval: Duration::from_millis(250),
            clock_interval: Duration::from_millis(50),
            capture_device: None,
            track_name_prefix: "Track".into(),
            max_history: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SessionConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_intervals() {
        let config = SessionConfiguration {
            fragment_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfiguration {
            clock_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_prefix_and_zero_history() {
        let config = SessionConfiguration {
            track_name_prefix: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfiguration {
            max_history: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
