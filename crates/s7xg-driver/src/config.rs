use std::time::Duration;

use s7xg_frame::FrameConfig;
use serde::{Deserialize, Serialize};

/// Default reply deadline, matching the module's own command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of undelivered RF events kept before the oldest is dropped.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 32;

/// Configuration for a [`Driver`](crate::Driver).
///
/// Serializes with durations in whole milliseconds:
///
/// ```json
/// { "timeout_ms": 10000, "event_queue_capacity": 32,
///   "discard_after_timeout": true, "discard_window_ms": 50,
///   "frame": { "capacity": 256, "poll_interval_ms": 1, "resync_on_noise": false } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Deadline for each reply frame.
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
    /// Frame reader settings.
    #[serde(with = "frame_settings")]
    pub frame: FrameConfig,
    /// Bound on queued RF events.
    pub event_queue_capacity: usize,
    /// Drain late bytes after every timeout so they cannot answer the next command.
    pub discard_after_timeout: bool,
    /// How long the post-timeout drain listens for stragglers.
    #[serde(rename = "discard_window_ms", with = "millis")]
    pub discard_window: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            frame: FrameConfig::default(),
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            discard_after_timeout: true,
            discard_window: Duration::from_millis(50),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod frame_settings {
    use std::time::Duration;

    use s7xg_frame::FrameConfig;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct Settings {
        capacity: usize,
        poll_interval_ms: u64,
        resync_on_noise: bool,
    }

    impl Default for Settings {
        fn default() -> Self {
            Settings::from(&FrameConfig::default())
        }
    }

    impl From<&FrameConfig> for Settings {
        fn from(config: &FrameConfig) -> Self {
            Self {
                capacity: config.capacity,
                poll_interval_ms: u64::try_from(config.poll_interval.as_millis())
                    .unwrap_or(u64::MAX),
                resync_on_noise: config.resync_on_noise,
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &FrameConfig, serializer: S) -> Result<S::Ok, S::Error> {
        Settings::from(value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<FrameConfig, D::Error> {
        let settings = Settings::deserialize(deserializer)?;
        Ok(FrameConfig {
            capacity: settings.capacity,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            resync_on_noise: settings.resync_on_noise,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.event_queue_capacity, 32);
        assert!(config.discard_after_timeout);
        assert_eq!(config.frame.capacity, 256);
        assert!(!config.frame.resync_on_noise);
    }

    #[test]
    fn durations_serialize_as_milliseconds() {
        let json = serde_json::to_value(DriverConfig::default()).unwrap();
        assert_eq!(json["timeout_ms"], 10_000);
        assert_eq!(json["discard_window_ms"], 50);
        assert_eq!(json["frame"]["poll_interval_ms"], 1);
        assert_eq!(json["frame"]["capacity"], 256);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DriverConfig =
            serde_json::from_str(r#"{"timeout_ms": 2500, "frame": {"resync_on_noise": true}}"#)
                .unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(config.frame.resync_on_noise);
        assert_eq!(config.frame.capacity, 256);
        assert_eq!(config.event_queue_capacity, 32);
    }
}
