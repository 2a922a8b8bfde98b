//! Demo configuration structures and loaders.
use std::env;

/// Settings for one scripted demo run.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Number of ticks to simulate.
    pub ticks: u32,
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Open both trees in the inspector and dump them at the end.
    pub inspect: bool,
    /// Seed for the wander AI's target picking.
    pub seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 360,
            tick_rate: 60,
            inspect: true,
            seed: 7,
        }
    }
}

impl DemoConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DEMO_TICKS` - Ticks to simulate (default: 360)
    /// - `DEMO_TICK_RATE` - Ticks per second (default: 60)
    /// - `DEMO_INSPECT` - Dump inspector views at the end: true/false, 1/0, yes/no, on/off (default: true)
    /// - `DEMO_SEED` - Wander AI seed (default: 7)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ticks) = read_env::<u32>("DEMO_TICKS") {
            config.ticks = ticks;
        }

        if let Some(rate) = read_env::<u32>("DEMO_TICK_RATE") {
            config.tick_rate = rate.max(1);
        }

        if let Some(inspect) = read_env_bool("DEMO_INSPECT") {
            config.inspect = inspect;
        }

        if let Some(seed) = read_env::<u64>("DEMO_SEED") {
            config.seed = seed;
        }

        config
    }

    /// Fixed tick length in seconds.
    pub fn delta(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_simulate_six_seconds() {
        let config = DemoConfig::default();
        assert_eq!(config.ticks / config.tick_rate, 6);
        assert!((config.delta() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let config = DemoConfig {
            tick_rate: 0,
            ..DemoConfig::default()
        };
        assert_eq!(config.delta(), 1.0);
    }

    #[test]
    fn read_env_ignores_missing_values() {
        assert_eq!(read_env::<u32>("STATE_TREE_DEMO_SURELY_UNSET"), None);
        assert_eq!(read_env_bool("STATE_TREE_DEMO_SURELY_UNSET"), None);
    }

    #[test]
    fn bool_flags_accept_common_spellings() {
        for value in ["true", "1", "yes", "ON"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }
}
