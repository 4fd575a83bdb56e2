use std::{env, time::Duration};

// Runtime/server constants read from the environment, with defaults
// matching the protocol contract.

pub fn http_port() -> u16 {
    env::var("ROOM_SERVER_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3004)
}

fn duration_from_env(key: &str, default_ms: u64) -> Duration {
    let millis = env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(millis)
}

pub fn countdown() -> Duration {
    duration_from_env("COUNTDOWN_MS", 5_000)
}

pub fn sync_tolerance_ms() -> u64 {
    env::var("SYNC_TOLERANCE_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10_000)
}

pub fn reveal_delay() -> Duration {
    duration_from_env("REVEAL_DELAY_MS", 1_500)
}

pub fn retry_delay() -> Duration {
    duration_from_env("RETRY_DELAY_MS", 3_000)
}

pub fn opponent_delay() -> Duration {
    duration_from_env("OPPONENT_DELAY_MS", 1_000)
}

pub fn auto_advance_delay() -> Duration {
    duration_from_env("AUTO_ADVANCE_MS", 2_000)
}

pub fn chat_capacity() -> usize {
    env::var("CHAT_CAPACITY")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(50)
}

pub fn chat_max_len() -> usize {
    env::var("CHAT_MAX_LEN")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(240)
}

/// Expected answers, one per round, from a comma-separated list.
pub fn solutions() -> Vec<String> {
    env::var("ROOM_SOLUTIONS")
        .unwrap_or_else(|_| "blue,seven,echo".to_string())
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
