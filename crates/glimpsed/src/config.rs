use std::path::PathBuf;

/// Default salt, matching the sample environment file. Real deployments
/// must override it: the salt is the only secret keeping digests one-way.
pub const PLACEHOLDER_SALT: &str = "please-change-me";

/// Producer configuration, loaded from environment variables.
pub struct Config {
    /// Path to the SQLite database file shared with the web process.
    pub db_path: PathBuf,
    /// Secret salt keying the identity digest.
    pub id_salt: String,
    /// Minimum seconds between accepted sightings of one identifier.
    pub cooldown_secs: f64,
    /// Fixed sleep after each loop iteration (CPU backpressure).
    pub frame_interval_ms: u64,
    /// Backoff after a transient frame-read failure.
    pub read_backoff_ms: u64,
    /// Synthetic sensor: number of simulated subjects in the pool.
    pub synth_subjects: usize,
    /// Synthetic sensor: pool seed (same seed = same population).
    pub synth_seed: u64,
    /// Synthetic sensor: inject a read failure every Nth frame (0 = never).
    pub synth_drop_every: u64,
}

impl Config {
    /// Load configuration from `GLIMPSE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("GLIMPSE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/glimpse.db")),
            id_salt: std::env::var("GLIMPSE_ID_SALT")
                .unwrap_or_else(|_| PLACEHOLDER_SALT.to_string()),
            cooldown_secs: env_f64("GLIMPSE_COOLDOWN_SECS", 3.0),
            frame_interval_ms: env_u64("GLIMPSE_FRAME_INTERVAL_MS", 150),
            read_backoff_ms: env_u64("GLIMPSE_READ_BACKOFF_MS", 100),
            synth_subjects: env_usize("GLIMPSE_SYNTH_SUBJECTS", 6),
            synth_seed: env_u64("GLIMPSE_SYNTH_SEED", 7),
            synth_drop_every: env_u64("GLIMPSE_SYNTH_DROP_EVERY", 0),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
