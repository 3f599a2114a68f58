//! Per-identifier cooldown gate for the producer loop.

use std::collections::HashMap;

/// Suppresses repeated downstream work for the same identifier within a
/// cooldown window.
///
/// State is in-memory and process-local: constructed once by the producer's
/// top-level context and owned by the loop. A process restart clears it, so
/// every identifier becomes emit-eligible again — an accepted limitation,
/// not a bug. Never shared across processes.
pub struct EmissionThrottle {
    cooldown_secs: f64,
    last_emit: HashMap<String, f64>,
}

impl EmissionThrottle {
    pub fn new(cooldown_secs: f64) -> Self {
        Self {
            cooldown_secs,
            last_emit: HashMap::new(),
        }
    }

    /// Decide whether a sighting of `id` at `now` (unix seconds) should
    /// proceed downstream.
    ///
    /// Returns true and records `now` as the new last-emitted time iff no
    /// prior emission exists for `id` or the cooldown has fully elapsed.
    /// Otherwise returns false and leaves state unchanged.
    pub fn should_emit(&mut self, id: &str, now: f64) -> bool {
        match self.last_emit.get(id) {
            Some(&last) if now - last < self.cooldown_secs => false,
            _ => {
                self.last_emit.insert(id.to_string(), now);
                true
            }
        }
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.last_emit.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_emits() {
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
    }

    #[test]
    fn test_within_cooldown_suppressed() {
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
        assert!(!throttle.should_emit("a", 101.0));
    }

    #[test]
    fn test_after_cooldown_emits_again() {
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
        assert!(throttle.should_emit("a", 104.0));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        // now - last == cooldown is eligible again.
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
        assert!(throttle.should_emit("a", 103.0));
    }

    #[test]
    fn test_suppressed_call_leaves_state_unchanged() {
        // A rejected sighting must not extend the window.
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
        assert!(!throttle.should_emit("a", 102.0));
        // 103 is 3s after the accepted emission at 100, not after 102.
        assert!(throttle.should_emit("a", 103.0));
    }

    #[test]
    fn test_identifiers_independent() {
        let mut throttle = EmissionThrottle::new(3.0);
        assert!(throttle.should_emit("a", 100.0));
        assert!(throttle.should_emit("b", 100.0));
        assert!(!throttle.should_emit("a", 101.0));
        assert!(!throttle.should_emit("b", 101.0));
        assert_eq!(throttle.tracked(), 2);
    }
}
