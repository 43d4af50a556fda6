//! Heartbeat liveness counter

/// Counts watchdog ticks that passed without a server heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatWatchdog {
    missed: u32,
    threshold: u32,
}

impl HeartbeatWatchdog {
    pub const fn new(threshold: u32) -> Self {
        Self { missed: 0, threshold }
    }

    /// Record one elapsed interval. Returns `true` once the threshold is
    /// reached and the channel should be force-closed.
    pub fn on_tick(&mut self) -> bool {
        self.missed = self.missed.saturating_add(1);
        self.is_expired()
    }

    /// Server heartbeat arrived.
    pub fn on_heartbeat(&mut self) {
        self.missed = 0;
    }

    pub const fn missed(&self) -> u32 {
        self.missed
    }

    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// `threshold` consecutive ticks without a heartbeat.
    pub const fn is_expired(&self) -> bool {
        self.missed >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_on_third_silent_tick() {
        let mut watchdog = HeartbeatWatchdog::new(3);
        assert!(!watchdog.on_tick());
        assert!(!watchdog.on_tick());
        assert!(watchdog.on_tick());
        assert_eq!(watchdog.missed(), 3);
    }

    #[test]
    fn heartbeat_resets_the_count() {
        let mut watchdog = HeartbeatWatchdog::new(3);
        watchdog.on_tick();
        watchdog.on_tick();
        watchdog.on_heartbeat();

        assert_eq!(watchdog.missed(), 0);
        assert!(!watchdog.on_tick());
        assert!(!watchdog.on_tick());
    }
}
