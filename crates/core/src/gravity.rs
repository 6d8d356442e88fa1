//! Gravity timer - turns elapsed wall-clock time into session ticks
//!
//! The timer is owned by the driver, not the session. It is armed only while a
//! game is playing and re-armed from zero whenever the drop interval or the
//! game episode changes, so a speed-up or a restart never inherits stale time.

use crate::snapshot::GameSnapshot;
use crate::types::SessionState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GravityTimer {
    /// (episode, interval) the timer was armed for
    armed: Option<(u32, u32)>,
    elapsed_ms: u32,
}

impl GravityTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm, re-arm or cancel according to the latest snapshot
    pub fn sync(&mut self, snapshot: &GameSnapshot) {
        if snapshot.state != SessionState::Playing {
            self.cancel();
            return;
        }

        let key = (snapshot.episode_id, snapshot.drop_interval_ms);
        if self.armed != Some(key) {
            self.armed = Some(key);
            self.elapsed_ms = 0;
        }
    }

    pub fn cancel(&mut self) {
        self.armed = None;
        self.elapsed_ms = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn interval_ms(&self) -> Option<u32> {
        self.armed.map(|(_, interval)| interval)
    }

    /// Account for `elapsed_ms`; returns true when a tick is due
    ///
    /// At most one tick is reported per call. Elapsed time restarts from zero
    /// after a tick, so a long stall does not cause a burst of drops.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        let Some(interval) = self.interval_ms() else {
            return false;
        };

        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms >= interval {
            self.elapsed_ms = 0;
            return true;
        }
        false
    }

    /// Time until the next tick, if armed
    pub fn remaining_ms(&self) -> Option<u32> {
        self.interval_ms()
            .map(|interval| interval.saturating_sub(self.elapsed_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(episode_id: u32, drop_interval_ms: u32) -> GameSnapshot {
        GameSnapshot {
            state: SessionState::Playing,
            episode_id,
            drop_interval_ms,
            ..GameSnapshot::default()
        }
    }

    #[test]
    fn test_idle_timer_never_fires() {
        let mut timer = GravityTimer::new();
        assert!(!timer.is_armed());
        assert!(!timer.advance(10_000));
        assert_eq!(timer.remaining_ms(), None);
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 1000));

        assert!(!timer.advance(400));
        assert_eq!(timer.remaining_ms(), Some(600));
        assert!(!timer.advance(599));
        assert!(timer.advance(1));
        assert_eq!(timer.remaining_ms(), Some(1000));
    }

    #[test]
    fn test_long_stall_yields_one_tick() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 100));
        assert!(timer.advance(5_000));
        assert!(!timer.advance(0));
    }

    #[test]
    fn test_same_key_keeps_elapsed_time() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 1000));
        timer.advance(700);
        timer.sync(&playing(1, 1000));
        assert_eq!(timer.remaining_ms(), Some(300));
    }

    #[test]
    fn test_interval_change_rearms() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 1000));
        timer.advance(700);

        timer.sync(&playing(1, 900));
        assert_eq!(timer.interval_ms(), Some(900));
        assert_eq!(timer.remaining_ms(), Some(900));
    }

    #[test]
    fn test_restart_rearms() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 1000));
        timer.advance(700);

        timer.sync(&playing(2, 1000));
        assert_eq!(timer.remaining_ms(), Some(1000));
    }

    #[test]
    fn test_pause_and_game_over_cancel() {
        let mut timer = GravityTimer::new();
        timer.sync(&playing(1, 1000));
        timer.advance(500);

        let paused = GameSnapshot {
            state: SessionState::Paused,
            paused: true,
            ..playing(1, 1000)
        };
        timer.sync(&paused);
        assert!(!timer.is_armed());

        // Resuming starts a fresh interval
        timer.sync(&playing(1, 1000));
        assert_eq!(timer.remaining_ms(), Some(1000));

        let over = GameSnapshot {
            state: SessionState::GameOver,
            ..playing(1, 1000)
        };
        timer.sync(&over);
        assert!(!timer.advance(5_000));
    }
}
