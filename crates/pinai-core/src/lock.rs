//! PIN gate shown before any panel
//!
//! This is a fixed, client-side affordance, not authentication.

use std::time::{Duration, Instant};

pub const UNLOCK_CODE: &str = "1234";
pub const PIN_LENGTH: usize = 4;
pub const ERROR_DISPLAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SessionLock {
    locked: bool,
    entered: String,
    /// Set when a wrong PIN was entered; digits are cleared once it passes
    error_until: Option<Instant>,
}

impl Default for SessionLock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLock {
    pub fn new() -> Self {
        Self {
            locked: true,
            entered: String::new(),
            error_until: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_error(&self) -> bool {
        self.error_until.is_some()
    }

    pub fn entered_len(&self) -> usize {
        self.entered.len()
    }

    /// Enter one digit. Returns true when this press unlocked the session.
    pub fn press(&mut self, digit: char, now: Instant) -> bool {
        if !self.locked || !digit.is_ascii_digit() || self.entered.len() >= PIN_LENGTH {
            return false;
        }
        self.entered.push(digit);
        if self.entered.len() < PIN_LENGTH {
            return false;
        }

        if self.entered == UNLOCK_CODE {
            self.locked = false;
            self.entered.clear();
            tracing::info!("session unlocked");
            true
        } else {
            self.error_until = Some(now + ERROR_DISPLAY);
            tracing::debug!("incorrect PIN entered");
            false
        }
    }

    pub fn backspace(&mut self) {
        if self.error_until.is_none() {
            self.entered.pop();
        }
    }

    /// Clear a wrong entry once its error display time has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(until) = self.error_until {
            if now >= until {
                self.error_until = None;
                self.entered.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(lock: &mut SessionLock, pin: &str, now: Instant) -> bool {
        pin.chars().fold(false, |_, d| lock.press(d, now))
    }

    #[test]
    fn test_starts_locked() {
        assert!(SessionLock::new().is_locked());
    }

    #[test]
    fn test_correct_code_unlocks() {
        let mut lock = SessionLock::new();
        assert!(enter(&mut lock, "1234", Instant::now()));
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_partial_entry_never_compares() {
        let mut lock = SessionLock::new();
        enter(&mut lock, "999", Instant::now());
        assert!(lock.is_locked());
        assert!(!lock.has_error());
        assert_eq!(lock.entered_len(), 3);
    }

    #[test]
    fn test_wrong_code_clears_after_delay() {
        let start = Instant::now();
        let mut lock = SessionLock::new();
        assert!(!enter(&mut lock, "0000", start));
        assert!(lock.is_locked());
        assert!(lock.has_error());

        lock.tick(start + Duration::from_millis(100));
        assert!(lock.has_error());
        assert_eq!(lock.entered_len(), 4);

        lock.tick(start + ERROR_DISPLAY);
        assert!(!lock.has_error());
        assert_eq!(lock.entered_len(), 0);
        assert!(lock.is_locked());
    }

    #[test]
    fn test_digits_ignored_while_full() {
        let start = Instant::now();
        let mut lock = SessionLock::new();
        enter(&mut lock, "4321", start);
        assert!(!lock.press('1', start));
        assert_eq!(lock.entered_len(), 4);
    }

    #[test]
    fn test_backspace_and_non_digits() {
        let now = Instant::now();
        let mut lock = SessionLock::new();
        lock.press('1', now);
        lock.press('x', now);
        lock.press('2', now);
        lock.backspace();
        assert_eq!(lock.entered_len(), 1);
        enter(&mut lock, "234", now);
        assert!(!lock.is_locked());
    }
}
