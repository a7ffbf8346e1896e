use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};

/// Short multi-key sequences such as `gg` or `12G`. Keys older than the
/// timeout are dropped on the next push.
#[derive(Debug)]
pub struct KeySeq {
    keys: Vec<KeyEvent>,
    last_key_time: Instant,
    timeout: Duration,
}

impl Default for KeySeq {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySeq {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(1))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            keys: Vec::new(),
            last_key_time: Instant::now(),
            timeout,
        }
    }

    pub fn push(&mut self, key: KeyEvent) {
        self.check_timeout();
        self.keys.push(key);
        self.last_key_time = Instant::now();
    }

    pub fn matches(&self, pattern: &[KeyCode]) -> bool {
        if self.is_expired() || self.keys.len() != pattern.len() {
            return false;
        }

        self.keys
            .iter()
            .zip(pattern.iter())
            .all(|(k, p)| k.code == *p)
    }

    /// Number typed so far when the sequence consists only of digits.
    /// Numbers too large for `usize` saturate to `usize::MAX`.
    pub fn count(&self) -> Option<usize> {
        if self.is_expired() {
            return None;
        }
        self.keys.iter().try_fold(0usize, |count, k| match k.code {
            KeyCode::Char(c) => {
                let digit = c.to_digit(10)? as usize;
                Some(
                    count
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                        .unwrap_or(usize::MAX),
                )
            }
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        if self.is_expired() {
            0
        } else {
            self.keys.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_expired(&self) -> bool {
        self.keys.is_empty() || self.last_key_time.elapsed() > self.timeout
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    fn check_timeout(&mut self) {
        if !self.keys.is_empty() && self.last_key_time.elapsed() > self.timeout {
            self.keys.clear();
        }
    }
}
