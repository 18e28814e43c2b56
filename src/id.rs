//! Account identifier generation.
//!
//! An id is the creation time in milliseconds, base36-encoded, followed by
//! six random base36 characters. The time part never goes backwards for a
//! given generator; when the clock has not advanced (or has stepped back)
//! the previous value plus one is used instead.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 6;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { last_millis: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let millis = if now > self.last_millis {
            now
        } else {
            self.last_millis.saturating_add(1)
        };
        self.last_millis = millis;

        let mut id = to_base36(millis);
        let mut rng = rand::thread_rng();
        id.extend((0..RANDOM_LEN).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])));
        id
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}
