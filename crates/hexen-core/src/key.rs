//! Key tokens and the key sequence resolver.
//!
//! The input driver reports each keystroke as a [`Key`]: a printable
//! character (`"j"`, `"$"`) or a named key (`"up"`, `"c-a"`, `"escape"`).
//! A [`KeyManager`] accumulates keys until they spell out one of its
//! registered bindings, optionally preceded by a repeat count.
//!
//! # Resolution
//!
//! After each [`press`](KeyManager::press) the pending keys are matched as a
//! whole, then with the oldest key dropped, then the two oldest, and so on.
//! For each of these suffixes, bindings are tried in registration order:
//!
//! | Binding vs. suffix       | Outcome                                   |
//! |--------------------------|-------------------------------------------|
//! | suffix is a prefix of it | [`Press::Pending`]: wait for more keys    |
//! | suffix equals it         | [`Press::Resolved`]: clear, emit command  |
//! | neither                  | try the next binding / shorter suffix     |
//!
//! The first binding that is pending or exact wins, so a binding that is a
//! prefix of another must be registered *after* it to stay reachable.
//! When nothing matches the pending keys are dropped ([`Press::Discarded`]).
//!
//! # Counts
//!
//! In a counting manager, a leading run of digit keys is a repeat count.
//! `0` only counts after another digit: on its own it is an ordinary key
//! (conventionally "start of row"), so `10j` is a count of 10 but `0` is not.

use std::borrow::Cow;
use std::fmt;

use tracing::trace;

use crate::command::Command;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// One keystroke, compared by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// A key with a name known at compile time.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The key's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digit value if this key is a single ASCII digit.
    fn digit(&self) -> Option<u8> {
        match self.0.as_bytes() {
            [b @ b'0'..=b'9'] => Some(b - b'0'),
            _ => None,
        }
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Resolution results
// ---------------------------------------------------------------------------

/// A command together with the count typed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub command: Command,
    /// Zero when no count was typed (or the manager doesn't count).
    pub count: u64,
}

impl Resolved {
    /// A resolution with no count.
    #[must_use]
    pub const fn new(command: Command) -> Self {
        Self { command, count: 0 }
    }

    /// The count, treating "no count" as 1.
    #[inline]
    #[must_use]
    pub const fn count_or_one(self) -> u64 {
        if self.count == 0 { 1 } else { self.count }
    }
}

/// What a single key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// The pending keys are a prefix of some binding. Nothing to do yet.
    Pending,
    /// A binding matched.
    Resolved(Resolved),
    /// No binding can match; the pending keys were dropped.
    Discarded,
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Exact,
    Pending,
    None,
}

#[derive(Debug, Clone)]
struct Binding {
    keys: Vec<Key>,
    command: Command,
}

impl Binding {
    fn compare(&self, typed: &[Key]) -> Match {
        if self.keys.len() < typed.len() {
            return Match::None;
        }
        for (i, key) in self.keys.iter().enumerate() {
            match typed.get(i) {
                None => return Match::Pending,
                Some(k) if k != key => return Match::None,
                Some(_) => {}
            }
        }
        Match::Exact
    }
}

/// Split a leading repeat count off `keys`.
///
/// Returns the parsed count (0 if none) and the keys after it. Counts
/// saturate rather than overflow.
fn split_count(keys: &[Key]) -> (u64, &[Key]) {
    let mut count: u64 = 0;
    let mut len = 0;
    for (i, key) in keys.iter().enumerate() {
        match key.digit() {
            Some(d) if d != 0 || i > 0 => {
                count = count.saturating_mul(10).saturating_add(u64::from(d));
                len += 1;
            }
            _ => break,
        }
    }
    (count, &keys[len..])
}

// ---------------------------------------------------------------------------
// KeyManager
// ---------------------------------------------------------------------------

/// Resolves key presses against an ordered list of bindings.
///
/// One manager serves one mode. It holds the keys typed since the last
/// resolution; chords never time out.
#[derive(Debug, Clone, Default)]
pub struct KeyManager {
    pending: Vec<Key>,
    bindings: Vec<Binding>,
    count: bool,
}

impl KeyManager {
    /// Create an empty manager. With `count`, leading digits are parsed as a
    /// repeat count instead of being matched literally.
    #[must_use]
    pub const fn new(count: bool) -> Self {
        Self {
            pending: Vec::new(),
            bindings: Vec::new(),
            count,
        }
    }

    /// Bind a key sequence to a command. Empty sequences are ignored.
    pub fn register(&mut self, command: Command, keys: &[&'static str]) {
        if keys.is_empty() {
            return;
        }
        self.bindings.push(Binding {
            keys: keys.iter().copied().map(Key::from_static).collect(),
            command,
        });
    }

    /// Whether this manager parses repeat counts.
    #[inline]
    #[must_use]
    pub const fn counts(&self) -> bool {
        self.count
    }

    /// Keys typed since the last resolution.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &[Key] {
        &self.pending
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop any half-typed sequence.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Feed one key press.
    pub fn press(&mut self, key: Key) -> Press {
        self.pending.push(key);
        let (outcome, start) = self.resolve();
        match outcome {
            Press::Pending => {
                // Keys before the pending suffix are contradicted by every
                // binding and stay contradicted whatever comes next.
                self.pending.drain(..start);
                trace!(pending = self.pending.len(), "key sequence pending");
            }
            Press::Resolved(resolved) => {
                trace!(command = ?resolved.command, count = resolved.count, "key sequence resolved");
                self.pending.clear();
            }
            Press::Discarded => {
                trace!(dropped = self.pending.len(), "key sequence discarded");
                self.pending.clear();
            }
        }
        outcome
    }

    /// Match the pending keys, returning the outcome and the index of the
    /// suffix that produced it.
    fn resolve(&self) -> (Press, usize) {
        for start in 0..self.pending.len() {
            let suffix = &self.pending[start..];
            let (count, keys) = if self.count {
                split_count(suffix)
            } else {
                (0, suffix)
            };
            for binding in &self.bindings {
                match binding.compare(keys) {
                    Match::Pending => return (Press::Pending, start),
                    Match::Exact => {
                        let resolved = Resolved {
                            command: binding.command,
                            count,
                        };
                        return (Press::Resolved(resolved), start);
                    }
                    Match::None => {}
                }
            }
        }
        (Press::Discarded, self.pending.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
