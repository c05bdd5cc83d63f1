// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-iteration keyboard snapshot handed to the game module.

use std::fmt;

/// Maximum number of key events carried by a single [`Input`] snapshot.
pub const MAX_KEYS: usize = 128;

/// A single key event as seen by the game module.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Key {
    /// The character code of the key.
    pub character: i32,
    /// How many times the key changed state during the iteration.
    pub transitions: i32,
    /// Whether the key was down at the end of the iteration.
    pub ended_down: bool,
}

impl Key {
    /// A key that went down once during the iteration.
    pub fn pressed(character: char) -> Self {
        Self {
            character: character as i32,
            transitions: 1,
            ended_down: true,
        }
    }

    /// A key that went up once during the iteration.
    pub fn released(character: char) -> Self {
        Self {
            character: character as i32,
            transitions: 1,
            ended_down: false,
        }
    }

    /// The character code as a `char`, if it is a valid scalar value.
    pub fn as_char(&self) -> Option<char> {
        u32::try_from(self.character).ok().and_then(char::from_u32)
    }
}

/// A bounded list of key events, at most [`MAX_KEYS`] long.
#[repr(C)]
#[derive(Clone)]
pub struct Input {
    used: u32,
    keys: [Key; MAX_KEYS],
}

impl Input {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self {
            used: 0,
            keys: [Key::default(); MAX_KEYS],
        }
    }

    /// Appends `key`. Returns `false` and drops the event if the snapshot is full.
    pub fn push(&mut self, key: Key) -> bool {
        if self.is_full() {
            return false;
        }
        self.keys[self.used as usize] = key;
        self.used += 1;
        true
    }

    /// Forgets every event.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    /// The recorded events, oldest first.
    pub fn keys(&self) -> &[Key] {
        &self.keys[..self.used as usize]
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.used as usize
    }

    /// Whether no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Whether the snapshot holds [`MAX_KEYS`] events.
    pub fn is_full(&self) -> bool {
        self.used as usize >= MAX_KEYS
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_bounded() {
        let mut input = Input::new();
        for _ in 0..MAX_KEYS {
            assert!(input.push(Key::pressed('a')));
        }
        assert!(input.is_full());
        assert!(!input.push(Key::pressed('b')));
        assert_eq!(input.len(), MAX_KEYS);
        assert!(input.keys().iter().all(|k| k.as_char() == Some('a')));
    }

    #[test]
    fn clear_empties_the_snapshot() {
        let mut input = Input::new();
        input.push(Key::pressed('w'));
        input.push(Key::released('w'));
        assert_eq!(input.keys()[1], Key::released('w'));

        input.clear();
        assert!(input.is_empty());
        assert!(input.keys().is_empty());
    }

    #[test]
    fn negative_character_is_not_a_char() {
        let key = Key {
            character: -1,
            ..Key::default()
        };
        assert_eq!(key.as_char(), None);
    }
}
