// SPDX-License-Identifier: MIT

//! Human name generation for a newly discovered pipeline (spec §4.7).
//!
//! The original Python scanner just used the bare script filename as the
//! pipeline's name (`autodiscovery.py`'s `re.split(r"\.py$", ...)`); this
//! generator instead follows the word-list scheme spelled out explicitly
//! for this implementation: two hyphen-joined words, with a random 0-999
//! suffix appended once three collisions have been seen.

use std::collections::HashSet;

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "dusty", "eager", "faded", "gentle", "hollow", "inky", "jagged",
    "keen", "lively", "muted", "noble", "olive", "plain", "quiet", "rusty", "sturdy", "tidy",
];

const NOUNS: &[&str] = &[
    "river", "pylon", "cedar", "ember", "finch", "grove", "harbor", "inlet", "kiln", "lantern",
    "meadow", "nest", "orbit", "pebble", "quarry", "ridge", "shore", "thicket", "valley", "willow",
];

/// Generate a name not already present in `existing`: two hyphen-joined
/// words drawn from the built-in lists, falling back to a random 0-999
/// suffix after three collisions (spec §4.7).
pub fn generate(existing: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();
    let mut collisions = 0;

    loop {
        let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
        let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
        let candidate = format!("{adjective}-{noun}");

        if !existing.contains(&candidate) {
            return candidate;
        }

        collisions += 1;
        if collisions >= 3 {
            let suffix: u16 = rng.gen_range(0..1000);
            let suffixed = format!("{candidate}-{suffix}");
            if !existing.contains(&suffixed) {
                return suffixed;
            }
        }
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
