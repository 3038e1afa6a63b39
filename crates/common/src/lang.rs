//! Message catalog: blank-line-separated `key=value` blocks, one block
//! per language. Parsed once at startup; the active [`Translation`] is
//! then handed around by reference and never reparsed.

use std::collections::BTreeMap;

/// Block name of the terse test catalog, hidden from operator listings.
const DEBUG_LANGUAGE: &str = "debug";

/// Message templates for one language. Fields keep the catalog's
/// `$token` placeholders unexpanded; substitution happens in the
/// composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub language: String,
    pub subject: String,
    pub power_restored: String,
    pub just_lost: String,
    pub just_returned: String,
    pub still_lost: String,
    pub all_present: String,
    pub last_seen: String,
    pub back: String,
    pub not_seen_since_restart: String,
    pub peer_singular: String,
    pub peer_plural: String,
    pub phase_description: String,
}

impl Translation {
    fn set(&mut self, key: &str, value: &str) {
        let value = value.to_string();
        match key {
            "language" => self.language = value,
            "subject" => self.subject = value,
            "powerRestored" => self.power_restored = value,
            "justLostContactWith" => self.just_lost = value,
            "justRegainedContactWith" => self.just_returned = value,
            "stillNoContactWith" => self.still_lost = value,
            "nowHasContactWithAll" => self.all_present = value,
            "lastSeen" => self.last_seen = value,
            "back" => self.back = value,
            "notSeenSinceRestart" => self.not_seen_since_restart = value,
            "peerSingular" => self.peer_singular = value,
            "peerPlural" => self.peer_plural = value,
            "phaseDescription" => self.phase_description = value,
            // Unknown keys are tolerated so catalogs can grow.
            _ => {}
        }
    }

    /// Singular or plural peer noun for `count`. A language without a
    /// plural form uses the singular for both.
    pub fn peer_noun(&self, count: usize) -> &str {
        if count == 1 || self.peer_plural.is_empty() {
            &self.peer_singular
        } else {
            &self.peer_plural
        }
    }
}

/// All parsed translations, keyed by language name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    map: BTreeMap<String, Translation>,
}

impl Catalog {
    /// Parse a catalog text. Lines starting with `#` are comments; a
    /// blank line closes the current block; blocks without a `language`
    /// line are dropped.
    pub fn parse(text: &str) -> Catalog {
        let mut map = BTreeMap::new();
        let mut current = Translation::default();

        let mut flush = |t: &mut Translation| {
            if !t.language.is_empty() {
                map.insert(t.language.clone(), std::mem::take(t));
            } else {
                *t = Translation::default();
            }
        };

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }
            if trimmed.is_empty() {
                flush(&mut current);
                continue;
            }
            if let Some((key, value)) = trimmed.split_once('=') {
                current.set(key.trim(), value);
            }
        }
        flush(&mut current);

        Catalog { map }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Catalog {
        Self::parse(include_str!("lang.cat"))
    }

    pub fn get(&self, language: &str) -> Option<&Translation> {
        self.map.get(language)
    }

    /// Language names for the operator listing. The debug block stays
    /// hidden.
    pub fn visible_languages(&self) -> Vec<&str> {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|l| *l != DEBUG_LANGUAGE)
            .collect()
    }
}
