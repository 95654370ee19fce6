use std::fmt;

use strum::VariantArray;

use crate::{
    env::{Heading, Light, Percept, Symbol, Waypoint},
    error::Result,
};

/// Canonical identifier of a perceivable driving situation
///
/// Built from a [`Percept`] plus the current [`Waypoint`]. Two observations that agree
/// field by field always produce equal keys, which is what the value store relies on to
/// find previously learned values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    light: Light,
    oncoming: Heading,
    left: Heading,
    right: Heading,
    waypoint: Waypoint,
}

impl StateKey {
    /// Number of distinct keys in the categorical domain
    pub const CARDINALITY: usize = Light::VARIANTS.len() * Heading::VARIANTS.len().pow(4);

    pub const fn light(&self) -> Light {
        self.light
    }

    pub const fn waypoint(&self) -> Waypoint {
        self.waypoint
    }

    /// The percept this key was encoded from
    pub const fn percept(&self) -> Percept {
        Percept {
            light: self.light,
            oncoming: self.oncoming,
            left: self.left,
            right: self.right,
        }
    }

    /// Dense mixed-radix index in `0..StateKey::CARDINALITY`
    pub fn index(&self) -> usize {
        let base = Heading::VARIANTS.len();
        [self.oncoming, self.left, self.right, self.waypoint]
            .into_iter()
            .fold(self.light as usize, |acc, h| acc * base + h as usize)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(light={}, oncoming={}, left={}, right={}, waypoint={})",
            self.light, self.oncoming, self.left, self.right, self.waypoint
        )
    }
}

/// Encode an observation into its state key
pub fn encode(percept: &Percept, waypoint: Waypoint) -> StateKey {
    let &Percept {
        light,
        oncoming,
        left,
        right,
    } = percept;
    StateKey {
        light,
        oncoming,
        left,
        right,
        waypoint,
    }
}

/// Encode an observation given as textual symbols
///
/// **Errors** with [`Error::Domain`](crate::error::Error::Domain) if any symbol is outside its domain
pub fn encode_raw(
    light: &str,
    oncoming: &str,
    left: &str,
    right: &str,
    waypoint: &str,
) -> Result<StateKey> {
    let percept = Percept {
        light: Light::from_symbol(light)?,
        oncoming: Heading::from_symbol(oncoming)?,
        left: Heading::from_symbol(left)?,
        right: Heading::from_symbol(right)?,
    };
    Ok(encode(&percept, Waypoint::from_symbol(waypoint)?))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::error::Error;

    fn all_observations() -> Vec<(Percept, Waypoint)> {
        let mut out = Vec::with_capacity(StateKey::CARDINALITY);
        for light in Light::iter() {
            for oncoming in Heading::iter() {
                for left in Heading::iter() {
                    for right in Heading::iter() {
                        for waypoint in Heading::iter() {
                            let percept = Percept {
                                light,
                                oncoming,
                                left,
                                right,
                            };
                            out.push((percept, waypoint));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn encoding_is_deterministic() {
        for (percept, waypoint) in all_observations() {
            assert_eq!(encode(&percept, waypoint), encode(&percept, waypoint));
            assert_eq!(encode(&percept, waypoint).percept(), percept);
        }
    }

    #[test]
    fn encoding_is_injective() {
        let observations = all_observations();
        assert_eq!(observations.len(), 512);

        let keys: HashSet<_> = observations
            .iter()
            .map(|(p, w)| encode(p, *w))
            .collect();
        assert_eq!(keys.len(), 512, "Every observation has its own key");

        let indices: HashSet<_> = keys.iter().map(StateKey::index).collect();
        assert_eq!(indices.len(), 512);
        assert!(indices.iter().all(|&i| i < StateKey::CARDINALITY));
    }

    #[test]
    fn single_field_changes_key() {
        let base = Percept::clear();
        let key = encode(&base, Heading::Forward);
        let variants = [
            Percept {
                light: Light::Red,
                ..base
            },
            Percept {
                oncoming: Heading::Left,
                ..base
            },
            Percept {
                left: Heading::Forward,
                ..base
            },
            Percept {
                right: Heading::Right,
                ..base
            },
        ];
        for percept in variants {
            assert_ne!(encode(&percept, Heading::Forward), key);
        }
        assert_ne!(encode(&base, Heading::Left), key);
    }

    #[test]
    fn encode_raw_symbols() {
        let key = encode_raw("red", "None", "forward", "none", "left").unwrap();
        let percept = Percept {
            light: Light::Red,
            oncoming: Heading::None,
            left: Heading::Forward,
            right: Heading::None,
        };
        assert_eq!(key, encode(&percept, Heading::Left));
        assert_eq!(
            key.to_string(),
            "(light=red, oncoming=none, left=forward, right=none, waypoint=left)"
        );
    }

    #[test]
    fn encode_raw_rejects_unknown_symbols() {
        let err = encode_raw("green", "none", "none", "none", "backward").unwrap_err();
        assert_eq!(
            err,
            Error::Domain {
                kind: "heading",
                value: String::from("backward")
            }
        );
        assert!(encode_raw("amber", "none", "none", "none", "none").is_err());
    }
}
