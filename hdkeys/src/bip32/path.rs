//! Derivation paths such as `m/44'/0'/0'/0/0`
//!
//! Depth 0 is the master key `m`; depth `d` is the index of the `d`-th
//! component. Hardened components are written with an apostrophe and stored
//! with [`FIRST_HARDENED_CHILD`] added.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use super::key::FIRST_HARDENED_CHILD;
use crate::error::{Error, Result};

fn path_regex() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^m(/\d+'?)*$"))
        .as_ref()
        .map_err(|e| Error::UnsupportedOrInvalidPath(e.to_string()))
}

/// A parsed BIP32 derivation path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    indices: Vec<u32>,
}

impl Path {
    /// The path of the master key, `m`
    pub fn master() -> Self {
        Path::default()
    }

    /// Build a path from raw child indices
    pub fn from_indices(indices: Vec<u32>) -> Self {
        Path { indices }
    }

    /// Parse a path string, ignoring any whitespace
    pub fn parse(path: &str) -> Result<Self> {
        let stripped: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        if !path_regex()?.is_match(&stripped) {
            return Err(Error::UnsupportedOrInvalidPath(stripped));
        }

        let indices = stripped
            .split('/')
            .skip(1)
            .map(|component| parse_component(component, &stripped))
            .collect::<Result<Vec<_>>>()?;
        Ok(Path { indices })
    }

    /// Number of derivation steps below `m`
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Child indices from depth 1 down, hardened ones including the offset
    pub fn values_at_depth(&self) -> &[u32] {
        &self.indices
    }

    /// Index at `depth`; the master key at depth 0 has value 0
    pub fn value_at_depth(&self, depth: usize) -> Result<u32> {
        if depth == 0 {
            return Ok(0);
        }
        self.indices
            .get(depth - 1)
            .copied()
            .ok_or_else(|| self.out_of_range(depth))
    }

    /// Copy of this path with the index at `depth` (1-based) replaced
    pub fn replace_value_at_depth(&self, depth: usize, value: u32) -> Result<Self> {
        if depth == 0 || depth > self.indices.len() {
            return Err(self.out_of_range(depth));
        }
        let mut indices = self.indices.clone();
        indices[depth - 1] = value;
        Ok(Path { indices })
    }

    /// Copy of this path extended by one index
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Path { indices }
    }

    /// Every path from `m` down to this one, inclusive
    pub fn prefixes(&self) -> impl Iterator<Item = Path> + '_ {
        (0..=self.indices.len()).map(move |depth| Path::from_indices(self.indices[..depth].to_vec()))
    }

    fn out_of_range(&self, depth: usize) -> Error {
        Error::UnsupportedOrInvalidPath(format!("{} has no depth {}", self, depth))
    }
}

fn parse_component(component: &str, path: &str) -> Result<u32> {
    let (digits, hardened) = match component.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (component, false),
    };

    let value = digits
        .parse::<u32>()
        .ok()
        .filter(|&value| value < FIRST_HARDENED_CHILD)
        .ok_or_else(|| Error::UnsupportedOrInvalidPath(path.to_string()))?;

    Ok(if hardened {
        value + FIRST_HARDENED_CHILD
    } else {
        value
    })
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &index in &self.indices {
            if index >= FIRST_HARDENED_CHILD {
                write!(f, "/{}'", index - FIRST_HARDENED_CHILD)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PathVisitor;

        impl<'de> Visitor<'de> for PathVisitor {
            type Value = Path;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a derivation path like m/44'/0'/0'")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Path, E> {
                Path::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: u32 = FIRST_HARDENED_CHILD;

    #[test]
    fn test_parse_bip44_path() {
        let path = Path::parse("m/44'/0'/0'/0/0").unwrap();
        assert_eq!(path.values_at_depth(), &[44 + H, H, H, 0, 0]);
        assert_eq!(path.depth(), 5);
        assert_eq!(path.to_string(), "m/44'/0'/0'/0/0");
    }

    #[test]
    fn test_parse_master() {
        let path = Path::parse("m").unwrap();
        assert_eq!(path, Path::master());
        assert!(path.values_at_depth().is_empty());
        assert_eq!(path.to_string(), "m");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let path = Path::parse(" m / 84' /0'\t/ 1 ").unwrap();
        assert_eq!(path.values_at_depth(), &[84 + H, H, 1]);
    }

    #[test]
    fn test_hardened_after_normal_is_allowed() {
        let path = Path::parse("m/0/1'/2").unwrap();
        assert_eq!(path.values_at_depth(), &[0, 1 + H, 2]);
    }

    #[test]
    fn test_rejects_out_of_range_components() {
        assert!(Path::parse("m/2147483648").is_err());
        assert!(Path::parse("m/2147483648'").is_err());
        assert!(Path::parse("m/99999999999").is_err());
        assert!(Path::parse("m/2147483647'").is_ok());
    }

    #[test]
    fn test_rejects_bad_syntax() {
        for bad in ["", "M/0", "m/", "m//0", "m/0''", "m/-1", "n/0", "m/0h", "/0"] {
            assert!(
                matches!(Path::parse(bad), Err(Error::UnsupportedOrInvalidPath(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_value_at_depth() {
        let path = Path::parse("m/44'/2'/7").unwrap();
        assert_eq!(path.value_at_depth(0).unwrap(), 0);
        assert_eq!(path.value_at_depth(1).unwrap(), 44 + H);
        assert_eq!(path.value_at_depth(3).unwrap(), 7);
        assert!(path.value_at_depth(4).is_err());
    }

    #[test]
    fn test_replace_value_at_depth() {
        let path = Path::parse("m/44'/0'/0'/0/0").unwrap();

        let next = path.replace_value_at_depth(5, 9).unwrap();
        assert_eq!(next.to_string(), "m/44'/0'/0'/0/9");

        let hardened = path.replace_value_at_depth(2, 17 + H).unwrap();
        assert_eq!(hardened.to_string(), "m/44'/17'/0'/0/0");

        assert!(path.replace_value_at_depth(0, 1).is_err());
        assert!(path.replace_value_at_depth(6, 1).is_err());
        assert_eq!(path.to_string(), "m/44'/0'/0'/0/0");
    }

    #[test]
    fn test_prefixes() {
        let path = Path::parse("m/1'/2").unwrap();
        let prefixes: Vec<String> = path.prefixes().map(|p| p.to_string()).collect();
        assert_eq!(prefixes, vec!["m", "m/1'", "m/1'/2"]);
    }

    #[test]
    fn test_child_and_serde() {
        let path = Path::master().child(H).child(5);
        assert_eq!(path.to_string(), "m/0'/5");

        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"m/0'/5\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<Path>("\"x/1\"").is_err());
    }
}
