use crate::Error;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Bitmask categorising shapes, used to filter broad-phase candidates.
///
/// Individual tags are allocated by a [`TagRegistry`]; combine them with `|`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Tags(pub u64);

impl Tags {
    pub const NONE: Self = Tags(0);

    /// True iff any bit of `mask` is set on self.
    #[inline]
    pub fn has(self, mask: Tags) -> bool {
        self.0 & mask.0 != 0
    }

    #[inline]
    pub fn set(&mut self, mask: Tags) {
        self.0 |= mask.0;
    }

    #[inline]
    pub fn unset(&mut self, mask: Tags) {
        self.0 &= !mask.0;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Tags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Tags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Tags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Allocates named tag bits, at most 64 in total. Intended to be created once at
/// startup and kept by the caller; there is no process-wide registry.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct TagRegistry {
    names: Vec<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next unused bit under `name`.
    pub fn tag(&mut self, name: impl Into<String>) -> Result<Tags, Error> {
        if self.names.len() >= 64 {
            return Err(Error::TagSpaceExhausted);
        }
        let bit = 1u64 << self.names.len();
        self.names.push(name.into());
        Ok(Tags(bit))
    }

    /// Name registered for a single bit, if any.
    pub fn name(&self, tag: Tags) -> Option<&str> {
        if tag.0.count_ones() != 1 {
            return None;
        }
        self.names
            .get(tag.0.trailing_zeros() as usize)
            .map(String::as_str)
    }

    /// Diagnostic rendering of a mask: registered bits print their name,
    /// unregistered ones their numeric value.
    pub fn format(&self, tags: Tags) -> String {
        if tags.is_empty() {
            return "<none>".to_owned();
        }
        let mut parts = vec![];
        for i in 0..64 {
            let bit = 1u64 << i;
            if tags.0 & bit == 0 {
                continue;
            }
            match self.names.get(i as usize) {
                Some(name) => parts.push(name.clone()),
                None => parts.push(bit.to_string()),
            }
        }
        parts.join(" | ")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_has() {
        let mut reg = TagRegistry::new();
        let player = reg.tag("player").unwrap();
        let wall = reg.tag("wall").unwrap();
        let ramp = reg.tag("ramp").unwrap();

        assert_eq!(player.0, 1);
        assert_eq!(wall.0, 2);
        assert_eq!(ramp.0, 4);

        let mut t = Tags::NONE;
        t.set(wall | ramp);
        assert!(t.has(wall));
        assert!(t.has(player | ramp)); // any shared bit
        assert!(!t.has(player));

        t.unset(ramp);
        assert!(!t.has(ramp));
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn test_format() {
        let mut reg = TagRegistry::new();
        let a = reg.tag("solid").unwrap();
        let b = reg.tag("sensor").unwrap();
        assert_eq!(reg.format(a | b), "solid | sensor");
        assert_eq!(reg.format(Tags(1 << 10)), "1024");
        assert_eq!(reg.format(Tags::NONE), "<none>");
        assert_eq!(reg.name(a), Some("solid"));
        assert_eq!(reg.name(a | b), None);
    }

    #[test]
    fn test_exhaustion() {
        let mut reg = TagRegistry::new();
        for i in 0..64 {
            reg.tag(format!("t{i}")).unwrap();
        }
        assert_eq!(reg.tag("overflow"), Err(Error::TagSpaceExhausted));
    }
}
