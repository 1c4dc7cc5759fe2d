use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A budget that is either bounded or explicitly unbounded.
///
/// On the wire this is a plain integer where `0` means unbounded, matching
/// the config files hosts already ship. In code the two cases are distinct
/// variants so "unlimited" can never be reinterpreted as "a budget of zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unbounded,
    AtMost(u32),
}

impl Limit {
    /// Map the wire representation to a `Limit`. Zero means unbounded.
    pub fn from_raw(raw: u32) -> Limit {
        if raw == 0 {
            Limit::Unbounded
        } else {
            Limit::AtMost(raw)
        }
    }

    /// The wire representation: zero for unbounded.
    pub fn raw(self) -> u32 {
        match self {
            Limit::Unbounded => 0,
            Limit::AtMost(n) => n,
        }
    }

    pub fn is_bounded(self) -> bool {
        matches!(self, Limit::AtMost(_))
    }

    /// The bound, if any.
    pub fn bound(self) -> Option<u32> {
        match self {
            Limit::Unbounded => None,
            Limit::AtMost(n) => Some(n),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Limit::from_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unbounded() {
        assert_eq!(Limit::from_raw(0), Limit::Unbounded);
        assert_eq!(Limit::Unbounded.raw(), 0);
        assert!(!Limit::Unbounded.is_bounded());
        assert_eq!(Limit::Unbounded.bound(), None);
    }

    #[test]
    fn test_nonzero_is_bounded() {
        assert_eq!(Limit::from_raw(50), Limit::AtMost(50));
        assert_eq!(Limit::AtMost(50).raw(), 50);
        assert!(Limit::AtMost(1).is_bounded());
        assert_eq!(Limit::AtMost(7).bound(), Some(7));
    }

    #[test]
    fn test_wire_roundtrip() {
        for raw in [0u32, 1, 42, 480] {
            let limit = Limit::from_raw(raw);
            let json = serde_json::to_string(&limit).unwrap();
            assert_eq!(json, raw.to_string());
            let back: Limit = serde_json::from_str(&json).unwrap();
            assert_eq!(back, limit);
        }
    }
}
