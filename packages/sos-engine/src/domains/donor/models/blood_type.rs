use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight canonical ABO/Rh blood types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::ONeg,
        BloodType::OPos,
        BloodType::ANeg,
        BloodType::APos,
        BloodType::BNeg,
        BloodType::BPos,
        BloodType::AbNeg,
        BloodType::AbPos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BloodType::ONeg => "O-",
            BloodType::OPos => "O+",
            BloodType::ANeg => "A-",
            BloodType::APos => "A+",
            BloodType::BNeg => "B-",
            BloodType::BPos => "B+",
            BloodType::AbNeg => "AB-",
            BloodType::AbPos => "AB+",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized blood type: '{0}'")]
pub struct UnknownBloodType(pub String);

impl FromStr for BloodType {
    type Err = UnknownBloodType;

    /// Accepts "O-", "o -", "AB+", the Unicode minus sign and POS/NEG suffixes
    /// ("A POS", "abneg").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '\u{2212}' { '-' } else { c })
            .collect::<String>()
            .to_ascii_uppercase();

        let (group, rh) = if let Some(g) = normalized.strip_suffix("POS") {
            (g, '+')
        } else if let Some(g) = normalized.strip_suffix("NEG") {
            (g, '-')
        } else if let Some(g) = normalized.strip_suffix('+') {
            (g, '+')
        } else if let Some(g) = normalized.strip_suffix('-') {
            (g, '-')
        } else {
            return Err(UnknownBloodType(s.to_string()));
        };

        match (group, rh) {
            ("O", '-') => Ok(BloodType::ONeg),
            ("O", '+') => Ok(BloodType::OPos),
            ("A", '-') => Ok(BloodType::ANeg),
            ("A", '+') => Ok(BloodType::APos),
            ("B", '-') => Ok(BloodType::BNeg),
            ("B", '+') => Ok(BloodType::BPos),
            ("AB", '-') => Ok(BloodType::AbNeg),
            ("AB", '+') => Ok(BloodType::AbPos),
            _ => Err(UnknownBloodType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roundtrip_through_from_str() {
        for bt in BloodType::ALL {
            assert_eq!(bt.label().parse::<BloodType>(), Ok(bt));
        }
    }

    #[test]
    fn lenient_spellings_parse() {
        assert_eq!(" o- ".parse(), Ok(BloodType::ONeg));
        assert_eq!("O\u{2212}".parse(), Ok(BloodType::ONeg));
        assert_eq!("ab+".parse(), Ok(BloodType::AbPos));
        assert_eq!("A POS".parse(), Ok(BloodType::APos));
        assert_eq!("bneg".parse(), Ok(BloodType::BNeg));
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in ["", "O", "C+", "AB", "ABO+", "+", "A+-"] {
            assert!(raw.parse::<BloodType>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn serde_uses_canonical_labels() {
        let json = serde_json::to_string(&BloodType::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
        let parsed: BloodType = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(parsed, BloodType::OPos);
    }
}
