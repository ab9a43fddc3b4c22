use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domains::donor::BloodType;
use crate::error::SosError;

/// How urgent a request is. Widens the notified pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(SosError::InvalidRequest(format!(
                "unknown urgency '{}' (expected normal, high or critical)",
                other
            ))),
        }
    }
}

/// Raw SOS input as received from the intake layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SosRequest {
    #[serde(default)]
    pub blood_type: Option<String>,
    pub units_needed: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

/// A validated blood request. `units_needed` is always at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub blood_type: BloodType,
    pub units_needed: u32,
    pub city: Option<String>,
    pub urgency: Urgency,
}

impl BloodRequest {
    pub fn new(blood_type: BloodType, units_needed: u32) -> Result<Self, SosError> {
        if units_needed == 0 {
            return Err(SosError::InvalidRequest(
                "units needed must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            blood_type,
            units_needed,
            city: None,
            urgency: Urgency::Normal,
        })
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        let city = city.into();
        self.city = if city.trim().is_empty() {
            None
        } else {
            Some(city.trim().to_string())
        };
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }
}

impl TryFrom<SosRequest> for BloodRequest {
    type Error = SosError;

    fn try_from(raw: SosRequest) -> Result<Self, Self::Error> {
        let label = raw
            .blood_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SosError::InvalidRequest("blood type is required".to_string()))?;

        let blood_type = label
            .parse::<BloodType>()
            .map_err(|e| SosError::InvalidRequest(e.to_string()))?;

        if raw.units_needed < 1 {
            return Err(SosError::InvalidRequest(format!(
                "units needed must be at least 1, got {}",
                raw.units_needed
            )));
        }
        let units_needed = u32::try_from(raw.units_needed).map_err(|_| {
            SosError::InvalidRequest(format!("units needed is too large: {}", raw.units_needed))
        })?;

        let urgency = match raw.urgency.as_deref().map(str::trim) {
            None | Some("") => Urgency::Normal,
            Some(label) => label.parse()?,
        };

        let mut request = BloodRequest::new(blood_type, units_needed)?.with_urgency(urgency);
        if let Some(city) = raw.city {
            request = request.with_city(city);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(blood_type: Option<&str>, units: i64) -> SosRequest {
        SosRequest {
            blood_type: blood_type.map(str::to_string),
            units_needed: units,
            city: None,
            urgency: None,
        }
    }

    #[test]
    fn valid_request_defaults_to_normal_urgency() {
        let req = BloodRequest::try_from(raw(Some("O+"), 2)).unwrap();
        assert_eq!(req.blood_type, BloodType::OPos);
        assert_eq!(req.units_needed, 2);
        assert_eq!(req.urgency, Urgency::Normal);
        assert_eq!(req.city, None);
    }

    #[test]
    fn missing_blood_type_is_invalid() {
        assert!(matches!(
            BloodRequest::try_from(raw(None, 1)),
            Err(SosError::InvalidRequest(_))
        ));
        assert!(matches!(
            BloodRequest::try_from(raw(Some("  "), 1)),
            Err(SosError::InvalidRequest(_))
        ));
        assert!(matches!(
            BloodRequest::try_from(raw(Some("Q+"), 1)),
            Err(SosError::InvalidRequest(_))
        ));
    }

    #[test]
    fn non_positive_units_are_invalid() {
        for units in [0, -3] {
            assert!(matches!(
                BloodRequest::try_from(raw(Some("A-"), units)),
                Err(SosError::InvalidRequest(_))
            ));
        }
        assert!(BloodRequest::new(BloodType::ANeg, 0).is_err());
    }

    #[test]
    fn urgency_and_city_are_normalized() {
        let mut input = raw(Some("b-"), 1);
        input.urgency = Some(" Critical ".to_string());
        input.city = Some("  ".to_string());
        let req = BloodRequest::try_from(input).unwrap();
        assert_eq!(req.urgency, Urgency::Critical);
        assert_eq!(req.city, None);

        let mut input = raw(Some("b-"), 1);
        input.urgency = Some("asap".to_string());
        assert!(matches!(
            BloodRequest::try_from(input),
            Err(SosError::InvalidRequest(_))
        ));
    }
}
