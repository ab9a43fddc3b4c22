use crate::common::SessionId;
use crate::domains::matching::{BloodRequest, Urgency};

/// SMS-sized SOS text shared by every target of a session.
pub fn compose_sos_message(request: &BloodRequest, session_id: SessionId) -> String {
    let headline = match request.urgency {
        Urgency::Critical => "CRITICAL",
        Urgency::High => "URGENT",
        Urgency::Normal => "Blood needed",
    };
    let units = if request.units_needed == 1 {
        "1 unit".to_string()
    } else {
        format!("{} units", request.units_needed)
    };
    let place = request
        .city
        .as_deref()
        .map(|city| format!(" in {}", city))
        .unwrap_or_default();

    format!(
        "{}: {} of {} blood needed{}. If you can donate, reply YES {}.",
        headline,
        units,
        request.blood_type,
        place,
        session_id.short()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::donor::BloodType;
    use uuid::Uuid;

    fn session_id() -> SessionId {
        SessionId::from_uuid(Uuid::from_u128(0x1234abcd_0000_7000_8000_000000000000))
    }

    #[test]
    fn normal_request_without_city() {
        let req = BloodRequest::new(BloodType::OPos, 1).unwrap();
        assert_eq!(
            compose_sos_message(&req, session_id()),
            "Blood needed: 1 unit of O+ blood needed. If you can donate, reply YES 1234abcd."
        );
    }

    #[test]
    fn critical_request_with_city() {
        let req = BloodRequest::new(BloodType::AbNeg, 3)
            .unwrap()
            .with_city("Pune")
            .with_urgency(Urgency::Critical);
        assert_eq!(
            compose_sos_message(&req, session_id()),
            "CRITICAL: 3 units of AB- blood needed in Pune. If you can donate, reply YES 1234abcd."
        );
    }

    #[test]
    fn fits_in_a_single_sms_segment_for_typical_input() {
        let req = BloodRequest::new(BloodType::BNeg, 12)
            .unwrap()
            .with_city("Thiruvananthapuram")
            .with_urgency(Urgency::High);
        assert!(compose_sos_message(&req, session_id()).len() <= 160);
    }
}
