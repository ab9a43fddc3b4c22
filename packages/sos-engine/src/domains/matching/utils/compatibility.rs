//! Red-cell donation compatibility.
//!
//! The relation is kept as an explicit adjacency list (donor type -> recipient
//! types it may serve) covering all eight canonical types. Every function here
//! is pure and total; unknown labels are never compatible.

use crate::domains::donor::BloodType;

use BloodType::*;

/// Donor type -> recipient types, one row per canonical type.
pub const COMPATIBILITY: [(BloodType, &[BloodType]); 8] = [
    (ONeg, &[ONeg, OPos, ANeg, APos, BNeg, BPos, AbNeg, AbPos]),
    (OPos, &[OPos, APos, BPos, AbPos]),
    (ANeg, &[ANeg, APos, AbNeg, AbPos]),
    (APos, &[APos, AbPos]),
    (BNeg, &[BNeg, BPos, AbNeg, AbPos]),
    (BPos, &[BPos, AbPos]),
    (AbNeg, &[AbNeg, AbPos]),
    (AbPos, &[AbPos]),
];

/// Recipient types a donor of `donor` may give to.
pub fn recipients_of(donor: BloodType) -> &'static [BloodType] {
    COMPATIBILITY
        .iter()
        .find(|(d, _)| *d == donor)
        .map(|(_, recipients)| *recipients)
        .unwrap_or(&[])
}

/// Whether a donor of type `donor` can serve a request for `recipient`.
pub fn can_serve(donor: BloodType, recipient: BloodType) -> bool {
    recipients_of(donor).contains(&recipient)
}

/// String form of [`can_serve`]; fails closed on unrecognized labels.
pub fn can_serve_labels(donor: &str, recipient: &str) -> bool {
    match (donor.parse::<BloodType>(), recipient.parse::<BloodType>()) {
        (Ok(d), Ok(r)) => can_serve(d, r),
        _ => false,
    }
}

/// Inverse relation: donor types able to serve `recipient`, in canonical order.
pub fn donor_types_for(recipient: BloodType) -> Vec<BloodType> {
    COMPATIBILITY
        .iter()
        .filter(|(_, recipients)| recipients.contains(&recipient))
        .map(|(donor, _)| *donor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::donor::BloodType::*;

    /// Independent oracle: a donor may give when every antigen on its cells
    /// (A, B, RhD) is also present on the recipient's.
    fn antigens(bt: BloodType) -> (bool, bool, bool) {
        match bt {
            ONeg => (false, false, false),
            OPos => (false, false, true),
            ANeg => (true, false, false),
            APos => (true, false, true),
            BNeg => (false, true, false),
            BPos => (false, true, true),
            AbNeg => (true, true, false),
            AbPos => (true, true, true),
        }
    }

    fn oracle(donor: BloodType, recipient: BloodType) -> bool {
        let (da, db, dd) = antigens(donor);
        let (ra, rb, rd) = antigens(recipient);
        (!da || ra) && (!db || rb) && (!dd || rd)
    }

    #[test]
    fn all_64_pairs_match_antigen_rule() {
        let mut checked = 0;
        for donor in BloodType::ALL {
            for recipient in BloodType::ALL {
                assert_eq!(
                    can_serve(donor, recipient),
                    oracle(donor, recipient),
                    "{donor} -> {recipient}"
                );
                assert_eq!(
                    can_serve_labels(donor.label(), recipient.label()),
                    can_serve(donor, recipient)
                );
                checked += 1;
            }
        }
        assert_eq!(checked, 64);
    }

    #[test]
    fn table_has_one_row_per_type() {
        for bt in BloodType::ALL {
            assert_eq!(
                COMPATIBILITY.iter().filter(|(d, _)| *d == bt).count(),
                1,
                "{bt} must appear exactly once"
            );
        }
    }

    #[test]
    fn o_negative_serves_everyone() {
        for recipient in BloodType::ALL {
            assert!(can_serve(ONeg, recipient));
        }
    }

    #[test]
    fn ab_positive_donor_serves_only_ab_positive() {
        assert_eq!(recipients_of(AbPos), &[AbPos]);
    }

    #[test]
    fn a_positive_serves_a_positive_and_ab_positive() {
        assert_eq!(recipients_of(APos), &[APos, AbPos]);
    }

    #[test]
    fn ab_positive_recipient_accepts_every_donor() {
        assert_eq!(donor_types_for(AbPos), BloodType::ALL.to_vec());
        assert_eq!(donor_types_for(ONeg), vec![ONeg]);
        assert_eq!(donor_types_for(OPos), vec![ONeg, OPos]);
    }

    #[test]
    fn unknown_labels_fail_closed() {
        assert!(!can_serve_labels("Z+", "AB+"));
        assert!(!can_serve_labels("O-", "unknown"));
        assert!(!can_serve_labels("", ""));
        assert!(can_serve_labels("o-", "ab+"));
    }
}
