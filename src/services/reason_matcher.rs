//! Rejection reason selection
//!
//! Pure: works on the option labels of the reason dropdown only.

use crate::error::PortalError;

const NOT_COMPETITIVE: &str = "not competitive";
const OVERSUBSCRIBED: &str = "oversubscribed";

/// Which rule picked the option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonTier {
    /// Numbered "8." reason mentioning "not competitive"
    Numbered,
    /// "not competitive" together with "oversubscribed"
    Oversubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonChoice {
    pub index: usize,
    pub tier: ReasonTier,
}

/// First label matching the highest tier, or `None`. Never falls back to a default.
pub fn select_reason<S: AsRef<str>>(labels: &[S]) -> Option<ReasonChoice> {
    let numbered = labels.iter().position(|label| {
        let label = label.as_ref().trim();
        (label.starts_with("8.") || label.starts_with("8 "))
            && label.to_lowercase().contains(NOT_COMPETITIVE)
    });
    if let Some(index) = numbered {
        return Some(ReasonChoice {
            index,
            tier: ReasonTier::Numbered,
        });
    }

    labels
        .iter()
        .position(|label| {
            let lower = label.as_ref().to_lowercase();
            lower.contains(NOT_COMPETITIVE) && lower.contains(OVERSUBSCRIBED)
        })
        .map(|index| ReasonChoice {
            index,
            tier: ReasonTier::Oversubscribed,
        })
}

/// [`select_reason`], or the error carrying every option seen
pub fn require_reason(labels: &[String]) -> Result<ReasonChoice, PortalError> {
    select_reason(labels).ok_or_else(|| PortalError::NoReasonOption {
        options: labels.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_reason_wins_over_earlier_oversubscribed() {
        let labels = [
            "Please select",
            "Not competitive - oversubscribed programme",
            "8. Not competitive",
        ];
        assert_eq!(
            select_reason(&labels),
            Some(ReasonChoice {
                index: 2,
                tier: ReasonTier::Numbered
            })
        );
    }

    #[test]
    fn portal_option_lists() {
        let numbered = ["1. A", "8. Not competitive (oversubscribed)", "9. C"];
        assert_eq!(select_reason(&numbered).map(|c| c.index), Some(1));

        let unnumbered = [
            "1. A",
            "8x Something else",
            "Not competitive and oversubscribed applicants",
            "9. C",
        ];
        assert_eq!(
            select_reason(&unnumbered),
            Some(ReasonChoice {
                index: 2,
                tier: ReasonTier::Oversubscribed
            })
        );
    }

    #[test]
    fn numbered_reason_accepts_space_separator_and_case() {
        let labels = ["", "8 NOT COMPETITIVE (academic)"];
        assert_eq!(select_reason(&labels).map(|c| c.index), Some(1));
    }

    #[test]
    fn oversubscribed_is_second_tier() {
        let labels = [
            "Please select",
            "Not competitive",
            "Programme oversubscribed, applicant not competitive",
        ];
        assert_eq!(
            select_reason(&labels),
            Some(ReasonChoice {
                index: 2,
                tier: ReasonTier::Oversubscribed
            })
        );
    }

    #[test]
    fn number_alone_is_not_enough() {
        let labels = ["8. Insufficient English", "80. Not competitive"];
        assert_eq!(select_reason(&labels), None);
    }

    #[test]
    fn missing_reason_lists_all_options() {
        let labels = vec!["Please select".to_string(), "1. Withdrawn".to_string()];
        let err = require_reason(&labels).unwrap_err();
        assert_eq!(
            err,
            PortalError::NoReasonOption {
                options: labels.clone()
            }
        );
        assert!(err.to_string().contains("'1. Withdrawn'"));
    }
}
