//! Label mapping and user-facing verdict text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Classifier, FeatureVector};

/// Outcome shown to the user and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Label 1 is an approval; every other label is a rejection.
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_approved(self) -> bool {
        self == Self::Approved
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verdict together with the inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub features: FeatureVector,
    pub label: u8,
    pub verdict: Verdict,
}

impl Prediction {
    pub fn headline(&self) -> &'static str {
        match self.verdict {
            Verdict::Approved => "Loan Approved!",
            Verdict::Rejected => "Loan Rejected!",
        }
    }

    pub fn reason(&self) -> String {
        let f = &self.features;
        match self.verdict {
            Verdict::Approved => format!(
                "Reason: Good Credit History ({}) and Sufficient Income ({})",
                f.credit_history,
                format_amount(f.income)
            ),
            Verdict::Rejected => format!(
                "Reason: Low Credit History ({}) or High Loan Amount ({})",
                f.credit_history,
                format_amount(f.loan_amount)
            ),
        }
    }
}

/// Whole amounts print without a decimal point.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Validate the inputs, run the classifier once and map its label.
pub fn predict(model: &dyn Classifier, features: FeatureVector) -> Result<Prediction> {
    features.validate()?;
    let label = model.predict(&features)?;
    let verdict = Verdict::from_label(label);
    tracing::debug!(label, verdict = %verdict, "prediction");
    Ok(Prediction {
        features,
        label,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanError;

    struct Constant(u8);

    impl Classifier for Constant {
        fn predict(&self, _features: &FeatureVector) -> Result<u8> {
            Ok(self.0)
        }

        fn describe(&self) -> String {
            format!("constant({})", self.0)
        }
    }

    #[test]
    fn label_mapping() {
        assert_eq!(Verdict::from_label(1), Verdict::Approved);
        assert_eq!(Verdict::from_label(0), Verdict::Rejected);
        assert_eq!(Verdict::from_label(7), Verdict::Rejected);
        assert_eq!(Verdict::Approved.to_string(), "Approved");
    }

    #[test]
    fn approved_prediction_text() {
        let features = FeatureVector::new(5000.0, 100.0, 1).unwrap();
        let p = predict(&Constant(1), features).unwrap();
        assert_eq!(p.verdict, Verdict::Approved);
        assert_eq!(p.headline(), "Loan Approved!");
        assert_eq!(
            p.reason(),
            "Reason: Good Credit History (1) and Sufficient Income (5000)"
        );
    }

    #[test]
    fn rejected_prediction_text() {
        let features = FeatureVector::new(1200.0, 350.5, 0).unwrap();
        let p = predict(&Constant(0), features).unwrap();
        assert!(!p.verdict.is_approved());
        assert_eq!(
            p.reason(),
            "Reason: Low Credit History (0) or High Loan Amount (350.5)"
        );
    }

    #[test]
    fn invalid_features_never_reach_model() {
        let features = FeatureVector {
            income: -5.0,
            loan_amount: 1.0,
            credit_history: 1,
        };
        let err = predict(&Constant(1), features).unwrap_err();
        assert!(matches!(err, LoanError::InvalidFeature { field: "income", .. }));
    }
}
