//! Client-side checks for new moveout lists.

use std::fmt;

use crate::models::DraftLine;

/// A single reason a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NoItems,
    BelowMinimum {
        item_name: String,
    },
    ExceedsStock {
        item_name: String,
        requested: u32,
        available: u32,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItems => f.write_str("Add items"),
            Self::BelowMinimum { item_name } => {
                write!(f, "{item_name}: quantity must be at least 1")
            }
            Self::ExceedsStock {
                item_name,
                requested,
                available,
            } => write!(
                f,
                "{item_name}: requested {requested} but only {available} in stock"
            ),
        }
    }
}

/// Every issue found in a draft, in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        f.write_str(&lines.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check every line is within `[1, current_quantity]`.
///
/// All lines are checked so the caller can show an itemized message.
pub fn validate_lines(lines: &[DraftLine]) -> Result<(), ValidationErrors> {
    if lines.is_empty() {
        return Err(ValidationErrors {
            issues: vec![ValidationIssue::NoItems],
        });
    }

    let issues = lines
        .iter()
        .filter(|line| !line.is_within_stock())
        .map(|line| {
            if line.requesting_quantity < 1 {
                ValidationIssue::BelowMinimum {
                    item_name: line.item_name.clone(),
                }
            } else {
                ValidationIssue::ExceedsStock {
                    item_name: line.item_name.clone(),
                    requested: line.requesting_quantity,
                    available: line.current_quantity,
                }
            }
        })
        .collect::<Vec<_>>();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { issues })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_draft_is_rejected() {
        let error = validate_lines(&[]).unwrap_err();
        assert_eq!(error.issues(), &[ValidationIssue::NoItems]);
        assert_eq!(error.to_string(), "Add items");
    }

    #[test]
    fn bounds_are_inclusive() {
        let lines = vec![
            DraftLine::new("i1", "Milk", 5, 1),
            DraftLine::new("i2", "Eggs", 5, 5),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn every_bad_line_is_reported() {
        let lines = vec![
            DraftLine::new("i1", "Milk", 5, 0),
            DraftLine::new("i2", "Eggs", 5, 3),
            DraftLine::new("i3", "Flour", 2, 3),
        ];
        let error = validate_lines(&lines).unwrap_err();

        assert_eq!(
            error.issues(),
            &[
                ValidationIssue::BelowMinimum {
                    item_name: "Milk".to_string()
                },
                ValidationIssue::ExceedsStock {
                    item_name: "Flour".to_string(),
                    requested: 3,
                    available: 2,
                },
            ]
        );
        assert_eq!(
            error.to_string(),
            "Milk: quantity must be at least 1; Flour: requested 3 but only 2 in stock"
        );
    }
}
