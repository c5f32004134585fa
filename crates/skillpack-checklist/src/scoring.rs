//! Weighted deduction scoring
//!
//! Each category starts at 100 and loses a fixed number of points per finding.
//! The overall score is the weight-averaged category score.

use serde::Serialize;
use skillpack_types::{CategoryWeight, Finding};

use crate::ruleset::Penalties;

/// Category used when a rule set declares no categories
pub const IMPLICIT_CATEGORY: &str = "general";
const FULL_SCORE: u32 = 100;

/// Score of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    /// Category ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Share of the overall score
    pub weight: u32,
    /// 0..=100 after deductions
    pub score: u32,
    /// Findings counted against this category
    pub findings: usize,
}

/// Score every category against a set of findings
///
/// Findings whose category is not declared are ignored here; the evaluator
/// reports their rules as unscored. With no declared categories every finding
/// counts against a single implicit category.
#[must_use]
pub fn score_categories(
    findings: &[Finding],
    categories: &[CategoryWeight],
    penalties: &Penalties,
) -> Vec<CategoryScore> {
    if categories.is_empty() {
        return vec![score_one(
            IMPLICIT_CATEGORY,
            IMPLICIT_CATEGORY,
            FULL_SCORE,
            findings.iter(),
            penalties,
        )];
    }

    categories
        .iter()
        .map(|category| {
            score_one(
                &category.id,
                category.display_name(),
                category.weight,
                findings.iter().filter(|f| f.category == category.id),
                penalties,
            )
        })
        .collect()
}

fn score_one<'a>(
    id: &str,
    name: &str,
    weight: u32,
    findings: impl Iterator<Item = &'a Finding>,
    penalties: &Penalties,
) -> CategoryScore {
    let (count, deducted) = findings.fold((0usize, 0u32), |(count, total), f| {
        (count + 1, total.saturating_add(penalties.for_severity(f.severity)))
    });

    CategoryScore {
        id: id.to_string(),
        name: name.to_string(),
        weight,
        score: FULL_SCORE.saturating_sub(deducted),
        findings: count,
    }
}

/// Weight-averaged score rounded to one decimal; 100 when no weight is declared
#[must_use]
pub fn overall_score(categories: &[CategoryScore]) -> f64 {
    let total_weight: u32 = categories.iter().map(|c| c.weight).sum();
    if total_weight == 0 {
        return f64::from(FULL_SCORE);
    }

    let weighted: f64 = categories
        .iter()
        .map(|c| f64::from(c.score) * f64::from(c.weight))
        .sum();

    (weighted / f64::from(total_weight) * 10.0).round() / 10.0
}

/// Letter grade for an overall score
#[must_use]
pub fn grade(score: f64) -> char {
    match score {
        s if s >= 90.0 => 'A',
        s if s >= 80.0 => 'B',
        s if s >= 70.0 => 'C',
        s if s >= 60.0 => 'D',
        _ => 'F',
    }
}
