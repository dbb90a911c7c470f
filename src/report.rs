//! Aggregate QA metrics over a resolved output table.
//!
//! Operators discover data problems through these counts, never through a
//! failed run: a batch always completes and always writes its output.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{ResolutionStage, is_placeholder};

const TOP_REGIONS: usize = 5;

#[derive(Debug, Default)]
pub struct QaReport {
    pub total: usize,
    pub by_stage: BTreeMap<String, usize>,
    pub unresolved: usize,
    pub placeholders: usize,
    pub corrected: usize,
    pub unique_regions: usize,
    pub top_regions: Vec<(String, usize)>,
}

impl QaReport {
    /// Build from `(final_region, resolution_stage, was_corrected)` rows.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, bool)>,
    {
        let mut report = Self::default();
        let mut region_counts: BTreeMap<String, usize> = BTreeMap::new();
        for (region, stage, corrected) in rows {
            report.total += 1;
            *report.by_stage.entry(stage.to_string()).or_default() += 1;
            if stage == ResolutionStage::Unresolved.as_str() {
                report.unresolved += 1;
            }
            if is_placeholder(region) {
                report.placeholders += 1;
            } else {
                *region_counts.entry(region.to_string()).or_default() += 1;
            }
            if corrected {
                report.corrected += 1;
            }
        }
        report.unique_regions = region_counts.len();
        // Top regions by count; BTreeMap order makes ties deterministic.
        let mut counts: Vec<(String, usize)> = region_counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(TOP_REGIONS);
        report.top_regions = counts;
        report
    }
}

impl fmt::Display for QaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QA SUMMARY")?;
        writeln!(f, "------------------------")?;
        writeln!(f, "Total records:        {}", self.total)?;
        writeln!(f, "Unresolved:           {}", self.unresolved)?;
        writeln!(f, "Placeholder regions:  {}", self.placeholders)?;
        writeln!(f, "Corrected by boundary: {}", self.corrected)?;
        writeln!(f, "Unique regions:       {}", self.unique_regions)?;
        writeln!(f, "By stage:")?;
        for (stage, count) in &self.by_stage {
            writeln!(f, "  {stage:<16} {count}")?;
        }
        writeln!(f, "Top regions:")?;
        for (region, count) in &self.top_regions {
            writeln!(f, "  {region}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_stages_placeholders_and_corrections() {
        let rows = vec![
            ("Greater Sydney", "exact", false),
            ("Greater Sydney", "boundary", true),
            ("Regional NSW", "unresolved", false),
            ("Illawarra", "fuzzy", false),
            ("Unknown", "unresolved", false),
        ];
        let report = QaReport::from_rows(rows.iter().map(|(r, s, c)| (*r, *s, *c)));
        assert_eq!(report.total, 5);
        assert_eq!(report.unresolved, 2);
        assert_eq!(report.placeholders, 2);
        assert_eq!(report.corrected, 1);
        assert_eq!(report.unique_regions, 2);
        assert_eq!(report.by_stage["unresolved"], 2);
        assert_eq!(report.top_regions[0], ("Greater Sydney".to_string(), 2));
    }

    #[test]
    fn top_region_ties_break_by_name() {
        let rows =
            vec![("Beta", "exact", false), ("Alpha", "exact", false), ("Gamma", "exact", false)];
        let report = QaReport::from_rows(rows.iter().map(|(r, s, c)| (*r, *s, *c)));
        let names: Vec<&str> = report.top_regions.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    }
}
