//! JSON summary of a generation run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use kinship_types::{Individual, Relationship};

/// Everything a run produced, printed to stdout as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Seed the run used.
    pub seed: u64,
    /// Date the run was generated for.
    pub reference_date: NaiveDate,
    /// Spawned seed population.
    pub population: Vec<Individual>,
    /// Individuals born during genealogy.
    pub children: Vec<Individual>,
    /// Every directed edge, social and kinship.
    pub relationships: Vec<Relationship>,
    /// Directed edge count per relationship kind.
    pub counts: BTreeMap<String, usize>,
}

impl GenerationReport {
    /// Assemble a report, tallying edges per kind.
    pub fn new(
        seed: u64,
        reference_date: NaiveDate,
        population: Vec<Individual>,
        children: Vec<Individual>,
        relationships: Vec<Relationship>,
    ) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for edge in &relationships {
            let count = counts.entry(edge.kind.to_string()).or_default();
            *count = count.saturating_add(1);
        }
        Self {
            seed,
            reference_date,
            population,
            children,
            relationships,
            counts,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kinship_types::{RelationshipHistory, RelationshipKind, Sex};

    use super::*;

    #[test]
    fn counts_edges_by_kind() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let a = Individual::new("Alder", today, Sex::Male);
        let b = Individual::new("Birch", today, Sex::Female);
        let history = RelationshipHistory::new(today, today);
        let edges = vec![
            Relationship::new(a.id, b.id, RelationshipKind::Spouse, 80, history),
            Relationship::new(b.id, a.id, RelationshipKind::Spouse, 80, history),
            Relationship::new(a.id, b.id, RelationshipKind::Friend, 40, history),
        ];

        let report = GenerationReport::new(1, today, vec![a, b], Vec::new(), edges);

        assert_eq!(report.counts.get("spouse"), Some(&2));
        assert_eq!(report.counts.get("friend"), Some(&1));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reference_date"], "2025-06-01");
        assert_eq!(json["relationships"][0]["kind"], "spouse");
    }
}
