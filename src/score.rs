//! Position join of a genome against significant associations and the weighted dosage sum.

use crate::dosage::AllelePolicy;
use crate::{GenomeVariant, MatchedVariant, Position, SignificantAssociation};
use ndarray::Array1;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Rows that can be joined on their genomic coordinate.
pub trait Positioned {
    fn position(&self) -> Position;
}

impl Positioned for GenomeVariant {
    fn position(&self) -> Position {
        self.position
    }
}

impl Positioned for SignificantAssociation {
    fn position(&self) -> Position {
        self.position
    }
}

/// Rows of one table grouped by position, each group in input order.
pub struct PositionIndex<'a, T> {
    rows: HashMap<Position, Vec<&'a T>>,
}

impl<'a, T: Positioned> PositionIndex<'a, T> {
    pub fn new(table: &'a [T]) -> Self {
        let mut rows: HashMap<Position, Vec<&'a T>> = HashMap::with_capacity(table.len());
        for row in table {
            rows.entry(row.position()).or_insert_with(Vec::new).push(row);
        }
        Self { rows }
    }

    /// Every row at `position`, empty if there is none.
    pub fn get(&self, position: Position) -> &[&'a T] {
        self.rows.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Inner equality join on position.
///
/// Duplicate positions on either side yield every combination. The index
/// is built on the smaller table and the larger one is probed in input
/// order, so the pair order is fixed for a given input.
pub fn join<'a>(
    genome: &'a [GenomeVariant],
    significant: &'a [SignificantAssociation],
) -> Vec<(&'a GenomeVariant, &'a SignificantAssociation)> {
    let mut pairs = vec![];
    if significant.len() <= genome.len() {
        let index = PositionIndex::new(significant);
        for variant in genome {
            for association in index.get(variant.position) {
                pairs.push((variant, *association));
            }
        }
    } else {
        let index = PositionIndex::new(genome);
        for association in significant {
            for variant in index.get(association.position) {
                pairs.push((*variant, association));
            }
        }
    }
    pairs
}

/// Genome rows whose position appears anywhere among the significant positions.
///
/// Each genome row is counted at most once.
pub fn overlap(genome: &[GenomeVariant], significant: &[SignificantAssociation]) -> usize {
    let positions: HashSet<Position> = significant.iter().map(|s| s.position).collect();
    genome
        .iter()
        .filter(|variant| positions.contains(&variant.position))
        .count()
}

/// Joined pairs that carry a defined dosage and beta, in join order.
pub fn matched_variants<'a>(
    genome: &'a [GenomeVariant],
    significant: &'a [SignificantAssociation],
    policy: AllelePolicy,
) -> (Vec<MatchedVariant<'a>>, usize) {
    let pairs = join(genome, significant);
    let n_pairs = pairs.len();
    let matched: Vec<MatchedVariant<'a>> = pairs
        .into_iter()
        .filter_map(|(variant, association)| {
            let matched = MatchedVariant::new(variant, association, policy);
            if matched.is_none() {
                debug!(
                    position = variant.position,
                    genotype = %variant.genotype,
                    effect_allele = %association.effect_allele,
                    "excluded matched pair"
                );
            }
            matched
        })
        .collect();
    let excluded = n_pairs - matched.len();
    (matched, excluded)
}

/// Totals of a single aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub overlap: usize,
    pub matched: usize,
    pub excluded: usize,
    pub score: f64,
}

/// Sums `effect_allele_count * beta` over every usable joined pair.
pub fn aggregate(
    genome: &[GenomeVariant],
    significant: &[SignificantAssociation],
    policy: AllelePolicy,
) -> Aggregate {
    let overlap = overlap(genome, significant);
    info!(overlap, "overlapping SNPs between genome and GWAS");

    let (matched, excluded) = matched_variants(genome, significant, policy);
    let contributions: Array1<f64> = matched.iter().map(MatchedVariant::weighted_dosage).collect();
    let score = contributions.sum();

    info!(matched = matched.len(), excluded, score, "aggregated polygenic risk score");
    Aggregate {
        overlap,
        matched: matched.len(),
        excluded,
        score,
    }
}
