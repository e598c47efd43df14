#![crate_name = "polygenic"]
use std::fmt;

pub mod prelude;

pub mod bed;
pub mod config;
pub mod dosage;
pub mod error;
pub mod filter;
pub mod observable;
pub mod score;

use crate::config::ScoreConfig;
use crate::dosage::{dosage, AllelePolicy, Dosage};
use crate::error::PrsResult;

/// Genomic coordinate shared by the genome and GWAS tables.
pub type Position = u64;
pub type Beta = f64;

/// A genotyped site in an individual's genome
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeVariant {
    pub position: Position,
    /// Two character allele pair such as `AA` or `GC`
    pub genotype: String,
}

impl GenomeVariant {
    pub fn new(position: Position, genotype: &str) -> Self {
        Self {
            position,
            genotype: genotype.into(),
        }
    }
}

/// A tested variant in a GWAS summary statistics table
#[derive(Debug, Clone, PartialEq)]
pub struct GwasAssociation {
    pub position: Position,
    pub effect_allele: String,
    /// `None` when the study reported no usable effect size.
    pub beta: Option<Beta>,
    pub p_value: f64,
}

impl GwasAssociation {
    pub fn new(position: Position, effect_allele: &str, beta: Option<Beta>, p_value: f64) -> Self {
        Self {
            position,
            effect_allele: effect_allele.into(),
            beta,
            p_value,
        }
    }
}

/// A `GwasAssociation` that passed the p-value filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificantAssociation {
    pub position: Position,
    pub effect_allele: String,
    pub beta: Option<Beta>,
}

impl SignificantAssociation {
    pub fn new(position: Position, effect_allele: &str, beta: Option<Beta>) -> Self {
        Self {
            position,
            effect_allele: effect_allele.into(),
            beta,
        }
    }
}

impl From<&GwasAssociation> for SignificantAssociation {
    fn from(association: &GwasAssociation) -> Self {
        Self {
            position: association.position,
            effect_allele: association.effect_allele.clone(),
            beta: association.beta,
        }
    }
}

/// A genome row joined with a significant association at the same position.
///
/// Only pairs with a defined dosage and a beta that is not NaN can be constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedVariant<'a> {
    pub position: Position,
    pub genotype: &'a str,
    pub effect_allele: &'a str,
    pub beta: Beta,
    pub effect_allele_count: Dosage,
}

impl<'a> MatchedVariant<'a> {
    /// Joins the two rows, or returns `None` if the pair is excluded from the score.
    pub fn new(
        genome: &'a GenomeVariant,
        association: &'a SignificantAssociation,
        policy: AllelePolicy,
    ) -> Option<Self> {
        let beta = association.beta.filter(|beta| !beta.is_nan())?;
        let effect_allele_count = dosage(&genome.genotype, &association.effect_allele, policy)?;
        Some(Self {
            position: genome.position,
            genotype: &genome.genotype,
            effect_allele: &association.effect_allele,
            beta,
            effect_allele_count,
        })
    }

    /// The pair's contribution to the score
    pub fn weighted_dosage(&self) -> f64 {
        f64::from(self.effect_allele_count) * self.beta
    }
}

/// Outcome of a scoring run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrsReport {
    /// Rows passing the p-value filter
    pub significant: usize,
    /// Genome rows whose position is among the significant positions
    pub overlap: usize,
    /// Joined pairs that contributed to the score
    pub matched: usize,
    /// Joined pairs dropped for an undefined dosage or missing beta
    pub excluded: usize,
    pub score: f64,
}

impl fmt::Display for PrsReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Total # Significant SNPs: {}", self.significant)?;
        writeln!(f, "Overlapping SNPs between genome and GWAS: {}", self.overlap)?;
        write!(f, "Polygenic Risk Score: {}", self.score)
    }
}

/// Scores `genome` against the associations of `gwas` below the configured threshold.
///
/// The threshold is validated before any row is touched.
pub fn calculate_prs(
    genome: &[GenomeVariant],
    gwas: &[GwasAssociation],
    config: &ScoreConfig,
) -> PrsResult<PrsReport> {
    let significant = filter::significant_associations(gwas, config.p_threshold())?;
    let aggregate = score::aggregate(genome, &significant, config.allele_policy());
    Ok(PrsReport {
        significant: significant.len(),
        overlap: aggregate.overlap,
        matched: aggregate.matched,
        excluded: aggregate.excluded,
        score: aggregate.score,
    })
}
