//! Selection of GWAS associations below a p-value threshold.

use crate::config::validate_threshold;
use crate::error::PrsResult;
use crate::{GwasAssociation, SignificantAssociation};
use tracing::{info, warn};

/// Keeps every association with `p_value < threshold`, in input order.
///
/// Rows sharing a position are all kept. A NaN p-value never passes.
pub fn significant_associations(
    gwas: &[GwasAssociation],
    threshold: f64,
) -> PrsResult<Vec<SignificantAssociation>> {
    let threshold = validate_threshold(threshold)?;
    let significant: Vec<SignificantAssociation> = gwas
        .iter()
        .filter(|association| association.p_value < threshold)
        .map(SignificantAssociation::from)
        .collect();

    info!(
        significant = significant.len(),
        tested = gwas.len(),
        threshold,
        "filtered GWAS associations"
    );
    if significant.is_empty() && !gwas.is_empty() {
        warn!(threshold, "no association passed the p-value threshold");
    }
    Ok(significant)
}
