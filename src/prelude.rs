pub use crate::config::{ScoreConfig, ScoreConfigBuilder};
pub use crate::dosage::{dosage, AllelePolicy, Dosage};
pub use crate::error::{PrsError, PrsResult};
pub use crate::filter::significant_associations;
pub use crate::observable::{read_genome, read_gwas, LazyTable};
pub use crate::score::{aggregate, Aggregate};
pub use crate::{
    calculate_prs, GenomeVariant, GwasAssociation, MatchedVariant, Position, PrsReport,
    SignificantAssociation,
};
