//! Effect allele dosage from a diploid genotype call.

/// Which effect alleles are accepted when counting dosage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllelePolicy {
    /// Only the four nucleotides `A`, `C`, `G` and `T`.
    Nucleotide,
    /// Any single character.
    AnyChar,
}

impl Default for AllelePolicy {
    fn default() -> Self {
        AllelePolicy::Nucleotide
    }
}

impl AllelePolicy {
    /// Returns the uppercased allele character if the policy accepts it
    pub fn allele(&self, effect_allele: &str) -> Option<char> {
        let mut chars = effect_allele.chars().flat_map(char::to_uppercase);
        let allele = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match self {
            AllelePolicy::Nucleotide => match allele {
                'A' | 'C' | 'G' | 'T' => Some(allele),
                _ => None,
            },
            AllelePolicy::AnyChar => Some(allele),
        }
    }
}

pub type Dosage = u8;

/// Counts the copies of `effect_allele` in `genotype`.
///
/// Both sides are compared uppercased. Returns `None` when the genotype is
/// not exactly two characters or the policy rejects the effect allele.
pub fn dosage(genotype: &str, effect_allele: &str, policy: AllelePolicy) -> Option<Dosage> {
    let allele = policy.allele(effect_allele)?;
    let genotype: Vec<char> = genotype.chars().flat_map(char::to_uppercase).collect();
    if genotype.len() != 2 {
        return None;
    }
    Some(genotype.iter().filter(|c| **c == allele).count() as Dosage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dosage_counts_copies() {
        let policy = AllelePolicy::Nucleotide;
        assert_eq!(dosage("GC", "C", policy), Some(1));
        assert_eq!(dosage("AA", "A", policy), Some(2));
        assert_eq!(dosage("GG", "A", policy), Some(0));
    }

    #[test]
    fn test_dosage_ignores_case() {
        let policy = AllelePolicy::Nucleotide;
        assert_eq!(dosage("gc", "c", policy), Some(1));
        assert_eq!(dosage("Gc", "C", policy), dosage("GC", "c", policy));
    }

    #[test]
    fn test_dosage_requires_two_characters() {
        let policy = AllelePolicy::AnyChar;
        assert_eq!(dosage("AAB", "A", policy), None);
        assert_eq!(dosage("A", "A", policy), None);
        assert_eq!(dosage("", "A", policy), None);
    }

    #[test]
    fn test_no_call_has_zero_dosage() {
        assert_eq!(dosage("--", "A", AllelePolicy::Nucleotide), Some(0));
    }

    #[test]
    fn test_nucleotide_policy_rejects_other_alleles() {
        assert_eq!(dosage("II", "I", AllelePolicy::Nucleotide), None);
        assert_eq!(dosage("AT", "AT", AllelePolicy::Nucleotide), None);
        assert_eq!(dosage("AA", "", AllelePolicy::Nucleotide), None);
        assert_eq!(dosage("AA", "N", AllelePolicy::Nucleotide), None);
    }

    #[test]
    fn test_any_char_policy_accepts_single_characters() {
        assert_eq!(dosage("DI", "i", AllelePolicy::AnyChar), Some(1));
        assert_eq!(dosage("AT", "AT", AllelePolicy::AnyChar), None);
    }
}
