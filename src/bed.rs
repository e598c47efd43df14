//! Conversion of a 23andMe style genotype export into BED rows, ready for liftover.

use crate::error::PrsResult;
use crate::observable::find_column;
use crate::Position;
use std::io::{Read, Write};
use tracing::{debug, info};

const RAW_GENOME_TABLE: &str = "raw genome";

fn strip_chr(chromosome: &str) -> &str {
    let chromosome = chromosome.trim();
    match chromosome.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") && chromosome.len() > 3 => &chromosome[3..],
        _ => chromosome,
    }
}

/// Writes the rows of `chromosome` as `chrN start end genotype`.
///
/// The input needs a header with `chromosome`, `position` and `genotype`
/// columns, lines starting with `#` are skipped. Positions are 1-based on
/// input and become half open BED intervals. Returns the number of rows
/// written.
pub fn tsv_to_bed<W: Write>(reader: Box<dyn Read>, writer: W, chromosome: &str) -> PrsResult<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let chrom_idx = find_column(&headers, RAW_GENOME_TABLE, "chromosome")?;
    let position_idx = find_column(&headers, RAW_GENOME_TABLE, "position")?;
    let genotype_idx = find_column(&headers, RAW_GENOME_TABLE, "genotype")?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_writer(writer);

    let wanted = strip_chr(chromosome);
    let mut written = 0;
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        match row.get(chrom_idx) {
            Some(chrom) if strip_chr(chrom) == wanted => {}
            _ => continue,
        }
        let end = match row.get(position_idx).and_then(|s| s.trim().parse::<Position>().ok()) {
            Some(end) if end > 0 => end,
            _ => {
                debug!(row = idx + 1, "skipped row without a usable position");
                continue;
            }
        };
        let genotype = row.get(genotype_idx).map(str::trim).unwrap_or("");
        wtr.write_record(&[
            format!("chr{}", wanted),
            (end - 1).to_string(),
            end.to_string(),
            genotype.to_string(),
        ])?;
        written += 1;
    }
    wtr.flush()?;

    info!(chromosome = wanted, rows = written, "wrote BED rows");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    const RAW: &str = "# This data file generated by 23andMe\n\
                       rsid\tchromosome\tposition\tgenotype\n\
                       rs1\t1\t500\tAA\n\
                       rs2\t10\t100\tAG\n\
                       rs3\t10\t0\tCC\n\
                       rs4\tchr10\t250\t--\n\
                       rs5\t10\tx\tTT\n";

    #[test]
    fn test_tsv_to_bed() -> Result<(), Box<dyn Error>> {
        let mut out = Vec::new();
        let written = tsv_to_bed(Box::new(RAW.as_bytes()), &mut out, "10")?;
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out)?, "chr10\t99\t100\tAG\nchr10\t249\t250\t--\n");
        Ok(())
    }

    #[test]
    fn test_tsv_to_bed_accepts_chr_prefix() -> Result<(), Box<dyn Error>> {
        let mut out = Vec::new();
        let written = tsv_to_bed(Box::new(RAW.as_bytes()), &mut out, "chr1")?;
        assert_eq!(written, 1);
        assert_eq!(String::from_utf8(out)?, "chr1\t499\t500\tAA\n");
        Ok(())
    }

    #[test]
    fn test_tsv_to_bed_needs_position_column() {
        let mut out = Vec::new();
        let result = tsv_to_bed(Box::new("chromosome\tgenotype\n10\tAA\n".as_bytes()), &mut out, "10");
        assert!(result.is_err());
    }
}
