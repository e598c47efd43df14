use crate::error::{PrsError, PrsResult};
use crate::{GenomeVariant, GwasAssociation, Position};
use std::cell::OnceCell;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const GWAS_TABLE: &str = "GWAS";
const POSITION_COLUMN: &str = "base_pair_location";
const EFFECT_ALLELE_COLUMN: &str = "effect_allele";
const BETA_COLUMN: &str = "beta";
const P_VALUE_COLUMN: &str = "p_value";

/// Index of a named column, compared case-insensitively.
pub(crate) fn find_column(
    headers: &csv::StringRecord,
    table: &'static str,
    column: &'static str,
) -> PrsResult<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or(PrsError::MissingColumn { table, column })
}

fn parse_field<T: std::str::FromStr>(row: &csv::StringRecord, idx: usize) -> Option<T> {
    row.get(idx).and_then(|s| s.trim().parse::<T>().ok())
}

struct GwasColumns {
    position: usize,
    effect_allele: usize,
    beta: usize,
    p_value: usize,
}

/// Produces `GwasAssociation`s from delimited summary statistics
///
/// Rows whose position or p-value cannot be read are skipped. A beta
/// that is not a number is kept as `None`.
pub struct GwasRecords {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    columns: GwasColumns,
    skipped: usize,
}

impl GwasRecords {
    /// Rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse(&self, row: &csv::StringRecord) -> Option<GwasAssociation> {
        let position = parse_field::<Position>(row, self.columns.position)?;
        let p_value = parse_field::<f64>(row, self.columns.p_value)?;
        let effect_allele = row.get(self.columns.effect_allele)?.trim();
        let beta = parse_field::<f64>(row, self.columns.beta).filter(|b| !b.is_nan());
        Some(GwasAssociation::new(position, effect_allele, beta, p_value))
    }
}

impl Iterator for GwasRecords {
    type Item = PrsResult<GwasAssociation>;

    fn next(&mut self) -> Option<PrsResult<GwasAssociation>> {
        loop {
            match self.records.next()? {
                (_, Err(e)) => return Some(Err(e.into())),
                (idx, Ok(row)) => match self.parse(&row) {
                    Some(association) => return Some(Ok(association)),
                    None => {
                        self.skipped += 1;
                        debug!(row = idx + 1, "skipped unreadable GWAS row");
                    }
                },
            }
        }
    }
}

pub struct GwasReaderBuilder {
    delimiter: u8,
}

impl GwasReaderBuilder {
    /// Construct a new builder for tab delimited summary statistics
    pub fn new() -> Self {
        Self { delimiter: b'\t' }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Reads the header and fails if a required column is absent.
    pub fn from_reader(&self, reader: Box<dyn Read>) -> PrsResult<GwasRecords> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = GwasColumns {
            position: find_column(&headers, GWAS_TABLE, POSITION_COLUMN)?,
            effect_allele: find_column(&headers, GWAS_TABLE, EFFECT_ALLELE_COLUMN)?,
            beta: find_column(&headers, GWAS_TABLE, BETA_COLUMN)?,
            p_value: find_column(&headers, GWAS_TABLE, P_VALUE_COLUMN)?,
        };

        Ok(GwasRecords {
            records: rdr.into_records().enumerate(),
            columns,
            skipped: 0,
        })
    }
}

impl Default for GwasReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces `GenomeVariant`s from a BED file
///
/// Columns are `chrom start end genotype`, any further columns are
/// ignored. The BED start is used as the position.
pub struct GenomeRecords {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    skipped: usize,
}

impl GenomeRecords {
    /// Constructs the reader. Lines starting with `#` are comments.
    pub fn from_reader(reader: Box<dyn Read>) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .quoting(false)
            .comment(Some(b'#'))
            .from_reader(reader);
        Self {
            records: rdr.into_records().enumerate(),
            skipped: 0,
        }
    }

    /// Rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse(row: &csv::StringRecord) -> Option<GenomeVariant> {
        let chrom = row.get(0)?.trim();
        // UCSC header lines
        if chrom.starts_with("track") || chrom.starts_with("browser") {
            return None;
        }
        let position = parse_field::<Position>(row, 1)?;
        let genotype = row.get(3)?.trim();
        Some(GenomeVariant::new(position, genotype))
    }
}

impl Iterator for GenomeRecords {
    type Item = PrsResult<GenomeVariant>;

    fn next(&mut self) -> Option<PrsResult<GenomeVariant>> {
        loop {
            match self.records.next()? {
                (_, Err(e)) => return Some(Err(e.into())),
                (idx, Ok(row)) => match Self::parse(&row) {
                    Some(variant) => return Some(Ok(variant)),
                    None => {
                        self.skipped += 1;
                        debug!(row = idx + 1, "skipped unreadable genome row");
                    }
                },
            }
        }
    }
}

/// Loads a whole GWAS table from `path`.
///
/// A line that is not valid UTF-8 fails the whole load.
pub fn read_gwas<P: AsRef<Path>>(path: P) -> PrsResult<Vec<GwasAssociation>> {
    let path = path.as_ref();
    let mut records = GwasReaderBuilder::new().from_reader(Box::new(File::open(path)?))?;
    let table = records.by_ref().collect::<PrsResult<Vec<_>>>()?;
    info!(
        path = %path.display(),
        rows = table.len(),
        skipped = records.skipped(),
        "loaded GWAS table"
    );
    Ok(table)
}

/// Loads a whole genome BED table from `path`.
///
/// A line that is not valid UTF-8 fails the whole load.
pub fn read_genome<P: AsRef<Path>>(path: P) -> PrsResult<Vec<GenomeVariant>> {
    let path = path.as_ref();
    let mut records = GenomeRecords::from_reader(Box::new(File::open(path)?));
    let table = records.by_ref().collect::<PrsResult<Vec<_>>>()?;
    info!(
        path = %path.display(),
        rows = table.len(),
        skipped = records.skipped(),
        "loaded genome table"
    );
    Ok(table)
}

/// A table that is loaded on first access and kept afterwards.
pub struct LazyTable<T> {
    table: OnceCell<T>,
    load: Box<dyn Fn() -> PrsResult<T>>,
}

impl<T> LazyTable<T> {
    pub fn new<F>(load: F) -> Self
    where
        F: Fn() -> PrsResult<T> + 'static,
    {
        Self {
            table: OnceCell::new(),
            load: Box::new(load),
        }
    }

    /// Returns the table, running the loader only if nothing is cached yet.
    ///
    /// A failed load is not cached and will be retried on the next call.
    pub fn get(&self) -> PrsResult<&T> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = (self.load)()?;
        Ok(self.table.get_or_init(|| table))
    }
}

impl LazyTable<Vec<GwasAssociation>> {
    pub fn gwas<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(move || read_gwas(&path))
    }
}

impl LazyTable<Vec<GenomeVariant>> {
    pub fn genome<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(move || read_genome(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::error::Error;
    use std::rc::Rc;

    const GWAS: &str = "variant_id\tBASE_PAIR_LOCATION\teffect_allele\tother_allele\tbeta\tp_value\n\
                        rs1\t100\ta\tG\t0.5\t1e-4\n\
                        rs2\t200\tC\tT\tNA\t0.001\n\
                        rs3\tnot_a_number\tC\tT\t0.1\t0.001\n\
                        rs4\t300\tT\tC\t-0.25\t\n\
                        rs5\t400\tG\tA\t0.75\t0.5\n";

    const BED: &str = "# lifted over\n\
                       track name=human1\n\
                       chr10\t99\t100\tAA\t1\n\
                       chr10\t199\t200\tGC\n\
                       chr10\tx\t300\tTT\n\
                       chr10\t399\n\
                       chr10\t99\t100\tAG\n";

    #[test]
    fn test_gwas_records() -> Result<(), Box<dyn Error>> {
        let mut records = GwasReaderBuilder::new().from_reader(Box::new(GWAS.as_bytes()))?;
        let table = records.by_ref().collect::<PrsResult<Vec<_>>>()?;
        assert_eq!(
            table,
            vec![
                GwasAssociation::new(100, "a", Some(0.5), 1e-4),
                GwasAssociation::new(200, "C", None, 0.001),
                GwasAssociation::new(400, "G", Some(0.75), 0.5),
            ]
        );
        assert_eq!(records.skipped(), 2);
        Ok(())
    }

    #[test]
    fn test_gwas_beta_parsing() -> Result<(), Box<dyn Error>> {
        let table = GwasReaderBuilder::new()
            .from_reader(Box::new(
                "base_pair_location\teffect_allele\tbeta\tp_value\n1\tA\tinf\t0.01\n2\tA\tNaN\t0.01\n"
                    .as_bytes(),
            ))?
            .collect::<PrsResult<Vec<_>>>()?;
        assert_eq!(table[0].beta, Some(std::f64::INFINITY));
        assert_eq!(table[1].beta, None);
        Ok(())
    }

    #[test]
    fn test_gwas_missing_column_fails() {
        let result = GwasReaderBuilder::new()
            .from_reader(Box::new("base_pair_location\teffect_allele\tp_value\n1\tA\t0.1".as_bytes()));
        match result {
            Err(PrsError::MissingColumn { column, .. }) => assert_eq!(column, "beta"),
            _ => panic!("expected a missing column error"),
        }
    }

    #[test]
    fn test_gwas_custom_delimiter() -> Result<(), Box<dyn Error>> {
        let table = GwasReaderBuilder::new()
            .delimiter(b',')
            .from_reader(Box::new("base_pair_location,effect_allele,beta,p_value\n5,T,1.5,0.01".as_bytes()))?
            .collect::<PrsResult<Vec<_>>>()?;
        assert_eq!(table, vec![GwasAssociation::new(5, "T", Some(1.5), 0.01)]);
        Ok(())
    }

    #[test]
    fn test_genome_records() -> Result<(), Box<dyn Error>> {
        let mut records = GenomeRecords::from_reader(Box::new(BED.as_bytes()));
        let table = records.by_ref().collect::<PrsResult<Vec<_>>>()?;
        assert_eq!(
            table,
            vec![
                GenomeVariant::new(99, "AA"),
                GenomeVariant::new(199, "GC"),
                GenomeVariant::new(99, "AG"),
            ]
        );
        assert_eq!(records.skipped(), 3);
        Ok(())
    }

    #[test]
    fn test_lazy_table_loads_once() -> Result<(), Box<dyn Error>> {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let table = LazyTable::new(move || {
            counter.set(counter.get() + 1);
            Ok(vec![GenomeVariant::new(1, "AA")])
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(table.get()?.len(), 1);
        assert_eq!(table.get()?.len(), 1);
        assert_eq!(calls.get(), 1);
        Ok(())
    }

    #[test]
    fn test_lazy_table_retries_failed_load() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let table: LazyTable<Vec<GenomeVariant>> = LazyTable::new(move || {
            counter.set(counter.get() + 1);
            read_genome("does/not/exist.bed")
        });
        assert!(matches!(table.get(), Err(PrsError::Io(_))));
        assert!(matches!(table.get(), Err(PrsError::Io(_))));
        assert_eq!(calls.get(), 2);
    }
}
