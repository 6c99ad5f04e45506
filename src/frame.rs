use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use polars::prelude::*;

/// Cell texts read as null: the usual dataframe NA spellings.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub type Cell = Option<String>;

const ROW_POSITION: &str = "__row_position";

/// Text table backed by a polars `DataFrame` plus a row index.
///
/// Every column is a `String` column holding the text found in the source
/// file, with [`NA_TOKENS`] read as null. The index survives row filtering so a
/// written table still points back at the row it came from.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    data: DataFrame,
    index: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
}

fn read_options() -> CsvReadOptions {
    let null_values = NA_TOKENS.iter().map(|token| (*token).into()).collect();
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_null_values(Some(NullValues::AllColumns(null_values)))
                .with_truncate_ragged_lines(false),
        )
}

impl Frame {
    /// Builds a frame from row-major cells. Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        for (pos, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(anyhow!(
                    "row {pos} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                ));
            }
        }
        let series: Vec<Column> = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = rows.iter().map(|row| row[idx].clone()).collect::<Vec<_>>();
                Series::new(name.as_str().into(), values).into()
            })
            .collect();
        Ok(Self::from_data(DataFrame::new(series)?))
    }

    /// Wraps a `DataFrame` of string columns with a fresh `0..n` index.
    pub fn from_data(data: DataFrame) -> Self {
        let index = (0..data.height()).collect();
        Self { data, index }
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open csv {}", path.display()))?;
        let data = read_options()
            .into_reader_with_file_handle(file)
            .finish()
            .with_context(|| format!("parse csv {}", path.display()))?;
        Ok(Self::from_data(data))
    }

    /// Parses CSV text. Short rows are padded with nulls; a row with more
    /// fields than the header is an error.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).context("read csv input")?;
        let data = read_options()
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .context("parse csv input")?;
        Ok(Self::from_data(data))
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("create csv {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("write csv {}", path.display()))
    }

    /// Writes the table with a leading index column whose header cell is empty.
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        let names = self.columns();
        let mut header = Vec::with_capacity(names.len() + 1);
        header.push("");
        header.extend(names.iter().map(String::as_str));
        writer.write_record(&header)?;

        let columns = self
            .data
            .get_columns()
            .iter()
            .map(|column| column.str())
            .collect::<PolarsResult<Vec<_>>>()?;
        for (row, idx) in self.index.iter().enumerate() {
            let idx = idx.to_string();
            let mut record = Vec::with_capacity(columns.len() + 1);
            record.push(idx.as_str());
            record.extend(columns.iter().map(|ca| ca.get(row).unwrap_or_default()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_index(name).is_some()
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing = names
            .iter()
            .filter(|name| !self.has_column(name))
            .copied()
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("missing required columns: {}", missing.join(", ")))
        }
    }

    fn strings(&self, name: &str) -> Result<&StringChunked> {
        let column = self
            .data
            .column(name)
            .map_err(|_| anyhow!("missing column `{name}`"))?;
        Ok(column.str()?)
    }

    pub fn column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        Ok(self.strings(name)?.into_iter().collect())
    }

    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.data
            .get_columns()
            .iter()
            .map(|column| (column.name().to_string(), column.null_count()))
            .collect()
    }

    pub fn column_info(&self) -> Vec<ColumnInfo> {
        let total = self.len();
        self.null_counts()
            .into_iter()
            .map(|(name, nulls)| ColumnInfo {
                name,
                non_null: total - nulls,
            })
            .collect()
    }

    /// Fills nulls in `target` with the value of `source` on the same row.
    /// Returns how many cells were filled.
    pub fn fill_null_from(&mut self, target: &str, source: &str) -> Result<usize> {
        let before = self.strings(target)?.null_count();
        self.strings(source)?;
        let filled = self
            .data
            .clone()
            .lazy()
            .with_column(col(target).fill_null(col(source)))
            .collect()?;
        let after = filled.column(target)?.null_count();
        self.data = filled;
        Ok(before - after)
    }

    /// Rewrites every non-null cell of a column.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> String) -> Result<()> {
        let mapped: StringChunked = self
            .strings(name)?
            .into_iter()
            .map(|value| value.map(&f))
            .collect();
        self.data
            .with_column(mapped.with_name(name.into()).into_series())?;
        Ok(())
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        self.require_columns(names)?;
        for name in names {
            self.data = self.data.drop(name)?;
        }
        Ok(())
    }

    pub fn rename(&mut self, pairs: &[(&str, &str)]) -> Result<()> {
        for (from, to) in pairs {
            self.strings(from)?;
            self.data.rename(from, (*to).into())?;
        }
        Ok(())
    }

    /// Drops every row with at least one null cell. Surviving rows keep their
    /// index. Returns how many rows were dropped.
    pub fn drop_nulls(&mut self) -> Result<usize> {
        let before = self.len();
        let kept = self
            .data
            .with_row_index(ROW_POSITION.into(), None)?
            .lazy()
            .drop_nulls(None)
            .collect()?;
        let positions = kept.column(ROW_POSITION)?.cast(&DataType::UInt64)?;
        let index = positions
            .u64()?
            .into_no_null_iter()
            .map(|pos| self.index[pos as usize])
            .collect::<Vec<_>>();
        self.data = kept.drop(ROW_POSITION)?;
        self.index = index;
        Ok(before - self.len())
    }

    /// Flags every row whose key tuple appears more than once (all members of a
    /// duplicate group are flagged, not only the later ones).
    pub fn duplicated(&self, subset: &[&str]) -> Result<Vec<bool>> {
        self.require_columns(subset)?;
        let keys = self.data.select(subset.iter().copied())?;
        let flags = keys.is_duplicated()?;
        Ok(flags.into_iter().map(|flag| flag.unwrap_or(false)).collect())
    }

    /// Counts non-null values of `key` per distinct value. Groups appear in
    /// first-seen order. The result has columns `[key, count_column]` with the
    /// count as integer text.
    pub fn count_by(&self, key: &str, count_column: &str) -> Result<Frame> {
        self.strings(key)?;
        let mut counts = self
            .data
            .clone()
            .lazy()
            .filter(col(key).is_not_null())
            .group_by_stable([col(key)])
            .agg([col(key).count().alias(count_column)])
            .collect()?;
        let as_text = counts.column(count_column)?.cast(&DataType::String)?;
        counts.with_column(as_text)?;
        Ok(Frame::from_data(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(csv: &str) -> Frame {
        Frame::from_reader(csv.as_bytes()).expect("fixture csv should parse")
    }

    #[test]
    fn na_tokens_read_as_null() {
        let f = frame("a,b,c\n1,,NaN\nNA,x,null\n");
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(
            f.null_counts(),
            vec![("a".to_string(), 1), ("b".to_string(), 1), ("c".to_string(), 2)]
        );
        assert_eq!(f.column("b").unwrap(), vec![None, Some("x")]);
    }

    #[test]
    fn numeric_looking_cells_stay_text() {
        let f = frame("id,value\n007,1.50\n");
        assert_eq!(f.column("id").unwrap(), vec![Some("007")]);
        assert_eq!(f.column("value").unwrap(), vec![Some("1.50")]);
    }

    #[test]
    fn long_row_is_an_error() {
        assert!(Frame::from_reader("a,b\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn short_row_is_padded_with_nulls() {
        let f = frame("a,b,c\n1,2,3\n4\n");
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(f.column("a").unwrap(), vec![Some("1"), Some("4")]);
        assert_eq!(f.column("c").unwrap(), vec![Some("3"), None]);
    }

    #[test]
    fn ragged_cells_are_rejected_by_new() {
        let built = Frame::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Some("1".to_string())]],
        );
        assert!(built.is_err());
    }

    #[test]
    fn fill_null_from_only_touches_nulls() {
        let mut f = frame("x,y\nAnna,\nBen,Benjamin\nNaN,\n");
        let filled = f.fill_null_from("y", "x").unwrap();
        assert_eq!(filled, 1);
        assert_eq!(f.column("y").unwrap(), vec![Some("Anna"), Some("Benjamin"), None]);
    }

    #[test]
    fn drop_nulls_keeps_original_index() {
        let mut f = frame("a,b\n1,2\n3,\n5,6\n");
        assert_eq!(f.drop_nulls().unwrap(), 1);
        assert_eq!(f.index(), &[0, 2]);

        let mut out = Vec::new();
        f.to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ",a,b\n0,1,2\n2,5,6\n");
    }

    #[test]
    fn drop_and_rename_columns() {
        let mut f = frame("a_x,a_y,b\n1,2,3\n");
        f.drop_columns(&["a_y"]).unwrap();
        f.rename(&[("a_x", "a")]).unwrap();
        assert_eq!(f.columns(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(f.column("a").unwrap(), vec![Some("1")]);
        assert_eq!(f.column("b").unwrap(), vec![Some("3")]);
        assert!(f.drop_columns(&["missing"]).is_err());
    }

    #[test]
    fn map_column_skips_nulls() {
        let mut f = frame("name\nAnn\nNaN\n");
        f.map_column("name", str::to_uppercase).unwrap();
        assert_eq!(f.column("name").unwrap(), vec![Some("ANN"), None]);
    }

    #[test]
    fn duplicated_flags_every_member() {
        let f = frame("p,g\n1,10\n1,11\n1,10\n2,10\n");
        assert_eq!(f.duplicated(&["p", "g"]).unwrap(), vec![true, false, true, false]);
    }

    #[test]
    fn count_by_first_seen_order() {
        let f = frame("p,g\n7,1\n3,1\n7,2\nNaN,3\n");
        let counts = f.count_by("p", "count").unwrap();
        assert_eq!(counts.column("p").unwrap(), vec![Some("7"), Some("3")]);
        assert_eq!(counts.column("count").unwrap(), vec![Some("2"), Some("1")]);
    }

    #[test]
    fn require_columns_names_missing() {
        let f = frame("a,b\n1,2\n");
        let err = f.require_columns(&["a", "c", "d"]).unwrap_err();
        assert_eq!(err.to_string(), "missing required columns: c, d");
        assert_eq!(f.column("zz").unwrap_err().to_string(), "missing column `zz`");
    }
}
