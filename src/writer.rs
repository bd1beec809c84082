//! Path-based ODS writer with a row-at-a-time API
//!
//! [`OdsWriter`] wraps an [`OdsDocument`] writing to a file. Rows are appended
//! one after the other on the current table and stream to disk in batches.

use crate::document::{OdsDocument, TableId};
use crate::error::Result;
use crate::fast_writer::memory::{FlushMode, MemoryProfile, StylesMode, WriterConfig};
use crate::style::{StyleFamily, StyleKey, TableCellStyle, TableColumnStyle};
use crate::types::CellValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the bold style used by [`OdsWriter::write_header_bold`]
pub const HEADER_STYLE_NAME: &str = "Header";

/// ODS file writer with streaming support
///
/// # Examples
///
/// ```no_run
/// use fastods::{CellValue, OdsWriter};
///
/// let mut writer = OdsWriter::new("output.ods")?;
/// writer.write_header_bold(["Name", "Age"])?;
/// for i in 0..1_000_000 {
///     writer.write_row_typed(&[CellValue::from("Alice"), CellValue::Int(i)])?;
/// }
/// writer.save()?;
/// # Ok::<(), fastods::OdsError>(())
/// ```
pub struct OdsWriter {
    document: OdsDocument,
    current_table: TableId,
    current_row: u32,
    header_style: Arc<TableCellStyle>,
    column_styles: HashMap<String, Arc<TableColumnStyle>>,
    next_column_style: u32,
}

impl OdsWriter {
    /// Create a writer with the default configuration and one table named `Sheet1`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        OdsWriterBuilder::new(path).build()
    }

    fn create(path: &Path, config: WriterConfig, table_name: &str) -> Result<Self> {
        let mut document = OdsDocument::create(path, config)?;
        let header_style = TableCellStyle::builder(HEADER_STYLE_NAME)
            .with_font_weight_bold()
            .build();
        document.add_style(Arc::clone(&header_style))?;
        let current_table = document.add_table(table_name)?;
        Ok(OdsWriter {
            document,
            current_table,
            current_row: 0,
            header_style,
            column_styles: HashMap::new(),
            next_column_style: 2,
        })
    }

    /// Write a row of strings
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let row = self.current_row;
        let mut table = self.document.table(self.current_table)?;
        for (col, value) in data.into_iter().enumerate() {
            table.cell(row, col as u32)?.set_string(value.as_ref())?;
        }
        self.current_row += 1;
        Ok(())
    }

    /// Write multiple rows at once
    pub fn write_rows_batch<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row_data in rows {
            self.write_row(row_data)?;
        }
        Ok(())
    }

    /// Write a row of typed values; empty values leave their cell blank
    pub fn write_row_typed(&mut self, cells: &[CellValue]) -> Result<()> {
        let row = self.current_row;
        let mut table = self.document.table(self.current_table)?;
        for (col, value) in cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            table.cell(row, col as u32)?.set_value(value.clone())?;
        }
        self.current_row += 1;
        Ok(())
    }

    /// Write a row of typed values with one cell style
    pub fn write_row_with_style(
        &mut self,
        values: &[CellValue],
        style: &Arc<TableCellStyle>,
    ) -> Result<()> {
        let row = self.current_row;
        let mut table = self.document.table(self.current_table)?;
        for (col, value) in values.iter().enumerate() {
            table
                .cell(row, col as u32)?
                .set_style(Arc::clone(style))?
                .set_value(value.clone())?;
        }
        self.current_row += 1;
        Ok(())
    }

    /// Write a header row in bold
    pub fn write_header_bold<I, S>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<CellValue> = headers
            .into_iter()
            .map(|h| CellValue::from(h.as_ref()))
            .collect();
        let style = Arc::clone(&self.header_style);
        self.write_row_with_style(&values, &style)
    }

    /// Skip `count` rows; they are written as one repeated empty row
    pub fn skip_rows(&mut self, count: u32) {
        self.current_row += count;
    }

    /// Close the current table and continue on a new one
    pub fn add_sheet(&mut self, name: &str) -> Result<()> {
        self.current_table = self.document.add_table(name)?;
        self.current_row = 0;
        Ok(())
    }

    /// Set the width of a column of the current table, e.g. `"3.5cm"`.
    ///
    /// Must be called before the table's first row batch is written. In streaming
    /// mode a width not used so far must also come before the styles are frozen.
    pub fn set_column_width(&mut self, col: u32, width: &str) -> Result<()> {
        let style = match self.column_styles.get(width) {
            Some(style) => Arc::clone(style),
            None => {
                let name = self.unused_column_style_name();
                Arc::new(TableColumnStyle::new(&name).with_width(width))
            }
        };
        self.document
            .table(self.current_table)?
            .set_column_style(col, Arc::clone(&style))?;
        self.column_styles.insert(width.to_string(), style);
        Ok(())
    }

    /// Next `coN` name not taken by a column style of the document
    fn unused_column_style_name(&mut self) -> String {
        loop {
            let name = format!("co{}", self.next_column_style);
            self.next_column_style += 1;
            let key = StyleKey::new(StyleFamily::TableColumn, name.as_str());
            if self.document.styles().get(&key).is_none() {
                return name;
            }
        }
    }

    /// Underlying document, for merges, styles and page setup
    pub fn document_mut(&mut self) -> &mut OdsDocument {
        &mut self.document
    }

    pub fn current_table(&self) -> TableId {
        self.current_table
    }

    /// Next row index (0-based)
    pub fn current_row(&self) -> u32 {
        self.current_row
    }

    /// Write everything and close the file
    pub fn save(self) -> Result<()> {
        self.document.save()
    }
}

/// Builder for creating configured ODS writers
pub struct OdsWriterBuilder {
    path: PathBuf,
    sheet_name: String,
    config: WriterConfig,
}

impl OdsWriterBuilder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        OdsWriterBuilder {
            path: path.as_ref().to_path_buf(),
            sheet_name: "Sheet1".to_string(),
            config: WriterConfig::default(),
        }
    }

    /// Name of the first table
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Closed rows gathered before they are written
    pub fn with_row_batch_size(mut self, size: usize) -> Self {
        self.config.row_batch_size = size;
        self
    }

    pub fn with_memory_profile(mut self, profile: MemoryProfile) -> Self {
        self.config.row_batch_size = profile.row_batch_size();
        self
    }

    pub fn with_flush_mode(mut self, mode: FlushMode) -> Self {
        self.config.flush_mode = mode;
        self
    }

    pub fn with_styles_mode(mut self, mode: StylesMode) -> Self {
        self.config.styles_mode = mode;
        self
    }

    pub fn with_column_capacity(mut self, capacity: u32) -> Self {
        self.config.column_capacity = capacity;
        self
    }

    /// Deflate level 0-9 (higher values are clamped)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.config.compression_level = level;
        self
    }

    pub fn with_creator(mut self, creator: &str) -> Self {
        self.config.creator = creator.to_string();
        self
    }

    pub fn with_generator(mut self, generator: &str) -> Self {
        self.config.generator = generator.to_string();
        self
    }

    pub fn build(self) -> Result<OdsWriter> {
        OdsWriter::create(&self.path, self.config, &self.sheet_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdsError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_writer_creation() {
        let temp = NamedTempFile::new().unwrap();
        let writer = OdsWriter::new(temp.path());
        assert!(writer.is_ok());
        assert!(writer.unwrap().save().is_ok());
    }

    #[test]
    fn test_write_rows() {
        let temp = NamedTempFile::new().unwrap();
        let mut writer = OdsWriter::new(temp.path()).unwrap();

        writer.write_header_bold(["A", "B", "C"]).unwrap();
        writer.write_row(["1", "2", "3"]).unwrap();
        writer
            .write_row_typed(&[CellValue::Int(42), CellValue::Empty, CellValue::Bool(true)])
            .unwrap();
        writer
            .write_rows_batch(vec![vec!["x", "y"], vec!["z"]])
            .unwrap();
        assert_eq!(writer.current_row(), 5);
        assert!(writer.save().is_ok());
    }

    #[test]
    fn test_builder() {
        let temp = NamedTempFile::new().unwrap();
        let writer = OdsWriterBuilder::new(temp.path())
            .with_sheet_name("CustomSheet")
            .with_memory_profile(MemoryProfile::Low)
            .with_flush_mode(FlushMode::Inline)
            .with_compression_level(1)
            .with_creator("tests")
            .build()
            .unwrap();

        assert_eq!(writer.document.config().row_batch_size, 128);
        assert_eq!(writer.document.config().flush_mode, FlushMode::Inline);
        assert!(writer.save().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let temp = NamedTempFile::new().unwrap();
        let result = OdsWriterBuilder::new(temp.path())
            .with_row_batch_size(0)
            .build();
        assert!(matches!(result, Err(OdsError::Config(_))));
    }

    #[test]
    fn test_add_sheet() {
        let temp = NamedTempFile::new().unwrap();
        let mut writer = OdsWriter::new(temp.path()).unwrap();

        writer.write_row(["Sheet1 Data"]).unwrap();
        assert_eq!(writer.current_row(), 1);

        writer.add_sheet("Sheet2").unwrap();
        assert_eq!(writer.current_row(), 0);
        assert_eq!(writer.current_table().index(), 1);

        writer.write_row(["Sheet2 Data"]).unwrap();
        assert!(matches!(
            writer.add_sheet("Sheet2"),
            Err(OdsError::InvalidTableName(_))
        ));
        assert!(writer.save().is_ok());
    }

    #[test]
    fn test_column_width_styles_are_shared() {
        let temp = NamedTempFile::new().unwrap();
        let mut writer = OdsWriter::new(temp.path()).unwrap();
        writer.set_column_width(0, "5cm").unwrap();
        writer.set_column_width(1, "5cm").unwrap();
        writer.set_column_width(2, "2cm").unwrap();
        assert_eq!(writer.column_styles.len(), 2);
        assert_eq!(writer.column_styles["5cm"].name(), "co2");
        assert_eq!(writer.column_styles["2cm"].name(), "co3");
        assert!(writer.save().is_ok());
    }

    #[test]
    fn test_column_width_skips_registered_names() {
        let temp = NamedTempFile::new().unwrap();
        let mut writer = OdsWriter::new(temp.path()).unwrap();
        let custom = Arc::new(TableColumnStyle::new("co2").with_width("9cm"));
        writer.document_mut().add_style(custom).unwrap();

        writer.set_column_width(0, "5cm").unwrap();
        writer.set_column_width(1, "9cm").unwrap();
        assert_eq!(writer.column_styles["5cm"].name(), "co3");
        assert_eq!(writer.column_styles["9cm"].name(), "co4");
        assert!(writer.save().is_ok());
    }
}
