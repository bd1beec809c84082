//! # fastods
//!
//! A streaming writer for OpenDocument Spreadsheet (`.ods`) files.
//!
//! ## Features
//!
//! - **Streaming Write**: rows below the write cursor are closed and flushed in
//!   batches, so memory stays flat however many rows are written
//! - **Background Flushing**: a dedicated thread compresses and writes the archive
//!   while the caller keeps producing rows
//! - **Style Registry**: cell, column, row, table, text, page and data styles are
//!   deduplicated by name and placed in `styles.xml` or `content.xml`
//! - **Typed Cells**: floats, percentages, currencies, dates, durations and booleans
//!   are formatted through data styles
//! - **Table Features**: merged cells, header rows and columns, print ranges,
//!   protection and autofilters
//! - **Rich Cells**: paragraphs with styled spans and links, annotations, matrix
//!   formulas and per-cell data styles
//!
//! ## Quick Start
//!
//! ### Row by row
//!
//! ```rust,no_run
//! use fastods::{CellValue, OdsWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = OdsWriter::new("output.ods")?;
//!
//! writer.write_header_bold(["Name", "Age", "Member"])?;
//! writer.write_row_typed(&[
//!     CellValue::String("Alice".to_string()),
//!     CellValue::Int(30),
//!     CellValue::Bool(true),
//! ])?;
//!
//! writer.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Random access within the open rows
//!
//! ```rust,no_run
//! use fastods::{OdsDocument, TableCellStyle, WriterConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut document = OdsDocument::create("report.ods", WriterConfig::default())?;
//!
//! let title = TableCellStyle::builder("Title").with_font_weight_bold().build();
//! document.add_style(title.clone())?;
//!
//! let id = document.add_table("Report")?;
//! let mut table = document.table(id)?;
//! table.cell(0, 0)?.set_style(title)?.set_string("Quarterly report")?;
//! table.cell(0, 0)?.set_merge(1, 3)?;
//! table.cell(1, 0)?.set_percentage(0.25)?;
//! table.cell(1, 1)?.set_formula("of:=[.A2]*2")?;
//!
//! document.save()?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod fast_writer;
pub mod row;
pub mod style;
pub mod styles_container;
pub mod table;
pub mod text;
pub mod types;
pub mod writer;

pub use document::{CellWriter, OdsDocument, TableId, TableWriter};
pub use error::{OdsError, Result};
pub use fast_writer::{
    FlushMode, MemoryArchive, MemoryProfile, MemorySink, SZipSink, SinkFactory, StylesMode,
    WriterConfig, ZipSink,
};
pub use style::{
    Border, Borders, CellAlign, DataStyle, DataStyleKind, DataStyles, Orientation, PageSection,
    PageStyle, TableCellStyle, TableColumnStyle, TableRowStyle, TableStyle, TextStyle,
    VerticalAlign,
};
pub use styles_container::{Dest, Mode, StylesContainer};
pub use text::{Text, TextBuilder, Tooltip};
pub use types::{CellValue, ValueType};
pub use writer::{OdsWriter, OdsWriterBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_imports() {
        let _ = std::marker::PhantomData::<OdsError>;
        let _ = std::marker::PhantomData::<OdsDocument>;
        let _ = std::marker::PhantomData::<OdsWriter>;
        let _ = std::marker::PhantomData::<StylesContainer>;
    }
}
