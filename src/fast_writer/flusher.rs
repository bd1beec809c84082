//! Flusher units: self-contained pieces of the package, applied in order to a sink
//!
//! Every flusher owns the data it renders (rows are moved in, styles are an
//! immutable snapshot), so it can be sent to the flush thread as is.

use super::elements::{self, AutoFilter, DocumentMeta, Settings};
use super::xml_writer::XmlWriter;
use super::zip_sink::ZipSink;
use crate::error::Result;
use crate::row::{append_empty_rows_xml, Row};
use crate::styles_container::FrozenStyles;
use std::io::Write;
use std::sync::Arc;

/// `count` adjacent columns sharing a column style and a default cell style
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRun {
    pub style_name: String,
    pub default_cell_style_name: String,
    pub count: u32,
}

impl ColumnRun {
    fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("table:table-column")?;
        xml.attribute("table:style-name", &self.style_name)?;
        if self.count > 1 {
            xml.attribute_int("table:number-columns-repeated", self.count as i64)?;
        }
        xml.attribute("table:default-cell-style-name", &self.default_cell_style_name)?;
        xml.end_empty()
    }
}

/// Opening tag of a table and its column definitions
#[derive(Debug, Clone, PartialEq)]
pub struct TablePreamble {
    pub name: String,
    pub style_name: String,
    pub print_range: Option<String>,
    pub protected: bool,
    pub header_columns: Vec<ColumnRun>,
    pub columns: Vec<ColumnRun>,
}

impl TablePreamble {
    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("table:table")?;
        xml.attribute("table:name", &self.name)?;
        xml.attribute("table:style-name", &self.style_name)?;
        match &self.print_range {
            Some(range) => xml.attribute("table:print-ranges", range)?,
            None => xml.attribute_raw("table:print", "false")?,
        }
        if self.protected {
            xml.attribute_raw("table:protected", "true")?;
        }
        xml.close_start_tag()?;

        xml.start_element("office:forms")?;
        xml.attribute_raw("form:automatic-focus", "false")?;
        xml.attribute_raw("form:apply-design-mode", "false")?;
        xml.end_empty()?;

        if !self.header_columns.is_empty() {
            xml.start_element("table:table-header-columns")?;
            xml.close_start_tag()?;
            for run in &self.header_columns {
                run.append_xml(xml)?;
            }
            xml.end_element("table:table-header-columns")?;
        }
        for run in &self.columns {
            run.append_xml(xml)?;
        }
        Ok(())
    }
}

/// Closed rows of a table, in increasing index order
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    /// First row index not yet written by an earlier batch
    pub start_index: u32,
    pub header_rows: u32,
    pub rows: Vec<Row>,
}

impl RowBatch {
    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        let mut next = self.start_index;
        for row in &self.rows {
            append_gap_xml(xml, next, row.index(), self.header_rows)?;
            if row.index() == 0 && self.header_rows > 0 {
                xml.start_element("table:table-header-rows")?;
                xml.close_start_tag()?;
            }
            row.append_xml(xml)?;
            if self.header_rows > 0 && row.index() == self.header_rows - 1 {
                xml.end_element("table:table-header-rows")?;
            }
            next = row.index() + 1;
        }
        Ok(())
    }
}

/// End of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TablePostamble {
    /// Index following the last written row
    pub next_index: u32,
    pub header_rows: u32,
}

impl TablePostamble {
    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        // a table needs at least one row, and a header group must be complete
        let end = self.header_rows.max(1);
        if self.next_index < end {
            append_gap_xml(xml, self.next_index, end, self.header_rows)?;
        }
        xml.end_element("table:table")
    }
}

/// Untouched rows `[from, to)`, split at the header row boundary
fn append_gap_xml<W: Write>(
    xml: &mut XmlWriter<W>,
    from: u32,
    to: u32,
    header_rows: u32,
) -> Result<()> {
    let mut index = from;
    while index < to {
        let end = if index < header_rows {
            to.min(header_rows)
        } else {
            to
        };
        if index == 0 && header_rows > 0 {
            xml.start_element("table:table-header-rows")?;
            xml.close_start_tag()?;
        }
        append_empty_rows_xml(xml, end - index)?;
        if index < header_rows && end == header_rows {
            xml.end_element("table:table-header-rows")?;
        }
        index = end;
    }
    Ok(())
}

/// A unit of output, applied by the flush queue in FIFO order
#[derive(Debug, Clone)]
pub enum Flusher {
    /// mimetype, manifest, meta.xml, styles.xml and the head of content.xml
    StylesFreeze {
        styles: Arc<FrozenStyles>,
        meta: DocumentMeta,
    },
    Preamble(TablePreamble),
    RowBatch(RowBatch),
    Postamble(TablePostamble),
    /// End of content.xml, settings.xml and the empty entries
    Finalize {
        settings: Settings,
        autofilters: Vec<AutoFilter>,
    },
}

impl Flusher {
    pub fn kind(&self) -> &'static str {
        match self {
            Flusher::StylesFreeze { .. } => "styles-freeze",
            Flusher::Preamble(_) => "preamble",
            Flusher::RowBatch(_) => "row-batch",
            Flusher::Postamble(_) => "postamble",
            Flusher::Finalize { .. } => "finalize",
        }
    }

    /// The last flusher of a document
    pub fn is_end(&self) -> bool {
        matches!(self, Flusher::Finalize { .. })
    }

    pub fn apply(&self, sink: &mut dyn ZipSink) -> Result<()> {
        match self {
            Flusher::StylesFreeze { styles, meta } => {
                elements::write_mimetype(sink)?;
                elements::write_manifest(sink)?;
                elements::write_meta(sink, meta)?;
                elements::write_styles(sink, styles)?;
                elements::write_content_head(sink, styles)
            }
            Flusher::Preamble(preamble) => render(sink, |xml| preamble.append_xml(xml)),
            Flusher::RowBatch(batch) => render(sink, |xml| batch.append_xml(xml)),
            Flusher::Postamble(postamble) => render(sink, |xml| postamble.append_xml(xml)),
            Flusher::Finalize {
                settings,
                autofilters,
            } => {
                elements::write_content_tail(sink, autofilters)?;
                elements::write_settings(sink, settings)?;
                elements::write_empty_entries(sink)
            }
        }
    }
}

fn render<F>(sink: &mut dyn ZipSink, body: F) -> Result<()>
where
    F: FnOnce(&mut XmlWriter<&mut dyn ZipSink>) -> Result<()>,
{
    let mut xml = XmlWriter::new(sink);
    body(&mut xml)?;
    xml.flush()
}
