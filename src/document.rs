//! Document coordinator: owns the style registry, the tables and the flush queue
//!
//! The coordinator decides when things are written. Rows closed by the table
//! cursor are gathered into batches; a table's column definitions go out with
//! its first batch; the styles go out before the first table. Everything is
//! handed to the [`FlushQueue`] as [`Flusher`] values, in document order.

use crate::error::{OdsError, Result};
use crate::fast_writer::elements::{AutoFilter, DocumentMeta, Settings};
use crate::fast_writer::flusher::Flusher;
use crate::fast_writer::memory::{FlushMode, StylesMode, WriterConfig};
use crate::fast_writer::{FlushQueue, SZipSink, SinkFactory, ZipSink};
use crate::style::{
    DataStyle, DataStyles, ObjectStyle, PageStyle, TableCellStyle, TableColumnStyle,
    TableRowStyle, TableStyle,
};
use crate::styles_container::{Mode, StylesContainer};
use crate::table::{Table, TableState, MAX_ROWS};
use crate::text::{Text, Tooltip};
use crate::types::{CellValue, ValueType};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Font declared by every document
pub const DEFAULT_FONT: &str = "Liberation Sans";

const FORBIDDEN_TABLE_NAME_CHARS: &[char] = &['[', ']', '*', '?', ':', '/', '\\'];

/// Handle of a table returned by [`OdsDocument::add_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A spreadsheet being written
///
/// # Examples
///
/// ```
/// use fastods::{MemoryArchive, OdsDocument, WriterConfig};
///
/// let archive = MemoryArchive::new();
/// let mut document = OdsDocument::new(Box::new(archive.sink()), WriterConfig::default())?;
/// let id = document.add_table("t1")?;
/// let mut table = document.table(id)?;
/// table.cell(0, 0)?.set_value(true)?;
/// table.cell(0, 1)?.set_string("hello")?;
/// document.save()?;
///
/// assert!(archive.entry_string("content.xml").unwrap().contains("hello"));
/// # Ok::<(), fastods::OdsError>(())
/// ```
pub struct OdsDocument {
    config: WriterConfig,
    styles: StylesContainer,
    data_styles: DataStyles,
    default_cell_style: Arc<TableCellStyle>,
    default_table_style: Arc<TableStyle>,
    queue: FlushQueue,
    staged: Vec<Flusher>,
    styles_flushed: bool,
    meta: DocumentMeta,
    tables: Vec<Table>,
    active: Option<usize>,
    active_table_name: Option<String>,
    autofilters: Vec<AutoFilter>,
}

impl OdsDocument {
    /// Create a document writing to `sink`
    pub fn new(sink: Box<dyn ZipSink + Send>, config: WriterConfig) -> Result<Self> {
        let factory: SinkFactory = Box::new(move || -> Result<Box<dyn ZipSink>> { Ok(sink) });
        Self::with_sink_factory(factory, config)
    }

    /// Create a document writing an `.ods` file at `path`
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self> {
        let factory = SZipSink::factory(path, config.effective_compression_level());
        Self::with_sink_factory(factory, config)
    }

    /// Create a document whose sink is built by `factory`: on the flush thread
    /// in background mode, right away in inline mode
    pub fn with_sink_factory(factory: SinkFactory, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        let queue = match config.flush_mode {
            FlushMode::Background => FlushQueue::background(factory)?,
            FlushMode::Inline => FlushQueue::inline(factory()?),
        };
        let meta = DocumentMeta::new(&config.generator, &config.creator);
        let mut document = OdsDocument {
            config,
            styles: StylesContainer::new(),
            data_styles: DataStyles::default(),
            default_cell_style: TableCellStyle::default_style(),
            default_table_style: Arc::new(TableStyle::new(
                TableStyle::DEFAULT_NAME,
                PageStyle::DEFAULT_MASTER_PAGE_NAME,
            )),
            queue,
            staged: Vec::new(),
            styles_flushed: false,
            meta,
            tables: Vec::new(),
            active: None,
            active_table_name: None,
            autofilters: Vec::new(),
        };
        document.register_default_styles()?;
        Ok(document)
    }

    fn register_default_styles(&mut self) -> Result<()> {
        self.styles
            .add_content_style(Arc::clone(&self.default_cell_style))?;
        self.styles
            .add_content_style(TableColumnStyle::default_style())?;
        self.styles.add_content_style(TableRowStyle::default_style())?;
        self.styles
            .add_content_style(Arc::clone(&self.default_table_style))?;
        self.styles
            .add_page_style(&PageStyle::default_style(), Mode::Create)?;
        self.styles.add_font_face(DEFAULT_FONT)?;
        self.register_data_styles()
    }

    /// Declare the data styles and the typed children of `Default`, so that
    /// typed values in unstyled cells never need a style after the freeze
    fn register_data_styles(&mut self) -> Result<()> {
        let data_styles: Vec<Arc<DataStyle>> = self.data_styles.iter().cloned().collect();
        for data_style in &data_styles {
            self.styles.add_data_style(Arc::clone(data_style))?;
            self.styles
                .add_child_cell_style(&self.default_cell_style, data_style)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn styles(&self) -> &StylesContainer {
        &self.styles
    }

    /// Replace the data styles used by typed values. On error the previous set
    /// stays in use.
    pub fn set_data_styles(&mut self, data_styles: DataStyles) -> Result<()> {
        let previous = std::mem::replace(&mut self.data_styles, data_styles);
        if let Err(e) = self.register_data_styles() {
            self.data_styles = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Register a style in the document body (content.xml if hidden, styles.xml otherwise)
    pub fn add_style(&mut self, style: impl Into<ObjectStyle>) -> Result<bool> {
        self.styles.add_content_style(style)
    }

    /// Register a style used only by page styles (always in styles.xml)
    pub fn add_styles_style(&mut self, style: impl Into<ObjectStyle>, mode: Mode) -> Result<bool> {
        self.styles.add_styles_style(style, mode)
    }

    pub fn add_data_style(&mut self, data_style: Arc<DataStyle>) -> Result<bool> {
        self.styles.add_data_style(data_style)
    }

    pub fn add_page_style(&mut self, page_style: &PageStyle) -> Result<bool> {
        self.styles.add_page_style(page_style, Mode::Create)
    }

    /// Number of flushers handed to the queue so far
    pub fn flushed_units(&self) -> u64 {
        self.queue.pushed()
    }

    /// Close the previous table and start a new one
    pub fn add_table(&mut self, name: &str) -> Result<TableId> {
        self.validate_table_name(name)?;
        if let Some(previous) = self.active.take() {
            self.close_table_at(previous)?;
        }
        let index = self.tables.len();
        self.tables.push(Table::new(
            name,
            Arc::clone(&self.default_table_style),
            self.config.column_capacity,
        ));
        self.active = Some(index);
        debug!(table = name, index, "table added");
        Ok(TableId(index))
    }

    fn validate_table_name(&self, name: &str) -> Result<()> {
        if name.is_empty()
            || name.contains(FORBIDDEN_TABLE_NAME_CHARS)
            || self.tables.iter().any(|t| t.name() == name)
        {
            return Err(OdsError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_by_name(&self, name: &str) -> Option<TableId> {
        self.tables.iter().position(|t| t.name() == name).map(TableId)
    }

    /// Writer for an open table
    pub fn table(&mut self, id: TableId) -> Result<TableWriter<'_>> {
        let table = self
            .tables
            .get(id.0)
            .ok_or(OdsError::TableNotFound(id.0))?;
        if table.state() == TableState::Closed {
            return Err(OdsError::TableClosed(table.name().to_string()));
        }
        Ok(TableWriter {
            document: self,
            index: id.0,
        })
    }

    /// Table shown first when the file is opened (defaults to the first table)
    pub fn set_active_table(&mut self, id: TableId) -> Result<()> {
        let table = self
            .tables
            .get(id.0)
            .ok_or(OdsError::TableNotFound(id.0))?;
        self.active_table_name = Some(table.name().to_string());
        Ok(())
    }

    /// Write the remaining rows of a table and close it
    pub fn close_table(&mut self, id: TableId) -> Result<()> {
        let table = self
            .tables
            .get(id.0)
            .ok_or(OdsError::TableNotFound(id.0))?;
        if table.state() == TableState::Closed {
            return Err(OdsError::TableClosed(table.name().to_string()));
        }
        if self.active == Some(id.0) {
            self.active = None;
        }
        self.close_table_at(id.0)
    }

    fn close_table_at(&mut self, index: usize) -> Result<()> {
        self.tables[index].close_all_rows();
        self.flush_rows(index)?;
        let postamble = self.tables[index].take_postamble()?;
        self.enqueue(Flusher::Postamble(postamble))?;
        debug!(table = self.tables[index].name(), "table closed");
        Ok(())
    }

    /// Enqueue a row batch once enough rows have been closed
    fn flush_ready_rows(&mut self, index: usize) -> Result<()> {
        if self.tables[index].closed_row_count() >= self.config.row_batch_size {
            self.flush_rows(index)?;
        }
        Ok(())
    }

    fn flush_rows(&mut self, index: usize) -> Result<()> {
        if self.tables[index].state() == TableState::Building {
            let preamble = self.tables[index].take_preamble()?;
            self.enqueue(Flusher::Preamble(preamble))?;
        }
        let batch = self.tables[index].take_row_batch()?;
        if batch.rows.is_empty() {
            return Ok(());
        }
        trace!(
            table = self.tables[index].name(),
            start = batch.start_index,
            rows = batch.rows.len(),
            "row batch"
        );
        self.enqueue(Flusher::RowBatch(batch))
    }

    fn enqueue(&mut self, flusher: Flusher) -> Result<()> {
        if self.styles_flushed {
            return self.queue.push(flusher);
        }
        self.staged.push(flusher);
        match self.config.styles_mode {
            StylesMode::Streaming => self.freeze_styles(),
            StylesMode::Buffered => Ok(()),
        }
    }

    /// Freeze the registry and write the styles, then the flushers staged so far.
    ///
    /// After this call, registering a new style is an error; registering an
    /// existing one is a no-op.
    pub fn freeze_styles(&mut self) -> Result<()> {
        if self.styles_flushed {
            return Ok(());
        }
        self.styles.freeze();
        debug!(
            styles = self.styles.len(),
            staged = self.staged.len(),
            "styles frozen"
        );
        self.queue.push(Flusher::StylesFreeze {
            styles: self.styles.snapshot(),
            meta: self.meta.clone(),
        })?;
        self.styles_flushed = true;
        for flusher in std::mem::take(&mut self.staged) {
            self.queue.push(flusher)?;
        }
        Ok(())
    }

    /// Close the active table, write everything and wait for the output to be complete
    pub fn save(mut self) -> Result<()> {
        if let Some(index) = self.active.take() {
            self.close_table_at(index)?;
        }
        self.freeze_styles()?;
        let table_names: Vec<String> = self.tables.iter().map(|t| t.name().to_string()).collect();
        let active_table = self
            .active_table_name
            .take()
            .or_else(|| table_names.first().cloned());
        self.queue.push(Flusher::Finalize {
            settings: Settings {
                table_names,
                active_table,
            },
            autofilters: std::mem::take(&mut self.autofilters),
        })?;
        self.queue.join()?;
        debug!(tables = self.tables.len(), "document saved");
        Ok(())
    }

    /// Child of `base` carrying the data style of `value`, if the value needs one
    fn typed_style(
        &mut self,
        base: &Arc<TableCellStyle>,
        value: &CellValue,
    ) -> Result<Option<Arc<TableCellStyle>>> {
        if base.data_style_name().is_some() {
            return Ok(None);
        }
        let Some(value_type) = value.value_type() else {
            return Ok(None);
        };
        let Some(data_style) = self.data_styles.for_value_type(value_type).cloned() else {
            return Ok(None);
        };
        self.styles
            .add_child_cell_style(base, &data_style)
            .map(Some)
    }
}

/// Mutable access to one table of an [`OdsDocument`]
pub struct TableWriter<'a> {
    document: &'a mut OdsDocument,
    index: usize,
}

impl<'a> TableWriter<'a> {
    fn table(&mut self) -> &mut Table {
        &mut self.document.tables[self.index]
    }

    pub fn id(&self) -> TableId {
        TableId(self.index)
    }

    pub fn name(&self) -> &str {
        self.document.tables[self.index].name()
    }

    /// Writer for the cell at (`row`, `col`); rows below `row` are closed
    pub fn cell(&mut self, row: u32, col: u32) -> Result<CellWriter<'_>> {
        self.table().cell_mut(row, col)?;
        self.document.flush_ready_rows(self.index)?;
        Ok(CellWriter {
            document: &mut *self.document,
            table: self.index,
            row,
            col,
        })
    }

    pub fn set_cell_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        self.cell(row, col)?.set_value(value)?;
        Ok(())
    }

    pub fn set_cell_style(&mut self, row: u32, col: u32, style: Arc<TableCellStyle>) -> Result<()> {
        self.cell(row, col)?.set_style(style)?;
        Ok(())
    }

    /// Merge `row_span` x `col_span` cells starting at (`row`, `col`)
    pub fn set_cell_merge(&mut self, row: u32, col: u32, row_span: u32, col_span: u32) -> Result<()> {
        self.table().set_cell_merge(row, col, row_span, col_span)?;
        self.document.flush_ready_rows(self.index)
    }

    pub fn is_covered(&self, row: u32, col: u32) -> bool {
        self.document.tables[self.index].is_covered(row, col)
    }

    pub fn set_row_style(&mut self, row: u32, style: Arc<TableRowStyle>) -> Result<()> {
        self.document.styles.add_content_style(Arc::clone(&style))?;
        self.table().set_row_style(row, style)?;
        self.document.flush_ready_rows(self.index)
    }

    pub fn set_column_style(&mut self, col: u32, style: Arc<TableColumnStyle>) -> Result<()> {
        self.document.styles.add_content_style(Arc::clone(&style))?;
        self.table().set_column_style(col, style)
    }

    /// Style applied to the cells of `col` that have none of their own
    pub fn set_column_default_cell_style(
        &mut self,
        col: u32,
        style: Arc<TableCellStyle>,
    ) -> Result<()> {
        self.document.styles.add_content_style(Arc::clone(&style))?;
        self.table().set_column_default_cell_style(col, style)
    }

    pub fn set_style(&mut self, style: Arc<TableStyle>) -> Result<()> {
        self.document.styles.add_content_style(Arc::clone(&style))?;
        self.table().set_style(style)
    }

    /// Repeat the first `count` rows on every printed page
    pub fn set_header_rows(&mut self, count: u32) -> Result<()> {
        self.table().set_header_rows(count)
    }

    /// Repeat the first `count` columns on every printed page
    pub fn set_header_columns(&mut self, count: u32) -> Result<()> {
        self.table().set_header_columns(count)
    }

    pub fn set_print_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Result<()> {
        self.table().set_print_range(r1, c1, r2, c2)
    }

    pub fn set_protected(&mut self, protected: bool) -> Result<()> {
        self.table().set_protected(protected)
    }

    /// Add filter buttons on the first row of the range
    pub fn add_autofilter(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Result<()> {
        let capacity = self.document.tables[self.index].column_capacity();
        for col in [c1, c2] {
            if col >= capacity {
                return Err(OdsError::InvalidIndex {
                    what: "column",
                    index: col,
                    max: capacity - 1,
                });
            }
        }
        for row in [r1, r2] {
            if row >= MAX_ROWS {
                return Err(OdsError::InvalidIndex {
                    what: "row",
                    index: row,
                    max: MAX_ROWS - 1,
                });
            }
        }
        let filter = AutoFilter {
            table: self.name().to_string(),
            first_row: r1.min(r2),
            first_col: c1.min(c2),
            last_row: r1.max(r2),
            last_col: c1.max(c2),
        };
        self.document.autofilters.push(filter);
        Ok(())
    }

    /// Write the remaining rows and close the table
    pub fn close(self) -> Result<()> {
        let id = self.id();
        self.document.close_table(id)
    }
}

/// Mutable access to one cell
pub struct CellWriter<'a> {
    document: &'a mut OdsDocument,
    table: usize,
    row: u32,
    col: u32,
}

impl<'a> CellWriter<'a> {
    fn cell_style(&mut self) -> Result<Option<Arc<TableCellStyle>>> {
        let table = &mut self.document.tables[self.table];
        Ok(table.cell_mut(self.row, self.col)?.style().cloned())
    }

    /// Style the value is formatted with: the cell's, the column's or `Default`
    fn base_style(&mut self) -> Result<Arc<TableCellStyle>> {
        if let Some(style) = self.cell_style()? {
            return Ok(style);
        }
        let table = &self.document.tables[self.table];
        Ok(table
            .column_default_cell_style(self.col)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.document.default_cell_style)))
    }

    /// Set a typed value. Non-string values are formatted with the document's
    /// data style for their type.
    pub fn set_value(&mut self, value: impl Into<CellValue>) -> Result<&mut Self> {
        let value = value.into();
        value.ensure_finite()?;
        let base = self.base_style()?;
        let typed = self.document.typed_style(&base, &value)?;
        let cell = self.document.tables[self.table].cell_mut(self.row, self.col)?;
        cell.set_value(value);
        if let Some(style) = typed {
            cell.set_style(style);
        }
        Ok(self)
    }

    /// Convert `value` to `value_type` first
    pub fn set_value_as(
        &mut self,
        value: impl Into<CellValue>,
        value_type: ValueType,
    ) -> Result<&mut Self> {
        let value = value.into().coerce(value_type)?;
        self.set_value(value)
    }

    pub fn set_string(&mut self, value: &str) -> Result<&mut Self> {
        self.set_value(CellValue::from(value))
    }

    pub fn set_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.set_value(CellValue::Bool(value))
    }

    pub fn set_float(&mut self, value: f64) -> Result<&mut Self> {
        self.set_value(CellValue::Float(value))
    }

    pub fn set_percentage(&mut self, value: f64) -> Result<&mut Self> {
        self.set_value(CellValue::Percentage(value))
    }

    pub fn set_currency(&mut self, value: f64, currency: &str) -> Result<&mut Self> {
        self.set_value(CellValue::Currency {
            value,
            currency: currency.to_string(),
        })
    }

    /// An explicitly empty cell
    pub fn set_void(&mut self) -> Result<&mut Self> {
        self.set_value(CellValue::Void)
    }

    /// Style the cell. A typed value keeps its data style through a child of `style`.
    pub fn set_style(&mut self, style: Arc<TableCellStyle>) -> Result<&mut Self> {
        self.document.styles.add_content_style(Arc::clone(&style))?;
        let value = self.document.tables[self.table]
            .cell_mut(self.row, self.col)?
            .value()
            .clone();
        let typed = self.document.typed_style(&style, &value)?;
        let cell = self.document.tables[self.table].cell_mut(self.row, self.col)?;
        cell.set_style(typed.unwrap_or(style));
        Ok(self)
    }

    /// Formula such as `of:=SUM([.A1:.A3])`
    pub fn set_formula(&mut self, formula: &str) -> Result<&mut Self> {
        self.document.tables[self.table]
            .cell_mut(self.row, self.col)?
            .set_formula(formula);
        Ok(self)
    }

    /// Matrix formula whose result fills `rows` x `columns` cells from this one
    pub fn set_matrix_formula(&mut self, formula: &str, rows: u32, columns: u32) -> Result<&mut Self> {
        let table = &mut self.document.tables[self.table];
        let capacity = table.column_capacity();
        if rows == 0 || self.row.saturating_add(rows) > MAX_ROWS {
            return Err(OdsError::InvalidIndex {
                what: "row",
                index: self.row.saturating_add(rows.max(1) - 1),
                max: MAX_ROWS - 1,
            });
        }
        if columns == 0 || self.col.saturating_add(columns) > capacity {
            return Err(OdsError::InvalidIndex {
                what: "column",
                index: self.col.saturating_add(columns.max(1) - 1),
                max: capacity - 1,
            });
        }
        table
            .cell_mut(self.row, self.col)?
            .set_matrix_formula(formula, rows, columns);
        Ok(self)
    }

    /// Rich text (paragraphs, styled spans, links). The cell becomes a string cell.
    pub fn set_text(&mut self, text: Text) -> Result<&mut Self> {
        for style in text.text_styles() {
            self.document.styles.add_content_style(Arc::clone(style))?;
        }
        self.document.tables[self.table]
            .cell_mut(self.row, self.col)?
            .set_text(text);
        Ok(self)
    }

    /// Annotation shown when hovering the cell
    pub fn set_tooltip(&mut self, tooltip: impl Into<Tooltip>) -> Result<&mut Self> {
        self.document.tables[self.table]
            .cell_mut(self.row, self.col)?
            .set_tooltip(tooltip.into());
        Ok(self)
    }

    /// Format this cell's value with `data_style` instead of the document's
    /// data style for its type. The cell gets a child of its current style.
    pub fn set_data_style(&mut self, data_style: Arc<DataStyle>) -> Result<&mut Self> {
        let current = self.base_style()?;
        let parent = self
            .document
            .styles
            .child_parent(current.key())
            .cloned()
            .unwrap_or(current);
        let child = self
            .document
            .styles
            .add_child_cell_style(&parent, &data_style)?;
        self.document.tables[self.table]
            .cell_mut(self.row, self.col)?
            .set_style(child);
        Ok(self)
    }

    /// Merge this cell with the next `row_span - 1` rows and `col_span - 1` columns
    pub fn set_merge(&mut self, row_span: u32, col_span: u32) -> Result<&mut Self> {
        self.document.tables[self.table].set_cell_merge(self.row, self.col, row_span, col_span)?;
        Ok(self)
    }

    pub fn is_covered(&self) -> bool {
        self.document.tables[self.table].is_covered(self.row, self.col)
    }
}
