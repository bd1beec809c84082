//! Table model: column definitions, the open row window and merges
//!
//! Rows are produced in increasing order. Requesting row `R` closes every row
//! below `R`; closed rows are moved out of the table into row batches and are
//! never touched again.

use crate::error::{OdsError, Result};
use crate::fast_writer::flusher::{ColumnRun, RowBatch, TablePostamble, TablePreamble};
use crate::row::{Cell, Row};
use crate::style::{TableCellStyle, TableColumnStyle, TableRowStyle, TableStyle};
use crate::types::range_address;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Maximum number of rows in a table
pub const MAX_ROWS: u32 = 1_048_576;

/// Default number of declared columns
pub const DEFAULT_COLUMN_CAPACITY: u32 = 1024;

/// Lifecycle of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Rows and columns may still change
    Building,
    /// Column definitions written
    PreambleFlushed,
    /// At least one row batch written
    RowsFlushing,
    /// Postamble written
    Closed,
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableState::Building => "BUILDING",
            TableState::PreambleFlushed => "PREAMBLE_FLUSHED",
            TableState::RowsFlushing => "ROWS_FLUSHING",
            TableState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Explicit column definition
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    style: Arc<TableColumnStyle>,
    default_cell_style: Option<Arc<TableCellStyle>>,
}

impl Column {
    fn style_name(&self) -> &str {
        self.style.name()
    }

    fn default_cell_style_name(&self) -> &str {
        self.default_cell_style
            .as_ref()
            .map_or(TableCellStyle::DEFAULT_NAME, |s| s.name())
    }
}

#[derive(Debug)]
pub struct Table {
    name: String,
    style: Arc<TableStyle>,
    columns: Vec<Option<Column>>,
    column_capacity: u32,
    header_rows: u32,
    header_columns: u32,
    print_range: Option<(u32, u32, u32, u32)>,
    protected: bool,
    open_rows: BTreeMap<u32, Row>,
    closed_rows: Vec<Row>,
    cursor: u32,
    next_flushed_row: u32,
    state: TableState,
}

impl Table {
    pub fn new(name: &str, style: Arc<TableStyle>, column_capacity: u32) -> Self {
        Table {
            name: name.to_string(),
            style,
            columns: Vec::new(),
            column_capacity,
            header_rows: 0,
            header_columns: 0,
            print_range: None,
            protected: false,
            open_rows: BTreeMap::new(),
            closed_rows: Vec::new(),
            cursor: 0,
            next_flushed_row: 0,
            state: TableState::Building,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn column_capacity(&self) -> u32 {
        self.column_capacity
    }

    /// Lowest row index that can still be modified
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    fn state_error(&self) -> OdsError {
        OdsError::TableStateError {
            table: self.name.clone(),
            state: self.state.to_string(),
        }
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state == TableState::Building {
            Ok(())
        } else {
            Err(self.state_error())
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == TableState::Closed {
            Err(OdsError::TableClosed(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn check_row(&self, row: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(OdsError::InvalidIndex {
                what: "row",
                index: row,
                max: MAX_ROWS - 1,
            });
        }
        if row < self.cursor {
            return Err(OdsError::RowClosed {
                row,
                cursor: self.cursor,
            });
        }
        Ok(())
    }

    fn check_col(&self, col: u32) -> Result<()> {
        if col >= self.column_capacity {
            return Err(OdsError::InvalidIndex {
                what: "column",
                index: col,
                max: self.column_capacity - 1,
            });
        }
        Ok(())
    }

    pub fn set_style(&mut self, style: Arc<TableStyle>) -> Result<()> {
        self.ensure_building()?;
        self.style = style;
        Ok(())
    }

    pub fn set_column_style(&mut self, col: u32, style: Arc<TableColumnStyle>) -> Result<()> {
        self.ensure_building()?;
        self.check_col(col)?;
        self.column_slot(col).style = style;
        Ok(())
    }

    pub fn set_column_default_cell_style(
        &mut self,
        col: u32,
        style: Arc<TableCellStyle>,
    ) -> Result<()> {
        self.ensure_building()?;
        self.check_col(col)?;
        self.column_slot(col).default_cell_style = Some(style);
        Ok(())
    }

    fn column_slot(&mut self, col: u32) -> &mut Column {
        let col = col as usize;
        if self.columns.len() <= col {
            self.columns.resize_with(col + 1, || None);
        }
        self.columns[col].get_or_insert_with(|| Column {
            style: TableColumnStyle::default_style(),
            default_cell_style: None,
        })
    }

    /// Default cell style of a column, used when a cell has no style of its own
    pub fn column_default_cell_style(&self, col: u32) -> Option<&Arc<TableCellStyle>> {
        self.columns
            .get(col as usize)
            .and_then(Option::as_ref)
            .and_then(|c| c.default_cell_style.as_ref())
    }

    pub fn set_header_rows(&mut self, count: u32) -> Result<()> {
        self.ensure_building()?;
        if count > MAX_ROWS {
            return Err(OdsError::InvalidIndex {
                what: "row",
                index: count,
                max: MAX_ROWS,
            });
        }
        self.header_rows = count;
        Ok(())
    }

    pub fn set_header_columns(&mut self, count: u32) -> Result<()> {
        self.ensure_building()?;
        self.check_col(count.saturating_sub(1))?;
        self.header_columns = count;
        Ok(())
    }

    pub fn set_print_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Result<()> {
        self.ensure_building()?;
        for col in [c1, c2] {
            self.check_col(col)?;
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
        self.print_range = Some((r1.min(r2), c1.min(c2), r1.max(r2), c1.max(c2)));
        Ok(())
    }

    pub fn set_protected(&mut self, protected: bool) -> Result<()> {
        self.ensure_building()?;
        self.protected = protected;
        Ok(())
    }

    /// Move the cursor to `row`, closing every row below it
    pub fn row_mut(&mut self, row: u32) -> Result<&mut Row> {
        self.ensure_open()?;
        self.check_row(row)?;
        if row > self.cursor {
            let still_open = self.open_rows.split_off(&row);
            let closed = std::mem::replace(&mut self.open_rows, still_open);
            self.closed_rows.extend(closed.into_values());
            self.cursor = row;
        }
        Ok(self.open_rows.entry(row).or_insert_with(|| Row::new(row)))
    }

    /// Row at or after the cursor, without moving the cursor
    fn row_ahead_mut(&mut self, row: u32) -> &mut Row {
        self.open_rows.entry(row).or_insert_with(|| Row::new(row))
    }

    pub fn set_row_style(&mut self, row: u32, style: Arc<TableRowStyle>) -> Result<()> {
        self.row_mut(row)?.set_style(style);
        Ok(())
    }

    /// Materialize the cell at (`row`, `col`)
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Result<&mut Cell> {
        self.check_col(col)?;
        Ok(self.row_mut(row)?.cell_mut(col))
    }

    /// Cell of an open row
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.open_rows.get(&row).and_then(|r| r.cell(col))
    }

    pub fn is_covered(&self, row: u32, col: u32) -> bool {
        self.cell(row, col).is_some_and(Cell::is_covered)
    }

    /// Merge `row_span` x `col_span` cells from (`row`, `col`)
    ///
    /// The whole region is checked before anything changes: a region that
    /// touches an already merged cell is rejected.
    pub fn set_cell_merge(&mut self, row: u32, col: u32, row_span: u32, col_span: u32) -> Result<()> {
        self.ensure_open()?;
        if row_span == 0 || col_span == 0 {
            return Err(OdsError::InvalidIndex {
                what: "span",
                index: 0,
                max: 0,
            });
        }
        self.check_row(row)?;
        self.check_row(row + (row_span - 1).min(MAX_ROWS))?;
        self.check_col(col)?;
        self.check_col(col.saturating_add(col_span - 1))?;
        if row_span == 1 && col_span == 1 {
            return Ok(());
        }

        let last_row = row + row_span - 1;
        let last_col = col + col_span - 1;
        for (&r, open_row) in self.open_rows.range(row..=last_row) {
            for c in col..=last_col {
                if let Some(cell) = open_row.cell(c) {
                    if cell.is_covered() || cell.is_spanning() {
                        return Err(OdsError::OverlappingMerge { row: r, col: c });
                    }
                }
            }
        }

        self.row_mut(row)?.cell_mut(col).set_span(row_span, col_span);
        for r in row..=last_row {
            let target = self.row_ahead_mut(r);
            for c in col..=last_col {
                if r != row || c != col {
                    target.cell_mut(c).set_covered();
                }
            }
        }
        Ok(())
    }

    /// Number of closed rows waiting to be flushed
    pub fn closed_row_count(&self) -> usize {
        self.closed_rows.len()
    }

    /// Close every open row (end of table)
    pub fn close_all_rows(&mut self) {
        let open = std::mem::take(&mut self.open_rows);
        if let Some(&last) = open.keys().next_back() {
            self.cursor = last + 1;
        }
        self.closed_rows.extend(open.into_values());
    }

    /// Column definitions, with runs of equal columns merged
    pub fn column_runs(&self) -> (Vec<ColumnRun>, Vec<ColumnRun>) {
        let header_end = self.header_columns.min(self.column_capacity);
        (
            self.runs(0, header_end),
            self.runs(header_end, self.column_capacity),
        )
    }

    fn runs(&self, from: u32, to: u32) -> Vec<ColumnRun> {
        let mut runs: Vec<ColumnRun> = Vec::new();
        let mut push = |style_name: &str, default_cell_style_name: &str, count: u32| {
            match runs.last_mut() {
                Some(last)
                    if last.style_name == style_name
                        && last.default_cell_style_name == default_cell_style_name =>
                {
                    last.count += count;
                }
                _ => runs.push(ColumnRun {
                    style_name: style_name.to_string(),
                    default_cell_style_name: default_cell_style_name.to_string(),
                    count,
                }),
            }
        };

        let explicit_end = to.min(self.columns.len() as u32);
        for col in from..explicit_end {
            match &self.columns[col as usize] {
                Some(column) => push(column.style_name(), column.default_cell_style_name(), 1),
                None => push(TableColumnStyle::DEFAULT_NAME, TableCellStyle::DEFAULT_NAME, 1),
            }
        }
        let trailing_start = explicit_end.max(from);
        if to > trailing_start {
            push(
                TableColumnStyle::DEFAULT_NAME,
                TableCellStyle::DEFAULT_NAME,
                to - trailing_start,
            );
        }
        runs
    }

    /// Snapshot of the table header, locks the column definitions
    pub fn take_preamble(&mut self) -> Result<TablePreamble> {
        self.ensure_building()?;
        let (header_columns, columns) = self.column_runs();
        let print_range = self
            .print_range
            .map(|(r1, c1, r2, c2)| range_address(&self.name, r1, c1, r2, c2));
        self.state = TableState::PreambleFlushed;
        Ok(TablePreamble {
            name: self.name.clone(),
            style_name: self.style.name().to_string(),
            print_range,
            protected: self.protected,
            header_columns,
            columns,
        })
    }

    /// Move the closed rows out of the table
    pub fn take_row_batch(&mut self) -> Result<RowBatch> {
        if self.state != TableState::PreambleFlushed && self.state != TableState::RowsFlushing {
            return Err(self.state_error());
        }
        let rows = std::mem::take(&mut self.closed_rows);
        let start_index = self.next_flushed_row;
        if let Some(last) = rows.last() {
            self.next_flushed_row = last.index() + 1;
        }
        self.state = TableState::RowsFlushing;
        Ok(RowBatch {
            start_index,
            header_rows: self.header_rows,
            rows,
        })
    }

    /// Finish the table; every row must have been taken
    pub fn take_postamble(&mut self) -> Result<TablePostamble> {
        if self.state == TableState::Building || self.state == TableState::Closed {
            return Err(self.state_error());
        }
        if !self.open_rows.is_empty() || !self.closed_rows.is_empty() {
            return Err(self.state_error());
        }
        self.state = TableState::Closed;
        Ok(TablePostamble {
            next_index: self.next_flushed_row,
            header_rows: self.header_rows,
        })
    }
}
