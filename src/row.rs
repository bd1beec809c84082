//! Rows and cells of the table model

use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use crate::style::{TableCellStyle, TableRowStyle};
use crate::text::{Text, Tooltip};
use crate::types::{format_date, format_duration, CellValue};
use std::io::Write;
use std::sync::Arc;

/// A cell of an open row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    value: CellValue,
    style: Option<Arc<TableCellStyle>>,
    formula: Option<String>,
    matrix_span: Option<(u32, u32)>,
    text: Option<Text>,
    tooltip: Option<Tooltip>,
    columns_spanned: u32,
    rows_spanned: u32,
    covered: bool,
}

impl Cell {
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn style(&self) -> Option<&Arc<TableCellStyle>> {
        self.style.as_ref()
    }

    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// `(rows, columns)` of the result of a matrix formula
    pub fn matrix_span(&self) -> Option<(u32, u32)> {
        self.matrix_span
    }

    pub fn text(&self) -> Option<&Text> {
        self.text.as_ref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn is_covered(&self) -> bool {
        self.covered
    }

    /// `(rows, columns)` spanned by this cell, `(1, 1)` when not merged
    pub fn span(&self) -> (u32, u32) {
        (self.rows_spanned.max(1), self.columns_spanned.max(1))
    }

    /// Anchor of a merged region
    pub fn is_spanning(&self) -> bool {
        self.rows_spanned > 1 || self.columns_spanned > 1
    }

    pub(crate) fn set_value(&mut self, value: CellValue) {
        self.value = value;
        self.text = None;
    }

    /// Rich text replaces the value; the cell is a string cell
    pub(crate) fn set_text(&mut self, text: Text) {
        self.value = CellValue::Empty;
        self.text = Some(text);
    }

    pub(crate) fn set_tooltip(&mut self, tooltip: Tooltip) {
        self.tooltip = Some(tooltip);
    }

    pub(crate) fn set_style(&mut self, style: Arc<TableCellStyle>) {
        self.style = Some(style);
    }

    pub(crate) fn set_formula(&mut self, formula: &str) {
        self.formula = Some(formula.to_string());
        self.matrix_span = None;
    }

    pub(crate) fn set_matrix_formula(&mut self, formula: &str, rows: u32, columns: u32) {
        self.formula = Some(formula.to_string());
        self.matrix_span = Some((rows, columns));
    }

    pub(crate) fn set_span(&mut self, rows: u32, columns: u32) {
        self.rows_spanned = rows;
        self.columns_spanned = columns;
    }

    pub(crate) fn set_covered(&mut self) {
        self.covered = true;
    }

    /// Nothing to write but an empty `table:table-cell`
    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
            && self.style.is_none()
            && self.formula.is_none()
            && self.text.is_none()
            && self.tooltip.is_none()
            && !self.covered
            && !self.is_spanning()
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        let element = if self.covered {
            "table:covered-table-cell"
        } else {
            "table:table-cell"
        };
        xml.start_element(element)?;
        if let Some(style) = &self.style {
            xml.attribute("table:style-name", style.name())?;
        }
        if self.text.is_some() {
            xml.attribute_raw("office:value-type", "string")?;
        } else if let Some(value_type) = self.value.value_type() {
            if let Some(attribute) = value_type.value_attribute() {
                xml.attribute_raw("office:value-type", value_type.as_str())?;
                self.append_value_xml(xml, attribute)?;
            }
        }
        if let Some(formula) = &self.formula {
            xml.attribute("table:formula", formula)?;
            if let Some((rows, columns)) = self.matrix_span {
                xml.attribute_int("table:number-matrix-columns-spanned", columns as i64)?;
                xml.attribute_int("table:number-matrix-rows-spanned", rows as i64)?;
            }
        }
        if self.columns_spanned > 1 {
            xml.attribute_int("table:number-columns-spanned", self.columns_spanned as i64)?;
        }
        if self.rows_spanned > 1 {
            xml.attribute_int("table:number-rows-spanned", self.rows_spanned as i64)?;
        }
        if self.text.is_none() && self.tooltip.is_none() {
            return xml.end_empty();
        }
        xml.close_start_tag()?;
        if let Some(tooltip) = &self.tooltip {
            tooltip.append_xml(xml)?;
        }
        if let Some(text) = &self.text {
            text.append_xml(xml)?;
        }
        xml.end_element(element)
    }

    fn append_value_xml<W: Write>(&self, xml: &mut XmlWriter<W>, attribute: &str) -> Result<()> {
        match &self.value {
            CellValue::Bool(b) => xml.attribute_bool(attribute, *b),
            CellValue::Int(i) => xml.attribute_int(attribute, *i),
            CellValue::Float(f) | CellValue::Percentage(f) => xml.attribute_f64(attribute, *f),
            CellValue::Currency { value, currency } => {
                xml.attribute_f64(attribute, *value)?;
                xml.attribute("office:currency", currency)
            }
            CellValue::Date(d) => xml.attribute_raw(attribute, &format_date(d)),
            CellValue::Time(t) => xml.attribute_raw(attribute, &format_duration(t)),
            CellValue::String(s) => xml.attribute(attribute, s),
            CellValue::Empty | CellValue::Void => Ok(()),
        }
    }
}

/// A row: sparse cells plus an optional row style
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: u32,
    style: Option<Arc<TableRowStyle>>,
    cells: Vec<Option<Cell>>,
}

impl Row {
    pub fn new(index: u32) -> Self {
        Row {
            index,
            style: None,
            cells: Vec::new(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn style(&self) -> Option<&Arc<TableRowStyle>> {
        self.style.as_ref()
    }

    pub(crate) fn set_style(&mut self, style: Arc<TableRowStyle>) {
        self.style = Some(style);
    }

    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.get(col as usize).and_then(Option::as_ref)
    }

    /// Materialize the cell at `col`
    pub(crate) fn cell_mut(&mut self, col: u32) -> &mut Cell {
        let col = col as usize;
        if self.cells.len() <= col {
            self.cells.resize_with(col + 1, || None);
        }
        self.cells[col].get_or_insert_with(Cell::default)
    }

    /// Number of cell slots up to the last touched column
    pub fn width(&self) -> u32 {
        self.cells.len() as u32
    }

    fn style_name(&self) -> &str {
        self.style
            .as_ref()
            .map_or(TableRowStyle::DEFAULT_NAME, |s| s.name())
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("table:table-row")?;
        xml.attribute("table:style-name", self.style_name())?;
        xml.close_start_tag()?;

        let last = self
            .cells
            .iter()
            .rposition(|cell| cell.as_ref().is_some_and(|c| !c.is_blank()));
        match last {
            None => xml.empty_element("table:table-cell")?,
            Some(last) => {
                let mut blanks = 0u32;
                for cell in &self.cells[..=last] {
                    match cell {
                        Some(cell) if !cell.is_blank() => {
                            append_blank_cells_xml(xml, blanks)?;
                            blanks = 0;
                            cell.append_xml(xml)?;
                        }
                        _ => blanks += 1,
                    }
                }
            }
        }

        xml.end_element("table:table-row")
    }
}

fn append_blank_cells_xml<W: Write>(xml: &mut XmlWriter<W>, count: u32) -> Result<()> {
    match count {
        0 => Ok(()),
        1 => xml.empty_element("table:table-cell"),
        n => {
            xml.start_element("table:table-cell")?;
            xml.attribute_int("table:number-columns-repeated", n as i64)?;
            xml.end_empty()
        }
    }
}

/// `count` rows that were never touched, as one repeated row
pub fn append_empty_rows_xml<W: Write>(xml: &mut XmlWriter<W>, count: u32) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    xml.start_element("table:table-row")?;
    if count > 1 {
        xml.attribute_int("table:number-rows-repeated", count as i64)?;
    }
    xml.attribute("table:style-name", TableRowStyle::DEFAULT_NAME)?;
    xml.close_start_tag()?;
    xml.empty_element("table:table-cell")?;
    xml.end_element("table:table-row")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn render_row(row: &Row) -> String {
        let mut output = Vec::new();
        let mut xml = XmlWriter::new(&mut output);
        row.append_xml(&mut xml).unwrap();
        xml.flush().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_empty_row() {
        let row = Row::new(3);
        assert_eq!(
            render_row(&row),
            "<table:table-row table:style-name=\"ro1\"><table:table-cell/></table:table-row>"
        );
    }

    #[test]
    fn test_blank_cells_are_collapsed() {
        let mut row = Row::new(0);
        row.cell_mut(0).set_value(CellValue::from("a"));
        row.cell_mut(2); // touched but blank
        row.cell_mut(4).set_value(CellValue::Int(7));
        row.cell_mut(9); // trailing blank

        assert_eq!(
            render_row(&row),
            "<table:table-row table:style-name=\"ro1\">\
             <table:table-cell office:value-type=\"string\" office:string-value=\"a\"/>\
             <table:table-cell table:number-columns-repeated=\"3\"/>\
             <table:table-cell office:value-type=\"float\" office:value=\"7\"/>\
             </table:table-row>"
        );
    }

    #[test]
    fn test_typed_values() {
        let mut row = Row::new(0);
        row.set_style(Arc::new(TableRowStyle::new("ro2").with_height("1cm")));
        row.cell_mut(0).set_value(CellValue::Bool(true));
        row.cell_mut(1).set_value(CellValue::Percentage(0.5));
        row.cell_mut(2).set_value(CellValue::Currency {
            value: 10.25,
            currency: "USD".to_string(),
        });
        row.cell_mut(3).set_value(CellValue::Date(
            NaiveDate::from_ymd_opt(2020, 5, 17)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ));
        row.cell_mut(4).set_value(CellValue::Void);
        row.cell_mut(5).set_value(CellValue::from("x<y"));

        let xml = render_row(&row);
        assert!(xml.starts_with("<table:table-row table:style-name=\"ro2\">"));
        assert!(xml.contains(
            "<table:table-cell office:value-type=\"boolean\" office:boolean-value=\"true\"/>"
        ));
        assert!(xml.contains("office:value-type=\"percentage\" office:value=\"0.5\""));
        assert!(xml.contains(
            "office:value-type=\"currency\" office:value=\"10.25\" office:currency=\"USD\""
        ));
        assert!(xml.contains("office:date-value=\"2020-05-17T12:00:00.000\""));
        assert!(xml.contains("office:string-value=\"x&lt;y\""));
        // explicit void is written, not collapsed
        assert!(xml.contains("<table:table-cell/><table:table-cell office:value-type=\"string\""));
    }

    #[test]
    fn test_covered_and_spanned_cells() {
        let mut row = Row::new(0);
        let anchor = row.cell_mut(0);
        anchor.set_value(CellValue::from("merged"));
        anchor.set_span(2, 3);
        row.cell_mut(1).set_covered();
        row.cell_mut(2).set_covered();

        assert_eq!(row.cell(0).unwrap().span(), (2, 3));
        assert!(row.cell(1).unwrap().is_covered());
        assert!(!row.cell(1).unwrap().is_blank());
        assert_eq!(
            render_row(&row),
            "<table:table-row table:style-name=\"ro1\">\
             <table:table-cell office:value-type=\"string\" office:string-value=\"merged\" \
             table:number-columns-spanned=\"3\" table:number-rows-spanned=\"2\"/>\
             <table:covered-table-cell/><table:covered-table-cell/>\
             </table:table-row>"
        );
    }

    #[test]
    fn test_formula_and_style() {
        let mut row = Row::new(0);
        let cell = row.cell_mut(1);
        cell.set_formula("of:=SUM([.A1:.A3])");
        cell.set_style(TableCellStyle::builder("bold").build());

        assert_eq!(
            render_row(&row),
            "<table:table-row table:style-name=\"ro1\"><table:table-cell/>\
             <table:table-cell table:style-name=\"bold\" table:formula=\"of:=SUM([.A1:.A3])\"/>\
             </table:table-row>"
        );
    }

    #[test]
    fn test_text_tooltip_and_matrix_formula() {
        let mut row = Row::new(0);
        let text = Text::builder()
            .span("see ")
            .link("site", "https://example.org")
            .build();
        row.cell_mut(0).set_value(CellValue::from("replaced"));
        row.cell_mut(0).set_text(text);
        row.cell_mut(1).set_tooltip(Tooltip::new("a note"));
        row.cell_mut(2)
            .set_matrix_formula("of:=MMULT([.A1:.B2];[.C1:.D2])", 2, 2);
        row.cell_mut(3).set_covered();
        row.cell_mut(3).set_tooltip(Tooltip::new("hidden"));

        assert!(row.cell(0).unwrap().value().is_empty());
        assert_eq!(row.cell(2).unwrap().matrix_span(), Some((2, 2)));
        assert_eq!(
            render_row(&row),
            "<table:table-row table:style-name=\"ro1\">\
             <table:table-cell office:value-type=\"string\"><text:p>see \
             <text:a xlink:href=\"https://example.org\" xlink:type=\"simple\">site</text:a>\
             </text:p></table:table-cell>\
             <table:table-cell><office:annotation><text:p>a note</text:p></office:annotation></table:table-cell>\
             <table:table-cell table:formula=\"of:=MMULT([.A1:.B2];[.C1:.D2])\" \
             table:number-matrix-columns-spanned=\"2\" table:number-matrix-rows-spanned=\"2\"/>\
             <table:covered-table-cell><office:annotation><text:p>hidden</text:p></office:annotation>\
             </table:covered-table-cell>\
             </table:table-row>"
        );

        // a plain value drops the rich text
        row.cell_mut(0).set_value(CellValue::Int(1));
        assert!(row.cell(0).unwrap().text().is_none());
    }

    #[test]
    fn test_empty_rows() {
        let mut output = Vec::new();
        let mut xml = XmlWriter::new(&mut output);
        append_empty_rows_xml(&mut xml, 0).unwrap();
        append_empty_rows_xml(&mut xml, 1).unwrap();
        append_empty_rows_xml(&mut xml, 5).unwrap();
        xml.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "<table:table-row table:style-name=\"ro1\"><table:table-cell/></table:table-row>\
             <table:table-row table:number-rows-repeated=\"5\" table:style-name=\"ro1\"><table:table-cell/></table:table-row>"
        );
    }
}
