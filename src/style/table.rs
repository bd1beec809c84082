//! Table, column and row styles. These are always automatic styles.

use super::{StyleFamily, StyleKey};
use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use std::io::Write;
use std::sync::Arc;

/// Style of a table column
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumnStyle {
    key: StyleKey,
    width: Option<String>,
}

impl TableColumnStyle {
    pub const DEFAULT_NAME: &'static str = "co1";

    /// Column with optimal width
    pub fn new(name: &str) -> Self {
        TableColumnStyle {
            key: StyleKey::new(StyleFamily::TableColumn, name),
            width: None,
        }
    }

    pub fn default_style() -> Arc<TableColumnStyle> {
        Arc::new(Self::new(Self::DEFAULT_NAME))
    }

    pub fn with_width(mut self, width: &str) -> Self {
        self.width = Some(width.to_string());
        self
    }

    pub fn key(&self) -> &StyleKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:style")?;
        xml.attribute("style:name", self.name())?;
        xml.attribute_raw("style:family", "table-column")?;
        xml.close_start_tag()?;
        xml.start_element("style:table-column-properties")?;
        xml.attribute_raw("fo:break-before", "auto")?;
        match &self.width {
            Some(width) => xml.attribute("style:column-width", width)?,
            None => xml.attribute_raw("style:use-optimal-column-width", "true")?,
        }
        xml.end_empty()?;
        xml.end_element("style:style")
    }
}

/// Style of a table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRowStyle {
    key: StyleKey,
    height: Option<String>,
}

impl TableRowStyle {
    pub const DEFAULT_NAME: &'static str = "ro1";

    /// Row with optimal height
    pub fn new(name: &str) -> Self {
        TableRowStyle {
            key: StyleKey::new(StyleFamily::TableRow, name),
            height: None,
        }
    }

    pub fn default_style() -> Arc<TableRowStyle> {
        Arc::new(Self::new(Self::DEFAULT_NAME))
    }

    pub fn with_height(mut self, height: &str) -> Self {
        self.height = Some(height.to_string());
        self
    }

    pub fn key(&self) -> &StyleKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:style")?;
        xml.attribute("style:name", self.name())?;
        xml.attribute_raw("style:family", "table-row")?;
        xml.close_start_tag()?;
        xml.start_element("style:table-row-properties")?;
        if let Some(height) = &self.height {
            xml.attribute("style:row-height", height)?;
        }
        xml.attribute_raw("fo:break-before", "auto")?;
        xml.attribute_bool("style:use-optimal-row-height", self.height.is_none())?;
        xml.end_empty()?;
        xml.end_element("style:style")
    }
}

/// Style of a table: links the table to a master page
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    key: StyleKey,
    master_page_name: String,
}

impl TableStyle {
    pub const DEFAULT_NAME: &'static str = "ta1";

    pub fn new(name: &str, master_page_name: &str) -> Self {
        TableStyle {
            key: StyleKey::new(StyleFamily::Table, name),
            master_page_name: master_page_name.to_string(),
        }
    }

    pub fn key(&self) -> &StyleKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn master_page_name(&self) -> &str {
        &self.master_page_name
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:style")?;
        xml.attribute("style:name", self.name())?;
        xml.attribute_raw("style:family", "table")?;
        xml.attribute("style:master-page-name", &self.master_page_name)?;
        xml.close_start_tag()?;
        xml.start_element("style:table-properties")?;
        xml.attribute_raw("table:display", "true")?;
        xml.attribute_raw("style:writing-mode", "lr-tb")?;
        xml.end_empty()?;
        xml.end_element("style:style")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut XmlWriter<&mut Vec<u8>>) -> Result<()>,
    {
        let mut output = Vec::new();
        {
            let mut xml = XmlWriter::new(&mut output);
            f(&mut xml).unwrap();
            xml.flush().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_column_style_xml() {
        let style = TableColumnStyle::new("co2").with_width("5cm");
        assert_eq!(
            render(|xml| style.append_xml(xml)),
            "<style:style style:name=\"co2\" style:family=\"table-column\"><style:table-column-properties fo:break-before=\"auto\" style:column-width=\"5cm\"/></style:style>"
        );
        let default = TableColumnStyle::default_style();
        assert!(render(|xml| default.append_xml(xml))
            .contains("style:use-optimal-column-width=\"true\""));
    }

    #[test]
    fn test_row_style_xml() {
        let style = TableRowStyle::default_style();
        assert_eq!(
            render(|xml| style.append_xml(xml)),
            "<style:style style:name=\"ro1\" style:family=\"table-row\"><style:table-row-properties fo:break-before=\"auto\" style:use-optimal-row-height=\"true\"/></style:style>"
        );
    }

    #[test]
    fn test_table_style_xml() {
        let style = TableStyle::new("ta1", "DefaultMasterPage");
        let xml = render(|xml| style.append_xml(xml));
        assert!(xml.contains("style:master-page-name=\"DefaultMasterPage\""));
        assert!(xml.contains("table:display=\"true\""));
    }
}
