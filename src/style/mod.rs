//! Style value objects
//!
//! Styles are immutable once built and shared through [`Arc`]. Every style has a
//! [`StyleKey`] (family + name) that the [`StylesContainer`](crate::StylesContainer)
//! uses to deduplicate registrations.

pub mod cell;
pub mod data;
pub mod page;
pub mod table;
pub mod text;

use crate::error::{OdsError, Result};
use crate::fast_writer::xml_writer::XmlWriter;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

pub use cell::{Border, Borders, CellAlign, TableCellStyle, TableCellStyleBuilder, VerticalAlign};
pub use data::{DataStyle, DataStyleKind, DataStyles};
pub use page::{
    MasterPageStyle, Orientation, PageLayoutStyle, PageSection, PageStyle, PageStyleBuilder,
};
pub use table::{TableColumnStyle, TableRowStyle, TableStyle};
pub use text::{TextStyle, TextStyleBuilder};

/// ODF style families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFamily {
    Paragraph,
    Table,
    TableCell,
    TableColumn,
    TableRow,
    Text,
    Graphic,
    DrawFillGradient,
    DrawFillHatch,
    DrawFillBitmap,
}

impl StyleFamily {
    /// Value of the `style:family` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleFamily::Paragraph => "paragraph",
            StyleFamily::Table => "table",
            StyleFamily::TableCell => "table-cell",
            StyleFamily::TableColumn => "table-column",
            StyleFamily::TableRow => "table-row",
            StyleFamily::Text => "text",
            StyleFamily::Graphic => "graphic",
            StyleFamily::DrawFillGradient => "draw-fill-gradient",
            StyleFamily::DrawFillHatch => "draw-fill-hatch",
            StyleFamily::DrawFillBitmap => "draw-fill-bitmap",
        }
    }
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplication identity of a style: `family@name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleKey {
    family: StyleFamily,
    name: String,
}

impl StyleKey {
    pub fn new(family: StyleFamily, name: impl Into<String>) -> Self {
        StyleKey {
            family,
            name: name.into(),
        }
    }

    pub fn family(&self) -> StyleFamily {
        self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.family, self.name)
    }
}

/// Check that `name` can be used as a `style:name` (an XML NCName subset)
pub fn validate_style_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(OdsError::InvalidStyleName(name.to_string()))
    }
}

/// A registrable style, one variant per modelled family
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectStyle {
    TableCell(Arc<TableCellStyle>),
    TableColumn(Arc<TableColumnStyle>),
    TableRow(Arc<TableRowStyle>),
    Table(Arc<TableStyle>),
    Text(Arc<TextStyle>),
}

impl ObjectStyle {
    pub fn key(&self) -> &StyleKey {
        match self {
            ObjectStyle::TableCell(s) => s.key(),
            ObjectStyle::TableColumn(s) => s.key(),
            ObjectStyle::TableRow(s) => s.key(),
            ObjectStyle::Table(s) => s.key(),
            ObjectStyle::Text(s) => s.key(),
        }
    }

    pub fn name(&self) -> &str {
        self.key().name()
    }

    pub fn family(&self) -> StyleFamily {
        self.key().family()
    }

    /// Hidden styles are automatic styles; visible ones are common styles
    pub fn is_hidden(&self) -> bool {
        match self {
            ObjectStyle::TableCell(s) => s.is_hidden(),
            ObjectStyle::TableColumn(_) | ObjectStyle::TableRow(_) | ObjectStyle::Table(_) => {
                true
            }
            ObjectStyle::Text(s) => s.is_hidden(),
        }
    }

    /// Font names the style needs declared in `office:font-face-decls`
    pub fn font_name(&self) -> Option<&str> {
        match self {
            ObjectStyle::TableCell(s) => s.font_name(),
            ObjectStyle::Text(s) => s.font_name(),
            _ => None,
        }
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        match self {
            ObjectStyle::TableCell(s) => s.append_xml(xml),
            ObjectStyle::TableColumn(s) => s.append_xml(xml),
            ObjectStyle::TableRow(s) => s.append_xml(xml),
            ObjectStyle::Table(s) => s.append_xml(xml),
            ObjectStyle::Text(s) => s.append_xml(xml),
        }
    }
}

impl From<Arc<TableCellStyle>> for ObjectStyle {
    fn from(style: Arc<TableCellStyle>) -> Self {
        ObjectStyle::TableCell(style)
    }
}

impl From<Arc<TableColumnStyle>> for ObjectStyle {
    fn from(style: Arc<TableColumnStyle>) -> Self {
        ObjectStyle::TableColumn(style)
    }
}

impl From<Arc<TableRowStyle>> for ObjectStyle {
    fn from(style: Arc<TableRowStyle>) -> Self {
        ObjectStyle::TableRow(style)
    }
}

impl From<Arc<TableStyle>> for ObjectStyle {
    fn from(style: Arc<TableStyle>) -> Self {
        ObjectStyle::Table(style)
    }
}

impl From<Arc<TextStyle>> for ObjectStyle {
    fn from(style: Arc<TextStyle>) -> Self {
        ObjectStyle::Text(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_key_display() {
        let key = StyleKey::new(StyleFamily::TableCell, "Default");
        assert_eq!(key.to_string(), "table-cell@Default");
        assert_eq!(
            StyleKey::new(StyleFamily::DrawFillHatch, "h1").to_string(),
            "draw-fill-hatch@h1"
        );
    }

    #[test]
    fn test_validate_style_name() {
        assert!(validate_style_name("Default").is_ok());
        assert!(validate_style_name("_x-1.2").is_ok());
        assert!(validate_style_name("Default-_-boolean-data").is_ok());
        assert!(validate_style_name("").is_err());
        assert!(validate_style_name("1abc").is_err());
        assert!(validate_style_name("a b").is_err());
        assert!(validate_style_name("a\"b").is_err());
    }

    #[test]
    fn test_object_style_dispatch() {
        let style = ObjectStyle::from(Arc::new(TableRowStyle::new("ro2").with_height("1cm")));
        assert_eq!(style.family(), StyleFamily::TableRow);
        assert_eq!(style.name(), "ro2");
        assert!(style.is_hidden());
        assert_eq!(style.key().to_string(), "table-row@ro2");
    }
}
