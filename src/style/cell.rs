//! Table cell styles

use super::{DataStyle, StyleFamily, StyleKey};
use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use std::io::Write;
use std::sync::Arc;

/// Horizontal alignment (`fo:text-align`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlign {
    Start,
    Center,
    End,
    Justify,
}

impl CellAlign {
    fn as_str(&self) -> &'static str {
        match self {
            CellAlign::Start => "start",
            CellAlign::Center => "center",
            CellAlign::End => "end",
            CellAlign::Justify => "justify",
        }
    }
}

/// Vertical alignment (`style:vertical-align`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    fn as_str(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

/// One border line, e.g. `0.06pt solid #000000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub width: String,
    pub line_style: String,
    pub color: String,
}

impl Border {
    pub fn new(width: &str, line_style: &str, color: &str) -> Self {
        Border {
            width: width.to_string(),
            line_style: line_style.to_string(),
            color: color.to_string(),
        }
    }

    /// Thin black solid line
    pub fn thin() -> Self {
        Border::new("0.06pt", "solid", "#000000")
    }

    fn to_attribute_value(&self) -> String {
        format!("{} {} {}", self.width, self.line_style, self.color)
    }
}

/// Four borders, rendered as grouped attributes on the cell properties element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Borders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
}

impl Borders {
    pub fn all(border: Border) -> Self {
        Borders {
            top: Some(border.clone()),
            bottom: Some(border.clone()),
            left: Some(border.clone()),
            right: Some(border),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }

    /// `fo:border` when the four sides agree, `fo:border-*` otherwise
    pub fn append_xml_attributes<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        if let Some(top) = &self.top {
            if self.bottom.as_ref() == Some(top)
                && self.left.as_ref() == Some(top)
                && self.right.as_ref() == Some(top)
            {
                return xml.attribute("fo:border", &top.to_attribute_value());
            }
        }
        let sides = [
            ("fo:border-top", &self.top),
            ("fo:border-bottom", &self.bottom),
            ("fo:border-left", &self.left),
            ("fo:border-right", &self.right),
        ];
        for (name, border) in sides {
            if let Some(border) = border {
                xml.attribute(name, &border.to_attribute_value())?;
            }
        }
        Ok(())
    }
}

/// Style of a table cell (`style:family="table-cell"`)
#[derive(Debug, Clone, PartialEq)]
pub struct TableCellStyle {
    key: StyleKey,
    hidden: bool,
    parent_name: Option<String>,
    data_style_name: Option<String>,
    background_color: Option<String>,
    font_bold: bool,
    font_italic: bool,
    font_color: Option<String>,
    font_name: Option<String>,
    font_size: Option<String>,
    text_align: Option<CellAlign>,
    vertical_align: Option<VerticalAlign>,
    wrap: bool,
    borders: Borders,
    padding: Option<String>,
}

impl TableCellStyle {
    pub const DEFAULT_NAME: &'static str = "Default";

    /// Separator between a parent style name and a data style name in child styles
    pub const CHILD_SEPARATOR: &'static str = "-_-";

    pub fn builder(name: &str) -> TableCellStyleBuilder {
        TableCellStyleBuilder::new(name)
    }

    /// The visible `Default` cell style every other cell style inherits from
    pub fn default_style() -> Arc<TableCellStyle> {
        let mut builder = TableCellStyleBuilder::new(Self::DEFAULT_NAME);
        builder.parent_name = None;
        builder.build()
    }

    /// Hidden style combining `parent`'s formatting with `data_style`.
    ///
    /// Automatic styles may only inherit from common styles, so a hidden parent's
    /// properties are copied and its own parent is used instead.
    pub fn child(parent: &TableCellStyle, data_style: &DataStyle) -> TableCellStyle {
        let name = format!(
            "{}{}{}",
            parent.name(),
            Self::CHILD_SEPARATOR,
            data_style.name()
        );
        let parent_name = if parent.hidden {
            parent.parent_name.clone()
        } else {
            Some(parent.name().to_string())
        };
        TableCellStyle {
            key: StyleKey::new(StyleFamily::TableCell, name),
            hidden: true,
            parent_name,
            data_style_name: Some(data_style.name().to_string()),
            ..parent.clone()
        }
    }

    pub fn key(&self) -> &StyleKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    pub fn data_style_name(&self) -> Option<&str> {
        self.data_style_name.as_deref()
    }

    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    fn has_cell_properties(&self) -> bool {
        self.background_color.is_some()
            || self.vertical_align.is_some()
            || self.wrap
            || !self.borders.is_empty()
            || self.padding.is_some()
    }

    fn has_text_properties(&self) -> bool {
        self.font_bold
            || self.font_italic
            || self.font_color.is_some()
            || self.font_name.is_some()
            || self.font_size.is_some()
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:style")?;
        xml.attribute("style:name", self.name())?;
        xml.attribute_raw("style:family", "table-cell")?;
        if let Some(parent) = &self.parent_name {
            xml.attribute("style:parent-style-name", parent)?;
        }
        if let Some(data_style) = &self.data_style_name {
            xml.attribute("style:data-style-name", data_style)?;
        }
        xml.close_start_tag()?;

        if self.has_cell_properties() {
            xml.start_element("style:table-cell-properties")?;
            if let Some(color) = &self.background_color {
                xml.attribute("fo:background-color", color)?;
            }
            if let Some(align) = self.vertical_align {
                xml.attribute_raw("style:vertical-align", align.as_str())?;
            }
            if self.wrap {
                xml.attribute_raw("fo:wrap-option", "wrap")?;
            }
            self.borders.append_xml_attributes(xml)?;
            if let Some(padding) = &self.padding {
                xml.attribute("fo:padding", padding)?;
            }
            xml.end_empty()?;
        }

        if let Some(align) = self.text_align {
            xml.start_element("style:paragraph-properties")?;
            xml.attribute_raw("fo:text-align", align.as_str())?;
            xml.end_empty()?;
        }

        if self.has_text_properties() {
            xml.start_element("style:text-properties")?;
            if let Some(font) = &self.font_name {
                xml.attribute("style:font-name", font)?;
            }
            if let Some(size) = &self.font_size {
                xml.attribute("fo:font-size", size)?;
            }
            if let Some(color) = &self.font_color {
                xml.attribute("fo:color", color)?;
            }
            if self.font_bold {
                xml.attribute_raw("fo:font-weight", "bold")?;
                xml.attribute_raw("style:font-weight-asian", "bold")?;
                xml.attribute_raw("style:font-weight-complex", "bold")?;
            }
            if self.font_italic {
                xml.attribute_raw("fo:font-style", "italic")?;
                xml.attribute_raw("style:font-style-asian", "italic")?;
                xml.attribute_raw("style:font-style-complex", "italic")?;
            }
            xml.end_empty()?;
        }

        xml.end_element("style:style")
    }
}

/// Builder for [`TableCellStyle`]
#[derive(Debug, Clone)]
pub struct TableCellStyleBuilder {
    name: String,
    hidden: bool,
    parent_name: Option<String>,
    data_style_name: Option<String>,
    background_color: Option<String>,
    font_bold: bool,
    font_italic: bool,
    font_color: Option<String>,
    font_name: Option<String>,
    font_size: Option<String>,
    text_align: Option<CellAlign>,
    vertical_align: Option<VerticalAlign>,
    wrap: bool,
    borders: Borders,
    padding: Option<String>,
}

impl TableCellStyleBuilder {
    pub fn new(name: &str) -> Self {
        TableCellStyleBuilder {
            name: name.to_string(),
            hidden: false,
            parent_name: Some(TableCellStyle::DEFAULT_NAME.to_string()),
            data_style_name: None,
            background_color: None,
            font_bold: false,
            font_italic: false,
            font_color: None,
            font_name: None,
            font_size: None,
            text_align: None,
            vertical_align: None,
            wrap: false,
            borders: Borders::default(),
            padding: None,
        }
    }

    /// Make this an automatic style (written with the content, not in styles.xml)
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_parent(mut self, parent: &TableCellStyle) -> Self {
        self.parent_name = Some(parent.name().to_string());
        self
    }

    pub fn with_data_style(mut self, data_style: &DataStyle) -> Self {
        self.data_style_name = Some(data_style.name().to_string());
        self
    }

    pub fn with_background_color(mut self, color: &str) -> Self {
        self.background_color = Some(color.to_string());
        self
    }

    pub fn with_font_weight_bold(mut self) -> Self {
        self.font_bold = true;
        self
    }

    pub fn with_font_style_italic(mut self) -> Self {
        self.font_italic = true;
        self
    }

    pub fn with_font_color(mut self, color: &str) -> Self {
        self.font_color = Some(color.to_string());
        self
    }

    pub fn with_font_name(mut self, font: &str) -> Self {
        self.font_name = Some(font.to_string());
        self
    }

    pub fn with_font_size(mut self, size: &str) -> Self {
        self.font_size = Some(size.to_string());
        self
    }

    pub fn with_text_align(mut self, align: CellAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = Some(align);
        self
    }

    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    pub fn with_padding(mut self, padding: &str) -> Self {
        self.padding = Some(padding.to_string());
        self
    }

    pub fn build(self) -> Arc<TableCellStyle> {
        Arc::new(TableCellStyle {
            key: StyleKey::new(StyleFamily::TableCell, self.name),
            hidden: self.hidden,
            parent_name: self.parent_name,
            data_style_name: self.data_style_name,
            background_color: self.background_color,
            font_bold: self.font_bold,
            font_italic: self.font_italic,
            font_color: self.font_color,
            font_name: self.font_name,
            font_size: self.font_size,
            text_align: self.text_align,
            vertical_align: self.vertical_align,
            wrap: self.wrap,
            borders: self.borders,
            padding: self.padding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::DataStyles;

    fn render(style: &TableCellStyle) -> String {
        let mut output = Vec::new();
        let mut xml = XmlWriter::new(&mut output);
        style.append_xml(&mut xml).unwrap();
        xml.flush().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_default_style_xml() {
        let style = TableCellStyle::default_style();
        assert_eq!(
            render(&style),
            "<style:style style:name=\"Default\" style:family=\"table-cell\"></style:style>"
        );
        assert!(!style.is_hidden());
    }

    #[test]
    fn test_formatted_style_xml() {
        let style = TableCellStyle::builder("header")
            .with_background_color("#dddddd")
            .with_font_weight_bold()
            .with_text_align(CellAlign::Center)
            .with_borders(Borders::all(Border::thin()))
            .build();
        let xml = render(&style);
        assert!(xml.starts_with(
            "<style:style style:name=\"header\" style:family=\"table-cell\" style:parent-style-name=\"Default\">"
        ));
        assert!(xml.contains(
            "<style:table-cell-properties fo:background-color=\"#dddddd\" fo:border=\"0.06pt solid #000000\"/>"
        ));
        assert!(xml.contains("<style:paragraph-properties fo:text-align=\"center\"/>"));
        assert!(xml.contains("fo:font-weight=\"bold\""));
    }

    #[test]
    fn test_mixed_borders_use_side_attributes() {
        let borders = Borders {
            top: Some(Border::thin()),
            bottom: Some(Border::new("1pt", "double", "#ff0000")),
            ..Borders::default()
        };
        let style = TableCellStyle::builder("b").with_borders(borders).build();
        let xml = render(&style);
        assert!(xml.contains("fo:border-top=\"0.06pt solid #000000\""));
        assert!(xml.contains("fo:border-bottom=\"1pt double #ff0000\""));
        assert!(!xml.contains("fo:border=\""));
    }

    #[test]
    fn test_child_style() {
        let data_styles = DataStyles::default();
        let default = TableCellStyle::default_style();
        let child = TableCellStyle::child(&default, data_styles.boolean());
        assert_eq!(child.name(), "Default-_-boolean-data");
        assert!(child.is_hidden());
        assert_eq!(child.parent_name(), Some("Default"));
        assert_eq!(child.data_style_name(), Some("boolean-data"));

        // a hidden parent is flattened into its own parent
        let hidden = TableCellStyle::builder("gray")
            .hidden()
            .with_background_color("#eeeeee")
            .build();
        let child = TableCellStyle::child(&hidden, data_styles.float());
        assert_eq!(child.parent_name(), Some("Default"));
        assert!(render(&child).contains("fo:background-color=\"#eeeeee\""));
    }
}
