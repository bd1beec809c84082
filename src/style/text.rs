//! Text styles, used by header and footer content and by rich cell text

use super::{StyleFamily, StyleKey};
use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    key: StyleKey,
    hidden: bool,
    font_bold: bool,
    font_italic: bool,
    font_color: Option<String>,
    font_name: Option<String>,
    font_size: Option<String>,
}

impl TextStyle {
    pub fn builder(name: &str) -> TextStyleBuilder {
        TextStyleBuilder {
            name: name.to_string(),
            hidden: true,
            font_bold: false,
            font_italic: false,
            font_color: None,
            font_name: None,
            font_size: None,
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

    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:style")?;
        xml.attribute("style:name", self.name())?;
        xml.attribute_raw("style:family", "text")?;
        xml.close_start_tag()?;
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
        }
        if self.font_italic {
            xml.attribute_raw("fo:font-style", "italic")?;
        }
        xml.end_empty()?;
        xml.end_element("style:style")
    }
}

/// Builder for [`TextStyle`]. Text styles are hidden unless [`visible`](Self::visible) is called.
#[derive(Debug, Clone)]
pub struct TextStyleBuilder {
    name: String,
    hidden: bool,
    font_bold: bool,
    font_italic: bool,
    font_color: Option<String>,
    font_name: Option<String>,
    font_size: Option<String>,
}

impl TextStyleBuilder {
    pub fn visible(mut self) -> Self {
        self.hidden = false;
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

    pub fn build(self) -> Arc<TextStyle> {
        Arc::new(TextStyle {
            key: StyleKey::new(StyleFamily::Text, self.name),
            hidden: self.hidden,
            font_bold: self.font_bold,
            font_italic: self.font_italic,
            font_color: self.font_color,
            font_name: self.font_name,
            font_size: self.font_size,
        })
    }
}
