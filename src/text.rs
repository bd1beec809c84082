//! Rich cell text: paragraphs made of plain runs, styled spans and links
//!
//! ```
//! use fastods::text::Text;
//! use fastods::TextStyle;
//!
//! let red = TextStyle::builder("red").with_font_color("#ff0000").build();
//! let text = Text::builder()
//!     .par()
//!     .span("See ")
//!     .link("the docs", "https://example.org/docs")
//!     .par()
//!     .styled_span("Important", red)
//!     .build();
//! assert_eq!(text.paragraphs().len(), 2);
//! assert_eq!(text.plain_text(), "See the docs\nImportant");
//! ```

use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use crate::style::TextStyle;
use std::io::Write;
use std::sync::Arc;

/// A run of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum TextPart {
    Plain(String),
    Span {
        text: String,
        style: Arc<TextStyle>,
    },
    Link {
        text: String,
        href: String,
        style: Option<Arc<TextStyle>>,
    },
}

impl TextPart {
    pub fn text(&self) -> &str {
        match self {
            TextPart::Plain(text) | TextPart::Span { text, .. } | TextPart::Link { text, .. } => {
                text
            }
        }
    }

    pub fn style(&self) -> Option<&Arc<TextStyle>> {
        match self {
            TextPart::Plain(_) => None,
            TextPart::Span { style, .. } => Some(style),
            TextPart::Link { style, .. } => style.as_ref(),
        }
    }

    fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        match self {
            TextPart::Plain(text) => xml.write_escaped(text),
            TextPart::Span { text, style } => {
                xml.start_element("text:span")?;
                xml.attribute("text:style-name", style.name())?;
                xml.close_start_tag()?;
                xml.write_escaped(text)?;
                xml.end_element("text:span")
            }
            TextPart::Link { text, href, style } => {
                xml.start_element("text:a")?;
                if let Some(style) = style {
                    xml.attribute("text:style-name", style.name())?;
                }
                xml.attribute("xlink:href", href)?;
                xml.attribute_raw("xlink:type", "simple")?;
                xml.close_start_tag()?;
                xml.write_escaped(text)?;
                xml.end_element("text:a")
            }
        }
    }
}

/// A `text:p` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    parts: Vec<TextPart>,
}

impl Paragraph {
    pub fn parts(&self) -> &[TextPart] {
        &self.parts
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        if self.parts.is_empty() {
            return xml.empty_element("text:p");
        }
        xml.start_element("text:p")?;
        xml.close_start_tag()?;
        for part in &self.parts {
            part.append_xml(xml)?;
        }
        xml.end_element("text:p")
    }
}

/// Paragraphs of a cell or an annotation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    paragraphs: Vec<Paragraph>,
}

impl Text {
    pub fn builder() -> TextBuilder {
        TextBuilder::default()
    }

    /// Unstyled text, one paragraph per line
    pub fn content(text: &str) -> Text {
        Text {
            paragraphs: text
                .split('\n')
                .map(|line| Paragraph {
                    parts: if line.is_empty() {
                        Vec::new()
                    } else {
                        vec![TextPart::Plain(line.to_string())]
                    },
                })
                .collect(),
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Text styles used by spans and links, to register with the document
    pub fn text_styles(&self) -> impl Iterator<Item = &Arc<TextStyle>> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.parts.iter())
            .filter_map(TextPart::style)
    }

    /// Text without markup, paragraphs joined by newlines
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.parts.iter().map(TextPart::text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        for paragraph in &self.paragraphs {
            paragraph.append_xml(xml)?;
        }
        Ok(())
    }
}

/// Builds a [`Text`] paragraph by paragraph. Runs added before the first
/// [`par`](TextBuilder::par) open a paragraph.
#[derive(Debug, Default)]
pub struct TextBuilder {
    paragraphs: Vec<Paragraph>,
    current: Option<Paragraph>,
}

impl TextBuilder {
    /// Start a new paragraph
    pub fn par(mut self) -> Self {
        if let Some(paragraph) = self.current.take() {
            self.paragraphs.push(paragraph);
        }
        self.current = Some(Paragraph::default());
        self
    }

    fn push(mut self, part: TextPart) -> Self {
        self.current
            .get_or_insert_with(Paragraph::default)
            .parts
            .push(part);
        self
    }

    pub fn span(self, text: &str) -> Self {
        self.push(TextPart::Plain(text.to_string()))
    }

    pub fn styled_span(self, text: &str, style: Arc<TextStyle>) -> Self {
        self.push(TextPart::Span {
            text: text.to_string(),
            style,
        })
    }

    /// Link to an URL or a file
    pub fn link(self, text: &str, href: &str) -> Self {
        self.push(TextPart::Link {
            text: text.to_string(),
            href: href.to_string(),
            style: None,
        })
    }

    pub fn styled_link(self, text: &str, style: Arc<TextStyle>, href: &str) -> Self {
        self.push(TextPart::Link {
            text: text.to_string(),
            href: href.to_string(),
            style: Some(style),
        })
    }

    /// Link to a table or a named range of this document
    pub fn table_link(self, text: &str, target: &str) -> Self {
        self.link(text, &format!("#{}", target))
    }

    pub fn build(mut self) -> Text {
        if let Some(paragraph) = self.current.take() {
            self.paragraphs.push(paragraph);
        }
        Text {
            paragraphs: self.paragraphs,
        }
    }
}

/// Comment attached to a cell (`office:annotation`)
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    text: Text,
    width: Option<String>,
    height: Option<String>,
    visible: bool,
}

impl Tooltip {
    /// Annotation with one paragraph per line of `text`
    pub fn new(text: &str) -> Self {
        Tooltip {
            text: Text::content(text),
            width: None,
            height: None,
            visible: false,
        }
    }

    /// Size of the annotation box, e.g. `"4cm"`, `"2cm"`
    pub fn with_size(mut self, width: &str, height: &str) -> Self {
        self.width = Some(width.to_string());
        self.height = Some(height.to_string());
        self
    }

    /// Show the annotation without hovering the cell
    pub fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    pub fn text(&self) -> &Text {
        &self.text
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("office:annotation")?;
        if self.visible {
            xml.attribute_raw("office:display", "true")?;
        }
        if let Some(width) = &self.width {
            xml.attribute("svg:width", width)?;
        }
        if let Some(height) = &self.height {
            xml.attribute("svg:height", height)?;
        }
        xml.close_start_tag()?;
        self.text.append_xml(xml)?;
        xml.end_element("office:annotation")
    }
}

impl From<&str> for Tooltip {
    fn from(text: &str) -> Self {
        Tooltip::new(text)
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
        let mut xml = XmlWriter::new(&mut output);
        f(&mut xml).unwrap();
        xml.flush().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_content_splits_lines() {
        let text = Text::content("first & second\n\nthird");
        assert_eq!(
            render(|xml| text.append_xml(xml)),
            "<text:p>first &amp; second</text:p><text:p/><text:p>third</text:p>"
        );
        assert_eq!(text.plain_text(), "first & second\n\nthird");
    }

    #[test]
    fn test_spans_and_links() {
        let bold = TextStyle::builder("T1").with_font_weight_bold().build();
        let text = Text::builder()
            .span("Go to ")
            .styled_link("summary", Arc::clone(&bold), "https://example.org/?a=1&b=2")
            .par()
            .styled_span("Back", Arc::clone(&bold))
            .span(" to ")
            .table_link("data", "Data")
            .build();

        assert_eq!(text.paragraphs().len(), 2);
        assert_eq!(text.text_styles().count(), 2);
        assert_eq!(
            render(|xml| text.append_xml(xml)),
            "<text:p>Go to <text:a text:style-name=\"T1\" xlink:href=\"https://example.org/?a=1&amp;b=2\" \
             xlink:type=\"simple\">summary</text:a></text:p>\
             <text:p><text:span text:style-name=\"T1\">Back</text:span> to \
             <text:a xlink:href=\"#Data\" xlink:type=\"simple\">data</text:a></text:p>"
        );
    }

    #[test]
    fn test_empty_builder() {
        assert!(Text::builder().build().is_empty());
        let text = Text::builder().par().build();
        assert_eq!(render(|xml| text.append_xml(xml)), "<text:p/>");
    }

    #[test]
    fn test_tooltip() {
        let tooltip = Tooltip::new("<tooltip>\nline 2");
        assert_eq!(
            render(|xml| tooltip.append_xml(xml)),
            "<office:annotation><text:p>&lt;tooltip&gt;</text:p><text:p>line 2</text:p></office:annotation>"
        );

        let tooltip = Tooltip::new("note").with_size("1cm", "2cm").visible();
        assert_eq!(
            render(|xml| tooltip.append_xml(xml)),
            "<office:annotation office:display=\"true\" svg:width=\"1cm\" svg:height=\"2cm\">\
             <text:p>note</text:p></office:annotation>"
        );
    }
}
