//! Page styles: a page layout plus a master page carrying header and footer

use super::TextStyle;
use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use std::io::Write;
use std::sync::Arc;

/// Header or footer content: one paragraph of text
#[derive(Debug, Clone, PartialEq)]
pub struct PageSection {
    text: String,
    text_style: Option<Arc<TextStyle>>,
    min_height: String,
}

impl PageSection {
    pub fn new(text: &str) -> Self {
        PageSection {
            text: text.to_string(),
            text_style: None,
            min_height: "0cm".to_string(),
        }
    }

    pub fn with_text_style(mut self, style: Arc<TextStyle>) -> Self {
        self.text_style = Some(style);
        self
    }

    pub fn with_min_height(mut self, height: &str) -> Self {
        self.min_height = height.to_string();
        self
    }

    pub fn text_style(&self) -> Option<&Arc<TextStyle>> {
        self.text_style.as_ref()
    }

    fn append_region_xml<W: Write>(&self, xml: &mut XmlWriter<W>, element: &str) -> Result<()> {
        xml.start_element(element)?;
        xml.close_start_tag()?;
        xml.start_element("text:p")?;
        xml.close_start_tag()?;
        match &self.text_style {
            Some(style) => {
                xml.start_element("text:span")?;
                xml.attribute("text:style-name", style.name())?;
                xml.close_start_tag()?;
                xml.write_escaped(&self.text)?;
                xml.end_element("text:span")?;
            }
            None => xml.write_escaped(&self.text)?,
        }
        xml.end_element("text:p")?;
        xml.end_element(element)
    }

    fn append_properties_xml<W: Write>(
        section: Option<&PageSection>,
        xml: &mut XmlWriter<W>,
        element: &str,
        margin_attribute: &str,
    ) -> Result<()> {
        match section {
            Some(section) => {
                xml.start_element(element)?;
                xml.close_start_tag()?;
                xml.start_element("style:header-footer-properties")?;
                xml.attribute("fo:min-height", &section.min_height)?;
                xml.attribute_raw(margin_attribute, "0.25cm")?;
                xml.end_empty()?;
                xml.end_element(element)
            }
            None => xml.empty_element(element),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// `<style:page-layout>`: page size and margins
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayoutStyle {
    name: String,
    width: String,
    height: String,
    margin: String,
    orientation: Orientation,
    header: Option<PageSection>,
    footer: Option<PageSection>,
}

impl PageLayoutStyle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:page-layout")?;
        xml.attribute("style:name", &self.name)?;
        xml.close_start_tag()?;
        xml.start_element("style:page-layout-properties")?;
        xml.attribute("fo:page-width", &self.width)?;
        xml.attribute("fo:page-height", &self.height)?;
        xml.attribute_raw("style:num-format", "1")?;
        xml.attribute_raw(
            "style:print-orientation",
            match self.orientation {
                Orientation::Portrait => "portrait",
                Orientation::Landscape => "landscape",
            },
        )?;
        for side in ["fo:margin-top", "fo:margin-bottom", "fo:margin-left", "fo:margin-right"] {
            xml.attribute(side, &self.margin)?;
        }
        xml.attribute_raw("style:writing-mode", "lr-tb")?;
        xml.end_empty()?;
        PageSection::append_properties_xml(
            self.header.as_ref(),
            xml,
            "style:header-style",
            "fo:margin-bottom",
        )?;
        PageSection::append_properties_xml(
            self.footer.as_ref(),
            xml,
            "style:footer-style",
            "fo:margin-top",
        )?;
        xml.end_element("style:page-layout")
    }
}

/// `<style:master-page>`: header and footer content
#[derive(Debug, Clone, PartialEq)]
pub struct MasterPageStyle {
    name: String,
    layout_name: String,
    header: Option<PageSection>,
    footer: Option<PageSection>,
}

impl MasterPageStyle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        xml.start_element("style:master-page")?;
        xml.attribute("style:name", &self.name)?;
        xml.attribute("style:page-layout-name", &self.layout_name)?;
        xml.close_start_tag()?;
        match &self.header {
            Some(header) => header.append_region_xml(xml, "style:header")?,
            None => {
                xml.start_element("style:header")?;
                xml.attribute_raw("style:display", "false")?;
                xml.end_empty()?;
            }
        }
        match &self.footer {
            Some(footer) => footer.append_region_xml(xml, "style:footer")?,
            None => {
                xml.start_element("style:footer")?;
                xml.attribute_raw("style:display", "false")?;
                xml.end_empty()?;
            }
        }
        xml.end_element("style:master-page")
    }
}

/// A page style, referenced by table styles through the master page name
#[derive(Debug, Clone, PartialEq)]
pub struct PageStyle {
    layout: Arc<PageLayoutStyle>,
    master: Arc<MasterPageStyle>,
}

impl PageStyle {
    pub const DEFAULT_MASTER_PAGE_NAME: &'static str = "DefaultMasterPage";
    pub const DEFAULT_PAGE_LAYOUT_NAME: &'static str = "Mpm1";

    pub fn builder(name: &str) -> PageStyleBuilder {
        PageStyleBuilder {
            name: name.to_string(),
            layout_name: name.to_string(),
            width: "21cm".to_string(),
            height: "29.7cm".to_string(),
            margin: "1.5cm".to_string(),
            orientation: Orientation::Portrait,
            header: None,
            footer: None,
        }
    }

    /// A4 portrait, no header or footer
    pub fn default_style() -> PageStyle {
        Self::builder(Self::DEFAULT_MASTER_PAGE_NAME)
            .with_layout_name(Self::DEFAULT_PAGE_LAYOUT_NAME)
            .build()
    }

    pub fn name(&self) -> &str {
        self.master.name()
    }

    pub fn layout(&self) -> &Arc<PageLayoutStyle> {
        &self.layout
    }

    pub fn master(&self) -> &Arc<MasterPageStyle> {
        &self.master
    }

    /// Text styles used by the header and footer
    pub fn text_styles(&self) -> Vec<Arc<TextStyle>> {
        [&self.master.header, &self.master.footer]
            .into_iter()
            .flatten()
            .filter_map(|section| section.text_style().cloned())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PageStyleBuilder {
    name: String,
    layout_name: String,
    width: String,
    height: String,
    margin: String,
    orientation: Orientation,
    header: Option<PageSection>,
    footer: Option<PageSection>,
}

impl PageStyleBuilder {
    pub fn with_layout_name(mut self, name: &str) -> Self {
        self.layout_name = name.to_string();
        self
    }

    pub fn with_size(mut self, width: &str, height: &str) -> Self {
        self.width = width.to_string();
        self.height = height.to_string();
        self
    }

    /// Swap to landscape orientation (and swap the page dimensions)
    pub fn with_landscape(mut self) -> Self {
        if self.orientation == Orientation::Portrait {
            std::mem::swap(&mut self.width, &mut self.height);
            self.orientation = Orientation::Landscape;
        }
        self
    }

    pub fn with_margin(mut self, margin: &str) -> Self {
        self.margin = margin.to_string();
        self
    }

    pub fn with_header(mut self, header: PageSection) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: PageSection) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn build(self) -> PageStyle {
        let layout = PageLayoutStyle {
            name: self.layout_name.clone(),
            width: self.width,
            height: self.height,
            margin: self.margin,
            orientation: self.orientation,
            header: self.header.clone(),
            footer: self.footer.clone(),
        };
        let master = MasterPageStyle {
            name: self.name,
            layout_name: self.layout_name,
            header: self.header,
            footer: self.footer,
        };
        PageStyle {
            layout: Arc::new(layout),
            master: Arc::new(master),
        }
    }
}
