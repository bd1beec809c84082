//! Fixed parts of the ODS package: mimetype, manifest, meta, settings, styles.xml
//! and the framing of content.xml

use super::xml_writer::XmlWriter;
use super::zip_sink::ZipSink;
use crate::error::Result;
use crate::styles_container::FrozenStyles;
use crate::types::{cell_reference, table_reference};
use chrono::NaiveDateTime;
use std::io::Write;

pub const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

const OFFICE_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns:office", "urn:oasis:names:tc:opendocument:xmlns:office:1.0"),
    ("xmlns:style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    ("xmlns:table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
    ("xmlns:draw", "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0"),
    ("xmlns:fo", "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
    ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
    ("xmlns:meta", "urn:oasis:names:tc:opendocument:xmlns:meta:1.0"),
    ("xmlns:number", "urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0"),
    ("xmlns:svg", "urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0"),
    ("xmlns:form", "urn:oasis:names:tc:opendocument:xmlns:form:1.0"),
    ("xmlns:script", "urn:oasis:names:tc:opendocument:xmlns:script:1.0"),
    ("xmlns:of", "urn:oasis:names:tc:opendocument:xmlns:of:1.2"),
    ("xmlns:ooo", "http://openoffice.org/2004/office"),
    ("xmlns:oooc", "http://openoffice.org/2004/calc"),
];

/// Directory entries LibreOffice expects, written empty
const EMPTY_ENTRIES: &[&str] = &[
    "Configurations2/accelerator/current.xml",
    "Configurations2/floater/",
    "Configurations2/images/Bitmaps/",
    "Configurations2/menubar/",
    "Configurations2/popupmenu/",
    "Configurations2/progressbar/",
    "Configurations2/statusbar/",
    "Configurations2/toolbar/",
    "Thumbnails/",
];

/// `(full-path, media-type)` of every manifest entry
const MANIFEST_ENTRIES: &[(&str, &str)] = &[
    ("/", MIMETYPE),
    ("content.xml", "text/xml"),
    ("styles.xml", "text/xml"),
    ("meta.xml", "text/xml"),
    ("settings.xml", "text/xml"),
    ("Configurations2/", "application/vnd.sun.xml.ui.configuration"),
    ("Configurations2/accelerator/current.xml", ""),
    ("Configurations2/floater/", ""),
    ("Configurations2/images/Bitmaps/", ""),
    ("Configurations2/menubar/", ""),
    ("Configurations2/popupmenu/", ""),
    ("Configurations2/progressbar/", ""),
    ("Configurations2/statusbar/", ""),
    ("Configurations2/toolbar/", ""),
    ("Thumbnails/", ""),
];

/// Document metadata written to meta.xml
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub generator: String,
    pub creator: String,
    pub date: NaiveDateTime,
    pub editing_cycles: u32,
}

impl DocumentMeta {
    pub fn new(generator: &str, creator: &str) -> Self {
        DocumentMeta {
            generator: generator.to_string(),
            creator: creator.to_string(),
            date: chrono::Local::now().naive_local(),
            editing_cycles: 1,
        }
    }
}

/// View settings written to settings.xml
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub table_names: Vec<String>,
    pub active_table: Option<String>,
}

/// An autofilter range, written as a `table:database-range`
#[derive(Debug, Clone, PartialEq)]
pub struct AutoFilter {
    pub table: String,
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl AutoFilter {
    /// `t1.A1:t1.C10`
    pub fn target_range_address(&self) -> String {
        let table = table_reference(&self.table);
        format!(
            "{}.{}:{}.{}",
            table,
            cell_reference(self.first_row, self.first_col),
            table,
            cell_reference(self.last_row, self.last_col)
        )
    }
}

fn start_document<W: Write>(xml: &mut XmlWriter<W>, root: &str) -> Result<()> {
    xml.write_str(XML_DECLARATION)?;
    xml.start_element(root)?;
    for (prefix, uri) in OFFICE_NAMESPACES {
        xml.attribute_raw(prefix, uri)?;
    }
    xml.attribute_raw("office:version", "1.2")?;
    xml.close_start_tag()
}

fn append_font_faces<W: Write>(xml: &mut XmlWriter<W>, fonts: &[String]) -> Result<()> {
    xml.start_element("office:font-face-decls")?;
    xml.close_start_tag()?;
    for font in fonts {
        xml.start_element("style:font-face")?;
        xml.attribute("style:name", font)?;
        xml.attribute("svg:font-family", &format!("'{}'", font))?;
        xml.attribute_raw("style:font-family-generic", "swiss")?;
        xml.attribute_raw("style:font-pitch", "variable")?;
        xml.end_empty()?;
    }
    xml.end_element("office:font-face-decls")
}

pub fn write_mimetype(sink: &mut dyn ZipSink) -> Result<()> {
    sink.start_entry("mimetype")?;
    sink.write_all(MIMETYPE.as_bytes())?;
    Ok(())
}

pub fn write_manifest(sink: &mut dyn ZipSink) -> Result<()> {
    sink.start_entry("META-INF/manifest.xml")?;
    let mut xml = XmlWriter::new(&mut *sink);
    xml.write_str(XML_DECLARATION)?;
    xml.start_element("manifest:manifest")?;
    xml.attribute_raw(
        "xmlns:manifest",
        "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0",
    )?;
    xml.attribute_raw("manifest:version", "1.2")?;
    xml.close_start_tag()?;
    for (path, media_type) in MANIFEST_ENTRIES {
        xml.start_element("manifest:file-entry")?;
        xml.attribute_raw("manifest:full-path", path)?;
        xml.attribute_raw("manifest:media-type", media_type)?;
        xml.end_empty()?;
    }
    xml.end_element("manifest:manifest")?;
    xml.flush()
}

pub fn write_meta(sink: &mut dyn ZipSink, meta: &DocumentMeta) -> Result<()> {
    sink.start_entry("meta.xml")?;
    let mut xml = XmlWriter::new(&mut *sink);
    start_document(&mut xml, "office:document-meta")?;
    xml.start_element("office:meta")?;
    xml.close_start_tag()?;
    xml.text_element("meta:generator", &meta.generator)?;
    xml.text_element("dc:creator", &meta.creator)?;
    let date = meta.date.format("%Y-%m-%dT%H:%M:%S").to_string();
    xml.text_element("dc:date", &date)?;
    xml.text_element("meta:creation-date", &date)?;
    let mut cycles = itoa::Buffer::new();
    xml.text_element("meta:editing-cycles", cycles.format(meta.editing_cycles))?;
    xml.end_element("office:meta")?;
    xml.end_element("office:document-meta")?;
    xml.flush()
}

/// styles.xml: common styles, page layouts and master pages
pub fn write_styles(sink: &mut dyn ZipSink, styles: &FrozenStyles) -> Result<()> {
    sink.start_entry("styles.xml")?;
    let mut xml = XmlWriter::new(&mut *sink);
    start_document(&mut xml, "office:document-styles")?;
    append_font_faces(&mut xml, &styles.font_faces)?;

    xml.start_element("office:styles")?;
    xml.close_start_tag()?;
    for data_style in &styles.common_data_styles {
        data_style.append_xml(&mut xml)?;
    }
    for style in &styles.styles_common_styles {
        style.append_xml(&mut xml)?;
    }
    xml.end_element("office:styles")?;

    xml.start_element("office:automatic-styles")?;
    xml.close_start_tag()?;
    for style in &styles.styles_automatic_styles {
        style.append_xml(&mut xml)?;
    }
    for layout in &styles.page_layouts {
        layout.append_xml(&mut xml)?;
    }
    xml.end_element("office:automatic-styles")?;

    xml.start_element("office:master-styles")?;
    xml.close_start_tag()?;
    for master in &styles.master_pages {
        master.append_xml(&mut xml)?;
    }
    xml.end_element("office:master-styles")?;

    xml.end_element("office:document-styles")?;
    xml.flush()
}

/// Opens content.xml and writes everything up to `<office:spreadsheet>`
pub fn write_content_head(sink: &mut dyn ZipSink, styles: &FrozenStyles) -> Result<()> {
    sink.start_entry("content.xml")?;
    let mut xml = XmlWriter::new(&mut *sink);
    start_document(&mut xml, "office:document-content")?;
    xml.empty_element("office:scripts")?;
    append_font_faces(&mut xml, &styles.font_faces)?;

    xml.start_element("office:automatic-styles")?;
    xml.close_start_tag()?;
    for data_style in &styles.content_data_styles {
        data_style.append_xml(&mut xml)?;
    }
    for style in &styles.content_automatic_styles {
        style.append_xml(&mut xml)?;
    }
    xml.end_element("office:automatic-styles")?;

    xml.start_element("office:body")?;
    xml.close_start_tag()?;
    xml.start_element("office:spreadsheet")?;
    xml.close_start_tag()?;
    xml.flush()
}

/// Closes content.xml; the current entry must still be content.xml
pub fn write_content_tail(sink: &mut dyn ZipSink, autofilters: &[AutoFilter]) -> Result<()> {
    let mut xml = XmlWriter::new(&mut *sink);
    if !autofilters.is_empty() {
        xml.start_element("table:database-ranges")?;
        xml.close_start_tag()?;
        for (index, filter) in autofilters.iter().enumerate() {
            xml.start_element("table:database-range")?;
            xml.attribute(
                "table:name",
                &format!("__Anonymous_Sheet_DB__{}", index),
            )?;
            xml.attribute("table:target-range-address", &filter.target_range_address())?;
            xml.attribute_raw("table:display-filter-buttons", "true")?;
            xml.end_empty()?;
        }
        xml.end_element("table:database-ranges")?;
    }
    xml.end_element("office:spreadsheet")?;
    xml.end_element("office:body")?;
    xml.end_element("office:document-content")?;
    xml.flush()
}

fn config_item<W: Write>(
    xml: &mut XmlWriter<W>,
    name: &str,
    config_type: &str,
    value: &str,
) -> Result<()> {
    xml.start_element("config:config-item")?;
    xml.attribute_raw("config:name", name)?;
    xml.attribute_raw("config:type", config_type)?;
    xml.close_start_tag()?;
    xml.write_escaped(value)?;
    xml.end_element("config:config-item")
}

pub fn write_settings(sink: &mut dyn ZipSink, settings: &Settings) -> Result<()> {
    sink.start_entry("settings.xml")?;
    let mut xml = XmlWriter::new(&mut *sink);
    xml.write_str(XML_DECLARATION)?;
    xml.start_element("office:document-settings")?;
    xml.attribute_raw(
        "xmlns:office",
        "urn:oasis:names:tc:opendocument:xmlns:office:1.0",
    )?;
    xml.attribute_raw(
        "xmlns:config",
        "urn:oasis:names:tc:opendocument:xmlns:config:1.0",
    )?;
    xml.attribute_raw("office:version", "1.2")?;
    xml.close_start_tag()?;
    xml.start_element("office:settings")?;
    xml.close_start_tag()?;

    xml.start_element("config:config-item-set")?;
    xml.attribute_raw("config:name", "ooo:view-settings")?;
    xml.close_start_tag()?;
    xml.start_element("config:config-item-map-indexed")?;
    xml.attribute_raw("config:name", "Views")?;
    xml.close_start_tag()?;
    xml.start_element("config:config-item-map-entry")?;
    xml.close_start_tag()?;
    config_item(&mut xml, "ViewId", "string", "view1")?;

    xml.start_element("config:config-item-map-named")?;
    xml.attribute_raw("config:name", "Tables")?;
    xml.close_start_tag()?;
    for name in &settings.table_names {
        xml.start_element("config:config-item-map-entry")?;
        xml.attribute("config:name", name)?;
        xml.close_start_tag()?;
        config_item(&mut xml, "CursorPositionX", "int", "0")?;
        config_item(&mut xml, "CursorPositionY", "int", "0")?;
        config_item(&mut xml, "HorizontalSplitMode", "short", "0")?;
        config_item(&mut xml, "VerticalSplitMode", "short", "0")?;
        config_item(&mut xml, "ActiveSplitRange", "short", "2")?;
        config_item(&mut xml, "PositionLeft", "int", "0")?;
        config_item(&mut xml, "PositionRight", "int", "0")?;
        config_item(&mut xml, "PositionTop", "int", "0")?;
        config_item(&mut xml, "PositionBottom", "int", "0")?;
        config_item(&mut xml, "ZoomType", "short", "0")?;
        config_item(&mut xml, "ZoomValue", "int", "100")?;
        config_item(&mut xml, "PageViewZoomValue", "int", "60")?;
        xml.end_element("config:config-item-map-entry")?;
    }
    xml.end_element("config:config-item-map-named")?;

    if let Some(active) = &settings.active_table {
        config_item(&mut xml, "ActiveTable", "string", active)?;
    }
    xml.end_element("config:config-item-map-entry")?;
    xml.end_element("config:config-item-map-indexed")?;
    xml.end_element("config:config-item-set")?;

    xml.end_element("office:settings")?;
    xml.end_element("office:document-settings")?;
    xml.flush()
}

pub fn write_empty_entries(sink: &mut dyn ZipSink) -> Result<()> {
    for name in EMPTY_ENTRIES {
        sink.start_entry(name)?;
    }
    Ok(())
}
