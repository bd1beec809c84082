//! Integration tests for fastods: write real .ods files and inspect the archive

use fastods::types::CellValue;
use fastods::{
    DataStyle, DataStyleKind, FlushMode, OdsDocument, OdsError, OdsWriter, OdsWriterBuilder,
    SZipSink, StylesMode, TableCellStyle, Text, TextStyle, WriterConfig,
};
use s_zip::StreamingZipReader;
use std::path::Path;
use tempfile::NamedTempFile;

fn entry_names(path: &Path) -> Vec<String> {
    let reader = StreamingZipReader::open(path).unwrap();
    reader.entries().iter().map(|e| e.name.clone()).collect()
}

fn read_entry(path: &Path, name: &str) -> String {
    let mut reader = StreamingZipReader::open(path).unwrap();
    let bytes = reader.read_entry_by_name(name).unwrap();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_package_layout() {
    let temp = NamedTempFile::new().unwrap();
    let mut writer = OdsWriter::new(temp.path()).unwrap();
    writer.write_row(["hello"]).unwrap();
    writer.save().unwrap();

    let names = entry_names(temp.path());
    assert_eq!(
        &names[..6],
        &[
            "mimetype",
            "META-INF/manifest.xml",
            "meta.xml",
            "styles.xml",
            "content.xml",
            "settings.xml",
        ]
    );
    assert!(names.iter().any(|n| n == "Thumbnails/"));
    assert!(names.iter().any(|n| n == "Configurations2/accelerator/current.xml"));

    assert_eq!(
        read_entry(temp.path(), "mimetype"),
        "application/vnd.oasis.opendocument.spreadsheet"
    );
    let manifest = read_entry(temp.path(), "META-INF/manifest.xml");
    assert!(manifest.contains("manifest:full-path=\"content.xml\""));
    assert!(manifest.contains("manifest:full-path=\"styles.xml\""));
}

#[test]
fn test_write_typed_rows() {
    let temp = NamedTempFile::new().unwrap();
    {
        let mut writer = OdsWriter::new(temp.path()).unwrap();
        writer.write_header_bold(["Name", "Age", "Member"]).unwrap();
        writer
            .write_row_typed(&[
                CellValue::String("Alice & Bob".to_string()),
                CellValue::Int(30),
                CellValue::Bool(true),
            ])
            .unwrap();
        writer.save().unwrap();
    }

    let content = read_entry(temp.path(), "content.xml");
    assert!(content.contains("table:name=\"Sheet1\""));
    assert!(content.contains("table:style-name=\"Header\""));
    assert!(content.contains("office:string-value=\"Alice &amp; Bob\""));
    assert!(content.contains("office:value-type=\"float\" office:value=\"30\""));
    assert!(content.contains("office:boolean-value=\"true\""));
    assert!(content.contains("Default-_-boolean-data"));
    assert!(content.ends_with("</office:document-content>"));

    let styles = read_entry(temp.path(), "styles.xml");
    assert!(styles.contains("style:name=\"Header\""));
    assert!(styles.contains("fo:font-weight=\"bold\""));
    assert!(styles.contains("style:name=\"boolean-data\""));
}

#[test]
fn test_multiple_tables_and_settings() {
    let temp = NamedTempFile::new().unwrap();
    let mut writer = OdsWriterBuilder::new(temp.path())
        .with_sheet_name("First")
        .build()
        .unwrap();
    writer.write_row(["one"]).unwrap();
    writer.add_sheet("Second").unwrap();
    writer.write_row(["two"]).unwrap();
    let second = writer.current_table();
    writer.document_mut().set_active_table(second).unwrap();
    writer.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    let first = content.find("table:name=\"First\"").unwrap();
    let second = content.find("table:name=\"Second\"").unwrap();
    assert!(first < second);
    assert_eq!(content.matches("</table:table>").count(), 2);

    let settings = read_entry(temp.path(), "settings.xml");
    assert!(settings.contains("config:name=\"First\""));
    assert!(settings.contains("config:name=\"Second\""));
    assert!(settings.contains("config:name=\"ActiveTable\""));
    let active = settings.find("config:name=\"ActiveTable\"").unwrap();
    assert!(settings[active..].starts_with("config:name=\"ActiveTable\" config:type=\"string\">Second<"));
}

#[test]
fn test_large_streaming_write() {
    let temp = NamedTempFile::new().unwrap();
    let rows = 20_000u32;
    {
        let mut writer = OdsWriterBuilder::new(temp.path())
            .with_row_batch_size(128)
            .with_compression_level(1)
            .build()
            .unwrap();
        writer.write_header_bold(["ID", "Name", "Score"]).unwrap();
        for i in 0..rows {
            writer
                .write_row_typed(&[
                    CellValue::Int(i as i64),
                    CellValue::String(format!("Name_{}", i)),
                    CellValue::Float(i as f64 * 0.5),
                ])
                .unwrap();
        }
        assert_eq!(writer.current_row(), rows + 1);
        writer.save().unwrap();
    }

    let content = read_entry(temp.path(), "content.xml");
    assert_eq!(
        content.matches("<table:table-row").count(),
        rows as usize + 1
    );
    let first = content.find("office:string-value=\"Name_0\"").unwrap();
    let last = content
        .find(&format!("office:string-value=\"Name_{}\"", rows - 1))
        .unwrap();
    assert!(first < last);
}

#[test]
fn test_inline_and_buffered_modes() {
    let temp = NamedTempFile::new().unwrap();
    let config = WriterConfig {
        flush_mode: FlushMode::Inline,
        styles_mode: StylesMode::Buffered,
        row_batch_size: 2,
        ..WriterConfig::default()
    };
    let mut document = OdsDocument::create(temp.path(), config).unwrap();
    let id = document.add_table("data").unwrap();
    {
        let mut table = document.table(id).unwrap();
        for row in 0..10 {
            table.set_cell_value(row, 0, row as i64).unwrap();
        }
        let late = TableCellStyle::builder("Late")
            .with_background_color("#ff0000")
            .build();
        table.set_cell_style(10, 0, late).unwrap();
    }
    document.save().unwrap();

    let styles = read_entry(temp.path(), "styles.xml");
    let content = read_entry(temp.path(), "content.xml");
    assert!(styles.contains("style:name=\"Late\""));
    assert!(styles.contains("fo:background-color=\"#ff0000\""));
    assert!(content.contains("table:style-name=\"Late\""));
    assert!(content.contains("office:value=\"9\""));
}

#[test]
fn test_merge_autofilter_and_print_range() {
    let temp = NamedTempFile::new().unwrap();
    let config = WriterConfig::default();
    let mut document = OdsDocument::create(temp.path(), config).unwrap();
    let id = document.add_table("t1").unwrap();
    {
        let mut table = document.table(id).unwrap();
        table.set_header_rows(1).unwrap();
        table.set_print_range(0, 0, 9, 2).unwrap();
        table.cell(0, 0).unwrap().set_string("Merged").unwrap().set_merge(2, 3).unwrap();
        assert!(table.is_covered(1, 2));
        table.add_autofilter(0, 0, 9, 2).unwrap();
        table.set_cell_value(3, 1, 1.5).unwrap();
    }
    document.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    assert!(content.contains("table:number-columns-spanned=\"3\""));
    assert!(content.contains("table:number-rows-spanned=\"2\""));
    assert_eq!(content.matches("<table:covered-table-cell").count(), 5);
    assert!(content.contains("<table:table-header-rows>"));
    assert!(content.contains("table:print-ranges=\"$t1.$A$1:.$C$10\""));
    assert!(content.contains("table:target-range-address=\"t1.A1:t1.C10\""));
    assert!(content.contains("table:display-filter-buttons=\"true\""));
}

#[test]
fn test_styles_frozen_after_first_batch() {
    let temp = NamedTempFile::new().unwrap();
    let config = WriterConfig {
        row_batch_size: 1,
        ..WriterConfig::default()
    };
    let mut document = OdsDocument::create(temp.path(), config).unwrap();
    let id = document.add_table("t").unwrap();
    {
        let mut table = document.table(id).unwrap();
        table.set_cell_value(0, 0, "a").unwrap();
        table.set_cell_value(1, 0, "b").unwrap();
        table.set_cell_value(2, 0, "c").unwrap();
        let late = TableCellStyle::builder("TooLate").build();
        assert!(matches!(
            table.set_cell_style(2, 0, late),
            Err(OdsError::StylesFrozen(_))
        ));
        assert!(matches!(
            table.set_cell_value(0, 0, "again"),
            Err(OdsError::RowClosed { .. })
        ));
    }
    document.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    assert!(content.contains("office:string-value=\"c\""));
}

#[test]
fn test_empty_document() {
    let temp = NamedTempFile::new().unwrap();
    let config = WriterConfig::default();
    let document = OdsDocument::create(temp.path(), config).unwrap();
    document.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    assert!(content.contains("<office:spreadsheet>"));
    assert!(!content.contains("<table:table "));
}

#[test]
fn test_background_file_sink() {
    let temp = NamedTempFile::new().unwrap();
    let config = WriterConfig {
        flush_mode: FlushMode::Background,
        row_batch_size: 4,
        ..WriterConfig::default()
    };
    let factory = SZipSink::factory(temp.path(), config.effective_compression_level());
    let mut document = OdsDocument::with_sink_factory(factory, config).unwrap();
    let id = document.add_table("bg").unwrap();
    {
        let mut table = document.table(id).unwrap();
        for row in 0..50u32 {
            table.set_cell_value(row, 0, row as i64).unwrap();
            table.set_cell_value(row, 1, format!("row {}", row)).unwrap();
        }
    }
    assert!(document.flushed_units() > 2);
    document.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    assert_eq!(content.matches("<table:table-row").count(), 50);
    assert!(content.contains("office:string-value=\"row 49\""));
    assert_eq!(entry_names(temp.path())[0], "mimetype");
}

#[test]
fn test_unwritable_path_fails_at_creation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.ods");
    for flush_mode in [FlushMode::Background, FlushMode::Inline] {
        let config = WriterConfig {
            flush_mode,
            ..WriterConfig::default()
        };
        let err = OdsDocument::create(&path, config).err().unwrap();
        assert!(err.is_io_error(), "{:?}", err);
    }
}

#[test]
fn test_rich_cells_in_file() {
    let temp = NamedTempFile::new().unwrap();
    let mut writer = OdsWriter::new(temp.path()).unwrap();
    writer.write_row(["Total"]).unwrap();
    let id = writer.current_table();
    let link = TextStyle::builder("link").with_font_color("#0000ff").build();
    let money = std::sync::Arc::new(DataStyle::new(
        "two-places",
        DataStyleKind::Float {
            decimal_places: 2,
            grouping: true,
        },
    ));
    {
        let mut table = writer.document_mut().table(id).unwrap();
        table
            .cell(0, 1)
            .unwrap()
            .set_value(1234.5)
            .unwrap()
            .set_data_style(money)
            .unwrap()
            .set_tooltip("sum of column B")
            .unwrap();
        table
            .cell(1, 0)
            .unwrap()
            .set_text(
                Text::builder()
                    .span("see ")
                    .styled_link("Sheet1", link, "#Sheet1")
                    .build(),
            )
            .unwrap();
    }
    writer.save().unwrap();

    let content = read_entry(temp.path(), "content.xml");
    assert!(content.contains(
        "table:style-name=\"Default-_-two-places\" office:value-type=\"float\" office:value=\"1234.5\">\
         <office:annotation><text:p>sum of column B</text:p></office:annotation></table:table-cell>"
    ));
    assert!(content.contains(
        "<text:p>see <text:a text:style-name=\"link\" xlink:href=\"#Sheet1\" xlink:type=\"simple\">\
         Sheet1</text:a></text:p>"
    ));
    let styles = read_entry(temp.path(), "styles.xml");
    assert!(styles.contains("<number:number-style style:name=\"two-places\""));
}
