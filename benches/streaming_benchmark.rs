use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fastods::types::CellValue;
use fastods::{FlushMode, MemoryArchive, OdsDocument, OdsWriterBuilder, WriterConfig};
use tempfile::NamedTempFile;

fn benchmark_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.sample_size(10); // Reduce samples for large benchmarks

    for size in [1000, 10000, 50000].iter() {
        for mode in [FlushMode::Background, FlushMode::Inline] {
            let id = BenchmarkId::new(format!("{:?}", mode), size);
            group.bench_with_input(id, size, |b, &size| {
                b.iter(|| {
                    let temp = NamedTempFile::new().unwrap();
                    let mut writer = OdsWriterBuilder::new(temp.path())
                        .with_flush_mode(mode)
                        .build()
                        .unwrap();

                    writer.write_header_bold(["ID", "Name", "Value"]).unwrap();
                    for i in 0..size {
                        writer
                            .write_row_typed(&[
                                CellValue::Int(i as i64),
                                CellValue::String(format!("Name_{}", i)),
                                CellValue::Float(i as f64 * 1.5),
                            ])
                            .unwrap();
                    }
                    writer.save().unwrap();
                });
            });
        }
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_in_memory");
    group.sample_size(10);

    for size in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let archive = MemoryArchive::new();
                let config = WriterConfig {
                    flush_mode: FlushMode::Inline,
                    ..WriterConfig::default()
                };
                let mut document = OdsDocument::new(Box::new(archive.sink()), config).unwrap();
                let id = document.add_table("bench").unwrap();
                let mut table = document.table(id).unwrap();
                for row in 0..size {
                    for col in 0..5u32 {
                        table
                            .set_cell_value(row, col, black_box(row as f64 + col as f64))
                            .unwrap();
                    }
                }
                document.save().unwrap();
                black_box(archive.entry_names().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_write, benchmark_render);
criterion_main!(benches);
