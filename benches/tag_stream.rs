use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dxfdoc::{CadDocument, DxfEntity, DxfReader, DxfReaderConfiguration, DxfVersion, DxfWriter, Vector3};

// Document with `count` lines and circles spread over three layers
fn generate_document(count: usize, version: DxfVersion) -> CadDocument {
    let mut doc = CadDocument::with_version(version);
    for name in ["Walls", "Doors", "Furniture"] {
        let _ = doc.layers_mut().new_entry(name, &[]);
    }
    let layers = ["Walls", "Doors", "Furniture"];
    for i in 0..count {
        let x = i as f64 * 1.25;
        let layer = layers[i % layers.len()];
        let entity = if i % 2 == 0 {
            DxfEntity::new("LINE")
                .with("start", Vector3::new(x, 0.0, 0.0))
                .and_then(|e| e.with("end", Vector3::new(x, 10.0, 0.0)))
        } else {
            DxfEntity::new("CIRCLE")
                .with("center", Vector3::new(x, 5.0, 0.0))
                .and_then(|e| e.with("radius", 0.5))
        };
        let entity = entity.and_then(|e| e.with("layer", layer)).expect("valid attributes");
        doc.add_entity(entity).expect("model space exists");
    }
    doc
}

fn encode(doc: &CadDocument, binary: bool) -> Vec<u8> {
    let mut writer = DxfWriter::new(doc);
    writer.set_binary(binary);
    writer.write_to_vec().expect("document writes")
}

// Raw tagging against compiled tags
fn benchmark_tagging(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagging");

    for size in [1_000, 10_000].iter() {
        let data = encode(&generate_document(*size, DxfVersion::AC1015), false);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for compile_tags in [false, true] {
            let label = if compile_tags { "compiled" } else { "raw" };
            group.bench_with_input(
                BenchmarkId::new(label, format!("{}_entities", size)),
                &data,
                |b, data| {
                    let config = DxfReaderConfiguration {
                        compile_tags,
                        ..Default::default()
                    };
                    b.iter(|| {
                        let reader = DxfReader::from_bytes(black_box(data.clone()))
                            .with_configuration(config.clone());
                        black_box(reader.tags().expect("valid stream"));
                    });
                },
            );
        }
    }

    group.finish();
}

// Full document load, ASCII and binary
fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    let doc = generate_document(5_000, DxfVersion::AC1015);

    for binary in [false, true] {
        let data = encode(&doc, binary);
        let label = if binary { "binary" } else { "ascii" };
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &data, |b, data| {
            b.iter(|| {
                let doc = DxfReader::from_bytes(black_box(data.clone()))
                    .read()
                    .expect("valid document");
                black_box(doc);
            });
        });
    }

    group.finish();
}

fn benchmark_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");

    for version in [DxfVersion::AC1009, DxfVersion::AC1032] {
        let doc = generate_document(5_000, version);
        group.bench_with_input(
            BenchmarkId::from_parameter(version.release()),
            &doc,
            |b, doc| {
                b.iter(|| black_box(encode(black_box(doc), false)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_tagging, benchmark_load, benchmark_save);
criterion_main!(benches);
