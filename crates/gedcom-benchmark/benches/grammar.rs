use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use gedcom_store::Store;
use gedcom_tokenizer::{check_format, normalize, tokenize};

static LINEAGE: &str = include_str!("../../gedcom-store/test_data/lineage.gedg");

static LINES: [(&str, &str); 3] = [
    ("tag", "  +2 VERS   <VERSION_NUMBER> {0:1} /* version */"),
    ("xref_first", "n @<XREF:INDI>@ INDI {1:1}"),
    ("possibilities", "n [ ENGA | MARR | MARB | MARC ] [Y|<NULL>] {1:1}"),
];

fn tokenize_line(line: &str) {
    let line = normalize(line);
    if check_format(&line).is_ok() {
        black_box(tokenize(&line).ok());
    }
}

fn bench_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar lines");

    for (name, line) in LINES {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(name, &line, |b, &line| b.iter(|| tokenize_line(line)));
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar store");

    group.throughput(Throughput::Bytes(LINEAGE.len() as u64));
    group.bench_with_input(BenchmarkId::new("parse", "lineage"), &LINEAGE, |b, &text| {
        b.iter(|| black_box(Store::parse(text).ok()));
    });

    let store = Store::parse(LINEAGE).ok();
    group.bench_function("get_structure", |b| {
        b.iter(|| {
            let store = black_box(store.as_ref());
            store.map(|store| {
                store.get_structure("FAMILY_EVENT_STRUCTURE", Some("MARR"), None).ok()
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lines, bench_store);
criterion_main!(benches);
