//! Benchmarks pour le parsing des traces FCD

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write as _;

fn synthetic_trace(steps: usize, vehicles: usize) -> Vec<u8> {
    let mut doc = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<fcd-export>\n");
    for t in 0..steps {
        writeln!(doc, "  <timestep time=\"{}.00\">", t).unwrap();
        for v in 0..vehicles {
            writeln!(
                doc,
                "    <vehicle id=\"veh{}\" x=\"{:.6}\" y=\"{:.6}\" angle=\"12.50\" type=\"DEFAULT_VEHTYPE\" speed=\"13.89\" pos=\"42.17\" lane=\"-2345#1_0\" slope=\"0.00\"/>",
                v,
                13.4 + v as f64 * 1e-4,
                52.5 + t as f64 * 1e-4
            )
            .unwrap();
        }
        writeln!(doc, "  </timestep>").unwrap();
    }
    doc.push_str("</fcd-export>\n");
    doc.into_bytes()
}

fn bench_parse_fcd(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_fcd");

    for &(steps, vehicles) in &[(100, 10), (100, 100), (1000, 100)] {
        let data = synthetic_trace(steps, vehicles);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", steps, vehicles)),
            &data,
            |b, data| {
                b.iter(|| {
                    let result = sumo_xml::fcd::parse(black_box(data)).unwrap();
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_fcd);
criterion_main!(benches);
