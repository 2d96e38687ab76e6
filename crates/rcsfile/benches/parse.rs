use criterion::{criterion_group, criterion_main, Criterion, Throughput};

/// Builds a `,v` file with `revisions` linear trunk revisions, each
/// delta touching one line of a `width`-line file.
fn synthetic_rcs(revisions: usize, width: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("head\t1.{revisions};\naccess;\nlocks; strict;\n\n").as_bytes());
    for rev in (1..=revisions).rev() {
        let next = if rev > 1 {
            format!("1.{}", rev - 1)
        } else {
            String::new()
        };
        out.extend_from_slice(
            format!(
                "1.{rev}\ndate\t2024.01.01.00.{:02}.00;\tauthor bench;\tstate Exp;\nbranches;\nnext\t{next};\n\n",
                rev % 60
            )
            .as_bytes(),
        );
    }
    out.extend_from_slice(b"desc\n@@\n\n");
    for rev in (1..=revisions).rev() {
        out.extend_from_slice(format!("1.{rev}\nlog\n@change {rev}\n@\ntext\n@").as_bytes());
        if rev == revisions {
            for line in 0..width {
                out.extend_from_slice(format!("line {line}\n").as_bytes());
            }
        } else {
            out.extend_from_slice(format!("d1 1\na1 1\nold line for rev {rev}\n").as_bytes());
        }
        out.extend_from_slice(b"@\n\n");
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let input = synthetic_rcs(100, 200);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("linear_100_revisions", |b| {
        b.iter(|| rcsfile::parse_bytes(&input, "bench.txt", false).expect("parse"));
    });
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
