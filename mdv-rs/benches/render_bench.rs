use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdv::script::expand::substitute;
use mdv::script::expr::eval_str;
use mdv::script::{render_str, Value};
use indexmap::IndexMap;

/// A document with a few definitions up front and `sections` blocks of
/// mixed text below.
fn make_doc(sections: usize) -> String {
    let mut doc = String::from("@title=Report\n@n=12\n@rate=0.25\n~total=n * rate\n~label=title + '!'\n\n");
    for i in 0..sections {
        doc.push_str(&format!("## Section {i}\n\n"));
        doc.push_str("Plain paragraph text without any references at all.\n");
        doc.push_str("{label}: {n} items at {rate} = {total}\n");
        doc.push_str("/{literal braces}\n");
        doc.push_str(&format!("@n={i}\n\n"));
    }
    doc
}

fn bench_render(c: &mut Criterion) {
    let doc_small = make_doc(10);
    let doc_med = make_doc(100);
    let doc_large = make_doc(1000);

    let mut g = c.benchmark_group("render");
    g.bench_function("small", |b| b.iter(|| render_str(black_box(&doc_small), false)));
    g.bench_function("med", |b| b.iter(|| render_str(black_box(&doc_med), false)));
    g.bench_function("large", |b| b.iter(|| render_str(black_box(&doc_large), false)));
    g.finish();
}

fn bench_pieces(c: &mut Criterion) {
    let mut vars: IndexMap<String, Value> = IndexMap::new();
    vars.insert("a".into(), Value::Int(6));
    vars.insert("b".into(), Value::Float(1.5));
    vars.insert("s".into(), Value::from("word"));

    let line = "The {s} is {a} and {b}, not {{a}}.\n";

    let mut g = c.benchmark_group("pieces");
    g.bench_function("eval_arith", |b| {
        b.iter(|| eval_str(black_box("(a * 7 + b) // 2 ** 3 if a > 1 else 0"), &vars))
    });
    g.bench_function("eval_strings", |b| {
        b.iter(|| eval_str(black_box("upper(s) + str(len(s) * a)"), &vars))
    });
    g.bench_function("substitute", |b| {
        b.iter(|| substitute(black_box(line), |n| vars.get(n).map(Value::to_string)))
    });
    g.finish();
}

criterion_group!(benches, bench_render, bench_pieces);
criterion_main!(benches);
