use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use quill_engine::{Template, TemplateOptions};

// --- Data Generation ---
// A loop body with reads, arithmetic and a nested condition, replayed once
// per iteration.
fn loop_template(iterations: usize) -> String {
    format!(
        "@for(i = 0; i < {iterations}; i + 1)\
         @var odd = i * 2 + 1 [@var(i)] @var(items[i % 4]) = @var(odd)\
         @if(i % 2 == 0) even@else odd@endif\n\
         @endfor"
    )
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let iterations = 1_000;
    let text = loop_template(iterations);
    group.throughput(Throughput::Elements(iterations as u64));

    // Fresh template each time: every block is parsed once, then replayed.
    group.bench_function("parse_and_render_loop", |b| {
        b.iter(|| {
            let mut template = Template::with_options(text.as_str(), TemplateOptions::new());
            template.model().put_list("items", ["a", "b", "c", "d"]);
            black_box(template.render().unwrap())
        })
    });

    // Same template rendered repeatedly: replay only.
    let mut template = Template::new(text.as_str());
    template.model().put_list("items", ["a", "b", "c", "d"]);
    group.bench_function("replay_loop", |b| {
        b.iter(|| black_box(template.render().unwrap()))
    });

    group.finish();
}

fn bench_passthrough(c: &mut Criterion) {
    let text = "plain text without any directive, repeated. ".repeat(2_000);
    let mut group = c.benchmark_group("passthrough");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("render_plain_text", |b| {
        b.iter(|| black_box(quill_engine::render(&text).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_render, bench_passthrough);
criterion_main!(benches);
