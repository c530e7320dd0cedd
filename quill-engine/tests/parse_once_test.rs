use quill_engine::{Template, TemplateOptions};
use quill_stream::{CountingStream, ReadCounter, TextSourceStream};

fn counted(text: &str) -> (Template, ReadCounter) {
    let stream = CountingStream::new(TextSourceStream::new(text));
    let reads = stream.reads();
    (Template::from_stream(stream, TemplateOptions::new()), reads)
}

#[test]
fn test_second_render_does_not_read_the_source() {
    let (mut template, reads) = counted("@for(i = 0; i < 3; i++)<@var(i)>@endfor done");
    let first = template.render().unwrap();
    assert!(reads.get() > 0);
    let parsed = template.parse_count();

    reads.reset();
    let second = template.render().unwrap();
    assert_eq!(first, "<0><1><2> done");
    assert_eq!(first, second);
    assert_eq!(reads.get(), 0);
    assert_eq!(template.parse_count(), parsed);
}

#[test]
fn test_iterations_do_not_reparse_the_body() {
    let text = "@for(i = 0; i < n; i++)@var x = i * 2 [@var(x)]@endfor";

    let (mut once, once_reads) = counted(text);
    once.model().put_value("n", 1);
    once.render().unwrap();

    let (mut many, many_reads) = counted(text);
    many.model().put_value("n", 50);
    let output = many.render().unwrap();

    assert!(output.ends_with("[98]"));
    assert_eq!(once_reads.get(), many_reads.get());
    assert_eq!(once.parse_count(), many.parse_count());
}

#[test]
fn test_blocks_that_never_run_are_never_parsed() {
    let (mut template, _) = counted("@if(false)@var(broken(@endif ok");
    assert_eq!(template.render().unwrap(), " ok");
    // Only the root block went through the parser.
    assert_eq!(template.parse_count(), 1);
}
