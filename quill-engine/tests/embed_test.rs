use quill_engine::{render, InMemoryEmbeddings, RenderError, Template, TemplateOptions};

fn with_embeddings(text: &str, embeddings: InMemoryEmbeddings) -> Template {
    Template::with_options(text, TemplateOptions::new().with_embeddings(embeddings))
}

#[test]
fn test_embed_writes_nested_source() {
    let embeddings = InMemoryEmbeddings::new().with_source("header.kte", "== @var(title) ==");
    let mut template = with_embeddings("@embed header.kte\nbody", embeddings);
    template.model().put_value("title", "Report");
    assert_eq!(template.render().unwrap(), "== Report ==body");
}

#[test]
fn test_embedded_declarations_land_in_requesting_scope() {
    let embeddings = InMemoryEmbeddings::new().with_source("vars", "@var greeting = \"hi\" ");
    let mut template = with_embeddings("@embed vars @var(greeting)", embeddings);
    assert_eq!(template.render().unwrap(), "hi");
}

#[test]
fn test_embed_inside_loop() {
    let embeddings = InMemoryEmbeddings::new().with_source("cell", "(@var(i))");
    let mut template = with_embeddings("@for(i = 0; i < 3; i++)@embed cell @endfor", embeddings);
    assert_eq!(template.render().unwrap(), "(0)(1)(2)");
}

#[test]
fn test_breakfor_inside_embedded_source_leaves_the_loop() {
    let embeddings =
        InMemoryEmbeddings::new().with_source("cell", "@if(i == 2)@breakfor @endif[@var(i)]");
    let mut template = with_embeddings("@for(i = 0; i < 5; i++)@embed cell @endfor", embeddings);
    assert_eq!(template.render().unwrap(), "[0][1]");
}

#[test]
fn test_breakfor_in_embed_outside_a_loop() {
    let embeddings = InMemoryEmbeddings::new().with_source("stop", "@breakfor ");
    let mut template = with_embeddings("@embed stop ", embeddings);
    assert!(matches!(template.render(), Err(RenderError::Parse { .. })));
}

#[test]
fn test_unknown_embedding_is_reference_error() {
    assert!(matches!(
        render("@embed nowhere"),
        Err(RenderError::Reference(_))
    ));
}

#[test]
fn test_self_embedding_source_is_an_error() {
    let embeddings = InMemoryEmbeddings::new().with_source("again", "x@embed again ");
    let mut template = with_embeddings("@embed again ", embeddings);
    let mut output = String::new();
    let result = template.render_to(&mut output);
    assert!(matches!(result, Err(RenderError::Reference(_))));
    assert!(output.starts_with("xxx"));
}
