use quill_engine::{render, RenderError, Template, TemplateOptions, PARAMETER_NAME};

#[test]
fn test_default_placeholders_are_registered() {
    let template = Template::new("");
    for kind in ["int", "long", "double", "char", "boolean", "list", "object"] {
        assert!(template.placeholders().contains(kind, kind), "{kind}");
    }
    assert!(!template.placeholders().contains("string", "string"));
}

#[test]
fn test_overriding_the_int_placeholder() {
    let output = render(
        "@define_placeholder(int)<@var(__param__.toString())>@end_define_placeholder\
         @var x = 5 @var s = \"text\" @var(x) @var(s)",
    )
    .unwrap();
    assert_eq!(output, "<5> text");
}

#[test]
fn test_parameter_binding() {
    let output = render(
        "@define_placeholder(item, item, value)[@var(value)]@end_define_placeholder \
         @for(x: @list(\"a\", \"b\"))@placeholder(item, x)@endfor",
    )
    .unwrap();
    assert_eq!(output, "[a][b]");
}

#[test]
fn test_default_parameter_name() {
    let text = format!(
        "@define_placeholder(shout)@var({PARAMETER_NAME})!@end_define_placeholder \
         @placeholder(shout, \"hey\")"
    );
    assert_eq!(render(&text).unwrap(), "hey!");
}

#[test]
fn test_placeholder_sees_defining_scope() {
    let mut template = Template::new(
        "@define_placeholder(sig)-- @var(author)@end_define_placeholder@use_placeholder(sig)",
    );
    template.model().put_value("author", "Ann");
    assert_eq!(template.render().unwrap(), "-- Ann");
}

#[test]
fn test_placeholder_scope_is_cleared_between_invocations() {
    let output = render(
        "@define_placeholder(once)@var seen = 1 @var(seen)@end_define_placeholder \
         @use_placeholder(once)@use_placeholder(once)",
    )
    .unwrap();
    assert_eq!(output, "11");
}

#[test]
fn test_missing_argument_leaves_parameter_unbound() {
    let output = render(
        "@define_placeholder(p, p, arg)@var(arg)@end_define_placeholder@placeholder(p)",
    );
    assert!(matches!(output, Err(RenderError::Reference(_))));
}

#[test]
fn test_native_writes_without_default_placeholders() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("quill_engine=warn")
        .with_test_writer()
        .try_init();

    let mut template = Template::with_options(
        "@var(n) @var(d) @var(xs)",
        TemplateOptions::new().with_default_placeholders(false),
    );
    template
        .model()
        .put_value("n", 7)
        .put_value("d", 1.0)
        .put_list("xs", ['a', 'b']);
    assert!(template.placeholders().is_empty());
    assert_eq!(template.render().unwrap(), "7 1.0 a,b");
}

#[test]
fn test_breakfor_in_placeholder_is_rejected() {
    assert!(matches!(
        render("@for(i = 0; i < 2; i++)@define_placeholder(p)@breakfor@end_define_placeholder@use_placeholder(p)@endfor"),
        Err(RenderError::Parse { .. })
    ));
}

#[test]
fn test_self_invoking_placeholder_is_an_error() {
    let result = render(
        "@define_placeholder(int)<@var(__param__)>@end_define_placeholder\
         @var x = 5 @var(x)",
    );
    match result {
        Err(RenderError::Reference(message)) => assert!(message.contains("int"), "{message}"),
        other => panic!("expected a reference error, got {other:?}"),
    }
}

#[test]
fn test_nested_placeholders_below_the_limit() {
    let output = render(
        "@define_placeholder(inner)[@var(__param__)]@end_define_placeholder\
         @define_placeholder(outer)(@placeholder(inner, __param__))@end_define_placeholder\
         @placeholder(outer, \"x\")",
    )
    .unwrap();
    assert_eq!(output, "([x])");
}
