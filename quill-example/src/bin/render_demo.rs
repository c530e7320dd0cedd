//! 模板渲染示例
//!
//! 本示例展示了如何使用 quill-engine 渲染一个带指令的模板:
//!
//! 1. 通过 `Template::model()` 向 Global 作用域写入宿主数据和函数
//! 2. 使用 `@var`、`@for`、`@if`、`@define_placeholder` 和 `@embed` 生成文本
//! 3. 用 `CountingStream` 观察第二次渲染没有重新解析源文本
//!
//! 日志通过 `RUST_LOG` 控制,例如:
//!
//! ```text
//! RUST_LOG=quill_engine=debug cargo run --bin render-demo
//! ```

use quill_engine::{InMemoryEmbeddings, RenderError, Template, TemplateOptions, Value};
use quill_stream::{CountingStream, TextSourceStream};
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = "\
@embed header
@define_placeholder(row, row, item)[@var(item.name) x@var(item.count) = \
@var subtotal = item.price * item.count @var(subtotal)]@end_define_placeholder
items: @for(item, n: items)@if(n < limit)@placeholder(row, item),@endif@endfor
total: @var(callSum(9 + 3, 2 * 2))
tags: @var(tags)
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== 模板渲染示例 ===\n");

    let stream = CountingStream::new(TextSourceStream::new(TEMPLATE));
    let reads = stream.reads();
    let embeddings = InMemoryEmbeddings::new().with_source("header", "# @var(title)\n");
    let mut template =
        Template::from_stream(stream, TemplateOptions::new().with_embeddings(embeddings));

    template
        .model()
        .put_value("title", "Order summary")
        .put_value("limit", 2)
        .put_mutable_list("tags", ["rust", "templates"])
        .put_function("callSum", |arguments: &[Value]| {
            arguments.iter().try_fold(Value::from(0), |sum, argument| {
                match (sum.as_int(), argument.as_int()) {
                    (Some(sum), Some(argument)) => Ok(Value::from(sum + argument)),
                    _ => Err(RenderError::type_error("callSum expects ints")),
                }
            })
        });

    // 每个商品是 catalog 下的一个对象,列表只保存对象引用
    let scopes = template.scopes_mut();
    let catalog = scopes.put_object(scopes.global(), "catalog");
    let items: Vec<Value> = [("apple", 3, 2), ("pear", 5, 1), ("plum", 2, 6)]
        .into_iter()
        .map(|(name, price, count)| {
            let item = scopes.put_object(catalog, name);
            scopes
                .object_mut(item)
                .put_value("name", name)
                .put_value("price", price)
                .put_value("count", count);
            Value::Object(item)
        })
        .collect();
    template.model().put_value("items", Value::list(items));

    match template.render() {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("render failed: {err}");
            return;
        }
    }
    println!("\n首次渲染读取字符数: {}", reads.get());

    reads.reset();
    match template.render() {
        Ok(_) => println!("再次渲染读取字符数: {} (解析结果已缓存)", reads.get()),
        Err(err) => eprintln!("second render failed: {err}"),
    }
}
