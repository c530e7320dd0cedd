//! # Quill Engine
//!
//! 指令模板引擎:解析以 `@` 开头的指令(变量、常量、三种 `@for` 循环、
//! `@breakfor`、占位符、`@if` 与 `@embed`),并把结果写入目标流。
//!
//! ## 设计
//!
//! - **惰性块**:每个指令体只记录源中的范围,首次执行时解析并缓存节点,
//!   之后的执行(例如循环的每一轮)直接重放缓存。
//! - **识别器链**:按固定顺序尝试各个指令识别规则,第一个匹配的规则生效。
//! - **作用域竞技场**:作用域和对象保存在 [`ScopeArena`] 中,通过索引引用父作用域。
//!
//! ## 使用示例
//!
//! ```
//! use quill_engine::Template;
//!
//! let mut template = Template::new("@for(i = 0; i < 3; i + 1)@var(i)@endfor");
//! assert_eq!(template.render().unwrap(), "012");
//! ```

mod block;
mod destination;
mod embedding;
mod error;
mod node;
pub mod operator;
pub mod parser;
mod placeholder;
mod session;
mod template;
pub mod value;

pub use block::{BlockId, BlockKind};
pub use destination::DestinationStream;
pub use embedding::{EmbeddingManager, InMemoryEmbeddings, NoEmbeddings};
pub use error::{RenderError, Result};
pub use operator::{ArithmeticOperator, ConditionType};
pub use placeholder::{PlaceholderEntry, PlaceholderKey, PlaceholderRegistry, PARAMETER_NAME};
pub use template::{render, Template, TemplateOptions};
pub use value::{
    BuiltinMethod, Invocation, ListValue, NativeFunction, ObjectMut, Primitive, ScopeArena,
    ScopeId, TemplateFunction, Value, ValueKind,
};
