use crate::block::{BlockId, BlockKind};
use crate::destination::DestinationStream;
use crate::embedding::{EmbeddingManager, NoEmbeddings};
use crate::error::Result;
use crate::placeholder::PlaceholderRegistry;
use crate::session::Session;
use crate::value::{ObjectMut, ScopeArena, ScopeId};
use quill_stream::{SourceStream, TextSourceStream};

/// Render configuration.
pub struct TemplateOptions {
    default_placeholders: bool,
    global_name: String,
    embeddings: Box<dyn EmbeddingManager>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            default_placeholders: true,
            global_name: "Global".to_string(),
            embeddings: Box::new(NoEmbeddings),
        }
    }
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the built-in placeholders for non-string kinds are
    /// registered. Without them values are written natively.
    pub fn with_default_placeholders(mut self, enabled: bool) -> Self {
        self.default_placeholders = enabled;
        self
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = name.into();
        self
    }

    /// The manager `@embed` asks for nested sources.
    pub fn with_embeddings(mut self, embeddings: impl EmbeddingManager + 'static) -> Self {
        self.embeddings = Box::new(embeddings);
        self
    }
}

/// A template bound to its render session.
///
/// The model (the Global scope) is filled through [`Template::model`] before
/// rendering. Blocks are parsed on first execution and replayed from cache
/// afterwards, also across calls to [`Template::render`]. Declarations made
/// by the template stay in the model, so a template that declares top-level
/// variables can only be rendered once.
///
/// ```
/// use quill_engine::Template;
///
/// let mut template = Template::new("Hello @var(name)!");
/// template.model().put_value("name", "world");
/// assert_eq!(template.render().unwrap(), "Hello world!");
/// ```
pub struct Template {
    session: Session,
    root: BlockId,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_options(text, TemplateOptions::default())
    }

    pub fn with_options(text: impl Into<String>, options: TemplateOptions) -> Self {
        Self::from_stream(TextSourceStream::new(text), options)
    }

    /// Renders from any source, such as a [`quill_stream::CountingStream`].
    pub fn from_stream(stream: impl SourceStream + 'static, options: TemplateOptions) -> Self {
        let TemplateOptions {
            default_placeholders,
            global_name,
            embeddings,
        } = options;
        let mut session = Session::new(&global_name, embeddings);
        if default_placeholders {
            session.seed_default_placeholders();
        }
        let source = session.add_source(Box::new(stream));
        let root = session.add_root_block(source, ScopeId::GLOBAL, BlockKind::Root);
        Self { session, root }
    }

    /// The Global scope, for the host to populate.
    pub fn model(&mut self) -> ObjectMut<'_> {
        self.session.scopes.object_mut(ScopeId::GLOBAL)
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.session.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeArena {
        &mut self.session.scopes
    }

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.session.placeholders
    }

    pub fn render(&mut self) -> Result<String> {
        let mut output = String::new();
        self.render_to(&mut output)?;
        Ok(output)
    }

    /// Renders into `destination`. On error, what was written so far stays.
    pub fn render_to(&mut self, destination: &mut dyn DestinationStream) -> Result<()> {
        self.session.execute(self.root, destination)
    }

    /// Pointer of the template source.
    pub fn pointer(&self) -> usize {
        self.session.source(self.session.block(self.root).source).pointer()
    }

    /// Number of block ranges parsed so far, built-in placeholders included.
    pub fn parse_count(&self) -> usize {
        self.session.parse_count()
    }
}

/// Renders `text` against an empty model.
pub fn render(text: &str) -> Result<String> {
    Template::new(text).render()
}
