use tracing::{debug, warn};
use tw_core::{Choice, Scene, StoryGraph, parse_hex_color};

use crate::diagnostics::{Diagnostic, Severity, Span};
use crate::error::{DslError, DslResult};
use crate::lexer::{ChoiceToken, MetadataItem, metadata_body, parse_metadata, scan_choices};
use crate::options::CompilerOptions;
use crate::paragraph::Paragraph;

/// Result of compiling a paragraph stream into a story graph.
#[derive(Debug)]
pub struct CompileResult {
    /// The compiled graph (empty if the document had no scenes).
    pub graph: StoryGraph,
    /// Errors and warnings produced during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileResult {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Warning diagnostics only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// The graph, or [`DslError::EmptyGraph`] if no scene was found.
    pub fn into_graph(self) -> DslResult<StoryGraph> {
        if self.graph.is_empty() {
            Err(DslError::EmptyGraph)
        } else {
            Ok(self.graph)
        }
    }
}

/// Compile a paragraph stream, collecting diagnostics.
pub fn compile_stream<'a, I>(paragraphs: I, options: &CompilerOptions) -> CompileResult
where
    I: IntoIterator<Item = &'a Paragraph>,
{
    let mut compiler = Compiler::new(options);
    for paragraph in paragraphs {
        compiler.feed(paragraph);
    }
    compiler.finish()
}

/// Compile a paragraph stream into a story graph.
///
/// Fails with [`DslError::EmptyGraph`] if no heading paragraph is found.
/// Warnings are logged and otherwise dropped; use [`compile_stream`] to
/// inspect them.
pub fn compile(paragraphs: &[Paragraph], options: &CompilerOptions) -> DslResult<StoryGraph> {
    compile_stream(paragraphs, options).into_graph()
}

/// Where the active scene is in its lifecycle.
///
/// Metadata is only recognized before the first body paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SceneState {
    AwaitingMetadata,
    AccumulatingBody,
}

/// Classification of one non-empty paragraph, in priority order.
#[derive(Debug)]
enum Line<'t> {
    Heading(&'t str),
    Metadata(&'t str),
    Choices(Vec<ChoiceToken>),
    Text(&'t str),
}

struct ActiveScene {
    scene: Scene,
    body: Vec<String>,
    state: SceneState,
    // Redefinition of an existing id; everything collected is discarded.
    duplicate: bool,
}

impl ActiveScene {
    fn new(id: &str, duplicate: bool) -> Self {
        Self {
            scene: Scene::new(id),
            body: Vec::new(),
            state: SceneState::AwaitingMetadata,
            duplicate,
        }
    }

    fn apply_metadata(&mut self, body: &str, span: &Span, diagnostics: &mut Vec<Diagnostic>) {
        for item in parse_metadata(body) {
            match item {
                MetadataItem::Icon(icon) => self.scene.icon = Some(icon.to_string()),
                MetadataItem::Color(value) => match parse_hex_color(value) {
                    Some(color) => self.scene.color = Some(color),
                    None => report(
                        diagnostics,
                        Diagnostic::warning(
                            span.clone(),
                            format!(
                                "invalid color format \"{value}\" in scene \"{}\"; skipping",
                                self.scene.id
                            ),
                        )
                        .with_label("expected #RGB or #RRGGBB")
                        .with_note("the scene keeps its previous color, or none"),
                    ),
                },
                MetadataItem::Unknown { key, .. } => report(
                    diagnostics,
                    Diagnostic::warning(span.clone(), format!("unknown metadata key \"{key}\""))
                        .with_label("supported keys: icon, color"),
                ),
                MetadataItem::Malformed(entry) => report(
                    diagnostics,
                    Diagnostic::warning(
                        span.clone(),
                        format!("malformed metadata entry \"{entry}\""),
                    )
                    .with_label("expected key=value"),
                ),
            }
        }
    }

    fn add_choices(&mut self, tokens: Vec<ChoiceToken>, span: &Span, diagnostics: &mut Vec<Diagnostic>) {
        for token in tokens {
            if token.target.is_empty() {
                let at = span.start + token.span.start..span.start + token.span.end;
                report(
                    diagnostics,
                    Diagnostic::warning(at, format!("choice \"{}\" has an empty target", token.label))
                        .with_label("this choice leads nowhere"),
                );
            }
            self.scene.choices.push(Choice::new(token.label, token.target));
        }
    }

    fn add_body(&mut self, text: &str) {
        self.body.push(text.to_string());
        self.state = SceneState::AccumulatingBody;
    }

    fn into_scene(self) -> Scene {
        let mut scene = self.scene;
        scene.text = body_markup(&self.body);
        scene
    }
}

struct Compiler<'o> {
    options: &'o CompilerOptions,
    graph: StoryGraph,
    diagnostics: Vec<Diagnostic>,
    active: Option<ActiveScene>,
    // Byte offset of the next paragraph in the listing.
    offset: usize,
}

impl<'o> Compiler<'o> {
    fn new(options: &'o CompilerOptions) -> Self {
        Self {
            options,
            graph: StoryGraph::new(),
            diagnostics: Vec::new(),
            active: None,
            offset: 0,
        }
    }

    fn feed(&mut self, paragraph: &Paragraph) {
        let start = self.offset;
        self.offset += paragraph.text.len() + 1;

        let text = paragraph.text.trim();
        if text.is_empty() {
            return;
        }
        let lead = paragraph.text.len() - paragraph.text.trim_start().len();
        let span = start + lead..start + lead + text.len();

        let line = self.classify(&paragraph.style, text);
        if let Line::Heading(id) = line {
            self.open_scene(id, span);
            return;
        }

        let Some(active) = self.active.as_mut() else {
            debug!(text, "ignoring text before the first scene");
            return;
        };
        match line {
            Line::Metadata(body) => active.apply_metadata(body, &span, &mut self.diagnostics),
            Line::Choices(tokens) => active.add_choices(tokens, &span, &mut self.diagnostics),
            Line::Text(text) => active.add_body(text),
            Line::Heading(_) => {}
        }
    }

    fn classify<'t>(&self, style: &str, text: &'t str) -> Line<'t> {
        if self.options.is_heading(style) {
            return Line::Heading(text);
        }
        let awaiting_metadata = self
            .active
            .as_ref()
            .is_some_and(|a| a.state == SceneState::AwaitingMetadata);
        if awaiting_metadata {
            if let Some(body) = metadata_body(text) {
                return Line::Metadata(body);
            }
        }
        let choices = scan_choices(text);
        if !choices.is_empty() {
            return Line::Choices(choices);
        }
        Line::Text(text)
    }

    fn open_scene(&mut self, id: &str, span: Span) {
        self.flush();

        let duplicate = self.graph.contains(id);
        if duplicate {
            report(
                &mut self.diagnostics,
                Diagnostic::warning(
                    span,
                    format!("duplicate scene \"{id}\"; keeping the first definition"),
                )
                .with_label("this scene is ignored")
                .with_note("scene titles are compared without regard to case"),
            );
        } else {
            debug!(scene = id, "found scene");
        }
        self.active = Some(ActiveScene::new(id, duplicate));
    }

    fn flush(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if active.duplicate {
            return;
        }
        if let Err(e) = self.graph.insert(active.into_scene()) {
            self.diagnostics.push(Diagnostic::error(0..0, e.to_string()));
        }
    }

    fn finish(mut self) -> CompileResult {
        self.flush();
        if self.graph.is_empty() {
            self.diagnostics
                .push(Diagnostic::error(0..0, DslError::EmptyGraph.to_string()).with_note(
                    format!(
                        "scene titles are paragraphs styled \"{}\"",
                        self.options.heading_style
                    ),
                ));
        }
        CompileResult {
            graph: self.graph,
            diagnostics: self.diagnostics,
        }
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{}", diagnostic.message);
    diagnostics.push(diagnostic);
}

/// Joins body paragraphs into `<p>` elements, escaping each paragraph.
fn body_markup(body: &[String]) -> String {
    let escaped: Vec<String> = body.iter().map(|p| escape_html(p)).collect();
    format!("<p>{}</p>", escaped.join("</p><p>"))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
