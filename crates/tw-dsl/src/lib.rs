//! Scene graph compiler for Taleweaver story documents.
//!
//! A story document is read as a stream of styled paragraphs. `Heading 1`
//! paragraphs open scenes; the lines after a heading are classified as a
//! metadata line, a choice line, or body text, and folded into the scene.

/// Scene graph compiler.
pub mod compiler;
/// Located diagnostics and terminal rendering.
pub mod diagnostics;
/// Fatal compilation errors.
pub mod error;
/// Choice and metadata markup lexing.
pub mod lexer;
/// Compiler options.
pub mod options;
/// Paragraph stream model and the plain-text document reader.
pub mod paragraph;

use std::path::Path;

pub use compiler::{CompileResult, compile, compile_stream};
pub use diagnostics::Diagnostic;
pub use error::{DslError, DslResult};
pub use options::CompilerOptions;
pub use paragraph::{Paragraph, ParagraphSource, TextDocument};

/// Compile a plain-text story document held in memory.
pub fn compile_source(source: &str) -> CompileResult {
    let document = TextDocument::parse(source);
    compile_stream(document.paragraphs(), &CompilerOptions::default())
}

/// Read and compile a plain-text story document.
///
/// Fails only if the file is missing or unreadable; an empty story is
/// reported through the result's diagnostics.
pub fn compile_file(path: &Path, options: &CompilerOptions) -> DslResult<CompileResult> {
    let document = TextDocument::open(path)?;
    Ok(compile_stream(document.paragraphs(), options))
}
