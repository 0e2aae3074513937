pub mod build;
pub mod check;
pub mod export;
pub mod play;
pub mod scenes;

use std::path::Path;

use tw_core::StoryGraph;
use tw_dsl::diagnostics::{Severity, count, render_diagnostics};
use tw_dsl::paragraph::listing;
use tw_dsl::{CompileResult, CompilerOptions, DslError, ParagraphSource, TextDocument};

/// Compile a story document and print diagnostics.
/// Returns the compiled graph if there are no errors.
fn compile_story(input: &Path) -> Result<StoryGraph, String> {
    let document = TextDocument::open(input).map_err(|e| e.to_string())?;
    let result = tw_dsl::compile_stream(document.paragraphs(), &CompilerOptions::default());
    print_diagnostics(&result, &listing(document.paragraphs()), input);

    if result.has_errors() {
        Err("compilation failed with errors".into())
    } else {
        Ok(result.graph)
    }
}

/// Load a story from a document, or from the data embedded in a generated
/// HTML player.
fn load_story(input: &Path) -> Result<StoryGraph, String> {
    let is_html = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    if !is_html {
        return compile_story(input);
    }

    let document = std::fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?;
    let graph =
        tw_core::artifact::extract(&document).map_err(|e| format!("{}: {e}", input.display()))?;
    if graph.is_empty() {
        return Err(DslError::EmptyGraph.to_string());
    }
    Ok(graph)
}

/// Print diagnostics to stderr using ariadne.
fn print_diagnostics(result: &CompileResult, source: &str, input: &Path) {
    if result.diagnostics.is_empty() {
        return;
    }

    let filename = input.display().to_string();
    let rendered = render_diagnostics(source, &filename, &result.diagnostics);
    eprint!("{rendered}");

    let errors = count(&result.diagnostics, Severity::Error);
    let warnings = count(&result.diagnostics, Severity::Warning);

    if errors > 0 {
        eprintln!(
            "  {errors} error{}, {warnings} warning{}",
            plural(errors),
            plural(warnings),
        );
    } else if warnings > 0 {
        eprintln!("  {warnings} warning{}", plural(warnings));
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
