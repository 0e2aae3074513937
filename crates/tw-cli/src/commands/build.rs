use std::path::Path;

use tracing::debug;

/// HTML player the story data is embedded into.
const PLAYER_TEMPLATE: &str = include_str!("../../assets/player.html");

pub fn run(input: &Path, output: &Path) -> Result<(), String> {
    let graph = super::compile_story(input)?;

    let html = tw_core::artifact::embed(PLAYER_TEMPLATE, &graph).map_err(|e| e.to_string())?;
    std::fs::write(output, &html)
        .map_err(|e| format!("cannot write to {}: {e}", output.display()))?;
    debug!(output = %output.display(), bytes = html.len(), "artifact written");

    println!("  Compiled '{}' successfully.", input.display());
    println!();
    println!("  {} scenes, {} choices", graph.len(), graph.choice_count());
    if let Some(entry) = graph.entry_scene() {
        println!("  Story starts at '{}'.", entry.id);
    }
    println!("  Written to {}", output.display());

    Ok(())
}
