use std::path::Path;

pub fn run(input: &Path) -> Result<(), String> {
    let graph = super::compile_story(input)?;

    println!("  All checks passed for '{}'.", input.display());
    println!("  {} scenes, {} choices", graph.len(), graph.choice_count());

    // Unwritten targets are legal; they only fail when a player follows them.
    let unresolved = graph.unresolved_targets();
    if !unresolved.is_empty() {
        println!();
        println!("  Choices leading to scenes not written yet:");
        for (scene, target) in unresolved {
            println!("    {scene} -> {target}");
        }
    }

    Ok(())
}
