use std::path::Path;

pub fn run(input: &Path, output: Option<&Path>) -> Result<(), String> {
    let graph = super::compile_story(input)?;
    let json =
        tw_core::artifact::to_json(&graph).map_err(|e| format!("JSON serialization error: {e}"))?;

    if let Some(path) = output {
        std::fs::write(path, format!("{json}\n"))
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        println!("{json}");
    }

    Ok(())
}
