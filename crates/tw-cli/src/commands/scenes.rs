use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(input: &Path) -> Result<(), String> {
    let graph = super::load_story(input)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Scene", "Choices", "Leads to", "Icon", "Color"]);

    for scene in graph.scenes() {
        let targets = if scene.is_terminal() {
            "(end)".to_string()
        } else {
            scene
                .choices
                .iter()
                .map(|c| {
                    if graph.contains(&c.next) {
                        c.next.clone()
                    } else {
                        format!("{}?", c.next)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            scene.id.clone(),
            scene.choices.len().to_string(),
            targets,
            scene.icon.clone().unwrap_or_else(|| "—".to_string()),
            scene.color.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} scenes", graph.len());

    Ok(())
}
