//! Interactive terminal session over the runtime engine.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::{ColoredString, Colorize};

use tw_engine::save::format_timestamp;
use tw_engine::{
    Action, FileStore, Frame, OverlayKind, RuntimeEngine, SceneView, StatusKind, View,
};

pub fn run(input: &Path, saves: &Path) -> Result<(), String> {
    let graph = super::load_story(input)?;
    let mut engine = RuntimeEngine::new(graph, FileStore::new(saves));
    let mut view = TerminalView::default();

    println!("  {} {}", "Playing".bold(), input.display());
    println!("  Type a choice number, 'help' for commands, 'quit' to exit.");

    view.redraw = true;
    engine.dispatch(Action::Start, &mut view);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let choices = engine.frame().scene.map(|s| s.choices).unwrap_or_default();
        match parse_input(&line, &choices) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Look => {
                view.redraw = true;
                view.present(&engine.frame());
            }
            Input::Act(action) => {
                view.redraw = matches!(action, Action::Navigate(_) | Action::Load(_));
                engine.dispatch(action, &mut view);
            }
            Input::Invalid(message) => println!("{}", message.yellow()),
        }
    }

    Ok(())
}

/// One line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Help,
    Look,
    Act(Action),
    Invalid(String),
}

fn parse_input(line: &str, choices: &[tw_engine::ChoiceView]) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    if let Ok(n) = trimmed.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| choices.get(i)) {
            Some(choice) => Input::Act(Action::Navigate(choice.target.clone())),
            None => Input::Invalid(format!("no choice {n}; pick 1 to {}", choices.len())),
        };
    }

    let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (trimmed, ""),
    };

    match (cmd.to_lowercase().as_str(), rest) {
        ("quit" | "q" | "exit", _) => Input::Quit,
        ("help" | "?", _) => Input::Help,
        ("look" | "l", _) => Input::Look,
        ("save", "") => Input::Act(Action::Save(None)),
        ("save", name) => Input::Act(Action::Save(Some(name.to_string()))),
        ("slots" | "load", "") => Input::Act(Action::OpenOverlay(OverlayKind::Load)),
        ("load", id) => Input::Act(Action::Load(id.to_string())),
        ("delete", "") => Input::Invalid("usage: delete <slot id>".to_string()),
        ("delete", id) => Input::Act(Action::Delete(id.to_string())),
        ("close", _) => Input::Act(Action::CloseOverlay),
        ("go", "") => Input::Invalid("usage: go <scene>".to_string()),
        ("go", scene) => Input::Act(Action::Navigate(scene.to_string())),
        _ => Input::Invalid(format!("unknown command '{cmd}'; type 'help'")),
    }
}

fn print_help() {
    println!("  <number>       follow a choice");
    println!("  look           show the current scene again");
    println!("  save [name]    save the game");
    println!("  slots          list saved games");
    println!("  load <id>      load a saved game");
    println!("  delete <id>    delete a saved game");
    println!("  close          close the slot list");
    println!("  go <scene>     jump to a scene by name");
    println!("  quit           leave the story");
}

/// Prints frames to stdout.
///
/// The scene is only drawn when it changes or `redraw` is set, so status-only
/// frames (saving, deleting) do not repeat the whole page.
#[derive(Default)]
struct TerminalView {
    last_scene: Option<SceneView>,
    redraw: bool,
}

impl View for TerminalView {
    fn present(&mut self, frame: &Frame) {
        if let Some(status) = &frame.status {
            let message = match status.kind {
                StatusKind::Success => status.message.green(),
                StatusKind::Error => status.message.red(),
                StatusKind::Info => status.message.cyan(),
            };
            println!("  {message}");
        }

        if let Some(overlay) = &frame.overlay {
            println!();
            println!("  {}", "Saved games".bold());
            if overlay.slots.is_empty() {
                println!("  No saved games.");
            }
            for slot in &overlay.slots {
                println!(
                    "  {:>14}  {}  {}",
                    slot.id,
                    slot.name,
                    format!(
                        "(scene {}, {})",
                        slot.scene_id,
                        format_timestamp(slot.timestamp)
                    )
                    .dimmed()
                );
            }
            println!();
        } else if let Some(scene) = &frame.scene {
            let changed = self.last_scene.as_ref() != Some(scene);
            if changed || (self.redraw && !frame.is_error()) {
                print_scene(scene);
            }
            self.last_scene = Some(scene.clone());
        }
        self.redraw = false;
    }
}

fn print_scene(scene: &SceneView) {
    println!();
    println!("  {} {}", scene.icon, accent(&scene.title, &scene.color).bold());
    println!();
    for paragraph in plain_text(&scene.body) {
        println!("  {paragraph}");
        println!();
    }
    if let Some(marker) = &scene.terminal {
        println!("  {}", marker.dimmed());
    }
    for (i, choice) in scene.choices.iter().enumerate() {
        println!("  {} {}", format!("{})", i + 1).bold(), choice.text);
    }
}

/// Colors text with a `#RGB` or `#RRGGBB` accent, if it parses.
fn accent(text: &str, color: &str) -> ColoredString {
    match hex_rgb(color) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// Turns body markup back into plain paragraphs.
fn plain_text(markup: &str) -> Vec<String> {
    let inner = markup
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(markup);
    inner
        .split("</p><p>")
        .filter(|p| !p.is_empty())
        .map(unescape_html)
        .collect()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
