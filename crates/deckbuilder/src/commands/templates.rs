use colored::Colorize;

use deckbuilder::deck::templates;

pub fn run() {
    println!("{}", "Slide templates".bold());
    for template in templates::catalog() {
        let slots: Vec<String> = template
            .kind
            .position_keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        let slots = if slots.is_empty() {
            "no images".to_string()
        } else {
            slots.join(", ")
        };
        println!(
            "  {} {:<24} {}",
            format!("{:<24}", template.id).cyan(),
            template.name,
            format!("{} ({slots})", template.kind).dimmed()
        );
    }
}
