//! `deckbuilder run`: replay a YAML script against a fresh deck.
//!
//! A script is a list of steps. Each step is either a deck mutation in its
//! kebab-case form or one of the import helpers:
//!
//! ```yaml
//! - add-slide: { template: text-image-left }
//! - update-slide: { index: 1, edit: { set-title: "Why us" } }
//! - reorder-slide: { from: 1, to: 0 }
//! - import-images: [photos/harbour.jpg]
//! - note: { title: Talking points, content: "Open with the numbers" }
//! ```

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use deckbuilder::assets::ingest::{self, UploadPolicy};
use deckbuilder::config::Config;
use deckbuilder::deck::edit::released_urls;
use deckbuilder::deck::{DeckStore, Mutation, Presentation, Slide};
use deckbuilder::render;

use super::ingest::register;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Image files, relative to the script.
    ImportImages(Vec<PathBuf>),
    /// Knowledge files, relative to the script.
    ImportKnowledge(Vec<PathBuf>),
    /// A typed knowledge note.
    Note {
        #[serde(default)]
        title: Option<String>,
        content: String,
    },
    #[serde(untagged)]
    Mutate(Mutation),
}

pub fn parse(yaml: &str) -> Result<Vec<Step>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let steps: Option<Vec<Step>> = serde_yaml::from_str(yaml)?;
    Ok(steps.unwrap_or_default())
}

pub fn run(script: &Path, yaml: bool, quiet: bool) -> Result<()> {
    let contents = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read {}", script.display()))?;
    let steps = parse(&contents).with_context(|| format!("Invalid script {}", script.display()))?;
    let base = script.parent().unwrap_or(Path::new("."));

    let config = Config::load_or_default();
    let mut store = DeckStore::new(Presentation::with_initial_template(
        config.initial_template(),
    )?);
    let policy = config.upload_policy();

    let mut refused = 0;
    for (n, step) in steps.into_iter().enumerate() {
        if !apply(&mut store, step, base, &policy, n + 1)? {
            refused += 1;
        }
    }

    if yaml {
        print!("{}", serde_yaml::to_string(store.state())?);
    } else {
        print!("{}", render::outline(store.state()));
        if !quiet {
            println!("{}", render::library_summary(store.state()).dimmed());
        }
    }
    if refused > 0 && !quiet {
        eprintln!(
            "{}",
            format!("{refused} step(s) refused; the deck reflects the rest.").yellow()
        );
    }
    Ok(())
}

/// Apply one step. Returns `false` if the deck refused it.
fn apply(
    store: &mut DeckStore,
    step: Step,
    base: &Path,
    policy: &UploadPolicy,
    number: usize,
) -> Result<bool> {
    match step {
        Step::ImportImages(paths) => {
            let paths = resolve(base, paths);
            let report = ingest::ingest_paths(&paths, |f| ingest::ingest_image(f, policy));
            let failures = register(store, report, Mutation::AddImageAsset, |a| a.name.clone())?;
            Ok(failures == 0)
        }
        Step::ImportKnowledge(paths) => {
            let paths = resolve(base, paths);
            let report = ingest::ingest_paths(&paths, |f| ingest::ingest_knowledge(f, policy));
            let failures =
                register(store, report, Mutation::AddKnowledgeAsset, |a| a.title.clone())?;
            Ok(failures == 0)
        }
        Step::Note { title, content } => {
            let note = ingest::note(title.as_deref(), &content);
            store.dispatch(Mutation::AddKnowledgeAsset(note))?;
            Ok(true)
        }
        Step::Mutate(mutation) => {
            let label = mutation.label();
            let before = edited_slide(store.state(), &mutation).cloned();
            match store.dispatch(mutation) {
                Ok(state) => {
                    if let Some(before) = before {
                        let after = state.position_of(before.id()).and_then(|i| state.slide(i));
                        if let Some(after) = after {
                            for url in released_urls(&before, after) {
                                log::info!("Released {url}");
                            }
                        }
                    }
                    Ok(true)
                }
                Err(rejection) => {
                    eprintln!(
                        "  {} step {number} ({label}): {rejection}",
                        "refused".yellow()
                    );
                    Ok(false)
                }
            }
        }
    }
}

/// The slide an edit mutation targets, as it is before the edit.
fn edited_slide<'a>(deck: &'a Presentation, mutation: &Mutation) -> Option<&'a Slide> {
    match mutation {
        Mutation::UpdateSlide { index, .. } => deck.slide(*index),
        Mutation::EditSlide { id, .. } => deck.position_of(*id).and_then(|i| deck.slide(i)),
        _ => None,
    }
}

fn resolve(base: &Path, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .map(|p| if p.is_absolute() { p } else { base.join(p) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckbuilder::deck::{PositionKey, SlideEdit, SlideId, SlideSource};

    #[test]
    fn test_parse_script() {
        let steps = parse(
            r#"
- add-slide: { template: text-image-left }
- update-slide: { index: 1, edit: { set-title: "Why us" } }
- update-slide: { index: 1, edit: toggle-show-title }
- edit-slide: { id: 2, edit: { remove-bullet: { index: 0 } } }
- reorder-slide: { from: 1, to: 0 }
- import-images: [photos/harbour.jpg]
- note: { content: "Open with the numbers" }
"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 7);
        assert_eq!(
            steps[0],
            Step::Mutate(Mutation::AddSlide(SlideSource::Template(
                "text-image-left".into()
            )))
        );
        assert_eq!(
            steps[1],
            Step::Mutate(Mutation::UpdateSlide {
                index: 1,
                edit: SlideEdit::SetTitle("Why us".into())
            })
        );
        assert_eq!(
            steps[2],
            Step::Mutate(Mutation::UpdateSlide {
                index: 1,
                edit: SlideEdit::ToggleShowTitle
            })
        );
        assert_eq!(
            steps[3],
            Step::Mutate(Mutation::EditSlide {
                id: SlideId(2),
                edit: SlideEdit::RemoveBullet { index: 0 }
            })
        );
        assert_eq!(
            steps[5],
            Step::ImportImages(vec![PathBuf::from("photos/harbour.jpg")])
        );
        assert!(matches!(steps[6], Step::Note { title: None, .. }));
    }

    #[test]
    fn test_parse_empty_script() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_set_image_step() {
        let steps = parse(
            r#"
- update-slide:
    index: 0
    edit:
      set-image:
        position: grid2
        image: { url: "blob:abc", name: cat.png }
"#,
        )
        .unwrap();
        match &steps[0] {
            Step::Mutate(Mutation::UpdateSlide {
                edit: SlideEdit::SetImage { position, image },
                ..
            }) => {
                assert_eq!(*position, PositionKey::Grid(2));
                assert_eq!(image.as_ref().unwrap().url, "blob:abc");
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_refused_step_keeps_going() {
        let mut store = DeckStore::default();
        let policy = UploadPolicy::default();
        let base = Path::new(".");
        let steps = parse(
            r#"
- delete-slide: { index: 0 }
- add-slide: { template: four-image-grid }
"#,
        )
        .unwrap();
        let results: Vec<bool> = steps
            .into_iter()
            .enumerate()
            .map(|(n, step)| apply(&mut store, step, base, &policy, n + 1).unwrap())
            .collect();
        assert_eq!(results, vec![false, true]);
        assert_eq!(store.state().len(), 2);
    }

    #[test]
    fn test_resolve_relative_to_script() {
        let paths = resolve(
            Path::new("/decks"),
            vec![PathBuf::from("a.png"), PathBuf::from("/abs/b.png")],
        );
        assert_eq!(
            paths,
            vec![PathBuf::from("/decks/a.png"), PathBuf::from("/abs/b.png")]
        );
    }
}
