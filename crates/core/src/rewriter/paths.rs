//! Path helpers for building link text.

use std::path::{Component, Path};

/// Path of `target` as seen from directory `from_dir`, `/`-separated.
///
/// Both paths are expected to be absolute. Falls back to the target's
/// display form when they share no root.
pub fn relative_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return to_link(target.components());
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().to_string());
    }
    parts.join("/")
}

fn to_link<'a>(components: impl Iterator<Item = Component<'a>>) -> String {
    components
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
