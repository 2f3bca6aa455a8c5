//! Debug views of a window: the widget outline and the accelerator table.

use crate::accel::AccelMap;
use crate::keybindings::format_key_display;
use crate::walk::walk;
use crate::widget::Widget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub depth: usize,
    pub name: String,
    pub type_name: String,
}

/// Every widget under `root` with its nesting level, submenus included.
pub fn outline(root: &Widget) -> Vec<OutlineEntry> {
    let mut walker = walk(Some(root.clone()), true);
    let mut entries = Vec::new();
    while let Some(w) = walker.next() {
        entries.push(OutlineEntry {
            depth: walker.depth(),
            name: w.name(),
            type_name: w.type_name().to_string(),
        });
    }
    entries
}

/// Indented outline, two spaces per level. The type follows a name that
/// differs from it.
pub fn render_outline(root: &Widget) -> String {
    let mut out = String::new();
    for entry in outline(root) {
        out.push_str(&"  ".repeat(entry.depth));
        out.push_str(&entry.name);
        if entry.name != entry.type_name {
            out.push_str(&format!(" ({})", entry.type_name));
        }
        out.push('\n');
    }
    out
}

/// `(name, value)` pairs describing one widget.
pub fn describe(widget: &Widget) -> Vec<(String, String)> {
    let mut props = vec![
        ("name".to_string(), widget.name()),
        ("type".to_string(), widget.type_name().to_string()),
        ("children".to_string(), widget.children().len().to_string()),
        ("submenu".to_string(), widget.submenu().is_some().to_string()),
        ("sensitive".to_string(), widget.is_sensitive().to_string()),
    ];
    if let Some(path) = widget.accel_path() {
        props.push(("accel_path".to_string(), path));
    }
    let text = widget.text();
    if !text.is_empty() {
        props.push(("text".to_string(), text));
    }
    props
}

/// `(key label, path)` rows of the accelerator table.
pub fn accel_rows(map: &AccelMap) -> Vec<(String, String)> {
    map.entries()
        .map(|(path, binding)| (format_key_display(binding), path.to_string()))
        .collect()
}
