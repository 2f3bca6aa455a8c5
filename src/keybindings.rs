use std::collections::HashMap;
use std::hash::Hash;
use crossterm::event::{KeyCode, KeyModifiers};

/// Binding value meaning "no accelerator".
pub const UNSET: &str = "";

// ─── Key combinations ──────────────────────────────────────────────────

/// A key combination (key code + modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Split a key string into modifiers and the key part.
///
/// Accepts the toolkit form (`"<Control><Shift>o"`, `"<Ctrl>O"`) and the
/// plus form (`"ctrl+shift+o"`). Unknown modifiers are ignored.
fn split_modifiers(s: &str) -> (KeyModifiers, String) {
    let mut modifiers = KeyModifiers::NONE;
    let mut add = |m: &str| match m {
        "ctrl" | "control" | "primary" | "ctl" => modifiers |= KeyModifiers::CONTROL,
        "shift" | "shft" => modifiers |= KeyModifiers::SHIFT,
        "alt" | "mod1" => modifiers |= KeyModifiers::ALT,
        "super" => modifiers |= KeyModifiers::SUPER,
        _ => {}
    };

    let lower = s.to_lowercase();
    if lower.starts_with('<') {
        let mut rest = lower.as_str();
        while let Some(stripped) = rest.strip_prefix('<') {
            let Some(end) = stripped.find('>') else { break };
            add(&stripped[..end]);
            rest = &stripped[end + 1..];
        }
        let key = rest.to_string();
        return (modifiers, key);
    }

    let parts: Vec<&str> = lower.split('+').collect();
    if parts.len() == 1 {
        return (modifiers, parts[0].to_string());
    }
    for &part in &parts[..parts.len() - 1] {
        add(part);
    }
    (modifiers, parts[parts.len() - 1].to_string())
}

/// Map a lowercase key name to a key code.
fn key_code(name: &str) -> Option<KeyCode> {
    let code = match name {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "page_up" => KeyCode::PageUp,
        "pagedown" | "page_down" => KeyCode::PageDown,
        s if s.len() >= 2 && s.starts_with('f') => {
            let n: u8 = s[1..].parse().ok()?;
            if !(1..=24).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
        s if s.chars().count() == 1 => KeyCode::Char(s.chars().next()?),
        _ => return None,
    };
    Some(code)
}

/// Parse a key string like `"ctrl+shift+c"`, `"<Control>o"`, `"q"`, `"F5"`
/// into one or more `KeyBind` values.
///
/// Alphabetic characters always produce **both** lowercase and uppercase
/// variants so that bindings are case-insensitive regardless of modifiers.
pub fn parse_key(s: &str) -> Vec<KeyBind> {
    let trimmed = s.trim();
    // Strings starting with "//" are treated as comments and skipped.
    if trimmed.starts_with("//") {
        return Vec::new();
    }
    let Some(bind) = parse_accel(trimmed) else {
        return Vec::new();
    };

    if let KeyCode::Char(ch) = bind.code {
        if ch.is_ascii_alphabetic() {
            return vec![
                KeyBind { code: KeyCode::Char(ch.to_ascii_lowercase()), modifiers: bind.modifiers },
                KeyBind { code: KeyCode::Char(ch.to_ascii_uppercase()), modifiers: bind.modifiers },
            ];
        }
    }

    vec![bind]
}

/// Parse a single accelerator into its canonical (lowercase) `KeyBind`.
/// Returns `None` for unset or unparsable strings.
pub fn parse_accel(s: &str) -> Option<KeyBind> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (modifiers, key) = split_modifiers(trimmed);
    let code = key_code(&key)?;
    Some(KeyBind { code, modifiers })
}

/// True for the unset value and for anything `parse_accel` accepts.
pub fn is_valid_binding(s: &str) -> bool {
    s.trim().is_empty() || parse_accel(s).is_some()
}

/// Canonical toolkit name of a key combination, e.g. `"<Control>o"`, `"F5"`.
pub fn accel_name(bind: &KeyBind) -> String {
    let mut out = String::new();
    if bind.modifiers.contains(KeyModifiers::SHIFT) {
        out.push_str("<Shift>");
    }
    if bind.modifiers.contains(KeyModifiers::CONTROL) {
        out.push_str("<Control>");
    }
    if bind.modifiers.contains(KeyModifiers::ALT) {
        out.push_str("<Alt>");
    }
    if bind.modifiers.contains(KeyModifiers::SUPER) {
        out.push_str("<Super>");
    }
    let key = match bind.code {
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Enter => "Return".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Backspace => "BackSpace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "Page_Up".to_string(),
        KeyCode::PageDown => "Page_Down".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        _ => String::new(),
    };
    out.push_str(&key);
    out
}

/// Normalize any accepted spelling to the canonical name. Unset and
/// unparsable input map to `UNSET`.
pub fn normalize(s: &str) -> String {
    parse_accel(s).map(|b| accel_name(&b)).unwrap_or_else(|| UNSET.to_string())
}

/// Format a key string for user-facing display.
///
/// `"<Control>o"` → `"Ctrl+O"`, `"pageup"` → `"PgUp"`, `"space"` → `"Space"`.
/// Unset or unparsable strings format as an empty string.
pub fn format_key_display(s: &str) -> String {
    let Some(bind) = parse_accel(s) else {
        return String::new();
    };

    let mut result: Vec<String> = Vec::new();
    if bind.modifiers.contains(KeyModifiers::CONTROL) {
        result.push("Ctrl".into());
    }
    if bind.modifiers.contains(KeyModifiers::SHIFT) {
        result.push("Shift".into());
    }
    if bind.modifiers.contains(KeyModifiers::ALT) {
        result.push("Alt".into());
    }
    if bind.modifiers.contains(KeyModifiers::SUPER) {
        result.push("Super".into());
    }

    let key = match bind.code {
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Backspace => "BkSp".into(),
        KeyCode::Delete => "Del".into(),
        KeyCode::Insert => "Ins".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PgUp".into(),
        KeyCode::PageDown => "PgDn".into(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        _ => String::new(),
    };
    result.push(key);

    result.join("+")
}

// ─── Action maps ───────────────────────────────────────────────────────

/// Generic reverse-lookup map: KeyBind → Action.
pub struct ActionMap<A> {
    map: HashMap<KeyBind, A>,
    display: HashMap<A, Vec<String>>,
    canonical: HashMap<A, Vec<String>>,
}

impl<A: Copy + Eq + Hash> ActionMap<A> {
    /// Build an `ActionMap` by merging user overrides on top of defaults.
    ///
    /// - Actions present in `overrides` completely replace the default bindings
    ///   for that action.
    /// - Actions **not** present in `overrides` keep the default bindings.
    pub fn build(
        defaults: &HashMap<A, Vec<String>>,
        overrides: &HashMap<A, Vec<String>>,
    ) -> Self {
        let mut merged = defaults.clone();
        for (action, keys) in overrides {
            merged.insert(*action, keys.clone());
        }

        let mut map = HashMap::new();
        for (action, key_strings) in &merged {
            for key_str in key_strings {
                for bind in parse_key(key_str) {
                    map.insert(bind, *action);
                }
            }
        }

        // Forward maps (action → keys), comments and junk filtered
        let mut display: HashMap<A, Vec<String>> = HashMap::new();
        let mut canonical: HashMap<A, Vec<String>> = HashMap::new();
        for (action, key_strings) in &merged {
            let binds: Vec<KeyBind> = key_strings.iter()
                .filter(|s| !s.trim().starts_with("//"))
                .filter_map(|s| parse_accel(s))
                .collect();
            display.insert(*action, binds.iter().map(|b| format_key_display(&accel_name(b))).collect());
            canonical.insert(*action, binds.iter().map(accel_name).collect());
        }

        Self { map, display, canonical }
    }

    /// Get formatted display strings for an action (e.g. `["Ctrl+O"]`).
    pub fn keys(&self, action: A) -> &[String] {
        self.display.get(&action).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get the first display key for an action.
    /// Returns empty string if no keys are bound.
    pub fn first_key(&self, action: A) -> &str {
        self.keys(action).first().map(|s| s.as_str()).unwrap_or("")
    }

    /// Canonical name of the first key for an action (e.g. `"<Control>o"`),
    /// or `UNSET`.
    pub fn first_accel(&self, action: A) -> &str {
        self.canonical
            .get(&action)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
            .unwrap_or(UNSET)
    }

    /// Get all keys joined with a separator (e.g. `"F3 / F4"`).
    pub fn keys_joined(&self, action: A, sep: &str) -> String {
        self.keys(action).join(sep)
    }

    /// Look up an action for the given key event.
    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<A> {
        let bind = KeyBind { code, modifiers };
        if let Some(action) = self.map.get(&bind) {
            return Some(*action);
        }
        // Shifted symbols may arrive with SHIFT set. Try without it.
        if let KeyCode::Char(_) = code {
            if modifiers.contains(KeyModifiers::SHIFT) {
                let stripped = modifiers & !KeyModifiers::SHIFT;
                let bind2 = KeyBind { code, modifiers: stripped };
                return self.map.get(&bind2).copied();
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let binds = parse_key("q");
        assert_eq!(binds.len(), 2);
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('q'), modifiers: KeyModifiers::NONE }));
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('Q'), modifiers: KeyModifiers::NONE }));
    }

    #[test]
    fn test_parse_comment_string() {
        assert!(parse_key("//View file").is_empty());
        assert!(parse_key("  // leading spaces  ").is_empty());
    }

    #[test]
    fn test_parse_toolkit_form() {
        let bind = parse_accel("<Control>o").unwrap();
        assert_eq!(bind, KeyBind { code: KeyCode::Char('o'), modifiers: KeyModifiers::CONTROL });
        assert_eq!(parse_accel("<Ctrl>O").unwrap(), bind);
        assert_eq!(parse_accel("<Primary>o").unwrap(), bind);
        assert_eq!(parse_accel("ctrl+o").unwrap(), bind);
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(parse_accel("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(parse_accel("f12").unwrap().code, KeyCode::F(12));
        assert!(parse_accel("F99").is_none());
        assert_eq!(parse_accel("f").unwrap().code, KeyCode::Char('f'));
    }

    #[test]
    fn test_parse_multiple_modifiers() {
        let bind = parse_accel("<Shift><Control>Page_Up").unwrap();
        assert_eq!(bind.code, KeyCode::PageUp);
        assert_eq!(bind.modifiers, KeyModifiers::SHIFT | KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_accel("").is_none());
        assert!(parse_accel("   ").is_none());
        assert!(parse_accel("<Control>").is_none());
        assert!(parse_accel("nonsense").is_none());
        assert!(parse_key("nonsense").is_empty());
    }

    #[test]
    fn test_is_valid_binding() {
        assert!(is_valid_binding(UNSET));
        assert!(is_valid_binding("F3"));
        assert!(is_valid_binding("<Control>g"));
        assert!(!is_valid_binding("<Control>bogus"));
    }

    #[test]
    fn test_accel_name_canonical() {
        assert_eq!(normalize("ctrl+O"), "<Control>o");
        assert_eq!(normalize("F5"), "F5");
        assert_eq!(normalize("shift+ctrl+pageup"), "<Shift><Control>Page_Up");
        assert_eq!(normalize("space"), "space");
        assert_eq!(normalize(""), UNSET);
        assert_eq!(normalize("bogus"), UNSET);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key_display("<Control>o"), "Ctrl+O");
        assert_eq!(format_key_display("F8"), "F8");
        assert_eq!(format_key_display("pageup"), "PgUp");
        assert_eq!(format_key_display("<Shift><Alt>space"), "Shift+Alt+Space");
        assert_eq!(format_key_display(UNSET), "");
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Save,
        Close,
    }

    #[test]
    fn test_action_map_defaults() {
        let mut defaults: HashMap<TestAction, Vec<String>> = HashMap::new();
        defaults.insert(TestAction::Save, vec!["//Save".into(), "<Control>s".into()]);
        defaults.insert(TestAction::Close, vec!["ctrl+w".into()]);

        let map = ActionMap::build(&defaults, &HashMap::new());

        assert_eq!(map.lookup(KeyCode::Char('s'), KeyModifiers::CONTROL), Some(TestAction::Save));
        assert_eq!(map.lookup(KeyCode::Char('W'), KeyModifiers::CONTROL), Some(TestAction::Close));
        assert_eq!(map.lookup(KeyCode::Char('z'), KeyModifiers::CONTROL), None);
        assert_eq!(map.first_key(TestAction::Save), "Ctrl+S");
        assert_eq!(map.first_accel(TestAction::Save), "<Control>s");
    }

    #[test]
    fn test_action_map_override_replaces_default() {
        let mut defaults: HashMap<TestAction, Vec<String>> = HashMap::new();
        defaults.insert(TestAction::Save, vec!["ctrl+s".into()]);
        let mut overrides = HashMap::new();
        overrides.insert(TestAction::Save, vec!["F2".into(), "ctrl+shift+s".into()]);

        let map = ActionMap::build(&defaults, &overrides);

        assert_eq!(map.lookup(KeyCode::F(2), KeyModifiers::NONE), Some(TestAction::Save));
        assert_eq!(map.lookup(KeyCode::Char('s'), KeyModifiers::CONTROL), None);
        assert_eq!(map.keys_joined(TestAction::Save, " / "), "F2 / Ctrl+Shift+S");
        assert_eq!(map.first_accel(TestAction::Close), UNSET);
    }
}
