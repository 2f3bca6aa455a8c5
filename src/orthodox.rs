//! Orthodox file manager shortcuts on top of a Nautilus window.
//!
//! | Key    | Orthodox      | Replaces in Nautilus  |
//! |--------|---------------|-----------------------|
//! | F3     | View          | Show/Hide Extra Pane  |
//! | F4     | Edit          | -                     |
//! | F5     | Copy          | Reload (Ctrl+R)       |
//! | F6     | RenMov        | Switch panes (Tab)    |
//! | F7     | Mkdir         | -                     |
//! | F8     | Delete        | -                     |
//! | Ctrl+O | Open terminal | Open file (Enter)     |
//! | Ctrl+G | Git client    | -                     |

use std::collections::HashMap;
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::accel::{AccelRegistry, BindingBackend};
use crate::keybindings::{ActionMap, UNSET};
use crate::walk::walk;
use crate::widget::{find_by_name, Widget};

/// Host accelerators that collide with the orthodox keys.
pub const HOST_CONFLICTS: [&str; 2] = [
    "<Actions>/ShellActions/Show Hide Extra Pane",
    "<Actions>/DirViewActions/Open",
];

const TOOLBAR_NAME: &str = "NautilusToolbar";
const MENUBAR_NAME: &str = "MenuBar";
const LOCATION_ENTRY_NAME: &str = "NautilusLocationEntry";
const EXTRA_PANE_ITEM: &str = "Show Hide Extra Pane";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrthodoxAction {
    View,
    Edit,
    Copy,
    Move,
    Mkdir,
    Delete,
    Terminal,
    Git,
}

impl OrthodoxAction {
    pub const ALL: [OrthodoxAction; 8] = [
        OrthodoxAction::View,
        OrthodoxAction::Edit,
        OrthodoxAction::Copy,
        OrthodoxAction::Move,
        OrthodoxAction::Mkdir,
        OrthodoxAction::Delete,
        OrthodoxAction::Terminal,
        OrthodoxAction::Git,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrthodoxAction::View => "View",
            OrthodoxAction::Edit => "Edit",
            OrthodoxAction::Copy => "Copy",
            OrthodoxAction::Move => "RenMov",
            OrthodoxAction::Mkdir => "Mkdir",
            OrthodoxAction::Delete => "Delete",
            OrthodoxAction::Terminal => "Open Terminal",
            OrthodoxAction::Git => "Git Client",
        }
    }

    /// Name of the host menu item that performs this action, if any.
    pub fn menu_item(self) -> Option<&'static str> {
        match self {
            OrthodoxAction::Copy => Some("Copy to next pane"),
            OrthodoxAction::Move => Some("Move to next pane"),
            OrthodoxAction::Mkdir => Some("New Folder"),
            OrthodoxAction::Delete => Some("Trash"),
            _ => None,
        }
    }

    /// Title and question shown before a destructive action.
    pub fn confirmation(self) -> Option<(&'static str, &'static str)> {
        match self {
            OrthodoxAction::Copy => Some(("Copy", "Do you want to copy selected files/directories?")),
            OrthodoxAction::Move => Some(("Move", "Do you want to move selected files/directories?")),
            OrthodoxAction::Delete => {
                Some(("Delete", "Do you want to move selected files/directories to trash?"))
            }
            _ => None,
        }
    }

    /// Needs the current location, i.e. both location entries.
    pub fn needs_location(self) -> bool {
        matches!(self, OrthodoxAction::Terminal | OrthodoxAction::Git)
    }
}

/// Default orthodox keybindings.
pub fn default_orthodox_keybindings() -> HashMap<OrthodoxAction, Vec<String>> {
    let mut m = HashMap::new();
    m.insert(OrthodoxAction::View, vec!["//View selected files".into(), "F3".into()]);
    m.insert(OrthodoxAction::Edit, vec!["//Edit selected files".into(), "F4".into()]);
    m.insert(OrthodoxAction::Copy, vec!["//Copy to next pane".into(), "F5".into()]);
    m.insert(OrthodoxAction::Move, vec!["//Move to next pane".into(), "F6".into()]);
    m.insert(OrthodoxAction::Mkdir, vec!["//Create directory".into(), "F7".into()]);
    m.insert(OrthodoxAction::Delete, vec!["//Move to trash".into(), "F8".into()]);
    m.insert(OrthodoxAction::Terminal, vec!["//Open terminal here".into(), "<Control>o".into()]);
    m.insert(OrthodoxAction::Git, vec!["//Open git client here".into(), "<Control>g".into()]);
    m
}

/// Orthodox key table with user overrides applied.
pub struct OrthodoxKeys {
    map: ActionMap<OrthodoxAction>,
}

impl OrthodoxKeys {
    pub fn from_overrides(overrides: &HashMap<OrthodoxAction, Vec<String>>) -> Self {
        Self {
            map: ActionMap::build(&default_orthodox_keybindings(), overrides),
        }
    }

    pub fn action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<OrthodoxAction> {
        self.map.lookup(code, modifiers)
    }

    pub fn first_key(&self, action: OrthodoxAction) -> &str {
        self.map.first_key(action)
    }

    pub fn keys_joined(&self, action: OrthodoxAction, sep: &str) -> String {
        self.map.keys_joined(action, sep)
    }

    /// Accelerator string for binding host actions, or `UNSET`.
    pub fn first_accel(&self, action: OrthodoxAction) -> &str {
        self.map.first_accel(action)
    }
}

impl Default for OrthodoxKeys {
    fn default() -> Self {
        Self::from_overrides(&HashMap::new())
    }
}

/// What `WindowAgent::attach` managed to find and rebind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttachReport {
    pub menubar_found: bool,
    /// The menu item that shows the second pane.
    pub extra_pane_found: bool,
    pub main_paned_found: bool,
    pub location_entries_found: bool,
    /// Host paths unbound or rebound successfully.
    pub rebound: Vec<String>,
    /// Host paths the backend refused.
    pub rejected: Vec<String>,
}

/// Per-window state of the orthodox shortcuts.
pub struct WindowAgent {
    window: Widget,
    menubar: Option<Widget>,
    extra_pane_item: Option<Widget>,
    main_paned: Option<Widget>,
    loc_entry1: Option<Widget>,
    loc_entry2: Option<Widget>,
    menu_items: HashMap<OrthodoxAction, Widget>,
    keys: OrthodoxKeys,
    report: AttachReport,
}

impl WindowAgent {
    /// Locate the widgets the shortcuts need and move the host accelerators
    /// out of the way.
    pub fn attach<B: BindingBackend + ?Sized>(
        window: &Widget,
        registry: &mut AccelRegistry,
        backend: &mut B,
        keys: OrthodoxKeys,
    ) -> Self {
        let mut agent = WindowAgent {
            window: window.clone(),
            menubar: None,
            extra_pane_item: None,
            main_paned: None,
            loc_entry1: None,
            loc_entry2: None,
            menu_items: HashMap::new(),
            keys,
            report: AttachReport::default(),
        };

        agent.find_widgets();

        for path in HOST_CONFLICTS {
            agent.rebind(registry, backend, path, UNSET);
        }

        if let Some(menubar) = agent.menubar.clone() {
            agent.bind_menu_items(&menubar, registry, backend);
        }

        agent
    }

    fn find_widgets(&mut self) {
        let mut walker = walk(Some(self.window.clone()), false);
        while let Some(w) = walker.next() {
            let name = w.name();
            if name == TOOLBAR_NAME {
                self.main_paned = w.ancestor(|p| p.type_name() == "GtkPaned");
                walker.skip_children();
            } else if name == MENUBAR_NAME {
                self.menubar = Some(w.clone());
                walker.skip_children();
            }
        }

        match &self.menubar {
            Some(menubar) => {
                self.report.menubar_found = true;
                self.extra_pane_item = find_by_name(menubar, EXTRA_PANE_ITEM, true);
                self.report.extra_pane_found = self.extra_pane_item.is_some();
                if !self.report.extra_pane_found {
                    warn!("extra pane menu item not found");
                }
            }
            None => warn!("menu bar not found"),
        }

        match &self.main_paned {
            Some(paned) => {
                self.report.main_paned_found = true;
                self.loc_entry1 = paned
                    .child(0)
                    .and_then(|c| find_by_name(&c, LOCATION_ENTRY_NAME, true));
                self.loc_entry2 = paned
                    .child(1)
                    .and_then(|c| find_by_name(&c, LOCATION_ENTRY_NAME, true));
            }
            None => warn!("main paned not found"),
        }

        self.report.location_entries_found = self.loc_entry1.is_some() && self.loc_entry2.is_some();
        if self.report.main_paned_found && !self.report.location_entries_found {
            warn!("location entries not found");
        }
    }

    fn bind_menu_items<B: BindingBackend + ?Sized>(
        &mut self,
        menubar: &Widget,
        registry: &mut AccelRegistry,
        backend: &mut B,
    ) {
        for w in walk(Some(menubar.clone()), true) {
            let name = w.name();
            let Some(action) = OrthodoxAction::ALL
                .into_iter()
                .find(|a| a.menu_item() == Some(name.as_str()))
            else {
                continue;
            };
            if let Some(path) = w.accel_path() {
                let accel = self.keys.first_accel(action).to_string();
                self.rebind(registry, backend, &path, &accel);
            }
            debug!(item = %name, ?action, "menu item bound");
            self.menu_items.insert(action, w);
        }
    }

    fn rebind<B: BindingBackend + ?Sized>(
        &mut self,
        registry: &mut AccelRegistry,
        backend: &mut B,
        path: &str,
        accel: &str,
    ) {
        if registry.change(backend, path, accel) {
            self.report.rebound.push(path.to_string());
        } else {
            self.report.rejected.push(path.to_string());
        }
    }

    pub fn report(&self) -> &AttachReport {
        &self.report
    }

    pub fn window(&self) -> &Widget {
        &self.window
    }

    pub fn menubar(&self) -> Option<&Widget> {
        self.menubar.as_ref()
    }

    /// Item to activate so both panes are visible.
    pub fn extra_pane_item(&self) -> Option<&Widget> {
        self.extra_pane_item.as_ref()
    }

    pub fn keys(&self) -> &OrthodoxKeys {
        &self.keys
    }

    /// Menu item that carries out `action` in the host.
    pub fn menu_item(&self, action: OrthodoxAction) -> Option<&Widget> {
        self.menu_items.get(&action)
    }

    /// Whether `action` can run in this window.
    pub fn is_available(&self, action: OrthodoxAction) -> bool {
        if action.needs_location() {
            return self.report.location_entries_found;
        }
        match action.menu_item() {
            Some(_) => self.menu_items.contains_key(&action),
            None => true,
        }
    }

    /// Action bound to a key press, if it can run in this window.
    pub fn dispatch(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<OrthodoxAction> {
        let action = self.keys.action(code, modifiers)?;
        if self.is_available(action) {
            Some(action)
        } else {
            debug!(?action, "action unavailable in this window");
            None
        }
    }

    /// Directory shown in the active pane: the sensitive location entry,
    /// otherwise the second one.
    pub fn current_location(&self) -> Option<String> {
        let first = self.loc_entry1.as_ref()?;
        let second = self.loc_entry2.as_ref()?;
        let entry = if first.is_sensitive() { first } else { second };
        Some(entry.text())
    }
}
