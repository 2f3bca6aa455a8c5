use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::walk::{walk, Node};

struct WidgetData {
    type_name: String,
    name: RefCell<Option<String>>,
    children: RefCell<Vec<Widget>>,
    submenu: RefCell<Option<Widget>>,
    parent: RefCell<Weak<WidgetData>>,
    accel_path: RefCell<Option<String>>,
    text: RefCell<String>,
    sensitive: Cell<bool>,
}

/// Handle to a node of a host window's widget hierarchy.
///
/// Cloning the handle shares the node. Equality is identity.
#[derive(Clone)]
pub struct Widget(Rc<WidgetData>);

impl Widget {
    /// Create a widget of the given toolkit type (e.g. `"GtkPaned"`).
    pub fn new(type_name: &str) -> Self {
        Widget(Rc::new(WidgetData {
            type_name: type_name.to_string(),
            name: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            submenu: RefCell::new(None),
            parent: RefCell::new(Weak::new()),
            accel_path: RefCell::new(None),
            text: RefCell::new(String::new()),
            sensitive: Cell::new(true),
        }))
    }

    /// Create a widget with an explicit name.
    pub fn named(type_name: &str, name: &str) -> Self {
        let w = Self::new(type_name);
        w.set_name(name);
        w
    }

    /// Create a menu item carrying an action accelerator path.
    pub fn menu_item(name: &str, accel_path: &str) -> Self {
        let w = Self::named("GtkMenuItem", name);
        w.set_accel_path(Some(accel_path));
        w
    }

    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Explicit name, or the type name when none was set.
    pub fn name(&self) -> String {
        self.0
            .name
            .borrow()
            .clone()
            .unwrap_or_else(|| self.0.type_name.clone())
    }

    pub fn set_name(&self, name: &str) {
        *self.0.name.borrow_mut() = Some(name.to_string());
    }

    /// Append a child, reparenting it to `self`.
    pub fn add(&self, child: &Widget) -> &Self {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
        self
    }

    pub fn remove(&self, child: &Widget) {
        self.0.children.borrow_mut().retain(|c| c != child);
        *child.0.parent.borrow_mut() = Weak::new();
    }

    pub fn children(&self) -> Vec<Widget> {
        self.0.children.borrow().clone()
    }

    pub fn child(&self, index: usize) -> Option<Widget> {
        self.0.children.borrow().get(index).cloned()
    }

    pub fn set_submenu(&self, submenu: Option<&Widget>) {
        if let Some(menu) = submenu {
            *menu.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
        *self.0.submenu.borrow_mut() = submenu.cloned();
    }

    pub fn submenu(&self) -> Option<Widget> {
        self.0.submenu.borrow().clone()
    }

    pub fn parent(&self) -> Option<Widget> {
        self.0.parent.borrow().upgrade().map(Widget)
    }

    pub fn accel_path(&self) -> Option<String> {
        self.0.accel_path.borrow().clone()
    }

    pub fn set_accel_path(&self, path: Option<&str>) {
        *self.0.accel_path.borrow_mut() = path.map(str::to_string);
    }

    pub fn text(&self) -> String {
        self.0.text.borrow().clone()
    }

    pub fn set_text(&self, text: &str) {
        *self.0.text.borrow_mut() = text.to_string();
    }

    pub fn is_sensitive(&self) -> bool {
        self.0.sensitive.get()
    }

    pub fn set_sensitive(&self, sensitive: bool) {
        self.0.sensitive.set(sensitive);
    }

    /// Closest ancestor (excluding `self`) matching `pred`.
    pub fn ancestor<F>(&self, pred: F) -> Option<Widget>
    where
        F: Fn(&Widget) -> bool,
    {
        let mut current = self.parent();
        while let Some(w) = current {
            if pred(&w) {
                return Some(w);
            }
            current = w.parent();
        }
        None
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Widget {}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("type", &self.0.type_name)
            .field("name", &self.name())
            .finish()
    }
}

impl Node for Widget {
    fn children(&self) -> Vec<Self> {
        Widget::children(self)
    }

    fn submenu(&self) -> Option<Self> {
        Widget::submenu(self)
    }

    fn name(&self) -> String {
        Widget::name(self)
    }
}

/// First widget under `root` (inclusive) with the given name.
pub fn find_by_name(root: &Widget, name: &str, visit_submenu: bool) -> Option<Widget> {
    walk(Some(root.clone()), visit_submenu).find(|w| w.name() == name)
}

/// Every widget under `root` matching `pred`, in traversal order.
pub fn find_all<F>(root: &Widget, visit_submenu: bool, pred: F) -> Vec<Widget>
where
    F: Fn(&Widget) -> bool,
{
    walk(Some(root.clone()), visit_submenu)
        .filter(|w| pred(w))
        .collect()
}
