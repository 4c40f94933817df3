//! Navigation menu model
//!
//! An ordered list of section headers and items. Items may carry sub-items
//! (the Storage item lists buckets), which are kept sorted by title,
//! ignoring case, however they were supplied.

use serde::Serialize;

/// A link nested under a menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSubItem {
    pub name: String,
    pub title: String,
    /// Route path the sub-item opens
    pub href: Option<String>,
}

impl MenuSubItem {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            href: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// A selectable menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub group: String,
    pub icon: String,
    /// Name of the route the item opens
    pub name: String,
    pub active: Option<bool>,
    pub items: Option<Vec<MenuSubItem>>,
}

impl MenuItem {
    pub fn new(title: &str, group: &str, icon: &str, name: &str) -> Self {
        Self {
            title: title.to_string(),
            group: group.to_string(),
            icon: icon.to_string(),
            name: name.to_string(),
            active: None,
            items: None,
        }
    }

    /// Attaches sub-items, sorting them by title
    pub fn with_items(mut self, items: Vec<MenuSubItem>) -> Self {
        self.active = Some(false);
        self.items = Some(sorted(items));
        self
    }
}

/// One menu row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MenuEntry {
    Header { header: String },
    Item(MenuItem),
}

impl MenuEntry {
    pub fn header(title: &str) -> Self {
        MenuEntry::Header {
            header: title.to_string(),
        }
    }

    pub fn as_item(&self) -> Option<&MenuItem> {
        match self {
            MenuEntry::Item(item) => Some(item),
            MenuEntry::Header { .. } => None,
        }
    }
}

/// The navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new(vec![
            MenuEntry::header("Apps"),
            MenuEntry::Item(MenuItem::new("Dashboard", "apps", "dashboard", "Dashboard")),
            MenuEntry::Item(MenuItem::new("Storage", "apps", "cloud", "Storage").with_items(Vec::new())),
            MenuEntry::Item(MenuItem::new("Functions", "apps", "functions", "Functions")),
            MenuEntry::Item(MenuItem::new("Settings", "apps", "settings", "Settings")),
            MenuEntry::Item(MenuItem::new("Log Out", "apps", "exit_to_app", "Login")),
        ])
    }
}

impl Menu {
    /// Builds a menu, sorting every item's sub-items
    pub fn new(mut entries: Vec<MenuEntry>) -> Self {
        for entry in &mut entries {
            if let MenuEntry::Item(MenuItem {
                items: Some(items), ..
            }) = entry
            {
                sort_by_title(items);
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.entries.iter().filter_map(MenuEntry::as_item)
    }

    pub fn item(&self, name: &str) -> Option<&MenuItem> {
        self.items().find(|item| item.name == name)
    }

    /// Replaces the sub-items of the item called `name`
    ///
    /// Returns false when no such item exists.
    pub fn set_sub_items(&mut self, name: &str, items: Vec<MenuSubItem>) -> bool {
        let target = self.entries.iter_mut().find_map(|entry| match entry {
            MenuEntry::Item(item) if item.name == name => Some(item),
            _ => None,
        });

        match target {
            Some(item) => {
                item.items = Some(sorted(items));
                true
            }
            None => false,
        }
    }
}

fn sort_by_title(items: &mut [MenuSubItem]) {
    items.sort_by_cached_key(|item| item.title.to_uppercase());
}

fn sorted(mut items: Vec<MenuSubItem>) -> Vec<MenuSubItem> {
    sort_by_title(&mut items);
    items
}
