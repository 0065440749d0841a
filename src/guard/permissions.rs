//! Static route permission tables, one per portal.
//!
//! Each table is an ordered list of flat records: a url, an optional icon
//! name for the sidebar, an optional role allow-list and optional one-level
//! sub-items. An absent allow-list means every role of the portal may pass.
//! The tables are fixed at process start and never mutated.

use once_cell::sync::Lazy;

use crate::config::AppKind;
use crate::session::Role;

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub url: &'static str,
    pub icon: Option<&'static str>,
    pub roles: Option<Vec<Role>>,
    pub items: Vec<SubEntry>,
}

#[derive(Debug, Clone)]
pub struct SubEntry {
    pub url: &'static str,
    pub roles: Option<Vec<Role>>,
}

impl MenuEntry {
    fn open(url: &'static str, icon: Option<&'static str>) -> Self {
        Self {
            url,
            icon,
            roles: None,
            items: Vec::new(),
        }
    }

    fn restricted(url: &'static str, icon: Option<&'static str>, roles: &[Role]) -> Self {
        Self {
            url,
            icon,
            roles: Some(roles.to_vec()),
            items: Vec::new(),
        }
    }

    fn with_items(mut self, items: Vec<SubEntry>) -> Self {
        self.items = items;
        self
    }
}

impl SubEntry {
    fn open(url: &'static str) -> Self {
        Self { url, roles: None }
    }

    fn restricted(url: &'static str, roles: &[Role]) -> Self {
        Self {
            url,
            roles: Some(roles.to_vec()),
        }
    }
}

static ADMIN_MENU: Lazy<Vec<MenuEntry>> = Lazy::new(|| {
    vec![
        MenuEntry::open("/dashboard", Some("gauge")),
        MenuEntry::open("/users", Some("users")).with_items(vec![
            SubEntry::open("/users/customers"),
            SubEntry::open("/users/shop-owners"),
        ]),
        MenuEntry::open("/shops", Some("store")),
        MenuEntry::open("/categories", Some("tags")),
        MenuEntry::open("/cashflow", Some("banknote")),
        MenuEntry::restricted("/settings", Some("cog"), &[Role::SuperAdmin]),
        MenuEntry::open("/profile", None),
    ]
});

static SHOP_MENU: Lazy<Vec<MenuEntry>> = Lazy::new(|| {
    vec![
        MenuEntry::open("/dashboard", Some("gauge")),
        MenuEntry::open("/orders", Some("receipt")).with_items(vec![
            SubEntry::open("/orders/history"),
            SubEntry::open("/orders/returns"),
        ]),
        MenuEntry::open("/products", Some("package")).with_items(vec![
            SubEntry::open("/products/list"),
            SubEntry::open("/products/warranty"),
        ]),
        MenuEntry::open("/stock", Some("boxes")),
        MenuEntry::restricted("/suppliers", Some("truck"), &[Role::ShopOwner]),
        MenuEntry::restricted("/employees", Some("id-card"), &[Role::ShopOwner]),
        MenuEntry::restricted("/cashflow", Some("banknote"), &[Role::ShopOwner]),
        MenuEntry::restricted("/settings", Some("cog"), &[Role::ShopOwner]),
        MenuEntry::open("/profile", None),
    ]
});

static CUSTOMER_MENU: Lazy<Vec<MenuEntry>> = Lazy::new(|| {
    vec![
        MenuEntry::open("/orders", Some("receipt"))
            .with_items(vec![SubEntry::open("/orders/history")]),
        MenuEntry::open("/warranty", Some("shield")),
        MenuEntry::open("/wallet", Some("wallet")),
        MenuEntry::open("/profile", None),
    ]
});

pub fn menu_for(app: AppKind) -> &'static [MenuEntry] {
    match app {
        AppKind::Admin => &ADMIN_MENU,
        AppKind::Shop => &SHOP_MENU,
        AppKind::Customer => &CUSTOMER_MENU,
    }
}

/// Whether `role` may visit `path` on this portal. Top-level urls match
/// exactly; sub-item urls also match one path segment beneath them. An
/// unmatched path is simply not permitted; this never errors.
pub fn is_permitted(app: AppKind, role: Role, path: &str) -> bool {
    if path == "/" {
        return true;
    }

    for entry in menu_for(app) {
        let entry_allowed = entry
            .roles
            .as_ref()
            .map_or(true, |roles| roles.contains(&role));

        if entry_allowed && entry.url == path {
            return true;
        }

        for sub in &entry.items {
            let sub_allowed = sub
                .roles
                .as_ref()
                .map_or(entry_allowed, |roles| roles.contains(&role));
            // One segment beneath the sub-item url, no deeper.
            let one_beneath = path
                .strip_prefix(sub.url)
                .and_then(|rest| rest.strip_prefix('/'))
                .map_or(false, |rest| !rest.is_empty() && !rest.contains('/'));
            if sub_allowed && (path == sub.url || one_beneath) {
                return true;
            }
        }
    }

    false
}
