pub mod shop;
pub mod store;

pub use store::{SessionError, SessionStore, SESSION_COOKIE};

use serde::{Deserialize, Serialize};

/// Enumerated principal category. Controls the login gate per portal and the
/// route guard's permission lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    ShopOwner,
    ShopStaff,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::ShopOwner => "SHOP_OWNER",
            Role::ShopStaff => "SHOP_STAFF",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

/// A shop the user belongs to (shop portal only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopMembership {
    pub shop_id: String,
    pub shop_name: String,
}

/// User portion of the session. Mutable via `SessionStore::update`; the
/// token portion never travels through that path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shops: Vec<ShopMembership>,
}

/// One authenticated principal's browser session. The signed cookie is the
/// only record of it; the server keeps nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Partial profile update applied to the user portion of a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub default_shop_id: Option<String>,
}

impl SessionUser {
    pub fn apply(&mut self, update: SessionUserUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(shop_id) = update.default_shop_id {
            self.default_shop_id = Some(shop_id);
        }
    }
}
