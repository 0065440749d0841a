use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::session::Role;

/// Which portal this gateway instance is serving. One binary covers all three
/// portals; the kind selects the login role gate, the permission table and
/// the default redirect targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Admin,
    Customer,
    Shop,
}

impl AppKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(AppKind::Admin),
            "customer" => Some(AppKind::Customer),
            "shop" => Some(AppKind::Shop),
            _ => None,
        }
    }

    /// Roles the login endpoint accepts for this portal. A valid credential
    /// for any other role is reported as a bad credential, not a forbidden
    /// one, so the response does not leak that the account exists elsewhere.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            AppKind::Admin => &[Role::Admin, Role::SuperAdmin],
            AppKind::Customer => &[Role::Customer],
            AppKind::Shop => &[Role::ShopOwner, Role::ShopStaff],
        }
    }

    pub fn login_path(self) -> &'static str {
        "/login"
    }

    /// Default authenticated landing path, used by the route guard both for
    /// logged-in users revisiting auth pages and for unauthorized paths.
    pub fn landing_path(self) -> &'static str {
        match self {
            AppKind::Admin | AppKind::Shop => "/dashboard",
            AppKind::Customer => "/",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppKind,
    pub backend_base_url: Url,
    pub session_secret: String,
    pub asset_base_url: String,
    pub port: u16,
    pub paths: BackendPaths,
}

/// Backend path prefixes for each resource domain. Defaults match the
/// backend's published routes; each one can be overridden individually.
#[derive(Debug, Clone)]
pub struct BackendPaths {
    pub auth: String,
    pub users: String,
    pub employees: String,
    pub orders: String,
    pub products: String,
    pub categories: String,
    pub stock: String,
    pub suppliers: String,
    pub cashflow: String,
    pub files: String,
}

impl Default for BackendPaths {
    fn default() -> Self {
        Self {
            auth: "/auth".to_string(),
            users: "/users".to_string(),
            employees: "/employees".to_string(),
            orders: "/orders".to_string(),
            products: "/products".to_string(),
            categories: "/categories".to_string(),
            stock: "/stock".to_string(),
            suppliers: "/suppliers".to_string(),
            cashflow: "/cashflow".to_string(),
            files: "/files".to_string(),
        }
    }
}

impl BackendPaths {
    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("BACKEND_AUTH_PATH") {
            self.auth = v;
        }
        if let Ok(v) = env::var("BACKEND_USERS_PATH") {
            self.users = v;
        }
        if let Ok(v) = env::var("BACKEND_EMPLOYEES_PATH") {
            self.employees = v;
        }
        if let Ok(v) = env::var("BACKEND_ORDERS_PATH") {
            self.orders = v;
        }
        if let Ok(v) = env::var("BACKEND_PRODUCTS_PATH") {
            self.products = v;
        }
        if let Ok(v) = env::var("BACKEND_CATEGORIES_PATH") {
            self.categories = v;
        }
        if let Ok(v) = env::var("BACKEND_STOCK_PATH") {
            self.stock = v;
        }
        if let Ok(v) = env::var("BACKEND_SUPPLIERS_PATH") {
            self.suppliers = v;
        }
        if let Ok(v) = env::var("BACKEND_CASHFLOW_PATH") {
            self.cashflow = v;
        }
        if let Ok(v) = env::var("BACKEND_FILES_PATH") {
            self.files = v;
        }
        self
    }
}

impl AppConfig {
    /// Load configuration from the environment. Required values missing or
    /// unparsable abort startup; operating on defaults for the app kind, the
    /// backend address or the signing secret is never acceptable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_kind = required("APP_KIND")?;
        let app = AppKind::parse(&app_kind).ok_or(ConfigError::InvalidVar {
            var: "APP_KIND",
            value: app_kind,
        })?;

        let base = required("BACKEND_BASE_URL")?;
        let backend_base_url = Url::parse(&base).map_err(|_| ConfigError::InvalidVar {
            var: "BACKEND_BASE_URL",
            value: base,
        })?;

        let session_secret = required("SESSION_SECRET")?;

        let asset_base_url = env::var("ASSET_BASE_URL").unwrap_or_else(|_| "/assets".to_string());

        let port = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidVar {
                var: "PORT",
                value: v,
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            app,
            backend_base_url,
            session_secret,
            asset_base_url,
            port,
            paths: BackendPaths::default().with_env_overrides(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
