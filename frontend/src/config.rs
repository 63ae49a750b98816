use tasklist_shared::{AccountsConfig, PasswordSignupFields};

pub const DEFAULT_API_BASE: &str = "/api";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub accounts: AccountsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            accounts: AccountsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read `data-api-base` and `data-password-signup-fields` from `<body>`.
    pub fn from_document() -> Self {
        let body = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.body());
        match body {
            Some(body) => Self::from_attributes(
                body.get_attribute("data-api-base"),
                body.get_attribute("data-password-signup-fields"),
            ),
            None => {
                tracing::warn!("no document body, using default client config");
                Self::default()
            }
        }
    }

    pub fn from_attributes(api_base: Option<String>, signup_fields: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = api_base {
            config.api_base = normalize_api_base(&raw);
        }
        if let Some(raw) = signup_fields {
            match raw.parse::<PasswordSignupFields>() {
                Ok(fields) => config.accounts.password_signup_fields = fields,
                Err(err) => tracing::warn!(error = %err, "ignoring signup fields setting"),
            }
        }
        config
    }
}

fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE.to_string()
    } else {
        trimmed.to_string()
    }
}
