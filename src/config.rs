//! Connection configuration for one named profile.

use crate::driver::Handle;
use crate::error::{Error, Result};
use crate::prompt::{FIELDS, PromptIo};
use crate::registry::ConnectionRegistry;
use crate::secret::{MASK_DISPLAY, Secret};
use serde::Serialize;
use std::fmt;

/// Field values for one connection profile.
///
/// Produced either by [`ConfigResolver`](crate::resolver::ConfigResolver)
/// from a config file (a draft, possibly partial) or programmatically via
/// the `with_*` builders. Missing fields are filled interactively by
/// [`fill`](ConnectionConfig::fill); serialization skips the password.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionConfig {
    pub hostname: String,
    /// Kept as a string until connect time; validated then.
    pub port: String,
    pub namespace: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<Secret>,
    /// Ask for password confirmation during masked entry.
    pub confirm: bool,
    #[serde(skip_serializing)]
    filled: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: "1972".to_string(),
            namespace: "USER".to_string(),
            username: None,
            password: None,
            confirm: true,
            filled: false,
        }
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnectionConfig(hostname={}, port={}, namespace={}, username={}, {}, confirm={})",
            self.hostname,
            self.port,
            self.namespace,
            self.username.as_deref().unwrap_or(""),
            MASK_DISPLAY,
            self.confirm
        )
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    /// Whether every field has been through [`fill`](Self::fill).
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Key used to cache connections by resolved identity.
    ///
    /// The password is excluded: two profiles that differ only by password
    /// share one cached connection. Inherited behavior, kept as-is.
    pub fn identity_key(&self) -> String {
        [
            self.hostname.as_str(),
            self.port.as_str(),
            self.namespace.as_str(),
            self.username.as_deref().unwrap_or(""),
        ]
        .join(";")
    }

    fn value_of(&self, key: &str) -> Option<String> {
        match key {
            "hostname" => Some(self.hostname.clone()),
            "port" => Some(self.port.clone()),
            "namespace" => Some(self.namespace.clone()),
            "username" => self.username.clone(),
            "password" => self.password.as_ref().map(|p| p.expose().to_string()),
            _ => None,
        }
    }

    fn set_value(&mut self, key: &str, value: String) {
        match key {
            "hostname" => self.hostname = value,
            "port" => self.port = value,
            "namespace" => self.namespace = value,
            "username" => self.username = Some(value),
            "password" => self.password = Some(Secret::new(value)),
            _ => {}
        }
    }

    /// Prompt for any missing fields, in declaration order.
    ///
    /// Fields that already hold a non-empty value are rendered and
    /// skipped; the rest are collected interactively, honoring this
    /// config's confirmation flag for masked entry.
    pub fn fill(&mut self, io: &mut dyn PromptIo) -> Result<()> {
        for spec in FIELDS {
            match self.value_of(spec.key) {
                Some(val) if !val.is_empty() => spec.render(io, &val)?,
                _ => {
                    let val = spec.collect(io, self.confirm)?;
                    self.set_value(spec.key, val);
                }
            }
        }
        self.filled = true;
        Ok(())
    }

    /// Get (or create) the cached connection for this configuration,
    /// prompting for missing fields as needed.
    ///
    /// An identity already present in the registry's cache returns
    /// immediately, before any prompting.
    pub fn get_connection(&mut self, registry: &ConnectionRegistry) -> Result<Handle> {
        registry.connection_for(self)
    }

    /// Driver-facing parameters for this configuration.
    pub fn connect_params(&self) -> Result<ConnectParams> {
        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPort(self.port.clone()))?;

        Ok(ConnectParams {
            host: self.hostname.clone(),
            port,
            namespace: self.namespace.clone(),
            user: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_else(|| Secret::new("")),
        })
    }
}

/// Parameters handed to the driver when materializing a connection.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub namespace: String,
    pub user: String,
    pub password: Secret,
}
