//! Stage configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! root_base_dn = "DC=example,DC=com"
//! store_extended_dn_in_ldb = true
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, Result, SchemaError};
use crate::model::Dn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Naming context root; the only DN that may be added without a parent
    pub root_base_dn: Option<String>,
    /// Store objectCategory as given (possibly with extended components)
    /// instead of reducing it to its plain string form
    pub store_extended_dn_in_ldb: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            root_base_dn: None,
            store_extended_dn_in_ldb: true,
        }
    }
}

impl ModuleConfig {
    pub fn with_root_base_dn(mut self, dn: impl Into<String>) -> Self {
        self.root_base_dn = Some(dn.into());
        self
    }

    pub fn with_extended_dn_storage(mut self, enabled: bool) -> Self {
        self.store_extended_dn_in_ldb = enabled;
        self
    }

    /// Parse a TOML configuration document
    ///
    /// # Errors
    ///
    /// Returns an `InvalidConfig` error for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ExError> {
        toml::from_str(text)
            .map_err(SchemaError::from)
            .map_err(|e| ExError::from(e).with_op("load_config"))
    }

    /// Parsed root DN, if configured
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDn` when the configured root does not
    /// parse.
    pub fn root_dn(&self) -> Result<Option<Dn>> {
        self.root_base_dn.as_deref().map(Dn::parse).transpose()
    }
}
