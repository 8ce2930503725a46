//! Distinguished names
//!
//! A [`Dn`] is an ordered list of `name=value` components, leaf first.
//! It may also carry leading extended components (`<GUID=...>;`) and can be
//! a special internal name starting with `@`, which this stage never
//! interprets.
//!
//! Equality for directory purposes is case-insensitive ([`Dn::eq_dn`]);
//! the derived `PartialEq` compares bytes and is what tests use to check
//! that casing was preserved or rewritten.

use std::fmt;

use crate::errors::{Result, SchemaError};

/// One `name=value` component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    name: String,
    value: String,
}

impl Rdn {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn eq_folded(&self, other: &Rdn) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.value.to_lowercase() == other.value.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dn {
    components: Vec<Rdn>,
    extended: Vec<(String, String)>,
    special: Option<String>,
}

impl Dn {
    /// Parse the string form of a DN
    ///
    /// Empty text is the null DN. Whitespace around names and values is
    /// dropped unless escaped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDn` for components without `=`, empty
    /// attribute names or unterminated extended components.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.starts_with('@') {
            return Ok(Self {
                special: Some(text.to_string()),
                ..Self::default()
            });
        }

        let mut rest = text;
        let mut extended = Vec::new();
        while let Some(body) = rest.strip_prefix('<') {
            let end = body
                .find('>')
                .ok_or_else(|| invalid(text, "unterminated extended component"))?;
            let (key, value) = body[..end]
                .split_once('=')
                .ok_or_else(|| invalid(text, "extended component without '='"))?;
            extended.push((key.trim().to_string(), value.trim().to_string()));
            rest = body[end + 1..].trim_start();
            rest = rest.strip_prefix(';').unwrap_or(rest).trim_start();
        }

        let mut components = Vec::new();
        if !rest.is_empty() {
            for raw in split_unescaped(rest, ',') {
                components.push(parse_component(text, raw)?);
            }
        }

        Ok(Self {
            components,
            extended,
            special: None,
        })
    }

    /// Build a DN from components, leaf first
    pub fn from_components(components: Vec<Rdn>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    pub fn components(&self) -> &[Rdn] {
        &self.components
    }

    pub fn extended_components(&self) -> &[(String, String)] {
        &self.extended
    }

    pub fn comp_num(&self) -> usize {
        self.components.len()
    }

    /// Leading (leaf) component
    pub fn rdn(&self) -> Option<&Rdn> {
        self.components.first()
    }

    pub fn rdn_name(&self) -> Option<&str> {
        self.rdn().map(Rdn::name)
    }

    pub fn rdn_value(&self) -> Option<&str> {
        self.rdn().map(Rdn::value)
    }

    /// DN with the leaf removed; `None` for the null DN and special DNs
    ///
    /// Extended components describe the leaf entry and are not inherited.
    pub fn parent(&self) -> Option<Dn> {
        if self.special.is_some() || self.components.is_empty() {
            return None;
        }
        Some(Self::from_components(self.components[1..].to_vec()))
    }

    /// Prepend a new leaf component
    pub fn add_child(&mut self, rdn: Rdn) {
        self.components.insert(0, rdn);
    }

    pub fn is_special(&self) -> bool {
        self.special.is_some()
    }

    pub fn is_null(&self) -> bool {
        self.special.is_none() && self.components.is_empty()
    }

    /// Case-insensitive directory equality
    pub fn eq_dn(&self, other: &Dn) -> bool {
        match (&self.special, &other.special) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => {
                self.components.len() == other.components.len()
                    && self
                        .components
                        .iter()
                        .zip(&other.components)
                        .all(|(a, b)| a.eq_folded(b))
            }
            _ => false,
        }
    }

    /// True when `self` is `other` or one of its ancestors
    pub fn is_base_of(&self, other: &Dn) -> bool {
        if self.is_special() || other.is_special() {
            return self.eq_dn(other);
        }
        let skip = match other.components.len().checked_sub(self.components.len()) {
            Some(skip) => skip,
            None => return false,
        };
        other.components[skip..]
            .iter()
            .zip(&self.components)
            .all(|(a, b)| a.eq_folded(b))
    }

    /// String form without extended components
    pub fn linearized(&self) -> String {
        if let Some(special) = &self.special {
            return special.clone();
        }
        self.components
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// String form including extended components
    pub fn extended_linearized(&self) -> String {
        if self.extended.is_empty() {
            return self.linearized();
        }
        let prefix = self
            .extended
            .iter()
            .map(|(k, v)| format!("<{}={}>", k, v))
            .collect::<Vec<_>>()
            .join(";");
        format!("{};{}", prefix, self.linearized())
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.linearized())
    }
}

impl std::str::FromStr for Dn {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Dn::parse(s)
    }
}

fn invalid(dn: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidDn {
        dn: dn.to_string(),
        reason: reason.to_string(),
    }
}

fn split_unescaped(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == sep {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == target {
            return Some(idx);
        }
    }
    None
}

fn parse_component(dn: &str, raw: &str) -> Result<Rdn> {
    let eq = find_unescaped(raw, '=').ok_or_else(|| invalid(dn, "component without '='"))?;
    let name = raw[..eq].trim();
    if name.is_empty() {
        return Err(invalid(dn, "component with empty attribute name"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(invalid(dn, "attribute name has illegal characters"));
    }
    Ok(Rdn::new(name, trim_value(&raw[eq + 1..])))
}

// An escaped trailing space belongs to the value.
fn trim_value(raw: &str) -> &str {
    let value = raw.trim_start();
    let trimmed = value.trim_end();
    if trimmed.ends_with('\\') && trimmed.len() < value.len() {
        let kept = value[trimmed.len()..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        &value[..trimmed.len() + kept]
    } else {
        trimmed
    }
}
