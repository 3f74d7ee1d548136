use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Ordered `name -> expression` pairs used to resolve names in equations.
///
/// Names are unique and matched exactly. Inserting a name that already
/// exists replaces its expression but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: Vec<(String, String)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, expression: impl Into<String>) {
        let name = name.into();
        let expression = expression.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = expression,
            None => self.entries.push((name, expression)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_key_value(name).map(|(_, expr)| expr)
    }

    pub fn get_key_value(&self, name: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, e)| (n.as_str(), e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e.as_str()))
    }

    /// Reads a YAML mapping of names to integers or expression strings.
    pub fn load_yaml(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let doc: YamlValue = serde_yaml::from_str(content)?;
        let mapping = match doc {
            YamlValue::Null => return Ok(Self::new()),
            YamlValue::Mapping(m) => m,
            _ => return Err(Error::SymbolFile("expected a mapping of names to values".into())),
        };

        let mut table = Self::new();
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                return Err(Error::SymbolFile(format!("symbol name {key:?} is not a string")));
            };
            let value: SymbolValue = serde_yaml::from_value(value).map_err(|_| {
                Error::SymbolFile(format!("symbol `{name}` must be an integer or a string"))
            })?;
            table.insert(name, value.into_expression());
        }

        Ok(table)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymbolValue {
    Integer(i64),
    Text(String),
}

impl SymbolValue {
    fn into_expression(self) -> String {
        match self {
            SymbolValue::Integer(n) => n.to_string(),
            SymbolValue::Text(s) => s,
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for SymbolTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, expression) in iter {
            self.insert(name, expression);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

/// Splits a `NAME=EXPR` command-line definition.
pub fn parse_definition(definition: &str) -> Result<(String, String)> {
    let invalid = || Error::Definition(definition.to_string());
    let (name, expression) = definition.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }

    Ok((name.to_string(), expression.trim().to_string()))
}
