//! Scans VHDL entity declarations for generics and ports.
//!
//! Generic defaults form the symbol table that port range bounds and port
//! defaults are evaluated against.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::expr::{Evaluator, UNRESOLVED};
use crate::symbols::SymbolTable;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bentity\s+(\w+)\s+is\b(.*?)\bend\b").expect("entity pattern")
});

static GENERIC_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgeneric\s*\(").expect("generic pattern"));

static PORT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bport\s*\(").expect("port pattern"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern"));

/// `std_logic_vector(WIDTH-1 downto 0)`
static VECTOR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(\w+)\s*\(\s*(.+?)\s+(downto|to)\s+(.+?)\s*\)$").expect("vector range pattern")
});

/// `integer range 0 to DEPTH-1`
static SCALAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(\w+)\s+range\s+(.+?)\s+(downto|to)\s+(.+?)$").expect("scalar range pattern")
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Inout,
    Buffer,
    Linkage,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            "inout" => Some(Direction::Inout),
            "buffer" => Some(Direction::Buffer),
            "linkage" => Some(Direction::Linkage),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Inout => "inout",
            Direction::Buffer => "buffer",
            Direction::Linkage => "linkage",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generic {
    pub name: String,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// The default evaluated against the other generics, or the default text
    /// when it does not resolve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub left: i64,
    pub right: i64,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Generics the declaration refers to, in generic declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
}

impl Port {
    pub fn left_bound(&self) -> i64 {
        self.bounds.map_or(0, |b| b.left)
    }

    pub fn right_bound(&self) -> i64 {
        self.bounds.map_or(0, |b| b.right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    pub generics: Vec<Generic>,
    pub ports: Vec<Port>,
}

impl Entity {
    /// Generic names mapped to their default expressions, in declaration
    /// order. Generics without a default map to an empty expression.
    pub fn symbols(&self) -> SymbolTable {
        generic_symbols(&self.generics)
    }
}

fn generic_symbols(generics: &[Generic]) -> SymbolTable {
    generics
        .iter()
        .map(|g| (g.name.as_str(), g.default.as_deref().unwrap_or_default()))
        .collect()
}

pub fn read_entity(path: &Path) -> Result<Option<Entity>> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_entity(&content))
}

/// Parses the first entity declaration in `source`.
pub fn parse_entity(source: &str) -> Option<Entity> {
    let (text, masked) = scrub(source);
    let caps = ENTITY.captures(&masked)?;
    let name = caps[1].to_string();
    let body = caps.get(2)?.range();

    let (generic_range, rest) = match section(&masked, body.clone(), &GENERIC_START) {
        Some((inner, end)) => (inner, end..body.end),
        None => (body.start..body.start, body),
    };
    let port_range = section(&masked, rest, &PORT_START).map_or(0..0, |(inner, _)| inner);

    let mut generics: Vec<Generic> = split_declarations(&masked, generic_range)
        .into_iter()
        .flat_map(|r| parse_generic(&text[r]))
        .collect();

    let symbols = generic_symbols(&generics);
    let eval = Evaluator::new(&symbols);

    for generic in &mut generics {
        generic.value = generic.default.as_deref().map(|d| resolve_text(&eval, d));
    }

    let ports = split_declarations(&masked, port_range)
        .into_iter()
        .flat_map(|r| parse_port(&text[r.clone()], &masked[r], &eval, &generics))
        .collect();

    debug!(entity = %name, generics = generics.len(), "parsed entity");

    Some(Entity {
        name,
        generics,
        ports,
    })
}

/// Returns `source` with comments blanked, and a mask that also blanks the
/// contents of string and character literals. Both keep the byte offsets of
/// `source`, so ranges found in the mask slice the text.
fn scrub(source: &str) -> (String, String) {
    let bytes = source.as_bytes();
    let mut text = bytes.to_vec();
    let mut mask = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    text[i] = b' ';
                    mask[i] = b' ';
                    i += 1;
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'\n' {
                    if bytes[i] == b'"' {
                        // `""` is an escaped quote inside the string.
                        if bytes.get(i + 1) != Some(&b'"') {
                            break;
                        }
                        mask[i] = b' ';
                        i += 1;
                    }
                    mask[i] = b' ';
                    i += 1;
                }
                i += 1;
            }
            // A tick after a name or `)` is an attribute or qualifier, not a
            // character literal.
            b'\'' if bytes.get(i + 2) == Some(&b'\'') && !follows_name(bytes, i) => {
                mask[i + 1] = b' ';
                i += 3;
            }
            _ => i += 1,
        }
    }

    (
        String::from_utf8_lossy(&text).into_owned(),
        String::from_utf8_lossy(&mask).into_owned(),
    )
}

fn follows_name(bytes: &[u8], i: usize) -> bool {
    i.checked_sub(1)
        .map(|j| bytes[j])
        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b')')
}

/// Range between the parenthesis opened by `start` and its match, and the
/// offset just past the closing parenthesis. Only `within` is searched.
fn section(masked: &str, within: Range<usize>, start: &Regex) -> Option<(Range<usize>, usize)> {
    let m = start.find(&masked[within.clone()])?;
    let open = within.start + m.end();
    let mut depth = 0usize;

    for (i, c) in masked[open..within.end].char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                let close = open + i;
                return Some((open..close, close + 1));
            }
            ')' => depth -= 1,
            _ => {}
        }
    }

    warn!("unterminated section in entity");
    Some((open..within.end, within.end))
}

/// Splits on `;` outside parentheses, trimming each declaration.
fn split_declarations(masked: &str, within: Range<usize>) -> Vec<Range<usize>> {
    let mut decls = Vec::new();
    let mut depth = 0usize;
    let mut start = within.start;

    for (i, c) in masked[within.clone()].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                decls.push(start..within.start + i);
                start = within.start + i + 1;
            }
            _ => {}
        }
    }
    decls.push(start..within.end);

    decls
        .into_iter()
        .map(|r| {
            let decl = &masked[r.clone()];
            let lead = decl.len() - decl.trim_start().len();
            r.start + lead..r.start + decl.trim_end().len()
        })
        .filter(|r| !r.is_empty())
        .collect()
}

/// Splits `names : rest [:= default]`.
fn split_declaration(decl: &str) -> Option<(Vec<String>, &str, Option<String>)> {
    let (head, default) = match decl.split_once(":=") {
        Some((head, default)) => (head, Some(normalize(default))),
        None => (decl, None),
    };
    let (names, rest) = head.split_once(':')?;

    let names: Vec<String> = names
        .split(',')
        .map(str::trim)
        .map(str::to_string)
        .collect();
    if !names.iter().all(|n| IDENTIFIER.is_match(n)) {
        return None;
    }

    Some((names, rest.trim(), default))
}

fn parse_generic(decl: &str) -> Vec<Generic> {
    let Some((names, type_name, default)) = split_declaration(decl) else {
        warn!(declaration = decl, "skipping malformed generic declaration");
        return Vec::new();
    };

    names
        .into_iter()
        .map(|name| Generic {
            name,
            type_name: normalize(type_name),
            default: default.clone(),
            value: None,
        })
        .collect()
}

fn parse_port(decl: &str, masked: &str, eval: &Evaluator<'_>, generics: &[Generic]) -> Vec<Port> {
    let Some((names, rest, default)) = split_declaration(decl) else {
        warn!(declaration = decl, "skipping malformed port declaration");
        return Vec::new();
    };

    let Some((direction, type_text)) = rest.split_once(char::is_whitespace) else {
        warn!(declaration = decl, "skipping port declaration without a type");
        return Vec::new();
    };
    let Some(direction) = Direction::parse(direction) else {
        warn!(declaration = decl, direction, "skipping port with unknown direction");
        return Vec::new();
    };

    let (type_name, bounds) = parse_type(type_text.trim(), eval);
    let default = default.map(|d| resolve_text(eval, &d));
    let referenced = referenced_generics(masked, generics);

    names
        .into_iter()
        .map(|name| Port {
            name,
            direction,
            type_name: type_name.clone(),
            bounds,
            default: default.clone(),
            generics: referenced.clone(),
        })
        .collect()
}

fn parse_type(type_text: &str, eval: &Evaluator<'_>) -> (String, Option<Bounds>) {
    let caps = VECTOR_RANGE
        .captures(type_text)
        .or_else(|| SCALAR_RANGE.captures(type_text));

    match caps {
        Some(caps) => {
            let bounds = Bounds {
                left: eval.evaluate(caps[2].trim()),
                right: eval.evaluate(caps[4].trim()),
                descending: caps[3].eq_ignore_ascii_case("downto"),
            };
            (caps[1].to_string(), Some(bounds))
        }
        None => (normalize(type_text), None),
    }
}

/// The evaluated value as text, or `text` itself when it does not resolve.
fn resolve_text(eval: &Evaluator<'_>, text: &str) -> String {
    match eval.evaluate(text) {
        UNRESOLVED => text.to_string(),
        value => value.to_string(),
    }
}

fn referenced_generics(decl: &str, generics: &[Generic]) -> Vec<String> {
    let words: HashSet<&str> = WORD.find_iter(decl).map(|m| m.as_str()).collect();
    generics
        .iter()
        .filter(|g| words.contains(g.name.as_str()))
        .map(|g| g.name.clone())
        .collect()
}

/// Collapses runs of whitespace, so multi-line declarations read as one line.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human-readable listing of an entity, one line per generic and port.
pub fn format_entity(entity: &Entity) -> Vec<String> {
    let mut lines = vec![format!("entity {}", entity.name)];

    for g in &entity.generics {
        let mut line = format!("  generic {} : {}", g.name, g.type_name);
        if let Some(default) = &g.default {
            line.push_str(&format!(" := {}", default));
        }
        if let Some(value) = g.value.as_ref().filter(|v| Some(*v) != g.default.as_ref()) {
            line.push_str(&format!(" (= {})", value));
        }
        lines.push(line);
    }

    for p in &entity.ports {
        let mut line = format!("  port {} : {} {}", p.name, p.direction, p.type_name);
        if let Some(b) = p.bounds {
            line.push_str(&format!(" [{}:{}]", b.left, b.right));
        }
        if let Some(default) = &p.default {
            line.push_str(&format!(" := {}", default));
        }
        lines.push(line);
    }

    lines
}
