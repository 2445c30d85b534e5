//! Minimal CSS selector support.
//!
//! Supported grammar: compound selectors made of an optional tag (or `*`),
//! `.class`, `#id`, `:first-child` and `:last-child`, joined by the
//! descendant combinator (whitespace). That covers every query the engine
//! issues against the host markup.

use std::fmt;
use std::str::FromStr;

use crate::error::DomError;
use crate::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if node.tag_name().as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.pseudos.iter().all(|p| match p {
            Pseudo::FirstChild => node.is_first_element_child(),
            Pseudo::LastChild => node.is_last_element_child(),
        })
    }
}

/// Parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse selector text.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let compounds = source
            .split_whitespace()
            .map(|part| parse_compound(source, part))
            .collect::<Result<Vec<_>, _>>()?;
        if compounds.is_empty() {
            return Err(invalid(source, "empty selector"));
        }
        Ok(Self {
            source: source.trim().to_string(),
            compounds,
        })
    }

    /// Whether `node` matches. Ancestor compounds are resolved against the
    /// whole tree, not just a query scope.
    pub fn matches(&self, node: &Node) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }

        let ancestors = node.ancestors();
        let mut ancestors = ancestors.iter();
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|a| compound.matches(a)))
    }

    /// Original selector text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn invalid(selector: &str, reason: impl Into<String>) -> DomError {
    DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(source: &str, part: &str) -> Result<Compound, DomError> {
    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    if chars.first() == Some(&'*') {
        pos = 1;
    } else {
        let tag = take_ident(&chars, &mut pos);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
    }

    while pos < chars.len() {
        let marker = chars[pos];
        pos += 1;
        let ident = take_ident(&chars, &mut pos);
        if ident.is_empty() {
            return Err(invalid(source, format!("expected name after '{}'", marker)));
        }
        match marker {
            '.' => compound.classes.push(ident),
            '#' => compound.id = Some(ident),
            ':' => match ident.as_str() {
                "first-child" => compound.pseudos.push(Pseudo::FirstChild),
                "last-child" => compound.pseudos.push(Pseudo::LastChild),
                other => return Err(invalid(source, format!("unsupported pseudo-class ':{}'", other))),
            },
            other => return Err(invalid(source, format!("unsupported character '{}'", other))),
        }
    }

    Ok(compound)
}
