//! Text form of a policy snapshot: one rule per line, `<ptype>, <field>, ...`.
//!
//! Fields are not escaped. A field containing `,` or a newline cannot be
//! stored in this format.

use std::fmt::Write as _;

use casbin::{Filter, Model};

/// Sections written to the object, in order.
pub const SECTIONS: [&str; 2] = ["p", "g"];

/// One parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLine {
    pub ptype: String,
    pub rule: Vec<String>,
}

impl PolicyLine {
    /// Section the rule belongs to: the first character of its ptype.
    pub fn section(&self) -> &str {
        let end = self.ptype.chars().next().map_or(0, char::len_utf8);
        &self.ptype[..end]
    }

    /// Checks the rule against a casbin filter. A non-empty filter value must
    /// equal the field at the same position; empty values match anything.
    pub fn matches(&self, filter: &Filter<'_>) -> bool {
        let wanted = match self.section() {
            "p" => &filter.p,
            "g" => &filter.g,
            _ => return true,
        };
        wanted.iter().enumerate().all(|(i, value)| {
            value.is_empty() || self.rule.get(i).is_some_and(|field| field == value)
        })
    }
}

/// Parses one line. Blank lines, `#` comments and lines carrying a ptype but
/// no fields yield `None`.
pub fn parse_line(line: &str) -> Option<PolicyLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut tokens = line.split(',').map(|t| t.trim().to_string());
    let ptype = tokens.next().filter(|t| !t.is_empty())?;
    let rule: Vec<String> = tokens.collect();
    if rule.is_empty() {
        return None;
    }
    Some(PolicyLine { ptype, rule })
}

/// Appends a parsed line to the model. Returns false when the model has no
/// definition for the rule's ptype, or already holds the rule.
pub fn apply_line(parsed: PolicyLine, m: &mut dyn Model) -> bool {
    let sec = parsed.section().to_string();
    let added = m.add_policy(&sec, &parsed.ptype, parsed.rule);
    if !added {
        tracing::debug!(ptype = %parsed.ptype, "rule not added to model");
    }
    added
}

/// Parses `line` and appends it to the model, the way casbin's own file
/// adapter does.
pub fn load_policy_line(line: &str, m: &mut dyn Model) -> bool {
    match parse_line(line) {
        Some(parsed) => apply_line(parsed, m),
        None => false,
    }
}

/// Canonical text of one rule, without the line terminator.
pub fn format_rule(ptype: &str, rule: &[String]) -> String {
    format!("{}, {}", ptype, rule.join(", "))
}

/// Serializes every `p` and `g` rule of the model. Rule types are written in
/// sorted order; rules keep the order the model stores them in.
pub fn serialize_model(m: &dyn Model) -> Vec<u8> {
    let mut out = String::new();
    for sec in SECTIONS {
        let Some(ast_map) = m.get_model().get(sec) else {
            continue;
        };
        let mut ptypes: Vec<&String> = ast_map.keys().collect();
        ptypes.sort();
        for ptype in ptypes {
            for rule in m.get_policy(sec, ptype) {
                // Writing into a String cannot fail.
                let _ = writeln!(out, "{}", format_rule(ptype, &rule));
            }
        }
    }
    out.into_bytes()
}
