//! Interpreter for the pattern-matching query dialect
//!
//! Supported shape:
//!
//! ```text
//! START a=node({id}), b=node(7)
//! MATCH a-[r:KNOWS]->c<-[s]-d-[:LIKES]-e
//! WHERE c.age > 30 AND e.name = 'Oslo'
//! RETURN c, e            (or: DELETE r)
//! ```
//!
//! A single `MATCH` chain is supported. `WHERE` takes `var.prop OP operand`
//! comparisons joined by `AND`; operands are quoted strings, numbers,
//! `true`/`false`/`null` or `{param}`. Matches are enumerated depth-first
//! over relationships in creation order, so row order is deterministic, and
//! a relationship is used at most once per match.

use crate::error::{StoreError, StoreResult};
use forge_core::{NodeId, Params, PropertyBag, RawNode, Relationship, RelationshipId, Row};
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

const KEYWORDS: [&str; 5] = ["START", "MATCH", "WHERE", "RETURN", "DELETE"];

/// Where a `START` binding takes its node from
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSource {
    Param(String),
    Id(u64),
}

/// Orientation of an edge pattern relative to the node on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
    Either,
}

/// One `-[r:TYPE]->node` step of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub rel_var: Option<String>,
    pub rel_type: Option<String>,
    pub direction: EdgeDirection,
    pub node_var: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub origin: String,
    pub hops: Vec<Hop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Json),
    Param(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub variable: String,
    pub property: String,
    pub op: Comparison,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Return(Vec<String>),
    Delete(Vec<String>),
}

/// Parsed query
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub starts: Vec<(String, NodeSource)>,
    pub chain: Option<Chain>,
    pub conditions: Vec<Condition>,
    pub action: Action,
}

impl Statement {
    pub fn is_mutation(&self) -> bool {
        matches!(self.action, Action::Delete(_))
    }
}

/// Result of executing a statement against a graph snapshot
#[derive(Debug, Default)]
pub struct Outcome {
    pub rows: Vec<Row>,
    pub deleted_relationships: Vec<RelationshipId>,
    pub deleted_nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Node(NodeId),
    Rel(usize),
}

type Bindings = HashMap<String, Bound>;

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse query text into a statement
pub fn parse(text: &str) -> StoreResult<Statement> {
    let mut clauses: Vec<(String, Vec<String>)> = Vec::new();
    for word in words(text)? {
        let upper = word.to_ascii_uppercase();
        if KEYWORDS.contains(&upper.as_str()) {
            if clauses.iter().any(|(k, _)| *k == upper) {
                return Err(StoreError::query(format!("duplicate {} clause", upper)));
            }
            clauses.push((upper, Vec::new()));
        } else {
            match clauses.last_mut() {
                Some((_, body)) => body.push(word),
                None => {
                    return Err(StoreError::query(format!(
                        "query must start with START or MATCH, found '{}'",
                        word
                    )))
                }
            }
        }
    }

    let mut statement = Statement {
        starts: Vec::new(),
        chain: None,
        conditions: Vec::new(),
        action: Action::Return(Vec::new()),
    };
    let mut action = None;

    for (keyword, body) in clauses {
        if body.is_empty() {
            return Err(StoreError::query(format!("empty {} clause", keyword)));
        }
        match keyword.as_str() {
            "START" => statement.starts = parse_starts(&body.concat())?,
            "MATCH" => statement.chain = Some(parse_chain(&body.concat())?),
            "WHERE" => statement.conditions = parse_conditions(&body)?,
            "RETURN" | "DELETE" => {
                if action.is_some() {
                    return Err(StoreError::query("only one of RETURN or DELETE is allowed"));
                }
                let vars = parse_var_list(&body.concat())?;
                action = Some(if keyword == "RETURN" {
                    Action::Return(vars)
                } else {
                    Action::Delete(vars)
                });
            }
            _ => unreachable!("clause keywords come from KEYWORDS"),
        }
    }

    if statement.starts.is_empty() && statement.chain.is_none() {
        return Err(StoreError::query("query needs a START or MATCH clause"));
    }
    statement.action = action.ok_or_else(|| StoreError::query("query needs RETURN or DELETE"))?;
    Ok(statement)
}

/// Split on whitespace, keeping quoted literals intact
fn words(text: &str) -> StoreResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }
    if quote.is_some() {
        return Err(StoreError::query("unterminated string literal"));
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ident(s: &str, what: &str) -> StoreResult<String> {
    if is_ident(s) {
        Ok(s.to_string())
    } else {
        Err(StoreError::query(format!("invalid {} '{}'", what, s)))
    }
}

fn parse_starts(body: &str) -> StoreResult<Vec<(String, NodeSource)>> {
    body.split(',')
        .map(|part| {
            let (var, source) = part
                .split_once('=')
                .ok_or_else(|| StoreError::query(format!("expected var=node(..), got '{}'", part)))?;
            let inner = source
                .strip_prefix("node(")
                .and_then(|s| s.strip_suffix(')'))
                .ok_or_else(|| StoreError::query(format!("expected node(..), got '{}'", source)))?;
            let source = match inner.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => NodeSource::Param(ident(param, "parameter")?),
                None => NodeSource::Id(
                    inner
                        .parse()
                        .map_err(|_| StoreError::query(format!("invalid node id '{}'", inner)))?,
                ),
            };
            Ok((ident(var, "variable")?, source))
        })
        .collect()
}

fn parse_chain(body: &str) -> StoreResult<Chain> {
    if body.contains(',') {
        return Err(StoreError::query("only a single MATCH pattern is supported"));
    }

    let mut rest = body;
    let origin_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let origin = ident(&rest[..origin_len], "variable")?;
    rest = &rest[origin_len..];

    let mut hops = Vec::new();
    while !rest.is_empty() {
        let incoming = if let Some(r) = rest.strip_prefix("<-[") {
            rest = r;
            true
        } else if let Some(r) = rest.strip_prefix("-[") {
            rest = r;
            false
        } else {
            return Err(StoreError::query(format!("expected edge pattern at '{}'", rest)));
        };

        let close = rest
            .find(']')
            .ok_or_else(|| StoreError::query("unterminated edge pattern"))?;
        let inside = &rest[..close];
        rest = &rest[close + 1..];

        let (rel_var, rel_type) = match inside.split_once(':') {
            Some((var, ty)) => (var, Some(ident(ty, "relationship type")?)),
            None => (inside, None),
        };
        let rel_var = if rel_var.is_empty() {
            None
        } else {
            Some(ident(rel_var, "variable")?)
        };

        let direction = if let Some(r) = rest.strip_prefix("->") {
            if incoming {
                return Err(StoreError::query("edge cannot point both ways"));
            }
            rest = r;
            EdgeDirection::Outgoing
        } else if let Some(r) = rest.strip_prefix('-') {
            rest = r;
            if incoming {
                EdgeDirection::Incoming
            } else {
                EdgeDirection::Either
            }
        } else {
            return Err(StoreError::query(format!("expected '-' or '->' at '{}'", rest)));
        };

        let node_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let node_var = ident(&rest[..node_len], "variable")?;
        rest = &rest[node_len..];

        hops.push(Hop {
            rel_var,
            rel_type,
            direction,
            node_var,
        });
    }

    Ok(Chain { origin, hops })
}

fn parse_conditions(body: &[String]) -> StoreResult<Vec<Condition>> {
    body.split(|w| w.eq_ignore_ascii_case("AND"))
        .map(|words| parse_condition(&words.join(" ")))
        .collect()
}

fn parse_condition(text: &str) -> StoreResult<Condition> {
    const OPERATORS: [(&str, Comparison); 7] = [
        ("<>", Comparison::Ne),
        ("!=", Comparison::Ne),
        ("<=", Comparison::Le),
        (">=", Comparison::Ge),
        ("=", Comparison::Eq),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
    ];

    let mut quote = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None => {
                for (symbol, op) in OPERATORS {
                    if text[i..].starts_with(symbol) {
                        let (left, right) = (text[..i].trim(), text[i + symbol.len()..].trim());
                        let (variable, property) = left.split_once('.').ok_or_else(|| {
                            StoreError::query(format!("expected var.property, got '{}'", left))
                        })?;
                        return Ok(Condition {
                            variable: ident(variable, "variable")?,
                            property: ident(property, "property")?,
                            op,
                            operand: parse_operand(right)?,
                        });
                    }
                }
            }
        }
    }
    Err(StoreError::query(format!("no comparison operator in '{}'", text)))
}

fn parse_operand(text: &str) -> StoreResult<Operand> {
    if let Some(param) = text.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        return Ok(Operand::Param(ident(param, "parameter")?));
    }
    for q in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            return Ok(Operand::Literal(Json::String(text[1..text.len() - 1].to_string())));
        }
    }
    match text.to_ascii_lowercase().as_str() {
        "true" => return Ok(Operand::Literal(Json::Bool(true))),
        "false" => return Ok(Operand::Literal(Json::Bool(false))),
        "null" => return Ok(Operand::Literal(Json::Null)),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Operand::Literal(n.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(|n| Operand::Literal(Json::Number(n)))
        .ok_or_else(|| StoreError::query(format!("invalid operand '{}'", text)))
}

fn parse_var_list(body: &str) -> StoreResult<Vec<String>> {
    body.split(',').map(|v| ident(v, "variable")).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Index queries
// ─────────────────────────────────────────────────────────────────────────────

/// One `key:value` term of an index query; `None` stands for `*`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTerm {
    pub key: Option<String>,
    pub value: Option<Json>,
}

impl IndexTerm {
    /// Whether an index entry stored under `key` and encoded `value` matches
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.key.as_deref().map_or(true, |k| k == key)
            && self.value.as_ref().map_or(true, |v| v.to_string() == value)
    }
}

/// Parse an index query such as `team:core OR name:"Ada Lovelace" age:*`
///
/// Terms are OR-ed and the `OR` keyword is optional. Quoted values are
/// strings; unquoted ones keep their type when they read as a number or
/// boolean.
pub fn parse_index_query(text: &str) -> StoreResult<Vec<IndexTerm>> {
    let mut terms = Vec::new();
    for word in words(text)? {
        if word == "OR" {
            continue;
        }
        let (key, value) = word
            .split_once(':')
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .ok_or_else(|| StoreError::query(format!("expected 'key:value', found '{}'", word)))?;
        let key = (key != "*").then(|| key.to_string());
        let value = match value {
            "*" => None,
            quoted if quoted.len() >= 2 && quoted.starts_with('"') && quoted.ends_with('"') => {
                Some(Json::String(quoted[1..quoted.len() - 1].to_string()))
            }
            bare => Some(match serde_json::from_str::<Json>(bare) {
                Ok(literal @ (Json::Number(_) | Json::Bool(_))) => literal,
                _ => Json::String(bare.to_string()),
            }),
        };
        terms.push(IndexTerm { key, value });
    }
    if terms.is_empty() {
        return Err(StoreError::query("empty index query"));
    }
    Ok(terms)
}

// ─────────────────────────────────────────────────────────────────────────────
// Execution
// ─────────────────────────────────────────────────────────────────────────────

/// Execute a statement against a snapshot of nodes and relationships
///
/// Deletions are reported in the outcome and applied by the caller.
pub fn execute(
    statement: &Statement,
    params: &Params,
    nodes: &BTreeMap<NodeId, PropertyBag>,
    rels: &[Relationship],
) -> StoreResult<Outcome> {
    let mut seed = Bindings::new();
    for (var, source) in &statement.starts {
        let id = match source {
            NodeSource::Id(id) => NodeId(*id),
            NodeSource::Param(name) => params
                .get(name)
                .and_then(Json::as_u64)
                .map(NodeId)
                .ok_or_else(|| StoreError::MissingParameter(name.clone()))?,
        };
        if !nodes.contains_key(&id) {
            return Err(StoreError::NodeNotFound(id));
        }
        seed.insert(var.clone(), Bound::Node(id));
    }

    let mut matches = Vec::new();
    match &statement.chain {
        Some(chain) => {
            let origins: Vec<NodeId> = match seed.get(&chain.origin) {
                Some(Bound::Node(id)) => vec![*id],
                Some(Bound::Rel(_)) => {
                    return Err(StoreError::query(format!("'{}' is not a node", chain.origin)))
                }
                None => nodes.keys().copied().collect(),
            };
            for origin in origins {
                let mut bindings = seed.clone();
                bindings.insert(chain.origin.clone(), Bound::Node(origin));
                let mut used = Vec::new();
                walk(&chain.hops, origin, &mut bindings, &mut used, rels, &mut matches);
            }
        }
        None => matches.push(seed),
    }

    let mut outcome = Outcome::default();
    for bindings in matches {
        if !satisfies(&statement.conditions, &bindings, params, nodes, rels)? {
            continue;
        }
        match &statement.action {
            Action::Return(vars) => {
                let mut row = Row::new();
                for var in vars {
                    match bindings.get(var) {
                        Some(Bound::Node(id)) => row.push(
                            var.clone(),
                            RawNode {
                                id: *id,
                                properties: nodes.get(id).cloned().unwrap_or_default(),
                            },
                        ),
                        Some(Bound::Rel(_)) => {
                            return Err(StoreError::query(format!(
                                "cannot return relationship '{}'",
                                var
                            )))
                        }
                        None => return Err(StoreError::query(format!("unbound variable '{}'", var))),
                    }
                }
                outcome.rows.push(row);
            }
            Action::Delete(vars) => {
                for var in vars {
                    match bindings.get(var) {
                        Some(Bound::Rel(idx)) => {
                            let id = rels[*idx].id;
                            if !outcome.deleted_relationships.contains(&id) {
                                outcome.deleted_relationships.push(id);
                            }
                        }
                        Some(Bound::Node(id)) => {
                            if !outcome.deleted_nodes.contains(id) {
                                outcome.deleted_nodes.push(*id);
                            }
                        }
                        None => return Err(StoreError::query(format!("unbound variable '{}'", var))),
                    }
                }
            }
        }
    }
    Ok(outcome)
}

fn walk(
    hops: &[Hop],
    current: NodeId,
    bindings: &mut Bindings,
    used: &mut Vec<usize>,
    rels: &[Relationship],
    out: &mut Vec<Bindings>,
) {
    let Some((hop, rest)) = hops.split_first() else {
        out.push(bindings.clone());
        return;
    };

    for (idx, rel) in rels.iter().enumerate() {
        if used.contains(&idx) {
            continue;
        }
        if hop.rel_type.as_ref().is_some_and(|t| *t != rel.rel_type) {
            continue;
        }
        let next = match hop.direction {
            EdgeDirection::Outgoing if rel.start == current => rel.end,
            EdgeDirection::Incoming if rel.end == current => rel.start,
            EdgeDirection::Either if rel.start == current => rel.end,
            EdgeDirection::Either if rel.end == current => rel.start,
            _ => continue,
        };

        let prev_node = bindings.get(&hop.node_var).copied();
        match prev_node {
            Some(Bound::Node(id)) if id != next => continue,
            Some(Bound::Rel(_)) => continue,
            _ => {}
        }
        let prev_rel = hop.rel_var.as_ref().and_then(|v| bindings.get(v).copied());
        if prev_rel.is_some_and(|b| b != Bound::Rel(idx)) {
            continue;
        }

        bindings.insert(hop.node_var.clone(), Bound::Node(next));
        if let Some(var) = &hop.rel_var {
            bindings.insert(var.clone(), Bound::Rel(idx));
        }
        used.push(idx);

        walk(rest, next, bindings, used, rels, out);

        used.pop();
        if prev_node.is_none() {
            bindings.remove(&hop.node_var);
        }
        if let (Some(var), None) = (&hop.rel_var, prev_rel) {
            bindings.remove(var);
        }
    }
}

fn satisfies(
    conditions: &[Condition],
    bindings: &Bindings,
    params: &Params,
    nodes: &BTreeMap<NodeId, PropertyBag>,
    rels: &[Relationship],
) -> StoreResult<bool> {
    for condition in conditions {
        let actual = match bindings.get(&condition.variable) {
            Some(Bound::Node(id)) => nodes.get(id).and_then(|bag| bag.get(&condition.property)),
            Some(Bound::Rel(idx)) => rels[*idx].data.get(&condition.property),
            None => {
                return Err(StoreError::query(format!(
                    "unbound variable '{}' in WHERE",
                    condition.variable
                )))
            }
        };
        let expected = match &condition.operand {
            Operand::Literal(v) => v,
            Operand::Param(name) => params
                .get(name)
                .ok_or_else(|| StoreError::MissingParameter(name.clone()))?,
        };
        if !compare(actual.unwrap_or(&Json::Null), condition.op, expected) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare(actual: &Json, op: Comparison, expected: &Json) -> bool {
    let ordering = match (actual, expected) {
        (Json::Number(a), Json::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b)),
        (Json::String(a), Json::String(b)) => Some(a.cmp(b)),
        (Json::Bool(a), Json::Bool(b)) => Some(a.cmp(b)),
        (Json::Null, Json::Null) => Some(Ordering::Equal),
        _ => None,
    };
    match op {
        Comparison::Eq => ordering == Some(Ordering::Equal),
        Comparison::Ne => ordering != Some(Ordering::Equal),
        Comparison::Lt => ordering == Some(Ordering::Less),
        Comparison::Gt => ordering == Some(Ordering::Greater),
        Comparison::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Comparison::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_navigation_query() {
        let stmt = parse("START a=node({id})\nMATCH a-[b:KNOWS]->c-[d:WORKS_AT]->e\nRETURN e").unwrap();
        assert_eq!(stmt.starts, vec![("a".to_string(), NodeSource::Param("id".into()))]);
        let chain = stmt.chain.unwrap();
        assert_eq!(chain.origin, "a");
        assert_eq!(chain.hops.len(), 2);
        assert_eq!(chain.hops[1].rel_type.as_deref(), Some("WORKS_AT"));
        assert_eq!(chain.hops[1].node_var, "e");
        assert_eq!(stmt.action, Action::Return(vec!["e".into()]));
    }

    #[test]
    fn test_parse_directions() {
        let stmt = parse("MATCH a<-[r:X]-b-[s]-c-[:Y]->d RETURN a").unwrap();
        let hops = stmt.chain.unwrap().hops;
        assert_eq!(hops[0].direction, EdgeDirection::Incoming);
        assert_eq!(hops[1].direction, EdgeDirection::Either);
        assert_eq!(hops[1].rel_type, None);
        assert_eq!(hops[2].direction, EdgeDirection::Outgoing);
        assert_eq!(hops[2].rel_var, None);
    }

    #[test]
    fn test_parse_where_clause() {
        let stmt =
            parse("START a=node(1) WHERE a.name = 'Ada  Lovelace' and a.age>=36 AND a.x <> {p} RETURN a")
                .unwrap();
        assert_eq!(stmt.conditions.len(), 3);
        assert_eq!(
            stmt.conditions[0].operand,
            Operand::Literal(json!("Ada  Lovelace"))
        );
        assert_eq!(stmt.conditions[1].op, Comparison::Ge);
        assert_eq!(stmt.conditions[2].operand, Operand::Param("p".into()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("RETURN a").is_err());
        assert!(parse("START a=node(1)").is_err());
        assert!(parse("START a=node(x) RETURN a").is_err());
        assert!(parse("START a=node(1) RETURN a DELETE a").is_err());
        assert!(parse("MATCH a-[r:X]>b RETURN a").is_err());
        assert!(parse("MATCH a<-[r:X]->b RETURN a").is_err());
        assert!(parse("START a=node(1) WHERE a.name = 'open RETURN a").is_err());
        assert!(parse("hello START a=node(1) RETURN a").is_err());
    }

    fn graph() -> (BTreeMap<NodeId, PropertyBag>, Vec<Relationship>) {
        let mut nodes = BTreeMap::new();
        for (id, name, age) in [(1, "ada", 36), (2, "bob", 41), (3, "cy", 29), (4, "acme", 0)] {
            let mut bag = PropertyBag::new();
            bag.insert("name".into(), json!(name));
            bag.insert("age".into(), json!(age));
            nodes.insert(NodeId(id), bag);
        }
        let rel = |id, start, end, ty: &str| Relationship {
            id: RelationshipId(id),
            start: NodeId(start),
            end: NodeId(end),
            rel_type: ty.to_string(),
            data: PropertyBag::new(),
        };
        let rels = vec![
            rel(1, 1, 2, "KNOWS"),
            rel(2, 1, 3, "KNOWS"),
            rel(3, 2, 4, "WORKS_AT"),
            rel(4, 3, 4, "WORKS_AT"),
        ];
        (nodes, rels)
    }

    fn names(outcome: &Outcome, column: &str) -> Vec<String> {
        outcome
            .rows
            .iter()
            .map(|r| r.get(column).unwrap().get("name").unwrap().as_str().unwrap().to_string())
            .collect()
    }

    fn params(id: u64) -> Params {
        let mut p = Params::new();
        p.insert("id".into(), json!(id));
        p
    }

    #[test]
    fn test_execute_multi_hop() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({id})\nMATCH a-[b:KNOWS]->c-[d:WORKS_AT]->e\nRETURN e").unwrap();
        let outcome = execute(&stmt, &params(1), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "e"), vec!["acme", "acme"]);
    }

    #[test]
    fn test_execute_where_filter() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({id}) MATCH a-[b:KNOWS]->c WHERE c.age > 30 RETURN c").unwrap();
        let outcome = execute(&stmt, &params(1), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "c"), vec!["bob"]);
    }

    #[test]
    fn test_execute_incoming_and_either() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({id}) MATCH a<-[r:WORKS_AT]-p RETURN p").unwrap();
        let outcome = execute(&stmt, &params(4), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "p"), vec!["bob", "cy"]);

        let stmt = parse("START a=node({id}) MATCH a-[r]-p RETURN p").unwrap();
        let outcome = execute(&stmt, &params(2), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "p"), vec!["ada", "acme"]);
    }

    #[test]
    fn test_execute_start_only() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({id}) RETURN a").unwrap();
        let outcome = execute(&stmt, &params(3), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "a"), vec!["cy"]);
    }

    #[test]
    fn test_execute_unanchored_match() {
        let (nodes, rels) = graph();
        let stmt = parse("MATCH p-[:WORKS_AT]->c WHERE p.age < 40 RETURN p, c").unwrap();
        let outcome = execute(&stmt, &Params::new(), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "p"), vec!["cy"]);
        assert_eq!(outcome.rows[0].len(), 2);
    }

    #[test]
    fn test_execute_delete_between_pair() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({from}), b=node({to}) MATCH a-[r:KNOWS]-b DELETE r").unwrap();
        let mut p = Params::new();
        p.insert("from".into(), json!(3));
        p.insert("to".into(), json!(1));
        let outcome = execute(&stmt, &p, &nodes, &rels).unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.deleted_relationships, vec![RelationshipId(2)]);
    }

    #[test]
    fn test_execute_missing_node_and_param() {
        let (nodes, rels) = graph();
        let stmt = parse("START a=node({id}) RETURN a").unwrap();
        assert!(matches!(
            execute(&stmt, &params(99), &nodes, &rels),
            Err(StoreError::NodeNotFound(NodeId(99)))
        ));
        assert!(matches!(
            execute(&stmt, &Params::new(), &nodes, &rels),
            Err(StoreError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_relationship_used_once_per_match() {
        let (nodes, rels) = graph();
        // a-[]-b-[]-c must not bounce back over the same edge
        let stmt = parse("START a=node({id}) MATCH a-[r]-b-[s]-c RETURN c").unwrap();
        let outcome = execute(&stmt, &params(2), &nodes, &rels).unwrap();
        assert_eq!(names(&outcome, "c"), vec!["cy", "cy"]);
    }

    #[test]
    fn test_parse_index_query() {
        let terms = parse_index_query("team:core OR name:\"Ada Lovelace\" age:36 *:*").unwrap();
        assert_eq!(terms.len(), 4);
        assert_eq!(terms[0].value, Some(json!("core")));
        assert_eq!(terms[1].value, Some(json!("Ada Lovelace")));
        assert_eq!(terms[2].value, Some(json!(36)));
        assert_eq!(terms[3], IndexTerm { key: None, value: None });

        assert!(terms[0].matches("team", "\"core\""));
        assert!(!terms[0].matches("team", "core"));
        assert!(terms[2].matches("age", "36"));
        assert!(terms[3].matches("anything", "1"));

        assert!(parse_index_query("").is_err());
        assert!(parse_index_query("team").is_err());
        assert!(parse_index_query("team:").is_err());
        assert!(parse_index_query(":core").is_err());
        assert!(parse_index_query("name:\"open").is_err());
    }

    #[test]
    fn test_compare() {
        assert!(compare(&json!(2), Comparison::Lt, &json!(2.5)));
        assert!(compare(&json!("b"), Comparison::Gt, &json!("a")));
        assert!(!compare(&json!("1"), Comparison::Eq, &json!(1)));
        assert!(compare(&json!("1"), Comparison::Ne, &json!(1)));
        assert!(compare(&Json::Null, Comparison::Eq, &Json::Null));
    }
}
