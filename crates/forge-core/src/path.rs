//! Navigation path expressions
//!
//! A path is written as whitespace-separated tokens. Relationship tokens are
//! declared explicitly with brackets, everything else is an entity:
//!
//! ```text
//! Person [KNOWS] Person [WORKS_AT] Company
//! ```
//!
//! Schemas may also spell the tokens out as a list of tables, see
//! [`PathSpec`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Kind of a path token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Entity,
    Relationship,
}

/// A single path token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub name: String,
}

impl Token {
    pub fn entity(name: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Entity,
            name: name.into(),
        }
    }

    pub fn relationship(name: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Relationship,
            name: name.into(),
        }
    }

    pub fn is_entity(&self) -> bool {
        self.kind == TokenKind::Entity
    }

    pub fn is_relationship(&self) -> bool {
        self.kind == TokenKind::Relationship
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Entity => write!(f, "{}", self.name),
            TokenKind::Relationship => write!(f, "[{}]", self.name),
        }
    }
}

/// Ordered token sequence describing a traversal
///
/// Shape (alternation, endpoints, length) is checked when the path is
/// compiled, not when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathSpec", into = "PathSpec")]
pub struct PathExpression {
    tokens: Vec<Token>,
}

impl PathExpression {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Parse the bracket notation
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        for raw in text.split_whitespace() {
            let token = match raw.strip_prefix('[') {
                Some(rest) => {
                    let name = rest.strip_suffix(']').ok_or_else(|| {
                        Error::compilation(format!("unterminated relationship token '{}'", raw))
                    })?;
                    Token::relationship(name)
                }
                None if raw.contains(['[', ']']) => {
                    return Err(Error::compilation(format!("malformed token '{}'", raw)));
                }
                None => Token::entity(raw),
            };
            tokens.push(token);
        }
        if tokens.is_empty() {
            return Err(Error::compilation("empty path expression"));
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entity type the traversal ends on
    pub fn endpoint(&self) -> Option<&str> {
        self.tokens.last().map(|t| t.name.as_str())
    }
}

impl std::fmt::Display for PathExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.tokens.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl std::str::FromStr for PathExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Token as spelled in a schema file: `{ entity = "X" }` or `{ relationship = "R" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSpec {
    Entity(String),
    Relationship(String),
}

/// Schema-file representation of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    Text(String),
    Tokens(Vec<TokenSpec>),
}

impl TryFrom<PathSpec> for PathExpression {
    type Error = Error;

    fn try_from(spec: PathSpec) -> Result<Self> {
        match spec {
            PathSpec::Text(text) => Self::parse(&text),
            PathSpec::Tokens(specs) => {
                if specs.is_empty() {
                    return Err(Error::compilation("empty path expression"));
                }
                Ok(Self::from_tokens(
                    specs
                        .into_iter()
                        .map(|s| match s {
                            TokenSpec::Entity(name) => Token::entity(name),
                            TokenSpec::Relationship(name) => Token::relationship(name),
                        })
                        .collect(),
                ))
            }
        }
    }
}

impl From<PathExpression> for PathSpec {
    fn from(path: PathExpression) -> Self {
        PathSpec::Text(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bracket_notation() {
        let path = PathExpression::parse("Person [KNOWS] Person [WORKS_AT] Company").unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.tokens()[1], Token::relationship("KNOWS"));
        assert_eq!(path.tokens()[2], Token::entity("Person"));
        assert_eq!(path.endpoint(), Some("Company"));
    }

    #[test]
    fn test_casing_does_not_classify() {
        // An uppercase entity name stays an entity; a lowercase bracketed name is a relationship.
        let path = PathExpression::parse("URL [links_to] URL").unwrap();
        assert!(path.tokens()[0].is_entity());
        assert!(path.tokens()[1].is_relationship());
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        assert!(PathExpression::parse("").is_err());
        assert!(PathExpression::parse("A [KNOWS B").is_err());
        assert!(PathExpression::parse("A KN]OWS B").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let text = "Person [KNOWS] Person";
        assert_eq!(PathExpression::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_token_list_spec() {
        let spec = PathSpec::Tokens(vec![
            TokenSpec::Entity("Person".into()),
            TokenSpec::Relationship("OWNS".into()),
            TokenSpec::Entity("Car".into()),
        ]);
        let path = PathExpression::try_from(spec).unwrap();
        assert_eq!(path.to_string(), "Person [OWNS] Car");
    }
}
