//! Navigation compiler: path expressions to traversal queries
//!
//! Every token takes the next letter of [`PLACEHOLDERS`] in walk order. The
//! first entity placeholder is bound to the calling node, each relationship
//! becomes a directed edge pattern between its neighbouring entities, and the
//! last entity placeholder is projected:
//!
//! ```text
//! Person [KNOWS] Person [WORKS_AT] Company
//!
//! START a=node({id})
//! MATCH a-[b:KNOWS]->c-[d:WORKS_AT]->e
//! RETURN e
//! ```

use crate::error::{Error, Result};
use crate::limits::{validate_identifier, validate_path_len, PLACEHOLDERS};
use crate::node::{NodeId, Params};
use crate::path::{PathExpression, Token, TokenKind};

/// Parameter the starting node's identity is bound to
pub const START_PARAM: &str = "id";

/// Parameters of a sever query
pub const SEVER_FROM_PARAM: &str = "from";
pub const SEVER_TO_PARAM: &str = "to";

/// Placeholder assigned to a path token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub variable: String,
    pub token: Token,
}

/// A compiled, ready-to-run query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    text: String,
    bindings: Vec<Binding>,
    terminal: Option<Binding>,
}

impl CompiledQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder assignments in walk order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Variable of the projected node (None for sever queries)
    pub fn terminal_variable(&self) -> Option<&str> {
        self.terminal.as_ref().map(|b| b.variable.as_str())
    }

    /// Entity type of the projected node
    pub fn terminal_entity(&self) -> Option<&str> {
        self.terminal.as_ref().map(|b| b.token.name.as_str())
    }

    pub fn variable_for(&self, index: usize) -> Option<&str> {
        self.bindings.get(index).map(|b| b.variable.as_str())
    }

    /// Parameters for running a navigation query from `start`
    pub fn start_params(start: NodeId) -> Params {
        let mut params = Params::new();
        params.insert(START_PARAM.to_string(), start.0.into());
        params
    }

    /// Parameters for running a sever query between two nodes
    pub fn sever_params(from: NodeId, to: NodeId) -> Params {
        let mut params = Params::new();
        params.insert(SEVER_FROM_PARAM.to_string(), from.0.into());
        params.insert(SEVER_TO_PARAM.to_string(), to.0.into());
        params
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compiles navigation paths and relationship maintenance queries
pub struct NavigationCompiler;

impl NavigationCompiler {
    /// Compile a navigation path, optionally filtered by a `WHERE` predicate
    ///
    /// The predicate is trusted caller text and may reference the placeholders
    /// reported by [`CompiledQuery::bindings`].
    pub fn compile(path: &PathExpression, filter: Option<&str>) -> Result<CompiledQuery> {
        let tokens = path.tokens();
        validate_path_len(tokens.len())?;
        Self::check_shape(tokens)?;

        let bindings: Vec<Binding> = tokens
            .iter()
            .zip(PLACEHOLDERS.chars())
            .map(|(token, letter)| Binding {
                variable: letter.to_string(),
                token: token.clone(),
            })
            .collect();

        let start = &bindings[0].variable;
        let mut lines = vec![format!("START {}=node({{{}}})", start, START_PARAM)];

        if bindings.len() > 1 {
            let mut pattern = start.clone();
            for binding in &bindings[1..] {
                match binding.token.kind {
                    TokenKind::Relationship => {
                        pattern.push_str(&format!("-[{}:{}]->", binding.variable, binding.token.name));
                    }
                    TokenKind::Entity => pattern.push_str(&binding.variable),
                }
            }
            lines.push(format!("MATCH {}", pattern));
        }

        if let Some(predicate) = filter.map(str::trim).filter(|p| !p.is_empty()) {
            lines.push(format!("WHERE {}", predicate));
        }

        let terminal = bindings.last().cloned();
        if let Some(t) = &terminal {
            lines.push(format!("RETURN {}", t.variable));
        }

        let text = lines.join("\n");
        tracing::debug!("Compiled navigation '{}' into {:?}", path, text);

        Ok(CompiledQuery {
            text,
            bindings,
            terminal,
        })
    }

    /// Compile a query deleting relationships between `{from}` and `{to}`
    ///
    /// Both orientations match. Without a type, every relationship between
    /// the pair is deleted.
    pub fn compile_sever(rel_type: Option<&str>) -> Result<CompiledQuery> {
        let edge = match rel_type {
            Some(t) => {
                validate_identifier(t)?;
                format!("[r:{}]", t)
            }
            None => "[r]".to_string(),
        };
        let text = format!(
            "START a=node({{{}}}), b=node({{{}}})\nMATCH a-{}-b\nDELETE r",
            SEVER_FROM_PARAM, SEVER_TO_PARAM, edge
        );
        Ok(CompiledQuery {
            text,
            bindings: Vec::new(),
            terminal: None,
        })
    }

    fn check_shape(tokens: &[Token]) -> Result<()> {
        if tokens.is_empty() {
            return Err(Error::compilation("empty path expression"));
        }
        for (i, token) in tokens.iter().enumerate() {
            validate_identifier(&token.name)?;
            let expected = if i % 2 == 0 {
                TokenKind::Entity
            } else {
                TokenKind::Relationship
            };
            if token.kind != expected {
                return Err(Error::compilation(format!(
                    "token {} ('{}') must be {}",
                    i,
                    token,
                    match expected {
                        TokenKind::Entity => "an entity",
                        TokenKind::Relationship => "a relationship",
                    }
                )));
            }
        }
        if tokens.len() % 2 == 0 {
            return Err(Error::compilation("path must end on an entity"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> PathExpression {
        PathExpression::parse(text).unwrap()
    }

    #[test]
    fn test_compile_multi_hop() {
        let query =
            NavigationCompiler::compile(&path("Person [KNOWS] Person [WORKS_AT] Company"), None)
                .unwrap();
        assert_eq!(
            query.text(),
            "START a=node({id})\nMATCH a-[b:KNOWS]->c-[d:WORKS_AT]->e\nRETURN e"
        );
        assert_eq!(query.terminal_variable(), Some("e"));
        assert_eq!(query.terminal_entity(), Some("Company"));
        assert_eq!(query.variable_for(1), Some("b"));
    }

    #[test]
    fn test_compile_with_filter() {
        let query =
            NavigationCompiler::compile(&path("Person [KNOWS] Person"), Some("c.age > 30")).unwrap();
        assert_eq!(
            query.text(),
            "START a=node({id})\nMATCH a-[b:KNOWS]->c\nWHERE c.age > 30\nRETURN c"
        );
    }

    #[test]
    fn test_blank_filter_is_ignored() {
        let query = NavigationCompiler::compile(&path("Person [KNOWS] Person"), Some("  ")).unwrap();
        assert!(!query.text().contains("WHERE"));
    }

    #[test]
    fn test_single_token_returns_start() {
        let query = NavigationCompiler::compile(&path("Person"), None).unwrap();
        assert_eq!(query.text(), "START a=node({id})\nRETURN a");
        assert_eq!(query.terminal_variable(), Some("a"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let p = path("A [R] B [S] C");
        let first = NavigationCompiler::compile(&p, Some("e.x = 1")).unwrap();
        let second = NavigationCompiler::compile(&p, Some("e.x = 1")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bindings(), second.bindings());
    }

    #[test]
    fn test_rejects_consecutive_relationships() {
        let err = NavigationCompiler::compile(&path("A [R] [S] B"), None).unwrap_err();
        assert!(matches!(err, Error::QueryCompilation(_)));
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(matches!(
            NavigationCompiler::compile(&path("[R] B"), None),
            Err(Error::QueryCompilation(_))
        ));
        assert!(matches!(
            NavigationCompiler::compile(&path("A [R]"), None),
            Err(Error::QueryCompilation(_))
        ));
        assert!(matches!(
            NavigationCompiler::compile(&path("A B"), None),
            Err(Error::QueryCompilation(_))
        ));
    }

    #[test]
    fn test_alphabet_exhaustion() {
        let mut tokens = Vec::new();
        for i in 0..14 {
            if i > 0 {
                tokens.push(Token::relationship("NEXT"));
            }
            tokens.push(Token::entity("Step"));
        }
        assert_eq!(tokens.len(), 27);
        let err = NavigationCompiler::compile(&PathExpression::from_tokens(tokens.clone()), None)
            .unwrap_err();
        assert!(matches!(err, Error::QueryCompilation(_)));

        tokens.truncate(25);
        let query = NavigationCompiler::compile(&PathExpression::from_tokens(tokens), None).unwrap();
        assert_eq!(query.terminal_variable(), Some("y"));
    }

    #[test]
    fn test_rejects_unsafe_names() {
        let p = PathExpression::from_tokens(vec![
            Token::entity("A"),
            Token::relationship("R]->(x"),
            Token::entity("B"),
        ]);
        assert!(NavigationCompiler::compile(&p, None).is_err());
    }

    #[test]
    fn test_compile_sever() {
        let typed = NavigationCompiler::compile_sever(Some("KNOWS")).unwrap();
        assert_eq!(
            typed.text(),
            "START a=node({from}), b=node({to})\nMATCH a-[r:KNOWS]-b\nDELETE r"
        );
        let any = NavigationCompiler::compile_sever(None).unwrap();
        assert!(any.text().contains("MATCH a-[r]-b"));
        assert!(NavigationCompiler::compile_sever(Some("BAD TYPE")).is_err());
    }

    #[test]
    fn test_params() {
        let params = CompiledQuery::start_params(NodeId(7));
        assert_eq!(params.get("id"), Some(&serde_json::json!(7)));
        let params = CompiledQuery::sever_params(NodeId(1), NodeId(2));
        assert_eq!(params.len(), 2);
    }
}
