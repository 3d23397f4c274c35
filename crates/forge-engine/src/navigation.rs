//! Navigation execution
//!
//! Paths are compiled on every call and run from the calling object's node.
//! Terminal nodes whose entity is registered come back mapped; anything else
//! comes back raw.

use crate::mapper::NodeMapper;
use crate::object::MappedObject;
use forge_core::{CompiledQuery, Error, NavigationCompiler, NodeId, PathExpression, RawNode, Result};
use forge_store::GraphStore;

/// One result of a navigation
pub enum NavItem<S> {
    Mapped(MappedObject<S>),
    Raw(RawNode),
}

impl<S> std::fmt::Debug for NavItem<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavItem::Mapped(obj) => f.debug_tuple("Mapped").field(obj).finish(),
            NavItem::Raw(node) => f.debug_tuple("Raw").field(node).finish(),
        }
    }
}

impl<S> NavItem<S> {
    pub fn id(&self) -> NodeId {
        match self {
            NavItem::Mapped(obj) => obj.id(),
            NavItem::Raw(node) => node.id,
        }
    }

    pub fn as_mapped(&self) -> Option<&MappedObject<S>> {
        match self {
            NavItem::Mapped(obj) => Some(obj),
            NavItem::Raw(_) => None,
        }
    }

    pub fn into_mapped(self) -> Option<MappedObject<S>> {
        match self {
            NavItem::Mapped(obj) => Some(obj),
            NavItem::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&RawNode> {
        match self {
            NavItem::Raw(node) => Some(node),
            NavItem::Mapped(_) => None,
        }
    }
}

impl<S: GraphStore> MappedObject<S> {
    /// Follow the named navigation declared on this object's entity
    pub async fn navigate(&self, name: &str) -> Result<Vec<NavItem<S>>> {
        self.navigate_where(name, None).await
    }

    /// Follow a named navigation, keeping rows that satisfy `filter`
    ///
    /// The filter is a `WHERE` predicate over the path's placeholders, for
    /// example `c.age > 30`.
    pub async fn navigate_where(&self, name: &str, filter: Option<&str>) -> Result<Vec<NavItem<S>>> {
        let path = self.mapper.registry().navigation(self.entity(), name)?;
        let query = NavigationCompiler::compile(path, filter)?;
        run(&self.mapper, &query, self.id()).await
    }

    /// Follow an ad-hoc path from this object
    pub async fn traverse(&self, path: &PathExpression, filter: Option<&str>) -> Result<Vec<NavItem<S>>> {
        let query = NavigationCompiler::compile(path, filter)?;
        run(&self.mapper, &query, self.id()).await
    }

    /// Names of the navigations declared on this object's entity
    pub fn navigations(&self) -> Vec<&str> {
        self.mapper
            .registry()
            .get(self.entity())
            .map(|entry| entry.navigation.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

async fn run<S: GraphStore>(
    mapper: &NodeMapper<S>,
    query: &CompiledQuery,
    start: NodeId,
) -> Result<Vec<NavItem<S>>> {
    let (variable, entity) = match (query.terminal_variable(), query.terminal_entity()) {
        (Some(variable), Some(entity)) => (variable, entity),
        _ => return Err(Error::compilation("navigation query has no terminal node")),
    };

    let rows = mapper
        .store()
        .query(query.text(), &CompiledQuery::start_params(start))
        .await
        .map_err(|e| Error::store("query", e))?;
    tracing::debug!("Navigation from {} returned {} rows", start, rows.len());

    let mapped = mapper.registry().contains(entity);
    rows.into_iter()
        .map(|row| {
            let node = row
                .take(variable)
                .ok_or_else(|| Error::store("query", format!("row has no column '{}'", variable)))?;
            if mapped {
                mapper.spawn(entity, node).map(NavItem::Mapped)
            } else {
                Ok(NavItem::Raw(node))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::test_support::{forge, person};
    use forge_core::{Error, PathExpression, PropertyMap, Value};
    use forge_store::GraphStore;

    #[tokio::test]
    async fn test_multi_hop_navigation_maps_terminal() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let bob = forge.create("Person", person("Bob", 41)).await.unwrap();
        let cat = forge.create("Person", person("Cat", 25)).await.unwrap();
        let mut company = PropertyMap::new();
        company.insert("title".into(), Value::from("Engines Ltd"));
        let engines = forge.create("Company", company).await.unwrap();

        ada.bind("to", &bob, "KNOWS", PropertyMap::new()).await.unwrap();
        ada.bind("to", &cat, "KNOWS", PropertyMap::new()).await.unwrap();
        bob.bind("to", &engines, "WORKS_AT", PropertyMap::new()).await.unwrap();

        let friends = ada.navigate("friends").await.unwrap();
        let ids: Vec<_> = friends.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![bob.id(), cat.id()]);
        assert_eq!(friends[0].as_mapped().unwrap().entity(), "Person");

        let older = ada.navigate_where("friends", Some("c.age > 30")).await.unwrap();
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].id(), bob.id());

        let employers = ada.navigate("friend_employers").await.unwrap();
        assert_eq!(employers.len(), 1);
        let company = employers.into_iter().next().unwrap().into_mapped().unwrap();
        assert_eq!(company.entity(), "Company");
        assert_eq!(company.get("title"), Some(&Value::from("Engines Ltd")));
    }

    #[tokio::test]
    async fn test_unregistered_terminal_comes_back_raw() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let pet = forge
            .store()
            .create_node(forge_core::PropertyBag::new())
            .await
            .unwrap();
        ada.bind("to", &pet, "OWNS", PropertyMap::new()).await.unwrap();

        let pets = ada.navigate("pets").await.unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].as_raw().unwrap().id, pet.id);
    }

    #[tokio::test]
    async fn test_single_token_path_returns_self() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let path = PathExpression::parse("Person").unwrap();
        let found = ada.traverse(&path, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), ada.id());
    }

    #[tokio::test]
    async fn test_unknown_navigation() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        assert!(matches!(
            ada.navigate("enemies").await,
            Err(Error::UnknownNavigation { .. })
        ));
        assert!(ada.navigations().contains(&"friends"));
    }

    #[tokio::test]
    async fn test_malformed_path_fails_before_store() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let path = PathExpression::parse("Person [KNOWS] [LIKES] Person").unwrap();
        assert!(matches!(
            ada.traverse(&path, None).await,
            Err(Error::QueryCompilation(_))
        ));
    }

    #[tokio::test]
    async fn test_navigation_reflects_current_graph() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let bob = forge.create("Person", person("Bob", 41)).await.unwrap();
        let cat = forge.create("Person", person("Cat", 25)).await.unwrap();
        ada.bind("to", &bob, "KNOWS", PropertyMap::new()).await.unwrap();

        let ids = |items: Vec<super::NavItem<_>>| items.iter().map(|f| f.id()).collect::<Vec<_>>();
        assert_eq!(ids(ada.navigate("friends").await.unwrap()), vec![bob.id()]);

        ada.bind("to", &cat, "KNOWS", PropertyMap::new()).await.unwrap();
        assert_eq!(ids(ada.navigate("friends").await.unwrap()), vec![bob.id(), cat.id()]);

        ada.sever(&bob, Some("KNOWS")).await.unwrap();
        assert_eq!(ids(ada.navigate("friends").await.unwrap()), vec![cat.id()]);
    }
}
