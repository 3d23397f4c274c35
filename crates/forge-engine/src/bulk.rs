//! Bulk create and fetch operations
//!
//! Sequential mode walks the inputs in order and returns the first error
//! with no partial results. Parallel mode keeps up to `max_concurrency`
//! operations in flight, drains every input, restores input order for the
//! successes and reports failures as one [`Error::Batch`].

use crate::forge::Forge;
use crate::object::MappedObject;
use crate::options::ExecutionMode;
use forge_core::pipeline::{self, SetOptions, SetResult};
use forge_core::{validate, Error, IdSelection, Params, PropertyMap, Result, Row, Value};
use forge_store::GraphStore;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Per-call options for a bulk operation
pub struct BulkOptions<T> {
    /// Falls back to the engine's default mode
    pub mode: Option<ExecutionMode>,
    pub set: SetOptions<T>,
}

impl<T> Default for BulkOptions<T> {
    fn default() -> Self {
        Self {
            mode: None,
            set: SetOptions::default(),
        }
    }
}

impl<T> BulkOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequential(mut self) -> Self {
        self.mode = Some(ExecutionMode::Sequential);
        self
    }

    pub fn parallel(mut self) -> Self {
        self.mode = Some(ExecutionMode::Parallel);
        self
    }

    pub fn with_set(mut self, set: SetOptions<T>) -> Self {
        self.set = set;
        self
    }
}

/// Processed successes plus the aggregate failure, if any
#[derive(Debug)]
pub struct BatchResult<T> {
    pub items: SetResult<T>,
    pub error: Option<Error>,
}

impl<T> BatchResult<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Fail if any item failed, otherwise return the processed set
    pub fn into_result(self) -> Result<SetResult<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }
}

/// Bulk operations over one [`Forge`]
pub struct BulkRunner<'a, S> {
    forge: &'a Forge<S>,
}

impl<'a, S: GraphStore> BulkRunner<'a, S> {
    pub(crate) fn new(forge: &'a Forge<S>) -> Self {
        Self { forge }
    }

    /// Create one object per property map
    pub async fn create_many(
        &self,
        entity: &str,
        objects: Vec<PropertyMap>,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        let forge = self.forge;
        self.run(options, objects, move |properties| forge.create(entity, properties))
            .await
    }

    /// Validate `template` once, then create `count` objects from it
    pub async fn create_from_template(
        &self,
        entity: &str,
        template: PropertyMap,
        count: usize,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        let entry = self.forge.registry().entry(entity)?;
        validate(&template, &entry.required_fields)?;

        let forge = self.forge;
        let template = &template;
        self.run(options, (0..count).collect::<Vec<usize>>(), move |_| {
            forge.create_unchecked(entity, template.clone())
        })
        .await
    }

    /// Fetch objects by an id list or an inclusive `"start-end"` range
    pub async fn fetch_many_by_ids(
        &self,
        entity: &str,
        ids: impl Into<IdSelection>,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        self.forge.registry().entry(entity)?;
        let ids = ids.into().resolve(self.forge.options().max_range_span)?;
        let forge = self.forge;
        self.run(options, ids, move |id| forge.fetch(entity, id)).await
    }

    /// Fetch every node indexed under `key = value`
    pub async fn fetch_many_by_index(
        &self,
        entity: &str,
        index: &str,
        key: &str,
        value: impl Into<Value>,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        self.forge.registry().entry(entity)?;
        let nodes = self
            .forge
            .store()
            .get_indexed_nodes(index, key, &value.into().encode())
            .await
            .map_err(|e| Error::store("get_indexed_nodes", e))?;
        let forge = self.forge;
        self.run(options, nodes, move |node| {
            futures::future::ready(forge.from_node(entity, node))
        })
        .await
    }

    /// Fetch the nodes matching a `key:value` query against `index`
    pub async fn fetch_by_index_query(
        &self,
        entity: &str,
        index: &str,
        query: &str,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        self.forge.registry().entry(entity)?;
        let nodes = self
            .forge
            .store()
            .query_node_index(index, query)
            .await
            .map_err(|e| Error::store("query_node_index", e))?;
        let forge = self.forge;
        self.run(options, nodes, move |node| {
            futures::future::ready(forge.from_node(entity, node))
        })
        .await
    }

    /// Run a raw query and map the first column of every row
    pub async fn fetch_by_query(
        &self,
        entity: &str,
        text: &str,
        params: &Params,
        options: BulkOptions<MappedObject<S>>,
    ) -> Result<BatchResult<MappedObject<S>>> {
        self.forge.registry().entry(entity)?;
        let rows = self
            .forge
            .store()
            .query(text, params)
            .await
            .map_err(|e| Error::store("query", e))?;
        let nodes: Vec<_> = rows.into_iter().filter_map(Row::into_first).collect();
        let forge = self.forge;
        self.run(options, nodes, move |node| {
            futures::future::ready(forge.from_node(entity, node))
        })
        .await
    }

    async fn run<I, T, F, Fut>(
        &self,
        options: BulkOptions<T>,
        inputs: Vec<I>,
        op: F,
    ) -> Result<BatchResult<T>>
    where
        T: pipeline::Properties,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mode = options.mode.unwrap_or(self.forge.options().default_mode);
        let total = inputs.len();
        tracing::debug!("Running {} bulk operations ({})", total, mode);

        let (items, error) = match mode {
            ExecutionMode::Sequential => {
                let mut items = Vec::with_capacity(total);
                for input in inputs {
                    items.push(op(input).await?);
                }
                (items, None)
            }
            ExecutionMode::Parallel => {
                let limit = self.forge.options().max_concurrency.max(1);
                let mut outcomes: Vec<(usize, Result<T>)> =
                    stream::iter(inputs.into_iter().enumerate().map(|(i, input)| {
                        let pending = op(input);
                        async move { (i, pending.await) }
                    }))
                    .buffer_unordered(limit)
                    .collect()
                    .await;
                outcomes.sort_by_key(|(i, _)| *i);

                let mut items = Vec::with_capacity(total);
                let mut failures = Vec::new();
                for (i, outcome) in outcomes {
                    match outcome {
                        Ok(item) => items.push(item),
                        Err(err) => failures.push((i, err)),
                    }
                }
                let error = if failures.is_empty() {
                    None
                } else {
                    tracing::warn!("{} of {} bulk operations failed", failures.len(), total);
                    Some(Error::Batch { total, failures })
                };
                (items, error)
            }
        };

        Ok(BatchResult {
            items: pipeline::apply(&options.set, items),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{forge, person, registry, FlakyStore};
    use forge_core::NodeId;

    fn five_people() -> Vec<PropertyMap> {
        ["Ada", "Bob", "fail", "Dan", "Eve"]
            .iter()
            .enumerate()
            .map(|(i, name)| person(name, 20 + i as i64))
            .collect()
    }

    fn names<S>(items: &[MappedObject<S>]) -> Vec<&str> {
        items.iter().filter_map(|o| o.get("name").and_then(Value::as_str)).collect()
    }

    #[tokio::test]
    async fn test_sequential_stops_at_first_failure() {
        let forge = Forge::new(FlakyStore::new().failing_name("fail"), registry());
        let err = forge
            .bulk()
            .create_many("Person", five_people(), BulkOptions::new().sequential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
        assert_eq!(forge.store().inner().node_count().unwrap(), 2);
        assert_eq!(forge.store().create_attempts(), 3);
    }

    #[tokio::test]
    async fn test_parallel_collects_successes_and_aggregate() {
        let forge = Forge::new(FlakyStore::new().failing_name("fail"), registry());
        let batch = forge
            .bulk()
            .create_many("Person", five_people(), BulkOptions::new().parallel())
            .await
            .unwrap();

        let items = batch.items.into_flat();
        assert_eq!(names(&items), vec!["Ada", "Bob", "Dan", "Eve"]);
        match batch.error {
            Some(Error::Batch { total, failures }) => {
                assert_eq!(total, 5);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, 2);
            }
            other => panic!("expected batch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_failure_in_parallel_batch() {
        let forge = forge();
        let mut objects = five_people();
        objects[1].remove("name");
        objects[2].insert("name".into(), Value::from("Cat"));

        let batch = forge
            .bulk()
            .create_many("Person", objects, BulkOptions::new())
            .await
            .unwrap();
        assert_eq!(batch.items.len(), 4);
        let err = batch.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 of 5 batch operations failed");
    }

    #[tokio::test]
    async fn test_fetch_range_with_pipeline() {
        let forge = forge();
        let people: Vec<_> = (0..10).map(|i| person(&format!("p{}", i), (i * 7 + 3) % 10 * 10)).collect();
        forge
            .bulk()
            .create_many("Person", people, BulkOptions::new())
            .await
            .unwrap();

        let options = BulkOptions::new().with_set(SetOptions::new().sort_by("age").descending().take(3));
        let batch = forge
            .bulk()
            .fetch_many_by_ids("Person", "1-10", options)
            .await
            .unwrap();
        assert!(batch.is_complete());
        let ages: Vec<_> = batch
            .items
            .into_flat()
            .iter()
            .map(|o| o.get("age").and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(ages, vec![90, 80, 70]);
    }

    #[tokio::test]
    async fn test_fetch_ids_reports_missing() {
        let forge = forge();
        forge.create("Person", person("Ada", 36)).await.unwrap();

        let batch = forge
            .bulk()
            .fetch_many_by_ids("Person", vec![1u64, 2], BulkOptions::new())
            .await
            .unwrap();
        assert_eq!(batch.items.len(), 1);
        assert!(batch.error.is_some());

        let err = forge
            .bulk()
            .fetch_many_by_ids("Person", vec![NodeId(2)], BulkOptions::new().sequential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let batch = forge
            .bulk()
            .fetch_many_by_ids("Person", "8-5", BulkOptions::new())
            .await
            .unwrap();
        assert!(batch.items.is_empty());

        assert!(matches!(
            forge.bulk().fetch_many_by_ids("Person", "5-x", BulkOptions::new()).await,
            Err(Error::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn test_range_span_limit() {
        let options = crate::ForgeOptions::new().with_max_range_span(3);
        let forge = Forge::new(forge_store::MemoryStore::new(), registry()).with_options(options);
        assert!(matches!(
            forge.bulk().fetch_many_by_ids("Person", "1-4", BulkOptions::new()).await,
            Err(Error::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn test_template_validates_once() {
        let forge = Forge::new(FlakyStore::new(), registry());
        let err = forge
            .bulk()
            .create_from_template("Person", PropertyMap::new(), 3, BulkOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.missing_fields(), Some(&["name".to_string()][..]));
        assert_eq!(forge.store().calls(), 0);

        let batch = forge
            .bulk()
            .create_from_template("Person", person("Clone", 1), 3, BulkOptions::new().with_set(SetOptions::new().paginate(2)))
            .await
            .unwrap();
        assert_eq!(batch.items.pages().map(|p| p.len()), Some(2));
        assert_eq!(forge.store().inner().node_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_fetch_many_by_index_and_query() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let bob = forge.create("Person", person("Bob", 41)).await.unwrap();
        ada.index("people", "team", "engines").await.unwrap();
        bob.index("people", "team", "engines").await.unwrap();
        ada.bind("to", &bob, "KNOWS", PropertyMap::new()).await.unwrap();

        let batch = forge
            .bulk()
            .fetch_many_by_index("Person", "people", "team", "engines", BulkOptions::new().sequential())
            .await
            .unwrap();
        assert_eq!(names(&batch.items.into_flat()), vec!["Ada", "Bob"]);

        let mut params = Params::new();
        params.insert("id".into(), ada.id().0.into());
        let batch = forge
            .bulk()
            .fetch_by_query(
                "Person",
                "START a=node({id})\nMATCH a-[r:KNOWS]->b\nRETURN b",
                &params,
                BulkOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(names(&batch.items.into_flat()), vec!["Bob"]);
    }

    #[tokio::test]
    async fn test_fetch_by_index_query() {
        let forge = forge();
        let ada = forge.create("Person", person("Ada", 36)).await.unwrap();
        let bob = forge.create("Person", person("Bob", 41)).await.unwrap();
        let cat = forge.create("Person", person("Cat", 25)).await.unwrap();
        ada.index("people", "team", "engines").await.unwrap();
        bob.index("people", "team", "looms").await.unwrap();
        cat.index("people", "age", 25i64).await.unwrap();

        let options = BulkOptions::new().with_set(SetOptions::new().sort_by("name").descending());
        let batch = forge
            .bulk()
            .fetch_by_index_query("Person", "people", "team:engines OR age:25", options)
            .await
            .unwrap();
        assert!(batch.is_complete());
        assert_eq!(names(&batch.items.into_flat()), vec!["Cat", "Ada"]);

        let batch = forge
            .bulk()
            .fetch_by_index_query("Person", "people", "team:*", BulkOptions::new().sequential())
            .await
            .unwrap();
        assert_eq!(names(&batch.items.into_flat()), vec!["Ada", "Bob"]);

        let err = forge
            .bulk()
            .fetch_by_index_query("Person", "people", "team", BulkOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
        assert!(matches!(
            forge.bulk().fetch_by_index_query("Robot", "people", "team:*", BulkOptions::new()).await,
            Err(Error::UnknownEntity(_))
        ));
    }
}
