//! Set post-processing: sort, skip/take, filter, limit, paginate
//!
//! Steps always run in this order. When `limit` is given together with
//! `skip`/`take`, the limit wins and skip/take are ignored.

use crate::value::{PropertyMap, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Access to named properties of a set element
pub trait Properties {
    fn property(&self, key: &str) -> Option<&Value>;
}

impl Properties for PropertyMap {
    fn property(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Element predicate for `where` filtering
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Options controlling [`apply`]
pub struct SetOptions<T> {
    pub sort: Option<String>,
    pub dir: SortDirection,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub limit: Option<usize>,
    pub filter: Option<Predicate<T>>,
    pub paginate: Option<usize>,
}

impl<T> Default for SetOptions<T> {
    fn default() -> Self {
        Self {
            sort: None,
            dir: SortDirection::Asc,
            skip: None,
            take: None,
            limit: None,
            filter: None,
            paginate: None,
        }
    }
}

impl<T> Clone for SetOptions<T> {
    fn clone(&self) -> Self {
        Self {
            sort: self.sort.clone(),
            dir: self.dir,
            skip: self.skip,
            take: self.take,
            limit: self.limit,
            filter: self.filter.clone(),
            paginate: self.paginate,
        }
    }
}

impl<T> std::fmt::Debug for SetOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetOptions")
            .field("sort", &self.sort)
            .field("dir", &self.dir)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("limit", &self.limit)
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .field("paginate", &self.paginate)
            .finish()
    }
}

impl<T> SetOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, property: impl Into<String>) -> Self {
        self.sort = Some(property.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.dir = SortDirection::Desc;
        self
    }

    pub fn with_dir(mut self, dir: SortDirection) -> Self {
        self.dir = dir;
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }

    pub fn paginate(mut self, page_size: usize) -> Self {
        self.paginate = Some(page_size);
        self
    }
}

/// Processed set: flat, or grouped into pages
#[derive(Debug, Clone, PartialEq)]
pub enum SetResult<T> {
    Flat(Vec<T>),
    Pages(Vec<Vec<T>>),
}

impl<T> SetResult<T> {
    /// Total number of elements across all pages
    pub fn len(&self) -> usize {
        match self {
            SetResult::Flat(items) => items.len(),
            SetResult::Pages(pages) => pages.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, SetResult::Pages(_))
    }

    /// Elements in order, dropping page boundaries
    pub fn into_flat(self) -> Vec<T> {
        match self {
            SetResult::Flat(items) => items,
            SetResult::Pages(pages) => pages.into_iter().flatten().collect(),
        }
    }

    pub fn pages(&self) -> Option<&[Vec<T>]> {
        match self {
            SetResult::Pages(pages) => Some(pages),
            SetResult::Flat(_) => None,
        }
    }
}

impl<T> Default for SetResult<T> {
    fn default() -> Self {
        SetResult::Flat(Vec::new())
    }
}

/// Run the set pipeline over `items`
pub fn apply<T: Properties>(options: &SetOptions<T>, mut items: Vec<T>) -> SetResult<T> {
    if let Some(key) = &options.sort {
        items.sort_by(|a, b| match (a.property(key), b.property(key)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        });
        if options.dir == SortDirection::Desc {
            items.reverse();
        }
    }

    if options.limit.is_none() {
        let skip = options.skip.unwrap_or(0);
        if let Some(take) = options.take {
            items = items.into_iter().skip(skip).take(take).collect();
        } else if skip > 0 {
            items = items.into_iter().skip(skip).collect();
        }
    }

    if let Some(predicate) = &options.filter {
        items.retain(|item| predicate(item));
    }

    if let Some(limit) = options.limit {
        items.truncate(limit);
    }

    match options.paginate {
        Some(size) if size > 0 && items.len() > size => {
            let mut pages = Vec::with_capacity(items.len().div_ceil(size));
            let mut rest = items.into_iter().peekable();
            while rest.peek().is_some() {
                pages.push(rest.by_ref().take(size).collect());
            }
            SetResult::Pages(pages)
        }
        _ => SetResult::Flat(items),
    }
}
