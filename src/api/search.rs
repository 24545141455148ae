//! Searchable single-select over a remote collection
//!
//! The collection refreshes from an [`ObjectFetcher`], keeps the selection
//! across refreshes while the selected object is still present, and reports
//! fetch errors as state instead of bubbling them to the caller.

use crate::api::pagination::ListQuery;
use crate::api::{ApiClient, ApiError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Source of objects for a [`SearchSelect`]
#[async_trait]
pub trait ObjectFetcher<T>: Send + Sync {
    /// Fetch objects, optionally narrowed by a search term
    async fn fetch(&self, query: Option<&str>) -> Result<Vec<T>, ApiError>;
}

/// Fetches objects from a list endpoint, passing the search term through
pub struct EndpointFetcher<T> {
    client: ApiClient,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EndpointFetcher<T> {
    #[must_use]
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> ObjectFetcher<T> for EndpointFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch(&self, query: Option<&str>) -> Result<Vec<T>, ApiError> {
        let mut list_query = ListQuery::new();

        if let Some(query) = query {
            list_query = list_query.search(query);
        }

        let page = self.client.list::<T>(&self.path, &list_query).await?;

        Ok(page.results)
    }
}

/// Single selection out of a refreshable object list
pub struct SearchSelect<T> {
    fetcher: Box<dyn ObjectFetcher<T>>,
    key_of: Box<dyn Fn(&T) -> String + Send + Sync>,
    query: Option<String>,
    objects: Option<Vec<T>>,
    error: Option<ApiError>,
    selected: Option<String>,
    auto_select: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
    blankable: bool,
    loading: bool,
}

impl<T> SearchSelect<T> {
    /// `key_of` derives the stable key a selection is tracked by
    pub fn new(
        fetcher: impl ObjectFetcher<T> + 'static,
        key_of: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            key_of: Box::new(key_of),
            query: None,
            objects: None,
            error: None,
            selected: None,
            auto_select: None,
            blankable: false,
            loading: false,
        }
    }

    /// Allow an empty selection, serialized as an empty string
    #[must_use]
    pub fn blankable(mut self) -> Self {
        self.blankable = true;
        self
    }

    /// Select the first matching object after a refresh when nothing is selected
    #[must_use]
    pub fn auto_select(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.auto_select = Some(Box::new(predicate));
        self
    }

    /// Refetch the object list
    ///
    /// On success the previous selection is kept only if the selected object
    /// is still present. On failure the objects are cleared and the error is
    /// retained for display.
    pub async fn refresh(&mut self) {
        if self.loading {
            debug!("refresh already in progress");
            return;
        }

        self.loading = true;

        let fetched = self.fetcher.fetch(self.query.as_deref()).await;

        match fetched {
            Ok(objects) => {
                self.error = None;

                let still_present = match &self.selected {
                    Some(selected) => objects.iter().any(|object| (self.key_of)(object) == *selected),
                    None => false,
                };

                if !still_present {
                    self.selected = None;
                }

                if self.selected.is_none() {
                    if let Some(predicate) = &self.auto_select {
                        self.selected = objects
                            .iter()
                            .find(|object| predicate(object))
                            .map(|object| (self.key_of)(object));
                    }
                }

                self.objects = Some(objects);
            }
            Err(error) => {
                self.objects = None;
                self.error = Some(error);
            }
        }

        self.loading = false;
    }

    /// Change the search term and refresh
    pub async fn set_query(&mut self, query: impl Into<String>) {
        self.query = Some(query.into());
        self.refresh().await;
    }

    /// Select the object with the given key, if it is in the fetched list
    pub fn select(&mut self, key: &str) -> bool {
        let known = self
            .objects
            .as_ref()
            .is_some_and(|objects| objects.iter().any(|object| (self.key_of)(object) == key));

        if known {
            self.selected = Some(key.to_string());
        }

        known
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        let key = self.selected.as_ref()?;

        self.objects
            .as_ref()?
            .iter()
            .find(|object| (self.key_of)(object) == *key)
    }

    #[must_use]
    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn objects(&self) -> Option<&[T]> {
        self.objects.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Selection serialized for a form submission
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotLoaded`] before the first successful refresh and
    /// [`ApiError::NothingSelected`] when empty selections are not allowed
    pub fn value(&self) -> Result<String, ApiError> {
        if self.objects.is_none() {
            return Err(ApiError::NotLoaded);
        }

        match &self.selected {
            Some(key) => Ok(key.clone()),
            None if self.blankable => Ok(String::new()),
            None => Err(ApiError::NothingSelected),
        }
    }
}
