//! Choices capability
//!
//! Option lookup for selection editors. `find(None)` returns the default
//! choices; lookups are read-only and return the same result for an
//! unchanged context.

use std::sync::Arc;

use async_trait::async_trait;
use waypoint_process::{EditorError, ProcessContext, ProcessData};

/// Errors from a choices source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoicesError {
    /// The backing source could not be reached
    #[error("choices source unavailable: {0}")]
    Unavailable(String),

    /// The filter could not be applied
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<ChoicesError> for EditorError {
    fn from(err: ChoicesError) -> Self {
        EditorError::Choices(err.to_string())
    }
}

/// Source of options for a selection editor
#[async_trait]
pub trait Choices<D, O, K>: Send + Sync
where
    D: ProcessData,
    O: Send,
    K: Send + Sync,
{
    /// Resolve one option by key
    async fn by_key(&self, key: &K, ctx: &ProcessContext<D>) -> Result<Option<O>, ChoicesError>;

    /// Options matching `filter`, or the default options for `None`
    async fn find(
        &self,
        filter: Option<&str>,
        ctx: &ProcessContext<D>,
    ) -> Result<Vec<O>, ChoicesError>;
}

/// Fixed option list
///
/// Filters match labels case-insensitively; a blank filter returns every
/// option.
pub struct StaticChoices<O, K> {
    options: Vec<O>,
    get_key: Arc<dyn Fn(&O) -> K + Send + Sync>,
    get_label: Arc<dyn Fn(&O) -> String + Send + Sync>,
}

impl<O, K> StaticChoices<O, K> {
    pub fn new(
        options: Vec<O>,
        get_key: impl Fn(&O) -> K + Send + Sync + 'static,
        get_label: impl Fn(&O) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            options,
            get_key: Arc::new(get_key),
            get_label: Arc::new(get_label),
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[async_trait]
impl<D, O, K> Choices<D, O, K> for StaticChoices<O, K>
where
    D: ProcessData,
    O: Clone + Send + Sync,
    K: PartialEq + Send + Sync,
{
    async fn by_key(&self, key: &K, _ctx: &ProcessContext<D>) -> Result<Option<O>, ChoicesError> {
        Ok(self
            .options
            .iter()
            .find(|option| (self.get_key)(option) == *key)
            .cloned())
    }

    async fn find(
        &self,
        filter: Option<&str>,
        _ctx: &ProcessContext<D>,
    ) -> Result<Vec<O>, ChoicesError> {
        let needle = match filter.map(str::trim) {
            None | Some("") => return Ok(self.options.clone()),
            Some(needle) => needle.to_lowercase(),
        };

        Ok(self
            .options
            .iter()
            .filter(|option| (self.get_label)(option).to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Data {
        country: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Country {
        code: &'static str,
        name: &'static str,
    }

    fn countries() -> StaticChoices<Country, String> {
        StaticChoices::new(
            vec![
                Country { code: "DE", name: "Germany" },
                Country { code: "DK", name: "Denmark" },
                Country { code: "FR", name: "France" },
            ],
            |c: &Country| c.code.to_string(),
            |c: &Country| c.name.to_string(),
        )
    }

    fn ctx() -> ProcessContext<Data> {
        ProcessContext::new("p-1", Data { country: None })
    }

    #[tokio::test]
    async fn test_find_without_filter_returns_all() {
        let choices = countries();
        let all = Choices::<Data, _, _>::find(&choices, None, &ctx()).await.unwrap();
        assert_eq!(all.len(), 3);

        let blank = Choices::<Data, _, _>::find(&choices, Some("  "), &ctx()).await.unwrap();
        assert_eq!(blank.len(), 3);
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let choices = countries();
        let found = Choices::<Data, _, _>::find(&choices, Some("DEN"), &ctx()).await.unwrap();
        assert_eq!(found, vec![Country { code: "DK", name: "Denmark" }]);
    }

    #[tokio::test]
    async fn test_find_is_idempotent() {
        let choices = countries();
        let ctx = ctx();
        let first = Choices::<Data, _, _>::find(&choices, Some("an"), &ctx).await.unwrap();
        let second = Choices::<Data, _, _>::find(&choices, Some("an"), &ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_by_key() {
        let choices = countries();
        let found = Choices::<Data, _, _>::by_key(&choices, &"FR".to_string(), &ctx())
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.name), Some("France"));

        let missing = Choices::<Data, _, _>::by_key(&choices, &"XX".to_string(), &ctx())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_choices_error_into_editor_error() {
        let err: EditorError = ChoicesError::Unavailable("timeout".to_string()).into();
        assert_eq!(
            err,
            EditorError::Choices("choices source unavailable: timeout".to_string())
        );
    }
}
