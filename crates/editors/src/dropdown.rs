//! Dropdown selector
//!
//! Lists choices to a [`SelectionFrontend`] and resolves the picked key back
//! to an option. The frontend can narrow the list with a filter, pick an
//! entry or dismiss the editor.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use waypoint_process::{Editor, EditorError, EditorOutcome, ProcessContext, ProcessData};

use crate::choices::Choices;
use crate::params::EditorParams;

/// Component identifier of [`DropdownSelectEditor`]
pub const DROPDOWN_SELECT_COMPONENT: &str = "DropdownSelectEditor";

/// Parameters for [`DropdownSelectEditor`]
pub struct DropdownSelectorParams<D, O, K> {
    pub base: EditorParams,

    /// Property of the option submitted instead of the whole option
    pub key_property: Option<String>,

    pub get_label: Arc<dyn Fn(&O) -> String + Send + Sync>,
    pub get_key: Arc<dyn Fn(&O) -> K + Send + Sync>,
    pub choices: Arc<dyn Choices<D, O, K>>,
}

impl<D, O, K> DropdownSelectorParams<D, O, K>
where
    D: ProcessData,
    O: Send,
    K: Send + Sync,
{
    pub fn new(
        label: impl Into<String>,
        choices: Arc<dyn Choices<D, O, K>>,
        get_key: impl Fn(&O) -> K + Send + Sync + 'static,
        get_label: impl Fn(&O) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            base: EditorParams::new(label),
            key_property: None,
            get_label: Arc::new(get_label),
            get_key: Arc::new(get_key),
            choices,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.base = self.base.with_placeholder(placeholder);
        self
    }

    pub fn with_key_property(mut self, property: impl Into<String>) -> Self {
        self.key_property = Some(property.into());
        self
    }
}

/// One listed choice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceEntry<K> {
    pub key: K,
    pub label: String,
}

/// What the frontend is asked to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView<K> {
    pub label: String,
    pub placeholder: Option<String>,

    /// Filter the entries were found with
    pub filter: Option<String>,
    pub entries: Vec<ChoiceEntry<K>>,

    /// Set when the previous pick could not be resolved
    pub notice: Option<String>,
}

/// Frontend answer
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<K> {
    Pick(K),
    Refine(Option<String>),
    Dismiss,
}

/// Rendering boundary of the dropdown selector
#[async_trait]
pub trait SelectionFrontend<K>: Send + Sync {
    async fn present(&self, view: &SelectionView<K>) -> Result<Selection<K>, EditorError>;
}

/// Editor that lets the user pick one option from a choices source
///
/// Submits the picked option, or only its `key_property` when the
/// parameters name one.
pub struct DropdownSelectEditor<O, K> {
    frontend: Arc<dyn SelectionFrontend<K>>,
    _option: PhantomData<fn() -> O>,
}

impl<O, K> DropdownSelectEditor<O, K> {
    pub fn new(frontend: Arc<dyn SelectionFrontend<K>>) -> Self {
        Self {
            frontend,
            _option: PhantomData,
        }
    }
}

#[async_trait]
impl<D, O, K> Editor<D> for DropdownSelectEditor<O, K>
where
    D: ProcessData,
    O: Serialize + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    type Params = DropdownSelectorParams<D, O, K>;
    type Output = Value;

    fn component(&self) -> &str {
        DROPDOWN_SELECT_COMPONENT
    }

    async fn edit(
        &self,
        params: &Self::Params,
        ctx: &ProcessContext<D>,
    ) -> Result<EditorOutcome<Value>, EditorError> {
        let mut filter: Option<String> = None;
        let mut notice: Option<String> = None;

        loop {
            let options = params.choices.find(filter.as_deref(), ctx).await?;
            let view = SelectionView {
                label: params.base.label.clone(),
                placeholder: params.base.effective_placeholder().map(str::to_string),
                filter: filter.clone(),
                entries: options
                    .iter()
                    .map(|option| ChoiceEntry {
                        key: (params.get_key)(option),
                        label: (params.get_label)(option),
                    })
                    .collect(),
                notice: notice.take(),
            };

            match self.frontend.present(&view).await? {
                Selection::Pick(key) => match params.choices.by_key(&key, ctx).await? {
                    Some(option) => {
                        return submit(&option, params.key_property.as_deref())
                            .map(EditorOutcome::Submitted)
                    }
                    None => {
                        debug!(label = %params.base.label, "picked key has no matching choice");
                        notice = Some("The selected entry is no longer available".to_string());
                    }
                },
                Selection::Refine(next) => filter = next,
                Selection::Dismiss => return Ok(EditorOutcome::Abandoned),
            }
        }
    }
}

fn submit<O: Serialize>(option: &O, key_property: Option<&str>) -> Result<Value, EditorError> {
    let value = serde_json::to_value(option).map_err(|e| EditorError::Encoding(e.to_string()))?;
    match key_property {
        None => Ok(value),
        Some(property) => value.get(property).cloned().ok_or_else(|| {
            EditorError::Failed(format!("selected option has no '{property}' property"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::StaticChoices;
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Data {
        country: Option<Value>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Country {
        code: &'static str,
        name: &'static str,
    }

    /// Answers from a script and records every view it was shown
    #[derive(Default)]
    struct ScriptedFrontend {
        answers: Mutex<VecDeque<Selection<String>>>,
        shown: Mutex<Vec<SelectionView<String>>>,
    }

    impl ScriptedFrontend {
        fn new(answers: Vec<Selection<String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                shown: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl SelectionFrontend<String> for ScriptedFrontend {
        async fn present(
            &self,
            view: &SelectionView<String>,
        ) -> Result<Selection<String>, EditorError> {
            self.shown.lock().push(view.clone());
            self.answers
                .lock()
                .pop_front()
                .ok_or(EditorError::FrontendClosed)
        }
    }

    fn params() -> DropdownSelectorParams<Data, Country, String> {
        let choices = StaticChoices::new(
            vec![
                Country { code: "DE", name: "Germany" },
                Country { code: "FR", name: "France" },
            ],
            |c: &Country| c.code.to_string(),
            |c: &Country| c.name.to_string(),
        );
        DropdownSelectorParams::<Data, Country, String>::new(
            "Country",
            Arc::new(choices),
            |c: &Country| c.code.to_string(),
            |c: &Country| c.name.to_string(),
        )
        .with_placeholder("Search")
    }

    fn ctx() -> ProcessContext<Data> {
        ProcessContext::new("p-1", Data { country: None })
    }

    #[tokio::test]
    async fn test_pick_submits_option() {
        let frontend = ScriptedFrontend::new(vec![Selection::Pick("FR".to_string())]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend.clone());

        let outcome = editor.edit(&params(), &ctx()).await.unwrap();

        assert_eq!(
            outcome,
            EditorOutcome::Submitted(json!({"code": "FR", "name": "France"}))
        );
        let shown = frontend.shown.lock();
        assert_eq!(shown[0].entries.len(), 2);
        assert_eq!(shown[0].placeholder.as_deref(), Some("Search"));
    }

    #[tokio::test]
    async fn test_key_property_submits_only_key() {
        let frontend = ScriptedFrontend::new(vec![Selection::Pick("DE".to_string())]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend);

        let outcome = editor
            .edit(&params().with_key_property("code"), &ctx())
            .await
            .unwrap();

        assert_eq!(outcome, EditorOutcome::Submitted(json!("DE")));
    }

    #[tokio::test]
    async fn test_refine_narrows_entries() {
        let frontend = ScriptedFrontend::new(vec![
            Selection::Refine(Some("fra".to_string())),
            Selection::Pick("FR".to_string()),
        ]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend.clone());

        editor.edit(&params(), &ctx()).await.unwrap();

        let shown = frontend.shown.lock();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].filter.as_deref(), Some("fra"));
        assert_eq!(
            shown[1].entries,
            vec![ChoiceEntry {
                key: "FR".to_string(),
                label: "France".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_key_represents_list() {
        let frontend = ScriptedFrontend::new(vec![
            Selection::Pick("XX".to_string()),
            Selection::Pick("DE".to_string()),
        ]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend.clone());

        let outcome = editor.edit(&params(), &ctx()).await.unwrap();

        assert!(!outcome.is_abandoned());
        let shown = frontend.shown.lock();
        assert_eq!(shown.len(), 2);
        assert!(shown[0].notice.is_none());
        assert!(shown[1].notice.is_some());
    }

    #[tokio::test]
    async fn test_dismiss_is_abandonment() {
        let frontend = ScriptedFrontend::new(vec![Selection::Dismiss]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend);

        let outcome = editor.edit(&params(), &ctx()).await.unwrap();
        assert!(outcome.is_abandoned());
    }

    #[tokio::test]
    async fn test_closed_frontend_is_an_error() {
        let frontend = ScriptedFrontend::new(vec![]);
        let editor: DropdownSelectEditor<Country, String> = DropdownSelectEditor::new(frontend);

        let err = editor.edit(&params(), &ctx()).await.unwrap_err();
        assert_eq!(err, EditorError::FrontendClosed);
        assert_eq!(
            Editor::<Data>::component(&editor),
            DROPDOWN_SELECT_COMPONENT
        );
    }
}
