//! HTML viewer
//!
//! Shows a page rendered from the live context and waits for the user to
//! continue. Submits `()`, so prompts using it usually declare no field.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use waypoint_process::{Editor, EditorError, EditorOutcome, ProcessContext, ProcessData};

use crate::params::EditorView;

/// Component identifier of [`HtmlViewer`]
pub const HTML_VIEWER_COMPONENT: &str = "HtmlViewer";

/// Renders page markup from the context
pub type HtmlRenderer<D> = Arc<dyn Fn(&ProcessContext<D>) -> String + Send + Sync>;

/// Parameters for [`HtmlViewer`]
pub struct HtmlViewerParams<D> {
    pub view: EditorView,
    pub html: HtmlRenderer<D>,

    /// Hide the back/forward navigation while the page is shown
    pub hide_nav: bool,
}

impl<D> HtmlViewerParams<D> {
    pub fn new(
        view: EditorView,
        html: impl Fn(&ProcessContext<D>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            view,
            html: Arc::new(html),
            hide_nav: false,
        }
    }

    pub fn with_hide_nav(mut self, hide_nav: bool) -> Self {
        self.hide_nav = hide_nav;
        self
    }
}

/// Page handed to the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlPage {
    pub view: EditorView,
    pub html: String,
    pub hide_nav: bool,
}

/// Frontend answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerAction {
    Continue,
    Dismiss,
}

/// Rendering boundary of the HTML viewer
#[async_trait]
pub trait ViewerFrontend: Send + Sync {
    async fn show(&self, page: &HtmlPage) -> Result<ViewerAction, EditorError>;
}

/// Editor that displays rendered HTML
pub struct HtmlViewer {
    frontend: Arc<dyn ViewerFrontend>,
}

impl HtmlViewer {
    pub fn new(frontend: Arc<dyn ViewerFrontend>) -> Self {
        Self { frontend }
    }
}

#[async_trait]
impl<D: ProcessData> Editor<D> for HtmlViewer {
    type Params = HtmlViewerParams<D>;
    type Output = ();

    fn component(&self) -> &str {
        HTML_VIEWER_COMPONENT
    }

    async fn edit(
        &self,
        params: &HtmlViewerParams<D>,
        ctx: &ProcessContext<D>,
    ) -> Result<EditorOutcome<()>, EditorError> {
        let page = HtmlPage {
            view: params.view.clone(),
            html: (params.html)(ctx),
            hide_nav: params.hide_nav,
        };
        debug!(title = ?page.view.title, step_id = %ctx.current_step_id, "showing html page");

        Ok(match self.frontend.show(&page).await? {
            ViewerAction::Continue => EditorOutcome::Submitted(()),
            ViewerAction::Dismiss => EditorOutcome::Abandoned,
        })
    }
}
