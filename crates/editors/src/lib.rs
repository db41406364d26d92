//! # Process Editors
//!
//! Editors for prompt steps. Each editor pairs typed parameters with a
//! frontend trait; the frontend does the rendering and reports what the user
//! did.
//!
//! - [`DropdownSelectEditor`]: pick one option from a [`Choices`] source
//! - [`HtmlViewer`]: show a page rendered from the context

pub mod choices;
pub mod dropdown;
pub mod html;
pub mod params;

pub use choices::{Choices, ChoicesError, StaticChoices};
pub use dropdown::{
    ChoiceEntry, DropdownSelectEditor, DropdownSelectorParams, Selection, SelectionFrontend,
    SelectionView, DROPDOWN_SELECT_COMPONENT,
};
pub use html::{
    HtmlPage, HtmlRenderer, HtmlViewer, HtmlViewerParams, ViewerAction, ViewerFrontend,
    HTML_VIEWER_COMPONENT,
};
pub use params::{EditorParams, EditorView};
