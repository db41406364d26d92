//! The fundSafeFromEoa process
//!
//! ```text
//! info (HtmlViewer) ──next──▶ execute (TransferFunds) ──on_done──▶ success
//!                                     │
//!                                     └──failure──▶ error
//! ```

use std::sync::Arc;

use tracing::info;
use waypoint_editors::{EditorView, HtmlViewer, HtmlViewerParams};
use waypoint_process::{DefinitionError, ProcessContext, ProcessDefinition, Step};

use crate::data::FundSafeFromEoaData;
use crate::transfer::TransferFunds;

/// Definition name
pub const FUND_SAFE_FROM_EOA: &str = "fundSafeFromEoa";

/// Copy shown on the info step
pub fn info_view() -> EditorView {
    EditorView::new("Fund safe").with_description("We now fund your new safe")
}

/// Build the fundSafeFromEoa definition
///
/// The info step shows `viewer` and moves on without writing a field; the
/// execute step runs `transfer` and stores the transaction hash in
/// `transactionHash`.
pub fn fund_safe_from_eoa(
    viewer: Arc<HtmlViewer>,
    transfer: TransferFunds,
) -> Result<ProcessDefinition<FundSafeFromEoaData>, DefinitionError> {
    let info_params = HtmlViewerParams::new(info_view(), |_: &ProcessContext<FundSafeFromEoaData>| {
        String::new()
    });

    ProcessDefinition::builder(FUND_SAFE_FROM_EOA)
        .initial("info")
        .step(Step::<FundSafeFromEoaData>::prompt("info", viewer, info_params).next("execute"))
        .step(
            Step::<FundSafeFromEoaData>::invoke("execute")
                .src(transfer)
                .output("transactionHash")
                .on_done("success"),
        )
        .step(
            Step::<FundSafeFromEoaData>::success("success").entry(|ctx| {
                info!(
                    process_id = %ctx.process_id,
                    safe = %ctx.data.safe_address,
                    transaction_hash = ?ctx.data.transaction_hash,
                    "safe funded"
                );
            }),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryGateway, StaticWallet};
    use async_trait::async_trait;
    use waypoint_editors::{HtmlPage, ViewerAction, ViewerFrontend};
    use waypoint_process::{EditorError, StepKind, ERROR_STEP_ID};

    struct Continue;

    #[async_trait]
    impl ViewerFrontend for Continue {
        async fn show(&self, _page: &HtmlPage) -> Result<ViewerAction, EditorError> {
            Ok(ViewerAction::Continue)
        }
    }

    #[test]
    fn test_definition_shape() {
        let definition = fund_safe_from_eoa(
            Arc::new(HtmlViewer::new(Arc::new(Continue))),
            TransferFunds::new(
                Arc::new(StaticWallet::unlocked()),
                Arc::new(InMemoryGateway::new(1)),
            ),
        )
        .expect("definition is valid");

        assert_eq!(definition.name(), FUND_SAFE_FROM_EOA);
        assert_eq!(definition.initial_step_id(), "info");
        assert_eq!(
            definition.step_ids().collect::<Vec<_>>(),
            vec!["info", "execute", "success", ERROR_STEP_ID]
        );

        let Some(Step::Prompt(info)) = definition.step("info") else {
            panic!("info is a prompt");
        };
        assert_eq!(info.target_field(), None);
        assert_eq!(info.component(), "HtmlViewer");

        let execute = definition.step("execute").unwrap();
        assert_eq!(execute.kind(), StepKind::Invoke);
        assert_eq!(execute.transitions(), vec![("on_done", "success")]);
    }

    #[test]
    fn test_info_view_copy() {
        let view = info_view();
        assert_eq!(view.title.as_deref(), Some("Fund safe"));
        assert_eq!(view.description.as_deref(), Some("We now fund your new safe"));
    }
}
