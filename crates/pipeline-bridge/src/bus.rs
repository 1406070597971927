//! # Action Buses
//!
//! Single-slot, last-write-wins channels shared between the canvas and the rest
//! of the editor (tree browser, config panel, run button, preview pane).
//! Publishing overwrites whatever is in the slot; a subscriber only ever sees
//! the most recent value. Every publish is stamped with a sequence number so a
//! consumer can tell a new action from one it has already handled.

use std::sync::Arc;

use pipeline_canvas::model::{NodeType, OperationData, SourceModelData};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A command record exchanged over the canvas action channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum CanvasAction {
    /// A model was picked in the tree browser.
    #[serde(rename = "add-srcmodel-node")]
    AddSourceModelNode(SourceModelData),
    AddOperationNode(OperationData),
    DeleteNode(DeleteNodeRequest),
    RefreshCanvas,
    /// Emitted by the canvas; the payload is handed to the run button as is.
    RunWorkflow(serde_json::Value),
    /// Emitted by the canvas when the node being configured goes away.
    /// The unit payload keeps `"data": null` on the wire.
    #[serde(rename = "close-reset-opconfig-panel")]
    CloseResetOpConfigPanel(()),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNodeRequest {
    pub node_id: String,
    pub node_type: NodeType,
    /// Refetch the graph afterwards. Defaults to `true`.
    #[serde(default)]
    pub should_refresh: Option<bool>,
    /// Defaults to `false`.
    #[serde(default)]
    pub is_dummy: Option<bool>,
}

/// A command record exchanged over the preview channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum PreviewAction {
    /// Encodes as `{"type": "clear-preview", "data": null}`.
    ClearPreview(()),
}

/// A value together with the sequence number it was published under.
#[derive(Clone, Debug, PartialEq)]
pub struct Published<T> {
    pub seq: u64,
    pub action: T,
}

/// The shared slot. Clones publish into and observe the same slot.
#[derive(Debug)]
pub struct Bus<T> {
    tx: Arc<watch::Sender<Option<Published<T>>>>,
}

impl<T> Clone for Bus<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Bus<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Overwrites the slot with `action` and returns the sequence number it got.
    ///
    /// Works with or without subscribers.
    pub fn publish(&self, action: T) -> u64 {
        let mut seq = 0;
        self.tx.send_modify(|slot| {
            seq = slot.as_ref().map_or(0, |p| p.seq) + 1;
            *slot = Some(Published { seq, action });
        });
        seq
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Published<T>>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Bus<T> {
    /// The value currently in the slot, if anything was ever published.
    pub fn latest(&self) -> Option<Published<T>> {
        self.tx.borrow().clone()
    }
}

pub type ActionBus = Bus<CanvasAction>;
pub type PreviewBus = Bus<PreviewAction>;
