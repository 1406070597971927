//! # Canvas Controller
//!
//! Owns the [`Canvas`] on behalf of the editor and keeps it in step with the
//! backend. It is the only place where backend calls and store mutations meet:
//!
//! - **Sync**: [`CanvasController::fetch_graph`] pulls the canonical graph, lays
//!   it out and swaps the store contents. Every fetch takes a token; only the
//!   latest issued token may write.
//! - **Delete**: [`CanvasController::delete_node`] calls the backend, removes the
//!   node locally, closes the config panel when needed and requests a redraw.
//! - **Actions**: [`CanvasController::run`] consumes the action bus and refetches
//!   whenever the redraw flag toggles.
//!
//! The store lock is never held across a backend call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use pipeline_canvas::changes::{EdgeChange, NodeChange};
use pipeline_canvas::interaction::Connection;
use pipeline_canvas::model::NodeType;
use pipeline_canvas::store::GraphState;
use pipeline_canvas::view::View;
use pipeline_canvas::{Canvas, LogicEvent};
use pipeline_client::TransformApi;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bus::{ActionBus, CanvasAction, PreviewAction, PreviewBus, Published};
use crate::config::{DeleteMode, SyncConfig};

/// Result of a single fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The fetched graph is now in the store.
    Applied,
    /// A newer fetch was issued while this one was in flight; its response was dropped.
    Stale,
    /// The request or the layout failed; the store is unchanged.
    Failed,
}

struct EditorState {
    canvas: Canvas,
    /// The node whose configuration panel is open, if any.
    active_node: Option<String>,
}

struct Inner {
    api: Arc<dyn TransformApi>,
    config: SyncConfig,
    state: Mutex<EditorState>,
    actions: ActionBus,
    preview: PreviewBus,
    fetch_token: AtomicU64,
    last_action: AtomicU64,
    redraw: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
}

/// Cheap-to-clone handle; all clones drive the same canvas.
#[derive(Clone)]
pub struct CanvasController {
    inner: Arc<Inner>,
}

impl CanvasController {
    pub fn new(
        api: Arc<dyn TransformApi>,
        canvas: Canvas,
        actions: ActionBus,
        preview: PreviewBus,
        config: SyncConfig,
    ) -> Self {
        let (redraw, _) = watch::channel(false);
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                state: Mutex::new(EditorState {
                    canvas,
                    active_node: None,
                }),
                actions,
                preview,
                fetch_token: AtomicU64::new(0),
                last_action: AtomicU64::new(0),
                redraw,
                shutdown,
            }),
        }
    }

    pub fn actions(&self) -> &ActionBus {
        &self.inner.actions
    }

    pub fn preview(&self) -> &PreviewBus {
        &self.inner.preview
    }

    /// The current graph. The snapshot never changes after it is returned.
    pub async fn snapshot(&self) -> Arc<GraphState> {
        self.inner.state.lock().await.canvas.snapshot()
    }

    pub async fn view(&self) -> View {
        self.inner.state.lock().await.canvas.view.clone()
    }

    pub async fn update_viewport_size(&self, size: Vec2) {
        self.inner
            .state
            .lock()
            .await
            .canvas
            .update_viewport_size(size);
    }

    /// The node whose configuration panel is open.
    pub async fn active_node(&self) -> Option<String> {
        self.inner.state.lock().await.active_node.clone()
    }

    /// Watches the redraw flag. Every toggle means "refetch and re-layout".
    pub fn subscribe_redraw(&self) -> watch::Receiver<bool> {
        self.inner.redraw.subscribe()
    }

    pub fn request_redraw(&self) {
        self.inner.redraw.send_modify(|flag| *flag = !*flag);
    }

    /// Pulls the canonical graph and replaces the store contents with its layout.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_graph(&self) -> SyncOutcome {
        let token = self.inner.fetch_token.fetch_add(1, Ordering::SeqCst) + 1;

        let payload = match self.inner.api.fetch_graph().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(token, error = ?err, "Failed to fetch graph");
                return SyncOutcome::Failed;
            }
        };
        let (nodes, edges) = payload.into_canvas();

        let mut state = self.inner.state.lock().await;
        let latest = self.inner.fetch_token.load(Ordering::SeqCst);
        if latest != token {
            tracing::warn!(token, latest, "Discarding stale graph response");
            return SyncOutcome::Stale;
        }

        let (node_count, edge_count) = (nodes.len(), edges.len());
        match state.canvas.load(nodes, edges) {
            Ok(()) => {
                tracing::info!(
                    token,
                    nodes = node_count,
                    edges = edge_count,
                    "Graph synced"
                );
                SyncOutcome::Applied
            }
            Err(err) => {
                tracing::error!(token, error = %err, "Failed to lay out graph");
                SyncOutcome::Failed
            }
        }
    }

    /// Deletes a node on the backend (unless it is a placeholder) and locally.
    ///
    /// Returns whether the node was removed from the local graph.
    #[tracing::instrument(skip(self))]
    pub async fn delete_node(
        &self,
        node_id: &str,
        node_type: NodeType,
        is_placeholder: bool,
        refresh: bool,
    ) -> bool {
        if !is_placeholder
            && let Err(err) = self.inner.api.delete_node(node_id, node_type).await
        {
            tracing::error!(node_id, %node_type, error = ?err, "Backend delete failed");
            if self.inner.config.delete_mode == DeleteMode::Strict {
                return false;
            }
        }

        let close_panel = {
            let mut state = self.inner.state.lock().await;
            if state.canvas.remove_node(node_id).is_none() {
                tracing::debug!(node_id, "Deleted node was not on the canvas");
            }
            let was_active = state.active_node.as_deref() == Some(node_id);
            if was_active {
                state.active_node = None;
            }
            was_active || is_placeholder
        };

        if close_panel {
            self.inner
                .actions
                .publish(CanvasAction::CloseResetOpConfigPanel(()));
        }
        if refresh {
            self.request_redraw();
        }
        true
    }

    /// Asks the run button to start the pipeline.
    pub fn run_workflow(&self, data: serde_json::Value) -> u64 {
        self.inner.actions.publish(CanvasAction::RunWorkflow(data))
    }

    /// Applies one action from the bus. Sequence numbers already handled are skipped.
    pub async fn handle_action(&self, published: Published<CanvasAction>) {
        let previous = self
            .inner
            .last_action
            .fetch_max(published.seq, Ordering::SeqCst);
        if published.seq <= previous {
            tracing::trace!(seq = published.seq, "Action already handled");
            return;
        }

        match published.action {
            CanvasAction::AddSourceModelNode(data) => {
                let node_id = data.id.clone();
                let position = self.inner.state.lock().await.canvas.add_source_node(data);
                tracing::info!(%node_id, ?position, "Added source node");
            }
            CanvasAction::AddOperationNode(mut data) => {
                if data.id.is_empty() {
                    data.id = Uuid::new_v4().to_string();
                    data.is_dummy = true;
                }
                let node_id = data.id.clone();
                let position = self
                    .inner
                    .state
                    .lock()
                    .await
                    .canvas
                    .add_operation_node(data);
                tracing::info!(%node_id, ?position, "Added operation node");
            }
            CanvasAction::DeleteNode(request) => {
                self.delete_node(
                    &request.node_id,
                    request.node_type,
                    request.is_dummy.unwrap_or(false),
                    request.should_refresh.unwrap_or(true),
                )
                .await;
            }
            CanvasAction::RefreshCanvas => self.request_redraw(),
            CanvasAction::RunWorkflow(_) | CanvasAction::CloseResetOpConfigPanel(()) => {
                tracing::trace!(seq = published.seq, "Ignoring outbound action");
            }
        }
    }

    /// Drives the controller until [`CanvasController::shutdown`] is called.
    ///
    /// Actions are handled one at a time in arrival order. Redraw toggles spawn
    /// a fetch each, so fetches may overlap; the fetch token sorts that out.
    pub async fn run(self) {
        let mut actions = self.inner.actions.subscribe();
        let mut redraw = self.subscribe_redraw();
        let mut shutdown = self.inner.shutdown.subscribe();
        // Pick up whatever was published before the loop started
        actions.mark_changed();

        if self.inner.config.fetch_on_start {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("Canvas controller stopped before the first fetch");
                    return;
                }
                _ = self.fetch_graph() => {}
            }
        }

        loop {
            let stopped = *shutdown.borrow();
            if stopped {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                changed = actions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = actions.borrow_and_update().clone();
                    if let Some(published) = latest {
                        // Backend calls can hang; shutdown still wins
                        tokio::select! {
                            _ = shutdown.changed() => break,
                            _ = self.handle_action(published) => {}
                        }
                    }
                }
                changed = redraw.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    redraw.borrow_and_update();
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.fetch_graph().await;
                    });
                }
            }
        }
        tracing::info!("Canvas controller stopped");
    }

    pub fn spawn(&self) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }

    pub fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
    }

    // Gesture passthroughs. The returned events tell the host what to repaint.

    pub async fn on_nodes_change(&self, changes: Vec<NodeChange>) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_nodes_change(changes);
        self.dispatch(&mut state, events)
    }

    pub async fn on_edges_change(&self, changes: Vec<EdgeChange>) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_edges_change(changes);
        self.dispatch(&mut state, events)
    }

    pub async fn on_connect(&self, connection: Connection) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_connect(connection);
        self.dispatch(&mut state, events)
    }

    pub async fn on_node_drag_stop(&self, node_id: &str) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_node_drag_stop(node_id);
        self.dispatch(&mut state, events)
    }

    pub async fn on_node_click(&self, node_id: &str) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_node_click(node_id);
        self.dispatch(&mut state, events)
    }

    pub async fn on_pane_click(&self) -> Vec<LogicEvent> {
        let mut state = self.inner.state.lock().await;
        let events = state.canvas.on_pane_click();
        self.dispatch(&mut state, events)
    }

    fn dispatch(&self, state: &mut EditorState, events: Vec<LogicEvent>) -> Vec<LogicEvent> {
        for event in &events {
            match event {
                LogicEvent::NodeActivated { id } => {
                    state.active_node = Some(id.clone());
                }
                LogicEvent::PaneClicked => {
                    state.active_node = None;
                    self.inner.preview.publish(PreviewAction::ClearPreview(()));
                }
                LogicEvent::EdgeConnected { id, .. } => {
                    tracing::info!(edge_id = %id, "Edge connected");
                }
                LogicEvent::NodeMoved { id, position } => {
                    tracing::debug!(node_id = %id, ?position, "Node settled");
                }
                LogicEvent::RepaintNeeded => {}
            }
        }
        events
    }
}
