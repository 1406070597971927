use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use pipeline_bridge::{ActionBus, CanvasAction, CanvasController, PreviewBus, SyncConfig};
use pipeline_canvas::model::{SourceKind, SourceModelData};
use pipeline_canvas::{Canvas, CanvasConfig};
use pipeline_client::{ApiConfig, HttpTransformApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== Pipeline Canvas Sync Demo ===");

    // 1. Read backend settings (PIPELINE_API_URL, PIPELINE_API_TOKEN, ...)
    let api_config = ApiConfig::from_env()?;
    let mut sync_config = SyncConfig::from_env()?;
    // Without a session there is nothing to fetch yet
    sync_config.fetch_on_start = api_config.token.is_some();
    let api = Arc::new(HttpTransformApi::new(api_config)?);

    // 2. Wire the controller to the shared buses
    let actions = ActionBus::new();
    let preview = PreviewBus::new();
    let controller = CanvasController::new(
        api,
        Canvas::new(CanvasConfig::default()),
        actions.clone(),
        preview,
        sync_config,
    );
    controller
        .update_viewport_size(Vec2::new(1280.0, 720.0))
        .await;
    let handle = controller.spawn();

    // 3. Act like the tree browser: pick a model, then ask for a refresh
    actions.publish(CanvasAction::AddSourceModelNode(SourceModelData {
        id: "demo-orders".into(),
        name: "orders".into(),
        schema: "raw".into(),
        kind: SourceKind::Source,
        is_dummy: false,
    }));
    tokio::time::sleep(Duration::from_millis(200)).await;
    actions.publish(CanvasAction::RefreshCanvas);
    tokio::time::sleep(Duration::from_millis(500)).await;

    println!("Canvas now holds:");
    for node in controller.snapshot().await.nodes() {
        println!("  - {} ({}) at {:?}", node.id, node.node_type(), node.position);
    }

    controller.shutdown();
    handle.await?;
    Ok(())
}
