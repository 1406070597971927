use pipeline_canvas::model::{NodeData, NodeType, SourceKind};
use pipeline_client::{ApiConfig, HttpTransformApi, TransformApi};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpTransformApi {
    let config = ApiConfig::new(&format!("{}/api", server.uri()))
        .unwrap()
        .with_token("secret");
    HttpTransformApi::new(config).unwrap()
}

#[tokio::test]
async fn test_fetch_graph_decodes_nodes_and_edges() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/transform/dbt_project/graph/"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                {
                    "id": "m1",
                    "type": "src_model_node",
                    "input_name": "orders",
                    "schema": "raw",
                    "input_type": "source"
                },
                {
                    "id": "op1",
                    "type": "operation_node",
                    "output_cols": ["id", "total"],
                    "target_model_id": "m2",
                    "config": { "type": "castdatatypes" },
                    "seq": 1
                }
            ],
            "edges": [
                { "id": "e1", "source": "m1", "target": "op1" },
                { "source": "op1", "target": "m2" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = api_for(&server).fetch_graph().await.unwrap();

    assert_eq!(payload.nodes.len(), 2);
    match &payload.nodes[0] {
        NodeData::SourceModel(data) => {
            assert_eq!(data.name, "orders");
            assert_eq!(data.kind, SourceKind::Source);
            assert!(!data.is_dummy);
        }
        other => panic!("unexpected node {:?}", other),
    }
    match &payload.nodes[1] {
        NodeData::Operation(data) => {
            assert_eq!(data.output_cols, vec!["id", "total"]);
            assert_eq!(data.seq, Some(1));
        }
        other => panic!("unexpected node {:?}", other),
    }

    let (nodes, edges) = payload.into_canvas();
    assert_eq!(nodes[1].id, "op1");
    assert_eq!(edges[0].id, "e1");
    // Missing ids are derived from the endpoints
    assert_eq!(edges[1].id, "op1_m2");
    assert!(edges.iter().all(|e| e.marker_end.is_some()));
}

#[tokio::test]
async fn test_fetch_graph_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/transform/dbt_project/graph/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = api_for(&server).fetch_graph().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_fetch_graph_rejects_malformed_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/transform/dbt_project/graph/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server).fetch_graph().await.unwrap_err();
    assert!(err.to_string().contains("Invalid graph payload"));
}

#[tokio::test]
async fn test_delete_routes_by_node_type() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/transform/dbt_project/model/m1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/transform/dbt_project/model/operations/op1/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.delete_node("m1", NodeType::SourceModel).await.unwrap();
    api.delete_node("op1", NodeType::Operation).await.unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/transform/dbt_project/model/m1/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = api_for(&server).delete_model("m1").await;
    assert!(result.is_err());
}

#[test]
fn test_base_url_gets_trailing_slash() {
    let config = ApiConfig::new("http://localhost:8002/api").unwrap();
    assert_eq!(
        config
            .endpoint("transform/dbt_project/graph/")
            .unwrap()
            .as_str(),
        "http://localhost:8002/api/transform/dbt_project/graph/"
    );
    assert!(config.token.is_none());
}

#[test]
fn test_invalid_base_url() {
    assert!(ApiConfig::new("not a url").is_err());
}
