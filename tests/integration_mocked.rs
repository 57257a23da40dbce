/// Integration tests with a mocked car service
/// Tests the client, the search workflow and the example-data fallback
/// without a real backend
use carros_web::api_client::CarApiClient;
use carros_web::errors::AppError;
use carros_web::filters::{FilterForm, Filtros};
use carros_web::renderer::{render_comparison_table, ComparisonSpec};
use carros_web::search::{
    self, FALLBACK_NOTICE, NO_COMPARISON_RESULTS, NO_RECOMMENDATIONS, RECOMMENDATION_FAILED,
};
use carros_web::view::{NoticeLevel, Results};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create a client pointing at the mock server
fn client_for(server: &MockServer) -> CarApiClient {
    CarApiClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tipos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"tipos": ["SUV", "Citadino"]})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/combustiveis"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"combustiveis": ["Gasolina", "Diesel"]})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let catalog = search::load_catalog(&client, true).await;

    assert!(!catalog.load_failed);
    assert_eq!(catalog.tipos, vec!["SUV", "Citadino"]);
    assert_eq!(catalog.combustiveis, vec!["Gasolina", "Diesel"]);
}

#[tokio::test]
async fn test_short_search_skips_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/modelos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modelos": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.modelos("G").await.unwrap().is_empty());
    assert!(client.modelos("  a ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_with_no_matches_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/modelos"))
        .and(query_param("busca", "Go"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modelos": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let models = client.modelos("Go").await.unwrap();
    assert!(models.is_empty());
}

#[tokio::test]
async fn test_search_returns_suggestions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/modelos"))
        .and(query_param("busca", "Clio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modelos": [
                {
                    "id": "Renault Clio 2023",
                    "Marca": "Renault",
                    "Modelo": "Clio",
                    "Ano": 2023,
                    "Tipo": "Citadino"
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let models = client.modelos("Clio").await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id, "Renault Clio 2023");
    assert_eq!(models[0].label(), "Renault Clio (2023)");
}

#[tokio::test]
async fn test_compare_and_highlight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comparar"))
        .and(body_json(json!({"modelos": ["A 2020", "B 2021"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comparacao": [
                {"Marca": "A", "Modelo": "One", "Consumo (l/100km)": 5.2, "0-100 km/h (s)": 8.5},
                {"Marca": "B", "Modelo": "Two", "Consumo (l/100km)": 4.3, "0-100 km/h (s)": 10.9}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let cars = client.comparar(&ids(&["A 2020", "B 2021", ""])).await.unwrap();
    let table = render_comparison_table(&cars, &ComparisonSpec::standard());

    let best = |label: &str| {
        table
            .rows
            .iter()
            .find(|r| r.label == label)
            .and_then(|r| r.best_index)
    };
    assert_eq!(table.headers, vec!["Característica", "A One", "B Two"]);
    assert_eq!(best("Consumo (l/100km)"), Some(1));
    assert_eq!(best("0-100 km/h (s)"), Some(0));
}

#[tokio::test]
async fn test_compare_requires_two_models() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comparar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"comparacao": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.comparar(&ids(&["A 2020", " ", ""])).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_empty_comparison_notice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comparar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"comparacao": []})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = search::run_comparison(&client, &ids(&["x", "y"]), true).await;

    assert!(outcome.results.is_none());
    assert_eq!(
        outcome.notices,
        vec![(NoticeLevel::Info, NO_COMPARISON_RESULTS.to_string())]
    );
}

#[tokio::test]
async fn test_recommendation_sends_nulls_and_keeps_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .and(body_json(json!({
            "preco_max": 30000.0,
            "tipos": null,
            "combustiveis": null,
            "bagageira_min": null,
            "consumo_max": null,
            "extras_obrigatorios": null,
            "perfil": "familia",
            "prioridade_consumo": 1.0,
            "prioridade_desempenho": 1.0,
            "prioridade_espaco": 1.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "resultados": [
                {"Marca": "Peugeot", "Modelo": "3008", "score_total": 92},
                {"Marca": "Toyota", "Modelo": "RAV4", "score_total": 88}
            ],
            "filtros_aplicados": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let filtros = FilterForm::parse("preco_max=30000&perfil=familia").to_filtros();
    let outcome = search::run_recommendation(&client, &filtros, true).await;

    assert!(outcome.notices.is_empty());
    match outcome.results {
        Some(Results::Recommendations { grid, example_data }) => {
            assert!(!example_data);
            assert_eq!(grid.total, 2);
            let badges: Vec<_> = grid.cards.iter().map(|c| c.score_badge.as_str()).collect();
            assert_eq!(badges, vec!["92", "88"]);
            assert_eq!(grid.cards[0].title, "Peugeot 3008");
            assert_eq!(grid.cards[1].title, "Toyota RAV4");
        }
        other => panic!("expected recommendations, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_recommendation_notice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total": 0, "resultados": []})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = search::run_recommendation(&client, &Filtros::default(), true).await;

    assert!(outcome.results.is_none());
    assert_eq!(
        outcome.notices,
        vec![(NoticeLevel::Info, NO_RECOMMENDATIONS.to_string())]
    );
}

#[tokio::test]
async fn test_service_error_falls_back_to_filtered_examples() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Dados não carregados"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let filtros = Filtros {
        tipos: Some(vec!["Citadino".to_string()]),
        ..Default::default()
    };
    let outcome = search::run_recommendation(&client, &filtros, true).await;

    assert_eq!(
        outcome.notices,
        vec![(NoticeLevel::Info, FALLBACK_NOTICE.to_string())]
    );
    match outcome.results {
        Some(Results::Recommendations { grid, example_data }) => {
            assert!(example_data);
            assert_eq!(grid.total, 2);
            let titles: Vec<_> = grid.cards.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(titles, vec!["Renault Clio", "Dacia Sandero"]);
        }
        other => panic!("expected example recommendations, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_error_without_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = search::run_recommendation(&client, &Filtros::default(), false).await;

    assert!(outcome.results.is_none());
    assert_eq!(
        outcome.notices,
        vec![(NoticeLevel::Error, RECOMMENDATION_FAILED.to_string())]
    );
}

/// Bind then drop a listener so its port refuses connections
fn unreachable_uri() -> String {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_comparison_falls_back_when_unreachable() {
    let client = CarApiClient::new(&unreachable_uri(), Duration::from_secs(1)).unwrap();
    let outcome = search::run_comparison(&client, &ids(&["x", "y"]), true).await;

    match outcome.results {
        Some(Results::Comparison { table, example_data }) => {
            assert!(example_data);
            assert_eq!(table.car_count(), 2);
        }
        other => panic!("expected example comparison, got {:?}", other),
    }

    let catalog = search::load_catalog(&client, true).await;
    assert!(catalog.load_failed);
    assert!(catalog.tipos.contains(&"SUV".to_string()));
}

#[tokio::test]
async fn test_example_comparison_keeps_requested_size() {
    let client = CarApiClient::new(&unreachable_uri(), Duration::from_secs(1)).unwrap();
    let outcome =
        search::run_comparison(&client, &ids(&["Renault Clio 2023", "Golf"]), true).await;

    match outcome.results {
        Some(Results::Comparison { table, example_data }) => {
            assert!(example_data);
            assert_eq!(table.car_count(), 2);
            assert_eq!(
                table.headers,
                vec!["Característica", "Renault Clio", "Toyota Corolla Hybrid"]
            );
        }
        other => panic!("expected example comparison, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_kinds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tipos"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/combustiveis"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    match client.tipos().await {
        Err(AppError::HttpError { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected HttpError, got {:?}", other),
    }
    assert!(matches!(
        client.combustiveis().await,
        Err(AppError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_circuit_opens_after_repeated_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tipos"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    for _ in 0..5 {
        assert!(matches!(
            client.tipos().await,
            Err(AppError::HttpError { status: 503, .. })
        ));
    }

    // Sixth call is rejected locally
    assert!(matches!(
        client.tipos().await,
        Err(AppError::NetworkFailure(_))
    ));
}
