/// Shared search logic for the compare and recommend handlers
///
/// Each search:
/// 1. Calls the car service
/// 2. On service failure, substitutes example data (when enabled)
/// 3. Renders the records into view models
/// 4. Collects the notifications the page should show
use crate::api_client::CarApiClient;
use crate::errors::AppError;
use crate::fallback;
use crate::filters::Filtros;
use crate::models::{CarRecord, RecomendarResponse};
use crate::renderer::{
    render_comparison_table, render_recommendation_grid, ComparisonSpec, RecommendationGrid,
};
use crate::view::{NoticeLevel, Results, SearchOutcome};

pub const FALLBACK_NOTICE: &str =
    "Não foi possível contactar o serviço. A mostrar dados de exemplo.";
pub const NO_COMPARISON_RESULTS: &str = "Nenhum resultado encontrado";
pub const NO_RECOMMENDATIONS: &str = "Nenhum carro encontrado com os filtros selecionados";
pub const COMPARISON_FAILED: &str = "Erro ao comparar modelos";
pub const RECOMMENDATION_FAILED: &str = "Erro ao buscar recomendações";
pub const CATALOG_FAILED: &str = "Erro ao carregar dados iniciais";

/// Vehicle types and fuels offered as filter checkboxes.
///
/// Loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub tipos: Vec<String>,
    pub combustiveis: Vec<String>,
    /// The service was unreachable at startup.
    pub load_failed: bool,
}

/// Loads the catalog, substituting the example catalog when the service
/// fails and `fallback` is enabled.
pub async fn load_catalog(api: &CarApiClient, fallback: bool) -> Catalog {
    let (tipos, combustiveis) = tokio::join!(api.tipos(), api.combustiveis());
    match (tipos, combustiveis) {
        (Ok(tipos), Ok(combustiveis)) => {
            tracing::info!(
                "Catalog loaded: {} types, {} fuels",
                tipos.len(),
                combustiveis.len()
            );
            Catalog {
                tipos,
                combustiveis,
                load_failed: false,
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to load catalog: {}", e);
            let (tipos, combustiveis) = if fallback {
                fallback::example_catalog()
            } else {
                (Vec::new(), Vec::new())
            };
            Catalog {
                tipos,
                combustiveis,
                load_failed: true,
            }
        }
    }
}

/// Compares `ids` through the service.
pub async fn run_comparison(api: &CarApiClient, ids: &[String], fallback: bool) -> SearchOutcome {
    let fetched = api.comparar(ids).await.and_then(|cars| {
        if cars.is_empty() {
            Err(AppError::EmptyResult(NO_COMPARISON_RESULTS.to_string()))
        } else {
            Ok(cars)
        }
    });

    match fetched {
        Ok(cars) => SearchOutcome::results(comparison(&cars, false)),
        Err(e) => match e.root() {
            AppError::EmptyResult(msg) => SearchOutcome::notice(NoticeLevel::Info, msg.clone()),
            AppError::BadRequest(msg) => SearchOutcome::notice(NoticeLevel::Error, msg.clone()),
            _ if fallback && e.falls_back_to_examples() => {
                tracing::warn!("Comparison falling back to example data: {}", e);
                let cars = fallback::example_comparison(ids);
                SearchOutcome::results(comparison(&cars, true))
                    .with_notice(NoticeLevel::Info, FALLBACK_NOTICE)
            }
            _ => {
                tracing::error!("Comparison failed: {}", e);
                SearchOutcome::notice(NoticeLevel::Error, COMPARISON_FAILED)
            }
        },
    }
}

/// Requests recommendations for `filtros`.
pub async fn run_recommendation(
    api: &CarApiClient,
    filtros: &Filtros,
    fallback: bool,
) -> SearchOutcome {
    match api.recomendar(filtros).await {
        Ok(response) => recommendations(response, false),
        Err(e) if fallback && e.falls_back_to_examples() => {
            tracing::warn!("Recommendation falling back to example data: {}", e);
            recommendations(fallback::example_recommendations(filtros), true)
                .with_notice(NoticeLevel::Info, FALLBACK_NOTICE)
        }
        Err(e) => {
            tracing::error!("Recommendation failed: {}", e);
            SearchOutcome::notice(NoticeLevel::Error, RECOMMENDATION_FAILED)
        }
    }
}

fn comparison(cars: &[CarRecord], example_data: bool) -> Results {
    Results::Comparison {
        table: render_comparison_table(cars, &ComparisonSpec::standard()),
        example_data,
    }
}

fn recommendations(response: RecomendarResponse, example_data: bool) -> SearchOutcome {
    if response.resultados.is_empty() {
        return SearchOutcome::notice(NoticeLevel::Info, NO_RECOMMENDATIONS);
    }
    SearchOutcome::results(Results::Recommendations {
        grid: RecommendationGrid {
            total: response.total,
            cards: render_recommendation_grid(&response.resultados),
        },
        example_data,
    })
}
