use crate::circuit_breaker::{create_service_circuit_breaker, ServiceBreaker};
use crate::errors::{AppError, ResultExt};
use crate::filters::Filtros;
use crate::models::{
    CarRecord, CombustiveisResponse, CompararRequest, CompararResponse, ModelSuggestion,
    ModelosResponse, RecomendarResponse, TiposResponse,
};
use failsafe::futures::CircuitBreaker;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Minimum search length before the autocomplete endpoint is queried.
pub const MIN_SEARCH_LEN: usize = 2;

/// Number of models a comparison accepts.
pub const COMPARE_RANGE: (usize, usize) = (2, 3);

/// Client for the car comparison/recommendation service.
#[derive(Clone)]
pub struct CarApiClient {
    client: reqwest::Client,
    base_url: Url,
    breaker: ServiceBreaker,
}

impl CarApiClient {
    /// Creates a new `CarApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the car service.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::BadRequest(format!("Invalid car service URL: {}", e)))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create car service client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            breaker: create_service_circuit_breaker(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| {
                AppError::InternalError(format!("Failed to build URL for {}: {}", path, e))
            })
    }

    /// Sends a request through the circuit breaker and decodes the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, AppError> {
        let outcome = self
            .breaker
            .call_with(
                |e: &AppError| e.is_service_failure(),
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(AppError::from)
                        .with_context(|| format!("{} request failed", what))?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        tracing::warn!("{} returned {}: {}", what, status, error_text);
                        return Err(AppError::HttpError {
                            status: status.as_u16(),
                            body: error_text,
                        });
                    }

                    let body = response.text().await.map_err(|e| {
                        AppError::NetworkFailure(format!("Failed to read {} response: {}", what, e))
                    })?;
                    serde_json::from_str::<T>(&body).map_err(|e| {
                        AppError::InvalidResponse(format!(
                            "Failed to parse {} response: {}",
                            what, e
                        ))
                    })
                },
            )
            .await;

        match outcome {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Circuit open, skipping {}", what);
                Err(AppError::NetworkFailure(
                    "Car service circuit is open".to_string(),
                ))
            }
        }
    }

    /// Lists the vehicle types known to the service.
    pub async fn tipos(&self) -> Result<Vec<String>, AppError> {
        let url = self.endpoint("tipos")?;
        tracing::debug!("Fetching vehicle types: {}", url);
        let data: TiposResponse = self.send(self.client.get(url), "GET /tipos").await?;
        Ok(data.tipos)
    }

    /// Lists the fuel types known to the service.
    pub async fn combustiveis(&self) -> Result<Vec<String>, AppError> {
        let url = self.endpoint("combustiveis")?;
        tracing::debug!("Fetching fuel types: {}", url);
        let data: CombustiveisResponse =
            self.send(self.client.get(url), "GET /combustiveis").await?;
        Ok(data.combustiveis)
    }

    /// Autocomplete search.
    ///
    /// Queries shorter than [`MIN_SEARCH_LEN`] characters return an empty
    /// list without contacting the service.
    pub async fn modelos(&self, busca: &str) -> Result<Vec<ModelSuggestion>, AppError> {
        let busca = busca.trim();
        if busca.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("modelos")?;
        url.query_pairs_mut().append_pair("busca", busca);
        tracing::debug!("Searching models for '{}'", busca);

        let data: ModelosResponse = self.send(self.client.get(url), "GET /modelos").await?;
        Ok(data.modelos)
    }

    /// Fetches the records of 2 or 3 models for side-by-side comparison.
    ///
    /// Blank ids are dropped; the remaining count is validated before any
    /// network call.
    pub async fn comparar(&self, ids: &[String]) -> Result<Vec<CarRecord>, AppError> {
        let modelos = normalize_model_ids(ids)?;
        let url = self.endpoint("comparar")?;
        tracing::info!("Comparing {} models: {:?}", modelos.len(), modelos);

        let request = self.client.post(url).json(&CompararRequest { modelos });
        let data: CompararResponse = self
            .send(request, "POST /comparar")
            .await
            .context("Comparison failed")?;
        Ok(data.comparacao)
    }

    /// Requests ranked recommendations for `filtros`.
    pub async fn recomendar(&self, filtros: &Filtros) -> Result<RecomendarResponse, AppError> {
        let url = self.endpoint("recomendar")?;
        tracing::info!("Requesting recommendations: {:?}", filtros);

        let request = self.client.post(url).json(filtros);
        let data: RecomendarResponse = self
            .send(request, "POST /recomendar")
            .await
            .context("Recommendation failed")?;

        tracing::info!(
            "Service returned {} of {} matches",
            data.resultados.len(),
            data.total
        );
        Ok(data)
    }
}

/// Trims ids, drops blanks and enforces the 2..=3 comparison size.
pub fn normalize_model_ids(ids: &[String]) -> Result<Vec<String>, AppError> {
    let modelos: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let (min, max) = COMPARE_RANGE;
    if modelos.len() < min {
        return Err(AppError::BadRequest(
            "Selecione pelo menos 2 modelos para comparar".to_string(),
        ));
    }
    if modelos.len() > max {
        return Err(AppError::BadRequest(
            "Selecione no máximo 3 modelos para comparar".to_string(),
        ));
    }
    Ok(modelos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = CarApiClient::new("https://example.com", Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(CarApiClient::new("not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = CarApiClient::new("https://cars.example.com/api", Duration::from_secs(5))
            .unwrap();
        assert_eq!(
            client.endpoint("tipos").unwrap().as_str(),
            "https://cars.example.com/api/tipos"
        );
    }

    #[test]
    fn test_normalize_model_ids() {
        let ids = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            normalize_model_ids(&ids(&[" Clio 2023 ", "", "Golf 2022"])).unwrap(),
            ids(&["Clio 2023", "Golf 2022"])
        );
        assert!(matches!(
            normalize_model_ids(&ids(&["Clio 2023", "  ", ""])),
            Err(AppError::BadRequest(_))
        ));
        assert!(normalize_model_ids(&ids(&["a", "b", "c", "d"])).is_err());
    }
}
