//! Remote model listing and API key validation.
//!
//! Every call resolves to a [`FetchError`] class on failure; nothing is
//! persisted here, so a caller that abandons the future loses nothing.

use super::template::template_by_id;
use crate::error::FetchError;
use serde::Deserialize;
use std::time::Duration;

const OPENROUTER_ORIGIN: &str = "https://openrouter.ai";
const REQUESTY_ORIGIN: &str = "https://router.requesty.ai";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const MODEL_FETCHING: &[&str] = &["openrouter", "requesty", "ollama", "lmstudio", "llamacpp"];
const KEY_VALIDATION: &[&str] = &["openrouter", "requesty"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pricing {
    pub prompt: String,
    pub completion: String,
}

/// Normalized model metadata across the supported listing APIs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelMeta {
    pub id: String,
    pub name: Option<String>,
    pub context_length: Option<u64>,
    pub max_output_tokens: Option<u64>,
    pub pricing: Option<Pricing>,
    pub input_modalities: Option<Vec<String>>,
    pub supported_parameters: Option<Vec<String>>,
    pub parameter_size: Option<String>,
    pub quantization: Option<String>,
    pub architecture: Option<String>,
    pub file_size: Option<u64>,
}

pub fn supports_model_fetch(template_id: &str) -> bool {
    MODEL_FETCHING.contains(&template_id)
}

pub fn supports_key_validation(template_id: &str) -> bool {
    KEY_VALIDATION.contains(&template_id)
}

/// List the models a provider family exposes. Local families query
/// `base_url_override` when set, the template base URL otherwise.
pub async fn fetch_models(
    template_id: &str,
    api_key: &str,
    base_url_override: Option<&str>,
) -> Result<Vec<ModelMeta>, FetchError> {
    let mut models = match template_id {
        "openrouter" => fetch_openrouter(OPENROUTER_ORIGIN, api_key).await?,
        "requesty" => fetch_requesty(REQUESTY_ORIGIN, api_key).await?,
        "ollama" | "lmstudio" | "llamacpp" => {
            let base = base_url_override
                .filter(|url| !url.is_empty())
                .or_else(|| template_by_id(template_id).map(|t| t.base_url))
                .ok_or(FetchError::Unknown)?;
            fetch_local(template_id, base).await?
        }
        _ => return Err(FetchError::Unknown),
    };

    models.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!(template = template_id, count = models.len(), "fetched remote models");
    Ok(models)
}

/// Check a key against the family's API. Only families listed by
/// [`supports_key_validation`] can succeed.
pub async fn validate_api_key(template_id: &str, api_key: &str) -> Result<(), FetchError> {
    let url = match template_id {
        "openrouter" => format!("{}/api/v1/auth/key", OPENROUTER_ORIGIN),
        "requesty" => format!("{}/v1/models", REQUESTY_ORIGIN),
        _ => return Err(FetchError::Unknown),
    };
    get(&url, Some(api_key)).await.map(drop)
}

async fn get(url: &str, bearer: Option<&str>) -> Result<reqwest::Response, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|_| FetchError::Network)?;

    let mut request = client.get(url);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        tracing::debug!(url, error = %e, "request failed");
        FetchError::Network
    })?;

    classify_status(response.status().as_u16())?;
    Ok(response)
}

async fn get_json<T: for<'de> Deserialize<'de>>(
    url: &str,
    bearer: Option<&str>,
) -> Result<T, FetchError> {
    get(url, bearer)
        .await?
        .json::<T>()
        .await
        .map_err(|_| FetchError::Network)
}

fn classify_status(status: u16) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(FetchError::Auth),
        _ => Err(FetchError::Unknown),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct OpenRouterModel {
    id: String,
    name: Option<String>,
    context_length: Option<u64>,
    architecture: Option<OpenRouterArchitecture>,
    pricing: Option<OpenRouterPricing>,
    top_provider: Option<OpenRouterTopProvider>,
    supported_parameters: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct OpenRouterArchitecture {
    #[serde(default)]
    input_modalities: Vec<String>,
}

#[derive(Deserialize)]
struct OpenRouterPricing {
    prompt: String,
    completion: String,
}

#[derive(Deserialize)]
struct OpenRouterTopProvider {
    max_completion_tokens: Option<u64>,
}

async fn fetch_openrouter(origin: &str, api_key: &str) -> Result<Vec<ModelMeta>, FetchError> {
    let url = join_url(origin, "/api/v1/models/user");
    let list: DataList<OpenRouterModel> = get_json(&url, Some(api_key)).await?;
    Ok(list
        .data
        .into_iter()
        .map(|m| ModelMeta {
            id: m.id,
            name: m.name,
            context_length: m.context_length,
            max_output_tokens: m.top_provider.and_then(|p| p.max_completion_tokens),
            pricing: m.pricing.map(|p| Pricing {
                prompt: p.prompt,
                completion: p.completion,
            }),
            input_modalities: m.architecture.map(|a| a.input_modalities),
            supported_parameters: m.supported_parameters,
            ..ModelMeta::default()
        })
        .collect())
}

#[derive(Deserialize)]
struct RequestyModel {
    id: String,
    input_price: Option<f64>,
    output_price: Option<f64>,
    max_output_tokens: Option<u64>,
    context_window: Option<u64>,
    #[serde(default)]
    supports_vision: bool,
    #[serde(default)]
    supports_reasoning: bool,
}

async fn fetch_requesty(origin: &str, api_key: &str) -> Result<Vec<ModelMeta>, FetchError> {
    let url = join_url(origin, "/v1/models");
    let list: DataList<RequestyModel> = get_json(&url, Some(api_key)).await?;
    Ok(list
        .data
        .into_iter()
        .map(|m| {
            let mut modalities = vec!["text".to_string()];
            if m.supports_vision {
                modalities.push("image".to_string());
            }
            ModelMeta {
                id: m.id,
                context_length: m.context_window,
                max_output_tokens: m.max_output_tokens,
                pricing: m.input_price.zip(m.output_price).map(|(i, o)| Pricing {
                    prompt: i.to_string(),
                    completion: o.to_string(),
                }),
                input_modalities: Some(modalities),
                supported_parameters: m
                    .supports_reasoning
                    .then(|| vec!["reasoning".to_string()]),
                ..ModelMeta::default()
            }
        })
        .collect())
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
    size: Option<u64>,
    #[serde(default)]
    details: OllamaDetails,
}

#[derive(Deserialize, Default)]
struct OllamaDetails {
    family: Option<String>,
    parameter_size: Option<String>,
    quantization_level: Option<String>,
}

#[derive(Deserialize)]
struct LmStudioList {
    #[serde(default)]
    models: Vec<LmStudioModel>,
}

#[derive(Deserialize)]
struct LmStudioModel {
    key: String,
    display_name: Option<String>,
    size_bytes: Option<u64>,
    params_string: Option<String>,
    max_context_length: Option<u64>,
    architecture: Option<String>,
    quantization: Option<LmStudioQuantization>,
    #[serde(default)]
    capabilities: LmStudioCapabilities,
}

#[derive(Deserialize)]
struct LmStudioQuantization {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct LmStudioCapabilities {
    #[serde(default)]
    vision: bool,
    #[serde(default)]
    trained_for_tool_use: bool,
}

#[derive(Deserialize)]
struct LlamaCppModel {
    id: String,
    meta: Option<LlamaCppMeta>,
}

#[derive(Deserialize)]
struct LlamaCppMeta {
    n_ctx_train: Option<u64>,
    n_params: Option<u64>,
    size: Option<u64>,
}

async fn fetch_local(template_id: &str, base: &str) -> Result<Vec<ModelMeta>, FetchError> {
    match template_id {
        "ollama" => {
            let tags: OllamaTags = get_json(&join_url(base, "/api/tags"), None).await?;
            Ok(tags
                .models
                .into_iter()
                .map(|m| ModelMeta {
                    id: m.name.clone(),
                    name: Some(m.name),
                    parameter_size: m.details.parameter_size,
                    quantization: m.details.quantization_level,
                    architecture: m.details.family,
                    file_size: m.size,
                    ..ModelMeta::default()
                })
                .collect())
        }
        "lmstudio" => {
            let list: LmStudioList = get_json(&join_url(base, "/api/v1/models"), None).await?;
            Ok(list
                .models
                .into_iter()
                .map(|m| {
                    let mut modalities = vec!["text".to_string()];
                    if m.capabilities.vision {
                        modalities.push("image".to_string());
                    }
                    ModelMeta {
                        name: Some(m.display_name.unwrap_or_else(|| m.key.clone())),
                        id: m.key,
                        context_length: m.max_context_length,
                        parameter_size: m.params_string,
                        quantization: m.quantization.and_then(|q| q.name),
                        architecture: m.architecture,
                        file_size: m.size_bytes,
                        input_modalities: Some(modalities),
                        supported_parameters: m
                            .capabilities
                            .trained_for_tool_use
                            .then(|| vec!["tools".to_string()]),
                        ..ModelMeta::default()
                    }
                })
                .collect())
        }
        "llamacpp" => {
            let list: DataList<LlamaCppModel> = get_json(&join_url(base, "/v1/models"), None).await?;
            Ok(list
                .data
                .into_iter()
                .map(|m| ModelMeta {
                    name: Some(m.id.clone()),
                    id: m.id,
                    context_length: m.meta.as_ref().and_then(|meta| meta.n_ctx_train),
                    parameter_size: m
                        .meta
                        .as_ref()
                        .and_then(|meta| meta.n_params)
                        .map(format_param_count),
                    file_size: m.meta.and_then(|meta| meta.size),
                    ..ModelMeta::default()
                })
                .collect())
        }
        _ => Err(FetchError::Unknown),
    }
}

/// `7241732096` -> `7.2B`
pub fn format_param_count(n: u64) -> String {
    let n_f = n as f64;
    if n_f >= 1e12 {
        format!("{:.1}T", n_f / 1e12)
    } else if n_f >= 1e9 {
        format!("{:.1}B", n_f / 1e9)
    } else if n_f >= 1e6 {
        format!("{:.0}M", n_f / 1e6)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a random local port and return its
    /// base URL plus a handle yielding the raw request.
    fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_capabilities() {
        assert!(supports_model_fetch("ollama"));
        assert!(supports_model_fetch("openrouter"));
        assert!(!supports_model_fetch("deepseek"));
        assert!(supports_key_validation("requesty"));
        assert!(!supports_key_validation("ollama"));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), Ok(()));
        assert_eq!(classify_status(401), Err(FetchError::Auth));
        assert_eq!(classify_status(403), Err(FetchError::Auth));
        assert_eq!(classify_status(500), Err(FetchError::Unknown));
        assert_eq!(classify_status(404), Err(FetchError::Unknown));
    }

    #[test]
    fn test_format_param_count() {
        assert_eq!(format_param_count(7_241_732_096), "7.2B");
        assert_eq!(format_param_count(1_500_000_000_000), "1.5T");
        assert_eq!(format_param_count(350_000_000), "350M");
        assert_eq!(format_param_count(1234), "1234");
    }

    #[tokio::test]
    async fn test_ollama_models_sorted_with_override() {
        let body = r#"{"models":[
            {"name":"qwen3:8b","size":5000,"details":{"family":"qwen3","parameter_size":"8B","quantization_level":"Q4_K_M"}},
            {"name":"llama3:8b","size":4000,"details":{}}
        ]}"#;
        let (base, server) = serve_once("200 OK", body);

        let models = fetch_models("ollama", "ollama", Some(&format!("{}/", base)))
            .await
            .unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("GET /api/tags "));
        assert_eq!(models[0].id, "llama3:8b");
        assert_eq!(models[1].id, "qwen3:8b");
        assert_eq!(models[1].parameter_size.as_deref(), Some("8B"));
        assert_eq!(models[1].quantization.as_deref(), Some("Q4_K_M"));
        assert_eq!(models[1].file_size, Some(5000));
    }

    #[tokio::test]
    async fn test_llamacpp_models() {
        let body = r#"{"object":"list","data":[{"id":"model.gguf","object":"model","meta":{"n_ctx_train":8192,"n_params":8030000000,"size":1}}]}"#;
        let (base, server) = serve_once("200 OK", body);
        let models = fetch_models("llamacpp", "llamacpp", Some(&base)).await.unwrap();
        assert!(server.join().unwrap().starts_with("GET /v1/models "));
        assert_eq!(models[0].context_length, Some(8192));
        assert_eq!(models[0].parameter_size.as_deref(), Some("8.0B"));
    }

    #[tokio::test]
    async fn test_lmstudio_models() {
        let body = r#"{"models":[{"type":"llm","publisher":"x","key":"qwen/qwen3","display_name":"Qwen 3","capabilities":{"vision":true,"trained_for_tool_use":true}}]}"#;
        let (base, server) = serve_once("200 OK", body);
        let models = fetch_models("lmstudio", "lmstudio", Some(&base)).await.unwrap();
        assert!(server.join().unwrap().starts_with("GET /api/v1/models "));
        assert_eq!(models[0].name.as_deref(), Some("Qwen 3"));
        assert_eq!(
            models[0].input_modalities,
            Some(vec!["text".to_string(), "image".to_string()])
        );
        assert_eq!(models[0].supported_parameters, Some(vec!["tools".to_string()]));
    }

    #[tokio::test]
    async fn test_openrouter_sends_bearer_and_maps_fields() {
        let body = r#"{"data":[{"id":"z/model","name":"Z","context_length":1000,
            "architecture":{"input_modalities":["text"],"modality":"text->text"},
            "pricing":{"prompt":"0.1","completion":"0.2"},
            "top_provider":{"max_completion_tokens":512}}]}"#;
        let (base, server) = serve_once("200 OK", body);
        let models = fetch_openrouter(&base, "sk-or-1").await.unwrap();
        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /api/v1/models/user "));
        assert!(request.contains("authorization: bearer sk-or-1"));
        assert_eq!(models[0].max_output_tokens, Some(512));
        assert_eq!(
            models[0].pricing,
            Some(Pricing {
                prompt: "0.1".to_string(),
                completion: "0.2".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_requesty_pricing_requires_both_prices() {
        let body = r#"{"object":"list","data":[
            {"id":"a","input_price":1.5,"output_price":3,"supports_reasoning":true},
            {"id":"b","input_price":1.5}
        ]}"#;
        let (base, server) = serve_once("200 OK", body);
        let models = fetch_requesty(&base, "key").await.unwrap();
        server.join().unwrap();
        assert_eq!(models[0].pricing.as_ref().map(|p| p.completion.as_str()), Some("3"));
        assert_eq!(models[0].supported_parameters, Some(vec!["reasoning".to_string()]));
        assert!(models[1].pricing.is_none());
    }

    #[tokio::test]
    async fn test_auth_failure_classified() {
        let (base, server) = serve_once("401 Unauthorized", "{}");
        let err = fetch_openrouter(&base, "bad").await.unwrap_err();
        server.join().unwrap();
        assert_eq!(err, FetchError::Auth);
    }

    #[tokio::test]
    async fn test_server_error_classified_unknown() {
        let (base, server) = serve_once("500 Internal Server Error", "{}");
        let err = fetch_models("ollama", "", Some(&base)).await.unwrap_err();
        server.join().unwrap();
        assert_eq!(err, FetchError::Unknown);
    }

    #[tokio::test]
    async fn test_bad_body_classified_network() {
        let (base, server) = serve_once("200 OK", "not json");
        let err = fetch_models("ollama", "", Some(&base)).await.unwrap_err();
        server.join().unwrap();
        assert_eq!(err, FetchError::Network);
    }

    #[tokio::test]
    async fn test_unreachable_is_network() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let err = fetch_models("llamacpp", "", Some(&format!("http://127.0.0.1:{}", port)))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Network);
    }

    #[tokio::test]
    async fn test_unsupported_templates() {
        assert_eq!(fetch_models("deepseek", "k", None).await, Err(FetchError::Unknown));
        assert_eq!(validate_api_key("ollama", "k").await, Err(FetchError::Unknown));
    }
}
