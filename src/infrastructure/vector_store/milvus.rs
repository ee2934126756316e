use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::{
    ports::VectorStore, Document, DomainError, Embedding, SearchResult, VectorStats,
};
use crate::infrastructure::config::{MilvusConfig, VectorStoreBackend};

const PRIMARY_FIELD: &str = "primary_key";
const VECTOR_FIELD: &str = "embedding";
const MAX_VARCHAR: u32 = 65535;

/// Milvus (or Zilliz Cloud) collection reached through the v2 REST API.
pub struct MilvusVectorStore {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    collection: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct MilvusResponse<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: T,
}

impl<T> MilvusResponse<T> {
    fn into_result(self) -> Result<T, DomainError> {
        match self.code {
            0 | 200 => Ok(self.data),
            code => Err(DomainError::store_unavailable(format!(
                "Milvus error {code}: {}",
                self.message.unwrap_or_default()
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct HasData {
    has: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertData {
    #[serde(default)]
    insert_ids: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    #[serde(default)]
    row_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "primary_key", alias = "id")]
    id: Value,
    #[serde(default)]
    distance: f32,
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: String,
}

impl MilvusVectorStore {
    /// Builds the client without contacting the server.
    pub fn new(
        config: &MilvusConfig,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            token: config.token.clone(),
            collection: config.collection.clone(),
            dimension,
        })
    }

    /// Connects and creates the collection when it does not exist yet.
    pub async fn connect(
        config: &MilvusConfig,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let store = Self::new(config, dimension, timeout)?;
        store.ensure_collection().await?;
        tracing::info!(endpoint = %store.endpoint, collection = %store.collection, "connected to Milvus");

        Ok(store)
    }

    /// Names of all collections on the server. Read-only.
    pub async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        self.call("collections/list", json!({})).await
    }

    async fn call<T>(&self, path: &str, body: Value) -> Result<T, DomainError>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}/v2/vectordb/{}", self.endpoint, path);
        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "failed" };
            DomainError::store_unavailable(format!("Milvus request {path} {reason}: {e}"))
        })?;

        let status = response.status();
        let envelope: MilvusResponse<T> = response.json().await.map_err(|e| {
            DomainError::store_unavailable(format!("Invalid Milvus response ({status}): {e}"))
        })?;

        envelope.into_result()
    }

    async fn has_collection(&self) -> Result<bool, DomainError> {
        let data: HasData = self
            .call(
                "collections/has",
                json!({ "collectionName": self.collection }),
            )
            .await?;
        Ok(data.has)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        if self.has_collection().await? {
            return Ok(());
        }

        let _: Value = self
            .call("collections/create", self.create_collection_body())
            .await?;
        tracing::info!(collection = %self.collection, dimension = self.dimension, "created Milvus collection");
        Ok(())
    }

    fn create_collection_body(&self) -> Value {
        json!({
            "collectionName": self.collection,
            "schema": {
                "autoId": true,
                "enableDynamicField": false,
                "fields": [
                    { "fieldName": PRIMARY_FIELD, "dataType": "Int64", "isPrimary": true },
                    {
                        "fieldName": "content",
                        "dataType": "VarChar",
                        "elementTypeParams": { "max_length": MAX_VARCHAR }
                    },
                    {
                        "fieldName": "metadata",
                        "dataType": "VarChar",
                        "elementTypeParams": { "max_length": MAX_VARCHAR }
                    },
                    {
                        "fieldName": VECTOR_FIELD,
                        "dataType": "FloatVector",
                        "elementTypeParams": { "dim": self.dimension }
                    }
                ]
            },
            "indexParams": [{
                "fieldName": VECTOR_FIELD,
                "indexName": VECTOR_FIELD,
                "metricType": "COSINE",
                "indexType": "IVF_FLAT",
                "params": { "nlist": 128 }
            }]
        })
    }

    fn search_body(&self, query: &Embedding, top_k: usize) -> Value {
        json!({
            "collectionName": self.collection,
            "data": [query.as_slice()],
            "annsField": VECTOR_FIELD,
            "limit": top_k,
            "outputFields": ["content", "metadata"],
            "searchParams": {
                "metricType": "COSINE",
                "params": { "nprobe": 10 }
            }
        })
    }
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn hits_to_results(hits: Vec<SearchHit>) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = hits
        .into_iter()
        .map(|hit| SearchResult {
            document: Document {
                id: id_to_string(&hit.id),
                content: hit.content,
                metadata: hit.metadata,
                created_at: None,
            },
            score: hit.distance,
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

#[async_trait]
impl VectorStore for MilvusVectorStore {
    async fn insert(
        &self,
        document: &Document,
        embedding: &Embedding,
    ) -> Result<String, DomainError> {
        super::check_dimension(embedding, self.dimension)?;

        let data: InsertData = self
            .call(
                "entities/insert",
                json!({
                    "collectionName": self.collection,
                    "data": [{
                        "content": document.content,
                        "metadata": document.metadata,
                        "embedding": embedding.as_slice(),
                    }]
                }),
            )
            .await?;

        data.insert_ids
            .first()
            .map(id_to_string)
            .ok_or_else(|| DomainError::store_unavailable("Milvus returned no insert id"))
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        super::check_dimension(query, self.dimension)?;

        let hits: Vec<SearchHit> = self
            .call("entities/search", self.search_body(query, top_k))
            .await?;
        Ok(hits_to_results(hits))
    }

    async fn stats(&self) -> Result<VectorStats, DomainError> {
        let data: StatsData = self
            .call(
                "collections/get_stats",
                json!({ "collectionName": self.collection }),
            )
            .await?;

        Ok(
            VectorStats::new(self.backend(), data.row_count as usize, self.dimension)
                .with_detail("collection_name", self.collection.clone())
                .with_detail("host", self.endpoint.clone()),
        )
    }

    /// Drops the collection and recreates it empty.
    async fn clear(&self) -> Result<(), DomainError> {
        let _: Value = self
            .call(
                "collections/drop",
                json!({ "collectionName": self.collection }),
            )
            .await?;
        tracing::info!(collection = %self.collection, "dropped Milvus collection");
        self.ensure_collection().await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        if self.has_collection().await? {
            Ok(())
        } else {
            Err(DomainError::store_unavailable(format!(
                "Collection {} does not exist",
                self.collection
            )))
        }
    }

    fn backend(&self) -> &'static str {
        VectorStoreBackend::Milvus.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use axum::Router;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    fn store(dimension: usize) -> MilvusVectorStore {
        MilvusVectorStore {
            client: reqwest::Client::new(),
            endpoint: "http://localhost:19530".to_string(),
            token: None,
            collection: "docs".to_string(),
            dimension,
        }
    }

    #[test]
    fn test_error_code_becomes_store_unavailable() {
        let response: MilvusResponse<Value> =
            serde_json::from_str(r#"{"code": 1100, "message": "collection not found"}"#).unwrap();
        let err = response.into_result().unwrap_err();

        assert!(matches!(err, DomainError::StoreUnavailable(ref m) if m.contains("collection not found")));
    }

    #[test]
    fn test_insert_ids_accept_numbers_and_strings() {
        let response: MilvusResponse<InsertData> = serde_json::from_str(
            r#"{"code": 0, "data": {"insertCount": 1, "insertIds": ["449494881526235"]}}"#,
        )
        .unwrap();
        let data = response.into_result().unwrap();
        assert_eq!(id_to_string(&data.insert_ids[0]), "449494881526235");

        assert_eq!(id_to_string(&json!(42)), "42");
    }

    #[test]
    fn test_search_hits_parse_and_sort() {
        let response: MilvusResponse<Vec<SearchHit>> = serde_json::from_str(
            r#"{"code": 0, "data": [
                {"primary_key": 2, "distance": 0.41, "content": "Docker", "metadata": "{}"},
                {"primary_key": 1, "distance": 0.97, "content": "FastAPI", "metadata": "{\"topic\":\"fastapi\"}"}
            ]}"#,
        )
        .unwrap();
        let results = hits_to_results(response.into_result().unwrap());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "1");
        assert_eq!(results[0].document.content, "FastAPI");
        assert_eq!(results[0].document.metadata_json()["topic"], "fastapi");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_missing_data_defaults() {
        let response: MilvusResponse<StatsData> =
            serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert_eq!(response.into_result().unwrap().row_count, 0);
    }

    #[test]
    fn test_create_collection_body() {
        let body = store(384).create_collection_body();
        assert_eq!(body["collectionName"], "docs");
        assert_eq!(body["schema"]["fields"][3]["elementTypeParams"]["dim"], 384);
        assert_eq!(body["indexParams"][0]["metricType"], "COSINE");
    }

    #[test]
    fn test_search_body() {
        let body = store(2).search_body(&Embedding::new(vec![0.5, 0.5]), 3);
        assert_eq!(body["limit"], 3);
        assert_eq!(body["annsField"], "embedding");
        assert_eq!(body["data"][0], json!([0.5, 0.5]));
    }

    #[tokio::test]
    async fn test_search_zero_k_skips_request() {
        let results = store(2)
            .search(&Embedding::new(vec![1.0, 0.0]), 0)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_store_unavailable() {
        let mut store = store(2);
        store.endpoint = "http://127.0.0.1:9".to_string();
        let err = store.stats().await.unwrap_err();
        assert!(matches!(err, DomainError::StoreUnavailable(_)));
    }

    /// Accepts connections and never answers.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    fn config_for(uri: String) -> MilvusConfig {
        MilvusConfig {
            uri: Some(uri),
            collection: "docs".to_string(),
            ..MilvusConfig::default()
        }
    }

    #[tokio::test]
    async fn test_request_timeout_is_store_unavailable() {
        let config = config_for(silent_endpoint().await);

        let err = MilvusVectorStore::connect(&config, 2, Duration::from_millis(300))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, DomainError::StoreUnavailable(ref m) if m.contains("timed out")));
    }

    /// Minimal Milvus REST stand-in that records every path it is asked for.
    async fn fake_milvus(has_collection: bool) -> (String, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();

        let app = Router::new().fallback(move |uri: Uri| {
            let calls = recorded.clone();
            async move {
                let path = uri.path().to_string();
                calls.lock().unwrap().push(path.clone());
                let data = match path.as_str() {
                    "/v2/vectordb/collections/list" => json!(["docs", "other"]),
                    "/v2/vectordb/collections/has" => json!({ "has": has_collection }),
                    _ => json!({}),
                };
                axum::Json(json!({ "code": 0, "data": data }))
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), calls)
    }

    #[tokio::test]
    async fn test_connect_creates_missing_collection() {
        let (uri, calls) = fake_milvus(false).await;

        MilvusVectorStore::connect(&config_for(uri), 2, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "/v2/vectordb/collections/has".to_string(),
                "/v2/vectordb/collections/create".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_collections_does_not_create() {
        let (uri, calls) = fake_milvus(false).await;

        let store = MilvusVectorStore::new(&config_for(uri), 2, Duration::from_secs(5)).unwrap();
        let collections = store.list_collections().await.unwrap();

        assert_eq!(collections, vec!["docs".to_string(), "other".to_string()]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["/v2/vectordb/collections/list".to_string()]
        );
    }

    #[test]
    fn test_new_makes_no_request() {
        let store =
            MilvusVectorStore::new(&config_for("http://127.0.0.1:9/".to_string()), 4, Duration::from_secs(1))
                .unwrap();
        assert_eq!(store.endpoint, "http://127.0.0.1:9");
        assert_eq!(store.backend(), "milvus");
    }
}
