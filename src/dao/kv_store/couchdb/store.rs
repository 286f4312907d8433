use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::dao::{
    kv_store::{KvStore, StorePath},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchOperation, CouchResult},
    models::{CouchValueDocument, doc_id},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Key-value store keeping one CouchDB document per store path.
#[derive(Clone)]
pub struct CouchKvStore {
    client: Client,
    database_url: Arc<str>,
    auth: Option<Arc<(String, String)>>,
}

impl CouchKvStore {
    /// Build the HTTP client without touching the network.
    pub fn new(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let database_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.database.trim_matches('/')
        );

        Ok(Self {
            client,
            database_url: database_url.into(),
            auth: config.username.zip(config.password).map(Arc::new),
        })
    }

    /// Build the client and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let store = Self::new(config)?;
        store.ensure_database().await?;
        Ok(store)
    }

    fn document_url(&self, doc_id: &str) -> String {
        format!("{}/{}", self.database_url, doc_id)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        operation: CouchOperation,
        target: &str,
    ) -> CouchResult<Response> {
        let builder = match self.auth.as_deref() {
            Some((user, password)) => builder.basic_auth(user, Some(password)),
            None => builder,
        };
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                operation,
                target: target.to_string(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.database_url.to_string();
        let response = self
            .send(self.client.get(&url), CouchOperation::CheckDatabase, &url)
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self
                    .send(self.client.put(&url), CouchOperation::CreateDatabase, &url)
                    .await?;
                // 412: created concurrently by another instance
                match created.status() {
                    status if status.is_success() || status == StatusCode::PRECONDITION_FAILED => {
                        info!(database = %url, "CouchDB database ready");
                        Ok(())
                    }
                    status => Err(CouchDaoError::Status {
                        operation: CouchOperation::CreateDatabase,
                        target: url,
                        status,
                    }),
                }
            }
            status => Err(CouchDaoError::Status {
                operation: CouchOperation::CheckDatabase,
                target: url,
                status,
            }),
        }
    }

    async fn read(&self, doc_id: &str) -> CouchResult<Option<CouchValueDocument>> {
        let response = self
            .send(
                self.client.get(self.document_url(doc_id)),
                CouchOperation::ReadDocument,
                doc_id,
            )
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchValueDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::Decode {
                    doc_id: doc_id.to_string(),
                    source,
                }),
            status => Err(CouchDaoError::Status {
                operation: CouchOperation::ReadDocument,
                target: doc_id.to_string(),
                status,
            }),
        }
    }

    /// Replace the document at `path` with `value`, carrying over its revision.
    async fn overwrite(&self, path: &StorePath, value: Value) -> CouchResult<()> {
        let id = doc_id(path);
        let rev = self.read(&id).await?.and_then(|existing| existing.rev);
        let document = CouchValueDocument::new(path, value, rev);

        let response = self
            .send(
                self.client.put(self.document_url(&id)).json(&document),
                CouchOperation::WriteDocument,
                &id,
            )
            .await?;

        match response.status() {
            status if status.is_success() => {
                debug!(doc_id = %id, "CouchDB document written");
                Ok(())
            }
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict { doc_id: id }),
            status => Err(CouchDaoError::Status {
                operation: CouchOperation::WriteDocument,
                target: id,
                status,
            }),
        }
    }
}

impl KvStore for CouchKvStore {
    fn backend(&self) -> &'static str {
        "couchdb"
    }

    fn get(&self, path: StorePath) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.read(&doc_id(&path)).await?;
            Ok(document.map(|document| document.value))
        })
    }

    fn set(&self, path: StorePath, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.overwrite(&path, value).await?) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url.to_string();
            let response = store
                .send(store.client.get(&url), CouchOperation::CheckDatabase, &url)
                .await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                status => Err(CouchDaoError::Status {
                    operation: CouchOperation::CheckDatabase,
                    target: url,
                    status,
                }
                .into()),
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.ensure_database().await?) })
    }
}
