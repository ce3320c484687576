use crate::error::StoreError;
use crate::store::{StoreClient, StoreStat};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use zookeeper_client as zk;

/// [`StoreClient`] backed by a single ZooKeeper session.
///
/// The underlying client pipelines concurrent requests over its session, so
/// one handle is shared by every filesystem request.
#[derive(Clone)]
pub struct ZkStore {
    client: zk::Client,
}

impl ZkStore {
    pub async fn connect(endpoints: &[String], timeout: Duration) -> Result<Self, StoreError> {
        let cluster = endpoints.join(",");
        let connected = tokio::time::timeout(timeout, zk::Client::connect(&cluster)).await;
        let client = match connected {
            Ok(Ok(client)) => client,
            Ok(Err(err)) => {
                return Err(StoreError::Connect {
                    endpoints: cluster,
                    source: Box::new(err),
                });
            }
            Err(_) => {
                return Err(StoreError::ConnectTimeout {
                    endpoints: cluster,
                    timeout,
                });
            }
        };
        Ok(Self { client })
    }
}

fn store_error(path: &str, err: zk::Error) -> StoreError {
    match err {
        zk::Error::NoNode => StoreError::NoNode(path.to_string()),
        other => StoreError::Request {
            path: path.to_string(),
            source: Box::new(other),
        },
    }
}

fn store_stat(stat: &zk::Stat) -> StoreStat {
    StoreStat {
        data_length: stat.data_length.max(0) as u64,
        mtime_millis: stat.mtime,
    }
}

#[async_trait]
impl StoreClient for ZkStore {
    async fn get(&self, path: &str) -> Result<(Bytes, StoreStat), StoreError> {
        let (data, stat) = self
            .client
            .get_data(path)
            .await
            .map_err(|err| store_error(path, err))?;
        Ok((Bytes::from(data), store_stat(&stat)))
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.client
            .list_children(path)
            .await
            .map_err(|err| store_error(path, err))
    }
}
