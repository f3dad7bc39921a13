//! JSON-lines store client. One request per line out, one reply per line
//! back, over a single TCP connection that lives as long as the view does.

use anyhow::anyhow;
use async_trait::async_trait;
use clipview_core::{Record, RecordsQuery, SearchQuery, SearchSummary, StoreClient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("store connection lost")]
    Disconnected,
    /// The store answered but refused the request; the payload is its
    /// reason, shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("malformed store reply: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Request {
    Records {
        number: usize,
        offset: usize,
        direction: clipview_core::Direction,
    },
    Search {
        query: String,
        length: usize,
    },
    #[serde(rename = "searchbody")]
    SearchBody {
        index: usize,
    },
    Add {
        record: Record,
    },
    Remove {
        guid: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct Response<T> {
    ok: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

struct Io {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Client for the record store. The connection doubles as the
/// single-instance signal: the store accepts one manager at a time, so a
/// refused connect means another view is already open.
pub struct RemoteStore {
    io: tokio::sync::Mutex<Io>,
}

impl RemoteStore {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, RemoteError> {
        let stream = TcpStream::connect(addr).await?;
        let (read, writer) = stream.into_split();
        Ok(Self {
            io: tokio::sync::Mutex::new(Io {
                reader: BufReader::new(read),
                writer,
            }),
        })
    }

    async fn call<T: DeserializeOwned>(&self, req: Request) -> Result<Option<T>, RemoteError> {
        let mut io = self.io.lock().await;
        let mut line = serde_json::to_vec(&req)?;
        line.push(b'\n');
        io.writer.write_all(&line).await?;
        io.writer.flush().await?;

        let mut reply = String::new();
        if io.reader.read_line(&mut reply).await? == 0 {
            return Err(RemoteError::Disconnected);
        }
        let resp: Response<T> = serde_json::from_str(&reply)?;
        if resp.ok {
            Ok(resp.data)
        } else {
            Err(RemoteError::Rejected(
                resp.error.unwrap_or_else(|| "store error".to_string()),
            ))
        }
    }
}

#[async_trait]
impl StoreClient for RemoteStore {
    async fn records(&self, query: RecordsQuery) -> anyhow::Result<Vec<Record>> {
        let page: Option<Vec<Record>> = self
            .call(Request::Records {
                number: query.number,
                offset: query.offset,
                direction: query.direction,
            })
            .await?;
        Ok(page.unwrap_or_default())
    }

    async fn search(&self, query: SearchQuery) -> anyhow::Result<Option<SearchSummary>> {
        Ok(self
            .call(Request::Search {
                query: query.query,
                length: query.length,
            })
            .await?)
    }

    async fn search_body(&self, index: usize) -> anyhow::Result<Record> {
        self.call(Request::SearchBody { index })
            .await?
            .ok_or_else(|| anyhow!("store reply carried no record"))
    }

    async fn add(&self, record: Record) -> anyhow::Result<()> {
        self.call::<serde_json::Value>(Request::Add { record }).await?;
        Ok(())
    }

    async fn remove(&self, guid: &str) -> anyhow::Result<()> {
        self.call::<serde_json::Value>(Request::Remove {
            guid: guid.to_string(),
        })
        .await?;
        Ok(())
    }
}
