//! Focus-restoration channel to the native monitor companion.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Sentinel meaning "no process to hand focus back to".
pub const NO_PROCESS: i32 = -1;

#[async_trait]
pub trait FocusChannel: Send + Sync {
    /// Ask the companion to raise `pid`; resolves once the companion acks.
    async fn restore(&self, pid: i32) -> Result<()>;
}

/// Used when no companion is configured.
#[derive(Default)]
pub struct NoFocus;

#[async_trait]
impl FocusChannel for NoFocus {
    async fn restore(&self, _pid: i32) -> Result<()> {
        Ok(())
    }
}

/// Native-messaging style framing: a 4-byte little-endian length prefix
/// followed by a JSON payload, one frame each way per request.
pub struct NativeBridge<T> {
    io: tokio::sync::Mutex<T>,
}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> NativeBridge<T> {
    pub fn new(io: T) -> Self {
        Self {
            io: tokio::sync::Mutex::new(io),
        }
    }
}

#[async_trait]
impl<T: AsyncRead + AsyncWrite + Unpin + Send> FocusChannel for NativeBridge<T> {
    async fn restore(&self, pid: i32) -> Result<()> {
        let mut io = self.io.lock().await;
        let payload = serde_json::to_vec(&json!({ "method": "focus", "pid": pid }))?;
        io.write_all(&(payload.len() as u32).to_le_bytes()).await?;
        io.write_all(&payload).await?;
        io.flush().await?;
        // one ack frame back; its content does not matter
        let mut len = [0u8; 4];
        io.read_exact(&mut len).await?;
        let mut ack = vec![0u8; u32::from_le_bytes(len) as usize];
        io.read_exact(&mut ack).await?;
        Ok(())
    }
}
