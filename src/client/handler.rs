//! Client session handling
//!
//! Reads one JSON request per line, runs it on the blocking pool and writes
//! one JSON response line back. Uploads and downloads move their raw bytes
//! on the same connection right after the request or response line.

use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::config::ServerConfig;
use crate::error::{ProtocolError, ServerError};
use crate::protocol::{Request, Response, handle_download, handle_request, handle_upload, parse_request};
use crate::storage::SandboxRoot;
use crate::transfer::chunk_channel;

/// Upload chunks buffered between the socket and the disk writer
const UPLOAD_QUEUE_DEPTH: usize = 8;

/// Serves one client connection until it closes.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    root: Arc<SandboxRoot>,
    config: Arc<ServerConfig>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut raw = Vec::new();
    let limit = config.max_request_length as u64;

    loop {
        raw.clear();
        match (&mut reader).take(limit + 1).read_until(b'\n', &mut raw).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(n) => {
                // Enforce request length limit; the stream cannot be resynchronized.
                if n as u64 > limit && raw.last() != Some(&b'\n') {
                    let err = ServerError::from(ProtocolError::RequestTooLong(n));
                    let _ = send_response(&mut write_half, &Response::error(&err)).await;
                    break;
                }

                let line = match std::str::from_utf8(&raw) {
                    Ok(line) => line,
                    Err(e) => {
                        let err = ServerError::from(ProtocolError::MalformedRequest(format!(
                            "request is not valid UTF-8: {e}"
                        )));
                        if send_response(&mut write_half, &Response::error(&err)).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                if let Err(e) =
                    process_line(line, &mut reader, &mut write_half, &root, &config, client_addr).await
                {
                    error!("Session with {} ended: {}", client_addr, e);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    info!("Client {} disconnected", client_addr);
}

async fn process_line(
    line: &str,
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    root: &Arc<SandboxRoot>,
    config: &ServerConfig,
    client_addr: SocketAddr,
) -> io::Result<()> {
    let request = match parse_request(line) {
        Ok(request) => request,
        Err(e) => {
            return send_response(writer, &Response::error(&ServerError::from(e))).await;
        }
    };
    info!("Received from {}: {:?}", client_addr, request);

    match request {
        Request::Upload {
            path,
            filename,
            size,
        } => receive_upload(reader, writer, root, config, path, filename, size).await,
        Request::Download { path, filename } => send_download(writer, root, path, filename).await,
        other => {
            let root = Arc::clone(root);
            let outcome = tokio::task::spawn_blocking(move || handle_request(&root, other)).await;
            let response = into_response(outcome);
            if response.is_error() {
                warn!("Request from {} failed", client_addr);
            }
            send_response(writer, &response).await
        }
    }
}

async fn receive_upload(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    root: &Arc<SandboxRoot>,
    config: &ServerConfig,
    path: String,
    filename: String,
    size: u64,
) -> io::Result<()> {
    let (tx, chunks) = chunk_channel(UPLOAD_QUEUE_DEPTH);
    let task_root = Arc::clone(root);
    let task = tokio::task::spawn_blocking(move || handle_upload(&task_root, &path, &filename, chunks));

    let mut buffer = vec![0u8; config.buffer_size];
    let mut remaining = size;
    let mut forwarding = true;
    let mut client_gone = false;

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = match reader.read(&mut buffer[..want]).await {
            Ok(0) => {
                client_gone = true;
                let _ = tx
                    .send(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "client closed the connection during upload",
                    )))
                    .await;
                break;
            }
            Ok(n) => n,
            Err(e) => {
                client_gone = true;
                let _ = tx.send(Err(e)).await;
                break;
            }
        };
        remaining -= n as u64;

        // Once the writer has given up, keep draining so the next request
        // line starts at the right byte.
        if forwarding && tx.send(Ok(buffer[..n].to_vec())).await.is_err() {
            warn!("Upload writer stopped early, discarding {} bytes", remaining);
            forwarding = false;
        }
    }
    drop(tx);

    let response = into_response(task.await);
    if client_gone {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "upload payload truncated",
        ));
    }
    send_response(writer, &response).await
}

async fn send_download(
    writer: &mut OwnedWriteHalf,
    root: &Arc<SandboxRoot>,
    path: String,
    filename: String,
) -> io::Result<()> {
    let task_root = Arc::clone(root);
    let outcome =
        tokio::task::spawn_blocking(move || handle_download(&task_root, &path, &filename)).await;

    let (response, handle) = match outcome {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => return send_response(writer, &Response::error(&e)).await,
        Err(e) => return send_response(writer, &Response::error(&ServerError::from(e))).await,
    };

    send_response(writer, &response).await?;

    let file = tokio::fs::File::from_std(handle.file);
    let sent = tokio::io::copy(&mut file.take(handle.size), writer).await?;
    writer.flush().await?;

    if sent != handle.size {
        warn!(
            "Download of {} sent {} of {} bytes",
            handle.filename_ascii, sent, handle.size
        );
    }
    Ok(())
}

fn into_response<T>(outcome: Result<Result<T, ServerError>, tokio::task::JoinError>) -> Response
where
    T: Into<Response>,
{
    match outcome {
        Ok(Ok(response)) => response.into(),
        Ok(Err(e)) => Response::error(&e),
        Err(e) => Response::error(&ServerError::from(e)),
    }
}

async fn send_response(writer: &mut OwnedWriteHalf, response: &Response) -> io::Result<()> {
    writer.write_all(response.to_line().as_bytes()).await?;
    writer.flush().await
}
