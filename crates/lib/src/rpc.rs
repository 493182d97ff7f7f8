//! A length-prefixed JSON RPC server/client over `Store`.
//!
//! Grounded on `rpcserver/{server,client}.py`: a 4-byte little-endian
//! length prefix followed by a UTF-8 JSON payload, a thread per connection
//! (`ThreadingMixIn` there, `thread::spawn` here — the teacher's dependency
//! stack carries no async runtime, so this stays on `std::net` rather than
//! reaching for one just for this optional collaborator), and the same
//! request/response shape: `{"id", "action", "params"}` in, `{"id",
//! "result"}` or `{"id", "error": {"type", "args"}}` out.
//!
//! `action` dispatches directly to the matching `Store` method; `params` is
//! whatever that method needs, shipped as data because `QueryFunc`/`Change`
//! etc. derive `Serialize`/`Deserialize` (see `ast.rs`, `mutator.rs`).

use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    sync::Arc,
    thread,
};

use serde::Deserialize;

use crate::{
    ast::QueryFunc,
    error::{Error, Result},
    mutator::Change,
    path::PathBuf,
    store::Store,
    value::Value,
};

fn read_frame(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

fn write_frame(stream: &mut TcpStream, bytes: &[u8]) -> Result<()> {
    stream.write_all(&(bytes.len() as u32).to_le_bytes())?;
    stream.write_all(bytes)?;
    Ok(())
}

/// Accepts connections and serves `Store` operations, one thread per
/// connection.
pub struct RpcServer {
    listener: TcpListener,
    store: Arc<Store>,
}

impl RpcServer {
    pub fn bind(addr: impl ToSocketAddrs, store: Arc<Store>) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(RpcServer { listener, store })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `accept` itself errors (e.g. the listener
    /// was closed), spawning one thread per connection.
    pub fn serve_forever(&self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept()?;
            tracing::info!(%peer, "accepted RPC connection");
            let store = Arc::clone(&self.store);
            thread::spawn(move || handle_connection(stream, store));
        }
    }
}

fn handle_connection(mut stream: TcpStream, store: Arc<Store>) {
    loop {
        let request_bytes = match read_frame(&mut stream) {
            Ok(b) => b,
            Err(_) => return,
        };
        let request: serde_json::Value = match serde_json::from_slice(&request_bytes) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "malformed RPC request");
                continue;
            }
        };
        let id = request.get("id").cloned().unwrap_or(serde_json::Value::Null);
        let action = request.get("action").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = request.get("params").cloned().unwrap_or(serde_json::Value::Null);

        tracing::debug!(%action, "handling RPC request");
        let response = match dispatch(&store, &action, params) {
            Ok(result) => serde_json::json!({"id": id, "result": result}),
            Err(e) => {
                tracing::warn!(error = %e, "RPC action failed");
                serde_json::json!({"id": id, "error": {"type": error_kind(&e), "args": [e.to_string()]}})
            }
        };

        let bytes = match serde_json::to_vec(&response) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode RPC response");
                return;
            }
        };
        if let Err(e) = write_frame(&mut stream, &bytes) {
            tracing::warn!(error = %e, "failed to write RPC response");
            return;
        }
    }
}

#[derive(Deserialize)]
struct SelectParams {
    qf: QueryFunc,
    #[serde(default)]
    subpath: Option<PathBuf>,
}

#[derive(Deserialize)]
struct InsertParams {
    path: PathBuf,
    value: Value,
    #[serde(default)]
    append: bool,
    #[serde(default)]
    overwrite: bool,
}

#[derive(Deserialize)]
struct RemoveParams {
    qf: QueryFunc,
    #[serde(default)]
    subpath: Option<PathBuf>,
}

#[derive(Deserialize)]
struct UpdateParams {
    qf: QueryFunc,
    changes: Vec<Change>,
    #[serde(default)]
    subpath: Option<PathBuf>,
}

fn dispatch(store: &Store, action: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    match action {
        "select" => {
            let p: SelectParams = serde_json::from_value(params)?;
            let results = store.select(&p.qf, p.subpath.as_ref())?;
            Ok(serde_json::to_value(results)?)
        }
        "insert" => {
            let p: InsertParams = serde_json::from_value(params)?;
            store.insert(&p.path, p.value, p.append, p.overwrite)?;
            Ok(serde_json::Value::Null)
        }
        "remove" => {
            let p: RemoveParams = serde_json::from_value(params)?;
            store.remove(&p.qf, p.subpath.as_ref())?;
            Ok(serde_json::Value::Null)
        }
        "update" => {
            let p: UpdateParams = serde_json::from_value(params)?;
            store.update(&p.qf, &p.changes, p.subpath.as_ref())?;
            Ok(serde_json::Value::Null)
        }
        "commit" => {
            store.commit()?;
            Ok(serde_json::Value::Null)
        }
        "rollback" => {
            store.rollback()?;
            Ok(serde_json::Value::Null)
        }
        other => Err(Error::Rpc {
            kind: "UnknownAction".to_string(),
            message: other.to_string(),
        }),
    }
}

fn error_kind(e: &Error) -> &'static str {
    match e {
        Error::PathNotFound { .. } => "PathNotFound",
        Error::NotIterable { .. } => "NotIterable",
        Error::OpError { .. } => "OpError",
        Error::UnknownOp(_) => "UnknownOp",
        Error::TypeRejected => "TypeRejected",
        Error::PathConflict { .. } => "PathConflict",
        Error::NotAList { .. } => "NotAList",
        Error::RemovalOfNonTreeValue => "RemovalOfNonTreeValue",
        Error::MalformedDo => "MalformedDo",
        Error::OutOfFuel => "OutOfFuel",
        Error::InconsistentData { .. } => "InconsistentData",
        Error::Io(_) => "IoError",
        Error::Json(_) => "JsonError",
        Error::Rpc { .. } => "RpcError",
    }
}

/// A connection to a remote `RpcServer`, exposing the same operations as
/// `Store`.
pub struct RpcClient {
    stream: TcpStream,
    next_id: u64,
}

impl RpcClient {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(RpcClient { stream, next_id: 0 })
    }

    pub fn select(&mut self, qf: &QueryFunc, subpath: Option<&PathBuf>) -> Result<Vec<Value>> {
        let params = serde_json::json!({"qf": qf, "subpath": subpath});
        let result = self.call("select", params)?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn insert(&mut self, path: &PathBuf, value: Value, append: bool, overwrite: bool) -> Result<()> {
        let params = serde_json::json!({
            "path": path,
            "value": value,
            "append": append,
            "overwrite": overwrite,
        });
        self.call("insert", params)?;
        Ok(())
    }

    pub fn remove(&mut self, qf: &QueryFunc, subpath: Option<&PathBuf>) -> Result<()> {
        let params = serde_json::json!({"qf": qf, "subpath": subpath});
        self.call("remove", params)?;
        Ok(())
    }

    pub fn update(&mut self, qf: &QueryFunc, changes: &[Change], subpath: Option<&PathBuf>) -> Result<()> {
        let params = serde_json::json!({"qf": qf, "changes": changes, "subpath": subpath});
        self.call("update", params)?;
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.call("commit", serde_json::Value::Null)?;
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.call("rollback", serde_json::Value::Null)?;
        Ok(())
    }

    fn call(&mut self, action: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        self.next_id += 1;
        let request = serde_json::json!({"id": self.next_id, "action": action, "params": params});
        let bytes = serde_json::to_vec(&request)?;
        write_frame(&mut self.stream, &bytes)?;

        let response_bytes = read_frame(&mut self.stream)?;
        let response: serde_json::Value = serde_json::from_slice(&response_bytes)?;

        if let Some(result) = response.get("result") {
            return Ok(result.clone());
        }
        if let Some(error) = response.get("error") {
            let kind = error.get("type").and_then(|v| v.as_str()).unwrap_or("Unknown").to_string();
            let message = error.get("args").map(|v| v.to_string()).unwrap_or_default();
            return Err(Error::Rpc { kind, message });
        }
        Err(Error::Rpc {
            kind: "MalformedResponse".to_string(),
            message: response.to_string(),
        })
    }
}
