// Improvement potential: Switch from JSON to a binary format.

use std::net::TcpStream;
use std::{fmt, io};

use async_tungstenite::WebSocketStream;
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Serialize, de};
use tungstenite::protocol::Role;
use tungstenite::{Message, WebSocket};


pub const PORT: u16 = 38617;


#[derive(Debug)]
pub enum CommunicationError {
    Socket(tungstenite::Error),
    Serde(serde_json::Error),
    UnexpectedMessage(String),
    ConnectionClosed,
}

impl fmt::Display for CommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationError::Socket(err) => write!(f, "socket error: {}", err),
            CommunicationError::Serde(err) => write!(f, "cannot parse message: {}", err),
            CommunicationError::UnexpectedMessage(msg) => write!(f, "unexpected message: {}", msg),
            CommunicationError::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for CommunicationError {}

fn socket_error(err: tungstenite::Error) -> CommunicationError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            CommunicationError::ConnectionClosed
        }
        err => CommunicationError::Socket(err),
    }
}

fn serialize<T: Serialize>(obj: &T) -> Result<Message, CommunicationError> {
    let serialized = serde_json::to_string(obj).map_err(CommunicationError::Serde)?;
    Ok(Message::Text(serialized.into()))
}

// Returns `None` for control frames that carry no payload for us.
fn deserialize<T: de::DeserializeOwned>(msg: Message) -> Option<Result<T, CommunicationError>> {
    match msg {
        Message::Text(text) => Some(serde_json::from_str(&text).map_err(CommunicationError::Serde)),
        Message::Close(_) => Some(Err(CommunicationError::ConnectionClosed)),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
        Message::Binary(_) => Some(Err(CommunicationError::UnexpectedMessage(
            "expected text, got binary".to_owned(),
        ))),
    }
}

pub fn write_obj<T, S>(socket: &mut WebSocket<S>, obj: &T) -> Result<(), CommunicationError>
where
    T: Serialize,
    S: io::Read + io::Write,
{
    socket.send(serialize(obj)?).map_err(socket_error)
}

pub fn read_obj<T, S>(socket: &mut WebSocket<S>) -> Result<T, CommunicationError>
where
    T: de::DeserializeOwned,
    S: io::Read + io::Write,
{
    loop {
        let msg = socket.read().map_err(socket_error)?;
        if let Some(result) = deserialize(msg) {
            return result;
        }
    }
}

pub async fn write_obj_async<T, S>(
    stream: &mut SplitSink<WebSocketStream<S>, Message>, obj: &T,
) -> Result<(), CommunicationError>
where
    T: Serialize,
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.send(serialize(obj)?).await.map_err(socket_error)
}

pub async fn read_obj_async<T, S>(
    stream: &mut SplitStream<WebSocketStream<S>>,
) -> Result<T, CommunicationError>
where
    T: de::DeserializeOwned,
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let msg = stream
            .next()
            .await
            .ok_or(CommunicationError::ConnectionClosed)?
            .map_err(socket_error)?;
        if let Some(result) = deserialize(msg) {
            return result;
        }
    }
}

// TODO: Instead of cloning the socket, consider calling TcpStream.set_nonblocking on the
//   underlying stream and doing read/writes in the same thread.
pub fn clone_websocket(socket: &WebSocket<TcpStream>, role: Role) -> io::Result<WebSocket<TcpStream>> {
    let stream = socket.get_ref().try_clone()?;
    let config = *socket.get_config();
    Ok(WebSocket::from_raw_socket(stream, role, Some(config)))
}
