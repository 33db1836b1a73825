// TODO: The server mixes a blocking event channel with async connection handlers. Consider moving
//   the event loop to an async task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use anyhow::{Context, anyhow};
use async_tungstenite::WebSocketStream;
use chess_session::event::ServerEvent;
use chess_session::fen::fen_to_board;
use chess_session::rules_oracle::ChessRulesOracle;
use chess_session::server::*;
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::StreamExt;
use log::{error, info, warn};
use prometheus::Encoder;
use tide::StatusCode;
use tungstenite::handshake::derive_accept_key;
use tungstenite::protocol;

use crate::network::{self, CommunicationError};
use crate::server_config::{AllowedOrigin, ServerConfig};


// Reports a client's departure. Either half of the connection may notice it first; only the
// first call does anything and gets the logging id back.
#[derive(Clone)]
struct ClientRemover {
    client_id: ClientId,
    clients: Arc<Clients>,
    tx: mpsc::SyncSender<IncomingEvent>,
    removed: Arc<AtomicBool>,
}

impl ClientRemover {
    fn new(
        client_id: ClientId, clients: Arc<Clients>, tx: mpsc::SyncSender<IncomingEvent>,
    ) -> Self {
        ClientRemover {
            client_id,
            clients,
            tx,
            removed: Arc::new(AtomicBool::new(false)),
        }
    }

    // `Disconnected` is queued while the client is still listed, so a connection accepted after
    // this point has its `Connected` processed after the role is freed.
    fn remove(&self) -> Option<String> {
        if self.removed.swap(true, Ordering::SeqCst) {
            return None;
        }
        let _ = self.tx.send(IncomingEvent::Disconnected(self.client_id));
        self.clients.remove_client(self.client_id)
    }
}

async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin + Send + 'static>(
    peer_addr: String, stream: WebSocketStream<S>, tx: mpsc::SyncSender<IncomingEvent>,
    clients: Arc<Clients>,
) {
    let (mut stream_tx, mut stream_rx) = stream.split();
    info!("Client connected: {}", peer_addr);

    let (client_tx, client_rx) = async_std::channel::unbounded::<ServerEvent>();
    let client_id = clients.add_client(client_tx, peer_addr);

    let remover = ClientRemover::new(client_id, clients, tx.clone());
    let remover_on_read = remover.clone();

    if tx.send(IncomingEvent::Connected(client_id)).is_err() {
        error!("Event loop is gone, dropping client {:?}", client_id);
        remover.remove();
        return;
    }

    async_std::task::spawn(async move {
        loop {
            match network::read_obj_async(&mut stream_rx).await {
                Ok(event) => {
                    if tx.send(IncomingEvent::Network(client_id, event)).is_err() {
                        error!("Event loop is gone, dropping client {:?}", client_id);
                        remover_on_read.remove();
                        break;
                    }
                }
                Err(err) => {
                    if let Some(logging_id) = remover_on_read.remove() {
                        match err {
                            CommunicationError::ConnectionClosed => {
                                info!("Client {} disconnected", logging_id);
                            }
                            err => warn!("Client {} disconnected due to read error: {}", logging_id, err),
                        }
                    }
                    break;
                }
            }
        }
    });

    // Ends when the client is removed: that drops the only sender of `client_rx`.
    while let Ok(event) = client_rx.recv().await {
        if let Err(err) = network::write_obj_async(&mut stream_tx, &event).await {
            if let Some(logging_id) = remover.remove() {
                warn!("Client {} disconnected due to write error: {}", logging_id, err);
            }
            break;
        }
    }
}

pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    let oracle = match &config.starting_position {
        None => ChessRulesOracle::new(),
        Some(fen) => {
            let board = fen_to_board(fen)
                .map_err(|err| anyhow!("Invalid starting position \"{}\": {}", fen, err))?;
            ChessRulesOracle::with_starting_position(board)
        }
    };

    let (tx, rx) = mpsc::sync_channel(100_000);
    let clients = Arc::new(Clients::new());

    let clients_copy = Arc::clone(&clients);
    thread::spawn(move || {
        let mut server_state = ServerState::new(clients_copy, oracle);
        for event in rx {
            server_state.apply_event(event);
        }
        panic!("Unexpected end of events stream");
    });

    run_tide(config, clients, tx)
}

fn run_tide(
    config: ServerConfig, clients: Arc<Clients>, tx: mpsc::SyncSender<IncomingEvent>,
) -> anyhow::Result<()> {
    let mut app = tide::new();

    app.with(tide::utils::After(|mut res: tide::Response| async {
        if let Some(err) = res.error() {
            let msg = format!("Error: {}", err);
            res.set_status(err.status());
            res.set_body(msg);
        }
        Ok(res)
    }));

    app.at("/dyn/metrics").get(handle_metrics);

    let allowed_origin = config.allowed_origin;
    app.at("/").get(move |req: tide::Request<()>| {
        let mytx = tx.clone();
        let myclients = Arc::clone(&clients);
        let allowed_origin = allowed_origin.clone();
        async move {
            // Websockets are not covered by the same-origin policy, so browsers rely on us.
            check_origin(&req, &allowed_origin)?;
            let peer_addr = req.peer_addr().map_or_else(
                || Err(tide::Error::from_str(StatusCode::Forbidden, "Peer address missing")),
                |x| Ok(x.to_owned()),
            )?;

            let mut response = upgrade_response(&req)?;
            // http_types::Response gives us the stream back once the upgrade is complete.
            let upgrade_receiver = response.recv_upgrade().await;

            async_std::task::spawn(async move {
                if let Some(stream) = upgrade_receiver.await {
                    let stream =
                        WebSocketStream::from_raw_socket(stream, protocol::Role::Server, None)
                            .await;
                    handle_connection(peer_addr, stream, mytx, myclients).await;
                } else {
                    error!("Never received an upgrade for client {}", peer_addr);
                }
            });
            Ok(response)
        }
    });

    info!("Listening on {}", config.listen_address);
    async_std::task::block_on(app.listen(config.listen_address))
        .context("Failed to run the server")?;
    Ok(())
}

fn header_value(req: &tide::Request<()>, name: &'static str) -> Option<String> {
    req.header(name).map(|values| values.last().as_str().to_owned())
}

fn check_origin(req: &tide::Request<()>, allowed_origin: &AllowedOrigin) -> tide::Result<()> {
    let origin = header_value(req, "Origin");
    if allowed_origin.allows(origin.as_deref()) {
        Ok(())
    } else {
        Err(tide::Error::from_str(
            StatusCode::Forbidden,
            format!("Origin {:?} is not allowed", origin),
        ))
    }
}

fn upgrade_response(req: &tide::Request<()>) -> tide::Result<http_types::Response> {
    let is_websocket = header_value(req, "Upgrade")
        .is_some_and(|upgrade| upgrade.eq_ignore_ascii_case("websocket"));
    let key = header_value(req, "Sec-WebSocket-Key");
    let (true, Some(key)) = (is_websocket, key) else {
        return Err(tide::Error::from_str(
            StatusCode::BadRequest,
            "Expected a websocket upgrade request",
        ));
    };
    let mut response = http_types::Response::new(StatusCode::SwitchingProtocols);
    response.insert_header("Upgrade", "websocket");
    response.insert_header("Connection", "Upgrade");
    response.insert_header("Sec-WebSocket-Accept", derive_accept_key(key.as_bytes()));
    Ok(response)
}

async fn handle_metrics(_req: tide::Request<()>) -> tide::Result {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|err| tide::Error::new(StatusCode::InternalServerError, err))?;
    let body = String::from_utf8(buffer)?;
    let mut resp = tide::Response::new(StatusCode::Ok);
    resp.set_body(body);
    Ok(resp)
}
