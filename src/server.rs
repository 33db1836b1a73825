use std::collections::{HashMap, hash_map};
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use log::{debug, info};
use prometheus::{IntCounter, IntGauge, register_int_counter, register_int_gauge};

use crate::board::TurnInput;
use crate::event::{ClientEvent, ServerEvent};
use crate::registry::ConnectionRegistry;
use crate::role::Participant;
use crate::rules_oracle::RulesOracle;
use crate::session::SessionState;


lazy_static! {
    static ref CLIENTS_GAUGE: IntGauge =
        register_int_gauge!("clients", "Number of connected clients.").unwrap();
    static ref TURNS_ACCEPTED_COUNTER: IntCounter =
        register_int_counter!("turns_accepted", "Turns applied to the session.").unwrap();
    static ref TURNS_REJECTED_COUNTER: IntCounter =
        register_int_counter!("turns_rejected", "Turns refused by the rules.").unwrap();
    static ref TURNS_IGNORED_COUNTER: IntCounter = register_int_counter!(
        "turns_ignored",
        "Turns dropped because the sender was not the side to move."
    )
    .unwrap();
}


#[derive(Debug)]
pub enum IncomingEvent {
    // Must be sent before any `Network` event from the same client.
    Connected(ClientId),
    Network(ClientId, ClientEvent),
    Disconnected(ClientId),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionPhase {
    Unassigned,
    AwaitingSecondPlayer,
    Active,
}


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClientId(pub u64);

pub struct Client {
    events_tx: async_std::channel::Sender<ServerEvent>,
    logging_id: String,
}

impl Client {
    // Fire-and-forget: if the receiver is gone, the client is being removed anyway.
    fn send(&self, event: ServerEvent) { let _ = self.events_tx.try_send(event); }
}

pub struct Clients {
    map: Mutex<HashMap<ClientId, Client>>,
}

impl Clients {
    pub fn new() -> Self { Clients { map: Mutex::new(HashMap::new()) } }

    pub fn add_client(
        &self, events_tx: async_std::channel::Sender<ServerEvent>, logging_id: String,
    ) -> ClientId {
        let client = Client { events_tx, logging_id };
        let mut map = self.map.lock().unwrap();
        loop {
            let id = ClientId(rand::random::<u64>());
            match map.entry(id) {
                hash_map::Entry::Occupied(_) => {}
                hash_map::Entry::Vacant(e) => {
                    e.insert(client);
                    CLIENTS_GAUGE.inc();
                    return id;
                }
            }
        }
    }

    // Returns the client's logging id if it was still registered. Since only one caller can
    // get `Some`, the result tells whether the caller is responsible for reporting the removal.
    pub fn remove_client(&self, id: ClientId) -> Option<String> {
        let client = self.map.lock().unwrap().remove(&id)?;
        CLIENTS_GAUGE.dec();
        Some(client.logging_id)
    }

    pub fn len(&self) -> usize { self.map.lock().unwrap().len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn logging_id(&self, id: ClientId) -> String {
        match self.map.lock().unwrap().get(&id) {
            Some(client) => client.logging_id.clone(),
            None => format!("{:?}", id),
        }
    }

    fn send(&self, id: ClientId, event: ServerEvent) {
        if let Some(client) = self.map.lock().unwrap().get(&id) {
            client.send(event);
        }
    }

    fn broadcast(&self, event: &ServerEvent) {
        for client in self.map.lock().unwrap().values() {
            client.send(event.clone());
        }
    }
}


// Owns everything that changes while the server runs. Meant to live on a single thread that
// handles incoming events one by one, so none of the session data needs locking.
pub struct ServerState<O: RulesOracle<Action = TurnInput>> {
    clients: Arc<Clients>,
    oracle: O,
    session: SessionState<O::Position>,
    registry: ConnectionRegistry,
}

impl<O: RulesOracle<Action = TurnInput>> ServerState<O> {
    pub fn new(clients: Arc<Clients>, oracle: O) -> Self {
        let session = SessionState::new(&oracle);
        ServerState {
            clients,
            oracle,
            session,
            registry: ConnectionRegistry::new(),
        }
    }

    pub fn oracle(&self) -> &O { &self.oracle }
    pub fn session(&self) -> &SessionState<O::Position> { &self.session }
    pub fn registry(&self) -> &ConnectionRegistry { &self.registry }

    pub fn phase(&self) -> SessionPhase {
        match self.registry.num_players() {
            0 => SessionPhase::Unassigned,
            1 => SessionPhase::AwaitingSecondPlayer,
            _ => SessionPhase::Active,
        }
    }

    pub fn apply_event(&mut self, event: IncomingEvent) {
        match event {
            IncomingEvent::Connected(client_id) => self.process_connected(client_id),
            IncomingEvent::Disconnected(client_id) => self.process_disconnected(client_id),
            IncomingEvent::Network(client_id, event) => match event {
                ClientEvent::MakeTurn { turn_input } => {
                    self.process_make_turn(client_id, turn_input)
                }
                ClientEvent::RequestState => self.send_state(client_id),
                ClientEvent::Ping => self.clients.send(client_id, ServerEvent::Pong),
            },
        }
    }

    fn process_connected(&mut self, client_id: ClientId) {
        let participant = self.registry.assign_role(client_id);
        let logging_id = self.clients.logging_id(client_id);
        match participant {
            Participant::Player(force) => {
                info!("Client {} plays {:?}; session is {:?}", logging_id, force, self.phase());
                self.clients.send(client_id, ServerEvent::RoleAssigned { force });
            }
            Participant::Observer => {
                info!("Client {} is observing", logging_id);
                self.clients.send(client_id, ServerEvent::ObserverAssigned);
            }
        }
        self.send_state(client_id);
    }

    fn process_disconnected(&mut self, client_id: ClientId) {
        // The client has already been removed from `clients`, so no logging id here.
        if let Some(force) = self.registry.release_role(client_id) {
            info!(
                "{:?} left by client {:?}; session is {:?}",
                force,
                client_id,
                self.phase()
            );
        }
    }

    fn process_make_turn(&mut self, client_id: ClientId, turn_input: TurnInput) {
        let participant = self.registry.role_of(client_id);
        let mover = match participant {
            Participant::Player(force) if force == self.session.turn() => force,
            _ => {
                debug!(
                    "Ignoring turn {:?} from {:?} ({:?}): {:?} to move",
                    turn_input,
                    client_id,
                    participant,
                    self.session.turn()
                );
                TURNS_IGNORED_COUNTER.inc();
                return;
            }
        };
        match self.oracle.validate(self.session.position(), &turn_input) {
            Err(err) => {
                info!("Turn {:?} by {:?} rejected: {:?}", turn_input, mover, err);
                TURNS_REJECTED_COUNTER.inc();
                self.clients.send(client_id, ServerEvent::TurnRejected { turn_input });
            }
            Ok(accepted) => {
                let capture = self.session.apply_accepted(&self.oracle, mover, accepted);
                info!("Turn {:?} by {:?} accepted", turn_input, mover);
                TURNS_ACCEPTED_COUNTER.inc();
                self.clients.broadcast(&ServerEvent::TurnAccepted { turn_input });
                self.clients.broadcast(&self.position_event());
                if capture.is_some() {
                    self.clients.broadcast(&self.scores_event());
                }
            }
        }
    }

    fn send_state(&self, client_id: ClientId) {
        self.clients.send(client_id, self.position_event());
        self.clients.send(client_id, self.scores_event());
    }

    fn position_event(&self) -> ServerEvent {
        ServerEvent::PositionUpdated {
            fen: self.oracle.position_to_string(self.session.position()),
        }
    }

    fn scores_event(&self) -> ServerEvent {
        ServerEvent::ScoresUpdated { scores: self.session.scores().clone() }
    }
}
