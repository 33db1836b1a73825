// Improvement potential: Interactive board with cursor selection instead of typed moves.

use std::io::{self, BufRead};
use std::net::TcpStream;
use std::thread;

use anyhow::{Context, anyhow};
use chess_session::board::{Board, BoardStatus, TurnInput};
use chess_session::coord::{Col, Coord, Row};
use chess_session::event::{ClientEvent, ServerEvent};
use chess_session::fen::fen_to_board;
use chess_session::piece::piece_to_ascii;
use chess_session::role::Force;
use chess_session::scores::Scores;
use lazy_static::lazy_static;
use log::error;
use regex_lite::Regex;
use strum::IntoEnumIterator;
use tungstenite::protocol;
use url::Url;

use crate::network::{self, CommunicationError};


lazy_static! {
    static ref DRAG_RE: Regex = Regex::new(r"^([a-h][1-8])([a-h][1-8])([nbrqNBRQ])?$").unwrap();
}

pub struct ClientConfig {
    pub server_address: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum Command {
    Send(ClientEvent),
    Quit,
    Nothing,
}

// "e2e4" and "e7e8q" are drag-and-drop turns, everything else is algebraic notation.
fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Nothing,
        "quit" | "exit" => Command::Quit,
        "state" => Command::Send(ClientEvent::RequestState),
        "ping" => Command::Send(ClientEvent::Ping),
        _ => {
            let turn_input = match DRAG_RE.captures(line) {
                Some(cap) => TurnInput::DragDrop {
                    from: cap[1].to_owned(),
                    to: cap[2].to_owned(),
                    promotion: cap.get(3).map(|m| m.as_str().to_lowercase()),
                },
                None => TurnInput::Algebraic(line.to_owned()),
            };
            Command::Send(ClientEvent::MakeTurn { turn_input })
        }
    }
}

fn render_board(board: &Board) -> String {
    let mut s = String::new();
    for row in Row::all().rev() {
        s.push(row.to_algebraic());
        s.push(' ');
        for col in Col::all() {
            s.push(match board.grid()[Coord::new(row, col)] {
                Some(piece) => piece_to_ascii(piece.kind, piece.force),
                None => '.',
            });
        }
        s.push('\n');
    }
    s.push_str("  ");
    s.extend(Col::all().map(|col| col.to_algebraic()));
    s
}

// Captured pieces are listed under the side that took them.
fn render_scores(scores: &Scores) -> String {
    Force::iter()
        .map(|force| {
            let captures: String = scores.captures[force]
                .iter()
                .map(|capture| piece_to_ascii(capture.kind, capture.force))
                .collect();
            format!("{:?} {}: {}", force, scores.score[force], captures)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn print_position(fen: &str) {
    let board = match fen_to_board(fen) {
        Ok(board) => board,
        Err(err) => {
            error!("Server sent an invalid position \"{}\": {}", fen, err);
            return;
        }
    };
    println!("{}", render_board(&board));
    match board.status() {
        BoardStatus::Active => {
            let check = if board.is_check() { " (check)" } else { "" };
            println!("{:?} to move{}", board.active_force(), check);
        }
        BoardStatus::Checkmate { winner } => println!("Checkmate, {:?} wins", winner),
        BoardStatus::Stalemate => println!("Stalemate"),
    }
}

fn print_event(event: &ServerEvent) {
    match event {
        ServerEvent::RoleAssigned { force } => println!("You play {:?}", force),
        ServerEvent::ObserverAssigned => println!("Both sides are taken, you are observing"),
        ServerEvent::TurnAccepted { turn_input } => println!("Turn accepted: {:?}", turn_input),
        ServerEvent::PositionUpdated { fen } => print_position(fen),
        ServerEvent::ScoresUpdated { scores } => println!("{}", render_scores(scores)),
        ServerEvent::TurnRejected { turn_input } => println!("Turn rejected: {:?}", turn_input),
        ServerEvent::Pong => println!("Pong"),
    }
}

fn server_url(server_address: &str) -> anyhow::Result<Url> {
    let address = if server_address.contains("://") {
        server_address.to_owned()
    } else if server_address.contains(':') {
        format!("ws://{}", server_address)
    } else {
        format!("ws://{}:{}", server_address, network::PORT)
    };
    Url::parse(&address).with_context(|| format!("Invalid server address {}", server_address))
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let url = server_url(&config.server_address)?;
    let host = url.host_str().ok_or_else(|| anyhow!("Server address has no host"))?;
    let port = url.port().unwrap_or(network::PORT);
    let stream = TcpStream::connect((host, port))
        .with_context(|| format!("Cannot connect to {}:{}", host, port))?;
    let (mut socket_in, _) =
        tungstenite::client(url.as_str(), stream).map_err(|err| anyhow!("Handshake failed: {}", err))?;
    let mut socket_out = network::clone_websocket(&socket_in, protocol::Role::Client)?;
    println!("Connected. Type turns like \"e2e4\" or \"Nf3\", \"state\" or \"quit\".");

    thread::spawn(move || {
        loop {
            match network::read_obj::<ServerEvent, _>(&mut socket_in) {
                Ok(event) => print_event(&event),
                Err(CommunicationError::ConnectionClosed) => {
                    println!("Server closed the connection");
                    std::process::exit(0);
                }
                Err(err) => {
                    error!("Lost connection to the server: {}", err);
                    std::process::exit(1);
                }
            }
        }
    });

    for line in io::stdin().lock().lines() {
        let event = match parse_command(&line?) {
            Command::Send(event) => event,
            Command::Quit => break,
            Command::Nothing => continue,
        };
        network::write_obj(&mut socket_out, &event)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use chess_session::board::Capture;
    use chess_session::piece::PieceKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_turn(turn_input: TurnInput) -> Command {
        Command::Send(ClientEvent::MakeTurn { turn_input })
    }

    #[test]
    fn commands() {
        assert_eq!(parse_command("  "), Command::Nothing);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("state"), Command::Send(ClientEvent::RequestState));
        assert_eq!(
            parse_command("e2e4"),
            make_turn(TurnInput::DragDrop {
                from: "e2".to_owned(),
                to: "e4".to_owned(),
                promotion: None,
            })
        );
        assert_eq!(
            parse_command("e7e8N"),
            make_turn(TurnInput::DragDrop {
                from: "e7".to_owned(),
                to: "e8".to_owned(),
                promotion: Some("n".to_owned()),
            })
        );
        assert_eq!(parse_command("Nxf3 "), make_turn(TurnInput::Algebraic("Nxf3".to_owned())));
        assert_eq!(parse_command("e2e9"), make_turn(TurnInput::Algebraic("e2e9".to_owned())));
    }

    #[test]
    fn server_address_defaults_to_standard_port() {
        assert_eq!(server_url("localhost").unwrap().as_str(), "ws://localhost:38617/");
        assert_eq!(server_url("10.0.0.1:9000").unwrap().port(), Some(9000));
        assert_eq!(server_url("ws://example.org/").unwrap().as_str(), "ws://example.org/");
    }

    #[test]
    fn scores_list_captured_pieces() {
        let mut scores = Scores::new();
        assert_eq!(render_scores(&scores), "White 0:  | Black 0: ");
        let capture = |kind, force| Capture { kind, force };
        scores.record_capture(Force::White, capture(PieceKind::Pawn, Force::Black), 1);
        scores.record_capture(Force::White, capture(PieceKind::Knight, Force::Black), 3);
        scores.record_capture(Force::Black, capture(PieceKind::Queen, Force::White), 9);
        assert_eq!(render_scores(&scores), "White 4: pn | Black 9: Q");
    }

    #[test]
    fn starting_board() {
        let board = Board::new();
        assert_eq!(
            render_board(&board),
            "8 rnbqkbnr\n\
             7 pppppppp\n\
             6 ........\n\
             5 ........\n\
             4 ........\n\
             3 ........\n\
             2 PPPPPPPP\n\
             1 RNBQKBNR\n  \
             abcdefgh"
        );
    }
}
