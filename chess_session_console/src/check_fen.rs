use anyhow::anyhow;
use chess_session::board::BoardStatus;
use chess_session::fen::{board_to_fen, fen_to_board};


pub fn run(fen: &str) -> anyhow::Result<()> {
    let board = fen_to_board(fen).map_err(|err| anyhow!("Invalid FEN: {}", err))?;
    println!("{}", board_to_fen(&board));
    println!("{:?} to move", board.active_force());
    match board.status() {
        BoardStatus::Active if board.is_check() => println!("Check"),
        BoardStatus::Active => {}
        BoardStatus::Checkmate { winner } => println!("Checkmate, {:?} wins", winner),
        BoardStatus::Stalemate => println!("Stalemate"),
    }
    Ok(())
}
