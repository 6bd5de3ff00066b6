//! Kiosk loop: pull a card in, read its ID, hand it back
//!
//! Runs `K720_CYCLES` rounds (default 1).

use std::thread::sleep;
use std::time::Duration;

use k720::{CardReply, CardTechnology, Dispenser, Position};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Sensor polls per round before giving up on the card
const MAX_POLLS: usize = 20;

fn main() -> k720::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("K720_PORT").unwrap_or_else(|_| "/dev/ttyS0".to_string());
    let address = std::env::var("K720_ADDRESS")
        .ok()
        .and_then(|a| a.parse().ok())
        .unwrap_or(k720_core::constants::DEFAULT_ADDRESS);
    let cycles: usize = std::env::var("K720_CYCLES")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(1);

    let mut dispenser = Dispenser::open(port, address)?;
    dispenser.reset()?;

    for cycle in 1..=cycles {
        info!("Cycle {}/{}", cycle, cycles);
        dispenser.move_to(Position::Outside)?;

        let mut at_reader = false;
        for _ in 0..MAX_POLLS {
            match dispenser.sensor_state() {
                Ok(state) if state.card_at_reader() => {
                    at_reader = true;
                    break;
                }
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Sensor query failed: {}", e);
                    dispenser.clear_input()?;
                }
                Err(e) => return Err(e),
            }

            dispenser.move_to(Position::FrontEnter)?;
            dispenser.move_to(Position::CardRead)?;
            sleep(Duration::from_millis(500));
        }

        if !at_reader {
            warn!("No card reached the reader");
            continue;
        }

        let reply = CardReply::parse(dispenser.get_card_id(CardTechnology::S50)?)?;
        match reply.card_id_hex() {
            Some(id) => println!("Card ID: {}", id),
            None => println!("Card not read ({})", reply),
        }

        dispenser.move_to(Position::TakeCard)?;
    }

    dispenser.close()?;
    Ok(())
}
