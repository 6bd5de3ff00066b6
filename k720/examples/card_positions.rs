//! Step a card through every named position, printing the sensors after each move

use std::thread::sleep;
use std::time::Duration;

use k720::{Dispenser, Position};
use tracing_subscriber::EnvFilter;

fn main() -> k720::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("K720_PORT").unwrap_or_else(|_| "/dev/ttyS0".to_string());
    let address = std::env::var("K720_ADDRESS")
        .ok()
        .and_then(|a| a.parse().ok())
        .unwrap_or(k720_core::constants::DEFAULT_ADDRESS);

    let mut dispenser = Dispenser::open(port, address)?;

    println!("Dispensing card...");
    dispenser.dispense()?;

    for position in [
        Position::CardRead,
        Position::Sensor2,
        Position::TakeCard,
        Position::FrontEnter,
    ] {
        println!("Moving to {:?} ({})", position, position);
        dispenser.move_to(position)?;
        sleep(Duration::from_secs(1));

        let state = dispenser.sensor_state()?;
        println!("  {}", state);
    }

    println!("Recycling card...");
    dispenser.recycle()?;

    dispenser.close()?;
    Ok(())
}
