//! Minimal telemetry consumer: accept connections and print each record.
//!
//! ```text
//! cargo run -p pinch_telemetry --example listen -- 0.0.0.0:12345
//! ```

use std::io::{BufRead, BufReader};
use std::net::TcpListener;

use pinch_telemetry::PinchEvent;

fn main() -> std::io::Result<()> {
    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:12345".to_string());
    let listener = TcpListener::bind(&addr)?;
    println!("listening on {}", addr);

    for stream in listener.incoming() {
        let stream = stream?;
        let peer = stream.peer_addr()?;
        println!("client {} connected", peer);

        for line in BufReader::new(stream).lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => { eprintln!("read error: {}", e); break; }
            };
            match serde_json::from_str::<PinchEvent>(&line) {
                Ok(ev) => println!(
                    "{:>5} {:<6} d={:.3} conf={:.2}",
                    ev.hand.label(), ev.finger.name(), ev.distance, ev.confidence
                ),
                Err(e) => eprintln!("bad record {:?}: {}", line, e),
            }
        }
        println!("client {} disconnected", peer);
    }
    Ok(())
}
