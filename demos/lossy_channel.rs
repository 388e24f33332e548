//! Sends a message through a simulated channel that drops and reorders parts, and reports how
//! many parts the decoder needed.
//!
//! Run with `RUST_LOG=fountain_lt=debug cargo run --example lossy_channel` to see the decoder's
//! session events.

use fountain_lt::{Decoder, Encoder, EncoderConfig, Part, primitives::xoshiro::Xoshiro256};
use rand::{Rng, seq::SliceRandom};
use tracing_subscriber::EnvFilter;

const MESSAGE_LEN: usize = 50_000;
const MAX_FRAGMENT_LEN: usize = 400;
const LOSS_RATE: f64 = 0.25;
/// Parts are delivered in shuffled batches of this size.
const REORDER_WINDOW: usize = 8;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut rng = Xoshiro256::from("lossy-channel");
    let message = rng.next_bytes(MESSAGE_LEN);

    let mut encoder = Encoder::with_config(&message, EncoderConfig::new(MAX_FRAGMENT_LEN));
    let mut decoder = Decoder::new();

    let mut sent = 0usize;
    let mut delivered = 0usize;
    let mut window: Vec<Part> = Vec::with_capacity(REORDER_WINDOW);

    while !decoder.is_complete() {
        let part = encoder.next_part();
        sent += 1;
        if !rng.random_bool(LOSS_RATE) {
            window.push(part);
        }

        if window.len() == REORDER_WINDOW {
            window.shuffle(&mut rng);
            for part in window.drain(..) {
                if decoder.receive_part(&part) {
                    delivered += 1;
                }
            }
            println!(
                "sent {sent:>4} parts, delivered {delivered:>4}, progress {:>5.1}%",
                decoder.estimated_percent_complete() * 100.0
            );
        }
    }

    match decoder.into_result() {
        Some(Ok(decoded)) => {
            assert_eq!(decoded, message);
            println!(
                "decoded {} bytes from {} fragments after {sent} sent / {delivered} delivered parts",
                decoded.len(),
                encoder.fragment_count(),
            );
        }
        Some(Err(e)) => eprintln!("decoding failed: {e}"),
        None => unreachable!("loop exits only once decoding finished"),
    }
}
