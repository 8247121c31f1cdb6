//! Manual capture replay
//!
//! Drives a scripted caption mutation sequence through a real session with
//! real debounce timing and prints the resulting transcript. Useful for
//! eyeballing filter/merger behavior without a host surface.

use std::time::Duration;

use meetscribe::capture::{CaptionNode, CaptureSession};

#[tokio::main]
async fn main() {
    meetscribe::logging::init();

    let mut session = CaptureSession::new();
    session.start();

    // A caption line growing in place across a burst.
    let caption = CaptionNode::new(1, "DIV", "so today we");
    session.observe(caption.clone());
    tokio::time::sleep(Duration::from_millis(80)).await;
    caption.set_text("so today we need to decide on the release date");
    session.observe(caption.clone());

    // UI chrome firing alongside the captions.
    session.observe(CaptionNode::new(2, "BUTTON", "Leave call"));
    session.observe(CaptionNode::new(3, "DIV", "Turn off captions"));

    // Let the burst settle and drain.
    tokio::time::sleep(Duration::from_millis(300)).await;

    // A jittered shorter re-render, then a genuinely new line.
    session.observe(CaptionNode::new(4, "DIV", "so today we need"));
    session.observe(CaptionNode::new(5, "DIV", "let's aim for the end of the month"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let transcript = session.stop().await.unwrap_or_default();
    println!("--- transcript ---");
    println!("{transcript}");
}
