//! Pair with a terminal and log what it reports.
//!
//! Demonstrates:
//! - Building a session for a terminal on the local network
//! - Handling the pairing code and storing the token
//! - Receiving device lifecycle and business events
//! - Sending a screen command once the device is ready
//!
//! Usage:
//!   cargo run --example pair_terminal -- --url wss://192.168.1.20:12345/remote_pay
//!   cargo run --example pair_terminal -- --token <token-from-last-run>
//!   cargo run --example pair_terminal -- --debug --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use common::{APPLICATION_ID, Args};
use parking_lot::Mutex;
use terminal_link::{
    DeviceObserver, DeviceSession, Error, Instance, PairingHandler, Result, TransportOptions,
};

// ============================================================================
// Console
// ============================================================================

/// Prints pairing prompts and device events.
#[derive(Default)]
struct Console {
    token: Mutex<Option<String>>,
}

impl PairingHandler for Console {
    fn on_pairing_code(&self, code: &str) {
        println!("[Pairing] Enter code {code} on the terminal");
    }

    fn on_pairing_success(&self, token: Option<&str>) -> Result<()> {
        println!("[Pairing] ✓ Paired");
        if let Some(token) = token {
            println!("          Reuse with: --token {token}");
        }
        *self.token.lock() = token.map(str::to_string);
        Ok(())
    }
}

impl DeviceObserver for Console {
    fn on_device_connected(&self) {
        println!("[Device] Connected");
    }

    fn on_device_ready(&self, discovery: &Instance) {
        println!(
            "[Device] ✓ Ready: {} ({})",
            discovery.get_str("model").unwrap_or("?"),
            discovery.get_str("serial").unwrap_or("?"),
        );
    }

    fn on_device_disconnected(&self) {
        println!("[Device] Disconnected, reconnecting...");
    }

    fn on_device_error(&self, error: &Error) {
        println!("[Device] Error: {error}");
    }

    fn on_ui_state(&self, message: &Instance) {
        println!(
            "[UI] {}",
            message.get("uiState").and_then(|v| v.as_constant()).unwrap_or("?")
        );
    }

    fn on_tip_added(&self, message: &Instance) {
        println!("[Tip] {:?}", message.get_i64("tipAmount"));
    }

    fn on_message_ack(&self, source_message_id: &str) {
        println!("[Ack] {source_message_id}");
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Pair Terminal ===\n");

    // ========================================================================
    // Build Session
    // ========================================================================

    let console = Arc::new(Console::default());
    let mut builder = DeviceSession::builder()
        .endpoint(&args.url)
        .application_id(APPLICATION_ID)
        .pos_name("terminal-link demo")
        .serial_number("DEMO-0001")
        .pairing_handler(console.clone())
        .transport_options(TransportOptions::new().with_reconnect_on_connect_error(true));
    if let Some(token) = &args.token {
        builder = builder.auth_token(token);
    }

    let session = builder.build()?;
    session.add_observer(console.clone());

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[Connect] {}", args.url);
    session.connect().await?;

    common::wait_for_exit(args.no_wait).await;

    if session.transport().is_open() {
        session.show_thank_you_screen().ok();
    }
    session.dispose();
    println!("\n=== Done ===");
    Ok(())
}
