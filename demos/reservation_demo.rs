//! Ride Reservation Dialogue Example
//!
//! This example walks two users through the full reservation dialogue:
//! 1. Sets a route (origin 到 destination)
//! 2. Chooses a pooled ride via quick reply
//! 3. Sets the reservation time
//! 4. Pays and receives the confirmation with the route preview link
//! 5. The second user's compatible reservation triggers a rideshare match
//!
//! Run with: cargo run --example reservation_demo

use ridepool::{RideBot, UserId};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🚕 Ride Reservation Dialogue");
    println!("============================\n");

    let bot = RideBot::builder().build();

    let alice = UserId::from("U_alice");
    let bert = UserId::from("U_bert");

    for (user, name) in [(&alice, "Alice"), (&bert, "Bert")] {
        println!("--- {} makes a reservation ---", name);
        for message in [
            "台北車站 到 松山機場",
            "choose pooled",
            "reserve 15:30",
            "pay cash",
        ] {
            println!("{}: {}", name, message);
            let reply = bot.handle_message(user, message).await?;
            println!("Bot: {}", reply.text);
            for button in &reply.quick_replies {
                println!("     [{}] -> {}", button.label, button.text);
            }
            println!();
        }
    }

    println!("--- Alice checks her reservation ---");
    let reply = bot.handle_message(&alice, "query my reservations").await?;
    println!("Bot: {}", reply.text);

    Ok(())
}
