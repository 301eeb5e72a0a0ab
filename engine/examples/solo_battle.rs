//! Run an automatic solo battle and print the log as it happens.
//!
//! ```sh
//! cargo run --example solo_battle
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tokio::sync::mpsc;

use brawldex_engine::{
    BattleConfig, BattleEvent, ParticipantId, Rarity, SessionStore, SourceRecord, TeamId,
};

#[tokio::main]
async fn main() -> Result<()> {
    let seed = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as u64;
    println!("seed: {seed}");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut store = SessionStore::new();
    let handle = store.create(BattleConfig::solo(seed).automatic(), events_tx)?;

    let alice = ParticipantId(1);
    let bob = ParticipantId(2);
    handle.add_participant(alice, TeamId::Zero).await?;
    handle.add_participant(bob, TeamId::One).await?;

    handle
        .add_entries(
            alice,
            vec![
                SourceRecord::new(1, "Francedex", 500, 100),
                SourceRecord::new(2, "Spaindex", 400, 80).with_rarity(Rarity::Shiny),
            ],
            false,
        )
        .await?;
    handle
        .add_entries(
            bob,
            vec![
                SourceRecord::new(3, "Germanydex", 450, 90),
                SourceRecord::new(4, "Italydex", 600, 70).with_rarity(Rarity::Robot),
            ],
            false,
        )
        .await?;

    handle.set_ready(alice).await?;
    handle.set_ready(bob).await?;

    while let Some(event) = events_rx.recv().await {
        match event {
            BattleEvent::Started { turn_order } => {
                println!("battle {} started, turn order: {turn_order:?}", handle.id());
            }
            BattleEvent::TurnResolved { line, .. } => println!("{line}"),
            BattleEvent::Finished { outcome, log } => {
                println!("battle over after {} turns: {outcome:?}", log.len());
                break;
            }
            BattleEvent::Aborted { reason } => {
                println!("battle aborted: {reason}");
                break;
            }
            _ => {}
        }
    }

    store.remove(handle.id());
    Ok(())
}
