#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random-walk policy for non-player characters.

use duskgrid_core::{CharacterId, Command, Direction, Event};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the wander system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration whose shuffles are reproducible from `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that asks every NPC to try a random step on each tick.
#[derive(Debug)]
pub struct Wander {
    rng: ChaCha8Rng,
}

impl Wander {
    /// Creates a new wander system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits one wander command per NPC for every tick in `events`.
    pub fn handle(&mut self, events: &[Event], npcs: &[CharacterId], out: &mut Vec<Command>) {
        for event in events {
            if !matches!(event, Event::TimeAdvanced { .. }) {
                continue;
            }

            for &character in npcs {
                let mut directions = Direction::ALL;
                directions.shuffle(&mut self.rng);
                out.push(Command::Wander {
                    character,
                    directions,
                });
            }
        }
    }
}
