//! TOML configuration for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use duskgrid_core::{EntityKind, Point};
use duskgrid_world::{
    default_table, AgentLayout, TerrainWeight, DEFAULT_NPC_START, DEFAULT_WORLD_SIZE,
};
use serde::Deserialize;

const DEFAULT_SEED: u64 = 0;
const DEFAULT_FRAME_INTERVAL_MS: u64 = 50;
const DEFAULT_NPC: [i32; 2] = [DEFAULT_NPC_START.x(), DEFAULT_NPC_START.y()];

/// Settings read from a configuration file. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) seed: u64,
    pub(crate) frame_interval_ms: u64,
    pub(crate) npcs: Vec<[i32; 2]>,
    pub(crate) terrain: Vec<TerrainEntry>,
}

/// One weighted row of the terrain table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TerrainEntry {
    pub(crate) kind: EntityKind,
    pub(crate) weight: u32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_SIZE,
            height: DEFAULT_WORLD_SIZE,
            seed: DEFAULT_SEED,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            npcs: vec![DEFAULT_NPC],
            terrain: Vec::new(),
        }
    }
}

impl FileConfig {
    /// Reads and parses the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }

    /// Terrain table to generate the map from; the standard table when none is given.
    pub(crate) fn terrain_table(&self) -> Result<Vec<TerrainWeight>> {
        if self.terrain.is_empty() {
            return Ok(default_table());
        }

        let mut table = Vec::with_capacity(self.terrain.len());
        for entry in &self.terrain {
            if matches!(entry.kind, EntityKind::Player | EntityKind::Enemy) {
                bail!("terrain table cannot place characters ({:?})", entry.kind);
            }
            table.push(TerrainWeight::of_kind(entry.kind, entry.weight));
        }
        Ok(table)
    }

    /// Player in the centre of the map plus the configured NPCs.
    pub(crate) fn layout(&self) -> AgentLayout {
        self.npcs
            .iter()
            .fold(AgentLayout::centered(), |layout, &[x, y]| {
                layout.with_npc(Point::new(x, y))
            })
    }
}
