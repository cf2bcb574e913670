use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorldConfig;
use crate::level::{LevelLayout, LevelSource, Placement, PropertyValue, Spawn};
use crate::objects::ObjectKind;

/// Chunk width in blocks (each procedural section is this wide).
const CHUNK_WIDTH: i32 = 8;
/// Number of chunks in a generated course, including the flat start.
const NUM_CHUNKS: i32 = 8;
/// A checkpoint is placed at the start of every n-th chunk.
const CHECKPOINT_EVERY: i32 = 3;

/// Generate a deterministic trap course from a seed.
pub fn generate_layout(seed: u64, world: &WorldConfig) -> LevelLayout {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut course = CourseBuilder {
        bs: world.block_size,
        floor_y: world.view_height - world.block_size,
        objects: Vec::new(),
    };

    // Flat run-up under the spawn point.
    course.floor(0..CHUNK_WIDTH);

    for chunk_idx in 1..NUM_CHUNKS {
        let base = chunk_idx * CHUNK_WIDTH;
        if chunk_idx % CHECKPOINT_EVERY == 0 {
            course.floor(base..base + 2);
            course.marker(ObjectKind::Checkpoint, base);
            course.chunk(&mut rng, base + 2, CHUNK_WIDTH - 2);
        } else {
            course.chunk(&mut rng, base, CHUNK_WIDTH);
        }
    }

    // Finish platform.
    let end_base = NUM_CHUNKS * CHUNK_WIDTH;
    course.floor(end_base..end_base + 4);
    course.marker(ObjectKind::End, end_base + 1);

    LevelLayout {
        name: format!("generated-{seed}"),
        spawn: Some(Spawn {
            x: world.block_size,
            y: world.default_spawn_y,
        }),
        objects: course.objects,
    }
}

struct CourseBuilder {
    bs: f32,
    floor_y: f32,
    objects: Vec<Placement>,
}

impl CourseBuilder {
    fn x(&self, col: i32) -> f32 {
        col as f32 * self.bs
    }

    fn push(&mut self, kind: ObjectKind, col: i32, y: f32) -> &mut Placement {
        let x = self.x(col);
        self.objects.push(Placement::new(kind, x, y));
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    fn floor(&mut self, cols: std::ops::Range<i32>) {
        for col in cols {
            self.push(ObjectKind::Block, col, self.floor_y);
        }
    }

    /// Checkpoint or end marker standing on the floor.
    fn marker(&mut self, kind: ObjectKind, col: i32) {
        let y = self.floor_y - 128.0;
        self.push(kind, col, y);
    }

    fn chunk(&mut self, rng: &mut StdRng, base: i32, width: i32) {
        let pattern = rng.random_range(0u8..6);
        let floor_y = self.floor_y;
        let bs = self.bs;

        match pattern {
            0 => {
                // Pit with a single disappearing stepping stone
                let pit_start = base + rng.random_range(2..width - 3);
                let pit_width = rng.random_range(2..4);
                self.floor(base..pit_start);
                self.floor(pit_start + pit_width..base + width);
                let stone = pit_start + pit_width / 2;
                let respawn_ms = rng.random_range(1..4) * 1000;
                self.push(ObjectKind::Trap, stone, floor_y)
                    .properties
                    .insert("respawn_ms".into(), PropertyValue::Int(respawn_ms));
            },
            1 => {
                // Spike strip under a raised ledge
                self.floor(base..base + width);
                let spike_start = base + rng.random_range(2..4);
                let spike_len = rng.random_range(1..3);
                for col in spike_start..spike_start + spike_len {
                    let spike = self.push(ObjectKind::Spike, col, floor_y - bs / 2.0);
                    spike.width = Some(bs);
                    spike.height = Some(bs / 2.0);
                }
                for col in spike_start - 1..spike_start + spike_len + 1 {
                    self.push(ObjectKind::Block, col, floor_y - bs * 3.0);
                }
            },
            2 => {
                // Staircase with a hidden spike on the top step
                self.floor(base..base + width);
                for step in 0..3 {
                    let col = base + 1 + step;
                    for level in 0..=step {
                        self.push(ObjectKind::Block, col, floor_y - bs * (level + 1) as f32);
                    }
                }
                let top_y = floor_y - bs * 3.0;
                let spike = self.push(ObjectKind::Spike, base + 3, top_y - bs / 2.0);
                spike.width = Some(bs);
                spike.height = Some(bs / 2.0);
                spike
                    .properties
                    .insert("hidden".into(), PropertyValue::Bool(true));
            },
            3 => {
                // Gap bridged by blocks that only appear when approached
                let gap_start = base + 2;
                let gap_width = rng.random_range(2..4);
                self.floor(base..gap_start);
                self.floor(gap_start + gap_width..base + width);
                for col in gap_start..gap_start + gap_width {
                    self.push(ObjectKind::Appear, col, floor_y);
                }
            },
            4 => {
                // Fire pair with a breakable box overhead
                self.floor(base..base + width);
                let fire_start = base + rng.random_range(2..4);
                for col in fire_start..fire_start + 2 {
                    let x = self.x(col) + (bs - 16.0) / 2.0;
                    self.objects
                        .push(Placement::new(ObjectKind::Fire, x, floor_y - 32.0));
                }
                let box_y = floor_y - bs * 2.0;
                self.push(ObjectKind::Box, fire_start, box_y);
            },
            _ => {
                // Ceiling spike over the run
                self.floor(base..base + width);
                let col = base + rng.random_range(2..width - 1);
                let spike = self.push(ObjectKind::Spike, col, floor_y - bs * 3.0);
                spike.height = Some(bs / 2.0);
                spike
                    .properties
                    .insert("orientation".into(), PropertyValue::Text("down".into()));
            },
        }
    }
}

/// Endless seeded courses: level `n` is generated from `seed + n`.
#[derive(Debug, Clone, Default)]
pub struct GeneratedLevels {
    pub seed: u64,
    pub world: WorldConfig,
}

impl LevelSource for GeneratedLevels {
    fn layout(&self, index: usize) -> Option<LevelLayout> {
        Some(generate_layout(
            self.seed.wrapping_add(index as u64),
            &self.world,
        ))
    }
}
