#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Serialized frame loop that owns the world.
//!
//! Exactly one [`Simulation`] mutates the world. Input sources hold an
//! [`IntentSender`] and enqueue player intents; the simulation drains them at
//! the start of the next frame, advances the clock, lets NPCs react, and then
//! reports what the player can see.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};

use duskgrid_core::{Command, DayCycle, Direction, Event, Point, Window};
use duskgrid_system_lighting::{light_value, nearest_light, sense_value};
use duskgrid_system_pathfinding::Pathfinder;
use duskgrid_system_wander::{self as wander, Wander};
use duskgrid_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, trace};

pub use duskgrid_system_lighting::Sense;

const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_VIEW_WIDTH: i32 = 80;
const DEFAULT_VIEW_HEIGHT: i32 = 24;

/// Errors reported to input sources.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The simulation that owned the queue no longer exists.
    #[error("simulation is no longer accepting intents")]
    Closed,
}

/// Player request queued for the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Step the player one cell in the given direction.
    Move(Direction),
}

/// Cloneable handle that input sources use to enqueue intents.
#[derive(Clone, Debug)]
pub struct IntentSender {
    inner: Sender<Intent>,
}

impl IntentSender {
    /// Queues an intent for the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Closed`] once the simulation has been dropped.
    pub fn send(&self, intent: Intent) -> Result<(), SimulationError> {
        self.inner
            .send(intent)
            .map_err(|_| SimulationError::Closed)
    }
}

/// Configuration parameters required to construct the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    frame_interval: Duration,
    wander_seed: u64,
    view_width: i32,
    view_height: i32,
}

impl Config {
    /// Creates a configuration with the given frame pacing and NPC seed.
    #[must_use]
    pub const fn new(frame_interval: Duration, wander_seed: u64) -> Self {
        Self {
            frame_interval,
            wander_seed,
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
        }
    }

    /// Overrides the size of the window centred on the player.
    #[must_use]
    pub const fn with_view(mut self, width: i32, height: i32) -> Self {
        self.view_width = width;
        self.view_height = height;
        self
    }

    /// Pause between consecutive frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL, 0)
    }
}

/// Summary of a single frame as seen from the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Clock value after the frame's tick.
    pub tick: u64,
    /// Current day/night phase.
    pub cycle: DayCycle,
    /// Progress through the phase.
    pub sub_count: u8,
    /// Player location after the frame.
    pub player: Point,
    /// Direction the player faces after the frame.
    pub facing: Direction,
    /// Window of the map centred on the player.
    pub visible: Window,
    /// Light level on the player's cell.
    pub lumen: i32,
    /// Closest light source, if the map has any.
    pub nearest_light: Option<Point>,
    /// How clearly the player sees the closest light from where it stands.
    pub light_sense: Option<Sense>,
    /// Cells of a shortest route from the player to the nearest light.
    pub route: BTreeSet<Point>,
    /// Movement events produced by intents and NPCs during the frame.
    pub moves: Vec<Event>,
}

/// Single owner of the world that advances it one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    config: Config,
    wander: Wander,
    pathfinder: Pathfinder,
    sender: Sender<Intent>,
    receiver: Receiver<Intent>,
}

impl Simulation {
    /// Takes ownership of `world` and prepares the systems that drive it.
    #[must_use]
    pub fn new(world: World, config: Config) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            world,
            config,
            wander: Wander::new(wander::Config::new(config.wander_seed)),
            pathfinder: Pathfinder::new(),
            sender,
            receiver,
        }
    }

    /// Handle for enqueueing player intents from other threads.
    #[must_use]
    pub fn intents(&self) -> IntentSender {
        IntentSender {
            inner: self.sender.clone(),
        }
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Runs one frame: pending intents, then the tick, then NPC reactions.
    pub fn frame(&mut self) -> FrameReport {
        let player = query::player(&self.world).id();
        let mut moves = Vec::new();

        while let Ok(intent) = self.receiver.try_recv() {
            let Intent::Move(direction) = intent;
            debug!(%direction, "applying player intent");
            world::apply(
                &mut self.world,
                Command::Move {
                    character: player,
                    direction,
                },
                &mut moves,
            );
        }

        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut tick_events);

        let npcs = query::npcs(&self.world);
        let mut commands = Vec::new();
        self.wander.handle(&tick_events, &npcs, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut moves);
        }

        let report = self.report(moves);
        trace!(
            tick = report.tick,
            player = %report.player,
            facing = %report.facing,
            lumen = report.lumen,
            route = report.route.len(),
            "frame complete"
        );
        report
    }

    /// Repeats [`Simulation::frame`] until `stop` is raised or `frame_limit`
    /// frames have run, sleeping the configured interval between frames.
    ///
    /// The stop flag is only read between frames. Returns the number of
    /// frames executed.
    pub fn run<F>(&mut self, stop: &AtomicBool, frame_limit: Option<u64>, mut on_frame: F) -> u64
    where
        F: FnMut(&FrameReport),
    {
        info!(
            interval = ?self.config.frame_interval,
            ?frame_limit,
            "simulation started"
        );

        let mut frames: u64 = 0;
        while !stop.load(Ordering::Acquire) {
            if frame_limit.is_some_and(|limit| frames >= limit) {
                break;
            }

            let report = self.frame();
            frames += 1;
            on_frame(&report);

            if !self.config.frame_interval.is_zero() {
                thread::sleep(self.config.frame_interval);
            }
        }

        info!(frames, "simulation stopped");
        frames
    }

    fn report(&mut self, moves: Vec<Event>) -> FrameReport {
        let player = query::player(&self.world);
        let location = player.location();
        let grid = query::grid(&self.world);
        let visible = Window::centered(
            location,
            self.config.view_width,
            self.config.view_height,
            i32::try_from(grid.width()).unwrap_or(i32::MAX),
            i32::try_from(grid.height()).unwrap_or(i32::MAX),
        );
        let lights = query::lights(&self.world);
        let (cycle, sub_count) = query::phase(&self.world);
        let nearest = nearest_light(lights, location);
        let light_sense = nearest.map(|light| sense_value(light, location, player.facing()));
        let route = match nearest {
            Some(goal) => {
                let view = query::player_traversal(&self.world);
                self.pathfinder.find(&view, location, goal)
            }
            None => BTreeSet::new(),
        };

        FrameReport {
            tick: query::tick(&self.world),
            cycle,
            sub_count,
            player: location,
            facing: player.facing(),
            visible,
            lumen: light_value(location, &visible, lights, cycle).lumen,
            nearest_light: nearest,
            light_sense,
            route,
            moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duskgrid_core::EntityKind;
    use duskgrid_world::{AgentLayout, ScriptedTerrain};

    fn open_simulation() -> Simulation {
        let mut terrain = ScriptedTerrain::uniform(EntityKind::FloorA);
        let world = World::new(5, 5, &mut terrain, &AgentLayout::centered()).expect("world");
        Simulation::new(world, Config::new(Duration::ZERO, 1))
    }

    #[test]
    fn intents_apply_before_the_tick() {
        let mut simulation = open_simulation();
        let intents = simulation.intents();
        intents.send(Intent::Move(Direction::East)).expect("send");
        intents.send(Intent::Move(Direction::East)).expect("send");
        intents.send(Intent::Move(Direction::East)).expect("send");

        let report = simulation.frame();

        assert_eq!(report.tick, 1);
        assert_eq!(report.player, Point::new(4, 2));
        assert_eq!(report.facing, Direction::East);
        assert_eq!(report.moves.len(), 3);
        assert!(matches!(
            report.moves[2],
            Event::MoveRejected {
                direction: Direction::East,
                ..
            }
        ));
    }

    #[test]
    fn frames_without_lights_report_no_route() {
        let mut simulation = open_simulation();

        let report = simulation.frame();

        assert_eq!(report.nearest_light, None);
        assert_eq!(report.light_sense, None);
        assert!(report.route.is_empty());
        assert_eq!(report.lumen, 0);
        assert_eq!(report.cycle, DayCycle::Day);
        assert_eq!(report.visible, Window::new(0, 0, 4, 4));
    }

    #[test]
    fn light_sense_follows_the_player_facing() {
        let mut terrain = ScriptedTerrain::from_layout(
            "
            ..*..
            .....
            .....
            .....
            .....
            .....
            .....
            ",
        );
        let layout = AgentLayout::centered().with_player(Point::new(2, 6));
        let world = World::new(7, 5, &mut terrain, &layout).expect("world");
        let mut simulation = Simulation::new(world, Config::new(Duration::ZERO, 1));

        let ahead = simulation.frame();
        assert_eq!(ahead.nearest_light, Some(Point::new(2, 0)));
        assert_eq!(ahead.light_sense, Some(Sense::Full));

        simulation
            .intents()
            .send(Intent::Move(Direction::South))
            .expect("send");
        let behind = simulation.frame();
        assert_eq!(behind.facing, Direction::South);
        assert_eq!(behind.light_sense, Some(Sense::Reduced));
        assert_eq!(behind.light_sense.map(Sense::intensity), Some(0.75));
    }

    #[test]
    fn senders_fail_once_the_simulation_is_gone() {
        let simulation = open_simulation();
        let intents = simulation.intents();
        drop(simulation);

        assert_eq!(
            intents.send(Intent::Move(Direction::North)),
            Err(SimulationError::Closed)
        );
    }

    #[test]
    fn run_honours_the_frame_limit() {
        let mut simulation = open_simulation();
        let stop = AtomicBool::new(false);
        let mut ticks = Vec::new();

        let frames = simulation.run(&stop, Some(3), |report| ticks.push(report.tick));

        assert_eq!(frames, 3);
        assert_eq!(ticks, [1, 2, 3]);
    }

    #[test]
    fn run_checks_the_stop_flag_between_frames() {
        let mut simulation = open_simulation();
        let stop = AtomicBool::new(false);
        let mut seen = 0;

        let frames = simulation.run(&stop, None, |_| {
            seen += 1;
            if seen == 2 {
                stop.store(true, Ordering::Release);
            }
        });

        assert_eq!(frames, 2);
        assert_eq!(query::tick(simulation.world()), 2);

        stop.store(true, Ordering::Release);
        assert_eq!(simulation.run(&stop, None, |_| {}), 0);
    }
}
