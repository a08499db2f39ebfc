use std::time::Duration;

use duskgrid_core::{DayCycle, Direction, Event, Point};
use duskgrid_system_simulation::{Config, Intent, Simulation};
use duskgrid_world::{query, AgentLayout, ScriptedTerrain, World};

fn corridor_world() -> World {
    let mut terrain = ScriptedTerrain::from_layout(
        "
        #########
        #.......#
        #.#####.#
        #......*#
        #########
        ",
    );
    let layout = AgentLayout::centered().with_player(Point::new(1, 1));
    World::new(5, 9, &mut terrain, &layout).expect("world")
}

#[test]
fn report_routes_the_player_to_the_nearest_light() {
    let mut simulation = Simulation::new(corridor_world(), Config::new(Duration::ZERO, 4));

    let report = simulation.frame();

    assert_eq!(report.nearest_light, Some(Point::new(7, 3)));
    assert_eq!(report.route.len(), 9);
    assert!(report.route.contains(&Point::new(1, 1)));
    assert!(report.route.contains(&Point::new(7, 3)));
    assert_eq!(report.lumen, 0);
}

#[test]
fn queued_moves_shorten_the_route() {
    let mut simulation = Simulation::new(corridor_world(), Config::new(Duration::ZERO, 4));
    let intents = simulation.intents();
    for _ in 0..2 {
        intents.send(Intent::Move(Direction::South)).expect("send");
    }
    for _ in 0..4 {
        intents.send(Intent::Move(Direction::East)).expect("send");
    }

    let report = simulation.frame();

    assert_eq!(report.player, Point::new(5, 3));
    assert_eq!(report.facing, Direction::East);
    assert_eq!(report.route.len(), 3);
    assert_eq!(report.lumen, 2);
    let rejected = report
        .moves
        .iter()
        .filter(|event| matches!(event, Event::MoveRejected { .. }))
        .count();
    assert_eq!(rejected, 0);
}

#[test]
fn night_falls_after_forty_four_ticks() {
    let mut simulation = Simulation::new(corridor_world(), Config::new(Duration::ZERO, 4));

    let reports: Vec<_> = (0..45).map(|_| simulation.frame()).collect();

    assert_eq!(reports[42].tick, 43);
    assert_eq!(reports[42].cycle, DayCycle::Day);
    assert_eq!(reports[43].cycle, DayCycle::Night);
    assert_eq!(reports[43].sub_count, 1);
    assert_eq!(reports[44].cycle, DayCycle::Night);
    assert_eq!(query::tick(simulation.world()), 45);
}

#[test]
fn npcs_wander_during_frames() {
    let mut terrain = ScriptedTerrain::uniform(duskgrid_core::EntityKind::FloorA);
    let layout = AgentLayout::centered().with_npc(Point::new(0, 0));
    let world = World::new(6, 6, &mut terrain, &layout).expect("world");
    let mut simulation = Simulation::new(world, Config::new(Duration::ZERO, 11));

    let report = simulation.frame();

    let npc = query::npcs(simulation.world())[0];
    let moved: Vec<_> = report
        .moves
        .iter()
        .filter(|event| matches!(event, Event::CharacterMoved { character, .. } if *character == npc))
        .collect();
    assert_eq!(moved.len(), 1);
    assert_ne!(
        query::character(simulation.world(), npc)
            .expect("npc")
            .location(),
        Point::new(0, 0)
    );
}
