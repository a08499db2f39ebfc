use duskgrid_core::{Point, Traversable};
use duskgrid_system_pathfinding::Pathfinder;
use duskgrid_world::{query, AgentLayout, ScriptedTerrain, World};

#[test]
fn player_routes_around_obstacles_to_a_light() {
    let mut terrain = ScriptedTerrain::from_layout(
        "
        .......
        .#####.
        .#...#.
        .#.*.#.
        .......
        ",
    );
    let layout = AgentLayout::centered().with_player(Point::new(0, 0));
    let world = World::new(5, 7, &mut terrain, &layout).expect("world");
    let light = query::lights(&world)[0].position;
    let player = query::player(&world).location();

    let view = query::player_traversal(&world);
    let route = Pathfinder::new().find(&view, player, light);

    assert_eq!(light, Point::new(3, 3));
    assert!(route.contains(&player));
    assert!(route.contains(&light));
    assert_eq!(route.len(), 9);
    assert!(route
        .iter()
        .filter(|point| **point != player)
        .all(|point| view.passable(*point)));
}

#[test]
fn other_characters_block_routes() {
    let mut terrain = ScriptedTerrain::from_layout(
        "
        #####
        .....
        #####
        ",
    );
    let layout = AgentLayout::centered()
        .with_player(Point::new(0, 1))
        .with_npc(Point::new(2, 1));
    let world = World::new(3, 5, &mut terrain, &layout).expect("world");
    let player = query::player(&world).id();
    let view = query::traversal(&world, player).expect("player view");

    let route = Pathfinder::new().find(&view, Point::new(0, 1), Point::new(4, 1));

    assert!(route.is_empty());
}
