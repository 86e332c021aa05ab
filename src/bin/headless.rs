//! Headless skirmish runner
//!
//! Drives a full round on a built-in map with no renderer attached: AI
//! defenders against AI attackers, civilians waiting in the hostage room.
//! Prints the outcome once the round ends or the tick limit runs out.

use dustline::agent::InputState;
use dustline::core::config::SimConfig;
use dustline::core::error::Result;
use dustline::core::types::{Rect, Vec2};
use dustline::grid::GridMap;
use dustline::simulation::{GameState, NullSink, Simulation};
use dustline::world::layout::{CampSpot, MapLayout};
use dustline::world::world::World;

const MAP: &str = "\
####################\n\
#........#.........#\n\
#........#.........#\n\
#...##...#....##...#\n\
#...##........##...#\n\
#........#.........#\n\
#........#.........#\n\
####.#########.#####\n\
#........#.........#\n\
#........#.........#\n\
#...##.......###...#\n\
#...##...#...###...#\n\
#........#.........#\n\
#........#.........#\n\
####################";

const TICK_RATE: f32 = 1.0 / 60.0;
const MAX_TICKS: u64 = 60 * 120;

fn layout() -> MapLayout {
    MapLayout {
        defender_spawn: Rect::new(1.0, 1.0, 6.0, 4.0),
        attacker_spawn: Rect::new(12.0, 9.0, 5.0, 4.0),
        civilian_spawns: vec![Vec2::new(16.0, 2.0), Vec2::new(17.0, 4.0)],
        defender_count: 3,
        attacker_count: 4,
        routes: vec![
            vec![Vec2::new(4.0, 8.0), Vec2::new(4.0, 2.0), Vec2::new(11.0, 2.0)],
            vec![Vec2::new(14.0, 8.0), Vec2::new(16.0, 2.0), Vec2::new(11.0, 5.0)],
        ],
        camp_spots: vec![
            CampSpot { position: Vec2::new(15.0, 2.0), facing: 180.0 },
            CampSpot { position: Vec2::new(12.0, 5.0), facing: 180.0 },
            CampSpot { position: Vec2::new(14.0, 12.0), facing: 90.0 },
        ],
        rescue_zone: Rect::new(1.0, 1.0, 3.0, 3.0),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dustline=info".into()),
        )
        .init();

    tracing::info!("dustline headless skirmish starting");

    let grid = GridMap::from_ascii(MAP);
    let mut world = World::new(grid, layout(), 42)?;
    world.populate()?;

    let mut sim = Simulation::new(world, SimConfig::default());
    let mut input = InputState::default();
    let mut effects = NullSink;

    let mut state = GameState::Playing;
    while sim.tick() < MAX_TICKS {
        state = sim.update(TICK_RATE, &mut input, &mut effects);
        if state != GameState::Playing {
            break;
        }
    }

    let world = sim.world();
    println!();
    println!("=== skirmish over ===");
    println!("outcome:   {state:?}");
    println!("ticks:     {}", sim.tick());
    println!(
        "defenders: {}  attackers: {}  rescued: {}",
        world.team_count(dustline::world::agent::Team::Defender),
        world.team_count(dustline::world::agent::Team::Attacker),
        world.rescue_count(),
    );
    println!("dead:      {}", world.dead().len());

    Ok(())
}
