mod default_observer;
mod game;
mod game_observer;
mod maps;

use std::env;
use std::error::Error;
use std::rc::Rc;
use std::str::FromStr;

use bomberbot::planners::adversarial::AlphaBetaConfig;
use bomberbot::planners::search::{Heuristic, Movement};
use bomberbot::{GameState, Planner, SearchConfig, SearchError, StrategyKind};
use default_observer::DefaultObserver;
use dotenv::dotenv;
use game::Game;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::{OffsetDateTime, format_description};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn get_env_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

/// Like `get_env_var`, but a value that is set and malformed is an error.
fn parse_env_var<T>(key: &str, default: T) -> Result<T, T::Err>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(val) => val.parse::<T>(),
        Err(_) => Ok(default),
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bomberbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_description::parse("[year][month][day]-[hour][minute][second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
        .unwrap_or_else(|| now.unix_timestamp().to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_logging()?;

    let strategy: StrategyKind = parse_env_var("BOMBER_STRATEGY", StrategyKind::AStar)?;
    let heuristic: Heuristic = parse_env_var("BOMBER_HEURISTIC", Heuristic::Manhattan)?;
    let beam_width = get_env_var::<usize>("BOMBER_BEAM_WIDTH").unwrap_or(3);
    let diagonal = get_env_var::<bool>("BOMBER_DIAGONAL").unwrap_or(false);
    let depth = get_env_var::<u32>("BOMBER_DEPTH").unwrap_or(3);
    let map_name = env::var("BOMBER_MAP").unwrap_or_else(|_| "arena".to_string());
    let seed = get_env_var::<u64>("BOMBER_SEED").unwrap_or_else(rand::random);
    let max_ticks = get_env_var::<usize>("BOMBER_MAX_TICKS").unwrap_or(500);

    info!("Run {}", run_stamp());
    info!("- strategy: {}", strategy);
    info!("- heuristic: {}", heuristic);
    info!("- map: {}", map_name);
    info!("- seed: {}", seed);
    if strategy.is_adversarial() {
        info!("- depth: {}", depth);
    }

    let movement = if diagonal {
        Movement::Diagonal
    } else {
        Movement::Orthogonal
    };
    let search = SearchConfig::default()
        .with_heuristic(heuristic)
        .with_beam_width(beam_width)
        .with_movement(movement);
    let adversarial = AlphaBetaConfig::default().with_depth(depth);
    let planner = Planner::from_kind(strategy, &search, &adversarial)?;

    let grid = maps::load(&map_name)?;
    let spawn = grid
        .spawn()
        .ok_or_else(|| SearchError::InvalidLayout(format!("map '{}' has no spawn", map_name)))?;
    let goal = grid
        .goal()
        .ok_or_else(|| SearchError::InvalidLayout(format!("map '{}' has no goal", map_name)))?;
    let state = GameState::from_grid(Rc::new(grid), spawn, goal)?;

    let mut game = Game::new(
        state,
        planner,
        depth,
        StdRng::seed_from_u64(seed),
        DefaultObserver,
    );
    let result = game.run(max_ticks)?;
    info!("Result: {:?}", result);

    Ok(())
}
