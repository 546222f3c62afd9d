use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::time::Instant;

use bomberbot::infra::DefaultObserver as SearchLogger;
use bomberbot::state::Side;
use bomberbot::{Action, GameState, Planner, Position, SearchContext, SearchError};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::game_observer::GameObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    ReachedGoal,
    Eliminated,
    /// No legal move and no useful bomb left.
    Stuck,
    OutOfTicks,
}

/// Drives one planner against a live `GameState`.
///
/// Incremental planners get one `explore_step` per tick and the world waits
/// while they think; once a plan exists the protagonist walks it, one round
/// (protagonist ply then hazard ply) per two ticks. Alpha-beta decides a full
/// turn per tick. Hazards pick uniformly among their legal children.
pub struct Game {
    state: GameState,
    planner: Planner,
    observer: Box<dyn GameObserver>,
    search_logger: SearchLogger,
    rng: StdRng,
    depth: u32,
    plan: VecDeque<Position>,
    searching: bool,
}

impl Game {
    pub fn new(
        state: GameState,
        planner: Planner,
        depth: u32,
        rng: StdRng,
        observer: impl GameObserver + 'static,
    ) -> Self {
        Self {
            state,
            planner,
            observer: Box::new(observer),
            search_logger: SearchLogger,
            rng,
            depth,
            plan: VecDeque::new(),
            searching: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&mut self, max_ticks: usize) -> Result<GameResult, Box<dyn Error>> {
        self.observer.on_game_start(self.planner.name(), &self.state);

        let mut tick = 0;
        let result = loop {
            if let Some(result) = self.result() {
                break result;
            }
            if tick >= max_ticks {
                break GameResult::OutOfTicks;
            }
            tick += 1;
            let tick_start = Instant::now();

            match self.state.turn() {
                Side::Protagonist => self.protagonist_turn()?,
                Side::Hazards => {
                    self.hazard_turn();
                    self.observer.on_state_update(tick, &self.state);
                }
            }

            let tick_duration = tick_start.elapsed();
            if tick_duration.as_millis() > 100 {
                warn!(
                    "Tick {} took {:.2}ms ({})",
                    tick,
                    tick_duration.as_secs_f64() * 1000.0,
                    self.planner.name()
                );
            }
        };

        self.observer.on_game_finished(result, tick);
        Ok(result)
    }

    fn result(&self) -> Option<GameResult> {
        if self.state.is_eliminated() {
            Some(GameResult::Eliminated)
        } else if self.state.at_goal() {
            Some(GameResult::ReachedGoal)
        } else if self.state.is_terminal() {
            Some(GameResult::Stuck)
        } else {
            None
        }
    }

    fn protagonist_turn(&mut self) -> Result<(), SearchError> {
        let Some(pos) = self.state.protagonist() else {
            return Ok(());
        };
        let action = if matches!(self.planner, Planner::Adversarial(_)) {
            Some(self.adversarial_action())
        } else {
            self.incremental_action(pos)?
        };
        // Still thinking
        let Some(action) = action else {
            return Ok(());
        };

        self.observer.on_action_selected(action, &self.state);
        self.state = match self.state.successor(action) {
            Some(next) => next,
            None => {
                debug!(?action, "holding position");
                self.state.clone().with_turn(Side::Hazards)
            }
        };
        Ok(())
    }

    fn hazard_turn(&mut self) {
        let children = self.state.get_children();
        match children.choose(&mut self.rng) {
            Some(child) => self.state = child.clone(),
            None => self.state = self.state.clone().with_turn(Side::Protagonist),
        }
    }

    fn adversarial_action(&mut self) -> Action {
        let Planner::Adversarial(search) = &mut self.planner else {
            return Action::None;
        };
        let decision = search.decide(self.state.clone(), self.depth, true);
        if let Err(err) = decision.status() {
            debug!("{}", err);
        }
        decision.action
    }

    fn incremental_action(&mut self, pos: Position) -> Result<Option<Action>, SearchError> {
        if !self.state.bombs().is_empty() {
            return Ok(Some(self.evade(pos)));
        }
        if self.searching {
            return Ok(self.continue_search(pos));
        }
        if self.plan.is_empty() {
            self.start_search(pos)?;
            return Ok(None);
        }
        Ok(Some(self.follow_plan(pos)))
    }

    fn start_search(&mut self, pos: Position) -> Result<(), SearchError> {
        let Planner::Incremental(runner) = &mut self.planner else {
            return Ok(());
        };
        let mut ctx = SearchContext::with_observer(&self.state, &mut self.search_logger);
        runner.start(&mut ctx, pos, self.state.goal())?;
        self.searching = true;
        Ok(())
    }

    fn continue_search(&mut self, pos: Position) -> Option<Action> {
        let Planner::Incremental(runner) = &mut self.planner else {
            return None;
        };
        let mut ctx = SearchContext::with_observer(&self.state, &mut self.search_logger);
        runner.tick(&mut ctx);
        if !runner.outcome().is_finished() {
            return None;
        }
        let ticks = runner.ticks();
        let path = runner.outcome().path().map(<[Position]>::to_vec);
        self.searching = false;

        match path {
            Ok(path) => {
                debug!(steps = path.len(), ticks, "plan ready");
                self.plan = path.into();
                None
            }
            Err(err) => {
                warn!("{}, falling back to a random move", err);
                Some(self.random_move(pos))
            }
        }
    }

    fn follow_plan(&mut self, pos: Position) -> Action {
        let Some(&next) = self.plan.front() else {
            return Action::None;
        };
        let moves = self.state.generate_moves(pos);
        if moves.contains(&next) {
            self.plan.pop_front();
            return Action::Move(next);
        }
        // Diagonal plan steps are walked around the corner
        if (next.x - pos.x).abs() == 1 && (next.y - pos.y).abs() == 1 {
            let corners = [Position::new(next.x, pos.y), Position::new(pos.x, next.y)];
            if let Some(corner) = corners.into_iter().find(|corner| moves.contains(corner)) {
                return Action::Move(corner);
            }
        }

        self.plan.clear();
        if self.state.is_intact_rock(next) && self.state.can_place_bomb() {
            debug!("rock at {} blocks the plan, placing a bomb", next);
            return Action::PlaceBomb;
        }
        debug!("{} is blocked, replanning", next);
        self.random_move(pos)
    }

    /// Get out of every blast line before the fuse runs out.
    fn evade(&mut self, pos: Position) -> Action {
        self.searching = false;
        self.plan.clear();
        if !self.state.bomb_risk(pos) {
            return Action::None;
        }
        let escape = self
            .state
            .find_safe_position(pos)
            .or_else(|| self.escape_step(pos));
        match escape {
            Some(next) => Action::Move(next),
            None => self.random_move(pos),
        }
    }

    /// First step towards the nearest cell outside every blast line.
    fn escape_step(&self, pos: Position) -> Option<Position> {
        let mut first_step: HashMap<Position, Position> = HashMap::new();
        let mut queue = VecDeque::new();
        for next in self.state.generate_moves(pos) {
            first_step.insert(next, next);
            queue.push_back(next);
        }

        while let Some(current) = queue.pop_front() {
            let step = *first_step.get(&current)?;
            if !self.state.bomb_risk(current) {
                return Some(step);
            }
            for next in self.state.generate_moves(current) {
                if next != pos && !first_step.contains_key(&next) {
                    first_step.insert(next, step);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn random_move(&mut self, pos: Position) -> Action {
        let moves = self.state.generate_moves(pos);
        match moves.choose(&mut self.rng) {
            Some(next) => Action::Move(*next),
            None if self.state.can_place_bomb() && self.state.is_bomb_useful() => {
                Action::PlaceBomb
            }
            None => Action::None,
        }
    }
}
