use tracing::{debug, warn};

use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy, StrategyKind};
use crate::infra::{Position, SearchError};

/// Drives one boxed strategy, either a tick at a time or to completion.
pub struct SearchRunner {
    strategy: Box<dyn SearchStrategy>,
    ticks: usize,
}

impl SearchRunner {
    pub fn new(strategy: Box<dyn SearchStrategy>) -> Self {
        Self { strategy, ticks: 0 }
    }

    pub fn from_kind(kind: StrategyKind, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(kind.build(config)?))
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// `explore_step` calls made since the last `start`.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn outcome(&self) -> &SearchOutcome {
        self.strategy.outcome()
    }

    pub fn start(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.ticks = 0;
        debug!(strategy = self.name(), %start, %goal, "starting search");
        self.strategy.start_search(ctx, start, goal)
    }

    /// One bounded unit of work.
    pub fn tick(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        let expanded = self.strategy.explore_step(ctx);
        if expanded.is_some() {
            self.ticks += 1;
        }
        expanded
    }

    /// Start a fresh episode and step it until it finishes or `max_steps`
    /// calls have been spent.
    #[tracing::instrument(level = "debug", skip(self, ctx), fields(strategy = self.name()))]
    pub fn run_to_completion(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
        max_steps: usize,
    ) -> Result<Vec<Position>, SearchError> {
        self.start(ctx, start, goal)?;

        while !self.outcome().is_finished() {
            if self.ticks >= max_steps {
                warn!(ticks = self.ticks, "step budget spent before the search finished");
                break;
            }
            if self.tick(ctx).is_none() {
                break;
            }
        }

        self.outcome().path().map(<[Position]>::to_vec)
    }
}
