//! One game phase: owns the active field and maps targeting input onto it.

use serde::Serialize;
use tracing::{debug, info};

use crate::board;
use crate::cascade::HitOutcome;
use crate::config::{ConfigError, FieldConfig};
use crate::events::FieldEvent;
use crate::field::{Field, FieldSnapshot};
use crate::rng::FieldRng;
use crate::types::Pos;

/// What the player is aiming at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// An unrevealed cell.
    Cell(Pos),
    /// The indicator shown on a revealed cell.
    Indicator(Pos),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// No field is active.
    Idle,
    InProgress,
    Cleared,
    Lost,
}

pub struct GameSession {
    config: FieldConfig,
    field: Option<Field>,
    aim: Option<Target>,
}

impl GameSession {
    /// Validate `config` and build the first field.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        let mut session = Self {
            config: FieldConfig::default(),
            field: None,
            aim: None,
        };
        session.init(config)?;
        Ok(session)
    }

    /// Replace the active field with a fresh one built from `config`.
    pub fn init(&mut self, config: FieldConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => FieldRng::from_seed(seed),
            None => FieldRng::new(),
        };
        self.field = Some(board::build_field(&config, rng));
        self.config = config;
        self.aim = None;
        info!(rows = self.config.rows, cols = self.config.cols, "phase started");
        Ok(())
    }

    /// Tear the field down at phase end.
    pub fn destroy_field(&mut self) {
        if self.field.take().is_some() {
            debug!("field destroyed");
        }
        self.aim = None;
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn outcome(&self) -> Outcome {
        match &self.field {
            None => Outcome::Idle,
            Some(f) if f.is_lost() => Outcome::Lost,
            Some(f) if f.is_clear() => Outcome::Cleared,
            Some(_) => Outcome::InProgress,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.field.as_ref().is_some_and(Field::is_clear)
    }

    pub fn aim(&self) -> Option<Target> {
        self.aim
    }

    /// Move the sight. Aiming at an indicator highlights its neighbors;
    /// moving away clears the highlight.
    pub fn set_aim(&mut self, target: Option<Target>) {
        if self.aim == target {
            return;
        }
        let previous = std::mem::replace(&mut self.aim, target);
        let Some(field) = self.field.as_mut() else {
            return;
        };
        if let Some(Target::Indicator(pos)) = previous {
            field.highlight_neighbours(pos, false);
        }
        if let Some(Target::Indicator(pos)) = target {
            field.highlight_neighbours(pos, true);
        }
    }

    /// Fire at a cell or at a fulfilled indicator's neighbors.
    pub fn primary_fire(&mut self, target: Target) -> Vec<(Pos, HitOutcome)> {
        let power = self.config.hit_power;
        let Some(field) = self.active_field() else {
            return Vec::new();
        };
        let outcomes = match target {
            Target::Cell(pos) => vec![(pos, field.trigger_hit(pos, power, true, true))],
            Target::Indicator(pos) => field.fire_at_fulfilled(pos, power),
        };
        self.log_outcome();
        outcomes
    }

    /// Toggle the flag on a cell. Indicators ignore secondary fire.
    pub fn secondary_fire(&mut self, target: Target) -> bool {
        let Some(field) = self.active_field() else {
            return false;
        };
        match target {
            Target::Cell(pos) => field.toggle_flag(pos),
            Target::Indicator(_) => false,
        }
    }

    /// Fatality estimate of the aimed cell.
    pub fn aimed_fatality(&self) -> Option<f32> {
        match (self.aim, &self.field) {
            (Some(Target::Cell(pos)), Some(field)) => field.fatality_chance(pos),
            _ => None,
        }
    }

    pub fn loot_collected(&self) -> u32 {
        self.field.as_ref().map_or(0, Field::loot_collected)
    }

    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        self.field.as_mut().map(Field::drain_events).unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<FieldSnapshot> {
        self.field.as_ref().map(Field::snapshot)
    }

    /// The field, while the phase is still undecided.
    fn active_field(&mut self) -> Option<&mut Field> {
        if self.outcome() != Outcome::InProgress {
            return None;
        }
        self.field.as_mut()
    }

    fn log_outcome(&self) {
        match self.outcome() {
            Outcome::Cleared => info!(loot = self.loot_collected(), "field cleared"),
            Outcome::Lost => info!("mine detonated, phase lost"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::HitPower;
    use crate::field::tests::field_with_mines;
    use crate::types::SelectionState;

    fn config(rows: usize, cols: usize, mine_percent: f64, seed: u64) -> FieldConfig {
        FieldConfig {
            rows,
            cols,
            mine_percent,
            seed: Some(seed),
            ..FieldConfig::default()
        }
    }

    fn first(session: &GameSession, pred: impl Fn(&crate::cell::Cell) -> bool) -> Pos {
        session
            .field()
            .unwrap()
            .cells()
            .iter()
            .find(|c| pred(c))
            .map(|c| c.pos)
            .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = GameSession::new(FieldConfig { cols: 0, ..FieldConfig::default() });
        assert!(matches!(err, Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn test_mine_free_field_is_cleared_at_start() {
        let session = GameSession::new(config(5, 5, 0.0, 1)).unwrap();
        assert_eq!(session.outcome(), Outcome::Cleared);
        assert!(session.is_clear());
        let field = session.field().unwrap();
        assert_eq!(field.cells().iter().filter(|c| c.revealed).count(), 25);
    }

    #[test]
    fn test_seeded_sessions_are_identical() {
        let a = GameSession::new(config(9, 9, 0.2, 77)).unwrap();
        let b = GameSession::new(config(9, 9, 0.2, 77)).unwrap();
        assert_eq!(a.snapshot().unwrap().cells, b.snapshot().unwrap().cells);
    }

    #[test]
    fn test_primary_fire_on_mine_loses_and_freezes_input() {
        let mut session = GameSession::new(FieldConfig {
            hit_power: HitPower::FULL,
            ..config(9, 9, 0.3, 5)
        })
        .unwrap();
        let mine = first(&session, |c| c.is_mined);

        let outcomes = session.primary_fire(Target::Cell(mine));
        assert_eq!(outcomes, vec![(mine, HitOutcome::Fatal)]);
        assert_eq!(session.outcome(), Outcome::Lost);

        let safe = first(&session, |c| !c.is_mined && !c.detonated);
        assert!(session.primary_fire(Target::Cell(safe)).is_empty());
        assert!(!session.secondary_fire(Target::Cell(safe)));
    }

    #[test]
    fn test_primary_fire_needs_every_sensor() {
        let mut session = GameSession::new(FieldConfig {
            sensors_per_cell: 3,
            hit_power: HitPower::Sensors(1),
            ..config(9, 9, 0.3, 6)
        })
        .unwrap();
        let safe = first(&session, |c| !c.is_mined && !c.detonated);

        for remaining in [2, 1] {
            let outcomes = session.primary_fire(Target::Cell(safe));
            assert_eq!(outcomes, vec![(safe, HitOutcome::Absorbed { remaining })]);
        }
        let outcomes = session.primary_fire(Target::Cell(safe));
        assert!(matches!(outcomes[0].1, HitOutcome::Revealed { .. }));
    }

    #[test]
    fn test_secondary_fire_toggles_flags() {
        let mut session = GameSession::new(config(9, 9, 0.3, 8)).unwrap();
        let hidden = first(&session, |c| !c.detonated);
        let max = session.field().unwrap().budget().max_flags();

        assert!(session.secondary_fire(Target::Cell(hidden)));
        assert_eq!(session.field().unwrap().budget().available(), max - 1);
        assert!(session.secondary_fire(Target::Cell(hidden)));
        assert_eq!(session.field().unwrap().budget().available(), max);
        assert!(!session.secondary_fire(Target::Indicator(hidden)));
    }

    #[test]
    fn test_aim_at_indicator_highlights_neighbours() {
        let mut session = GameSession::new(FieldConfig {
            hit_power: HitPower::FULL,
            ..config(9, 9, 0.2, 9)
        })
        .unwrap();
        let indicator = first(&session, |c| c.revealed && c.neighbor_mine_count > 0);

        session.set_aim(Some(Target::Indicator(indicator)));
        let field = session.field().unwrap();
        for &n in field.neighbors(indicator) {
            let cell = field.get(n).unwrap();
            assert_eq!(cell.selection.is_neighbour_mode(), !cell.detonated);
        }

        // A highlighted neighbor that detonates must still un-highlight.
        let field = session.field().unwrap();
        let lit_safe = field
            .neighbors(indicator)
            .iter()
            .copied()
            .find(|&n| field.get(n).is_some_and(|c| !c.detonated && !c.is_mined));
        if let Some(pos) = lit_safe {
            let outcomes = session.primary_fire(Target::Cell(pos));
            assert!(matches!(outcomes[0].1, HitOutcome::Revealed { .. }));
        }

        session.set_aim(None);
        assert!(session
            .field()
            .unwrap()
            .cells()
            .iter()
            .all(|c| !c.selection.is_neighbour_mode()));
    }

    #[test]
    fn test_highlight_cleared_after_firing_at_aimed_indicator() {
        // 3x3, mine at (0,0). Reveal (1,1), flag the mine, then fire at the
        // fulfilled indicator while it is aimed.
        let mut session = GameSession {
            config: FieldConfig {
                hit_power: HitPower::FULL,
                ..FieldConfig::default()
            },
            field: Some(field_with_mines(3, 3, &[Pos::new(0, 0)], 1)),
            aim: None,
        };
        let indicator = Pos::new(1, 1);
        session.primary_fire(Target::Cell(indicator));
        assert!(session.secondary_fire(Target::Cell(Pos::new(0, 0))));

        session.set_aim(Some(Target::Indicator(indicator)));
        let outcomes = session.primary_fire(Target::Indicator(indicator));
        assert_eq!(outcomes.len(), 7);
        assert_eq!(session.outcome(), Outcome::Cleared);

        session.set_aim(None);
        let field = session.field().unwrap();
        let stuck: Vec<_> = field
            .cells()
            .iter()
            .filter(|c| c.selection.is_neighbour_mode())
            .map(|c| (c.pos, c.selection))
            .collect();
        assert!(stuck.is_empty(), "highlights left after aim cleared: {:?}", stuck);
        assert_eq!(field.get(Pos::new(0, 0)).unwrap().selection, SelectionState::Flagged);
    }

    #[test]
    fn test_aimed_fatality_reads_cell_estimate() {
        let mut session = GameSession::new(config(9, 9, 0.2, 10)).unwrap();
        assert_eq!(session.aimed_fatality(), None);
        let hidden = first(&session, |c| !c.detonated);
        session.set_aim(Some(Target::Cell(hidden)));
        let chance = session.aimed_fatality().unwrap();
        assert!((0.0..=1.0).contains(&chance));
    }

    #[test]
    fn test_flagging_every_mine_and_firing_indicators_clears() {
        let mut session = GameSession::new(FieldConfig {
            hit_power: HitPower::FULL,
            ..config(8, 8, 0.15, 12)
        })
        .unwrap();
        let mines: Vec<Pos> = session
            .field()
            .unwrap()
            .cells()
            .iter()
            .filter(|c| c.is_mined)
            .map(|c| c.pos)
            .collect();
        if session.outcome() == Outcome::InProgress {
            for &m in &mines {
                assert!(session.secondary_fire(Target::Cell(m)));
            }
            assert_eq!(session.field().unwrap().budget().available(), 0);
        }

        // Every revealed indicator is now fulfilled; sweep until nothing moves.
        loop {
            let indicators: Vec<Pos> = session
                .field()
                .unwrap()
                .cells()
                .iter()
                .filter(|c| c.revealed)
                .map(|c| c.pos)
                .collect();
            let mut progressed = false;
            for pos in indicators {
                let outcomes = session.primary_fire(Target::Indicator(pos));
                progressed |= outcomes.iter().any(|(_, o)| *o != HitOutcome::Ignored);
            }
            if !progressed {
                break;
            }
        }
        // Pockets walled in by mines are never next to an indicator.
        let rest: Vec<Pos> = session
            .field()
            .unwrap()
            .cells()
            .iter()
            .filter(|c| !c.detonated && !c.is_flagged())
            .map(|c| c.pos)
            .collect();
        for pos in rest {
            session.primary_fire(Target::Cell(pos));
        }
        assert_eq!(session.outcome(), Outcome::Cleared);
        assert!(!session.field().unwrap().is_lost());
    }

    #[test]
    fn test_destroy_field() {
        let mut session = GameSession::new(config(4, 4, 0.1, 3)).unwrap();
        session.destroy_field();
        assert_eq!(session.outcome(), Outcome::Idle);
        assert!(session.snapshot().is_none());
        assert!(session.drain_events().is_empty());
        assert!(session.primary_fire(Target::Cell(Pos::new(0, 0))).is_empty());
    }
}
