//! Minefield simulation core.
//!
//! Builds mined grids, absorbs hits through per-cell sensors, cascades
//! reveals across zero cells, gates flags behind a shared budget and
//! estimates how likely each hidden cell is to be a mine. Presentation
//! (camera, audio, particles, UI) stays outside; it drives a
//! [`session::GameSession`] and drains its events.
//!
//! Grids are flat row-major arrays: `cells[row * cols + col]`. On wasm32 the
//! same layout crosses into JS as typed arrays.

pub mod board;
pub mod budget;
pub mod cascade;
pub mod cell;
pub mod config;
pub mod estimator;
pub mod events;
pub mod field;
pub mod loot;
pub mod rng;
pub mod selection;
pub mod session;
pub mod types;

pub use cascade::HitOutcome;
pub use cell::HitPower;
pub use config::{ConfigError, FieldConfig};
pub use events::{BudgetEvent, FieldEvent};
pub use field::{Field, FieldSnapshot};
pub use session::{GameSession, Outcome, Target};
pub use types::{Pos, SelectionState};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::config::FieldConfig;
    use crate::session::{GameSession, Target};
    use crate::types::Pos;

    /// JS handle on one game phase.
    #[wasm_bindgen(js_name = "MinefieldSession")]
    pub struct WasmSession {
        inner: GameSession,
    }

    #[wasm_bindgen(js_class = "MinefieldSession")]
    impl WasmSession {
        /// Build from a config object; missing keys take defaults.
        #[wasm_bindgen(constructor)]
        pub fn new(config: JsValue) -> Result<WasmSession, JsError> {
            let config = parse_config(config)?;
            let inner = GameSession::new(config)?;
            Ok(Self { inner })
        }

        /// Start a new field, replacing the current one.
        pub fn init(&mut self, config: JsValue) -> Result<(), JsError> {
            let config = parse_config(config)?;
            self.inner.init(config)?;
            Ok(())
        }

        #[wasm_bindgen(js_name = "destroyField")]
        pub fn destroy_field(&mut self) {
            self.inner.destroy_field();
        }

        #[wasm_bindgen(js_name = "aimCell")]
        pub fn aim_cell(&mut self, row: usize, col: usize) {
            self.inner.set_aim(Some(Target::Cell(Pos::new(row, col))));
        }

        #[wasm_bindgen(js_name = "aimIndicator")]
        pub fn aim_indicator(&mut self, row: usize, col: usize) {
            self.inner.set_aim(Some(Target::Indicator(Pos::new(row, col))));
        }

        #[wasm_bindgen(js_name = "clearAim")]
        pub fn clear_aim(&mut self) {
            self.inner.set_aim(None);
        }

        /// Primary fire at the current aim. Returns the number of cells hit.
        #[wasm_bindgen(js_name = "primaryFire")]
        pub fn primary_fire(&mut self) -> usize {
            match self.inner.aim() {
                Some(target) => self.inner.primary_fire(target).len(),
                None => 0,
            }
        }

        /// Secondary fire at the current aim. Returns whether a flag moved.
        #[wasm_bindgen(js_name = "secondaryFire")]
        pub fn secondary_fire(&mut self) -> bool {
            match self.inner.aim() {
                Some(target) => self.inner.secondary_fire(target),
                None => false,
            }
        }

        /// `"idle" | "inProgress" | "cleared" | "lost"`.
        pub fn outcome(&self) -> Result<JsValue, JsError> {
            Ok(serde_wasm_bindgen::to_value(&self.inner.outcome())?)
        }

        #[wasm_bindgen(js_name = "isClear")]
        pub fn is_clear(&self) -> bool {
            self.inner.is_clear()
        }

        #[wasm_bindgen(js_name = "isIndicationFulfilled")]
        pub fn is_indication_fulfilled(&self, row: usize, col: usize) -> bool {
            self.inner
                .field()
                .is_some_and(|f| f.is_indication_fulfilled(Pos::new(row, col)))
        }

        /// Estimate for the aimed cell, or `undefined`.
        #[wasm_bindgen(js_name = "aimedFatality")]
        pub fn aimed_fatality(&self) -> Option<f32> {
            self.inner.aimed_fatality()
        }

        /// Row-major fatality estimates, 0 for detonated cells.
        #[wasm_bindgen(js_name = "fatalityMap")]
        pub fn fatality_map(&self) -> js_sys::Float32Array {
            let map = self.inner.field().map(|f| f.fatality_map()).unwrap_or_default();
            let arr = js_sys::Float32Array::new_with_length(map.len() as u32);
            arr.copy_from(&map);
            arr
        }

        /// Row-major neighbor counts; -1 marks cells still hidden.
        #[wasm_bindgen(js_name = "neighborCounts")]
        pub fn neighbor_counts(&self) -> js_sys::Int8Array {
            let counts: Vec<i8> = self
                .inner
                .field()
                .map(|f| {
                    f.cells()
                        .iter()
                        .map(|c| if c.revealed { c.neighbor_mine_count as i8 } else { -1 })
                        .collect()
                })
                .unwrap_or_default();
            let arr = js_sys::Int8Array::new_with_length(counts.len() as u32);
            arr.copy_from(&counts);
            arr
        }

        #[wasm_bindgen(js_name = "flagsAvailable")]
        pub fn flags_available(&self) -> u32 {
            self.inner.field().map_or(0, |f| f.budget().available())
        }

        #[wasm_bindgen(js_name = "lootCollected")]
        pub fn loot_collected(&self) -> u32 {
            self.inner.loot_collected()
        }

        /// Events since the last call, as an array of tagged objects.
        #[wasm_bindgen(js_name = "drainEvents")]
        pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
            Ok(serde_wasm_bindgen::to_value(&self.inner.drain_events())?)
        }

        /// Full board view, or `null` without a field.
        pub fn snapshot(&self) -> Result<JsValue, JsError> {
            match self.inner.snapshot() {
                Some(snapshot) => Ok(serde_wasm_bindgen::to_value(&snapshot)?),
                None => Ok(JsValue::NULL),
            }
        }
    }

    fn parse_config(value: JsValue) -> Result<FieldConfig, JsError> {
        if value.is_undefined() || value.is_null() {
            return Ok(FieldConfig::default());
        }
        Ok(serde_wasm_bindgen::from_value(value)?)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM minefield ready".to_string()
    }
}
