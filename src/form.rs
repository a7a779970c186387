use std::collections::VecDeque;

use tracing::{info, warn};

use crate::features::{EngineeredFeatures, ModelRecord, build_record, derive_features};
use crate::importance::{ImportanceRow, rank_importances};
use crate::model::WinModel;
use crate::stats::{Field, MatchStats, Preset};

const MAX_LOGS: usize = 200;

pub fn prediction_banner(prediction: f64) -> String {
    format!("Predicted Win Probability (winPlacePerc): {prediction:.3}")
}

/// Everything one render pass derives from the current inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub features: EngineeredFeatures,
    pub record: ModelRecord,
    pub prediction: Option<f64>,
    pub importances: Vec<ImportanceRow>,
}

impl FormView {
    pub fn banner(&self) -> Option<String> {
        self.prediction.map(prediction_banner)
    }
}

/// Recomputes the whole view from raw inputs. The model is only asked for a
/// prediction when `trigger` is set; importances are read every time.
pub fn compute_view<M: WinModel + ?Sized>(
    stats: &MatchStats,
    model: &M,
    trigger: bool,
) -> FormView {
    let features = derive_features(stats);
    let record = build_record(stats, &features);
    let prediction = trigger.then(|| model.predict(&record));
    let importances = rank_importances(record.columns(), model.feature_importances());
    FormView {
        features,
        record,
        prediction,
        importances,
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub preset: Preset,
    pub stats: MatchStats,
    pub selected: usize,
    /// Result of the last trigger; cleared by any input change.
    pub prediction: Option<f64>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}

impl FormState {
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            stats: preset.defaults(),
            selected: 0,
            prediction: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected.min(Field::ALL.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Field::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(Field::ALL.len() - 1);
    }

    /// Resets every control to the preset's defaults. Re-selecting the
    /// current preset keeps the user's edits.
    pub fn select_preset(&mut self, preset: Preset) {
        if preset == self.preset {
            return;
        }
        self.preset = preset;
        self.stats = preset.defaults();
        self.prediction = None;
        info!(preset = preset.label(), "preset selected");
        self.push_log(format!("[INFO] Preset: {}", preset.label()));
    }

    pub fn cycle_preset(&mut self) {
        self.select_preset(self.preset.next());
    }

    /// Moves the selected control by `steps` small steps (or large steps when `big`).
    pub fn adjust_selected(&mut self, steps: f64, big: bool) {
        let field = self.selected_field();
        let spec = field.spec();
        let step = if big { spec.big_step } else { spec.step };
        let before = self.stats.get(field);
        let after = self.stats.adjust(field, steps * step);
        if after != before {
            self.prediction = None;
        }
    }

    pub fn set_field(&mut self, field: Field, value: f64) -> f64 {
        let stored = self.stats.set(field, value);
        self.prediction = None;
        stored
    }

    /// Runs a render pass with the trigger set and keeps the result for display.
    pub fn predict<M: WinModel + ?Sized>(&mut self, model: &M) -> FormView {
        let view = compute_view(&self.stats, model, true);
        self.prediction = view.prediction;
        if let Some(p) = view.prediction {
            info!(prediction = p, preset = self.preset.label(), "prediction");
            if !(0.0..=1.0).contains(&p) {
                warn!(prediction = p, "prediction outside [0, 1]");
            }
            self.push_log(format!("[INFO] {}", prediction_banner(p)));
        }
        view
    }

    pub fn view<M: WinModel + ?Sized>(&self, model: &M) -> FormView {
        let mut view = compute_view(&self.stats, model, false);
        view.prediction = self.prediction;
        view
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(format!("{stamp} {}", line.into()));
    }
}

/// Text slider such as `[=====-----]` for a value at `ratio` of its domain.
pub fn slider_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "=".repeat(filled), "-".repeat(width - filled))
}

pub fn slider_line(field: Field, value: f64, bar_width: usize) -> String {
    let spec = field.spec();
    format!(
        "{:<18} {} {:>7}",
        spec.label,
        slider_bar(spec.ratio(value), bar_width),
        spec.format(value)
    )
}
