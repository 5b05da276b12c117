use serde::{Deserialize, Serialize};

/// All tunables of the difficulty score. Passed into the engine explicitly
/// so scoring stays pure and testable with varied configurations; defaults
/// match the shipped tuning.
///
/// Every weight may be 0 to disable a dimension: it then contributes to
/// neither the raw score nor the total weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    // Dimension weights.
    pub weight_coverage_500: f64,
    pub weight_coverage_1000: f64,
    pub weight_coverage_1500: f64,
    pub weight_chars_95: f64,
    pub weight_chars_99: f64,
    pub weight_order_95: f64,
    pub weight_order_99: f64,
    pub weight_char_types: f64,

    // Required-character-count bands: ≤ min scores 0, ≥ max scores the
    // full weight.
    pub chars_95_min: f64,
    pub chars_95_max: f64,
    pub chars_99_min: f64,
    pub chars_99_max: f64,

    // Average-rank bands (low rank = common characters = easy).
    pub order_95_min: f64,
    pub order_95_max: f64,
    pub order_99_min: f64,
    pub order_99_max: f64,

    /// Head-list size the excess-character-type count is measured against
    /// when no head list is loaded.
    pub char_types_baseline: usize,
    pub char_types_min: f64,
    pub char_types_max: f64,

    /// true: coverage maps linearly over 0–100%; false: per-threshold
    /// interval bands below apply.
    pub coverage_linear_mode: bool,
    pub coverage_500_min: f64,
    pub coverage_500_max: f64,
    pub coverage_1000_min: f64,
    pub coverage_1000_max: f64,
    pub coverage_1500_min: f64,
    pub coverage_1500_max: f64,

    /// Power-curve exponents; 1.0 is linear, below 1.0 accelerates growth.
    pub coverage_acceleration: f64,
    pub order_acceleration: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_coverage_500: 10.0,
            weight_coverage_1000: 10.0,
            weight_coverage_1500: 20.0,
            weight_chars_95: 0.0,
            weight_chars_99: 0.0,
            weight_order_95: 50.0,
            weight_order_99: 30.0,
            weight_char_types: 10.0,
            chars_95_min: 300.0,
            chars_95_max: 2500.0,
            chars_99_min: 400.0,
            chars_99_max: 4000.0,
            order_95_min: 400.0,
            order_95_max: 2000.0,
            order_99_min: 500.0,
            order_99_max: 3000.0,
            char_types_baseline: 1500,
            char_types_min: 0.0,
            char_types_max: 4500.0,
            coverage_linear_mode: true,
            coverage_500_min: 65.0,
            coverage_500_max: 92.0,
            coverage_1000_min: 80.0,
            coverage_1000_max: 98.0,
            coverage_1500_min: 88.0,
            coverage_1500_max: 99.5,
            coverage_acceleration: 0.8,
            order_acceleration: 0.7,
        }
    }
}

impl ScoringConfig {
    pub fn total_weight(&self) -> f64 {
        self.weight_coverage_500
            + self.weight_coverage_1000
            + self.weight_coverage_1500
            + self.weight_chars_95
            + self.weight_chars_99
            + self.weight_order_95
            + self.weight_order_99
            + self.weight_char_types
    }
}

/// Per-document inputs to the scoring engine, produced by the analysis
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreInputs {
    pub coverage_500: f64,
    pub coverage_1000: f64,
    pub coverage_1500: f64,
    pub chars_for_95: usize,
    pub chars_for_99: usize,
    pub avg_order_95: Option<f64>,
    pub avg_order_99: Option<f64>,
    pub extra_char_types: usize,
}

/// One dimension's contribution: score earned out of the configured
/// weight, plus the raw input it was derived from (`None` when the rank
/// average had no data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDetail {
    pub earned: f64,
    pub weight: f64,
    pub input: Option<f64>,
}

/// The scored result: normalized 0–100 difficulty, star display, and the
/// per-dimension breakdown. Immutable once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyResult {
    pub score: f64,
    pub stars: String,
    pub coverage_500: ScoreDetail,
    pub coverage_1000: ScoreDetail,
    pub coverage_1500: ScoreDetail,
    pub chars_95: ScoreDetail,
    pub chars_99: ScoreDetail,
    pub order_95: ScoreDetail,
    pub order_99: ScoreDetail,
    pub char_types: ScoreDetail,
    pub raw_score: f64,
    pub total_weight: f64,
}

impl DifficultyResult {
    pub fn details(&self) -> [(&'static str, &ScoreDetail); 8] {
        [
            ("coverage_500", &self.coverage_500),
            ("coverage_1000", &self.coverage_1000),
            ("coverage_1500", &self.coverage_1500),
            ("chars_95", &self.chars_95),
            ("chars_99", &self.chars_99),
            ("order_95", &self.order_95),
            ("order_99", &self.order_99),
            ("char_types", &self.char_types),
        ]
    }
}

// Higher coverage means easier text, so the score runs on the uncovered
// remainder. Linear mode spans the full 0–100% range; interval mode clamps
// to the configured band. Both apply the coverage exponent.
fn coverage_score(coverage: f64, weight: f64, min: f64, max: f64, cfg: &ScoringConfig) -> f64 {
    if cfg.coverage_linear_mode {
        let ratio = ((100.0 - coverage) / 100.0).clamp(0.0, 1.0);
        return weight * ratio.powf(cfg.coverage_acceleration);
    }
    if max <= min {
        // Degenerate band collapses to a step at max.
        return if coverage >= max { 0.0 } else { weight };
    }
    if coverage >= max {
        0.0
    } else if coverage <= min {
        weight
    } else {
        let ratio = (max - coverage) / (max - min);
        weight * ratio.powf(cfg.coverage_acceleration)
    }
}

// Plain clamp-and-interpolate, no exponent. The required-character-count
// and excess-type dimensions deliberately stay linear while coverage and
// rank do not.
fn interpolate(value: f64, min: f64, max: f64, weight: f64) -> f64 {
    if max <= min {
        return if value >= max { weight } else { 0.0 };
    }
    if value <= min {
        0.0
    } else if value >= max {
        weight
    } else {
        weight * (value - min) / (max - min)
    }
}

// Average-rank dimensions: missing data earns exactly half the weight (a
// fixed neutral default, not zero and not skipped); otherwise a clamped
// power-curve interpolation.
fn order_score(order: Option<f64>, weight: f64, min: f64, max: f64, accel: f64) -> f64 {
    let Some(value) = order else {
        return weight / 2.0;
    };
    if max <= min {
        return if value >= max { weight } else { 0.0 };
    }
    if value <= min {
        0.0
    } else if value >= max {
        weight
    } else {
        let ratio = (value - min) / (max - min);
        weight * ratio.powf(accel)
    }
}

/// Scores one document. Total over any input: degenerate configurations and
/// degenerate documents yield defined zero/neutral results, never an error.
/// Every dimension's earned score is bounded to [0, weight], which bounds
/// the normalized result to [0, 100].
pub fn score(cfg: &ScoringConfig, inputs: &ScoreInputs) -> DifficultyResult {
    let coverage_500 = ScoreDetail {
        earned: coverage_score(
            inputs.coverage_500,
            cfg.weight_coverage_500,
            cfg.coverage_500_min,
            cfg.coverage_500_max,
            cfg,
        ),
        weight: cfg.weight_coverage_500,
        input: Some(inputs.coverage_500),
    };
    let coverage_1000 = ScoreDetail {
        earned: coverage_score(
            inputs.coverage_1000,
            cfg.weight_coverage_1000,
            cfg.coverage_1000_min,
            cfg.coverage_1000_max,
            cfg,
        ),
        weight: cfg.weight_coverage_1000,
        input: Some(inputs.coverage_1000),
    };
    let coverage_1500 = ScoreDetail {
        earned: coverage_score(
            inputs.coverage_1500,
            cfg.weight_coverage_1500,
            cfg.coverage_1500_min,
            cfg.coverage_1500_max,
            cfg,
        ),
        weight: cfg.weight_coverage_1500,
        input: Some(inputs.coverage_1500),
    };

    let chars_95 = ScoreDetail {
        earned: interpolate(
            inputs.chars_for_95 as f64,
            cfg.chars_95_min,
            cfg.chars_95_max,
            cfg.weight_chars_95,
        ),
        weight: cfg.weight_chars_95,
        input: Some(inputs.chars_for_95 as f64),
    };
    let chars_99 = ScoreDetail {
        earned: interpolate(
            inputs.chars_for_99 as f64,
            cfg.chars_99_min,
            cfg.chars_99_max,
            cfg.weight_chars_99,
        ),
        weight: cfg.weight_chars_99,
        input: Some(inputs.chars_for_99 as f64),
    };

    let order_95 = ScoreDetail {
        earned: order_score(
            inputs.avg_order_95,
            cfg.weight_order_95,
            cfg.order_95_min,
            cfg.order_95_max,
            cfg.order_acceleration,
        ),
        weight: cfg.weight_order_95,
        input: inputs.avg_order_95,
    };
    let order_99 = ScoreDetail {
        earned: order_score(
            inputs.avg_order_99,
            cfg.weight_order_99,
            cfg.order_99_min,
            cfg.order_99_max,
            cfg.order_acceleration,
        ),
        weight: cfg.weight_order_99,
        input: inputs.avg_order_99,
    };

    let char_types = ScoreDetail {
        earned: interpolate(
            inputs.extra_char_types as f64,
            cfg.char_types_min,
            cfg.char_types_max,
            cfg.weight_char_types,
        ),
        weight: cfg.weight_char_types,
        input: Some(inputs.extra_char_types as f64),
    };

    let raw_score = coverage_500.earned
        + coverage_1000.earned
        + coverage_1500.earned
        + chars_95.earned
        + chars_99.earned
        + order_95.earned
        + order_99.earned
        + char_types.earned;
    let total_weight = cfg.total_weight();
    let score = if total_weight > 0.0 {
        raw_score / total_weight * 100.0
    } else {
        0.0
    };

    DifficultyResult {
        stars: star_display(score),
        score,
        coverage_500,
        coverage_1000,
        coverage_1500,
        chars_95,
        chars_99,
        order_95,
        order_99,
        char_types,
        raw_score,
        total_weight,
    }
}

/// Star display on the 20-unit scheme: each 5 points is one unit, every two
/// units merge into one ★, an odd unit shows as ☆, capped at ten ★ with at
/// least one ☆ on the floor. Input is clamped for display only.
pub fn star_display(score: f64) -> String {
    let units = (score.clamp(0.0, 100.0) / 5.0) as u32;
    let full_stars = (units / 2).min(10);
    let half_star = units % 2 == 1;

    let mut display = "★".repeat(full_stars as usize);
    if half_star && full_stars < 10 {
        display.push('☆');
    }
    if display.is_empty() {
        display.push('☆');
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_cfg() -> ScoringConfig {
        ScoringConfig {
            coverage_linear_mode: true,
            coverage_acceleration: 1.0,
            order_acceleration: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_linear_coverage_extremes() {
        let cfg = linear_cfg();
        // 0% coverage earns the full weight, 100% earns nothing.
        assert!((coverage_score(0.0, 10.0, 65.0, 92.0, &cfg) - 10.0).abs() < 1e-12);
        assert!(coverage_score(100.0, 10.0, 65.0, 92.0, &cfg).abs() < 1e-12);
        assert!((coverage_score(50.0, 10.0, 65.0, 92.0, &cfg) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_coverage_out_of_range_clamped() {
        let cfg = linear_cfg();
        let above = coverage_score(110.0, 10.0, 0.0, 0.0, &cfg);
        let below = coverage_score(-5.0, 10.0, 0.0, 0.0, &cfg);
        assert_eq!(above, 0.0);
        assert_eq!(below, 10.0);
    }

    #[test]
    fn test_interval_coverage_band() {
        let cfg = ScoringConfig {
            coverage_linear_mode: false,
            coverage_acceleration: 1.0,
            ..Default::default()
        };
        assert_eq!(coverage_score(95.0, 10.0, 65.0, 92.0, &cfg), 0.0);
        assert_eq!(coverage_score(60.0, 10.0, 65.0, 92.0, &cfg), 10.0);
        let mid = coverage_score(78.5, 10.0, 65.0, 92.0, &cfg);
        assert!((mid - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_band() {
        assert_eq!(interpolate(200.0, 300.0, 2500.0, 10.0), 0.0);
        assert_eq!(interpolate(3000.0, 300.0, 2500.0, 10.0), 10.0);
        let mid = interpolate(1400.0, 300.0, 2500.0, 10.0);
        assert!((mid - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_score_missing_data_is_neutral() {
        assert_eq!(order_score(None, 50.0, 400.0, 2000.0, 0.7), 25.0);
    }

    #[test]
    fn test_order_score_band() {
        assert_eq!(order_score(Some(100.0), 50.0, 400.0, 2000.0, 1.0), 0.0);
        assert_eq!(order_score(Some(5000.0), 50.0, 400.0, 2000.0, 1.0), 50.0);
        let mid = order_score(Some(1200.0), 50.0, 400.0, 2000.0, 1.0);
        assert!((mid - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_bands_do_not_divide_by_zero() {
        assert_eq!(interpolate(5.0, 10.0, 10.0, 7.0), 0.0);
        assert_eq!(interpolate(10.0, 10.0, 10.0, 7.0), 7.0);
        assert_eq!(order_score(Some(10.0), 7.0, 10.0, 10.0, 0.7), 7.0);
    }

    #[test]
    fn test_zero_total_weight_scores_zero() {
        let cfg = ScoringConfig {
            weight_coverage_500: 0.0,
            weight_coverage_1000: 0.0,
            weight_coverage_1500: 0.0,
            weight_chars_95: 0.0,
            weight_chars_99: 0.0,
            weight_order_95: 0.0,
            weight_order_99: 0.0,
            weight_char_types: 0.0,
            ..Default::default()
        };
        let result = score(&cfg, &ScoreInputs::default());
        assert_eq!(result.score, 0.0);
        assert!(result.score.is_finite());
        assert_eq!(result.total_weight, 0.0);
    }

    #[test]
    fn test_score_normalized_bounds() {
        let cfg = ScoringConfig::default();
        let hardest = ScoreInputs {
            coverage_500: 0.0,
            coverage_1000: 0.0,
            coverage_1500: 0.0,
            chars_for_95: 100_000,
            chars_for_99: 100_000,
            avg_order_95: Some(1e9),
            avg_order_99: Some(1e9),
            extra_char_types: 100_000,
        };
        let easiest = ScoreInputs {
            coverage_500: 100.0,
            coverage_1000: 100.0,
            coverage_1500: 100.0,
            chars_for_95: 0,
            chars_for_99: 0,
            avg_order_95: Some(1.0),
            avg_order_99: Some(1.0),
            extra_char_types: 0,
        };
        let hi = score(&cfg, &hardest);
        let lo = score(&cfg, &easiest);
        assert!((hi.score - 100.0).abs() < 1e-9);
        assert_eq!(lo.score, 0.0);
        for (_, d) in hi.details() {
            assert!(d.earned >= 0.0 && d.earned <= d.weight + 1e-12);
        }
    }

    #[test]
    fn test_score_scale_invariant_to_weight_units() {
        let inputs = ScoreInputs {
            coverage_500: 80.0,
            coverage_1000: 90.0,
            coverage_1500: 94.0,
            chars_for_95: 1200,
            chars_for_99: 2000,
            avg_order_95: Some(800.0),
            avg_order_99: Some(1100.0),
            extra_char_types: 700,
        };
        let base = ScoringConfig::default();
        let mut doubled = base.clone();
        doubled.weight_coverage_500 *= 2.0;
        doubled.weight_coverage_1000 *= 2.0;
        doubled.weight_coverage_1500 *= 2.0;
        doubled.weight_chars_95 *= 2.0;
        doubled.weight_chars_99 *= 2.0;
        doubled.weight_order_95 *= 2.0;
        doubled.weight_order_99 *= 2.0;
        doubled.weight_char_types *= 2.0;

        let a = score(&base, &inputs).score;
        let b = score(&doubled, &inputs).score;
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_missing_order_data_uses_half_weight() {
        let cfg = ScoringConfig::default();
        let inputs = ScoreInputs {
            avg_order_95: None,
            avg_order_99: None,
            ..Default::default()
        };
        let result = score(&cfg, &inputs);
        assert_eq!(result.order_95.earned, cfg.weight_order_95 / 2.0);
        assert_eq!(result.order_99.earned, cfg.weight_order_99 / 2.0);
        assert_eq!(result.order_95.input, None);
    }

    #[test]
    fn test_star_display_scheme() {
        assert_eq!(star_display(0.0), "☆");
        assert_eq!(star_display(4.9), "☆");
        assert_eq!(star_display(5.0), "☆");
        assert_eq!(star_display(10.0), "★");
        assert_eq!(star_display(15.0), "★☆");
        assert_eq!(star_display(55.0), "★★★★★☆");
        assert_eq!(star_display(100.0), "★★★★★★★★★★");
        // Display clamps out-of-range inputs.
        assert_eq!(star_display(250.0), "★★★★★★★★★★");
        assert_eq!(star_display(-3.0), "☆");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = ScoringConfig {
            weight_order_95: 42.0,
            coverage_linear_mode: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ScoringConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_config_partial_json_fills_defaults() {
        let cfg: ScoringConfig = serde_json::from_str(r#"{"weight_char_types": 5.0}"#).unwrap();
        assert_eq!(cfg.weight_char_types, 5.0);
        assert_eq!(cfg.weight_order_95, 50.0);
        assert!(cfg.coverage_linear_mode);
    }
}
