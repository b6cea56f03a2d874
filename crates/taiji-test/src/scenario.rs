//! Scripted practice sessions
//!
//! A scenario feeds synthetic frames (optionally through detector chaos)
//! into a controller on a manual clock, fires lifecycle events at fixed
//! steps, and checks the pipeline invariants after every step.

use std::collections::HashMap;
use std::sync::Arc;

use taiji_core::{ManualClock, Timestamp};
use taiji_pose::{FrameEvaluation, Status};
use taiji_runtime::{Controller, ReferencePosture, RuntimeConfig, RuntimeStats, StepOutcome};
use taiji_session::{SessionPhase, SessionState};
use taiji_source::{SyntheticConfig, SyntheticSource};

use crate::chaos::{ChaosConfig, ChaosSource, ChaosStats};

/// Lifecycle event fired by the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    Pause,
    Stop,
    Reset,
}

/// Scenario configuration
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    /// Frames the synthetic source produces before closing
    pub frames: u64,
    pub synthetic: SyntheticConfig,
    pub chaos: Option<ChaosConfig>,
    pub chaos_seed: u64,
    pub posture: ReferencePosture,
    pub runtime: RuntimeConfig,
    /// `(step, event)` pairs; each fires just before that step
    pub script: Vec<(u64, LifecycleEvent)>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            frames: 100,
            synthetic: SyntheticConfig::default(),
            chaos: None,
            chaos_seed: 7,
            posture: ReferencePosture::default(),
            runtime: RuntimeConfig::default(),
            script: vec![(0, LifecycleEvent::Start)],
        }
    }
}

impl ScenarioConfig {
    /// Ten seconds of practice, started at once, never paused
    pub fn steady_practice() -> Self {
        Self::default()
    }

    /// Start, pause for a second, resume, stop
    pub fn with_pauses() -> Self {
        Self {
            frames: 40,
            script: vec![
                (0, LifecycleEvent::Start),
                (10, LifecycleEvent::Pause),
                (20, LifecycleEvent::Start),
                (30, LifecycleEvent::Stop),
            ],
            ..Self::default()
        }
    }

    /// Long session through a misbehaving detector
    pub fn stress() -> Self {
        Self {
            frames: 1_000,
            chaos: Some(ChaosConfig::hostile()),
            ..Self::default()
        }
    }

    pub fn with_chaos(mut self, chaos: ChaosConfig) -> Self {
        self.chaos = Some(chaos);
        self
    }

    pub fn with_script(mut self, script: Vec<(u64, LifecycleEvent)>) -> Self {
        self.script = script;
        self
    }
}

/// Result of a scenario run
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub stats: RuntimeStats,
    pub chaos: ChaosStats,
    pub final_state: SessionState,
    pub status_counts: HashMap<Status, u64>,
    pub violations: Vec<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn status_count(&self, status: Status) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}

/// Scenario harness
pub struct ScenarioHarness {
    config: ScenarioConfig,
    clock: Arc<ManualClock>,
    controller: Controller<ChaosSource<SyntheticSource>>,
    violations: Vec<String>,
    status_counts: HashMap<Status, u64>,
}

impl ScenarioHarness {
    pub fn new(config: ScenarioConfig) -> Self {
        let clock = Arc::new(ManualClock::new(config.synthetic.start));
        let synthetic = SyntheticSource::new(SyntheticConfig {
            limit: Some(config.frames),
            ..config.synthetic.clone()
        });
        let chaos = config.chaos.clone().unwrap_or_else(ChaosConfig::clean);
        let source = ChaosSource::new(synthetic, chaos, config.chaos_seed);
        let controller = Controller::with_clock(
            source,
            config.posture.clone(),
            config.runtime.clone(),
            clock.clone(),
        );

        Self {
            config,
            clock,
            controller,
            violations: Vec::new(),
            status_counts: HashMap::new(),
        }
    }

    pub fn controller(&self) -> &Controller<ChaosSource<SyntheticSource>> {
        &self.controller
    }

    /// Drive the scenario until the source closes
    pub fn run(&mut self) -> ScenarioResult {
        let mut step = 0u64;
        loop {
            self.fire_events(step);

            let before = self.controller.session().state();
            let outcome = self.controller.step();
            let after = self.controller.session().state();

            match outcome {
                StepOutcome::Evaluated => {
                    if let Some(evaluation) = self.controller.last_evaluation().cloned() {
                        *self.status_counts.entry(evaluation.status).or_default() += 1;
                        self.check_evaluation(step, &evaluation);
                    }
                    self.check_fold(step, &before, &after, true);
                }
                StepOutcome::OutOfOrder => self.check_fold(step, &before, &after, false),
                StepOutcome::Pending => {}
                StepOutcome::Closed => break,
            }

            self.clock.advance(self.config.synthetic.frame_interval);
            step += 1;
        }

        ScenarioResult {
            stats: self.controller.stats().clone(),
            chaos: self.controller.source().stats().clone(),
            final_state: self.controller.session().state(),
            status_counts: self.status_counts.clone(),
            violations: self.violations.clone(),
        }
    }

    fn fire_events(&mut self, step: u64) {
        let session = self.controller.session();
        for (_, event) in self.config.script.iter().filter(|(at, _)| *at == step) {
            match event {
                LifecycleEvent::Start => {
                    session.start();
                }
                LifecycleEvent::Pause => {
                    session.pause();
                }
                LifecycleEvent::Stop => {
                    session.stop();
                }
                LifecycleEvent::Reset => session.reset(),
            }
        }
    }

    fn check_evaluation(&mut self, step: u64, evaluation: &FrameEvaluation) {
        let accuracy = evaluation.accuracy_percent;
        if !accuracy.is_finite() || !(0.0..=100.0).contains(&accuracy) {
            self.violations
                .push(format!("step {step}: accuracy {accuracy} outside [0, 100]"));
        }

        let expected = Status::from_accuracy(accuracy, evaluation.evaluated());
        if evaluation.status != expected {
            self.violations.push(format!(
                "step {step}: status {:?} does not match accuracy {accuracy} ({expected:?})",
                evaluation.status
            ));
        }

        for verdict in &evaluation.verdicts {
            if !(0.0..=180.0).contains(&verdict.angle) {
                self.violations.push(format!(
                    "step {step}: {} angle {} outside [0, 180]",
                    verdict.joint, verdict.angle
                ));
            }
            if self.config.posture.tolerances.get(&verdict.joint).is_none() {
                self.violations
                    .push(format!("step {step}: {} scored without a band", verdict.joint));
            }
        }
    }

    fn check_fold(&mut self, step: u64, before: &SessionState, after: &SessionState, evaluated: bool) {
        let folded = evaluated && before.phase == SessionPhase::Active;
        let expected = before.frame_count + u64::from(folded);
        if after.frame_count != expected {
            self.violations.push(format!(
                "step {step}: frame count {} -> {} in {:?}",
                before.frame_count, after.frame_count, before.phase
            ));
        }

        let mean = after.running_mean_accuracy;
        if !(0.0..=100.0).contains(&mean) {
            self.violations
                .push(format!("step {step}: running mean {mean} outside [0, 100]"));
        }

        if after.frame_count == 0 && mean != 0.0 {
            self.violations
                .push(format!("step {step}: empty session has mean {mean}"));
        }
    }
}

/// Timestamp of the `step`th frame of a scenario
pub fn step_timestamp(config: &ScenarioConfig, step: u64) -> Timestamp {
    config
        .synthetic
        .start
        .saturating_add(config.synthetic.frame_interval * step as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use taiji_source::LimbAngles;

    #[test]
    fn test_steady_practice_scores_full() {
        let mut harness = ScenarioHarness::new(ScenarioConfig::steady_practice());
        let result = harness.run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.final_state.frame_count, 100);
        assert!((result.final_state.running_mean_accuracy - 100.0).abs() < 1e-9);
        assert_eq!(result.status_count(Status::Good), 100);
    }

    #[test]
    fn test_pauses_exclude_frames_and_time() {
        let mut harness = ScenarioHarness::new(ScenarioConfig::with_pauses());
        let result = harness.run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.stats.frames_evaluated, 40);
        assert_eq!(result.final_state.frame_count, 20);
        assert_eq!(result.final_state.phase, SessionPhase::Stopped);
        assert_eq!(result.final_state.active_elapsed, Duration::from_secs(2));
        assert_eq!(
            result.final_state.ended_at,
            Some(step_timestamp(&ScenarioConfig::with_pauses(), 30))
        );
    }

    #[test]
    fn test_reset_mid_session() {
        let config = ScenarioConfig {
            frames: 30,
            ..ScenarioConfig::default()
        }
        .with_script(vec![
            (0, LifecycleEvent::Start),
            (10, LifecycleEvent::Reset),
            (15, LifecycleEvent::Start),
        ]);
        let result = ScenarioHarness::new(config).run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.final_state.frame_count, 15);
        assert_eq!(result.final_state.started_at, Some(Timestamp::from_millis(1_500)));
    }

    #[test]
    fn test_never_started_folds_nothing() {
        let config = ScenarioConfig::default().with_script(Vec::new());
        let result = ScenarioHarness::new(config).run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.stats.frames_evaluated, 100);
        assert_eq!(result.final_state.frame_count, 0);
        assert_eq!(result.final_state.phase, SessionPhase::Idle);
    }

    #[test]
    fn test_bent_elbows_lower_the_score() {
        let mut config = ScenarioConfig {
            frames: 20,
            ..ScenarioConfig::default()
        };
        config.synthetic.jitter = LimbAngles::zero();
        config.synthetic.base.elbow = 95.0;

        let result = ScenarioHarness::new(config).run();
        assert!(result.passed(), "{:?}", result.violations);
        // Both elbows out of six scored joints
        let expected = 400.0 / 6.0;
        assert!((result.final_state.running_mean_accuracy - expected).abs() < 1e-9);
        assert_eq!(result.status_count(Status::Warning), 20);
    }

    #[test]
    fn test_hostile_detector_keeps_invariants() {
        let result = ScenarioHarness::new(ScenarioConfig::stress()).run();

        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.chaos.frames_lost > 0);
        assert!(result.stats.out_of_order > 0);
        assert_eq!(result.stats.out_of_order, result.chaos.frames_reordered);
        assert_eq!(
            result.stats.frames_evaluated + result.stats.out_of_order,
            result.chaos.frames_out
        );
        assert_eq!(result.final_state.frame_count, result.stats.frames_ingested);
    }

    #[test]
    fn test_occluded_frames_wait() {
        let config = ScenarioConfig {
            frames: 10,
            ..ScenarioConfig::default()
        }
        .with_chaos(ChaosConfig {
            occlusion: 1.0,
            ..ChaosConfig::clean()
        });
        let result = ScenarioHarness::new(config).run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.status_count(Status::Waiting), 10);
        assert_eq!(result.final_state.running_mean_accuracy, 0.0);
        assert_eq!(result.final_state.frame_count, 10);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn event() -> impl Strategy<Value = LifecycleEvent> {
            prop_oneof![
                Just(LifecycleEvent::Start),
                Just(LifecycleEvent::Pause),
                Just(LifecycleEvent::Stop),
                Just(LifecycleEvent::Reset),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn prop_random_scripts_keep_invariants(
                script in prop::collection::vec((0u64..60, event()), 0..12),
                seed in any::<u64>(),
            ) {
                let config = ScenarioConfig {
                    frames: 60,
                    chaos_seed: seed,
                    ..ScenarioConfig::default()
                }
                .with_chaos(ChaosConfig::poor())
                .with_script(script);

                let result = ScenarioHarness::new(config).run();
                prop_assert!(result.passed(), "{:?}", result.violations);
            }
        }
    }
}
