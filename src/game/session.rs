use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngExt};

use crate::config::Config;
use crate::game::clock;
use crate::game::equipment::{self, EquipmentItem};
use crate::game::feedback::{Cue, Mood, Presenter};
use crate::game::hold::{ActiveHold, HoldRelease, HoldTracker};
use crate::game::layout::{self, Footprint, PlayArea};
use crate::game::scores::HighScoreStore;
use crate::game::scoring::{self, ScoreTuning};

/// Seconds a resize has to stay quiet before positions regenerate.
pub const RELAYOUT_DEBOUNCE_S: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Menu,
    Playing,
    Paused,
    Ended,
}

/// One play session: round lifecycle, input routing, scoring, and the
/// per-frame tick. Collaborators are injected: the record store at
/// construction, the presenter and the current time on every call. Nothing
/// here reaches for process-wide state.
pub struct Session<R: Rng = StdRng> {
    config: Config,
    scores: HighScoreStore,
    rng: R,
    phase: SessionPhase,
    equipment: Vec<EquipmentItem>,
    tracker: HoldTracker,
    score: u32,
    completed: usize,
    target_count: usize,
    area: PlayArea,
    paused_at_s: Option<f64>,
    pending_relayout: Option<(PlayArea, f64)>,
}

impl Session<StdRng> {
    pub fn new(config: Config, scores: HighScoreStore) -> Self {
        Self::with_rng(config, scores, rand::make_rng::<StdRng>())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(config: Config, scores: HighScoreStore, rng: R) -> Self {
        Self {
            config,
            scores,
            rng,
            phase: SessionPhase::Menu,
            equipment: Vec::new(),
            tracker: HoldTracker::new(),
            score: 0,
            completed: 0,
            target_count: 0,
            area: PlayArea {
                width: 0.0,
                height: 0.0,
            },
            paused_at_s: None,
            pending_relayout: None,
        }
    }

    #[inline(always)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[inline(always)]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline(always)]
    pub fn completed_count(&self) -> usize {
        self.completed
    }

    #[inline(always)]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[inline(always)]
    pub fn equipment(&self) -> &[EquipmentItem] {
        &self.equipment
    }

    #[inline(always)]
    pub fn active_hold(&self) -> Option<ActiveHold> {
        self.tracker.active()
    }

    #[inline(always)]
    pub fn records(&self) -> &HighScoreStore {
        &self.scores
    }

    fn tuning(&self) -> ScoreTuning {
        ScoreTuning {
            points_leniency_s: self.config.points_leniency_seconds,
            accuracy_leniency_s: self.config.accuracy_leniency_seconds,
        }
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            size: self.config.item_size_px,
            padding: self.config.item_padding_px,
        }
    }

    /// Starts a fresh round in `area`. Score and progress reset, a new item
    /// count is drawn, and equipment is placed with new random targets. Any
    /// stale hold is dropped.
    pub fn start(&mut self, area: PlayArea, presenter: &mut dyn Presenter) {
        self.phase = SessionPhase::Playing;
        self.score = 0;
        self.completed = 0;
        self.tracker.clear();
        self.paused_at_s = None;
        self.pending_relayout = None;
        self.area = area;
        self.target_count = self
            .rng
            .random_range(self.config.min_items..=self.config.max_items);
        self.equipment = self.build_equipment();
        info!("Round started: {} equipment to master", self.target_count);
        presenter.on_round_start(self.target_count);
        presenter.show_message("Pick an equipment", Mood::Info);
    }

    fn build_equipment(&mut self) -> Vec<EquipmentItem> {
        let footprint = self.footprint();
        let factor = self.config.overlap_factor;
        let area = self.area;
        let count = self.target_count;
        let positions = layout::place_items(&mut self.rng, area, footprint, factor, count);
        let (min_t, max_t) = (
            self.config.min_target_seconds,
            self.config.max_target_seconds,
        );
        let mut items = Vec::with_capacity(count);
        for (i, pos) in positions.into_iter().enumerate() {
            let target = self.rng.random_range(min_t..=max_t).round();
            items.push(EquipmentItem::new(
                i,
                equipment::catalog_name(i),
                target,
                pos.x,
                pos.y,
            ));
        }
        items
    }

    /// A press on `item_id`. Silently ignored outside a round, while paused,
    /// while another hold is active, or on a completed item.
    pub fn press(&mut self, item_id: usize, now_s: f64, presenter: &mut dyn Presenter) {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Paused) {
            return;
        }
        let paused = self.phase == SessionPhase::Paused;
        let Some(item) = self.equipment.iter().find(|it| it.id == item_id) else {
            return;
        };
        if self.tracker.begin(item, paused, now_s) {
            debug!(
                "Hold started on {} (target {:.0}s)",
                item.name, item.target_seconds
            );
            presenter.play_cue(Cue::Click);
            presenter.render_held(item, 0.0, 0.0);
        }
    }

    /// A release on `item_id`. `canceled` marks the pointer leaving the
    /// item rather than a deliberate release. A release with no matching
    /// active hold is a silent no-op, including the second of two releases
    /// for the same press. While paused, the elapsed time is taken up to
    /// the pause moment, so paused time never counts toward a hold.
    pub fn release(
        &mut self,
        item_id: usize,
        canceled: bool,
        now_s: f64,
        presenter: &mut dyn Presenter,
    ) {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Paused) {
            return;
        }
        let effective_now = match self.paused_at_s {
            Some(paused_at) => paused_at.min(now_s),
            None => now_s,
        };
        let Some(index) = self.equipment.iter().position(|it| it.id == item_id) else {
            return;
        };
        let release = self
            .tracker
            .end(&mut self.equipment[index], canceled, effective_now);
        match release {
            None => {}
            Some(HoldRelease::Completed { elapsed_s }) => {
                self.on_completed(index, elapsed_s, presenter);
            }
            Some(HoldRelease::TooEarly {
                elapsed_s,
                canceled,
            }) => {
                let item = self.equipment[index].clone();
                debug!("Hold on {} failed at {:.1}s", item.name, elapsed_s);
                presenter.play_cue(Cue::Fail);
                presenter.render_failed(&item, elapsed_s);
                if canceled {
                    presenter.show_message(
                        "Coach: Stay in the zone! The weights are shy.",
                        Mood::Bad,
                    );
                } else {
                    presenter.show_message(
                        &format!("Coach: Slipped at {elapsed_s:.1}s. Grip like you mean it!"),
                        Mood::Bad,
                    );
                }
            }
        }
    }

    fn on_completed(&mut self, index: usize, elapsed_s: f64, presenter: &mut dyn Presenter) {
        let item = self.equipment[index].clone();
        let hold_score = scoring::evaluate(elapsed_s, item.target_seconds, &self.tuning());
        self.score += hold_score.points;
        self.completed += 1;
        let is_new_best = self
            .scores
            .update(item.name, hold_score.points, hold_score.accuracy);
        let delta = (elapsed_s - item.target_seconds).abs();
        presenter.render_completed(&item);
        if is_new_best {
            presenter.play_cue(Cue::HighScore);
            presenter.show_message(
                &format!(
                    "NEW HIGH SCORE for {}! +{} pts",
                    item.name, hold_score.points
                ),
                Mood::Good,
            );
        } else {
            presenter.play_cue(Cue::Success);
            presenter.show_message(
                &format!(
                    "Nailed it! +{} pts (off by {delta:.1}s)",
                    hold_score.points
                ),
                Mood::Good,
            );
        }
        presenter.on_item_completed(&item, hold_score.points, is_new_best);
        if self.completed >= self.target_count {
            self.end_round(presenter);
        }
    }

    // A round only ends by completing everything; there is no timer-driven
    // loss. The phase guard keeps the transition to Ended single-shot.
    fn end_round(&mut self, presenter: &mut dyn Presenter) {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Paused) {
            return;
        }
        self.phase = SessionPhase::Ended;
        self.tracker.clear();
        self.paused_at_s = None;
        info!(
            "Round won: {} points across {} holds",
            self.score, self.completed
        );
        presenter.on_round_end(true, self.score, self.completed, self.target_count);
    }

    /// Valid only while playing; anything else (including a second pause)
    /// is a no-op.
    pub fn pause(&mut self, now_s: f64, presenter: &mut dyn Presenter) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        self.phase = SessionPhase::Paused;
        self.paused_at_s = Some(now_s);
        presenter.show_message("Paused. Hydration break!", Mood::Info);
    }

    /// Valid only while paused. A held item does not age across the pause:
    /// its start timestamp is shifted forward by the paused interval.
    pub fn resume(&mut self, now_s: f64, presenter: &mut dyn Presenter) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.phase = SessionPhase::Playing;
        if let Some(paused_at) = self.paused_at_s.take() {
            self.tracker.shift_start((now_s - paused_at).max(0.0));
        }
        presenter.show_message("Back to the grind!", Mood::Good);
    }

    /// One frame of the loop. Always safe to call in any phase, so the
    /// ticker never needs re-registration; gameplay work only happens while
    /// playing: the held item's visual elapsed time and the wall clock, plus
    /// any relayout whose debounce ran out.
    pub fn tick(&mut self, now_s: f64, presenter: &mut dyn Presenter) {
        self.apply_pending_relayout(now_s);
        if self.phase != SessionPhase::Playing {
            return;
        }
        if let Some((item_id, elapsed_s)) = self.tracker.elapsed(now_s)
            && let Some(item) = self.equipment.iter().find(|it| it.id == item_id)
        {
            let fraction = (elapsed_s / item.target_seconds).clamp(0.0, 1.0);
            presenter.render_held(item, elapsed_s, fraction);
        }
        presenter.render_clock(&clock::wall_clock_hhmmss());
    }

    /// Asks for the current item set to be re-placed into `area`. Debounced;
    /// the positions regenerate on the first tick after the viewport stays
    /// quiet for [`RELAYOUT_DEBOUNCE_S`]. Scores, completion, and targets
    /// are untouched.
    pub fn request_relayout(&mut self, area: PlayArea, now_s: f64) {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Paused) {
            return;
        }
        self.pending_relayout = Some((area, now_s + RELAYOUT_DEBOUNCE_S));
    }

    fn apply_pending_relayout(&mut self, now_s: f64) {
        let Some((area, deadline)) = self.pending_relayout else {
            return;
        };
        if now_s < deadline {
            return;
        }
        self.pending_relayout = None;
        self.area = area;
        let footprint = self.footprint();
        let factor = self.config.overlap_factor;
        let count = self.equipment.len();
        let positions = layout::place_items(&mut self.rng, area, footprint, factor, count);
        for (item, pos) in self.equipment.iter_mut().zip(positions) {
            item.x = pos.x;
            item.y = pos.y;
        }
        debug!(
            "Relayout applied for {:.0}x{:.0}",
            area.width, area.height
        );
    }

    /// Back to the menu from any phase; drops any active hold.
    pub fn exit_to_menu(&mut self, presenter: &mut dyn Presenter) {
        self.phase = SessionPhase::Menu;
        self.tracker.clear();
        self.paused_at_s = None;
        self.pending_relayout = None;
        presenter.show_message("Coach: Strategy time at the menu.", Mood::Info);
    }
}

#[cfg(test)]
mod tests {
    use super::{RELAYOUT_DEBOUNCE_S, Session, SessionPhase};
    use crate::config::Config;
    use crate::game::equipment::EquipmentItem;
    use crate::game::feedback::{Cue, Mood, NullPresenter, Presenter};
    use crate::game::layout::PlayArea;
    use crate::game::scores::HighScoreStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const AREA: PlayArea = PlayArea {
        width: 800.0,
        height: 600.0,
    };

    #[derive(Default)]
    struct RecordingPresenter {
        messages: Vec<(String, Mood)>,
        cues: Vec<Cue>,
        round_starts: Vec<usize>,
        completions: Vec<(usize, u32, bool)>,
        round_ends: Vec<(bool, u32, usize, usize)>,
    }

    impl Presenter for RecordingPresenter {
        fn on_round_start(&mut self, count: usize) {
            self.round_starts.push(count);
        }
        fn render_held(&mut self, _item: &EquipmentItem, _elapsed_s: f64, _fraction: f64) {}
        fn render_completed(&mut self, _item: &EquipmentItem) {}
        fn render_failed(&mut self, _item: &EquipmentItem, _elapsed_s: f64) {}
        fn render_clock(&mut self, _hhmmss: &str) {}
        fn show_message(&mut self, text: &str, mood: Mood) {
            self.messages.push((text.to_string(), mood));
        }
        fn play_cue(&mut self, cue: Cue) {
            self.cues.push(cue);
        }
        fn on_item_completed(&mut self, item: &EquipmentItem, points: u32, is_new_best: bool) {
            self.completions.push((item.id, points, is_new_best));
        }
        fn on_round_end(&mut self, won: bool, final_score: u32, completed: usize, total: usize) {
            self.round_ends.push((won, final_score, completed, total));
        }
    }

    fn session(seed: u64) -> Session<StdRng> {
        Session::with_rng(
            Config::default(),
            HighScoreStore::in_memory(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn start_builds_a_bounded_round() {
        for seed in 0..10 {
            let mut s = session(seed);
            s.start(AREA, &mut NullPresenter);
            let n = s.target_count();
            assert!((6..=9).contains(&n), "item count {n} out of range");
            assert_eq!(s.equipment().len(), n);
            for item in s.equipment() {
                assert!(
                    (6.0..=60.0).contains(&item.target_seconds),
                    "target {} out of bounds",
                    item.target_seconds
                );
                assert!(!item.completed);
            }
            assert_eq!(s.score(), 0);
            assert_eq!(s.completed_count(), 0);
            assert_eq!(s.phase(), SessionPhase::Playing);
        }
    }

    #[test]
    fn completing_every_item_wins_exactly_once() {
        let mut s = session(1);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        let plan: Vec<(usize, f64)> = s
            .equipment()
            .iter()
            .map(|it| (it.id, it.target_seconds))
            .collect();
        let mut now = 100.0;
        for (id, target) in &plan {
            s.press(*id, now, &mut presenter);
            now += target;
            s.release(*id, false, now, &mut presenter);
            now += 1.0;
        }
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(s.completed_count(), s.target_count());
        assert_eq!(presenter.round_ends.len(), 1, "won exactly once");
        let (won, score, completed, total) = presenter.round_ends[0];
        assert!(won);
        assert_eq!(score, s.score());
        assert_eq!((completed, total), (plan.len(), plan.len()));
        // Exact-target releases are perfect holds.
        assert_eq!(score, 100 * plan.len() as u32);
    }

    #[test]
    fn a_completed_item_cannot_complete_twice() {
        let mut s = session(2);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        let (id, target) = {
            let it = &s.equipment()[0];
            (it.id, it.target_seconds)
        };
        s.press(id, 0.0, &mut presenter);
        s.release(id, false, target + 0.5, &mut presenter);
        assert_eq!(s.completed_count(), 1);
        // Stray duplicate release and a re-press on the finished item.
        s.release(id, false, target + 0.6, &mut presenter);
        s.press(id, target + 1.0, &mut presenter);
        s.release(id, false, target * 3.0, &mut presenter);
        assert_eq!(s.completed_count(), 1, "no double completion");
        assert_eq!(presenter.completions.len(), 1);
    }

    #[test]
    fn early_release_keeps_the_item_in_play() {
        let mut s = session(3);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        let (id, target) = {
            let it = &s.equipment()[0];
            (it.id, it.target_seconds)
        };
        s.press(id, 0.0, &mut presenter);
        s.release(id, false, 1.0, &mut presenter);
        assert_eq!(s.completed_count(), 0);
        assert!(presenter.cues.contains(&Cue::Fail));
        assert!(!s.equipment()[0].completed);
        // Retry and finish it.
        s.press(id, 10.0, &mut presenter);
        s.release(id, false, 10.0 + target, &mut presenter);
        assert_eq!(s.completed_count(), 1);
    }

    #[test]
    fn canceled_and_plain_failures_read_differently() {
        let mut s = session(4);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        let id = s.equipment()[0].id;
        s.press(id, 0.0, &mut presenter);
        s.release(id, true, 1.0, &mut presenter);
        s.press(id, 2.0, &mut presenter);
        s.release(id, false, 3.0, &mut presenter);
        let bad: Vec<&str> = presenter
            .messages
            .iter()
            .filter(|(_, mood)| *mood == Mood::Bad)
            .map(|(text, _)| text.as_str())
            .collect();
        assert_eq!(bad.len(), 2);
        assert!(bad[0].contains("zone"), "cancel gets its own coaching");
        assert!(bad[1].contains("Slipped"), "early release names the time");
    }

    #[test]
    fn pause_is_idempotent_and_blocks_new_holds() {
        let mut s = session(5);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        s.pause(10.0, &mut presenter);
        s.pause(11.0, &mut presenter);
        assert_eq!(s.phase(), SessionPhase::Paused);
        let pause_notes = presenter
            .messages
            .iter()
            .filter(|(text, _)| text.starts_with("Paused"))
            .count();
        assert_eq!(pause_notes, 1, "second pause is a silent no-op");
        let id = s.equipment()[0].id;
        s.press(id, 12.0, &mut presenter);
        assert!(s.active_hold().is_none(), "no new holds while paused");
        // Resume from Menu/Ended-like misuse: resume only works from Paused.
        s.resume(13.0, &mut presenter);
        assert_eq!(s.phase(), SessionPhase::Playing);
        s.resume(14.0, &mut presenter);
        assert_eq!(s.phase(), SessionPhase::Playing);
    }

    #[test]
    fn a_held_item_does_not_age_across_a_pause() {
        let mut s = session(6);
        let mut presenter = NullPresenter;
        s.start(AREA, &mut presenter);
        let (id, target) = {
            let it = &s.equipment()[0];
            (it.id, it.target_seconds)
        };
        s.press(id, 100.0, &mut presenter);
        s.pause(101.0, &mut presenter);
        s.resume(131.0, &mut presenter);
        // 30 paused seconds must not count: release exactly one target's
        // worth of unpaused time after the press.
        s.release(id, false, 100.0 + 30.0 + target, &mut presenter);
        assert_eq!(s.completed_count(), 1);
        assert_eq!(s.score(), 100, "the pause did not skew the delta");
    }

    #[test]
    fn release_while_paused_counts_time_only_up_to_the_pause() {
        let mut s = session(7);
        let mut presenter = NullPresenter;
        s.start(AREA, &mut presenter);
        let id = s.equipment()[0].id;
        s.press(id, 0.0, &mut presenter);
        s.pause(1.0, &mut presenter);
        // Long after the pause, the hold is still only one second old.
        s.release(id, false, 500.0, &mut presenter);
        assert_eq!(s.completed_count(), 0, "one pre-pause second is too early");
        assert!(s.active_hold().is_none(), "the hold still resolved");
    }

    #[test]
    fn relayout_moves_items_without_touching_progress() {
        let mut s = session(8);
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        let (id, target) = {
            let it = &s.equipment()[0];
            (it.id, it.target_seconds)
        };
        s.press(id, 0.0, &mut presenter);
        s.release(id, false, target, &mut presenter);
        let score = s.score();
        let targets: Vec<f64> = s.equipment().iter().map(|it| it.target_seconds).collect();

        let wider = PlayArea {
            width: 1400.0,
            height: 900.0,
        };
        s.request_relayout(wider, 50.0);
        s.tick(50.0, &mut presenter);
        // Still inside the debounce window: nothing applied yet.
        s.tick(50.0 + RELAYOUT_DEBOUNCE_S + 0.01, &mut presenter);

        assert_eq!(s.score(), score);
        assert_eq!(s.completed_count(), 1);
        assert!(s.equipment()[0].completed, "completion survives relayout");
        let new_targets: Vec<f64> = s.equipment().iter().map(|it| it.target_seconds).collect();
        assert_eq!(targets, new_targets, "targets survive relayout");
        for item in s.equipment() {
            assert!(item.x <= wider.width && item.y <= wider.height);
        }
    }

    #[test]
    fn input_outside_a_round_is_ignored() {
        let mut s = session(9);
        let mut presenter = RecordingPresenter::default();
        s.press(0, 1.0, &mut presenter);
        s.release(0, false, 2.0, &mut presenter);
        s.pause(3.0, &mut presenter);
        assert_eq!(s.phase(), SessionPhase::Menu);
        assert!(presenter.cues.is_empty());

        s.start(AREA, &mut presenter);
        s.exit_to_menu(&mut presenter);
        assert_eq!(s.phase(), SessionPhase::Menu);
        s.press(0, 4.0, &mut presenter);
        assert!(s.active_hold().is_none());
    }

    #[test]
    fn a_repeat_performance_below_the_record_is_not_a_new_best() {
        let mut store = HighScoreStore::in_memory();
        store.update("Dumbbell", 100, 100);
        let mut s = Session::with_rng(Config::default(), store, StdRng::seed_from_u64(10));
        let mut presenter = RecordingPresenter::default();
        s.start(AREA, &mut presenter);
        // Item 0 is always the first catalog entry.
        let (id, target) = {
            let it = &s.equipment()[0];
            assert_eq!(it.name, "Dumbbell");
            (it.id, it.target_seconds)
        };
        s.press(id, 0.0, &mut presenter);
        s.release(id, false, target + 1.0, &mut presenter);
        let (_, points, is_new_best) = presenter.completions[0];
        assert!(points < 100);
        assert!(!is_new_best, "a weaker hold leaves the record alone");
        assert!(presenter.cues.contains(&Cue::Success));
        assert!(!presenter.cues.contains(&Cue::HighScore));
    }
}
