use log::{debug, info, warn};
use rand::RngExt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::game::clock::MonotonicClock;
use crate::game::equipment::EquipmentItem;
use crate::game::feedback::{Cue, Mood, Presenter};
use crate::game::layout::PlayArea;
use crate::game::music::SongPlayer;
use crate::game::scores::HighScoreStore;
use crate::game::session::{Session, SessionPhase};
use crate::game::ticker::Ticker;

/// Prints what a real front end would draw or play.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn on_round_start(&mut self, count: usize) {
        println!("=== Round started: {count} equipment on the floor ===");
    }

    fn render_held(&mut self, item: &EquipmentItem, elapsed_s: f64, fraction: f64) {
        debug!(
            "holding {} {:.1}s ({:.0}%)",
            item.name,
            elapsed_s,
            fraction * 100.0
        );
    }

    fn render_completed(&mut self, item: &EquipmentItem) {
        println!("  [done] {} ({:.0}s hold)", item.name, item.target_seconds);
    }

    fn render_failed(&mut self, item: &EquipmentItem, elapsed_s: f64) {
        println!("  [slip] {} after {elapsed_s:.1}s", item.name);
    }

    fn render_clock(&mut self, hhmmss: &str) {
        debug!("gym clock {hhmmss}");
    }

    fn show_message(&mut self, text: &str, mood: Mood) {
        println!("  ({mood:?}) {text}");
    }

    fn play_cue(&mut self, cue: Cue) {
        debug!("cue {cue:?}");
    }

    fn on_item_completed(&mut self, item: &EquipmentItem, points: u32, is_new_best: bool) {
        info!(
            "{} complete: +{points} pts (new best: {is_new_best})",
            item.name
        );
    }

    fn on_round_end(&mut self, won: bool, final_score: u32, completed: usize, total: usize) {
        println!("=== Round over: won={won}, score={final_score}, {completed}/{total} ===");
    }
}

/// Plays one self-driven round headlessly: the tick thread runs the frame
/// loop while a scripted player works through every item. The script slips
/// one release on purpose, pauses once mid-hold, and resizes the floor
/// mid-round. Only the hold targets are shortened so the run stays
/// watchable; everything else is the real code path.
pub fn run(config: Config, scores: HighScoreStore) -> Result<(), Box<dyn std::error::Error>> {
    let mut demo = config;
    demo.min_target_seconds = 1.0;
    demo.max_target_seconds = 2.0;

    let clock = MonotonicClock::new();
    let session = Arc::new(Mutex::new(Session::new(demo, scores)));

    let tick_session = Arc::clone(&session);
    let mut ticker = Ticker::spawn(demo.tick_rate_hz, clock, move |now_s| {
        tick_session
            .lock()
            .unwrap()
            .tick(now_s, &mut ConsolePresenter);
    });

    let mut presenter = ConsolePresenter;
    let mut rng = rand::rng();
    let mut song = SongPlayer::random(&mut rng, clock.now_s());

    session.lock().unwrap().start(
        PlayArea {
            width: 800.0,
            height: 600.0,
        },
        &mut presenter,
    );

    let plan: Vec<(usize, f64)> = {
        let s = session.lock().unwrap();
        for it in s.equipment() {
            if let Some(best) = s.records().best_for(it.name) {
                debug!("{} best so far: {} pts", it.name, best.score);
            }
        }
        s.equipment()
            .iter()
            .map(|it| (it.id, it.target_seconds))
            .collect()
    };

    // A deliberate early release first, so the slip path shows up too.
    let (first_id, _) = plan[0];
    session
        .lock()
        .unwrap()
        .press(first_id, clock.now_s(), &mut presenter);
    wait(&clock, 0.3, &mut song);
    session
        .lock()
        .unwrap()
        .release(first_id, false, clock.now_s(), &mut presenter);

    for (i, (id, target)) in plan.iter().copied().enumerate() {
        session
            .lock()
            .unwrap()
            .press(id, clock.now_s(), &mut presenter);
        if i == 1 {
            // Pause mid-hold; the paused time must not count toward it.
            wait(&clock, target * 0.4, &mut song);
            session.lock().unwrap().pause(clock.now_s(), &mut presenter);
            debug!(
                "hold frozen through the pause: {:?}",
                session.lock().unwrap().active_hold()
            );
            wait(&clock, 0.5, &mut song);
            session
                .lock()
                .unwrap()
                .resume(clock.now_s(), &mut presenter);
            wait(&clock, target * 0.6 + 0.05, &mut song);
        } else {
            let jitter = rng.random_range(0.02..0.2);
            wait(&clock, target + jitter, &mut song);
        }
        session
            .lock()
            .unwrap()
            .release(id, false, clock.now_s(), &mut presenter);

        if i == 2 {
            // Mid-round resize: positions regenerate, progress stays.
            let now_s = clock.now_s();
            session.lock().unwrap().request_relayout(
                PlayArea {
                    width: 1280.0,
                    height: 720.0,
                },
                now_s,
            );
        }
    }

    ticker.stop();

    let session = session.lock().unwrap();
    info!(
        "Demo round finished in phase {:?} with {} points",
        session.phase(),
        session.score()
    );
    if session.phase() != SessionPhase::Ended {
        warn!("Demo round did not finish cleanly");
    }

    let records = session.records();
    if !records.is_empty() {
        println!("High scores remembered for {} equipment type(s)", records.len());
        for (name, best) in records.all() {
            debug!("record {}: {} pts at {}% ({})", name, best.score, best.accuracy, best.date);
        }
    }
    Ok(())
}

// Sleeps through `duration_s` of wall time while keeping the sequencer fed.
fn wait(clock: &MonotonicClock, duration_s: f64, song: &mut SongPlayer) {
    let end = clock.now_s() + duration_s;
    while clock.now_s() < end {
        if let Some(note) = song.poll(clock.now_s()) {
            debug!(
                "music note {:.1} Hz for {:.2}s",
                note.freq_hz, note.duration_s
            );
        }
        thread::sleep(Duration::from_millis(10));
    }
}
