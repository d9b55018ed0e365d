use crate::game::equipment::EquipmentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Info,
    Good,
    Bad,
}

/// Sound cues the audio collaborator knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Success,
    Fail,
    HighScore,
}

/// Everything the game core asks of the presentation layer. The core never
/// touches a screen or a speaker itself.
pub trait Presenter {
    fn on_round_start(&mut self, count: usize);
    fn render_held(&mut self, item: &EquipmentItem, elapsed_s: f64, fraction: f64);
    fn render_completed(&mut self, item: &EquipmentItem);
    fn render_failed(&mut self, item: &EquipmentItem, elapsed_s: f64);
    fn render_clock(&mut self, hhmmss: &str);
    fn show_message(&mut self, text: &str, mood: Mood);
    fn play_cue(&mut self, cue: Cue);
    fn on_item_completed(&mut self, item: &EquipmentItem, points: u32, is_new_best: bool);
    fn on_round_end(&mut self, won: bool, final_score: u32, completed: usize, total: usize);
}

/// Swallows everything. Backs tests and headless use.
#[allow(dead_code)] // Constructed from tests; the demo front end prints instead.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_round_start(&mut self, _count: usize) {}
    fn render_held(&mut self, _item: &EquipmentItem, _elapsed_s: f64, _fraction: f64) {}
    fn render_completed(&mut self, _item: &EquipmentItem) {}
    fn render_failed(&mut self, _item: &EquipmentItem, _elapsed_s: f64) {}
    fn render_clock(&mut self, _hhmmss: &str) {}
    fn show_message(&mut self, _text: &str, _mood: Mood) {}
    fn play_cue(&mut self, _cue: Cue) {}
    fn on_item_completed(&mut self, _item: &EquipmentItem, _points: u32, _is_new_best: bool) {}
    fn on_round_end(&mut self, _won: bool, _final_score: u32, _completed: usize, _total: usize) {}
}
