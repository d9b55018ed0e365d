use rand::{Rng, RngExt};

/// A loopable background pattern: relative semitone steps over a base pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SongPattern {
    pub base_hz: f64,
    pub tempo_bpm: f64,
    pub steps: &'static [i32],
}

pub const SONGS: [SongPattern; 4] = [
    SongPattern {
        base_hz: 220.0,
        tempo_bpm: 96.0,
        steps: &[0, 3, 7, 10, 12, 10, 7, 3],
    },
    SongPattern {
        base_hz: 196.0,
        tempo_bpm: 88.0,
        steps: &[0, 5, 9, 12, 9, 5, 0, -3],
    },
    SongPattern {
        base_hz: 247.0,
        tempo_bpm: 110.0,
        steps: &[0, 2, 4, 7, 9, 7, 4, 2],
    },
    SongPattern {
        base_hz: 233.0,
        tempo_bpm: 102.0,
        steps: &[0, 7, 10, 14, 10, 7, 0, -5],
    },
];

// Fraction of the step interval a note actually sounds for; the rest is gap.
const NOTE_LENGTH_FRACTION: f64 = 0.8;

/// Equal-temperament transposition.
#[inline(always)]
pub fn transpose(base_hz: f64, semitones: i32) -> f64 {
    base_hz * 2f64.powf(f64::from(semitones) / 12.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicNote {
    pub freq_hz: f64,
    pub duration_s: f64,
}

/// Steps through a song pattern against injected timestamps, wrapping
/// forever. Synthesis belongs to the audio collaborator; this only decides
/// what sounds when.
#[derive(Debug)]
pub struct SongPlayer {
    song: SongPattern,
    step: usize,
    next_note_at_s: f64,
}

impl SongPlayer {
    pub fn start(song: SongPattern, now_s: f64) -> Self {
        Self {
            song,
            step: 0,
            next_note_at_s: now_s,
        }
    }

    pub fn random<R: Rng>(rng: &mut R, now_s: f64) -> Self {
        Self::start(SONGS[rng.random_range(0..SONGS.len())], now_s)
    }

    #[inline(always)]
    pub fn step_time_s(&self) -> f64 {
        60.0 / self.song.tempo_bpm
    }

    /// The next note once its step time arrives; at most one per call.
    pub fn poll(&mut self, now_s: f64) -> Option<MusicNote> {
        if now_s < self.next_note_at_s {
            return None;
        }
        let step_time = self.step_time_s();
        let note = MusicNote {
            freq_hz: transpose(self.song.base_hz, self.song.steps[self.step]),
            duration_s: step_time * NOTE_LENGTH_FRACTION,
        };
        self.step = (self.step + 1) % self.song.steps.len();
        self.next_note_at_s += step_time;
        Some(note)
    }
}
