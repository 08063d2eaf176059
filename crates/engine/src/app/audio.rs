use tracing::info;

use crate::character::CueId;

/// Fire-and-forget cue playback. Implementations must not block the loop.
pub trait AudioSink {
    fn play(&mut self, cue: &CueId);
}

/// Sink that only records cues in the log.
#[derive(Debug, Default)]
pub struct LoggingAudio {
    played: u64,
}

impl LoggingAudio {
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for LoggingAudio {
    fn play(&mut self, cue: &CueId) {
        self.played = self.played.saturating_add(1);
        info!(cue = %cue, played = self.played, "audio_cue");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_sink_counts_cues() {
        let mut audio = LoggingAudio::default();
        audio.play(&CueId::new("dash_whoosh"));
        audio.play(&CueId::new("special_impact"));
        assert_eq!(audio.played(), 2);
    }
}
