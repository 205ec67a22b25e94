//! Commander Tests
//!
//! End-to-end tests for playback orchestration and save-back, run against a
//! real on-disk library with a sink that records submissions and waits.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use sound_archive::archive::{Library, Storage};
use sound_archive::config::ArchiveConfig;
use sound_archive::engine::{
    read_wav, write_wav, Effect, EffectsEngine, PlaybackHandle, PlaybackOptions, PlaybackSink,
    SampleBuffer, WavEffectsEngine,
};
use sound_archive::{ArchiveError, Commander, Result};

// === Test doubles ===

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Submit(usize),
    Wait(usize),
}

/// Sink that plays nothing and logs when buffers are submitted and awaited
#[derive(Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
    submitted: Mutex<Vec<SampleBuffer>>,
    fail_wait_for: Option<usize>,
}

impl RecordingSink {
    fn failing_wait(id: usize) -> Self {
        Self {
            fail_wait_for: Some(id),
            ..Self::default()
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn submitted(&self) -> Vec<SampleBuffer> {
        self.submitted.lock().unwrap().clone()
    }
}

impl PlaybackSink for RecordingSink {
    fn submit(&self, buffer: &SampleBuffer) -> Result<PlaybackHandle> {
        let mut submitted = self.submitted.lock().unwrap();
        let id = submitted.len();
        submitted.push(buffer.clone());
        self.events.lock().unwrap().push(Event::Submit(id));

        let events = Arc::clone(&self.events);
        let fail = self.fail_wait_for == Some(id);
        Ok(PlaybackHandle::deferred(move || {
            events.lock().unwrap().push(Event::Wait(id));
            if fail {
                Err(ArchiveError::Playback {
                    reason: "device unplugged".to_string(),
                })
            } else {
                Ok(())
            }
        }))
    }
}

/// Engine that ignores the file and always returns a fixed buffer, claiming
/// to crop on its own
struct PrecroppedEngine(SampleBuffer);

impl EffectsEngine for PrecroppedEngine {
    fn apply(&self, _path: &Path, _options: &PlaybackOptions) -> Result<SampleBuffer> {
        Ok(self.0.clone())
    }

    fn applies_crop(&self) -> bool {
        true
    }
}

// === Fixtures ===

/// One second of 16-bit mono at 8kHz; sample `i` has value `i + offset`
fn ramp(offset: i16) -> SampleBuffer {
    let frames = (0..8000i16)
        .flat_map(|i| i.wrapping_add(offset).to_le_bytes())
        .collect();
    SampleBuffer::new(frames, 1, 2, 8000).unwrap()
}

struct Fixture {
    dir: TempDir,
    library: Arc<Library>,
    sink: Arc<RecordingSink>,
    commander: Commander,
}

impl Fixture {
    fn new(sounds: &[&str]) -> Self {
        Self::with_parts(sounds, Arc::new(WavEffectsEngine::new()), RecordingSink::default())
    }

    fn with_parts(sounds: &[&str], effects: Arc<dyn EffectsEngine>, sink: RecordingSink) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ArchiveConfig::with_root(&dir.path().join("archive"));
        let library = Arc::new(Library::open(config.clone()).unwrap());

        for (i, name) in sounds.iter().enumerate() {
            let path = dir.path().join(format!("{}.wav", name));
            write_wav(&ramp(i as i16 * 100), &path).unwrap();
            library.add_sound(&path, None, None).unwrap();
        }

        let sink = Arc::new(sink);
        let storage: Arc<dyn Storage> = library.clone();
        let commander = Commander::new(storage, effects, sink.clone(), &config.edits_path());

        Self {
            dir,
            library,
            sink,
            commander,
        }
    }

    fn last_played_set(&self, name: &str) -> bool {
        self.library.get_by_name(name).unwrap().last_played.is_some()
    }

    fn file_of(&self, name: &str) -> PathBuf {
        self.library.get_by_name(name).unwrap().file_path
    }
}

fn no_options() -> PlaybackOptions {
    PlaybackOptions::new()
}

// === Single playback ===

#[test]
fn test_play_wait_updates_last_played() {
    let fx = Fixture::new(&["a"]);
    assert!(!fx.last_played_set("a"));

    fx.commander.play_audio_wait("a", &no_options()).unwrap();

    assert!(fx.last_played_set("a"));
    assert_eq!(fx.sink.events(), vec![Event::Submit(0), Event::Wait(0)]);
    assert_eq!(fx.sink.submitted()[0], ramp(0));
}

#[test]
fn test_play_audio_returns_before_wait() {
    let fx = Fixture::new(&["a"]);

    let handle = fx.commander.play_audio("a", &no_options()).unwrap();
    assert_eq!(fx.sink.events(), vec![Event::Submit(0)]);

    handle.wait_done().unwrap();
    assert_eq!(fx.sink.events(), vec![Event::Submit(0), Event::Wait(0)]);
}

#[test]
fn test_play_unknown_name() {
    let fx = Fixture::new(&["a"]);

    let result = fx.commander.play_audio_wait("ghost", &no_options());

    match result {
        Err(ArchiveError::NameNotFound { name }) => assert_eq!(name, "ghost"),
        other => panic!("Expected NameNotFound, got: {:?}", other),
    }
    assert!(fx.sink.events().is_empty());
}

#[test]
fn test_missing_file_still_records_play() {
    let fx = Fixture::new(&["a"]);
    std::fs::remove_file(fx.file_of("a")).unwrap();

    let result = fx.commander.play_audio_wait("a", &no_options());

    assert!(matches!(result, Err(ArchiveError::FileNotFound { .. })));
    assert!(fx.last_played_set("a"));
    assert!(fx.sink.events().is_empty());
}

#[test]
fn test_crop_is_applied_before_submit() {
    let fx = Fixture::new(&["a"]);
    let options = no_options().with_crop(Some(0.25), Some(0.75));

    fx.commander.play_audio_wait("a", &options).unwrap();

    let played = &fx.sink.submitted()[0];
    let expected = ramp(0).cropped(Some(0.25), Some(0.75)).unwrap();
    assert_eq!(played.frames().len(), 8000);
    assert_eq!(played, &expected);
    // floor(0.25 * 8000) * 2 bytes
    assert_eq!(&played.frames()[..2], &ramp(0).frames()[4000..4002]);
}

#[test]
fn test_crop_past_end_is_rejected_after_recording_play() {
    let fx = Fixture::new(&["a"]);
    let options = no_options().with_crop(Some(2.0), None);

    let result = fx.commander.play_audio_wait("a", &options);

    assert!(matches!(result, Err(ArchiveError::InvalidArgument { .. })));
    assert!(fx.last_played_set("a"));
    assert!(fx.sink.events().is_empty());
}

#[test]
fn test_engine_that_crops_is_not_cropped_again() {
    let fx = Fixture::with_parts(
        &["a"],
        Arc::new(PrecroppedEngine(ramp(7))),
        RecordingSink::default(),
    );
    let options = no_options().with_crop(Some(0.5), None);

    fx.commander.play_audio_wait("a", &options).unwrap();

    assert_eq!(fx.sink.submitted()[0], ramp(7));
}

// === Save-back ===

#[test]
fn test_save_under_new_name() {
    let fx = Fixture::new(&["a"]);
    let options = no_options()
        .with_effect(Effect::Reverse)
        .with_crop(None, Some(0.5))
        .with_save("a-rev");

    fx.commander.play_audio_wait("a", &options).unwrap();

    let saved = read_wav(&fx.file_of("a-rev")).unwrap();
    assert_eq!(saved, fx.sink.submitted()[0]);
    assert_eq!(saved.frame_count(), 4000);
    // Reversed, then the first half kept: starts with the last original sample
    assert_eq!(&saved.frames()[..2], &7999i16.to_le_bytes());
    assert_eq!(fx.commander.get_sounds().unwrap().len(), 2);
}

#[test]
fn test_save_over_itself_leaves_one_entry() {
    let fx = Fixture::new(&["x", "y"]);
    let old_file = fx.file_of("x");
    let options = no_options().with_crop(Some(0.5), None).with_save("x");

    fx.commander.play_audio_wait("x", &options).unwrap();

    let named_x: Vec<_> = fx
        .commander
        .get_sounds()
        .unwrap()
        .into_iter()
        .filter(|s| s.name == "x")
        .collect();
    assert_eq!(named_x.len(), 1);
    assert_eq!(fx.commander.get_sounds().unwrap().len(), 2);

    let saved = read_wav(&named_x[0].file_path).unwrap();
    assert_eq!(saved.frame_count(), 4000);
    assert_ne!(named_x[0].file_path, old_file);
    assert!(!old_file.exists());
}

#[test]
fn test_save_onto_other_existing_name_fails() {
    let fx = Fixture::new(&["a", "b"]);
    let options = no_options().with_save("b");

    let result = fx.commander.play_audio_wait("a", &options);

    assert!(matches!(result, Err(ArchiveError::NameAlreadyExists { .. })));
    // Playback was already issued, and both originals are untouched
    assert_eq!(fx.sink.events(), vec![Event::Submit(0)]);
    assert_eq!(read_wav(&fx.file_of("b")).unwrap(), ramp(100));
}

#[test]
fn test_save_arity_checked_before_any_playback() {
    let fx = Fixture::new(&["a", "b"]);
    let options = no_options().with_save("x");

    let sequence = fx.commander.play_sequence(&["a", "b"], &options);
    let parallel = fx.commander.play_parallel(&["a", "b"], &options);

    assert!(matches!(sequence, Err(ArchiveError::UnsupportedOperation { .. })));
    assert!(matches!(parallel, Err(ArchiveError::UnsupportedOperation { .. })));
    assert!(!fx.last_played_set("a"));
    assert!(!fx.last_played_set("b"));
    assert!(fx.sink.events().is_empty());
    assert!(fx.library.get_by_name("x").is_err());
}

#[test]
fn test_single_name_sequence_may_save() {
    let fx = Fixture::new(&["a"]);
    let options = no_options().with_save("copy");

    fx.commander.play_sequence(&["a"], &options).unwrap();

    assert_eq!(read_wav(&fx.file_of("copy")).unwrap(), ramp(0));
}

// === Sequence ===

#[test]
fn test_sequence_waits_between_sounds() {
    let fx = Fixture::new(&["a", "b", "c"]);

    fx.commander.play_sequence(&["c", "a", "b"], &no_options()).unwrap();

    assert_eq!(
        fx.sink.events(),
        vec![
            Event::Submit(0),
            Event::Wait(0),
            Event::Submit(1),
            Event::Wait(1),
            Event::Submit(2),
            Event::Wait(2),
        ]
    );
    let played: Vec<_> = fx.sink.submitted();
    assert_eq!(played, vec![ramp(200), ramp(0), ramp(100)]);
}

#[test]
fn test_sequence_stops_at_first_failure() {
    let fx = Fixture::new(&["a", "c"]);

    let result = fx.commander.play_sequence(&["a", "ghost", "c"], &no_options());

    assert!(matches!(result, Err(ArchiveError::NameNotFound { .. })));
    assert_eq!(fx.sink.events(), vec![Event::Submit(0), Event::Wait(0)]);
    assert!(fx.last_played_set("a"));
    assert!(!fx.last_played_set("c"));
}

// === Parallel ===

#[test]
fn test_parallel_issues_all_before_waiting() {
    let fx = Fixture::new(&["a", "b", "c"]);

    fx.commander.play_parallel(&["a", "b", "c"], &no_options()).unwrap();

    assert_eq!(
        fx.sink.events(),
        vec![
            Event::Submit(0),
            Event::Submit(1),
            Event::Submit(2),
            Event::Wait(0),
            Event::Wait(1),
            Event::Wait(2),
        ]
    );
}

#[test]
fn test_parallel_attempts_every_name() {
    let fx = Fixture::new(&["a", "c"]);

    let result = fx.commander.play_parallel(&["a", "ghost", "c"], &no_options());

    match result {
        Err(ArchiveError::ParallelPlayback { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "ghost");
            assert!(matches!(failures[0].error, ArchiveError::NameNotFound { .. }));
        }
        other => panic!("Expected ParallelPlayback, got: {:?}", other),
    }
    assert_eq!(
        fx.sink.events(),
        vec![
            Event::Submit(0),
            Event::Submit(1),
            Event::Wait(0),
            Event::Wait(1),
        ]
    );
    assert!(fx.last_played_set("a"));
    assert!(fx.last_played_set("c"));
}

#[test]
fn test_parallel_waits_on_all_even_if_one_fails_mid_play() {
    let fx = Fixture::with_parts(
        &["a", "b", "c"],
        Arc::new(WavEffectsEngine::new()),
        RecordingSink::failing_wait(0),
    );

    let result = fx.commander.play_parallel(&["a", "b", "c"], &no_options());

    match result {
        Err(ArchiveError::ParallelPlayback { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "a");
            assert!(matches!(failures[0].error, ArchiveError::Playback { .. }));
        }
        other => panic!("Expected ParallelPlayback, got: {:?}", other),
    }
    let waits = fx
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Wait(_)))
        .count();
    assert_eq!(waits, 3);
}

#[test]
fn test_empty_name_lists_are_no_ops() {
    let fx = Fixture::new(&["a"]);
    let names: [&str; 0] = [];

    fx.commander.play_sequence(&names, &no_options().with_save("x")).unwrap();
    fx.commander.play_parallel(&names, &no_options()).unwrap();

    assert!(fx.sink.events().is_empty());
}

// === Pass-through ===

#[test]
fn test_archive_commands_pass_through() {
    let fx = Fixture::new(&["kick", "kicks", "pad"]);

    fx.commander.add_tag("kick", "drums").unwrap();
    fx.commander.add_tag("pad", "synth").unwrap();
    fx.commander.rename("kicks", "snare").unwrap();

    let drums = fx.commander.get_by_tags(&["drums".to_string()]).unwrap();
    assert_eq!(drums.len(), 1);
    assert_eq!(drums[0].name, "kick");

    let closest = fx.commander.fuzzy_search("kik", 1).unwrap();
    assert_eq!(closest[0].name, "kick");

    assert!(matches!(
        fx.commander.rename("kick", "pad"),
        Err(ArchiveError::NameAlreadyExists { .. })
    ));

    fx.commander.remove_tag("pad", "synth").unwrap();
    assert!(fx.commander.get_by_tags(&["synth".to_string()]).unwrap().is_empty());

    let extra = fx.dir.path().join("extra.wav");
    write_wav(&ramp(5), &extra).unwrap();
    fx.commander.add_sound(&extra, Some("hat"), Some("lee")).unwrap();
    assert_eq!(fx.commander.get_sounds().unwrap().len(), 4);

    std::fs::remove_file(fx.file_of("hat")).unwrap();
    let cleaned = fx.commander.clean().unwrap();
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].name, "hat");

    fx.commander.remove_sound("pad").unwrap();
    assert_eq!(fx.commander.get_sounds().unwrap().len(), 2);
}
