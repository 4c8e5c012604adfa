//! Klavier demo binary — play the engine from a MIDI controller or a scripted
//! phrase, without any UI.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use klavier::keymap::KeyMap;
use klavier::midi::{note_channel, MidiConfig, MidiInput, NoteKind};
use klavier::note::NoteCatalog;
use klavier::sample::{DirSampleSource, NoSampleSource, SampleCache};
use klavier::voice::{EngineConfig, VoiceEngine};

#[derive(Parser, Debug)]
#[command(name = "klavier", version, about = "A playable piano engine")]
struct Cli {
    /// List available MIDI input devices and exit.
    #[arg(long)]
    list_devices: bool,

    /// Preferred MIDI device name (substring match).
    #[arg(long)]
    device: Option<String>,

    /// Directory with recorded samples (<pitch>.wav). Without it every note
    /// is synthesized.
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Engine config file (defaults to ~/.klavier/engine.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Anchor octave for the printed key-cap table.
    #[arg(long, default_value_t = 4)]
    octave: i32,

    /// Play a short demo phrase instead of listening for input.
    #[arg(long)]
    demo: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_devices {
        let devices = MidiInput::list_devices();
        if devices.is_empty() {
            println!("no MIDI input devices found");
        } else {
            for name in devices {
                println!("{name}");
            }
        }
        return;
    }

    let catalog = Arc::new(NoteCatalog::standard());
    let config = engine_config(cli.config.as_deref());

    let (cache, completions) = match cli.samples {
        Some(ref dir) => SampleCache::spawn(DirSampleSource::new(dir)),
        None => SampleCache::spawn(NoSampleSource),
    };
    let mut engine = VoiceEngine::new(Arc::clone(&catalog), cache, completions, config);

    print_key_caps(&catalog, cli.octave);

    if cli.demo {
        play_demo(&mut engine);
        return;
    }

    let (sender, receiver) = note_channel();
    let midi_config = MidiConfig {
        device_name: cli.device.or_else(|| {
            MidiConfig::load().and_then(|c| c.device_name)
        }),
    };

    let connection = match MidiInput::attach(&midi_config, sender) {
        Ok(conn) => {
            println!("listening on '{}' — Ctrl-C to quit", conn.port_name());
            Some(conn)
        }
        Err(e) => {
            // Not fatal: the engine still works, there is just nothing
            // feeding it in this headless binary.
            eprintln!("no MIDI input: {e}");
            eprintln!("try --list-devices, or --demo for a scripted phrase");
            None
        }
    };
    if connection.is_none() {
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .expect("failed to set Ctrl-C handler");

    while running.load(Ordering::SeqCst) {
        for event in receiver.drain() {
            match event.kind {
                NoteKind::On => engine.note_on(event.pitch),
                NoteKind::Off => engine.note_off(event.pitch),
            }
        }
        engine.pump();
        thread::sleep(Duration::from_millis(2));
    }

    drop(connection);
    println!("bye");
}

/// Resolve the engine config: an explicit `--config` path wins, then the
/// home-directory config, then the built-in defaults.
fn engine_config(path: Option<&Path>) -> EngineConfig {
    path.and_then(EngineConfig::load_path)
        .or_else(EngineConfig::load)
        .unwrap_or_default()
}

/// Print which physical keys play which notes at the chosen octave.
fn print_key_caps(catalog: &Arc<NoteCatalog>, octave: i32) {
    let keymap = KeyMap::new(Arc::clone(catalog));
    let labels: Vec<String> = catalog
        .iter()
        .filter_map(|key| {
            keymap
                .label_for_key(key, octave)
                .map(|code| format!("{code:?}={}", key.label()))
        })
        .collect();
    if labels.is_empty() {
        println!("octave {octave} is out of reach of the key row");
    } else {
        println!("key row at octave {octave}: {}", labels.join(" "));
    }
}

/// A short arpeggiated phrase exercising samples, folding, and release tails.
fn play_demo(engine: &mut VoiceEngine) {
    const PHRASE: [u8; 8] = [60, 64, 67, 72, 67, 64, 61, 60];

    println!("playing demo phrase");
    for &pitch in &PHRASE {
        engine.note_on(pitch);
        for _ in 0..30 {
            engine.pump();
            thread::sleep(Duration::from_millis(10));
        }
        engine.note_off(pitch);
    }

    // Let the last release tail ring out.
    let tail = engine.config().release_secs;
    let deadline = std::time::Instant::now() + Duration::from_secs_f32(tail + 0.2);
    while std::time::Instant::now() < deadline {
        engine.pump();
        thread::sleep(Duration::from_millis(10));
    }
}
