//! Clip Inspector
//!
//! Loads a skinned glTF character, lists its clips and simulates a few
//! seconds of playback headlessly, including a crossfade between the first
//! two clips.
//!
//! Usage:
//!   cargo run --example clip_inspector -- path/to/character.glb [settings.json]
//!
//! Set `RUST_LOG=debug` to see clip switches and crossfade events.

use std::path::PathBuf;

use anyhow::{Context, bail};
use glam::Mat4;
use marionette::{BonePalette, BonePaletteSink, Character, CharacterSettings, GltfLoader};

const FRAME_SECONDS: f64 = 1.0 / 60.0;
const SIMULATED_FRAMES: usize = 180;

/// Stands in for the GPU uniform buffer: counts writes and bytes.
#[derive(Default)]
struct CountingSink {
    writes: usize,
    bytes: usize,
}

impl BonePaletteSink for CountingSink {
    fn upload_bones(&mut self, matrices: &[Mat4]) {
        self.writes += 1;
        self.bytes += matrices.len() * BonePalette::STRIDE;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(model) = args.next().map(PathBuf::from) else {
        bail!("usage: clip_inspector <model.gltf|model.glb> [settings.json]");
    };

    let settings = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            CharacterSettings::from_json_str(&json)?
        }
        None => CharacterSettings::default(),
    };

    let asset = GltfLoader::load(&model).with_context(|| format!("loading {}", model.display()))?;
    let mut character = Character::new(asset, settings)?;

    let diagnostics = character.diagnostics();
    println!("=== {} ===", character.rig().name());
    println!("Nodes:            {}", diagnostics.node_count);
    println!(
        "Bones:            {} ({} in palette, {} truncated, {} unmatched)",
        diagnostics.bone_count, diagnostics.palette_bones, diagnostics.truncated_bones, diagnostics.unmatched_bones
    );
    println!("Unbound channels: {}", diagnostics.unbound_channels);

    println!("Clips:");
    for (i, clip) in character.rig().clips().iter().enumerate() {
        println!(
            "  [{i}] {:<24} {:>7.3}s  {} channels",
            character.clip_name(i),
            clip.duration_seconds(),
            clip.channels.len()
        );
    }

    let mut sink = CountingSink::default();
    for frame in 0..SIMULATED_FRAMES {
        if frame == SIMULATED_FRAMES / 3 && character.clip_count() > 1 {
            let next = (character.current_clip().unwrap_or(0) + 1) % character.clip_count();
            let fade = character.settings().default_fade_seconds;
            let outcome = character.crossfade_to(next, fade);
            println!("Frame {frame}: crossfade to '{}' ({outcome:?})", character.clip_name(next));
        }

        character.update(FRAME_SECONDS);
        character.upload(&mut sink);

        if frame % 60 == 0 || (character.is_blending() && frame % 5 == 0) {
            print_frame(frame, &character);
        }
    }

    println!("Uploads: {} ({} bytes total)", sink.writes, sink.bytes);
    Ok(())
}

fn print_frame(frame: usize, character: &Character) {
    let palette = character.palette();
    let max_offset = palette
        .active()
        .iter()
        .map(|m| m.w_axis.truncate().length())
        .fold(0.0_f32, f32::max);

    let blend = character
        .blend_progress()
        .map_or_else(String::new, |p| format!(" blend {:>3.0}%", p * 100.0));

    println!(
        "Frame {frame:>4}: clip {:?} t={:.3}/{:.3}s bones {} max offset {max_offset:.4}{blend}",
        character.current_clip(),
        character.elapsed_seconds(),
        character.duration_seconds(),
        palette.bone_count(),
    );
}
