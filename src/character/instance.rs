use std::sync::Arc;

use glam::Mat4;

use crate::animation::clock::{AnimationClock, PlaybackState};
use crate::animation::crossfade::{Animator, TransitionOutcome};
use crate::assets::character_asset::CharacterAsset;
use crate::character::rig::{Rig, RigDiagnostics};
use crate::errors::{MarionetteError, Result};
use crate::scene::palette::{BonePalette, BonePaletteSink};
use crate::settings::CharacterSettings;

/// A playing instance of a rigged character.
///
/// Owns its clocks, its scratch pose buffers and its bone palette. The
/// [`Rig`] is shared, so many instances of one asset cost one copy of the
/// keyframes. All buffers are allocated here and reused every frame.
///
/// # Frame flow
///
/// ```text
/// update(dt) ─▶ advance clocks ─▶ evaluate pose(s) ─▶ build palette(s)
///                                                   └▶ TRS blend while crossfading
/// palette() ◀── renderer reads once per frame
/// ```
#[derive(Debug, Clone)]
pub struct Character {
    rig: Arc<Rig>,
    settings: CharacterSettings,
    animator: Animator,

    // === Per-frame scratch ===
    globals: Vec<Mat4>,
    incoming_globals: Vec<Mat4>,
    outgoing_palette: BonePalette,
    incoming_palette: BonePalette,

    palette: BonePalette,
}

impl Character {
    /// Prepares `asset` and builds an instance of it.
    pub fn new(asset: CharacterAsset, settings: CharacterSettings) -> Result<Self> {
        settings.validate()?;
        let rig = Arc::new(Rig::new(asset, settings.palette_capacity));
        Self::from_rig(rig, settings)
    }

    /// Another instance of an already prepared rig. `settings` must ask for
    /// the palette capacity the rig was prepared with.
    pub fn from_rig(rig: Arc<Rig>, settings: CharacterSettings) -> Result<Self> {
        settings.validate()?;
        if settings.palette_capacity != rig.palette_capacity() {
            return Err(MarionetteError::InvalidSettings(format!(
                "palette_capacity {} does not match the {} slots rig '{}' was prepared for",
                settings.palette_capacity,
                rig.palette_capacity(),
                rig.name()
            )));
        }

        let clock = AnimationClock::new()
            .with_max_speed(settings.max_speed)
            .with_loop_mode(settings.loop_mode);
        let animator = Animator::new(clock).with_min_fade(settings.min_fade_seconds);

        let capacity = settings.palette_capacity;
        let mut character = Self {
            globals: rig.hierarchy().new_transform_buffer(),
            incoming_globals: rig.hierarchy().new_transform_buffer(),
            outgoing_palette: BonePalette::new(capacity),
            incoming_palette: BonePalette::new(capacity),
            palette: BonePalette::new(capacity),
            animator,
            settings,
            rig,
        };

        let default_clip = character
            .rig
            .find_clip(&character.settings.default_clip_hints)
            .or(if character.rig.clips().is_empty() { None } else { Some(0) });
        if let Some(index) = default_clip {
            character.select_clip(index);
        }
        if character.settings.autoplay {
            character.animator.play();
        }

        character.refresh_palette();
        Ok(character)
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Advances time by `dt` seconds and recomputes the palette in place.
    pub fn update(&mut self, dt: f64) {
        self.animator.advance(dt);
        self.refresh_palette();
    }

    fn refresh_palette(&mut self) {
        let rig = &*self.rig;
        let root_inverse = rig.root_inverse();
        let (current, incoming) = self.animator.clocks_mut();

        evaluate_clock(rig, current, &mut self.globals);

        match incoming {
            None => {
                self.palette
                    .build(rig.skeleton(), rig.bone_nodes(), &self.globals, &root_inverse);
            }
            Some((next, progress)) => {
                evaluate_clock(rig, next, &mut self.incoming_globals);
                self.outgoing_palette
                    .build(rig.skeleton(), rig.bone_nodes(), &self.globals, &root_inverse);
                self.incoming_palette.build(
                    rig.skeleton(),
                    rig.bone_nodes(),
                    &self.incoming_globals,
                    &root_inverse,
                );
                self.palette
                    .blend(&self.outgoing_palette, &self.incoming_palette, progress);
            }
        }
    }

    /// The palette computed by the last [`update`](Self::update).
    #[inline]
    #[must_use]
    pub fn palette(&self) -> &BonePalette {
        &self.palette
    }

    /// Populated palette slots.
    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.palette.bone_count()
    }

    /// Hands the current palette to the renderer.
    pub fn upload(&self, sink: &mut dyn BonePaletteSink) {
        self.palette.upload(sink);
    }

    /// Global node transforms of the current (outgoing, when blending) pose.
    #[inline]
    #[must_use]
    pub fn node_globals(&self) -> &[Mat4] {
        &self.globals
    }

    // ========================================================================
    // Clip selection
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.rig.clips().len()
    }

    /// Clip name, or `Anim{index}` for unnamed clips. Empty when out of range.
    #[must_use]
    pub fn clip_name(&self, index: usize) -> String {
        match self.rig.clip(index) {
            Some(clip) if !clip.name.is_empty() => clip.name.clone(),
            Some(_) => format!("Anim{index}"),
            None => String::new(),
        }
    }

    #[must_use]
    pub fn find_clip<S: AsRef<str>>(&self, hints: &[S]) -> Option<usize> {
        self.rig.find_clip(hints)
    }

    /// Selected clip; `None` in bind pose. While blending this is the
    /// outgoing clip.
    #[inline]
    #[must_use]
    pub fn current_clip(&self) -> Option<usize> {
        self.animator.current().clip_index()
    }

    fn clamp_clip_index(&self, index: usize) -> Option<usize> {
        let count = self.clip_count();
        if count == 0 { None } else { Some(index.min(count - 1)) }
    }

    /// Instant switch. Out-of-range indices clamp to the last clip.
    pub fn select_clip(&mut self, index: usize) -> TransitionOutcome {
        let Some(index) = self.clamp_clip_index(index) else {
            return TransitionOutcome::Ignored;
        };
        let rig = Arc::clone(&self.rig);
        match rig.clip(index) {
            Some(clip) => self.animator.cut_to(index, clip),
            None => TransitionOutcome::Ignored,
        }
    }

    /// Instant switch to the first clip whose name contains `hint`.
    pub fn select_clip_by_name(&mut self, hint: &str) -> bool {
        match self.find_clip(&[hint]) {
            Some(index) => {
                self.select_clip(index);
                true
            }
            None => false,
        }
    }

    /// Blends to `index` over `fade_seconds` (instant when not positive).
    /// Out-of-range indices clamp to the last clip.
    pub fn crossfade_to(&mut self, index: usize, fade_seconds: f32) -> TransitionOutcome {
        let Some(index) = self.clamp_clip_index(index) else {
            return TransitionOutcome::Ignored;
        };
        let rig = Arc::clone(&self.rig);
        match rig.clip(index) {
            Some(clip) => self.animator.request_crossfade(index, clip, fade_seconds),
            None => TransitionOutcome::Ignored,
        }
    }

    /// Blends to the first clip whose name contains `hint`, using the
    /// configured default fade when `fade_seconds` is `None`.
    pub fn crossfade_to_name(&mut self, hint: &str, fade_seconds: Option<f32>) -> bool {
        let fade = fade_seconds.unwrap_or(self.settings.default_fade_seconds);
        match self.find_clip(&[hint]) {
            Some(index) => {
                self.crossfade_to(index, fade);
                true
            }
            None => false,
        }
    }

    /// Static bind pose, no clip.
    pub fn set_bind_pose(&mut self) {
        self.animator.clear();
    }

    #[inline]
    #[must_use]
    pub fn is_blending(&self) -> bool {
        self.animator.is_blending()
    }

    #[inline]
    #[must_use]
    pub fn blend_progress(&self) -> Option<f32> {
        self.animator.blend_progress()
    }

    #[inline]
    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn play(&mut self) {
        self.animator.play();
    }

    pub fn pause(&mut self) {
        self.animator.pause();
    }

    pub fn toggle_playback(&mut self) {
        self.animator.toggle();
    }

    pub fn stop(&mut self) {
        self.animator.stop();
    }

    #[inline]
    #[must_use]
    pub fn playback_state(&self) -> PlaybackState {
        self.animator.current().state()
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.animator.current().is_playing()
    }

    /// Clamped into `[0, max_speed]`.
    pub fn set_speed(&mut self, speed: f32) {
        self.animator.set_speed(speed);
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.animator.current().speed()
    }

    /// Duration of the current clip in seconds.
    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.animator.current().duration_seconds()
    }

    /// Unwrapped elapsed seconds of the current clip.
    #[inline]
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.animator.current().elapsed_seconds()
    }

    /// Jumps the current clip to `seconds` and refreshes the palette.
    pub fn seek(&mut self, seconds: f64) {
        self.animator.current_mut().set_elapsed_seconds(seconds);
        self.refresh_palette();
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn rig(&self) -> &Arc<Rig> {
        &self.rig
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &CharacterSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> RigDiagnostics {
        self.rig.diagnostics()
    }
}

/// Evaluates one clock's pose into `globals`: bind pose when the clock has
/// no clip, otherwise the clip at the clock's wrapped tick time.
fn evaluate_clock(rig: &Rig, clock: &mut AnimationClock, globals: &mut [Mat4]) {
    let selected = clock
        .clip_index()
        .and_then(|i| Some((rig.clip(i)?, rig.binding(i)?)));

    match selected {
        None => rig.hierarchy().evaluate_bind_pose(globals),
        Some((clip, binding)) => {
            let time = clock.sample_ticks();
            rig.hierarchy()
                .evaluate_animated(clip, binding, time, &mut clock.cursors, globals);
        }
    }
}
