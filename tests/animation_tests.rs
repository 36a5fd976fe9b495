//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack fallbacks (empty, single key, clamping, coincident keys)
//! - Linear / step / cubic-spline interpolation and shortest-arc rotation
//! - KeyframeCursor agreement with the binary-search sampler
//! - AnimationClip duration and tick-rate rules
//! - AnimationClock transport, speed clamping and loop modes

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use marionette::animation::clip::{AnimationClip, NodeChannel};
use marionette::animation::clock::{AnimationClock, LoopMode, PlaybackState};
use marionette::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn two_second_clip(ticks_per_second: f64) -> AnimationClip {
    // 50 ticks long whatever the tick rate
    let channel = NodeChannel::new("bone").with_positions(KeyframeTrack::linear(
        vec![0.0, 25.0, 50.0],
        vec![Vec3::ZERO, Vec3::X, Vec3::ZERO],
    ));
    AnimationClip::new("clip", ticks_per_second, 0.0, vec![channel])
}

// ============================================================================
// KeyframeTrack: Fallbacks
// ============================================================================

#[test]
fn empty_track_returns_default() {
    let track: KeyframeTrack<Vec3> = KeyframeTrack::empty();
    assert_eq!(track.sample(3.0, Vec3::ONE), Vec3::ONE);

    let track: KeyframeTrack<Quat> = KeyframeTrack::default();
    assert_eq!(track.sample(-1.0, Quat::IDENTITY), Quat::IDENTITY);
}

#[test]
fn single_key_holds_for_any_time() {
    let value = Vec3::new(1.0, 2.0, 3.0);
    let track = KeyframeTrack::linear(vec![4.0], vec![value]);

    for time in [-1000.0, -1.0, 0.0, 4.0, 7.5, 1.0e9] {
        assert_eq!(track.sample(time, Vec3::ZERO), value, "time {time}");
    }
}

#[test]
fn times_outside_range_clamp_to_boundary_keys() {
    let track = KeyframeTrack::linear(
        vec![1.0, 2.0, 3.0],
        vec![Vec3::splat(10.0), Vec3::splat(20.0), Vec3::splat(30.0)],
    );

    assert!(approx_vec3(track.sample(0.0, Vec3::ZERO), Vec3::splat(10.0)));
    assert!(approx_vec3(track.sample(-50.0, Vec3::ZERO), Vec3::splat(10.0)));
    assert!(approx_vec3(track.sample(3.5, Vec3::ZERO), Vec3::splat(30.0)));
    assert!(approx_vec3(track.sample(1.0e6, Vec3::ZERO), Vec3::splat(30.0)));
}

#[test]
fn coincident_keys_return_second_value_without_nan() {
    let track = KeyframeTrack::linear(vec![0.0, 1.0, 1.0, 2.0], vec![0.0_f32, 10.0, 20.0, 30.0]);

    let val = track.sample(1.0, 0.0);
    assert!(val.is_finite());
    assert!(approx(val, 20.0), "Expected 20.0, got {val}");

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(1.0, 0.0, &mut cursor);
    assert!(approx(val, 20.0), "Expected 20.0, got {val}");
}

#[test]
fn coincident_final_keys_clamp_to_last() {
    let track = KeyframeTrack::linear(vec![0.0, 1.0, 1.0], vec![0.0_f32, 10.0, 20.0]);
    assert!(approx(track.sample(1.0, 0.0), 20.0));
    assert!(approx(track.sample(5.0, 0.0), 20.0));
}

#[test]
fn mismatched_lengths_are_truncated() {
    let track = KeyframeTrack::linear(vec![0.0, 1.0, 2.0], vec![1.0_f32, 2.0]);
    assert_eq!(track.len(), 2);
    assert_eq!(track.last_time(), Some(1.0));
}

// ============================================================================
// KeyframeTrack: Interpolation
// ============================================================================

#[test]
fn linear_vec3_midpoint() {
    let track = KeyframeTrack::linear(vec![0.0, 2.0], vec![Vec3::ZERO, Vec3::new(10.0, 20.0, 30.0)]);
    let val = track.sample(1.0, Vec3::ZERO);
    assert!(approx_vec3(val, Vec3::new(5.0, 10.0, 15.0)), "got {val}");
}

#[test]
fn uneven_key_spacing() {
    let track = KeyframeTrack::linear(vec![0.0, 1.0, 5.0], vec![0.0_f32, 10.0, 50.0]);
    assert!(approx(track.sample(0.5, 0.0), 5.0));
    assert!(approx(track.sample(3.0, 0.0), 30.0));
}

#[test]
fn step_holds_until_next_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 100.0, 200.0],
        InterpolationMode::Step,
    );

    assert!(approx(track.sample(0.0, 0.0), 0.0));
    assert!(approx(track.sample(0.99, 0.0), 0.0));
    assert!(approx(track.sample(1.0, 0.0), 100.0));
    assert!(approx(track.sample(1.5, 0.0), 100.0));
    assert!(approx(track.sample(9.0, 0.0), 200.0));
}

#[test]
fn rotation_midpoint_is_half_angle() {
    let track = KeyframeTrack::linear(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
    );

    let mid = track.sample(0.5, Quat::IDENTITY);
    let expected = Quat::from_rotation_y(FRAC_PI_4);
    assert!(mid.dot(expected).abs() > 1.0 - EPSILON, "got {mid}");
}

#[test]
fn rotation_takes_shorter_arc_across_sign_flip() {
    // Same 90° rotation, stored in the opposite hemisphere
    let flipped = -Quat::from_rotation_y(FRAC_PI_2);
    assert!(Quat::IDENTITY.dot(flipped) < 0.0);

    let track = KeyframeTrack::linear(vec![0.0, 1.0], vec![Quat::IDENTITY, flipped]);

    let mut previous = 0.0_f32;
    for step in 0..=20 {
        let t = step as f32 / 20.0;
        let q = track.sample(t, Quat::IDENTITY);
        let angle = q.angle_between(Quat::IDENTITY);

        assert!(angle + EPSILON >= previous, "angle went backwards at t={t}");
        assert!(angle <= FRAC_PI_2 + EPSILON, "long way around at t={t}: {angle}");
        previous = angle;
    }
    assert!(approx(previous, FRAC_PI_2));
}

#[test]
fn cubic_spline_follows_hermite_basis() {
    // (in-tangent, value, out-tangent) per key
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![0.0, 1.0, 3.0, -1.0, 5.0, 0.0],
        InterpolationMode::CubicSpline,
    );
    assert_eq!(track.len(), 2);
    assert_eq!(track.key_value(0), 1.0);
    assert_eq!(track.key_value(1), 5.0);

    assert!(approx(track.sample(0.0, 0.0), 1.0));
    assert!(approx(track.sample(2.0, 0.0), 5.0));
    assert!(approx(track.sample(9.0, 0.0), 5.0));

    // t = 0.5, dt = 2: 0.5 * 1 + 0.125 * 3 * 2 + 0.5 * 5 - 0.125 * -1 * 2
    assert!(approx(track.sample(1.0, 0.0), 4.0), "got {}", track.sample(1.0, 0.0));
}

#[test]
fn cubic_spline_drops_incomplete_triples() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![Vec3::ZERO, Vec3::X, Vec3::ZERO, Vec3::ZERO, Vec3::Y],
        InterpolationMode::CubicSpline,
    );
    assert_eq!(track.len(), 1);
    assert_eq!(track.values.len(), 3);
    assert_eq!(track.sample(5.0, Vec3::Z), Vec3::X);
}

#[test]
fn cubic_spline_rotation_stays_normalized() {
    let a = Quat::IDENTITY;
    let b = Quat::from_rotation_y(FRAC_PI_2);
    let tangent = Quat::from_xyzw(0.0, 0.3, 0.0, -0.1);
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![tangent, a, tangent, tangent, b, tangent],
        InterpolationMode::CubicSpline,
    );

    for step in 0..=10 {
        let q = track.sample(step as f32 / 10.0, Quat::IDENTITY);
        assert!(approx(q.length(), 1.0), "step {step}: |q| = {}", q.length());
    }
    assert!(track.sample(1.0, Quat::IDENTITY).abs_diff_eq(b, EPSILON));
}

// ============================================================================
// KeyframeCursor
// ============================================================================

#[test]
fn cursor_matches_binary_search_forward_and_backward() {
    let times: Vec<f32> = (0..40).map(|i| i as f32 * 0.25).collect();
    let values: Vec<f32> = times.iter().map(|t| t * t).collect();
    let track = KeyframeTrack::linear(times, values);

    let mut cursor = KeyframeCursor::default();

    // Forward, small steps
    for i in 0..200 {
        let time = i as f32 * 0.05;
        let expected = track.sample(time, 0.0);
        let got = track.sample_with_cursor(time, 0.0, &mut cursor);
        assert!(approx(expected, got), "forward t={time}: {expected} vs {got}");
    }

    // Big backward jump (loop wrap), then scrubbing backwards
    for i in (0..200).rev().step_by(7) {
        let time = i as f32 * 0.05;
        let expected = track.sample(time, 0.0);
        let got = track.sample_with_cursor(time, 0.0, &mut cursor);
        assert!(approx(expected, got), "backward t={time}: {expected} vs {got}");
    }
}

#[test]
fn stale_cursor_from_longer_track_is_safe() {
    let track = KeyframeTrack::linear(vec![0.0, 1.0], vec![0.0_f32, 10.0]);
    let mut cursor = KeyframeCursor { last_index: 57 };
    assert!(approx(track.sample_with_cursor(0.5, 0.0, &mut cursor), 5.0));
    assert!(cursor.last_index < track.len());
}

// ============================================================================
// AnimationClip: Duration
// ============================================================================

#[test]
fn duration_is_latest_key_over_all_tracks() {
    let a = NodeChannel::new("a")
        .with_positions(KeyframeTrack::linear(vec![0.0, 12.0], vec![Vec3::ZERO, Vec3::X]))
        .with_scales(KeyframeTrack::linear(vec![0.0, 30.0], vec![Vec3::ONE, Vec3::ONE]));
    let b = NodeChannel::new("b").with_rotations(KeyframeTrack::linear(
        vec![0.0, 18.0],
        vec![Quat::IDENTITY, Quat::IDENTITY],
    ));

    // Declared duration is only a fallback
    let clip = AnimationClip::new("walk", 30.0, 999.0, vec![a, b]);
    assert!((clip.duration_ticks() - 30.0).abs() < 1e-9);
    assert!((clip.duration_seconds() - 1.0).abs() < 1e-9);
}

#[test]
fn duration_without_keys_falls_back_to_declared() {
    let clip = AnimationClip::new("empty", 10.0, 40.0, vec![NodeChannel::new("a")]);
    assert!((clip.duration_ticks() - 40.0).abs() < 1e-9);
    assert!((clip.duration_seconds() - 4.0).abs() < 1e-9);
}

#[test]
fn duration_without_keys_is_at_least_one_tick() {
    let clip = AnimationClip::new("empty", 0.0, 0.0, Vec::new());
    assert!((clip.duration_ticks() - 1.0).abs() < 1e-9);
    assert!((clip.duration_seconds() - 1.0).abs() < 1e-9);
}

#[test]
fn zero_ticks_per_second_means_seconds() {
    let clip = two_second_clip(0.0);
    assert!((clip.effective_ticks_per_second() - 1.0).abs() < 1e-9);
    assert!((clip.duration_seconds() - 50.0).abs() < 1e-9);
}

// ============================================================================
// AnimationClock: Transport
// ============================================================================

#[test]
fn new_clock_is_stopped_in_bind_pose() {
    let clock = AnimationClock::new();
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert_eq!(clock.clip_index(), None);
    assert_eq!(clock.duration_seconds(), 0.0);
    assert_eq!(clock.sample_ticks(), 0.0);
}

#[test]
fn advance_only_while_playing_a_clip() {
    let clip = two_second_clip(25.0);

    let mut clock = AnimationClock::new();
    clock.play();
    clock.advance(1.0);
    assert_eq!(clock.elapsed_seconds(), 0.0, "no clip selected");

    clock.set_clip(0, &clip);
    clock.advance(0.5);
    assert!((clock.elapsed_seconds() - 0.5).abs() < 1e-9);

    clock.pause();
    assert_eq!(clock.state(), PlaybackState::Paused);
    clock.advance(1.0);
    assert!((clock.elapsed_seconds() - 0.5).abs() < 1e-9, "paused clock must not move");

    clock.toggle();
    assert!(clock.is_playing());
    clock.advance(0.25);
    assert!((clock.elapsed_seconds() - 0.75).abs() < 1e-9);

    clock.stop();
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert_eq!(clock.elapsed_seconds(), 0.0);
    assert_eq!(clock.clip_index(), Some(0));
}

#[test]
fn invalid_deltas_are_ignored() {
    let clip = two_second_clip(25.0);
    let mut clock = AnimationClock::new();
    clock.set_clip(0, &clip);
    clock.play();

    clock.advance(-1.0);
    clock.advance(f64::NAN);
    clock.advance(f64::INFINITY);
    assert_eq!(clock.elapsed_seconds(), 0.0);
}

#[test]
fn set_clip_resets_elapsed_and_duration() {
    let short = two_second_clip(25.0);
    let long = two_second_clip(5.0);

    let mut clock = AnimationClock::new();
    clock.set_clip(0, &short);
    clock.play();
    clock.advance(1.5);
    assert!((clock.duration_seconds() - 2.0).abs() < 1e-9);

    clock.set_clip(1, &long);
    assert_eq!(clock.elapsed_seconds(), 0.0);
    assert!((clock.duration_seconds() - 10.0).abs() < 1e-9);
    assert!(clock.is_playing());
}

#[test]
fn speed_is_clamped() {
    let mut clock = AnimationClock::new();

    clock.set_speed(2.5);
    assert_eq!(clock.speed(), 2.5);
    clock.set_speed(100.0);
    assert_eq!(clock.speed(), 8.0);
    clock.set_speed(-3.0);
    assert_eq!(clock.speed(), 0.0);
    clock.set_speed(f32::NAN);
    assert_eq!(clock.speed(), 0.0);

    let mut slow = AnimationClock::new().with_max_speed(2.0);
    slow.set_speed(5.0);
    assert_eq!(slow.speed(), 2.0);
}

#[test]
fn speed_scales_elapsed_time() {
    let clip = two_second_clip(25.0);
    let mut clock = AnimationClock::new();
    clock.set_clip(0, &clip);
    clock.play();
    clock.set_speed(2.0);
    clock.advance(0.25);
    assert!((clock.elapsed_seconds() - 0.5).abs() < 1e-9);

    clock.set_speed(0.0);
    clock.advance(1.0);
    assert!((clock.elapsed_seconds() - 0.5).abs() < 1e-9);
}

#[test]
fn fork_copies_settings_but_not_clip() {
    let clip = two_second_clip(25.0);
    let mut clock = AnimationClock::new().with_loop_mode(LoopMode::PingPong);
    clock.set_clip(0, &clip);
    clock.play();
    clock.set_speed(3.0);
    clock.advance(1.0);

    let forked = clock.fork();
    assert_eq!(forked.clip_index(), None);
    assert_eq!(forked.elapsed_seconds(), 0.0);
    assert_eq!(forked.speed(), 3.0);
    assert_eq!(forked.state(), PlaybackState::Playing);
    assert_eq!(forked.loop_mode, LoopMode::PingPong);
}

// ============================================================================
// AnimationClock: Loop Modes
// ============================================================================

fn clock_at(loop_mode: LoopMode, seconds: f64) -> AnimationClock {
    let clip = two_second_clip(25.0);
    let mut clock = AnimationClock::new().with_loop_mode(loop_mode);
    clock.set_clip(0, &clip);
    clock.set_elapsed_seconds(seconds);
    clock
}

#[test]
fn loop_wraps_on_ticks() {
    assert!(approx(clock_at(LoopMode::Loop, 0.5).sample_ticks(), 12.5));
    assert!(approx(clock_at(LoopMode::Loop, 2.5).sample_ticks(), 12.5));
    assert!(approx(clock_at(LoopMode::Loop, 2.0).sample_ticks(), 0.0));
    assert!(approx(clock_at(LoopMode::Loop, 200.5).sample_ticks(), 12.5));
}

#[test]
fn loop_wrap_does_not_drift_for_fractional_tick_rates() {
    let channel = NodeChannel::new("bone")
        .with_positions(KeyframeTrack::linear(vec![0.0, 10.0], vec![Vec3::ZERO, Vec3::X]));
    let clip = AnimationClip::new("odd", 29.97, 0.0, vec![channel]);

    let mut clock = AnimationClock::new();
    clock.set_clip(0, &clip);
    clock.play();

    let duration = clip.duration_seconds();
    for _ in 0..1000 {
        clock.advance(duration);
    }
    let ticks = clock.sample_ticks();
    assert!(ticks < 1e-2 || (10.0 - ticks) < 1e-2, "drifted to {ticks}");
}

#[test]
fn loop_lands_on_zero_after_one_duration() {
    let channel = NodeChannel::new("bone")
        .with_positions(KeyframeTrack::linear(vec![0.0, 0.7], vec![Vec3::ZERO, Vec3::X]));
    let clip = AnimationClip::new("odd", 1000.0 / 3.0, 0.0, vec![channel]);

    let mut clock = AnimationClock::new();
    clock.set_clip(0, &clip);
    clock.play();
    clock.advance(clip.duration_seconds());

    let ticks = clock.sample_ticks();
    assert!(ticks < 1e-6, "wrapped to {ticks} instead of the first key");
}

#[test]
fn once_holds_final_tick() {
    assert!(approx(clock_at(LoopMode::Once, 1.0).sample_ticks(), 25.0));
    assert!(approx(clock_at(LoopMode::Once, 2.0).sample_ticks(), 50.0));
    assert!(approx(clock_at(LoopMode::Once, 9.0).sample_ticks(), 50.0));
}

#[test]
fn ping_pong_reverses() {
    assert!(approx(clock_at(LoopMode::PingPong, 1.0).sample_ticks(), 25.0));
    assert!(approx(clock_at(LoopMode::PingPong, 3.0).sample_ticks(), 25.0));
    assert!(approx(clock_at(LoopMode::PingPong, 3.5).sample_ticks(), 12.5));
    assert!(approx(clock_at(LoopMode::PingPong, 4.0).sample_ticks(), 0.0));
}
