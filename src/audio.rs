//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! A missing or suspended context means silence, never an error.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    PlayerJump,
    /// Hit an obstacle or the floor
    Collision,
    IngredientCollect,
    CandleBlow,
    /// Celebration: ingredient lands in the bowl
    IngredientFalling,
    BowlShake,
    CakeAppear,
}

impl SoundEffect {
    /// Trigger name used by the page's asset manifest
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::PlayerJump => "playerJump",
            SoundEffect::Collision => "collision",
            SoundEffect::IngredientCollect => "ingredientCollect",
            SoundEffect::CandleBlow => "candleBlow",
            SoundEffect::IngredientFalling => "ingFalling",
            SoundEffect::BowlShake => "bowlShake",
            SoundEffect::CakeAppear => "cakeAppear",
        }
    }

    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::PlayerJump),
            GameEvent::Crashed => Some(SoundEffect::Collision),
            GameEvent::IngredientCollected(_) => Some(SoundEffect::IngredientCollect),
            GameEvent::CandleCollected { .. } => Some(SoundEffect::CandleBlow),
            GameEvent::IngredientDropped(_) => Some(SoundEffect::IngredientFalling),
            GameEvent::BowlShake => Some(SoundEffect::BowlShake),
            GameEvent::CakeBaked => Some(SoundEffect::CakeAppear),
            GameEvent::ObstaclePassed { .. } | GameEvent::CakeRevealed => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;
    use crate::sim::GameEvent;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Play the sound mapped to a simulation event
        pub fn play_event(&self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.play(effect);
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            log::debug!("sfx {}", effect.name());
            match effect {
                SoundEffect::PlayerJump => self.play_jump(ctx, vol),
                SoundEffect::Collision => self.play_collision(ctx, vol),
                SoundEffect::IngredientCollect => self.play_arpeggio(ctx, vol, &[600.0, 800.0, 1000.0], 0.08),
                SoundEffect::CandleBlow => self.play_candle(ctx, vol),
                SoundEffect::IngredientFalling => self.play_falling(ctx, vol),
                SoundEffect::BowlShake => self.play_bowl_shake(ctx, vol),
                SoundEffect::CakeAppear => {
                    self.play_arpeggio(ctx, vol, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.1)
                }
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Jump - short chirp up
        fn play_jump(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Collision - low thud sliding down
        fn play_collision(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.6).ok();
        }

        /// Rising notes, one every `step` seconds
        fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], step: f64) {
            for (i, freq) in freqs.iter().enumerate() {
                let delay = i as f64 * step;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.25).ok();
                }
            }
        }

        /// Candle - breathy high flicker
        fn play_candle(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(1200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(800.0, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        /// Ingredient drop - whistle down into the bowl
        fn play_falling(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(250.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.45).ok();
        }

        /// Bowl shake - rattling square pulses
        fn play_bowl_shake(&self, ctx: &AudioContext, vol: f32) {
            for i in 0..6 {
                let delay = f64::from(i) * 0.15;
                let freq = if i % 2 == 0 { 220.0 } else { 260.0 };
                if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.12, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.12).ok();
                }
            }
        }
    }
}
