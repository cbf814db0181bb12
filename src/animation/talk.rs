use std::time::Duration;
use tracing::debug;

use crate::config::TalkConfig;

const MIN_TALK: Duration = Duration::from_secs(2);
const MAX_TALK: Duration = Duration::from_secs(10);
const PER_CHAR: Duration = Duration::from_millis(50);

/// 返答テキストの長さから発話アニメーションの長さを決める
pub fn talk_duration(chars: usize) -> Duration {
    let chars = u32::try_from(chars).unwrap_or(u32::MAX);
    MIN_TALK.saturating_add(PER_CHAR.saturating_mul(chars)).min(MAX_TALK)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkPhase {
    Idle,
    BlendingIn,
    Talking,
    BlendingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkEvent {
    /// idle クリップを先頭から再生し直す
    IdleReset,
}

/// idle ⇄ talking のクロスフェード
///
/// `advance` で経過時間を進め、`weights` で 2 クリップの重みを得る。
#[derive(Debug, Clone)]
pub struct TalkAnimator {
    config: TalkConfig,
    /// talking クリップの重み (0.0〜1.0)。idle は 1 - talk
    talk_weight: f32,
    talking: bool,
    talk_remaining: Option<f32>,
    reset_in: Option<f32>,
}

impl TalkAnimator {
    pub fn new(config: TalkConfig) -> Self {
        Self {
            config,
            talk_weight: 0.0,
            talking: false,
            talk_remaining: None,
            reset_in: None,
        }
    }

    /// `chars` 文字の返答を話し始める
    pub fn start_talking(&mut self, chars: usize) {
        let duration = talk_duration(chars);
        debug!("Talking for {:.1}s", duration.as_secs_f32());
        self.talking = true;
        self.talk_remaining = Some(duration.as_secs_f32());
        self.reset_in = None;
    }

    pub fn stop_talking(&mut self) {
        if !self.talking {
            return;
        }
        self.talking = false;
        self.talk_remaining = None;
        self.reset_in = Some(self.config.idle_reset_delay_secs.max(0.0));
    }

    pub fn advance(&mut self, dt: f32) -> Option<TalkEvent> {
        let dt = dt.max(0.0);
        self.fade(dt);

        let mut event = None;
        if let Some(remaining) = self.reset_in.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.reset_in = None;
                event = Some(TalkEvent::IdleReset);
            }
        }

        if let Some(remaining) = self.talk_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.stop_talking();
            }
        }
        event
    }

    fn fade(&mut self, dt: f32) {
        let (target, secs) = if self.talking {
            (1.0, self.config.blend_in_secs)
        } else {
            (0.0, self.config.blend_out_secs)
        };
        if secs <= 0.0 {
            self.talk_weight = target;
            return;
        }
        let step = dt / secs;
        self.talk_weight = if target > self.talk_weight {
            (self.talk_weight + step).min(target)
        } else {
            (self.talk_weight - step).max(target)
        };
    }

    /// (idle, talking) の重み
    pub fn weights(&self) -> (f32, f32) {
        (1.0 - self.talk_weight, self.talk_weight)
    }

    pub fn phase(&self) -> TalkPhase {
        match (self.talking, self.talk_weight) {
            (true, w) if w >= 1.0 => TalkPhase::Talking,
            (true, _) => TalkPhase::BlendingIn,
            (false, w) if w <= 0.0 => TalkPhase::Idle,
            (false, _) => TalkPhase::BlendingOut,
        }
    }
}
