use tracing::trace;

use super::apply::{ApplyStats, PoseApplicator};
use crate::animation::{DriveMode, ModeSwitch, TalkAnimator, TalkEvent};
use crate::config::Config;
use crate::pose::LandmarkSource;
use crate::rig::Rig;
use crate::solver::HolisticSolver;

/// 1 tick の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scripted モード中。ランドマークは読まない
    Suspended,
    /// start 以降まだ結果が届いていない（リグは前フレームのまま）
    NoFrame,
    Applied(ApplyStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub talk_event: Option<TalkEvent>,
}

/// フレームドライバの状態: リグ・ソルバ・適用器・モード
///
/// 描画フレームごとに `tick` を 1 回呼ぶ。ソースの最新結果を毎 tick 解いて適用するので、
/// 結果が途絶えてもリグは最後の目標へ寄り続ける。
pub struct RetargetSession<R: Rig> {
    rig: R,
    solver: HolisticSolver,
    applicator: PoseApplicator,
    mode: ModeSwitch,
    talk: TalkAnimator,
    frames_applied: u64,
}

impl<R: Rig> RetargetSession<R> {
    pub fn new(config: &Config, rig: R) -> Self {
        Self {
            rig,
            solver: HolisticSolver::new(config),
            applicator: PoseApplicator::new(config),
            mode: ModeSwitch::default(),
            talk: TalkAnimator::new(config.talk),
            frames_applied: 0,
        }
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn mode(&self) -> DriveMode {
        self.mode.mode()
    }

    pub fn toggle_mode(&mut self, source: &mut dyn LandmarkSource) -> DriveMode {
        self.mode.toggle(source)
    }

    pub fn set_mode(&mut self, mode: DriveMode, source: &mut dyn LandmarkSource) {
        self.mode.set(mode, source);
    }

    pub fn talk(&self) -> &TalkAnimator {
        &self.talk
    }

    pub fn talk_mut(&mut self) -> &mut TalkAnimator {
        &mut self.talk
    }

    /// リグに反映したフレーム数
    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    /// 1 描画フレーム分の処理。`dt` は前回の tick からの経過秒
    pub fn tick(&mut self, source: &mut dyn LandmarkSource, dt: f32) -> TickReport {
        let talk_event = self.talk.advance(dt);
        let outcome = self.retarget(source);
        TickReport { outcome, talk_event }
    }

    fn retarget(&mut self, source: &mut dyn LandmarkSource) -> TickOutcome {
        if !self.mode.is_live() {
            return TickOutcome::Suspended;
        }
        let Some(set) = source.latest() else {
            return TickOutcome::NoFrame;
        };

        let frame = self.solver.solve(&set);
        let stats = self.applicator.apply(&frame, &mut self.rig);
        self.frames_applied += 1;
        trace!(
            "Frame {}: {} bone(s), {} expression(s)",
            self.frames_applied,
            stats.bones_updated,
            stats.expressions_updated
        );
        TickOutcome::Applied(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{LandmarkSet, ReplayFrames, ReplaySource, ThreadedSource};
    use crate::rig::{HumanBone, HumanoidRig};
    use crate::solver::face::tests::neutral_face;
    use crate::solver::BodyPart;
    use crate::tracker::rotation::euler_to_quaternion;
    use nalgebra::UnitQuaternion;
    use std::time::{Duration, Instant};

    fn face_frame() -> LandmarkSet {
        let mut face = neutral_face();
        // 少し首をかしげる
        face[crate::pose::face_index::HEAD_TOP_LEFT].y = 0.28;
        LandmarkSet {
            face: Some(face),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_frame_leaves_rig_untouched() {
        let mut session = RetargetSession::new(&Config::default(), HumanoidRig::full());
        let mut source = ReplaySource::new(ReplayFrames::default());
        source.start().unwrap();
        let report = session.tick(&mut source, 1.0 / 60.0);
        assert_eq!(report.outcome, TickOutcome::NoFrame);
        assert_eq!(session.frames_applied(), 0);
        assert_eq!(session.rig().expression_updates(), 0);
    }

    #[test]
    fn test_tick_applies_latest_frame() {
        let mut session = RetargetSession::new(&Config::default(), HumanoidRig::full());
        let mut source = ReplaySource::new(ReplayFrames::new(vec![face_frame()]));
        source.start().unwrap();

        let report = session.tick(&mut source, 1.0 / 60.0);
        match report.outcome {
            TickOutcome::Applied(stats) => {
                assert_eq!(stats.bones_updated, 1);
                assert_eq!(stats.expressions_updated, 5);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_ne!(
            session.rig().bone_rotation(HumanBone::Neck),
            Some(UnitQuaternion::identity())
        );
        let first = session.rig().bone_rotation(HumanBone::Neck);

        // 新しい結果がなくても最新の結果をもう一度適用して目標へ寄せる
        assert!(matches!(
            session.tick(&mut source, 1.0 / 60.0).outcome,
            TickOutcome::Applied(_)
        ));
        assert_eq!(session.frames_applied(), 2);
        assert_ne!(session.rig().bone_rotation(HumanBone::Neck), first);
        assert_eq!(session.rig().expression_updates(), 2);
    }

    #[test]
    fn test_stalled_source_still_converges() {
        let config = Config::default();
        let target = HolisticSolver::new(&config)
            .solve(&face_frame())
            .pose
            .get(BodyPart::Neck)
            .map(euler_to_quaternion)
            .unwrap();
        let full = UnitQuaternion::identity().angle_to(&target);
        assert!(full > 0.05, "target too close to identity: {}", full);

        // 1 フレームだけ流して止まるソース
        let mut source = ThreadedSource::from_replay(1000, ReplayFrames::new(vec![face_frame()]), false);
        source.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while source.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        let mut session = RetargetSession::new(&config, HumanoidRig::full());
        for _ in 0..30 {
            assert!(matches!(
                session.tick(&mut source, 1.0 / 60.0).outcome,
                TickOutcome::Applied(_)
            ));
        }
        assert_eq!(session.frames_applied(), 30);
        let neck = session.rig().bone_rotation(HumanBone::Neck).unwrap();
        let reached = UnitQuaternion::identity().angle_to(&neck);
        assert!(reached > 0.99 * full, "reached {} of {}", reached, full);

        // 止めると保持していた結果も消える
        source.stop();
        assert_eq!(session.tick(&mut source, 1.0 / 60.0).outcome, TickOutcome::NoFrame);
    }

    #[test]
    fn test_scripted_mode_suspends() {
        let mut session = RetargetSession::new(&Config::default(), HumanoidRig::full());
        let mut source = ReplaySource::new(ReplayFrames::new(vec![face_frame(); 2]));
        source.start().unwrap();

        assert_eq!(session.toggle_mode(&mut source), DriveMode::Scripted);
        assert_eq!(session.tick(&mut source, 0.1).outcome, TickOutcome::Suspended);
        assert_eq!(session.rig().bone_rotation(HumanBone::Neck), Some(UnitQuaternion::identity()));

        session.set_mode(DriveMode::Live, &mut source);
        assert!(matches!(session.tick(&mut source, 0.1).outcome, TickOutcome::Applied(_)));
    }

    #[test]
    fn test_tick_drives_talk_animation() {
        let mut session = RetargetSession::new(&Config::default(), HumanoidRig::full());
        let mut source = ReplaySource::new(ReplayFrames::default());
        session.talk_mut().start_talking(0);
        let mut events = Vec::new();
        for _ in 0..40 {
            if let Some(e) = session.tick(&mut source, 0.1).talk_event {
                events.push(e);
            }
        }
        assert_eq!(events, vec![TalkEvent::IdleReset]);
        assert_eq!(session.talk().weights(), (1.0, 0.0));
    }
}
