use tracing::{info, warn};

use crate::pose::LandmarkSource;

/// リグを動かすのはカメラ（Live）か、再生中のクリップ（Scripted）か
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    #[default]
    Live,
    Scripted,
}

/// Live ⇄ Scripted の切り替え
///
/// Scripted に入るとランドマーク供給を止め、Live に戻ると再開する。
#[derive(Debug, Clone, Default)]
pub struct ModeSwitch {
    mode: DriveMode,
}

impl ModeSwitch {
    pub fn new(mode: DriveMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.mode == DriveMode::Live
    }

    pub fn toggle(&mut self, source: &mut dyn LandmarkSource) -> DriveMode {
        let next = match self.mode {
            DriveMode::Live => DriveMode::Scripted,
            DriveMode::Scripted => DriveMode::Live,
        };
        self.set(next, source);
        next
    }

    pub fn set(&mut self, mode: DriveMode, source: &mut dyn LandmarkSource) {
        if self.mode == mode {
            return;
        }
        match mode {
            DriveMode::Scripted => source.stop(),
            DriveMode::Live => {
                // 起動に失敗しても Live のまま（フレームが来ないだけ）
                if let Err(e) = source.start() {
                    warn!("Landmark source failed to restart: {:#}", e);
                }
            }
        }
        info!("Drive mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }
}
