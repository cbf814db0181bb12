use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MediaPipe Pose の 33 ランドマークのうち使うもの
pub mod pose_index {
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_PINKY: usize = 17;
    pub const RIGHT_PINKY: usize = 18;
    pub const LEFT_INDEX: usize = 19;
    pub const RIGHT_INDEX: usize = 20;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
}

/// Face Mesh のランドマーク番号
pub mod face_index {
    // 頭部の姿勢平面
    pub const HEAD_TOP_LEFT: usize = 21;
    pub const HEAD_TOP_RIGHT: usize = 251;
    pub const JAW_RIGHT: usize = 397;
    pub const JAW_LEFT: usize = 172;
    // 目頭・目尻
    pub const EYE_INNER_LEFT: usize = 133;
    pub const EYE_INNER_RIGHT: usize = 362;
    pub const EYE_OUTER_LEFT: usize = 130;
    pub const EYE_OUTER_RIGHT: usize = 263;
    // 唇
    pub const UPPER_INNER_LIP: usize = 13;
    pub const LOWER_INNER_LIP: usize = 14;
    pub const MOUTH_CORNER_LEFT: usize = 61;
    pub const MOUTH_CORNER_RIGHT: usize = 291;
}

/// Hand の 21 ランドマーク番号
pub mod hand_index {
    /// 片手分の点数（左右共通）
    pub const COUNT: usize = 21;
    pub const WRIST: usize = 0;
    pub const INDEX_MCP: usize = 5;
    pub const PINKY_MCP: usize = 17;
}

/// トラッキング領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Face,
    Pose,
    PoseWorld,
    LeftHand,
    RightHand,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Face,
        Region::Pose,
        Region::PoseWorld,
        Region::LeftHand,
        Region::RightHand,
    ];

    /// 許容する点数の範囲（顔は虹彩ありで 478、なしで 468）
    pub fn expected_len(self) -> (usize, usize) {
        match self {
            Region::Face => (468, 478),
            Region::Pose | Region::PoseWorld => (33, 33),
            Region::LeftHand | Region::RightHand => (hand_index::COUNT, hand_index::COUNT),
        }
    }

    pub fn accepts(self, len: usize) -> bool {
        let (min, max) = self.expected_len();
        (min..=max).contains(&len)
    }
}

/// 正規化座標の単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Pose のみ。推定器が出さない場合は None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, visibility: None }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// 記録ファイル上の表現: `[x, y, z]`, `[x, y, z, v]` または `{x, y, z, visibility}`
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Xyz([f32; 3]),
    Xyzv([f32; 4]),
    Object {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
        #[serde(default)]
        visibility: Option<f32>,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Xyz([x, y, z]) => Landmark::new(x, y, z),
            LandmarkRepr::Xyzv([x, y, z, v]) => Landmark::new(x, y, z).with_visibility(v),
            LandmarkRepr::Object { x, y, z, visibility } => Landmark { x, y, z, visibility },
        }
    }
}

/// 1フレーム分の検出結果。各領域は独立に欠落しうる
///
/// `left_hand` / `right_hand` は推定器のラベルそのまま（鏡像映像なので被写体の左右とは逆）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkSet {
    pub face: Option<Vec<Landmark>>,
    /// 画像座標の 2D ポーズ
    pub pose: Option<Vec<Landmark>>,
    /// ワールド座標（メートル、腰中心原点）の 3D ポーズ
    pub pose_world: Option<Vec<Landmark>>,
    pub left_hand: Option<Vec<Landmark>>,
    pub right_hand: Option<Vec<Landmark>>,
}

impl LandmarkSet {
    /// 領域の点列を返す。欠落しているか点数が合わない場合は None
    pub fn region(&self, region: Region) -> Option<&[Landmark]> {
        let points = match region {
            Region::Face => self.face.as_deref(),
            Region::Pose => self.pose.as_deref(),
            Region::PoseWorld => self.pose_world.as_deref(),
            Region::LeftHand => self.left_hand.as_deref(),
            Region::RightHand => self.right_hand.as_deref(),
        }?;
        if region.accepts(points.len()) {
            Some(points)
        } else {
            debug!("{:?}: unexpected landmark count {}, ignoring region", region, points.len());
            None
        }
    }

    /// 有効な領域が一つもないか
    pub fn is_empty(&self) -> bool {
        Region::ALL.iter().all(|&r| self.region(r).is_none())
    }
}
