use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// ソルバが回転を出す解剖学的部位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(usize)]
pub enum BodyPart {
    Hips = 0,
    Spine = 1,
    Chest = 2,
    Neck = 3,
    LeftUpperArm = 4,
    RightUpperArm = 5,
    LeftLowerArm = 6,
    RightLowerArm = 7,
    LeftHand = 8,
    RightHand = 9,
}

impl BodyPart {
    pub const COUNT: usize = 10;

    pub const ALL: [BodyPart; Self::COUNT] = [
        BodyPart::Hips,
        BodyPart::Spine,
        BodyPart::Chest,
        BodyPart::Neck,
        BodyPart::LeftUpperArm,
        BodyPart::RightUpperArm,
        BodyPart::LeftLowerArm,
        BodyPart::RightLowerArm,
        BodyPart::LeftHand,
        BodyPart::RightHand,
    ];
}

/// 被写体（アバター）から見た左右
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 右を基準にした符号
    pub fn invert(self) -> f32 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }

    pub fn upper_arm(self) -> BodyPart {
        match self {
            Side::Left => BodyPart::LeftUpperArm,
            Side::Right => BodyPart::RightUpperArm,
        }
    }

    pub fn lower_arm(self) -> BodyPart {
        match self {
            Side::Left => BodyPart::LeftLowerArm,
            Side::Right => BodyPart::RightLowerArm,
        }
    }

    pub fn hand(self) -> BodyPart {
        match self {
            Side::Left => BodyPart::LeftHand,
            Side::Right => BodyPart::RightHand,
        }
    }
}

/// 3軸回転（ラジアン）。適用時は X→Y→Z の内因性順で合成する
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const ZERO: Euler = Euler { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// 軸ごとの符号を掛ける
    pub fn signed(self, signs: [f32; 3]) -> Self {
        Self::new(self.x * signs[0], self.y * signs[1], self.z * signs[2])
    }
}

/// 1フレーム分の部位回転。検出できなかった部位は None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvedPose {
    parts: [Option<Euler>; BodyPart::COUNT],
}

impl SolvedPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, part: BodyPart, rotation: Euler) {
        self.parts[part as usize] = Some(rotation);
    }

    pub fn get(&self, part: BodyPart) -> Option<Euler> {
        self.parts[part as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, Euler)> + '_ {
        BodyPart::ALL
            .iter()
            .filter_map(move |&part| self.get(part).map(|rot| (part, rot)))
    }

    pub fn len(&self) -> usize {
        self.parts.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 検出できた部位だけを `{"Chest": {...}}` の形で出す
impl Serialize for SolvedPose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (part, rotation) in self.iter() {
            map.serialize_entry(&part, &rotation)?;
        }
        map.end()
    }
}

/// 口形カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Viseme {
    A,
    I,
    U,
    E,
    O,
}

impl Viseme {
    pub const ALL: [Viseme; 5] = [Viseme::A, Viseme::I, Viseme::U, Viseme::E, Viseme::O];
}

/// 口形ごとの強度 (0.0〜1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MouthShape {
    pub a: f32,
    pub i: f32,
    pub u: f32,
    pub e: f32,
    pub o: f32,
}

impl MouthShape {
    pub fn get(&self, viseme: Viseme) -> f32 {
        match viseme {
            Viseme::A => self.a,
            Viseme::I => self.i,
            Viseme::U => self.u,
            Viseme::E => self.e,
            Viseme::O => self.o,
        }
    }

    pub fn set(&mut self, viseme: Viseme, value: f32) {
        match viseme {
            Viseme::A => self.a = value,
            Viseme::I => self.i = value,
            Viseme::U => self.u = value,
            Viseme::E => self.e = value,
            Viseme::O => self.o = value,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, f32)> + '_ {
        Viseme::ALL.iter().map(move |&v| (v, self.get(v)))
    }
}

/// ソルバの 1 フレーム分の出力
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolvedFrame {
    pub pose: SolvedPose,
    /// 顔が検出されたフレームのみ Some
    pub mouth: Option<MouthShape>,
}

impl SolvedFrame {
    pub fn is_empty(&self) -> bool {
        self.pose.is_empty() && self.mouth.is_none()
    }
}
