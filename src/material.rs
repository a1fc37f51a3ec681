//! 난연제 종류별 회귀 계수 테이블.
//! 습도(%)에 대한 탄화 길이(cm)의 1차 회귀선으로, 연소 실험 데이터에서 미리 구한 값이다.

/// 난연제 한 종류의 회귀 모델(기울기/절편)과 그래프 색상.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProfile {
    /// 조회 키로도 쓰이는 고유 이름
    pub name: &'static str,
    pub slope: f64,
    pub intercept: f64,
    /// 그래프 표시 색상 이름 (`chart::Rgb::from_name`으로 해석)
    pub display_color: &'static str,
}

impl MaterialProfile {
    /// `slope * humidity + intercept`
    pub fn char_length_at(&self, humidity: f64) -> f64 {
        self.slope * humidity + self.intercept
    }
}

/// 선택 가능한 난연제 종류. 세 가지로 고정되어 있다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// 난연제 무처리
    Untreated,
    /// 폴리비닐 알코올 기반 난연제
    PolyvinylAlcohol,
    /// 알긴산 나트륨 기반 난연제
    SodiumAlginate,
}

impl Material {
    /// 테이블 순서대로 모든 난연제.
    pub const ALL: [Material; 3] = [
        Material::Untreated,
        Material::PolyvinylAlcohol,
        Material::SodiumAlginate,
    ];

    pub fn profile(self) -> &'static MaterialProfile {
        match self {
            Material::Untreated => &PROFILES[0],
            Material::PolyvinylAlcohol => &PROFILES[1],
            Material::SodiumAlginate => &PROFILES[2],
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// 언어팩/CLI에서 쓰는 ASCII 키.
    pub fn key(self) -> &'static str {
        match self {
            Material::Untreated => "untreated",
            Material::PolyvinylAlcohol => "pva",
            Material::SodiumAlginate => "alginate",
        }
    }

    /// 이름(한글) 또는 ASCII 키로 난연제를 찾는다. 없으면 기본값 없이 오류를 돌려준다.
    pub fn from_name(name: &str) -> Result<Material, UnknownMaterial> {
        let needle = name.trim();
        Material::ALL
            .into_iter()
            .find(|m| m.name() == needle || m.key().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownMaterial {
                name: needle.to_string(),
            })
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Material {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::from_name(s)
    }
}

/// 테이블에 없는 난연제 이름이 들어왔을 때의 오류.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMaterial {
    pub name: String,
}

impl std::fmt::Display for UnknownMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown material: {}", self.name)
    }
}

impl std::error::Error for UnknownMaterial {}

pub fn profiles() -> &'static [MaterialProfile] {
    PROFILES
}

const PROFILES: &[MaterialProfile] = &[
    MaterialProfile {
        name: "난연제 무처리",
        slope: -0.01,
        intercept: 6.58,
        display_color: "blue",
    },
    MaterialProfile {
        name: "폴리비닐 알코올 기반 난연제",
        slope: 0.03,
        intercept: 2.67,
        display_color: "orange",
    },
    MaterialProfile {
        name: "알긴산 나트륨 기반 난연제",
        slope: -0.02,
        intercept: 5.71,
        display_color: "green",
    },
];
