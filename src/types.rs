use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Constants ──────────────────────────────────────────────────────────

/// Loser-bracket rounds are stored as `100 + n`.
pub const LOSER_ROUND_OFFSET: i32 = 100;
pub const GRAND_FINAL_ROUND: i32 = 200;
pub const RESET_FINAL_ROUND: i32 = 201;

/// Horizontal distance between the merge junction and the grand final's left edge.
pub const DEFAULT_MERGE_OFFSET: f64 = 20.0;

// ── Match domain types ─────────────────────────────────────────────────

/// Bracket partition. Declaration order is the display sort priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum BracketType {
    Winner,
    Loser,
    Championship,
}

impl BracketType {
    pub const ALL: [BracketType; 3] = [
        BracketType::Winner,
        BracketType::Loser,
        BracketType::Championship,
    ];

    /// Unknown values fall back to winner semantics.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "winner" | "winners" => BracketType::Winner,
            "loser" | "losers" => BracketType::Loser,
            "championship" | "final" | "grand_final" => BracketType::Championship,
            other => {
                tracing::warn!("unknown bracket type {other:?}, treating as winner");
                BracketType::Winner
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BracketType::Winner => "winner",
            BracketType::Loser => "loser",
            BracketType::Championship => "championship",
        }
    }
}

impl From<String> for BracketType {
    fn from(raw: String) -> Self {
        BracketType::parse(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Ongoing,
    Completed,
    Hidden,
}

impl MatchStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "pending" => MatchStatus::Scheduled,
            "ongoing" | "in_progress" | "inprogress" => MatchStatus::Ongoing,
            "completed" => MatchStatus::Completed,
            "hidden" => MatchStatus::Hidden,
            other => {
                tracing::warn!("unknown match status {other:?}, treating as scheduled");
                MatchStatus::Scheduled
            }
        }
    }
}

impl From<String> for MatchStatus {
    fn from(raw: String) -> Self {
        MatchStatus::parse(&raw)
    }
}

/// A match as supplied by the match source. Fields this engine does not
/// interpret are kept in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub round_number: i32,
    pub bracket_type: BracketType,
    #[serde(default)]
    pub team1_id: Option<i64>,
    #[serde(default)]
    pub team2_id: Option<i64>,
    #[serde(default)]
    pub team1_name: Option<String>,
    #[serde(default)]
    pub team2_name: Option<String>,
    #[serde(default)]
    pub winner_id: Option<i64>,
    #[serde(default)]
    pub winner_name: Option<String>,
    #[serde(default)]
    pub score_team1: Option<i32>,
    #[serde(default)]
    pub score_team2: Option<i32>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Match {
    pub fn new(id: i64, round_number: i32, bracket_type: BracketType) -> Self {
        Match {
            id,
            round_number,
            bracket_type,
            team1_id: None,
            team2_id: None,
            team1_name: None,
            team2_name: None,
            winner_id: None,
            winner_name: None,
            score_team1: None,
            score_team2: None,
            status: MatchStatus::Scheduled,
            extra: Map::new(),
        }
    }

    pub fn with_teams(mut self, team1_id: Option<i64>, team2_id: Option<i64>) -> Self {
        self.team1_id = team1_id;
        self.team2_id = team2_id;
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.status == MatchStatus::Hidden
    }

    pub fn is_bye(&self) -> bool {
        self.team1_id.is_some() && self.team2_id.is_none()
    }

    pub fn is_grand_final(&self) -> bool {
        self.bracket_type == BracketType::Championship && self.round_number == GRAND_FINAL_ROUND
    }

    pub fn is_reset_final(&self) -> bool {
        self.bracket_type == BracketType::Championship && self.round_number == RESET_FINAL_ROUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliminationType {
    Single,
    Double,
}

impl EliminationType {
    /// Double elimination iff any visible loser or championship match exists.
    pub fn infer(matches: &[Match]) -> Self {
        let double = matches
            .iter()
            .filter(|m| !m.is_hidden())
            .any(|m| m.bracket_type != BracketType::Winner);
        if double {
            EliminationType::Double
        } else {
            EliminationType::Single
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "single_elimination" => Some(EliminationType::Single),
            "double" | "double_elimination" => Some(EliminationType::Double),
            _ => None,
        }
    }
}

// ── Geometry types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Measured box of one rendered match, as reported by the layout provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBox {
    pub match_id: i64,
    pub round: i32,
    pub match_index: usize,
    pub bracket_type: BracketType,
    #[serde(default)]
    pub status: MatchStatus,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketPoint {
    pub match_id: i64,
    pub round_index: i32,
    pub match_index: usize,
    pub bracket_type: BracketType,
    pub status: MatchStatus,
    pub right_center: Point,
    pub left_center: Point,
}

// ── Connector types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectorKind {
    Normal,
    Merge,
    ResetLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Segment { from, to }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub kind: ConnectorKind,
    /// Match the path starts at; `None` for the merge junction.
    pub source: Option<i64>,
    pub target: Option<i64>,
    pub segments: Vec<Segment>,
}

impl Connector {
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|segment| segment.from)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|segment| segment.to)
    }
}
