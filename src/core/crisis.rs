// crisis keyword detection
// a plain substring scan, matches inside longer words on purpose

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_VERSION: &str = "ko-1";

pub const DEFAULT_PHRASES: &[&str] = &[
    "자살",
    "죽고",
    "죽고싶",
    "목숨",
    "유서",
    "스스로 생",
    "극단적",
    "해치고 싶",
    "살 의미",
    "끝내고 싶",
    "죽을",
    "숨고 싶",
    "사라지고 싶",
];

/// Always-visible helpline caption.
pub const HELPLINE: &str = "위기 시: 112 / 자살예방상담전화 1393(24시간) / 지역 정신건강복지센터";

const POST_BANNER: &str =
    "⚠️ 위기 신호가 감지되었습니다. 즉시 도움을 요청하세요. 112 / 자살예방상담전화 1393(24시간)";
const POST_FOLLOW_UP: &str = "교내 상담실/담임/보호자와 상의하세요. 당신은 혼자가 아닙니다.";
const COMMENT_BANNER: &str = "⚠️ 댓글에 위기 신호가 감지되었습니다. 112 / 1393";

/// A versioned set of risk phrases, as loaded from disk or the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseList {
    pub version: String,
    pub phrases: Vec<String>,
}

impl Default for PhraseList {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PhraseList {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let list: PhraseList = serde_json::from_str(json)?;
        Ok(list)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Static safety messages shown next to flagged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisNotice {
    pub banner: &'static str,
    pub follow_up: Option<&'static str>,
}

impl CrisisNotice {
    pub const POST: CrisisNotice = CrisisNotice {
        banner: POST_BANNER,
        follow_up: Some(POST_FOLLOW_UP),
    };

    pub const COMMENT: CrisisNotice = CrisisNotice {
        banner: COMMENT_BANNER,
        follow_up: None,
    };

    pub fn for_post(detected: bool) -> Option<Self> {
        detected.then_some(Self::POST)
    }

    pub fn for_comment(detected: bool) -> Option<Self> {
        detected.then_some(Self::COMMENT)
    }
}

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    version: String,
    // lower-cased once at construction
    phrases: Vec<String>,
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION, DEFAULT_PHRASES.iter().copied())
    }
}

impl CrisisDetector {
    pub fn new<I, S>(version: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            version: version.into(),
            phrases,
        }
    }

    /// Builds a detector from a loaded list. An empty list is refused since it
    /// would silently turn every warning off.
    pub fn from_list(list: &PhraseList) -> Result<Self, Error> {
        let detector = Self::new(list.version.clone(), &list.phrases);
        if detector.phrases.is_empty() {
            return Err(Error::Phrases(format!(
                "list {} has no usable phrases",
                list.version
            )));
        }
        Ok(detector)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_list(&PhraseList::load(path)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// First phrase found in `text`, in list order.
    pub fn matched_phrase(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let normalized = text.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| normalized.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn detect(&self, text: &str) -> bool {
        self.matched_phrase(text).is_some()
    }

    pub fn detect_opt(&self, text: Option<&str>) -> bool {
        text.is_some_and(|t| self.detect(t))
    }
}
