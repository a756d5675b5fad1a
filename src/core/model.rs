// forum records and the small rules around them

use crate::Error;
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

pub const NICKNAME_MAX_CHARS: usize = 20;
pub const ANONYMOUS_NAME: &str = "익명";
/// Label for an unset filter.
pub const ALL_LABEL: &str = "전체";

// json and query input go through FromStr so labels work there too
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    #[default]
    Student,
    Parent,
    Peer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Parent, Role::Peer];

    pub fn key(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Peer => "peer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "학생",
            Role::Parent => "부모",
            Role::Peer => "또래",
        }
    }

    /// Anything unrecognised falls back to student.
    pub fn sanitize(raw: &str) -> Role {
        raw.parse().unwrap_or_default()
    }

    pub fn next(self) -> Role {
        let idx = Self::ALL.iter().position(|&r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "student" | "학생" => Ok(Role::Student),
            "parent" | "부모" => Ok(Role::Parent),
            "peer" | "또래" => Ok(Role::Peer),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Category {
    #[default]
    FailureStory,
    Feelings,
    Gratitude,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::FailureStory,
        Category::Feelings,
        Category::Gratitude,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::FailureStory => "failure_story",
            Category::Feelings => "feelings",
            Category::Gratitude => "gratitude",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::FailureStory => "실패담",
            Category::Feelings => "감정나눔",
            Category::Gratitude => "감사/응원",
        }
    }

    pub fn next(self) -> Category {
        let idx = Self::ALL.iter().position(|&c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "failure_story" | "failure-story" | "실패담" => Ok(Category::FailureStory),
            "feelings" | "감정나눔" => Ok(Category::Feelings),
            "gratitude" | "감사/응원" => Ok(Category::Gratitude),
            other => Err(Error::InvalidCategory(other.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub created_at: String,
    pub role: Role,
    pub nickname: Option<String>,
    pub is_anonymous: bool,
    pub category: Category,
    pub content: String,
    pub hearts: i64,
    pub is_flagged: bool,
    pub share_code: Option<String>,
}

impl Post {
    pub fn author_label(&self) -> String {
        author_label(self.role, self.nickname.as_deref(), self.is_anonymous)
    }

    pub fn display_time(&self) -> String {
        display_time(&self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub created_at: String,
    pub role: Role,
    pub nickname: Option<String>,
    pub is_anonymous: bool,
    pub content: String,
}

impl Comment {
    pub fn author_label(&self) -> String {
        author_label(self.role, self.nickname.as_deref(), self.is_anonymous)
    }

    pub fn display_time(&self) -> String {
        display_time(&self.created_at)
    }
}

/// Who is writing: the identity picked once and attached to every submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
}

fn default_anonymous() -> bool {
    true
}

impl Default for Author {
    fn default() -> Self {
        Self {
            role: Role::Student,
            nickname: None,
            is_anonymous: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    #[serde(flatten)]
    pub author: Author,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_share_code")]
    pub with_share_code: bool,
}

fn default_share_code() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    #[serde(skip)]
    pub post_id: i64,
    #[serde(flatten)]
    pub author: Author,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostFilter {
    #[serde(default, deserialize_with = "all_as_none")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "all_as_none")]
    pub role: Option<Role>,
    pub share_code: Option<String>,
    #[serde(rename = "q")]
    pub text: Option<String>,
}

// a blank value or 전체 in a query string means no filter
fn all_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("all") | Some(ALL_LABEL) => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl PostFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.role.is_none()
            && self.share_code.as_deref().is_none_or(|c| c.trim().is_empty())
            && self.text.as_deref().is_none_or(|t| t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

/// Trims a body and refuses it when nothing is left.
pub fn normalize_body(raw: &str) -> Result<String, Error> {
    let body = raw.trim();
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }
    Ok(body.to_string())
}

pub fn normalize_nickname(raw: Option<&str>) -> Result<Option<String>, Error> {
    let Some(nick) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if nick.chars().count() > NICKNAME_MAX_CHARS {
        return Err(Error::NicknameTooLong {
            max: NICKNAME_MAX_CHARS,
        });
    }
    Ok(Some(nick.to_string()))
}

pub fn normalize_share_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn author_label(role: Role, nickname: Option<&str>, is_anonymous: bool) -> String {
    let name = match nickname {
        Some(n) if !is_anonymous && !n.is_empty() => n,
        _ => ANONYMOUS_NAME,
    };
    format!("{} · {}", role.label(), name)
}

pub fn display_time(created_at: &str) -> String {
    created_at.replace('T', " ")
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
