// app state for the tui

use crate::core::model::ALL_LABEL;
use crate::core::{CommentView, CrisisNotice, PostView};
use crate::tui::theme::{Theme, ThemeKind, detect_theme};
use crate::{Author, Category, Comment, CrisisDetector, NewComment, NewPost, Post, PostFilter, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Posts,
    Detail,
    Compose,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Themes,
    Identity,
    Filter,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeTarget {
    Post,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Ok,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    SelectionChanged,
    SubmitPost(NewPost),
    SubmitComment(NewComment),
    Heart(i64),
    Flag(i64),
    Delete(i64),
}

/// Single text field with a cursor counted in chars, so hangul edits
/// never land inside a utf-8 sequence.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text before the cursor, used to place the terminal cursor.
    pub fn before_cursor(&self) -> &str {
        &self.text[..self.byte_index(self.cursor)]
    }
}

// fields of the identity popup
pub const IDENTITY_FIELDS: usize = 3;
// fields of the filter popup
pub const FILTER_FIELDS: usize = 4;

pub struct App {
    pub mode: Mode,
    pub panel: Panel,
    pub popup: Popup,
    pub theme_kind: ThemeKind,
    pub theme: Theme,
    pub theme_scroll: usize,

    pub detector: CrisisDetector,
    pub db_location: String,

    // identity (sidebar in a browser, a popup here)
    pub author: Author,
    pub nickname_input: TextInput,
    pub identity_field: usize,

    // filters
    pub filter: PostFilter,
    pub filter_code_input: TextInput,
    pub filter_text_input: TextInput,
    pub filter_field: usize,

    // posts and the selected thread
    pub posts: Vec<Post>,
    pub selected: usize,
    pub comments: Vec<Comment>,
    pub detail_scroll: usize,

    // compose box
    pub compose: TextInput,
    pub compose_target: ComposeTarget,
    pub compose_category: Category,
    pub compose_share_code: bool,

    // last submission acknowledgement
    pub ack: Option<String>,
    pub ack_notice: Option<CrisisNotice>,

    pub logs: Vec<LogEntry>,
    pub log_scroll: usize,
    pub loading: bool,
}

impl App {
    pub fn new(detector: CrisisDetector, author: Author, db_location: &str) -> Self {
        Self::with_theme(detector, author, db_location, detect_theme())
    }

    pub fn with_theme(
        detector: CrisisDetector,
        author: Author,
        db_location: &str,
        theme_kind: ThemeKind,
    ) -> Self {
        let nickname_input = TextInput::with_text(author.nickname.as_deref().unwrap_or_default());

        let mut app = Self {
            mode: Mode::Normal,
            panel: Panel::Posts,
            popup: Popup::None,
            theme_kind,
            theme: Theme::from_kind(theme_kind),
            theme_scroll: theme_kind.index(),
            detector,
            db_location: db_location.to_string(),
            author,
            nickname_input,
            identity_field: 0,
            filter: PostFilter::default(),
            filter_code_input: TextInput::default(),
            filter_text_input: TextInput::default(),
            filter_field: 0,
            posts: Vec::new(),
            selected: 0,
            comments: Vec::new(),
            detail_scroll: 0,
            compose: TextInput::default(),
            compose_target: ComposeTarget::Post,
            compose_category: Category::FailureStory,
            compose_share_code: true,
            ack: None,
            ack_notice: None,
            logs: Vec::new(),
            log_scroll: 0,
            loading: false,
        };

        app.log(LogLevel::Ok, format!("opened {}", app.db_location));
        app.log(
            LogLevel::Info,
            format!(
                "crisis phrases {} ({} entries)",
                app.detector.version(),
                app.detector.phrases().len()
            ),
        );

        app
    }

    pub fn log(&mut self, level: LogLevel, message: String) {
        self.logs.push(LogEntry { level, message });
        // keep the newest entry in view
        self.log_scroll = self.logs.len().saturating_sub(1);
    }

    pub fn set_error(&mut self, err: String) {
        self.loading = false;
        self.log(LogLevel::Error, err);
    }

    // posts

    /// Replaces the list, keeping the same post selected when it survives.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        let keep = self.selected_post().map(|p| p.id);
        self.posts = posts;
        self.selected = keep
            .and_then(|id| self.posts.iter().position(|p| p.id == id))
            .unwrap_or(0);
        if self.posts.is_empty() {
            self.comments.clear();
        }
        self.loading = false;
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        self.detail_scroll = 0;
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.selected)
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected_post().map(|p| p.id)
    }

    pub fn select_next(&mut self) -> bool {
        if self.selected + 1 < self.posts.len() {
            self.selected += 1;
            return true;
        }
        false
    }

    pub fn select_prev(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            return true;
        }
        false
    }

    pub fn post_has_crisis(&self, post: &Post) -> bool {
        self.detector.detect(&post.content)
    }

    pub fn comment_has_crisis(&self, comment: &Comment) -> bool {
        self.detector.detect(&comment.content)
    }

    pub fn cycle_panel(&mut self) {
        self.panel = match self.panel {
            Panel::Posts => Panel::Detail,
            Panel::Detail => Panel::Compose,
            Panel::Compose => Panel::Logs,
            Panel::Logs => Panel::Posts,
        };
    }

    pub fn scroll_down(&mut self) -> Action {
        match self.panel {
            Panel::Posts => {
                if self.select_next() {
                    return Action::SelectionChanged;
                }
            }
            Panel::Detail => self.detail_scroll += 1,
            Panel::Logs => {
                if self.log_scroll + 1 < self.logs.len() {
                    self.log_scroll += 1;
                }
            }
            Panel::Compose => {}
        }
        Action::None
    }

    pub fn scroll_up(&mut self) -> Action {
        match self.panel {
            Panel::Posts => {
                if self.select_prev() {
                    return Action::SelectionChanged;
                }
            }
            Panel::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            Panel::Logs => self.log_scroll = self.log_scroll.saturating_sub(1),
            Panel::Compose => {}
        }
        Action::None
    }

    // compose

    pub fn start_post(&mut self) {
        self.compose_target = ComposeTarget::Post;
        self.panel = Panel::Compose;
        self.mode = Mode::Insert;
    }

    pub fn start_comment(&mut self) -> bool {
        if self.selected_post().is_none() {
            self.log(LogLevel::Warn, "no post selected".to_string());
            return false;
        }
        self.compose_target = ComposeTarget::Comment;
        self.panel = Panel::Compose;
        self.mode = Mode::Insert;
        true
    }

    pub fn enter_insert(&mut self) {
        self.panel = Panel::Compose;
        self.mode = Mode::Insert;
    }

    pub fn exit_insert(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn cycle_compose_category(&mut self) {
        self.compose_category = self.compose_category.next();
    }

    pub fn toggle_share_code(&mut self) {
        self.compose_share_code = !self.compose_share_code;
    }

    /// Turns the compose box into a submission. Blank text is refused here,
    /// before anything reaches the store.
    pub fn submit(&mut self) -> Option<Action> {
        if self.compose.is_blank() {
            let message = match self.compose_target {
                ComposeTarget::Post => "내용을 입력해주세요.",
                ComposeTarget::Comment => "댓글 내용을 입력해주세요.",
            };
            self.log(LogLevel::Warn, message.to_string());
            return None;
        }

        let content = self.compose.text().trim().to_string();
        let action = match self.compose_target {
            ComposeTarget::Post => Action::SubmitPost(NewPost {
                author: self.author.clone(),
                category: self.compose_category,
                content,
                with_share_code: self.compose_share_code,
            }),
            ComposeTarget::Comment => {
                let Some(post_id) = self.selected_id() else {
                    self.log(LogLevel::Warn, "no post selected".to_string());
                    return None;
                };
                Action::SubmitComment(NewComment {
                    post_id,
                    author: self.author.clone(),
                    content,
                })
            }
        };

        self.loading = true;
        Some(action)
    }

    pub fn ack_post(&mut self, view: &PostView) {
        self.compose.clear();
        self.loading = false;
        let mut message = "게시되었습니다! 아래 목록에서 확인하세요.".to_string();
        if let Some(code) = &view.post.share_code {
            message.push_str(&format!(" 쉐어코드: {code}"));
        }
        self.log(LogLevel::Ok, message.clone());
        self.finish_ack(message, view.notice);
    }

    pub fn ack_comment(&mut self, view: &CommentView) {
        self.compose.clear();
        self.loading = false;
        let message = "댓글이 등록되었습니다.".to_string();
        self.log(LogLevel::Ok, message.clone());
        self.finish_ack(message, view.notice);
    }

    fn finish_ack(&mut self, message: String, notice: Option<CrisisNotice>) {
        if notice.is_some() {
            self.log(LogLevel::Warn, "crisis phrase detected in submission".to_string());
        }
        self.ack = Some(message);
        self.ack_notice = notice;
        self.panel = Panel::Posts;
    }

    pub fn dismiss_ack(&mut self) {
        self.ack = None;
        self.ack_notice = None;
    }

    // themes

    pub fn open_theme_popup(&mut self) {
        self.popup = Popup::Themes;
        self.theme_scroll = self.theme_kind.index();
    }

    pub fn close_popup(&mut self) {
        self.popup = Popup::None;
    }

    pub fn theme_scroll_up(&mut self) {
        self.theme_scroll = self.theme_scroll.saturating_sub(1);
    }

    pub fn theme_scroll_down(&mut self) {
        if self.theme_scroll + 1 < ThemeKind::ALL.len() {
            self.theme_scroll += 1;
        }
    }

    pub fn select_theme(&mut self) {
        let kind = ThemeKind::ALL[self.theme_scroll];
        self.theme_kind = kind;
        self.theme = Theme::from_kind(kind);
        self.popup = Popup::None;
        self.log(LogLevel::Info, format!("theme: {}", kind.name()));
    }

    // identity

    pub fn open_identity_popup(&mut self) {
        self.popup = Popup::Identity;
        self.identity_field = 0;
    }

    pub fn identity_next_field(&mut self) {
        self.identity_field = (self.identity_field + 1) % IDENTITY_FIELDS;
    }

    pub fn identity_prev_field(&mut self) {
        self.identity_field = (self.identity_field + IDENTITY_FIELDS - 1) % IDENTITY_FIELDS;
    }

    pub fn cycle_role(&mut self) {
        self.author.role = self.author.role.next();
    }

    pub fn toggle_anonymous(&mut self) {
        self.author.is_anonymous = !self.author.is_anonymous;
    }

    pub fn apply_identity(&mut self) {
        let nick = self.nickname_input.text().trim();
        self.author.nickname = (!nick.is_empty()).then(|| nick.to_string());
        self.popup = Popup::None;
        self.log(
            LogLevel::Info,
            format!(
                "posting as {}",
                crate::author_label(
                    self.author.role,
                    self.author.nickname.as_deref(),
                    self.author.is_anonymous
                )
            ),
        );
    }

    // filters

    pub fn open_filter_popup(&mut self) {
        self.popup = Popup::Filter;
        self.filter_field = 0;
    }

    pub fn filter_next_field(&mut self) {
        self.filter_field = (self.filter_field + 1) % FILTER_FIELDS;
    }

    pub fn filter_prev_field(&mut self) {
        self.filter_field = (self.filter_field + FILTER_FIELDS - 1) % FILTER_FIELDS;
    }

    /// all -> each category -> all
    pub fn cycle_filter_category(&mut self) {
        self.filter.category = match self.filter.category {
            None => Some(Category::ALL[0]),
            Some(c) => Category::ALL
                .iter()
                .position(|&x| x == c)
                .and_then(|i| Category::ALL.get(i + 1))
                .copied(),
        };
    }

    /// all -> each role -> all
    pub fn cycle_filter_role(&mut self) {
        self.filter.role = match self.filter.role {
            None => Some(Role::ALL[0]),
            Some(r) => Role::ALL
                .iter()
                .position(|&x| x == r)
                .and_then(|i| Role::ALL.get(i + 1))
                .copied(),
        };
    }

    pub fn filter_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.filter_field {
            2 => Some(&mut self.filter_code_input),
            3 => Some(&mut self.filter_text_input),
            _ => None,
        }
    }

    pub fn apply_filter(&mut self) -> Action {
        let code = self.filter_code_input.text().trim();
        let text = self.filter_text_input.text().trim();
        self.filter.share_code = (!code.is_empty()).then(|| code.to_uppercase());
        self.filter.text = (!text.is_empty()).then(|| text.to_string());
        self.popup = Popup::None;
        self.selected = 0;
        if self.filter.is_empty() {
            self.log(LogLevel::Info, "showing all posts".to_string());
        } else {
            self.log(LogLevel::Info, format!("filter: {}", self.filter_summary()));
        }
        Action::Refresh
    }

    pub fn clear_filter(&mut self) -> Action {
        self.filter = PostFilter::default();
        self.filter_code_input.clear();
        self.filter_text_input.clear();
        self.popup = Popup::None;
        self.selected = 0;
        Action::Refresh
    }

    pub fn filter_summary(&self) -> String {
        let category = self.filter.category.map(|c| c.label()).unwrap_or(ALL_LABEL);
        let role = self.filter.role.map(|r| r.label()).unwrap_or(ALL_LABEL);
        let mut summary = format!("카테고리 {category} · 작성자 {role}");
        if let Some(code) = &self.filter.share_code {
            summary.push_str(&format!(" · 코드 {code}"));
        }
        if let Some(text) = &self.filter.text {
            summary.push_str(&format!(" · \"{text}\""));
        }
        summary
    }

    // heart / flag / delete on the selected post

    pub fn heart_selected(&mut self) -> Action {
        self.selected_id().map(Action::Heart).unwrap_or(Action::None)
    }

    pub fn flag_selected(&mut self) -> Action {
        self.selected_id().map(Action::Flag).unwrap_or(Action::None)
    }

    pub fn ask_delete(&mut self) {
        if self.selected_post().is_some() {
            self.popup = Popup::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) -> Action {
        self.popup = Popup::None;
        self.selected_id().map(Action::Delete).unwrap_or(Action::None)
    }

    pub fn set_hearts(&mut self, id: i64, hearts: i64) {
        if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
            post.hearts = hearts;
        }
    }

    pub fn mark_flagged(&mut self, id: i64) {
        if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
            post.is_flagged = true;
        }
        self.log(
            LogLevel::Warn,
            "신고되었습니다. 관리자 검토가 필요합니다.".to_string(),
        );
    }
}
