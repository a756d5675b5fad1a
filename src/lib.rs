// failforward library - a support forum that warns on crisis keywords

pub mod cli;
mod core;
mod error;
mod output;
mod server;
pub mod tui;

pub use crate::core::crisis::{DEFAULT_PHRASES, DEFAULT_VERSION, HELPLINE};
pub use crate::core::model::{ANONYMOUS_NAME, NICKNAME_MAX_CHARS, author_label};
pub use crate::core::{
    Author, Category, Comment, CommentView, CrisisDetector, CrisisNotice, NewComment, NewPost,
    PhraseList, Post, PostFilter, PostView, Role, SHARE_CODE_LEN, Store, ThreadView, User,
    generate_share_code, is_share_code,
};
pub use error::Error;
pub use server::Server;
