// core logic - crisis detection, forum records, and the sqlite store

mod accounts;
pub mod crisis;
mod db;
pub mod model;
mod share;
mod view;

pub use crisis::{CrisisDetector, CrisisNotice, PhraseList};
pub use db::Store;
pub use model::{Author, Category, Comment, NewComment, NewPost, Post, PostFilter, Role, User};
pub use share::{SHARE_CODE_LEN, generate_share_code, is_share_code};
pub use view::{CommentView, PostView, ThreadView};
