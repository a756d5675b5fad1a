// display-time pairing of records with their crisis check
// nothing here is ever written back to the store

use crate::core::crisis::{CrisisDetector, CrisisNotice};
use crate::core::model::{Comment, Post};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CrisisNotice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CrisisNotice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

impl CrisisDetector {
    pub fn view_post(&self, post: Post) -> PostView {
        let matched = self.matched_phrase(&post.content);
        if let Some(phrase) = matched {
            tracing::debug!(post_id = post.id, phrase, "crisis phrase in post");
        }
        let crisis = matched.is_some();
        PostView {
            post,
            crisis,
            notice: CrisisNotice::for_post(crisis),
        }
    }

    pub fn view_comment(&self, comment: Comment) -> CommentView {
        let crisis = self.detect(&comment.content);
        CommentView {
            comment,
            crisis,
            notice: CrisisNotice::for_comment(crisis),
        }
    }

    pub fn view_thread(&self, post: Post, comments: Vec<Comment>) -> ThreadView {
        ThreadView {
            post: self.view_post(post),
            comments: comments
                .into_iter()
                .map(|c| self.view_comment(c))
                .collect(),
        }
    }
}
