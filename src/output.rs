// output formatting - readable cards or raw json

use crate::core::{CommentView, CrisisNotice, PostView, ThreadView};
use crate::core::crisis::HELPLINE;
use serde::Serialize;

pub struct Output;

impl Output {
    pub fn posts(posts: &[PostView]) {
        if posts.is_empty() {
            println!("표시할 글이 없습니다. 첫 글을 남겨보세요!");
            return;
        }

        for (i, view) in posts.iter().enumerate() {
            if i > 0 {
                println!();
            }
            Self::post(view);
        }
    }

    pub fn post(view: &PostView) {
        let post = &view.post;
        let flag = if post.is_flagged { "  [신고됨]" } else { "" };

        println!("#{} [{}] {}{}", post.id, post.category.label(), post.author_label(), flag);
        println!("{}  ❤️ {}", post.display_time(), post.hearts);
        if let Some(code) = &post.share_code {
            println!("쉐어코드: {code}");
        }
        println!("{}", indent(&post.content));

        if let Some(notice) = view.notice {
            print_notice(notice);
        }
    }

    pub fn thread(thread: &ThreadView) {
        Self::post(&thread.post);
        println!();
        println!("댓글");
        if thread.comments.is_empty() {
            println!("  아직 댓글이 없습니다. 첫 응원을 남겨보세요.");
            return;
        }
        for comment in &thread.comments {
            Self::comment(comment);
        }
    }

    pub fn comment(view: &CommentView) {
        let c = &view.comment;
        println!("- {} ({}): {}", c.author_label(), c.display_time(), c.content);
        if let Some(notice) = view.notice {
            print_notice(notice);
        }
    }

    pub fn helpline() {
        println!("{HELPLINE}");
    }

    // raw json for scripts
    pub fn raw<T: Serialize>(value: &T) {
        println!("{}", serde_json::to_string(value).unwrap_or_default());
    }
}

fn print_notice(notice: CrisisNotice) {
    println!("{}", notice.banner);
    if let Some(line) = notice.follow_up {
        println!("{line}");
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
