// tests for the content store, run against in-memory sqlite

use failforward::{
    Author, Category, CrisisDetector, Error, NewComment, NewPost, PostFilter, Role,
    SHARE_CODE_LEN, Store, author_label, is_share_code,
};

fn author(role: Role) -> Author {
    Author {
        role,
        nickname: None,
        is_anonymous: true,
    }
}

fn new_post(role: Role, category: Category, content: &str) -> NewPost {
    NewPost {
        author: author(role),
        category,
        content: content.to_string(),
        with_share_code: false,
    }
}

fn new_comment(post_id: i64, content: &str) -> NewComment {
    NewComment {
        post_id,
        author: author(Role::Peer),
        content: content.to_string(),
    }
}

async fn store() -> Store {
    Store::in_memory().await.unwrap()
}

#[tokio::test]
async fn test_create_post() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::FailureStory, "  시험을 망쳤어요  "))
        .await
        .unwrap();

    assert!(post.id > 0);
    assert_eq!(post.content, "시험을 망쳤어요");
    assert_eq!(post.hearts, 0);
    assert!(!post.is_flagged);
    assert!(post.share_code.is_none());
    assert!(!post.created_at.is_empty());

    let stored = store.get_post(post.id).await.unwrap();
    assert_eq!(stored, post);
}

#[tokio::test]
async fn test_ids_increase() {
    let store = store().await;
    let a = store
        .create_post(new_post(Role::Student, Category::Feelings, "하나"))
        .await
        .unwrap();
    let b = store
        .create_post(new_post(Role::Student, Category::Feelings, "둘"))
        .await
        .unwrap();
    assert!(b.id > a.id);
}

#[tokio::test]
async fn test_empty_post_rejected() {
    let store = store().await;

    let err = store
        .create_post(new_post(Role::Student, Category::Feelings, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyBody));

    let err = store
        .create_post(new_post(Role::Student, Category::Feelings, "   \n "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyBody));

    assert_eq!(store.count_posts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_share_code_generated() {
    let store = store().await;
    let mut new = new_post(Role::Parent, Category::Gratitude, "고마워");
    new.with_share_code = true;

    let post = store.create_post(new).await.unwrap();
    let code = post.share_code.unwrap();
    assert_eq!(code.len(), SHARE_CODE_LEN);
    assert!(is_share_code(&code));
}

#[tokio::test]
async fn test_find_by_share_code() {
    let store = store().await;
    let mut new = new_post(Role::Parent, Category::Gratitude, "가족에게");
    new.with_share_code = true;
    let post = store.create_post(new).await.unwrap();
    let code = post.share_code.clone().unwrap();

    let found = store
        .find_by_share_code(&format!("  {}  ", code.to_lowercase()))
        .await
        .unwrap();
    assert_eq!(found.id, post.id);

    let err = store.find_by_share_code("nope").await.unwrap_err();
    assert!(matches!(err, Error::ShareCodeNotFound(code) if code == "NOPE"));
}

#[tokio::test]
async fn test_nickname_rules() {
    let store = store().await;

    let mut new = new_post(Role::Peer, Category::Feelings, "안녕");
    new.author.nickname = Some("   ".to_string());
    let post = store.create_post(new).await.unwrap();
    assert_eq!(post.nickname, None);

    let mut new = new_post(Role::Peer, Category::Feelings, "안녕");
    new.author.nickname = Some("가".repeat(21));
    let err = store.create_post(new).await.unwrap_err();
    assert!(matches!(err, Error::NicknameTooLong { max: 20 }));
}

#[tokio::test]
async fn test_hearts_add_one_each_time() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::FailureStory, "응원해주세요"))
        .await
        .unwrap();

    // no de-duplication, every call counts
    assert_eq!(store.increment_heart(post.id).await.unwrap(), 1);
    assert_eq!(store.increment_heart(post.id).await.unwrap(), 2);
    assert_eq!(store.increment_heart(post.id).await.unwrap(), 3);

    assert_eq!(store.get_post(post.id).await.unwrap().hearts, 3);
}

#[tokio::test]
async fn test_heart_missing_post() {
    let store = store().await;
    let err = store.increment_heart(42).await.unwrap_err();
    assert!(matches!(err, Error::PostNotFound(42)));
}

#[tokio::test]
async fn test_flag_post() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::Feelings, "이상한 글"))
        .await
        .unwrap();

    store.set_flagged(post.id).await.unwrap();
    // flagging twice is harmless
    store.set_flagged(post.id).await.unwrap();
    assert!(store.get_post(post.id).await.unwrap().is_flagged);

    assert!(matches!(store.set_flagged(999).await, Err(Error::PostNotFound(999))));
}

#[tokio::test]
async fn test_list_newest_first() {
    let store = store().await;
    for text in ["first", "second", "third"] {
        store
            .create_post(new_post(Role::Student, Category::Feelings, text))
            .await
            .unwrap();
    }

    let posts = store.list_posts(&PostFilter::default()).await.unwrap();
    let contents: Vec<_> = posts.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_filters() {
    let store = store().await;
    store
        .create_post(new_post(Role::Student, Category::FailureStory, "수학 시험 실패"))
        .await
        .unwrap();
    store
        .create_post(new_post(Role::Parent, Category::Gratitude, "아이에게 고마워"))
        .await
        .unwrap();
    store
        .create_post(new_post(Role::Peer, Category::Feelings, "영어 시험 걱정"))
        .await
        .unwrap();

    let by_category = store
        .list_posts(&PostFilter {
            category: Some(Category::Gratitude),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].role, Role::Parent);

    let by_role = store
        .list_posts(&PostFilter {
            role: Some(Role::Peer),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_role.len(), 1);
    assert_eq!(by_role[0].category, Category::Feelings);

    let by_text = store
        .list_posts(&PostFilter {
            text: Some(" 시험 ".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_text.len(), 2);

    let combined = store
        .list_posts(&PostFilter {
            role: Some(Role::Student),
            text: Some("시험".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].content, "수학 시험 실패");
}

#[tokio::test]
async fn test_list_by_share_code() {
    let store = store().await;
    let mut new = new_post(Role::Student, Category::FailureStory, "공유할 글");
    new.with_share_code = true;
    let shared = store.create_post(new).await.unwrap();
    store
        .create_post(new_post(Role::Student, Category::FailureStory, "다른 글"))
        .await
        .unwrap();

    let code = shared.share_code.unwrap();
    let posts = store
        .list_posts(&PostFilter {
            share_code: Some(code.to_lowercase()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, shared.id);
}

#[tokio::test]
async fn test_comments_oldest_first() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::FailureStory, "힘든 하루"))
        .await
        .unwrap();

    store.create_comment(new_comment(post.id, "힘내요")).await.unwrap();
    store.create_comment(new_comment(post.id, "  응원해요  ")).await.unwrap();

    let comments = store.list_comments(post.id).await.unwrap();
    let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, ["힘내요", "응원해요"]);
    assert!(comments.iter().all(|c| c.post_id == post.id));
}

#[tokio::test]
async fn test_empty_comment_rejected() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::FailureStory, "글"))
        .await
        .unwrap();

    let err = store.create_comment(new_comment(post.id, "  ")).await.unwrap_err();
    assert!(matches!(err, Error::EmptyBody));
    assert!(store.list_comments(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_on_missing_post() {
    let store = store().await;
    let err = store.create_comment(new_comment(7, "안녕")).await.unwrap_err();
    assert!(matches!(err, Error::PostNotFound(7)));
}

#[tokio::test]
async fn test_delete_cascades_to_comments() {
    let store = store().await;
    let post = store
        .create_post(new_post(Role::Student, Category::FailureStory, "지울 글"))
        .await
        .unwrap();
    store.create_comment(new_comment(post.id, "댓글 하나")).await.unwrap();
    store.create_comment(new_comment(post.id, "댓글 둘")).await.unwrap();

    store.delete_post(post.id).await.unwrap();

    assert!(matches!(store.get_post(post.id).await, Err(Error::PostNotFound(_))));
    assert!(store.list_comments(post.id).await.unwrap().is_empty());

    assert!(matches!(store.delete_post(post.id).await, Err(Error::PostNotFound(_))));
}

#[tokio::test]
async fn test_crisis_post_is_stored_unchanged() {
    let store = store().await;
    let detector = CrisisDetector::default();
    let text = "요즘 사라지고 싶어요";

    let post = store
        .create_post(new_post(Role::Student, Category::Feelings, text))
        .await
        .unwrap();

    // detection only affects display, the row is a normal post
    let stored = store.get_post(post.id).await.unwrap();
    assert_eq!(stored.content, text);
    assert!(!stored.is_flagged);

    let view = detector.view_post(stored);
    assert!(view.crisis);
    assert!(view.notice.is_some());
}

#[tokio::test]
async fn test_thread_view_marks_comments() {
    let store = store().await;
    let detector = CrisisDetector::default();
    let post = store
        .create_post(new_post(Role::Student, Category::Feelings, "오늘은 괜찮았어"))
        .await
        .unwrap();
    store.create_comment(new_comment(post.id, "다행이다")).await.unwrap();
    store.create_comment(new_comment(post.id, "나는 목숨이 무거워")).await.unwrap();

    let comments = store.list_comments(post.id).await.unwrap();
    let thread = detector.view_thread(post, comments);

    assert!(!thread.post.crisis);
    assert!(!thread.comments[0].crisis);
    assert!(thread.comments[1].crisis);
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let store = store().await;
    let user = store.register("  minji ", "secret").await.unwrap();
    assert_eq!(user.username, "minji");

    let logged_in = store.authenticate("minji", "secret").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    let err = store.authenticate("minji", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));

    let err = store.authenticate("nobody", "secret").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn test_register_duplicate_and_empty() {
    let store = store().await;
    store.register("minji", "secret").await.unwrap();

    let err = store.register("minji", "other").await.unwrap_err();
    assert!(matches!(err, Error::UsernameTaken(_)));

    let err = store.register("  ", "secret").await.unwrap_err();
    assert!(matches!(err, Error::EmptyCredentials));

    let err = store.register("jisoo", "").await.unwrap_err();
    assert!(matches!(err, Error::EmptyCredentials));
}

#[test]
fn test_role_parsing() {
    assert_eq!("parent".parse::<Role>().unwrap(), Role::Parent);
    assert_eq!("또래".parse::<Role>().unwrap(), Role::Peer);
    assert!("admin".parse::<Role>().is_err());
    assert_eq!(Role::sanitize("admin"), Role::Student);
}

#[test]
fn test_category_parsing() {
    assert_eq!("failure-story".parse::<Category>().unwrap(), Category::FailureStory);
    assert_eq!("감사/응원".parse::<Category>().unwrap(), Category::Gratitude);
    assert!("news".parse::<Category>().is_err());
}

#[test]
fn test_author_label() {
    assert_eq!(author_label(Role::Student, Some("민지"), false), "학생 · 민지");
    assert_eq!(author_label(Role::Student, Some("민지"), true), "학생 · 익명");
    assert_eq!(author_label(Role::Parent, None, false), "부모 · 익명");
}

#[tokio::test]
async fn test_unknown_stored_role_reads_as_student() {
    let path = std::env::temp_dir().join(format!("failforward-roles-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let location = path.to_string_lossy().to_string();
    let store = Store::connect(&location).await.unwrap();

    // rows written by hand, outside the store's validation
    let raw = sqlx::SqlitePool::connect(&format!("sqlite://{location}")).await.unwrap();
    for role in ["admin", "부모"] {
        sqlx::query(
            "INSERT INTO posts (created_at, role, is_anonymous, category, content) \
             VALUES ('2024-05-01T13:45:10', ?, 1, 'feelings', '안녕')",
        )
        .bind(role)
        .execute(&raw)
        .await
        .unwrap();
    }
    raw.close().await;

    let posts = store.list_posts(&PostFilter::default()).await.unwrap();
    let roles: Vec<_> = posts.iter().map(|p| p.role).collect();
    assert_eq!(roles, [Role::Parent, Role::Student]);

    let _ = std::fs::remove_file(&path);
}
