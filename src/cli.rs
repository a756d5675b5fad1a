// command line interface

use crate::output::Output;
use crate::{
    Author, Category, CrisisDetector, CrisisNotice, NewComment, NewPost, PhraseList, PostFilter,
    Role, Server, Store,
};
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "failforward", about = "A support forum for students, parents and peers")]
struct Cli {
    /// sqlite database file or url
    #[arg(long, env = "FF_DB_PATH", global = true)]
    db: Option<String>,

    /// json file with the crisis phrase list (built-in list if unset)
    #[arg(long, env = "FF_PHRASES", global = true)]
    phrases: Option<PathBuf>,

    #[command(flatten)]
    identity: Identity,

    /// print json instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// who you are posting as
#[derive(Args, Clone)]
pub struct Identity {
    /// your role
    #[arg(long, short, value_enum, default_value_t = Role::Student, global = true)]
    role: Role,

    /// display name (only shown with --show-name)
    #[arg(long, short, global = true)]
    nickname: Option<String>,

    /// show the nickname instead of posting anonymously
    #[arg(long, global = true)]
    show_name: bool,
}

impl Identity {
    fn author(&self) -> Author {
        Author {
            role: self.role,
            nickname: self.nickname.clone(),
            is_anonymous: !self.show_name,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// write a new post
    Post {
        /// what you want to share
        content: String,

        #[arg(long, short, value_enum, default_value_t = Category::FailureStory)]
        category: Category,

        /// skip generating a share code
        #[arg(long)]
        no_share_code: bool,
    },

    /// list posts, newest first
    List {
        #[arg(long, short, value_enum)]
        category: Option<Category>,

        /// only posts written by this role
        #[arg(long, value_enum)]
        author: Option<Role>,

        /// find by share code
        #[arg(long)]
        code: Option<String>,

        /// search text
        #[arg(long, short)]
        query: Option<String>,
    },

    /// show a post with its comments
    Show { id: i64 },

    /// comment on a post
    Comment { post_id: i64, content: String },

    /// send a heart to a post
    Heart { post_id: i64 },

    /// flag a post for review
    Flag { post_id: i64 },

    /// delete a post and its comments
    Delete { post_id: i64 },

    /// run the crisis check on some text
    Check { text: String },

    /// print the active crisis phrase list
    Phrases,

    /// create an account
    Register {
        username: String,
        #[arg(long, env = "FF_PASSWORD")]
        password: String,
    },

    /// check account credentials
    Login {
        username: String,
        #[arg(long, env = "FF_PASSWORD")]
        password: String,
    },
}

/// Where the database lives when `--db` is not given.
pub fn default_db_path() -> String {
    if std::path::Path::new("/tmp").is_dir() {
        "/tmp/failforward.db".to_string()
    } else {
        "failforward.db".to_string()
    }
}

pub fn load_detector(path: Option<&PathBuf>) -> Result<CrisisDetector, crate::Error> {
    match path {
        Some(path) => {
            let list = PhraseList::load(path)?;
            let detector = CrisisDetector::from_list(&list)?;
            tracing::info!(
                version = detector.version(),
                phrases = detector.phrases().len(),
                "loaded crisis phrases"
            );
            Ok(detector)
        }
        None => Ok(CrisisDetector::default()),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("failforward=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // the tui owns the terminal, it logs to its own panel
    if cli.command.is_some() {
        init_tracing();
    }

    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    let detector = load_detector(cli.phrases.as_ref())?;
    let author = cli.identity.author();
    let json = cli.json;

    let Some(command) = cli.command else {
        let store = open_store(&db_path).await?;
        return Ok(crate::tui::run(store, detector, author).await?);
    };

    match command {
        Commands::Serve { port, host } => {
            ensure_parent_dir(&db_path)?;
            Ok(Server::run(&db_path, detector, &host, port).await?)
        }

        Commands::Check { text } => {
            let phrase = detector.matched_phrase(&text);
            if json {
                Output::raw(&serde_json::json!({
                    "crisis": phrase.is_some(),
                    "phrase": phrase,
                }));
            } else if phrase.is_some() {
                println!("{}", CrisisNotice::POST.banner);
            } else {
                println!("no crisis phrases found");
            }
            Ok(())
        }

        Commands::Phrases => {
            if json {
                Output::raw(&PhraseList {
                    version: detector.version().to_string(),
                    phrases: detector.phrases().to_vec(),
                });
            } else {
                println!("version {}", detector.version());
                for phrase in detector.phrases() {
                    println!("  {phrase}");
                }
            }
            Ok(())
        }

        Commands::Post {
            content,
            category,
            no_share_code,
        } => {
            let store = open_store(&db_path).await?;
            let post = store
                .create_post(NewPost {
                    author,
                    category,
                    content,
                    with_share_code: !no_share_code,
                })
                .await?;
            let code = post.share_code.clone();
            let view = detector.view_post(post);

            if json {
                Output::raw(&view);
            } else {
                println!("게시되었습니다!");
                if let Some(code) = code {
                    println!("이 글의 쉐어코드: {code} (가족/친구와 공유하세요)");
                }
                Output::post(&view);
            }
            Ok(())
        }

        Commands::List {
            category,
            author: role,
            code,
            query,
        } => {
            let store = open_store(&db_path).await?;
            let filter = PostFilter {
                category,
                role,
                share_code: code,
                text: query,
            };
            let posts = store.list_posts(&filter).await?;
            let views: Vec<_> = posts.into_iter().map(|p| detector.view_post(p)).collect();

            if json {
                Output::raw(&views);
            } else {
                Output::posts(&views);
                println!();
                Output::helpline();
            }
            Ok(())
        }

        Commands::Show { id } => {
            let store = open_store(&db_path).await?;
            let post = store.get_post(id).await?;
            let comments = store.list_comments(id).await?;
            let thread = detector.view_thread(post, comments);

            if json {
                Output::raw(&thread);
            } else {
                Output::thread(&thread);
            }
            Ok(())
        }

        Commands::Comment { post_id, content } => {
            let store = open_store(&db_path).await?;
            let comment = store
                .create_comment(NewComment {
                    post_id,
                    author,
                    content,
                })
                .await?;
            let view = detector.view_comment(comment);

            if json {
                Output::raw(&view);
            } else {
                println!("댓글이 등록되었습니다.");
                Output::comment(&view);
            }
            Ok(())
        }

        Commands::Heart { post_id } => {
            let store = open_store(&db_path).await?;
            let hearts = store.increment_heart(post_id).await?;
            if json {
                Output::raw(&serde_json::json!({ "id": post_id, "hearts": hearts }));
            } else {
                println!("응원 ❤️ {hearts}");
            }
            Ok(())
        }

        Commands::Flag { post_id } => {
            let store = open_store(&db_path).await?;
            store.set_flagged(post_id).await?;
            if json {
                Output::raw(&serde_json::json!({ "id": post_id, "is_flagged": true }));
            } else {
                println!("신고되었습니다. 관리자 검토가 필요합니다.");
            }
            Ok(())
        }

        Commands::Delete { post_id } => {
            let store = open_store(&db_path).await?;
            store.delete_post(post_id).await?;
            if !json {
                println!("#{post_id} deleted");
            }
            Ok(())
        }

        Commands::Register { username, password } => {
            let store = open_store(&db_path).await?;
            let user = store.register(&username, &password).await?;
            if json {
                Output::raw(&user);
            } else {
                println!("registered {}", user.username);
            }
            Ok(())
        }

        Commands::Login { username, password } => {
            let store = open_store(&db_path).await?;
            let user = store.authenticate(&username, &password).await?;
            if json {
                Output::raw(&user);
            } else {
                println!("welcome back, {}", user.username);
            }
            Ok(())
        }
    }
}

async fn open_store(db_path: &str) -> Result<Store> {
    ensure_parent_dir(db_path)?;
    Ok(Store::connect(db_path).await?)
}

// sqlite creates the file but not the directory it sits in
fn ensure_parent_dir(db_path: &str) -> Result<()> {
    if db_path.starts_with("sqlite:") {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    Ok(())
}
