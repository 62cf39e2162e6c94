//! `commons` — Advocacy Commons command-line interface.
//!
//! A reader's client for a document node. It keeps the same anonymous
//! session and the same soft limits as the website, with client-local state
//! stored in a JSON file instead of browser storage.
//!
//! ```sh
//! commons post story:0195... "This matches what happened to us."
//! commons comments story:0195...
//! commons flag 0195...
//! commons feedback 0195... no --suggestion "Please list the county offices too."
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use advocacy_commons::render::{render_comment, render_totals};
use advocacy_commons::{CommentListing, InlineDraft, ParentRef, Submission, SubmissionKind};
use advocacy_commons_client::{ActionError, CommentPoller, CommunityClient, HttpContentStore};
use advocacy_commons_session::{FileKeyValueStore, SessionGuard};
use advocacy_commons_store_api::ContentStore;
use clap::{Parser, Subcommand, ValueEnum};

/// commons — Advocacy Commons reader CLI
#[derive(Parser)]
#[command(name = "commons", version, about, long_about = None)]
struct Cli {
    /// Base URL of the document node.
    #[arg(long, env = "COMMONS_NODE", default_value = "http://127.0.0.1:3333", global = true)]
    node: String,

    /// JSON file holding this client's session and rate-limit state.
    #[arg(long, env = "COMMONS_STATE", default_value = ".commons-state.json", global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print this client's anonymous session id.
    Session,

    /// Print the node's name, version and storage backend.
    Info,

    /// List visible general comments on a story or resource.
    ///
    /// PARENT is `story:<id>` or `resource:<id>`.
    Comments {
        parent: ParentRef,
    },

    /// List visible inline comments on one paragraph.
    Inline {
        parent: ParentRef,
        /// Zero-based paragraph index.
        paragraph: u32,
        /// Print only the number of comments.
        #[arg(long)]
        count: bool,
    },

    /// Post a comment. Pass `-` as TEXT to read it from stdin.
    ///
    /// With --paragraph and --selection the comment is anchored to a passage.
    Post {
        parent: ParentRef,
        text: String,
        /// Paragraph the comment is anchored to.
        #[arg(long, requires = "selection")]
        paragraph: Option<u32>,
        /// The highlighted passage.
        #[arg(long, requires = "paragraph")]
        selection: Option<String>,
    },

    /// Flag a comment as inappropriate.
    Flag {
        comment_id: String,
    },

    /// Say whether a resource was helpful.
    Feedback {
        resource_id: String,
        vote: Vote,
        /// Required with `no`: how the resource could improve (20+ characters).
        #[arg(long, short = 's')]
        suggestion: Option<String>,
    },

    /// Show whether this session already voted on a resource.
    VoteStatus {
        resource_id: String,
    },

    /// Keep a comment listing on screen, refreshing it periodically.
    Watch {
        parent: ParentRef,
        /// Watch the inline comments of this paragraph instead.
        #[arg(long)]
        paragraph: Option<u32>,
        /// Seconds between refreshes.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        poll_secs: u64,
    },

    /// Propose a resource or community story for the site.
    Submit {
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: SubmissionKindArg,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Resource or story title.
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Whose story it is.
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        /// Story body. Pass `-` to read from stdin.
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Vote {
    Yes,
    No,
}

#[derive(Clone, Copy, ValueEnum)]
enum SubmissionKindArg {
    Resource,
    #[value(name = "communityStory", alias = "story")]
    CommunityStory,
}

impl From<SubmissionKindArg> for SubmissionKind {
    fn from(k: SubmissionKindArg) -> Self {
        match k {
            SubmissionKindArg::Resource => SubmissionKind::Resource,
            SubmissionKindArg::CommunityStory => SubmissionKind::CommunityStory,
        }
    }
}

type Client = CommunityClient<FileKeyValueStore>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(node = %cli.node, state = %cli.state.display(), "starting");

    let http = HttpContentStore::new(&cli.node)
        .unwrap_or_else(|e| fatal(&format!("invalid --node {:?}: {e}", cli.node)));
    let local = FileKeyValueStore::open(&cli.state)
        .unwrap_or_else(|e| fatal(&format!("cannot open state file: {e}")));
    let store: Arc<dyn ContentStore> = Arc::new(http.clone());
    let client: Client = CommunityClient::with_guard(Arc::clone(&store), SessionGuard::new(local));

    if let Err(e) = run(cli.command, &client, &http, store).await {
        eprintln!("commons: {}", e.user_message());
        if let ActionError::RateLimited { retry_after_secs, .. } = e {
            eprintln!("commons: try again in {retry_after_secs}s");
        }
        process::exit(1);
    }
}

async fn run(
    command: Command,
    client: &Client,
    http: &HttpContentStore,
    store: Arc<dyn ContentStore>,
) -> Result<(), ActionError> {
    let now = chrono::Utc::now;

    match command {
        Command::Session => println!("{}", client.session_id()),

        Command::Info => {
            let info = http.info().await?;
            println!("{}", info.name.as_deref().unwrap_or("(unnamed node)"));
            println!("version: {}", info.version);
            println!("backend: {}", info.backend);
        }

        Command::Comments { parent } => {
            let comments = client.list_comments(&parent).await?;
            print_comments(&comments, now());
        }

        Command::Inline { parent, paragraph, count } => {
            if count {
                println!("{}", client.inline_comment_count(&parent, paragraph).await?);
            } else {
                let comments = client.list_inline_comments(&parent, paragraph).await?;
                print_comments(&comments, now());
            }
        }

        Command::Post { parent, text, paragraph, selection } => {
            let text = read_arg(text);
            let draft = paragraph
                .zip(selection)
                .map(|(p, s)| InlineDraft::new(p, s));
            let comment = client.post_comment(&parent, &text, draft.as_ref()).await?;
            println!("posted {}", comment.id);
        }

        Command::Flag { comment_id } => {
            let outcome = client.flag_comment(&comment_id).await?;
            if outcome.newly_hidden {
                println!("flagged; the comment is now hidden for review");
            } else {
                println!("flagged ({} flag(s))", outcome.flag_count);
            }
        }

        Command::Feedback { resource_id, vote, suggestion } => {
            let helpful = matches!(vote, Vote::Yes);
            let totals = client
                .submit_feedback(&resource_id, helpful, suggestion.as_deref())
                .await?;
            println!("thanks for your feedback");
            println!("{}", render_totals(&totals));
        }

        Command::VoteStatus { resource_id } => match client.existing_vote(&resource_id).await? {
            Some(true) => println!("you found this helpful"),
            Some(false) => println!("you found this not helpful"),
            None => println!("no vote yet"),
        },

        Command::Watch { parent, paragraph, poll_secs } => {
            let listing = match paragraph {
                Some(paragraph_index) => CommentListing::Inline { paragraph_index },
                None => CommentListing::General,
            };
            let mut handle = CommentPoller::new(store, &parent, listing)
                .interval(Duration::from_secs(poll_secs))
                .spawn();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    snapshot = handle.next() => {
                        let Some(snapshot) = snapshot else { break };
                        println!("--- {} ---", now().format("%H:%M:%S"));
                        match snapshot.error {
                            Some(e) => eprintln!("commons: refresh failed: {e}"),
                            None => print_comments(&snapshot.comments, now()),
                        }
                    }
                }
            }
            handle.stop().await;
        }

        Command::Submit {
            kind,
            name,
            email,
            title,
            url,
            description,
            category,
            person,
            location,
            summary,
            body,
        } => {
            let mut s = Submission::new(kind.into());
            s.submitter_name = name.unwrap_or_default();
            s.submitter_email = email.unwrap_or_default();
            match s.kind {
                SubmissionKind::Resource => {
                    s.resource_title = title.unwrap_or_default();
                    s.resource_url = url.unwrap_or_default();
                    s.resource_description = description.unwrap_or_default();
                    s.resource_category = category.unwrap_or_default();
                }
                SubmissionKind::CommunityStory => {
                    s.story_title = title.unwrap_or_default();
                    s.story_person_name = person.unwrap_or_default();
                    s.story_location = location.unwrap_or_default();
                    s.story_summary = summary.unwrap_or_default();
                    s.story_body = body.map(read_arg).unwrap_or_default();
                }
            }
            let id = client.submit(&s).await?;
            println!("submitted {id} for review");
        }
    }
    Ok(())
}

fn print_comments(comments: &[advocacy_commons::Comment], now: chrono::DateTime<chrono::Utc>) {
    if comments.is_empty() {
        println!("no comments yet");
        return;
    }
    for c in comments {
        println!("{}", render_comment(c, now));
    }
}

/// The argument itself, or stdin when it is `"-"`.
fn read_arg(value: String) -> String {
    if value != "-" {
        return value;
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
    buf
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("commons: {msg}");
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inline_post() {
        let cli = Cli::try_parse_from([
            "commons",
            "post",
            "story:abc",
            "so true",
            "--paragraph",
            "3",
            "--selection",
            "the lift was broken",
        ])
        .unwrap();
        match cli.command {
            Command::Post { parent, paragraph, selection, .. } => {
                assert_eq!(parent, ParentRef::Story("abc".into()));
                assert_eq!(paragraph, Some(3));
                assert_eq!(selection.as_deref(), Some("the lift was broken"));
            }
            _ => panic!("expected post"),
        }
    }

    #[test]
    fn paragraph_without_selection_is_rejected() {
        assert!(Cli::try_parse_from(["commons", "post", "story:abc", "x", "--paragraph", "1"]).is_err());
    }

    #[test]
    fn bad_parent_is_rejected() {
        assert!(Cli::try_parse_from(["commons", "comments", "abc"]).is_err());
    }

    #[test]
    fn submission_type_accepts_wire_name() {
        let cli = Cli::try_parse_from(["commons", "submit", "--type", "communityStory"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Submit { kind: SubmissionKindArg::CommunityStory, .. }
        ));
    }
}
