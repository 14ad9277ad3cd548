use anyhow::Result;
use clap::Parser;
use client_core::{FetchState, PostListController, RemotePostStore};
use shared::domain::{Post, PostId};
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the posts API; overrides the config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Client-side request deadline in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = Some(timeout_secs);
    }
    tracing::debug!(?settings, "resolved settings");

    println!("Fetching posts from {}", settings.api_url);
    println!("Type 'cancel' to abort the fetch.");

    let store = match settings.request_timeout() {
        Some(timeout) => RemotePostStore::with_timeout(settings.api_url, timeout)?,
        None => RemotePostStore::new(settings.api_url),
    };
    let mut controller = PostListController::new(store);
    let cancel_handle = controller.cancel_handle();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    // Race the one-shot fetch against stdin so 'cancel' is honored while the
    // request is still in flight.
    {
        let fetch = controller.initialize();
        tokio::pin!(fetch);
        loop {
            if !stdin_open {
                (&mut fetch).await;
                break;
            }
            tokio::select! {
                () = &mut fetch => break,
                line = lines.next_line() => match line? {
                    Some(input) if input.trim() == "cancel" => cancel_handle.cancel(),
                    Some(_) => println!("Still fetching; only 'cancel' works right now."),
                    None => stdin_open = false,
                },
            }
        }
    }

    if controller.fetch_state() == FetchState::Succeeded {
        println!("Loaded {} posts.", controller.posts().len());
    }
    if let Some(message) = controller.error_message() {
        println!("Error: {message}");
    }
    render_posts(controller.posts());

    if !stdin_open {
        return Ok(());
    }

    print_help();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !run_command(&mut controller, line.trim()).await {
            break;
        }
    }

    Ok(())
}

async fn run_command(controller: &mut PostListController, line: &str) -> bool {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command {
        "" => {}
        "title" => {
            controller.set_draft_title(rest);
            render_draft(controller.draft());
        }
        "body" => {
            controller.set_draft_body(rest);
            render_draft(controller.draft());
        }
        "save" => {
            controller.save().await;
            render_outcome(controller);
        }
        "edit" => match find_post(controller.posts(), rest) {
            Some(found) => {
                controller.select_for_edit(found);
                render_draft(controller.draft());
            }
            None => println!("No post with id '{rest}'."),
        },
        "delete" => match find_post(controller.posts(), rest) {
            Some(found) => {
                controller.delete(&found).await;
                render_outcome(controller);
            }
            None => println!("No post with id '{rest}'."),
        },
        "list" => render_posts(controller.posts()),
        "cancel" => {
            controller.cancel_initial_fetch();
            println!("The initial fetch has already settled.");
        }
        "help" => print_help(),
        "quit" | "exit" => return false,
        unknown => println!("Unknown command '{unknown}'; try 'help'."),
    }
    true
}

fn find_post(posts: &[Post], raw_id: &str) -> Option<Post> {
    let id = raw_id.parse::<i64>().ok()?;
    posts
        .iter()
        .find(|post| post.id == Some(PostId(id)))
        .cloned()
}

fn render_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("(no posts)");
        return;
    }
    for post in posts {
        match post.id {
            Some(id) => println!("[{}] {}", id.0, post.title),
            None => println!("[-] {}", post.title),
        }
    }
}

fn render_draft(draft: &Post) {
    let target = match draft.id {
        Some(id) => format!("post {}", id.0),
        None => "a new post".to_string(),
    };
    println!(
        "Draft for {target}: title='{}' body='{}'",
        draft.title, draft.body
    );
}

fn render_outcome(controller: &PostListController) {
    if let Some(message) = controller.error_message() {
        println!("Error: {message}");
        return;
    }
    render_posts(controller.posts());
    render_draft(controller.draft());
}

fn print_help() {
    println!("Commands:");
    println!("  title <text>  set the draft title");
    println!("  body <text>   set the draft body");
    println!("  save          create or update from the draft");
    println!("  edit <id>     load a post into the draft");
    println!("  delete <id>   delete a post");
    println!("  list          show the post list");
    println!("  help          show this help");
    println!("  quit          exit");
}
