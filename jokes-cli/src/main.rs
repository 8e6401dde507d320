use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use jokes_app::domain::Joke;
use jokes_app::AppContext;
use jokes_errors::AppError;
use serde::Serialize;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let ctx = match AppContext::from_env().await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match run(&ctx, &matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    let id = Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Joke id");
    let user = Arg::new("user")
        .long("user")
        .short('u')
        .required(true)
        .help("Identity of the requesting user");

    Command::new("jokes")
        .version(crate_version!())
        .about("Browse, submit, vote on and sample the shared joke pool")
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List every joke"))
        .subcommand(
            Command::new("show")
                .about("Show a single joke")
                .arg(id.clone()),
        )
        .subcommand(
            Command::new("submit")
                .about("Submit a new joke")
                .arg(Arg::new("author").long("author").required(true))
                .arg(Arg::new("author-id").long("author-id").required(true))
                .arg(Arg::new("text").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("vote")
                .about("Cast, switch or retract a vote")
                .arg(id)
                .arg(user.clone())
                .arg(
                    Arg::new("down")
                        .long("down")
                        .action(ArgAction::SetTrue)
                        .help("Vote down instead of up"),
                ),
        )
        .subcommand(
            Command::new("sample")
                .about("Pick jokes the way the bot serves them")
                .arg(user)
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .value_parser(value_parser!(usize))
                        .default_value("1"),
                ),
        )
}

async fn run(ctx: &AppContext, matches: &ArgMatches) -> Result<(), AppError> {
    let json = matches.get_flag("json");
    let jokes = &ctx.jokes;

    match matches.subcommand() {
        Some(("list", _)) => {
            let all = jokes.list_items().await?;
            if json {
                emit_json(all.as_slice());
            } else {
                for joke in all.iter() {
                    println!("{}", joke.summary());
                }
            }
        }
        Some(("show", sub)) => {
            let id = required::<i64>(sub, "id")?;
            print_joke(&jokes.find_item(id).await?, json);
        }
        Some(("submit", sub)) => {
            let text = sub
                .get_many::<String>("text")
                .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let author = required::<String>(sub, "author")?;
            let author_id = required::<String>(sub, "author-id")?;
            print_joke(&jokes.submit_item(&text, &author, &author_id).await?, json);
        }
        Some(("vote", sub)) => {
            let id = required::<i64>(sub, "id")?;
            let user = required::<String>(sub, "user")?;
            let updated = jokes.cast_vote(id, &user, !sub.get_flag("down")).await?;
            print_joke(&updated, json);
        }
        Some(("sample", sub)) => {
            let user = required::<String>(sub, "user")?;
            let count = required::<usize>(sub, "count")?;
            for _ in 0..count {
                print_joke(&jokes.sample_for_requester(&user).await?, json);
            }
        }
        _ => unreachable!("subcommand_required guarantees a known subcommand"),
    }

    Ok(())
}

fn required<T: Clone + Send + Sync + 'static>(
    matches: &ArgMatches,
    name: &str,
) -> Result<T, AppError> {
    matches
        .get_one::<T>(name)
        .cloned()
        .ok_or_else(|| AppError::Validation(format!("missing argument `{}`", name)))
}

fn print_joke(joke: &Joke, json: bool) {
    if json {
        emit_json(joke);
    } else {
        println!("{}", joke.summary());
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{}", out),
        Err(e) => tracing::error!("Failed to encode output as JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jokes_app::Config;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_submit_collects_words() {
        let matches = cli()
            .try_get_matches_from([
                "jokes", "submit", "--author", "alice", "--author-id", "42", "why", "so", "serious",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "submit");
        let words: Vec<_> = sub.get_many::<String>("text").unwrap().collect();
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_vote_requires_user() {
        assert!(cli().try_get_matches_from(["jokes", "vote", "3"]).is_err());
        let matches = cli()
            .try_get_matches_from(["jokes", "vote", "3", "-u", "u1", "--down", "--json"])
            .unwrap();
        assert!(matches.get_flag("json"));
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<i64>("id"), Some(&3));
        assert!(sub.get_flag("down"));
    }

    #[tokio::test]
    async fn test_run_against_memory_store() {
        let ctx = AppContext::from_config(&Config::default()).await.unwrap();

        let matches = cli()
            .try_get_matches_from(["jokes", "vote", "1", "--user", "u1"])
            .unwrap();
        run(&ctx, &matches).await.unwrap();
        assert_eq!(ctx.jokes.find_item(1).await.unwrap().score(), 1);

        let matches = cli()
            .try_get_matches_from(["jokes", "show", "9999"])
            .unwrap();
        assert_eq!(
            run(&ctx, &matches).await.unwrap_err(),
            AppError::NotFound(9999)
        );
    }
}
