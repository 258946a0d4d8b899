use std::path::PathBuf;

use anyhow::{anyhow, Result};
use apitester::composer::{Composer, RequestDraft};
use apitester::config::Config;
use apitester::coordinator::Coordinator;
use apitester::execute::import_http_files;
use apitester::http_request::SavedRequest;
use apitester::http_request_executor::HttpExecutor;
use apitester::local_store::LocalStore;
use apitester::remote_store::{RemoteStore, SqliteStore};
use apitester::response_classifier::{status_class, StatusClass};
use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};

fn request_args(cmd: Command) -> Command {
    cmd.arg(arg!(<URL> "request url").value_parser(value_parser!(String)))
        .arg(
            arg!(-X --method <METHOD>)
                .help("GET, POST, PUT, DELETE or PATCH")
                .value_parser(value_parser!(String))
                .action(ArgAction::Set),
        )
        .arg(
            arg!(-H --header <HEADER>)
                .help("'Key: Value' header - you can specify this argument multiple times")
                .value_parser(value_parser!(String))
                .action(ArgAction::Append),
        )
        .arg(
            arg!(-d --data <BODY>)
                .help("raw request body, ignored for GET")
                .value_parser(value_parser!(String))
                .action(ArgAction::Set),
        )
}

fn answer_arg() -> clap::Arg {
    arg!(-a --answer <ANSWER>)
        .help("QUESTION_ID=ANSWER_ID pick for a verification question set - repeatable")
        .value_parser(value_parser!(String))
        .action(ArgAction::Append)
}

fn cli() -> Command {
    Command::new("apitester")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(--database <PATH>)
                .help("SQLite database holding saved requests - without it only local storage is used")
                .env("APITESTER_DATABASE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            arg!(--"local-store" <PATH>)
                .help("file holding the local copy of saved requests")
                .env("APITESTER_LOCAL_STORE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            arg!(--timeout <SECS>)
                .help("request timeout in seconds")
                .env("APITESTER_TIMEOUT")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            arg!(-v --verbose)
                .help("more logging - repeat for debug output")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            request_args(command!("send").about("send a request and print the response"))
                .arg(
                    arg!(--save [NAME])
                        .help("also save the request, optionally under NAME")
                        .value_parser(value_parser!(String))
                        .default_missing_value(""),
                )
                .arg(answer_arg()),
        )
        .subcommand(
            request_args(command!("save").about("save a request without sending it")).arg(
                arg!(-n --name <NAME>)
                    .help("defaults to '<METHOD> <path>'")
                    .value_parser(value_parser!(String)),
            ),
        )
        .subcommand(command!("list").about("list saved requests"))
        .subcommand(command!("show").about("print a saved request").arg(arg!(<ID> "saved request id")))
        .subcommand(
            command!("run")
                .about("send a saved request")
                .arg(arg!(<ID> "saved request id"))
                .arg(answer_arg()),
        )
        .subcommand(command!("delete").about("delete a saved request").arg(arg!(<ID> "saved request id")))
        .subcommand(command!("clear").about("clear all saved requests from the list and local storage"))
        .subcommand(
            command!("mode").about("show or change where requests are saved").arg(
                arg!([MODE])
                    .value_parser(["db", "local", "toggle"])
                    .action(ArgAction::Set),
            ),
        )
        .subcommand(command!("sync").about("copy locally saved requests into the database"))
        .subcommand(
            command!("import")
                .about("save the requests of one or multiple http files")
                .arg(
                    arg!(<FILES> "files")
                        .help("http files that shall be imported")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .action(ArgAction::Append),
                ),
        )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn draft_from(matches: &ArgMatches) -> RequestDraft {
    let mut draft = RequestDraft::default();
    if let Some(url) = matches.get_one::<String>("URL") {
        draft.url = url.clone();
    }
    if let Some(method) = matches.get_one::<String>("method") {
        draft.method = method.to_uppercase();
    }
    if let Some(headers) = matches.get_many::<String>("header") {
        draft.headers = headers.cloned().collect::<Vec<String>>().join("\n");
    }
    if let Some(body) = matches.get_one::<String>("data") {
        draft.body = body.clone();
    }
    draft
}

fn print_saved(request: &SavedRequest) {
    println!("{}  {}", request.id, request.label());
}

fn send_and_print(composer: &mut Composer, executor: &HttpExecutor, matches: &ArgMatches) -> Result<()> {
    let response = composer.send(executor)?.clone();
    let class = match status_class(response.status) {
        StatusClass::Success => "ok",
        StatusClass::ClientOrServerError => "error",
        StatusClass::Other => "other",
    };
    println!("{} {}\n", composer.draft.method, composer.draft.url);
    println!("Status: {} ({})", response.status, class);
    let headers: String = response.headers.iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<String>>()
        .join("\n");
    println!("{}\n", headers);
    println!("{}", response.kind.display_text());

    if let Some(set) = composer.question_set().cloned() {
        println!("\nVerification Questions");
        if let Some(token) = &set.auth_token {
            println!("authToken: {}", token);
        }
        if let Some(provider) = &set.provider {
            println!("Provider: {}", provider);
        }
        for (index, question) in set.questions.iter().enumerate() {
            println!("{}. {} [{}]", index + 1, question.text, question.id);
            for answer in &question.answers {
                println!("     {}  {}", answer.id, answer.text);
            }
        }
        for pick in matches.get_many::<String>("answer").into_iter().flatten() {
            let (question, answer) = pick
                .split_once('=')
                .ok_or_else(|| anyhow!("answer '{}' is not QUESTION_ID=ANSWER_ID", pick))?;
            composer.select_answer(question.trim(), answer.trim());
        }
        if let Some(payload) = composer.answers_payload() {
            println!("\nSelected Answers (for next API call):");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

fn find_saved<'a, R: RemoteStore>(coordinator: &'a Coordinator<R>, id: &str) -> Result<&'a SavedRequest> {
    coordinator.find(id).ok_or_else(|| anyhow!("no saved request with id {}", id))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let config = Config::new(
        matches.get_one::<PathBuf>("database").cloned(),
        matches.get_one::<PathBuf>("local-store").cloned(),
        matches.get_one::<u64>("timeout").copied(),
    );
    let mut coordinator = Coordinator::new(
        SqliteStore::open(config.database.clone()),
        LocalStore::new(config.local_store.clone()),
    );
    coordinator.load();

    match matches.subcommand() {
        Some(("send", matches)) => {
            let executor = HttpExecutor::new(config.timeout)?;
            let mut composer = Composer::new(draft_from(matches));
            send_and_print(&mut composer, &executor, matches)?;
            if let Some(name) = matches.get_one::<String>("save") {
                composer.draft.name = name.clone();
                println!("\n{}", composer.save(&mut coordinator));
            }
        }
        Some(("save", matches)) => {
            let mut composer = Composer::new(draft_from(matches));
            if let Some(name) = matches.get_one::<String>("name") {
                composer.draft.name = name.clone();
            }
            let outcome = composer.save(&mut coordinator);
            println!("{}", outcome);
            if !outcome.is_success() {
                return Err(anyhow!("request not saved"));
            }
        }
        Some(("list", _)) => {
            println!("[{}]", coordinator.mode_name());
            for request in coordinator.working_set() {
                print_saved(request);
            }
        }
        Some(("show", matches)) => {
            let id = matches.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
            let request = find_saved(&coordinator, id)?;
            println!("{}", serde_json::to_string_pretty(request)?);
        }
        Some(("run", matches)) => {
            let id = matches.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
            let mut composer = Composer::default();
            composer.load_preset(find_saved(&coordinator, id)?);
            let executor = HttpExecutor::new(config.timeout)?;
            send_and_print(&mut composer, &executor, matches)?;
        }
        Some(("delete", matches)) => {
            let id = matches.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
            find_saved(&coordinator, id)?;
            println!("{}", coordinator.delete(id));
        }
        Some(("clear", _)) => {
            println!("{}", coordinator.clear_all());
        }
        Some(("mode", matches)) => {
            match matches.get_one::<String>("MODE").map(String::as_str) {
                Some("db") => {
                    coordinator.set_mode(true);
                }
                Some("local") => {
                    coordinator.set_mode(false);
                }
                Some("toggle") => {
                    coordinator.toggle_mode();
                }
                _ => {}
            }
            println!("using {}", coordinator.mode_name());
        }
        Some(("sync", _)) => {
            let report = coordinator.sync_local_to_remote()?;
            println!("synced {} requests, {} failed", report.synced, report.failed);
        }
        Some(("import", matches)) => {
            let files: Vec<PathBuf> = matches
                .get_many::<PathBuf>("FILES")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            let report = import_http_files(&files, &mut coordinator)?;
            println!(
                "imported {} to database, {} locally, {} failed",
                report.remote, report.local, report.failed
            );
        }
        _ => unreachable!("this should've been prevented"),
    }
    return Ok(());
}
