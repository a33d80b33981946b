use super::*;
use tempfile::TempDir;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

fn with_config(path: &Path, extra: &[&str]) -> Args {
    let mut argv = vec!["agentchat", "--config", path.to_str().expect("utf8 path")];
    argv.extend_from_slice(extra);
    parse_args(&argv)
}

#[test]
fn no_subcommand_defaults_to_chat() {
    let mut args = parse_args(&["agentchat"]);
    assert_eq!(args.command, None);
    assert_eq!(take_command(&mut args), Commands::Chat);
}

#[test]
fn say_collects_words_after_global_flags() {
    let args = parse_args(&[
        "agentchat",
        "--endpoint",
        "http://127.0.0.1:9000/chat",
        "say",
        "hello",
        "-there",
    ]);
    assert_eq!(args.endpoint.as_deref(), Some("http://127.0.0.1:9000/chat"));
    assert_eq!(
        args.command,
        Some(Commands::Say {
            words: vec!["hello".to_string(), "-there".to_string()]
        })
    );
}

#[test]
fn say_requires_a_message() {
    assert!(Args::try_parse_from(["agentchat", "say"]).is_err());
}

#[test]
fn set_collects_multi_word_values() {
    let args = parse_args(&["agentchat", "set", "title", "Support", "Desk"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "title".to_string(),
            value: vec!["Support".to_string(), "Desk".to_string()]
        })
    );
}

#[test]
fn timeout_flag_must_be_numeric() {
    assert!(Args::try_parse_from(["agentchat", "--timeout", "soon"]).is_err());
    let args = parse_args(&["agentchat", "-t", "30"]);
    assert_eq!(args.timeout, Some(30));
}

#[test]
fn session_config_applies_flag_overrides() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let saved = Config {
        endpoint: Some("http://saved.example/chat".to_string()),
        request_timeout_secs: Some(10),
        title: Some("Saved".to_string()),
    };
    saved.save_to_path(&path).expect("save");

    let args = parse_args(&["agentchat", "--timeout", "3"]);
    let config = session_config(&path, &args).expect("config");
    assert_eq!(config.endpoint_url(), "http://saved.example/chat");
    assert_eq!(config.request_timeout_secs, Some(3));
    assert_eq!(config.title(), "Saved");

    let args = parse_args(&["agentchat", "--endpoint", "http://flag.example/chat"]);
    let config = session_config(&path, &args).expect("config");
    assert_eq!(config.endpoint_url(), "http://flag.example/chat");
    assert_eq!(config.request_timeout_secs, Some(10));
}

#[test]
fn explicit_config_path_wins() {
    let path = Path::new("/tmp/agentchat-test/config.toml");
    assert_eq!(resolve_config_path(Some(path)).expect("path"), path.to_path_buf());
}

#[tokio::test]
async fn set_and_unset_persist_to_the_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let mut args = with_config(&path, &["set", "request-timeout", "45"]);
    let command = take_command(&mut args);
    async_main(command, args).await.expect("set");
    let config = Config::load_from_path(&path).expect("load");
    assert_eq!(config.request_timeout_secs, Some(45));

    let mut args = with_config(&path, &["unset", "request-timeout"]);
    let command = take_command(&mut args);
    async_main(command, args).await.expect("unset");
    let config = Config::load_from_path(&path).expect("load");
    assert_eq!(config.request_timeout_secs, None);
}

#[tokio::test]
async fn unknown_key_is_reported_and_nothing_is_written() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let mut args = with_config(&path, &["set", "colour", "blue"]);
    let command = take_command(&mut args);

    let err = async_main(command, args).await.expect_err("unknown key");
    assert!(err.to_string().contains("Unknown config key: colour"));
    assert!(!path.exists());
}
