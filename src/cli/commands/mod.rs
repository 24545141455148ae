use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("fluo")
        .about("Headless client for server-driven identity flows")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .help("Base URL of the identity provider, example: https://auth.tld")
                .env("FLUO_URL")
                .required(true),
        )
        .arg(
            Arg::new("flow")
                .short('f')
                .long("flow")
                .help("Slug of the flow to execute")
                .env("FLUO_FLOW")
                .required(true),
        )
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .help("Query string of the request that triggered the flow, forwarded to the executor")
                .env("FLUO_QUERY"),
        )
        .arg(
            Arg::new("answer")
                .short('a')
                .long("answer")
                .help("Answer for a field as key=value, repeat for multiple fields")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("non-interactive")
                .long("non-interactive")
                .help("Never prompt, cancel the flow when an answer is missing")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("retry")
                .long("retry")
                .help("Retry requests that failed in transport up to this many times")
                .env("FLUO_RETRY")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("30")
                .env("FLUO_TIMEOUT")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("insecure")
                .short('k')
                .long("insecure")
                .help("Skip TLS certificate verification")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("FLUO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "fluo");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Headless client for server-driven identity flows"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_url_and_flow() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "fluo",
            "--url",
            "https://auth.tld",
            "--flow",
            "default-authentication-flow",
            "--query",
            "next=%2Fapp",
            "--answer",
            "uid_field=admin",
            "--answer",
            "password=hunter2",
        ]);

        assert_eq!(
            matches.get_one::<String>("url").map(|s| s.to_string()),
            Some("https://auth.tld".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("flow").map(|s| s.to_string()),
            Some("default-authentication-flow".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("query").map(|s| s.to_string()),
            Some("next=%2Fapp".to_string())
        );
        assert_eq!(
            matches
                .get_many::<String>("answer")
                .map(|answers| answers.map(ToString::to_string).collect::<Vec<_>>()),
            Some(vec![
                "uid_field=admin".to_string(),
                "password=hunter2".to_string()
            ])
        );
        assert_eq!(matches.get_one::<u64>("timeout").map(|s| *s), Some(30));
        assert!(!matches.get_flag("insecure"));
        assert!(!matches.get_flag("non-interactive"));
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("FLUO_URL", Some("https://auth.tld")),
                ("FLUO_FLOW", Some("default-authentication-flow")),
                ("FLUO_QUERY", Some("next=%2Fapp")),
                ("FLUO_TIMEOUT", Some("5")),
                ("FLUO_RETRY", Some("3")),
                ("FLUO_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["fluo"]);

                assert_eq!(
                    matches.get_one::<String>("url").map(|s| s.to_string()),
                    Some("https://auth.tld".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("flow").map(|s| s.to_string()),
                    Some("default-authentication-flow".to_string())
                );
                assert_eq!(matches.get_one::<u64>("timeout").map(|s| *s), Some(5));
                assert_eq!(matches.get_one::<u32>("retry").map(|s| *s), Some(3));
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("FLUO_LOG_LEVEL", Some(level)),
                    ("FLUO_URL", Some("https://auth.tld")),
                    ("FLUO_FLOW", Some("default-authentication-flow")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["fluo"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").map(|s| *s),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("FLUO_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "fluo".to_string(),
                    "--url".to_string(),
                    "https://auth.tld".to_string(),
                    "--flow".to_string(),
                    "default-authentication-flow".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
