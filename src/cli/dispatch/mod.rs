use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::flow::is_valid_slug;
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let url = matches
        .get_one::<String>("url")
        .cloned()
        .context("missing required argument: --url")?;

    let flow = matches
        .get_one::<String>("flow")
        .cloned()
        .context("missing required argument: --flow")?;

    if !is_valid_slug(&flow) {
        return Err(anyhow::anyhow!("invalid flow slug: {flow}"));
    }

    let mut globals = GlobalArgs::new(url, flow);

    globals.query = matches.get_one::<String>("query").cloned();
    globals.non_interactive = matches.get_flag("non-interactive");
    globals.retry = matches.get_one::<u32>("retry").copied();
    globals.timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(30);
    globals.insecure = matches.get_flag("insecure");

    for answer in matches.get_many::<String>("answer").unwrap_or_default() {
        let (key, value) = answer
            .split_once('=')
            .with_context(|| format!("invalid answer {answer}, expected key=value"))?;

        globals.add_answer(key.to_string(), SecretString::from(value));
    }

    Ok(Action::Run(globals))
}
