mod cli;

use api::{
    bot::{self, Bot, Finish},
    creator::{Creator, Source},
    http::Fetcher,
    session::Session,
};
use clap::Parser;
use cli::{Args, Mode};
use tokio::{io::BufReader, runtime::Runtime};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    let filter = format!("warn,kbot={level},kbot_api={level},kbot_cometd={level}");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mode = args.mode()?;
    let runtime = Runtime::new()?;
    runtime.block_on(run(args, mode))
}

async fn run(args: Args, mode: Mode) -> anyhow::Result<()> {
    let fetcher = Fetcher::new()?;
    let mut creator = Creator::new(fetcher.clone()).with_limit(args.limit);
    if let Some((email, password)) = args.credentials() {
        creator.authenticate(email, password).await?;
    }

    let mut input = BufReader::new(tokio::io::stdin());
    let (pin, nickname, source) = match mode {
        Mode::Search { source } => {
            let shown = bot::browse(&creator, &source, &mut input).await?;
            log::info!("{shown} answer keys shown");
            return Ok(());
        }
        Mode::Play { pin, nickname, source } => (pin, nickname, source),
    };

    // Names are resolved once the host reveals its layout.
    let key = match &source {
        Some(source @ Source::Id(_)) => {
            let key = creator.lookup(source, None).await?;
            log::info!("ANSWERS RECEIVED");
            Some(key)
        }
        _ => None,
    };

    let session = Session::join(fetcher, &pin, &nickname).await?;
    match Bot::new(session, creator, source, key, input).run().await? {
        Finish::NameRejected => anyhow::bail!("the host rejected the nickname {nickname}"),
        Finish::GameOver | Finish::Reset => Ok(()),
    }
}
