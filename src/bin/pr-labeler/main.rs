use pr_labeler::{GitHub, RunOutcome, get_github_token, parse_args, run};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_summary(outcome: &RunOutcome) {
    println!(
        "PR #{}: {} lines changed across {} files",
        outcome.pull_request, outcome.lines_changed, outcome.files_changed
    );
    for label in &outcome.created {
        println!("created label: {}", label.name);
    }
    match &outcome.size_label {
        Some(name) => println!("size label: {name}"),
        None => println!("size label: none"),
    }
    for name in &outcome.applied {
        println!("applied label: {name}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let spec = match parse_args(std::env::args()) {
        Ok(spec) => spec,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let token = get_github_token()?;
    let forge = GitHub::new(token, spec.context.repo.clone())?;

    let outcome = run(&spec, &forge).await?;
    print_summary(&outcome);

    Ok(())
}
