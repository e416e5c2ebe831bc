use std::io::Write;

use clap::Parser;
use proc_exit::sysexits::ToSysexitsResultExt as _;

mod args;
mod logger;
mod report;

use args::Args;
use report::Palette;
use report::TextReport;

fn main() {
    human_panic::setup_panic!();
    let result = run();
    proc_exit::exit(result);
}

fn run() -> proc_exit::ExitResult {
    // Usage errors are a plain failure, not sysexits' `USAGE_ERR`
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            writeln!(anstream::stdout(), "{}", e.render().ansi()).to_sysexits()?;
            return Err(proc_exit::Code::FAILURE.as_exit());
        }
        Err(e) => {
            writeln!(anstream::stdout(), "{}", e.render().ansi()).to_sysexits()?;
            return proc_exit::Code::SUCCESS.ok();
        }
    };

    args.color.write_global();
    let colored_stderr = !matches!(
        anstream::AutoStream::choice(&std::io::stderr()),
        anstream::ColorChoice::Never
    );
    logger::init_logging(args.verbose.clone(), colored_stderr);

    reword(&args)
}

fn reword(args: &Args) -> proc_exit::ExitResult {
    let start = std::time::Instant::now();
    let palette = Palette::colored();

    let cwd = std::env::current_dir().map_err(|err| failure(palette, err, None))?;
    let repo = git2::Repository::discover(&cwd).map_err(|err| {
        let code = err.raw_code();
        failure(palette, err, Some(code))
    })?;
    let config =
        git_reword::config::RepoConfig::from_all(&repo).map_err(|err| failure(palette, err, None))?;
    log::trace!("config: {:?}", config);
    let verbose = args.is_verbose() || config.verbose();

    let mut repo = git_reword::git::GitRepo::new(repo);
    let mut report = TextReport::new(anstream::stdout(), palette, verbose, args.dry_run);
    let mut executor =
        git_reword::rewrite::Executor::new(&args.revision, &args.message, args.dry_run);
    executor.reflog_message(config.reflog_message());
    executor
        .run(&mut repo, &mut report)
        .map_err(|err| reword_failure(palette, err))?;

    let mut stdout = anstream::stdout().lock();
    match executor.state() {
        git_reword::rewrite::State::Walked { branch, .. } => {
            writeln!(
                stdout,
                "Would recreate {} commit(s) on {:#}",
                report.walked_count(),
                palette.highlight(branch)
            )
            .to_sysexits()?;
        }
        git_reword::rewrite::State::Updated { tip, .. } => {
            if verbose {
                let elapsed = start.elapsed();
                let elapsed = std::time::Duration::from_millis(
                    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                );
                writeln!(stdout, "Time: {}", humantime::format_duration(elapsed)).to_sysexits()?;
            }
            writeln!(stdout, "HEAD is now pointing to: {tip}").to_sysexits()?;
        }
        state => {
            return Err(failure(
                palette,
                format!("reword stopped early ({:?})", state.phase()),
                None,
            ));
        }
    }

    Ok(())
}

fn reword_failure(palette: Palette, err: git_reword::Error) -> proc_exit::Exit {
    let code = err.raw_code();
    failure(palette, err, code)
}

/// Report `err` on stdout, exiting with the store's error code when there is one
fn failure(palette: Palette, err: impl std::fmt::Display, raw_code: Option<i32>) -> proc_exit::Exit {
    if let Err(write_err) = writeln!(anstream::stdout(), "{:#}: {}", palette.error("error"), err) {
        log::debug!("could not print error `{}`: {}", err, write_err);
    }
    let code = raw_code
        .filter(|code| *code != 0)
        .map(proc_exit::Code::new)
        .unwrap_or(proc_exit::Code::FAILURE);
    code.as_exit()
}
