#[derive(clap::Parser, Debug)]
#[command(about, author, version)]
pub(crate) struct Args {
    /// Commit to reword, e.g. `HEAD~2`, a branch name or a (possibly abbreviated) id
    pub(crate) revision: String,

    /// New commit message
    pub(crate) message: String,

    /// List the commits that would be recreated without changing anything
    #[arg(short = 'n', long)]
    pub(crate) dry_run: bool,

    #[command(flatten)]
    pub(crate) color: colorchoice_clap::Color,

    #[command(flatten)]
    pub(crate) verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

impl Args {
    /// Whether `--verbose` was passed at least once
    pub(crate) fn is_verbose(&self) -> bool {
        self.verbose.log_level_filter() > log::LevelFilter::Info
    }
}
