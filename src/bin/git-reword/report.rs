use std::io::Write;

use git_reword::git::Repo;
use git_reword::rewrite::Report;

/// Progress as text, normally on stdout
///
/// The commit list is shown when verbose or for a dry run, the `old -> new` lines only when
/// verbose.
pub(crate) struct TextReport<W> {
    out: W,
    palette: Palette,
    verbose: bool,
    dry_run: bool,
    walked: usize,
}

impl<W: Write> TextReport<W> {
    pub(crate) fn new(out: W, palette: Palette, verbose: bool, dry_run: bool) -> Self {
        Self {
            out,
            palette,
            verbose,
            dry_run,
            walked: 0,
        }
    }

    /// Number of commits that are (or would be) recreated
    pub(crate) fn walked_count(&self) -> usize {
        self.walked
    }

    fn write_walked(&mut self, repo: &dyn Repo, walked: &[git2::Oid]) -> std::io::Result<()> {
        writeln!(self.out, "Commits to be recreated:")?;
        for id in walked {
            let summary = match repo.find_commit(*id) {
                Ok(commit) => commit.summary().to_string(),
                Err(err) => {
                    log::debug!("could not read {}: {}", id, err);
                    String::new()
                }
            };
            writeln!(self.out, "{:#} {}", self.palette.highlight(id), summary)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Report for TextReport<W> {
    fn walked(&mut self, repo: &dyn Repo, walked: &[git2::Oid]) {
        self.walked = walked.len();
        if !self.verbose && !self.dry_run {
            return;
        }

        if let Err(err) = self.write_walked(repo, walked) {
            log::debug!("could not print commits to be recreated: {}", err);
        }
    }

    fn rewritten(&mut self, old_id: git2::Oid, new_id: git2::Oid) {
        if !self.verbose {
            return;
        }
        let palette = self.palette;
        if let Err(err) = writeln!(
            self.out,
            "{:#} -> {:#}",
            palette.hint(old_id),
            palette.good(new_id)
        ) {
            log::debug!("could not print {} -> {}: {}", old_id, new_id, err);
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Palette {
    error: anstyle::Style,
    warn: anstyle::Style,
    info: anstyle::Style,
    good: anstyle::Style,
    highlight: anstyle::Style,
    hint: anstyle::Style,
}

impl Palette {
    pub(crate) fn colored() -> Self {
        Self {
            error: anstyle::AnsiColor::Red.on_default() | anstyle::Effects::BOLD,
            warn: anstyle::AnsiColor::Yellow.on_default(),
            info: anstyle::AnsiColor::Blue.on_default(),
            good: anstyle::AnsiColor::Cyan.on_default(),
            highlight: anstyle::AnsiColor::Green.on_default() | anstyle::Effects::BOLD,
            hint: anstyle::Effects::DIMMED.into(),
        }
    }

    pub(crate) fn plain() -> Self {
        Self::default()
    }

    pub(crate) fn error<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.error)
    }

    pub(crate) fn warn<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.warn)
    }

    pub(crate) fn info<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.info)
    }

    pub(crate) fn good<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.good)
    }

    pub(crate) fn highlight<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.highlight)
    }

    pub(crate) fn hint<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.hint)
    }
}

/// Renders the style only in alternate mode (`{:#}`)
#[derive(Debug)]
pub(crate) struct Styled<D> {
    display: D,
    style: anstyle::Style,
}

impl<D: std::fmt::Display> Styled<D> {
    pub(crate) fn new(display: D, style: anstyle::Style) -> Self {
        Self { display, style }
    }
}

impl<D: std::fmt::Display> std::fmt::Display for Styled<D> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.style.render())?;
            self.display.fmt(f)?;
            write!(f, "{}", self.style.render_reset())?;
            Ok(())
        } else {
            self.display.fmt(f)
        }
    }
}
