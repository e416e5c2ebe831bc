#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct RepoConfig {
    pub verbose: Option<bool>,
    pub reflog_message: Option<String>,
}

static VERBOSE_FIELD: &str = "reword.verbose";
static REFLOG_MESSAGE_FIELD: &str = "reword.reflog-message";

impl RepoConfig {
    pub fn from_all(repo: &git2::Repository) -> eyre::Result<Self> {
        log::trace!("Loading gitconfig");
        let config = Self::from_defaults();
        let config = config.update(Self::from_workdir(repo)?);
        let config = config.update(Self::from_repo(repo)?);
        let config = config.update(Self::from_env());
        Ok(config)
    }

    pub fn from_repo(repo: &git2::Repository) -> eyre::Result<Self> {
        match repo.config() {
            Ok(config) => Ok(Self::from_gitconfig(&config)),
            Err(err) => {
                log::debug!("Failed to load git config: {}", err);
                Ok(Default::default())
            }
        }
    }

    pub fn from_workdir(repo: &git2::Repository) -> eyre::Result<Self> {
        let Some(workdir) = repo.workdir() else {
            log::trace!("No work tree, skipping .gitconfig");
            return Ok(Default::default());
        };
        let config_path = workdir.join(".gitconfig");
        log::trace!("Loading {}", config_path.display());
        if config_path.exists() {
            match git2::Config::open(&config_path) {
                Ok(config) => Ok(Self::from_gitconfig(&config)),
                Err(err) => {
                    log::debug!("Failed to load git config: {}", err);
                    Ok(Default::default())
                }
            }
        } else {
            Ok(Default::default())
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        let params = git_config_env::ConfigParameters::new();
        config = config.update(Self::from_env_iter(params.iter()));

        let params = git_config_env::ConfigEnv::new();
        config = config.update(Self::from_env_iter(
            params.iter().map(|(k, v)| (k, Some(v))),
        ));

        config
    }

    /// Key/value pairs as git passes them through the environment
    ///
    /// A key with no value is a boolean `true`.
    pub fn from_env_iter<'s>(
        iter: impl Iterator<Item = (std::borrow::Cow<'s, str>, Option<std::borrow::Cow<'s, str>>)>,
    ) -> Self {
        let mut config = Self::default();

        for (key, value) in iter {
            log::trace!("Env config: {}={:?}", key, value);
            if key.eq_ignore_ascii_case(VERBOSE_FIELD) {
                match value.as_deref().map(git2::Config::parse_bool) {
                    None => config.verbose = Some(true),
                    Some(Ok(value)) => config.verbose = Some(value),
                    Some(Err(err)) => {
                        log::debug!("Ignoring {}: {}", key, err);
                    }
                }
            } else if key.eq_ignore_ascii_case(REFLOG_MESSAGE_FIELD) {
                if let Some(value) = value {
                    config.reflog_message = Some(value.into_owned());
                }
            } else {
                log::trace!("Ignoring {}", key);
            }
        }

        config
    }

    pub fn from_defaults() -> Self {
        Self {
            verbose: Some(false),
            reflog_message: Some(crate::rewrite::DEFAULT_REFLOG_MESSAGE.to_owned()),
        }
    }

    pub fn from_gitconfig(config: &git2::Config) -> Self {
        let verbose = config.get_bool(VERBOSE_FIELD).ok();
        let reflog_message = config
            .get_string(REFLOG_MESSAGE_FIELD)
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            verbose,
            reflog_message,
        }
    }

    pub fn update(mut self, other: Self) -> Self {
        self.verbose = other.verbose.or(self.verbose);
        self.reflog_message = other.reflog_message.or(self.reflog_message);
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn reflog_message(&self) -> &str {
        self.reflog_message
            .as_deref()
            .unwrap_or(crate::rewrite::DEFAULT_REFLOG_MESSAGE)
    }
}
