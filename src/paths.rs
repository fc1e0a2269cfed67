use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "fiesta";

#[derive(Debug, Clone, Copy)]
enum Dir {
    Config,
    State,
}

impl Dir {
    fn xdg_var(self) -> &'static str {
        match self {
            Dir::Config => "XDG_CONFIG_HOME",
            Dir::State => "XDG_STATE_HOME",
        }
    }

    /// Subdirectory under `FIESTA_HOME`.
    fn home_subdir(self) -> &'static str {
        match self {
            Dir::Config => "config",
            Dir::State => "state",
        }
    }

    /// Fallback under `$HOME`.
    fn home_relative(self) -> PathBuf {
        match self {
            Dir::Config => Path::new(".config").join(APP_DIR),
            Dir::State => Path::new(".local").join("state").join(APP_DIR),
        }
    }

    /// `FIESTA_HOME` wins, then the XDG variable, then `$HOME`.
    fn resolve(
        self,
        fiesta_home: Option<PathBuf>,
        xdg: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> anyhow::Result<PathBuf> {
        if let Some(base) = fiesta_home {
            return Ok(base.join(self.home_subdir()));
        }
        if let Some(xdg) = xdg.filter(|p| p.is_absolute()) {
            return Ok(xdg.join(APP_DIR));
        }
        let home = home.context("HOME is not set")?;
        Ok(home.join(self.home_relative()))
    }

    fn ensure(self) -> anyhow::Result<PathBuf> {
        let var = |name: &str| env::var_os(name).map(PathBuf::from);
        let path = self.resolve(var("FIESTA_HOME"), var(self.xdg_var()), var("HOME"))?;
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
        Ok(path)
    }
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    Dir::Config.ensure()
}

pub fn state_dir() -> anyhow::Result<PathBuf> {
    Dir::State.ensure()
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn form_state_path() -> anyhow::Result<PathBuf> {
    Ok(state_dir()?.join("form.json"))
}
