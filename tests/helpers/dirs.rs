use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Clone)]
pub struct TestDirs {
    pub home: Rc<tempfile::TempDir>,
    pub config: PathBuf,
    pub plugins: PathBuf,
    pub output: PathBuf,
    pub src: PathBuf,
}

impl TestDirs {
    pub fn new(config: impl AsRef<Path>) -> io::Result<Self> {
        let home = Rc::new(tempfile::tempdir()?);
        let config = home.path().join(config);
        let plugins = config.join("plugins");
        let output = home.path().join("sorted");
        let src = home.path().join("src");
        fs::create_dir_all(&config)?;
        fs::create_dir_all(&plugins)?;
        fs::create_dir_all(&src)?;
        Ok(Self {
            home,
            config,
            plugins,
            output,
            src,
        })
    }

    pub fn default() -> io::Result<Self> {
        Self::new(".curator")
    }

    /// Write a config file pointing at the test output directory, with the
    /// given extra lines appended.
    pub fn write_config(&self, extra: &str) -> io::Result<()> {
        let contents = format!("output = \"{}\"\n{extra}", self.output.display());
        fs::write(self.config.join("curator.toml"), contents)
    }
}
