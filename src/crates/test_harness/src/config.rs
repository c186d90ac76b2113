use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk layout of generated fixtures.
#[derive(Debug, Clone)]
pub struct FixtureLayout {
    /// Root directory every other default is derived from.
    pub root: PathBuf,
    /// Map files land in `<maps_dir>/<category>/<name>.txt`.
    pub maps_dir: PathBuf,
    /// Expected-output artifacts land in `<expected_dir>/<name>_expected.txt`.
    pub expected_dir: PathBuf,
    /// Shared algorithm-config artifact read by the simulator at startup.
    pub binding_path: PathBuf,
    /// JSON index of every generated fixture.
    pub manifest_path: PathBuf,
}

impl FixtureLayout {
    /// Create a layout rooted at `root` with the default sub-paths.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            maps_dir: root.join("maps"),
            expected_dir: root.join("expected_outputs"),
            binding_path: root.join("algorithm_types.txt"),
            manifest_path: root.join("manifest.json"),
            root,
        }
    }

    /// Override the directory that receives map files.
    pub fn with_maps_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = dir.into();
        self
    }

    /// Override the directory that receives expected-output artifacts.
    pub fn with_expected_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.expected_dir = dir.into();
        self
    }

    /// Override where the algorithm binding is written, typically next to the
    /// simulator executable.
    pub fn with_binding_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binding_path = path.into();
        self
    }

    /// Override the manifest location.
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn map_path(&self, category_dir: &str, name: &str) -> PathBuf {
        self.maps_dir.join(category_dir).join(format!("{name}.txt"))
    }

    pub fn expected_path(&self, name: &str) -> PathBuf {
        self.expected_dir.join(format!("{name}_expected.txt"))
    }
}

/// How the algorithm binding reaches the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingDelivery {
    /// `--algorithm1=<id>` style arguments only.
    CliArgs,
    /// Rewrite the shared config file only.
    SharedFile,
    /// Both; the command line takes precedence in the simulator.
    #[default]
    Both,
}

/// Process-level configuration for launching the simulator binary.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Path to the simulator binary.
    pub binary_path: PathBuf,
    /// Additional CLI arguments appended after the map path and binding.
    pub extra_args: Vec<String>,
    /// Extra environment variables applied to the child process.
    pub env: BTreeMap<String, String>,
    /// Working directory for the child; the transcript is written here.
    pub working_directory: Option<PathBuf>,
    /// Shared binding file used when delivery includes [`BindingDelivery::SharedFile`].
    pub binding_path: Option<PathBuf>,
    pub binding_delivery: BindingDelivery,
    /// Upper bound on a single run before the child is killed.
    pub timeout: Duration,
    /// Delay between exit-status polls.
    pub poll_interval: Duration,
}

impl SimulatorConfig {
    /// Create a new config targeting a specific simulator binary.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            extra_args: Vec::new(),
            env: BTreeMap::new(),
            working_directory: None,
            binding_path: None,
            binding_delivery: BindingDelivery::default(),
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Add a passthrough CLI argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Add an environment variable override.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the working directory for the spawned process.
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Shared binding file to rewrite before each run.
    pub fn with_binding_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binding_path = Some(path.into());
        self
    }

    pub fn with_binding_delivery(mut self, delivery: BindingDelivery) -> Self {
        self.binding_delivery = delivery;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Default shared binding location: `algorithm_types.txt` beside the binary.
    pub fn default_binding_path(&self) -> PathBuf {
        self.binary_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("algorithm_types.txt")
    }
}
