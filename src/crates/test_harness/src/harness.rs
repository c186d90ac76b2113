use std::fs;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Serialize;

use crate::binding::{write_algorithm_binding, AlgorithmBinding};
use crate::config::{BindingDelivery, SimulatorConfig};
use crate::error::{HarnessError, HarnessResult};
use crate::fixture::{MapFixture, WrittenFixture};
use crate::verify::{verify_artifact, VerificationReport};

/// Origin stream for captured log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Single captured log line with its source.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub stream: LogStream,
    pub line: String,
}

/// Result of one simulator invocation.
#[derive(Debug)]
pub struct SimulatorRun {
    pub status: ExitStatus,
    /// Contents of the transcript file the simulator wrote.
    pub transcript: String,
    pub transcript_path: PathBuf,
    pub logs: Vec<LogLine>,
}

/// Launches the external simulator, one fixture at a time.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Run the simulator against a map file with an explicit binding and
    /// collect its transcript.
    ///
    /// A nonzero exit status is not an error: the simulator exits 1 on parse
    /// errors but still writes the error line to its transcript.
    pub fn run(&self, map_path: &Path, binding: &AlgorithmBinding) -> HarnessResult<SimulatorRun> {
        let config = &self.config;
        let map_path = fs::canonicalize(map_path)?;
        let working_dir = match &config.working_directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let transcript_path = transcript_path_for(&working_dir, &map_path);
        remove_stale(&transcript_path)?;

        let mut args = vec![map_path.display().to_string()];
        if matches!(
            config.binding_delivery,
            BindingDelivery::SharedFile | BindingDelivery::Both
        ) {
            let binding_path = config
                .binding_path
                .clone()
                .unwrap_or_else(|| config.default_binding_path());
            write_algorithm_binding(&binding_path, binding)?;
        }
        if matches!(
            config.binding_delivery,
            BindingDelivery::CliArgs | BindingDelivery::Both
        ) {
            args.extend(binding.cli_args());
        }
        args.extend(config.extra_args.iter().cloned());

        let mut cmd = Command::new(&config.binary_path);
        cmd.args(&args);
        cmd.current_dir(&working_dir);
        cmd.envs(&config.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        info!(
            "running {} on {} with [{binding}]",
            config.binary_path.display(),
            map_path.display()
        );
        let mut child = cmd
            .spawn()
            .map_err(|err| HarnessError::simulator_start(err.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::simulator_start("failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HarnessError::simulator_start("failed to capture stderr"))?;

        let (log_tx, log_rx) = mpsc::channel();
        let readers = [
            spawn_log_reader(stdout, LogStream::Stdout, log_tx.clone()),
            spawn_log_reader(stderr, LogStream::Stderr, log_tx),
        ];

        // Readers return once the child's pipes close, including after a kill.
        let status = wait_for_exit(&mut child, config.timeout, config.poll_interval);
        for reader in readers {
            if reader.join().is_err() {
                warn!("log reader panicked for {}", map_path.display());
            }
        }
        let status = status?;
        let logs: Vec<LogLine> = log_rx.try_iter().collect();

        if !status.success() {
            warn!("simulator exited with {status} for {}", map_path.display());
        }

        let transcript = match fs::read_to_string(&transcript_path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(HarnessError::MissingTranscript(transcript_path))
            }
            Err(err) => return Err(err.into()),
        };

        Ok(SimulatorRun {
            status,
            transcript,
            transcript_path,
            logs,
        })
    }
}

/// Verification result for one fixture run.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureVerdict {
    pub id: String,
    pub exit_code: Option<i32>,
    pub report: VerificationReport,
}

impl FixtureVerdict {
    pub fn passed(&self) -> bool {
        self.report.passed
    }

    /// Failed verdict for a fixture whose run never produced a transcript.
    pub fn run_error(id: String, err: &HarnessError) -> Self {
        Self {
            id,
            exit_code: None,
            report: VerificationReport {
                passed: false,
                errors: vec![err.to_string()],
            },
        }
    }
}

/// Run a generated fixture and verify the transcript against the
/// expected-output artifact on disk.
pub fn run_fixture(
    simulator: &Simulator,
    fixture: &MapFixture,
    written: &WrittenFixture,
) -> HarnessResult<FixtureVerdict> {
    let run = simulator.run(&written.map_path, &fixture.binding)?;
    let expected = fs::read_to_string(&written.expected_path)?;
    let report = verify_artifact(&run.transcript, &expected)?;

    if report.passed {
        info!("{} passed", fixture.id());
    } else {
        warn!("{} failed: {}", fixture.id(), report.errors.join("; "));
    }

    Ok(FixtureVerdict {
        id: fixture.id(),
        exit_code: run.status.code(),
        report,
    })
}

/// Run every fixture in order, pairing `fixtures[i]` with `written[i]`.
///
/// Simulator failures (spawn, timeout, missing transcript) become failed
/// verdicts and the remaining fixtures still run. Configuration errors abort.
pub fn run_fixtures(
    simulator: &Simulator,
    fixtures: &[MapFixture],
    written: &[WrittenFixture],
) -> HarnessResult<Vec<FixtureVerdict>> {
    let mut verdicts = Vec::with_capacity(written.len());
    for (fixture, paths) in fixtures.iter().zip(written) {
        match run_fixture(simulator, fixture, paths) {
            Ok(verdict) => verdicts.push(verdict),
            Err(err) if err.is_configuration_error() => return Err(err),
            Err(err) => {
                warn!("{} did not run: {err}", fixture.id());
                verdicts.push(FixtureVerdict::run_error(fixture.id(), &err));
            }
        }
    }
    Ok(verdicts)
}

/// The simulator names its transcript `output_<map file name>` in its working directory.
pub fn transcript_path_for(working_dir: &Path, map_path: &Path) -> PathBuf {
    match map_path.file_name() {
        Some(name) => working_dir.join(format!("output_{}", name.to_string_lossy())),
        None => working_dir.join("game_output_default.txt"),
    }
}

fn remove_stale(path: &Path) -> HarnessResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(HarnessError::storage(path, err)),
    }
}

fn wait_for_exit(
    child: &mut Child,
    timeout: Duration,
    poll_interval: Duration,
) -> HarnessResult<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            warn!("simulator exceeded {timeout:?}; killing it");
            let _ = child.kill();
            let _ = child.wait();
            return Err(HarnessError::Timeout(timeout));
        }
        thread::sleep(poll_interval);
    }
}

fn spawn_log_reader<R: std::io::Read + Send + 'static>(
    reader: R,
    stream: LogStream,
    tx: mpsc::Sender<LogLine>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let buf_reader = BufReader::new(reader);
        for line in buf_reader.lines().map_while(Result::ok) {
            let _ = tx.send(LogLine {
                stream,
                line: line.trim().to_string(),
            });
        }
    })
}
