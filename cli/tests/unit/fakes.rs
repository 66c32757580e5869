//! Simulated host: a `CommandRunner` that applies the file effects of the
//! commands the orchestrator issues inside a temp directory.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use plus_provision::application::ports::{CommandRunner, ProgressReporter};
use plus_provision::domain::config::PackageConfig;
use plus_provision::domain::{
    Capture, CommandError, CommandResult, CommandSpec, ProvisionConfig, Repository, SigningKey,
};

pub const FINGERPRINT: &str = "573BFD6B3D8FBC641079A6ABABF5BD827BD9BF62";

pub fn gpg_show(fingerprint: &str) -> String {
    format!(
        "pub   rsa2048 2011-08-19 [SC] [expires: 2027-05-24]\n      {fingerprint}\nuid                      nginx signing key <signing-key@nginx.com>\n"
    )
}

pub struct FakeHost {
    calls: Mutex<Vec<(CommandSpec, Capture)>>,
    inspect_output: String,
    failures: Vec<(String, i32)>,
    launch_failures: Vec<String>,
    missing_message: &'static str,
}

impl FakeHost {
    pub fn new(inspect_output: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            inspect_output: inspect_output.into(),
            failures: Vec::new(),
            launch_failures: Vec::new(),
            missing_message: "No such file or directory",
        }
    }

    /// coreutils under a German locale, as `sudo` passes `LANG` through.
    pub fn german_locale(mut self) -> Self {
        self.missing_message = "Datei oder Verzeichnis nicht gefunden";
        self
    }

    /// Any command whose rendering contains `needle` exits with `code`.
    pub fn fail_on(mut self, needle: &str, code: i32) -> Self {
        self.failures.push((needle.to_owned(), code));
        self
    }

    pub fn launch_error_on(mut self, needle: &str) -> Self {
        self.launch_failures.push(needle.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.to_string())
            .collect()
    }

    pub fn specs(&self) -> Vec<(CommandSpec, Capture)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.contains(needle))
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }

    fn simulate(&self, program: &str, args: &[String], stdin: Option<&[u8]>) -> CommandResult {
        let ok = |stdout: String| CommandResult {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        };
        let output_arg = || {
            args.iter()
                .position(|a| a == "--output")
                .map(|i| PathBuf::from(&args[i + 1]))
        };
        match program {
            "curl" => {
                if let Some(path) = output_arg() {
                    write(&path, b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n");
                }
                ok(String::new())
            }
            "gpg" if args.iter().any(|a| a == "--dearmor") => {
                if let Some(path) = output_arg() {
                    write(&path, b"\x99\x01\x0d");
                }
                ok(String::new())
            }
            "gpg" => ok(self.inspect_output.clone()),
            "tee" => {
                let input = stdin.unwrap_or_default();
                for path in args.iter().filter(|a| !a.starts_with('-')) {
                    write(Path::new(path), input);
                }
                ok(String::from_utf8_lossy(input).into_owned())
            }
            "rm" => {
                let force = args.iter().any(|a| a == "-f");
                for path in args.iter().filter(|a| !a.starts_with('-')) {
                    if std::fs::remove_file(path).is_err() && !force {
                        return CommandResult {
                            exit_code: 1,
                            stdout: String::new(),
                            stderr: format!(
                                "rm: cannot remove '{path}': {}\n",
                                self.missing_message
                            ),
                        };
                    }
                }
                ok(String::new())
            }
            "dpkg" => ok(
                "Desired=Unknown/Install/Remove/Purge/Hold\n\
                 ||/ Name                    Version              Architecture Description\n\
                 +++-=======================-====================-============-=================\n\
                 ii  app-protect-module-plus 34+5.446.0-1~noble   amd64        NGINX App Protect WAF module\n"
                    .to_owned(),
            ),
            _ => ok(String::new()),
        }
    }
}

fn write(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

impl CommandRunner for FakeHost {
    async fn execute(
        &self,
        command: &CommandSpec,
        capture: Capture,
    ) -> Result<CommandResult, CommandError> {
        self.calls.lock().unwrap().push((command.clone(), capture));
        let rendered = command.to_string();

        if self.launch_failures.iter().any(|n| rendered.contains(n)) {
            return Err(CommandError::Launch {
                command: rendered,
                reason: "No such file or directory (os error 2)".to_owned(),
            });
        }
        if let Some((_, code)) = self.failures.iter().find(|(n, _)| rendered.contains(n)) {
            return Err(CommandError::Failed {
                command: rendered,
                exit_code: *code,
                result: CommandResult {
                    exit_code: *code,
                    stdout: String::new(),
                    stderr: "simulated failure".to_owned(),
                },
            });
        }

        // Strip `sudo [--preserve-env=...]` so effects apply either way.
        let (program, args) = if command.program == "sudo" {
            let rest: Vec<String> = command
                .args
                .iter()
                .skip_while(|a| a.starts_with("--preserve-env"))
                .cloned()
                .collect();
            match rest.split_first() {
                Some((program, args)) => (program.clone(), args.to_vec()),
                None => (String::new(), Vec::new()),
            }
        } else {
            (command.program.clone(), command.args.clone())
        };

        let result = self.simulate(&program, &args, command.stdin.as_deref());
        if result.exit_code == 0 {
            Ok(result)
        } else {
            Err(CommandError::Failed {
                command: rendered,
                exit_code: result.exit_code,
                result,
            })
        }
    }
}

#[derive(Default)]
pub struct Messages(Mutex<Vec<(&'static str, String)>>);

impl Messages {
    pub fn of(&self, kind: &str) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl ProgressReporter for Messages {
    fn step(&self, message: &str) {
        self.0.lock().unwrap().push(("step", message.to_owned()));
    }
    fn success(&self, message: &str) {
        self.0.lock().unwrap().push(("success", message.to_owned()));
    }
    fn warn(&self, message: &str) {
        self.0.lock().unwrap().push(("warn", message.to_owned()));
    }
    fn error(&self, message: &str) {
        self.0.lock().unwrap().push(("error", message.to_owned()));
    }
}

/// A host laid out under `root`: operator files in `root/work`, system
/// paths under `root/etc` and `root/usr`.
pub struct Host {
    pub root: tempfile::TempDir,
}

impl Host {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let host = Self { root };
        write(&host.path("work/nginx-repo.crt"), b"cert");
        write(&host.path("work/nginx-repo.key"), b"key");
        host
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn keyring(&self) -> PathBuf {
        self.path("usr/share/keyrings/nginx-archive-keyring.gpg")
    }

    pub fn seed(&self, rel: &str) {
        write(&self.path(rel), b"stale");
    }

    pub fn config(&self) -> ProvisionConfig {
        let sources = self.path("etc/apt/sources.list.d");
        ProvisionConfig {
            trust_dir: self.path("etc/ssl/nginx"),
            use_sudo: false,
            distribution_codename: Some("noble".to_owned()),
            signing_keys: vec![SigningKey {
                name: "nginx".to_owned(),
                url: "https://cs.nginx.com/static/keys/nginx_signing.key".to_owned(),
                keyring: self.keyring(),
                fingerprint: FINGERPRINT.to_owned(),
            }],
            package_config: PackageConfig {
                url: "https://cs.nginx.com/static/files/90pkgs-nginx".to_owned(),
                path: self.path("etc/apt/apt.conf.d/90pkgs-nginx"),
            },
            stale_config: vec![
                sources.join("nginx*.list"),
                sources.join("*app-protect*.list"),
                self.path("etc/apt/apt.conf.d/90pkgs-nginx"),
            ],
            repositories: vec![Repository {
                name: "nginx-plus".to_owned(),
                url: "https://pkgs.nginx.com/plus/ubuntu".to_owned(),
                suite: None,
                component: "nginx-plus".to_owned(),
                list_file: sources.join("nginx-plus.list"),
                signed_by: "nginx".to_owned(),
            }],
            ..ProvisionConfig::default()
        }
    }
}
