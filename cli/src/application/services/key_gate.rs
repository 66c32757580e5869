//! Signing-key verification gate.
//!
//! Fetches a repository signing key, dearmors it into the package manager's
//! trust store, inspects it without importing it anywhere, and compares the
//! fingerprint. A key that does not verify is deleted before the gate
//! reports failure: the package manager treats any keyring on disk as
//! authoritative, so an unverified one must not outlive the run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::{
    Capture, CommandError, CommandSpec, ProvisionError, ProvisioningContext, SigningKey,
    VerificationRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Fetching,
    Inspecting,
    Comparing,
    Verified,
    RollingBack,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVerificationGate {
    key: SigningKey,
    use_sudo: bool,
}

impl KeyVerificationGate {
    #[must_use]
    pub fn new(key: SigningKey, use_sudo: bool) -> Self {
        Self { key, use_sudo }
    }

    #[must_use]
    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!("verify signing key '{}'", self.key.name)
    }

    fn staging_path(&self, ctx: &ProvisioningContext) -> PathBuf {
        ctx.scratch_dir.join(format!("{}.asc", self.key.name))
    }

    /// Download the armored key into the scratch directory.
    #[must_use]
    pub fn fetch_command(&self, ctx: &ProvisioningContext) -> CommandSpec {
        let staging = self.staging_path(ctx);
        CommandSpec::new(
            "curl",
            [
                "-fsSL".to_owned(),
                "--output".to_owned(),
                staging.display().to_string(),
                self.key.url.clone(),
            ],
        )
    }

    /// Write the binary keyring into the trust store.
    #[must_use]
    pub fn dearmor_command(&self, ctx: &ProvisioningContext) -> CommandSpec {
        let staging = self.staging_path(ctx);
        CommandSpec::privileged(
            self.use_sudo,
            "gpg",
            [
                "--batch".to_owned(),
                "--yes".to_owned(),
                "--dearmor".to_owned(),
                "--output".to_owned(),
                self.key.keyring.display().to_string(),
                staging.display().to_string(),
            ],
        )
    }

    /// Show key metadata without touching any persistent keyring.
    #[must_use]
    pub fn inspect_command(&self) -> CommandSpec {
        CommandSpec::new(
            "gpg",
            [
                "--dry-run".to_owned(),
                "--quiet".to_owned(),
                "--no-keyring".to_owned(),
                "--import".to_owned(),
                "--import-options".to_owned(),
                "import-show".to_owned(),
                self.key.keyring.display().to_string(),
            ],
        )
    }

    /// Remove the keyring; `-f` keeps the removal idempotent.
    #[must_use]
    pub fn rollback_command(&self) -> CommandSpec {
        CommandSpec::privileged(
            self.use_sudo,
            "rm",
            ["-f".to_owned(), self.key.keyring.display().to_string()],
        )
    }

    fn advance(&self, state: &mut GateState, next: GateState) {
        tracing::debug!(key = %self.key.name, from = ?*state, to = ?next, "key gate transition");
        *state = next;
    }

    /// Run the gate to a terminal state.
    ///
    /// # Errors
    ///
    /// - Fetch or dearmor failures are returned as command errors (after
    ///   rollback when the keyring may have been written).
    /// - `ProvisionError::VerificationRejected` when the fingerprint is not
    ///   found; the keyring has already been removed.
    pub async fn run<R: CommandRunner>(
        &self,
        runner: &R,
        ctx: &ProvisioningContext,
        reporter: &impl ProgressReporter,
    ) -> Result<(), ProvisionError> {
        let step = self.name();
        let mut state = GateState::Fetching;
        reporter.step(&format!("downloading signing key '{}'...", self.key.name));

        runner
            .execute(&ctx.prepare(&self.fetch_command(ctx)), Capture::Buffered)
            .await
            .map_err(|e| ProvisionError::from_command(&step, e))?;

        if let Err(e) = runner
            .execute(&ctx.prepare(&self.dearmor_command(ctx)), Capture::Buffered)
            .await
        {
            self.roll_back(runner, ctx, reporter, &mut state).await;
            return Err(ProvisionError::from_command(&step, e));
        }

        self.advance(&mut state, GateState::Inspecting);
        let observed = match runner
            .execute(&ctx.prepare(&self.inspect_command()), Capture::Buffered)
            .await
        {
            Ok(result) => result.stdout,
            // Non-zero exit still leaves whatever gpg printed; the comparison
            // decides.
            Err(CommandError::Failed { result, .. }) => result.stdout,
            Err(e) => {
                self.roll_back(runner, ctx, reporter, &mut state).await;
                return Err(ProvisionError::from_command(&step, e));
            }
        };

        self.advance(&mut state, GateState::Comparing);
        let record = VerificationRecord::new(self.key.fingerprint.clone(), observed);
        if record.matches() {
            self.advance(&mut state, GateState::Verified);
            tracing::info!(key = %self.key.name, fingerprint = %self.key.fingerprint, "signing key verified");
            reporter.success(&format!(
                "key verification successful. Fingerprint: {}",
                self.key.fingerprint
            ));
            return Ok(());
        }

        tracing::warn!(
            key = %self.key.name,
            expected = %self.key.fingerprint,
            observed = %record.observed_output.trim(),
            "signing key fingerprint mismatch"
        );
        self.roll_back(runner, ctx, reporter, &mut state).await;
        self.advance(&mut state, GateState::Rejected);
        Err(ProvisionError::VerificationRejected {
            key: self.key.name.clone(),
            fingerprint: self.key.fingerprint.clone(),
            keyring: self.key.keyring.clone(),
        })
    }

    /// Compensating action. Awaited to completion before the gate reports;
    /// a failing removal is surfaced as a warning but never masks the
    /// original failure.
    async fn roll_back<R: CommandRunner>(
        &self,
        runner: &R,
        ctx: &ProvisioningContext,
        reporter: &impl ProgressReporter,
        state: &mut GateState,
    ) {
        self.advance(state, GateState::RollingBack);
        reporter.warn(&format!(
            "key verification failed. Removing {}",
            self.key.keyring.display()
        ));
        if let Err(e) = runner
            .execute(&ctx.prepare(&self.rollback_command()), Capture::Buffered)
            .await
        {
            tracing::error!(keyring = %self.key.keyring.display(), error = %e, "keyring rollback failed");
            reporter.warn(&format!(
                "could not remove {}: {e}. Delete it manually before re-running.",
                self.key.keyring.display()
            ));
        }
    }
}
