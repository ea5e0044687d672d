use crate::agents::{
    ConfirmationGate, FileSynchronizer, GateDecision, PendingConfirmation, PlanOutcome,
    PublisherState, UpdatePlan, UpdatePlanner, UpdateReport, VersionFile,
};
use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::manifest::{ManifestNormalizer, ReleaseVersion};
use crate::repository::{RemoteFactory, RemoteSource};
use crate::transport::{
    ChatTransport, ConsoleTransport, ConversationId, IncomingMessage, MessageId, UserId,
};
use crate::utils::PathValidator;
use colored::Colorize;
use jiff::Timestamp;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const FULL_ARGUMENT: &str = "full";
const MISSING_SOURCE: &str = "set `base_url` in the updater config (it is unset or a placeholder)";
const CONSOLE_CONVERSATION: &str = "console";
const CONSOLE_OPERATOR: &str = "operator";

/// What a command invocation or a reply led to.
#[derive(Debug)]
pub enum CommandOutcome {
    Offered,
    UpToDate,
    /// The message did not answer a pending offer.
    Ignored,
    Cancelled,
    Expired,
    Applied,
    /// Already reported to the requester; carried for callers that need
    /// an exit status.
    Failed(UpdaterError),
}

/// The `update` chat command: offers an update plan, then applies it once the
/// requester confirms by replying to the offer.
pub struct UpdateCommand {
    source: Option<Arc<dyn RemoteSource>>,
    version_file: VersionFile,
    install_root: PathBuf,
    publisher: PublisherState,
    gate: ConfirmationGate,
    show_progress: bool,
}

impl UpdateCommand {
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        let install_root = PathValidator::validate_install_root(&config.install_root)?;

        Ok(Self::new(
            RemoteFactory::create_source(config)?,
            VersionFile::new(config.version_file_path()),
            install_root,
            RemoteFactory::create_publisher(config)?,
            ConfirmationGate::new(config.confirmation_ttl()),
        ))
    }

    pub fn new(
        source: Option<Arc<dyn RemoteSource>>,
        version_file: VersionFile,
        install_root: impl AsRef<Path>,
        publisher: PublisherState,
        gate: ConfirmationGate,
    ) -> Self {
        Self {
            source,
            version_file,
            install_root: install_root.as_ref().to_path_buf(),
            publisher,
            gate,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    fn source(&self) -> Result<&dyn RemoteSource> {
        self.source
            .as_deref()
            .ok_or_else(|| UpdaterError::ConfigurationMissing(MISSING_SOURCE.to_string()))
    }

    /// Fetch the manifest and compute the plan against the local version.
    pub fn check(&self) -> Result<(ReleaseVersion, PlanOutcome)> {
        let source = self.source()?;
        let manifest = source.fetch_manifest()?;
        let local = self.version_file.read_version()?;

        let entries = ManifestNormalizer::normalize(&manifest);
        info!(entries = entries.len(), local = %local, "manifest loaded");

        let outcome = UpdatePlanner::plan(entries, &local)?;
        Ok((local, outcome))
    }

    /// Handle `update [full]`: reply with the plan and remember the offer.
    pub fn run(
        &mut self,
        transport: &mut dyn ChatTransport,
        message: &IncomingMessage,
        args: &[String],
    ) -> Result<CommandOutcome> {
        let full_update = args
            .first()
            .is_some_and(|arg| arg == FULL_ARGUMENT);
        let conversation = &message.conversation;
        let request_id = Some(&message.message_id);

        let (local, plan) = match self.check() {
            Ok((local, PlanOutcome::Update(plan))) => (local, plan),
            Ok((_, PlanOutcome::UpToDate { local_version })) => {
                info!(%local_version, "already up to date");
                let text = format!("You are already on the latest version ({local_version}).");
                transport.send(conversation, &text, request_id)?;
                return Ok(CommandOutcome::UpToDate);
            }
            Err(e) => {
                error!(error = %e, "update check failed");
                transport.send(conversation, &check_failure_text(&e), request_id)?;
                return Ok(CommandOutcome::Failed(e));
            }
        };

        let offer_text = render_offer(&local, &plan, full_update);
        let offer_message = transport.send(conversation, &offer_text, request_id)?;
        info!(
            target_version = %plan.target_version,
            files = plan.files.len(),
            full_update,
            "update offered"
        );

        self.gate.offer(
            conversation.clone(),
            PendingConfirmation {
                plan,
                full_update,
                expected_requester: message.sender.clone(),
                offer_message,
                offered_at: Timestamp::now(),
            },
        );
        Ok(CommandOutcome::Offered)
    }

    /// Handle a reply in a conversation. `Ignored` means the message does not
    /// answer a pending offer, so other handlers may take it.
    pub fn handle_reply(
        &mut self,
        transport: &mut dyn ChatTransport,
        message: &IncomingMessage,
    ) -> Result<CommandOutcome> {
        let conversation = &message.conversation;
        let reply_id = Some(&message.message_id);

        match self.gate.resolve(message) {
            GateDecision::Ignored => Ok(CommandOutcome::Ignored),
            GateDecision::Declined(pending) => {
                info!(target_version = %pending.plan.target_version, "update declined");
                transport.send(conversation, "Update cancelled.", reply_id)?;
                Ok(CommandOutcome::Cancelled)
            }
            GateDecision::Expired(pending) => {
                let text = format!(
                    "The offer to update to v{} has expired. Run the command again.",
                    pending.plan.target_version
                );
                transport.send(conversation, &text, reply_id)?;
                Ok(CommandOutcome::Expired)
            }
            GateDecision::Confirmed(pending) => self.execute(transport, message, pending),
        }
    }

    fn execute(
        &self,
        transport: &mut dyn ChatTransport,
        message: &IncomingMessage,
        pending: PendingConfirmation,
    ) -> Result<CommandOutcome> {
        let conversation = &message.conversation;
        let reply_id = Some(&message.message_id);

        if let Err(e) = transport.unsend(&pending.offer_message) {
            warn!(error = %e, "could not retract update offer");
        }

        let mode = if pending.full_update { "FULL" } else { "RUNTIME" };
        transport.send(
            conversation,
            &format!(
                "Starting {mode} update to v{}...",
                pending.plan.target_version
            ),
            reply_id,
        )?;

        match self.apply(transport, message, &pending.plan, pending.full_update) {
            Ok(report) => {
                transport.send(conversation, &report.render(), reply_id)?;
                Ok(CommandOutcome::Applied)
            }
            Err(e) => {
                error!(error = %e, "update failed");
                transport.send(conversation, &format!("Update failed: {e}"), reply_id)?;
                Ok(CommandOutcome::Failed(e))
            }
        }
    }

    fn apply(
        &self,
        transport: &mut dyn ChatTransport,
        message: &IncomingMessage,
        plan: &UpdatePlan,
        full_update: bool,
    ) -> Result<UpdateReport> {
        let sync = FileSynchronizer::new(self.source()?, &self.install_root)
            .with_progress(self.show_progress)
            .apply(&plan.files, full_update);

        // Recorded even when some files failed.
        self.version_file.write_version(&plan.target_version)?;

        let publish = if full_update && !sync.updated_files.is_empty() {
            transport.send(
                &message.conversation,
                "Pushing changes to the remote repository...",
                Some(&message.message_id),
            )?;
            Some(self.publisher.publish(&sync, &plan.target_version))
        } else {
            None
        };

        Ok(UpdateReport {
            target_version: plan.target_version.clone(),
            sync,
            publish,
        })
    }
}

/// Offer text shown to the requester before anything is changed.
pub fn render_offer(local: &ReleaseVersion, plan: &UpdatePlan, full_update: bool) -> String {
    let changelog = if plan.changelog_lines.is_empty() {
        "• No changelog entries.".to_string()
    } else {
        bullet_list(&plan.changelog_lines)
    };

    let files = if plan.files.is_empty() {
        "• No files listed in manifest.".to_string()
    } else {
        bullet_list(&plan.files)
    };

    let mut text = format!(
        "Updates available up to v{}\n\nChanges since v{}:\n{}\n\nFiles to update ({}):\n{}\n\nReply \"yes\" to update runtime files.",
        plan.target_version,
        local,
        changelog,
        plan.files.len(),
        files
    );
    if full_update {
        text.push_str("\n(This will also push changes to the remote repository)");
    }
    text
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_failure_text(error: &UpdaterError) -> String {
    match error {
        UpdaterError::ConfigurationMissing(reason) => {
            format!("Please configure the release source first: {reason}")
        }
        UpdaterError::ManifestInvalid => {
            "Remote manifest does not contain any valid versions.".to_string()
        }
        other => format!("Check failed: {other}"),
    }
}

/// Execute the check workflow (dry-run)
pub fn execute_check(config_path: &Path) -> Result<()> {
    println!("{}", "Checking for updates...".cyan().bold());

    let config = UpdaterConfig::load(config_path)?;
    let command = UpdateCommand::from_config(&config)?;
    let (local, outcome) = command.check()?;

    match outcome {
        PlanOutcome::UpToDate { local_version } => {
            println!(
                "\n{}",
                format!("✓ Already on the latest version ({local_version})")
                    .green()
                    .bold()
            );
        }
        PlanOutcome::Update(plan) => print_plan(&local, &plan),
    }
    Ok(())
}

fn print_plan(local: &ReleaseVersion, plan: &UpdatePlan) {
    println!(
        "\n{} {} → {}",
        "Update available:".cyan().bold(),
        local.original.red(),
        plan.target_version.green().bold()
    );

    println!("\n{}:", "Changelog".cyan());
    for line in &plan.changelog_lines {
        println!("  • {line}");
    }

    println!("\n{} ({}):", "Files".cyan(), plan.files.len());
    if plan.files.is_empty() {
        println!("  {}", "(none listed)".dimmed());
    }
    for file in &plan.files {
        println!("  • {}", file.white().bold());
    }

    println!("\n{}", "To apply this update, run:".dimmed());
    println!("  {}", "bot-updater update".cyan());
}

/// Execute the update workflow on the console: offer, read one reply, apply.
pub fn execute_update(config_path: &Path, full_update: bool) -> Result<()> {
    let config = UpdaterConfig::load(config_path)?;
    let mut command = UpdateCommand::from_config(&config)?.with_progress(true);
    let mut transport = ConsoleTransport::new();

    let conversation = ConversationId::new(CONSOLE_CONVERSATION);
    let operator = UserId::new(CONSOLE_OPERATOR);
    let args: Vec<String> = if full_update {
        vec![FULL_ARGUMENT.to_string()]
    } else {
        Vec::new()
    };

    let request = IncomingMessage {
        conversation: conversation.clone(),
        message_id: MessageId::new("request"),
        sender: operator.clone(),
        body: format!("update {}", args.join(" ")).trim_end().to_string(),
        reply_to: None,
    };
    if let CommandOutcome::Failed(e) = command.run(&mut transport, &request, &args)? {
        return Err(e);
    }

    let Some(offer) = command
        .gate()
        .pending_for(&conversation)
        .map(|pending| pending.offer_message.clone())
    else {
        return Ok(());
    };

    let answer = transport.read_reply("> ")?;
    let reply = IncomingMessage {
        conversation,
        message_id: MessageId::new("reply"),
        sender: operator,
        body: answer,
        reply_to: Some(offer),
    };
    match command.handle_reply(&mut transport, &reply)? {
        CommandOutcome::Failed(e) => Err(e),
        _ => Ok(()),
    }
}
