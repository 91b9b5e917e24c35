//! One method per REPL command.

use anyhow::Result;

use super::{Dispatcher, FAREWELL, Flow};
use crate::application::ports::{
    Console, InstanceProvider, LineSource, NetworkManager, ProfileWriter, RemoteShell,
};
use crate::application::services::transition::{self, Transition, TransitionOutcome};
use crate::application::services::vpn::{self, VpnTarget};
use crate::domain::command::{HELP_LINES, SELECTED_PLACEHOLDER};
use crate::domain::{Command, Instance, InstanceError};

impl<P, S, N, W, I, C> Dispatcher<P, S, N, W, I, C>
where
    P: InstanceProvider,
    S: RemoteShell,
    N: NetworkManager,
    W: ProfileWriter,
    I: LineSource,
    C: Console,
{
    pub(super) async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        if command.requires_selection() && self.session.selected().is_none() {
            self.console.error(&InstanceError::NotSelected.to_string());
            return Ok(Flow::Abort);
        }

        match command {
            Command::Help => {
                self.help();
                Ok(Flow::Done)
            }
            Command::Select => self.select().await,
            Command::List => {
                self.console.line("Instances list:");
                self.registry.print(&self.console);
                Ok(Flow::Done)
            }
            Command::Update => {
                self.update().await;
                Ok(Flow::Done)
            }
            Command::Info => self.info(),
            Command::Start => self.transition(Transition::Start).await,
            Command::Stop => self.transition(Transition::Stop).await,
            Command::Run => self.launch_server().await,
            Command::File => self.fetch_profile().await,
            Command::Ssh => self.ssh().await,
            Command::Set => self.install_profile().await,
            Command::Up => {
                let ok = vpn::connect(&self.network, &self.console, self.target()).await?;
                Ok(if ok { Flow::Done } else { Flow::Abort })
            }
            Command::Down => {
                let ok = vpn::disconnect(&self.network, &self.console, self.target()).await?;
                Ok(if ok { Flow::Done } else { Flow::Abort })
            }
            Command::Vpn => Ok(Flow::Enqueue(command.expansion())),
            Command::Quit => {
                self.console.line(FAREWELL);
                Ok(Flow::Quit)
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────────────

    /// Resolve the selected id against the current registry contents.
    fn selected_instance(&self) -> Result<&Instance, InstanceError> {
        let id = self.session.selected().ok_or(InstanceError::NotSelected)?;
        self.registry
            .find_by_id(id)
            .ok_or_else(|| InstanceError::NotFound(id.to_string()))
    }

    pub(super) fn print_selected(&self) {
        if let Ok(instance) = self.selected_instance() {
            self.console.line(&format!(
                "Selected instance: {} {}",
                self.console.accent(instance.display_label()),
                instance.id
            ));
        }
    }

    async fn select(&mut self) -> Result<Flow> {
        let chosen = self
            .registry
            .select_interactive(false, &mut self.input, &self.console)
            .await?
            .map(|instance| instance.id.clone());

        match chosen {
            Some(id) => {
                tracing::info!(instance_id = %id, "instance selected");
                self.session.select(id);
                self.print_selected();
                Ok(Flow::Done)
            }
            None => {
                if self.registry.is_empty() {
                    self.console.error("No instances found.");
                }
                Ok(Flow::Abort)
            }
        }
    }

    async fn update(&mut self) {
        self.registry.refresh().await;
        let vanished = self
            .session
            .selected()
            .filter(|id| self.registry.find_by_id(id).is_none())
            .map(str::to_string);
        if let Some(id) = vanished {
            tracing::warn!(instance_id = %id, "selected instance no longer listed");
            self.session.clear();
        }
        self.registry.print(&self.console);
    }

    // ── Informational ────────────────────────────────────────────────────────

    pub(super) fn help(&self) {
        let selected = self.selected_instance().map_or_else(
            |_| "selected instance".to_string(),
            |instance| self.console.accent(instance.display_label()),
        );

        self.console.line("");
        self.console.line("EC2 Control");
        self.console.line(&"-".repeat(60));
        for (name, description) in HELP_LINES {
            let description = description.replace(SELECTED_PLACEHOLDER, &selected);
            self.console.line(&format!("{name:<8}: {description}"));
        }
    }

    fn info(&self) -> Result<Flow> {
        let instance = self.selected_instance()?;
        self.console.line(&format!("ID: {}", instance.id));
        self.console
            .line(&format!("Key Name: {}", instance.display_label()));
        self.console.line(&format!(
            "Status: {} ({})",
            instance.state.name(),
            instance.state.code()
        ));
        if let Some(dns) = &instance.public_dns {
            self.console.line(&format!("Host: {dns}"));
        }
        if let Some(ip) = &instance.public_ip {
            self.console.line(&format!("IP: {ip}"));
        }
        Ok(Flow::Done)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    async fn transition(&mut self, change: Transition) -> Result<Flow> {
        let id = self
            .session
            .selected()
            .ok_or(InstanceError::NotSelected)?
            .to_string();

        match transition::drive(&mut self.registry, &id, change, &self.console).await? {
            TransitionOutcome::AlreadyThere => self.console.line(match change {
                Transition::Start => "Already running.",
                Transition::Stop => "Already stopped.",
            }),
            TransitionOutcome::Reached { polls } => {
                tracing::info!(instance_id = %id, polls, "transition complete");
            }
        }
        Ok(Flow::Done)
    }

    // ── VPN ──────────────────────────────────────────────────────────────────

    fn target(&self) -> VpnTarget<'_> {
        VpnTarget {
            host: &self.settings.ovpn_host,
            image: &self.settings.ovpn_image,
        }
    }

    /// Use the configured value, otherwise prompt for one. `None` when the
    /// operator enters nothing or input ends.
    async fn configured_or_ask(
        &mut self,
        configured: Option<String>,
        prompt: &str,
    ) -> Result<Option<String>> {
        if configured.is_some() {
            return Ok(configured);
        }
        self.console.inline(prompt);
        let answer = self.input.read_line().await?;
        Ok(answer
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()))
    }

    async fn launch_server(&mut self) -> Result<Flow> {
        let Some(volume) = self
            .configured_or_ask(self.settings.docker_volume.clone(), "> Docker volume name: ")
            .await?
        else {
            return Ok(Flow::Abort);
        };

        let instance = self.selected_instance()?;
        let output = vpn::launch_server(&self.remote, instance, self.target(), &volume).await?;
        self.console.line(output.trim_end());
        Ok(Flow::Done)
    }

    async fn fetch_profile(&mut self) -> Result<Flow> {
        let Some(user) = self
            .configured_or_ask(self.settings.ovpn_user.clone(), "> OVPN username: ")
            .await?
        else {
            return Ok(Flow::Abort);
        };
        let Some(volume) = self
            .configured_or_ask(self.settings.docker_volume.clone(), "> Docker volume name: ")
            .await?
        else {
            return Ok(Flow::Abort);
        };

        let instance = self.selected_instance()?;
        vpn::fetch_client_profile(
            &self.remote,
            &self.writer,
            instance,
            self.target(),
            &volume,
            &user,
        )
        .await?;
        self.console.line("File written.");
        Ok(Flow::Done)
    }

    async fn install_profile(&mut self) -> Result<Flow> {
        let target = self.target();
        let path = self.writer.profile_path(&target.file_name());
        let ok = vpn::install_profile(&self.network, &self.console, target, &path).await?;
        Ok(if ok { Flow::Done } else { Flow::Abort })
    }

    async fn ssh(&mut self) -> Result<Flow> {
        let Some(command) = self.configured_or_ask(None, "> SSH command: ").await? else {
            return Ok(Flow::Abort);
        };

        let instance = self.selected_instance()?;
        let output = self.remote.execute(instance, &command).await?;
        self.console.line(output.trim_end());
        Ok(Flow::Done)
    }
}
