//! EC2 provider implemented over the `aws` CLI.
//!
//! Credentials, profiles and session handling are the CLI's own; this adapter
//! only builds arguments and parses `--output json`.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::{CommandRunner, InstanceProvider};
use crate::domain::instance::non_empty;
use crate::domain::{Instance, LifecycleState};

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<RawInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawInstance {
    instance_id: String,
    key_name: Option<String>,
    state: RawState,
    public_dns_name: Option<String>,
    public_ip_address: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawState {
    code: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    value: String,
}

impl From<RawInstance> for Instance {
    fn from(raw: RawInstance) -> Self {
        let name_tag = raw
            .tags
            .into_iter()
            .find(|t| t.key == "Name")
            .map(|t| t.value);
        Self {
            id: raw.instance_id,
            label: non_empty(name_tag).or_else(|| non_empty(raw.key_name)),
            state: LifecycleState::from_code(raw.state.code),
            public_dns: non_empty(raw.public_dns_name),
            public_ip: non_empty(raw.public_ip_address),
        }
    }
}

/// Parse `aws ec2 describe-instances` JSON into instances, across all
/// reservations.
///
/// # Errors
///
/// Returns an error if the JSON does not match the expected shape.
pub fn parse_describe_output(json: &[u8]) -> Result<Vec<Instance>> {
    let output: DescribeInstancesOutput =
        serde_json::from_slice(json).context("parsing describe-instances output")?;
    Ok(output
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .map(Instance::from)
        .collect())
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// `InstanceProvider` that shells out to the AWS CLI through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AwsCliProvider<R: CommandRunner> {
    runner: R,
    program: String,
    region: String,
}

impl<R: CommandRunner> AwsCliProvider<R> {
    pub fn new(runner: R, program: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            region: region.into(),
        }
    }

    async fn ec2(&self, action: &str, extra: &[&str]) -> Result<Vec<u8>> {
        let mut args = vec!["ec2", action, "--region", self.region.as_str(), "--output", "json"];
        args.extend_from_slice(extra);
        let output = self
            .runner
            .run(&self.program, &args)
            .await
            .with_context(|| format!("aws ec2 {action}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("aws ec2 {action} failed: {}", stderr.trim());
        }
        Ok(output.stdout)
    }
}

impl<R: CommandRunner> InstanceProvider for AwsCliProvider<R> {
    async fn describe(&self) -> Result<Vec<Instance>> {
        let stdout = self.ec2("describe-instances", &[]).await?;
        parse_describe_output(&stdout)
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.ec2("start-instances", &["--instance-ids", id])
            .await
            .map(drop)
    }

    async fn stop(&self, id: &str) -> Result<()> {
        self.ec2("stop-instances", &["--instance-ids", id])
            .await
            .map(drop)
    }
}
