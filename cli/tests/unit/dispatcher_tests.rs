//! Command Dispatcher: queue ordering, macro expansion, failures, exits.

use std::time::Duration;

use ec2ctl_cli::application::services::registry::InstanceRegistry;
use ec2ctl_cli::domain::{Instance, RemoteError, Settings};
use ec2ctl_cli::repl::{Dispatcher, Exit, FAREWELL};
use tokio_util::sync::CancellationToken;

use crate::helpers::{
    HOST, Journal, MockNetwork, MockRemote, MockWriter, PUBLIC_IP, RecordingConsole,
    ScriptedInput, ScriptedProvider, SilentInput, effects, instance, journal, running, settings,
    stopped,
};

const NOT_SELECTED: &str = "No instance selected. Use 'select' first.";

type TestDispatcher<I> =
    Dispatcher<ScriptedProvider, MockRemote, MockNetwork, MockWriter, I, RecordingConsole>;

struct Harness<I: ec2ctl_cli::application::ports::LineSource> {
    dispatcher: TestDispatcher<I>,
    console: RecordingConsole,
    writer: MockWriter,
}

async fn harness_with<I: ec2ctl_cli::application::ports::LineSource>(
    provider: ScriptedProvider,
    remote: MockRemote,
    network: MockNetwork,
    journal: &Journal,
    input: I,
    settings: Settings,
) -> Harness<I> {
    let console = RecordingConsole::new();
    let writer = MockWriter::new(journal);
    let registry = InstanceRegistry::connect(provider).await;
    let mut dispatcher = Dispatcher::new(
        registry,
        remote,
        network,
        writer.clone(),
        input,
        console.clone(),
        settings,
    );
    dispatcher.welcome().await.expect("welcome");
    Harness {
        dispatcher,
        console,
        writer,
    }
}

/// One configured instance, no remote replies, every nmcli call succeeds.
async fn harness(
    journal: &Journal,
    instances: Vec<Instance>,
    lines: &[&str],
) -> Harness<ScriptedInput> {
    harness_with(
        ScriptedProvider::fixed(journal, instances),
        MockRemote::new(journal, vec![]),
        MockNetwork::new(journal),
        journal,
        ScriptedInput::new(lines),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await
}

async fn run_to_end<I: ec2ctl_cli::application::ports::LineSource>(h: &mut Harness<I>) -> Exit {
    h.dispatcher
        .run(&CancellationToken::new())
        .await
        .expect("run")
}

// ── Startup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_selects_sole_instance_and_prints_help() {
    let journal = journal();
    let h = harness(&journal, vec![running("i-1")], &[]).await;

    assert_eq!(h.dispatcher.session().selected(), Some("i-1"));
    let out = h.console.output();
    assert!(out.contains("EC2 Control"));
    assert!(out.contains("info    : get info on vpn-gateway"));
    assert!(out.contains("exit    : quit program"));
    assert!(out.ends_with("\nSelected instance: vpn-gateway i-1\n"));
}

#[tokio::test]
async fn welcome_without_instances_selects_nothing() {
    let journal = journal();
    let h = harness(&journal, vec![], &[]).await;

    assert_eq!(h.dispatcher.session().selected(), None);
    assert!(!h.console.output().contains("Selected instance:"));
}

// ── Exits ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn quit_stops_before_reading_further_lines() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["q", "ls"]).await;

    assert_eq!(run_to_end(&mut h).await, Exit::Quit);

    let out = h.console.output();
    assert!(out.contains(FAREWELL));
    assert!(!out.contains("Instances list:"));
}

#[tokio::test]
async fn end_of_input_quits() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &[]).await;

    assert_eq!(run_to_end(&mut h).await, Exit::Quit);
    assert!(h.console.output().ends_with(&format!("{FAREWELL}\n")));
}

#[tokio::test]
async fn cancelled_token_stops_before_prompting() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["ls"]).await;
    let before = h.console.output();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let exit = h.dispatcher.run(&cancel).await.expect("run");

    assert_eq!(exit, Exit::Cancelled);
    assert_eq!(h.console.output(), before);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_waiting_prompt() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal),
        &journal,
        SilentInput,
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;
    let cancel = CancellationToken::new();

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    };
    let (exit, ()) = tokio::join!(h.dispatcher.run(&cancel), canceller);

    assert_eq!(exit.expect("run"), Exit::Cancelled);
}

// ── Tokens ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_token_reports_and_keeps_going() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["foo", "ls"]).await;

    run_to_end(&mut h).await;

    let out = h.console.output();
    assert!(out.contains("Invalid command\n"));
    assert!(out.contains("Instances list:\n"));
}

#[tokio::test]
async fn only_first_word_is_the_token_and_blank_lines_reprompt() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["", "   ", "ls extra words"]).await;

    run_to_end(&mut h).await;

    let out = h.console.output();
    assert_eq!(out.matches("\n> ").count(), 4);
    assert!(out.contains("Instances list:\n"));
    assert!(!out.contains("Invalid command"));
}

#[tokio::test]
async fn aliases_dispatch_to_same_command() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["i", "info"]).await;

    run_to_end(&mut h).await;

    assert_eq!(h.console.output().matches("ID: i-1\n").count(), 2);
}

// ── Selection ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commands_needing_selection_report_when_none() {
    let journal = journal();
    let mut h = harness(&journal, vec![], &["info", "start", "ssh"]).await;

    run_to_end(&mut h).await;

    assert_eq!(h.console.errors(), [NOT_SELECTED, NOT_SELECTED, NOT_SELECTED]);
    assert!(effects(&journal).is_empty());
}

#[tokio::test]
async fn select_command_switches_instance() {
    let journal = journal();
    let mut h = harness(
        &journal,
        vec![running("i-1"), instance("i-2", "backup", 80)],
        &["0", "select", "1"],
    )
    .await;
    assert_eq!(h.dispatcher.session().selected(), Some("i-1"));

    run_to_end(&mut h).await;

    assert_eq!(h.dispatcher.session().selected(), Some("i-2"));
    assert!(h.console.output().contains("Selected instance: backup i-2\n"));
}

#[tokio::test]
async fn update_drops_selection_of_vanished_instance() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::new(&journal, vec![Some(vec![running("i-1")]), Some(vec![])]),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["upd", "info"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    assert_eq!(h.dispatcher.session().selected(), None);
    assert_eq!(h.console.errors(), [NOT_SELECTED]);
}

#[tokio::test]
async fn info_prints_status_and_addresses() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["info"]).await;

    run_to_end(&mut h).await;

    let out = h.console.output();
    assert!(out.contains("ID: i-1\nKey Name: vpn-gateway\nStatus: running (16)\n"));
    assert!(out.contains("Host: ec2-i-1.compute.amazonaws.com\n"));
    assert!(out.contains(&format!("IP: {PUBLIC_IP}\n")));
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_on_running_instance_is_a_no_op() {
    let journal = journal();
    let mut h = harness(&journal, vec![running("i-1")], &["start"]).await;

    run_to_end(&mut h).await;

    assert!(h.console.output().contains("Already running.\n"));
    assert!(effects(&journal).is_empty());
}

#[tokio::test(start_paused = true)]
async fn start_waits_for_running() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::new(
            &journal,
            vec![
                Some(vec![stopped("i-1")]),
                Some(vec![instance("i-1", "vpn-gateway", 0)]),
                Some(vec![running("i-1")]),
            ],
        ),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["start"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    let out = h.console.output();
    assert!(out.contains("Starting instance: i-1.....Done.\n"));
    assert_eq!(effects(&journal), ["start i-1"]);
}

// ── VPN ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vpn_macro_runs_full_sequence_in_order() {
    let journal = journal();
    let profile = format!("client\nremote {HOST} 1194 udp\n");
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![Ok("3f2a9c\n".to_string()), Ok(profile)]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["vpn", "down"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    assert_eq!(
        effects(&journal),
        [
            "ssh i-1: docker run -v ovpn-data:/etc/openvpn -d -p 1194:1194/udp --cap-add=NET_ADMIN kylemanna/openvpn",
            "ssh i-1: docker run -v ovpn-data:/etc/openvpn --log-driver=none --rm kylemanna/openvpn ovpn_getclient laptop",
            "write vpn.example.com.ovpn",
            "nm delete vpn.example.com",
            "nm import /work/vpn.example.com.ovpn",
            "nm up vpn.example.com",
            "nm down vpn.example.com",
        ]
    );
    let out = h.console.output();
    assert!(out.contains("Already running.\n3f2a9c\nFile written.\n"));
    assert!(out.contains("Connecting to vpn.example.com...Done.\n"));
    assert!(h.writer.written.borrow()[0].1.contains(PUBLIC_IP));
}

#[tokio::test]
async fn failed_start_drops_rest_of_macro() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![stopped("i-1")]).rejecting_requests(),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["vpn", "ls"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    assert_eq!(effects(&journal), ["start i-1"]);
    let errors = h.console.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: "));
    assert!(errors[0].contains("UnauthorizedOperation"));
    assert!(h.console.output().contains("Instances list:"), "next line still runs");
}

#[tokio::test]
async fn failed_import_drops_connect_step() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal).failing(&["import"]),
        &journal,
        ScriptedInput::new(&["vpn"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    let effects = effects(&journal);
    assert!(effects.contains(&"nm import /work/vpn.example.com.ovpn".to_string()));
    assert!(!effects.iter().any(|e| e.starts_with("nm up")));
}

#[tokio::test]
async fn run_prompts_for_volume_when_unconfigured() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![Ok("abc\n".to_string())]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["run", "  vpn-vol  "]),
        settings(None, Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    assert!(h.console.output().contains("> Docker volume name: "));
    assert_eq!(
        effects(&journal),
        ["ssh i-1: docker run -v vpn-vol:/etc/openvpn -d -p 1194:1194/udp --cap-add=NET_ADMIN kylemanna/openvpn"]
    );
}

#[tokio::test]
async fn file_prompts_for_user_then_volume() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![Ok(format!("remote {HOST} 1194\n"))]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["file", "phone", "vpn-vol"]),
        settings(None, None),
    )
    .await;

    run_to_end(&mut h).await;

    let out = h.console.output();
    let user_prompt = out.find("> OVPN username: ").expect("user prompt");
    let volume_prompt = out.find("> Docker volume name: ").expect("volume prompt");
    assert!(user_prompt < volume_prompt);
    assert!(out.contains("File written.\n"));
    assert_eq!(
        effects(&journal)[0],
        "ssh i-1: docker run -v vpn-vol:/etc/openvpn --log-driver=none --rm kylemanna/openvpn ovpn_getclient phone"
    );
}

#[tokio::test]
async fn empty_prompt_answer_aborts_command() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["run", ""]),
        settings(None, None),
    )
    .await;

    run_to_end(&mut h).await;

    assert!(effects(&journal).is_empty());
}

#[tokio::test]
async fn ssh_runs_entered_command_and_prints_output() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(&journal, vec![Ok(" 10:00:01 up 3 days\n".to_string())]),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["ssh", "uptime"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    assert_eq!(effects(&journal), ["ssh i-1: uptime"]);
    let out = h.console.output();
    assert!(out.contains("> SSH command: "));
    assert!(out.contains(" 10:00:01 up 3 days\n"));
}

#[tokio::test]
async fn remote_failure_is_reported_as_error() {
    let journal = journal();
    let mut h = harness_with(
        ScriptedProvider::fixed(&journal, vec![running("i-1")]),
        MockRemote::new(
            &journal,
            vec![Err(RemoteError::Connect {
                host: "ec2-i-1.compute.amazonaws.com".to_string(),
                attempts: 3,
                reason: "connection refused".to_string(),
            })],
        ),
        MockNetwork::new(&journal),
        &journal,
        ScriptedInput::new(&["run"]),
        settings(Some("ovpn-data"), Some("laptop")),
    )
    .await;

    run_to_end(&mut h).await;

    let errors = h.console.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("after 3 attempts"));
}
