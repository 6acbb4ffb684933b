use super::commands::{Cli, Commands};
use anyhow::{Result, bail};
use routinely::session::SessionGate;
use routinely::transport::{ChannelEvent, ChannelState};
use routinely::{AppContext, ApprovalView, Config, SubmitError};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

#[cfg(test)]
#[path = "../../tests/support/channel_harness.rs"]
mod channel_harness;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Eligibility => run_eligibility(config).await,
        Commands::Submit {
            goal,
            notify,
            approve,
            reject,
        } => {
            let decision = match (approve, reject) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            run_submit(config, &goal, &notify, decision).await
        }
    }
}

async fn run_eligibility(config: Config) -> Result<()> {
    let ctx = AppContext::start(config).await?;
    println!("{}", render_eligibility(ctx.pipeline.gate()));
    ctx.shutdown().await;
    Ok(())
}

fn render_eligibility(gate: &SessionGate) -> String {
    let eligibility = gate.current_eligibility();
    let who = gate
        .identity()
        .map_or_else(|| "(signed out)".to_string(), |i| i.email);
    match eligibility.reason {
        None => format!("✓ {who} can submit goals"),
        Some(reason) => format!("✗ {who}: {reason} ({})", SubmitError::from(reason)),
    }
}

async fn run_submit(
    config: Config,
    goal: &str,
    notify: &[usize],
    decision: Option<bool>,
) -> Result<()> {
    let open_timeout = Duration::from_secs(config.channel.open_timeout_secs);
    let ctx = AppContext::start(config).await?;

    let mut events = ctx.channel.subscribe();
    let notices = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ChannelEvent::Error(message) | ChannelEvent::Fault(message)) => {
                    eprintln!("! {message}");
                }
                Ok(ChannelEvent::Closed) | Err(RecvError::Closed) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
            }
        }
    });

    let state = ctx.channel.wait_until_settled(open_timeout).await;
    if state != ChannelState::Open {
        tracing::warn!("channel is {state}; continuing without it");
    }

    println!("Generating routine...");
    let routine = match ctx.pipeline.submit(goal).await {
        Ok(routine) => routine,
        Err(e) => {
            ctx.shutdown().await;
            notices.abort();
            bail!("{e}");
        }
    };

    for &index in notify {
        if !ctx.pipeline.toggle_notify(index, true) {
            eprintln!("! no step at index {index}; ignoring");
        }
    }

    println!();
    println!("Generated Routine:");
    print!("{}", ctx.pipeline.routine().unwrap_or(routine).render_table());
    println!();

    let outcome = match decision {
        Some(approved) => ctx.pipeline.decide(approved).map(|_| ()),
        None => Ok(()),
    };

    match ctx.pipeline.approval_view() {
        Some(ApprovalView::Choices) | None => {
            println!("Re-run with --approve or --reject to decide on email reminders.");
        }
        Some(view) => {
            if let Some(summary) = view.summary() {
                println!("{summary}");
            }
        }
    }

    ctx.shutdown().await;
    notices.abort();

    if let Err(e) = outcome {
        bail!("could not deliver decision: {e}");
    }
    Ok(())
}
