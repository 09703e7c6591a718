//! Manual advice refresh, backend check and advisor panel output

use anyhow::Result;
use luxespend_core::{Action, AdviceBackend, AdvicePanel, AdviceTicket, Session, StorageSlot};

pub async fn cmd_advice<S: StorageSlot>(session: &mut Session<S>) -> Result<()> {
    let outcome = session.dispatch(Action::RefreshAdvice);
    let Some(ticket) = outcome.advice else {
        if let Some(notice) = outcome.notice {
            println!("⚠️  {}", notice);
        }
        print_advice_panel(session.advice_panel());
        return Ok(());
    };

    if let Some(client) = session.advisor().client() {
        println!("🤖 Asking {} ({})...", client.name(), client.model());
    }

    fetch_advice(session, ticket).await;

    println!();
    print_advice_panel(session.advice_panel());
    Ok(())
}

/// Show the configured advice backend and whether it answers
pub async fn cmd_advice_check<S: StorageSlot>(session: &Session<S>) -> Result<()> {
    println!();
    println!("🤖 Advice Backend");
    println!("   ─────────────────────────────");

    let advisor = session.advisor();
    println!("   Milestone: every {} transactions", session.policy().every());
    println!("   Timeout:   {}s", advisor.timeout().as_secs());

    let Some(client) = advisor.client() else {
        println!("   Backend:   none configured (fixed tips only)");
        return Ok(());
    };

    println!("   Backend:   {}", client.name());
    println!("   Model:     {}", client.model());
    println!("   Host:      {}", client.host());

    if client.health_check().await {
        println!("   Status:    ✅ reachable");
    } else {
        println!("   Status:    ❌ unreachable");
    }
    Ok(())
}

/// Run `ticket` to completion and apply the result to the session
pub async fn fetch_advice<S: StorageSlot>(session: &mut Session<S>, ticket: AdviceTicket) -> bool {
    let advisor = session.advisor().clone();
    let result = ticket.run(&advisor).await;
    session.complete_advice(result)
}

/// Smart Advisor block, tip lines indented under the heading
pub fn print_advice_panel(panel: &AdvicePanel) {
    println!("  🤖 Smart Advisor");
    match panel.text() {
        Some(text) => {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                println!("     {}", line.trim());
            }
        }
        None => println!("     ⏳ Fetching advice..."),
    }
    println!();
}
