use std::io::{self, BufRead, Write};

use anyhow::Result;
use luxespend_core::{Action, Session, StorageSlot};

pub const RESET_PROMPT: &str =
    "Are you sure you want to delete all transactions? This cannot be undone.";

pub fn cmd_reset<S: StorageSlot>(session: &mut Session<S>, yes: bool) -> Result<()> {
    let stdin = io::stdin();
    cmd_reset_with(session, yes, &mut stdin.lock())
}

/// Reset, reading the confirmation from `input`
pub fn cmd_reset_with<S: StorageSlot>(
    session: &mut Session<S>,
    yes: bool,
    input: &mut impl BufRead,
) -> Result<()> {
    if session.store().is_empty() {
        println!("Nothing to reset.");
        return Ok(());
    }

    let confirmed = if yes {
        true
    } else {
        print!("⚠️  {} [y/N] ", RESET_PROMPT);
        io::stdout().flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        is_yes(&answer)
    };

    let count = session.store().len();
    let outcome = session.dispatch(Action::Reset { confirmed });
    if outcome.removed {
        println!("✅ Deleted {} transactions.", count);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
