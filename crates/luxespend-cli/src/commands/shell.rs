//! Interactive shell
//!
//! Advice requests run as background tokio tasks so the prompt stays
//! responsive. Only one request is tracked: starting another aborts the
//! previous task, and the session discards any result that still slips
//! through. A task that dies without a result settles the panel on the
//! fallback tip.

use std::io::{self, Write};

use anyhow::Result;
use luxespend_core::{Action, AdviceResult, AdviceTicket, Session, StorageSlot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{
    cmd_categories, cmd_list, delete_transaction, is_yes, parse_draft, print_advice_panel,
    print_dashboard, short_id, RESET_PROMPT,
};

const HELP: &str = "\
Commands:
  dashboard                                  Totals, chart and the latest tip
  add <amount> <type> <category> [date] [note...]
                                             e.g. add 12.50 expense food 2024-05-01 lunch
  list [limit]                               Transaction history, newest first
  delete <id>                                Delete a transaction (id prefix is enough)
  reset                                      Delete all transactions
  advice                                     Ask for a fresh tip in the background
  categories                                 List categories
  help                                       Show this help
  quit                                       Leave the shell";

pub async fn cmd_shell<S: StorageSlot>(session: Session<S>) -> Result<()> {
    let mut shell = Shell::new(session);
    let mut stdin = BufReader::new(tokio::io::stdin());
    shell.run(&mut stdin).await
}

/// Running advice task and the generation it was started for
type InFlight = (u64, JoinHandle<AdviceResult>);

pub struct Shell<S> {
    session: Session<S>,
    in_flight: Option<InFlight>,
    pending_reset: bool,
}

impl<S: StorageSlot> Shell<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            in_flight: None,
            pending_reset: false,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Whether an advice request is currently running
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Read commands from `input` until `quit` or end of input
    pub async fn run(&mut self, input: &mut (impl AsyncBufRead + Unpin)) -> Result<()> {
        self.open();

        loop {
            self.poll_advice().await;

            print!("luxespend> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line).await? == 0 {
                println!();
                break;
            }

            if !self.handle_line(&line).await? {
                break;
            }
        }

        self.cancel_advice();
        Ok(())
    }

    /// Print the banner and request advice if the loaded list sits on a milestone
    pub fn open(&mut self) {
        println!("💎 LuxeSpend shell. Type 'help' for commands.");
        if let Some(ticket) = self.session.initial_advice() {
            self.start_advice(ticket);
        }
        print_advice_panel(self.session.advice_panel());
    }

    /// Execute one command line; returns false when the shell should exit
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        let line = line.trim();

        if self.pending_reset {
            self.pending_reset = false;
            let outcome = self.session.dispatch(Action::Reset {
                confirmed: is_yes(line),
            });
            if outcome.removed {
                self.cancel_advice();
                println!("✅ All transactions deleted.");
            } else {
                println!("Cancelled.");
            }
            return Ok(true);
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(true);
        };
        let args: Vec<&str> = words.collect();

        match command.to_lowercase().as_str() {
            "dashboard" | "d" => {
                self.poll_advice().await;
                print_dashboard(&self.session.dashboard(5));
            }
            "add" | "a" => self.add(&args),
            "list" | "ls" => {
                let limit = args.first().and_then(|n| n.parse().ok()).unwrap_or(20);
                cmd_list(&self.session, limit)?;
            }
            "delete" | "del" | "rm" => match args.first() {
                Some(id) => {
                    if let Some(ticket) = delete_transaction(&mut self.session, id) {
                        self.start_advice(ticket);
                        println!("⏳ Milestone reached, fetching advice in the background...");
                    } else if self.session.store().is_empty() {
                        self.cancel_advice();
                    }
                }
                None => println!("⚠️  Usage: delete <id>"),
            },
            "reset" => {
                if self.session.store().is_empty() {
                    println!("Nothing to reset.");
                } else {
                    println!("⚠️  {} [y/N]", RESET_PROMPT);
                    self.pending_reset = true;
                }
            }
            "advice" | "tip" => {
                let outcome = self.session.dispatch(Action::RefreshAdvice);
                match outcome.advice {
                    Some(ticket) => {
                        self.start_advice(ticket);
                        println!("⏳ Fetching advice in the background...");
                    }
                    None => {
                        if let Some(notice) = outcome.notice {
                            println!("⚠️  {}", notice);
                        }
                    }
                }
            }
            "categories" | "cats" => cmd_categories()?,
            "help" | "?" => println!("{}", HELP),
            "quit" | "exit" | "q" => return Ok(false),
            other => println!("Unknown command '{}'. Type 'help' for commands.", other),
        }

        Ok(true)
    }

    /// Wait for the running advice request, if any, and apply it
    pub async fn settle(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            self.finish(in_flight).await;
        }
    }

    fn add(&mut self, args: &[&str]) {
        let [amount, kind, category, rest @ ..] = args else {
            println!("⚠️  Usage: add <amount> <type> <category> [date] [note...]");
            return;
        };

        let (date, note_words) = match rest.split_first() {
            Some((first, tail)) if looks_like_date(first) => (Some(*first), tail),
            _ => (None, rest),
        };
        let note = note_words.join(" ");

        let draft = match parse_draft(amount, kind, category, date, Some(&note)) {
            Ok(d) => d,
            Err(notice) => {
                println!("⚠️  {}", notice);
                return;
            }
        };

        let outcome = self.session.dispatch(Action::Add(draft));
        if let Some(notice) = outcome.notice {
            println!("⚠️  {}", notice);
            return;
        }
        if let Some(tx) = outcome.added {
            println!("✅ Added {} {}", tx.category, short_id(&tx.id));
        }
        if let Some(ticket) = outcome.advice {
            self.start_advice(ticket);
            println!("⏳ Milestone reached, fetching advice in the background...");
        }
    }

    fn start_advice(&mut self, ticket: AdviceTicket) {
        self.cancel_advice();
        let advisor = self.session.advisor().clone();
        let generation = ticket.generation();
        debug!(generation, "Starting advice request");
        let handle = tokio::spawn(async move { ticket.run(&advisor).await });
        self.in_flight = Some((generation, handle));
    }

    fn cancel_advice(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
            debug!("Cancelled in-flight advice request");
        }
    }

    async fn poll_advice(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|(_, h)| h.is_finished());
        if finished {
            if let Some(in_flight) = self.in_flight.take() {
                if self.finish(in_flight).await {
                    println!("🤖 New advice is ready:");
                    print_advice_panel(self.session.advice_panel());
                }
            }
        }
    }

    async fn finish(&mut self, (generation, handle): InFlight) -> bool {
        match handle.await {
            Ok(result) => self.session.complete_advice(result),
            Err(e) if e.is_cancelled() => false,
            Err(e) => {
                warn!(error = %e, generation, "Advice task failed");
                self.session
                    .complete_advice(AdviceResult::fallback(generation))
            }
        }
    }
}

fn looks_like_date(word: &str) -> bool {
    chrono::NaiveDate::parse_from_str(word, "%Y-%m-%d").is_ok()
}
